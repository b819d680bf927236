//! MCP surface: the five tools registered as rmcp routes on [`BrandServer`].
//!
//! Argument schemas come from the `JsonSchema` derives in [`super::tools`]. A tool
//! failure is still a successful `tools/call`: the result carries `isError: true`
//! and the error payload as its text content.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    Tool,
};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde_json::Value;

use super::tools::{
    ApplyTemplateArgs, CompareBrandsArgs, ExtractBrandArgs, GenerateReplicaArgs,
    ReplicateWebsiteArgs, APPLY_BRAND_TO_TEMPLATE, COMPARE_BRANDS, EXTRACT_BRAND,
    GENERATE_REPLICA, REPLICATE_WEBSITE, TOOL_NAMES,
};
use super::{to_json, traced, BrandServer};
use crate::error::ErrorPayload;

pub const SERVER_NAME: &str = "mirage-brandextract";

const INSTRUCTIONS: &str = "Extract a website's brand (colors, typography, spacing, buttons) \
with extract_brand, then generate matching HTML/CSS with generate_replica, or do both with \
replicate_website. compare_brands diffs two sites; apply_brand_to_template fills a fixed layout.";

#[tool_router]
impl BrandServer {
    #[tool(
        name = "extract_brand",
        description = "Extract colors, typography, spacing and button styles from a website"
    )]
    async fn extract_brand_tool(
        &self,
        Parameters(args): Parameters<ExtractBrandArgs>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = traced(EXTRACT_BRAND, async {
            to_json(
                self.extract_brand(&args.url, args.include_screenshots)
                    .await?,
            )
        })
        .await;
        tool_result(outcome)
    }

    #[tool(
        name = "generate_replica",
        description = "Generate an HTML/CSS component styled with extracted brand data"
    )]
    async fn generate_replica_tool(
        &self,
        Parameters(args): Parameters<GenerateReplicaArgs>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = traced(GENERATE_REPLICA, async {
            to_json(
                self.generate_replica(args.brand_data, &args.component_type, &args.customization)
                    .await?,
            )
        })
        .await;
        tool_result(outcome)
    }

    #[tool(
        name = "replicate_website",
        description = "Extract a website's brand and generate a matching component in one step"
    )]
    async fn replicate_website_tool(
        &self,
        Parameters(args): Parameters<ReplicateWebsiteArgs>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = traced(REPLICATE_WEBSITE, async {
            to_json(
                self.replicate_website(&args.url, &args.component_type, &args.customization)
                    .await?,
            )
        })
        .await;
        tool_result(outcome)
    }

    #[tool(
        name = "compare_brands",
        description = "Compare the brand identities of two websites"
    )]
    async fn compare_brands_tool(
        &self,
        Parameters(args): Parameters<CompareBrandsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = traced(COMPARE_BRANDS, async {
            to_json(self.compare_brands(&args.url1, &args.url2).await?)
        })
        .await;
        tool_result(outcome)
    }

    #[tool(
        name = "apply_brand_to_template",
        description = "Apply a website's brand to a predefined template"
    )]
    async fn apply_brand_to_template_tool(
        &self,
        Parameters(args): Parameters<ApplyTemplateArgs>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = traced(APPLY_BRAND_TO_TEMPLATE, async {
            to_json(
                self.apply_brand_to_template(&args.url, &args.template_type)
                    .await?,
            )
        })
        .await;
        tool_result(outcome)
    }
}

#[tool_handler]
impl ServerHandler for BrandServer {
    fn get_info(&self) -> ServerInfo {
        let mut implementation = Implementation::from_build_env();
        implementation.name = SERVER_NAME.to_string();
        implementation.version = env!("CARGO_PKG_VERSION").to_string();

        let mut info = ServerInfo::default();
        info.protocol_version = ProtocolVersion::V_2024_11_05;
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info = implementation;
        info.instructions = Some(INSTRUCTIONS.to_string());
        info
    }
}

pub(super) fn router() -> ToolRouter<BrandServer> {
    BrandServer::tool_router()
}

/// The published tool catalogue, in [`TOOL_NAMES`] order.
pub fn tool_definitions() -> Vec<Tool> {
    let mut tools = router().list_all();
    tools.sort_by_key(|tool| {
        TOOL_NAMES
            .iter()
            .position(|name| *name == &*tool.name)
            .unwrap_or(TOOL_NAMES.len())
    });
    tools
}

fn tool_result(
    outcome: std::result::Result<Value, ErrorPayload>,
) -> Result<CallToolResult, McpError> {
    let (text, failed) = match &outcome {
        Ok(value) => (serde_json::to_string_pretty(value), false),
        Err(payload) => (serde_json::to_string_pretty(payload), true),
    };
    let content = vec![Content::text(
        text.map_err(|e| McpError::internal_error(e.to_string(), None))?,
    )];
    Ok(if failed {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_lists_every_tool_once_in_order() {
        let names: Vec<String> = tool_definitions()
            .iter()
            .map(|tool| tool.name.to_string())
            .collect();
        assert_eq!(names, TOOL_NAMES.to_vec());
    }

    #[test]
    fn catalogue_schemas_come_from_argument_types() {
        let tools = serde_json::to_value(tool_definitions()).unwrap();
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
        assert_eq!(tools[0]["inputSchema"]["required"][0], "url");
        assert_eq!(tools[3]["inputSchema"]["additionalProperties"], false);
    }

    #[test]
    fn failures_become_error_results_with_payload_text() {
        let payload = crate::MirageError::validation("url is required")
            .to_payload()
            .with_operation(EXTRACT_BRAND);
        let result = tool_result(Err(payload)).unwrap();
        assert_eq!(result.is_error, Some(true));

        let value = serde_json::to_value(&result).unwrap();
        let text = value["content"][0]["text"].as_str().unwrap();
        let payload: Value = serde_json::from_str(text).unwrap();
        assert_eq!(payload["operation"], "extract_brand");
        assert_eq!(payload["category"], "validation");
    }
}
