mod cli;
mod formatting;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use mirage_lib::server::{serve_stdio, tool_definitions};
use mirage_lib::{BrandServer, Config, MirageError, Result};
use serde_json::Value;
use tracing::{debug, error};

use cli::{Commands, OutputFormat};
use formatting::{render_fatal, render_tool_failure, write_output, EXIT_FATAL};

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();
    logging::init_logger(args.verbose);

    match args.command.unwrap_or_default() {
        Commands::Serve => run_serve(args.config.as_deref()).await,
        Commands::Tools { format } => run_tools(format),
        Commands::Call {
            tool,
            args: inline_args,
            args_file,
            format,
            output,
        } => {
            run_call(
                args.config.as_deref(),
                &tool,
                inline_args,
                args_file,
                format,
                output,
            )
            .await
        }
    }
}

/// Load config, apply env overrides and build the server; all failures are fatal.
fn load_server(config_path: Option<&Path>) -> Result<BrandServer> {
    let config = Config::load(config_path)?.with_env_overrides();
    config.validate()?;
    debug!(config = %config.summary(), "effective config");
    BrandServer::from_config(&config)
}

async fn run_serve(config_path: Option<&Path>) -> ExitCode {
    let server = match load_server(config_path) {
        Ok(server) => server,
        Err(err) => return render_fatal(&err),
    };
    match serve_stdio(server).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "server stopped");
            render_fatal(&err)
        }
    }
}

fn run_tools(format: OutputFormat) -> ExitCode {
    match write_output(&tool_definitions(), format, None) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Failed to write tool catalogue: {err}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run_call(
    config_path: Option<&Path>,
    tool: &str,
    inline_args: String,
    args_file: Option<PathBuf>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let arguments = match read_arguments(inline_args, args_file.as_deref()) {
        Ok(value) => value,
        Err(err) => return render_fatal(&err),
    };
    let server = match load_server(config_path) {
        Ok(server) => server,
        Err(err) => return render_fatal(&err),
    };

    match server.call_tool(tool, arguments).await {
        Ok(result) => match write_output(&result, format, output.as_deref()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Failed to write output: {err}");
                ExitCode::from(EXIT_FATAL)
            }
        },
        Err(payload) => render_tool_failure(&payload, format, output),
    }
}

fn read_arguments(inline: String, file: Option<&Path>) -> Result<Value> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => inline,
    };
    serde_json::from_str(&raw)
        .map_err(|e| MirageError::validation(format!("tool arguments are not valid JSON: {e}")))
}
