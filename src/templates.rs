use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::extractor::BrandExtractor;
use crate::generator::ReplicaGenerator;
use crate::providers::Scraper;
use crate::types::{TemplateApplication, TemplateType};

/// Fixed instruction passed to the generator for each template.
pub fn template_prompt(template: TemplateType) -> &'static str {
    match template {
        TemplateType::HeroSection => {
            "Create a hero section with a headline, subheadline, CTA button, and optional image placeholder"
        }
        TemplateType::PricingTable => {
            "Create a 3-tier pricing table with features, prices, and CTA buttons"
        }
        TemplateType::FeatureGrid => {
            "Create a 3-column feature grid with icons (use emoji placeholders), titles, and descriptions"
        }
        TemplateType::Testimonial => {
            "Create a testimonial section with quote, author name, role, and company"
        }
        TemplateType::Cta => {
            "Create a call-to-action section with headline, description, and primary button"
        }
    }
}

/// Styles a fixed template skeleton with the brand of a live site.
#[derive(Clone)]
pub struct TemplateApplier {
    scraper: Arc<dyn Scraper>,
    extractor: BrandExtractor,
    generator: ReplicaGenerator,
}

impl TemplateApplier {
    pub fn new(
        scraper: Arc<dyn Scraper>,
        extractor: BrandExtractor,
        generator: ReplicaGenerator,
    ) -> Self {
        Self {
            scraper,
            extractor,
            generator,
        }
    }

    /// Scrape `url`, extract its brand and render `template_type` with it.
    ///
    /// The template name is checked before any provider is contacted.
    pub async fn apply(&self, url: &str, template_type: &str) -> Result<TemplateApplication> {
        let template: TemplateType = template_type.parse()?;
        self.apply_template(url, template).await
    }

    #[instrument(skip(self), fields(template = %template))]
    pub async fn apply_template(
        &self,
        url: &str,
        template: TemplateType,
    ) -> Result<TemplateApplication> {
        let page = self.scraper.scrape(url, false).await?;
        let brand = self.extractor.extract(&page).await?;
        let artifact = self
            .generator
            .generate_component(&brand, template.component_type(), template_prompt(template))
            .await?;
        debug!(source = %brand.source_url, "template applied");

        Ok(TemplateApplication {
            html: artifact.html,
            css: artifact.css,
            preview_url: artifact.preview_url,
            template_type: template,
            source_url: brand.source_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MirageError;
    use crate::providers::{GenerationRequest, ResponseFormat, TextModel};
    use crate::types::ScrapedPage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StaticScraper {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Scraper for StaticScraper {
        async fn scrape(&self, url: &str, _include_screenshot: bool) -> Result<ScrapedPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ScrapedPage {
                url: url.to_string(),
                markdown: Some("# Acme\nPlans for every team".into()),
                ..ScrapedPage::default()
            })
        }
    }

    #[derive(Default)]
    struct ScriptedModel {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            Ok(match request.format {
                ResponseFormat::Json => r##"{
                    "colors": {"primary": "#3366FF", "palette": ["#3366FF"]},
                    "typography": {"headings": "Inter", "body": "Inter"}
                }"##
                .to_string(),
                ResponseFormat::Text => "---HTML---\n<section class=\"pricing\"><div class=\"tier\">Basic</div></section>\n---CSS---\n.pricing{display:grid}\n---END---".to_string(),
            })
        }
    }

    fn applier(scraper: Arc<StaticScraper>, model: Arc<ScriptedModel>) -> TemplateApplier {
        TemplateApplier::new(
            scraper,
            BrandExtractor::new(model.clone()),
            ReplicaGenerator::new(model),
        )
    }

    #[test]
    fn every_template_has_an_instruction() {
        for template in TemplateType::ALL {
            assert!(template_prompt(template).starts_with("Create a"));
        }
    }

    #[tokio::test]
    async fn applies_template_with_fixed_instruction() {
        let scraper = Arc::new(StaticScraper::default());
        let model = Arc::new(ScriptedModel::default());
        let result = applier(scraper.clone(), model.clone())
            .apply("https://acme.test/", "pricing_table")
            .await
            .expect("template applied");

        assert_eq!(result.template_type, TemplateType::PricingTable);
        assert_eq!(result.source_url, "https://acme.test/");
        assert!(result.html.contains("pricing"));
        assert!(result.css.contains("--color-primary: #3366FF"));
        assert!(result.preview_url.starts_with("data:text/html;base64,"));

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("3-tier pricing table"));
        assert_eq!(scraper.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_template_fails_before_scraping() {
        let scraper = Arc::new(StaticScraper::default());
        let model = Arc::new(ScriptedModel::default());
        let err = applier(scraper.clone(), model.clone())
            .apply("https://acme.test/", "footer")
            .await
            .unwrap_err();

        assert!(matches!(err, MirageError::Validation(_)));
        assert_eq!(scraper.calls.load(Ordering::SeqCst), 0);
        assert!(model.prompts.lock().unwrap().is_empty());
    }
}
