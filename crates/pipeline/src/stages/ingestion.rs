//! Gathers the product text the USP stage analyses.

use adapt_core::html_text::html_to_text;

use crate::context::PipelineContext;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductInput {
    pub product_description: String,
    /// Visible text of the landing page, already truncated.
    pub landing_page_text: Option<String>,
    pub creative_title: Option<String>,
}

impl ProductInput {
    /// All available product text in one block, empty parts omitted.
    pub fn combined_text(&self) -> String {
        let mut sections = Vec::new();
        if let Some(title) = self.creative_title.as_deref().map(str::trim) {
            if !title.is_empty() {
                sections.push(format!("Ad creative title: {title}"));
            }
        }
        let description = self.product_description.trim();
        if !description.is_empty() {
            sections.push(description.to_string());
        }
        if let Some(page) = self.landing_page_text.as_deref().map(str::trim) {
            if !page.is_empty() {
                sections.push(format!("Landing page content: {page}"));
            }
        }
        sections.join("\n\n")
    }
}

/// Collect the product description, the scraped landing page and the
/// creative title. A landing page that cannot be fetched is logged and
/// skipped.
pub async fn load_product_input(
    ctx: &PipelineContext,
    product_description: &str,
    landing_page_url: Option<&str>,
    creative_title: Option<&str>,
) -> ProductInput {
    let landing_page_text = match landing_page_url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => match ctx.fetch_text(url).await {
            Ok(html) => {
                let text = html_to_text(&html, ctx.config.scrape_char_limit);
                tracing::debug!(url, chars = text.chars().count(), "Scraped landing page");
                Some(text).filter(|t| !t.is_empty())
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Could not scrape landing page");
                None
            }
        },
        None => None,
    };

    ProductInput {
        product_description: product_description.trim().to_string(),
        landing_page_text,
        creative_title: creative_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::stages::testing::{context, InstantVideoModel, ScriptedTextModel};

    #[test]
    fn combined_text_orders_sections() {
        let input = ProductInput {
            product_description: "Trail shoe".into(),
            landing_page_text: Some("Free returns".into()),
            creative_title: Some("Summer Sale".into()),
        };
        assert_eq!(
            input.combined_text(),
            "Ad creative title: Summer Sale\n\nTrail shoe\n\nLanding page content: Free returns"
        );
    }

    #[test]
    fn combined_text_skips_blank_parts() {
        let input = ProductInput {
            product_description: "  ".into(),
            landing_page_text: Some(String::new()),
            creative_title: None,
        };
        assert_eq!(input.combined_text(), "");
    }

    #[tokio::test]
    async fn unreachable_landing_page_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(
            &dir,
            Arc::new(ScriptedTextModel::default()),
            Arc::new(InstantVideoModel::with_bytes(b"")),
        );
        let input = load_product_input(
            &ctx,
            " Boots ",
            Some("http://127.0.0.1:9/unreachable"),
            Some(" "),
        )
        .await;
        assert_eq!(input.product_description, "Boots");
        assert_eq!(input.landing_page_text, None);
        assert_eq!(input.creative_title, None);
    }
}
