//! List command - show the vendors of a pack index with their versions.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use console::style;
use std::sync::Arc;

use svdgrab_pack::{HttpClient, Index, IndexFetcher, VendorCatalog, DEFAULT_INDEX_URL};

use crate::config::SvdgrabConfig;
use crate::output::Output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ListFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Pack index URL
    #[arg(long)]
    pub index: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = ListFormat::Text)]
    pub format: ListFormat,
}

pub async fn execute(args: ListArgs, config: &SvdgrabConfig, output: &mut Output) -> Result<i32> {
    let index_url = args
        .index
        .or_else(|| config.index.clone())
        .unwrap_or_else(|| DEFAULT_INDEX_URL.to_string());

    let http_client = HttpClient::with_config(config.http_client_config())
        .context("Failed to create HTTP client")?;
    let fetcher = IndexFetcher::new(Arc::new(http_client));

    output.verbose(&format!("Reading pack index from {}", index_url));
    let index = fetcher
        .fetch(&index_url)
        .await
        .with_context(|| format!("Failed to load pack index from {}", index_url))?;
    let catalog = VendorCatalog::build(&index);

    match args.format {
        ListFormat::Json => {
            output.set_json_mode(true);
            output.json(&catalog);
        }
        ListFormat::Text => {
            for line in render_text(&index, &catalog) {
                println!("{}", line);
            }
            output.verbose(&format!("{} vendors", catalog.len()));
        }
    }

    Ok(0)
}

/// Provider line followed by one line per vendor
fn render_text(index: &Index, catalog: &VendorCatalog) -> Vec<String> {
    let mut lines = Vec::with_capacity(catalog.len() + 1);
    lines.push(format!("Vendor {}", index.vendor));

    for (vendor, versions) in catalog.iter() {
        lines.push(format!("{} {}", style(vendor).green(), versions.join(", ")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> Index {
        Index::from_xml(
            r#"<index schemaVersion="1.1.0">
  <vendor>Keil</vendor>
  <url>https://www.keil.com/pack/</url>
  <timestamp>2021-06-01T08:00:00</timestamp>
  <pindex>
    <pdsc url="https://b.example/" vendor="Beta" name="Chip" version="2.0.0"/>
    <pdsc url="https://a.example/" vendor="Alpha" name="Board" version="10.0.0"/>
    <pdsc url="https://a.example/" vendor="Alpha" name="Board" version="2.0.0"/>
  </pindex>
</index>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_render_text_orders_vendors_and_versions() {
        console::set_colors_enabled(false);
        let index = sample_index();
        let catalog = VendorCatalog::build(&index);

        let lines = render_text(&index, &catalog);
        assert_eq!(
            lines,
            vec![
                "Vendor Keil".to_string(),
                "alpha 10.0.0, 2.0.0".to_string(),
                "beta 2.0.0".to_string(),
            ]
        );
    }

    #[test]
    fn test_catalog_json_shape() {
        let index = sample_index();
        let json = serde_json::to_value(VendorCatalog::build(&index)).unwrap();
        assert_eq!(json, serde_json::json!({"alpha": ["10.0.0", "2.0.0"], "beta": ["2.0.0"]}));
    }

    #[test]
    fn test_render_text_empty_index() {
        console::set_colors_enabled(false);
        let index = Index::from_xml("<index><vendor>Keil</vendor></index>").unwrap();
        let catalog = VendorCatalog::build(&index);
        assert_eq!(render_text(&index, &catalog), vec!["Vendor Keil".to_string()]);
    }
}
