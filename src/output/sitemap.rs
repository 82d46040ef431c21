//! Sitemap generation
//!
//! Renders the successfully fetched pages of a crawl as a sitemaps.org
//! `urlset` document. Each page is listed under its canonical link when it
//! declared one, otherwise under the link it was fetched from.

use crate::output::{OutputError, OutputResult};
use crate::state::{PageRecord, PageRegistry};
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const LASTMOD_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Unique sitemap links of the succeeded records, sorted
pub fn sitemap_links(records: &[PageRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|record| record.status.is_success())
        .map(|record| record.sitemap_link().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Formats links as a sitemap document
///
/// # Arguments
///
/// * `links` - The links to list, in output order
/// * `generated_at` - Timestamp used as every entry's `<lastmod>`
pub fn render_sitemap(links: &[String], generated_at: DateTime<Utc>) -> String {
    let lastmod = generated_at.format(LASTMOD_FORMAT).to_string();

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{}\">\n", SITEMAP_NAMESPACE));
    for link in links {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(link)));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");

    xml
}

/// Writes the sitemap for a finished crawl
///
/// # Returns
///
/// * `Ok(usize)` - Number of entries written
/// * `Err(OutputError::NothingToWrite)` - No page succeeded; no file is created
/// * `Err(OutputError::Io)` - The file could not be written
pub fn write_sitemap(registry: &PageRegistry, output_path: &Path) -> OutputResult<usize> {
    let links = sitemap_links(&registry.succeeded());
    if links.is_empty() {
        return Err(OutputError::NothingToWrite);
    }

    let xml = render_sitemap(&links, Utc::now());
    let mut file = File::create(output_path)?;
    file.write_all(xml.as_bytes())?;

    tracing::info!(
        "Wrote {} sitemap entries to {}",
        links.len(),
        output_path.display()
    );
    Ok(links.len())
}

fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains(&['&', '<', '>', '"', '\''][..]) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
