//! Logo asset fetcher.
//!
//! Locates the infobox image on the configured article page, preferring the
//! highest-resolution `srcset` candidate, and downloads it next to the other
//! outputs. Finding no image is a success with an absent asset, not a
//! failure.

use crate::config::{FetchConfig, OutputConfig};
use crate::fetch::LOGO_PATH;
use crate::pipeline::{FetchUnit, Field};
use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Build the gather unit for the logo asset.
pub fn unit(client: reqwest::Client, config: &FetchConfig, output: &OutputConfig) -> FetchUnit {
    let page_url = config.logo_page_url.clone();
    let target = output.logo_path();

    FetchUnit::new("logo", async move {
        let path = fetch_logo(&client, &page_url, &target).await?;
        Ok(vec![Field::asset(LOGO_PATH, path)])
    })
}

/// Download the page's infobox image to `target`. Returns `None` when the
/// page has no infobox image.
pub async fn fetch_logo(
    client: &reqwest::Client,
    page_url: &str,
    target: &Path,
) -> Result<Option<PathBuf>> {
    let html = client
        .get(page_url)
        .send()
        .await
        .with_context(|| format!("requesting logo page {}", page_url))?
        .error_for_status()
        .with_context(|| format!("logo page {} returned an error status", page_url))?
        .text()
        .await
        .context("reading logo page body")?;

    let Some(image_url) = extract_logo_url(&html) else {
        debug!("no infobox image found at {}", page_url);
        return Ok(None);
    };

    debug!("downloading logo from {}", image_url);
    let bytes = client
        .get(&image_url)
        .send()
        .await
        .with_context(|| format!("requesting logo image {}", image_url))?
        .error_for_status()
        .with_context(|| format!("logo image {} returned an error status", image_url))?
        .bytes()
        .await
        .context("reading logo image bytes")?;

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }
    tokio::fs::write(target, &bytes)
        .await
        .with_context(|| format!("writing logo to {}", target.display()))?;

    Ok(Some(target.to_path_buf()))
}

/// URL of the first image inside the page's infobox, upgraded to the last
/// (highest-resolution) `srcset` candidate when one is present.
fn extract_logo_url(html: &str) -> Option<String> {
    let infobox_start = html.find("infobox")?;
    let slice = &html[infobox_start..];

    let img = Regex::new(r"(?is)<img[^>]*>").expect("static regex");
    let tag = img.find(slice)?.as_str();

    let src_attr = Regex::new(r#"(?i)\bsrc\s*=\s*"([^"]+)""#).expect("static regex");
    let mut url = src_attr.captures(tag)?[1].to_string();

    let srcset_attr = Regex::new(r#"(?i)\bsrcset\s*=\s*"([^"]+)""#).expect("static regex");
    if let Some(srcset) = srcset_attr.captures(tag) {
        if let Some(candidate) = srcset[1]
            .split(',')
            .filter_map(|entry| entry.split_whitespace().next())
            .last()
        {
            url = candidate.to_string();
        }
    }

    if let Some(stripped) = url.strip_prefix("//") {
        url = format!("https://{}", stripped);
    }
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_logo_url_plain_src() {
        let html = r#"
            <img src="//site.example/header.png">
            <table class="infobox"><tr><td>
              <img src="//upload.example/logo/64px-logo.png" alt="logo">
            </td></tr></table>
        "#;
        assert_eq!(
            extract_logo_url(html),
            Some("https://upload.example/logo/64px-logo.png".to_string())
        );
    }

    #[test]
    fn test_extract_logo_url_prefers_last_srcset_candidate() {
        let html = r#"
            <table class="infobox">
              <img src="//upload.example/64px-logo.png"
                   srcset="//upload.example/96px-logo.png 1.5x, //upload.example/128px-logo.png 2x">
            </table>
        "#;
        assert_eq!(
            extract_logo_url(html),
            Some("https://upload.example/128px-logo.png".to_string())
        );
    }

    #[test]
    fn test_extract_logo_url_absolute_url_untouched() {
        let html = r#"<div class="infobox"><img src="https://cdn.example/logo.svg"></div>"#;
        assert_eq!(
            extract_logo_url(html),
            Some("https://cdn.example/logo.svg".to_string())
        );
    }

    #[test]
    fn test_extract_logo_url_no_infobox() {
        assert_eq!(extract_logo_url(r#"<img src="/a.png">"#), None);
        assert_eq!(extract_logo_url(r#"<table class="infobox"></table>"#), None);
    }
}
