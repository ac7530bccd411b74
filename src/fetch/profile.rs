//! Company profile fetcher.
//!
//! Downloads the configured investor-relations page and extracts the
//! description paragraphs of one section plus the page's tagline heading.
//! The extraction is deliberately narrow: one known page shape, not a
//! general HTML parser.

use crate::config::FetchConfig;
use crate::fetch::{DESCRIPTION, TAGLINE};
use crate::models::CompanyProfile;
use crate::pipeline::{FetchUnit, Field};
use anyhow::{anyhow, Context, Result};
use regex::Regex;

/// Build the gather unit for the company profile.
pub fn unit(client: reqwest::Client, config: &FetchConfig) -> FetchUnit {
    let url = config.profile_url.clone();
    let section = config.profile_section.clone();

    FetchUnit::new("company-profile", async move {
        let profile = fetch_profile(&client, &url, section.as_deref()).await?;

        let mut fields = vec![Field::text(DESCRIPTION, profile.description)];
        if let Some(tagline) = profile.tagline {
            fields.push(Field::text(TAGLINE, tagline));
        }
        Ok(fields)
    })
}

/// Fetch and extract the profile. Fails when the page is unreachable or no
/// description text could be extracted.
pub async fn fetch_profile(
    client: &reqwest::Client,
    url: &str,
    section: Option<&str>,
) -> Result<CompanyProfile> {
    let html = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("requesting profile page {}", url))?
        .error_for_status()
        .with_context(|| format!("profile page {} returned an error status", url))?
        .text()
        .await
        .context("reading profile page body")?;

    let description = extract_description(&html, section)
        .ok_or_else(|| anyhow!("no description section found at {}", url))?;
    let tagline = extract_tagline(&html);

    Ok(CompanyProfile {
        description,
        tagline,
    })
}

/// Paragraph text of the section introduced by the heading matching
/// `section` (or the first `<h2>` when unset), up to the next `<h2>`.
fn extract_description(html: &str, section: Option<&str>) -> Option<String> {
    let heading = Regex::new(r"(?is)<h2[^>]*>(.*?)</h2>").expect("static regex");

    let mut section_start = None;
    for found in heading.captures_iter(html) {
        let matches_marker = match section {
            Some(marker) => strip_tags(&found[1]).contains(marker),
            None => true,
        };
        if matches_marker {
            section_start = Some(found.get(0).map(|m| m.end()).unwrap_or(0));
            break;
        }
    }
    let start = section_start?;

    let rest = &html[start..];
    let end = heading.find(rest).map(|m| m.start()).unwrap_or(rest.len());
    let body = &rest[..end];

    let paragraph = Regex::new(r"(?is)<p[^>]*>(.*?)</p>").expect("static regex");
    let mut description = String::new();
    for cap in paragraph.captures_iter(body) {
        let text = strip_tags(&cap[1]);
        if !text.is_empty() {
            description.push_str(&text);
            description.push('\n');
        }
    }

    let description = description.trim().to_string();
    (!description.is_empty()).then_some(description)
}

/// The page's first non-empty `<h3>` heading, used as the tagline.
fn extract_tagline(html: &str) -> Option<String> {
    let h3 = Regex::new(r"(?is)<h3[^>]*>(.*?)</h3>").expect("static regex");
    let tagline = h3
        .captures_iter(html)
        .map(|cap| strip_tags(&cap[1]))
        .find(|text| !text.is_empty());
    tagline
}

/// Drop tags, decode the handful of entities these pages use, and collapse
/// whitespace.
fn strip_tags(fragment: &str) -> String {
    let tag = Regex::new(r"(?s)<[^>]*>").expect("static regex");
    let text = tag.replace_all(fragment, " ");
    let text = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
