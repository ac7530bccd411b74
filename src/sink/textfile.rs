//! Text file sink: the company description (and tagline, when present) as a
//! plain-text brief.

use crate::fetch::{DESCRIPTION, TAGLINE};
use crate::pipeline::{ResultBag, SinkUnit};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Build the dispatch unit for the text brief.
pub fn unit(bag: &ResultBag, path: PathBuf) -> SinkUnit {
    let description = bag.text(DESCRIPTION).unwrap_or_default().to_string();
    let tagline = bag.text(TAGLINE).map(str::to_string);

    SinkUnit::new("write-text", move || {
        write_description(&path, &description, tagline.as_deref())
    })
}

/// Write the brief and return a summary naming the target.
pub fn write_description(path: &Path, description: &str, tagline: Option<&str>) -> Result<String> {
    let mut contents = String::new();
    if let Some(tagline) = tagline {
        contents.push_str(tagline);
        contents.push_str("\n\n");
    }
    contents.push_str(description);
    contents.push('\n');

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }
    std::fs::write(path, &contents)
        .with_context(|| format!("writing description to {}", path.display()))?;

    Ok(format!(
        "wrote {} bytes of company description to {}",
        contents.len(),
        path.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_description_with_tagline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.txt");

        let summary =
            write_description(&path, "A total beverage company.", Some("Refresh the World."))
                .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Refresh the World.\n\nA total beverage company.\n");
        assert!(summary.contains("brief.txt"));
    }

    #[test]
    fn test_write_description_without_tagline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.txt");

        write_description(&path, "Just the description.", None).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Just the description.\n");
    }

    #[test]
    fn test_write_description_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("brief.txt");

        write_description(&path, "text", None).unwrap();
        assert!(path.exists());
    }
}
