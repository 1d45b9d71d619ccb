use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use scheckbl_core::SimilarityResult;

/// Width of the entry column in the terminal rendering of `similar`.
const ENTRY_COLUMN: usize = 50;

pub fn render_found(found: bool) -> String {
    if found {
        "✓ FOUND\nResult: True".to_string()
    } else {
        "✗ NOT FOUND\nResult: False".to_string()
    }
}

pub fn render_entries(entries: &[String]) -> String {
    entries.join("\n")
}

/// Terminal rendering: padded entry column and percentage score.
pub fn render_similar_table(results: &[SimilarityResult], threshold: f64) -> String {
    let mut lines = Vec::with_capacity(results.len() + 2);
    lines.push(format!("Similar entries (threshold: {}):", threshold));
    lines.push("-".repeat(60));
    for result in results {
        lines.push(format!(
            "{:<width$} {:.2}%",
            result.entry,
            result.score * 100.0,
            width = ENTRY_COLUMN
        ));
    }
    lines.join("\n")
}

/// File rendering: one `entry<TAB>score` line per result.
pub fn render_similar_text(results: &[SimilarityResult]) -> String {
    results
        .iter()
        .map(|r| format!("{}\t{:.4}", r.entry, r.score))
        .collect::<Vec<_>>()
        .join("\n")
}

/// JSON rendering: an array of `[entry, score]` pairs.
pub fn render_similar_json(results: &[SimilarityResult]) -> Result<String, String> {
    let pairs: Vec<(&str, f64)> = results.iter().map(SimilarityResult::as_pair).collect();
    serde_json::to_string_pretty(&pairs).map_err(|e| format!("Failed to serialize JSON: {}", e))
}

/// Lowercase slug: runs of characters other than word characters or `-`
/// collapse into `_`, and leading or trailing `_` are removed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut in_gap = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == '-' {
            slug.push(ch);
            in_gap = false;
        } else if !in_gap {
            slug.push('_');
            in_gap = true;
        }
    }

    slug.trim_matches('_').to_lowercase()
}

/// `<slug>_<slug>_..._<YYYY-MM-DD>.<ext>` stamped with today's date.
pub fn auto_filename(parts: &[&str], ext: &str) -> PathBuf {
    auto_filename_on(parts, ext, Local::now().date_naive())
}

pub fn auto_filename_on(parts: &[&str], ext: &str, date: NaiveDate) -> PathBuf {
    let slug = parts
        .iter()
        .map(|part| slugify(part))
        .collect::<Vec<_>>()
        .join("_");
    PathBuf::from(format!("{}_{}.{}", slug, date.format("%Y-%m-%d"), ext))
}

/// Print `content` followed by a newline; nothing at all when it is empty.
pub fn print_content(out: &mut impl Write, content: &str) -> io::Result<()> {
    if content.is_empty() {
        return Ok(());
    }
    writeln!(out, "{content}")
}

pub fn write_output(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
        }
    }
    fs::write(path, content)
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
    Ok(())
}
