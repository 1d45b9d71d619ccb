/// Parse dataset text into entries, one per line.
///
/// Lines are trimmed; blank lines and `#` comments are skipped. A leading
/// byte order mark is ignored. Duplicates are left for `Dataset::new` to drop.
pub fn parse_dataset(text: &str) -> Vec<String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut entries = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || is_comment_line(line) {
            continue;
        }
        entries.push(line.to_string());
    }

    entries
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with('#')
}
