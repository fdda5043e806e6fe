use std::collections::HashMap;

/// Decode raw file bytes. Tuner logs are mostly ASCII but some firmware
/// versions write Latin-1 degree signs into the metadata block.
pub fn decode_text(content: Vec<u8>) -> String {
    match String::from_utf8(content) {
        Ok(text) => text,
        // Fallback: treat as latin1 (each byte maps to same Unicode code point)
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

/// Find the 0-based line index of the real CSV header.
///
/// JB4 logs open with metadata blocks of arbitrary shape; the data table
/// begins at the first line whose left-trimmed text starts with `prefix`.
pub fn find_header_line(text: &str, prefix: &str) -> Option<usize> {
    text.lines()
        .position(|line| line.trim_start().starts_with(prefix))
}

/// Byte offset of the start of line `line_index`, or `None` past the end.
pub fn line_offset(text: &str, line_index: usize) -> Option<usize> {
    let mut offset = 0usize;
    for (i, line) in text.split_inclusive('\n').enumerate() {
        if i == line_index {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// Trim a column name and collapse internal runs of whitespace to one space.
pub fn normalize_column_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Set of available column names, looked up case-insensitively after
/// normalization.
#[derive(Debug, Clone, Default)]
pub struct ColumnSet {
    by_key: HashMap<String, String>,
}

impl ColumnSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut by_key = HashMap::new();
        for name in names {
            let normalized = normalize_column_name(name.as_ref());
            // First occurrence wins when a log repeats a column name.
            by_key
                .entry(normalized.to_lowercase())
                .or_insert(normalized);
        }
        Self { by_key }
    }

    /// Return the column name as it appears in the log, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.by_key
            .get(&normalize_column_name(name).to_lowercase())
            .map(String::as_str)
    }

    /// Names sorted for stable diagnostics.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_key.values().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_line_skips_metadata_blocks() {
        let text = "JB4 v2.1\nfirmware,44\n\n  timestamp,RPM,Boost\n0.0,900,1.2\n";
        assert_eq!(find_header_line(text, "timestamp"), Some(3));
        assert_eq!(find_header_line("a,b\n1,2\n", "timestamp"), None);
    }

    #[test]
    fn line_offset_points_at_line_start() {
        let text = "meta\r\ntimestamp,RPM\n0,1\n";
        let offset = line_offset(text, 1).unwrap();
        assert!(text[offset..].starts_with("timestamp"));
        assert_eq!(line_offset(text, 10), None);
    }

    #[test]
    fn column_names_are_collapsed() {
        assert_eq!(normalize_column_name("  ECU   Boost\t"), "ECU Boost");
        assert_eq!(normalize_column_name("RPM"), "RPM");
    }

    #[test]
    fn column_set_lookup_ignores_case_and_spacing() {
        let set = ColumnSet::new(["timestamp", " GPS  Speed ", "RPM"]);
        assert_eq!(set.get("gps speed"), Some("GPS Speed"));
        assert_eq!(set.get("rpm"), Some("RPM"));
        assert_eq!(set.get("Boost"), None);
        assert_eq!(set.sorted_names(), ["GPS Speed", "RPM", "timestamp"]);
    }

    #[test]
    fn latin1_fallback_keeps_degree_sign() {
        let bytes = vec![b'I', b'A', b'T', b' ', 0xB0, b'F'];
        assert_eq!(decode_text(bytes), "IAT \u{00B0}F");
    }
}
