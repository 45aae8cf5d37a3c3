//! Removal of infrastructure blocks from package schemas.

use crate::extract::{ExtractMode, find_blocks, infra_header_re};

/// Removes every `datasource` and `generator` block from `text`.
///
/// Uses the same delimiter policy as the extractor. Only the block spans
/// themselves are removed; surrounding text, including blank regions left
/// where blocks sat, is untouched.
///
/// # Examples
///
/// ```
/// use prismerge_core::{strip, ExtractMode};
///
/// let text = "datasource db {\n  provider = \"postgresql\"\n}\n\nmodel Post {\n  id Int\n}\n";
/// let stripped = strip(text, ExtractMode::FirstClose);
/// assert!(!stripped.contains("datasource"));
/// assert!(stripped.contains("model Post"));
/// ```
pub fn strip(text: &str, mode: ExtractMode) -> String {
    let spans: Vec<(usize, usize)> = find_blocks(text, infra_header_re(), mode)
        .into_iter()
        .map(|raw| (raw.start, raw.end))
        .collect();

    if spans.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for (start, end) in spans {
        out.push_str(&text[pos..start]);
        pos = end;
    }
    out.push_str(&text[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_removes_datasource_and_generator() {
        let text = "datasource db {\n  provider = \"postgresql\"\n  url = env(\"DATABASE_URL\")\n}\n\ngenerator client {\n  provider = \"prisma-client-js\"\n}\n\nmodel Post {\n  id Int @id\n}\n";
        let stripped = strip(text, ExtractMode::FirstClose);
        assert!(!stripped.contains("datasource"));
        assert!(!stripped.contains("generator"));
        assert!(stripped.contains("model Post {\n  id Int @id\n}"));
    }

    #[test]
    fn test_strip_leaves_blank_regions_uncompacted() {
        let text = "model A {\n  id Int\n}\n\ngenerator client {\n  provider = \"x\"\n}\n\nmodel B {\n  id Int\n}\n";
        let stripped = strip(text, ExtractMode::FirstClose);
        // The blank lines that framed the generator block remain.
        assert_eq!(stripped, "model A {\n  id Int\n}\n\n\n\nmodel B {\n  id Int\n}\n");
    }

    #[test]
    fn test_strip_without_infra_blocks_is_identity() {
        let text = "model A {\n  id Int\n}\n";
        assert_eq!(strip(text, ExtractMode::FirstClose), text);
    }

    #[test]
    fn test_strip_empty_input() {
        assert_eq!(strip("", ExtractMode::FirstClose), "");
    }
}
