//! Block extraction from raw schema text.
//!
//! The extractor is deliberately not a grammar-correct parser. It scans for
//! block headers (`model User {` and friends) and captures the body up to a
//! closing delimiter, which is all the merge pipeline needs. The default
//! close-matching behavior stops at the first `}` after the opening brace —
//! a body containing a literal `}` before its real close is mis-extracted.
//! That behavior is the compatibility contract; [`ExtractMode::Balanced`]
//! opts into depth-tracked matching instead.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Block, BlockKind};

static CONTENT_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(model|enum|type|view)\s+(\w+)\s*\{").expect("static regex must compile")
});

static INFRA_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(datasource|generator)\s+(\w+)\s*\{").expect("static regex must compile")
});

/// Close-delimiter matching behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Body runs to the first `}` after the opening brace. This is the
    /// compatible default; it mis-extracts bodies containing a literal `}`.
    #[default]
    FirstClose,
    /// Track `{`/`}` depth so nested braces inside a body close correctly.
    Balanced,
}

/// A block located in source text, before any domain interpretation.
pub(crate) struct RawBlock<'a> {
    pub keyword: &'a str,
    pub name: &'a str,
    /// Raw interior between the delimiters, not yet normalized.
    pub body: &'a str,
    /// Byte offset of the header keyword.
    pub start: usize,
    /// Byte offset one past the closing delimiter.
    pub end: usize,
}

/// Finds non-overlapping blocks left-to-right. After each block the scan
/// resumes past its closing delimiter, so headers inside a consumed body
/// are never matched.
pub(crate) fn find_blocks<'a>(
    text: &'a str,
    header: &Regex,
    mode: ExtractMode,
) -> Vec<RawBlock<'a>> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let Some(caps) = header.captures(&text[pos..]) else {
            break;
        };
        let whole = caps.get(0).expect("capture 0 always present");
        let start = pos + whole.start();
        let body_start = pos + whole.end();

        let Some(body_len) = find_close(&text[body_start..], mode) else {
            // Unterminated block; nothing after it can be trusted.
            tracing::warn!(
                keyword = caps.get(1).map(|m| m.as_str()).unwrap_or(""),
                name = caps.get(2).map(|m| m.as_str()).unwrap_or(""),
                "unterminated block, skipping rest of input"
            );
            break;
        };

        let end = body_start + body_len + 1;
        blocks.push(RawBlock {
            keyword: caps.get(1).expect("kind capture").as_str(),
            name: caps.get(2).expect("name capture").as_str(),
            body: &text[body_start..body_start + body_len],
            start,
            end,
        });
        pos = end;
    }

    blocks
}

/// Returns the byte length of the body, i.e. the offset of the closing `}`
/// relative to `rest` (which starts just past the opening brace).
fn find_close(rest: &str, mode: ExtractMode) -> Option<usize> {
    match mode {
        ExtractMode::FirstClose => rest.find('}'),
        ExtractMode::Balanced => {
            let mut depth = 1usize;
            for (idx, ch) in rest.char_indices() {
                match ch {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(idx);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
    }
}

/// Trims every line and drops leading/trailing blank lines; interior blank
/// lines survive so rendered bodies keep their grouping.
pub(crate) fn normalize_body(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().map(str::trim).collect();
    let first = lines.iter().position(|l| !l.is_empty());
    let Some(first) = first else {
        return String::new();
    };
    let last = lines.iter().rposition(|l| !l.is_empty()).unwrap_or(first);
    lines[first..=last].join("\n")
}

/// Extracts every content block from `text`, in source order.
///
/// `source_label` is recorded on each block for provenance annotation and
/// conflict diagnostics. Identifier validation is word characters only;
/// field-level syntax inside bodies is never inspected.
///
/// # Examples
///
/// ```
/// use prismerge_core::{extract, BlockKind, ExtractMode};
///
/// let text = "model User {\n  id Int @id\n}\n\nenum Role {\n  ADMIN\n}\n";
/// let blocks = extract(text, "app.prisma", ExtractMode::FirstClose);
/// assert_eq!(blocks.len(), 2);
/// assert_eq!(blocks[0].kind, BlockKind::Model);
/// assert_eq!(blocks[0].body, "id Int @id");
/// assert_eq!(blocks[1].name, "Role");
/// ```
pub fn extract(text: &str, source_label: &str, mode: ExtractMode) -> Vec<Block> {
    find_blocks(text, &CONTENT_HEADER_RE, mode)
        .into_iter()
        .filter_map(|raw| {
            let kind = BlockKind::from_keyword(raw.keyword)?;
            Some(Block::new(
                kind,
                raw.name,
                normalize_body(raw.body),
                source_label,
            ))
        })
        .collect()
}

pub(crate) fn infra_header_re() -> &'static Regex {
    &INFRA_HEADER_RE
}
