//! Serialization of a merged collection back to schema text.

use crate::types::{Block, SchemaCollection};

/// Renders every block in insertion order.
///
/// Each block gets a one-line provenance comment, its header, the body
/// re-indented with two spaces per non-empty line (blank lines stay blank),
/// and the closing delimiter. Blocks are joined with exactly one blank
/// line. The returned text has no trailing newline; the orchestrator owns
/// final assembly (base-file prefix and trailing newline).
///
/// # Examples
///
/// ```
/// use prismerge_core::{render, Block, BlockKind, SchemaCollection};
///
/// let mut collection = SchemaCollection::new();
/// collection.insert(Block::new(BlockKind::Model, "User", "id Int @id", "auth.prisma"));
///
/// assert_eq!(
///     render(&collection),
///     "// from auth.prisma\nmodel User {\n  id Int @id\n}"
/// );
/// ```
pub fn render(collection: &SchemaCollection) -> String {
    collection
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_block(block: &Block) -> String {
    let mut out = String::new();
    out.push_str(&format!("// from {}\n", block.source));
    out.push_str(&format!("{} {} {{\n", block.kind, block.name));
    for line in block.body.lines() {
        let line = line.trim();
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push('}');
    out
}
