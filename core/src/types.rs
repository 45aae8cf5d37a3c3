//! Data model for extracted schema blocks.
//!
//! This module defines the types the merge pipeline operates on: the closed
//! set of block kinds, the [`Block`] unit itself, and the insertion-ordered
//! [`SchemaCollection`] that accumulates blocks across input files.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a content-bearing schema block.
///
/// This is the closed set of block keywords the extractor recognizes.
/// Infrastructure blocks (`datasource`, `generator`) are not block kinds;
/// they are handled by the stripper and never enter a collection.
///
/// # Examples
///
/// ```
/// use prismerge_core::BlockKind;
///
/// assert_eq!(BlockKind::from_keyword("model"), Some(BlockKind::Model));
/// assert_eq!(BlockKind::View.as_keyword(), "view");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// `model` — a table-backed record type.
    Model,
    /// `enum` — a closed value set.
    Enum,
    /// `type` — a composite (embedded) type.
    Type,
    /// `view` — a database view mapping.
    View,
}

impl BlockKind {
    /// All content kinds in declaration-keyword order.
    pub const ALL: [BlockKind; 4] = [
        BlockKind::Model,
        BlockKind::Enum,
        BlockKind::Type,
        BlockKind::View,
    ];

    /// The schema-language keyword for this kind.
    pub fn as_keyword(self) -> &'static str {
        match self {
            BlockKind::Model => "model",
            BlockKind::Enum => "enum",
            BlockKind::Type => "type",
            BlockKind::View => "view",
        }
    }

    /// Parses a declaration keyword into a kind.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "model" => Some(BlockKind::Model),
            "enum" => Some(BlockKind::Enum),
            "type" => Some(BlockKind::Type),
            "view" => Some(BlockKind::View),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_keyword())
    }
}

/// Identity key for a block within one merge run.
///
/// Names are unique per kind, not globally: a `model User` and an
/// `enum User` coexist without conflict.
pub type BlockKey = (BlockKind, String);

/// A named, typed unit of schema content extracted from an input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub name: String,
    /// Interior text of the block, whitespace-normalized per line.
    pub body: String,
    /// Path-like label of the input file that contributed this block.
    pub source: String,
}

impl Block {
    pub fn new(
        kind: BlockKind,
        name: impl Into<String>,
        body: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            body: body.into(),
            source: source.into(),
        }
    }

    /// The (kind, name) identity key.
    pub fn key(&self) -> BlockKey {
        (self.kind, self.name.clone())
    }
}

/// Insertion-ordered mapping from [`BlockKey`] to [`Block`].
///
/// Built incrementally across all input files for one run and discarded
/// afterwards; only its rendered text form is persisted. Iteration order is
/// first-insertion order, which is what the renderer emits.
#[derive(Debug, Clone, Default)]
pub struct SchemaCollection {
    blocks: Vec<Block>,
    index: HashMap<BlockKey, usize>,
}

impl SchemaCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a block, returning `false` if its key was already present
    /// (the collection is left unchanged in that case).
    pub fn insert(&mut self, block: Block) -> bool {
        let key = block.key();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.blocks.len());
        self.blocks.push(block);
        true
    }

    pub fn get(&self, kind: BlockKind, name: &str) -> Option<&Block> {
        self.index
            .get(&(kind, name.to_string()))
            .map(|&i| &self.blocks[i])
    }

    pub fn get_mut(&mut self, kind: BlockKind, name: &str) -> Option<&mut Block> {
        self.index
            .get(&(kind, name.to_string()))
            .map(|&i| &mut self.blocks[i])
    }

    /// Blocks in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Per-kind block totals in keyword order, zero counts suppressed.
    ///
    /// # Examples
    ///
    /// ```
    /// use prismerge_core::{Block, BlockKind, SchemaCollection};
    ///
    /// let mut collection = SchemaCollection::new();
    /// collection.insert(Block::new(BlockKind::Model, "User", "id Int", "a.prisma"));
    /// collection.insert(Block::new(BlockKind::Enum, "Role", "ADMIN", "a.prisma"));
    ///
    /// let counts = collection.kind_counts();
    /// assert_eq!(counts, vec![(BlockKind::Model, 1), (BlockKind::Enum, 1)]);
    /// ```
    pub fn kind_counts(&self) -> Vec<(BlockKind, usize)> {
        BlockKind::ALL
            .iter()
            .map(|&kind| (kind, self.blocks.iter().filter(|b| b.kind == kind).count()))
            .filter(|&(_, count)| count > 0)
            .collect()
    }
}
