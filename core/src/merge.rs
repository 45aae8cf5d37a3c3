//! Block merging with first-write-wins conflict resolution.
//!
//! [`merge_blocks`] folds extracted blocks into an accumulating
//! [`SchemaCollection`]. Duplicates and conflicts are reported through an
//! injected [`MergeReporter`] rather than printed, so the merge stays pure
//! and the caller decides how diagnostics surface. Merging never fails:
//! conflicts are a recoverable, reported condition.

use crate::types::{Block, SchemaCollection};

/// Conflict resolution behavior.
///
/// The single decision point when two sources define the same (kind, name)
/// key with different bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Keep the first-seen body; the incoming block is discarded. Because
    /// fragments merge before package schemas, fragment definitions win.
    #[default]
    FirstWins,
    /// Replace the stored body and source in place; insertion position is
    /// preserved.
    LastWins,
}

/// Observer for merge diagnostics.
///
/// Implementations must not alter control flow; duplicates and conflicts
/// are informational and never affect the merge result's validity.
pub trait MergeReporter {
    /// Incoming block byte-equals the stored one; it was dropped.
    fn duplicate(&mut self, existing: &Block, incoming: &Block);
    /// Incoming block differs from the stored one; resolution followed the
    /// active [`MergePolicy`].
    fn conflict(&mut self, existing: &Block, incoming: &Block);
    /// Free-form progress notice.
    fn info(&mut self, message: &str);
}

/// Reporter that tallies diagnostics without printing anything. Used by
/// tests and to carry counts into the run outcome.
#[derive(Debug, Clone, Default)]
pub struct MergeDiagnostics {
    pub duplicates: Vec<String>,
    pub conflicts: Vec<String>,
    pub notices: Vec<String>,
}

impl MergeReporter for MergeDiagnostics {
    fn duplicate(&mut self, existing: &Block, incoming: &Block) {
        self.duplicates.push(format!(
            "{} {} from {} already exists (first seen in {})",
            incoming.kind, incoming.name, incoming.source, existing.source
        ));
    }

    fn conflict(&mut self, existing: &Block, incoming: &Block) {
        self.conflicts.push(format!(
            "{} {} defined in both {} and {} with different bodies",
            incoming.kind, incoming.name, existing.source, incoming.source
        ));
    }

    fn info(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

/// Folds `incoming` blocks into `collection`.
///
/// Per block: absent keys are inserted; byte-equal bodies are reported as
/// duplicates and dropped; differing bodies are reported as conflicts and
/// resolved by `policy`.
///
/// # Examples
///
/// ```
/// use prismerge_core::{merge_blocks, Block, BlockKind, MergeDiagnostics, MergePolicy, SchemaCollection};
///
/// let mut collection = SchemaCollection::new();
/// let mut diagnostics = MergeDiagnostics::default();
/// merge_blocks(
///     &mut collection,
///     vec![Block::new(BlockKind::Model, "User", "id Int", "a.prisma")],
///     MergePolicy::FirstWins,
///     &mut diagnostics,
/// );
/// merge_blocks(
///     &mut collection,
///     vec![Block::new(BlockKind::Model, "User", "id String", "b.prisma")],
///     MergePolicy::FirstWins,
///     &mut diagnostics,
/// );
///
/// assert_eq!(collection.get(BlockKind::Model, "User").unwrap().body, "id Int");
/// assert_eq!(diagnostics.conflicts.len(), 1);
/// ```
pub fn merge_blocks(
    collection: &mut SchemaCollection,
    incoming: Vec<Block>,
    policy: MergePolicy,
    reporter: &mut dyn MergeReporter,
) {
    for block in incoming {
        let Some(existing) = collection.get(block.kind, &block.name) else {
            collection.insert(block);
            continue;
        };

        if existing.body == block.body {
            reporter.duplicate(existing, &block);
            continue;
        }

        reporter.conflict(existing, &block);
        match policy {
            MergePolicy::FirstWins => {}
            MergePolicy::LastWins => {
                let entry = collection
                    .get_mut(block.kind, &block.name)
                    .expect("key present, checked above");
                entry.body = block.body;
                entry.source = block.source;
            }
        }
    }
}
