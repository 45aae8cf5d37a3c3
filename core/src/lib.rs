//! Block extraction, merging, and rendering for Prisma schema fragments.
//!
//! This crate merges schema fragments scattered across a monorepo into one
//! consolidated schema file:
//!
//! - [`extract`] — pulls `model`/`enum`/`type`/`view` blocks out of raw
//!   schema text.
//! - [`strip`] — removes `datasource`/`generator` blocks from package
//!   schemas before extraction.
//! - [`merge_blocks`] — folds blocks into a [`SchemaCollection`] with
//!   first-write-wins conflict resolution, reporting duplicates and
//!   conflicts through a [`MergeReporter`].
//! - [`render`] — serializes the collection back to schema text with
//!   per-block provenance comments.
//! - [`compose`] — the full workflow: enumerate both input directories,
//!   short-circuit on an unchanged content fingerprint, merge, and write.
//!
//! # Example
//!
//! ```
//! use prismerge_core::{extract, merge_blocks, render, ExtractMode, MergeDiagnostics,
//!     MergePolicy, SchemaCollection};
//!
//! let fragment = "model User {\n  id Int @id\n}\n";
//! let package = "model Post {\n  id Int @id\n  author User\n}\n";
//!
//! let mut collection = SchemaCollection::new();
//! let mut diagnostics = MergeDiagnostics::default();
//! for (text, label) in [(fragment, "auth.prisma"), (package, "blog.prisma")] {
//!     let blocks = extract(text, label, ExtractMode::FirstClose);
//!     merge_blocks(&mut collection, blocks, MergePolicy::FirstWins, &mut diagnostics);
//! }
//!
//! let merged = render(&collection);
//! assert!(merged.contains("model User"));
//! assert!(merged.contains("// from blog.prisma"));
//! ```
//!
//! # Crate type
//!
//! This is a library-only crate. The `prismerge-cli` crate provides the
//! `prismerge` binary on top of it.

mod cache;
mod compose;
mod digest;
mod extract;
mod merge;
mod render;
mod strip;
mod types;

pub use cache::{CACHE_FILE_NAME, read_fingerprint, should_skip, write_fingerprint};
pub use compose::{ComposeConfig, ComposeError, ComposeOutcome, SCHEMA_EXTENSION, compose};
pub use digest::{combined_fingerprint, file_digest};
pub use extract::{ExtractMode, extract};
pub use merge::{MergeDiagnostics, MergePolicy, MergeReporter, merge_blocks};
pub use render::render;
pub use strip::strip;
pub use types::{Block, BlockKey, BlockKind, SchemaCollection};
