//! The merge workflow: enumerate inputs, gate on the fingerprint cache,
//! extract and merge, render, write.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cache;
use crate::digest;
use crate::extract::{ExtractMode, extract};
use crate::merge::{MergePolicy, MergeReporter, merge_blocks};
use crate::render::render;
use crate::strip::strip;
use crate::types::{Block, BlockKind, SchemaCollection};

/// File extension (without dot) of schema input files.
pub const SCHEMA_EXTENSION: &str = "prisma";

/// Typed error for the merge workflow. Conflicts and duplicates are not
/// errors; only configuration problems and I/O failures are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// The fragments directory does not exist.
    #[error("fragments directory not found: {}", .0.display())]
    FragmentsDirMissing(PathBuf),

    /// Neither directory contained a single schema file.
    #[error("no .{SCHEMA_EXTENSION} files found in the fragments or packages directories")]
    NoInputFiles,

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Merge run configuration.
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    /// Directory of fragment files, scanned non-recursively. Must exist.
    pub fragments_dir: PathBuf,
    /// Directory of package schemas, scanned recursively. A missing
    /// directory is treated as an empty set.
    pub packages_dir: PathBuf,
    /// Path of the merged schema file.
    pub output_path: PathBuf,
    /// Rebuild even when the fingerprint matches the cached one.
    pub force: bool,
    /// Conflict resolution policy.
    pub policy: MergePolicy,
    /// Close-delimiter matching behavior for extraction and stripping.
    pub mode: ExtractMode,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            fragments_dir: PathBuf::from("prisma/fragments"),
            packages_dir: PathBuf::from("packages"),
            output_path: PathBuf::from("prisma/schema.prisma"),
            force: false,
            policy: MergePolicy::default(),
            mode: ExtractMode::default(),
        }
    }
}

/// Result of one merge run.
#[derive(Debug, Clone)]
pub struct ComposeOutcome {
    /// True when the cache gate short-circuited; nothing was written.
    pub skipped: bool,
    /// Combined fingerprint of all inputs, fragments then packages.
    pub fingerprint: String,
    pub output_path: PathBuf,
    /// Per-kind block totals of the merged collection, zeroes suppressed.
    /// Empty on a skipped run.
    pub kind_counts: Vec<(BlockKind, usize)>,
    pub duplicates: usize,
    pub conflicts: usize,
}

/// Forwards diagnostics to the caller's reporter while tallying them for
/// the outcome.
struct CountingReporter<'a> {
    inner: &'a mut dyn MergeReporter,
    duplicates: usize,
    conflicts: usize,
}

impl MergeReporter for CountingReporter<'_> {
    fn duplicate(&mut self, existing: &Block, incoming: &Block) {
        self.duplicates += 1;
        self.inner.duplicate(existing, incoming);
    }

    fn conflict(&mut self, existing: &Block, incoming: &Block) {
        self.conflicts += 1;
        self.inner.conflict(existing, incoming);
    }

    fn info(&mut self, message: &str) {
        self.inner.info(message);
    }
}

/// Provenance label for `path`: its position relative to the scanned root,
/// prefixed with the root's own name. Labels never embed the root's
/// location, so identical inputs render identically wherever they live.
fn source_label(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    match root.file_name().and_then(|n| n.to_str()) {
        Some(name) => format!("{name}/{}", rel.display()),
        None => rel.display().to_string(),
    }
}

/// Lists `.prisma` files under `dir`, sorted lexicographically by path.
/// Filesystem enumeration order is never trusted; sorting makes the
/// first-write-wins winner reproducible run-to-run.
fn list_schema_files(dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                if recursive {
                    pending.push(path);
                }
            } else if path.extension().and_then(|e| e.to_str()) == Some(SCHEMA_EXTENSION) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Runs the full merge workflow.
///
/// Fragment files are extracted directly; package schemas are stripped of
/// `datasource`/`generator` blocks first. All fragments merge before any
/// package, each group in sorted path order. Output and cache files are
/// written only after the whole collection renders successfully.
pub fn compose(
    config: &ComposeConfig,
    reporter: &mut dyn MergeReporter,
) -> Result<ComposeOutcome, ComposeError> {
    if !config.fragments_dir.is_dir() {
        return Err(ComposeError::FragmentsDirMissing(
            config.fragments_dir.clone(),
        ));
    }

    let fragment_files = list_schema_files(&config.fragments_dir, false)?;
    let package_files = if config.packages_dir.is_dir() {
        list_schema_files(&config.packages_dir, true)?
    } else {
        tracing::debug!(
            dir = %config.packages_dir.display(),
            "packages directory missing, treating as empty"
        );
        Vec::new()
    };

    if fragment_files.is_empty() && package_files.is_empty() {
        return Err(ComposeError::NoInputFiles);
    }
    tracing::debug!(
        fragments = fragment_files.len(),
        packages = package_files.len(),
        "enumerated schema inputs"
    );

    // Contents in merge order: fragments first, then packages.
    let mut inputs: Vec<(PathBuf, String)> = Vec::new();
    for path in fragment_files.iter().chain(package_files.iter()) {
        let text = fs::read_to_string(path)?;
        inputs.push((path.clone(), text));
    }

    let digests: Vec<[u8; 32]> = inputs
        .iter()
        .map(|(_, text)| digest::file_digest(text.as_bytes()))
        .collect();
    let fingerprint = digest::combined_fingerprint(&digests);

    let output_dir = config
        .output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let persisted = cache::read_fingerprint(&output_dir);
    if cache::should_skip(&fingerprint, persisted.as_deref(), config.force) {
        reporter.info("inputs unchanged, skipping merge");
        return Ok(ComposeOutcome {
            skipped: true,
            fingerprint,
            output_path: config.output_path.clone(),
            kind_counts: Vec::new(),
            duplicates: 0,
            conflicts: 0,
        });
    }

    let mut counting = CountingReporter {
        inner: reporter,
        duplicates: 0,
        conflicts: 0,
    };
    let mut collection = SchemaCollection::new();
    let fragment_count = fragment_files.len();

    for (idx, (path, text)) in inputs.iter().enumerate() {
        let blocks = if idx < fragment_count {
            let label = source_label(&config.fragments_dir, path);
            extract(text, &label, config.mode)
        } else {
            let label = source_label(&config.packages_dir, path);
            let stripped = strip(text, config.mode);
            extract(&stripped, &label, config.mode)
        };
        merge_blocks(&mut collection, blocks, config.policy, &mut counting);
    }

    let rendered = render(&collection);
    let base = base_file_content(config, &inputs[..fragment_count]);

    let final_text = match base {
        Some(base) if !rendered.is_empty() => {
            format!("{}\n\n{rendered}\n", base.trim_end())
        }
        Some(base) => format!("{}\n", base.trim_end()),
        None => format!("{rendered}\n"),
    };

    fs::create_dir_all(&output_dir)?;
    fs::write(&config.output_path, &final_text)?;
    cache::write_fingerprint(&output_dir, &fingerprint)?;
    tracing::debug!(
        output = %config.output_path.display(),
        blocks = collection.len(),
        "wrote merged schema"
    );

    Ok(ComposeOutcome {
        skipped: false,
        fingerprint,
        output_path: config.output_path.clone(),
        kind_counts: collection.kind_counts(),
        duplicates: counting.duplicates,
        conflicts: counting.conflicts,
    })
}

/// Raw content of the distinguished base file: the fragment whose file name
/// equals the output's file name, when present.
fn base_file_content<'a>(
    config: &ComposeConfig,
    fragments: &'a [(PathBuf, String)],
) -> Option<&'a str> {
    let base_name = config.output_path.file_name()?;
    fragments
        .iter()
        .find(|(path, _)| path.file_name() == Some(base_name))
        .map(|(_, text)| text.as_str())
}
