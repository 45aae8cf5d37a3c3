//! Fingerprint persistence and the rebuild-skip decision.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reserved name of the cache file, co-located with the merged output.
pub const CACHE_FILE_NAME: &str = ".prismerge-fingerprint";

fn cache_path(output_dir: &Path) -> PathBuf {
    output_dir.join(CACHE_FILE_NAME)
}

/// Reads the persisted fingerprint from `output_dir`. Absent or unreadable
/// cache files read as `None` (first run, or cleaned output directory).
pub fn read_fingerprint(output_dir: &Path) -> Option<String> {
    let raw = fs::read_to_string(cache_path(output_dir)).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Persists `fingerprint` to `output_dir`, exactly the hex string with no
/// trailing newline. Called after every successful merge, forced or not.
pub fn write_fingerprint(output_dir: &Path, fingerprint: &str) -> io::Result<()> {
    fs::write(cache_path(output_dir), fingerprint)
}

/// True iff the run can skip merging: not forced, a persisted fingerprint
/// exists, and it byte-equals the current one.
pub fn should_skip(current: &str, persisted: Option<&str>, force: bool) -> bool {
    !force && persisted == Some(current)
}
