use std::fs;
use std::path::PathBuf;

use prismerge_core::{
    CACHE_FILE_NAME, ComposeConfig, ComposeError, MergeDiagnostics, compose,
};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "prismerge_pipeline_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Standard layout: fragments/, packages/, out/; returns a ready config.
fn setup(dir: &TempDir) -> ComposeConfig {
    fs::create_dir_all(dir.join("fragments")).unwrap();
    fs::create_dir_all(dir.join("packages")).unwrap();
    ComposeConfig {
        fragments_dir: dir.join("fragments"),
        packages_dir: dir.join("packages"),
        output_path: dir.join("out/schema.prisma"),
        ..ComposeConfig::default()
    }
}

#[test]
fn merges_fragments_and_packages_into_output() {
    let dir = TempDir::new("merge_basic");
    let config = setup(&dir);
    fs::write(
        dir.join("fragments/auth.prisma"),
        "model User {\n  id Int @id\n}\n",
    )
    .unwrap();
    fs::write(
        dir.join("packages/blog.prisma"),
        "model Post {\n  id Int @id\n}\n\nenum Status {\n  DRAFT\n  PUBLISHED\n}\n",
    )
    .unwrap();

    let mut diagnostics = MergeDiagnostics::default();
    let outcome = compose(&config, &mut diagnostics).expect("compose failed");

    assert!(!outcome.skipped);
    assert_eq!(outcome.fingerprint.len(), 64);

    let merged = fs::read_to_string(&config.output_path).unwrap();
    assert!(merged.contains("model User {"));
    assert!(merged.contains("model Post {"));
    assert!(merged.contains("enum Status {"));
    assert!(merged.contains("// from"));
    assert!(merged.ends_with('\n'));

    let cache = fs::read_to_string(dir.join("out").join(CACHE_FILE_NAME)).unwrap();
    assert_eq!(cache, outcome.fingerprint);
}

#[test]
fn second_run_hits_cache_and_touches_nothing() {
    let dir = TempDir::new("cache_hit");
    let config = setup(&dir);
    fs::write(dir.join("fragments/a.prisma"), "model A {\n  id Int\n}\n").unwrap();

    let mut diagnostics = MergeDiagnostics::default();
    compose(&config, &mut diagnostics).unwrap();

    // Clobber the output; a cache hit must leave the sentinel in place.
    fs::write(&config.output_path, "sentinel").unwrap();

    let outcome = compose(&config, &mut diagnostics).unwrap();
    assert!(outcome.skipped);
    assert_eq!(fs::read_to_string(&config.output_path).unwrap(), "sentinel");
    assert!(diagnostics.notices.iter().any(|n| n.contains("unchanged")));
}

#[test]
fn force_rebuilds_despite_matching_fingerprint() {
    let dir = TempDir::new("force");
    let mut config = setup(&dir);
    fs::write(dir.join("fragments/a.prisma"), "model A {\n  id Int\n}\n").unwrap();

    let mut diagnostics = MergeDiagnostics::default();
    compose(&config, &mut diagnostics).unwrap();
    fs::write(&config.output_path, "sentinel").unwrap();

    config.force = true;
    let outcome = compose(&config, &mut diagnostics).unwrap();
    assert!(!outcome.skipped);
    let merged = fs::read_to_string(&config.output_path).unwrap();
    assert!(merged.contains("model A {"));
    // Cache file is rewritten even under force.
    let cache = fs::read_to_string(dir.join("out").join(CACHE_FILE_NAME)).unwrap();
    assert_eq!(cache, outcome.fingerprint);
}

#[test]
fn changed_input_invalidates_cache() {
    let dir = TempDir::new("invalidate");
    let config = setup(&dir);
    let input = dir.join("fragments/a.prisma");
    fs::write(&input, "model A {\n  id Int\n}\n").unwrap();

    let mut diagnostics = MergeDiagnostics::default();
    let first = compose(&config, &mut diagnostics).unwrap();

    fs::write(&input, "model A {\n  id String\n}\n").unwrap();
    let second = compose(&config, &mut diagnostics).unwrap();

    assert!(!second.skipped);
    assert_ne!(first.fingerprint, second.fingerprint);
    let merged = fs::read_to_string(&config.output_path).unwrap();
    assert!(merged.contains("id String"));
}

#[test]
fn missing_fragments_dir_is_fatal() {
    let dir = TempDir::new("no_fragments");
    let config = ComposeConfig {
        fragments_dir: dir.join("does-not-exist"),
        packages_dir: dir.join("packages"),
        output_path: dir.join("out/schema.prisma"),
        ..ComposeConfig::default()
    };

    let mut diagnostics = MergeDiagnostics::default();
    let err = compose(&config, &mut diagnostics).unwrap_err();
    assert!(matches!(err, ComposeError::FragmentsDirMissing(_)));
    assert!(!config.output_path.exists(), "no partial output on error");
}

#[test]
fn zero_input_files_is_fatal() {
    let dir = TempDir::new("no_inputs");
    let config = setup(&dir);
    fs::write(dir.join("fragments/readme.txt"), "not a schema").unwrap();

    let mut diagnostics = MergeDiagnostics::default();
    let err = compose(&config, &mut diagnostics).unwrap_err();
    assert!(matches!(err, ComposeError::NoInputFiles));
}

#[test]
fn missing_packages_dir_is_treated_as_empty() {
    let dir = TempDir::new("no_packages");
    let config = ComposeConfig {
        fragments_dir: dir.join("fragments"),
        packages_dir: dir.join("not-there"),
        output_path: dir.join("out/schema.prisma"),
        ..ComposeConfig::default()
    };
    fs::create_dir_all(dir.join("fragments")).unwrap();
    fs::write(dir.join("fragments/a.prisma"), "model A {\n  id Int\n}\n").unwrap();

    let mut diagnostics = MergeDiagnostics::default();
    let outcome = compose(&config, &mut diagnostics).unwrap();
    assert!(!outcome.skipped);
}

#[test]
fn packages_are_stripped_of_infrastructure_blocks() {
    let dir = TempDir::new("strip_packages");
    let config = setup(&dir);
    fs::write(dir.join("fragments/a.prisma"), "model A {\n  id Int\n}\n").unwrap();
    fs::write(
        dir.join("packages/svc.prisma"),
        "datasource db {\n  provider = \"postgresql\"\n}\n\ngenerator client {\n  provider = \"prisma-client-js\"\n}\n\nmodel Post {\n  id Int @id\n}\n",
    )
    .unwrap();

    let mut diagnostics = MergeDiagnostics::default();
    compose(&config, &mut diagnostics).unwrap();

    let merged = fs::read_to_string(&config.output_path).unwrap();
    assert!(merged.contains("model Post {"));
    assert!(!merged.contains("datasource"));
    assert!(!merged.contains("generator"));
}

#[test]
fn fragment_wins_conflict_against_package() {
    let dir = TempDir::new("conflict_policy");
    let config = setup(&dir);
    fs::write(
        dir.join("fragments/a.prisma"),
        "model User {\n  id Int\n}\n",
    )
    .unwrap();
    fs::write(
        dir.join("packages/b.prisma"),
        "model User {\n  id String\n}\n",
    )
    .unwrap();

    let mut diagnostics = MergeDiagnostics::default();
    let outcome = compose(&config, &mut diagnostics).unwrap();

    assert_eq!(outcome.conflicts, 1);
    let merged = fs::read_to_string(&config.output_path).unwrap();
    assert!(merged.contains("id Int"));
    assert!(!merged.contains("id String"), "losing body must not appear");
    assert_eq!(diagnostics.conflicts.len(), 1);
    assert!(diagnostics.conflicts[0].contains("a.prisma"));
    assert!(diagnostics.conflicts[0].contains("b.prisma"));
}

#[test]
fn base_file_is_prepended_verbatim() {
    let dir = TempDir::new("base_file");
    let config = setup(&dir);
    fs::write(
        dir.join("fragments/schema.prisma"),
        "datasource db {\n  provider = \"postgresql\"\n  url = env(\"DATABASE_URL\")\n}\n",
    )
    .unwrap();
    fs::write(
        dir.join("fragments/auth.prisma"),
        "model User {\n  id Int @id\n}\n",
    )
    .unwrap();

    let mut diagnostics = MergeDiagnostics::default();
    compose(&config, &mut diagnostics).unwrap();

    let merged = fs::read_to_string(&config.output_path).unwrap();
    assert!(merged.starts_with("datasource db {"));
    // Blank line between base content and rendered blocks.
    assert!(merged.contains("}\n\n// from"));
    assert!(merged.contains("model User {"));
}

#[test]
fn two_runs_over_identical_inputs_are_byte_identical() {
    let write_inputs = |dir: &TempDir| {
        fs::write(
            dir.join("fragments/a.prisma"),
            "model A {\n  id Int\n}\n\nview Recent {\n  id Int\n}\n",
        )
        .unwrap();
        fs::create_dir_all(dir.join("packages/svc")).unwrap();
        fs::write(
            dir.join("packages/svc/schema.prisma"),
            "enum Role {\n  ADMIN\n}\n",
        )
        .unwrap();
    };

    let dir_a = TempDir::new("determinism_a");
    let config_a = setup(&dir_a);
    write_inputs(&dir_a);
    let dir_b = TempDir::new("determinism_b");
    let config_b = setup(&dir_b);
    write_inputs(&dir_b);

    let mut diagnostics = MergeDiagnostics::default();
    let outcome_a = compose(&config_a, &mut diagnostics).unwrap();
    let outcome_b = compose(&config_b, &mut diagnostics).unwrap();

    assert_eq!(outcome_a.fingerprint, outcome_b.fingerprint);
    assert_eq!(
        fs::read_to_string(&config_a.output_path).unwrap(),
        fs::read_to_string(&config_b.output_path).unwrap()
    );
}

#[test]
fn outcome_reports_zero_suppressed_kind_counts() {
    let dir = TempDir::new("kind_counts");
    let config = setup(&dir);
    fs::write(
        dir.join("fragments/a.prisma"),
        "model A {\n  id Int\n}\nmodel B {\n  id Int\n}\nmodel C {\n  id Int\n}\nenum E {\n  X\n}\nview V1 {\n  id Int\n}\nview V2 {\n  id Int\n}\n",
    )
    .unwrap();

    let mut diagnostics = MergeDiagnostics::default();
    let outcome = compose(&config, &mut diagnostics).unwrap();

    use prismerge_core::BlockKind;
    assert_eq!(
        outcome.kind_counts,
        vec![
            (BlockKind::Model, 3),
            (BlockKind::Enum, 1),
            (BlockKind::View, 2),
        ]
    );
}
