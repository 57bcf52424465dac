//! Zone checks over source trees on disk.

// `expect` is idiomatic in test code for failing fast on precondition violations.
#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use std::fs;
use std::path::{Path, PathBuf};

use architecture_lint::{LintError, lint_crate};
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct CrateTree {
    dir: TempDir,
}

impl CrateTree {
    fn write(&self, relative: &str, contents: &str) {
        let path = self.dir.path().join("src").join(relative);
        let parent = path.parent().expect("source files live in a directory");
        fs::create_dir_all(parent).expect("create module directory");
        fs::write(path, contents).expect("write source file");
    }

    fn violating_files(&self) -> Vec<PathBuf> {
        match lint_crate(self.dir.path()) {
            Ok(()) => Vec::new(),
            Err(LintError::Violations(violations)) => violations
                .into_iter()
                .map(|violation| violation.file)
                .collect(),
            Err(other) => panic!("unexpected lint failure: {other}"),
        }
    }
}

#[fixture]
fn tree() -> CrateTree {
    let tree = CrateTree {
        dir: TempDir::new().expect("create temp dir"),
    };
    tree.write("lib.rs", "pub mod domain; pub mod inbound; pub mod outbound;");
    tree.write(
        "domain/screen.rs",
        "use super::collection_cache::CollectionCache;\n\
         #[cfg(test)] #[path = \"screen_tests.rs\"] mod tests;",
    );
    tree.write(
        "domain/screen_tests.rs",
        "use super::*; use crate::test_support::client::ScriptedResourceClient;",
    );
    tree.write(
        "inbound/cli/commands.rs",
        "use crate::domain::Console; use clap::Parser;",
    );
    tree.write(
        "outbound/http/client.rs",
        "use crate::domain::ports::ResourceClient; use reqwest::Client;",
    );
    tree.write(
        "wiring.rs",
        "use frontend::inbound::cli; use frontend::outbound::http::HttpResourceClient;",
    );
    tree.write("main.rs", "mod wiring; use tracing_subscriber::fmt;");
    tree
}

#[rstest]
fn zoned_tree_passes(tree: CrateTree) {
    lint_crate(tree.dir.path()).expect("tree respects its zones");
}

#[rstest]
fn every_offending_file_is_reported(tree: CrateTree) {
    tree.write(
        "inbound/cli/connect.rs",
        "use crate::outbound::http::HttpResourceClient;",
    );
    tree.write("domain/clock.rs", "pub use crate::test_support::clock::FixedClock;");
    tree.write("notes.txt", "use crate::outbound;");

    assert_eq!(
        tree.violating_files(),
        [
            PathBuf::from("domain/clock.rs"),
            PathBuf::from("inbound/cli/connect.rs"),
        ]
    );
}

#[rstest]
fn stray_top_level_files_are_rejected(tree: CrateTree) {
    tree.write("helpers.rs", "fn f() {}");
    assert!(matches!(
        lint_crate(tree.dir.path()),
        Err(LintError::Unclassified { file }) if file == Path::new("helpers.rs")
    ));
}

#[rstest]
fn missing_source_directories_are_reported() {
    let dir = TempDir::new().expect("create temp dir");
    assert!(matches!(lint_crate(dir.path()), Err(LintError::Io { .. })));
}

#[rstest]
fn frontend_crate_respects_its_zones() {
    let frontend = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../frontend");
    lint_crate(&frontend).expect("frontend sources respect their zones");
}
