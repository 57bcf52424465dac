//! Boundary lint for the `frontend` crate.
//!
//! Each file under `frontend/src` belongs to a [`Zone`], decided by its path.
//! A zone may name a fixed set of the library's top-level modules:
//!
//! | zone       | may reach                       |
//! |------------|---------------------------------|
//! | `domain`   | `domain`                        |
//! | `inbound`  | `domain`, `inbound`             |
//! | `outbound` | `domain`, `outbound`            |
//! | wiring     | `domain`, `inbound`, `outbound` |
//!
//! The wiring zone is `main.rs` plus `wiring.rs`, the only place where the
//! command-line front end meets the HTTP adapter. `test_support` may be
//! named from test code only: `#[cfg(test)]` items, test functions and the
//! `<name>_tests.rs` companions. Every zone also keeps clear of the crates
//! that belong to the others, so `reqwest` stays in `outbound` and `clap`
//! stays out of it. `lib.rs` and `test_support` are not checked.
//!
//! Run it with `cargo run -p architecture-lint`.

mod references;
mod zone;

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::references::{Reference, Target};
pub use crate::zone::{Layer, Zone};

/// A rule broken by one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `frontend/src`.
    pub file: PathBuf,
    /// Which rule was broken.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Failure modes of the lint.
#[derive(Debug, Error)]
pub enum LintError {
    /// A directory or file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// A file sits outside every zone.
    #[error("{} belongs to no zone; place it under domain/, inbound/ or outbound/", .file.display())]
    Unclassified {
        /// File path relative to `frontend/src`.
        file: PathBuf,
    },
    /// A file is not valid Rust.
    #[error("failed to parse {}: {message}", .file.display())]
    Parse {
        /// File path relative to `frontend/src`.
        file: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
    /// At least one rule was broken.
    #[error("architecture boundary violations:\n{}", list(.0))]
    Violations(Vec<Violation>),
}

fn list(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| format!("- {violation}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A source file handed to [`lint_sources`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `frontend/src`.
    pub file: PathBuf,
    /// File contents.
    pub contents: String,
}

/// Lint every `.rs` file under `crate_dir/src`.
///
/// # Errors
///
/// Returns read, classification and parse failures, or every violation.
pub fn lint_crate(crate_dir: &Path) -> Result<(), LintError> {
    let sources = collect_sources(&crate_dir.join("src"))?;
    lint_sources(&sources)
}

/// Lint in-memory sources.
///
/// # Errors
///
/// Returns classification and parse failures, or every violation.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), LintError> {
    let mut violations = Vec::new();
    for source in sources {
        let zone = Zone::classify(&source.file).ok_or_else(|| LintError::Unclassified {
            file: source.file.clone(),
        })?;
        if zone == Zone::Exempt {
            continue;
        }
        let parsed = syn::parse_file(&source.contents).map_err(|error| LintError::Parse {
            file: source.file.clone(),
            message: error.to_string(),
        })?;
        let found = references::collect(&source.file, zone.is_library(), &parsed);
        violations.extend(judge(&source.file, zone, &found));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(LintError::Violations(violations))
    }
}

fn judge(file: &Path, zone: Zone, references: &BTreeSet<Reference>) -> Vec<Violation> {
    let messages: BTreeSet<String> = references
        .iter()
        .filter_map(|reference| match &reference.target {
            Target::Layer(Layer::TestSupport)
                if !zone.permits(Layer::TestSupport, reference.in_test) =>
            {
                Some(format!("{zone} production code must not use test_support"))
            }
            Target::Layer(layer) if !zone.permits(*layer, reference.in_test) => {
                Some(format!("{zone} code must not depend on {layer}"))
            }
            Target::Crate(name) if !zone.permits_crate(name) => {
                Some(format!("{zone} code must not use the `{name}` crate"))
            }
            Target::Layer(_) | Target::Crate(_) => None,
        })
        .collect();

    messages
        .into_iter()
        .map(|message| Violation {
            file: file.to_path_buf(),
            message,
        })
        .collect()
}

fn read_failed(path: &Path) -> impl FnOnce(io::Error) -> LintError {
    let owned = path.to_path_buf();
    move |source| LintError::Io {
        path: owned,
        source,
    }
}

fn collect_sources(src_dir: &Path) -> Result<Vec<LintSource>, LintError> {
    let mut pending = vec![src_dir.to_path_buf()];
    let mut sources = Vec::new();
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).map_err(read_failed(&dir))? {
            let path = entry.map_err(read_failed(&dir))?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                let contents = fs::read_to_string(&path).map_err(read_failed(&path))?;
                let file = path
                    .strip_prefix(src_dir)
                    .map_or_else(|_| path.clone(), Path::to_path_buf);
                sources.push(LintSource { file, contents });
            }
        }
    }
    sources.sort_by(|left, right| left.file.cmp(&right.file));
    Ok(sources)
}
