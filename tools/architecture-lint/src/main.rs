//! `architecture-lint [FRONTEND_DIR]`: check the `frontend` crate's zones.
//!
//! Without an argument the lint runs against the workspace's `frontend/`.

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let crate_dir = env::args_os().nth(1).map_or_else(
        || Path::new(env!("CARGO_MANIFEST_DIR")).join("../../frontend"),
        PathBuf::from,
    );

    match architecture_lint::lint_crate(&crate_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Err(write_err) = writeln!(io::stderr().lock(), "{err}") {
                drop(write_err);
            }
            ExitCode::FAILURE
        }
    }
}
