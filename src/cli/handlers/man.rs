// src/cli/handlers/man.rs

use anyhow::Result;

use super::commons::Session;
use super::run::run_with_collections;
use crate::cli::args::{ManArgs, parse_handler_args};
use crate::system::script::RunMode;

/// `scl man <collection>`: the collection's manual page, read with the
/// collection enabled so its `MANPATH` applies.
pub fn handle(args: Vec<String>, session: &Session) -> Result<i32> {
    let man_args: ManArgs = parse_handler_args(&args)?;
    if !man_args.ignored.is_empty() {
        log::warn!("Only the first collection is taken into account.");
    }
    let command = format!("man {}", man_args.collection);
    run_with_collections(
        session,
        std::slice::from_ref(&man_args.collection),
        &command,
        RunMode::Replace,
    )
}
