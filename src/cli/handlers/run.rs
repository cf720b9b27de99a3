// src/cli/handlers/run.rs

use anyhow::Result;
use std::io;

use super::commons::Session;
use crate::cli::args::RunArgs;
use crate::system::script::{self, RunMode};

/// `scl enable|run [-x] <collection>... <command>`
pub fn handle(args: Vec<String>, session: &Session) -> Result<i32> {
    let run_args = RunArgs::parse(args, &mut io::stdin().lock())?;
    run_with_collections(
        session,
        &run_args.collections,
        &run_args.command,
        run_args.mode(),
    )
}

/// Activates `collections` and runs `command`, returning its exit code.
pub fn run_with_collections(
    session: &Session,
    collections: &[String],
    command: &str,
    mode: RunMode,
) -> Result<i32> {
    let code = session.with_engine(|engine, _| {
        let plan = engine.prepare(collections, command, &session.env)?;
        log::debug!(
            "Activating {:?}, skipping {:?}",
            plan.context.activated(),
            plan.context.skipped()
        );
        script::run_plan(
            &plan,
            &session.config.shell,
            &session.config.tmp_dir,
            mode,
            &session.cancellation_token,
        )
    })?;
    Ok(code)
}
