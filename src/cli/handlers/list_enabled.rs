// src/cli/handlers/list_enabled.rs

use anyhow::Result;

use super::commons::{self, Session};
use crate::core::strings;

/// `scl list-enabled`
pub fn handle(args: Vec<String>, session: &Session) -> Result<i32> {
    commons::expect_no_args("list-enabled", &args)?;
    let enabled = session.with_engine(|engine, _| Ok(engine.enabled(&session.env)))?;
    strings::print_lines(&enabled.union());
    Ok(0)
}
