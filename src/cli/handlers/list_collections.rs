// src/cli/handlers/list_collections.rs

use anyhow::Result;

use super::commons::{self, Session};
use crate::core::strings;

/// `scl list-collections`
pub fn handle(args: Vec<String>, session: &Session) -> Result<i32> {
    commons::expect_no_args("list-collections", &args)?;
    let names = session.with_engine(|engine, _| engine.list_available())?;
    strings::print_lines(&names);
    Ok(0)
}
