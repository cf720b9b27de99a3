// src/cli/handlers/register.rs

use anyhow::{Result, anyhow};
use colored::*;

use super::commons::Session;
use crate::cli::args::{RegisterArgs, parse_handler_args};
use crate::core::packages::PackageDb;
use crate::core::registration::Registrar;
use crate::core::registry::LegacyRegistry;
use crate::error::SclError;

/// `scl register <path>...`
///
/// Every path is attempted; the action fails if any of them did.
pub fn handle(args: Vec<String>, session: &Session) -> Result<i32> {
    let register_args: RegisterArgs = parse_handler_args(&args)?;
    let legacy = LegacyRegistry::new(&session.config.conf_dir);
    let db = PackageDb::new(&session.config.rpm_cmd);
    let registrar = Registrar::new(&legacy, &session.config.modules_path, &db);

    let mut first_error: Option<SclError> = None;
    let mut failed = 0;
    for path in &register_args.paths {
        match registrar.register(path) {
            Ok((name, kind)) => {
                println!(
                    "{}",
                    format!(t!("register.success"), name = name.cyan(), kind = format!("{:?}", kind).to_lowercase())
                        .green()
                );
            }
            Err(e) => {
                eprintln!("{}: {}", "Error".red().bold(), e);
                failed += 1;
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        None => Ok(0),
        Some(e) => Err(anyhow!(e).context(format!(t!("register.error.failed_count"), count = failed))),
    }
}
