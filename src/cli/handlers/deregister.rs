// src/cli/handlers/deregister.rs

use anyhow::{Result, anyhow};
use colored::*;

use super::commons::Session;
use crate::cli::args::{DeregisterArgs, parse_handler_args};
use crate::core::packages::PackageDb;
use crate::core::registration::Registrar;
use crate::error::SclError;

/// `scl deregister [-f|--force] <collection>...`
pub fn handle(args: Vec<String>, session: &Session) -> Result<i32> {
    let deregister_args: DeregisterArgs = parse_handler_args(&args)?;
    let db = PackageDb::new(&session.config.rpm_cmd);

    let (failed, first_error) = session.with_engine(|engine, legacy| {
        let registrar = Registrar::new(legacy, &session.config.modules_path, &db);
        let mut first_error: Option<SclError> = None;
        let mut failed = 0;
        for name in &deregister_args.collections {
            match registrar.deregister(engine, name, deregister_args.force) {
                Ok(_) => println!("{}", format!(t!("deregister.success"), name = name.cyan()).green()),
                Err(e) => {
                    eprintln!("{}: {}", "Error".red().bold(), e);
                    failed += 1;
                    first_error.get_or_insert(e);
                }
            }
        }
        Ok((failed, first_error))
    })?;

    match first_error {
        None => Ok(0),
        Some(e) => Err(anyhow!(e).context(format!(t!("deregister.error.failed_count"), count = failed))),
    }
}
