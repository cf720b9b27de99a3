// src/cli/handlers/list_packages.rs

use anyhow::Result;
use colored::*;

use super::commons::Session;
use crate::cli::args::{ListPackagesArgs, parse_handler_args};
use crate::core::packages::{self, PackageDb};

/// `scl list-packages <collection>...`
pub fn handle(args: Vec<String>, session: &Session) -> Result<i32> {
    let list_args: ListPackagesArgs = parse_handler_args(&args)?;

    let available = session.with_engine(|engine, _| engine.list_available())?;
    for name in &list_args.collections {
        if !available.contains(name) {
            eprintln!(
                "{}",
                format!(t!("list_packages.warning.not_installed"), name = name).yellow()
            );
        }
    }

    // One query serves every collection.
    let records = PackageDb::new(&session.config.rpm_cmd).query_all()?;
    for name in &list_args.collections {
        for nevra in packages::packages_in_collection(&records, name) {
            println!("{}", nevra);
        }
    }
    Ok(0)
}
