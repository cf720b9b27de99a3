// src/core/packages.rs

//! Package-database queries: which installed packages belong to a collection,
//! and whether a registry entry was installed by a package.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::system::executor::{self, ExecutionError, OutputStream};

/// `rpm --qf` format: a `#`-prefixed NEVRA line, the source package, then one
/// line per capability the package provides.
pub const QUERY_FORMAT: &str =
    "#%{name}-%{version}-%{release}.%{arch}\n%{sourcerpm}\n[%{provides}\n]";

lazy_static! {
    static ref SCL_PROVIDE: Regex = Regex::new(r"^scl-package\((.+)\)$").expect("valid regex");
}

/// One installed package as reported by the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    /// `name-version-release.arch`.
    pub nevra: String,
    /// Source package it was built from.
    pub source_rpm: String,
    /// Capabilities it provides.
    pub provides: Vec<String>,
}

impl PackageRecord {
    /// Whether this package declares itself part of `collection`.
    pub fn provides_collection(&self, collection: &str) -> bool {
        self.provides.iter().any(|p| {
            SCL_PROVIDE
                .captures(p)
                .and_then(|c| c.get(1))
                .is_some_and(|m| m.as_str() == collection)
        })
    }
}

/// Parses the output of a query made with [`QUERY_FORMAT`].
pub fn parse_query_output(output: &str) -> Vec<PackageRecord> {
    let mut records: Vec<PackageRecord> = Vec::new();
    let mut lines = output.lines();
    while let Some(line) = lines.next() {
        if let Some(nevra) = line.strip_prefix('#') {
            records.push(PackageRecord {
                nevra: nevra.to_string(),
                source_rpm: lines.next().unwrap_or_default().to_string(),
                provides: Vec::new(),
            });
        } else if let Some(current) = records.last_mut()
            && !line.is_empty()
        {
            current.provides.push(line.to_string());
        }
    }
    records
}

/// Packages belonging to `collection`: every package built from the same
/// source package as one that provides `scl-package(<collection>)`.
pub fn packages_in_collection<'a>(records: &'a [PackageRecord], collection: &str) -> Vec<&'a str> {
    let sources: BTreeSet<&str> = records
        .iter()
        .filter(|r| r.provides_collection(collection))
        .map(|r| r.source_rpm.as_str())
        .collect();
    records
        .iter()
        .filter(|r| sources.contains(r.source_rpm.as_str()))
        .map(|r| r.nevra.as_str())
        .collect()
}

/// The package-database tool.
#[derive(Debug, Clone)]
pub struct PackageDb {
    program: PathBuf,
}

impl PackageDb {
    /// Queries through `program`, usually `rpm`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Every installed package, in one query.
    pub fn query_all(&self) -> Result<Vec<PackageRecord>> {
        let format = format!("--qf={}", QUERY_FORMAT);
        let output =
            executor::capture_output(&self.program, &["-qa", &format], &[], OutputStream::Stdout)?;
        if output.trim().is_empty() {
            return Err(ExecutionError::EmptyOutput(self.program.display().to_string()).into());
        }
        Ok(parse_query_output(&output))
    }

    /// Whether an installed package owns `path`. A missing tool means nothing
    /// is owned.
    pub fn owns_file(&self, path: &Path) -> Result<bool> {
        let path_str = path.to_string_lossy();
        match executor::run_status(&self.program, &["-qf", path_str.as_ref()], &[], true) {
            Ok(code) => Ok(code == 0),
            Err(ExecutionError::CommandFailed(command, e)) => {
                log::debug!("Ownership check skipped, '{}' failed: {}", command, e);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
