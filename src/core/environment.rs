// src/core/environment.rs

use std::collections::BTreeMap;

use crate::constants::MODULEPATH;
use crate::core::strings;

/// Read-only snapshot of the process environment.
///
/// The engine never reads `std::env` directly: the binary captures the
/// environment once and everything downstream works on this value, which
/// tests build by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Captures the current process environment. Entries that are not valid
    /// UTF-8 are skipped.
    pub fn capture() -> Self {
        Self::from_pairs(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// Builds a snapshot from explicit pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of `name`, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// `MODULEPATH` with `modules_path` guaranteed to be one of its entries.
    ///
    /// Unset or empty becomes `modules_path` alone; otherwise it is appended
    /// when missing. Entries are compared without trailing slashes.
    pub fn module_path_with(&self, modules_path: &str) -> String {
        let wanted = strings::strip_trailing_slashes(modules_path);
        match self.get(MODULEPATH).filter(|v| !v.is_empty()) {
            None => wanted.to_string(),
            Some(current) => {
                let present = strings::split_words(current, ':')
                    .into_iter()
                    .any(|entry| strings::strip_trailing_slashes(entry) == wanted);
                if present {
                    current.to_string()
                } else {
                    format!("{}:{}", current, wanted)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_path_initialised_when_unset() {
        let env = Environment::default();
        assert_eq!(env.module_path_with("/etc/scl/modulefiles"), "/etc/scl/modulefiles");
    }

    #[test]
    fn test_module_path_appended_when_missing() {
        let env = Environment::from_pairs([("MODULEPATH", "/usr/share/Modules/modulefiles")]);
        assert_eq!(
            env.module_path_with("/etc/scl/modulefiles"),
            "/usr/share/Modules/modulefiles:/etc/scl/modulefiles"
        );
    }

    #[test]
    fn test_module_path_untouched_when_present() {
        let env = Environment::from_pairs([("MODULEPATH", "/a:/etc/scl/modulefiles/:/b")]);
        assert_eq!(
            env.module_path_with("/etc/scl/modulefiles"),
            "/a:/etc/scl/modulefiles/:/b"
        );
    }
}
