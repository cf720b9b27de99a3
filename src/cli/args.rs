// src/cli/args.rs

use clap::Parser;
use std::io::Read;

use crate::core::strings;
use crate::error::{Result, SclError};
use crate::system::script::RunMode;

/// Splices a shebang argument back into the argument list.
///
/// A script starting with `#!/usr/bin/scl enable coll` is started with every
/// word of the shebang in a single argument: `["scl", "enable coll",
/// "./script", ...]`. That argument is split on spaces so the rest of the
/// parser sees `["scl", "enable", "coll", "./script", ...]`.
pub fn expand_shebang(argv: Vec<String>) -> Vec<String> {
    let is_shebang = argv.len() >= 3 && argv.get(1).is_some_and(|a| a.contains(' '));
    if !is_shebang {
        return argv;
    }
    let mut expanded = Vec::with_capacity(argv.len() + 2);
    let mut rest = argv.into_iter();
    expanded.extend(rest.next());
    if let Some(packed) = rest.next() {
        expanded.extend(strings::split_words(&packed, ' ').into_iter().map(str::to_string));
    }
    expanded.extend(rest);
    log::debug!("Shebang arguments expanded to {:?}", expanded);
    expanded
}

/// Arguments of `enable`/`run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// Collections to activate, in order.
    pub collections: Vec<String>,
    /// Shell command run once they are active.
    pub command: String,
    /// Replace this process instead of waiting for a child.
    pub exec: bool,
}

impl RunArgs {
    /// Parses `[-x|--exec] <collection>... <command>` or
    /// `[-x|--exec] <collection>... -- <arg>...`.
    ///
    /// After `--` the first word is used verbatim and the others are quoted.
    /// A command of `-`, or nothing after `--`, is read from `stdin`.
    pub fn parse(mut args: Vec<String>, stdin: &mut dyn Read) -> Result<Self> {
        let exec = match args.iter().position(|a| a == "-x" || a == "--exec") {
            Some(pos) => {
                args.remove(pos);
                true
            }
            None => false,
        };

        let (collections, command) = match args.iter().position(|a| a == "--") {
            Some(pos) => {
                let (collections, rest) = args.split_at(pos);
                let words = rest.get(1..).unwrap_or_default();
                let command = match words.split_first() {
                    None => "-".to_string(),
                    Some((first, others)) => std::iter::once(first.clone())
                        .chain(others.iter().map(|w| strings::wrap_value(w)))
                        .collect::<Vec<_>>()
                        .join(" "),
                };
                (collections.to_vec(), command)
            }
            None => match args.split_last() {
                Some((command, collections)) => (collections.to_vec(), command.clone()),
                None => (Vec::new(), String::new()),
            },
        };

        if collections.is_empty() {
            return Err(SclError::Input(
                "At least one collection and a command are required.".to_string(),
            ));
        }

        let command = if command == "-" {
            read_command(stdin)?
        } else {
            command
        };

        Ok(Self {
            collections,
            command,
            exec,
        })
    }

    /// How the activation script is to be run.
    pub fn mode(&self) -> RunMode {
        if self.exec {
            RunMode::Replace
        } else {
            RunMode::Spawn
        }
    }
}

fn read_command(stdin: &mut dyn Read) -> Result<String> {
    let mut command = String::new();
    stdin
        .read_to_string(&mut command)
        .map_err(|e| SclError::disk("Unable to read the command from", "<stdin>", e))?;
    if command.trim().is_empty() {
        return Err(SclError::Input("No command was given on standard input.".to_string()));
    }
    Ok(command)
}

/// Arguments of `list-packages`.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ListPackagesArgs {
    /// Collections whose packages are listed.
    #[arg(required = true)]
    pub collections: Vec<String>,
}

/// Arguments of `register`.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct RegisterArgs {
    /// Absolute paths of the collections to register.
    #[arg(required = true)]
    pub paths: Vec<String>,
}

/// Arguments of `deregister`.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct DeregisterArgs {
    /// Collections to deregister.
    #[arg(required = true)]
    pub collections: Vec<String>,

    /// Deregister even when the entry was installed by a package.
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments of `man`.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ManArgs {
    /// Collection whose manual page is shown.
    pub collection: String,

    /// Anything after the first collection is ignored.
    #[arg(hide = true)]
    pub ignored: Vec<String>,
}

/// Parses handler arguments with clap, reporting problems as input errors.
pub fn parse_handler_args<T: Parser>(args: &[String]) -> Result<T> {
    T::try_parse_from(args).map_err(|e| {
        let rendered = e.render().to_string();
        let message = rendered
            .trim()
            .trim_start_matches("error: ")
            .to_string();
        SclError::Input(message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn parse(list: &[&str]) -> Result<RunArgs> {
        RunArgs::parse(words(list), &mut std::io::empty())
    }

    #[test]
    fn test_shebang_is_split() {
        let argv = words(&["/usr/bin/scl", "enable coll", "./script.py", "arg"]);
        assert_eq!(
            expand_shebang(argv),
            words(&["/usr/bin/scl", "enable", "coll", "./script.py", "arg"])
        );
    }

    #[test]
    fn test_plain_arguments_are_untouched() {
        let argv = words(&["scl", "enable", "coll", "echo hi"]);
        assert_eq!(expand_shebang(argv.clone()), argv);
        let short = words(&["scl", "two words"]);
        assert_eq!(expand_shebang(short.clone()), short);
    }

    #[test]
    fn test_last_argument_is_the_command() {
        let args = parse(&["collA", "collB", "echo hi"]).unwrap();
        assert_eq!(args.collections, words(&["collA", "collB"]));
        assert_eq!(args.command, "echo hi");
        assert_eq!(args.mode(), RunMode::Spawn);
    }

    #[test]
    fn test_separator_quotes_following_words() {
        let args = parse(&["-x", "collA", "--", "printf", "%s\\n", "a \"b\""]).unwrap();
        assert_eq!(args.collections, words(&["collA"]));
        assert_eq!(args.command, r#"printf "%s\n" "a \"b\"""#);
        assert_eq!(args.mode(), RunMode::Replace);
    }

    #[test]
    fn test_command_from_stdin() {
        let mut input = "make -j4\n".as_bytes();
        let args = RunArgs::parse(words(&["coll", "-"]), &mut input).unwrap();
        assert_eq!(args.command, "make -j4\n");

        let mut input = "ls\n".as_bytes();
        let args = RunArgs::parse(words(&["coll", "--"]), &mut input).unwrap();
        assert_eq!(args.command, "ls\n");
    }

    #[test]
    fn test_missing_collection_is_input_error() {
        assert!(matches!(parse(&["echo hi"]), Err(SclError::Input(_))));
        assert!(matches!(parse(&["--", "echo"]), Err(SclError::Input(_))));
        assert!(matches!(parse(&[]), Err(SclError::Input(_))));
        assert!(matches!(parse(&["coll", "-"]), Err(SclError::Input(_))));
    }

    #[test]
    fn test_deregister_force_flag() {
        let args: DeregisterArgs = parse_handler_args(&words(&["a", "-f", "b"])).unwrap();
        assert!(args.force);
        assert_eq!(args.collections, words(&["a", "b"]));
        assert!(parse_handler_args::<DeregisterArgs>(&[]).is_err());
    }
}
