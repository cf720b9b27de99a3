// src/cli/dispatcher.rs

use anyhow::Result;

use crate::cli::handlers::{self, commons::Session};
use crate::error::SclError;

/// A command-line action, its aliases and its handler. Handlers return the
/// exit code the process should end with.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &Session) -> Result<i32>,
}

/// Every action `scl` understands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "enable",
        aliases: &["run"],
        handler: handlers::run::handle,
    },
    CommandDefinition {
        name: "list-collections",
        aliases: &[],
        handler: handlers::list_collections::handle,
    },
    CommandDefinition {
        name: "list-enabled",
        aliases: &[],
        handler: handlers::list_enabled::handle,
    },
    CommandDefinition {
        name: "list-packages",
        aliases: &[],
        handler: handlers::list_packages::handle,
    },
    CommandDefinition {
        name: "register",
        aliases: &[],
        handler: handlers::register::handle,
    },
    CommandDefinition {
        name: "deregister",
        aliases: &[],
        handler: handlers::deregister::handle,
    },
    CommandDefinition {
        name: "man",
        aliases: &[],
        handler: handlers::man::handle,
    },
    CommandDefinition {
        name: "load",
        aliases: &["unload"],
        handler: handlers::load::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Routes `args` (the action first) to its handler.
pub fn dispatch(args: Vec<String>, session: &Session) -> Result<i32> {
    log::debug!("Dispatching args: {:?}", args);

    let mut args = args.into_iter();
    let Some(action) = args.next() else {
        return Err(SclError::Input(t!("cli.error.no_action").to_string()).into());
    };
    let rest: Vec<String> = args.collect();

    // `-l`/`--list` predates the explicit actions: alone it lists collections,
    // with arguments it lists their packages.
    let name = match action.as_str() {
        "-l" | "--list" => {
            let replacement = if rest.is_empty() {
                "list-collections"
            } else {
                "list-packages"
            };
            log::warn!("'{}' is deprecated; use '{}' instead.", action, replacement);
            replacement
        }
        other => other,
    };

    let command = find_command(name).ok_or_else(|| {
        SclError::Input(format!(t!("cli.error.unknown_action"), action = action))
    })?;
    (command.handler)(rest, session)
}
