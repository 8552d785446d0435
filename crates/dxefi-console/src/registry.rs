use std::io;

use thiserror::Error;

use crate::dispatch::{CommandCtx, ControlSignal};

/// Handler invoked when a command dispatches. Receives the argument portion
/// of the input line verbatim (possibly empty) and the session context.
pub type CmdHandler = fn(&str, &mut CommandCtx<'_>) -> io::Result<ControlSignal>;

/// One registered console command.
///
/// Identity is the canonical name; the optional alias is a short synonym.
/// Commands are created once at startup registration and never mutated.
pub struct Command {
    name: String,
    alias: Option<String>,
    handler: CmdHandler,
    help: String,
}

impl Command {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn handler(&self) -> CmdHandler {
        self.handler
    }

    pub fn help(&self) -> &str {
        &self.help
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command name must not be empty")]
    EmptyName,
    #[error("command {0:?} is already registered")]
    DuplicateName(String),
    #[error("alias {0:?} collides with an existing command or alias")]
    AliasCollision(String),
}

/// Insertion-ordered command table with exact-match lookup.
///
/// No two entries may share a name or an alias; a failed registration leaves
/// the table untouched.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new command. Collisions are reported, never fatal: the
    /// caller decides whether a sibling module failing to register is worth
    /// surfacing to the operator.
    pub fn register(
        &mut self,
        name: &str,
        alias: Option<&str>,
        handler: CmdHandler,
        help: &str,
    ) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.lookup(name).is_some() {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        if let Some(alias) = alias {
            if self.lookup(alias).is_some() {
                return Err(RegistryError::AliasCollision(alias.to_string()));
            }
        }
        self.commands.push(Command {
            name: name.to_string(),
            alias: alias.map(str::to_string),
            handler,
            help: help.to_string(),
        });
        Ok(())
    }

    /// Exact match on name or alias; no prefix or fuzzy matching.
    pub fn resolve(&self, token: &str) -> Option<&Command> {
        self.lookup(token)
    }

    /// Registration-ordered view for help rendering.
    pub fn list(&self) -> impl Iterator<Item = (&str, Option<&str>, &str)> {
        self.commands
            .iter()
            .map(|c| (c.name(), c.alias(), c.help()))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn lookup(&self, token: &str) -> Option<&Command> {
        self.commands
            .iter()
            .find(|c| c.name == token || c.alias.as_deref() == Some(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_args: &str, _ctx: &mut CommandCtx<'_>) -> io::Result<ControlSignal> {
        Ok(ControlSignal::Stay)
    }

    #[test]
    fn resolves_by_name_and_alias() {
        let mut reg = CommandRegistry::new();
        reg.register("continue", Some("c"), noop, "Continue running.\n\ncontinue")
            .expect("register");

        let by_name = reg.resolve("continue").expect("name lookup");
        let by_alias = reg.resolve("c").expect("alias lookup");
        assert_eq!(by_name.name(), "continue");
        assert_eq!(by_name.handler(), by_alias.handler());
    }

    #[test]
    fn rejects_empty_name() {
        let mut reg = CommandRegistry::new();
        assert_eq!(
            reg.register("", None, noop, "help"),
            Err(RegistryError::EmptyName)
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn rejects_duplicate_name_and_leaves_registry_unchanged() {
        let mut reg = CommandRegistry::new();
        reg.register("run", Some("r"), noop, "Run.").expect("register");

        assert_eq!(
            reg.register("run", None, noop, "other"),
            Err(RegistryError::DuplicateName("run".to_string()))
        );
        assert_eq!(reg.len(), 1);
        let entries: Vec<_> = reg.list().collect();
        assert_eq!(entries, [("run", Some("r"), "Run.")]);
    }

    #[test]
    fn rejects_alias_colliding_with_name_or_alias() {
        let mut reg = CommandRegistry::new();
        reg.register("run", Some("r"), noop, "Run.").expect("register");

        assert_eq!(
            reg.register("reset", Some("run"), noop, "Reset."),
            Err(RegistryError::AliasCollision("run".to_string()))
        );
        assert_eq!(
            reg.register("restart", Some("r"), noop, "Restart."),
            Err(RegistryError::AliasCollision("r".to_string()))
        );
        // A name may not shadow an existing alias either.
        assert_eq!(
            reg.register("r", None, noop, "R."),
            Err(RegistryError::DuplicateName("r".to_string()))
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn list_preserves_registration_order() {
        let mut reg = CommandRegistry::new();
        reg.register("run", Some("r"), noop, "Run.").expect("register");
        reg.register("quit", Some("q"), noop, "Quit.").expect("register");
        reg.register("info", None, noop, "Info.").expect("register");

        let names: Vec<_> = reg.list().map(|(n, _, _)| n).collect();
        assert_eq!(names, ["run", "quit", "info"]);
    }
}
