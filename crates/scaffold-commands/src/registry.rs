//! In-memory command registry.
//!
//! [`CommandRegistry`] stores commands keyed by name. Inserting a name that
//! is already present replaces the earlier command: when two definition files
//! resolve to the same name, the one loaded last wins.

use std::collections::HashMap;

use tracing::debug;

use crate::command::Command;

/// Commands keyed by name.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a command, returning the one it replaced.
    pub fn insert(&mut self, command: Command) -> Option<Command> {
        let replaced = self.commands.insert(command.name.clone(), command);
        if let Some(previous) = &replaced {
            debug!(command = %previous.name, "command replaced by a later definition");
        }
        replaced
    }

    /// Look up a command by name.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Remove a command, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Command> {
        self.commands.remove(name)
    }

    /// All commands, sorted by name.
    pub fn list(&self) -> Vec<&Command> {
        let mut entries: Vec<&Command> = self.commands.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// All command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Move every command of `other` into this registry; `other` wins on
    /// name clashes.
    pub fn merge(&mut self, other: CommandRegistry) {
        for (_, command) in other.commands {
            self.insert(command);
        }
    }
}

impl FromIterator<Command> for CommandRegistry {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        let mut registry = Self::new();
        for command in iter {
            registry.insert(command);
        }
        registry
    }
}
