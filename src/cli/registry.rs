//! Command table for the shell: lookup by name or alias, and the topic each
//! command is listed under in `help`.

use std::fmt;

use tracing::warn;

use crate::cli::core::CommandResult;
use crate::cli::shell_context::ShellContext;

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Contract,
    Readings,
    Reports,
    Data,
    Shell,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::Contract,
        Topic::Readings,
        Topic::Reports,
        Topic::Data,
        Topic::Shell,
    ];
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self {
            Topic::Contract => "Contract",
            Topic::Readings => "Readings",
            Topic::Reports => "Reports",
            Topic::Data => "Data and settings",
            Topic::Shell => "Shell",
        };
        f.write_str(title)
    }
}

pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub aliases: &'static [&'static str],
    pub topic: Topic,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            aliases: &[],
            topic: Topic::Shell,
            handler,
        }
    }

    pub fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }
}

/// Commands in registration order.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files `entries` under `topic`. A command whose name or alias is
    /// already taken is skipped.
    pub fn register(&mut self, topic: Topic, entries: impl IntoIterator<Item = CommandEntry>) {
        for mut entry in entries {
            let taken = std::iter::once(entry.name)
                .chain(entry.aliases.iter().copied())
                .find(|name| self.find(name).is_some());
            if let Some(name) = taken {
                warn!(command = entry.name, conflict = name, "duplicate command skipped");
                continue;
            }
            entry.topic = topic;
            self.entries.push(entry);
        }
    }

    pub fn find(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| entry.answers_to(name))
    }

    pub fn entries(&self) -> impl Iterator<Item = &CommandEntry> + '_ {
        self.entries.iter()
    }

    pub fn by_topic(&self, topic: Topic) -> impl Iterator<Item = &CommandEntry> + '_ {
        self.entries.iter().filter(move |entry| entry.topic == topic)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.find(name).map(|entry| entry.handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
        Ok(())
    }

    #[test]
    fn lookup_accepts_aliases_and_any_case() {
        let mut registry = CommandRegistry::new();
        registry.register(
            Topic::Shell,
            [CommandEntry::new("exit", "Leave", "exit", noop).with_aliases(&["quit"])],
        );

        assert_eq!(registry.find("QUIT").map(|entry| entry.name), Some("exit"));
        assert_eq!(registry.find("Exit").map(|entry| entry.topic), Some(Topic::Shell));
        assert!(registry.find("stop").is_none());
    }

    #[test]
    fn duplicate_names_keep_the_first_registration() {
        let mut registry = CommandRegistry::new();
        registry.register(Topic::Readings, [CommandEntry::new("add", "first", "add", noop)]);
        registry.register(
            Topic::Data,
            [
                CommandEntry::new("add", "second", "add", noop),
                CommandEntry::new("backup", "Snapshot", "backup", noop).with_aliases(&["add"]),
            ],
        );

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["add"]);
        assert_eq!(registry.find("add").map(|entry| entry.description), Some("first"));
        assert_eq!(registry.by_topic(Topic::Data).count(), 0);
    }
}
