//! Command registry
//!
//! Built once at startup and read-only afterwards. Tokens are matched
//! case-insensitively.

use std::collections::HashMap;
use std::fmt;

use bson::Document;
use mongowire_common::config::CommandsConfig;
use mongowire_common::{MongoError, MongoResult};
use tracing::{debug, info, warn};

use crate::command::AnyCommand;
use crate::commands::{
    CollStatsCommand, HandshakeCommand, IsMasterCommand, ListIndexesCommand, PingCommand, ReplSetFreshCommand,
};

pub struct CommandsLibrary {
    commands: HashMap<String, Box<dyn AnyCommand>>,
}

impl CommandsLibrary {
    pub fn builder() -> CommandsLibraryBuilder {
        CommandsLibraryBuilder {
            commands: HashMap::new(),
        }
    }

    /// Every command this crate implements
    pub fn standard() -> Self {
        Self::from_config(&CommandsConfig::default())
    }

    /// The standard commands minus the configured disabled ones
    pub fn from_config(config: &CommandsConfig) -> Self {
        let standard: Vec<Box<dyn AnyCommand>> = vec![
            Box::new(ListIndexesCommand),
            Box::new(CollStatsCommand),
            Box::new(HandshakeCommand),
            Box::new(ReplSetFreshCommand),
            Box::new(PingCommand),
            Box::new(IsMasterCommand),
        ];

        standard
            .into_iter()
            .filter(|command| {
                let disabled = config.is_disabled(command.name());
                if disabled {
                    info!(command = command.name(), "command disabled by configuration");
                }
                !disabled
            })
            .fold(Self::builder(), CommandsLibraryBuilder::register_boxed)
            .build()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&dyn AnyCommand> {
        self.commands.get(&name.to_lowercase()).map(Box::as_ref)
    }

    /// The command named by the first key of `doc` that is a registered token
    pub fn find_command(&self, doc: &Document) -> MongoResult<&dyn AnyCommand> {
        if let Some(command) = doc.keys().find_map(|key| self.find_by_name(key)) {
            debug!(command = command.name(), "command matched");
            return Ok(command);
        }

        let requested = doc.keys().next().map_or("", String::as_str);
        warn!(command = requested, "no registered command matches request");
        Err(MongoError::command_not_supported(requested))
    }

    /// Registered tokens as declared by their commands, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.values().map(|c| c.name()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for CommandsLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandsLibrary").field("commands", &self.names()).finish()
    }
}

pub struct CommandsLibraryBuilder {
    commands: HashMap<String, Box<dyn AnyCommand>>,
}

impl CommandsLibraryBuilder {
    /// # Panics
    ///
    /// If a command with the same case-folded token is already registered.
    #[must_use]
    pub fn register(self, command: impl AnyCommand + 'static) -> Self {
        self.register_boxed(Box::new(command))
    }

    /// # Panics
    ///
    /// If a command with the same case-folded token is already registered.
    #[must_use]
    pub fn register_boxed(mut self, command: Box<dyn AnyCommand>) -> Self {
        let key = command.name().to_lowercase();
        if let Some(existing) = self.commands.get(&key) {
            panic!(
                "duplicate command token '{}': '{}' is already registered",
                command.name(),
                existing.name()
            );
        }
        self.commands.insert(key, command);
        self
    }

    pub fn build(self) -> CommandsLibrary {
        info!(commands = self.commands.len(), "command library built");
        CommandsLibrary {
            commands: self.commands,
        }
    }
}
