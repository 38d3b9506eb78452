//! Command metrics for mongowire
//!
//! Recorded through the `metrics` facade; installing an exporter is up to
//! the embedding process.

use metrics::counter;

use crate::error::MongoError;

/// Outcome label of a dispatched command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Ok,
    Failed,
}

impl CommandOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandOutcome::Ok => "ok",
            CommandOutcome::Failed => "failed",
        }
    }
}

/// Count one command execution
pub fn record_command(command: &str, outcome: CommandOutcome) {
    counter!(
        "mongowire_commands_total",
        "command" => command.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Count one protocol error by its wire code name
pub fn record_error(error: &MongoError) {
    counter!("mongowire_command_errors_total", "code" => error.code().name()).increment(1);
}
