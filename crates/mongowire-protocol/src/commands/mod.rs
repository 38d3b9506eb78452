//! Concrete commands

mod coll_stats;
mod handshake;
mod is_master;
mod list_indexes;
mod ping;
mod repl_set_fresh;

pub use coll_stats::{Capping, CollStatsArgument, CollStatsCommand, CollStatsReply, CollectionSizes, IndexStats};
pub use handshake::{HandshakeArgument, HandshakeCommand};
pub use is_master::{IsMasterCommand, IsMasterReply};
pub use list_indexes::{ListIndexesArgument, ListIndexesCommand, ListIndexesResult};
pub use ping::PingCommand;
pub use repl_set_fresh::{ReplSetFreshArgument, ReplSetFreshCommand, ReplSetFreshReply};
