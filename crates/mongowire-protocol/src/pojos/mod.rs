//! Value types shared by several commands

mod index_options;
mod member_config;

pub use index_options::{IndexOptions, DEFAULT_INDEX_VERSION};
pub use member_config::MemberConfig;
