//! `host[:port]` addresses used by replication commands

use std::fmt;
use std::str::FromStr;

use mongowire_common::{MongoError, MongoResult};

/// Port assumed by MongoDB when an address carries none
pub const DEFAULT_PORT: u16 = 27017;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostAndPort {
    host: String,
    port: Option<u16>,
}

impl HostAndPort {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port: Some(port),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Parse `host`, `host:port`, `[v6]` or `[v6]:port`
    pub fn parse(input: &str) -> MongoResult<Self> {
        let (host, port) = if let Some(rest) = input.strip_prefix('[') {
            let (host, after) = rest.split_once(']').ok_or_else(|| {
                MongoError::bad_value(format!("Unclosed bracket in host string '{input}'"))
            })?;
            let port = match after {
                "" => None,
                _ => Some(after.strip_prefix(':').ok_or_else(|| {
                    MongoError::bad_value(format!("Unexpected text after ']' in '{input}'"))
                })?),
            };
            (host, port)
        } else {
            match input.matches(':').count() {
                0 => (input, None),
                1 => {
                    let (host, port) = input.split_once(':').unwrap_or((input, ""));
                    (host, Some(port))
                }
                // bare IPv6 literal without port
                _ => (input, None),
            }
        };

        if host.is_empty() {
            return Err(MongoError::bad_value(format!("Empty host in '{input}'")));
        }

        let port = port
            .map(|p| {
                p.parse::<u16>().map_err(|_| {
                    MongoError::bad_value(format!(
                        "Port must be a number between 0 and 65535, found '{p}' in '{input}'"
                    ))
                })
            })
            .transpose()?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl FromStr for HostAndPort {
    type Err = MongoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HostAndPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]", self.host)?;
        } else {
            f.write_str(&self.host)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}
