// src/system/host_resolver.rs

use crate::constants::DEFAULT_DNS_LOOKUP_COMMAND;
use crate::system::executor::{self, ExecutionError};
use std::net::IpAddr;

/// Network facts the target resolver delegates to the outside world.
pub trait HostResolver {
    /// Resolves a hostname, returning zero or more newline-separated IP strings.
    fn lookup(&self, hostname: &str) -> Result<String, ExecutionError>;

    /// Returns `true` for loopback, private-range and link-local addresses.
    fn is_internal(&self, ip: &str) -> bool {
        is_internal_ip(ip)
    }
}

/// Classifies an address as internal. Unparseable input is treated as external.
pub fn is_internal_ip(ip: &str) -> bool {
    match ip.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => {
            v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()
        }
        Ok(IpAddr::V6(v6)) => v6.is_loopback() || v6.is_unspecified(),
        Err(_) => false,
    }
}

/// Resolves hostnames by running a lookup command such as `host` and keeping
/// the addresses of its `has address` lines.
#[derive(Debug, Clone)]
pub struct ShellHostResolver {
    command: String,
}

impl ShellHostResolver {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for ShellHostResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DNS_LOOKUP_COMMAND)
    }
}

impl HostResolver for ShellHostResolver {
    fn lookup(&self, hostname: &str) -> Result<String, ExecutionError> {
        let output = executor::execute_and_capture_output(&self.command, &[hostname])?;
        Ok(parse_lookup_output(&output))
    }
}

/// Extracts the IPv4 addresses from `host` output, one per line.
///
/// `example.com has address 93.184.216.34` -> `93.184.216.34`
pub fn parse_lookup_output(output: &str) -> String {
    output
        .lines()
        .filter(|line| line.contains("has address"))
        .filter_map(|line| line.split(' ').nth(3))
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
