// src/core/target_resolver.rs

//! Turns a raw target URL into the network facts plugins rely on: protocol, host, port,
//! resolved IP, alternative IPs, top domain and internal/external classification.
//!
//! Only IPv4 resolution is supported. A host that does not end up with a four-part dotted
//! address is fatal, including IPv6 literals.

use crate::core::config_store::ConfigStore;
use crate::system::executor::ExecutionError;
use crate::system::host_resolver::HostResolver;
use std::net::Ipv4Addr;
use thiserror::Error;

const DEFAULT_HTTP_PORT: &str = "80";
const DEFAULT_HTTPS_PORT: &str = "443";

#[derive(Error, Debug)]
pub enum TargetError {
    #[error("Cannot parse target URL '{url}'.")]
    MalformedUrl { url: String },
    #[error("Invalid port '{port}' in target URL '{url}'.")]
    InvalidPort { url: String, port: String },
    #[error("Cannot resolve hostname: {hostname}")]
    UnresolvedHost { hostname: String },
    #[error("Cannot resolve hostname: {hostname} ({source})")]
    Lookup {
        hostname: String,
        #[source]
        source: ExecutionError,
    },
}

/// The pieces of a normalized target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// The normalized URL.
    pub url: String,
    /// Scheme without the trailing colon, e.g. `https`.
    pub protocol: String,
    /// `host[:port]` exactly as written.
    pub authority: String,
    pub host: String,
    pub port: String,
}

/// The outcome of resolving a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAddress {
    pub ip: String,
    /// Extra addresses returned by DNS. Informational only.
    pub alternatives: Vec<String>,
}

/// Strips one trailing `/` and prepends `http://` unless the URL already starts with `http`.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.strip_suffix('/').unwrap_or(raw);
    if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// Splits a normalized URL into protocol, host and port.
///
/// The port defaults to 443 for `https` and to 80 otherwise.
pub fn parse_url(url: &str) -> Result<UrlParts, TargetError> {
    let malformed = || TargetError::MalformedUrl {
        url: url.to_string(),
    };

    let mut components = url.split('/');
    let scheme = components.next().ok_or_else(malformed)?;
    let separator = components.next().ok_or_else(malformed)?;
    let authority = components.next().ok_or_else(malformed)?;

    let protocol = scheme.strip_suffix(':').ok_or_else(malformed)?;
    if protocol.is_empty() || !separator.is_empty() || authority.is_empty() {
        return Err(malformed());
    }

    let default_port = if protocol == "https" {
        DEFAULT_HTTPS_PORT
    } else {
        DEFAULT_HTTP_PORT
    };

    // A colon-separated, four-part authority is an IPv6-shaped host without a port.
    let (host, port) = if is_ipv6_shaped(authority) {
        (authority, default_port.to_string())
    } else {
        match authority.split_once(':') {
            Some((host, port)) => {
                if port.parse::<u16>().is_err() {
                    return Err(TargetError::InvalidPort {
                        url: url.to_string(),
                        port: port.to_string(),
                    });
                }
                (host, port.to_string())
            }
            None => (authority, default_port.to_string()),
        }
    };

    if host.is_empty() {
        return Err(malformed());
    }

    Ok(UrlParts {
        url: url.to_string(),
        protocol: protocol.to_string(),
        authority: authority.to_string(),
        host: host.to_string(),
        port,
    })
}

fn is_ipv4_shaped(host: &str) -> bool {
    host.split('.').count() == 4
}

fn is_ipv6_shaped(host: &str) -> bool {
    host.split(':').count() == 4
}

/// Resolves `hostname` to a single IPv4 address.
///
/// IPv4 literals and IPv6-shaped hosts skip the lookup. When DNS returns several
/// addresses the first one is used and the rest are kept as alternatives.
pub fn resolve_host(
    hostname: &str,
    resolver: &dyn HostResolver,
) -> Result<HostAddress, TargetError> {
    let raw = if hostname.parse::<Ipv4Addr>().is_ok() || is_ipv6_shaped(hostname) {
        hostname.to_string()
    } else {
        resolver
            .lookup(hostname)
            .map_err(|source| TargetError::Lookup {
                hostname: hostname.to_string(),
                source,
            })?
    };

    let chunks: Vec<&str> = raw
        .trim()
        .split('\n')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect();

    let (ip, alternatives): (&str, Vec<String>) = match chunks.split_first() {
        Some((first, rest)) => (*first, rest.iter().map(|s| s.to_string()).collect()),
        None => ("", Vec::new()),
    };

    if !alternatives.is_empty() {
        log::info!(
            "{} has several IP addresses: ({}). Choosing first: {}",
            hostname,
            chunks.join(", "),
            ip
        );
    }

    // TODO: accept IPv6 results once output paths and tools handle them.
    if !is_ipv4_shaped(ip) {
        return Err(TargetError::UnresolvedHost {
            hostname: hostname.to_string(),
        });
    }

    log::info!("The IP address for {} is: '{}'", hostname, ip);
    Ok(HostAddress {
        ip: ip.to_string(),
        alternatives,
    })
}

/// `www.example.com` -> `example.com`. Hosts with two labels or fewer, and hosts that
/// are addresses, are their own top domain.
pub fn top_domain(host: &str, ip: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    match labels.split_first() {
        Some((_, rest)) if host != ip && labels.len() > 2 => rest.join("."),
        _ => host.to_string(),
    }
}

/// Derives the URL facts of `target_url` and writes them into the current scope of
/// `store`, which should be the target's own overlay.
pub fn derive_url_settings(
    store: &mut ConfigStore,
    resolver: &dyn HostResolver,
    target_url: &str,
) -> Result<UrlParts, TargetError> {
    let url = normalize_url(target_url);
    store.set("TARGET_URL", url.as_str());

    let parts = parse_url(&url)?;
    store.set("PROTOCOL", parts.protocol.as_str());
    store.set("PORT_NUMBER", parts.port.as_str());
    store.set("HOST_NAME", parts.host.as_str());

    let address = resolve_host(&parts.host, resolver)?;
    store.set("ALTERNATIVE_IPS", address.alternatives.clone());
    store.set("INTERNAL_IP", resolver.is_internal(&address.ip));
    store.set("HOST_IP", address.ip.as_str());

    store.set("IP_URL", url.replacen(&parts.host, &address.ip, 1));
    store.set("TOP_DOMAIN", top_domain(&parts.host, &address.ip));
    store.set("TOP_URL", format!("{}://{}", parts.protocol, parts.authority));

    Ok(parts)
}
