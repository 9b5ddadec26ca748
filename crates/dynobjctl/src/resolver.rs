//! Hostname resolution with a per-run cache
//!
//! Each hostname is resolved at most once per invocation; an object whose
//! host list repeats a name (or whose names resolve to overlapping address
//! sets) still produces a deduplicated address list.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use tracing::debug;

/// Caching IPv4 resolver.
#[derive(Default)]
pub struct Resolver {
    cache: HashMap<String, Vec<Ipv4Addr>>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve one hostname, memoized. Dotted-decimal input short-circuits
    /// the lookup.
    pub async fn resolve(&mut self, host: &str) -> Result<Vec<Ipv4Addr>> {
        if let Some(addrs) = self.cache.get(host) {
            return Ok(addrs.clone());
        }

        let addrs: Vec<Ipv4Addr> = if let Ok(addr) = host.parse::<Ipv4Addr>() {
            vec![addr]
        } else {
            tokio::net::lookup_host((host, 0))
                .await
                .with_context(|| format!("resolving {host:?}"))?
                .filter_map(|sock| match sock.ip() {
                    IpAddr::V4(v4) => Some(v4),
                    IpAddr::V6(_) => None,
                })
                .collect()
        };

        debug!(host, addresses = ?addrs, "resolved");
        self.cache.insert(host.to_owned(), addrs.clone());
        Ok(addrs)
    }

    /// Resolve a host list into a sorted, deduplicated address list.
    pub async fn resolve_all(&mut self, hosts: &[String]) -> Result<Vec<Ipv4Addr>> {
        let mut addrs = Vec::new();
        for host in hosts {
            addrs.extend(self.resolve(host).await?);
        }
        addrs.sort();
        addrs.dedup();
        Ok(addrs)
    }
}
