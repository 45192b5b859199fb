//! Trusted upstream proxies.
//!
//! # Responsibilities
//! - Parse the allow list (`*` or comma-separated IPs / CIDR networks)
//! - Decide whether a peer may set X-Forwarded-* or speak PROXY protocol
//!
//! # Design Decisions
//! - `*` trusts every peer; TLS is expected to end at a trusted upstream
//! - Bare addresses are host networks (/32 or /128)

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error parsing an allow list entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid trusted proxy entry '{0}'")]
pub struct TrustedProxiesError(pub String);

/// Peers trusted to supply forwarding information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustedProxies {
    /// Trust every peer.
    Any,
    /// Trust peers inside any of these networks.
    Networks(Vec<IpNet>),
}

impl TrustedProxies {
    pub fn is_trusted(&self, peer: IpAddr) -> bool {
        match self {
            TrustedProxies::Any => true,
            TrustedProxies::Networks(nets) => nets.iter().any(|net| net.contains(&peer)),
        }
    }
}

impl FromStr for TrustedProxies {
    type Err = TrustedProxiesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut nets = Vec::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if entry == "*" {
                return Ok(TrustedProxies::Any);
            }
            let net = match entry.parse::<IpNet>() {
                Ok(net) => net,
                Err(_) => entry
                    .parse::<IpAddr>()
                    .map(IpNet::from)
                    .map_err(|_| TrustedProxiesError(entry.to_string()))?,
            };
            nets.push(net);
        }
        Ok(TrustedProxies::Networks(nets))
    }
}

impl fmt::Display for TrustedProxies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustedProxies::Any => write!(f, "*"),
            TrustedProxies::Networks(nets) => {
                for (i, net) in nets.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{net}")?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for TrustedProxies {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TrustedProxies {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
