//! Tagged route identifiers.
//!
//! A routing table key is either a parsed CIDR network or the opaque
//! `host:port` address of a router. Neighbor-adjacent entries are keyed by
//! the neighbor's address until the neighbor's own network is learned.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cidr::Cidr;
use crate::error::RoutingError;

/// Address of a router (`host:port`). Used as a neighbor key, as a next hop
/// and as the sender of an update.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeerAddr(String);

impl PeerAddr {
    pub fn new(addr: impl Into<String>) -> Result<Self, RoutingError> {
        let addr = addr.into();
        if addr.is_empty() {
            return Err(RoutingError::malformed_id(&addr, "empty peer address"));
        }
        if addr.contains('/') || addr.chars().any(char::is_whitespace) {
            return Err(RoutingError::malformed_id(
                &addr,
                "peer address must be host:port",
            ));
        }
        Ok(Self(addr))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PeerAddr {
    type Error = RoutingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PeerAddr::new(value)
    }
}

impl From<PeerAddr> for String {
    fn from(addr: PeerAddr) -> Self {
        addr.0
    }
}

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of a routing table entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Destination {
    /// A CIDR network, `A.B.C.D/P`.
    Network(Cidr),
    /// A router address used as a route key before its network is known.
    Peer(PeerAddr),
}

impl Destination {
    /// Anything containing `/` must be a valid CIDR; everything else is an
    /// opaque peer address.
    pub fn parse(id: &str) -> Result<Self, RoutingError> {
        if id.contains('/') {
            Cidr::parse(id).map(Destination::Network)
        } else {
            PeerAddr::new(id).map(Destination::Peer)
        }
    }

    pub fn as_network(&self) -> Option<&Cidr> {
        match self {
            Destination::Network(cidr) => Some(cidr),
            Destination::Peer(_) => None,
        }
    }

    pub fn is_peer(&self, addr: &PeerAddr) -> bool {
        matches!(self, Destination::Peer(p) if p == addr)
    }
}

impl From<Cidr> for Destination {
    fn from(cidr: Cidr) -> Self {
        Destination::Network(cidr)
    }
}

impl From<PeerAddr> for Destination {
    fn from(addr: PeerAddr) -> Self {
        Destination::Peer(addr)
    }
}

impl TryFrom<String> for Destination {
    type Error = RoutingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Destination::parse(&value)
    }
}

impl From<Destination> for String {
    fn from(dest: Destination) -> Self {
        dest.to_string()
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Network(cidr) => fmt::Display::fmt(cidr, f),
            Destination::Peer(addr) => fmt::Display::fmt(addr, f),
        }
    }
}

/// Where traffic for a destination is forwarded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NextHop {
    /// Delivered locally; only the router's own network uses this.
    Local,
    /// Forwarded to a directly configured neighbor.
    Via(PeerAddr),
}

impl NextHop {
    pub fn is_via(&self, addr: &PeerAddr) -> bool {
        matches!(self, NextHop::Via(p) if p == addr)
    }
}
