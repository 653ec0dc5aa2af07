//! IPv4 CIDR arithmetic: address packing, `A.B.C.D/P` parsing and
//! supernet merging of bit-adjacent blocks.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::RoutingError;

/// Longest IPv4 prefix length.
pub const MAX_PREFIX: u8 = 32;

/// Pack an address into a big-endian `u32`.
pub fn to_int(addr: Ipv4Addr) -> u32 {
    u32::from(addr)
}

/// Unpack a big-endian `u32` into an address.
pub fn from_int(bits: u32) -> Ipv4Addr {
    Ipv4Addr::from(bits)
}

/// Netmask for a prefix length, e.g. `/24` → `0xFFFF_FF00`.
pub fn prefix_mask(prefix: u8) -> u32 {
    let host_bits = u32::from(MAX_PREFIX.saturating_sub(prefix));
    u32::MAX.checked_shl(host_bits).unwrap_or(0)
}

/// Parse a dotted-decimal address: exactly four decimal octets in `[0, 255]`.
pub fn parse_address(input: &str) -> Result<Ipv4Addr, RoutingError> {
    let octets: Vec<&str> = input.split('.').collect();
    if octets.len() != 4 {
        return Err(RoutingError::malformed_id(
            input,
            "address must have four dot-separated octets",
        ));
    }

    let mut bytes = [0u8; 4];
    for (slot, octet) in bytes.iter_mut().zip(&octets) {
        if octet.is_empty() || octet.len() > 3 || !octet.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RoutingError::malformed_id(
                input,
                format!("invalid octet {octet:?}"),
            ));
        }
        *slot = octet
            .parse()
            .map_err(|_| RoutingError::malformed_id(input, format!("octet {octet} > 255")))?;
    }
    Ok(Ipv4Addr::from(bytes))
}

/// An IPv4 network identifier in CIDR notation.
///
/// The address is kept exactly as written, host bits included, so two
/// identifiers for the same block that differ in host bits are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cidr {
    addr: Ipv4Addr,
    prefix: u8,
}

impl Cidr {
    /// Build an identifier from its parts. Fails if `prefix > 32`.
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, RoutingError> {
        if prefix > MAX_PREFIX {
            return Err(RoutingError::malformed_id(
                &format!("{addr}/{prefix}"),
                "prefix out of range [0, 32]",
            ));
        }
        Ok(Self { addr, prefix })
    }

    /// Split `A.B.C.D/P` into its address and prefix.
    pub fn parse(id: &str) -> Result<Self, RoutingError> {
        let parts: Vec<&str> = id.split('/').collect();
        if parts.len() != 2 {
            return Err(RoutingError::malformed_id(id, "expected address/prefix"));
        }
        let addr = parse_address(parts[0])?;
        let prefix_str = parts[1];
        if prefix_str.is_empty() || !prefix_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RoutingError::malformed_id(id, "prefix is not a number"));
        }
        let prefix: u8 = prefix_str
            .parse()
            .map_err(|_| RoutingError::malformed_id(id, "prefix out of range [0, 32]"))?;
        if prefix > MAX_PREFIX {
            return Err(RoutingError::malformed_id(id, "prefix out of range [0, 32]"));
        }
        Ok(Self { addr, prefix })
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// The address with host bits cleared, as an integer.
    pub fn base(&self) -> u32 {
        to_int(self.addr) & prefix_mask(self.prefix)
    }

    /// Number of addresses covered by the block (`2^(32-P)`).
    pub fn block_size(&self) -> u64 {
        1u64 << (MAX_PREFIX - self.prefix)
    }

    /// True if no host bits are set.
    pub fn is_aligned(&self) -> bool {
        to_int(self.addr) == self.base()
    }
}

/// Merge two equal-prefix blocks into their `P-1` supernet.
///
/// Succeeds only when the base addresses differ by exactly one block and the
/// lower base sits on a `P-1` boundary. The result is the same whichever
/// order the pair is given in.
pub fn try_merge(a: &Cidr, b: &Cidr) -> Option<Cidr> {
    if a.prefix != b.prefix || a.prefix == 0 {
        return None;
    }

    let (lo, hi) = if a.base() <= b.base() {
        (a.base(), b.base())
    } else {
        (b.base(), a.base())
    };
    if u64::from(hi) - u64::from(lo) != a.block_size() {
        return None;
    }

    let merged_prefix = a.prefix - 1;
    if lo & !prefix_mask(merged_prefix) != 0 {
        return None;
    }

    Some(Cidr {
        addr: from_int(lo),
        prefix: merged_prefix,
    })
}

impl FromStr for Cidr {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cidr::parse(s)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl Serialize for Cidr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cidr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Cidr::parse(&s).map_err(de::Error::custom)
    }
}
