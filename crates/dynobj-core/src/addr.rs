//! Address codec
//!
//! Canonical representation of gateway address ranges: a closed interval
//! `[begin, end]` of 32-bit integers holding IPv4 addresses in network byte
//! order. User-supplied address expressions are parsed by [`AddrSpec`],
//! which accepts three grammars tried in precedence order: CIDR block
//! (`ADDR/BITS`), explicit range (`ADDR1-ADDR2`), single address (`ADDR`).

use crate::error::{Error, Result};
use std::fmt;
use std::net::Ipv4Addr;

/// Parse dotted-decimal text into a 32-bit host-order integer.
pub fn parse_addr(text: &str) -> Result<u32> {
    text.parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| Error::invalid_address(text))
}

/// Format a 32-bit integer as dotted-decimal text, no leading zeros.
pub fn format_addr(addr: u32) -> String {
    Ipv4Addr::from(addr).to_string()
}

/// A closed interval `[begin, end]` of IPv4 addresses, `begin <= end`.
///
/// The gateway is free to return overlapping or unsorted ranges; those are
/// tolerated as input. Any range this library constructs and sends upholds
/// the `begin <= end` invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddrRange {
    /// First address in the range
    pub begin: u32,
    /// Last address in the range (inclusive)
    pub end: u32,
}

impl AddrRange {
    /// Create a range, normalizing a reversed pair.
    pub fn new(begin: u32, end: u32) -> Self {
        if begin <= end {
            Self { begin, end }
        } else {
            Self { begin: end, end: begin }
        }
    }

    /// Single-address range
    pub fn single(addr: u32) -> Self {
        Self { begin: addr, end: addr }
    }

    /// Parse a `(begin_text, end_text)` pair as produced by the listing
    /// parser.
    pub fn from_texts(begin: &str, end: &str) -> Result<Self> {
        Ok(Self::new(parse_addr(begin)?, parse_addr(end)?))
    }

    /// Whether `addr` falls inside the range.
    pub fn contains(&self, addr: u32) -> bool {
        self.begin <= addr && addr <= self.end
    }

    /// Whether two closed intervals share at least one address.
    pub fn overlaps(&self, other: &AddrRange) -> bool {
        self.begin <= other.end && other.begin <= self.end
    }
}

impl fmt::Display for AddrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.begin == self.end {
            write!(f, "{}", format_addr(self.begin))
        } else {
            write!(f, "{}-{}", format_addr(self.begin), format_addr(self.end))
        }
    }
}

/// A parsed user-supplied address expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrSpec {
    /// `ADDR` — a single address
    Single(u32),
    /// `ADDR1-ADDR2` — an explicit inclusive range
    Range(AddrRange),
    /// `ADDR/BITS` — a CIDR block, expanded to its covered range
    Cidr {
        /// The network address after masking
        network: u32,
        /// Prefix length, `0..=32`
        bits: u32,
    },
}

impl AddrSpec {
    /// Parse an address expression.
    ///
    /// Grammars are tried in this order: CIDR, explicit range, single
    /// address. CIDR expansion zeroes the host bits of the given address,
    /// so `10.2.3.5/31` covers `10.2.3.4-10.2.3.5`.
    pub fn parse(text: &str) -> Result<Self> {
        if let Some((addr_text, bits_text)) = text.split_once('/') {
            let bits: u32 = bits_text
                .parse()
                .map_err(|_| Error::InvalidMask(text.to_owned()))?;
            if bits > 32 {
                return Err(Error::InvalidMask(text.to_owned()));
            }
            let addr = parse_addr(addr_text)?;
            return Ok(Self::Cidr { network: addr & cidr_mask(bits), bits });
        }
        if let Some((begin_text, end_text)) = text.split_once('-') {
            let begin = parse_addr(begin_text)?;
            let end = parse_addr(end_text)?;
            return Ok(Self::Range(AddrRange::new(begin, end)));
        }
        Ok(Self::Single(parse_addr(text)?))
    }

    /// The covered address interval.
    pub fn range(&self) -> AddrRange {
        match *self {
            Self::Single(addr) => AddrRange::single(addr),
            Self::Range(range) => range,
            Self::Cidr { network, bits } => {
                let mask = cidr_mask(bits);
                AddrRange { begin: network & mask, end: (network & mask) | !mask }
            }
        }
    }
}

impl fmt::Display for AddrSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Single(addr) => write!(f, "{}", format_addr(addr)),
            Self::Range(range) => write!(f, "{range}"),
            Self::Cidr { network, bits } => write!(f, "{}/{}", format_addr(network), bits),
        }
    }
}

/// Network mask for a prefix length, `bits` already checked to be `<= 32`.
fn cidr_mask(bits: u32) -> u32 {
    // u64 sidesteps the 1 << 32 overflow at bits == 0
    (!((1u64 << (32 - bits)) - 1)) as u32
}
