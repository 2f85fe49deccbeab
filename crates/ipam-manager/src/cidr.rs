//! IPv4 prefix arithmetic
//!
//! All range math runs on `u32` so the top of the address space
//! (255.255.255.255) never wraps. Host counts are `u64` because a /0 holds
//! 2^32 addresses.

use crate::{Error, Result};
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Parse an IPv4 prefix such as `"10.0.0.0/24"`
///
/// Host bits are cleared, so `"10.0.0.5/24"` parses as `10.0.0.0/24`.
/// IPv6 input, a missing prefix length and lengths above 32 are rejected.
pub fn parse_prefix(s: &str) -> Result<Ipv4Net> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::InvalidCidr("empty CIDR".to_string()));
    }
    if s.contains(':') {
        return Err(Error::InvalidCidr(format!("{} is not an IPv4 prefix", s)));
    }

    let (addr, len) = s
        .split_once('/')
        .ok_or_else(|| Error::InvalidCidr(format!("{} is missing a prefix length", s)))?;

    let len: u8 = len
        .parse()
        .map_err(|_| Error::InvalidCidr(format!("{} has an invalid prefix length", s)))?;
    if len > 32 {
        return Err(Error::InvalidCidr(format!(
            "{} has prefix length {} (must be 0-32)",
            s, len
        )));
    }

    let addr = Ipv4Addr::from_str(addr)
        .map_err(|_| Error::InvalidCidr(format!("{} has an invalid address", s)))?;

    Ok(Ipv4Net::new(addr, len)?.trunc())
}

/// Convert an address to its `u32` form
pub const fn addr_to_u32(addr: Ipv4Addr) -> u32 {
    u32::from_be_bytes(addr.octets())
}

/// Convert a `u32` back to an address
pub const fn u32_to_addr(value: u32) -> Ipv4Addr {
    let [a, b, c, d] = value.to_be_bytes();
    Ipv4Addr::new(a, b, c, d)
}

/// Number of addresses spanned by a prefix length
pub const fn address_count(prefix_len: u8) -> u64 {
    1u64 << (32 - prefix_len as u32)
}

/// First address of a prefix
pub fn first_address(net: &Ipv4Net) -> u32 {
    addr_to_u32(net.network())
}

/// Last address of a prefix: `base + 2^(32-bits) - 1`
pub fn last_address(net: &Ipv4Net) -> u32 {
    let span = address_count(net.prefix_len()) - 1;
    // span <= u32::MAX and base is aligned, so the sum stays in range
    first_address(net) + span as u32
}

/// Inclusive `[first, last]` bounds of a prefix
pub fn bounds(net: &Ipv4Net) -> (u32, u32) {
    (first_address(net), last_address(net))
}

/// Whether `addr` lies inside `net`
pub fn contains(net: &Ipv4Net, addr: Ipv4Addr) -> bool {
    let (start, end) = bounds(net);
    let addr = addr_to_u32(addr);
    start <= addr && addr <= end
}

/// Whether every address of `inner` lies inside `outer`
pub fn contains_net(outer: &Ipv4Net, inner: &Ipv4Net) -> bool {
    let (outer_start, outer_end) = bounds(outer);
    let (inner_start, inner_end) = bounds(inner);
    outer_start <= inner_start && inner_end <= outer_end
}

/// Whether two prefixes share at least one address
///
/// Interval test `a_start <= b_end && b_start <= a_end`; symmetric and valid
/// for nested, partial and disjoint ranges.
pub fn overlap(a: &Ipv4Net, b: &Ipv4Net) -> bool {
    let (a_start, a_end) = bounds(a);
    let (b_start, b_end) = bounds(b);
    a_start <= b_end && b_start <= a_end
}

/// Usable host count for a prefix length
///
/// Network and broadcast are excluded for /30 and shorter. /31 and /32 have
/// no reserved addresses and return the full count.
pub const fn usable_hosts(prefix_len: u8) -> u64 {
    let count = address_count(prefix_len);
    if prefix_len <= 30 {
        count - 2
    } else {
        count
    }
}
