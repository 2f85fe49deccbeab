//! Candidate sub-block enumeration
//!
//! A /8 split into /32s is 16,777,216 blocks. Block counts are computed
//! analytically and only the requested window is materialized, so cost
//! tracks the window size rather than the address space.

use crate::cidr::{address_count, bounds, first_address, overlap, parse_prefix, u32_to_addr, usable_hosts};
use crate::models::{BlockInfo, BlockStatus, Pool};
use crate::{Error, Result};
use ipnet::Ipv4Net;
use serde::Serialize;

/// One window of sub-blocks of a parent prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetWindow {
    /// Blocks in the window, in address order
    pub blocks: Vec<Ipv4Net>,
    /// Usable hosts in each block
    pub hosts_per_block: u64,
    /// Total blocks of this size in the parent
    pub total_blocks: u64,
}

/// Enumerate `/new_prefix_len` blocks of `parent_cidr` in `[offset, offset + limit)`
///
/// A `limit` of 0 returns every block. Callers must bound that themselves for
/// large ranges.
pub fn compute_subnets_window(
    parent_cidr: &str,
    new_prefix_len: u8,
    offset: u64,
    limit: u64,
) -> Result<SubnetWindow> {
    let parent = parse_prefix(parent_cidr)?;
    window_of(&parent, new_prefix_len, offset, limit)
}

/// [`compute_subnets_window`] over an already parsed parent
pub fn window_of(parent: &Ipv4Net, new_prefix_len: u8, offset: u64, limit: u64) -> Result<SubnetWindow> {
    if new_prefix_len < parent.prefix_len() || new_prefix_len > 32 {
        return Err(Error::InvalidCidr(format!(
            "prefix length /{} must be between /{} and /32 for {}",
            new_prefix_len,
            parent.prefix_len(),
            parent
        )));
    }

    let total_blocks = 1u64 << (new_prefix_len - parent.prefix_len());
    let block_size = address_count(new_prefix_len);
    let base = u64::from(first_address(parent));

    let start = offset.min(total_blocks);
    let end = if limit == 0 {
        total_blocks
    } else {
        start.saturating_add(limit).min(total_blocks)
    };

    let blocks = (start..end)
        .map(|index| {
            // base + index * block_size never exceeds u32::MAX for index < total_blocks
            let addr = u32_to_addr((base + index * block_size) as u32);
            Ipv4Net::new(addr, new_prefix_len)
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    tracing::debug!(
        parent = %parent,
        new_prefix_len,
        total_blocks,
        returned = blocks.len(),
        "Computed subnet window"
    );

    Ok(SubnetWindow {
        blocks,
        hosts_per_block: usable_hosts(new_prefix_len),
        total_blocks,
    })
}

/// Label each block against the parent's direct children
///
/// Exact matches are `Used`, other overlaps are `ExistsElsewhere`, the rest
/// are `Free`. An exact match wins over an overlap with another child.
pub fn classify_blocks(blocks: &[Ipv4Net], children: &[Pool]) -> Result<Vec<BlockInfo>> {
    let parsed = parse_children(children)?;

    Ok(blocks
        .iter()
        .map(|block| {
            let text = block.to_string();
            let exact = parsed.iter().find(|(_, child)| child.cidr == text);
            let status = match exact {
                Some((_, child)) => BlockStatus::Used {
                    pool_id: child.id,
                    pool_name: child.name.clone(),
                    account_id: child.account_id,
                },
                None => match parsed.iter().find(|(net, _)| overlap(block, net)) {
                    Some((_, child)) => BlockStatus::ExistsElsewhere {
                        pool_id: child.id,
                        pool_cidr: child.cidr.clone(),
                    },
                    None => BlockStatus::Free,
                },
            };
            BlockInfo {
                cidr: text,
                hosts: usable_hosts(block.prefix_len()),
                status,
            }
        })
        .collect())
}

/// First aligned `/prefix_len` block in `parent` that no direct child overlaps
///
/// Walks the gaps between children sorted by start address, so the cost
/// depends on the number of children only.
pub fn first_free_block(parent: &Ipv4Net, prefix_len: u8, children: &[Pool]) -> Result<Option<Ipv4Net>> {
    if prefix_len < parent.prefix_len() || prefix_len > 32 {
        return Err(Error::InvalidCidr(format!(
            "prefix length /{} must be between /{} and /32 for {}",
            prefix_len,
            parent.prefix_len(),
            parent
        )));
    }

    let mut taken: Vec<(u64, u64)> = parse_children(children)?
        .iter()
        .map(|(net, _)| {
            let (start, end) = bounds(net);
            (u64::from(start), u64::from(end))
        })
        .collect();
    taken.sort_unstable();

    let block_size = address_count(prefix_len);
    let (space_start, space_end) = bounds(parent);
    let space_end = u64::from(space_end);

    let mut current = align_up(u64::from(space_start), block_size);
    for (start, end) in taken {
        if current + block_size - 1 < start {
            break;
        }
        if end >= current {
            current = align_up(end + 1, block_size);
        }
    }

    if current + block_size - 1 <= space_end {
        Ok(Some(Ipv4Net::new(u32_to_addr(current as u32), prefix_len)?))
    } else {
        Ok(None)
    }
}

fn align_up(addr: u64, block_size: u64) -> u64 {
    addr.div_ceil(block_size) * block_size
}

fn parse_children(children: &[Pool]) -> Result<Vec<(Ipv4Net, &Pool)>> {
    children
        .iter()
        .map(|child| {
            parse_prefix(&child.cidr).map(|net| (net, child)).map_err(|_| {
                Error::Internal(format!(
                    "stored pool {} has unparseable CIDR {}",
                    child.id, child.cidr
                ))
            })
        })
        .collect()
}
