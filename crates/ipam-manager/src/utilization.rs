//! Pool utilization statistics

use crate::cidr::{address_count, parse_prefix, usable_hosts};
use crate::models::{Pool, PoolId, PoolStats};
use crate::{Error, Result};
use std::collections::HashSet;

/// Utilization of `pool` from its direct children
///
/// Single level by contract: a child's own free space still counts as
/// allocated from the parent's point of view, and grandchildren are never
/// inspected.
pub fn calculate_utilization<'a, I>(pool: &Pool, direct_children: I) -> Result<PoolStats>
where
    I: IntoIterator<Item = &'a Pool>,
{
    let net = stored_prefix(pool)?;
    let total = usable_hosts(net.prefix_len());

    let mut allocated = 0u64;
    let mut spanned = 0u64;
    let mut child_count = 0usize;
    for child in direct_children {
        let child_len = stored_prefix(child)?.prefix_len();
        allocated += usable_hosts(child_len);
        spanned += address_count(child_len);
        child_count += 1;
    }

    check_span(pool, &net, spanned)?;
    Ok(build_stats(total, allocated, child_count))
}

/// Utilization of `pool` counted over its leaf descendants
///
/// `descendants` may hold the pool's whole subtree (or more); only pools
/// reachable below `pool` with no children of their own are counted.
pub fn calculate_recursive_utilization(pool: &Pool, descendants: &[Pool]) -> Result<PoolStats> {
    let net = stored_prefix(pool)?;
    let total = usable_hosts(net.prefix_len());

    let subtree = crate::cascade::collect_subtree(descendants, pool.id);
    let in_subtree: HashSet<PoolId> = subtree.iter().copied().collect();
    let parents: HashSet<PoolId> = descendants
        .iter()
        .filter(|p| in_subtree.contains(&p.id))
        .filter_map(|p| p.parent_id)
        .collect();

    let mut allocated = 0u64;
    let mut spanned = 0u64;
    let mut leaves = 0usize;
    for candidate in descendants {
        if candidate.id == pool.id
            || !in_subtree.contains(&candidate.id)
            || parents.contains(&candidate.id)
        {
            continue;
        }
        let leaf_len = stored_prefix(candidate)?.prefix_len();
        allocated += usable_hosts(leaf_len);
        spanned += address_count(leaf_len);
        leaves += 1;
    }

    check_span(pool, &net, spanned)?;
    Ok(build_stats(total, allocated, leaves))
}

/// Disjoint contained children can never span more addresses than the parent
fn check_span(pool: &Pool, net: &ipnet::Ipv4Net, spanned: u64) -> Result<()> {
    let size = address_count(net.prefix_len());
    if spanned > size {
        return Err(Error::Internal(format!(
            "children of pool {} ({}) span {} addresses but the pool holds {}",
            pool.id, pool.cidr, spanned, size
        )));
    }
    Ok(())
}

/// Small children keep their network and broadcast addresses, so `allocated`
/// may exceed `total` (two /31s in a /30). `free` saturates at 0 and the
/// percentage at 100.
fn build_stats(total: u64, allocated: u64, child_count: usize) -> PoolStats {
    let utilization_percent = if child_count == 0 || total == 0 {
        0.0
    } else {
        ((allocated as f64 / total as f64) * 100.0).min(100.0)
    };

    PoolStats {
        total,
        allocated,
        free: total.saturating_sub(allocated),
        utilization_percent,
        child_count,
    }
}

fn stored_prefix(pool: &Pool) -> Result<ipnet::Ipv4Net> {
    parse_prefix(&pool.cidr).map_err(|_| {
        Error::Internal(format!(
            "stored pool {} has unparseable CIDR {}",
            pool.id, pool.cidr
        ))
    })
}
