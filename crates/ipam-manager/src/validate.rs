//! Pool creation checks: containment in the parent and no overlap with siblings
//!
//! Overlap is scoped per parent. Pools under different parents, or in
//! different branches of the tree, may hold identical or overlapping CIDRs;
//! only pools sharing the same `parent_id` (top-level pools share `None`) are
//! compared with each other.

use crate::cidr::{bounds, overlap, parse_prefix};
use crate::models::{Pool, PoolId};
use crate::{Error, Result};
use ipnet::Ipv4Net;

/// Check that `child` is a strict, bounded subset of `parent`
///
/// The child prefix must be strictly longer than the parent's, even when the
/// ranges would nest with an equal length.
pub fn validate_child_cidr(parent: &Ipv4Net, child: &Ipv4Net) -> Result<()> {
    let (parent_start, parent_end) = bounds(parent);
    let (child_start, child_end) = bounds(child);

    let strictly_narrower = child.prefix_len() > parent.prefix_len();
    let within = parent_start <= child_start
        && child_start <= parent_end
        && parent_start <= child_end
        && child_end <= parent_end;

    if strictly_narrower && within {
        Ok(())
    } else {
        Err(Error::Containment {
            child: child.to_string(),
            parent: parent.to_string(),
        })
    }
}

/// Check `candidate` against the pools of its own scope
///
/// Siblings whose CIDR string equals the candidate's are skipped; exact
/// duplicates are reported by [`validate_unique_cidr`]. The first
/// overlapping sibling fails the check.
pub fn validate_no_overlap<'a, I>(candidate: &Ipv4Net, siblings: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Pool>,
{
    let candidate_text = candidate.to_string();

    for sibling in siblings {
        if sibling.cidr == candidate_text {
            continue;
        }
        let existing = parse_prefix(&sibling.cidr).map_err(|_| {
            Error::Internal(format!(
                "stored pool {} has unparseable CIDR {}",
                sibling.id, sibling.cidr
            ))
        })?;
        if overlap(candidate, &existing) {
            return Err(Error::Overlap {
                cidr: candidate_text,
                conflicting_id: sibling.id,
                conflicting_cidr: sibling.cidr.clone(),
            });
        }
    }

    Ok(())
}

/// Reject an exact CIDR duplicate within the same scope
pub fn validate_unique_cidr<'a, I>(candidate: &Ipv4Net, siblings: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Pool>,
{
    let candidate_text = candidate.to_string();
    match siblings.into_iter().find(|s| s.cidr == candidate_text) {
        Some(existing) => Err(Error::DuplicateCidr {
            cidr: candidate_text,
            conflicting_id: existing.id,
        }),
        None => Ok(()),
    }
}

/// Pools that share `parent_id` (all top-level pools for `None`)
pub fn siblings_of(pools: &[Pool], parent_id: Option<PoolId>) -> impl Iterator<Item = &Pool> {
    pools.iter().filter(move |p| p.parent_id == parent_id)
}
