//! Pool tree assembly for hierarchy views
//!
//! The tree is built bottom-up from an explicit pre-order list instead of
//! recursing per level, so deep hierarchies cannot exhaust the stack.

use crate::cascade::children_index;
use crate::models::{Pool, PoolId, PoolWithStats};
use crate::utilization::calculate_utilization;
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Build the pool forest, or the single tree under `root`
///
/// Children at every level are ordered by `(created_at, id)`. Pools whose
/// parent is missing from `pools` are not reachable from any top-level pool
/// and are left out of forest output.
pub fn build_hierarchy(pools: &[Pool], root: Option<PoolId>) -> Result<Vec<PoolWithStats>> {
    let index = children_index(pools);

    let roots: Vec<&Pool> = match root {
        Some(id) => vec![pools
            .iter()
            .find(|p| p.id == id)
            .ok_or(Error::NotFound(id))?],
        None => index.get(&None).cloned().unwrap_or_default(),
    };

    // Pre-order walk with an explicit stack
    let mut order: Vec<&Pool> = Vec::new();
    let mut seen: HashSet<PoolId> = HashSet::new();
    let mut stack: Vec<&Pool> = roots.iter().rev().copied().collect();
    while let Some(pool) = stack.pop() {
        if !seen.insert(pool.id) {
            continue;
        }
        order.push(pool);
        if let Some(children) = index.get(&Some(pool.id)) {
            stack.extend(children.iter().rev().copied());
        }
    }

    // Children always follow their parent in pre-order, so walking backwards
    // finishes every child before its parent needs it.
    let mut built: HashMap<PoolId, PoolWithStats> = HashMap::with_capacity(order.len());
    for pool in order.into_iter().rev() {
        let direct: &[&Pool] = index
            .get(&Some(pool.id))
            .map(|c| c.as_slice())
            .unwrap_or(&[]);

        let stats = calculate_utilization(pool, direct.iter().copied())?;
        let children = direct
            .iter()
            .filter_map(|child| built.remove(&child.id))
            .collect();

        built.insert(
            pool.id,
            PoolWithStats {
                pool: pool.clone(),
                stats,
                children,
            },
        );
    }

    Ok(roots
        .iter()
        .filter_map(|r| built.remove(&r.id))
        .collect())
}

/// Number of nodes in a built hierarchy
pub fn node_count(forest: &[PoolWithStats]) -> usize {
    let mut count = 0;
    let mut stack: Vec<&PoolWithStats> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        count += 1;
        stack.extend(node.children.iter());
    }
    count
}
