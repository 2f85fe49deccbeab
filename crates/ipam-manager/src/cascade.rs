//! Subtree resolution for cascading deletion

use crate::models::{Pool, PoolId};
use std::collections::{HashMap, HashSet, VecDeque};

/// Map from parent id to child ids, children in `(created_at, id)` order
pub fn children_index(pools: &[Pool]) -> HashMap<Option<PoolId>, Vec<&Pool>> {
    let mut index: HashMap<Option<PoolId>, Vec<&Pool>> = HashMap::new();
    for pool in pools {
        index.entry(pool.parent_id).or_default().push(pool);
    }
    for children in index.values_mut() {
        children.sort_by_key(|p| p.order_key());
    }
    index
}

/// Ids of `root` and all its descendants, in deletion order
///
/// BFS over the adjacency map, reversed: deepest descendants come first and
/// `root` itself is last. Returns an empty list if `root` is not in `pools`.
pub fn collect_subtree(pools: &[Pool], root: PoolId) -> Vec<PoolId> {
    if !pools.iter().any(|p| p.id == root) {
        return Vec::new();
    }

    let index = children_index(pools);
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([root]);

    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        order.push(id);
        if let Some(children) = index.get(&Some(id)) {
            queue.extend(children.iter().map(|c| c.id));
        }
    }

    order.reverse();
    order
}
