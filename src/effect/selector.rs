//! Blend variant selection.

use crate::core::error::NodeId;
use crate::effect::params::BlendMode;
use crate::effect::pool::NodePool;

/// The pre-built blend node for `mode`.
pub fn select_blend(pool: &NodePool, mode: BlendMode) -> NodeId {
    pool.blend(mode)
}

/// Select from a raw mode index; unrecognized indices select soft-light.
pub fn select_blend_raw(pool: &NodePool, index: i64) -> NodeId {
    select_blend(pool, BlendMode::from_raw_index(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::structure::ProcessingGraph;
    use std::collections::HashSet;

    fn pool() -> NodePool {
        let mut graph = ProcessingGraph::new();
        NodePool::create(&mut graph).unwrap()
    }

    #[test]
    fn test_selection_is_a_bijection() {
        let pool = pool();
        let selected: HashSet<NodeId> = BlendMode::ALL
            .iter()
            .map(|mode| select_blend(&pool, *mode))
            .collect();

        assert_eq!(selected.len(), 9);
        assert_eq!(selected, pool.blends.iter().copied().collect());
    }

    #[test]
    fn test_selection_is_stable() {
        let pool = pool();
        for mode in BlendMode::ALL {
            assert_eq!(select_blend(&pool, mode), select_blend(&pool, mode));
        }
    }

    #[test]
    fn test_raw_fallback() {
        let pool = pool();
        let soft_light = select_blend(&pool, BlendMode::SoftLight);

        assert_eq!(select_blend_raw(&pool, 9), soft_light);
        assert_eq!(select_blend_raw(&pool, -3), soft_light);
        assert_eq!(select_blend_raw(&pool, i64::MAX), soft_light);
        assert_eq!(select_blend_raw(&pool, 6), select_blend(&pool, BlendMode::Multiply));
    }
}
