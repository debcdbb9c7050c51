//! Union-find over node ids, used to fold wire equivalences.
//!
//! The structure is lazy: an id never seen before is its own singleton
//! set. It is rebuilt from scratch for every solve and only ever holds a
//! throwaway representative map; it does not touch the node ids stored on
//! elements.

use std::collections::HashMap;

use super::NodeId;

/// A lazy union-find (disjoint set) keyed by [`NodeId`].
///
/// Uses path compression in `find` and union-by-rank in `union`. When two
/// roots have equal rank the lower raw id wins, so the representative of
/// a group is deterministic regardless of the order unions were applied.
#[derive(Debug, Default)]
pub struct UnionFind {
    parent: HashMap<NodeId, NodeId>,
    rank: HashMap<NodeId, u32>,
}

impl UnionFind {
    /// Create an empty structure; every id starts as its own set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the canonical representative of `node`, instantiating it as
    /// a fresh singleton if unseen. Compresses the traversed path.
    pub fn find(&mut self, node: NodeId) -> NodeId {
        let mut root = *self.parent.entry(node).or_insert(node);
        while let Some(&p) = self.parent.get(&root) {
            if p == root {
                break;
            }
            root = p;
        }

        // Point every node on the path directly at the root.
        let mut current = node;
        while current != root {
            let next = self.parent[&current];
            self.parent.insert(current, root);
            current = next;
        }

        root
    }

    /// Merge the sets containing `a` and `b`.
    ///
    /// The lower-rank root is attached under the higher-rank root; on a
    /// tie the lower raw id becomes the root and its rank is incremented.
    pub fn union(&mut self, a: NodeId, b: NodeId) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }

        let rank_a = *self.rank.get(&ra).unwrap_or(&0);
        let rank_b = *self.rank.get(&rb).unwrap_or(&0);

        let (root, child) = match rank_a.cmp(&rank_b) {
            std::cmp::Ordering::Greater => (ra, rb),
            std::cmp::Ordering::Less => (rb, ra),
            std::cmp::Ordering::Equal => {
                let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
                *self.rank.entry(root).or_insert(0) += 1;
                (root, child)
            }
        };

        self.parent.insert(child, root);
        tracing::debug!(%a, %b, %root, "merged node groups");
    }

    /// Check whether two ids currently share a set.
    pub fn connected(&mut self, a: NodeId, b: NodeId) -> bool {
        self.find(a) == self.find(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_id_is_singleton() {
        let mut uf = UnionFind::new();
        assert_eq!(uf.find(NodeId(7)), NodeId(7));
    }

    #[test]
    fn test_union_merges_sets() {
        let mut uf = UnionFind::new();
        uf.union(NodeId(1), NodeId(2));
        assert!(uf.connected(NodeId(1), NodeId(2)));
        assert!(!uf.connected(NodeId(1), NodeId(3)));
    }

    #[test]
    fn test_union_is_idempotent() {
        let mut uf = UnionFind::new();
        uf.union(NodeId(1), NodeId(2));
        let root = uf.find(NodeId(1));
        uf.union(NodeId(2), NodeId(1));
        assert_eq!(uf.find(NodeId(1)), root);
        assert_eq!(uf.find(NodeId(2)), root);
    }

    #[test]
    fn test_representative_is_order_independent() {
        // Same equivalence classes via two different union orders must
        // produce the same representatives.
        let mut forward = UnionFind::new();
        forward.union(NodeId(1), NodeId(2));
        forward.union(NodeId(2), NodeId(3));

        let mut backward = UnionFind::new();
        backward.union(NodeId(3), NodeId(2));
        backward.union(NodeId(2), NodeId(1));

        for n in 1..=3 {
            assert_eq!(forward.find(NodeId(n)), backward.find(NodeId(n)));
        }
    }

    #[test]
    fn test_path_compression_flattens_chain() {
        let mut uf = UnionFind::new();
        for n in 1..10 {
            uf.union(NodeId(n), NodeId(n + 1));
        }
        let root = uf.find(NodeId(10));
        for n in 1..=10 {
            assert_eq!(uf.find(NodeId(n)), root);
        }
    }
}
