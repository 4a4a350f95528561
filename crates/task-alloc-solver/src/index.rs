// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use std::fmt::Display;

/// Maps between problem nodes and the solver's variable indices.
///
/// Every node that is not a vehicle anchor gets one index, in node order.
/// Each vehicle then gets a dedicated start index and, after all starts, a
/// dedicated end index. A node used as an anchor by several vehicles (or as
/// both start and end) therefore owns several indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingIndexManager {
    num_nodes: usize,
    num_vehicles: usize,
    index_to_node: Vec<usize>,
    node_to_index: Vec<Option<usize>>,
    starts: Vec<usize>,
    ends: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexManagerError {
    AnchorCountMismatch {
        vehicles: usize,
        starts: usize,
        ends: usize,
    },
    AnchorOutOfRange { node: usize, num_nodes: usize },
}

impl Display for IndexManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexManagerError::AnchorCountMismatch {
                vehicles,
                starts,
                ends,
            } => write!(
                f,
                "{vehicles} vehicles need as many anchors, got {starts} starts and {ends} ends"
            ),
            IndexManagerError::AnchorOutOfRange { node, num_nodes } => {
                write!(f, "Anchor node {node} is outside 0..{num_nodes}")
            }
        }
    }
}

impl std::error::Error for IndexManagerError {}

impl RoutingIndexManager {
    pub fn new(
        num_nodes: usize,
        num_vehicles: usize,
        starts: &[usize],
        ends: &[usize],
    ) -> Result<Self, IndexManagerError> {
        if starts.len() != num_vehicles || ends.len() != num_vehicles {
            return Err(IndexManagerError::AnchorCountMismatch {
                vehicles: num_vehicles,
                starts: starts.len(),
                ends: ends.len(),
            });
        }
        if let Some(&node) = starts.iter().chain(ends).find(|&&n| n >= num_nodes) {
            return Err(IndexManagerError::AnchorOutOfRange { node, num_nodes });
        }

        let mut is_anchor = vec![false; num_nodes];
        for &n in starts.iter().chain(ends) {
            is_anchor[n] = true;
        }

        let mut index_to_node = Vec::with_capacity(num_nodes + 2 * num_vehicles);
        let mut node_to_index = vec![None; num_nodes];
        for node in (0..num_nodes).filter(|&n| !is_anchor[n]) {
            node_to_index[node] = Some(index_to_node.len());
            index_to_node.push(node);
        }

        let mut start_indices = Vec::with_capacity(num_vehicles);
        for &n in starts {
            let idx = index_to_node.len();
            index_to_node.push(n);
            start_indices.push(idx);
            node_to_index[n].get_or_insert(idx);
        }
        let mut end_indices = Vec::with_capacity(num_vehicles);
        for &n in ends {
            end_indices.push(index_to_node.len());
            index_to_node.push(n);
        }

        Ok(Self {
            num_nodes,
            num_vehicles,
            index_to_node,
            node_to_index,
            starts: start_indices,
            ends: end_indices,
        })
    }

    /// Layout where vehicle `v` starts and ends at node `v`.
    pub fn with_self_anchored_vehicles(
        num_nodes: usize,
        num_vehicles: usize,
    ) -> Result<Self, IndexManagerError> {
        let anchors: Vec<usize> = (0..num_vehicles).collect();
        Self::new(num_nodes, num_vehicles, &anchors, &anchors)
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    #[inline]
    pub fn num_vehicles(&self) -> usize {
        self.num_vehicles
    }

    /// Total number of indices, anchors included.
    #[inline]
    pub fn num_indices(&self) -> usize {
        self.index_to_node.len()
    }

    #[inline]
    pub fn index_to_node(&self, index: usize) -> usize {
        self.index_to_node[index]
    }

    /// The index of `node`; for an anchor node this is the first start
    /// index it was given.
    #[inline]
    pub fn node_to_index(&self, node: usize) -> Option<usize> {
        self.node_to_index.get(node).copied().flatten()
    }

    #[inline]
    pub fn start(&self, vehicle: usize) -> usize {
        self.starts[vehicle]
    }

    #[inline]
    pub fn end(&self, vehicle: usize) -> usize {
        self.ends[vehicle]
    }

    #[inline]
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    #[inline]
    pub fn ends(&self) -> &[usize] {
        &self.ends
    }

    #[inline]
    pub fn is_start(&self, index: usize) -> bool {
        self.starts.contains(&index)
    }

    #[inline]
    pub fn is_end(&self, index: usize) -> bool {
        self.ends.contains(&index)
    }

    /// Number of indices that are neither a start nor an end.
    #[inline]
    pub fn num_visit_indices(&self) -> usize {
        self.index_to_node.len() - 2 * self.num_vehicles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_anchored_layout() {
        // 2 agents, 3 tasks
        let m = RoutingIndexManager::with_self_anchored_vehicles(5, 2).unwrap();
        assert_eq!(m.num_indices(), 3 + 2 + 2);
        assert_eq!(m.num_visit_indices(), 3);

        // task nodes come first, in node order
        assert_eq!(m.node_to_index(2), Some(0));
        assert_eq!(m.node_to_index(4), Some(2));
        assert_eq!(m.index_to_node(0), 2);

        // starts then ends
        assert_eq!(m.start(0), 3);
        assert_eq!(m.start(1), 4);
        assert_eq!(m.end(0), 5);
        assert_eq!(m.end(1), 6);
        assert_eq!(m.index_to_node(m.start(1)), 1);
        assert_eq!(m.index_to_node(m.end(1)), 1);
        assert_eq!(m.node_to_index(1), Some(m.start(1)));

        assert!(m.is_end(5));
        assert!(!m.is_end(3));
        assert!(m.is_start(3));
    }

    #[test]
    fn test_shared_depot() {
        let m = RoutingIndexManager::new(4, 2, &[0, 0], &[0, 0]).unwrap();
        assert_eq!(m.num_visit_indices(), 3);
        assert_eq!(m.num_indices(), 7);
        assert_eq!(m.index_to_node(m.start(1)), 0);
        assert_eq!(m.index_to_node(m.end(0)), 0);
    }

    #[test]
    fn test_invalid_layouts_rejected() {
        assert!(matches!(
            RoutingIndexManager::new(3, 2, &[0], &[0, 1]),
            Err(IndexManagerError::AnchorCountMismatch { .. })
        ));
        assert!(matches!(
            RoutingIndexManager::new(3, 1, &[5], &[0]),
            Err(IndexManagerError::AnchorOutOfRange { node: 5, .. })
        ));
    }
}
