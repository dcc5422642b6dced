//! Generic single-source shortest paths (Dijkstra) over weighted graphs.

use std::collections::HashMap;
use std::hash::Hash;

use super::priority_queue::PairPriorityQueue;

/// Edge weights and accumulated distances.
///
/// `combine` must never yield a value smaller than either operand.
pub trait Cost: Copy + Ord {
    fn zero() -> Self;
    fn combine(self, other: Self) -> Self;
}

macro_rules! impl_cost_for_unsigned {
    ($($t:ty),*) => {
        $(
            impl Cost for $t {
                fn zero() -> Self {
                    0
                }

                fn combine(self, other: Self) -> Self {
                    self.saturating_add(other)
                }
            }
        )*
    };
}

impl_cost_for_unsigned!(u8, u16, u32, u64, u128, usize);

/// A directed edge with its cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<N, C> {
    pub from: N,
    pub to: N,
    pub cost: C,
}

/// A directed graph with weighted edges.
#[derive(Debug, Clone)]
pub struct WeightedGraph<N, C> {
    nodes: Vec<N>,
    index: HashMap<N, usize>,
    adjacency: Vec<Vec<(usize, C)>>,
}

impl<N, C> Default for WeightedGraph<N, C> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
        }
    }
}

impl<N, C> WeightedGraph<N, C>
where
    N: Clone + Eq + Hash,
    C: Cost,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its index. Adding an existing node is a no-op.
    pub fn add_node(&mut self, node: N) -> usize {
        if let Some(&i) = self.index.get(&node) {
            return i;
        }
        let i = self.nodes.len();
        self.index.insert(node.clone(), i);
        self.nodes.push(node);
        self.adjacency.push(Vec::new());
        i
    }

    /// Add an edge, adding its endpoints as needed.
    pub fn add_edge(&mut self, from: N, to: N, cost: C) {
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.adjacency[from].push((to, cost));
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Run Dijkstra from `root`. Returns `None` if `root` is not in the
    /// graph.
    pub fn shortest_paths(&self, root: &N) -> Option<ShortestPaths<'_, N, C>> {
        let root = *self.index.get(root)?;
        let mut distance: Vec<Option<C>> = vec![None; self.nodes.len()];
        let mut predecessor: Vec<Option<(usize, C)>> = vec![None; self.nodes.len()];
        let mut settled = vec![false; self.nodes.len()];

        let mut queue = PairPriorityQueue::new();
        distance[root] = Some(C::zero());
        queue.insert_or_update(root, C::zero());

        while let Some((node, dist)) = queue.pop() {
            if settled[node] {
                continue;
            }
            settled[node] = true;

            for &(next, cost) in &self.adjacency[node] {
                if settled[next] {
                    continue;
                }
                let candidate = dist.combine(cost);
                // Strict improvement only: ties keep the first distance
                // achieved.
                if distance[next].map_or(true, |d| candidate < d) {
                    distance[next] = Some(candidate);
                    predecessor[next] = Some((node, cost));
                    queue.insert_or_update(next, candidate);
                }
            }
        }

        Some(ShortestPaths {
            graph: self,
            root,
            distance,
            predecessor,
        })
    }
}

/// Result of a shortest-path run from one root.
#[derive(Debug)]
pub struct ShortestPaths<'g, N, C> {
    graph: &'g WeightedGraph<N, C>,
    root: usize,
    distance: Vec<Option<C>>,
    predecessor: Vec<Option<(usize, C)>>,
}

impl<N, C> ShortestPaths<'_, N, C>
where
    N: Clone + Eq + Hash,
    C: Cost,
{
    pub fn root(&self) -> &N {
        &self.graph.nodes[self.root]
    }

    /// Distance from the root; `None` if `target` is unreachable or unknown.
    pub fn distance(&self, target: &N) -> Option<C> {
        let i = *self.graph.index.get(target)?;
        self.distance[i]
    }

    pub fn is_reachable(&self, target: &N) -> bool {
        self.distance(target).is_some()
    }

    /// Edges of a shortest path from the root to `target`, in order.
    ///
    /// `Some(vec![])` for the root itself, `None` if unreachable.
    pub fn path_to(&self, target: &N) -> Option<Vec<Edge<N, C>>> {
        let mut current = *self.graph.index.get(target)?;
        self.distance[current]?;

        let mut edges = Vec::new();
        while current != self.root {
            let (previous, cost) = self.predecessor[current]?;
            edges.push(Edge {
                from: self.graph.nodes[previous].clone(),
                to: self.graph.nodes[current].clone(),
                cost,
            });
            current = previous;
        }
        edges.reverse();
        Some(edges)
    }
}
