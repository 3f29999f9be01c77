use std::collections::BTreeMap;
use serde::Serialize;

use crate::dsa::graph::{DirectedGraph, NodeId, Path, Weight};
use super::topology::Pair;

pub const DEFAULT_K:usize = 2;

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct RankedPath {
    pub cost:Weight,
    pub path:Path
}

impl RankedPath {
    // directed hops along the path
    pub fn hops(&self) -> impl Iterator<Item = (NodeId,NodeId)> + '_ {
        self.path.windows(2).map(|hop| (hop[0],hop[1]))
    }
}

impl std::fmt::Display for RankedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i,node) in self.path.iter().enumerate() {
            if i > 0 {write!(f,"→")?;}
            write!(f,"{node}")?;
        }
        write!(f," (cost: {})",self.cost)
    }
}

/// Produces up to `k` simple paths from `src` to `dst`, cheapest first.
///
/// Paths of equal cost must come out in a stable order, the traffic splitter
/// picks the first two of a tie.
pub trait KPathStrategy {
    fn k_shortest_paths(&self,graph:&DirectedGraph,src:NodeId,dst:NodeId,k:usize) -> Vec<RankedPath>;
}

/// Enumerates every simple path, sorts by cost and keeps the first `k`.
///
/// Exponential in the number of nodes. `max_paths` caps how many paths are
/// enumerated per pair, which also means the cheapest path may be missed once
/// the cap bites.
#[derive(Clone,Copy,Debug,Default)]
pub struct ExhaustiveKPaths {
    pub max_paths:Option<usize>
}

impl ExhaustiveKPaths {
    pub fn new(max_paths:Option<usize>) -> Self {
        Self {max_paths}
    }
}

impl KPathStrategy for ExhaustiveKPaths {
    fn k_shortest_paths(&self,graph:&DirectedGraph,src:NodeId,dst:NodeId,k:usize) -> Vec<RankedPath> {
        if k == 0 || !graph.is_reachable(src, dst) {
            return vec![];
        }
        let mut ranked:Vec<RankedPath> = graph.all_simple_paths_with_costs(src, dst, self.max_paths)
            .into_iter()
            .map(|(path,cost)| RankedPath {cost,path})
            .collect();
        // stable, equal costs keep discovery order
        ranked.sort_by(|a,b| a.cost.total_cmp(&b.cost));
        ranked.truncate(k);
        ranked
    }
}

#[derive(Clone,Debug,Default)]
pub struct PathTable {
    // k cheapest paths per (src,dst) with src < dst
    pub k_paths:BTreeMap<Pair,Vec<RankedPath>>,
    pub best_paths:BTreeMap<Pair,RankedPath>
}

impl PathTable {
    pub fn get(&self,pair:&Pair) -> Option<&[RankedPath]> {
        self.k_paths.get(pair).map(|paths| paths.as_slice())
    }
    pub fn len(&self) -> usize {
        self.k_paths.len()
    }
    pub fn is_empty(&self) -> bool {
        self.k_paths.is_empty()
    }
}

pub fn compute_paths(graph:&DirectedGraph,nodes:&[NodeId]) -> PathTable {
    compute_paths_with(graph, nodes, &ExhaustiveKPaths::default(), DEFAULT_K)
}

// only pairs with src < dst are routed, pairs without any path are left out
pub fn compute_paths_with<S:KPathStrategy + ?Sized>(graph:&DirectedGraph,nodes:&[NodeId],strategy:&S,k:usize) -> PathTable {
    let mut table = PathTable::default();
    for src in nodes.iter() {
        for dst in nodes.iter() {
            if src >= dst {continue}
            let k_paths = strategy.k_shortest_paths(graph, *src, *dst, k);
            let Some(best) = k_paths.first().cloned() else {
                tracing::debug!(src, dst, "no path between pair");
                continue;
            };
            table.best_paths.insert((*src,*dst), best);
            table.k_paths.insert((*src,*dst), k_paths);
        }
    }
    table
}
