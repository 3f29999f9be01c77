use std::collections::BTreeMap;
use serde::Serialize;

use crate::dsa::graph::{DirectedGraph, Path};
use super::paths::{PathTable, RankedPath};
use super::topology::{CapacityMap, DemandMap, Link, Pair};

// two path costs closer than this are a tie
pub const TIE_EPSILON:f64 = 1e-6;

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct PathLoad {
    pub path:Path,
    pub load:f64
}

pub type LinkLoads = BTreeMap<Link,f64>;
pub type TrafficSplits = BTreeMap<Pair,Vec<PathLoad>>;

// smallest capacity along the path, links without a capacity entry do not limit it
pub fn bottleneck_capacity(path:&[usize],capacity:&CapacityMap) -> f64 {
    path.windows(2)
        .map(|hop| capacity.get(&Link::new(hop[0],hop[1])).copied().unwrap_or(f64::INFINITY))
        .fold(f64::INFINITY, f64::min)
}

// how a single demand is spread over its candidate paths
fn split_demand(demand:f64,k_paths:&[RankedPath],capacity:&CapacityMap) -> Vec<PathLoad> {
    let Some(min_cost) = k_paths.first().map(|p| p.cost) else {
        return vec![];
    };
    let mut equal_cost = k_paths.iter()
        .filter(|p| (p.cost - min_cost).abs() < TIE_EPSILON)
        .map(|p| &p.path);

    let (Some(primary),second) = (equal_cost.next(),equal_cost.next()) else {
        return vec![];
    };
    let Some(secondary) = second else {
        return vec![PathLoad {path:primary.clone(),load:demand}];
    };

    // raw capacity, loads of other pairs are not taken into account here
    let bottleneck = bottleneck_capacity(primary, capacity);
    if demand <= bottleneck {
        return vec![PathLoad {path:primary.clone(),load:demand}];
    }
    vec![
        PathLoad {path:primary.clone(),load:bottleneck},
        PathLoad {path:secondary.clone(),load:demand - bottleneck},
    ]
}

/// Routes every demand over its precomputed paths and sums the load per link.
///
/// A demand whose pair has no entry in `k_paths` is not routed at all. Since paths are
/// only computed for pairs with src < dst, that includes every demand flowing from a
/// larger node id to a smaller one.
pub fn compute_link_loads(demand:&DemandMap,k_paths:&PathTable,graph:&DirectedGraph,capacity:&CapacityMap) -> (LinkLoads,TrafficSplits) {
    let mut loads = LinkLoads::new();
    let mut splits = TrafficSplits::new();
    for (pair,volume) in demand.iter() {
        let Some(paths) = k_paths.get(pair) else {
            tracing::debug!(src = pair.0, dst = pair.1, demand = volume, "demand left unrouted");
            continue;
        };
        let split = split_demand(*volume, paths, capacity);
        for assigned in split.iter() {
            debug_assert!(graph.path_cost(&assigned.path).is_some(),"path {:?} is not in the graph",assigned.path);
            for hop in assigned.path.windows(2) {
                *loads.entry(Link::new(hop[0],hop[1])).or_insert(0.0) += assigned.load;
            }
        }
        splits.insert(*pair, split);
    }
    (loads,splits)
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::{bottleneck_capacity, compute_link_loads, PathLoad};
    use crate::dsa::graph::DirectedGraph;
    use crate::traffic_engineering::paths::compute_paths;
    use crate::traffic_engineering::topology::{CapacityMap, DemandMap, Link};

    fn bidirectional(edges:&[(usize,usize,f64)]) -> DirectedGraph {
        let mut graph = DirectedGraph::new();
        for (a,b,w) in edges {
            graph.push_edge(*a, *b, *w);
            graph.push_edge(*b, *a, *w);
        }
        graph
    }

    #[test]
    fn test_single_path() {
        let graph = bidirectional(&[(1,2,1.0)]);
        let capacity = CapacityMap::from([(Link::new(1,2),100.0)]);
        let demand = DemandMap::from([((1,2),150.0)]);
        let table = compute_paths(&graph, &[1,2]);
        let (loads,splits) = compute_link_loads(&demand, &table, &graph, &capacity);
        assert_eq!(loads[&Link::new(1,2)],150.0);
        assert_eq!(splits[&(1,2)],vec![PathLoad{path:vec![1,2],load:150.0}]);
    }
    #[test]
    fn test_equal_cost_split() {
        // 1-3 direct costs 2, 1-2-3 costs 2 as well
        let graph = bidirectional(&[(1,2,1.0),(2,3,1.0),(1,3,2.0)]);
        let capacity = CapacityMap::from([
            (Link::new(1,2),50.0),(Link::new(2,3),100.0),(Link::new(1,3),100.0)
        ]);
        let demand = DemandMap::from([((1,3),80.0)]);
        let table = compute_paths(&graph, &[1,2,3]);
        // 1-2-3 is discovered first, so it is the primary path
        assert_eq!(table.get(&(1,3)).unwrap()[0].path,vec![1,2,3]);

        let (loads,splits) = compute_link_loads(&demand, &table, &graph, &capacity);
        assert_eq!(splits[&(1,3)],vec![
            PathLoad{path:vec![1,2,3],load:50.0},
            PathLoad{path:vec![1,3],load:30.0},
        ]);
        assert_eq!(loads[&Link::new(1,2)],50.0);
        assert_eq!(loads[&Link::new(2,3)],50.0);
        assert_eq!(loads[&Link::new(1,3)],30.0);
    }
    #[test]
    fn test_tie_fits_primary() {
        let graph = bidirectional(&[(1,2,1.0),(2,3,1.0),(1,3,2.0)]);
        let capacity = CapacityMap::from([(Link::new(1,2),50.0),(Link::new(2,3),100.0)]);
        let demand = DemandMap::from([((1,3),50.0)]);
        let table = compute_paths(&graph, &[1,2,3]);
        let (loads,splits) = compute_link_loads(&demand, &table, &graph, &capacity);
        assert_eq!(splits[&(1,3)].len(),1);
        assert_eq!(loads.get(&Link::new(1,3)),None);
        // 1-3 has no capacity entry, so it never limits a path
        assert_eq!(bottleneck_capacity(&[1,3], &capacity),f64::INFINITY);
    }
    #[test]
    fn test_near_tie_within_epsilon() {
        let graph = bidirectional(&[(1,2,1.0),(2,3,1.0),(1,3,2.0 + 1e-9)]);
        let capacity = CapacityMap::from([(Link::new(1,2),10.0)]);
        let demand = DemandMap::from([((1,3),15.0)]);
        let table = compute_paths(&graph, &[1,2,3]);
        let (_,splits) = compute_link_loads(&demand, &table, &graph, &capacity);
        assert_eq!(splits[&(1,3)].len(),2);
    }
    #[test]
    fn test_unrouted_demand() {
        let graph = bidirectional(&[(1,2,1.0),(3,4,1.0)]);
        let capacity = CapacityMap::from([(Link::new(1,2),10.0),(Link::new(3,4),10.0)]);
        // (1,3) is unreachable, (2,1) runs against the canonical direction
        let demand = DemandMap::from([((1,3),5.0),((2,1),5.0),((3,4),5.0)]);
        let table = compute_paths(&graph, &[1,2,3,4]);
        let (loads,splits) = compute_link_loads(&demand, &table, &graph, &capacity);
        assert_eq!(splits.len(),1);
        assert_eq!(loads.get(&Link::new(1,2)),None);
        assert_eq!(loads[&Link::new(3,4)],5.0);
    }
    #[test]
    fn test_split_sums_to_demand() {
        let mut rng = rand::rng();
        for _ in 0..20 {
            let size:usize = rng.random_range(3..7);
            let mut graph = DirectedGraph::new();
            let mut capacity = CapacityMap::new();
            let mut demand = DemandMap::new();
            for n in 0..size {graph.push_node(n)}
            for a in 0..size {
                for b in a+1..size {
                    if b == a+1 || rng.random_bool(0.4) {
                        // small integer weights make ties likely
                        let w = rng.random_range(1..4) as f64;
                        graph.push_edge(a, b, w);
                        graph.push_edge(b, a, w);
                        capacity.insert(Link::new(a,b), rng.random_range(10.0..100.0));
                    }
                    demand.insert((a,b), rng.random_range(1.0..200.0));
                }
            }
            let nodes:Vec<usize> = (0..size).collect();
            let table = compute_paths(&graph, &nodes);
            let (loads,splits) = compute_link_loads(&demand, &table, &graph, &capacity);
            assert_eq!(splits.len(),demand.len());
            for (pair,split) in splits.iter() {
                let total:f64 = split.iter().map(|s| s.load).sum();
                assert!((total - demand[pair]).abs() < 1e-6,"{pair:?} routed {total} of {}",demand[pair]);
            }
            assert!(loads.values().all(|load| *load >= 0.0));
        }
    }
}
