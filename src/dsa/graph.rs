use std::borrow::Borrow;

type HashMap<K,V> = std::collections::hash_map::HashMap<K,V,nohash::BuildNoHashHasher<usize>>;
type HashSet<K> = std::collections::hash_set::HashSet<K,nohash::BuildNoHashHasher<usize>>;

pub type NodeId = usize;
pub type Weight = f64;
// ordered node sequence, no node repeated
pub type Path = Vec<NodeId>;

#[derive(Clone,Debug)]
struct Neighbours {
    // kept in insertion order, path discovery order depends on it
    to:Vec<(NodeId,Weight)>,
}

impl Neighbours {
    fn new() -> Self {
        Self {to:vec![]}
    }
    fn with_capacity(capacity:usize) -> Self {
        if capacity == 0 {
           return Self::new();
        }
        Self {to:Vec::with_capacity(capacity)}
    }
    fn shrink_to_fit(&mut self) {
        self.to.shrink_to_fit();
    }
}

impl Default for Neighbours {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
struct Visited {
    visited_nodes:HashSet<usize>,
    unvisited_nodes:HashSet<usize>
}

impl From<&DirectedGraph> for Visited {
    fn from(value: &DirectedGraph) -> Self {
        let mut new_visited = Self::with_capacity(value.nodes_len());
        for node in value.order.iter() {
            new_visited.push_node(node);
        }
        new_visited.shrink_to_fit();
        new_visited
    }
}

impl Visited {
    fn new() -> Self {
        Self {visited_nodes:HashSet::with_hasher(nohash::BuildNoHashHasher::default()),
        unvisited_nodes:HashSet::with_hasher(nohash::BuildNoHashHasher::default())}
    }
    fn with_capacity(capacity:usize) -> Self {
        if capacity == 0 {
            return Self::new();
        }
        Self {visited_nodes:HashSet::with_capacity_and_hasher(capacity,nohash::BuildNoHashHasher::default()),
            unvisited_nodes:HashSet::with_capacity_and_hasher(capacity,nohash::BuildNoHashHasher::default())
        }
    }
    fn push_node(&mut self,node:&usize) {
        if self.visited_nodes.contains(node) {
            debug_assert!(!self.unvisited_nodes.contains(node));
            return;
        }
        self.unvisited_nodes.insert(*node);
    }
    fn visit(&mut self,node:&usize) {
        // only nodes that are known and not yet visited move over
        if !self.unvisited_nodes.remove(node) {
            return
        };
        debug_assert!(!self.visited_nodes.contains(node));
        self.visited_nodes.insert(*node);
    }
    //None: unknown node
    //Some(false): known, not visited yet
    //Some(true): known and visited
    fn is_visited(&self,node:&usize) -> Option<bool> {
        if self.unvisited_nodes.contains(node) {
            debug_assert!(!self.visited_nodes.contains(node));
            return Some(false);
        }
        if self.visited_nodes.contains(node) {
            debug_assert!(!self.unvisited_nodes.contains(node));
            return Some(true)
        }
        None
    }
    fn shrink_to_fit(&mut self) {
        self.unvisited_nodes.shrink_to_fit();
        self.visited_nodes.shrink_to_fit();
    }
}

impl Default for Visited {
    fn default() -> Self {
        Self::new()
    }
}

// weighted directed graph, an edge u -> v and v -> u are independent
#[derive(Clone,Debug)]
pub struct DirectedGraph {
    edges_len:usize,
    nodes:HashMap<usize,Neighbours>,
    // node insertion order
    order:Vec<NodeId>
}

impl Default for DirectedGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectedGraph {
    pub fn new() -> Self {
        Self {edges_len:0,nodes:HashMap::with_hasher(nohash::BuildNoHashHasher::default()),order:vec![]}
    }
    pub fn with_capacity(capacity:usize) -> Self {
        if capacity == 0 {
            return Self::new();
        }
        Self {
            edges_len:0,
            nodes:HashMap::with_capacity_and_hasher(capacity, nohash::BuildNoHashHasher::default()),
            order:Vec::with_capacity(capacity)
        }
    }
    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
        self.order.shrink_to_fit();
        for neighbours in self.nodes.values_mut() {
            neighbours.shrink_to_fit();
        }
    }
    pub fn nodes_len(&self) -> usize {
        self.nodes.len()
    }
    pub fn edges_len(&self) -> usize {
        self.edges_len
    }
    pub fn nodes(&self) -> &[NodeId] {
        &self.order
    }
    // out going edges of a node, in insertion order
    pub fn next_nodes(&self,node:NodeId) -> Option<&[(NodeId,Weight)]> {
        self.nodes.get(&node).map(|n| n.to.as_slice())
    }
    pub fn weight(&self,start:NodeId,end:NodeId) -> Option<Weight> {
        self.next_nodes(start)?
            .iter()
            .find(|(node,_)| *node == end)
            .map(|(_,weight)| *weight)
    }
    pub fn push_node_with_sizehint(&mut self,node:NodeId,hint:usize) {
        if self.nodes.contains_key(&node) {return;}
        // insert a node without adding edges
        self.nodes.insert(node, Neighbours::with_capacity(hint));
        self.order.push(node);
    }
    pub fn push_node(&mut self,node:NodeId) {
        self.push_node_with_sizehint(node, 0);
    }
    // pushing an existing edge overwrites its weight
    pub fn push_edge_with_sizehint(&mut self,start:NodeId,end:NodeId,weight:Weight,hint:usize) {
        self.push_node_with_sizehint(start, hint);
        self.push_node_with_sizehint(end, hint);
        let Some(neighbours) = self.nodes.get_mut(&start) else {return};
        if let Some(edge) = neighbours.to.iter_mut().find(|(node,_)| *node == end) {
            edge.1 = weight;
            return;
        }
        neighbours.to.push((end,weight));
        self.edges_len += 1;
    }
    pub fn push_edge(&mut self,start:NodeId,end:NodeId,weight:Weight) {
        self.push_edge_with_sizehint(start, end, weight, 0);
    }
    pub fn from_edges(edges:&[(NodeId,NodeId,Weight)]) -> Self {
        edges.iter().collect()
    }
    // sum of directed edge weights, None if some hop has no edge
    pub fn path_cost(&self,path:&[NodeId]) -> Option<Weight> {
        let mut cost = 0.0;
        for hop in path.windows(2) {
            cost += self.weight(hop[0], hop[1])?;
        }
        Some(cost)
    }
    pub fn dfs(&self,start_node:NodeId) -> Option<Vec<NodeId>> {
        if !self.nodes.contains_key(&start_node) {
            return None;
        }
        let mut visited:Visited = self.into();
        let mut stack = Vec::with_capacity(self.nodes_len());
        let mut order = Vec::with_capacity(self.nodes_len());
        stack.push(start_node);
        while let Some(current) = stack.pop() {
            if visited.is_visited(&current)? {
                continue;
            }
            visited.visit(&current);
            order.push(current);
            // reversed so that the first neighbour is popped first
            for (next,_) in self.nodes.get(&current)?.to.iter().rev() {
                if !visited.is_visited(next)? {
                    stack.push(*next);
                }
            }
        }
        Some(order)
    }
    pub fn is_reachable(&self,start:NodeId,end:NodeId) -> bool {
        self.dfs(start).is_some_and(|order| order.contains(&end))
    }

    // every simple path from start to end, in depth first discovery order
    // exponential in the worst case, `limit` stops the search after that many paths
    pub fn all_simple_paths(&self,start:NodeId,end:NodeId,limit:Option<usize>) -> Vec<Path> {
        self.all_simple_paths_with_costs(start, end, limit)
            .into_iter()
            .map(|(path,_)| path)
            .collect()
    }

    pub fn all_simple_paths_with_costs(&self,start:NodeId,end:NodeId,limit:Option<usize>) -> Vec<(Path,Weight)> {
        let mut paths = Vec::new();
        if !self.nodes.contains_key(&start) || !self.nodes.contains_key(&end) {
            return paths;
        }
        let limit = limit.unwrap_or(usize::MAX);
        if limit == 0 {
            return paths;
        }
        if start == end {
            paths.push((vec![start],0.0));
            return paths;
        }

        // one frame per node on the current path: (node, index of the next neighbour to try)
        let mut frames:Vec<(NodeId,usize)> = Vec::with_capacity(self.nodes_len());
        // cost of the path prefix ending at each frame
        let mut prefix_costs:Vec<Weight> = Vec::with_capacity(self.nodes_len());
        let mut on_path:HashSet<usize> = HashSet::with_capacity_and_hasher(
            self.nodes_len(), nohash::BuildNoHashHasher::default()
        );
        frames.push((start,0));
        prefix_costs.push(0.0);
        on_path.insert(start);

        while let Some(frame) = frames.last_mut() {
            let node = frame.0;
            let neighbours = self.next_nodes(node).unwrap_or(&[]);
            let Some(&(next,weight)) = neighbours.get(frame.1) else {
                // all neighbours tried, backtrack
                frames.pop();
                prefix_costs.pop();
                on_path.remove(&node);
                continue;
            };
            frame.1 += 1;
            if on_path.contains(&next) {
                continue;
            }
            let cost = prefix_costs.last().copied().unwrap_or(0.0) + weight;
            if next == end {
                let mut path:Path = frames.iter().map(|(n,_)| *n).collect();
                path.push(end);
                paths.push((path,cost));
                if paths.len() >= limit {
                    break;
                }
                continue;
            }
            frames.push((next,0));
            prefix_costs.push(cost);
            on_path.insert(next);
        }
        paths
    }
}

impl<A:Borrow<(usize,usize,f64)>> FromIterator<A> for DirectedGraph {
    fn from_iter<T: IntoIterator<Item = A>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let size = match iter.size_hint() {
            (_,Some(higher)) => {higher},
            (lower,None) => {lower}
        };
        let mut new_graph = Self::with_capacity(size);
        for edge in iter {
            let (start,end,weight) = edge.borrow();
            new_graph.push_edge(*start, *end, *weight);
        }
        new_graph.shrink_to_fit();
        new_graph
    }
}

#[cfg(test)]
mod tests{
    use rand::{Rng, RngCore};

    use super::{DirectedGraph, NodeId, Path};

    // plain recursive enumeration to compare against
    fn recursive_paths(graph:&DirectedGraph,start:NodeId,end:NodeId,path:&mut Path,out:&mut Vec<Path>) {
        path.push(start);
        if start == end {
            out.push(path.clone());
        }else{
            for (next,_) in graph.next_nodes(start).unwrap_or(&[]) {
                if !path.contains(next) {
                    recursive_paths(graph, *next, end, path, out);
                }
            }
        }
        path.pop();
    }

    fn triangle() -> DirectedGraph {
        DirectedGraph::from_edges(&[(1,2,1.0),(2,1,1.0),(1,3,1.0),(3,1,1.0),(2,3,1.0),(3,2,1.0)])
    }

    #[test]
    fn test_insert() {
        let mut nodes:Vec<usize> = vec![];
        let mut rng = rand::rng();
        for _ in 0..16 {
            nodes.push(rng.next_u64() as usize);
        }
        let mut edges:Vec<(usize,usize,f64)> = vec![];
        for i in 0..nodes.len() - 1 {
            edges.push((nodes[i],nodes[i+1],1.0))
        }
        let new_graph = DirectedGraph::from_edges(&edges);
        let order = new_graph.dfs(edges[0].0).unwrap();
        assert_eq!(order,nodes);
        assert_eq!(new_graph.edges_len(),15);
        assert_eq!(new_graph.nodes(),nodes.as_slice());
    }
    #[test]
    fn test_weight_overwrite() {
        let mut graph = DirectedGraph::new();
        graph.push_edge(1, 2, 4.0);
        graph.push_edge(1, 2, 7.0);
        assert_eq!(graph.edges_len(),1);
        assert_eq!(graph.weight(1,2),Some(7.0));
        assert_eq!(graph.weight(2,1),None);
        assert_eq!(graph.path_cost(&[1,2]),Some(7.0));
        assert_eq!(graph.path_cost(&[2,1]),None);
    }
    #[test]
    fn test_triangle_paths() {
        let graph = triangle();
        let paths = graph.all_simple_paths_with_costs(1, 3, None);
        // neighbours are tried in insertion order, 2 before 3
        assert_eq!(paths,vec![(vec![1,2,3],2.0),(vec![1,3],1.0)]);
        assert_eq!(graph.all_simple_paths(1, 3, Some(1)),vec![vec![1,2,3]]);
        assert_eq!(graph.all_simple_paths(1, 1, None),vec![vec![1]]);
    }
    #[test]
    fn test_unreachable() {
        let mut graph = DirectedGraph::from_edges(&[(1,2,1.0),(2,1,1.0),(3,4,1.0)]);
        graph.push_node(5);
        assert!(graph.all_simple_paths(1, 4, None).is_empty());
        assert!(graph.all_simple_paths(1, 5, None).is_empty());
        assert!(graph.all_simple_paths(1, 42, None).is_empty());
        assert!(!graph.is_reachable(1, 4));
        assert!(graph.is_reachable(3, 4));
        assert!(!graph.is_reachable(4, 3));
    }
    #[test]
    fn test_matches_recursive_enumeration() {
        let mut rng = rand::rng();
        for _ in 0..20 {
            let size:usize = rng.random_range(2..8);
            let mut graph = DirectedGraph::with_capacity(size);
            for n in 0..size {graph.push_node(n)}
            for u in 0..size {
                for v in 0..size {
                    if u != v && rng.random_bool(0.5) {
                        graph.push_edge(u, v, rng.random_range(1.0..20.0));
                    }
                }
            }
            let (start,end) = (0,size-1);
            let mut expected = vec![];
            recursive_paths(&graph, start, end, &mut vec![], &mut expected);
            let found = graph.all_simple_paths_with_costs(start, end, None);
            assert_eq!(found.iter().map(|(p,_)| p.clone()).collect::<Vec<_>>(),expected);
            for (path,cost) in found {
                let mut dedup = path.clone();
                dedup.sort();
                dedup.dedup();
                assert_eq!(dedup.len(),path.len(),"path {path:?} repeats a node");
                assert!((graph.path_cost(&path).unwrap() - cost).abs() < 1e-9);
            }
        }
    }
}
