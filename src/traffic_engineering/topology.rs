use std::collections::BTreeMap;
use serde::Serialize;
use thiserror::Error;

use crate::dsa::graph::{DirectedGraph, NodeId};
use crate::linear_algebra::matrix::{Matrix, MatrixError};

type HashMap<K,V> = std::collections::hash_map::HashMap<K,V,nohash::BuildNoHashHasher<usize>>;

#[derive(Error,Debug)]
pub enum TopologyError {
    #[error("{name} matrix is malformed: {source}")]
    Malformed{name:&'static str,#[source] source:MatrixError},
    #[error("{name} matrix is {dimension:?}, but {nodes} nodes were given")]
    NodeCountMismatch{name:&'static str,dimension:(usize,usize),nodes:usize},
    #[error("node {0} is listed more than once")]
    DuplicateNode(NodeId),
    #[error(transparent)]
    Matrix(#[from] MatrixError)
}

type Result<T> = std::result::Result<T,TopologyError>;

// undirected physical link, always stored with the smaller node first
#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash,Serialize)]
pub struct Link(NodeId,NodeId);

impl Link {
    pub fn new(a:NodeId,b:NodeId) -> Self {
        if a <= b {Self(a,b)} else {Self(b,a)}
    }
    pub fn low(&self) -> NodeId {
        self.0
    }
    pub fn high(&self) -> NodeId {
        self.1
    }
    // does the directed hop a -> b run over this link, in either direction
    pub fn carries(&self,a:NodeId,b:NodeId) -> bool {
        Self::new(a, b) == *self
    }
}

impl std::fmt::Display for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,"{}-{}",self.0,self.1)
    }
}

// ordered (src,dst) node pair
pub type Pair = (NodeId,NodeId);
pub type CapacityMap = BTreeMap<Link,f64>;
pub type DemandMap = BTreeMap<Pair,f64>;

/// Static snapshot of the network: node set, initial weights, link capacities and demands.
///
/// Capacities and demands never change once built. The weights kept here are the
/// starting point; whoever tunes them works on a copy.
#[derive(Clone,Debug)]
pub struct Topology {
    nodes:Vec<NodeId>,
    index:HashMap<NodeId,usize>,
    weights:Matrix,
    capacity:CapacityMap,
    demand:DemandMap
}

impl Topology {
    /// Builds a topology from node×node matrices where entry (i,j) belongs to `nodes[i] -> nodes[j]`.
    ///
    /// All three matrices must be square, sized to the node list, finite, non-negative and
    /// zero on the diagonal. A zero entry means "no link" / "no capacity" / "no demand".
    pub fn from_matrices(nodes:&[NodeId],weights:&Matrix,capacities:&Matrix,demands:&Matrix) -> Result<Self> {
        let mut index = HashMap::with_capacity_and_hasher(nodes.len(), nohash::BuildNoHashHasher::default());
        for (i,node) in nodes.iter().enumerate() {
            if index.insert(*node,i).is_some() {
                return Err(TopologyError::DuplicateNode(*node));
            }
        }
        for (name,matrix) in [("weight",weights),("capacity",capacities),("demand",demands)] {
            check_matrix(name, matrix, nodes.len())?;
        }

        // capacity of {a,b} is read from the a -> b entry with a < b
        let mut capacity = CapacityMap::new();
        for (i,a) in nodes.iter().enumerate() {
            for (j,b) in nodes.iter().enumerate() {
                if a >= b {continue}
                let value = capacities.get(i, j)?;
                if value > 0.0 {
                    capacity.insert(Link::new(*a,*b), value);
                }
            }
        }

        let mut demand = DemandMap::new();
        for (i,src) in nodes.iter().enumerate() {
            for (j,dst) in nodes.iter().enumerate() {
                let value = demands.get(i, j)?;
                if value > 0.0 {
                    demand.insert((*src,*dst), value);
                }
            }
        }

        Ok(Self {
            nodes:nodes.to_vec(),
            index,
            weights:weights.clone(),
            capacity,
            demand
        })
    }
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }
    pub fn capacity(&self) -> &CapacityMap {
        &self.capacity
    }
    pub fn demand(&self) -> &DemandMap {
        &self.demand
    }
    pub fn index_of(&self,node:NodeId) -> Option<usize> {
        self.index.get(&node).copied()
    }
    // matrix position of the directed edge a -> b
    pub fn edge_index(&self,a:NodeId,b:NodeId) -> Option<(usize,usize)> {
        Some((self.index_of(a)?,self.index_of(b)?))
    }
    // every unordered node pair, whether or not a link exists between them
    pub fn canonical_links(&self) -> Vec<Link> {
        let mut links = Vec::with_capacity(self.nodes.len()*self.nodes.len().saturating_sub(1)/2);
        for a in self.nodes.iter() {
            for b in self.nodes.iter() {
                if a < b {
                    links.push(Link::new(*a,*b));
                }
            }
        }
        links.sort();
        links
    }
    pub fn graph(&self) -> DirectedGraph {
        self.graph_with(&self.weights)
    }
    // directed graph for a given weight matrix shaped like this topology's
    // positive entries become edges, in node order
    pub fn graph_with(&self,weights:&Matrix) -> DirectedGraph {
        let mut graph = DirectedGraph::with_capacity(self.nodes.len());
        for node in self.nodes.iter() {
            graph.push_node_with_sizehint(*node, self.nodes.len());
        }
        for (i,a) in self.nodes.iter().enumerate() {
            for (j,b) in self.nodes.iter().enumerate() {
                let Ok(weight) = weights.get(i, j) else {continue};
                if weight > 0.0 {
                    graph.push_edge(*a, *b, weight);
                }
            }
        }
        graph.shrink_to_fit();
        graph
    }
}

fn check_matrix(name:&'static str,matrix:&Matrix,nodes:usize) -> Result<()> {
    matrix.validate_adjacency().map_err(|source| TopologyError::Malformed { name, source })?;
    let dimension = matrix.dimension();
    if dimension != (nodes,nodes) {
        return Err(TopologyError::NodeCountMismatch { name, dimension, nodes });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Link, Topology, TopologyError};
    use crate::linear_algebra::matrix::Matrix;

    fn m(rows:&[&[f64]]) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_link_canonical() {
        assert_eq!(Link::new(3,1),Link::new(1,3));
        assert_eq!(Link::new(3,1).low(),1);
        assert!(Link::new(1,3).carries(3,1));
        assert!(!Link::new(1,3).carries(1,2));
        assert_eq!(Link::new(5,2).to_string(),"2-5");
    }
    #[test]
    fn test_from_matrices() {
        let weights = m(&[&[0.0,2.0,0.0],&[2.0,0.0,3.0],&[0.0,3.0,0.0]]);
        let capacities = m(&[&[0.0,100.0,0.0],&[100.0,0.0,50.0],&[0.0,50.0,0.0]]);
        let demands = m(&[&[0.0,0.0,30.0],&[0.0,0.0,0.0],&[10.0,0.0,0.0]]);
        let topology = Topology::from_matrices(&[10,20,30], &weights, &capacities, &demands).unwrap();

        assert_eq!(topology.capacity().len(),2);
        assert_eq!(topology.capacity()[&Link::new(20,30)],50.0);
        assert_eq!(topology.demand().get(&(10,30)),Some(&30.0));
        assert_eq!(topology.demand().get(&(30,10)),Some(&10.0));
        assert_eq!(topology.canonical_links(),vec![Link::new(10,20),Link::new(10,30),Link::new(20,30)]);
        assert_eq!(topology.edge_index(30,10),Some((2,0)));

        let graph = topology.graph();
        assert_eq!(graph.edges_len(),4);
        assert_eq!(graph.weight(20,30),Some(3.0));
        assert_eq!(graph.weight(10,30),None);
    }
    #[test]
    fn test_rejects_malformed_input() {
        let ok = m(&[&[0.0,1.0],&[1.0,0.0]]);
        let negative = m(&[&[0.0,-1.0],&[1.0,0.0]]);
        let three = Matrix::zeros(3, 3);

        let err = Topology::from_matrices(&[1,2], &negative, &ok, &ok).unwrap_err();
        assert!(matches!(err,TopologyError::Malformed{name:"weight",..}));

        let err = Topology::from_matrices(&[1,2], &ok, &three, &ok).unwrap_err();
        assert!(matches!(err,TopologyError::NodeCountMismatch{name:"capacity",dimension:(3,3),nodes:2}));

        let err = Topology::from_matrices(&[1,1], &ok, &ok, &ok).unwrap_err();
        assert!(matches!(err,TopologyError::DuplicateNode(1)));
    }
}
