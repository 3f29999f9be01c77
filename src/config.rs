//! Optimizer settings and the scenario file format.

use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dsa::graph::NodeId;
use crate::linear_algebra::matrix::Matrix;
use crate::traffic_engineering::paths::DEFAULT_K;
use crate::traffic_engineering::topology::{Topology, TopologyError};

pub const DEFAULT_MAX_ITERATIONS:usize = 15;

#[derive(Error,Debug)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io{path:String,#[source] source:std::io::Error},
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("capacity_scale must be finite and positive, got {0}")]
    InvalidScale(f64),
    #[error("link density must lie in [0, 1], got {0}")]
    InvalidDensity(f64),
    #[error(transparent)]
    Topology(#[from] TopologyError)
}

/// Knobs of the weight tuning loop.
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Iterations before giving up
    pub max_iterations:usize,
    /// Candidate paths kept per node pair
    pub k:usize,
    /// Cap on enumerated simple paths per pair, unbounded when unset
    pub max_paths:Option<usize>,
    /// Attach every enumerated path with its cost to each iteration report
    pub report_all_paths:bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations:DEFAULT_MAX_ITERATIONS,
            k:DEFAULT_K,
            max_paths:None,
            report_all_paths:true,
        }
    }
}

/// A network to optimize, as stored on disk.
///
/// Matrices are node×node, entry (i,j) describes `nodes[i] -> nodes[j]`, 0 means absent.
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct Scenario {
    pub nodes:Vec<NodeId>,
    pub weights:Vec<Vec<f64>>,
    pub capacities:Vec<Vec<f64>>,
    pub demands:Vec<Vec<f64>>,
    /// Multiplies every capacity entry, e.g. 0.8 to plan against 80% of the physical capacity
    #[serde(default = "default_capacity_scale")]
    pub capacity_scale:f64,
    #[serde(default)]
    pub optimizer:OptimizerConfig,
}

fn default_capacity_scale() -> f64 {
    1.0
}

impl Scenario {
    pub fn load<P:AsRef<Path>>(path:P) -> Result<Self,ScenarioError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ScenarioError::Io { path: path.display().to_string(), source })?;
        Self::from_json(&content)
    }
    pub fn from_json(content:&str) -> Result<Self,ScenarioError> {
        let scenario:Self = serde_json::from_str(content)?;
        if !scenario.capacity_scale.is_finite() || scenario.capacity_scale <= 0.0 {
            return Err(ScenarioError::InvalidScale(scenario.capacity_scale));
        }
        Ok(scenario)
    }
    pub fn to_json(&self) -> Result<String,ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
    // validated matrices: weights, scaled capacities, demands
    pub fn matrices(&self) -> Result<(Matrix,Matrix,Matrix),ScenarioError> {
        let weights = Matrix::from_rows(self.weights.as_slice()).map_err(TopologyError::from)?;
        let capacities = Matrix::from_rows(self.capacities.as_slice()).map_err(TopologyError::from)?
            .scale(self.capacity_scale);
        let demands = Matrix::from_rows(self.demands.as_slice()).map_err(TopologyError::from)?;
        Ok((weights,capacities,demands))
    }
    pub fn topology(&self) -> Result<Topology,ScenarioError> {
        let (weights,capacities,demands) = self.matrices()?;
        Ok(Topology::from_matrices(&self.nodes, &weights, &capacities, &demands)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{OptimizerConfig, Scenario, ScenarioError};
    use crate::traffic_engineering::topology::{Link, TopologyError};

    const TWO_NODES:&str = r#"{
        "nodes": [1, 2],
        "weights": [[0, 1], [1, 0]],
        "capacities": [[0, 1000], [1000, 0]],
        "demands": [[0, 300], [0, 0]],
        "capacity_scale": 0.8,
        "optimizer": {"max_iterations": 3}
    }"#;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::from_json(TWO_NODES).unwrap();
        assert_eq!(scenario.optimizer.max_iterations,3);
        assert_eq!(scenario.optimizer.k,2);
        assert!(scenario.optimizer.report_all_paths);
        let topology = scenario.topology().unwrap();
        assert_eq!(topology.capacity()[&Link::new(1,2)],800.0);
        assert_eq!(topology.demand()[&(1,2)],300.0);

        let round_trip = Scenario::from_json(&scenario.to_json().unwrap()).unwrap();
        assert_eq!(round_trip,scenario);
    }
    #[test]
    fn test_defaults() {
        let scenario = Scenario::from_json(r#"{"nodes":[],"weights":[],"capacities":[],"demands":[]}"#).unwrap();
        assert_eq!(scenario.capacity_scale,1.0);
        assert_eq!(scenario.optimizer,OptimizerConfig::default());
        assert!(scenario.topology().unwrap().canonical_links().is_empty());
    }
    #[test]
    fn test_bad_scenarios() {
        let err = Scenario::from_json(r#"{"nodes":[1]}"#).unwrap_err();
        assert!(matches!(err,ScenarioError::Parse(_)));

        let err = Scenario::from_json(&TWO_NODES.replace("0.8","-1.0")).unwrap_err();
        assert!(matches!(err,ScenarioError::InvalidScale(_)));

        let ragged = TWO_NODES.replace("[[0, 300], [0, 0]]","[[0, 300], [0]]");
        let err = Scenario::from_json(&ragged).unwrap().topology().unwrap_err();
        assert!(matches!(err,ScenarioError::Topology(TopologyError::Matrix(_))));

        let err = Scenario::load("/nonexistent/scenario.json").unwrap_err();
        assert!(matches!(err,ScenarioError::Io{..}));
    }
}
