//! Traffic engineering simulator: routes a demand matrix over a small weighted network,
//! scores link congestion and tunes link weights to bring the maximum link utilization down.

pub mod config;
pub mod dsa;
pub mod linear_algebra;
pub mod traffic_engineering;

pub use config::{OptimizerConfig, Scenario, ScenarioError};
pub use dsa::graph::{DirectedGraph, NodeId, Path};
pub use linear_algebra::matrix::{Matrix, MatrixError};
pub use traffic_engineering::{
    compute_link_loads, compute_paths, run_optimization, Optimizer, OptimizerState, OptimizationReport, Topology,
};
