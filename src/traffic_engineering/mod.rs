// IGP metric tuning on a small weighted network
// routes every demand over its cheapest simple paths, measures link utilization,
// then nudges link weights around congested links until nothing is congested
// or the iteration budget runs out (Fortz-Thorup style local search)

/* one iteration:
weights -> graph -> k cheapest paths per node pair -> traffic split per demand
-> link loads -> utilization / fortz cost / phi -> weight adjustment
nothing is cached between iterations, everything after the weights is rebuilt */

pub mod congestion;
pub mod generator;
pub mod optimizer;
pub mod paths;
pub mod report;
pub mod splitter;
pub mod topology;

pub use congestion::{fortz_cost, utilization, CongestionReport, LinkStat};
pub use optimizer::{run_optimization, Optimizer, OptimizerState, WeightAdjustment};
pub use paths::{compute_paths, compute_paths_with, ExhaustiveKPaths, KPathStrategy, PathTable, RankedPath};
pub use report::{FinalSummary, IterationObserver, IterationReport, NoopObserver, OptimizationReport};
pub use splitter::{compute_link_loads, LinkLoads, PathLoad, TrafficSplits};
pub use topology::{CapacityMap, DemandMap, Link, Pair, Topology, TopologyError};
