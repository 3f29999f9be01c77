use serde::Serialize;

use crate::config::OptimizerConfig;
use crate::dsa::graph::{DirectedGraph, NodeId};
use crate::linear_algebra::matrix::Matrix;
use super::congestion::CongestionReport;
use super::paths::{compute_paths_with, ExhaustiveKPaths, KPathStrategy, PathTable, RankedPath};
use super::report::{FinalSummary, IterationObserver, IterationReport, NoopObserver, OptimizationReport, PairPaths, PairSplit};
use super::splitter::{compute_link_loads, LinkLoads, TrafficSplits};
use super::topology::{Link, Topology, TopologyError};

// tuned weights never drop below this
const MIN_WEIGHT:f64 = 1.0;

#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize)]
pub enum OptimizerState {
    Running,
    // an iteration found no congested link
    Converged,
    // iteration budget used up while links were still congested
    Exhausted
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct WeightAdjustment {
    pub link:Link,
    pub alternate:RankedPath,
    // weight of low -> high before the increase
    pub weight_before:f64,
    pub delta:f64,
    // the one alternate path edge that got cheaper, if any
    pub discounted_edge:Option<(NodeId,NodeId)>
}

// routing state derived from one weight matrix
struct Evaluation {
    graph:DirectedGraph,
    paths:PathTable,
    loads:LinkLoads,
    splits:TrafficSplits,
    congestion:CongestionReport
}

/// Local search over the link weights of a topology.
///
/// Owns its own copy of the weights; the topology it was built from is never touched.
pub struct Optimizer<'a,S:KPathStrategy = ExhaustiveKPaths> {
    topology:&'a Topology,
    weights:Matrix,
    config:OptimizerConfig,
    strategy:S,
    links:Vec<Link>,
    state:OptimizerState,
    iteration:usize
}

impl<'a> Optimizer<'a,ExhaustiveKPaths> {
    pub fn new(topology:&'a Topology,config:OptimizerConfig) -> Self {
        let strategy = ExhaustiveKPaths::new(config.max_paths);
        Self::with_strategy(topology, config, strategy)
    }
}

impl<'a,S:KPathStrategy> Optimizer<'a,S> {
    pub fn with_strategy(topology:&'a Topology,config:OptimizerConfig,strategy:S) -> Self {
        Self {
            topology,
            weights:topology.weights().clone(),
            config,
            strategy,
            links:topology.canonical_links(),
            state:OptimizerState::Running,
            iteration:0
        }
    }
    pub fn state(&self) -> OptimizerState {
        self.state
    }
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    fn evaluate(&self) -> Evaluation {
        let graph = self.topology.graph_with(&self.weights);
        let paths = compute_paths_with(&graph, self.topology.nodes(), &self.strategy, self.config.k);
        let (loads,splits) = compute_link_loads(self.topology.demand(), &paths, &graph, self.topology.capacity());
        let congestion = CongestionReport::evaluate(&loads, self.topology.capacity(), &self.links);
        Evaluation {graph,paths,loads,splits,congestion}
    }

    fn weight(&self,a:NodeId,b:NodeId) -> f64 {
        self.topology.edge_index(a, b)
            .and_then(|(i,j)| self.weights.get(i, j).ok())
            .unwrap_or(0.0)
    }

    // moves an existing directed edge by `delta`, absent edges stay absent
    // a decrease never goes below MIN_WEIGHT
    fn shift_weight(&mut self,a:NodeId,b:NodeId,delta:f64) {
        let Some((i,j)) = self.topology.edge_index(a, b) else {return};
        let Ok(weight) = self.weights.get_mut(i, j) else {return};
        if *weight <= 0.0 {
            return;
        }
        let shifted = *weight + delta;
        *weight = if delta < 0.0 {shifted.max(MIN_WEIGHT)} else {shifted};
    }

    // cheapest u -> v detour that does not use the link itself, first one wins a tie
    fn alternate_path(&self,graph:&DirectedGraph,link:Link) -> Option<RankedPath> {
        let mut best:Option<RankedPath> = None;
        for (path,cost) in graph.all_simple_paths_with_costs(link.low(), link.high(), self.config.max_paths) {
            let candidate = RankedPath {cost,path};
            if candidate.hops().any(|(a,b)| link.carries(a, b)) {
                continue;
            }
            if best.as_ref().is_none_or(|b| candidate.cost < b.cost) {
                best = Some(candidate);
            }
        }
        best
    }

    // make the congested link dearer and one edge of its detour cheaper
    fn adjust_link(&mut self,graph:&DirectedGraph,link:Link) -> Option<WeightAdjustment> {
        let (u,v) = (link.low(),link.high());
        let Some(alternate) = self.alternate_path(graph, link) else {
            tracing::debug!(%link, "no detour around congested link");
            return None;
        };
        let weight_before = self.weight(u, v);
        let delta = (alternate.cost - weight_before)/2.0;
        if delta <= 0.0 {
            tracing::debug!(%link, detour = alternate.cost, weight = weight_before, "detour is not dearer, leaving link");
            return None;
        }
        self.shift_weight(u, v, delta);
        self.shift_weight(v, u, delta);

        let mut discounted_edge = None;
        for (a,b) in alternate.hops() {
            if self.weight(a, b) > delta {
                self.shift_weight(a, b, -delta);
                self.shift_weight(b, a, -delta);
                discounted_edge = Some((a,b));
                break;
            }
        }
        tracing::debug!(%link, delta, detour = %alternate, ?discounted_edge, "adjusted weights");
        Some(WeightAdjustment {link,alternate,weight_before,delta,discounted_edge})
    }

    fn iteration_report(&self,iteration:usize,evaluation:&Evaluation,adjustments:Vec<WeightAdjustment>) -> IterationReport {
        let paths = evaluation.paths.k_paths.iter().map(|((src,dst),k_paths)| {
            let all_paths = if self.config.report_all_paths {
                evaluation.graph.all_simple_paths_with_costs(*src, *dst, self.config.max_paths)
                    .into_iter()
                    .map(|(path,cost)| RankedPath {cost,path})
                    .collect()
            } else {
                vec![]
            };
            PairPaths {src:*src,dst:*dst,all_paths,k_paths:k_paths.clone()}
        }).collect();
        let splits = evaluation.splits.iter().map(|((src,dst),splits)| PairSplit {
            src:*src,
            dst:*dst,
            demand:self.topology.demand().get(&(*src,*dst)).copied().unwrap_or(0.0),
            splits:splits.clone()
        }).collect();
        IterationReport {
            iteration,
            paths,
            splits,
            congestion:evaluation.congestion.clone(),
            adjustments,
            weights_after:self.weights.to_rows()
        }
    }

    /// Runs one iteration: evaluate the current weights, and if anything is congested
    /// adjust the weights around every congested link. Returns `None` once the
    /// optimizer has stopped.
    pub fn step(&mut self) -> Option<(IterationReport,LinkLoads)> {
        if self.state != OptimizerState::Running {
            return None;
        }
        if self.iteration >= self.config.max_iterations {
            self.state = OptimizerState::Exhausted;
            return None;
        }
        self.iteration += 1;
        let evaluation = self.evaluate();
        let congested = evaluation.congestion.congested_links();
        tracing::info!(
            iteration = self.iteration,
            mlu = evaluation.congestion.mlu,
            phi = evaluation.congestion.phi,
            total_fortz_cost = evaluation.congestion.total_fortz_cost,
            congested = congested.len(),
            "evaluated routing"
        );

        let mut adjustments = Vec::with_capacity(congested.len());
        if congested.is_empty() {
            self.state = OptimizerState::Converged;
        } else {
            for link in congested {
                if let Some(adjustment) = self.adjust_link(&evaluation.graph, link) {
                    adjustments.push(adjustment);
                }
            }
        }
        let report = self.iteration_report(self.iteration, &evaluation, adjustments);
        Some((report,evaluation.loads))
    }

    /// Iterates until no link is congested or the iteration budget is spent.
    ///
    /// The final summary is computed from the loads of the last evaluated iteration,
    /// i.e. it does not reflect the weight changes made in that same iteration.
    pub fn run<O:IterationObserver + ?Sized>(mut self,observer:&mut O) -> OptimizationReport {
        let mut history = Vec::new();
        let mut last_loads = LinkLoads::new();
        while let Some((report,loads)) = self.step() {
            observer.on_iteration(&report);
            history.push(report);
            last_loads = loads;
        }
        match self.state {
            OptimizerState::Converged => tracing::info!(iterations = self.iteration, "no congested links remaining"),
            _ => tracing::warn!(iterations = self.iteration, "iteration budget exhausted with congested links"),
        }
        let summary = FinalSummary::from_loads(&last_loads, self.topology.capacity(), &self.links);
        tracing::info!(mlu = summary.mlu, "optimization finished");
        OptimizationReport {
            state:self.state,
            iterations:self.iteration,
            history,
            final_weights:self.weights.to_rows(),
            summary
        }
    }
}

/// Validates the input matrices and runs the optimizer with default settings and the
/// given iteration budget. The caller's matrices are only read.
pub fn run_optimization(
    weight_matrix:&Matrix,
    capacity_matrix:&Matrix,
    demand_matrix:&Matrix,
    nodes:&[NodeId],
    max_iterations:usize
) -> Result<OptimizationReport,TopologyError> {
    let topology = Topology::from_matrices(nodes, weight_matrix, capacity_matrix, demand_matrix)?;
    let config = OptimizerConfig {max_iterations,..Default::default()};
    Ok(Optimizer::new(&topology, config).run(&mut NoopObserver))
}
