use serde::Serialize;

use crate::dsa::graph::NodeId;
use super::congestion::{fortz_cost, utilization, CongestionReport};
use super::optimizer::{OptimizerState, WeightAdjustment};
use super::paths::RankedPath;
use super::splitter::{LinkLoads, PathLoad};
use super::topology::{CapacityMap, Link};

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct PairPaths {
    pub src:NodeId,
    pub dst:NodeId,
    // every simple path with its cost, in discovery order; empty unless requested
    pub all_paths:Vec<RankedPath>,
    pub k_paths:Vec<RankedPath>
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct PairSplit {
    pub src:NodeId,
    pub dst:NodeId,
    pub demand:f64,
    pub splits:Vec<PathLoad>
}

/// Everything one iteration computed, plus the weight changes it made afterwards.
#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct IterationReport {
    pub iteration:usize,
    pub paths:Vec<PairPaths>,
    pub splits:Vec<PairSplit>,
    pub congestion:CongestionReport,
    pub adjustments:Vec<WeightAdjustment>,
    // weight matrix once this iteration's adjustments are applied
    pub weights_after:Vec<Vec<f64>>
}

#[derive(Clone,Debug,Default,PartialEq,Serialize)]
pub struct FinalSummary {
    pub mlu:f64,
    pub links:Vec<Link>,
    // rounded to two decimals, same order as `links`
    pub utilizations:Vec<f64>,
    pub fortz_costs:Vec<f64>
}

impl FinalSummary {
    pub fn from_loads(loads:&LinkLoads,capacity:&CapacityMap,links:&[Link]) -> Self {
        let mut summary = Self::default();
        for link in links.iter() {
            let u = utilization(
                loads.get(link).copied().unwrap_or(0.0),
                capacity.get(link).copied().unwrap_or(0.0)
            );
            summary.mlu = summary.mlu.max(u);
            summary.links.push(*link);
            summary.utilizations.push(round2(u));
            summary.fortz_costs.push(fortz_cost(u));
        }
        summary
    }
}

// halves go to the even digit, 0.625 -> 0.62
fn round2(value:f64) -> f64 {
    (value*100.0).round_ties_even()/100.0
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct OptimizationReport {
    pub state:OptimizerState,
    // number of iterations that ran
    pub iterations:usize,
    pub history:Vec<IterationReport>,
    pub final_weights:Vec<Vec<f64>>,
    pub summary:FinalSummary
}

impl OptimizationReport {
    pub fn last(&self) -> Option<&IterationReport> {
        self.history.last()
    }
}

/// Receives each iteration's report as soon as the iteration is done.
pub trait IterationObserver {
    fn on_iteration(&mut self,report:&IterationReport);
}

impl<F:FnMut(&IterationReport)> IterationObserver for F {
    fn on_iteration(&mut self,report:&IterationReport) {
        self(report)
    }
}

pub struct NoopObserver;

impl IterationObserver for NoopObserver {
    fn on_iteration(&mut self,_report:&IterationReport) {}
}
