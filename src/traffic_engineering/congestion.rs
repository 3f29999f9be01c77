use lazy_static::lazy_static;
use serde::Serialize;

use super::splitter::LinkLoads;
use super::topology::{CapacityMap, Link};

type Utilization = f64;
type FortzCost = f64;

// cost charged above the last breakpoint
const FORTZ_SATURATED:FortzCost = 5000.0;

lazy_static! {
    // (upper bound of the bracket, cost), each bracket is [previous bound, upper bound)
    // steep growth as a link approaches and passes saturation
    static ref fortz_brackets:Vec<(Utilization,FortzCost)> = vec![
        (1.0/3.0, 1.0),
        (2.0/3.0, 3.0),
        (9.0/10.0, 10.0),
        (1.0, 70.0),
        (1.1, 500.0),
    ];
}

pub fn utilization(load:f64,capacity:f64) -> Utilization {
    if capacity > 0.0 {load/capacity} else {0.0}
}

// piecewise constant penalty of a link's utilization
pub fn fortz_cost(utilization:Utilization) -> FortzCost {
    fortz_brackets.iter()
        .find(|(upper,_)| utilization < *upper)
        .map(|(_,cost)| *cost)
        .unwrap_or(FORTZ_SATURATED)
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct LinkStat {
    pub link:Link,
    pub load:f64,
    pub capacity:f64,
    pub utilization:Utilization,
    pub congested:bool,
    pub fortz_cost:FortzCost
}

impl LinkStat {
    pub fn status(&self) -> &'static str {
        if self.congested {"CONGESTED"} else {"OK"}
    }
}

/// Per-link statistics plus the network wide scores of one routing state.
#[derive(Clone,Debug,Default,PartialEq,Serialize)]
pub struct CongestionReport {
    pub links:Vec<LinkStat>,
    pub mlu:Utilization,
    pub extra_load:f64,
    pub total_fortz_cost:FortzCost,
    // mlu + extra_load / number of links
    pub phi:f64
}

impl CongestionReport {
    /// Scores `links` (normally every node pair of the topology, loaded or not).
    /// A missing load counts as 0, a missing capacity as 0, which makes the link
    /// unable to congest.
    pub fn evaluate(loads:&LinkLoads,capacity:&CapacityMap,links:&[Link]) -> Self {
        let mut report = Self {links:Vec::with_capacity(links.len()),..Default::default()};
        for link in links.iter() {
            let load = loads.get(link).copied().unwrap_or(0.0);
            let cap = capacity.get(link).copied().unwrap_or(0.0);
            let u = utilization(load, cap);
            let congested = u > 1.0;
            if congested {
                report.extra_load += (load - cap).max(0.0);
            }
            report.mlu = report.mlu.max(u);
            let fortz = fortz_cost(u);
            report.total_fortz_cost += fortz;
            report.links.push(LinkStat {
                link:*link,
                load,
                capacity:cap,
                utilization:u,
                congested,
                fortz_cost:fortz
            });
        }
        report.phi = if links.is_empty() {
            0.0
        } else {
            report.mlu + report.extra_load/links.len() as f64
        };
        report
    }
    pub fn congested_links(&self) -> Vec<Link> {
        self.links.iter().filter(|stat| stat.congested).map(|stat| stat.link).collect()
    }
    pub fn is_congested(&self) -> bool {
        self.links.iter().any(|stat| stat.congested)
    }
}
