use rand::Rng;

use crate::config::{OptimizerConfig, Scenario, ScenarioError};
use crate::linear_algebra::matrix::Matrix;

const WEIGHT_RANGE:std::ops::Range<f64> = 1.0..20.0;
const CAPACITY_RANGE:std::ops::Range<f64> = 500.0..1500.0;
const DEMAND_RANGE:std::ops::Range<f64> = 50.0..600.0;

// integral metrics read better in reports and make equal cost paths likely
fn round_entries(matrix:&Matrix) -> Matrix {
    let (rows,cols) = matrix.dimension();
    let mut rounded = matrix.clone();
    for i in 0..rows {
        for j in 0..cols {
            if let Ok(value) = rounded.get_mut(i, j) {
                *value = value.round();
            }
        }
    }
    rounded
}

/// Random symmetric scenario over nodes `1..=nodes`.
///
/// Consecutive nodes are always linked, so every pair is reachable; any other pair is
/// linked with probability `density`. Every node pair gets a capacity, and demands are
/// drawn for roughly half of the pairs. A density outside `[0, 1]` is rejected.
pub fn random_scenario<R:Rng>(rng:&mut R,nodes:usize,density:f64) -> Result<Scenario,ScenarioError> {
    if !(0.0..=1.0).contains(&density) {
        return Err(ScenarioError::InvalidDensity(density));
    }
    let mut weights = round_entries(&Matrix::rand_symmetric(nodes, density, WEIGHT_RANGE, rng));
    for i in 1..nodes {
        let weight = rng.random_range(WEIGHT_RANGE).round();
        for (a,b) in [(i-1,i),(i,i-1)] {
            if let Ok(entry) = weights.get_mut(a, b) {
                *entry = weight;
            }
        }
    }
    let capacities = round_entries(&Matrix::rand_symmetric(nodes, 1.0, CAPACITY_RANGE, rng));
    let demands = round_entries(&Matrix::rand_symmetric(nodes, 0.5, DEMAND_RANGE, rng));
    Ok(Scenario {
        nodes:(1..=nodes).collect(),
        weights:weights.to_rows(),
        capacities:capacities.to_rows(),
        demands:demands.to_rows(),
        capacity_scale:1.0,
        optimizer:OptimizerConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::random_scenario;
    use crate::config::ScenarioError;
    use crate::traffic_engineering::paths::compute_paths;

    #[test]
    fn test_random_scenario_is_connected() {
        let mut rng = rand::rng();
        for nodes in 2..7 {
            let scenario = random_scenario(&mut rng, nodes, 0.3).unwrap();
            let topology = scenario.topology().unwrap();
            let table = compute_paths(&topology.graph(), topology.nodes());
            assert_eq!(table.len(),nodes*(nodes-1)/2);
            assert_eq!(topology.capacity().len(),nodes*(nodes-1)/2);
        }
    }
    #[test]
    fn test_seeded_is_reproducible() {
        let a = random_scenario(&mut StdRng::seed_from_u64(7), 5, 0.5).unwrap();
        let b = random_scenario(&mut StdRng::seed_from_u64(7), 5, 0.5).unwrap();
        assert_eq!(a,b);
    }
    #[test]
    fn test_rejects_bad_density() {
        let mut rng = rand::rng();
        for density in [f64::NAN,-0.1,1.5,f64::INFINITY] {
            let err = random_scenario(&mut rng, 4, density).unwrap_err();
            assert!(matches!(err,ScenarioError::InvalidDensity(_)));
        }
        assert!(random_scenario(&mut rng, 4, 0.0).is_ok());
        assert!(random_scenario(&mut rng, 4, 1.0).is_ok());
    }
}
