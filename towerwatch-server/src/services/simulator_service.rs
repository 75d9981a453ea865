use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use towerwatch_api::IO_LINES;

use crate::services::DeviceRegistry;

/// Random choices behind synthetic telemetry. The engine turns them into
/// the same mutations real events produce.
pub struct Simulator {
    rng: StdRng,
}

impl Simulator {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn pick_tower(&mut self, registry: &DeviceRegistry) -> Option<String> {
        if registry.is_empty() {
            return None;
        }

        let index = self.rng.random_range(0..registry.len());
        registry.tower_at(index).map(|tower| tower.id.clone())
    }

    pub fn pick_line(&mut self) -> usize {
        self.rng.random_range(0..IO_LINES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::default_regions;

    #[test]
    fn test_picks_stay_in_range() {
        let registry = DeviceRegistry::seed(default_regions(), 10, 1001, &mut StdRng::seed_from_u64(9));
        let mut simulator = Simulator::seeded(42);

        for _ in 0..100 {
            let id = simulator.pick_tower(&registry).unwrap();
            assert!(registry.get(&id).is_some());
            assert!(simulator.pick_line() < IO_LINES);
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = DeviceRegistry::new(default_regions());

        assert!(Simulator::seeded(1).pick_tower(&registry).is_none());
    }
}
