use std::collections::HashMap;

use rand::Rng;
use towerwatch_api::{FleetStats, GeoPoint, IO_LINES, LedState, Region, Tower};

const ONLINE_PROBABILITY: f64 = 0.88;
const LOCATION_JITTER_DEG: f64 = 0.04;

pub fn default_regions() -> Vec<Region> {
    vec![
        Region::new("PERTH", "PR", -31.95, 115.86),
        Region::new("FREMANTLE", "FR", -32.0569, 115.7439),
        Region::new("SYDNEY", "SY", -33.8688, 151.2093),
        Region::new("MELBOURNE", "MB", -37.8136, 144.9631),
        Region::new("BRISBANE", "BN", -27.4698, 153.0251),
        Region::new("GOLD COAST", "GC", -28.0, 153.43),
        Region::new("DARWIN", "DR", -12.4634, 130.8456),
        Region::new("ADELAIDE", "AD", -34.9285, 138.6007),
    ]
}

/// Canonical set of tower records.
///
/// Towers are only ever added during seeding and never removed, so the
/// positional indexes stay valid for the lifetime of the registry.
pub struct DeviceRegistry {
    towers: Vec<Tower>,
    regions: Vec<Region>,
    by_id: HashMap<String, usize>,
    /// `{region code}{sequence}` -> position
    by_code: HashMap<String, usize>,
}

impl DeviceRegistry {
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            towers: Vec::new(),
            regions,
            by_id: HashMap::new(),
            by_code: HashMap::new(),
        }
    }

    /// Creates `total` towers round-robin over `regions`, numbered from
    /// `first_sequence`.
    pub fn seed<R: Rng>(
        regions: Vec<Region>,
        total: usize,
        first_sequence: u32,
        rng: &mut R,
    ) -> Self {
        let mut registry = Self::new(regions);
        if registry.regions.is_empty() {
            return registry;
        }

        let mut sequence = first_sequence;
        for i in 0..total {
            let region = &registry.regions[i % registry.regions.len()];
            let tower = Tower {
                id: format!("{} {}{}", region.name, region.code, sequence),
                region_name: region.name.clone(),
                region_code: region.code.clone(),
                site: format!("{} Beach Tower", region.name),
                ip: format!("10.0.{}.{}", i / 250, i % 250 + 10),
                online: rng.random::<f64>() < ONLINE_PROBABILITY,
                signal: rng.random_range(1..=5),
                inputs: [0; IO_LINES],
                outputs: [0; IO_LINES],
                loc: GeoPoint {
                    lat: region.lat + (rng.random::<f64>() - 0.5) * LOCATION_JITTER_DEG,
                    lng: region.lng + (rng.random::<f64>() - 0.5) * LOCATION_JITTER_DEG,
                },
                led: LedState::default(),
            };

            if !registry.insert(tower, sequence) {
                tracing::warn!("Skipping duplicate tower sequence {}", sequence);
            }
            sequence += 1;
        }

        registry
    }

    /// Adds a tower, returning `false` when its id is already taken.
    pub fn insert(&mut self, tower: Tower, sequence: u32) -> bool {
        if self.by_id.contains_key(&tower.id) {
            return false;
        }

        let index = self.towers.len();
        self.by_code
            .entry(format!("{}{}", tower.region_code, sequence))
            .or_insert(index);
        self.by_id.insert(tower.id.clone(), index);
        self.towers.push(tower);

        true
    }

    /// Resolves an identifier token to a registry position.
    ///
    /// Tried in order: exact id, id with `_`/`-` read as spaces,
    /// `{region code}{trailing digits}`, then a linear scan for the exact id.
    pub fn resolve(&self, token: &str) -> Option<usize> {
        if let Some(&index) = self.by_id.get(token) {
            return Some(index);
        }

        let normalized = token.replace(['_', '-'], " ");
        if let Some(&index) = self.by_id.get(&normalized) {
            return Some(index);
        }

        if let Some(&index) = code_key(token).and_then(|key| self.by_code.get(&key)) {
            return Some(index);
        }

        self.towers.iter().position(|tower| tower.id == token)
    }

    pub fn lookup(&self, token: &str) -> Option<&Tower> {
        self.resolve(token).map(|index| &self.towers[index])
    }

    pub fn lookup_mut(&mut self, token: &str) -> Option<&mut Tower> {
        self.resolve(token).map(|index| &mut self.towers[index])
    }

    /// Exact id match only.
    pub fn get(&self, id: &str) -> Option<&Tower> {
        self.by_id.get(id).map(|&index| &self.towers[index])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Tower> {
        self.by_id.get(id).map(|&index| &mut self.towers[index])
    }

    pub fn tower_at(&self, index: usize) -> Option<&Tower> {
        self.towers.get(index)
    }

    pub fn tower_at_mut(&mut self, index: usize) -> Option<&mut Tower> {
        self.towers.get_mut(index)
    }

    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    pub fn towers_mut(&mut self) -> impl Iterator<Item = &mut Tower> {
        self.towers.iter_mut()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.towers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towers.is_empty()
    }

    /// Recomputed from every record on each call.
    pub fn stats(&self) -> FleetStats {
        FleetStats::from_towers(&self.towers)
    }
}

fn code_key(token: &str) -> Option<String> {
    let split = token.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (code, digits) = token.split_at(split);

    if code.is_empty() || digits.is_empty() {
        return None;
    }

    Some(format!("{}{}", code.to_ascii_uppercase(), digits))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn seeded(total: usize) -> DeviceRegistry {
        let mut rng = StdRng::seed_from_u64(7);
        DeviceRegistry::seed(default_regions(), total, 1001, &mut rng)
    }

    #[test]
    fn test_seed_assigns_regions_round_robin() {
        let registry = seeded(20);

        assert_eq!(registry.len(), 20);
        assert_eq!(registry.towers()[0].id, "PERTH PR1001");
        assert_eq!(registry.towers()[1].id, "FREMANTLE FR1002");
        assert_eq!(registry.towers()[8].id, "PERTH PR1009");
        assert_eq!(registry.towers()[5].site, "GOLD COAST Beach Tower");
        assert_eq!(registry.towers()[3].ip, "10.0.0.13");

        for tower in registry.towers() {
            assert!((1..=5).contains(&tower.signal));
            assert_eq!(tower.inputs, [0, 0, 0]);
            assert_eq!(tower.outputs, [0, 0, 0]);
            assert_eq!(tower.led, LedState::default());
        }
    }

    #[test]
    fn test_lookup_variants_resolve_to_same_record() {
        let registry = seeded(16);
        let expected = registry.resolve("PERTH PR1001");

        assert_eq!(expected, Some(0));
        assert_eq!(registry.resolve("PERTH_PR1001"), expected);
        assert_eq!(registry.resolve("PERTH-PR1001"), expected);
        assert_eq!(registry.resolve("PR1001"), expected);
        assert_eq!(registry.resolve("pr1001"), expected);

        assert_eq!(registry.resolve("GOLD_COAST_GC1006"), Some(5));
        assert_eq!(registry.resolve("GC1006"), Some(5));
    }

    #[test]
    fn test_code_lookup_requires_matching_sequence() {
        let registry = seeded(16);

        // PR is only used by sequences 1001 and 1009
        assert!(registry.resolve("PR1002").is_none());
        assert_eq!(registry.resolve("PR1009"), Some(8));
    }

    #[test]
    fn test_unresolved_tokens() {
        let registry = seeded(8);

        assert!(registry.lookup("").is_none());
        assert!(registry.lookup("1001").is_none());
        assert!(registry.lookup("PR").is_none());
        assert!(registry.lookup("NOWHERE NW1001").is_none());
    }

    #[test]
    fn test_lookup_mut_returns_shared_record() {
        let mut registry = seeded(8);

        registry.lookup_mut("PR1001").unwrap().outputs[2] = 1;

        assert_eq!(registry.get("PERTH PR1001").unwrap().outputs, [0, 0, 1]);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut registry = seeded(2);
        let duplicate = registry.towers()[0].clone();

        assert!(!registry.insert(duplicate, 1001));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_stats_are_recomputed() {
        let mut registry = seeded(8);
        for tower in registry.towers_mut() {
            tower.online = true;
        }
        registry.tower_at_mut(2).unwrap().online = false;
        registry.tower_at_mut(4).unwrap().inputs = [0, 1, 0];

        let stats = registry.stats();
        assert_eq!(stats.online, 7);
        assert_eq!(stats.offline, 1);
        assert_eq!(stats.alarms, 1);
    }
}
