use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::region::{Region, RegionId};

/// How many of the best-ranked regions an arrival chooses between.
const SHORTLIST: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStrategy {
    Economic,
    Ethnic,
    Random,
}

impl SettlementStrategy {
    /// Even split, used for the founding immigrant population.
    pub fn draw_initial<R: Rng>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            SettlementStrategy::Economic
        } else {
            SettlementStrategy::Ethnic
        }
    }

    /// Two economic movers for every co-ethnic one.
    pub fn draw_inflow<R: Rng>(rng: &mut R) -> Self {
        if rng.gen_range(0..3) < 2 {
            SettlementStrategy::Economic
        } else {
            SettlementStrategy::Ethnic
        }
    }
}

/// Picks a destination against the current state of the registry.
/// Returns `None` only for an empty registry.
pub fn select_region<R: Rng>(
    regions: &BTreeMap<RegionId, Region>,
    strategy: SettlementStrategy,
    rng: &mut R,
) -> Option<RegionId> {
    match strategy {
        SettlementStrategy::Economic => {
            let ranked = ranked_by(regions, |r| r.economic_attractiveness);
            let shortlist = &ranked[..ranked.len().min(SHORTLIST)];
            shortlist.choose(rng).map(|r| r.id)
        }
        SettlementStrategy::Ethnic => {
            let candidates: Vec<&Region> = ranked_by(regions, Region::immigrant_density)
                .into_iter()
                .take(SHORTLIST)
                .filter(|r| r.immigrant_count() > 0)
                .collect();
            match candidates.choose(rng) {
                Some(region) => Some(region.id),
                None => select_region(regions, SettlementStrategy::Economic, rng),
            }
        }
        SettlementStrategy::Random => {
            let ids: Vec<RegionId> = regions.keys().copied().collect();
            ids.choose(rng).copied()
        }
    }
}

/// Attractiveness-weighted draw used to place the founding native population.
pub fn select_weighted<R: Rng>(
    regions: &BTreeMap<RegionId, Region>,
    rng: &mut R,
) -> Option<RegionId> {
    let candidates: Vec<&Region> = regions.values().collect();
    candidates
        .choose_weighted(rng, |r| r.economic_attractiveness.max(0.0))
        .ok()
        .map(|r| r.id)
}

fn ranked_by(regions: &BTreeMap<RegionId, Region>, key: impl Fn(&Region) -> f64) -> Vec<&Region> {
    let mut ranked: Vec<&Region> = regions.values().collect();
    ranked.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
    ranked
}
