use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    person::{InfluenceRates, PersonId},
    region::RegionId,
    rng::SystemRng,
    world::World,
};

const SCHOOL_AGES: (u32, u32) = (5, 18);
const WORKPLACE_AGES: (u32, u32) = (18, 67);

/// School, workplace and public encounters, resolved region by region.
pub struct InteractionSystem;

impl InteractionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InteractionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for InteractionSystem {
    fn name(&self) -> &str {
        "interaction"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let rates = ctx.config.influence_rates();
        let mut total = 0usize;
        for region_id in world.region_ids() {
            total += interact_in_region(world, region_id, ctx, &rates, rng);
        }
        debug!(tick = ctx.tick, interactions = total, "interactions processed");
        Ok(())
    }
}

fn interact_in_region<R: Rng>(
    world: &mut World,
    region_id: RegionId,
    ctx: &SystemContext,
    rates: &InfluenceRates,
    rng: &mut R,
) -> usize {
    let Some(region) = world.regions.get(&region_id) else {
        return 0;
    };
    if region.resident_count() < 2 {
        return 0;
    }
    let students = region.residents_in_age_range(&world.persons, SCHOOL_AGES.0, SCHOOL_AGES.1);
    let workers =
        region.residents_in_age_range(&world.persons, WORKPLACE_AGES.0, WORKPLACE_AGES.1);
    let everyone: Vec<PersonId> = region.residents().collect();

    let mut count = 0;
    count += peer_pass(world, &students, ctx.config.num_school_interactions, rates, rng);
    count += peer_pass(world, &workers, ctx.config.num_workplace_interactions, rates, rng);

    for &initiator in &everyone {
        if !world.is_alive(initiator) {
            continue;
        }
        if rng.gen::<f64>() < ctx.config.prob_interaction_market
            && encounter(world, initiator, &everyone, rates, rng)
        {
            count += 1;
        }
    }
    count
}

/// Each live member of `group` initiates `rounds` encounters within the group.
fn peer_pass<R: Rng>(
    world: &mut World,
    group: &[PersonId],
    rounds: u32,
    rates: &InfluenceRates,
    rng: &mut R,
) -> usize {
    if group.len() < 2 {
        return 0;
    }
    let mut count = 0;
    for &initiator in group {
        if !world.is_alive(initiator) {
            continue;
        }
        for _ in 0..rounds {
            if encounter(world, initiator, group, rates, rng) {
                count += 1;
            }
        }
    }
    count
}

/// Draws a partner uniformly from the live members of `pool` other than the
/// initiator. Returns false when nobody is eligible.
fn encounter<R: Rng>(
    world: &mut World,
    initiator: PersonId,
    pool: &[PersonId],
    rates: &InfluenceRates,
    rng: &mut R,
) -> bool {
    let partners: Vec<PersonId> = pool
        .iter()
        .copied()
        .filter(|&id| id != initiator && world.is_alive(id))
        .collect();
    let Some(&partner) = partners.choose(rng) else {
        return false;
    };
    world
        .with_pair(initiator, partner, |a, b| a.interact_linguistically(b, rates))
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::person::{PopulationKind, Sex};
    use crate::region::{Region, RegionKind};
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn world_with_residents(ages: &[u32]) -> World {
        let region = Region::with_attributes(RegionId(1), "Solo", RegionKind::Rural, 40.0, 40.0);
        let mut world = World::with_regions([(region.id, region)].into_iter().collect());
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for &age in ages {
            world
                .spawn(PopulationKind::Native, age, Sex::Male, RegionId(1), 0.0, &mut rng)
                .unwrap();
        }
        world
    }

    fn busy_config() -> ModelConfig {
        ModelConfig {
            prob_interaction_market: 1.0,
            ..ModelConfig::default()
        }
    }

    fn draws_consumed(world: &mut World, config: &ModelConfig) -> (usize, bool) {
        let ctx = SystemContext { tick: 1, config };
        let rates = config.influence_rates();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut untouched = rng.clone();
        let count = interact_in_region(world, RegionId(1), &ctx, &rates, &mut rng);
        (count, rng.next_u64() != untouched.next_u64())
    }

    #[test]
    fn empty_and_singleton_regions_are_skipped_without_draws() {
        let config = busy_config();
        let cases: [&[u32]; 2] = [&[], &[30]];
        for ages in cases {
            let mut world = world_with_residents(ages);
            assert_eq!(draws_consumed(&mut world, &config), (0, false));
        }
    }

    #[test]
    fn two_residents_do_interact() {
        let config = busy_config();
        let mut world = world_with_residents(&[30, 40]);
        let (count, drew) = draws_consumed(&mut world, &config);
        assert!(count > 0);
        assert!(drew);
    }

    #[test]
    fn school_and_workplace_bands_do_not_mix() {
        let config = ModelConfig {
            prob_interaction_market: 0.0,
            ..ModelConfig::default()
        };
        let mut world = world_with_residents(&[10, 30]);
        let (count, _) = draws_consumed(&mut world, &config);
        assert_eq!(count, 0);
    }
}
