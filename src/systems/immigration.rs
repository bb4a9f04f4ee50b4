use anyhow::{Context, Result};
use rand::Rng;
use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    person::{PopulationKind, Sex},
    rng::SystemRng,
    settlement::{select_region, SettlementStrategy},
    world::{World, WorldError},
};

const ARRIVAL_AGE_MIN: u32 = 18;
const ARRIVAL_AGE_MAX: u32 = 45;

/// Monthly inflow of newly arrived immigrants.
pub struct ImmigrationSystem;

impl ImmigrationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImmigrationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ImmigrationSystem {
    fn name(&self) -> &str {
        "immigration"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let arrivals = ctx.config.monthly_inflow();
        for _ in 0..arrivals {
            let strategy = SettlementStrategy::draw_inflow(rng);
            settle_immigrant(world, strategy, ctx.config.reveal_share_migrants, rng)
                .with_context(|| format!("placing arrival with {strategy:?} strategy"))?;
        }
        debug!(tick = ctx.tick, arrivals, "immigration processed");
        Ok(())
    }
}

/// Creates one working-age immigrant in a region chosen by `strategy`,
/// evaluated against the registry as it stands right now.
pub(crate) fn settle_immigrant<R: Rng>(
    world: &mut World,
    strategy: SettlementStrategy,
    reveal_share: f64,
    rng: &mut R,
) -> Result<(), WorldError> {
    let age = rng.gen_range(ARRIVAL_AGE_MIN..=ARRIVAL_AGE_MAX);
    let sex = Sex::random(rng);
    let region = select_region(&world.regions, strategy, rng).ok_or(WorldError::EmptyRegistry)?;
    world.spawn(PopulationKind::Immigrant, age, sex, region, reveal_share, rng)?;
    Ok(())
}
