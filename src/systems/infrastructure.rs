use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

/// Monthly random walk of every region's media infrastructure.
pub struct InfrastructureSystem;

impl InfrastructureSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InfrastructureSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for InfrastructureSystem {
    fn name(&self) -> &str {
        "infrastructure"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for region in world.regions.values_mut() {
            region.drift_media_infrastructure(rng);
        }
        Ok(())
    }
}
