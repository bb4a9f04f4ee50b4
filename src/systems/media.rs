use anyhow::Result;
use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

pub struct MediaSystem;

impl MediaSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MediaSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MediaSystem {
    fn name(&self) -> &str {
        "media"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let base = ctx.config.base_media_influence;
        let regions = &world.regions;
        let mut exposed = 0usize;
        for person in world.persons.values_mut().filter(|p| p.alive) {
            if let Some(region) = regions.get(&person.region) {
                person.apply_media_influence(base, region.media_infrastructure);
                exposed += 1;
            }
        }
        debug!(tick = ctx.tick, exposed, "media exposure applied");
        Ok(())
    }
}
