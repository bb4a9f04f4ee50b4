use std::time::Instant;

use anyhow::Result;
use tracing::trace;

use crate::{
    config::ModelConfig,
    person::MortalityTable,
    rng::{RngManager, SystemRng},
    systems::{
        BookkeepingSystem, DemographySystem, ImmigrationSystem, InfrastructureSystem,
        InteractionSystem, MediaSystem,
    },
    world::World,
};

pub struct SystemContext<'a> {
    pub tick: u64,
    pub config: &'a ModelConfig,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}

#[derive(Debug)]
pub struct SystemFailure {
    pub name: String,
    pub cause: anyhow::Error,
}

#[derive(Clone, Debug)]
pub struct SystemRunReport {
    pub name: String,
    pub duration_ms: f64,
}

/// Runs the monthly phases in their fixed order. Later phases read what
/// earlier ones wrote within the same tick.
pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
}

impl Engine {
    pub fn new(rng: RngManager) -> Self {
        Self::with_mortality(rng, MortalityTable::default())
    }

    pub fn with_mortality(rng: RngManager, mortality: MortalityTable) -> Self {
        let systems: Vec<Box<dyn System>> = vec![
            Box::new(ImmigrationSystem::new()),
            Box::new(InteractionSystem::new()),
            Box::new(MediaSystem::new()),
            Box::new(DemographySystem::new(mortality)),
            Box::new(InfrastructureSystem::new()),
            Box::new(BookkeepingSystem::new()),
        ];
        Self { rng, systems }
    }

    pub fn rng_stream(&mut self, name: &str) -> SystemRng<'_> {
        self.rng.stream(name)
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    pub fn run_tick(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
    ) -> Result<Vec<SystemRunReport>, SystemFailure> {
        let mut reports = Vec::with_capacity(self.systems.len());
        for system in &mut self.systems {
            let start = Instant::now();
            let mut rng_stream = self.rng.stream(system.name());
            system
                .run(ctx, world, &mut rng_stream)
                .map_err(|cause| SystemFailure {
                    name: system.name().to_string(),
                    cause,
                })?;
            let duration_ms = start.elapsed().as_secs_f64() * 1_000.0;
            trace!(tick = ctx.tick, system = system.name(), duration_ms, "system finished");
            reports.push(SystemRunReport {
                name: system.name().to_string(),
                duration_ms,
            });
        }
        Ok(reports)
    }
}
