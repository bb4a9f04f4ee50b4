//! Simulation kernel: owns the population, the region registry and the
//! monthly pipeline, and records one aggregate row per month.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    config::{ConfigError, ModelConfig},
    engine::{Engine, SystemContext},
    person::{MortalityTable, PersonId, PopulationKind, Sex},
    region::{build_registry, RegionId},
    results::{year_of, ResultsTable, TickRecord, MONTHS_PER_YEAR},
    rng::RngManager,
    settlement::{select_weighted, SettlementStrategy},
    systems::settle_immigrant,
    world::{World, WorldError},
};

/// Founding native age structure: (cumulative share, youngest, oldest).
const NATIVE_AGE_BANDS: [(f64, u32, u32); 5] = [
    (0.15, 0, 14),
    (0.25, 15, 24),
    (0.45, 25, 44),
    (0.65, 45, 64),
    (1.00, 65, 90),
];

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model has not been set up; call setup() first")]
    NotInitialized,
    #[error("model is already set up")]
    AlreadyInitialized,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    World(#[from] WorldError),
    #[error("system '{name}' failed: {cause:#}")]
    System { name: String, cause: anyhow::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Unconfigured,
    Initialized,
    Stepped(u64),
}

pub struct Model {
    config: ModelConfig,
    world: World,
    engine: Engine,
    state: ModelState,
}

impl Model {
    /// Unseeded model, as the reference runs are.
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        Self::with_rng(config, RngManager::from_entropy())
    }

    pub fn with_rng(config: ModelConfig, rng: RngManager) -> Result<Self, ModelError> {
        Self::with_parts(config, rng, MortalityTable::default())
    }

    pub fn with_parts(
        config: ModelConfig,
        rng: RngManager,
        mortality: MortalityTable,
    ) -> Result<Self, ModelError> {
        config.validate()?;
        Ok(Self {
            config,
            world: World::new(),
            engine: Engine::with_mortality(rng, mortality),
            state: ModelState::Unconfigured,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tick(&self) -> u64 {
        self.world.tick()
    }

    /// Builds the region registry and the founding populations.
    pub fn setup(&mut self) -> Result<(), ModelError> {
        if self.state != ModelState::Unconfigured {
            return Err(ModelError::AlreadyInitialized);
        }
        let mut rng = self.engine.rng_stream("setup");
        self.world = World::with_regions(build_registry(&mut rng));

        for _ in 0..self.config.number_locals {
            let age = draw_native_age(&mut rng);
            let sex = Sex::random(&mut rng);
            let region = select_weighted(&self.world.regions, &mut rng)
                .ok_or(WorldError::EmptyRegistry)?;
            self.world.spawn(
                PopulationKind::Native,
                age,
                sex,
                region,
                self.config.reveal_share_locals,
                &mut rng,
            )?;
        }

        for _ in 0..self.config.number_migrants {
            let strategy = SettlementStrategy::draw_initial(&mut rng);
            settle_immigrant(
                &mut self.world,
                strategy,
                self.config.reveal_share_migrants,
                &mut rng,
            )?;
        }

        info!(
            natives = self.config.number_locals,
            immigrants = self.config.number_migrants,
            regions = self.world.regions.len(),
            "model set up"
        );
        self.state = ModelState::Initialized;
        Ok(())
    }

    /// Advances one month.
    pub fn step(&mut self) -> Result<(), ModelError> {
        let completed = match self.state {
            ModelState::Unconfigured => return Err(ModelError::NotInitialized),
            ModelState::Initialized => 0,
            ModelState::Stepped(n) => n,
        };
        let tick = self.world.tick() + 1;
        let ctx = SystemContext {
            tick,
            config: &self.config,
        };
        // A failed month leaves the clock and the state where they were.
        let reports = self
            .engine
            .run_tick(&ctx, &mut self.world)
            .map_err(|failure| ModelError::System {
                name: failure.name,
                cause: failure.cause,
            })?;
        self.world.advance_time();
        let elapsed_ms: f64 = reports.iter().map(|r| r.duration_ms).sum();
        debug!(tick, elapsed_ms, "tick complete");
        self.state = ModelState::Stepped(completed + 1);
        Ok(())
    }

    /// Runs `months` steps, logging population totals at each year end.
    pub fn run(&mut self, months: u64) -> Result<(), ModelError> {
        self.run_with_hook(months, |_| {})
    }

    /// Runs up to `months` steps, calling `hook` with each new row.
    pub fn run_with_hook(
        &mut self,
        months: u64,
        mut hook: impl FnMut(&TickRecord),
    ) -> Result<(), ModelError> {
        let never = AtomicBool::new(false);
        self.run_inner(months, &never, &mut hook).map(|_| ())
    }

    /// Like [`Model::run`], but checks `stop` before every month.
    /// Returns the number of months actually simulated.
    pub fn run_until(&mut self, months: u64, stop: &AtomicBool) -> Result<u64, ModelError> {
        self.run_inner(months, stop, &mut |_: &TickRecord| {})
    }

    fn run_inner(
        &mut self,
        months: u64,
        stop: &AtomicBool,
        hook: &mut dyn FnMut(&TickRecord),
    ) -> Result<u64, ModelError> {
        if self.state == ModelState::Unconfigured {
            return Err(ModelError::NotInitialized);
        }
        info!(months, from_tick = self.tick(), "running simulation");
        let mut done = 0;
        while done < months {
            if stop.load(Ordering::Relaxed) {
                info!(tick = self.tick(), "stop requested");
                break;
            }
            self.step()?;
            done += 1;
            if let Some(record) = self.world.history.last() {
                hook(&record);
                if record.tick % MONTHS_PER_YEAR == 0 {
                    info!(
                        year = year_of(record.tick),
                        natives = record.total_locals,
                        immigrants = record.total_migrants,
                        "year complete"
                    );
                }
            }
        }
        Ok(done)
    }

    /// Places one person explicitly, outside the settlement rules.
    pub fn add_person(
        &mut self,
        kind: PopulationKind,
        age: u32,
        sex: Sex,
        region: RegionId,
    ) -> Result<PersonId, ModelError> {
        if self.state == ModelState::Unconfigured {
            return Err(ModelError::NotInitialized);
        }
        let reveal_share = match kind {
            PopulationKind::Native => self.config.reveal_share_locals,
            PopulationKind::Immigrant => self.config.reveal_share_migrants,
        };
        let mut rng = self.engine.rng_stream("setup");
        Ok(self
            .world
            .spawn(kind, age, sex, region, reveal_share, &mut rng)?)
    }

    /// The recorded time series. Reading never changes it.
    pub fn results(&self) -> &ResultsTable {
        self.world.history()
    }
}

fn draw_native_age<R: Rng>(rng: &mut R) -> u32 {
    let roll: f64 = rng.gen();
    let (_, youngest, oldest) = NATIVE_AGE_BANDS
        .iter()
        .copied()
        .find(|(cumulative, _, _)| roll < *cumulative)
        .unwrap_or(NATIVE_AGE_BANDS[NATIVE_AGE_BANDS.len() - 1]);
    rng.gen_range(youngest..=oldest)
}
