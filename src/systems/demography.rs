use anyhow::Result;
use rand::Rng;
use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    person::{MortalityTable, Person, PersonId, PopulationKind, Sex},
    results::MONTHS_PER_YEAR,
    rng::SystemRng,
    world::World,
};

const FERTILE_AGE_MIN: u32 = 18;
const FERTILE_AGE_MAX: u32 = 45;

/// Ageing, mortality and births. Runs only on the last month of each year.
pub struct DemographySystem {
    mortality: MortalityTable,
}

impl DemographySystem {
    pub fn new(mortality: MortalityTable) -> Self {
        Self { mortality }
    }
}

impl Default for DemographySystem {
    fn default() -> Self {
        Self::new(MortalityTable::default())
    }
}

impl System for DemographySystem {
    fn name(&self) -> &str {
        "demography"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if ctx.tick % MONTHS_PER_YEAR != 0 {
            return Ok(());
        }

        for person in world.persons.values_mut().filter(|p| p.alive) {
            person.advance_one_year();
        }

        let deaths = self.apply_mortality(world, rng);
        let births = apply_births(ctx, world, rng)?;
        debug!(tick = ctx.tick, deaths, births, "annual demography processed");
        Ok(())
    }
}

impl DemographySystem {
    /// The dead leave their region and the population in the same pass.
    fn apply_mortality<R: Rng>(&self, world: &mut World, rng: &mut R) -> usize {
        let mut dead: Vec<PersonId> = Vec::new();
        for person in world.persons.values_mut().filter(|p| p.alive) {
            if person.check_mortality(&self.mortality, rng) {
                dead.push(person.id);
            }
        }
        for id in &dead {
            world.bury(*id);
        }
        dead.len()
    }
}

fn birth_rate(ctx: &SystemContext, kind: PopulationKind) -> f64 {
    match kind {
        PopulationKind::Native => ctx.config.local_birth_rate,
        PopulationKind::Immigrant => ctx.config.migrant_birth_rate,
    }
}

fn reveal_share(ctx: &SystemContext, kind: PopulationKind) -> f64 {
    match kind {
        PopulationKind::Native => ctx.config.reveal_share_locals,
        PopulationKind::Immigrant => ctx.config.reveal_share_migrants,
    }
}

/// Each live woman of fertile age draws once against her population's
/// annual rate. Newborns join the mother's region and are not themselves
/// considered in this pass.
fn apply_births<R: Rng>(ctx: &SystemContext, world: &mut World, rng: &mut R) -> Result<usize> {
    let mothers: Vec<PersonId> = world
        .persons
        .values()
        .filter(|p| {
            p.alive && p.sex == Sex::Female && (FERTILE_AGE_MIN..FERTILE_AGE_MAX).contains(&p.age)
        })
        .map(|p| p.id)
        .collect();

    let mut births = 0;
    for mother_id in mothers {
        let Some(mother) = world.person(mother_id).cloned() else {
            continue;
        };
        if rng.gen::<f64>() >= birth_rate(ctx, mother.kind) {
            continue;
        }
        let mut child = Person::new(
            world.allocate(),
            mother.kind,
            0,
            Sex::random(rng),
            mother.region,
            reveal_share(ctx, mother.kind),
            rng,
        );
        child.inherit_from_parent(&mother, rng);
        world.insert(child)?;
        births += 1;
    }
    Ok(births)
}
