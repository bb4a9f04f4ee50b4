use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    person::{Person, PopulationKind},
    results::TickRecord,
    rng::SystemRng,
    world::World,
};

/// Appends the month's aggregate row.
pub struct BookkeepingSystem;

impl BookkeepingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BookkeepingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for BookkeepingSystem {
    fn name(&self) -> &str {
        "bookkeeping"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let record = summarize(ctx.tick, world.persons.values());
        world.history.push(record);
        Ok(())
    }
}

#[derive(Default)]
struct Totals {
    count: usize,
    vocabulary: f64,
    grammar: f64,
    phonetics: f64,
    pronouns: f64,
}

impl Totals {
    fn add(&mut self, person: &Person) {
        self.count += 1;
        self.vocabulary += person.profile.vocabulary;
        self.grammar += person.profile.grammar;
        self.phonetics += person.profile.phonetics;
        self.pronouns += person.profile.pronouns;
    }

    /// Zero stands in for the mean of an empty population.
    fn mean(&self, sum: f64) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            sum / self.count as f64
        }
    }
}

pub(crate) fn summarize<'a>(tick: u64, persons: impl Iterator<Item = &'a Person>) -> TickRecord {
    let mut natives = Totals::default();
    let mut immigrants = Totals::default();
    for person in persons.filter(|p| p.alive) {
        match person.kind {
            PopulationKind::Native => natives.add(person),
            PopulationKind::Immigrant => immigrants.add(person),
        }
    }
    TickRecord {
        tick,
        total_locals: natives.count,
        total_migrants: immigrants.count,
        mean_local_vocab: natives.mean(natives.vocabulary),
        mean_local_grammar: natives.mean(natives.grammar),
        mean_local_phonetics: natives.mean(natives.phonetics),
        mean_local_pronouns: natives.mean(natives.pronouns),
        mean_migrant_vocab: immigrants.mean(immigrants.vocabulary),
        mean_migrant_grammar: immigrants.mean(immigrants.grammar),
        mean_migrant_phonetics: immigrants.mean(immigrants.phonetics),
        mean_migrant_pronouns: immigrants.mean(immigrants.pronouns),
    }
}
