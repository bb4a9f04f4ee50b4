use std::collections::BTreeMap;

use rand::Rng;
use thiserror::Error;

use crate::person::{Person, PersonId, PopulationKind, Sex};
use crate::region::{Region, RegionId};
use crate::results::ResultsTable;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("unknown region {0:?}")]
    UnknownRegion(RegionId),
    #[error("unknown person {0:?}")]
    UnknownPerson(PersonId),
    #[error("region registry is empty")]
    EmptyRegistry,
}

/// Population arena plus region registry. Every change of population
/// membership goes through here so region counters stay in step.
pub struct World {
    next_person: u64,
    tick: u64,
    pub(crate) persons: BTreeMap<PersonId, Person>,
    pub(crate) regions: BTreeMap<RegionId, Region>,
    pub(crate) history: ResultsTable,
}

impl World {
    pub fn new() -> Self {
        Self {
            next_person: 1,
            tick: 0,
            persons: BTreeMap::new(),
            regions: BTreeMap::new(),
            history: ResultsTable::default(),
        }
    }

    pub fn with_regions(regions: BTreeMap<RegionId, Region>) -> Self {
        let mut world = Self::new();
        world.regions = regions;
        world
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance_time(&mut self) {
        self.tick += 1;
    }

    /// Creates a person, places them in `region` and adds them to the population.
    pub fn spawn<R: Rng>(
        &mut self,
        kind: PopulationKind,
        age: u32,
        sex: Sex,
        region: RegionId,
        reveal_share: f64,
        rng: &mut R,
    ) -> Result<PersonId, WorldError> {
        let id = self.allocate();
        let person = Person::new(id, kind, age, sex, region, reveal_share, rng);
        self.insert(person)
    }

    /// Adds a person built with an id from [`World::allocate`].
    pub(crate) fn insert(&mut self, person: Person) -> Result<PersonId, WorldError> {
        let home = self
            .regions
            .get_mut(&person.region)
            .ok_or(WorldError::UnknownRegion(person.region))?;
        home.add_resident(&person);
        let id = person.id;
        self.persons.insert(id, person);
        Ok(id)
    }

    pub(crate) fn allocate(&mut self) -> PersonId {
        let id = PersonId(self.next_person);
        self.next_person += 1;
        id
    }

    /// Moves a person to another region, keeping membership exclusive.
    pub fn relocate(&mut self, id: PersonId, destination: RegionId) -> Result<(), WorldError> {
        if !self.regions.contains_key(&destination) {
            return Err(WorldError::UnknownRegion(destination));
        }
        let person = self
            .persons
            .get_mut(&id)
            .ok_or(WorldError::UnknownPerson(id))?;
        if let Some(origin) = self.regions.get_mut(&person.region) {
            origin.remove_resident(person);
        }
        person.region = destination;
        if let Some(target) = self.regions.get_mut(&destination) {
            target.add_resident(person);
        }
        Ok(())
    }

    /// Removes a person from their region and from the population.
    pub fn bury(&mut self, id: PersonId) -> Option<Person> {
        let person = self.persons.remove(&id)?;
        if let Some(region) = self.regions.get_mut(&person.region) {
            region.remove_resident(&person);
        }
        Some(person)
    }

    /// Runs `f` with mutable access to two distinct people.
    pub(crate) fn with_pair<T>(
        &mut self,
        first: PersonId,
        second: PersonId,
        f: impl FnOnce(&mut Person, &mut Person) -> T,
    ) -> Option<T> {
        if first == second {
            return None;
        }
        let mut a = self.persons.remove(&first)?;
        let result = self.persons.get_mut(&second).map(|b| f(&mut a, b));
        self.persons.insert(first, a);
        result
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.persons.get(&id)
    }

    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.persons.values()
    }

    pub fn is_alive(&self, id: PersonId) -> bool {
        self.persons.get(&id).map(|p| p.alive).unwrap_or(false)
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn region_ids(&self) -> Vec<RegionId> {
        self.regions.keys().copied().collect()
    }

    pub fn live_count(&self, kind: PopulationKind) -> usize {
        self.persons
            .values()
            .filter(|p| p.alive && p.kind == kind)
            .count()
    }

    pub fn history(&self) -> &ResultsTable {
        &self.history
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
