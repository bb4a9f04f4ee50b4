use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::person::{Person, PersonId, PopulationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(pub(crate) u32);

impl RegionId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKind {
    Urban,
    Rural,
}

impl RegionKind {
    fn attractiveness_range(self) -> Range<f64> {
        match self {
            RegionKind::Urban => 40.0..90.0,
            RegionKind::Rural => 20.0..60.0,
        }
    }

    fn media_range(self) -> Range<f64> {
        match self {
            RegionKind::Urban => 80.0..95.0,
            RegionKind::Rural => 35.0..55.0,
        }
    }
}

const MEDIA_DRIFT: f64 = 2.0;

/// Districts of mainland Portugal with their urban/rural classification.
const DISTRICTS: [(u32, &str, RegionKind); 18] = [
    (1, "Lisboa", RegionKind::Urban),
    (2, "Porto", RegionKind::Urban),
    (3, "Braga", RegionKind::Urban),
    (4, "Setúbal", RegionKind::Urban),
    (5, "Aveiro", RegionKind::Rural),
    (6, "Coimbra", RegionKind::Rural),
    (7, "Faro", RegionKind::Urban),
    (8, "Leiria", RegionKind::Rural),
    (9, "Santarém", RegionKind::Rural),
    (10, "Viseu", RegionKind::Rural),
    (11, "Viana do Castelo", RegionKind::Rural),
    (12, "Vila Real", RegionKind::Rural),
    (13, "Bragança", RegionKind::Rural),
    (14, "Guarda", RegionKind::Rural),
    (15, "Castelo Branco", RegionKind::Rural),
    (16, "Portalegre", RegionKind::Rural),
    (17, "Évora", RegionKind::Rural),
    (18, "Beja", RegionKind::Rural),
];

/// Builds the fixed registry, drawing each region's exogenous attributes from
/// the range of its kind.
pub fn build_registry<R: Rng>(rng: &mut R) -> BTreeMap<RegionId, Region> {
    DISTRICTS
        .iter()
        .map(|&(id, name, kind)| {
            let region = Region::new(RegionId(id), name, kind, rng);
            (region.id, region)
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub kind: RegionKind,
    pub economic_attractiveness: f64,
    pub media_infrastructure: f64,
    residents: BTreeSet<PersonId>,
    native_count: usize,
    immigrant_count: usize,
}

impl Region {
    pub fn new<R: Rng>(id: RegionId, name: &str, kind: RegionKind, rng: &mut R) -> Self {
        let economic_attractiveness = rng.gen_range(kind.attractiveness_range());
        let media_infrastructure = rng.gen_range(kind.media_range());
        Self::with_attributes(id, name, kind, economic_attractiveness, media_infrastructure)
    }

    pub fn with_attributes(
        id: RegionId,
        name: &str,
        kind: RegionKind,
        economic_attractiveness: f64,
        media_infrastructure: f64,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            economic_attractiveness,
            media_infrastructure,
            residents: BTreeSet::new(),
            native_count: 0,
            immigrant_count: 0,
        }
    }

    /// Returns false if the person was already resident.
    pub fn add_resident(&mut self, person: &Person) -> bool {
        if !self.residents.insert(person.id) {
            return false;
        }
        match person.kind {
            PopulationKind::Native => self.native_count += 1,
            PopulationKind::Immigrant => self.immigrant_count += 1,
        }
        true
    }

    /// No-op when the person is not resident here.
    pub fn remove_resident(&mut self, person: &Person) -> bool {
        if !self.residents.remove(&person.id) {
            return false;
        }
        match person.kind {
            PopulationKind::Native => self.native_count -= 1,
            PopulationKind::Immigrant => self.immigrant_count -= 1,
        }
        true
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.residents.contains(&id)
    }

    pub fn residents(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.residents.iter().copied()
    }

    pub fn resident_count(&self) -> usize {
        self.residents.len()
    }

    pub fn native_count(&self) -> usize {
        self.native_count
    }

    pub fn immigrant_count(&self) -> usize {
        self.immigrant_count
    }

    /// Share of immigrants among residents, 0 when empty.
    pub fn immigrant_density(&self) -> f64 {
        let total = self.native_count + self.immigrant_count;
        if total == 0 {
            0.0
        } else {
            self.immigrant_count as f64 / total as f64
        }
    }

    pub fn drift_media_infrastructure<R: Rng>(&mut self, rng: &mut R) {
        let change = rng.gen_range(-MEDIA_DRIFT..=MEDIA_DRIFT);
        self.media_infrastructure = (self.media_infrastructure + change).clamp(0.0, 100.0);
    }

    /// Residents of one population kind. Liveness is left to the caller.
    pub fn residents_of_kind(
        &self,
        persons: &BTreeMap<PersonId, Person>,
        kind: PopulationKind,
    ) -> Vec<PersonId> {
        self.filter_residents(persons, |p| p.kind == kind)
    }

    /// Residents with `min_age <= age < max_age`. Liveness is left to the caller.
    pub fn residents_in_age_range(
        &self,
        persons: &BTreeMap<PersonId, Person>,
        min_age: u32,
        max_age: u32,
    ) -> Vec<PersonId> {
        self.filter_residents(persons, |p| (min_age..max_age).contains(&p.age))
    }

    fn filter_residents(
        &self,
        persons: &BTreeMap<PersonId, Person>,
        predicate: impl Fn(&Person) -> bool,
    ) -> Vec<PersonId> {
        self.residents
            .iter()
            .filter(|id| persons.get(*id).map(&predicate).unwrap_or(false))
            .copied()
            .collect()
    }
}
