use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::region::RegionId;

const SCORE_MIN: f64 = 0.0;
const SCORE_MAX: f64 = 100.0;

/// Strength of the majority variant pulling an immigrant back, relative to
/// the forward rate.
const REVERSE_INFLUENCE_FACTOR: f64 = 0.1;

/// Annual death probability when no band matches the age.
const FALLBACK_DEATH_RATE: f64 = 0.001;

const INHERITANCE_VARIATION: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(pub(crate) u64);

impl PersonId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PopulationKind {
    Native,
    Immigrant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Sex::Male
        } else {
            Sex::Female
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Vocabulary,
    Grammar,
    Phonetics,
    Pronouns,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::Vocabulary,
        Feature::Grammar,
        Feature::Phonetics,
        Feature::Pronouns,
    ];

    /// Share of the composite media exposure that lands on this feature.
    pub fn media_weight(self) -> f64 {
        match self {
            Feature::Vocabulary => 0.05,
            Feature::Grammar => 0.03,
            Feature::Pronouns => 0.02,
            Feature::Phonetics => 0.01,
        }
    }

    /// Range the initial score is drawn from for a freshly created person.
    fn initial_range(self, kind: PopulationKind) -> Range<f64> {
        match (kind, self) {
            (PopulationKind::Native, Feature::Vocabulary) => 5.0..10.0,
            (PopulationKind::Native, Feature::Grammar) => 2.0..5.0,
            (PopulationKind::Native, Feature::Phonetics) => 1.0..3.0,
            (PopulationKind::Native, Feature::Pronouns) => 8.0..15.0,
            (PopulationKind::Immigrant, Feature::Vocabulary) => 95.0..100.0,
            (PopulationKind::Immigrant, Feature::Grammar) => 90.0..100.0,
            (PopulationKind::Immigrant, Feature::Phonetics) => 85.0..100.0,
            (PopulationKind::Immigrant, Feature::Pronouns) => 80.0..100.0,
        }
    }
}

/// Degree of adoption of the immigrant variant, per feature, on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinguisticProfile {
    pub vocabulary: f64,
    pub grammar: f64,
    pub phonetics: f64,
    pub pronouns: f64,
}

impl LinguisticProfile {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Vocabulary => self.vocabulary,
            Feature::Grammar => self.grammar,
            Feature::Phonetics => self.phonetics,
            Feature::Pronouns => self.pronouns,
        }
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        let value = value.clamp(SCORE_MIN, SCORE_MAX);
        match feature {
            Feature::Vocabulary => self.vocabulary = value,
            Feature::Grammar => self.grammar = value,
            Feature::Phonetics => self.phonetics = value,
            Feature::Pronouns => self.pronouns = value,
        }
    }

    pub fn adjust(&mut self, feature: Feature, delta: f64) {
        self.set(feature, self.get(feature) + delta);
    }

    fn draw<R: Rng>(kind: PopulationKind, rng: &mut R) -> Self {
        let mut profile = Self::default();
        for feature in Feature::ALL {
            profile.set(feature, rng.gen_range(feature.initial_range(kind)));
        }
        profile
    }
}

/// Per-interaction influence coefficients, applied to each feature on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfluenceRates {
    pub vocabulary: f64,
    pub grammar: f64,
    pub phonetics: f64,
    pub pronouns: f64,
}

impl InfluenceRates {
    pub fn rate(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Vocabulary => self.vocabulary,
            Feature::Grammar => self.grammar,
            Feature::Phonetics => self.phonetics,
            Feature::Pronouns => self.pronouns,
        }
    }
}

/// Annual death probability by half-open age band, consulted in order.
#[derive(Debug, Clone)]
pub struct MortalityTable {
    bands: Vec<(Range<u32>, f64)>,
}

impl MortalityTable {
    pub fn new(bands: Vec<(Range<u32>, f64)>) -> Self {
        Self { bands }
    }

    /// First band containing `age` wins.
    pub fn rate_for(&self, age: u32) -> f64 {
        self.bands
            .iter()
            .find(|(band, _)| band.contains(&age))
            .map(|(_, rate)| *rate)
            .unwrap_or(FALLBACK_DEATH_RATE)
    }
}

impl Default for MortalityTable {
    fn default() -> Self {
        Self::new(vec![
            (0..1, 0.005),
            (1..5, 0.0005),
            (5..15, 0.0002),
            (15..25, 0.0005),
            (25..35, 0.0008),
            (35..45, 0.0015),
            (45..55, 0.003),
            (55..65, 0.008),
            (65..75, 0.02),
            (75..85, 0.05),
            (85..120, 0.15),
        ])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub kind: PopulationKind,
    pub age: u32,
    pub sex: Sex,
    pub region: RegionId,
    pub alive: bool,
    pub years_resident: u32,
    pub profile: LinguisticProfile,
    pub reveal_identity: bool,
    pub media_exposure: f64,
    pub interaction_frequency: f64,
}

impl Person {
    /// Draws the kind-specific starting profile and the fixed social
    /// attributes. Natives are born in-region, immigrants have just arrived.
    pub fn new<R: Rng>(
        id: PersonId,
        kind: PopulationKind,
        age: u32,
        sex: Sex,
        region: RegionId,
        reveal_share: f64,
        rng: &mut R,
    ) -> Self {
        let profile = LinguisticProfile::draw(kind, rng);
        let media_exposure = rng.gen_range(30.0..=80.0);
        let interaction_frequency = rng.gen_range(0.5..=1.0);
        let reveal_identity = rng.gen::<f64>() < reveal_share;
        let years_resident = match kind {
            PopulationKind::Native => age,
            PopulationKind::Immigrant => 0,
        };
        Self {
            id,
            kind,
            age,
            sex,
            region,
            alive: true,
            years_resident,
            profile,
            reveal_identity,
            media_exposure,
            interaction_frequency,
        }
    }

    pub fn is_native(&self) -> bool {
        self.kind == PopulationKind::Native
    }

    pub fn is_immigrant(&self) -> bool {
        self.kind == PopulationKind::Immigrant
    }

    pub fn advance_one_year(&mut self) {
        self.age += 1;
        self.years_resident += 1;
    }

    /// Single draw against the age-banded rate. Marks the person dead on success.
    pub fn check_mortality<R: Rng>(&mut self, table: &MortalityTable, rng: &mut R) -> bool {
        let rate = table.rate_for(self.age);
        if rng.gen::<f64>() < rate {
            self.alive = false;
            true
        } else {
            false
        }
    }

    /// Resolves one ordered encounter. The three cases are evaluated
    /// independently, so a native/immigrant pair can move both parties.
    pub fn interact_linguistically(&mut self, other: &mut Person, rates: &InfluenceRates) {
        if self.is_immigrant() && self.reveal_identity && other.is_native() {
            push_toward_variant(other, rates, self.interaction_frequency);
        }

        if other.is_immigrant() && other.reveal_identity && self.is_native() {
            push_toward_variant(self, rates, other.interaction_frequency);
        }

        // Ambient exposure to the majority variant; ignores reveal flags.
        if self.is_native() && other.is_immigrant() {
            let strength = REVERSE_INFLUENCE_FACTOR * self.interaction_frequency;
            for feature in Feature::ALL {
                other.profile.adjust(feature, -rates.rate(feature) * strength);
            }
        }
    }

    /// Only natives respond to media.
    pub fn apply_media_influence(&mut self, base_influence: f64, region_infrastructure: f64) {
        match self.kind {
            PopulationKind::Native => {
                let exposure = (self.media_exposure / 100.0)
                    * (region_infrastructure / 100.0)
                    * base_influence;
                for feature in Feature::ALL {
                    self.profile.adjust(feature, exposure * feature.media_weight());
                }
            }
            PopulationKind::Immigrant => {}
        }
    }

    pub fn inherit_from_parent<R: Rng>(&mut self, parent: &Person, rng: &mut R) {
        for feature in Feature::ALL {
            let offset = rng.gen_range(-INHERITANCE_VARIATION..=INHERITANCE_VARIATION);
            self.profile.set(feature, parent.profile.get(feature) + offset);
        }
    }
}

fn push_toward_variant(target: &mut Person, rates: &InfluenceRates, frequency: f64) {
    for feature in Feature::ALL {
        target.profile.adjust(feature, rates.rate(feature) * frequency);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rates() -> InfluenceRates {
        InfluenceRates {
            vocabulary: 0.5,
            grammar: 0.3,
            phonetics: 0.15,
            pronouns: 0.25,
        }
    }

    fn person(id: u64, kind: PopulationKind, reveal: bool) -> Person {
        let mut rng = ChaCha8Rng::seed_from_u64(id);
        let mut p = Person::new(
            PersonId(id),
            kind,
            30,
            Sex::Female,
            RegionId(1),
            0.0,
            &mut rng,
        );
        p.reveal_identity = reveal;
        p.interaction_frequency = 1.0;
        p
    }

    #[test]
    fn initial_profiles_follow_population_kind() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for id in 0..200 {
            let native = Person::new(
                PersonId(id),
                PopulationKind::Native,
                40,
                Sex::Male,
                RegionId(1),
                0.3,
                &mut rng,
            );
            assert!((5.0..10.0).contains(&native.profile.vocabulary));
            assert!((1.0..3.0).contains(&native.profile.phonetics));
            assert_eq!(native.years_resident, 40);

            let immigrant = Person::new(
                PersonId(id),
                PopulationKind::Immigrant,
                25,
                Sex::Female,
                RegionId(1),
                0.7,
                &mut rng,
            );
            assert!((95.0..=100.0).contains(&immigrant.profile.vocabulary));
            assert!((80.0..=100.0).contains(&immigrant.profile.pronouns));
            assert_eq!(immigrant.years_resident, 0);
            assert!((30.0..=80.0).contains(&immigrant.media_exposure));
            assert!((0.5..=1.0).contains(&immigrant.interaction_frequency));
        }
    }

    #[test]
    fn revealing_immigrant_pushes_native_up() {
        let mut immigrant = person(1, PopulationKind::Immigrant, true);
        let mut native = person(2, PopulationKind::Native, false);
        let before = native.profile;

        immigrant.interact_linguistically(&mut native, &rates());

        assert!((native.profile.vocabulary - (before.vocabulary + 0.5)).abs() < 1e-9);
        assert!((native.profile.grammar - (before.grammar + 0.3)).abs() < 1e-9);
        assert!((native.profile.phonetics - (before.phonetics + 0.15)).abs() < 1e-9);
        assert!((native.profile.pronouns - (before.pronouns + 0.25)).abs() < 1e-9);
    }

    #[test]
    fn native_initiated_pair_moves_both_parties() {
        let mut native = person(1, PopulationKind::Native, false);
        let mut immigrant = person(2, PopulationKind::Immigrant, true);
        let native_before = native.profile;
        let immigrant_before = immigrant.profile;

        native.interact_linguistically(&mut immigrant, &rates());

        assert!(native.profile.vocabulary > native_before.vocabulary);
        assert!((immigrant.profile.vocabulary - (immigrant_before.vocabulary - 0.05)).abs() < 1e-9);
        assert!((immigrant.profile.grammar - (immigrant_before.grammar - 0.03)).abs() < 1e-9);
    }

    #[test]
    fn non_revealing_immigrant_never_influences_native() {
        let mut native = person(1, PopulationKind::Native, true);
        let mut immigrant = person(2, PopulationKind::Immigrant, false);
        let native_before = native.profile;

        native.interact_linguistically(&mut immigrant, &rates());
        immigrant.interact_linguistically(&mut native, &rates());

        assert_eq!(native.profile, native_before);
    }

    #[test]
    fn reverse_pull_fires_without_reveal() {
        let mut native = person(1, PopulationKind::Native, false);
        let mut immigrant = person(2, PopulationKind::Immigrant, false);
        let before = immigrant.profile;

        native.interact_linguistically(&mut immigrant, &rates());

        assert!(immigrant.profile.vocabulary < before.vocabulary);
    }

    #[test]
    fn same_kind_pairs_do_nothing() {
        let mut a = person(1, PopulationKind::Native, true);
        let mut b = person(2, PopulationKind::Native, true);
        let (pa, pb) = (a.profile, b.profile);
        a.interact_linguistically(&mut b, &rates());
        assert_eq!((a.profile, b.profile), (pa, pb));

        let mut c = person(3, PopulationKind::Immigrant, true);
        let mut d = person(4, PopulationKind::Immigrant, true);
        let (pc, pd) = (c.profile, d.profile);
        c.interact_linguistically(&mut d, &rates());
        assert_eq!((c.profile, d.profile), (pc, pd));
    }

    #[test]
    fn media_only_moves_natives_and_weights_vocabulary_most() {
        let mut native = person(1, PopulationKind::Native, false);
        native.media_exposure = 100.0;
        let before = native.profile;
        native.apply_media_influence(1.0, 100.0);
        assert!((native.profile.vocabulary - before.vocabulary - 0.05).abs() < 1e-9);
        assert!((native.profile.phonetics - before.phonetics - 0.01).abs() < 1e-9);

        let mut immigrant = person(2, PopulationKind::Immigrant, true);
        let before = immigrant.profile;
        immigrant.apply_media_influence(1.0, 100.0);
        assert_eq!(immigrant.profile, before);
    }

    #[test]
    fn mortality_table_first_match_and_fallback() {
        let table = MortalityTable::new(vec![(0..10, 0.5), (5..20, 0.9)]);
        assert_eq!(table.rate_for(7), 0.5);
        assert_eq!(table.rate_for(15), 0.9);
        assert_eq!(table.rate_for(200), FALLBACK_DEATH_RATE);
        assert_eq!(MortalityTable::default().rate_for(90), 0.15);
    }

    #[test]
    fn certain_death_marks_person_dead() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut p = person(1, PopulationKind::Native, false);
        let table = MortalityTable::new(vec![(0..120, 1.0)]);
        assert!(p.check_mortality(&table, &mut rng));
        assert!(!p.alive);
    }

    #[test]
    fn aging_advances_residency() {
        let mut p = person(1, PopulationKind::Immigrant, false);
        p.advance_one_year();
        assert_eq!(p.age, 31);
        assert_eq!(p.years_resident, 1);
    }

    #[test]
    fn inheritance_stays_near_parent_and_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut parent = person(1, PopulationKind::Immigrant, true);
        parent.profile.vocabulary = 99.0;
        let mut child = person(2, PopulationKind::Immigrant, true);
        child.age = 0;
        child.inherit_from_parent(&parent, &mut rng);
        for feature in Feature::ALL {
            let value = child.profile.get(feature);
            assert!((0.0..=100.0).contains(&value));
            assert!((value - parent.profile.get(feature)).abs() <= INHERITANCE_VARIATION + 1e-9);
        }
    }

    proptest! {
        #[test]
        fn proptest_scores_stay_clamped(
            kinds in proptest::collection::vec(any::<(bool, bool, bool)>(), 1..200),
            vocab in 0.0f64..50.0,
            media in 0.0f64..200.0,
        ) {
            let rates = InfluenceRates {
                vocabulary: vocab,
                grammar: vocab,
                phonetics: vocab,
                pronouns: vocab,
            };
            let mut a = person(1, PopulationKind::Native, false);
            let mut b = person(2, PopulationKind::Immigrant, true);
            for (swap, reveal, with_media) in kinds {
                b.reveal_identity = reveal;
                if swap {
                    b.interact_linguistically(&mut a, &rates);
                } else {
                    a.interact_linguistically(&mut b, &rates);
                }
                if with_media {
                    a.apply_media_influence(media, 100.0);
                }
            }
            for feature in Feature::ALL {
                prop_assert!((0.0..=100.0).contains(&a.profile.get(feature)));
                prop_assert!((0.0..=100.0).contains(&b.profile.get(feature)));
            }
        }
    }
}
