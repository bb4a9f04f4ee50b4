use serde::{Deserialize, Serialize};

pub const MONTHS_PER_YEAR: u64 = 12;

/// Aggregate state of the population at the end of one month.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: u64,
    pub total_locals: usize,
    pub total_migrants: usize,
    pub mean_local_vocab: f64,
    pub mean_local_grammar: f64,
    pub mean_local_phonetics: f64,
    pub mean_local_pronouns: f64,
    pub mean_migrant_vocab: f64,
    pub mean_migrant_grammar: f64,
    pub mean_migrant_phonetics: f64,
    pub mean_migrant_pronouns: f64,
}

pub fn year_of(tick: u64) -> u64 {
    tick / MONTHS_PER_YEAR
}

/// Append-only time series, stored and serialized column by column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultsTable {
    pub tick: Vec<u64>,
    pub total_locals: Vec<usize>,
    pub total_migrants: Vec<usize>,
    pub mean_local_vocab: Vec<f64>,
    pub mean_local_grammar: Vec<f64>,
    pub mean_local_phonetics: Vec<f64>,
    pub mean_local_pronouns: Vec<f64>,
    pub mean_migrant_vocab: Vec<f64>,
    pub mean_migrant_grammar: Vec<f64>,
    pub mean_migrant_phonetics: Vec<f64>,
    pub mean_migrant_pronouns: Vec<f64>,
}

impl ResultsTable {
    pub const COLUMNS: [&'static str; 11] = [
        "tick",
        "total_locals",
        "total_migrants",
        "mean_local_vocab",
        "mean_local_grammar",
        "mean_local_phonetics",
        "mean_local_pronouns",
        "mean_migrant_vocab",
        "mean_migrant_grammar",
        "mean_migrant_phonetics",
        "mean_migrant_pronouns",
    ];

    pub(crate) fn push(&mut self, record: TickRecord) {
        self.tick.push(record.tick);
        self.total_locals.push(record.total_locals);
        self.total_migrants.push(record.total_migrants);
        self.mean_local_vocab.push(record.mean_local_vocab);
        self.mean_local_grammar.push(record.mean_local_grammar);
        self.mean_local_phonetics.push(record.mean_local_phonetics);
        self.mean_local_pronouns.push(record.mean_local_pronouns);
        self.mean_migrant_vocab.push(record.mean_migrant_vocab);
        self.mean_migrant_grammar.push(record.mean_migrant_grammar);
        self.mean_migrant_phonetics.push(record.mean_migrant_phonetics);
        self.mean_migrant_pronouns.push(record.mean_migrant_pronouns);
    }

    pub fn len(&self) -> usize {
        self.tick.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tick.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<TickRecord> {
        if index >= self.len() {
            return None;
        }
        Some(TickRecord {
            tick: self.tick[index],
            total_locals: self.total_locals[index],
            total_migrants: self.total_migrants[index],
            mean_local_vocab: self.mean_local_vocab[index],
            mean_local_grammar: self.mean_local_grammar[index],
            mean_local_phonetics: self.mean_local_phonetics[index],
            mean_local_pronouns: self.mean_local_pronouns[index],
            mean_migrant_vocab: self.mean_migrant_vocab[index],
            mean_migrant_grammar: self.mean_migrant_grammar[index],
            mean_migrant_phonetics: self.mean_migrant_phonetics[index],
            mean_migrant_pronouns: self.mean_migrant_pronouns[index],
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = TickRecord> + '_ {
        (0..self.len()).filter_map(move |index| self.row(index))
    }

    pub fn last(&self) -> Option<TickRecord> {
        self.len().checked_sub(1).and_then(|index| self.row(index))
    }
}
