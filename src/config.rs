use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::person::InfluenceRates;

fn default_number_locals() -> u32 {
    1000
}

fn default_number_migrants() -> u32 {
    100
}

fn default_annual_inflow() -> u32 {
    120
}

fn default_local_birth_rate() -> f64 {
    0.04
}

fn default_migrant_birth_rate() -> f64 {
    0.06
}

fn default_school_interactions() -> u32 {
    5
}

fn default_workplace_interactions() -> u32 {
    3
}

fn default_market_probability() -> f64 {
    0.3
}

fn default_media_influence() -> f64 {
    0.5
}

fn default_reveal_share_locals() -> f64 {
    0.3
}

fn default_reveal_share_migrants() -> f64 {
    0.7
}

fn default_vocab_rate() -> f64 {
    0.5
}

fn default_grammar_rate() -> f64 {
    0.3
}

fn default_pronoun_rate() -> f64 {
    0.25
}

fn default_phonetic_rate() -> f64 {
    0.15
}

/// Run parameters. Every key is optional and falls back to its default;
/// keys the kernel does not know are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_number_locals")]
    pub number_locals: u32,
    #[serde(default = "default_number_migrants")]
    pub number_migrants: u32,
    #[serde(default = "default_annual_inflow")]
    pub annual_br_inflow: u32,
    #[serde(default = "default_local_birth_rate")]
    pub local_birth_rate: f64,
    #[serde(default = "default_migrant_birth_rate")]
    pub migrant_birth_rate: f64,
    #[serde(default = "default_school_interactions")]
    pub num_school_interactions: u32,
    #[serde(default = "default_workplace_interactions")]
    pub num_workplace_interactions: u32,
    #[serde(default = "default_market_probability")]
    pub prob_interaction_market: f64,
    #[serde(default = "default_media_influence")]
    pub base_media_influence: f64,
    #[serde(default = "default_reveal_share_locals")]
    pub reveal_share_locals: f64,
    #[serde(default = "default_reveal_share_migrants")]
    pub reveal_share_migrants: f64,
    #[serde(default = "default_vocab_rate")]
    pub vocab_influence_rate: f64,
    #[serde(default = "default_grammar_rate")]
    pub grammar_influence_rate: f64,
    #[serde(default = "default_pronoun_rate")]
    pub pronoun_influence_rate: f64,
    #[serde(default = "default_phonetic_rate")]
    pub phonetic_influence_rate: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            number_locals: default_number_locals(),
            number_migrants: default_number_migrants(),
            annual_br_inflow: default_annual_inflow(),
            local_birth_rate: default_local_birth_rate(),
            migrant_birth_rate: default_migrant_birth_rate(),
            num_school_interactions: default_school_interactions(),
            num_workplace_interactions: default_workplace_interactions(),
            prob_interaction_market: default_market_probability(),
            base_media_influence: default_media_influence(),
            reveal_share_locals: default_reveal_share_locals(),
            reveal_share_migrants: default_reveal_share_migrants(),
            vocab_influence_rate: default_vocab_rate(),
            grammar_influence_rate: default_grammar_rate(),
            pronoun_influence_rate: default_pronoun_rate(),
            phonetic_influence_rate: default_phonetic_rate(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{key}': {message}")]
    Parse { key: String, message: String },
    #[error("configuration validation error: {0}")]
    Validation(String),
}

impl ModelConfig {
    /// Builds a config from a loose key/value mapping, the shape parameter
    /// forms hand over. Values are checked one key at a time so the error
    /// names the offending entry.
    pub fn from_mapping(mapping: BTreeMap<String, serde_yaml::Value>) -> Result<Self, ConfigError> {
        let defaults = serde_yaml::to_value(Self::default()).map_err(|err| ConfigError::Parse {
            key: "<defaults>".into(),
            message: err.to_string(),
        })?;
        let mut merged = match defaults {
            serde_yaml::Value::Mapping(map) => map,
            _ => serde_yaml::Mapping::new(),
        };

        for (key, value) in mapping {
            let key_value = serde_yaml::Value::String(key.clone());
            let Some(default) = merged.get(&key_value) else {
                continue;
            };
            let accepted = match default {
                serde_yaml::Value::Number(n) if n.is_u64() => value.as_u64().is_some(),
                _ => value.as_f64().is_some(),
            };
            if !accepted {
                return Err(ConfigError::Parse {
                    message: format!("expected a number, got {value:?}"),
                    key,
                });
            }
            merged.insert(key_value, value);
        }

        let config: ModelConfig = serde_yaml::from_value(serde_yaml::Value::Mapping(merged))
            .map_err(|err| ConfigError::Parse {
                key: "<mapping>".into(),
                message: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("local_birth_rate", self.local_birth_rate),
            ("migrant_birth_rate", self.migrant_birth_rate),
            ("prob_interaction_market", self.prob_interaction_market),
            ("reveal_share_locals", self.reveal_share_locals),
            ("reveal_share_migrants", self.reveal_share_migrants),
        ];
        for (key, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "{key} must lie in [0, 1], got {value}"
                )));
            }
        }

        let coefficients = [
            ("base_media_influence", self.base_media_influence),
            ("vocab_influence_rate", self.vocab_influence_rate),
            ("grammar_influence_rate", self.grammar_influence_rate),
            ("pronoun_influence_rate", self.pronoun_influence_rate),
            ("phonetic_influence_rate", self.phonetic_influence_rate),
        ];
        for (key, value) in coefficients {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn influence_rates(&self) -> InfluenceRates {
        InfluenceRates {
            vocabulary: self.vocab_influence_rate,
            grammar: self.grammar_influence_rate,
            phonetics: self.phonetic_influence_rate,
            pronouns: self.pronoun_influence_rate,
        }
    }

    pub fn monthly_inflow(&self) -> u32 {
        self.annual_br_inflow / 12
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(entries: &[(&str, serde_yaml::Value)]) -> BTreeMap<String, serde_yaml::Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn empty_yaml_uses_documented_defaults() {
        let config: ModelConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, ModelConfig::default());
        assert_eq!(config.number_locals, 1000);
        assert_eq!(config.number_migrants, 100);
        assert_eq!(config.annual_br_inflow, 120);
        assert_eq!(config.phonetic_influence_rate, 0.15);
    }

    #[test]
    fn mapping_overrides_selected_keys() {
        let config = ModelConfig::from_mapping(mapping(&[
            ("number_locals", serde_yaml::Value::from(0u64)),
            ("vocab_influence_rate", serde_yaml::Value::from(0.9)),
            ("simulation_years", serde_yaml::Value::from(20u64)),
        ]))
        .unwrap();
        assert_eq!(config.number_locals, 0);
        assert_eq!(config.vocab_influence_rate, 0.9);
        assert_eq!(config.number_migrants, 100);
    }

    #[test]
    fn rate_keys_accept_integers() {
        let config = ModelConfig::from_mapping(mapping(&[(
            "local_birth_rate",
            serde_yaml::Value::from(1u64),
        )]))
        .unwrap();
        assert_eq!(config.local_birth_rate, 1.0);
    }

    #[test]
    fn non_numeric_value_is_rejected_with_key() {
        let err = ModelConfig::from_mapping(mapping(&[(
            "annual_br_inflow",
            serde_yaml::Value::from("lots"),
        )]))
        .unwrap_err();
        match err {
            ConfigError::Parse { key, .. } => assert_eq!(key, "annual_br_inflow"),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn fractional_count_is_rejected() {
        let err = ModelConfig::from_mapping(mapping(&[(
            "number_locals",
            serde_yaml::Value::from(10.5),
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn probability_out_of_range_fails_validation() {
        let config = ModelConfig {
            prob_interaction_market: 1.5,
            ..ModelConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn monthly_inflow_rounds_down() {
        let config = ModelConfig {
            annual_br_inflow: 130,
            ..ModelConfig::default()
        };
        assert_eq!(config.monthly_inflow(), 10);
    }
}
