//! Configuration for evolution runs and the reference operators.
//!
//! [`NeatConfig`] mirrors what a user writes (every setting optional, loadable
//! from JSON). [`NeatConfig::resolve`] applies defaults and fails on missing
//! required settings, producing the concrete [`NeatSettings`] the orchestrator
//! runs with.

use serde::{Deserialize, Serialize};

use crate::error::{NeatError, Result};

/// Weights of the dissimilarity terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DissimilarityCoefficients {
    pub excess: f64,
    pub disjoint: f64,
    /// Reserved. Accepted for compatibility, never contributes.
    pub weight_diff: f64,
}

impl Default for DissimilarityCoefficients {
    fn default() -> Self {
        Self {
            excess: 1.0,
            disjoint: 1.0,
            weight_diff: 0.0,
        }
    }
}

/// User-facing orchestrator configuration.
///
/// `pop_size`, `tournament_size`, `structural_augmentation_proba`,
/// `neuron_param_mut_proba` and `connection_param_mut_proba` are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeatConfig {
    pub pop_size: Option<usize>,
    pub tournament_size: Option<usize>,
    /// Defaults to 0.
    pub elite_size: Option<usize>,
    pub structural_augmentation_proba: Option<f64>,
    /// Defaults to 0.
    pub structural_removal_proba: Option<f64>,
    pub neuron_param_mut_proba: Option<f64>,
    pub connection_param_mut_proba: Option<f64>,
    /// Defaults to 0, which disables fitness sharing.
    pub speciation_threshold: Option<f64>,
    pub dissimilarity: DissimilarityCoefficients,
}

/// Resolved orchestrator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeatSettings {
    pub pop_size: usize,
    pub tournament_size: usize,
    pub elite_size: usize,
    pub structural_augmentation_proba: f64,
    pub structural_removal_proba: f64,
    pub neuron_param_mut_proba: f64,
    pub connection_param_mut_proba: f64,
    pub speciation_threshold: f64,
    pub dissimilarity: DissimilarityCoefficients,
}

impl NeatConfig {
    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::Serialization`] on malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply defaults and validate.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::MissingSetting`] if a required setting is absent,
    /// or [`NeatError::InvalidSetting`] if a value is out of range.
    pub fn resolve(&self) -> Result<NeatSettings> {
        let settings = NeatSettings {
            pop_size: required(self.pop_size, "pop_size")?,
            tournament_size: required(self.tournament_size, "tournament_size")?,
            elite_size: self.elite_size.unwrap_or(0),
            structural_augmentation_proba: required(
                self.structural_augmentation_proba,
                "structural_augmentation_proba",
            )?,
            structural_removal_proba: self.structural_removal_proba.unwrap_or(0.0),
            neuron_param_mut_proba: required(
                self.neuron_param_mut_proba,
                "neuron_param_mut_proba",
            )?,
            connection_param_mut_proba: required(
                self.connection_param_mut_proba,
                "connection_param_mut_proba",
            )?,
            speciation_threshold: self.speciation_threshold.unwrap_or(0.0),
            dissimilarity: self.dissimilarity,
        };
        settings.validate()?;
        Ok(settings)
    }
}

fn required<T>(value: Option<T>, name: &'static str) -> Result<T> {
    value.ok_or(NeatError::MissingSetting(name))
}

fn probability(value: f64, name: &'static str) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(NeatError::InvalidSetting {
            name,
            reason: format!("{value} is not a probability in [0, 1]"),
        })
    }
}

impl NeatSettings {
    /// Check ranges and cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidSetting`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.tournament_size < 2 {
            return Err(NeatError::InvalidSetting {
                name: "tournament_size",
                reason: "a tournament must select at least two parents".to_string(),
            });
        }
        if self.elite_size > self.pop_size {
            return Err(NeatError::InvalidSetting {
                name: "elite_size",
                reason: format!(
                    "{} elites do not fit in a population of {}",
                    self.elite_size, self.pop_size
                ),
            });
        }
        probability(
            self.structural_augmentation_proba,
            "structural_augmentation_proba",
        )?;
        probability(self.structural_removal_proba, "structural_removal_proba")?;
        probability(self.neuron_param_mut_proba, "neuron_param_mut_proba")?;
        probability(self.connection_param_mut_proba, "connection_param_mut_proba")?;
        if self.speciation_threshold.is_nan() || self.speciation_threshold < 0.0 {
            return Err(NeatError::InvalidSetting {
                name: "speciation_threshold",
                reason: "must be a non-negative number".to_string(),
            });
        }
        Ok(())
    }
}

/// Tuning for [`DefaultMutator`](crate::DefaultMutator) and
/// [`DefaultCrossover`](crate::DefaultCrossover).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutatorConfig {
    /// Range for new and replaced weights: `[-weight_range, weight_range]`.
    pub weight_range: f64,
    /// Maximum magnitude of a weight perturbation.
    pub weight_mutation_power: f64,
    /// Probability that a mutated weight is replaced instead of perturbed.
    pub weight_replace_prob: f64,
    /// Range for new and replaced biases: `[-bias_range, bias_range]`.
    pub bias_range: f64,
    /// Maximum magnitude of a bias perturbation.
    pub bias_mutation_power: f64,
    /// Random source/target draws before add-connection gives up.
    pub max_add_connection_attempts: usize,
    /// Chance that a matching gene disabled in either parent is inherited disabled.
    pub disabled_inheritance_proba: f64,
}

fn non_negative(value: f64, name: &'static str) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(NeatError::InvalidSetting {
            name,
            reason: format!("{value} is not a finite non-negative number"),
        })
    }
}

impl MutatorConfig {
    /// Check that ranges and powers are finite and non-negative, and that
    /// probabilities lie in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidSetting`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        non_negative(self.weight_range, "weight_range")?;
        non_negative(self.weight_mutation_power, "weight_mutation_power")?;
        probability(self.weight_replace_prob, "weight_replace_prob")?;
        non_negative(self.bias_range, "bias_range")?;
        non_negative(self.bias_mutation_power, "bias_mutation_power")?;
        probability(self.disabled_inheritance_proba, "disabled_inheritance_proba")
    }
}

impl Default for MutatorConfig {
    fn default() -> Self {
        Self {
            weight_range: 1.0,
            weight_mutation_power: 0.5,
            weight_replace_prob: 0.1,
            bias_range: 1.0,
            bias_mutation_power: 0.2,
            max_add_connection_attempts: 10,
            disabled_inheritance_proba: 0.75,
        }
    }
}
