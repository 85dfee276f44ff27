//! Error types for genetic encoding and evolution.
//!
//! Every failure in this crate is a programming or data defect surfaced
//! synchronously. Nothing here is transient, so nothing is retried.

use std::fmt;

use thiserror::Error;

/// The step of child production that left a genome structurally invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationPhase {
    /// Merging two parents into a child.
    Crossover,
    /// Perturbing connection parameters.
    ConnectionParams,
    /// Perturbing neuron parameters.
    NeuronParams,
    /// Inserting a new connection.
    AddConnection,
    /// Inserting a new neuron.
    AddNeuron,
    /// Removing a connection.
    RemoveConnection,
    /// Removing a neuron.
    RemoveNeuron,
}

impl fmt::Display for MutationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationPhase::Crossover => "crossover",
            MutationPhase::ConnectionParams => "connection parameters mutation",
            MutationPhase::NeuronParams => "neuron parameters mutation",
            MutationPhase::AddConnection => "add connection",
            MutationPhase::AddNeuron => "add neuron",
            MutationPhase::RemoveConnection => "remove connection",
            MutationPhase::RemoveNeuron => "remove neuron",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum NeatError {
    /// Alignment, sorting or min/max mark over a genome without genes.
    #[error("genome has no genes; alignment and mark range are undefined")]
    EmptyGenome,

    #[error("gene parameter not found: {name}")]
    ParamNotFound { name: String },

    #[error("gene parameter {name} is not a {expected}")]
    ParamType { name: String, expected: &'static str },

    #[error("please provide a value for {0}")]
    MissingSetting(&'static str),

    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("selection needs {required} candidates, got {available}")]
    NotEnoughCandidates { required: usize, available: usize },

    /// A connection references a neuron mark that is not present.
    /// `genome` holds the serialized genome for diagnosis.
    #[error("{phase} created invalid genotype\n{genome}")]
    InvalidGenotype { phase: MutationPhase, genome: String },

    #[error("innovation counter exhausted at mark {next}; {requested} fresh marks needed")]
    InnovationsExhausted { next: u64, requested: u64 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NeatError>;
