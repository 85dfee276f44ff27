//! # Symbios NEAT Encoding
//!
//! The genetic core of NeuroEvolution of Augmenting Topologies (NEAT):
//! a variable-topology genetic encoding, historical-mark alignment, and an
//! evolutionary loop with fitness sharing, tournament selection and elitism.
//!
//! ## Features
//!
//! - **Historical-Mark Alignment**: genes of differently shaped genomes are
//!   paired by innovation number and classified as matching, disjoint or excess
//!   in `O(n log n)`, independent of how sparse the marks are
//! - **Owned Genomes**: genes are plain values, so cloning a genome is a full
//!   deep copy and no two genomes share mutable state
//! - **Injected Innovation Counter**: marks come from an explicit
//!   [`InnovationCounter`] owned by the run, not from global state
//! - **Fail-Fast Validity**: every crossover and mutation phase is checked;
//!   a dangling connection aborts with the phase that caused it
//! - **Deterministic**: all randomness flows from the caller's RNG
//!
//! ## Quick Start
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use symbios_neat_encoding::{
//!     DefaultCrossover, DefaultMutator, GeneticEncoding, InnovationCounter, Neat, NeatConfig,
//! };
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let config = NeatConfig {
//!     pop_size: Some(10),
//!     tournament_size: Some(3),
//!     elite_size: Some(1),
//!     structural_augmentation_proba: Some(0.3),
//!     neuron_param_mut_proba: Some(0.2),
//!     connection_param_mut_proba: Some(0.8),
//!     speciation_threshold: Some(0.3),
//!     ..NeatConfig::default()
//! };
//!
//! let seeds: Vec<GeneticEncoding> = (0..10)
//!     .map(|_| GeneticEncoding::fully_connected(2, 1, true, 1.0, &mut rng))
//!     .collect();
//!
//! let mut neat = Neat::new(DefaultMutator::default(), DefaultCrossover::default(), &config)
//!     .unwrap()
//!     .with_innovations(InnovationCounter::after(&seeds));
//!
//! // Fitness evaluation is up to the caller
//! let evaluated: Vec<(GeneticEncoding, f64)> = seeds
//!     .into_iter()
//!     .map(|genome| {
//!         let fitness = genome.num_genes() as f64;
//!         (genome, fitness)
//!     })
//!     .collect();
//!
//! let next = neat.produce_new_generation(&evaluated, &mut rng).unwrap();
//! assert_eq!(next.len(), 10);
//! ```
//!
//! ## Alignment
//!
//! ```rust
//! use symbios_neat_encoding::{align, GeneticEncoding, NeuronGene, NeuronType, PairKind};
//!
//! let with_marks = |marks: &[u64]| {
//!     let mut genome = GeneticEncoding::new();
//!     for &mark in marks {
//!         genome.add_neuron_gene(NeuronGene::new(NeuronType::Hidden, mark));
//!     }
//!     genome
//! };
//! let g1 = with_marks(&[1, 2, 5]);
//! let g2 = with_marks(&[2, 3, 4]);
//!
//! let alignment = align(&g1, &g2).unwrap();
//! let kinds: Vec<PairKind> = alignment.pairs.iter().map(|p| alignment.kind(p)).collect();
//! assert_eq!(
//!     kinds,
//!     [PairKind::Excess, PairKind::Matching, PairKind::Disjoint, PairKind::Disjoint, PairKind::Excess]
//! );
//! ```
//!
//! ## Architecture
//!
//! The orchestrator ([`Neat`]) consumes two collaborators through traits:
//! a [`Mutator`] for structural and parameter changes, and a [`Crossover`]
//! for recombination. [`DefaultMutator`] and [`DefaultCrossover`] are
//! provided; custom policies plug in by implementing the traits.
//!
//! Genomes serialize to a JSON document with top-level `neurons` and
//! `connections` sequences (see [`GeneticEncoding::to_json`]).

pub mod alignment;
pub mod config;
pub mod crossover;
pub mod error;
pub mod gene;
pub mod genome;
pub mod innovation;
pub mod mutation;
pub mod neat;
pub mod operators;

// Re-exports for convenience
pub use alignment::{align, excess_disjoint, Alignment, GeneDiff, GenePair, MarkRange, PairKind};
pub use config::{DissimilarityCoefficients, MutatorConfig, NeatConfig, NeatSettings};
pub use crossover::DefaultCrossover;
pub use error::{MutationPhase, NeatError, Result};
pub use gene::{
    ConnectionGene, ConnectionType, Gene, GeneRef, NeuronGene, NeuronType, ParamValue, Params,
};
pub use genome::GeneticEncoding;
pub use innovation::InnovationCounter;
pub use mutation::DefaultMutator;
pub use neat::Neat;
pub use operators::{Crossover, Mutator};

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_mutator_and_crossover_compose() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut genome = GeneticEncoding::fully_connected(2, 1, false, 1.0, &mut rng);
        let mut innovations = InnovationCounter::after(std::slice::from_ref(&genome));
        let mutator = DefaultMutator::default();

        mutator.add_neuron_mutation(&mut genome, &mut innovations, &mut rng);
        let mut other = genome.clone();
        mutator.add_connection_mutation(&mut other, &mut innovations, &mut rng);

        let child = DefaultCrossover::default()
            .crossover(&genome, &other, &mut rng)
            .unwrap();
        assert!(child.check_validity());
        assert!(child.num_neuron_genes() >= 3);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut rng = ChaCha8Rng::seed_from_u64(123);
        let mut genome = GeneticEncoding::fully_connected(3, 2, true, 1.0, &mut rng);
        let mut innovations = InnovationCounter::after(std::slice::from_ref(&genome));
        DefaultMutator::default().add_neuron_mutation(&mut genome, &mut innovations, &mut rng);

        let json = genome.to_json().expect("Serialization failed");
        let restored = GeneticEncoding::from_json(&json).expect("Deserialization failed");

        assert_eq!(genome.num_neuron_genes(), restored.num_neuron_genes());
        assert_eq!(genome.num_connection_genes(), restored.num_connection_genes());
        assert_eq!(genome, restored);
    }

    #[test]
    fn test_dissimilarity_identity() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let genome = GeneticEncoding::fully_connected(2, 2, true, 1.0, &mut rng);
        let coefficients = DissimilarityCoefficients::default();
        let d = GeneticEncoding::dissimilarity(&genome, &genome, &coefficients).unwrap();
        assert_eq!(d, 0.0);
    }
}
