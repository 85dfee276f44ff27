//! Collaborator interfaces consumed by the evolutionary loop.
//!
//! The orchestrator decides *when* to mutate and recombine; implementations of
//! [`Mutator`] and [`Crossover`] decide *how*. [`DefaultMutator`] and
//! [`DefaultCrossover`] are the reference implementations.
//!
//! [`DefaultMutator`]: crate::DefaultMutator
//! [`DefaultCrossover`]: crate::DefaultCrossover

use rand::Rng;

use crate::error::Result;
use crate::genome::GeneticEncoding;
use crate::innovation::InnovationCounter;

/// Structural and parametric mutation policy.
///
/// Every method must leave a valid genome valid, and must take the historical
/// mark of every gene it creates from `innovations`.
pub trait Mutator {
    fn add_connection_mutation<R: Rng>(
        &self,
        genome: &mut GeneticEncoding,
        innovations: &mut InnovationCounter,
        rng: &mut R,
    );

    fn add_neuron_mutation<R: Rng>(
        &self,
        genome: &mut GeneticEncoding,
        innovations: &mut InnovationCounter,
        rng: &mut R,
    );

    fn remove_connection_mutation<R: Rng>(&self, genome: &mut GeneticEncoding, rng: &mut R);

    fn remove_neuron_mutation<R: Rng>(&self, genome: &mut GeneticEncoding, rng: &mut R);

    /// Mutate each connection's parameters with `probability`.
    fn mutate_connection_params<R: Rng>(
        &self,
        genome: &mut GeneticEncoding,
        probability: f64,
        rng: &mut R,
    );

    /// Mutate each neuron's parameters with `probability`.
    fn mutate_neuron_params<R: Rng>(
        &self,
        genome: &mut GeneticEncoding,
        probability: f64,
        rng: &mut R,
    );
}

/// Gene-selection policy for recombining two parents.
pub trait Crossover {
    /// Produce a child from two parents aligned by historical mark.
    /// `parent1` is the fitter parent. Neither parent is modified.
    ///
    /// # Errors
    ///
    /// Fails if the parents cannot be aligned (for example, an empty parent).
    fn crossover<R: Rng>(
        &self,
        parent1: &GeneticEncoding,
        parent2: &GeneticEncoding,
        rng: &mut R,
    ) -> Result<GeneticEncoding>;
}
