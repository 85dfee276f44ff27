//! The evolutionary loop.
//!
//! [`Neat`] turns one evaluated generation into the next: fitness is shared
//! among genomes in the same dissimilarity neighborhood, parents are chosen by
//! tournament on shared fitness, children are produced by crossover followed
//! by parameter and structural mutation, and the best genomes by raw fitness
//! are carried over unchanged.
//!
//! Genomes never get a persistent species label. Each genome's neighborhood
//! is recomputed from scratch every generation.
//!
//! Every child is checked for structural validity after crossover and after
//! each mutation phase. The first violation aborts the generation with
//! [`NeatError::InvalidGenotype`] naming the phase; nothing is repaired.
//!
//! Before breeding, the innovation counter is advanced past every mark in the
//! genomes it is handed, so fresh marks never collide with seed marks even
//! when the counter was never positioned explicitly.

use rand::seq::index;
use rand::Rng;
use tracing::{debug, trace};

use crate::config::{NeatConfig, NeatSettings};
use crate::error::{MutationPhase, NeatError, Result};
use crate::genome::GeneticEncoding;
use crate::innovation::InnovationCounter;
use crate::operators::{Crossover, Mutator};

/// Fresh marks a single structural addition may consume: splitting a
/// connection creates a neuron and two connections.
const MARKS_PER_ADDITION: u64 = 3;

/// NEAT orchestrator over a mutation and a crossover policy.
///
/// Owns the innovation counter for the run. All randomness comes from the
/// caller's RNG, so a seeded RNG reproduces a generation exactly.
#[derive(Debug, Clone)]
pub struct Neat<M, C> {
    mutator: M,
    crossover: C,
    settings: NeatSettings,
    innovations: InnovationCounter,
}

impl<M: Mutator, C: Crossover> Neat<M, C> {
    /// # Errors
    ///
    /// Returns [`NeatError::MissingSetting`] or [`NeatError::InvalidSetting`]
    /// if `config` does not resolve.
    pub fn new(mutator: M, crossover: C, config: &NeatConfig) -> Result<Self> {
        Self::from_settings(mutator, crossover, config.resolve()?)
    }

    /// # Errors
    ///
    /// Returns [`NeatError::InvalidSetting`] if `settings` fail validation.
    pub fn from_settings(mutator: M, crossover: C, settings: NeatSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            mutator,
            crossover,
            settings,
            innovations: InnovationCounter::new(),
        })
    }

    /// Continue mark assignment from `innovations`, typically
    /// [`InnovationCounter::after`] the seed population. Only needed to
    /// reserve marks beyond those present in the genomes being bred.
    #[must_use]
    pub fn with_innovations(mut self, innovations: InnovationCounter) -> Self {
        self.innovations = innovations;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &NeatSettings {
        &self.settings
    }

    #[must_use]
    pub fn innovations(&self) -> &InnovationCounter {
        &self.innovations
    }

    pub fn innovations_mut(&mut self) -> &mut InnovationCounter {
        &mut self.innovations
    }

    #[must_use]
    pub fn mutator(&self) -> &M {
        &self.mutator
    }

    #[must_use]
    pub fn crossover(&self) -> &C {
        &self.crossover
    }

    /// Apply at most one structural addition and at most one structural removal.
    ///
    /// An addition happens with `structural_augmentation_proba`: a connection
    /// if the genome has none, otherwise a connection or a neuron with equal
    /// chance. A removal happens with `structural_removal_proba`: a connection
    /// or a neuron with equal chance.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidGenotype`] if an operation leaves the
    /// genome invalid, or [`NeatError::InnovationsExhausted`] if no fresh
    /// marks are left for an addition.
    pub fn apply_structural_mutation<R: Rng>(
        &mut self,
        genome: &mut GeneticEncoding,
        rng: &mut R,
    ) -> Result<()> {
        self.innovations.advance_past([&*genome]);

        if rng.random::<f64>() < self.settings.structural_augmentation_proba {
            self.innovations.ensure_available(MARKS_PER_ADDITION)?;
            if genome.connection_genes.is_empty() || rng.random::<f64>() < 0.5 {
                self.mutator
                    .add_connection_mutation(genome, &mut self.innovations, rng);
                genome.ensure_valid(MutationPhase::AddConnection)?;
            } else {
                self.mutator
                    .add_neuron_mutation(genome, &mut self.innovations, rng);
                genome.ensure_valid(MutationPhase::AddNeuron)?;
            }
        }

        if rng.random::<f64>() < self.settings.structural_removal_proba {
            if rng.random::<f64>() < 0.5 {
                self.mutator.remove_connection_mutation(genome, rng);
                genome.ensure_valid(MutationPhase::RemoveConnection)?;
            } else {
                self.mutator.remove_neuron_mutation(genome, rng);
                genome.ensure_valid(MutationPhase::RemoveNeuron)?;
            }
        }

        Ok(())
    }

    /// Recombine two parents and mutate the result.
    ///
    /// # Errors
    ///
    /// Propagates crossover failures, and returns
    /// [`NeatError::InvalidGenotype`] for the first phase that leaves the
    /// child invalid.
    pub fn produce_child<R: Rng>(
        &mut self,
        parent1: &GeneticEncoding,
        parent2: &GeneticEncoding,
        rng: &mut R,
    ) -> Result<GeneticEncoding> {
        self.innovations.advance_past([parent1, parent2]);

        let mut child = self.crossover.crossover(parent1, parent2, rng)?;
        child.ensure_valid(MutationPhase::Crossover)?;

        self.mutator.mutate_connection_params(
            &mut child,
            self.settings.connection_param_mut_proba,
            rng,
        );
        child.ensure_valid(MutationPhase::ConnectionParams)?;

        self.mutator
            .mutate_neuron_params(&mut child, self.settings.neuron_param_mut_proba, rng);
        child.ensure_valid(MutationPhase::NeuronParams)?;

        self.apply_structural_mutation(&mut child, rng)?;

        trace!(genes = child.num_genes(), "produced child");
        Ok(child)
    }

    /// Divide each entry's fitness by the size of its neighborhood: itself
    /// plus every other entry closer than `speciation_threshold`.
    ///
    /// With a threshold of 0 no distance can qualify, so fitness is returned
    /// unchanged without computing any distances.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::EmptyGenome`] if a distance involves an empty genome.
    pub fn share_fitness<'a>(
        &self,
        entries: &'a [(GeneticEncoding, f64)],
    ) -> Result<Vec<(&'a GeneticEncoding, f64)>> {
        let threshold = self.settings.speciation_threshold;
        let mut species_sizes = vec![1usize; entries.len()];

        if threshold > 0.0 {
            for (i, (genome_i, _)) in entries.iter().enumerate() {
                for (j, (genome_j, _)) in entries.iter().enumerate().skip(i + 1) {
                    let distance = GeneticEncoding::dissimilarity(
                        genome_i,
                        genome_j,
                        &self.settings.dissimilarity,
                    )?;
                    if distance < threshold {
                        species_sizes[i] += 1;
                        species_sizes[j] += 1;
                    }
                }
            }
        }

        Ok(entries
            .iter()
            .zip(species_sizes)
            .map(|((genome, fitness), size)| (genome, fitness / size as f64))
            .collect())
    }

    /// Sample `tournament_size` distinct candidates and return their genomes,
    /// fittest first.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::NotEnoughCandidates`] if there are fewer candidates
    /// than the tournament size.
    pub fn select_for_tournament<'a, G, R: Rng>(
        &self,
        candidates: &'a [(G, f64)],
        rng: &mut R,
    ) -> Result<Vec<&'a G>> {
        let size = self.settings.tournament_size;
        if candidates.len() < size {
            return Err(NeatError::NotEnoughCandidates {
                required: size,
                available: candidates.len(),
            });
        }

        let mut selected: Vec<&(G, f64)> = index::sample(rng, candidates.len(), size)
            .into_iter()
            .map(|i| &candidates[i])
            .collect();
        selected.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(selected.into_iter().map(|(genome, _)| genome).collect())
    }

    /// Build the next generation of `pop_size` genomes from an evaluated one.
    ///
    /// `pop_size - elite_size` children are bred from tournament winners on
    /// shared fitness; the `elite_size` genomes with the highest raw fitness
    /// are appended unchanged. Returned genomes carry no fitness.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::NotEnoughCandidates`] if the generation is smaller
    /// than the tournament or the elite, and propagates child production
    /// failures.
    pub fn produce_new_generation<R: Rng>(
        &mut self,
        entries: &[(GeneticEncoding, f64)],
        rng: &mut R,
    ) -> Result<Vec<GeneticEncoding>> {
        let required = self.settings.tournament_size.max(self.settings.elite_size);
        if entries.len() < required {
            return Err(NeatError::NotEnoughCandidates {
                required,
                available: entries.len(),
            });
        }

        self.innovations
            .advance_past(entries.iter().map(|(genome, _)| genome));

        let mut shared = self.share_fitness(entries)?;
        shared.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut ranked: Vec<&(GeneticEncoding, f64)> = entries.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let num_children = self.settings.pop_size - self.settings.elite_size;
        debug!(
            candidates = entries.len(),
            children = num_children,
            elites = self.settings.elite_size,
            "producing new generation"
        );

        let mut generation = Vec::with_capacity(self.settings.pop_size);
        for _ in 0..num_children {
            let selected = self.select_for_tournament(&shared, rng)?;
            let child = self.produce_child(selected[0], selected[1], rng)?;
            generation.push(child);
        }

        generation.extend(
            ranked
                .iter()
                .take(self.settings.elite_size)
                .map(|(genome, _)| genome.clone()),
        );

        debug!(
            size = generation.len(),
            next_mark = self.innovations.peek(),
            "generation complete"
        );
        Ok(generation)
    }
}
