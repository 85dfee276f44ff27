//! Reference mutation operators.
//!
//! [`DefaultMutator`] grows and prunes genomes while keeping them structurally
//! valid: removing a neuron also removes every connection touching it.
//! Connections carry a numeric `weight` parameter; hidden and output neurons
//! carry a numeric `bias` parameter.

use std::collections::HashSet;

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{trace, warn};

use crate::config::MutatorConfig;
use crate::error::Result;
use crate::gene::{ConnectionGene, ConnectionType, Gene, NeuronGene, NeuronType, Params};
use crate::genome::GeneticEncoding;
use crate::innovation::InnovationCounter;
use crate::operators::Mutator;

/// Mutation policy adapted to `weight`/`bias` parameterized genomes.
#[derive(Debug, Clone, Default)]
pub struct DefaultMutator {
    pub config: MutatorConfig,
}

impl DefaultMutator {
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidSetting`](crate::NeatError::InvalidSetting) if `config` fails
    /// [`MutatorConfig::validate`].
    pub fn new(config: MutatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    fn random_weight<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.random::<f64>() * 2.0 * self.config.weight_range - self.config.weight_range
    }

    fn random_bias<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.random::<f64>() * 2.0 * self.config.bias_range - self.config.bias_range
    }

    /// Replace or perturb a numeric parameter, clamped to ten times `range`.
    /// An absent or non-numeric value is replaced.
    fn mutate_numeric<R: Rng>(
        params: &mut Params,
        name: &str,
        range: f64,
        power: f64,
        replace_prob: f64,
        rng: &mut R,
    ) {
        let limit = range * 10.0;
        let value = match params.get_f64(name) {
            Ok(current) if rng.random::<f64>() >= replace_prob => {
                current + (rng.random::<f64>() * 2.0 - 1.0) * power
            }
            _ => rng.random::<f64>() * 2.0 * range - range,
        };
        params.set(name, value.clamp(-limit, limit));
    }
}

/// Whether a connection `from -> to` would close a cycle over enabled connections.
fn would_create_cycle(genome: &GeneticEncoding, from: u64, to: u64) -> bool {
    let mut visited = HashSet::with_capacity(genome.num_neuron_genes());
    let mut stack = vec![to];

    while let Some(current) = stack.pop() {
        if current == from {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        stack.extend(
            genome
                .connection_genes
                .iter()
                .filter(|c| c.enabled && c.mark_from == current)
                .map(|c| c.mark_to),
        );
    }

    false
}

impl Mutator for DefaultMutator {
    fn add_connection_mutation<R: Rng>(
        &self,
        genome: &mut GeneticEncoding,
        innovations: &mut InnovationCounter,
        rng: &mut R,
    ) {
        let sources: Vec<u64> = genome
            .neuron_genes
            .iter()
            .filter(|n| n.neuron_type.emits_output())
            .map(Gene::historical_mark)
            .collect();
        let targets: Vec<u64> = genome
            .neuron_genes
            .iter()
            .filter(|n| n.neuron_type.accepts_input())
            .map(Gene::historical_mark)
            .collect();

        for _ in 0..self.config.max_add_connection_attempts {
            let (Some(&from), Some(&to)) = (sources.choose(rng), targets.choose(rng)) else {
                warn!("add connection: no source or target neuron available");
                return;
            };

            if !genome.get_connection_genes(from, to).is_empty() {
                continue;
            }

            let connection_type = if would_create_cycle(genome, from, to) {
                ConnectionType::Recurrent
            } else {
                ConnectionType::Forward
            };
            let mark = innovations.next_mark();
            let mut gene = ConnectionGene::new(connection_type, from, to, mark);
            gene.params.set("weight", self.random_weight(rng));
            genome.add_connection_gene(gene);

            trace!(mark, from, to, ?connection_type, "added connection");
            return;
        }

        trace!("add connection: every sampled pair was already connected");
    }

    fn add_neuron_mutation<R: Rng>(
        &self,
        genome: &mut GeneticEncoding,
        innovations: &mut InnovationCounter,
        rng: &mut R,
    ) {
        let enabled: Vec<usize> = genome
            .connection_genes
            .iter()
            .enumerate()
            .filter(|(_, c)| c.enabled)
            .map(|(i, _)| i)
            .collect();

        let Some(&index) = enabled.choose(rng) else {
            warn!("add neuron: no enabled connection to split");
            return;
        };

        // Disable the original connection
        let split = &mut genome.connection_genes[index];
        split.enabled = false;
        let (from, to) = (split.mark_from, split.mark_to);
        let split_type = split.connection_type;
        let original_weight = split.params.get_f64("weight").unwrap_or(1.0);

        let neuron_mark = innovations.next_mark();
        let mut neuron = NeuronGene::new(NeuronType::Hidden, neuron_mark);
        neuron.params.set("bias", 0.0);
        genome.add_neuron_gene(neuron);

        // Weight 1.0 into the new neuron preserves the signal
        let incoming = ConnectionGene::weighted(from, neuron_mark, innovations.next_mark(), 1.0);
        let mut outgoing =
            ConnectionGene::new(split_type, neuron_mark, to, innovations.next_mark());
        outgoing.params.set("weight", original_weight);
        genome.add_connection_gene(incoming);
        genome.add_connection_gene(outgoing);

        trace!(neuron_mark, from, to, "split connection with new neuron");
    }

    fn remove_connection_mutation<R: Rng>(&self, genome: &mut GeneticEncoding, rng: &mut R) {
        if genome.connection_genes.is_empty() {
            warn!("remove connection: genome has no connections");
            return;
        }

        let index = rng.random_range(0..genome.connection_genes.len());
        if let Some(removed) = genome.remove_connection_gene(index) {
            trace!(mark = removed.historical_mark(), "removed connection");
        }
    }

    fn remove_neuron_mutation<R: Rng>(&self, genome: &mut GeneticEncoding, rng: &mut R) {
        let hidden: Vec<usize> = genome
            .neuron_genes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.neuron_type == NeuronType::Hidden)
            .map(|(i, _)| i)
            .collect();

        let Some(&index) = hidden.choose(rng) else {
            warn!("remove neuron: genome has no hidden neurons");
            return;
        };

        if let Some(removed) = genome.remove_neuron_gene(index) {
            let mark = removed.historical_mark();
            genome.connection_genes.retain(|c| !c.touches(mark));
            trace!(mark, "removed neuron and its connections");
        }
    }

    fn mutate_connection_params<R: Rng>(
        &self,
        genome: &mut GeneticEncoding,
        probability: f64,
        rng: &mut R,
    ) {
        for conn in &mut genome.connection_genes {
            if rng.random::<f64>() < probability {
                Self::mutate_numeric(
                    &mut conn.params,
                    "weight",
                    self.config.weight_range,
                    self.config.weight_mutation_power,
                    self.config.weight_replace_prob,
                    rng,
                );
            }
        }
    }

    fn mutate_neuron_params<R: Rng>(
        &self,
        genome: &mut GeneticEncoding,
        probability: f64,
        rng: &mut R,
    ) {
        for neuron in &mut genome.neuron_genes {
            if !neuron.neuron_type.accepts_input() {
                continue;
            }
            if rng.random::<f64>() < probability {
                if !neuron.params.contains("bias") {
                    let bias = self.random_bias(rng);
                    neuron.params.set("bias", bias);
                    continue;
                }
                Self::mutate_numeric(
                    &mut neuron.params,
                    "bias",
                    self.config.bias_range,
                    self.config.bias_mutation_power,
                    0.0,
                    rng,
                );
            }
        }
    }
}
