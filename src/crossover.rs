//! Reference crossover operator.

use rand::Rng;
use tracing::trace;

use crate::alignment::align;
use crate::config::MutatorConfig;
use crate::error::Result;
use crate::gene::GeneRef;
use crate::genome::GeneticEncoding;
use crate::operators::Crossover;

/// NEAT crossover: align by historical mark, inherit from the fitter parent.
///
/// - Matching genes come from either parent with equal chance. If either copy
///   is disabled, the child's copy is disabled with
///   `disabled_inheritance_proba`, otherwise enabled.
/// - Disjoint and excess genes come from `parent1` only.
///
/// Every neuron of `parent1` reaches the child, so a valid `parent1` yields a
/// valid child. A dangling connection in `parent1` is passed through as is.
#[derive(Debug, Clone, Default)]
pub struct DefaultCrossover {
    pub config: MutatorConfig,
}

impl DefaultCrossover {
    #[must_use]
    pub fn new(config: MutatorConfig) -> Self {
        Self { config }
    }
}

fn inherit(child: &mut GeneticEncoding, gene: GeneRef<'_>, enabled: Option<bool>) {
    match gene {
        GeneRef::Neuron(neuron) => {
            let mut neuron = neuron.clone();
            if let Some(enabled) = enabled {
                neuron.enabled = enabled;
            }
            child.add_neuron_gene(neuron);
        }
        GeneRef::Connection(connection) => {
            let mut connection = connection.clone();
            if let Some(enabled) = enabled {
                connection.enabled = enabled;
            }
            child.add_connection_gene(connection);
        }
    }
}

impl Crossover for DefaultCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &GeneticEncoding,
        parent2: &GeneticEncoding,
        rng: &mut R,
    ) -> Result<GeneticEncoding> {
        let alignment = align(parent1, parent2)?;
        let mut child = GeneticEncoding::new();

        for pair in &alignment.pairs {
            match (pair.first(), pair.second()) {
                (Some(first), Some(second)) => {
                    let gene = if rng.random::<bool>() { first } else { second };
                    let enabled = if first.is_enabled() && second.is_enabled() {
                        true
                    } else {
                        rng.random::<f64>() >= self.config.disabled_inheritance_proba
                    };
                    inherit(&mut child, gene, Some(enabled));
                }
                (Some(first), None) => inherit(&mut child, first, None),
                _ => {}
            }
        }

        trace!(
            matching = alignment.diff().matching,
            genes = child.num_genes(),
            "crossover complete"
        );
        Ok(child)
    }
}
