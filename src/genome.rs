//! The genetic encoding of a single genome.
//!
//! A [`GeneticEncoding`] owns two ordered gene sequences, neurons and
//! connections, each kept in insertion order. Connections refer to neurons by
//! historical mark; the encoding is structurally valid when every such mark
//! resolves to a neuron that is present.
//!
//! Cloning is a full deep copy: genes and their parameters are owned values,
//! so no two encodings ever share mutable state.

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::alignment::excess_disjoint;
use crate::config::DissimilarityCoefficients;
use crate::error::{MutationPhase, NeatError, Result};
use crate::gene::{ConnectionGene, Gene, GeneRef, NeuronGene, NeuronType};

/// One genome: ordered neuron genes and ordered connection genes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneticEncoding {
    #[serde(rename = "neurons", default)]
    pub neuron_genes: Vec<NeuronGene>,
    #[serde(rename = "connections", default)]
    pub connection_genes: Vec<ConnectionGene>,
}

impl GeneticEncoding {
    /// Create an encoding without genes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_genes(
        neuron_genes: Vec<NeuronGene>,
        connection_genes: Vec<ConnectionGene>,
    ) -> Self {
        Self {
            neuron_genes,
            connection_genes,
        }
    }

    /// Create a genome with only input, output and optional bias neurons.
    ///
    /// Marks are fixed: bias is 0, inputs are `1..=num_inputs`, outputs follow.
    /// Output neurons start with a `bias` parameter of 0.
    #[must_use]
    pub fn minimal(num_inputs: usize, num_outputs: usize, use_bias: bool) -> Self {
        let mut genome = Self::new();

        if use_bias {
            genome.add_neuron_gene(NeuronGene::new(NeuronType::Bias, 0));
        }

        for i in 0..num_inputs {
            genome.add_neuron_gene(NeuronGene::new(NeuronType::Input, (i + 1) as u64));
        }

        let output_start = num_inputs + 1;
        for i in 0..num_outputs {
            let mut output = NeuronGene::new(NeuronType::Output, (output_start + i) as u64);
            output.params.set("bias", 0.0);
            genome.add_neuron_gene(output);
        }

        genome
    }

    /// Create a genome with every input (and the bias, if present) connected
    /// to every output, with weights drawn from `[-weight_range, weight_range]`.
    ///
    /// Connection marks follow the output marks in (source, output) order,
    /// so two fully-connected genomes of the same shape align exactly.
    #[must_use]
    pub fn fully_connected<R: Rng>(
        num_inputs: usize,
        num_outputs: usize,
        use_bias: bool,
        weight_range: f64,
        rng: &mut R,
    ) -> Self {
        let mut genome = Self::minimal(num_inputs, num_outputs, use_bias);

        let input_marks = 1..=num_inputs as u64;
        let output_marks: Vec<u64> = (0..num_outputs)
            .map(|i| (num_inputs + 1 + i) as u64)
            .collect();
        let sources: Vec<u64> = if use_bias {
            input_marks.chain(std::iter::once(0)).collect()
        } else {
            input_marks.collect()
        };

        let mut mark = (num_inputs + num_outputs + 1) as u64;
        for &source in &sources {
            for &target in &output_marks {
                let weight = rng.random::<f64>() * 2.0 * weight_range - weight_range;
                genome.add_connection_gene(ConnectionGene::weighted(source, target, mark, weight));
                mark += 1;
            }
        }

        genome
    }

    #[must_use]
    pub fn num_genes(&self) -> usize {
        self.neuron_genes.len() + self.connection_genes.len()
    }

    #[must_use]
    pub fn num_neuron_genes(&self) -> usize {
        self.neuron_genes.len()
    }

    #[must_use]
    pub fn num_connection_genes(&self) -> usize {
        self.connection_genes.len()
    }

    #[must_use]
    pub fn enabled_connection_count(&self) -> usize {
        self.connection_genes.iter().filter(|c| c.enabled).count()
    }

    /// All connections from `mark_from` to `mark_to`. Parallel connections
    /// between the same endpoints are all returned.
    #[must_use]
    pub fn get_connection_genes(&self, mark_from: u64, mark_to: u64) -> Vec<&ConnectionGene> {
        self.connection_genes
            .iter()
            .filter(|c| c.connects(mark_from, mark_to))
            .collect()
    }

    /// All genes, neurons and connections alike, in ascending mark order.
    #[must_use]
    pub fn sorted_genes(&self) -> Vec<GeneRef<'_>> {
        let mut genes: Vec<GeneRef<'_>> = self
            .neuron_genes
            .iter()
            .map(GeneRef::Neuron)
            .chain(self.connection_genes.iter().map(GeneRef::Connection))
            .collect();
        genes.sort_by_key(GeneRef::historical_mark);
        genes
    }

    /// Lowest and highest historical mark across all genes.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::EmptyGenome`] if the genome has no genes.
    pub fn min_max_hist_mark(&self) -> Result<(u64, u64)> {
        let marks = self
            .neuron_genes
            .iter()
            .map(Gene::historical_mark)
            .chain(self.connection_genes.iter().map(Gene::historical_mark));

        marks
            .fold(None, |acc, mark| match acc {
                None => Some((mark, mark)),
                Some((min, max)) => Some((u64::min(min, mark), u64::max(max, mark))),
            })
            .ok_or(NeatError::EmptyGenome)
    }

    /// Find any gene carrying `mark`, neurons first.
    #[must_use]
    pub fn find_gene_by_mark(&self, mark: u64) -> Option<GeneRef<'_>> {
        self.neuron_genes
            .iter()
            .find(|n| n.historical_mark() == mark)
            .map(GeneRef::Neuron)
            .or_else(|| {
                self.connection_genes
                    .iter()
                    .find(|c| c.historical_mark() == mark)
                    .map(GeneRef::Connection)
            })
    }

    #[must_use]
    pub fn find_neuron(&self, mark: u64) -> Option<&NeuronGene> {
        self.neuron_genes
            .iter()
            .find(|n| n.historical_mark() == mark)
    }

    /// Position of the neuron carrying `mark` in the neuron sequence.
    #[must_use]
    pub fn neuron_position(&self, mark: u64) -> Option<usize> {
        self.neuron_genes
            .iter()
            .position(|n| n.historical_mark() == mark)
    }

    #[must_use]
    pub fn check_neuron_exists(&self, mark: u64) -> bool {
        self.find_neuron(mark).is_some()
    }

    pub fn add_neuron_gene(&mut self, neuron_gene: NeuronGene) {
        self.neuron_genes.push(neuron_gene);
    }

    pub fn add_connection_gene(&mut self, connection_gene: ConnectionGene) {
        self.connection_genes.push(connection_gene);
    }

    /// Remove the neuron at `index`. Connections touching it are left alone,
    /// so the caller is responsible for not orphaning them.
    pub fn remove_neuron_gene(&mut self, index: usize) -> Option<NeuronGene> {
        (index < self.neuron_genes.len()).then(|| self.neuron_genes.remove(index))
    }

    /// Remove the connection at `index`.
    pub fn remove_connection_gene(&mut self, index: usize) -> Option<ConnectionGene> {
        (index < self.connection_genes.len()).then(|| self.connection_genes.remove(index))
    }

    /// Whether every connection's endpoints resolve to present neurons.
    #[must_use]
    pub fn check_validity(&self) -> bool {
        let marks: HashSet<u64> = self
            .neuron_genes
            .iter()
            .map(Gene::historical_mark)
            .collect();

        self.connection_genes
            .iter()
            .all(|c| marks.contains(&c.mark_from) && marks.contains(&c.mark_to))
    }

    /// Fail fast if the genome is structurally invalid after `phase`.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidGenotype`] carrying the serialized genome.
    pub fn ensure_valid(&self, phase: MutationPhase) -> Result<()> {
        if self.check_validity() {
            return Ok(());
        }

        let genome = self.to_json().unwrap_or_else(|_| format!("{self:?}"));
        error!(%phase, "genome references a missing neuron");
        Err(NeatError::InvalidGenotype { phase, genome })
    }

    /// Dissimilarity between two genomes:
    /// `(disjoint_coef * disjoint + excess_coef * excess) / max(num_genes)`.
    ///
    /// The weight-difference coefficient is accepted but reserved; it does
    /// not contribute.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::EmptyGenome`] if either genome has no genes.
    pub fn dissimilarity(
        genome1: &GeneticEncoding,
        genome2: &GeneticEncoding,
        coefficients: &DissimilarityCoefficients,
    ) -> Result<f64> {
        let diff = excess_disjoint(genome1, genome2)?;
        let num_genes = genome1.num_genes().max(genome2.num_genes()) as f64;

        Ok((coefficients.disjoint * diff.disjoint as f64
            + coefficients.excess * diff.excess as f64)
            / num_genes)
    }

    /// Serialize as a pretty JSON document with top-level `neurons` and
    /// `connections` sequences.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    ///
    /// Returns [`NeatError::Serialization`] if `json` is not a valid document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for GeneticEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "NEAT genotype: {} neurons, {} connections",
            self.num_neuron_genes(),
            self.num_connection_genes()
        )?;
        for neuron in &self.neuron_genes {
            writeln!(f, "  {neuron}")?;
        }
        for connection in &self.connection_genes {
            writeln!(f, "  {connection}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::{ConnectionType, ParamValue};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_minimal_genome() {
        let genome = GeneticEncoding::minimal(3, 2, false);
        assert_eq!(genome.num_neuron_genes(), 5);
        assert_eq!(genome.num_connection_genes(), 0);
        assert_eq!(genome.min_max_hist_mark().unwrap(), (1, 5));
    }

    #[test]
    fn test_fully_connected_with_bias() {
        let mut rng = test_rng();
        let genome = GeneticEncoding::fully_connected(2, 2, true, 1.0, &mut rng);

        // 2 inputs * 2 outputs + 1 bias * 2 outputs = 6 connections
        assert_eq!(genome.num_connection_genes(), 6);
        assert!(genome.check_validity());
        assert_eq!(genome.min_max_hist_mark().unwrap(), (0, 10));
        for conn in &genome.connection_genes {
            let weight = conn.params.get_f64("weight").unwrap();
            assert!((-1.0..=1.0).contains(&weight));
        }
    }

    #[test]
    fn test_same_shape_shares_marks() {
        let mut rng = test_rng();
        let a = GeneticEncoding::fully_connected(2, 1, false, 1.0, &mut rng);
        let b = GeneticEncoding::fully_connected(2, 1, false, 1.0, &mut rng);
        let coefficients = DissimilarityCoefficients::default();
        assert_eq!(GeneticEncoding::dissimilarity(&a, &b, &coefficients).unwrap(), 0.0);
    }

    #[test]
    fn test_validity() {
        let mut genome = GeneticEncoding::minimal(1, 1, false);
        genome.add_connection_gene(ConnectionGene::weighted(1, 2, 3, 0.5));
        assert!(genome.check_validity());

        genome.add_connection_gene(ConnectionGene::weighted(1, 99, 4, 0.5));
        assert!(!genome.check_validity());
        assert!(matches!(
            genome.ensure_valid(MutationPhase::AddConnection),
            Err(NeatError::InvalidGenotype {
                phase: MutationPhase::AddConnection,
                ..
            })
        ));
    }

    #[test]
    fn test_removal_does_not_repair() {
        let mut genome = GeneticEncoding::minimal(1, 1, false);
        genome.add_connection_gene(ConnectionGene::weighted(1, 2, 3, 0.5));

        let removed = genome.remove_neuron_gene(1).unwrap();
        assert_eq!(removed.historical_mark(), 2);
        assert_eq!(genome.num_connection_genes(), 1);
        assert!(!genome.check_validity());

        assert!(genome.remove_neuron_gene(5).is_none());
        assert!(genome.remove_connection_gene(0).is_some());
        assert!(genome.check_validity());
    }

    #[test]
    fn test_parallel_connections() {
        let mut genome = GeneticEncoding::minimal(1, 1, false);
        genome.add_connection_gene(ConnectionGene::weighted(1, 2, 3, 0.5));
        genome.add_connection_gene(ConnectionGene::new(ConnectionType::Recurrent, 1, 2, 4));
        genome.add_connection_gene(ConnectionGene::weighted(2, 1, 5, 0.5));

        assert_eq!(genome.get_connection_genes(1, 2).len(), 2);
        assert_eq!(genome.get_connection_genes(2, 1).len(), 1);
        assert!(genome.get_connection_genes(2, 2).is_empty());
    }

    #[test]
    fn test_find_gene_by_mark() {
        let mut genome = GeneticEncoding::minimal(1, 1, false);
        genome.add_connection_gene(ConnectionGene::weighted(1, 2, 3, 0.5));

        assert!(matches!(genome.find_gene_by_mark(1), Some(GeneRef::Neuron(_))));
        assert!(matches!(genome.find_gene_by_mark(3), Some(GeneRef::Connection(_))));
        assert!(genome.find_gene_by_mark(42).is_none());
    }

    #[test]
    fn test_empty_genome_has_no_range() {
        let genome = GeneticEncoding::new();
        assert!(matches!(genome.min_max_hist_mark(), Err(NeatError::EmptyGenome)));
        assert!(genome.sorted_genes().is_empty());
        assert!(genome.check_validity());
    }

    #[test]
    fn test_copy_is_independent() {
        let mut rng = test_rng();
        let original = GeneticEncoding::fully_connected(2, 1, false, 1.0, &mut rng);
        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.connection_genes[0].set_param("weight", ParamValue::Number(42.0));
        copy.neuron_genes[0].enabled = false;

        assert_ne!(
            original.connection_genes[0].params.get_f64("weight").unwrap(),
            42.0
        );
        assert!(original.neuron_genes[0].enabled);
    }

    #[test]
    fn test_dissimilarity() {
        let mut g1 = GeneticEncoding::new();
        for mark in [1, 2, 5] {
            g1.add_neuron_gene(NeuronGene::new(NeuronType::Hidden, mark));
        }
        let mut g2 = GeneticEncoding::new();
        for mark in [2, 3, 4] {
            g2.add_neuron_gene(NeuronGene::new(NeuronType::Hidden, mark));
        }

        let coefficients = DissimilarityCoefficients {
            excess: 2.0,
            disjoint: 1.0,
            weight_diff: 5.0,
        };
        // 2 disjoint, 2 excess, 3 genes each
        let expected = (1.0 * 2.0 + 2.0 * 2.0) / 3.0;
        let d12 = GeneticEncoding::dissimilarity(&g1, &g2, &coefficients).unwrap();
        let d21 = GeneticEncoding::dissimilarity(&g2, &g1, &coefficients).unwrap();
        assert!((d12 - expected).abs() < 1e-12);
        assert!((d12 - d21).abs() < 1e-12);
    }

    #[test]
    fn test_json_document_shape() {
        let mut rng = test_rng();
        let genome = GeneticEncoding::fully_connected(1, 1, false, 1.0, &mut rng);
        let json = genome.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["neurons"].as_array().unwrap().len(), 2);
        assert_eq!(value["connections"].as_array().unwrap().len(), 1);
        assert_eq!(value["neurons"][0]["type"], "input");
        assert_eq!(value["connections"][0]["mark_from"], 1);

        let restored = GeneticEncoding::from_json(&json).unwrap();
        assert_eq!(restored, genome);
    }

    #[test]
    fn test_display() {
        let genome = GeneticEncoding::minimal(1, 1, false);
        let text = genome.to_string();
        assert!(text.starts_with("NEAT genotype: 2 neurons, 0 connections"));
        assert!(text.contains("mark: 2, type: output"));
    }
}
