//! Historical-mark (innovation number) assignment.
//!
//! Marks are handed out by an explicit [`InnovationCounter`] that the
//! orchestrator owns for the lifetime of an evolution run and passes by
//! `&mut` to every mutation. There is no process-wide counter.
//!
//! Seed genomes built by [`GeneticEncoding::minimal`] and
//! [`GeneticEncoding::fully_connected`] use fixed marks, so identical seed
//! structures share marks across genomes. Start the counter after them with
//! [`InnovationCounter::after`], or let it catch up with
//! [`InnovationCounter::advance_past`]; the orchestrator does the latter for
//! every population it breeds from.
//!
//! `u64::MAX` is never handed out as a fresh mark. The counter stops there,
//! and [`InnovationCounter::ensure_available`] reports the exhaustion as an
//! error.
//!
//! [`GeneticEncoding::minimal`]: crate::GeneticEncoding::minimal
//! [`GeneticEncoding::fully_connected`]: crate::GeneticEncoding::fully_connected

use serde::{Deserialize, Serialize};

use crate::error::{NeatError, Result};
use crate::genome::GeneticEncoding;

/// Monotonic source of fresh historical marks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnovationCounter {
    next: u64,
}

impl InnovationCounter {
    /// A counter whose first mark is 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A counter whose first mark is `mark`.
    #[must_use]
    pub fn starting_at(mark: u64) -> Self {
        Self { next: mark }
    }

    /// A counter positioned one past the highest mark found in `genomes`.
    #[must_use]
    pub fn after(genomes: &[GeneticEncoding]) -> Self {
        let mut counter = Self::new();
        counter.advance_past(genomes);
        counter
    }

    /// Move the counter one past the highest mark found in `genomes`.
    /// Never moves it backwards.
    pub fn advance_past<'a, I>(&mut self, genomes: I)
    where
        I: IntoIterator<Item = &'a GeneticEncoding>,
    {
        let past = genomes
            .into_iter()
            .filter_map(|g| g.min_max_hist_mark().ok())
            .map(|(_, max)| max.saturating_add(1))
            .max()
            .unwrap_or(0);
        self.next = self.next.max(past);
    }

    /// Assign a fresh mark.
    ///
    /// The counter saturates at `u64::MAX`; once there it keeps returning
    /// `u64::MAX`. Call [`ensure_available`](Self::ensure_available) before
    /// handing the counter to a mutation that creates genes.
    pub fn next_mark(&mut self) -> u64 {
        let mark = self.next;
        self.next = self.next.saturating_add(1);
        mark
    }

    /// Number of fresh marks left before the counter is exhausted.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        u64::MAX - self.next
    }

    /// # Errors
    ///
    /// Returns [`NeatError::InnovationsExhausted`] if fewer than `count`
    /// fresh marks remain.
    pub fn ensure_available(&self, count: u64) -> Result<()> {
        if self.remaining() < count {
            return Err(NeatError::InnovationsExhausted {
                next: self.next,
                requested: count,
            });
        }
        Ok(())
    }

    /// The mark the next call to [`next_mark`](Self::next_mark) will return.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::{NeuronGene, NeuronType};

    #[test]
    fn test_marks_are_monotonic() {
        let mut counter = InnovationCounter::new();
        let marks: Vec<u64> = (0..5).map(|_| counter.next_mark()).collect();
        assert_eq!(marks, vec![0, 1, 2, 3, 4]);
        assert_eq!(counter.peek(), 5);
    }

    #[test]
    fn test_starting_at() {
        let mut counter = InnovationCounter::starting_at(100);
        assert_eq!(counter.next_mark(), 100);
        assert_eq!(counter.next_mark(), 101);
    }

    #[test]
    fn test_after_population() {
        let mut a = GeneticEncoding::new();
        a.add_neuron_gene(NeuronGene::new(NeuronType::Input, 3));
        let mut b = GeneticEncoding::new();
        b.add_neuron_gene(NeuronGene::new(NeuronType::Input, 12));
        let empty = GeneticEncoding::new();

        let counter = InnovationCounter::after(&[a, empty, b]);
        assert_eq!(counter.peek(), 13);
    }

    #[test]
    fn test_after_empty_population() {
        assert_eq!(InnovationCounter::after(&[]).peek(), 0);
    }

    #[test]
    fn test_advance_past_never_moves_backwards() {
        let mut genome = GeneticEncoding::new();
        genome.add_neuron_gene(NeuronGene::new(NeuronType::Bias, 0));
        genome.add_neuron_gene(NeuronGene::new(NeuronType::Input, 6));

        let mut counter = InnovationCounter::new();
        counter.advance_past([&genome]);
        assert_eq!(counter.peek(), 7);

        let mut ahead = InnovationCounter::starting_at(50);
        ahead.advance_past([&genome]);
        assert_eq!(ahead.peek(), 50);
    }

    #[test]
    fn test_exhausted_counter_is_reported() {
        let mut counter = InnovationCounter::starting_at(u64::MAX - 2);
        assert!(counter.ensure_available(2).is_ok());
        assert_eq!(counter.next_mark(), u64::MAX - 2);
        assert_eq!(counter.next_mark(), u64::MAX - 1);

        assert_eq!(counter.remaining(), 0);
        assert!(matches!(
            counter.ensure_available(1),
            Err(NeatError::InnovationsExhausted {
                next: u64::MAX,
                requested: 1
            })
        ));
        // Saturates instead of wrapping around to marks already in use
        assert_eq!(counter.next_mark(), u64::MAX);
        assert_eq!(counter.peek(), u64::MAX);
    }

    #[test]
    fn test_after_genome_at_the_mark_limit() {
        let mut genome = GeneticEncoding::new();
        genome.add_neuron_gene(NeuronGene::new(NeuronType::Hidden, u64::MAX));
        let counter = InnovationCounter::after(&[genome]);
        assert_eq!(counter.remaining(), 0);
    }
}
