//! Historical-mark alignment of two genetic encodings.
//!
//! Genes of two genomes are paired by historical mark rather than by position.
//! Both genomes are sorted by mark and walked with one cursor each; every step
//! jumps straight to the next mark present in either sequence, so the cost is
//! `O(n log n)` in the total gene count and independent of how far apart the
//! marks are.
//!
//! One-sided pairs are classified against the *other* genome's inclusive mark
//! range: inside it the gene is disjoint, outside it the gene is excess.

use std::cmp::Ordering;

use crate::error::{NeatError, Result};
use crate::gene::GeneRef;
use crate::genome::GeneticEncoding;

/// Inclusive range of historical marks carried by a genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkRange {
    pub min: u64,
    pub max: u64,
}

impl MarkRange {
    #[must_use]
    pub fn contains(&self, mark: u64) -> bool {
        (self.min..=self.max).contains(&mark)
    }
}

/// How an aligned pair relates the two genomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairKind {
    /// Both genomes carry the mark.
    Matching,
    /// One-sided, inside the other genome's mark range.
    Disjoint,
    /// One-sided, outside the other genome's mark range.
    Excess,
}

/// Genes of both genomes at one historical mark. At least one side is present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenePair<'a>(Sides<'a>);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Sides<'a> {
    Both(GeneRef<'a>, GeneRef<'a>),
    First(GeneRef<'a>),
    Second(GeneRef<'a>),
}

impl<'a> GenePair<'a> {
    /// The gene from the first genome, if it carries this mark.
    #[must_use]
    pub fn first(&self) -> Option<GeneRef<'a>> {
        match self.0 {
            Sides::Both(gene, _) | Sides::First(gene) => Some(gene),
            Sides::Second(_) => None,
        }
    }

    /// The gene from the second genome, if it carries this mark.
    #[must_use]
    pub fn second(&self) -> Option<GeneRef<'a>> {
        match self.0 {
            Sides::Both(_, gene) | Sides::Second(gene) => Some(gene),
            Sides::First(_) => None,
        }
    }

    /// The shared historical mark of this pair.
    #[must_use]
    pub fn mark(&self) -> u64 {
        match self.0 {
            Sides::Both(gene, _) | Sides::First(gene) | Sides::Second(gene) => {
                gene.historical_mark()
            }
        }
    }

    #[must_use]
    pub fn is_matching(&self) -> bool {
        matches!(self.0, Sides::Both(..))
    }
}

/// Gene counts by pair kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneDiff {
    pub matching: usize,
    pub disjoint: usize,
    pub excess: usize,
}

/// The result of aligning two genomes.
#[derive(Debug, Clone)]
pub struct Alignment<'a> {
    /// Pairs in ascending mark order.
    pub pairs: Vec<GenePair<'a>>,
    pub first_range: MarkRange,
    pub second_range: MarkRange,
}

impl<'a> Alignment<'a> {
    /// Classify a pair produced by this alignment.
    #[must_use]
    pub fn kind(&self, pair: &GenePair<'a>) -> PairKind {
        match pair.0 {
            Sides::Both(..) => PairKind::Matching,
            Sides::First(gene) => Self::one_sided(gene.historical_mark(), self.second_range),
            Sides::Second(gene) => Self::one_sided(gene.historical_mark(), self.first_range),
        }
    }

    fn one_sided(mark: u64, other_range: MarkRange) -> PairKind {
        if other_range.contains(mark) {
            PairKind::Disjoint
        } else {
            PairKind::Excess
        }
    }

    /// Count matching, disjoint and excess genes.
    #[must_use]
    pub fn diff(&self) -> GeneDiff {
        let mut diff = GeneDiff::default();
        for pair in &self.pairs {
            match self.kind(pair) {
                PairKind::Matching => diff.matching += 1,
                PairKind::Disjoint => diff.disjoint += 1,
                PairKind::Excess => diff.excess += 1,
            }
        }
        diff
    }
}

/// Pair the genes of two genomes by historical mark.
///
/// Genes with the same mark in both genomes form a matching pair; every other
/// gene appears alone. Each gene of either genome appears in exactly one pair.
/// If a genome carries a mark twice, the surplus gene is emitted one-sided.
///
/// # Errors
///
/// Returns [`NeatError::EmptyGenome`] if either genome has no genes.
pub fn align<'a>(
    genome1: &'a GeneticEncoding,
    genome2: &'a GeneticEncoding,
) -> Result<Alignment<'a>> {
    let sorted1 = genome1.sorted_genes();
    let sorted2 = genome2.sorted_genes();

    let first_range = range_of(&sorted1)?;
    let second_range = range_of(&sorted2)?;

    let mut pairs = Vec::with_capacity(sorted1.len().max(sorted2.len()));
    let mut i = 0;
    let mut j = 0;

    loop {
        let pair = match (sorted1.get(i), sorted2.get(j)) {
            (Some(&a), Some(&b)) => match a.historical_mark().cmp(&b.historical_mark()) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                    Sides::Both(a, b)
                }
                Ordering::Less => {
                    i += 1;
                    Sides::First(a)
                }
                Ordering::Greater => {
                    j += 1;
                    Sides::Second(b)
                }
            },
            (Some(&a), None) => {
                i += 1;
                Sides::First(a)
            }
            (None, Some(&b)) => {
                j += 1;
                Sides::Second(b)
            }
            (None, None) => break,
        };
        pairs.push(GenePair(pair));
    }

    Ok(Alignment {
        pairs,
        first_range,
        second_range,
    })
}

/// Count excess and disjoint genes between two genomes.
///
/// # Errors
///
/// Returns [`NeatError::EmptyGenome`] if either genome has no genes.
pub fn excess_disjoint(genome1: &GeneticEncoding, genome2: &GeneticEncoding) -> Result<GeneDiff> {
    Ok(align(genome1, genome2)?.diff())
}

fn range_of(sorted: &[GeneRef<'_>]) -> Result<MarkRange> {
    match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => Ok(MarkRange {
            min: first.historical_mark(),
            max: last.historical_mark(),
        }),
        _ => Err(NeatError::EmptyGenome),
    }
}
