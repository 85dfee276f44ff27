//! Benchmarks for symbios-neat-encoding.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use symbios_neat_encoding::{
    align, Crossover, DefaultCrossover, DefaultMutator, DissimilarityCoefficients,
    GeneticEncoding, InnovationCounter, Mutator, Neat, NeatConfig, NeuronGene, NeuronType,
};

/// Two genomes grown apart by a few rounds of structural mutation.
fn grown_pair(rng: &mut ChaCha8Rng) -> (GeneticEncoding, GeneticEncoding) {
    let mut genome1 = GeneticEncoding::fully_connected(4, 2, true, 1.0, rng);
    let mut genome2 = GeneticEncoding::fully_connected(4, 2, true, 1.0, rng);
    let mut innovations = InnovationCounter::after(&[genome1.clone(), genome2.clone()]);
    let mutator = DefaultMutator::default();

    for _ in 0..10 {
        mutator.add_neuron_mutation(&mut genome1, &mut innovations, rng);
        mutator.add_connection_mutation(&mut genome1, &mut innovations, rng);
        mutator.add_neuron_mutation(&mut genome2, &mut innovations, rng);
        mutator.add_connection_mutation(&mut genome2, &mut innovations, rng);
    }

    (genome1, genome2)
}

fn bench_genome_creation(c: &mut Criterion) {
    c.bench_function("genome_fully_connected", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        b.iter(|| {
            black_box(GeneticEncoding::fully_connected(4, 2, true, 1.0, &mut rng));
        });
    });
}

fn bench_alignment(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let (genome1, genome2) = grown_pair(&mut rng);

    c.bench_function("align", |b| {
        b.iter(|| {
            black_box(align(&genome1, &genome2).map(|a| a.pairs.len()));
        });
    });

    // Marks spread over the whole u64 range must cost no more than dense ones
    let sparse = |offset: u64| {
        let mut genome = GeneticEncoding::new();
        for i in 0..64u64 {
            genome.add_neuron_gene(NeuronGene::new(
                NeuronType::Hidden,
                i * (u64::MAX / 128) + offset,
            ));
        }
        genome
    };
    let (sparse1, sparse2) = (sparse(0), sparse(1));

    c.bench_function("align_sparse_marks", |b| {
        b.iter(|| {
            black_box(align(&sparse1, &sparse2).map(|a| a.pairs.len()));
        });
    });
}

fn bench_dissimilarity(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let (genome1, genome2) = grown_pair(&mut rng);
    let coefficients = DissimilarityCoefficients::default();

    c.bench_function("dissimilarity", |b| {
        b.iter(|| {
            black_box(GeneticEncoding::dissimilarity(
                &genome1,
                &genome2,
                &coefficients,
            ))
        });
    });
}

fn bench_crossover(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let (parent1, parent2) = grown_pair(&mut rng);
    let crossover = DefaultCrossover::default();

    c.bench_function("genome_crossover", |b| {
        b.iter(|| {
            black_box(crossover.crossover(&parent1, &parent2, &mut rng));
        });
    });
}

fn bench_new_generation(c: &mut Criterion) {
    let config = NeatConfig {
        pop_size: Some(50),
        tournament_size: Some(5),
        elite_size: Some(2),
        structural_augmentation_proba: Some(0.3),
        structural_removal_proba: Some(0.05),
        neuron_param_mut_proba: Some(0.2),
        connection_param_mut_proba: Some(0.8),
        speciation_threshold: Some(0.3),
        ..NeatConfig::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let entries: Vec<(GeneticEncoding, f64)> = (0..50u32)
        .map(|i| {
            (
                GeneticEncoding::fully_connected(4, 2, true, 1.0, &mut rng),
                f64::from(i),
            )
        })
        .collect();

    c.bench_function("produce_new_generation_50", |b| {
        let mut neat = Neat::new(DefaultMutator::default(), DefaultCrossover::default(), &config)
            .expect("valid config")
            .with_innovations(InnovationCounter::starting_at(1_000));
        b.iter(|| {
            black_box(neat.produce_new_generation(&entries, &mut rng));
        });
    });
}

criterion_group!(
    benches,
    bench_genome_creation,
    bench_alignment,
    bench_dissimilarity,
    bench_crossover,
    bench_new_generation,
);
criterion_main!(benches);
