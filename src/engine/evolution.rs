//! Mutation and tournament-selection search loop.
//!
//! The engine owns a fixed-size population of organisms and an explicit
//! random generator. Each generation it evaluates every organism on a
//! private cell, ranks the population, carries the top fifth over unchanged,
//! refills the rest by 3-way tournament, and mutates non-elites. The elite
//! carry-over guarantees the best fitness never decreases between
//! generations.

use crate::engine::fitness::{self, FitnessMode};
use crate::engine::organism::Organism;
use crate::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Fraction of the population carried over unchanged: top ⌊N/5⌋.
const ELITE_DIVISOR: usize = 5;

/// Organisms drawn per tournament.
const TOURNAMENT_SIZE: usize = 3;

/// Chance for a non-elite organism to have one byte rewritten.
const MUTATION_RATE: f64 = 0.1;

/// Generations between progress reports and early-exit checks.
const REPORT_INTERVAL: u32 = 100;

/// The evolutionary search engine.
pub struct Engine {
    population: Vec<Organism>,
    target: String,
    mode: FitnessMode,
    rng: ChaCha20Rng,
    population_size: usize,
    dna_length: usize,
}

impl Engine {
    /// Builds a population of `population_size` organisms with uniformly
    /// random DNA of `dna_length` bytes.
    ///
    /// The generator is seeded from OS entropy unless an explicit seed is
    /// given, in which case the whole run is reproducible.
    pub fn new(
        population_size: usize,
        dna_length: usize,
        mode: FitnessMode,
        seed: Option<u64>,
    ) -> Self {
        let mut rng = match seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        let population = (0..population_size)
            .map(|_| Organism::random(dna_length, &mut rng))
            .collect();
        Self {
            population,
            target: String::new(),
            mode,
            rng,
            population_size,
            dna_length,
        }
    }

    /// Sets the target string used by the string-like modes.
    pub fn set_target(&mut self, target: &str) {
        self.target = target.to_string();
    }

    /// Runs the generation loop.
    ///
    /// Reports the best fitness every [`REPORT_INTERVAL`] generations and,
    /// on those generations, stops early once the mode's perfect-score
    /// threshold is reached.
    pub fn evolve(&mut self, generations: u32) {
        // A degenerate empty population has nothing to evolve or report.
        if self.population.is_empty() {
            return;
        }
        for generation in 0..generations {
            self.evaluate();
            self.select();
            self.mutate();

            if generation % REPORT_INTERVAL == 0 {
                let best = self.population[0].fitness;
                info!("generation {generation} | best fitness: {best}");
                if let Some(threshold) = self.mode.early_exit_threshold() {
                    if best >= threshold {
                        info!("perfect score reached, stopping early");
                        return;
                    }
                }
            }
        }
    }

    /// The rank-0 organism, by value.
    pub fn best(&self) -> Organism {
        self.population[0].clone()
    }

    /// Scores every organism independently, then sorts the population
    /// descending by fitness. The sort is stable, so equal scores keep
    /// their pre-sort order: lower index first.
    fn evaluate(&mut self) {
        for organism in &mut self.population {
            organism.fitness =
                fitness::score(self.mode, &self.target, &organism.dna, &mut self.rng);
        }
        self.population
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    }

    /// Copies the elite prefix unchanged, then fills the next generation by
    /// repeated 3-way tournament over the current one (draws are uniform,
    /// with replacement; the fittest of the three survives).
    fn select(&mut self) {
        let elite_count = self.population_size / ELITE_DIVISOR;
        let mut next_gen: Vec<Organism> = Vec::with_capacity(self.population_size);
        next_gen.extend_from_slice(&self.population[..elite_count]);

        while next_gen.len() < self.population_size {
            let mut winner = self.rng.gen_range(0..self.population_size);
            for _ in 1..TOURNAMENT_SIZE {
                let challenger = self.rng.gen_range(0..self.population_size);
                if self.population[challenger].fitness > self.population[winner].fitness {
                    winner = challenger;
                }
            }
            next_gen.push(self.population[winner].clone());
        }

        self.population = next_gen;
    }

    /// Gives every non-elite organism a [`MUTATION_RATE`] chance of exactly
    /// one byte rewritten with a fresh random value. Elites are never
    /// mutated, so the previous best solution always survives intact.
    fn mutate(&mut self) {
        // Zero-length DNA has no byte to rewrite.
        if self.dna_length == 0 {
            return;
        }
        let elite_count = self.population_size / ELITE_DIVISOR;
        let rng = &mut self.rng;
        for organism in self.population.iter_mut().skip(elite_count) {
            if rng.gen_bool(MUTATION_RATE) {
                let pos = rng.gen_range(0..self.dna_length);
                organism.dna[pos] = rng.gen();
            }
        }
    }
}
