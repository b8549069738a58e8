//! Candidate programs and their scores.

use rand::Rng;
use rand_chacha::ChaCha20Rng;

/// One candidate byte-sequence program plus its fitness score.
///
/// The DNA is simultaneously genome and executable program: every byte
/// sequence of the configured length runs on the cell without error, so
/// mutation can change behavior but never validity. Fitness is recomputed
/// every generation and carries no history.
#[derive(Clone, Debug)]
pub struct Organism {
    /// The candidate program. Length is fixed per engine instance.
    pub dna: Vec<u8>,
    /// Scalar score from the last evaluation. Always finite.
    pub fitness: f64,
}

impl Organism {
    /// Creates an organism with uniformly random DNA of the given length.
    pub fn random(dna_length: usize, rng: &mut ChaCha20Rng) -> Self {
        Self {
            dna: (0..dna_length).map(|_| rng.gen()).collect(),
            fitness: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn random_organism_has_requested_length() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let org = Organism::random(32, &mut rng);
        assert_eq!(org.dna.len(), 32);
        assert_eq!(org.fitness, 0.0);
    }

    #[test]
    fn same_seed_yields_same_dna() {
        let mut a = ChaCha20Rng::seed_from_u64(7);
        let mut b = ChaCha20Rng::seed_from_u64(7);
        assert_eq!(Organism::random(16, &mut a).dna, Organism::random(16, &mut b).dna);
    }
}
