//! The four fitness objectives.
//!
//! Every objective loads a candidate's DNA into a fresh cell, drives a
//! mode-specific protocol of resets, register pokes and runs, and reduces
//! the observed behavior to one finite scalar. No objective can fail:
//! malformed DNA simply scores badly through normal execution.

use crate::virtual_machine::cell::Cell;
use rand::Rng;
use rand_chacha::ChaCha20Rng;

/// Scoring objective, selected once per engine instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FitnessMode {
    /// Match a target string on the output buffer.
    String,
    /// Reproduce a doubling function over R0.
    Math,
    /// Keep emitting the target string despite memory corruption mid-run.
    Survival,
    /// Reproduce the XOR truth table; the only mode that requires branching.
    Consciousness,
}

/// Input/expected pairs for the doubling objective.
const MATH_TABLE: [(u8, u8); 3] = [(2, 4), (5, 10), (10, 20)];

/// The XOR truth table: (a, b, a ^ b).
const XOR_TABLE: [(u8, u8, u8); 4] = [(0, 0, 0), (0, 1, 1), (1, 0, 1), (1, 1, 0)];

/// Steps executed before corruption is injected in survival mode.
const SURVIVAL_WARMUP_STEPS: u32 = 50;

/// Single-byte corruptions injected per survival evaluation.
const SURVIVAL_HITS: usize = 2;

impl FitnessMode {
    /// Parses a mode name as given on the command line.
    pub fn from_arg(arg: &str) -> Option<FitnessMode> {
        match arg {
            "string" => Some(FitnessMode::String),
            "math" => Some(FitnessMode::Math),
            "survival" => Some(FitnessMode::Survival),
            "consciousness" => Some(FitnessMode::Consciousness),
            _ => None,
        }
    }

    /// Best fitness at which evolution may stop early, where a perfect
    /// score is reachable: 4 × 100 for a full truth table, 3 × 100 for the
    /// doubling table. Other modes run their full generation budget.
    pub fn early_exit_threshold(&self) -> Option<f64> {
        match self {
            FitnessMode::Consciousness => Some(400.0),
            FitnessMode::Math => Some(300.0),
            _ => None,
        }
    }
}

/// Scores one DNA sequence under the given mode and target.
///
/// The generator is used only by survival mode for corruption offsets and
/// values; passing it explicitly keeps runs reproducible from a seed.
pub fn score(mode: FitnessMode, target: &str, dna: &[u8], rng: &mut ChaCha20Rng) -> f64 {
    match mode {
        FitnessMode::String => score_string(target, dna),
        FitnessMode::Math => score_math(dna),
        FitnessMode::Survival => score_survival(target, dna, rng),
        FitnessMode::Consciousness => score_consciousness(dna),
    }
}

/// +100 per exact byte match with the target, minus the absolute byte
/// difference per mismatch, minus 50 per byte of length difference.
fn score_string(target: &str, dna: &[u8]) -> f64 {
    let mut cell = Cell::new();
    let _ = cell.load_program(dna);
    cell.run();
    let output = cell.output();
    let target = target.as_bytes();

    let mut score = 0.0;
    for (&got, &want) in output.iter().zip(target) {
        let diff = (got as i32 - want as i32).abs();
        if diff == 0 {
            score += 100.0;
        } else {
            score -= diff as f64;
        }
    }
    score -= (output.len() as i32 - target.len() as i32).abs() as f64 * 50.0;
    score
}

/// +100 per exact doubling, else −2 × the distance, summed over the table.
fn score_math(dna: &[u8]) -> f64 {
    let mut cell = Cell::new();
    let mut score = 0.0;
    for (input, expected) in MATH_TABLE {
        cell.reset();
        let _ = cell.load_program(dna);
        cell.set_register(0, input);
        cell.run();
        let diff = (cell.register(0) as i32 - expected as i32).abs();
        if diff == 0 {
            score += 100.0;
        } else {
            score -= diff as f64 * 2.0;
        }
    }
    score
}

/// Runs the warmup, flips two random bytes within the genome's footprint,
/// resumes to completion. +200 when the target still appears in the output,
/// +50 more for an exact length match.
fn score_survival(target: &str, dna: &[u8], rng: &mut ChaCha20Rng) -> f64 {
    let mut cell = Cell::new();
    let _ = cell.load_program(dna);
    for _ in 0..SURVIVAL_WARMUP_STEPS {
        cell.step();
    }

    if !dna.is_empty() {
        for _ in 0..SURVIVAL_HITS {
            let addr = rng.gen_range(0..dna.len());
            cell.poke_memory(addr, rng.gen());
        }
    }

    cell.run();
    let output = cell.output_string();
    let mut score = 0.0;
    if output.contains(target) {
        score += 200.0;
        if output.len() == target.len() {
            score += 50.0;
        }
    }
    score
}

/// +100 per truth-table row where R0 ends up exactly right, else −10 × the
/// deviation. XOR is not linearly separable in the cell's arithmetic, so a
/// perfect score requires JZ.
fn score_consciousness(dna: &[u8]) -> f64 {
    let mut cell = Cell::new();
    let mut score = 0.0;
    for (a, b, expected) in XOR_TABLE {
        cell.reset();
        let _ = cell.load_program(dna);
        cell.set_register(0, a);
        cell.set_register(1, b);
        cell.run();
        let diff = (cell.register(0) as i32 - expected as i32).abs();
        if diff == 0 {
            score += 100.0;
        } else {
            score -= diff as f64 * 10.0;
        }
    }
    score
}
