//! Evolutionary program-synthesis engine.
//!
//! Owns a population of byte-sequence organisms, evaluates each on an
//! embedded cell, and breeds the next generation by elitism, tournament
//! selection and point mutation.
//!
//! # Modules
//!
//! - [`organism`]: Candidate programs and their scores
//! - [`fitness`]: The four scoring objectives
//! - [`evolution`]: The generation loop

pub mod evolution;
pub mod fitness;
pub mod organism;
