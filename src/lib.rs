//! petri: a sandboxed byte-code cell and the evolutionary engine that
//! breeds programs for it.
//!
//! The crate is built around a deliberately tiny machine, the [`Cell`]:
//! four 8-bit registers, 256 bytes of memory, a 13-instruction set and a
//! hard cycle budget. On top of it sit an evolutionary search engine that
//! scores random byte sequences against four objectives, a base-4 text
//! codec for shipping evolved genomes around, a disassembler and a
//! transpiler for inspecting them, and a two-cell shared-memory arena.
//!
//! # Modules
//!
//! - [`virtual_machine`]: The cell, its instruction set and memory model
//! - [`engine`]: Population, fitness objectives and the generation loop
//! - [`codec`]: Framed base-4 text encoding of genomes
//! - [`arena`]: Two cells battling over one shared buffer
//! - [`utils`]: Logging
//!
//! [`Cell`]: virtual_machine::cell::Cell

pub mod arena;
pub mod codec;
pub mod engine;
pub mod utils;
pub mod virtual_machine;
