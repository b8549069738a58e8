//! Sandboxed instruction-set virtual machine ("the cell").
//!
//! The cell is a fixed small-register, byte-addressable interpreter over a
//! fixed-size memory block, executed one fetch-decode-execute step at a time
//! under a hard cycle cap.
//!
//! # Architecture
//!
//! - **Registers**: 4 wrapping 8-bit counters (R0..R3)
//! - **Instruction pointer**: 8 bits, post-incremented with wraparound
//! - **Memory**: owned and zeroed, or a view shared with one other cell
//! - **Instruction format**: one-byte opcodes with one-byte operands
//! - **Fault model**: none; unknown opcodes are NOPs, addresses wrap
//!
//! # Modules
//!
//! - [`isa`]: Opcode table, mnemonics and operand arity
//! - [`memory`]: Owned vs shared backing storage
//! - [`cell`]: Core interpreter
//! - [`errors`]: Program-loader error type
//! - [`disasm`]: Per-byte bytecode trace printer
//! - [`transpile`]: Naive bytecode-to-Rust-source translator

pub mod cell;
pub mod disasm;
pub mod errors;
pub mod isa;
pub mod memory;
pub mod transpile;
