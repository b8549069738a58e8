//! Two-cell battle arena over one shared memory buffer.
//!
//! Two cells are registered on a single 1024-byte buffer and stepped in
//! strict round-robin on one thread of control; no finer interleaving
//! exists and no locking is needed. A periodic terminal snapshot shows each
//! cell's instruction pointer and the live memory contents; the renderer
//! only reads cell state.
//!
//! The instruction pointer stays 8 bits wide here, as everywhere else, so
//! its natural range covers only the first quarter of the buffer before
//! wrapping. The second warrior's code at offset 512 is data rather than
//! directly reachable code unless a warrior copies it down with LD/ST.

use crate::virtual_machine::cell::Cell;
use crate::virtual_machine::memory::{shared_buffer, SharedMemory};
use crate::warn;
use std::io::Write;
use std::time::Duration;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Capacity of the shared battleground buffer.
pub const ARENA_CAPACITY: usize = 1024;

/// Maximum bytes loaded per warrior; longer programs are truncated.
pub const WARRIOR_LIMIT: usize = 256;

/// Load offset of the second warrior.
const P2_BASE: usize = 512;

/// Cycles between rendered frames.
const RENDER_INTERVAL: u32 = 50;

/// Cosmetic pacing delay between frames; not part of battle semantics.
const FRAME_DELAY: Duration = Duration::from_millis(50);

/// Memory cells rendered per terminal row.
const ROW_WIDTH: usize = 64;

/// A shared buffer with exactly two registered cells.
pub struct Arena {
    memory: SharedMemory,
    p1: Cell,
    p2: Cell,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    /// Creates a zeroed battleground with two cells over the same buffer.
    pub fn new() -> Self {
        let memory = shared_buffer(ARENA_CAPACITY);
        let p1 = Cell::with_shared_memory(memory.clone());
        let p2 = Cell::with_shared_memory(memory.clone());
        Self { memory, p1, p2 }
    }

    /// Clears the battleground and loads one warrior at offset 0 and the
    /// other at offset 512, each truncated to [`WARRIOR_LIMIT`] bytes with
    /// a diagnostic. Both cells are reset; shared memory survives the reset
    /// by design, so the loaded programs stay in place.
    pub fn load_warriors(&mut self, dna1: &[u8], dna2: &[u8]) {
        {
            let mut memory = self.memory.borrow_mut();
            memory.fill(0);

            if dna1.len() > WARRIOR_LIMIT {
                warn!("warrior 1 is {} bytes, truncating to {}", dna1.len(), WARRIOR_LIMIT);
            }
            let len1 = dna1.len().min(WARRIOR_LIMIT);
            memory[..len1].copy_from_slice(&dna1[..len1]);

            if dna2.len() > WARRIOR_LIMIT {
                warn!("warrior 2 is {} bytes, truncating to {}", dna2.len(), WARRIOR_LIMIT);
            }
            let len2 = dna2.len().min(WARRIOR_LIMIT);
            memory[P2_BASE..P2_BASE + len2].copy_from_slice(&dna2[..len2]);
        }

        self.p1.reset();
        self.p1.set_ip(0);

        self.p2.reset();
        // The 8-bit pointer truncates the 512 offset to 0: warrior 2's
        // processor starts at the bottom of the buffer, exactly as the
        // historical behavior demands. Its code at 512 is reachable only
        // through LD/ST, never by straight-line fetch.
        self.p2.set_ip((P2_BASE % 256) as u8);
    }

    /// Alternates single steps between the two cells for up to `cycles`
    /// rounds, rendering every [`RENDER_INTERVAL`] cycles. Stops early when
    /// both cells have halted.
    pub fn run_battle(&mut self, cycles: u32) {
        for cycle in 0..cycles {
            if !self.p1.halted() {
                self.p1.step();
            }
            if !self.p2.halted() {
                self.p2.step();
            }

            if cycle % RENDER_INTERVAL == 0 {
                self.render();
                std::thread::sleep(FRAME_DELAY);
            }

            if self.p1.halted() && self.p2.halted() {
                println!("Both warriors died.");
                break;
            }
        }
    }

    /// Instruction pointers of both cells, for inspection.
    pub fn pointers(&self) -> (u8, u8) {
        (self.p1.ip(), self.p2.ip())
    }

    /// Draws one snapshot of the battleground: both instruction pointers
    /// plus a glyph per memory cell. Read-only with respect to cell state.
    fn render(&self) {
        let mut stdout = StandardStream::stdout(ColorChoice::Auto);

        // ANSI clear-screen plus home.
        let _ = write!(stdout, "\x1b[2J\x1b[H");
        let _ = writeln!(
            stdout,
            "P1 IP={} | P2 IP={}",
            self.p1.ip(),
            self.p2.ip()
        );

        let memory = self.memory.borrow();
        for (addr, &byte) in memory.iter().enumerate() {
            let here_p1 = addr == self.p1.ip() as usize;
            let here_p2 = addr == self.p2.ip() as usize;

            let mut spec = ColorSpec::new();
            if here_p1 && here_p2 {
                spec.set_fg(Some(Color::Magenta)).set_bold(true);
                let _ = stdout.set_color(&spec);
                let _ = write!(stdout, "XX");
            } else if here_p1 {
                spec.set_fg(Some(Color::Red)).set_bold(true);
                let _ = stdout.set_color(&spec);
                let _ = write!(stdout, "[]");
            } else if here_p2 {
                spec.set_fg(Some(Color::Blue)).set_bold(true);
                let _ = stdout.set_color(&spec);
                let _ = write!(stdout, "[]");
            } else if byte != 0 {
                spec.set_fg(Some(Color::Green)).set_bold(true);
                let _ = stdout.set_color(&spec);
                let glyph = if byte.is_ascii_graphic() { byte as char } else { '.' };
                let _ = write!(stdout, "{} ", glyph);
            } else {
                let _ = stdout.reset();
                let _ = write!(stdout, ". ");
            }
            let _ = stdout.reset();

            if (addr + 1) % ROW_WIDTH == 0 {
                let _ = writeln!(stdout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::virtual_machine::isa::OpCode;

    const LDI: u8 = OpCode::Ldi as u8;
    const ST: u8 = OpCode::St as u8;
    const JMP: u8 = OpCode::Jmp as u8;
    const HLT: u8 = OpCode::Hlt as u8;

    #[test]
    fn load_places_warriors_at_their_bases() {
        let mut arena = Arena::new();
        arena.load_warriors(&[LDI, 0, 1, HLT], &[JMP, 0]);
        let memory = arena.memory.borrow();
        assert_eq!(&memory[..4], &[LDI, 0, 1, HLT]);
        assert_eq!(&memory[P2_BASE..P2_BASE + 2], &[JMP, 0]);
    }

    #[test]
    fn load_truncates_oversized_warriors() {
        let mut arena = Arena::new();
        let fat = vec![0xAA; WARRIOR_LIMIT + 10];
        arena.load_warriors(&fat, &[]);
        let memory = arena.memory.borrow();
        assert_eq!(memory[WARRIOR_LIMIT - 1], 0xAA);
        assert_eq!(memory[WARRIOR_LIMIT], 0);
    }

    #[test]
    fn both_pointers_start_in_the_low_page() {
        // The 8-bit pointer cannot express offset 512; it truncates to 0.
        let mut arena = Arena::new();
        arena.load_warriors(&[HLT], &[HLT]);
        assert_eq!(arena.pointers(), (0, 0));
    }

    #[test]
    fn reload_clears_previous_battle() {
        let mut arena = Arena::new();
        arena.load_warriors(&[0xAA, 0xBB], &[]);
        arena.load_warriors(&[HLT], &[]);
        let memory = arena.memory.borrow();
        assert_eq!(memory[1], 0);
    }

    #[test]
    fn warrior_stores_are_visible_to_the_opponent() {
        let mut arena = Arena::new();
        // P1 stores 7 at address 20 and halts; P2 spins forever.
        let p1 = [LDI, 1, 20, LDI, 2, 7, ST, 1, 2, HLT];
        arena.load_warriors(&p1, &[JMP, 0]);
        for _ in 0..10 {
            if !arena.p1.halted() {
                arena.p1.step();
            }
            if !arena.p2.halted() {
                arena.p2.step();
            }
        }
        assert!(arena.p1.halted());
        assert!(!arena.p2.halted());
        assert_eq!(arena.memory.borrow()[20], 7);
    }
}
