//! Core cell interpreter.
//!
//! A cell executes bytecode over four 8-bit registers and a fixed-size,
//! byte-addressable memory. All arithmetic uses wrapping semantics, register
//! indices are taken modulo 4, and addresses modulo memory capacity, so
//! every possible byte sequence is a valid program. Execution is bounded by
//! a hard cycle cap; there is no other loop-detection mechanism.

use crate::virtual_machine::errors::CellError;
use crate::virtual_machine::isa::OpCode;
use crate::virtual_machine::memory::{CellMemory, SharedMemory};

/// Number of general-purpose registers (R0..R3).
pub const REGISTER_COUNT: usize = 4;

/// Default memory capacity for a standalone cell.
pub const DEFAULT_CAPACITY: usize = 256;

/// Hard cap on instructions executed per run. Reaching the cap halts the
/// cell; accumulated output remains valid for fitness scoring.
pub const MAX_CYCLES: u32 = 1000;

/// One instance of the instruction-set virtual machine.
///
/// The instruction pointer is deliberately 8 bits wide. Over the default
/// 256-byte memory it addresses everything; over the 1024-byte arena buffer
/// its natural range reaches only the first 256 bytes before wrapping. That
/// boundary is part of the machine's observable behavior and is preserved
/// rather than widened (see [`crate::arena`]).
pub struct Cell {
    memory: CellMemory,
    registers: [u8; REGISTER_COUNT],
    ip: u8,
    halted: bool,
    cycle_count: u32,
    output_buffer: Vec<u8>,
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

impl Cell {
    /// Creates a cell with fresh zeroed memory of the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a cell with fresh zeroed memory of the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_memory(CellMemory::owned(capacity))
    }

    /// Creates a cell over a buffer shared with exactly one other cell.
    /// The buffer contents are not zeroed by construction.
    pub fn with_shared_memory(handle: SharedMemory) -> Self {
        Self::from_memory(CellMemory::shared(handle))
    }

    fn from_memory(memory: CellMemory) -> Self {
        Self {
            memory,
            registers: [0; REGISTER_COUNT],
            ip: 0,
            halted: false,
            cycle_count: 0,
            output_buffer: Vec::new(),
        }
    }

    /// Fixed capacity of the cell's memory.
    pub fn capacity(&self) -> usize {
        self.memory.capacity()
    }

    /// Zeroes registers, instruction pointer, halt flag, cycle counter and
    /// output. Memory content is wiped only when the cell owns it; shared
    /// memory is left untouched so two co-resident cells do not erase each
    /// other's loaded program.
    pub fn reset(&mut self) {
        self.memory.zero();
        self.registers = [0; REGISTER_COUNT];
        self.output_buffer.clear();
        self.ip = 0;
        self.halted = false;
        self.cycle_count = 0;
    }

    /// Copies a program into the start of memory.
    ///
    /// Refuses oversized programs: memory is left unmodified and
    /// [`CellError::ProgramTooLarge`] is returned. This is a soft failure;
    /// callers log a diagnostic and continue.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), CellError> {
        if program.len() > self.capacity() {
            return Err(CellError::ProgramTooLarge {
                len: program.len(),
                capacity: self.capacity(),
            });
        }
        self.memory.load(program);
        Ok(())
    }

    /// Value of register `index` (modulo 4).
    pub fn register(&self, index: usize) -> u8 {
        self.registers[index % REGISTER_COUNT]
    }

    /// Overwrites register `index` (modulo 4). Used by fitness modes to seed
    /// inputs before a run.
    pub fn set_register(&mut self, index: usize, value: u8) {
        self.registers[index % REGISTER_COUNT] = value;
    }

    /// Current instruction pointer.
    pub fn ip(&self) -> u8 {
        self.ip
    }

    /// Repositions the instruction pointer. Used by the arena to place each
    /// warrior at its starting offset.
    pub fn set_ip(&mut self, ip: u8) {
        self.ip = ip;
    }

    /// Whether the cell has halted.
    pub fn halted(&self) -> bool {
        self.halted
    }

    /// Instructions executed since the last reset.
    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    /// Overwrites one byte of memory directly, bypassing the instruction
    /// set. Used by the survival fitness mode to inject corruption.
    pub fn poke_memory(&mut self, addr: usize, value: u8) {
        self.memory.write(addr, value);
    }

    /// Bytes produced by `IO` instructions since the last reset.
    pub fn output(&self) -> &[u8] {
        &self.output_buffer
    }

    /// Output buffer rendered as a string, with invalid UTF-8 replaced.
    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output_buffer).into_owned()
    }

    /// Fetches one byte at the instruction pointer and post-increments it.
    /// The pointer wraps at 8 bits; the memory index wraps at capacity.
    fn fetch(&mut self) -> u8 {
        let byte = self.memory.read(self.ip as usize);
        self.ip = self.ip.wrapping_add(1);
        byte
    }

    /// Fetches a register-index operand, normalized modulo 4.
    fn fetch_reg(&mut self) -> usize {
        (self.fetch() as usize) % REGISTER_COUNT
    }

    /// Executes one fetch-decode-execute step.
    ///
    /// No-op when halted. Reaching the cycle cap halts the cell instead of
    /// executing; this is the termination guarantee, not an error.
    pub fn step(&mut self) {
        if self.halted {
            return;
        }
        if self.cycle_count >= MAX_CYCLES {
            self.halted = true;
            return;
        }
        let opcode = self.fetch();
        self.execute(opcode);
        self.cycle_count += 1;
    }

    /// Steps until the cell halts. Termination is guaranteed solely by the
    /// cycle cap.
    pub fn run(&mut self) {
        while !self.halted {
            self.step();
        }
    }

    fn execute(&mut self, opcode: u8) {
        // Bytes matching no opcode are NOPs: mutation can change behavior
        // but can never produce a malformed program.
        let Some(op) = OpCode::from_byte(opcode) else {
            return;
        };
        match op {
            OpCode::Nop => {}
            OpCode::Inc => self.op_inc(),
            OpCode::Dec => self.op_dec(),
            OpCode::Add => self.op_add(),
            OpCode::Sub => self.op_sub(),
            OpCode::Mov => self.op_mov(),
            OpCode::Ldi => self.op_ldi(),
            OpCode::Jmp => self.op_jmp(),
            OpCode::Jz => self.op_jz(),
            OpCode::Io => self.op_io(),
            OpCode::Ld => self.op_ld(),
            OpCode::St => self.op_st(),
            OpCode::Hlt => self.halted = true,
        }
    }

    fn op_inc(&mut self) {
        let reg = self.fetch_reg();
        self.registers[reg] = self.registers[reg].wrapping_add(1);
    }

    fn op_dec(&mut self) {
        let reg = self.fetch_reg();
        self.registers[reg] = self.registers[reg].wrapping_sub(1);
    }

    fn op_add(&mut self) {
        let dst = self.fetch_reg();
        let src = self.fetch_reg();
        self.registers[dst] = self.registers[dst].wrapping_add(self.registers[src]);
    }

    fn op_sub(&mut self) {
        let dst = self.fetch_reg();
        let src = self.fetch_reg();
        self.registers[dst] = self.registers[dst].wrapping_sub(self.registers[src]);
    }

    fn op_mov(&mut self) {
        let dst = self.fetch_reg();
        let src = self.fetch_reg();
        self.registers[dst] = self.registers[src];
    }

    fn op_ldi(&mut self) {
        let dst = self.fetch_reg();
        let imm = self.fetch();
        self.registers[dst] = imm;
    }

    fn op_jmp(&mut self) {
        let target = self.fetch();
        self.ip = (target as usize % self.capacity()) as u8;
    }

    fn op_jz(&mut self) {
        let target = self.fetch();
        if self.registers[0] == 0 {
            self.ip = (target as usize % self.capacity()) as u8;
        }
    }

    fn op_io(&mut self) {
        let port = self.fetch();
        match port {
            0 => self.output_buffer.push(self.registers[0]),
            1 => self
                .output_buffer
                .extend_from_slice(self.registers[0].to_string().as_bytes()),
            // Writes to unassigned ports disappear.
            _ => {}
        }
    }

    fn op_ld(&mut self) {
        let dst = self.fetch_reg();
        let addr_reg = self.fetch_reg();
        let addr = self.registers[addr_reg];
        self.registers[dst] = self.memory.read(addr as usize);
    }

    fn op_st(&mut self) {
        let addr_reg = self.fetch_reg();
        let src = self.fetch_reg();
        let addr = self.registers[addr_reg];
        self.memory.write(addr as usize, self.registers[src]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::virtual_machine::memory::shared_buffer;

    const NOP: u8 = OpCode::Nop as u8;
    const INC: u8 = OpCode::Inc as u8;
    const DEC: u8 = OpCode::Dec as u8;
    const ADD: u8 = OpCode::Add as u8;
    const SUB: u8 = OpCode::Sub as u8;
    const MOV: u8 = OpCode::Mov as u8;
    const LDI: u8 = OpCode::Ldi as u8;
    const JMP: u8 = OpCode::Jmp as u8;
    const JZ: u8 = OpCode::Jz as u8;
    const IO: u8 = OpCode::Io as u8;
    const LD: u8 = OpCode::Ld as u8;
    const ST: u8 = OpCode::St as u8;
    const HLT: u8 = OpCode::Hlt as u8;

    fn run_cell(program: &[u8]) -> Cell {
        let mut cell = Cell::new();
        cell.load_program(program).expect("program fits");
        cell.run();
        cell
    }

    // ==================== Register ops ====================

    #[test]
    fn ldi_loads_immediate_into_every_register() {
        for reg in 0..4u8 {
            let cell = run_cell(&[LDI, reg, 0xA5, HLT]);
            assert_eq!(cell.register(reg as usize), 0xA5);
        }
    }

    #[test]
    fn register_operands_wrap_modulo_four() {
        // Register index 7 aliases R3.
        let cell = run_cell(&[LDI, 7, 42, HLT]);
        assert_eq!(cell.register(3), 42);
    }

    #[test]
    fn inc_wraps_at_256() {
        let cell = run_cell(&[LDI, 0, 255, INC, 0, HLT]);
        assert_eq!(cell.register(0), 0);
    }

    #[test]
    fn dec_wraps_below_zero() {
        let cell = run_cell(&[DEC, 2, HLT]);
        assert_eq!(cell.register(2), 255);
    }

    #[test]
    fn add_and_sub_wrap() {
        let cell = run_cell(&[LDI, 0, 200, LDI, 1, 100, ADD, 0, 1, HLT]);
        assert_eq!(cell.register(0), 44);

        let cell = run_cell(&[LDI, 0, 10, LDI, 1, 20, SUB, 0, 1, HLT]);
        assert_eq!(cell.register(0), 246);
    }

    #[test]
    fn mov_copies_between_registers() {
        let cell = run_cell(&[LDI, 1, 77, MOV, 0, 1, HLT]);
        assert_eq!(cell.register(0), 77);
        assert_eq!(cell.register(1), 77);
    }

    // ==================== Control flow ====================

    #[test]
    fn jmp_redirects_execution() {
        // Jump over the LDI that would clobber R0.
        let cell = run_cell(&[LDI, 0, 1, JMP, 8, LDI, 0, 99, HLT]);
        assert_eq!(cell.register(0), 1);
    }

    #[test]
    fn jz_taken_only_when_r0_is_zero() {
        let taken = run_cell(&[JZ, 5, LDI, 1, 9, HLT]);
        assert_eq!(taken.register(1), 0);

        let not_taken = run_cell(&[LDI, 0, 1, JZ, 10, LDI, 1, 9, NOP, NOP, HLT]);
        assert_eq!(not_taken.register(1), 9);
    }

    // ==================== IO ====================

    #[test]
    fn io_port_zero_emits_raw_byte() {
        let cell = run_cell(&[LDI, 0, b'X', IO, 0, HLT]);
        assert_eq!(cell.output(), b"X");
    }

    #[test]
    fn io_port_one_emits_decimal_text() {
        let cell = run_cell(&[LDI, 0, 200, IO, 1, HLT]);
        assert_eq!(cell.output(), b"200");
    }

    #[test]
    fn io_unassigned_port_is_silent() {
        let cell = run_cell(&[LDI, 0, 7, IO, 9, HLT]);
        assert!(cell.output().is_empty());
    }

    // ==================== Memory ops ====================

    #[test]
    fn st_then_ld_round_trips_through_memory() {
        // R1 holds the address, R2 the value; read it back into R3.
        let cell = run_cell(&[LDI, 1, 200, LDI, 2, 55, ST, 1, 2, LD, 3, 1, HLT]);
        assert_eq!(cell.register(3), 55);
    }

    #[test]
    fn ld_reads_program_bytes() {
        // Address 0 holds the LDI opcode itself.
        let cell = run_cell(&[LDI, 1, 0, LD, 0, 1, HLT]);
        assert_eq!(cell.register(0), LDI);
    }

    // ==================== Fault semantics ====================

    #[test]
    fn unrecognized_opcode_is_a_nop() {
        let cell = run_cell(&[0x0C, 0x42, 0xFE, LDI, 0, 5, HLT]);
        assert_eq!(cell.register(0), 5);
        assert!(cell.halted());
    }

    #[test]
    fn run_terminates_on_all_zero_program() {
        // An empty memory is an endless NOP slide; the cycle cap halts it.
        let mut cell = Cell::new();
        cell.run();
        assert!(cell.halted());
        assert_eq!(cell.cycle_count(), MAX_CYCLES);
    }

    #[test]
    fn run_terminates_on_all_ff_program() {
        let program = vec![0xFF; DEFAULT_CAPACITY];
        let cell = run_cell(&program);
        assert!(cell.halted());
        assert_eq!(cell.cycle_count(), 1);
    }

    #[test]
    fn cycle_cap_halts_tight_loop() {
        let cell = run_cell(&[JMP, 0]);
        assert!(cell.halted());
        assert_eq!(cell.cycle_count(), MAX_CYCLES);
    }

    #[test]
    fn step_after_halt_is_a_nop() {
        let mut cell = run_cell(&[HLT]);
        let cycles = cell.cycle_count();
        cell.step();
        assert_eq!(cell.cycle_count(), cycles);
    }

    // ==================== Loading and reset ====================

    #[test]
    fn load_rejects_oversized_program_and_keeps_memory() {
        let mut cell = Cell::with_capacity(4);
        cell.load_program(&[LDI, 0, 9, HLT]).unwrap();
        let err = cell.load_program(&[0; 5]).unwrap_err();
        assert_eq!(
            err,
            CellError::ProgramTooLarge {
                len: 5,
                capacity: 4
            }
        );
        // Prior program still runs.
        cell.run();
        assert_eq!(cell.register(0), 9);
    }

    #[test]
    fn reset_clears_state_and_owned_memory() {
        let mut cell = run_cell(&[LDI, 0, b'A', IO, 0, HLT]);
        cell.reset();
        assert_eq!(cell.register(0), 0);
        assert_eq!(cell.ip(), 0);
        assert!(!cell.halted());
        assert_eq!(cell.cycle_count(), 0);
        assert!(cell.output().is_empty());
        // Memory was wiped: running again is a NOP slide to the cycle cap.
        cell.run();
        assert!(cell.output().is_empty());
        assert_eq!(cell.cycle_count(), MAX_CYCLES);
    }

    #[test]
    fn reset_preserves_shared_memory() {
        let handle = shared_buffer(DEFAULT_CAPACITY);
        handle.borrow_mut()[0] = HLT;
        let mut cell = Cell::with_shared_memory(handle.clone());
        cell.reset();
        assert_eq!(handle.borrow()[0], HLT);
    }

    #[test]
    fn shared_cells_observe_each_others_stores() {
        let handle = shared_buffer(DEFAULT_CAPACITY);
        let mut writer = Cell::with_shared_memory(handle.clone());
        let mut reader = Cell::with_shared_memory(handle);

        // Writer stores 99 at address 100, then halts.
        writer
            .load_program(&[LDI, 1, 100, LDI, 2, 99, ST, 1, 2, HLT])
            .unwrap();
        writer.run();

        // Reader picks it up through its own view.
        reader.set_register(1, 100);
        reader.set_ip(200);
        reader.poke_memory(200, LD);
        reader.poke_memory(201, 0);
        reader.poke_memory(202, 1);
        reader.poke_memory(203, HLT);
        reader.run();
        assert_eq!(reader.register(0), 99);
    }

    // ==================== Scenario ====================

    #[test]
    fn hello_program_emits_hi() {
        let cell = run_cell(&[LDI, 0, 72, IO, 0, LDI, 0, 105, IO, 0, HLT]);
        assert_eq!(cell.output_string(), "Hi");
    }
}
