//! Instruction set definitions.
//!
//! The [`for_each_opcode!`](crate::for_each_opcode) macro holds the canonical
//! opcode table and invokes a callback macro for code generation, so the
//! interpreter, disassembler and transpiler never duplicate the definitions.
//!
//! # Bytecode Format
//!
//! Instructions use variable-length encoding with one-byte operands:
//! - Opcode: 1 byte
//! - Register operand: 1 byte, taken modulo 4
//! - Immediate: 1 byte (unsigned)
//! - Jump target: 1 byte, taken modulo memory capacity
//!
//! Every byte value is executable: bytes that match no opcode behave as
//! `NOP`, so mutation of a program can change its behavior but can never
//! produce a malformed one. The opcode values below are the wire format and
//! must not be renumbered.

/// Invokes a callback macro with the complete opcode definition list.
///
/// Each entry is `Name = opcode, "MNEMONIC", operand_count`.
#[macro_export]
macro_rules! for_each_opcode {
    ($callback:ident) => {
        $callback! {
            /// NOP ; no effect
            Nop = 0x00, "NOP", 0,
            /// INC reg ; reg += 1 (wrapping)
            Inc = 0x01, "INC", 1,
            /// DEC reg ; reg -= 1 (wrapping)
            Dec = 0x02, "DEC", 1,
            /// ADD dst, src ; dst += src (wrapping)
            Add = 0x03, "ADD", 2,
            /// SUB dst, src ; dst -= src (wrapping)
            Sub = 0x04, "SUB", 2,
            /// MOV dst, src ; dst = src
            Mov = 0x05, "MOV", 2,
            /// LDI dst, imm8 ; dst = imm8
            Ldi = 0x06, "LDI", 2,
            /// JMP imm8 ; ip = imm8 mod capacity
            Jmp = 0x07, "JMP", 1,
            /// JZ imm8 ; if R0 == 0 then ip = imm8 mod capacity
            Jz = 0x08, "JZ", 1,
            /// IO port ; port 0 emits R0 as a raw byte, port 1 as decimal text
            Io = 0x09, "IO", 1,
            /// LD dst, addrReg ; dst = memory[reg[addrReg] mod capacity]
            Ld = 0x0A, "LD", 2,
            /// ST addrReg, src ; memory[reg[addrReg] mod capacity] = reg[src]
            St = 0x0B, "ST", 2,
            /// HLT ; halted = true
            Hlt = 0xFF, "HLT", 0,
        }
    };
}

#[macro_export]
macro_rules! define_opcodes {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $code:expr, $mnemonic:literal, $argc:expr
        ),* $(,)?
    ) => {
        /// One decoded opcode of the cell's instruction set.
        #[derive(Copy, Clone, Debug, Eq, PartialEq)]
        #[repr(u8)]
        pub enum OpCode {
            $(
                $(#[$doc])*
                $name = $code,
            )*
        }

        impl OpCode {
            /// Decodes an opcode byte. Returns `None` for unrecognized bytes,
            /// which the cell executes as `NOP`.
            pub const fn from_byte(byte: u8) -> Option<OpCode> {
                match byte {
                    $( $code => Some(OpCode::$name), )*
                    _ => None,
                }
            }

            /// Returns the assembly mnemonic for this opcode.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( OpCode::$name => $mnemonic, )*
                }
            }

            /// Number of operand bytes following the opcode byte.
            pub const fn operand_count(&self) -> usize {
                match self {
                    $( OpCode::$name => $argc, )*
                }
            }
        }
    };
}

for_each_opcode!(define_opcodes);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_byte_decodes_every_opcode() {
        for op in [
            OpCode::Nop,
            OpCode::Inc,
            OpCode::Dec,
            OpCode::Add,
            OpCode::Sub,
            OpCode::Mov,
            OpCode::Ldi,
            OpCode::Jmp,
            OpCode::Jz,
            OpCode::Io,
            OpCode::Ld,
            OpCode::St,
            OpCode::Hlt,
        ] {
            assert_eq!(OpCode::from_byte(op as u8), Some(op));
        }
    }

    #[test]
    fn from_byte_rejects_unassigned_bytes() {
        assert_eq!(OpCode::from_byte(0x0C), None);
        assert_eq!(OpCode::from_byte(0x42), None);
        assert_eq!(OpCode::from_byte(0xFE), None);
    }

    #[test]
    fn opcode_values_are_wire_format() {
        assert_eq!(OpCode::Nop as u8, 0x00);
        assert_eq!(OpCode::Ldi as u8, 0x06);
        assert_eq!(OpCode::St as u8, 0x0B);
        assert_eq!(OpCode::Hlt as u8, 0xFF);
    }

    #[test]
    fn mnemonics() {
        assert_eq!(OpCode::Ldi.mnemonic(), "LDI");
        assert_eq!(OpCode::Jz.mnemonic(), "JZ");
        assert_eq!(OpCode::Hlt.mnemonic(), "HLT");
    }

    #[test]
    fn operand_counts() {
        assert_eq!(OpCode::Nop.operand_count(), 0);
        assert_eq!(OpCode::Jmp.operand_count(), 1);
        assert_eq!(OpCode::Add.operand_count(), 2);
    }
}
