//! Bytecode trace printer.
//!
//! Renders a raw byte buffer as one `[hex] MNEMONIC` line per byte. The
//! trace is deliberately naive: operand bytes are printed as if they were
//! opcodes, because in an evolved program any byte may end up executed as
//! one depending on where control flow lands.

use crate::virtual_machine::isa::OpCode;
use std::fmt::Write;

/// Formats a per-byte trace of `bytecode`.
pub fn trace(bytecode: &[u8]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Bytecode size: {} bytes", bytecode.len());
    let _ = writeln!(out, "Assembly trace:");
    for &byte in bytecode {
        let label = match OpCode::from_byte(byte) {
            Some(op) => op.mnemonic(),
            None => "???",
        };
        let _ = writeln!(out, "[{:02X}] {}", byte, label);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_labels_known_opcodes() {
        let out = trace(&[0x06, 0x00, 0x48, 0xFF]);
        assert!(out.contains("[06] LDI"));
        assert!(out.contains("[FF] HLT"));
    }

    #[test]
    fn trace_marks_unknown_bytes() {
        let out = trace(&[0x42]);
        assert!(out.contains("[42] ???"));
    }

    #[test]
    fn trace_reports_size() {
        let out = trace(&[0x00, 0x00, 0x00]);
        assert!(out.contains("3 bytes"));
    }
}
