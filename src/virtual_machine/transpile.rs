//! Naive bytecode-to-source transpiler.
//!
//! Emits a standalone Rust program reproducing a linear decoding of the
//! bytecode. Each instruction start offset becomes one arm of an `ip`
//! dispatch loop, standing in for labels and gotos. The translation is
//! deliberately naive: a jump targeting the middle of an instruction lands
//! on no arm and falls through to the terminating branch, mirroring the
//! limits of a straight-line decode of self-modifying genomes.

use crate::virtual_machine::isa::OpCode;
use std::fmt::Write;

/// Translates `bytecode` into Rust source for a standalone program.
pub fn to_rust_source(bytecode: &[u8]) -> String {
    let mut arms = String::new();
    let mut i = 0usize;

    // Operand fetch past the end of the buffer yields 0, like reading the
    // zeroed memory beyond a loaded program.
    let byte_at = |idx: usize| -> u8 { bytecode.get(idx).copied().unwrap_or(0) };

    while i < bytecode.len() {
        let offset = i;
        let op = OpCode::from_byte(bytecode[i]);
        i += 1;

        let body = match op {
            Some(OpCode::Nop) | None => String::new(),
            Some(OpCode::Inc) => {
                let r = byte_at(i) % 4;
                i += 1;
                format!("r[{r}] = r[{r}].wrapping_add(1);")
            }
            Some(OpCode::Dec) => {
                let r = byte_at(i) % 4;
                i += 1;
                format!("r[{r}] = r[{r}].wrapping_sub(1);")
            }
            Some(OpCode::Add) => {
                let (d, s) = (byte_at(i) % 4, byte_at(i + 1) % 4);
                i += 2;
                format!("r[{d}] = r[{d}].wrapping_add(r[{s}]);")
            }
            Some(OpCode::Sub) => {
                let (d, s) = (byte_at(i) % 4, byte_at(i + 1) % 4);
                i += 2;
                format!("r[{d}] = r[{d}].wrapping_sub(r[{s}]);")
            }
            Some(OpCode::Mov) => {
                let (d, s) = (byte_at(i) % 4, byte_at(i + 1) % 4);
                i += 2;
                format!("r[{d}] = r[{s}];")
            }
            Some(OpCode::Ldi) => {
                let (d, v) = (byte_at(i) % 4, byte_at(i + 1));
                i += 2;
                format!("r[{d}] = {v};")
            }
            Some(OpCode::Jmp) => {
                let t = byte_at(i);
                i += 1;
                let _ = writeln!(arms, "            {offset} => ip = {t},");
                continue;
            }
            Some(OpCode::Jz) => {
                let t = byte_at(i);
                i += 1;
                let _ = writeln!(
                    arms,
                    "            {offset} => ip = if r[0] == 0 {{ {t} }} else {{ {next} }},",
                    next = i
                );
                continue;
            }
            Some(OpCode::Io) => {
                let port = byte_at(i);
                i += 1;
                match port {
                    0 => "out.push(r[0] as char);".to_string(),
                    1 => "out.push_str(&r[0].to_string());".to_string(),
                    _ => String::new(),
                }
            }
            Some(OpCode::Ld) => {
                let (d, a) = (byte_at(i) % 4, byte_at(i + 1) % 4);
                i += 2;
                format!("r[{d}] = m[r[{a}] as usize];")
            }
            Some(OpCode::St) => {
                let (a, s) = (byte_at(i) % 4, byte_at(i + 1) % 4);
                i += 2;
                format!("m[r[{a}] as usize] = r[{s}];")
            }
            Some(OpCode::Hlt) => {
                let _ = writeln!(arms, "            {offset} => break,");
                continue;
            }
        };

        if body.is_empty() {
            let _ = writeln!(arms, "            {offset} => ip = {i},");
        } else {
            let _ = writeln!(arms, "            {offset} => {{ {body} ip = {i}; }}", i = i);
        }
    }

    format!(
        "\
// Transpiled from {len} bytes of cell bytecode.
fn main() {{
    let mut r: [u8; 4] = [0; 4];
    let mut m: [u8; 256] = [0; 256];
    let mut out = String::new();
    let mut ip: usize = 0;
    loop {{
        match ip {{
{arms}            _ => break,
        }}
    }}
    let _ = (&r, &m);
    print!(\"{{out}}\");
}}
",
        len = bytecode.len(),
        arms = arms
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const LDI: u8 = OpCode::Ldi as u8;
    const IO: u8 = OpCode::Io as u8;
    const JZ: u8 = OpCode::Jz as u8;
    const HLT: u8 = OpCode::Hlt as u8;

    #[test]
    fn transpiles_hello_program() {
        let src = to_rust_source(&[LDI, 0, 72, IO, 0, LDI, 0, 105, IO, 0, HLT]);
        assert!(src.contains("0 => { r[0] = 72; ip = 3; }"));
        assert!(src.contains("3 => { out.push(r[0] as char); ip = 5; }"));
        assert!(src.contains("10 => break,"));
    }

    #[test]
    fn conditional_jump_branches_on_r0() {
        let src = to_rust_source(&[JZ, 7, HLT]);
        assert!(src.contains("0 => ip = if r[0] == 0 { 7 } else { 2 },"));
    }

    #[test]
    fn unknown_bytes_advance_one() {
        let src = to_rust_source(&[0x42, HLT]);
        assert!(src.contains("0 => ip = 1,"));
        assert!(src.contains("1 => break,"));
    }
}
