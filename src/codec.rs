//! DNA-alphabet text codec.
//!
//! Maps raw bytecode to and from a printable alphabet of four symbols,
//! two bits per base (00=A, 01=C, 10=G, 11=T, most-significant pair first),
//! framed by a start marker and a stop marker. The encoding is cosmetic:
//! it carries no biological semantics.
//!
//! Decoding is deliberately forgiving: characters outside the four symbols
//! are noise and skipped, a missing start marker means "decode from the
//! beginning", a missing stop marker means "decode to the end", and a
//! trailing group of fewer than four bases is discarded.

/// Marker opening an encoded sequence.
pub const START_MARKER: &str = "ATG";

/// Marker closing an encoded sequence, searched from the end.
pub const STOP_MARKER: &str = "TAA";

/// Encodes raw bytes as a framed base-4 text string.
pub fn encode(data: &[u8]) -> String {
    let mut dna = String::with_capacity(data.len() * 4 + START_MARKER.len() + STOP_MARKER.len());
    dna.push_str(START_MARKER);
    for &byte in data {
        for shift in (0..4).rev() {
            dna.push(match (byte >> (shift * 2)) & 0b11 {
                0b00 => 'A',
                0b01 => 'C',
                0b10 => 'G',
                _ => 'T',
            });
        }
    }
    dna.push_str(STOP_MARKER);
    dna
}

/// Decodes a framed base-4 text string back into bytes.
pub fn decode(dna: &str) -> Vec<u8> {
    let start = dna
        .find(START_MARKER)
        .map(|pos| pos + START_MARKER.len())
        .unwrap_or(0);
    let end = dna.rfind(STOP_MARKER).unwrap_or(dna.len());
    if end <= start {
        return Vec::new();
    }

    let mut data = Vec::with_capacity((end - start) / 4);
    let mut current = 0u8;
    let mut bits_filled = 0;

    for &base in &dna.as_bytes()[start..end] {
        let pair = match base {
            b'A' => 0b00,
            b'C' => 0b01,
            b'G' => 0b10,
            b'T' => 0b11,
            // Noise.
            _ => continue,
        };
        current = (current << 2) | pair;
        bits_filled += 2;
        if bits_filled == 8 {
            data.push(current);
            current = 0;
            bits_filled = 0;
        }
    }

    data
}
