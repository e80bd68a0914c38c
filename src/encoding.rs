//! Decoding for the "modified UTF-8" used by CONSTANT_Utf8 entries.
//! It differs from standard UTF-8 in two ways: NUL is encoded as the two bytes `C0 80`,
//! and supplementary characters are stored as a surrogate pair, each half encoded as three bytes.

/// Decode a modified UTF-8 byte string, returning None if the bytes are not well formed.
pub fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    // most pool strings are plain ascii identifiers
    if bytes.iter().all(|b| *b != 0 && b.is_ascii()) {
        return std::str::from_utf8(bytes).ok().map(str::to_string);
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let lead = bytes[i];
        let (unit, width) = match lead {
            0x01..=0x7F => (lead as u16, 1),
            0xC0..=0xDF => {
                let b2 = continuation(bytes.get(i + 1))?;
                ((((lead & 0x1F) as u16) << 6) | b2, 2)
            }
            0xE0..=0xEF => {
                let b2 = continuation(bytes.get(i + 1))?;
                let b3 = continuation(bytes.get(i + 2))?;
                ((((lead & 0x0F) as u16) << 12) | (b2 << 6) | b3, 3)
            }
            // raw NUL and four byte forms never appear in modified utf-8
            _ => return None,
        };

        units.push(unit);
        i += width;
    }

    String::from_utf16(&units).ok()
}

fn continuation(byte: Option<&u8>) -> Option<u16> {
    match byte {
        Some(b) if b & 0xC0 == 0x80 => Some((b & 0x3F) as u16),
        _ => None,
    }
}
