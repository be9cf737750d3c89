// librfcl/src/protocol/checksum.rs

/// Whole-frame checksum used by the OSI3964, Binary and Bus encodings:
/// XOR of every content byte.
pub fn xor(content: &[u8]) -> u8 {
    content.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// ISO/IEC 14443-3 CRC_A (initial value 0x6363, no final inversion),
/// returned in wire order as a little-endian u16.
pub fn crc_a(data: &[u8]) -> u16 {
    crc_14443(data, 0x6363, false)
}

/// ISO/IEC 14443-3 CRC_B (initial value 0xFFFF, inverted result).
pub fn crc_b(data: &[u8]) -> u16 {
    crc_14443(data, 0xFFFF, true)
}

fn crc_14443(data: &[u8], init: u16, invert: bool) -> u16 {
    let mut crc = init;
    for &byte in data {
        let mut b = byte ^ (crc & 0x00ff) as u8;
        b ^= b << 4;
        crc = (crc >> 8) ^ ((b as u16) << 8) ^ ((b as u16) << 3) ^ ((b as u16) >> 4);
    }
    if invert { !crc } else { crc }
}
