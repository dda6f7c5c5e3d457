//! Fixed-width scalar encodings.
//!
//! Integers are big-endian with the sign bit flipped so that byte order
//! matches numeric order. Reals in keys use the usual order-preserving
//! transform; real payloads keep the raw IEEE-754 bits.

const SIGN_32: u32 = 0x8000_0000;
const SIGN_64: u64 = 0x8000_0000_0000_0000;

pub fn encode_int(n: i32) -> [u8; 4] {
    ((n as u32) ^ SIGN_32).to_be_bytes()
}

pub fn decode_int(bytes: [u8; 4]) -> i32 {
    (u32::from_be_bytes(bytes) ^ SIGN_32) as i32
}

pub fn encode_real(x: f64) -> [u8; 8] {
    x.to_bits().to_be_bytes()
}

pub fn decode_real(bytes: [u8; 8]) -> f64 {
    f64::from_bits(u64::from_be_bytes(bytes))
}

pub fn encode_sorted_real(x: f64) -> [u8; 8] {
    let bits = x.to_bits();
    let sortable = if bits & SIGN_64 != 0 {
        !bits
    } else {
        bits ^ SIGN_64
    };
    sortable.to_be_bytes()
}

pub fn decode_sorted_real(bytes: [u8; 8]) -> f64 {
    let sortable = u64::from_be_bytes(bytes);
    let bits = if sortable & SIGN_64 != 0 {
        sortable ^ SIGN_64
    } else {
        !sortable
    };
    f64::from_bits(bits)
}
