//! Reproducible payload generation.

/// Return `len` bytes of reproducible, non-repeating-looking content.
///
/// The bytes come from a fixed-seed xorshift generator, so every value in
/// `0..=255` appears and identical lengths always yield identical payloads.
#[must_use]
pub fn deterministic_payload(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x9E37_79B9;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state.to_be_bytes()[0]
        })
        .collect()
}
