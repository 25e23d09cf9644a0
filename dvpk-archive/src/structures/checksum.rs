//! crc32 that both formats use for integrity checks
//!
//! the archives use the reflected zlib/png polynomial (`0xEDB88320`), seeded with
//! `0xFFFFFFFF` and inverted at the end, which is exactly what `crc32fast` computes.

#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
