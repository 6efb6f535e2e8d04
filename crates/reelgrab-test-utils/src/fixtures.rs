// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synthetic media payloads with real container signatures.

fn padded(prefix: &[u8], len: usize) -> Vec<u8> {
    let mut bytes = prefix.to_vec();
    bytes.resize(len.max(prefix.len()), 0x5A);
    bytes
}

/// JPEG (SOI + APP0 marker) of exactly `len` bytes.
pub fn jpeg_bytes(len: usize) -> Vec<u8> {
    padded(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'], len)
}

/// PNG of exactly `len` bytes.
pub fn png_bytes(len: usize) -> Vec<u8> {
    padded(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A], len)
}

/// MP4 (`ftyp isom`) of exactly `len` bytes.
pub fn mp4_bytes(len: usize) -> Vec<u8> {
    padded(
        &[0x00, 0x00, 0x00, 0x20, b'f', b't', b'y', b'p', b'i', b's', b'o', b'm'],
        len,
    )
}

/// WebM (EBML header) of exactly `len` bytes.
pub fn webm_bytes(len: usize) -> Vec<u8> {
    padded(&[0x1A, 0x45, 0xDF, 0xA3], len)
}

/// Bytes with no recognisable signature.
pub fn unsigned_bytes(len: usize) -> Vec<u8> {
    vec![0x5A; len]
}
