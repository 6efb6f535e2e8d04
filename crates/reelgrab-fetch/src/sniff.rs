// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Magic-byte content sniffing.
//!
//! Classifies payloads as image or video from their leading bytes, ignoring
//! whatever the server claimed in `Content-Type`.

use reelgrab_core::MediaKind;

/// Default size above which an unsigned payload is assumed to be video.
pub const DEFAULT_VIDEO_THRESHOLD: usize = 2 * 1024 * 1024;

/// ISO-BMFF brands that carry still images rather than video.
const STILL_IMAGE_BRANDS: &[&[u8; 4]] = &[b"heic", b"heix", b"mif1", b"avif"];

/// A recognised container signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    Jpeg,
    Png,
    Gif,
    Webp,
    /// `ftyp` box at offset 4, with its major brand.
    IsoBmff([u8; 4]),
    /// EBML header (WebM, Matroska).
    Matroska,
    Flv,
}

impl Signature {
    pub fn kind(&self) -> MediaKind {
        match self {
            Signature::Jpeg | Signature::Png | Signature::Gif | Signature::Webp => {
                MediaKind::Image
            }
            Signature::IsoBmff(brand) if STILL_IMAGE_BRANDS.contains(&brand) => MediaKind::Image,
            Signature::IsoBmff(_) | Signature::Matroska | Signature::Flv => MediaKind::Video,
        }
    }
}

/// Reads the container signature from the first bytes of a payload.
pub fn sniff(bytes: &[u8]) -> Option<Signature> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(Signature::Jpeg);
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some(Signature::Png);
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some(Signature::Gif);
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some(Signature::Webp);
    }
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        let mut brand = [0u8; 4];
        brand.copy_from_slice(&bytes[8..12]);
        return Some(Signature::IsoBmff(brand));
    }
    if bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some(Signature::Matroska);
    }
    if bytes.starts_with(b"FLV") {
        return Some(Signature::Flv);
    }
    None
}

/// Image/video classifier with a size fallback for unsigned payloads.
///
/// The fallback is a guess: a large unsigned image is reported as video.
#[derive(Debug, Clone, Copy)]
pub struct ContentSniffer {
    video_threshold: usize,
}

impl ContentSniffer {
    pub fn new(video_threshold: usize) -> Self {
        Self { video_threshold }
    }

    pub fn video_threshold(&self) -> usize {
        self.video_threshold
    }

    /// Classifies a payload. Never returns `MediaKind::Unknown`.
    pub fn identify(&self, bytes: &[u8]) -> MediaKind {
        self.identify_with_hint(bytes, MediaKind::Unknown)
    }

    /// Signature first, then the platform's declared type, then size.
    pub fn identify_with_hint(&self, bytes: &[u8], hint: MediaKind) -> MediaKind {
        if let Some(signature) = sniff(bytes) {
            return signature.kind();
        }
        match hint {
            MediaKind::Image | MediaKind::Video => hint,
            MediaKind::Unknown if bytes.len() > self.video_threshold => MediaKind::Video,
            MediaKind::Unknown => MediaKind::Image,
        }
    }
}

impl Default for ContentSniffer {
    fn default() -> Self {
        Self::new(DEFAULT_VIDEO_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_prefix(prefix: &[u8], len: usize) -> Vec<u8> {
        let mut bytes = prefix.to_vec();
        bytes.resize(len, 0x42);
        bytes
    }

    fn ftyp(brand: &[u8; 4]) -> Vec<u8> {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x18];
        bytes.extend_from_slice(b"ftyp");
        bytes.extend_from_slice(brand);
        bytes.resize(4096, 0);
        bytes
    }

    #[test]
    fn jpeg_png_gif_webp_are_images() {
        let s = ContentSniffer::default();
        assert_eq!(s.identify(&with_prefix(&[0xFF, 0xD8, 0xFF, 0xE0], 2048)), MediaKind::Image);
        assert_eq!(
            s.identify(&with_prefix(b"\x89PNG\r\n\x1a\n", 2048)),
            MediaKind::Image
        );
        assert_eq!(s.identify(&with_prefix(b"GIF89a", 2048)), MediaKind::Image);
        assert_eq!(s.identify(&with_prefix(b"GIF87a", 2048)), MediaKind::Image);
        assert_eq!(
            s.identify(&with_prefix(b"RIFF\x00\x00\x00\x00WEBPVP8 ", 2048)),
            MediaKind::Image
        );
    }

    #[test]
    fn signed_image_beats_size_fallback() {
        let s = ContentSniffer::default();
        let big_jpeg = with_prefix(&[0xFF, 0xD8, 0xFF], 3 * 1024 * 1024);
        assert_eq!(s.identify(&big_jpeg), MediaKind::Image);
    }

    #[test]
    fn ftyp_at_offset_four_is_video() {
        let s = ContentSniffer::default();
        assert_eq!(s.identify(&ftyp(b"isom")), MediaKind::Video);
        assert_eq!(s.identify(&ftyp(b"mp42")), MediaKind::Video);
        assert_eq!(s.identify(&ftyp(b"qt  ")), MediaKind::Video);
    }

    #[test]
    fn still_image_brands_are_images() {
        let s = ContentSniffer::default();
        assert_eq!(s.identify(&ftyp(b"heic")), MediaKind::Image);
        assert_eq!(s.identify(&ftyp(b"avif")), MediaKind::Image);
    }

    #[test]
    fn webm_and_flv_are_video() {
        let s = ContentSniffer::default();
        assert_eq!(s.identify(&with_prefix(&[0x1A, 0x45, 0xDF, 0xA3], 2048)), MediaKind::Video);
        assert_eq!(s.identify(&with_prefix(b"FLV\x01", 2048)), MediaKind::Video);
    }

    #[test]
    fn unsigned_payloads_fall_back_to_size() {
        let s = ContentSniffer::default();
        assert_eq!(s.identify(&vec![0x42; 3 * 1024 * 1024]), MediaKind::Video);
        assert_eq!(s.identify(&vec![0x42; 500]), MediaKind::Image);
        // Strictly greater than the threshold.
        assert_eq!(s.identify(&vec![0x42; DEFAULT_VIDEO_THRESHOLD]), MediaKind::Image);
        assert_eq!(s.identify(&vec![0x42; DEFAULT_VIDEO_THRESHOLD + 1]), MediaKind::Video);
    }

    #[test]
    fn empty_and_short_inputs_are_total() {
        let s = ContentSniffer::default();
        assert_eq!(s.identify(&[]), MediaKind::Image);
        assert_eq!(s.identify(&[0xFF]), MediaKind::Image);
        assert_eq!(s.identify(b"\0\0\0\0ftyp"), MediaKind::Image);
    }

    #[test]
    fn hint_applies_only_without_signature() {
        let s = ContentSniffer::default();
        let unsigned = vec![0x42; 4096];
        assert_eq!(s.identify_with_hint(&unsigned, MediaKind::Video), MediaKind::Video);
        let jpeg = with_prefix(&[0xFF, 0xD8, 0xFF], 4096);
        assert_eq!(s.identify_with_hint(&jpeg, MediaKind::Video), MediaKind::Image);
    }

    #[test]
    fn threshold_is_configurable() {
        let s = ContentSniffer::new(1000);
        assert_eq!(s.identify(&vec![0x42; 1001]), MediaKind::Video);
        assert_eq!(s.video_threshold(), 1000);
    }

    #[test]
    fn sniff_reports_brand() {
        assert_eq!(sniff(&ftyp(b"mp42")), Some(Signature::IsoBmff(*b"mp42")));
        assert_eq!(sniff(b"hello world, not media"), None);
    }
}
