//! Splits a raw format list into video-capable and audio-only buckets.

use crate::models::RawFormat;

/// A raw format plus its derived merge requirement.
///
/// `needs_merge` is always computed from the codecs here and never taken from
/// the extractor output.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedFormat {
    pub raw: RawFormat,
    pub needs_merge: bool,
}

impl ClassifiedFormat {
    pub fn new(raw: RawFormat) -> Self {
        let needs_merge = raw.has_video() && !raw.has_audio();
        Self { raw, needs_merge }
    }

    /// Video and audio in a single stream.
    pub fn is_muxed(&self) -> bool {
        self.raw.has_video() && self.raw.has_audio()
    }
}

/// Result of [`classify`]. Both buckets keep the input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    /// Muxed and video-only formats.
    pub video: Vec<ClassifiedFormat>,
    /// Audio-only formats.
    pub audio: Vec<ClassifiedFormat>,
}

/// Partitions `formats`; entries carrying neither codec are dropped.
pub fn classify(formats: &[RawFormat]) -> Buckets {
    let mut buckets = Buckets::default();
    let mut dropped = 0usize;

    for format in formats {
        if format.has_video() {
            buckets.video.push(ClassifiedFormat::new(format.clone()));
        } else if format.has_audio() {
            buckets.audio.push(ClassifiedFormat::new(format.clone()));
        } else {
            dropped += 1;
        }
    }

    tracing::debug!(
        video = buckets.video.len(),
        audio = buckets.audio.len(),
        dropped,
        "classified formats"
    );
    buckets
}
