//! Picks the best audio, video and muxed streams out of classified formats.
//!
//! Every selector keeps the first candidate among equally ranked ones, which
//! is what a stable descending sort followed by taking the head would give.

use std::cmp::Ordering;

use crate::classifier::ClassifiedFormat;

/// Best audio-only stream: m4a first, then highest `abr`.
pub fn best_audio(audio: &[ClassifiedFormat]) -> Option<&ClassifiedFormat> {
    first_max_by(audio, compare_audio)
}

/// Best video stream whose height does not exceed `max_quality`, ranked by
/// height then `tbr`. A missing height counts as 0 and always passes.
pub fn best_video(video: &[ClassifiedFormat], max_quality: Option<u32>) -> Option<&ClassifiedFormat> {
    first_max_by(
        video.iter().filter(|f| within_ceiling(f, max_quality)),
        compare_video,
    )
}

/// Best muxed stream under `max_quality`, scored by `height + tbr / 1000`.
pub fn best_combined(video: &[ClassifiedFormat], max_quality: Option<u32>) -> Option<&ClassifiedFormat> {
    first_max_by(
        video
            .iter()
            .filter(|f| f.is_muxed() && within_ceiling(f, max_quality)),
        |a, b| combined_score(a).total_cmp(&combined_score(b)),
    )
}

/// Stable sort, best video first.
pub fn sort_by_quality(video: &mut [ClassifiedFormat]) {
    video.sort_by(|a, b| compare_video(b, a));
}

pub fn within_ceiling(format: &ClassifiedFormat, max_quality: Option<u32>) -> bool {
    max_quality.map_or(true, |max| format.raw.height_or_zero() <= max)
}

fn compare_audio(a: &ClassifiedFormat, b: &ClassifiedFormat) -> Ordering {
    is_m4a(a)
        .cmp(&is_m4a(b))
        .then_with(|| a.raw.abr_or_zero().total_cmp(&b.raw.abr_or_zero()))
}

fn compare_video(a: &ClassifiedFormat, b: &ClassifiedFormat) -> Ordering {
    a.raw
        .height_or_zero()
        .cmp(&b.raw.height_or_zero())
        .then_with(|| a.raw.tbr_or_zero().total_cmp(&b.raw.tbr_or_zero()))
}

fn is_m4a(format: &ClassifiedFormat) -> bool {
    format.raw.ext.as_deref() == Some("m4a")
}

fn combined_score(format: &ClassifiedFormat) -> f64 {
    f64::from(format.raw.height_or_zero()) + format.raw.tbr_or_zero() / 1000.0
}

fn first_max_by<'a, I, F>(candidates: I, mut compare: F) -> Option<&'a ClassifiedFormat>
where
    I: IntoIterator<Item = &'a ClassifiedFormat>,
    F: FnMut(&ClassifiedFormat, &ClassifiedFormat) -> Ordering,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(current) if compare(candidate, current) != Ordering::Greater => Some(current),
        _ => Some(candidate),
    })
}
