//! The three selection workflows, composed from the classifier and selectors.

use crate::classifier::{classify, ClassifiedFormat};
use crate::error::ExtractionError;
use crate::extractor::{ExtractOptions, Extractor};
use crate::models::{RawFormat, VideoMeta};
use crate::selector::{best_audio, best_combined, best_video, sort_by_quality};

/// Formats chosen by a workflow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Everything returned to the caller.
    pub formats: Vec<ClassifiedFormat>,
    /// The recommended single download.
    pub best_formats: Vec<ClassifiedFormat>,
}

impl Selection {
    fn download(chosen: Vec<ClassifiedFormat>) -> Self {
        Self {
            best_formats: chosen.clone(),
            formats: chosen,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty() && self.best_formats.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow<'a> {
    ListAll,
    AutoSelect { max_quality: Option<u32> },
    Explicit { format_id: &'a str },
}

impl<'a> Workflow<'a> {
    /// Explicit when a format id is given, automatic otherwise. An empty id
    /// and a zero ceiling count as not given.
    pub fn download(format_id: Option<&'a str>, max_quality: Option<u32>) -> Self {
        match format_id.filter(|id| !id.is_empty()) {
            Some(format_id) => Workflow::Explicit { format_id },
            None => Workflow::AutoSelect {
                max_quality: max_quality.filter(|&q| q > 0),
            },
        }
    }

    pub fn select(self, formats: &[RawFormat]) -> Selection {
        match self {
            Workflow::ListAll => list_all_formats(formats),
            Workflow::AutoSelect { max_quality } => auto_select_download(formats, max_quality),
            Workflow::Explicit { format_id } => explicit_format_download(formats, format_id),
        }
    }
}

/// All video-capable formats, best first, followed by the single best audio.
pub fn list_all_formats(formats: &[RawFormat]) -> Selection {
    let buckets = classify(formats);
    let audio = best_audio(&buckets.audio).cloned();

    let mut catalog = buckets.video;
    sort_by_quality(&mut catalog);

    let mut best_formats = Vec::new();
    if let Some(video) = best_video(&catalog, None) {
        best_formats.push(video.clone());
        if video.needs_merge {
            best_formats.extend(audio.clone());
        }
    }

    catalog.extend(audio);
    Selection { formats: catalog, best_formats }
}

/// Best video-only stream plus best audio, else the best muxed stream.
pub fn auto_select_download(formats: &[RawFormat], max_quality: Option<u32>) -> Selection {
    let buckets = classify(formats);
    let (video_only, muxed): (Vec<_>, Vec<_>) =
        buckets.video.into_iter().partition(|f| f.needs_merge);

    let mut chosen = Vec::new();
    if let Some(video) = best_video(&video_only, max_quality) {
        chosen.push(video.clone());
        chosen.extend(best_audio(&buckets.audio).cloned());
    } else if let Some(combined) = best_combined(&muxed, max_quality) {
        chosen.push(combined.clone());
    } else {
        tracing::debug!(?max_quality, "no format satisfies the quality ceiling");
    }
    Selection::download(chosen)
}

/// The format with `format_id`, plus best audio when it is video-only.
pub fn explicit_format_download(formats: &[RawFormat], format_id: &str) -> Selection {
    let Some(raw) = formats.iter().find(|f| f.format_id == format_id) else {
        tracing::debug!(format_id, "requested format not available");
        return Selection::default();
    };

    let matched = ClassifiedFormat::new(raw.clone());
    let needs_merge = matched.needs_merge;
    let mut chosen = vec![matched];
    if needs_merge {
        chosen.extend(best_audio(&classify(formats).audio).cloned());
    }
    Selection::download(chosen)
}

/// Extracts `url` once and runs `workflow` over the result. An extraction
/// failure is returned as-is.
pub async fn run(
    extractor: &dyn Extractor,
    url: &str,
    options: &ExtractOptions,
    workflow: Workflow<'_>,
) -> Result<(VideoMeta, Selection), ExtractionError> {
    let info = extractor.extract(url, options).await?;
    let selection = workflow.select(&info.formats);
    tracing::info!(
        "Selected {} of {} formats for '{}'",
        selection.formats.len(),
        info.formats.len(),
        info.meta.title.as_deref().unwrap_or_default()
    );
    Ok((info.meta, selection))
}
