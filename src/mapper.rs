//! Reshapes classified formats and video metadata into the response schemas.
//!
//! Zero substitution used for ranking never reaches these outputs: absent
//! numbers stay absent, absent strings become `""`.

use crate::classifier::ClassifiedFormat;
use crate::models::{
    CanonicalFormat, CanonicalResponse, MediaType, SimplifiedFormat, SimplifiedResponse,
    VideoMeta, SCHEMA_VERSION,
};
use crate::orchestrator::Selection;
use crate::selector::{best_video, within_ceiling};

pub fn map_format(format: &ClassifiedFormat) -> CanonicalFormat {
    let raw = &format.raw;
    CanonicalFormat {
        format_id: raw.format_id.clone(),
        format_note: text(&raw.format_note),
        ext: text(&raw.ext),
        vcodec: text(&raw.vcodec),
        acodec: text(&raw.acodec),
        height: raw.height,
        width: raw.width,
        fps: raw.fps,
        tbr: raw.tbr,
        abr: raw.abr,
        filesize: raw.filesize,
        filesize_approx: raw.filesize_approx,
        url: text(&raw.url),
        protocol: text(&raw.protocol),
        container: text(&raw.container),
        dynamic_range: text(&raw.dynamic_range),
        aspect_ratio: raw.aspect_ratio,
        video_ext: text(&raw.video_ext),
        audio_ext: text(&raw.audio_ext),
        resolution: text(&raw.resolution),
        format: text(&raw.format),
        http_headers: raw.http_headers.clone(),
        needs_merge: format.needs_merge,
    }
}

pub fn map_response(meta: &VideoMeta, selection: &Selection) -> CanonicalResponse {
    let webpage_url = text(&meta.webpage_url);
    CanonicalResponse {
        schema_version: SCHEMA_VERSION,
        id: text(&meta.id),
        title: text(&meta.title),
        thumbnail: text(&meta.thumbnail),
        channel_id: text(&meta.channel_id),
        channel_url: text(&meta.channel_url),
        duration: meta.duration,
        original_url: meta.original_url.clone().unwrap_or_else(|| webpage_url.clone()),
        webpage_url,
        media_type: media_type(&selection.formats),
        needs_merge: selection
            .formats
            .iter()
            .any(|f| f.raw.has_video() && f.needs_merge),
        formats: selection.formats.iter().map(map_format).collect(),
        best_formats: selection.best_formats.iter().map(map_format).collect(),
    }
}

/// `Video` if any of `formats` carries a video codec.
pub fn media_type(formats: &[ClassifiedFormat]) -> MediaType {
    if formats.iter().any(|f| f.raw.has_video()) {
        MediaType::Video
    } else {
        MediaType::Audio
    }
}

/// Video-capable entries under `max_quality`, in the simplified legacy shape.
pub fn map_simplified(
    meta: &VideoMeta,
    formats: &[ClassifiedFormat],
    max_quality: Option<u32>,
) -> SimplifiedResponse {
    let video: Vec<ClassifiedFormat> = formats
        .iter()
        .filter(|f| f.raw.has_video() && within_ceiling(f, max_quality))
        .cloned()
        .collect();

    SimplifiedResponse {
        title: text(&meta.title),
        thumbnail: text(&meta.thumbnail),
        description: meta.description.clone(),
        uploader: meta.uploader.clone(),
        webpage_url: text(&meta.webpage_url),
        duration: meta.duration,
        best_format: best_video(&video, None).map(simplify),
        formats: video.iter().map(simplify).collect(),
    }
}

fn simplify(format: &ClassifiedFormat) -> SimplifiedFormat {
    let raw = &format.raw;
    SimplifiedFormat {
        format_id: raw.format_id.clone(),
        format_note: text(&raw.format_note),
        ext: text(&raw.ext),
        resolution: resolution_display(raw.width, raw.height),
        fps: raw.fps,
        filesize: raw.filesize,
        filesize_approx: raw.filesize_approx,
        url: text(&raw.url),
    }
}

pub fn resolution_display(width: Option<u32>, height: Option<u32>) -> String {
    match (width, height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => format!("{}x{}", w, h),
        _ => "N/A".to_string(),
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawFormat;
    use crate::orchestrator::list_all_formats;
    use serde_json::Value;

    fn video_only() -> ClassifiedFormat {
        let mut raw = RawFormat {
            format_id: "137".to_string(),
            format_note: Some("1080p".to_string()),
            ext: Some("mp4".to_string()),
            vcodec: Some("avc1.640028".to_string()),
            acodec: Some("none".to_string()),
            height: Some(1080),
            width: Some(1920),
            fps: Some(30.0),
            tbr: Some(4000.5),
            url: Some("https://cdn.example/137".to_string()),
            protocol: Some("https".to_string()),
            ..Default::default()
        };
        raw.http_headers.insert("User-Agent".to_string(), "Mozilla/5.0".to_string());
        ClassifiedFormat::new(raw)
    }

    fn bare_audio() -> ClassifiedFormat {
        ClassifiedFormat::new(RawFormat {
            format_id: "251".to_string(),
            vcodec: Some("none".to_string()),
            acodec: Some("opus".to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn canonical_format_keeps_every_present_field() {
        let format = video_only();
        let mapped = map_format(&format);

        assert_eq!(mapped.format_id, "137");
        assert_eq!(mapped.height, Some(1080));
        assert_eq!(mapped.width, Some(1920));
        assert_eq!(mapped.tbr, Some(4000.5));
        assert_eq!(mapped.fps, Some(30.0));
        assert_eq!(mapped.http_headers.get("User-Agent").map(String::as_str), Some("Mozilla/5.0"));
        assert!(mapped.needs_merge);

        let json = serde_json::to_string(&mapped).unwrap();
        let back: CanonicalFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mapped);
    }

    #[test]
    fn absent_numbers_stay_absent() {
        let mapped = map_format(&bare_audio());
        let json = serde_json::to_value(&mapped).unwrap();
        let object = json.as_object().unwrap();

        for key in ["height", "width", "fps", "tbr", "abr", "filesize", "filesize_approx", "aspect_ratio"] {
            assert!(!object.contains_key(key), "{key} should be omitted");
        }
        assert_eq!(object["ext"], Value::String(String::new()));
        assert_eq!(object["url"], Value::String(String::new()));
        assert_eq!(object["needs_merge"], Value::Bool(false));
    }

    #[test]
    fn response_reports_media_type_and_merge() {
        let meta = VideoMeta {
            id: Some("abc".to_string()),
            title: Some("Clip".to_string()),
            webpage_url: Some("https://www.youtube.com/watch?v=abc".to_string()),
            ..Default::default()
        };
        let selection = Selection {
            formats: vec![video_only(), bare_audio()],
            best_formats: vec![video_only(), bare_audio()],
        };

        let response = map_response(&meta, &selection);
        assert_eq!(response.schema_version, SCHEMA_VERSION);
        assert_eq!(response.media_type, MediaType::Video);
        assert!(response.needs_merge);
        assert_eq!(response.original_url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(response.thumbnail, "");
        assert_eq!(response.duration, None);

        let audio_only = Selection {
            formats: vec![bare_audio()],
            best_formats: vec![bare_audio()],
        };
        let response = map_response(&meta, &audio_only);
        assert_eq!(response.media_type, MediaType::Audio);
        assert!(!response.needs_merge);
    }

    #[test]
    fn empty_selection_maps_to_empty_lists() {
        let response = map_response(&VideoMeta::default(), &Selection::default());
        assert!(response.formats.is_empty());
        assert!(response.best_formats.is_empty());
        assert_eq!(response.media_type, MediaType::Audio);
        assert_eq!(response.original_url, "");
    }

    #[test]
    fn list_all_output_is_byte_identical_across_runs() {
        let mut other = video_only().raw;
        other.format_id = "136".to_string();
        other.height = Some(720);
        other.http_headers.insert("Accept".to_string(), "*/*".to_string());
        let raw = vec![bare_audio().raw, other, video_only().raw];
        let meta = VideoMeta::default();

        let first = serde_json::to_vec(&map_response(&meta, &list_all_formats(&raw))).unwrap();
        let second = serde_json::to_vec(&map_response(&meta, &list_all_formats(&raw))).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn resolution_display_needs_both_dimensions() {
        assert_eq!(resolution_display(Some(1920), Some(1080)), "1920x1080");
        assert_eq!(resolution_display(Some(1920), None), "N/A");
        assert_eq!(resolution_display(Some(0), Some(1080)), "N/A");
        assert_eq!(resolution_display(None, None), "N/A");
    }

    #[test]
    fn simplified_shape_filters_to_video_under_ceiling() {
        let mut sd = video_only();
        sd.raw.format_id = "135".to_string();
        sd.raw.height = Some(480);
        sd.raw.width = None;
        let formats = vec![video_only(), sd, bare_audio()];

        let response = map_simplified(&VideoMeta::default(), &formats, Some(720));
        assert_eq!(response.formats.len(), 1);
        assert_eq!(response.formats[0].resolution, "N/A");
        assert_eq!(response.best_format.as_ref().map(|f| f.format_id.as_str()), Some("135"));

        assert_eq!(response.uploader, None);

        let meta = VideoMeta {
            description: Some("Official video".to_string()),
            uploader: Some("Rick Astley".to_string()),
            ..Default::default()
        };
        let response = map_simplified(&meta, &formats, None);
        assert_eq!(response.formats[0].resolution, "1920x1080");
        assert_eq!(response.description.as_deref(), Some("Official video"));
        assert_eq!(response.uploader.as_deref(), Some("Rick Astley"));
        assert_eq!(response.best_format.map(|f| f.format_id), Some("137".to_string()));
    }
}
