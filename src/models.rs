use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Codec value yt-dlp reports for a track that is not present in a stream.
pub const NO_CODEC: &str = "none";

/// Version of the canonical response layout.
pub const SCHEMA_VERSION: u32 = 1;

// === Extraction Models ===

/// Top-level metadata of one video, as reported by `yt-dlp --dump-json`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct VideoMeta {
    pub id: Option<String>,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub channel_id: Option<String>,
    pub channel_url: Option<String>,
    /// Length in seconds.
    pub duration: Option<f64>,
    pub webpage_url: Option<String>,
    pub original_url: Option<String>,
    pub description: Option<String>,
    pub uploader: Option<String>,
}

/// The whole document produced by one extraction call.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawExtraction {
    #[serde(flatten)]
    pub meta: VideoMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub formats: Vec<RawFormat>,
}

/// One candidate stream. Everything except the id may be missing, and the
/// codec fields may hold [`NO_CODEC`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawFormat {
    #[serde(default, deserialize_with = "string_or_number")]
    pub format_id: String,
    pub format_note: Option<String>,
    pub ext: Option<String>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub height: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub width: Option<u32>,
    pub fps: Option<f64>,
    /// Total bitrate in KBit/s
    pub tbr: Option<f64>,
    /// Audio bitrate in KBit/s
    pub abr: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub filesize: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub filesize_approx: Option<u64>,
    pub url: Option<String>,
    pub protocol: Option<String>,
    pub container: Option<String>,
    pub dynamic_range: Option<String>,
    pub aspect_ratio: Option<f64>,
    pub video_ext: Option<String>,
    pub audio_ext: Option<String>,
    pub resolution: Option<String>,
    pub format: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub http_headers: BTreeMap<String, String>,
}

impl RawFormat {
    pub fn has_video(&self) -> bool {
        codec_present(self.vcodec.as_deref())
    }

    pub fn has_audio(&self) -> bool {
        codec_present(self.acodec.as_deref())
    }

    pub fn height_or_zero(&self) -> u32 {
        self.height.unwrap_or(0)
    }

    pub fn tbr_or_zero(&self) -> f64 {
        self.tbr.unwrap_or(0.0)
    }

    pub fn abr_or_zero(&self) -> f64 {
        self.abr.unwrap_or(0.0)
    }
}

fn codec_present(codec: Option<&str>) -> bool {
    matches!(codec, Some(c) if !c.is_empty() && c != NO_CODEC)
}

// === API Request Models ===

/// The query parameters for a `GET /formats` request.
#[derive(Deserialize, Debug)]
pub struct FormatsQuery {
    pub url: String,
    pub max_quality: Option<u32>,
    /// Return the simplified video-only shape instead of the canonical one.
    #[serde(default)]
    pub legacy: bool,
}

/// Body of `POST /download-link`, or the query of `GET /download-link`.
#[derive(Deserialize, Debug)]
pub struct DownloadLinkRequest {
    pub url: String,
    pub format_id: Option<String>,
    pub max_quality: Option<u32>,
    pub enable_remote: Option<bool>,
}

// === API Response Models ===

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
}

/// A single format in the canonical schema.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CanonicalFormat {
    pub format_id: String,
    pub format_note: String,
    pub ext: String,
    pub vcodec: String,
    pub acodec: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tbr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesize: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesize_approx: Option<u64>,
    pub url: String,
    pub protocol: String,
    pub container: String,
    pub dynamic_range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
    pub video_ext: String,
    pub audio_ext: String,
    pub resolution: String,
    pub format: String,
    pub http_headers: BTreeMap<String, String>,
    pub needs_merge: bool,
}

/// The canonical response returned by `/formats` and `/download-link`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CanonicalResponse {
    pub schema_version: u32,
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub channel_id: String,
    pub channel_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub webpage_url: String,
    pub original_url: String,
    pub media_type: MediaType,
    pub needs_merge: bool,
    pub formats: Vec<CanonicalFormat>,
    pub best_formats: Vec<CanonicalFormat>,
}

/// One entry of the simplified `/formats?legacy=true` listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimplifiedFormat {
    pub format_id: String,
    pub format_note: String,
    pub ext: String,
    /// `"{width}x{height}"`, or `"N/A"` when either is unknown.
    pub resolution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesize: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesize_approx: Option<u64>,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimplifiedResponse {
    pub title: String,
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    pub webpage_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub formats: Vec<SimplifiedFormat>,
    pub best_format: Option<SimplifiedFormat>,
}

/// Static liveness payload for `GET /health`.
#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

// === Lenient decoding ===

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite() && *v >= 0.0).map(|v| v as u64)),
        _ => None,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_u64(deserializer)?.and_then(|v| u32::try_from(v).ok()))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_ytdlp_dump_with_loose_fields() {
        let doc = json!({
            "id": "abc",
            "title": "Clip",
            "duration": 212,
            "webpage_url": "https://www.youtube.com/watch?v=abc",
            "view_count": 10,
            "formats": [
                {
                    "format_id": 18,
                    "vcodec": "avc1.42001E",
                    "acodec": "mp4a.40.2",
                    "height": 360.0,
                    "filesize_approx": 1234.7,
                    "http_headers": null,
                    "needs_merge": true
                },
                { "format_id": "140", "vcodec": "none", "acodec": "mp4a.40.2", "height": null, "filesize": -1 }
            ]
        });

        let info: RawExtraction = serde_json::from_value(doc).unwrap();

        assert_eq!(info.meta.id.as_deref(), Some("abc"));
        assert_eq!(info.meta.duration, Some(212.0));
        assert_eq!(info.formats.len(), 2);

        let muxed = &info.formats[0];
        assert_eq!(muxed.format_id, "18");
        assert_eq!(muxed.height, Some(360));
        assert_eq!(muxed.filesize_approx, Some(1234));
        assert!(muxed.http_headers.is_empty());

        let audio = &info.formats[1];
        assert_eq!(audio.height, None);
        assert_eq!(audio.filesize, None);
        assert!(!audio.has_video());
        assert!(audio.has_audio());
    }

    #[test]
    fn missing_formats_decode_as_empty() {
        let info: RawExtraction = serde_json::from_value(json!({ "id": "x", "formats": null })).unwrap();
        assert!(info.formats.is_empty());

        let info: RawExtraction = serde_json::from_value(json!({ "id": "x" })).unwrap();
        assert!(info.formats.is_empty());
    }

    #[test]
    fn empty_and_sentinel_codecs_are_absent() {
        let format = RawFormat {
            vcodec: Some(String::new()),
            acodec: Some(NO_CODEC.to_string()),
            ..Default::default()
        };
        assert!(!format.has_video());
        assert!(!format.has_audio());
    }
}
