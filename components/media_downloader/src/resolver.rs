// components/media_downloader/src/resolver.rs
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use url::Url;

use crate::types::{
    DownloadError, ResolveError, SourceStream, StreamCatalogue, StreamHandle, StreamKind,
};
use crate::utils::default_filename;

/// Turns a media page URL into the list of streams it offers.
#[async_trait]
pub trait StreamResolver {
    /// Check if the resolver is available and has all required dependencies
    async fn check_available(&self) -> Result<(), DownloadError>;

    async fn resolve(&self, url: &Url) -> Result<StreamCatalogue, ResolveError>;
}

pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait]
impl StreamResolver for YtDlp {
    async fn check_available(&self) -> Result<(), DownloadError> {
        which::which(&self.binary)
            .map(|_| ())
            .map_err(|_| DownloadError::DependencyNotFound("yt-dlp"))
    }

    async fn resolve(&self, url: &Url) -> Result<StreamCatalogue, ResolveError> {
        let output = Command::new(&self.binary)
            .arg("--dump-json")
            .arg("--no-download")
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg(url.as_str())
            .output()
            .await?;

        if !output.status.success() {
            return Err(classify_failure(&String::from_utf8_lossy(&output.stderr)));
        }

        parse_catalogue(&output.stdout)
    }
}

/// Map yt-dlp's stderr onto a resolution failure class.
fn classify_failure(stderr: &str) -> ResolveError {
    let message = stderr
        .lines()
        .find(|line| line.starts_with("ERROR:"))
        .unwrap_or(stderr)
        .trim()
        .to_string();
    let lower = message.to_lowercase();

    if lower.contains("is not a valid url") || lower.contains("unsupported url") {
        ResolveError::InvalidUrl(message)
    } else if lower.contains("unable to download webpage")
        || lower.contains("timed out")
        || lower.contains("name resolution")
        || lower.contains("connection refused")
        || lower.contains("network is unreachable")
    {
        ResolveError::Unreachable(message)
    } else {
        ResolveError::Unavailable(message)
    }
}

#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    title: String,
    #[serde(default)]
    formats: Vec<YtDlpFormat>,
}

#[derive(Debug, Deserialize)]
struct YtDlpFormat {
    format_id: String,
    ext: Option<String>,
    url: Option<String>,
    protocol: Option<String>,
    height: Option<u32>,
    abr: Option<f64>,
    tbr: Option<f64>,
    vcodec: Option<String>,
    acodec: Option<String>,
}

fn has_codec(codec: &Option<String>) -> bool {
    codec.as_deref().map(|c| c != "none").unwrap_or(false)
}

impl YtDlpFormat {
    fn into_stream(self, title: &str) -> Option<SourceStream> {
        // Segmented formats (HLS, DASH) cannot be fetched with one GET
        if !matches!(self.protocol.as_deref(), None | Some("http") | Some("https")) {
            return None;
        }
        let subtype = self.ext?.to_ascii_lowercase();
        let url = Url::parse(self.url.as_deref()?).ok()?;

        let has_video = has_codec(&self.vcodec);
        let has_audio = has_codec(&self.acodec);

        let (kind, quality) = match (has_video, has_audio) {
            (true, _) => (StreamKind::Video, self.height?),
            (false, true) => {
                let kbps = self.abr.or(self.tbr).unwrap_or(0.0);
                (StreamKind::Audio, kbps.round() as u32)
            }
            (false, false) => return None,
        };

        Some(SourceStream {
            kind,
            progressive: has_video && has_audio,
            quality,
            default_filename: default_filename(title, &subtype),
            subtype,
            handle: StreamHandle {
                format_id: self.format_id,
                url,
            },
        })
    }
}

/// Build a catalogue from yt-dlp's `--dump-json` output, keeping source order.
pub fn parse_catalogue(json: &[u8]) -> Result<StreamCatalogue, ResolveError> {
    let info: YtDlpInfo =
        serde_json::from_slice(json).map_err(|e| ResolveError::Malformed(e.to_string()))?;

    let title = info.title;
    let streams = info
        .formats
        .into_iter()
        .filter_map(|format| {
            let id = format.format_id.clone();
            let stream = format.into_stream(&title);
            if stream.is_none() {
                tracing::debug!("Skipping format {}", id);
            }
            stream
        })
        .collect();

    Ok(StreamCatalogue { title, streams })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const DUMP: &str = r#"{
        "title": "Test Song",
        "formats": [
            {"format_id": "249", "ext": "webm",
             "url": "https://media.example.com/249", "protocol": "https",
             "abr": 50.4, "vcodec": "none", "acodec": "opus"},
            {"format_id": "251", "ext": "webm",
             "url": "https://media.example.com/251", "protocol": "https",
             "abr": 160.0, "vcodec": "none", "acodec": "opus"},
            {"format_id": "137", "ext": "mp4",
             "url": "https://media.example.com/137", "protocol": "https",
             "height": 1080, "vcodec": "avc1.640028", "acodec": "none"},
            {"format_id": "18", "ext": "mp4",
             "url": "https://media.example.com/18", "protocol": "https",
             "height": 360, "vcodec": "avc1.42001E", "acodec": "mp4a.40.2"},
            {"format_id": "hls-720", "ext": "mp4", "url": "https://media.example.com/720.m3u8",
             "protocol": "m3u8_native", "height": 720, "vcodec": "avc1", "acodec": "mp4a.40.2"},
            {"format_id": "sb0", "ext": "mhtml",
             "url": "https://media.example.com/sb0", "protocol": "mhtml",
             "vcodec": "none", "acodec": "none"}
        ]
    }"#;

    #[test]
    fn test_parse_catalogue() {
        let catalogue = parse_catalogue(DUMP.as_bytes()).unwrap();

        assert_eq!(catalogue.title, "Test Song");
        let ids: Vec<_> = catalogue
            .streams
            .iter()
            .map(|s| s.handle.format_id.as_str())
            .collect();
        assert_eq!(ids, ["249", "251", "137", "18"]);

        let audio = &catalogue.streams[1];
        assert_eq!(audio.kind, StreamKind::Audio);
        assert_eq!(audio.quality, 160);
        assert_eq!(audio.subtype, "webm");
        assert_eq!(audio.default_filename, "Test Song.webm");

        let video_only = &catalogue.streams[2];
        assert_eq!(video_only.kind, StreamKind::Video);
        assert!(!video_only.progressive);

        let progressive = &catalogue.streams[3];
        assert!(progressive.progressive);
        assert_eq!(progressive.quality, 360);
    }

    #[test]
    fn test_parse_catalogue_without_formats() {
        let catalogue = parse_catalogue(br#"{"title": "Nothing here"}"#).unwrap();
        assert!(catalogue.is_empty());
    }

    #[test]
    fn test_parse_catalogue_rejects_garbage() {
        assert_matches!(
            parse_catalogue(b"<html>"),
            Err(ResolveError::Malformed(_))
        );
    }

    #[test]
    fn test_classify_failure() {
        assert_matches!(
            classify_failure("ERROR: 'foo' is not a valid URL."),
            ResolveError::InvalidUrl(_)
        );
        assert_matches!(
            classify_failure(
                "WARNING: retrying\nERROR: Unable to download webpage: <urlopen error>"
            ),
            ResolveError::Unreachable(msg) if msg.starts_with("ERROR: Unable")
        );
        assert_matches!(
            classify_failure("ERROR: [youtube] abc: Private video"),
            ResolveError::Unavailable(_)
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_reported() {
        let ytdlp = YtDlp::new("definitely-not-yt-dlp-binary");
        assert_matches!(
            ytdlp.check_available().await,
            Err(DownloadError::DependencyNotFound("yt-dlp"))
        );
    }
}
