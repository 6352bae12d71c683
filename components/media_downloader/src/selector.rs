// components/media_downloader/src/selector.rs
use std::cmp::Reverse;

use crate::types::{DownloadError, RequestMode, SourceStream, StreamCatalogue};

/// Pick the highest quality stream usable for `mode`.
///
/// Equal quality resolves to whichever stream the catalogue listed first.
pub fn select_best(
    catalogue: &StreamCatalogue,
    mode: RequestMode,
) -> Result<&SourceStream, DownloadError> {
    catalogue
        .of_kind(mode.kind())
        .filter(|stream| stream.matches(mode))
        // min_by_key keeps the first of several equal elements
        .min_by_key(|stream| Reverse(stream.quality))
        .ok_or(DownloadError::NoStreamAvailable(mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::test_stream as stream;
    use crate::types::StreamKind;
    use assert_matches::assert_matches;
    use rstest::rstest;

    fn catalogue(streams: Vec<SourceStream>) -> StreamCatalogue {
        StreamCatalogue {
            title: "Test Song".to_string(),
            streams,
        }
    }

    fn mixed() -> StreamCatalogue {
        catalogue(vec![
            stream("18", StreamKind::Video, true, 360, "mp4"),
            stream("137", StreamKind::Video, false, 1080, "mp4"),
            stream("22", StreamKind::Video, true, 720, "mp4"),
            stream("140", StreamKind::Audio, false, 128, "m4a"),
            stream("251", StreamKind::Audio, false, 160, "webm"),
            stream("249", StreamKind::Audio, false, 50, "webm"),
        ])
    }

    #[rstest]
    #[case::video(RequestMode::ProgressiveVideo, "22")]
    #[case::audio(RequestMode::AdaptiveAudio, "251")]
    fn test_selects_highest_quality(#[case] mode: RequestMode, #[case] expected: &str) {
        let catalogue = mixed();
        let best = select_best(&catalogue, mode).unwrap();
        assert_eq!(best.handle.format_id, expected);
    }

    #[test]
    fn test_video_only_streams_are_never_selected() {
        let catalogue = catalogue(vec![
            stream("137", StreamKind::Video, false, 1080, "mp4"),
            stream("18", StreamKind::Video, true, 360, "mp4"),
        ]);
        let best = select_best(&catalogue, RequestMode::ProgressiveVideo).unwrap();
        assert_eq!(best.handle.format_id, "18");
    }

    #[test]
    fn test_ties_resolve_to_first_listed() {
        let catalogue = catalogue(vec![
            stream("a", StreamKind::Audio, false, 128, "webm"),
            stream("b", StreamKind::Audio, false, 160, "m4a"),
            stream("c", StreamKind::Audio, false, 160, "webm"),
        ]);
        let best = select_best(&catalogue, RequestMode::AdaptiveAudio).unwrap();
        assert_eq!(best.handle.format_id, "b");
    }

    #[rstest]
    #[case::empty(vec![], RequestMode::ProgressiveVideo)]
    #[case::only_audio(
        vec![stream("251", StreamKind::Audio, false, 160, "webm")],
        RequestMode::ProgressiveVideo
    )]
    #[case::only_video(
        vec![stream("22", StreamKind::Video, true, 720, "mp4")],
        RequestMode::AdaptiveAudio
    )]
    fn test_no_matching_stream(#[case] streams: Vec<SourceStream>, #[case] mode: RequestMode) {
        let catalogue = catalogue(streams);
        assert_matches!(
            select_best(&catalogue, mode),
            Err(DownloadError::NoStreamAvailable(m)) if m == mode
        );
    }
}
