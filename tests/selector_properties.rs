//! Property tests for format selection, history retention and file names.

use mediagrab::extractor::StreamDescriptor;
use mediagrab::history::{History, HistoryKind, HistoryRecord, HISTORY_LIMIT};
use mediagrab::selector::{select, Quality, SelectionNotice, SelectionRequest};
use mediagrab::utils::error::MediagrabError;
use mediagrab::utils::format::sanitize_filename;
use proptest::prelude::*;

const HEIGHTS: [u32; 6] = [240, 360, 480, 720, 1080, 1440];

#[derive(Debug, Clone, Copy)]
enum Kind {
    Progressive,
    Adaptive,
    AudioOnly,
}

fn descriptor(
    index: usize,
    kind: Kind,
    container: &str,
    height: u32,
    fps: Option<u32>,
    bitrate: Option<u32>,
) -> StreamDescriptor {
    let (has_video, has_audio) = match kind {
        Kind::Progressive => (true, true),
        Kind::Adaptive => (true, false),
        Kind::AudioOnly => (false, true),
    };
    StreamDescriptor {
        format_id: format!("f{}", index),
        container: container.to_string(),
        height: has_video.then_some(height),
        frame_rate: if has_video { fps } else { None },
        has_video,
        has_audio,
        file_size_bytes: None,
        bitrate: if has_audio { bitrate } else { None },
    }
}

fn arb_kind() -> impl Strategy<Value = Kind> {
    prop_oneof![
        Just(Kind::Progressive),
        Just(Kind::Adaptive),
        Just(Kind::AudioOnly)
    ]
}

fn arb_entry(
    kinds: impl Strategy<Value = Kind>,
    heights: &'static [u32],
) -> impl Strategy<Value = (Kind, &'static str, u32, Option<u32>, Option<u32>)> {
    (
        kinds,
        prop::sample::select(vec!["mp4", "webm", "m4a"]),
        prop::sample::select(heights.to_vec()),
        prop::option::of(prop::sample::select(vec![24u32, 30, 60])),
        prop::option::of(32u32..320),
    )
}

fn build(entries: Vec<(Kind, &'static str, u32, Option<u32>, Option<u32>)>) -> Vec<StreamDescriptor> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, (kind, container, height, fps, bitrate))| {
            descriptor(i, kind, container, height, fps, bitrate)
        })
        .collect()
}

fn arb_catalog() -> impl Strategy<Value = Vec<StreamDescriptor>> {
    prop::collection::vec(arb_entry(arb_kind(), &HEIGHTS), 0..24).prop_map(build)
}

proptest! {
    #[test]
    fn best_progressive_returns_tallest_progressive(
        catalog in arb_catalog(),
        height in prop::sample::select(HEIGHTS.to_vec()),
    ) {
        let mut catalog = catalog;
        catalog.push(descriptor(99, Kind::Progressive, "mp4", height, None, None));

        let selection = select(&catalog, &SelectionRequest::video("mp4", Quality::Best, true)).unwrap();
        let tallest = catalog
            .iter()
            .filter(|d| d.is_progressive() && d.container == "mp4")
            .filter_map(|d| d.height)
            .max();

        prop_assert!(selection.descriptor.is_progressive());
        prop_assert_eq!(selection.descriptor.height, tallest);
        prop_assert!(selection.notice.is_none());
    }

    #[test]
    fn best_without_progressive_returns_tallest_adaptive(
        entries in prop::collection::vec(
            arb_entry(prop_oneof![Just(Kind::Adaptive), Just(Kind::AudioOnly)], &HEIGHTS),
            0..24,
        ),
        height in prop::sample::select(HEIGHTS.to_vec()),
    ) {
        let mut catalog = build(entries);
        catalog.push(descriptor(99, Kind::Adaptive, "mp4", height, None, None));

        let selection = select(&catalog, &SelectionRequest::video("mp4", Quality::Best, true)).unwrap();
        let tallest = catalog
            .iter()
            .filter(|d| d.is_adaptive_video() && d.container == "mp4")
            .filter_map(|d| d.height)
            .max();

        prop_assert_eq!(selection.descriptor.height, tallest);
        prop_assert!(!selection.has_audio);
        prop_assert!(selection.warnings().iter().any(|w| w.contains("video only")));
    }

    #[test]
    fn missing_1080_falls_back_to_720_first(
        entries in prop::collection::vec(
            arb_entry(arb_kind(), &[240, 360, 480, 720, 1440]),
            0..24,
        ),
    ) {
        let mut catalog = build(entries);
        catalog.push(descriptor(99, Kind::Progressive, "mp4", 720, None, None));

        let selection = select(&catalog, &SelectionRequest::video("mp4", Quality::P1080, true)).unwrap();

        prop_assert_eq!(selection.descriptor.height, Some(720));
        prop_assert_eq!(
            selection.notice,
            Some(SelectionNotice::TierSubstituted {
                requested: Quality::P1080,
                used: Quality::P720,
            })
        );
    }

    #[test]
    fn empty_filtered_catalog_is_no_matching_stream(
        entries in prop::collection::vec(arb_entry(arb_kind(), &HEIGHTS), 0..24),
        quality in prop::sample::select(Quality::ALL.to_vec()),
        progressive in any::<bool>(),
    ) {
        let catalog: Vec<StreamDescriptor> = build(entries)
            .into_iter()
            .filter(|d| d.container != "3gp")
            .collect();

        let result = select(&catalog, &SelectionRequest::video("3gp", quality, progressive));
        prop_assert!(matches!(result, Err(MediagrabError::NoMatchingStream)));
    }

    #[test]
    fn audio_without_preferred_container_takes_highest_bitrate(
        entries in prop::collection::vec(arb_entry(arb_kind(), &HEIGHTS), 0..24),
        bitrate in 32u32..320,
    ) {
        let mut catalog = build(entries);
        catalog.push(descriptor(99, Kind::AudioOnly, "webm", 0, None, Some(bitrate)));

        let selection = select(&catalog, &SelectionRequest::audio("mp3")).unwrap();
        let best = catalog
            .iter()
            .filter(|d| d.is_audio_only())
            .map(|d| d.bitrate)
            .max()
            .flatten();

        prop_assert!(selection.descriptor.is_audio_only());
        prop_assert_eq!(selection.descriptor.bitrate, best);
        let falls_back = matches!(selection.notice, Some(SelectionNotice::AnyContainer { .. }));
        prop_assert!(falls_back);
    }

    #[test]
    fn history_never_exceeds_limit(count in 0usize..160) {
        let mut history = History::new();
        for n in 0..count {
            history.push(HistoryRecord::new(HistoryKind::Audio, format!("t{}", n), "f.m4a"));
        }

        prop_assert_eq!(history.len(), count.min(HISTORY_LIMIT));
        if count > 0 {
            let newest = format!("t{}", count - 1);
            prop_assert_eq!(&history.records().next().unwrap().title, &newest);
        }
        if count > HISTORY_LIMIT {
            let evicted = format!("t{}", count - HISTORY_LIMIT - 1);
            prop_assert!(history.records().all(|r| r.title != evicted));
        }
    }

    #[test]
    fn sanitized_names_have_no_reserved_characters(title in ".*") {
        let name = sanitize_filename(&title);
        prop_assert!(!name.is_empty());
        prop_assert!(!name.chars().any(|c| "<>:\"/\\|?*".contains(c)));
    }
}
