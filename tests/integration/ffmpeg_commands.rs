// Command layouts per mode and properties of the scaling rule

use crate::common::helpers::*;
use ffshrink::engine::{
    AccelBackend, EncodeMode, EncodingPolicy, build_ffmpeg_cmd, target_dimensions,
};
use insta::assert_snapshot;
use proptest::prelude::*;
use std::path::Path;

fn build(mode: EncodeMode, policy: &EncodingPolicy) -> String {
    cmd_to_string(&build_ffmpeg_cmd(
        mode,
        Path::new("/tmp/input.mp4"),
        Path::new("/tmp/output.mkv"),
        policy,
        false,
    ))
}

#[test]
fn snapshot_remux() {
    assert_snapshot!(
        build(EncodeMode::Remux, &EncodingPolicy::default()),
        @"ffmpeg -hide_banner -loglevel error -stats -i /tmp/input.mp4 -map 0 -map_metadata 0 -map_chapters 0 -c:v copy -c:a aac -b:a 160k -ac 2 -c:s copy -c:t copy -max_muxing_queue_size 4096 -threads 0 -n /tmp/output.mkv"
    );
}

#[test]
fn snapshot_hardware_encode() {
    assert_snapshot!(
        build(EncodeMode::Hardware(AccelBackend::Vaapi), &EncodingPolicy::default()),
        @r"ffmpeg -hide_banner -loglevel error -stats -hwaccel vaapi -i /tmp/input.mp4 -map 0 -map_metadata 0 -map_chapters 0 -c:v libx264 -profile:v baseline -level:v 3.0 -pix_fmt yuv420p -vf scale=trunc(iw*min(854/iw\,480/ih)/2)*2:trunc(ih*min(854/iw\,480/ih)/2)*2,setsar=1 -preset medium -crf 18 -tune animation -c:a aac -b:a 160k -ac 2 -c:s copy -c:t copy -max_muxing_queue_size 4096 -threads 0 -n /tmp/output.mkv"
    );
}

#[test]
fn software_encode_without_attachments_or_tune() {
    let policy = EncodingPolicy {
        copy_attachments: false,
        tune_animation: false,
        ..EncodingPolicy::default()
    };
    let cmd = build(EncodeMode::Software, &policy);

    assert!(!cmd.contains("-hwaccel"));
    assert!(!cmd.contains("-c:t"));
    assert!(!cmd.contains("-tune"));
    assert!(cmd.contains("-crf 18 -c:a aac"));
}

#[test]
fn every_mode_shares_stream_mapping_and_audio() {
    let policy = EncodingPolicy::default();
    for mode in [
        EncodeMode::Remux,
        EncodeMode::Software,
        EncodeMode::Hardware(AccelBackend::Qsv),
    ] {
        let cmd = build(mode, &policy);
        assert!(cmd.contains("-map 0 -map_metadata 0 -map_chapters 0"), "{}", cmd);
        assert!(cmd.contains("-c:a aac -b:a 160k -ac 2 -c:s copy"), "{}", cmd);
        assert!(cmd.contains("-max_muxing_queue_size 4096"), "{}", cmd);
        assert!(cmd.ends_with("-n /tmp/output.mkv"), "{}", cmd);
    }
}

proptest! {
    #[test]
    fn scaled_dimensions_are_even_bounded_and_aspect_preserving(
        iw in 16u32..=7680,
        ih in 16u32..=4320,
    ) {
        // Keep aspect ratios within 4:1 either way so neither side collapses
        prop_assume!(iw <= ih * 4 && ih <= iw * 4);

        let (w, h) = target_dimensions(iw, ih, 854, 480);

        prop_assert_eq!(w % 2, 0);
        prop_assert_eq!(h % 2, 0);
        prop_assert!(w <= 854 && h <= 480);
        // The limiting side lands exactly on the bound
        prop_assert!(w == 854 || h == 480);

        // Each side is at most 2 px below iw*scale / ih*scale, so the cross
        // product drifts by less than 2 * max(iw, ih)
        let drift = (w as i64 * ih as i64 - h as i64 * iw as i64).abs();
        prop_assert!(drift < 2 * iw.max(ih) as i64, "drift {} for {}x{} -> {}x{}", drift, iw, ih, w, h);
    }
}
