#[allow(dead_code)]
#[path = "../src/bin/snapshot.rs"]
mod snapshot;

use clap::Parser;
use kaleidoscope::config::Quality;
use kaleidoscope::palette::Palette;
use std::path::PathBuf;

#[test]
fn parse_args_defaults_are_stable() {
    let args = snapshot::Cli::try_parse_from(["snapshot"]).expect("parse should succeed");

    assert_eq!(args.out, PathBuf::from("kaleidoscope.png"));
    assert_eq!(args.width, 1080);
    assert_eq!(args.height, 1080);
    assert_eq!(args.palette, Palette::Dawn);
    assert_eq!(args.symmetry, 6);
    assert_eq!(args.taps, 0);
    assert_eq!(args.quality, Quality::High);
    assert!((args.warmup - 2.0).abs() < 1e-6);
    snapshot::validate_args(&args).expect("defaults are valid");
}

#[test]
fn parse_args_overrides_work() {
    let args = snapshot::Cli::try_parse_from([
        "snapshot",
        "--out",
        "shots/a.png",
        "--width",
        "640",
        "--height",
        "360",
        "--palette",
        "nebula",
        "--symmetry",
        "10",
        "--seed",
        "5",
        "--warmup",
        "0.5",
        "--taps",
        "3",
        "--quality",
        "fast",
        "--wall-time",
        "12.5",
    ])
    .expect("parse should succeed");

    assert_eq!(args.out, PathBuf::from("shots/a.png"));
    assert_eq!((args.width, args.height), (640, 360));
    assert_eq!(args.palette, Palette::Nebula);
    assert_eq!(args.symmetry, 10);
    assert_eq!(args.seed, 5);
    assert_eq!(args.taps, 3);
    assert_eq!(args.quality, Quality::Fast);
    assert!((args.wall_time - 12.5).abs() < 1e-6);
}

#[test]
fn validate_rejects_bad_geometry_and_folds() {
    for (flag, value) in [
        ("--width", "0"),
        ("--height", "0"),
        ("--width", "8193"),
        ("--height", "1080000"),
        ("--symmetry", "2"),
        ("--symmetry", "13"),
    ] {
        let args = snapshot::Cli::try_parse_from(["snapshot", flag, value]).expect("parse should succeed");
        let err = snapshot::validate_args(&args).expect_err("must fail validation");
        assert!(err.to_string().contains(flag), "{err} should mention {flag}");
    }
}

#[test]
fn largest_allowed_edge_is_accepted() {
    let args = snapshot::Cli::try_parse_from(["snapshot", "--width", "8192", "--height", "8192"])
        .expect("parse should succeed");
    snapshot::validate_args(&args).expect("8192 is within range");
}

#[test]
fn warmup_frames_round_to_sixty_hz() {
    assert_eq!(snapshot::compute_warmup_frames(0.0), 0);
    assert_eq!(snapshot::compute_warmup_frames(1.0), 60);
    assert_eq!(snapshot::compute_warmup_frames(0.51), 31);
    assert_eq!(snapshot::compute_warmup_frames(-3.0), 0);
}

#[test]
fn warm_up_spreads_taps_and_is_repeatable() {
    let args = snapshot::Cli::try_parse_from(["snapshot", "--warmup", "0.5", "--taps", "4"])
        .expect("parse should succeed");
    let a = snapshot::warm_up(&args);
    let b = snapshot::warm_up(&args);
    assert_eq!(a.ripple_count(), 4);
    assert_eq!(a.seed_elements(), b.seed_elements());
    assert_eq!(a.animation_phase(), b.animation_phase());
}
