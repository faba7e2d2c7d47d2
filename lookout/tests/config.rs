use clap::{CommandFactory, FromArgMatches};
use lookout::config::HEADLESS_POLL_INTERVAL;
use lookout::{CaptureSource, Category, Cli, Config, ConfigError, FileNaming};
use std::path::PathBuf;
use std::time::Duration;

/// Parse `args` as given, ignoring any `LOOKOUT_*` variables in the environment.
fn parse(args: &[&str]) -> Result<Config, ConfigError> {
    let mut argv = vec!["lookout"];
    argv.extend_from_slice(args);
    let matches = Cli::command()
        .mut_args(|arg| arg.env(None::<&'static str>))
        .try_get_matches_from(argv)
        .unwrap();
    Cli::from_arg_matches(&matches).unwrap().into_config()
}

#[test]
fn defaults_match_documented_values() {
    let config = parse(&[]).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.source, CaptureSource::Camera(0));
    assert_eq!(config.resolution(), (640, 480));
    assert_eq!(config.threshold, 25);
    assert_eq!(config.min_area, 5000);
    assert_eq!(config.cooldown(Category::Motion), Duration::from_secs(2));
    assert_eq!(config.cooldown(Category::Face), Duration::from_secs(2));
    assert_eq!(config.naming, FileNaming::Time);
    assert!(!config.headless);
}

#[test]
fn replay_flags_select_replay_source() {
    let config = parse(&[
        "--replay",
        "frames/*.png",
        "--replay-interval-ms",
        "40",
        "--replay-loop",
        "--headless",
        "--long-names",
    ])
    .unwrap();
    assert_eq!(
        config.source,
        CaptureSource::Replay {
            pattern: "frames/*.png".into(),
            interval: Duration::from_millis(40),
            looping: true,
        }
    );
    assert!(config.headless);
    assert_eq!(config.naming, FileNaming::DateTime);
}

#[test]
fn tuning_flags_are_applied() {
    let config = parse(&[
        "--camera",
        "2",
        "--width",
        "320",
        "--height",
        "240",
        "--motion-cooldown",
        "0.5",
        "--face-cooldown",
        "10",
        "--min-neighbors",
        "3",
        "--motion-dir",
        "out/m",
    ])
    .unwrap();
    assert_eq!(config.source, CaptureSource::Camera(2));
    assert_eq!(config.resolution(), (320, 240));
    assert_eq!(config.motion_cooldown, Duration::from_millis(500));
    assert_eq!(config.face_cooldown, Duration::from_secs(10));
    assert_eq!(config.face_params.min_neighbors, 3);
    assert_eq!(config.motion_dir, PathBuf::from("out/m"));
}

#[test]
fn rejects_invalid_values() {
    assert_eq!(
        parse(&["--learning-rate", "0"]),
        Err(ConfigError::LearningRate(0.0))
    );
    assert_eq!(
        parse(&["--learning-rate", "1.5"]),
        Err(ConfigError::LearningRate(1.5))
    );
    assert_eq!(parse(&["--width", "0"]), Err(ConfigError::Resolution(0, 480)));
    assert_eq!(parse(&["--min-area", "0"]), Err(ConfigError::MinArea));
    assert_eq!(
        parse(&["--scale-factor", "1.0"]),
        Err(ConfigError::ScaleFactor(1.0))
    );
    assert_eq!(
        parse(&["--motion-cooldown=-1"]),
        Err(ConfigError::Cooldown("motion"))
    );
}

#[test]
fn zero_cooldown_is_allowed() {
    let config = parse(&["--face-cooldown", "0"]).unwrap();
    assert_eq!(config.face_cooldown, Duration::ZERO);
}

#[test]
fn poll_interval_depends_on_mode() {
    assert_eq!(parse(&[]).unwrap().poll_interval, Duration::ZERO);
    assert_eq!(
        parse(&["--headless"]).unwrap().poll_interval,
        HEADLESS_POLL_INTERVAL
    );
    assert_eq!(
        parse(&["--headless", "--poll-interval-ms", "5"]).unwrap().poll_interval,
        Duration::from_millis(5)
    );
    assert_eq!(
        parse(&["--poll-interval-ms", "250"]).unwrap().poll_interval,
        Duration::from_millis(250)
    );
}

#[test]
fn font_is_optional() {
    assert_eq!(parse(&[]).unwrap().font, None);
    assert_eq!(
        parse(&["--font", "fonts/mono.ttf"]).unwrap().font,
        Some(PathBuf::from("fonts/mono.ttf"))
    );
}
