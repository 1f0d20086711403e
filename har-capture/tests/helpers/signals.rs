//! Sample streams and settings for tests

use har_capture::capture::RawSample;
use har_capture::Settings;
use har_common::config::TomlConfig;
use std::path::Path;
use std::time::Duration;

/// Settings at `sample_rate` Hz over `window_secs` s, other fields default
pub fn settings(sample_rate: f64, window_secs: f64) -> Settings {
    let config = TomlConfig {
        sample_rate,
        window_duration: window_secs,
        ..TomlConfig::default()
    };
    Settings::from_toml(&config).unwrap()
}

/// Like `settings`, writing the dataset into `dir`
pub fn settings_with_output(
    sample_rate: f64,
    window_secs: f64,
    dir: &Path,
    persist_skipped: bool,
) -> Settings {
    let config = TomlConfig {
        sample_rate,
        window_duration: window_secs,
        output_dir: Some(dir.to_path_buf()),
        persist_skipped,
        ..TomlConfig::default()
    };
    Settings::from_toml(&config).unwrap()
}

/// `count` strictly increasing times spread over `[0, span)` with
/// deterministic jitter of up to ±30% of the nominal spacing
pub fn jittered_times(count: usize, span: Duration) -> Vec<Duration> {
    let step = span.as_secs_f64() / count as f64;
    (0..count)
        .map(|i| {
            // Fixed pseudo-random pattern in [-0.3, 0.3]
            let jitter = (((i * 7919) % 13) as f64 / 12.0 - 0.5) * 0.6;
            let t = (i as f64 + 0.5 + jitter * 0.5) * step;
            Duration::from_secs_f64(t.max(0.0))
        })
        .collect()
}

/// Sample whose axes encode `t`: ax = t, ay = 2t, az = 1, gx = -t, gy = 0, gz = 0.5
pub fn tick_sample(t: Duration) -> RawSample {
    let s = t.as_secs_f64();
    RawSample::new(t, [s, 2.0 * s, 1.0, -s, 0.0, 0.5])
}
