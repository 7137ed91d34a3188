// Unit tests for option validation

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;

use super::*;

/// Real filesystem checks with a pinned working directory
struct PinnedCwdFs {
    cwd: PathBuf,
}

#[async_trait]
impl FsPort for PinnedCwdFs {
    async fn current_dir(&self) -> std::io::Result<PathBuf> {
        Ok(self.cwd.clone())
    }

    async fn is_regular_file(&self, path: &Path) -> bool {
        std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
    }

    async fn create_dir_all(&self, _path: &Path) -> std::io::Result<()> {
        panic!("validation must not create directories");
    }
}

fn workspace() -> (TempDir, PinnedCwdFs) {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("movie.mov"), b"not really a movie").unwrap();
    let fs = PinnedCwdFs {
        cwd: dir.path().to_path_buf(),
    };
    (dir, fs)
}

#[tokio::test]
async fn test_defaults_validate_and_expand_all() {
    let (dir, fs) = workspace();
    let config = OptionValidator::validate(&EncodeOptions::for_source("movie.mov"), &fs)
        .await
        .unwrap();

    assert_eq!(config.source, dir.path().join("movie.mov"));
    assert_eq!(config.output, dir.path().join("movie-html5"));
    assert_eq!(config.formats, Format::ALL.to_vec());
    assert_eq!(config.size, FrameSize::default());
    assert_eq!(
        config.poster,
        Some(PosterSpec {
            name: "poster".to_string(),
            timestamp_secs: 0
        })
    );
    assert_eq!(config.timeout, Duration::from_secs(600));
}

#[tokio::test]
async fn test_absolute_source_is_kept() {
    let (dir, fs) = workspace();
    let absolute = dir.path().join("movie.mov");
    let opts = EncodeOptions::for_source(absolute.to_string_lossy());
    let config = OptionValidator::validate(&opts, &fs).await.unwrap();
    assert_eq!(config.source, absolute);
}

#[tokio::test]
async fn test_missing_source_rejected() {
    let (_dir, fs) = workspace();
    let err = OptionValidator::validate(&EncodeOptions::for_source("missing.mov"), &fs)
        .await
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidSource { .. }));
}

#[tokio::test]
async fn test_directory_source_rejected() {
    let (dir, fs) = workspace();
    std::fs::create_dir(dir.path().join("clips")).unwrap();
    let err = OptionValidator::validate(&EncodeOptions::for_source("clips"), &fs)
        .await
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidSource { .. }));
}

#[tokio::test]
async fn test_empty_output_rejected() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        output_template: String::new(),
        ..EncodeOptions::for_source("movie.mov")
    };
    let err = OptionValidator::validate(&opts, &fs).await.unwrap_err();
    assert_eq!(err, ValidationError::InvalidOutput);
}

#[tokio::test]
async fn test_output_template_substitution() {
    let (dir, fs) = workspace();
    let opts = EncodeOptions {
        output_template: "web/{src_name}".to_string(),
        ..EncodeOptions::for_source("movie.mov")
    };
    let config = OptionValidator::validate(&opts, &fs).await.unwrap();
    assert_eq!(config.output, dir.path().join("web").join("movie"));
}

#[tokio::test]
async fn test_bitrate_without_unit_rejected() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        video_bitrate: "700".to_string(),
        ..EncodeOptions::for_source("movie.mov")
    };
    let err = OptionValidator::validate(&opts, &fs).await.unwrap_err();
    assert!(matches!(
        err,
        ValidationError::InvalidBitrate {
            field: "videobitrate",
            ..
        }
    ));
}

#[tokio::test]
async fn test_bitrate_with_unit_accepted() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        video_bitrate: "700k".to_string(),
        audio_bitrate: "96K".to_string(),
        ..EncodeOptions::for_source("movie.mov")
    };
    assert!(OptionValidator::validate(&opts, &fs).await.is_ok());
}

#[tokio::test]
async fn test_audio_bitrate_checked_after_video() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        audio_bitrate: "128".to_string(),
        ..EncodeOptions::for_source("movie.mov")
    };
    let err = OptionValidator::validate(&opts, &fs).await.unwrap_err();
    assert!(matches!(
        err,
        ValidationError::InvalidBitrate {
            field: "audiobitrate",
            ..
        }
    ));
}

#[tokio::test]
async fn test_empty_formats_rejected() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        formats: Vec::new(),
        ..EncodeOptions::for_source("movie.mov")
    };
    let err = OptionValidator::validate(&opts, &fs).await.unwrap_err();
    assert!(matches!(err, ValidationError::InvalidFormats(_)));
}

#[tokio::test]
async fn test_single_format_accepted() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        formats: vec!["webm".to_string()],
        ..EncodeOptions::for_source("movie.mov")
    };
    let config = OptionValidator::validate(&opts, &fs).await.unwrap();
    assert_eq!(config.formats, vec![Format::Webm]);
}

#[tokio::test]
async fn test_unknown_format_rejected() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        formats: vec!["webm".to_string(), "ogv".to_string()],
        ..EncodeOptions::for_source("movie.mov")
    };
    let err = OptionValidator::validate(&opts, &fs).await.unwrap_err();
    assert!(err.to_string().contains("'ogv'"));
}

#[tokio::test]
async fn test_format_order_is_preserved() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        formats: vec!["ogg".to_string(), "h264".to_string()],
        ..EncodeOptions::for_source("movie.mov")
    };
    let config = OptionValidator::validate(&opts, &fs).await.unwrap();
    assert_eq!(config.formats, vec![Format::Ogg, Format::H264]);
}

#[tokio::test]
async fn test_non_integer_dimension_rejected() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        height: "tall".to_string(),
        ..EncodeOptions::for_source("movie.mov")
    };
    let err = OptionValidator::validate(&opts, &fs).await.unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidDimension {
            dimension: "Height",
            value: "tall".to_string()
        }
    );
}

#[tokio::test]
async fn test_dimensions_are_coerced() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        width: "640".to_string(),
        height: "0".to_string(),
        ..EncodeOptions::for_source("movie.mov")
    };
    let config = OptionValidator::validate(&opts, &fs).await.unwrap();
    assert_eq!(config.size, FrameSize::new(Some(640), None));
}

#[tokio::test]
async fn test_empty_poster_name_rejected() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        poster: Some(String::new()),
        ..EncodeOptions::for_source("movie.mov")
    };
    let err = OptionValidator::validate(&opts, &fs).await.unwrap_err();
    assert_eq!(err, ValidationError::InvalidPosterName);
}

#[tokio::test]
async fn test_poster_name_template_resolved() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        poster: Some("{src_name}-poster".to_string()),
        poster_time: "12".to_string(),
        ..EncodeOptions::for_source("movie.mov")
    };
    let config = OptionValidator::validate(&opts, &fs).await.unwrap();
    let poster = config.poster.unwrap();
    assert_eq!(poster.name, "movie-poster");
    assert_eq!(poster.timestamp_secs, 12);
}

#[tokio::test]
async fn test_bad_poster_timestamp_rejected() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        poster_time: "00:00:05".to_string(),
        ..EncodeOptions::for_source("movie.mov")
    };
    let err = OptionValidator::validate(&opts, &fs).await.unwrap_err();
    assert!(matches!(err, ValidationError::InvalidPosterTimestamp(_)));
}

#[tokio::test]
async fn test_zero_timeout_rejected() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        timeout_secs: 0,
        ..EncodeOptions::for_source("movie.mov")
    };
    let err = OptionValidator::validate(&opts, &fs).await.unwrap_err();
    assert_eq!(err, ValidationError::InvalidTimeout);
}

#[tokio::test]
async fn test_first_failure_wins() {
    let (_dir, fs) = workspace();
    let opts = EncodeOptions {
        video_bitrate: "700".to_string(),
        formats: Vec::new(),
        width: "wide".to_string(),
        ..EncodeOptions::for_source("movie.mov")
    };
    let err = OptionValidator::validate(&opts, &fs).await.unwrap_err();
    assert!(matches!(err, ValidationError::InvalidBitrate { .. }));
}
