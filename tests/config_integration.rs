//! Loading and saving pipeline config files

mod common;

use common::builders::ConfigBuilder;
use reduction_pipeline::config::{LogFormat, PipelineConfig, ENV_PROCESSES};
use reduction_pipeline::{Pipeline, ReductionError, Totals};
use std::io::Write;

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("pipeline.toml");

    let config = ConfigBuilder::new()
        .processes(6)
        .sequence_len(5)
        .log_format(LogFormat::Compact)
        .build();
    config.save(&path).unwrap();

    let loaded = PipelineConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_hand_written_file_and_run() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[topology]
process_count = 3

[sequence]
length = 6
"#
    )
    .unwrap();

    let config = PipelineConfig::load(file.path()).unwrap();
    assert_eq!(config.topology.process_count, 3);
    assert_eq!(config.transport.channel_capacity, 0);

    let report = Pipeline::from_config(&config)
        .unwrap()
        .run(common::reporters::QuietReporter)
        .unwrap();
    assert_eq!(report.totals, Totals::closed_form(6));
}

#[test]
fn test_load_reports_parse_errors() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[topology]\nprocess_count = \"four\"").unwrap();

    let err = PipelineConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ReductionError::Config(_)));
    assert!(err.to_string().contains("Failed to parse"));
}

#[test]
fn test_load_or_default_on_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::load_or_default(dir.path().join("absent.toml"));
    assert_eq!(config, PipelineConfig::default());
}

#[test]
fn test_load_or_default_on_unparsable_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[topology]\nprocess_count = \"four\"").unwrap();

    let config = PipelineConfig::load_or_default(file.path());
    assert_eq!(config, PipelineConfig::default());
}

#[test]
fn test_save_into_unwritable_location_reports_io() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();

    let err = PipelineConfig::default()
        .save(blocker.join("pipeline.toml"))
        .unwrap_err();
    assert!(err.to_string().starts_with("Failed to"));
    assert!(matches!(err, ReductionError::WithContext { .. }));
}

#[test]
fn test_overrides_then_validate() {
    let mut config = PipelineConfig::default();
    config
        .apply_overrides_from(|k| (k == ENV_PROCESSES).then(|| "1".to_string()))
        .unwrap();
    assert!(config.validate().is_err());
}
