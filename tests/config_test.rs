//! Configuration loading tests

use std::io::Write;

use attainment_db::{EahConfig, Error, ScaleConfig, ScaleKind};

#[test]
fn test_from_json() {
    let config = EahConfig::from_json(
        r#"{
            "error": { "kind": "log2", "min": 0.0, "max": 8.0, "buckets": 5 },
            "evaluations": { "kind": "linear", "min": 0.0, "max": 100.0, "buckets": 10 }
        }"#,
    )
    .unwrap();
    assert_eq!(config.error, ScaleConfig::new(ScaleKind::Log2, 0.0, 8.0, 5));

    let logger = config.build().unwrap();
    assert_eq!(logger.error_range().kind(), ScaleKind::Log2);
    assert_eq!(logger.eval_range().size(), 10);
    assert!(logger.data().is_empty());
}

#[test]
fn test_json_round_trip_of_default() {
    let default = EahConfig::default();
    let json = default.to_json().unwrap();
    assert!(json.contains("\"log10\""));
    assert_eq!(EahConfig::from_json(&json).unwrap(), default);
}

#[test]
fn test_missing_field() {
    let err = EahConfig::from_json(r#"{ "error": { "min": 0.0, "max": 1.0, "buckets": 2 } }"#)
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("evaluations"));
}

#[test]
fn test_unknown_kind() {
    let err = EahConfig::from_json(
        r#"{
            "error": { "kind": "ln", "min": 0.0, "max": 1.0, "buckets": 2 },
            "evaluations": { "min": 0.0, "max": 1.0, "buckets": 2 }
        }"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_from_path() {
    let path = std::env::temp_dir().join(format!("attainment-db-config-{}.json", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(EahConfig::default().to_json().unwrap().as_bytes())
            .unwrap();
    }
    let loaded = EahConfig::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, EahConfig::default());
}

#[test]
fn test_from_missing_path() {
    let err = EahConfig::from_path("/nonexistent/attainment-db/config.json").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
