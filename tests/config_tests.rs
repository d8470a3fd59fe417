//! Tests for the type-safe configuration builder and config file loading

use std::time::Duration;

use kodegen_tools_linkrot::LinkCheckConfig;
use tempfile::TempDir;

mod common;

#[test]
fn test_builder_optional_fields_have_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = LinkCheckConfig::builder()
        .root_dir(temp_dir.path())
        .build()
        .unwrap();

    assert_eq!(config.root_dir(), temp_dir.path().canonicalize().unwrap());
    assert_eq!(config.report_dir(), config.root_dir().join(".linkrot"));
    assert_eq!(config.concurrency(), 30);
    assert_eq!(config.probe_timeout(), Duration::from_millis(8_000));
    assert_eq!(config.max_redirects(), 5);
    assert_eq!(config.archive_delay(), Duration::from_millis(800));
    assert_eq!(config.archive_retry_policy().max_attempts, 3);
    assert_eq!(config.archive_timestamp(), None);
    assert!(config.enable_heuristics());
    assert!(!config.resolve_all_dead());
    assert!(!config.annotate_unresolved());
    assert!(!config.dry_run());
    assert!(config.extensions().iter().any(|e| e == "md"));
    assert!(config.ignored_dirs().iter().any(|d| d == "node_modules"));
    assert!(!config.heuristic_rules().is_empty());
}

#[test]
fn test_builder_with_all_optional_fields() {
    let temp_dir = TempDir::new().unwrap();
    let reports = temp_dir.path().join("out");
    let config = LinkCheckConfig::builder()
        .root_dir(temp_dir.path())
        .report_dir(&reports)
        .extensions([".RST", "txt"])
        .ignored_dirs(["vendor"])
        .skip_patterns(Vec::<String>::new())
        .concurrency(4)
        .probe_timeout_ms(1_000)
        .max_redirects(2)
        .checkpoint_interval(10)
        .archive_delay_ms(0)
        .archive_retry(5, 100)
        .archive_timestamp(Some("2021".into()))
        .enable_heuristics(false)
        .resolve_all_dead(true)
        .annotate_unresolved(true)
        .dry_run(true)
        .build()
        .unwrap();

    assert_eq!(config.extensions(), ["rst".to_string(), "txt".to_string()]);
    assert_eq!(config.ignored_dirs(), ["vendor".to_string()]);
    assert!(config.skip_patterns().is_empty());
    assert_eq!(config.concurrency(), 4);
    assert_eq!(config.max_redirects(), 2);
    assert_eq!(config.archive_retry_policy().max_attempts, 5);
    assert_eq!(config.archive_retry_policy().base_delay, Duration::from_millis(100));
    assert_eq!(config.archive_timestamp(), Some("2021"));
    assert!(!config.enable_heuristics());
    assert!(config.resolve_all_dead());
    assert!(config.annotate_unresolved());
    assert!(config.dry_run());
    assert_eq!(
        config.liveness_report_path(),
        reports.join("link-check-results.json")
    );
}

#[test]
fn test_invalid_values_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let base = || LinkCheckConfig::builder().root_dir(temp_dir.path());

    assert!(base().probe_timeout_ms(0).build().is_err());
    assert!(base().archive_retry(0, 100).build().is_err());
    assert!(base().checkpoint_interval(0).build().is_err());
    assert!(base().extensions(Vec::<String>::new()).build().is_err());
    assert!(base().archive_endpoint("not a url").build().is_err());
    assert!(base().archive_timestamp(Some(String::new())).build().is_err());
}

#[test]
fn test_from_json_file_resolves_relative_root() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir(temp_dir.path().join("site")).unwrap();
    let config_path = temp_dir.path().join("linkrot.json");
    std::fs::write(
        &config_path,
        r#"{
            "root_dir": "site",
            "concurrency": 8,
            "skip_patterns": ["example.invalid"],
            "heuristic_rules": [
                { "hostContains": "old.example", "hosts": ["new.example"], "scheme": "https" }
            ]
        }"#,
    )
    .unwrap();

    let config = LinkCheckConfig::from_json_file(&config_path).unwrap();

    assert_eq!(
        config.root_dir(),
        temp_dir.path().join("site").canonicalize().unwrap()
    );
    assert_eq!(config.concurrency(), 8);
    assert_eq!(config.skip_patterns(), ["example.invalid".to_string()]);
    assert_eq!(config.heuristic_rules().len(), 1);
    // Unset fields keep their defaults
    assert_eq!(config.max_redirects(), 5);
}

#[test]
fn test_from_json_file_reports_parse_errors() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("broken.json");
    std::fs::write(&config_path, "{ concurrency: ").unwrap();

    let err = LinkCheckConfig::from_json_file(&config_path).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse config file"));
}

#[test]
fn test_cli_overrides_survive_into_builder() {
    let temp_dir = TempDir::new().unwrap();
    let config = LinkCheckConfig::builder()
        .root_dir(temp_dir.path())
        .concurrency(3)
        .build()
        .unwrap();

    let overridden = config.into_builder().dry_run(true).build().unwrap();
    assert_eq!(overridden.concurrency(), 3);
    assert!(overridden.dry_run());
}
