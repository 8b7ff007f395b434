use moteflow::config::*;
use moteflow::feed::{FeedMode, FeedVariant};

#[test]
fn test_defaults_match_reference_constants() {
    let config = MoteflowConfig::default();
    assert_eq!(config.socket.name, "SOCK1");
    assert_eq!(config.socket.port, DEFAULT_SOCKET_PORT);
    assert_eq!(config.feed.variant, FeedVariant::One);
    assert_eq!(config.feed.mode, FeedMode::Alternating);
    assert_eq!(config.feed.seed, None);
    assert_eq!(config.gateway.low_threshold, 10);
    assert_eq!(config.gateway.high_threshold, 25);
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_json_yields_defaults() {
    let config = MoteflowConfig::from_json_str("{}").unwrap();
    assert_eq!(config, MoteflowConfig::default());
}

#[test]
fn test_partial_override() {
    let json = r#"{"feed":{"variant":"Two","mode":"RandomSample","seed":7},"socket":{"port":9}}"#;
    let config = MoteflowConfig::from_json_str(json).unwrap();

    assert_eq!(config.feed.variant, FeedVariant::Two);
    assert_eq!(config.feed.mode, FeedMode::RandomSample);
    assert_eq!(config.feed.seed, Some(7));
    assert_eq!(config.feed.tick_ms, DEFAULT_TICK_MS);
    assert_eq!(config.socket.port, 9);
    assert_eq!(config.socket.name, "SOCK1");
}

#[test]
fn test_invalid_socket_name_rejected() {
    let result = MoteflowConfig::from_json_str(r#"{"socket":{"name":""}}"#);
    assert!(matches!(result, Err(ConfigError::InvalidName(_))));
}

#[test]
fn test_inverted_thresholds_rejected() {
    let result =
        MoteflowConfig::from_json_str(r#"{"gateway":{"low_threshold":30,"high_threshold":20}}"#);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidThresholds { low: 30, high: 20 })
    ));
}

#[test]
fn test_malformed_json_rejected() {
    assert!(matches!(
        MoteflowConfig::from_json_str("{not json"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_missing_file_rejected() {
    assert!(matches!(
        MoteflowConfig::from_path("/nonexistent/moteflow.json"),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn test_zero_tick_period_rejected() {
    let result = MoteflowConfig::from_json_str(r#"{"feed":{"tick_ms":0}}"#);
    assert!(matches!(result, Err(ConfigError::InvalidTickPeriod)));

    let config = MoteflowConfig::from_json_str(r#"{"feed":{"tick_ms":1}}"#).unwrap();
    assert_eq!(config.feed.tick_ms, 1);
}

#[test]
fn test_tick_budget() {
    let unbounded = MoteflowConfig::default();
    assert_eq!(unbounded.feed.max_ticks, None);
    assert!(!unbounded.feed.tick_budget_spent(u64::MAX));

    let config = MoteflowConfig::from_json_str(r#"{"feed":{"max_ticks":3}}"#).unwrap();
    assert_eq!(config.feed.max_ticks, Some(3));
    assert!(!config.feed.tick_budget_spent(0));
    assert!(!config.feed.tick_budget_spent(2));
    assert!(config.feed.tick_budget_spent(3));
    assert!(config.feed.tick_budget_spent(4));
}
