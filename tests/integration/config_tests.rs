//! Configuration loading integration tests

#[cfg(test)]
mod tests {
    use mesh_resilience::utils::logging::LogFormat;
    use mesh_resilience::{
        AdaptiveBackoff, ContextAwareRetry, DependencyHealthGraph, MeshError, RetryContext,
        ResilienceConfig,
    };
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
graph:
  cascade_delay_ms: 5
  initial_recovery_interval_ms: 20
  max_retry_interval_secs: 2

backoff:
  initial_delay_secs: 0.25
  max_delay_secs: 4.0
  jitter: 0.0

retry:
  max_attempts: 2
  base_delay_ms: 50
  jitter_factor: 0.0
  method_limits:
    DELETE: 0

logging:
  level: warn
  format: json
"#;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_loaded_config_drives_components() {
        let file = write_config(CONFIG);
        let config = ResilienceConfig::from_file(file.path()).await.unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);

        let engine = AdaptiveBackoff::new(config.backoff.clone());
        assert_eq!(engine.get_delay("k", None), Duration::from_millis(250));

        let retry = ContextAwareRetry::new(config.retry.clone());
        let delete = RetryContext::new("TimedOut", "").with_method("DELETE");
        assert!(!retry.should_retry(&delete).0);
        let get = RetryContext::new("TimedOut", "");
        assert_eq!(retry.should_retry(&get), (true, Duration::from_millis(50)));

        let graph = DependencyHealthGraph::new(config.graph.clone());
        assert_eq!(graph.config().cascade_delay(), Duration::from_millis(5));
        graph.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalid_config_file_is_rejected() {
        let file = write_config("retry:\n  max_attempts: 0\n");
        let err = ResilienceConfig::from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, MeshError::Validation(_)));
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_yaml_is_rejected() {
        let file = write_config("graph: {cascade_delay_ms: [}");
        let err = ResilienceConfig::from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, MeshError::Yaml(_)));
    }
}
