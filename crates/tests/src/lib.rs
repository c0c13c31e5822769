//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置文件 -> DispatchRegistry -> 文件 sink 的端到端测试
//! - mock HTTP 服务上的并发 fetch 测试

#[cfg(test)]
mod contract_tests {
    use contracts::{ConfigVersion, DispatchSpec, Severity};

    #[test]
    fn test_contracts_defaults() {
        let spec = DispatchSpec::new();
        assert_eq!(spec.version, ConfigVersion::V1);
        assert_eq!(Severity::default(), Severity::NotSet);
    }
}

#[cfg(test)]
mod dispatch_e2e_tests {
    use std::path::Path;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{DispatchSpec, FormatterSpec, Severity};
    use dispatcher::{DispatchRegistry, MemorySink};

    fn spec_with_log_file(log_path: &Path) -> DispatchSpec {
        let mut spec = ConfigLoader::demo().unwrap();
        spec.sinks
            .get_mut("file")
            .unwrap()
            .destination = Some(log_path.display().to_string());
        spec
    }

    /// End-to-end: built-in config -> registry -> file on disk
    ///
    /// `app.member.xx` 匹配 `app.member`，同时交给 root：
    /// console 一行、文件一行。
    #[test]
    fn test_demo_scenario_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("logging.log");
        let spec = spec_with_log_file(&log_path);

        let mut registry = DispatchRegistry::configure(&spec).unwrap();
        let console = MemorySink::new("console");
        registry.replace_sink("console", Box::new(console.clone()));

        let logger = registry.get_logger("app.member.xx");
        assert_eq!(logger.matched_name(), "app.member");
        assert_eq!(registry.warning(&logger, "member").unwrap(), 2);
        registry.flush().unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" - app.member.xx - WARNING - member"), "got: {}", lines[0]);
        assert_eq!(console.lines().len(), 1);
        assert_eq!(console.lines()[0], lines[0]);
    }

    #[test]
    fn test_error_logger_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("logging.log");
        let mut registry = DispatchRegistry::configure(&spec_with_log_file(&log_path)).unwrap();
        let console = MemorySink::new("console");
        registry.replace_sink("console", Box::new(console.clone()));

        let logger = registry.get_logger("error.sub");
        registry.emit(&logger, Severity::Warning, "warn only").unwrap();
        assert!(console.is_empty());

        registry.emit(&logger, Severity::Error, "real error").unwrap();
        assert_eq!(console.len(), 1);
        registry.flush().unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    /// Configure twice from one spec, emit the same sequence through both
    /// registries, and compare what each sink received.
    #[test]
    fn test_configure_is_idempotent() {
        let mut spec = ConfigLoader::demo().unwrap();
        spec.formatters
            .insert("simple".to_string(), FormatterSpec::new("{name}|{levelname}|{message}"));

        let mut captured = Vec::new();
        for _ in 0..2 {
            let mut registry = DispatchRegistry::configure(&spec).unwrap();
            let console = MemorySink::new("console");
            let file = MemorySink::new("file");
            registry.replace_sink("console", Box::new(console.clone()));
            registry.replace_sink("file", Box::new(file.clone()));

            for name in ["", "app", "app.member", "app.member.xx", "app.members", "error.sub", "x.y.z"] {
                let logger = registry.get_logger(name);
                for severity in [Severity::Debug, Severity::Warning, Severity::Error] {
                    registry.emit(&logger, severity, format!("{name}:{severity}")).unwrap();
                }
            }
            captured.push((console.lines(), file.lines()));
        }

        let (first_console, first_file) = &captured[0];
        let (second_console, second_file) = &captured[1];
        assert!(!first_console.is_empty());
        assert!(!first_file.is_empty());
        assert_eq!(first_console, second_console);
        assert_eq!(first_file, second_file);
        assert!(first_console.contains(&"app.member.xx|DEBUG|app.member.xx:DEBUG".to_string()));
        assert!(!first_console.contains(&"error.sub|WARNING|error.sub:WARNING".to_string()));
    }

    #[test]
    fn test_json_dict_style_config() {
        let json = r#"{
            "version": 1,
            "formatters": { "bare": { "format": "%(levelname)s:%(message)s" } },
            "handlers": {
                "mem": { "kind": "console", "destination": "ext://sys.stdout", "formatter": "bare" }
            },
            "loggers": { "svc": { "handlers": ["mem"], "level": "INFO", "propagate": false } },
            "root": { "handlers": [], "level": "WARNING" }
        }"#;

        let spec = ConfigLoader::load_from_str(json, ConfigFormat::Json).unwrap();
        let mut registry = DispatchRegistry::configure(&spec).unwrap();
        let mem = MemorySink::new("mem");
        registry.replace_sink("mem", Box::new(mem.clone()));

        let svc = registry.get_logger("svc.api");
        registry.debug(&svc, "dropped").unwrap();
        registry.info(&svc, "kept").unwrap();
        assert_eq!(mem.lines(), vec!["INFO:kept".to_string()]);
    }

    #[test]
    fn test_file_sink_appends_across_registries() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("logging.log");
        let spec = spec_with_log_file(&log_path);

        for message in ["first run", "second run"] {
            let mut registry = DispatchRegistry::configure(&spec).unwrap();
            registry.replace_sink("console", Box::new(MemorySink::new("console")));
            let root = registry.get_logger("main");
            registry.info(&root, message).unwrap();
        }

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("first run"));
        assert!(content.contains("second run"));
    }
}

#[cfg(test)]
mod fetch_e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{BatchConfig, TaskState};
    use fetch_runner::{measure_async, FetchRunner, HttpFetcher};
    use observability::FetchMetricsAggregator;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// End-to-end: 49 concurrent GETs against a slow endpoint
    #[tokio::test]
    async fn test_batch_against_slow_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(150)))
            .expect(49)
            .mount(&server)
            .await;

        let fetcher = Arc::new(HttpFetcher::new().unwrap());
        let runner = FetchRunner::new(fetcher, BatchConfig::new(49, format!("{}/", server.uri())));

        let mut handled = 0;
        let (tasks, elapsed) = measure_async(runner.run(|_| {
            handled += 1;
            Ok(())
        }))
        .await;

        assert_eq!(handled, 49);
        assert!(elapsed < Duration::from_millis(150 * 49 / 4), "took {elapsed:?}");

        let summary = FetchMetricsAggregator::from_tasks(&tasks).summary(elapsed);
        assert_eq!(summary.completed, 49);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.status_counts.get(&200), Some(&49));
    }

    #[tokio::test]
    async fn test_mixed_statuses_all_complete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let runner = FetchRunner::new(
            Arc::new(HttpFetcher::new().unwrap()),
            BatchConfig::new(4, server.uri()),
        );
        let tasks = runner.run(fetch_runner::report_status).await;

        assert!(tasks.iter().all(|t| t.state == TaskState::Completed(503)));
    }
}
