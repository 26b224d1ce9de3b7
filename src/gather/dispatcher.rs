//! Category Dispatcher
//!
//! Runs the read-only command for each requested category, one after the
//! other, and assembles the [`InfoReport`]. The first failure aborts the run.

use crate::domain::category::GatherSubset;
use crate::domain::ports::ReadQuery;
use crate::error::{Error, Result};
use crate::gather::report::InfoReport;
use tracing::{debug, error, info};

/// Gathers information from one storage system
pub struct InfoGatherer<Q: ReadQuery> {
    client: Q,
}

impl<Q: ReadQuery> InfoGatherer<Q> {
    /// Create a gatherer that owns the given client session
    pub fn new(client: Q) -> Self {
        Self { client }
    }

    pub fn cluster_name(&self) -> &str {
        self.client.cluster_name()
    }

    /// Query every category in `subset` and collect the results.
    ///
    /// Categories outside the subset are left empty in the report. No partial
    /// report is returned on failure.
    pub async fn gather(&self, subset: &GatherSubset) -> Result<InfoReport> {
        let cluster = self.client.cluster_name();
        let mut report = InfoReport::new();

        if subset.is_all() {
            info!("Gathering all {} categories from {}", subset.len(), cluster);
        } else {
            debug!(
                "Gathering {} categories from {}: {:?}",
                subset.len(),
                cluster,
                subset.categories()
            );
        }

        for &category in subset.categories() {
            match self.client.execute_read_command(category.command()).await {
                Ok(records) => {
                    info!(
                        category = %category,
                        count = records.len(),
                        "Successfully listed {} {} from {}",
                        records.len(),
                        category.description(),
                        cluster
                    );
                    report.set(category, records);
                }
                Err(e) => {
                    error!(
                        category = %category,
                        "Get {} from {} failed with error: {}",
                        category.description(),
                        cluster,
                        e
                    );
                    return Err(Error::GatherFailed {
                        category: category.to_string(),
                        cluster: cluster.to_string(),
                        source: Box::new(e),
                    });
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::Category;
    use crate::domain::ports::Record;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// In-memory storage system answering each command with canned records
    struct FakeSystem {
        responses: BTreeMap<&'static str, Vec<Record>>,
        fail_on: Option<&'static str>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl FakeSystem {
        fn new() -> Self {
            let responses = Category::ALL
                .iter()
                .enumerate()
                .map(|(idx, category)| {
                    let records = (0..=idx)
                        .map(|n| {
                            let mut record = Record::new();
                            record.insert("id".into(), json!(n.to_string()));
                            record.insert("source".into(), json!(category.command()));
                            record
                        })
                        .collect();
                    (category.command(), records)
                })
                .collect();

            Self {
                responses,
                fail_on: None,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing_on(mut self, command: &'static str) -> Self {
            self.fail_on = Some(command);
            self
        }

        /// Handle on the commands executed so far
        fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
            Arc::clone(&self.calls)
        }
    }

    #[async_trait]
    impl ReadQuery for FakeSystem {
        async fn execute_read_command(&self, command: &str) -> Result<Vec<Record>> {
            self.calls.lock().unwrap().push(command.to_string());
            if self.fail_on == Some(command) {
                return Err(Error::CommandFailed {
                    command: command.to_string(),
                    status: 500,
                    body: "CMMVC5700E The parameter list is not valid.".into(),
                });
            }
            Ok(self.responses.get(command).cloned().unwrap_or_default())
        }

        fn cluster_name(&self) -> &str {
            "svc1.example.com"
        }
    }

    #[tokio::test]
    async fn test_all_matches_explicit_list() {
        let explicit = GatherSubset::parse(Category::ALL.iter().map(|c| c.tag())).unwrap();

        let from_all = InfoGatherer::new(FakeSystem::new())
            .gather(&GatherSubset::parse(["all"]).unwrap())
            .await
            .unwrap();
        let from_empty = InfoGatherer::new(FakeSystem::new())
            .gather(&GatherSubset::parse(Vec::<&str>::new()).unwrap())
            .await
            .unwrap();
        let from_explicit = InfoGatherer::new(FakeSystem::new())
            .gather(&explicit)
            .await
            .unwrap();

        assert_eq!(from_all, from_explicit);
        assert_eq!(from_empty, from_explicit);
        for category in Category::ALL {
            assert!(!from_all.get(category).is_empty(), "{} empty", category);
        }
    }

    #[tokio::test]
    async fn test_commands_run_in_fixed_order() {
        let system = FakeSystem::new();
        let calls = system.call_log();
        InfoGatherer::new(system)
            .gather(&GatherSubset::all())
            .await
            .unwrap();

        let expected: Vec<String> = Category::ALL
            .iter()
            .map(|c| c.command().to_string())
            .collect();
        assert_eq!(*calls.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_single_category() {
        let system = FakeSystem::new();
        let calls = system.call_log();
        let report = InfoGatherer::new(system)
            .gather(&GatherSubset::parse(["pool"]).unwrap())
            .await
            .unwrap();

        assert_eq!(report.get(Category::Pool).len(), 2);
        assert_eq!(report.get(Category::Pool)[0]["source"], "lsmdiskgrp");
        for category in Category::ALL.iter().filter(|c| **c != Category::Pool) {
            assert!(report.get(*category).is_empty());
        }
        assert_eq!(*calls.lock().unwrap(), vec!["lsmdiskgrp".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_aborts_and_names_category() {
        for category in Category::ALL {
            let system = FakeSystem::new().failing_on(category.command());
            let calls = system.call_log();
            let err = InfoGatherer::new(system)
                .gather(&GatherSubset::all())
                .await
                .unwrap_err();

            assert_eq!(err.failed_category(), Some(category.tag()));
            assert!(err.to_string().contains("svc1.example.com"));
            assert_matches!(
                err,
                Error::GatherFailed { ref source, .. }
                    if matches!(**source, Error::CommandFailed { status: 500, .. })
            );

            // nothing after the failing command is queried
            let calls = calls.lock().unwrap().clone();
            assert_eq!(calls.last().map(String::as_str), Some(category.command()));
            let position = Category::ALL.iter().position(|c| *c == category).unwrap();
            assert_eq!(calls.len(), position + 1);
        }
    }

    /// Writer collecting formatted log output for inspection
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_subscriber(logs: &CapturedLogs) -> impl tracing::Subscriber + Send + Sync {
        let writer = logs.clone();
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish()
    }

    #[tokio::test]
    async fn test_logs_record_count_per_category() {
        let logs = CapturedLogs::default();
        let _guard = tracing::subscriber::set_default(capture_subscriber(&logs));

        InfoGatherer::new(FakeSystem::new())
            .gather(&GatherSubset::parse(["pool", "node"]).unwrap())
            .await
            .unwrap();

        let listed: Vec<String> = logs
            .lines()
            .into_iter()
            .filter(|line| line.contains("Successfully listed"))
            .collect();
        assert_eq!(listed.len(), 2, "{:?}", listed);
        assert!(listed[0].contains("INFO"));
        assert!(listed[0].contains("Successfully listed 2 pools from svc1.example.com"));
        assert!(listed[1].contains("Successfully listed 3 nodes from svc1.example.com"));
    }

    #[tokio::test]
    async fn test_logs_error_before_aborting() {
        let logs = CapturedLogs::default();
        let _guard = tracing::subscriber::set_default(capture_subscriber(&logs));

        let err = InfoGatherer::new(FakeSystem::new().failing_on("lsmdiskgrp"))
            .gather(&GatherSubset::parse(["pool", "node"]).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.failed_category(), Some("pool"));

        let lines = logs.lines();
        let errors: Vec<&String> = lines.iter().filter(|line| line.contains("ERROR")).collect();
        assert_eq!(errors.len(), 1, "{:?}", lines);
        assert!(errors[0].contains("pools"));
        assert!(errors[0].contains("category=pool"));
        assert!(errors[0].contains("svc1.example.com"));
        assert!(!lines.iter().any(|line| line.contains("Successfully listed")));
    }
}
