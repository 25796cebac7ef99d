use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;

use crate::config::{PipelineConfig, PipelineOptions, QueueConfig, WorkerConfig};
use crate::engine::{run, Orchestrator, PipelineReport, PipelineStatus};
use crate::errors::{ConfigurationError, PipelineError};
use crate::queue::Payload;
use crate::workers::builtin::register_builtins;
use crate::workers::stub::{register_stubs, ConsumerRecord, IdleWorker, Journal};
use crate::workers::WorkerRegistry;

/// End-to-end tests running real pipelines of built-in and recording workers
#[cfg(test)]
mod tests {
    use super::*;

    const DEADLINE: Duration = Duration::from_secs(5);

    fn registry(journal: &Journal) -> WorkerRegistry {
        let mut registry = WorkerRegistry::new();
        register_builtins(&mut registry);
        register_stubs(&mut registry, journal);
        registry
    }

    fn pipeline(queues: &[&str], workers: Vec<WorkerConfig>) -> PipelineConfig {
        PipelineConfig {
            options: PipelineOptions {
                poll_interval_ms: 10,
                report_progress: true,
            },
            queues: queues.iter().map(|q| QueueConfig::new(*q)).collect(),
            workers,
        }
    }

    fn emit(name: &str, values: Vec<i64>) -> WorkerConfig {
        WorkerConfig::new(name, "builtin", "Emit").with_value("values", values)
    }

    fn records_of(journal: &Journal, worker_name: &str) -> Vec<ConsumerRecord> {
        let mut records: Vec<ConsumerRecord> = journal
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.worker_name == worker_name)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.instance_index);
        records
    }

    async fn run_to_completion(orchestrator: &mut Orchestrator) -> PipelineReport {
        orchestrator.start().unwrap();
        tokio::time::timeout(DEADLINE, orchestrator.join())
            .await
            .expect("pipeline did not terminate")
            .unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_two_consumers() {
        let journal = Journal::default();
        let config = pipeline(
            &["q1"],
            vec![
                emit("A", vec![1, 2, 3]).with_outputs(["q1"]),
                WorkerConfig::new("B", "test", "Recorder").with_input("q1").with_instances(2),
            ],
        );
        let mut orchestrator = Orchestrator::from_config(&config, &registry(&journal)).unwrap();

        let report = run_to_completion(&mut orchestrator).await;

        let records = records_of(&journal, "B");
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.sentinels == 1));

        let received: BTreeSet<i64> = records
            .iter()
            .flat_map(|r| r.values.iter())
            .filter_map(Payload::as_i64)
            .collect();
        assert_eq!(received, BTreeSet::from([1, 2, 3]));
        assert_eq!(records.iter().map(|r| r.values.len()).sum::<usize>(), 3);

        assert_eq!(report.sentinels_sent_to("q1"), 2);
        assert!(orchestrator.queues().get("q1").unwrap().is_empty());
        assert_eq!(orchestrator.status(), PipelineStatus::Terminated);
        assert_eq!(report.failed_instances(), 0);
    }

    #[tokio::test]
    async fn test_chain_preserves_order() {
        let journal = Journal::default();
        let config = pipeline(
            &["q1", "q2"],
            vec![
                emit("A", (1..=20).collect()).with_outputs(["q1"]),
                WorkerConfig::new("B", "test", "Recorder")
                    .with_input("q1")
                    .with_outputs(["q2"]),
                WorkerConfig::new("C", "test", "Recorder").with_input("q2"),
            ],
        );
        let mut orchestrator = Orchestrator::from_config(&config, &registry(&journal)).unwrap();

        let report = run_to_completion(&mut orchestrator).await;

        let expected: Vec<Payload> = (1..=20).map(|i| json!(i)).collect();
        let c = records_of(&journal, "C");
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].values, expected);
        assert_eq!(c[0].sentinels, 1);
        assert_eq!(records_of(&journal, "B")[0].values, expected);

        assert_eq!(report.sentinels_sent_to("q1"), 1);
        assert_eq!(report.sentinels_sent_to("q2"), 1);
        assert_eq!(
            report.workers.iter().map(|w| w.worker_name.as_str()).collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
    }

    #[tokio::test]
    async fn test_cascade_fires_once_per_worker_not_per_instance() {
        let journal = Journal::default();
        let config = pipeline(
            &["q1"],
            vec![
                emit("A", vec![7, 8]).with_outputs(["q1"]).with_instances(3),
                WorkerConfig::new("B", "test", "Recorder").with_input("q1").with_instances(2),
            ],
        );
        let mut orchestrator = Orchestrator::from_config(&config, &registry(&journal)).unwrap();

        let report = run_to_completion(&mut orchestrator).await;

        assert_eq!(report.sentinels_sent_to("q1"), 2);
        assert_eq!(report.worker("A").unwrap().instances, 3);

        let records = records_of(&journal, "B");
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.sentinels == 1));
        assert_eq!(records.iter().map(|r| r.values.len()).sum::<usize>(), 6);
        assert!(orchestrator.queues().get("q1").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_queue_without_consumers_gets_no_sentinels() {
        let journal = Journal::default();
        let config = pipeline(&["unread"], vec![emit("A", vec![1, 2, 3]).with_outputs(["unread"])]);
        let mut orchestrator = Orchestrator::from_config(&config, &registry(&journal)).unwrap();

        let report = run_to_completion(&mut orchestrator).await;

        assert_eq!(report.sentinels_sent_to("unread"), 0);
        assert_eq!(orchestrator.queues().get("unread").unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_and_panicked_producers_still_cascade() {
        let journal = Journal::default();
        let config = pipeline(
            &["q1", "q2"],
            vec![
                WorkerConfig::new("F", "test", "Failing").with_outputs(["q1"]),
                WorkerConfig::new("P", "test", "Panicking").with_outputs(["q2"]).with_instances(2),
                WorkerConfig::new("B", "test", "Recorder").with_input("q1"),
                WorkerConfig::new("C", "test", "Recorder").with_input("q2"),
            ],
        );
        let mut orchestrator = Orchestrator::from_config(&config, &registry(&journal)).unwrap();

        let report = run_to_completion(&mut orchestrator).await;

        assert_eq!(report.worker("F").unwrap().failed_instances, 1);
        assert_eq!(report.worker("P").unwrap().failed_instances, 2);
        assert_eq!(report.worker("B").unwrap().failed_instances, 0);
        assert_eq!(report.failed_instances(), 3);

        for consumer in ["B", "C"] {
            let records = records_of(&journal, consumer);
            assert_eq!(records.len(), 1, "consumer {}", consumer);
            assert!(records[0].values.is_empty());
            assert_eq!(records[0].sentinels, 1);
        }
    }

    #[tokio::test]
    async fn test_relay_and_sink_builtins() {
        let journal = Journal::default();
        let config = pipeline(
            &["raw", "relayed", "tapped"],
            vec![
                emit("source", vec![1, 2, 3, 4]).with_outputs(["raw"]),
                WorkerConfig::new("relay", "builtin", "Relay")
                    .with_input("raw")
                    .with_outputs(["relayed", "tapped"])
                    .with_instances(2),
                WorkerConfig::new("sink", "builtin", "Sink").with_input("relayed").with_instances(3),
                WorkerConfig::new("tap", "test", "Recorder").with_input("tapped"),
            ],
        );

        let report = tokio::time::timeout(DEADLINE, run(&config, &registry(&journal)))
            .await
            .expect("pipeline did not terminate")
            .unwrap();

        assert_eq!(report.sentinels_sent_to("raw"), 2);
        assert_eq!(report.sentinels_sent_to("relayed"), 3);
        assert_eq!(report.sentinels_sent_to("tapped"), 1);

        let tapped: BTreeSet<i64> = records_of(&journal, "tap")[0]
            .values
            .iter()
            .filter_map(Payload::as_i64)
            .collect();
        assert_eq!(tapped, BTreeSet::from([1, 2, 3, 4]));
    }

    #[tokio::test]
    async fn test_missing_queue_starts_nothing() {
        let constructed = Arc::new(AtomicUsize::new(0));
        let mut registry = registry(&Journal::default());
        let counter = constructed.clone();
        registry.register("test.Counted", move |ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(IdleWorker::new(ctx))
        });

        let config = pipeline(
            &["q1"],
            vec![
                WorkerConfig::new("ok", "test", "Counted").with_outputs(["q1"]),
                WorkerConfig::new("A", "test", "Counted").with_outputs(["q_missing"]),
            ],
        );

        let result = run(&config, &registry).await;

        match result {
            Err(PipelineError::Configuration(ConfigurationError::UnknownQueue(queue))) => {
                assert_eq!(queue, "q_missing")
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(constructed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_worker_type_fails_build() {
        let config = pipeline(&[], vec![WorkerConfig::new("A", "workers.SleepWorker", "SleepyWorker")]);

        let err = Orchestrator::from_config(&config, &registry(&Journal::default())).unwrap_err();

        assert_eq!(
            err,
            ConfigurationError::UnknownWorkerType("workers.SleepWorker.SleepyWorker".into())
        );
    }

    #[tokio::test]
    async fn test_late_consumer_still_sees_data_before_sentinel() {
        let journal = Journal::default();
        let config = pipeline(
            &["q1"],
            vec![
                emit("A", vec![1, 2, 3])
                    .with_value("interval_ms", 15)
                    .with_outputs(["q1"]),
                WorkerConfig::new("B", "test", "Recorder").with_input("q1"),
            ],
        );
        let mut orchestrator = Orchestrator::from_config(&config, &registry(&journal)).unwrap();

        let report = run_to_completion(&mut orchestrator).await;

        assert_eq!(records_of(&journal, "B")[0].values, vec![json!(1), json!(2), json!(3)]);
        assert_eq!(report.sentinels_sent_to("q1"), 1);
    }

    #[tokio::test]
    async fn test_terminates_within_one_interval_of_last_exit() {
        const POLL: Duration = Duration::from_millis(400);
        const LAST_EXIT: Duration = Duration::from_millis(450);
        const SLACK: Duration = Duration::from_millis(200);

        let mut config = pipeline(
            &[],
            vec![emit("A", vec![1]).with_value("interval_ms", LAST_EXIT.as_millis() as u64)],
        );
        config.options.poll_interval_ms = POLL.as_millis() as u64;
        let mut orchestrator = Orchestrator::from_config(&config, &registry(&Journal::default())).unwrap();
        let mut transitions = orchestrator.transitions();

        let started = Instant::now();
        run_to_completion(&mut orchestrator).await;
        let elapsed = started.elapsed();

        assert!(elapsed >= LAST_EXIT, "terminated before the worker exited: {:?}", elapsed);
        assert!(
            elapsed < LAST_EXIT + POLL + SLACK,
            "terminated more than one interval after the last exit: {:?}",
            elapsed
        );

        let mut observed = Vec::new();
        while let Ok(status) = transitions.try_recv() {
            observed.push(status);
        }
        assert_eq!(
            observed,
            vec![PipelineStatus::Running, PipelineStatus::Draining, PipelineStatus::Terminated]
        );
    }

    #[tokio::test]
    async fn test_many_consumers_each_get_one_sentinel() {
        let journal = Journal::default();
        let config = pipeline(
            &["q1"],
            vec![
                emit("A", (0..500).collect()).with_outputs(["q1"]).with_instances(4),
                WorkerConfig::new("B", "test", "Recorder").with_input("q1").with_instances(7),
            ],
        );
        let mut orchestrator = Orchestrator::from_config(&config, &registry(&journal)).unwrap();

        let report = run_to_completion(&mut orchestrator).await;

        assert_eq!(report.sentinels_sent_to("q1"), 7);
        let records = records_of(&journal, "B");
        assert_eq!(records.len(), 7);
        assert!(records.iter().all(|r| r.sentinels == 1));
        assert_eq!(records.iter().map(|r| r.values.len()).sum::<usize>(), 2000);
        assert!(orchestrator.queues().get("q1").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_progress_reporting_can_be_disabled() {
        let journal = Journal::default();
        let mut config = pipeline(
            &["q1"],
            vec![
                emit("A", vec![1]).with_outputs(["q1"]),
                WorkerConfig::new("B", "test", "Recorder").with_input("q1"),
            ],
        );
        config.options.report_progress = false;

        let report = tokio::time::timeout(DEADLINE, run(&config, &registry(&journal)))
            .await
            .expect("pipeline did not terminate")
            .unwrap();

        assert_eq!(report.workers.len(), 2);
        assert_eq!(records_of(&journal, "B")[0].values, vec![json!(1)]);
    }
}
