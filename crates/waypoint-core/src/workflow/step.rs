//! The step protocol: replay-check, execute, persist.
//!
//! Every call to [`ExecutionContext::step`] takes the next sequence number,
//! derives the step key from it, and consults the checkpoint store. A
//! completed record short-circuits execution and its stored result is
//! returned instead. Otherwise the operation runs and its result is saved
//! before being handed back.
//!
//! A crash after the operation but before the save leaves no record, so the
//! resumed run executes the operation again. Steps are therefore
//! at-least-once; operations must tolerate repetition.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use waypoint_types::error::{BoxError, RepositoryError, StepError};
use waypoint_types::step::{step_key, StepRecord};

use super::context::ExecutionContext;
use crate::repository::checkpoint::CheckpointStore;

/// Hook invoked with the step key after the operation succeeds and before
/// its result is saved. Returning `Err` aborts the save.
pub type PersistHook = Arc<dyn Fn(&str) -> Result<(), RepositoryError> + Send + Sync>;

/// Fault-injection options for the persistence phase of a step.
///
/// The default runs steps with no delay and no hook.
#[derive(Clone, Default)]
pub struct StepOptions {
    /// Pause between a successful operation and the save of its result.
    /// Killing the process during the pause produces a zombie step.
    pub persist_delay: Option<Duration>,
    pub before_persist: Option<PersistHook>,
}

impl StepOptions {
    pub fn with_persist_delay(mut self, delay: Duration) -> Self {
        self.persist_delay = Some(delay);
        self
    }

    pub fn with_before_persist<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> Result<(), RepositoryError> + Send + Sync + 'static,
    {
        self.before_persist = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for StepOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepOptions")
            .field("persist_delay", &self.persist_delay)
            .field("before_persist", &self.before_persist.is_some())
            .finish()
    }
}

impl<S: CheckpointStore> ExecutionContext<S> {
    /// Run `work` as a durable step named `name`, or replay its recorded
    /// result if this step already completed in an earlier run.
    pub async fn step<T, E, F, Fut>(&self, name: &str, work: F) -> Result<T, StepError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        E: Into<BoxError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_step(name, self.options(), work).await
    }

    /// Like [`step`](Self::step), with `options` replacing the run's
    /// defaults for this one invocation.
    pub async fn step_with<T, E, F, Fut>(
        &self,
        name: &str,
        options: &StepOptions,
        work: F,
    ) -> Result<T, StepError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        E: Into<BoxError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_step(name, options, work).await
    }

    async fn run_step<T, E, F, Fut>(
        &self,
        name: &str,
        options: &StepOptions,
        work: F,
    ) -> Result<T, StepError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        E: Into<BoxError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let sequence = self.next_sequence();
        let key = step_key(name, sequence);

        let existing = self
            .load(&key)
            .await
            .map_err(|source| StepError::StorageFailure {
                step: name.to_string(),
                source,
            })?;

        if let Some(record) = existing.filter(StepRecord::is_completed) {
            let result = serde_json::from_str(&record.output).map_err(|source| {
                StepError::CorruptRecord {
                    step: name.to_string(),
                    source,
                }
            })?;
            tracing::info!(
                workflow_id = self.workflow_id(),
                step = name,
                step_key = %key,
                "step already completed, replaying recorded result"
            );
            return Ok(result);
        }

        tracing::info!(
            workflow_id = self.workflow_id(),
            step = name,
            step_key = %key,
            sequence,
            "executing step"
        );

        let result = work().await.map_err(|e| StepError::LogicFailure {
            step: name.to_string(),
            source: e.into(),
        })?;

        if let Some(delay) = options.persist_delay {
            tracing::warn!(
                workflow_id = self.workflow_id(),
                step = name,
                step_key = %key,
                delay_ms = delay.as_millis() as u64,
                "step executed but not yet saved; a crash now leaves a zombie step"
            );
            tokio::time::sleep(delay).await;
        }

        if let Some(hook) = &options.before_persist {
            hook(&key).map_err(|source| StepError::PersistFailure {
                step: name.to_string(),
                source,
            })?;
        }

        self.record(&key, &result)
            .await
            .map_err(|source| StepError::PersistFailure {
                step: name.to_string(),
                source,
            })?;

        tracing::info!(
            workflow_id = self.workflow_id(),
            step = name,
            step_key = %key,
            "step completed and saved"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::MemoryCheckpointStore;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use waypoint_types::error::StepErrorKind;
    use waypoint_types::step::StepStatus;

    fn context(store: &Arc<MemoryCheckpointStore>) -> ExecutionContext<MemoryCheckpointStore> {
        ExecutionContext::new("wf", Arc::clone(store))
    }

    /// Store whose reads always fail.
    struct BrokenReads;

    impl CheckpointStore for BrokenReads {
        async fn get(&self, _: &str, _: &str) -> Result<Option<StepRecord>, RepositoryError> {
            Err(RepositoryError::Query("disk I/O error".to_string()))
        }

        async fn save<T: Serialize + Sync>(
            &self,
            _: &str,
            _: &str,
            _: StepStatus,
            _: &T,
        ) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn list(&self, _: &str) -> Result<Vec<StepRecord>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn close(&self) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    /// Store that finds nothing and refuses every write.
    struct BrokenWrites;

    impl CheckpointStore for BrokenWrites {
        async fn get(&self, _: &str, _: &str) -> Result<Option<StepRecord>, RepositoryError> {
            Ok(None)
        }

        async fn save<T: Serialize + Sync>(
            &self,
            _: &str,
            _: &str,
            _: StepStatus,
            _: &T,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::Query("database is locked".to_string()))
        }

        async fn list(&self, _: &str) -> Result<Vec<StepRecord>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn close(&self) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    /// Result type whose encoding always fails.
    #[derive(Debug, Deserialize)]
    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<Ser: serde::Serializer>(&self, _: Ser) -> Result<Ser::Ok, Ser::Error> {
            use serde::ser::Error as _;
            Err(Ser::Error::custom("nope"))
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Employee {
        name: String,
        id: String,
        laptop: String,
    }

    #[tokio::test]
    async fn executes_and_records_new_step() {
        let store = Arc::new(MemoryCheckpointStore::new());
        let ctx = context(&store);

        let value = ctx
            .step("expensive_step", || async { Ok::<_, BoxError>(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);

        let record = store.get("wf", "expensive_step_1").await.unwrap().unwrap();
        assert_eq!(record.status, "completed");
        assert_eq!(record.output, "42");
    }

    #[tokio::test]
    async fn replays_completed_step_without_running_work() {
        let store = Arc::new(MemoryCheckpointStore::new());
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..2 {
            let ctx = context(&store);
            let value: i32 = ctx
                .step("expensive_step", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, BoxError>(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn replay_decodes_structured_results() {
        let store = Arc::new(MemoryCheckpointStore::new());
        let emp = Employee {
            name: "John Doe".to_string(),
            id: "EMP001".to_string(),
            laptop: String::new(),
        };

        let first = context(&store);
        let fresh = emp.clone();
        let created = first
            .step("create_record", move || async move { Ok::<_, BoxError>(fresh) })
            .await
            .unwrap();

        let second = context(&store);
        let replayed: Employee = second
            .step("create_record", || async {
                Err::<Employee, _>("must not run on replay")
            })
            .await
            .unwrap();

        assert_eq!(created, emp);
        assert_eq!(replayed, emp);
    }

    #[tokio::test]
    async fn same_name_in_loop_gets_distinct_keys() {
        let store = Arc::new(MemoryCheckpointStore::new());
        let ctx = context(&store);

        for i in 1..=3 {
            let value = ctx
                .step("loop_step", move || async move { Ok::<_, BoxError>(i * 10) })
                .await
                .unwrap();
            assert_eq!(value, i * 10);
        }

        let keys: Vec<String> = store
            .list("wf")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.step_key)
            .collect();
        assert_eq!(keys, vec!["loop_step_1", "loop_step_2", "loop_step_3"]);
    }

    #[tokio::test]
    async fn logic_failure_persists_nothing() {
        let store = Arc::new(MemoryCheckpointStore::new());
        let ctx = context(&store);

        let err = ctx
            .step("flaky", || async { Err::<u32, _>("upstream refused") })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), StepErrorKind::LogicFailure);
        assert_eq!(err.step(), "flaky");
        assert!(err.to_string().contains("upstream refused"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn storage_failure_skips_work() {
        let ctx = ExecutionContext::new("wf", Arc::new(BrokenReads));
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let err = ctx
            .step("lookup", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BoxError>(1)
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), StepErrorKind::StorageFailure);
        assert_eq!(err.step(), "lookup");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn corrupt_record_is_reported() {
        let store = Arc::new(MemoryCheckpointStore::new());
        store.insert_raw(StepRecord {
            workflow_id: "wf".to_string(),
            step_key: "count_1".to_string(),
            status: "completed".to_string(),
            output: "\"not a number\"".to_string(),
        });

        let ctx = context(&store);
        let err = ctx
            .step("count", || async { Ok::<u64, BoxError>(7) })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), StepErrorKind::CorruptRecord);
        assert_eq!(err.step(), "count");
    }

    #[tokio::test]
    async fn non_completed_record_is_executed_again() {
        let store = Arc::new(MemoryCheckpointStore::new());
        store.insert_raw(StepRecord {
            workflow_id: "wf".to_string(),
            step_key: "charge_1".to_string(),
            status: "running".to_string(),
            output: "null".to_string(),
        });

        let ctx = context(&store);
        let value = ctx
            .step("charge", || async { Ok::<_, BoxError>("charged".to_string()) })
            .await
            .unwrap();

        assert_eq!(value, "charged");
        let record = store.get("wf", "charge_1").await.unwrap().unwrap();
        assert!(record.is_completed());
    }

    #[tokio::test]
    async fn unencodable_result_is_a_persist_failure() {
        let store = Arc::new(MemoryCheckpointStore::new());
        let ctx = context(&store);

        let err = ctx
            .step("bad", || async { Ok::<_, BoxError>(Unencodable) })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), StepErrorKind::PersistFailure);
        assert_eq!(err.step(), "bad");
        assert!(err.to_string().contains("serialization error"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn failed_save_is_a_persist_failure_after_work_ran() {
        let ctx = ExecutionContext::new("wf", Arc::new(BrokenWrites));
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let err = ctx
            .step("charge_card", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BoxError>("charged".to_string())
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), StepErrorKind::PersistFailure);
        assert_eq!(err.step(), "charge_card");
        assert!(err.to_string().contains("database is locked"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_persist_hook_leaves_zombie_that_reruns() {
        let store = Arc::new(MemoryCheckpointStore::new());
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let crash = StepOptions::default().with_before_persist(|_| {
            Err(RepositoryError::Query("simulated crash".to_string()))
        });

        let first = context(&store);
        let err = first
            .step_with("zombie_step", &crash, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BoxError>("I am alive".to_string())
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), StepErrorKind::PersistFailure);
        assert!(store.get("wf", "zombie_step_1").await.unwrap().is_none());

        let second = context(&store);
        let value = second
            .step("zombie_step", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BoxError>("I am alive".to_string())
            })
            .await
            .unwrap();

        assert_eq!(value, "I am alive");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn persist_hook_sees_step_key() {
        let store = Arc::new(MemoryCheckpointStore::new());
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let options = StepOptions::default().with_before_persist(move |key| {
            recorder.lock().unwrap().push(key.to_string());
            Ok(())
        });

        let ctx = context(&store).with_options(options);
        ctx.step("a", || async { Ok::<_, BoxError>(1) }).await.unwrap();
        ctx.step("b", || async { Ok::<_, BoxError>(2) }).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["a_1", "b_2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn persist_delay_postpones_save() {
        let store = Arc::new(MemoryCheckpointStore::new());
        let ctx = Arc::new(context(&store));
        let options = StepOptions::default().with_persist_delay(Duration::from_secs(3));

        let task = {
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move {
                ctx.step_with("zombie_step", &options, || async {
                    Ok::<_, BoxError>("done".to_string())
                })
                .await
            })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(store.is_empty(), "result saved before the delay elapsed");

        let value = task.await.unwrap().unwrap();
        assert_eq!(value, "done");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn replay_still_consumes_sequence_numbers() {
        let store = Arc::new(MemoryCheckpointStore::new());

        let first = context(&store);
        first.step("a", || async { Ok::<_, BoxError>(1) }).await.unwrap();

        let second = context(&store);
        second.step("a", || async { Ok::<_, BoxError>(1) }).await.unwrap();
        second.step("b", || async { Ok::<_, BoxError>(2) }).await.unwrap();

        assert!(store.get("wf", "b_2").await.unwrap().is_some());
        assert_eq!(second.next_sequence(), 3);
    }

    #[test]
    fn step_options_debug_hides_hook() {
        let options = StepOptions::default().with_before_persist(|_| Ok(()));
        let rendered = format!("{options:?}");
        assert!(rendered.contains("before_persist: true"));
    }
}
