//! Shared state of background jobs.
//!
//! - `JobsState`: cloneable handle injected as `web::Data`. Holds the status
//!   map, the sender workers report through, and one cancellation flag per
//!   running job.
//! - `JobUpdate`: a status change sent by a worker.
//! - `start_job_updater`: the single task that applies updates to the map.

use common::jobs::JobStatus;
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

#[derive(Clone)]
pub struct JobsState {
    /// Job id to current status. Only `start_job_updater` and job
    /// registration write here.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,
    /// Workers push `JobUpdate`s here instead of locking `jobs` themselves.
    pub tx: mpsc::Sender<JobUpdate>,
    cancel_flags: Arc<RwLock<HashMap<String, Arc<AtomicBool>>>>,
}

#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

/// Outcome of a cancellation request.
#[derive(Debug, PartialEq)]
pub enum CancelOutcome {
    Requested,
    AlreadyFinished,
    Unknown,
}

impl JobsState {
    /// Creates the state and spawns its updater on the current runtime.
    pub fn start() -> Self {
        let (tx, rx) = mpsc::channel(100);
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
            cancel_flags: Arc::new(RwLock::new(HashMap::new())),
        };
        tokio::spawn(start_job_updater(state.clone(), rx));
        state
    }

    /// Registers a new job as `Pending` and hands back its cancellation flag.
    pub async fn register(&self, job_id: &str) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(false));
        self.jobs
            .write()
            .await
            .insert(job_id.to_string(), JobStatus::Pending);
        self.cancel_flags
            .write()
            .await
            .insert(job_id.to_string(), flag.clone());
        flag
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Raises the job's cancellation flag; the worker stops at its next check.
    pub async fn cancel(&self, job_id: &str) -> CancelOutcome {
        match self.status(job_id).await {
            None => CancelOutcome::Unknown,
            Some(status) if status.is_finished() => CancelOutcome::AlreadyFinished,
            Some(_) => match self.cancel_flags.read().await.get(job_id) {
                Some(flag) => {
                    flag.store(true, Ordering::SeqCst);
                    CancelOutcome::Requested
                }
                None => CancelOutcome::AlreadyFinished,
            },
        }
    }
}

/// Applies updates until every sender is dropped. A finished job keeps its
/// final status; late progress updates for it are ignored.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let finished = update.status.is_finished();
        {
            let mut jobs = state.jobs.write().await;
            if jobs.get(&update.job_id).is_some_and(JobStatus::is_finished) {
                debug!("ignoring update for finished job {}", update.job_id);
                continue;
            }
            jobs.insert(update.job_id.clone(), update.status);
        }
        if finished {
            state.cancel_flags.write().await.remove(&update.job_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn settle(state: &JobsState, job_id: &str, expected: &JobStatus) {
        for _ in 0..100 {
            if state.status(job_id).await.as_ref() == Some(expected) {
                return;
            }
            actix_web::rt::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("job {} never reached {:?}", job_id, expected);
    }

    #[actix_web::test]
    async fn cancellation_raises_the_flag_until_the_job_finishes() {
        let state = JobsState::start();
        let flag = state.register("job-1").await;
        assert_eq!(state.status("job-1").await, Some(JobStatus::Pending));

        assert_eq!(state.cancel("job-1").await, CancelOutcome::Requested);
        assert!(flag.load(Ordering::SeqCst));

        state
            .tx
            .send(JobUpdate {
                job_id: "job-1".into(),
                status: JobStatus::Cancelled,
            })
            .await
            .unwrap();
        settle(&state, "job-1", &JobStatus::Cancelled).await;

        assert_eq!(state.cancel("job-1").await, CancelOutcome::AlreadyFinished);
        assert_eq!(state.cancel("nope").await, CancelOutcome::Unknown);
    }

    #[actix_web::test]
    async fn finished_status_is_final() {
        let state = JobsState::start();
        state.register("job-2").await;
        for status in [
            JobStatus::InProgress(50),
            JobStatus::Completed("job-2.csv".into()),
            JobStatus::InProgress(90),
        ] {
            state
                .tx
                .send(JobUpdate {
                    job_id: "job-2".into(),
                    status,
                })
                .await
                .unwrap();
        }
        settle(&state, "job-2", &JobStatus::Completed("job-2.csv".into())).await;
        actix_web::rt::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(
            state.status("job-2").await,
            Some(JobStatus::Completed("job-2.csv".into()))
        );
    }
}
