//! Bounded work queue and drain detection.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

use crate::error::{Error, Result};
use crate::store::metadata_key;
use crate::types::{Action, ClassifiedItem, Event, ItemOutcome, RunReport, WorkDescriptor};

use super::Ingester;
use super::task::run_item_task;

type TaskResult = std::result::Result<(WorkDescriptor, ItemOutcome), JoinError>;

impl Ingester {
    /// Classify every descriptor and run the non-skipped ones on the worker pool
    ///
    /// Descriptors are classified in order; each one that needs work is
    /// submitted as soon as a worker slot is free, so at most
    /// `download.max_concurrent` items are in flight at any time. Returns once
    /// every submitted item has completed. An empty submission returns
    /// immediately.
    ///
    /// # Errors
    ///
    /// Classification failures (store unreachable, stat errors) and task
    /// panics abort the run; in-flight tasks are cancelled first. Per-item
    /// failures are recorded in the report instead.
    pub async fn process(&self, descriptors: Vec<WorkDescriptor>) -> Result<RunReport> {
        let concurrent_limit = Arc::new(Semaphore::new(self.config.download.max_concurrent));
        let mut tasks: JoinSet<(WorkDescriptor, ItemOutcome)> = JoinSet::new();
        let mut report = RunReport {
            discovered: descriptors.len(),
            ..RunReport::default()
        };

        for descriptor in descriptors {
            let action = match self.classify(&descriptor).await {
                Ok(action) => action,
                Err(e) => {
                    tracing::error!(
                        name = %descriptor.name,
                        error = %e,
                        "Classification failed, aborting run"
                    );
                    tasks.shutdown().await;
                    return Err(e);
                }
            };

            report.record_action(action);
            self.emit_event(Event::Classified {
                name: descriptor.name.clone(),
                action,
            });

            if action == Action::Skip {
                continue;
            }

            // Blocks while every worker slot is busy
            let permit = match Arc::clone(&concurrent_limit).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tasks.shutdown().await;
                    return Err(Error::Task("worker pool closed".to_string()));
                }
            };

            let ctx = self.task_context(ClassifiedItem { descriptor, action });
            tasks.spawn(async move {
                let _permit = permit;
                let descriptor = ctx.item.descriptor.clone();
                let outcome = run_item_task(ctx).await;
                (descriptor, outcome)
            });

            while let Some(finished) = tasks.try_join_next() {
                if let Err(e) = self.settle(finished, &mut report) {
                    tasks.shutdown().await;
                    return Err(e);
                }
            }
        }

        if report.submitted == 0 {
            tracing::info!(
                discovered = report.discovered,
                skipped = report.skipped,
                "There is nothing on the queue"
            );
            return Ok(report);
        }

        while let Some(finished) = tasks.join_next().await {
            if let Err(e) = self.settle(finished, &mut report) {
                tasks.shutdown().await;
                return Err(e);
            }
        }

        tracing::info!(
            submitted = report.submitted,
            stored = report.stored,
            failed = report.failed,
            "Finished processing"
        );
        Ok(report)
    }

    /// Record a finished task and announce its outcome
    fn settle(&self, finished: TaskResult, report: &mut RunReport) -> Result<()> {
        let (descriptor, outcome) = finished.map_err(|e| {
            tracing::error!(error = %e, "Item task did not complete");
            Error::Task(e.to_string())
        })?;

        let event = match &outcome {
            ItemOutcome::Stored { fields } => Event::Stored {
                name: descriptor.name.clone(),
                content_hash: descriptor.content_hash.clone(),
                fields: *fields,
            },
            ItemOutcome::Rejected(reason) => Event::Failed {
                name: descriptor.name.clone(),
                reason: reason.clone(),
            },
        };
        self.emit_event(event);

        tracing::debug!(
            name = %descriptor.name,
            key = %metadata_key(&descriptor.content_hash),
            completed = report.completed() + 1,
            submitted = report.submitted,
            "Item completed"
        );
        report.record_outcome(descriptor.name, outcome);
        Ok(())
    }
}
