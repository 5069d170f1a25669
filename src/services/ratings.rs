//! Background recomputation of venue/band rating aggregates.
//!
//! Check-ins enqueue a [`RatingJob`] on a bounded channel and return
//! immediately. A single [`RatingWorker`] task drains the channel and
//! retries failed recomputations a fixed number of times before giving up.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::{config::RatingsConfig, repository::Repository};

/// Aggregate to recompute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingJob {
    Venue(Uuid),
    Band(Uuid),
}

/// Storage seam used by the worker
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingStore: Send + Sync + 'static {
    async fn recompute_venue(&self, id: Uuid) -> Result<(), sqlx::Error>;
    async fn recompute_band(&self, id: Uuid) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl RatingStore for Repository {
    async fn recompute_venue(&self, id: Uuid) -> Result<(), sqlx::Error> {
        self.venues.recompute_rating(id).await
    }

    async fn recompute_band(&self, id: Uuid) -> Result<(), sqlx::Error> {
        self.bands.recompute_rating(id).await
    }
}

/// Sending half of the rating job channel
#[derive(Clone)]
pub struct RatingQueue {
    sender: mpsc::Sender<RatingJob>,
}

impl RatingQueue {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<RatingJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Enqueue a job without waiting. Returns whether the job was accepted;
    /// a full or closed queue is logged and otherwise ignored.
    pub fn dispatch(&self, job: RatingJob) -> bool {
        match self.sender.try_send(job) {
            Ok(()) => {
                tracing::debug!(?job, "Rating job queued");
                true
            }
            Err(TrySendError::Full(job)) => {
                tracing::warn!(?job, "Rating queue full, dropping job");
                false
            }
            Err(TrySendError::Closed(job)) => {
                tracing::warn!(?job, "Rating worker stopped, dropping job");
                false
            }
        }
    }
}

pub struct RatingWorker<S: RatingStore> {
    store: S,
    receiver: mpsc::Receiver<RatingJob>,
    max_retries: u32,
    retry_delay: Duration,
}

impl<S: RatingStore> RatingWorker<S> {
    pub fn new(store: S, receiver: mpsc::Receiver<RatingJob>, config: &RatingsConfig) -> Self {
        Self {
            store,
            receiver,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Consume jobs until every sender is dropped
    pub async fn run(mut self) {
        tracing::info!(
            max_retries = self.max_retries,
            retry_delay_ms = self.retry_delay.as_millis() as u64,
            "Rating worker started"
        );
        while let Some(job) = self.receiver.recv().await {
            self.process(job).await;
        }
        tracing::info!("Rating worker stopping");
    }

    /// Run one job with retries. Returns `true` on success.
    pub async fn process(&self, job: RatingJob) -> bool {
        let mut attempt = 0;
        loop {
            let result = match job {
                RatingJob::Venue(id) => self.store.recompute_venue(id).await,
                RatingJob::Band(id) => self.store.recompute_band(id).await,
            };
            match result {
                Ok(()) => {
                    tracing::debug!(?job, attempt, "Rating aggregate recomputed");
                    return true;
                }
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(?job, attempt, error = %e, "Rating recompute failed, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    tracing::error!(?job, error = %e, "Rating recompute failed, giving up");
                    return false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;

    fn config(max_retries: u32) -> RatingsConfig {
        RatingsConfig {
            queue_capacity: 4,
            max_retries,
            retry_delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let id = Uuid::new_v4();
        let mut store = MockRatingStore::new();
        let mut seq = Sequence::new();
        store
            .expect_recompute_band()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(sqlx::Error::PoolTimedOut));
        store
            .expect_recompute_band()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let (_queue, rx) = RatingQueue::channel(4);
        let worker = RatingWorker::new(store, rx, &config(3));
        assert!(worker.process(RatingJob::Band(id)).await);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let mut store = MockRatingStore::new();
        store
            .expect_recompute_venue()
            .times(3)
            .returning(|_| Err(sqlx::Error::PoolTimedOut));
        store.expect_recompute_band().never();

        let (_queue, rx) = RatingQueue::channel(4);
        let worker = RatingWorker::new(store, rx, &config(2));
        assert!(!worker.process(RatingJob::Venue(Uuid::new_v4())).await);
    }

    #[tokio::test]
    async fn test_run_drains_queue_and_stops_when_senders_drop() {
        let venue = Uuid::new_v4();
        let band = Uuid::new_v4();
        let mut store = MockRatingStore::new();
        store
            .expect_recompute_venue()
            .withf(move |id| *id == venue)
            .times(1)
            .returning(|_| Ok(()));
        store
            .expect_recompute_band()
            .withf(move |id| *id == band)
            .times(1)
            .returning(|_| Ok(()));

        let (queue, rx) = RatingQueue::channel(4);
        assert!(queue.dispatch(RatingJob::Venue(venue)));
        assert!(queue.dispatch(RatingJob::Band(band)));
        drop(queue);

        RatingWorker::new(store, rx, &config(0)).run().await;
    }

    #[test]
    fn test_dispatch_drops_when_full_or_closed() {
        let (queue, rx) = RatingQueue::channel(1);
        assert!(queue.dispatch(RatingJob::Venue(Uuid::new_v4())));
        assert!(!queue.dispatch(RatingJob::Venue(Uuid::new_v4())));
        drop(rx);
        assert!(!queue.dispatch(RatingJob::Band(Uuid::new_v4())));
    }

    #[test]
    fn test_worker_runs_on_plain_executor() {
        let mut store = MockRatingStore::new();
        store.expect_recompute_venue().times(1).returning(|_| Ok(()));
        let (_queue, rx) = RatingQueue::channel(1);
        let worker = RatingWorker::new(store, rx, &config(0));
        assert!(tokio_test::block_on(worker.process(RatingJob::Venue(Uuid::nil()))));
    }
}
