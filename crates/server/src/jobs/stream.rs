// crates/server/src/jobs/stream.rs
//! Change-driven snapshot stream over the job store.

use std::sync::Arc;
use std::time::Duration;

use tokio_stream::Stream;
use vidgrab_core::JobStatus;

use super::state::JobStore;

/// Default sampling period for [`subscribe`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);

/// Sample `store` every `interval` and yield each snapshot that differs from
/// the previous one yielded on this stream.
///
/// Every call gets its own independent stream. It ends right after yielding a
/// `Done` or `Failed` snapshot, so a subscriber that arrives after the job has
/// finished sees the terminal status once and then the end of the stream.
pub fn subscribe(
    store: Arc<JobStore>,
    interval: Duration,
) -> impl Stream<Item = JobStatus> + Send + 'static {
    async_stream::stream! {
        let mut last: Option<JobStatus> = None;

        loop {
            let snapshot = store.snapshot();
            let terminal = snapshot.phase.is_terminal();

            if last.as_ref() != Some(&snapshot) {
                last = Some(snapshot.clone());
                yield snapshot;
            }

            if terminal {
                break;
            }

            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;
    use vidgrab_core::{Phase, StatusUpdate};

    fn downloading(percent: f64) -> StatusUpdate {
        StatusUpdate::Downloading {
            percent,
            speed_label: "1.0 MiB/s".into(),
            eta_label: "5s".into(),
            file_name: "clip.mp4".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_subscriber_gets_terminal_once() {
        let store = Arc::new(JobStore::new());
        store.begin("MP4").unwrap();
        store.apply(StatusUpdate::Done);

        let items: Vec<JobStatus> = subscribe(store, DEFAULT_POLL_INTERVAL).collect().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].phase, Phase::Done);
        assert_eq!(items[0].percent, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_changes_are_emitted() {
        let store = Arc::new(JobStore::new());
        store.begin("MP4").unwrap();

        let mut stream = Box::pin(subscribe(Arc::clone(&store), Duration::from_millis(10)));
        let first = stream.next().await.unwrap();
        assert_eq!(first.phase, Phase::Starting);

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                // Several unchanged polls go by before each update.
                tokio::time::sleep(Duration::from_millis(55)).await;
                store.apply(downloading(25.0));
                tokio::time::sleep(Duration::from_millis(55)).await;
                store.apply(downloading(25.0));
                tokio::time::sleep(Duration::from_millis(55)).await;
                store.apply(StatusUpdate::failed("boom"));
            })
        };

        let rest: Vec<JobStatus> = stream.collect().await;
        writer.await.unwrap();

        let phases: Vec<Phase> = rest.iter().map(|s| s.phase).collect();
        assert_eq!(phases, vec![Phase::Downloading, Phase::Failed]);
        assert_eq!(rest[0].percent, 25.0);
        assert_eq!(rest[1].error_message, "boom");
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscriptions_are_independent() {
        let store = Arc::new(JobStore::new());
        store.begin("WebM").unwrap();
        store.apply(downloading(40.0));

        let mut a = Box::pin(subscribe(Arc::clone(&store), Duration::from_millis(10)));
        let mut b = Box::pin(subscribe(Arc::clone(&store), Duration::from_millis(10)));

        assert_eq!(a.next().await.unwrap().percent, 40.0);
        assert_eq!(b.next().await.unwrap().percent, 40.0);

        store.apply(StatusUpdate::Done);
        assert_eq!(a.next().await.unwrap().phase, Phase::Done);
        assert!(a.next().await.is_none());

        // `b` still sees the terminal snapshot even though `a` consumed it.
        assert_eq!(b.next().await.unwrap().phase, Phase::Done);
        assert!(b.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_store_keeps_stream_open() {
        let store = Arc::new(JobStore::new());
        let mut stream = Box::pin(subscribe(Arc::clone(&store), Duration::from_millis(10)));

        assert_eq!(stream.next().await.unwrap().phase, Phase::Idle);
        let next = tokio::time::timeout(Duration::from_millis(100), stream.next()).await;
        assert!(next.is_err(), "idle store should not produce more snapshots");
    }
}
