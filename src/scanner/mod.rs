pub mod block;
pub mod extractor;
pub mod orchestrator;
pub mod watch_list;

pub use extractor::extract;
pub use orchestrator::{EngineSettings, ScanEngine, ScanRequest};
pub use watch_list::WatchLimits;

use std::future::Future;
use tokio::time::Instant;

/// Await `fut` unless `deadline` passes first, in which case `None`.
pub(crate) async fn within_deadline<F: Future>(
    deadline: Option<Instant>,
    fut: F,
) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}
