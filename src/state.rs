use crate::config::Config;
use crate::models::ScanReport;
use crate::scanner::ScanEngine;
use std::sync::Arc;
use tokio::sync::watch;

pub struct AppState {
    pub config: Config,
    pub engine: Arc<ScanEngine>,
    /// Latest report published by the background poller.
    pub latest: watch::Receiver<Option<ScanReport>>,
}
