pub mod client;
pub mod models;
pub mod polling;

// Re-exports for convenience
pub use client::{ClientError, NodeClient, SolanaClient};
pub use polling::{start_polling, PollSchedule};
