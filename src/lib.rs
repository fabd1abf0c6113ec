pub mod analytics;
pub mod api;
pub mod blockchain;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod scanner;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use api::error::ApiError;
pub use api::response::ApiResponse;
pub use api::route::{create_router, ActivityQuery, TransfersQuery};
pub use blockchain::client::{ClientError, NodeClient, SolanaClient};
pub use error::EngineError;
pub use models::{Direction, ScanHint, ScanMode, ScanReport, TransferEvent, WalletSummary};
pub use scanner::{EngineSettings, ScanEngine, ScanRequest};
pub use validation::{validate_limit, validate_mode, validate_solana_address, validate_threshold};
