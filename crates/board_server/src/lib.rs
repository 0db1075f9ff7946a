//! HTTP surface for the bulletin board.
//!
//! # Responsibility
//! - Expose articles and comments as HAL resources under `/api`.
//! - Translate service results into HTTP status codes.
//!
//! # Invariants
//! - Handlers never touch SQL directly; every call goes through `BoardService`.

pub mod config;
pub mod error;
pub mod hal;
pub mod params;
pub mod routes;
pub mod state;

pub use config::{PagingConfig, ServerConfig};
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
