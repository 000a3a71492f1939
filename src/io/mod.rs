//! I/O modules: guide file loading and background fetches.

pub mod loading_state;
pub mod async_loader;
pub mod fetch_worker;

pub use loading_state::LoadingState;
pub use async_loader::{AsyncLoader, LoadResult};
pub use fetch_worker::FetchWorker;
