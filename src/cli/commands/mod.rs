//! CLI command implementations.

pub mod context;
pub mod kickoff;
pub mod replay;
pub mod run;
pub mod train;

pub use context::AppContext;
