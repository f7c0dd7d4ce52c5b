//! CLI command handlers, one file per command plus shared run plumbing.

mod batch;
mod config;
mod playlist;
mod report;
mod session;

pub use batch::{run_batch, BatchArgs};
pub use config::run_config;
pub use playlist::{run_playlist, PlaylistArgs};
