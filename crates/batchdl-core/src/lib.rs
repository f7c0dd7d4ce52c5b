pub mod config;
pub mod logging;

pub mod coordinator;
pub mod engine;
pub mod entry_queue;
pub mod error;
pub mod finished;
pub mod hooks;
pub mod logger;
pub mod runner;
pub mod workflow;
