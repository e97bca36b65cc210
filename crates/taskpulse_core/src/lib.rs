pub mod advisor;
pub mod burndown;
pub mod cascade;
pub mod config;
pub mod directive_api;
pub mod error;
mod ids;
pub mod meeting_api;
pub mod model;
pub mod notify;
pub mod progress;
pub mod session;
pub mod stats;
pub mod storage;
pub mod task_api;
pub mod user_api;
pub mod vision_api;
