#![warn(missing_docs)]
//! Alert digest collects dashboard alerts into fixed time windows and delivers
//! one consolidated, severity-grouped notification per window.

pub mod channels;
pub mod cmd;
pub mod config;
pub mod engine;
pub mod http_server;
pub mod models;
pub mod notification;
pub mod supervisor;
pub mod test_helpers;
