pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod interceptor;
pub mod logger;
pub mod models;
pub mod router;
pub mod session;
pub mod storage;
pub mod views;
