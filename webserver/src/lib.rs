pub mod app;
pub mod appstate;
pub mod config;
pub mod error;
pub mod handler;
pub mod response;
pub mod service;
pub mod state;
