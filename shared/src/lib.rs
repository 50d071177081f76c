pub mod client;
pub mod debounce;
pub mod error;
pub mod listing;
pub mod log_config;
pub mod pagination;
pub mod product;
pub mod session;
