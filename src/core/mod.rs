pub mod chat;
pub mod config;
pub mod fallback;
pub mod message;
pub mod session;
pub mod store;
