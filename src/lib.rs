pub mod cli;
pub mod config;
pub mod export;
pub mod gateway;
pub mod listing;
pub mod session;
