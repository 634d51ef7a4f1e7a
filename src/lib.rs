pub mod cache;
pub mod catalog;
pub mod commands;
pub mod http;
pub mod plan;
pub mod provider;
pub mod resolve;
pub mod similarity;
