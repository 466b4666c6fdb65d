//! shopchat - terminal client for a personal shopping assistant
//!
//! The interesting part is keeping the local bag in step with the backend's
//! cart (`cart`) and telling product listings apart from prose in the
//! assistant's replies (`classifier`). Everything a session owns lives in
//! `session::Session`.

pub mod app;
pub mod backend;
pub mod cart;
pub mod classifier;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod core;
pub mod display;
pub mod input;
pub mod models;
pub mod saved;
pub mod session;

pub use crate::core::error::ShopError;
