//! Telegram bot that shares channel invite links through stable deep-link
//! tokens and auto-approves join requests.
//!
//! The core is a small key-value layer ([`store`]) with two interchangeable
//! backends, and a typed domain layer on top of it ([`database`]).

pub mod approval;
pub mod bot;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod logging;
pub mod store;
pub mod token;
