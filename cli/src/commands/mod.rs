//! CLI Commands

pub mod account;
pub mod config;
pub mod fill;
pub mod forms;
pub mod responses;
