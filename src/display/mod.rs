//! Display formatting for terminal output

pub mod client;
pub mod log;

pub use client::{format_client_details, format_client_list};
pub use log::format_log_table;
