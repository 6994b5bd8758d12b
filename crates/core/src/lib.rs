pub mod aggregate;
pub mod application;
pub mod domain;
pub mod error;
pub mod filter;
pub mod ports;
pub mod utils;
