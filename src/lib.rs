// src/lib.rs
// scalplab - scalping strategy lab with a throttled AI signal advisor

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod advisor;
pub mod config;
pub mod error;
pub mod governor;
pub mod http;
pub mod llm;
pub mod strategy;

pub use error::{Result, ScalpError};
