pub mod builtin;
pub mod catalog;
pub mod config;
pub mod definition;
pub mod dispatch;
pub mod error;
pub mod exec;
pub mod expand;
pub mod paths;
pub mod patterns;
pub mod registry;
pub mod sanitizer;

pub use error::{DevctlError, Result};
