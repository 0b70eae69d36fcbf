pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod filing;
pub mod pipeline;
pub mod policy;
pub mod redact;
pub mod report;
pub mod service;
pub mod text;
pub mod util;
