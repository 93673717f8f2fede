//! Daily sales summary reports.
//!
//! The pipeline generates (or accepts) a CSV of per-product sales, summarizes
//! it, renders a one-page PDF, and mails the PDF to a recipient. The
//! [`schedule`] module repeats that once per day.

pub mod aggregate;
pub mod builder;
pub mod config;
pub mod error;
pub mod fonts;
pub mod loader;
pub mod mail;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod schedule;
pub mod source;

pub use error::{ReportError, Result};
