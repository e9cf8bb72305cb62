#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

//! Photographic look analysis and look transfer over the Gemini API.
//!
//! Two operations make up the public surface:
//! [`LookService::analyze_look_metrics`] scores an image's contrast,
//! saturation, warmth, uniformity and exposure through a schema-constrained
//! model call, and [`LookService::apply_look_transfer`] restyles a target
//! image after a reference image, then blends the generated result back over
//! the target. Everything else is plumbing: a data-URL codec, a raster
//! compositor, and a typed wire layer.

pub mod cli;
pub mod compose;
pub mod config;
pub mod credential;
pub mod data_url;
pub mod error;
mod gemini;
mod http_client;
pub mod metrics;
mod scrub;
pub mod service;

pub use config::LookConfig;
pub use credential::ApiKey;
pub use data_url::DataUrl;
pub use error::{ComposeError, LookError, Result};
pub use metrics::LookMetrics;
pub use service::LookService;
