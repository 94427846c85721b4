#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod columns;
pub mod error;
pub mod loader;
pub mod panel;

pub use error::{DataError, Result};
pub use loader::load_csv;
pub use panel::{Panel, TimestampGroup};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
