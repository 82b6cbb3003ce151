//! Core library for the drop-tower-k command line application.
//!
//! The library turns drop tower acceleration workbooks into LS-DYNA keyword
//! files. IO adapters live under [`io`], the table representation inside
//! [`model`], the diagnostic figures in [`plot`], and the end-to-end
//! orchestration under [`convert`].

pub mod config;
pub mod convert;
pub mod error;
pub mod io;
pub mod model;
pub mod plot;

pub use error::{Result, ToolError};
