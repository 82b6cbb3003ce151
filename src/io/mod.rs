//! Adapters between files on disk and the in-memory tables.

pub mod excel_read;
pub mod keyword_write;
