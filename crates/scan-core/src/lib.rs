//! Core types for the scanned-book pipeline: errors, options, output
//! layout, stage traits, and the pipeline orchestrator.

pub mod book;
pub mod error;
pub mod layout;
pub mod options;
pub mod pipeline;
pub mod plugin;
