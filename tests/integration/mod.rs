//! Integration test suite for quadro.
//!
//! These tests drive the public API end to end: engine operations over long
//! intent sequences, the board store and export/import files, and the TUI
//! update loop without a terminal.
//!
//! # Test Categories
//!
//! - `engine_properties`: invariants that hold for every reachable board
//! - `persistence`: store, export/import and legacy migration on disk
//! - `tui_workflow`: key-driven sessions through `tea::update`

mod fixtures;

mod engine_properties;
mod persistence;
mod tui_workflow;
