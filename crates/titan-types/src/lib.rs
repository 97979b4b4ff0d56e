//! Foundation types for the Titan launcher shell.
//!
//! This crate contains the toolkit-agnostic types shared by every Titan
//! crate: colors, pixel geometry, input events, configuration, and the
//! error type.

pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
