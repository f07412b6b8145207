//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and easing helpers
//! - Arena keys and generation tags
//! - Logging utilities

pub mod collections;
pub mod logging;
pub mod math;
