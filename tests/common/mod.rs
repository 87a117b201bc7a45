//! Common test utilities and helpers
//!
//! This module provides shared functionality used across integration tests:
//! - Binary invocation inside a project directory (via `cybuilder`)
//! - Test fixture utilities (via `helpers`)

pub(crate) mod helpers;

pub(crate) use helpers::cybuilder;
