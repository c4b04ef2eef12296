// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 P47H Team <https://p47h.com>

//! # app-utils
//!
//! Host-side helpers around the policy engine.
//!
//! This crate provides non-core features:
//! - Policy document parsing (TOML, YAML), chosen by file extension
//! - A template-keyed policy cache that reloads on file change
//! - Clock helpers for evaluation contexts

#![forbid(unsafe_code)]

pub mod cache;
pub mod clock;
pub mod error;
pub mod parser;

/// Re-export `hex` crate for encoding/decoding utilities.
pub use hex;

/// Re-export commonly used types
pub use cache::PolicyCache;
pub use error::{Error, Result};
pub use parser::{load_document, load_policy, DocumentFormat, PolicyParser, TomlParser, YamlParser};
