// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the webgpg secret-protection subsystem.
//!
//! This crate provides the error type shared by every webgpg crate. The
//! variants mirror the distinct failure classes the web layer needs to tell
//! apart: operator misconfiguration, store I/O, caller-supplied garbage, and
//! failed authenticated decryption.

pub mod error;

pub use error::WebgpgError;
