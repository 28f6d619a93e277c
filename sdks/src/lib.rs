// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Eka Care Rust SDK
//!
//! Authenticate, upload consultation audio, fetch transcription results and
//! manage vitals, ABDM profiles and health records on the Eka Care platform.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod files;
pub mod profile;
pub mod records;
pub mod types;
pub mod v2rx;
pub mod vitals;

pub use client::{EkaCareClient, EkaCareClientBuilder};
pub use config::SdkConfig;
pub use error::{EkaCareError, Result};
pub use profile::AbhaQrCode;
pub use records::{DocumentType, DocumentUpdate, DocumentUpload};
pub use types::*;
pub use v2rx::{PollOptions, SessionStatus, TemplateOutput, TemplateStatus};
pub use vitals::{GlucoseType, Vital};
