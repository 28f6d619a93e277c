// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Vitals command

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;

use ekacare_sdk::{EkaCareClient, GlucoseType, Vital};

use crate::output::{print_json, section};

const MEASURED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Args, Debug)]
pub struct VitalsArgs {
    /// Transaction the vitals belong to
    #[arg(value_name = "TXN_ID")]
    pub txn_id: String,

    /// Beats per minute
    #[arg(long, default_value_t = 75.0)]
    pub heart_rate: f64,

    /// Blood glucose in mg/dL
    #[arg(long, default_value_t = 120.0)]
    pub glucose: f64,

    /// fasting, random or post_prandial
    #[arg(long, default_value = "fasting")]
    pub glucose_type: GlucoseType,

    /// Oxygen saturation percentage
    #[arg(long, default_value_t = 98.0)]
    pub spo2: f64,

    #[arg(long, default_value_t = 120.0)]
    pub systolic: f64,

    #[arg(long, default_value_t = 80.0)]
    pub diastolic: f64,

    /// Measurement time as YYYY-MM-DDTHH:MM:SS (default: now)
    #[arg(long, value_name = "DATETIME")]
    pub measured_at: Option<String>,
}

impl VitalsArgs {
    pub fn build_vitals(&self) -> Result<Vec<Vital>> {
        let measured_at = self
            .measured_at
            .clone()
            .unwrap_or_else(|| Local::now().format(MEASURED_AT_FORMAT).to_string());

        let mut vitals = vec![
            Vital::heart_rate(self.heart_rate, &measured_at).context("Invalid heart rate")?,
            Vital::blood_glucose(self.glucose, &measured_at, self.glucose_type)
                .context("Invalid blood glucose")?,
            Vital::blood_oxygen(self.spo2, &measured_at).context("Invalid blood oxygen")?,
        ];
        vitals.extend(
            Vital::blood_pressure(self.systolic, self.diastolic, &measured_at)
                .context("Invalid blood pressure")?,
        );
        Ok(vitals)
    }
}

pub async fn handle(args: VitalsArgs, client: &EkaCareClient) -> Result<()> {
    section("Vitals Update");

    let vitals = args.build_vitals()?;
    let response = client
        .vitals()
        .update_vitals(&args.txn_id, &vitals)
        .await
        .with_context(|| format!("Failed to update vitals for {}", args.txn_id))?;

    println!(
        "{}",
        format!("✓ {} vitals sent for {}", vitals.len(), args.txn_id).green()
    );
    if !response.is_null() {
        print_json(&response);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> VitalsArgs {
        VitalsArgs {
            txn_id: "txn-1".into(),
            heart_rate: 75.0,
            glucose: 120.0,
            glucose_type: GlucoseType::Fasting,
            spo2: 98.0,
            systolic: 120.0,
            diastolic: 80.0,
            measured_at: Some("2025-01-15T10:30:00".into()),
        }
    }

    #[test]
    fn test_build_vitals_defaults() {
        let vitals = args().build_vitals().unwrap();
        assert_eq!(vitals.len(), 5);
    }

    #[test]
    fn test_build_vitals_rejects_inverted_pressure() {
        let mut args = args();
        args.systolic = 70.0;
        assert!(args.build_vitals().is_err());
    }

    #[test]
    fn test_build_vitals_default_time_is_valid() {
        let mut args = args();
        args.measured_at = None;
        assert!(args.build_vitals().is_ok());
    }
}
