// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Vitals
//!
//! Builders for LOINC-coded vital observations and the endpoint that
//! attaches them to a transaction.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;

use crate::client::{path_segment, ApiRequest, EkaCareClient};
use crate::error::{EkaCareError, Result};

const VITALS_PATH: &str = "/api/v1/patient/vitals";
const MEASURED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct Vitals<'a> {
    client: &'a EkaCareClient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vital {
    pub vital_display_name: String,
    pub vital_loinc_code: String,
    pub vital_value: VitalValue,
    pub unit_display_name: String,
    pub unit_ucum_code: String,
    pub measured_at: MeasuredAt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalValue {
    pub vital_numeric_value: Option<f64>,
    pub vital_boolean_value: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredAt {
    #[serde(rename = "DateTime")]
    pub date_time: Option<String>,
    pub instant: Option<String>,
    #[serde(rename = "PeriodStartDate")]
    pub period_start_date: Option<String>,
    #[serde(rename = "PeriodEndDate")]
    pub period_end_date: Option<String>,
}

/// When a blood glucose sample was taken relative to a meal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlucoseType {
    Fasting,
    Random,
    PostPrandial,
}

impl GlucoseType {
    fn loinc_code(self) -> &'static str {
        match self {
            GlucoseType::Fasting => "1558-6",
            GlucoseType::Random => "2345-7",
            GlucoseType::PostPrandial => "1521-0",
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            GlucoseType::Fasting => "blood_glucose_fasting",
            GlucoseType::Random => "blood_glucose_random",
            GlucoseType::PostPrandial => "blood_glucose_post_prandial",
        }
    }
}

impl FromStr for GlucoseType {
    type Err = EkaCareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fasting" => Ok(GlucoseType::Fasting),
            "random" => Ok(GlucoseType::Random),
            "post_prandial" | "postprandial" | "pp" => Ok(GlucoseType::PostPrandial),
            other => Err(EkaCareError::InvalidInput(format!(
                "unknown glucose type '{}', expected fasting, random or post_prandial",
                other
            ))),
        }
    }
}

impl Vital {
    fn numeric(
        display_name: &str,
        loinc_code: &str,
        value: f64,
        unit_display_name: &str,
        unit_ucum_code: &str,
        measured_at: &str,
    ) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(EkaCareError::InvalidInput(format!(
                "{} must be a positive number, got {}",
                display_name, value
            )));
        }

        Ok(Self {
            vital_display_name: display_name.to_string(),
            vital_loinc_code: loinc_code.to_string(),
            vital_value: VitalValue {
                vital_numeric_value: Some(value),
                vital_boolean_value: None,
            },
            unit_display_name: unit_display_name.to_string(),
            unit_ucum_code: unit_ucum_code.to_string(),
            measured_at: MeasuredAt::at(measured_at)?,
        })
    }

    pub fn heart_rate(value: f64, measured_at: &str) -> Result<Self> {
        Self::numeric("heart_rate", "8867-4", value, "{beats}/min", "/min", measured_at)
    }

    pub fn blood_glucose(value: f64, measured_at: &str, glucose_type: GlucoseType) -> Result<Self> {
        Self::numeric(
            glucose_type.display_name(),
            glucose_type.loinc_code(),
            value,
            "mg/dL",
            "mg/dL",
            measured_at,
        )
    }

    pub fn blood_oxygen(value: f64, measured_at: &str) -> Result<Self> {
        if value > 100.0 {
            return Err(EkaCareError::InvalidInput(format!(
                "blood oxygen saturation cannot exceed 100%, got {}",
                value
            )));
        }
        Self::numeric("blood_oxygen", "59408-5", value, "%", "%", measured_at)
    }

    /// Systolic and diastolic readings, in that order
    pub fn blood_pressure(systolic: f64, diastolic: f64, measured_at: &str) -> Result<[Self; 2]> {
        if systolic <= diastolic {
            return Err(EkaCareError::InvalidInput(format!(
                "systolic ({}) must be greater than diastolic ({})",
                systolic, diastolic
            )));
        }

        Ok([
            Self::numeric("systolic_bp", "8480-6", systolic, "mmHg", "mm[Hg]", measured_at)?,
            Self::numeric("diastolic_bp", "8462-4", diastolic, "mmHg", "mm[Hg]", measured_at)?,
        ])
    }
}

impl MeasuredAt {
    /// Point-in-time measurement; `value` must be `YYYY-MM-DDTHH:MM:SS`
    pub fn at(value: &str) -> Result<Self> {
        NaiveDateTime::parse_from_str(value, MEASURED_AT_FORMAT).map_err(|e| {
            EkaCareError::InvalidInput(format!(
                "measured_at '{}' is not YYYY-MM-DDTHH:MM:SS: {}",
                value, e
            ))
        })?;

        Ok(Self {
            date_time: Some(value.to_string()),
            instant: None,
            period_start_date: None,
            period_end_date: None,
        })
    }
}

impl<'a> Vitals<'a> {
    pub(crate) fn new(client: &'a EkaCareClient) -> Self {
        Self { client }
    }

    pub fn create_heart_rate_vital(&self, value: f64, measured_at: &str) -> Result<Vital> {
        Vital::heart_rate(value, measured_at)
    }

    /// `glucose_type` is one of "fasting", "random" or "post_prandial"
    pub fn create_blood_glucose_vital(
        &self,
        value: f64,
        measured_at: &str,
        glucose_type: &str,
    ) -> Result<Vital> {
        Vital::blood_glucose(value, measured_at, glucose_type.parse()?)
    }

    pub fn create_blood_oxygen_vital(&self, value: f64, measured_at: &str) -> Result<Vital> {
        Vital::blood_oxygen(value, measured_at)
    }

    pub fn create_blood_pressure_vital(
        &self,
        systolic: f64,
        diastolic: f64,
        measured_at: &str,
    ) -> Result<Vec<Vital>> {
        Ok(Vital::blood_pressure(systolic, diastolic, measured_at)?.to_vec())
    }

    /// Attach vitals to a transaction.
    pub async fn update_vitals(&self, txn_id: &str, vitals: &[Vital]) -> Result<Value> {
        let encoded = path_segment("txn_id", txn_id)?;
        if vitals.is_empty() {
            return Err(EkaCareError::InvalidInput("no vitals to update".into()));
        }

        self.client
            .send_value(
                &ApiRequest::put(format!("{}/{}", VITALS_PATH, encoded))
                    .json(json!({ "vitals": vitals })),
            )
            .await
    }
}
