use crate::error::{DepreciationError, Result};
use crate::schedule::generator::monthly_depreciation_cost;
use crate::schedule::policy::MONTHS_PER_YEAR;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Raw inbound payload. Numeric fields stay loosely typed until `into_input`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSubmission {
    pub asset_id: String,
    pub company_id: String,
    pub financial_year: String,
    #[serde(default)]
    pub initial_cost: Option<Value>,
    #[serde(default)]
    pub depreciation_percentage: Option<Value>,
    #[serde(default)]
    pub month: Option<Value>,
    #[serde(default)]
    pub mfd: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeAnchor {
    /// Explicit schedule month, always >= 1.
    Month(u32),
    ManufacturedOn(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleInput {
    pub asset_id: String,
    pub company_id: String,
    pub financial_year: String,
    pub initial_cost: f64,
    pub depreciation_percentage: f64,
    pub anchor: TimeAnchor,
}

impl AssetSubmission {
    pub fn from_value(payload: Value) -> Result<Self> {
        serde_json::from_value(payload)
            .map_err(|e| DepreciationError::validation(format!("Invalid asset payload: {e}")))
    }

    pub fn into_input(self) -> Result<ScheduleInput> {
        let initial_cost = parse_amount("initialCost", self.initial_cost.as_ref())?;
        let depreciation_percentage =
            parse_amount("depreciationPercentage", self.depreciation_percentage.as_ref())?;

        // A full year of depreciation must stay representable.
        let yearly = f64::from(MONTHS_PER_YEAR)
            * monthly_depreciation_cost(initial_cost, depreciation_percentage);
        if !yearly.is_finite() {
            return Err(DepreciationError::validation(
                "initialCost and depreciationPercentage are too large",
            ));
        }

        let month = parse_month(self.month.as_ref())?;
        let mfd = match self.mfd.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_mfd(raw)?),
            _ => None,
        };

        let anchor = match (month, mfd) {
            (Some(_), Some(_)) => {
                return Err(DepreciationError::validation(
                    "provide either month or manufacturing date, not both",
                ))
            }
            (None, Some(date)) => TimeAnchor::ManufacturedOn(date),
            // Zero and negative months count as "not supplied".
            (Some(m), None) if m > 0 => TimeAnchor::Month(u32::try_from(m).map_err(|_| {
                DepreciationError::validation(format!("month {m} is out of range"))
            })?),
            (_, None) => {
                return Err(DepreciationError::validation(
                    "month or manufacturing date required",
                ))
            }
        };

        Ok(ScheduleInput {
            asset_id: self.asset_id,
            company_id: self.company_id,
            financial_year: self.financial_year,
            initial_cost,
            depreciation_percentage,
            anchor,
        })
    }
}

fn parse_amount(field: &str, value: Option<&Value>) -> Result<f64> {
    let value = value
        .filter(|v| !v.is_null())
        .ok_or_else(|| DepreciationError::validation(format!("{field} is required")))?;

    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
    .ok_or_else(|| DepreciationError::validation(format!("{field} must be a finite number")))?;

    if amount < 0.0 {
        return Err(DepreciationError::validation(format!(
            "{field} must not be negative"
        )));
    }

    Ok(amount)
}

fn parse_month(value: Option<&Value>) -> Result<Option<i64>> {
    let invalid = || DepreciationError::validation("month must be a whole number");

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(m) = n.as_i64() {
                return Ok(Some(m));
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(Some(f as i64)),
                _ => Err(invalid()),
            }
        }
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// Accepts RFC 3339 date-times, bare `YYYY-MM-DDTHH:MM:SS` (taken as UTC) and `YYYY-MM-DD`.
pub fn parse_mfd(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            DepreciationError::validation(format!("mfd is not a valid ISO-8601 date: {raw}"))
        })
}
