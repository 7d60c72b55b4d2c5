use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row per asset per schedule month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDepreciationRecord {
    pub asset_id: String,
    pub company_id: String,
    pub financial_year: String,
    pub month: u32,
    pub initial_cost: f64,
    pub depreciation_percentage: f64,
    pub monthly_depreciation_cost: f64,
    pub total_depreciated_cost: f64,
    pub mfd: Option<DateTime<Utc>>,
    pub manufacturing_year: Option<i32>,
    pub manufacturing_month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: i64,
    pub schedule_id: String,
    pub created_at: i64,
    #[serde(flatten)]
    pub record: AssetDepreciationRecord,
}
