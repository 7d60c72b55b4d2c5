use crate::commands::db::SqliteStore;
use crate::commands::settings::load_schedule_policy;
use crate::error::{DepreciationError, Result};
use crate::models::asset::AssetSubmission;
use crate::schedule::{generate, SchedulePolicy};
use crate::traits::DepreciationStore;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

/// Parses a raw request body. Malformed JSON is the caller's fault.
pub fn parse_payload(raw: &str) -> Result<Value> {
    serde_json::from_str(raw)
        .map_err(|e| DepreciationError::validation(format!("Invalid JSON: {e}")))
}

pub async fn save_asset(data_dir: String, payload: Value) -> Result<Value> {
    let result = load_schedule_policy(&data_dir).and_then(|policy| {
        let store = SqliteStore::open(&data_dir)?;
        save_asset_internal(&store, payload, Utc::now(), &policy)
    });

    result.map_err(|e| {
        log::error!("Error saving asset: {e}");
        e
    })
}

pub fn save_asset_internal<S>(
    store: &S,
    payload: Value,
    now: DateTime<Utc>,
    policy: &SchedulePolicy,
) -> Result<Value>
where
    S: DepreciationStore + ?Sized,
{
    let input = AssetSubmission::from_value(payload)?.into_input()?;
    let records = generate(&input, now, policy);
    if records.is_empty() {
        log::warn!(
            "Asset {} produced an empty schedule (manufacturing date in the future?)",
            input.asset_id
        );
    }

    let stored = store.insert_schedule(&records)?;
    let schedule_id = stored.first().map(|r| r.schedule_id.clone());

    log::info!(
        "Saved {} depreciation rows for asset {} ({})",
        stored.len(),
        input.asset_id,
        input.company_id
    );

    Ok(json!({
        "message": "Asset saved successfully",
        "scheduleId": schedule_id,
        "count": stored.len(),
    }))
}

pub async fn get_assets(data_dir: String) -> Result<Value> {
    let result = SqliteStore::open(&data_dir).and_then(|store| get_assets_internal(&store));

    result.map_err(|e| {
        log::error!("Error fetching assets: {e}");
        e
    })
}

pub fn get_assets_internal<S: DepreciationStore + ?Sized>(store: &S) -> Result<Value> {
    let assets = store.find_all()?;
    log::debug!("Fetched {} depreciation rows", assets.len());
    Ok(json!({ "assets": assets }))
}

pub async fn delete_assets(data_dir: String) -> Result<Value> {
    let result = SqliteStore::open(&data_dir).and_then(|store| delete_assets_internal(&store));

    result.map_err(|e| {
        log::error!("Error deleting assets: {e}");
        e
    })
}

pub fn delete_assets_internal<S: DepreciationStore + ?Sized>(store: &S) -> Result<Value> {
    let deleted = store.delete_all()?;
    log::info!("Deleted {deleted} depreciation rows");
    Ok(json!({
        "message": "All assets deleted successfully",
        "deleted": deleted,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{AssetDepreciationRecord, StoredRecord};
    use chrono::TimeZone;

    struct RejectingStore;

    impl DepreciationStore for RejectingStore {
        fn insert(&self, _record: &AssetDepreciationRecord) -> Result<StoredRecord> {
            Err(rusqlite::Error::InvalidQuery.into())
        }

        fn insert_schedule(
            &self,
            _records: &[AssetDepreciationRecord],
        ) -> Result<Vec<StoredRecord>> {
            Err(rusqlite::Error::InvalidQuery.into())
        }

        fn find_all(&self) -> Result<Vec<StoredRecord>> {
            Err(rusqlite::Error::InvalidQuery.into())
        }

        fn delete_all(&self) -> Result<usize> {
            Err(rusqlite::Error::InvalidQuery.into())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 8, 0, 0).unwrap()
    }

    #[test]
    fn save_writes_generated_schedule() {
        let store = SqliteStore::open_in_memory().expect("store");
        let response = save_asset_internal(
            &store,
            json!({
                "assetId": "press-1",
                "companyId": "acme",
                "financialYear": "2024-25",
                "initialCost": 12000,
                "depreciationPercentage": 12,
                "month": 3
            }),
            now(),
            &SchedulePolicy::default(),
        )
        .expect("save asset");

        assert_eq!(response["message"], json!("Asset saved successfully"));
        assert_eq!(response["count"], json!(3));

        let stored = store.find_all().expect("find all");
        let totals: Vec<f64> = stored.iter().map(|r| r.record.total_depreciated_cost).collect();
        assert_eq!(totals, vec![11880.0, 11760.0, 11640.0]);
        assert_eq!(response["scheduleId"], json!(stored[0].schedule_id));
    }

    #[test]
    fn validation_failure_writes_nothing() {
        let store = SqliteStore::open_in_memory().expect("store");
        let err = save_asset_internal(
            &store,
            json!({
                "assetId": "press-1",
                "companyId": "acme",
                "financialYear": "2024-25",
                "initialCost": 12000,
                "depreciationPercentage": 12
            }),
            now(),
            &SchedulePolicy::default(),
        )
        .unwrap_err();

        assert!(err.is_validation());
        assert!(store.find_all().expect("find all").is_empty());
    }

    #[test]
    fn overflowing_amounts_are_rejected_before_storage() {
        let store = SqliteStore::open_in_memory().expect("store");
        let err = save_asset_internal(
            &store,
            json!({
                "assetId": "press-1",
                "companyId": "acme",
                "financialYear": "2024-25",
                "initialCost": 1e307,
                "depreciationPercentage": 1000,
                "month": 2
            }),
            now(),
            &SchedulePolicy::default(),
        )
        .unwrap_err();

        assert!(err.is_validation());
        assert!(store.find_all().expect("find all").is_empty());
    }

    #[test]
    fn store_failures_surface_as_persistence_errors() {
        let payload = json!({
            "assetId": "press-1",
            "companyId": "acme",
            "financialYear": "2024-25",
            "initialCost": 100,
            "depreciationPercentage": 10,
            "month": 2
        });

        let err = save_asset_internal(&RejectingStore, payload, now(), &SchedulePolicy::default())
            .unwrap_err();
        assert!(matches!(err, DepreciationError::Persistence(_)));

        assert!(matches!(
            get_assets_internal(&RejectingStore).unwrap_err(),
            DepreciationError::Persistence(_)
        ));
        assert!(matches!(
            delete_assets_internal(&RejectingStore).unwrap_err(),
            DepreciationError::Persistence(_)
        ));
    }

    #[test]
    fn list_and_delete_wrap_store_results() {
        let store = SqliteStore::open_in_memory().expect("store");
        save_asset_internal(
            &store,
            json!({
                "assetId": "van-2",
                "companyId": "acme",
                "financialYear": "2024-25",
                "initialCost": "2400",
                "depreciationPercentage": "10",
                "mfd": "2024-03-01"
            }),
            now(),
            &SchedulePolicy::default(),
        )
        .expect("save asset");

        let listed = get_assets_internal(&store).expect("list");
        let assets = listed["assets"].as_array().expect("assets array");
        // 2024-03-01 to 2024-05-20 is 80 days: two 30-day blocks.
        assert_eq!(assets.len(), 3);
        assert_eq!(assets[0]["assetId"], json!("van-2"));
        assert_eq!(assets[0]["manufacturingYear"], json!(2024));
        assert_eq!(assets[0]["manufacturingMonth"], json!(3));

        let deleted = delete_assets_internal(&store).expect("delete");
        assert_eq!(deleted["deleted"], json!(3));
        let listed = get_assets_internal(&store).expect("list after delete");
        assert_eq!(listed["assets"], json!([]));
    }

    #[test]
    fn malformed_body_is_a_validation_error() {
        assert!(parse_payload("{ not json").unwrap_err().is_validation());
        assert_eq!(parse_payload("{\"month\": 1}").expect("json")["month"], json!(1));
    }
}
