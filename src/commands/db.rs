use crate::error::Result;
use crate::models::record::{AssetDepreciationRecord, StoredRecord};
use crate::traits::DepreciationStore;
use rusqlite::{params, Connection, Row};
use std::fs;
use std::path::{Path, PathBuf};

const DB_SCHEMA_VERSION: i64 = 1;
const DB_FILE_NAME: &str = "depreciation.db";

const RECORD_COLUMNS: &str = "id, schedule_id, created_at, \
     asset_id, company_id, financial_year, month, \
     initial_cost, depreciation_percentage, monthly_depreciation_cost, total_depreciated_cost, \
     mfd, manufacturing_year, manufacturing_month";

pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;

    let mut version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        apply_migration_1(conn)?;
        version = 1;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version > DB_SCHEMA_VERSION {
        log::warn!("Database schema version {version} is newer than {DB_SCHEMA_VERSION}");
    }

    Ok(())
}

fn apply_migration_1(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS asset_depreciation (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            schedule_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            asset_id TEXT NOT NULL,
            company_id TEXT NOT NULL,
            financial_year TEXT NOT NULL,
            month INTEGER NOT NULL CHECK(month BETWEEN 1 AND 12),
            initial_cost REAL NOT NULL,
            depreciation_percentage REAL NOT NULL,
            monthly_depreciation_cost REAL NOT NULL,
            total_depreciated_cost REAL NOT NULL,
            mfd TEXT,
            manufacturing_year INTEGER,
            manufacturing_month INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_asset_depreciation_asset
            ON asset_depreciation(asset_id, company_id);
        CREATE INDEX IF NOT EXISTS idx_asset_depreciation_schedule
            ON asset_depreciation(schedule_id);
        ",
    )
}

pub fn ensure_data_dir(data_dir: &str) -> Result<()> {
    fs::create_dir_all(data_dir)?;
    Ok(())
}

pub fn db_path(data_dir: &str) -> PathBuf {
    Path::new(data_dir).join(DB_FILE_NAME)
}

pub fn get_db_connection(data_dir: &str) -> Result<Connection> {
    ensure_data_dir(data_dir)?;
    let conn = Connection::open(db_path(data_dir))?;
    initialize_schema(&conn)?;
    Ok(conn)
}

/// SQLite-backed schedule store. One connection per store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(data_dir: &str) -> Result<Self> {
        Ok(SqliteStore {
            conn: get_db_connection(data_dir)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(SqliteStore { conn })
    }
}

impl DepreciationStore for SqliteStore {
    fn insert(&self, record: &AssetDepreciationRecord) -> Result<StoredRecord> {
        let schedule_id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        Ok(insert_row(&self.conn, &schedule_id, now, record)?)
    }

    fn insert_schedule(&self, records: &[AssetDepreciationRecord]) -> Result<Vec<StoredRecord>> {
        let schedule_id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();

        let tx = self.conn.unchecked_transaction()?;
        let mut stored = Vec::with_capacity(records.len());
        for record in records {
            stored.push(insert_row(&tx, &schedule_id, now, record)?);
        }
        tx.commit()?;

        Ok(stored)
    }

    fn find_all(&self) -> Result<Vec<StoredRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {RECORD_COLUMNS} FROM asset_depreciation ORDER BY id ASC"))?;

        let records = stmt
            .query_map([], stored_record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    fn delete_all(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM asset_depreciation", [])?)
    }
}

fn insert_row(
    conn: &Connection,
    schedule_id: &str,
    created_at: i64,
    record: &AssetDepreciationRecord,
) -> rusqlite::Result<StoredRecord> {
    conn.execute(
        "
        INSERT INTO asset_depreciation (
            schedule_id,
            created_at,
            asset_id,
            company_id,
            financial_year,
            month,
            initial_cost,
            depreciation_percentage,
            monthly_depreciation_cost,
            total_depreciated_cost,
            mfd,
            manufacturing_year,
            manufacturing_month
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        ",
        params![
            schedule_id,
            created_at,
            record.asset_id,
            record.company_id,
            record.financial_year,
            record.month,
            record.initial_cost,
            record.depreciation_percentage,
            record.monthly_depreciation_cost,
            record.total_depreciated_cost,
            record.mfd,
            record.manufacturing_year,
            record.manufacturing_month,
        ],
    )?;

    Ok(StoredRecord {
        id: conn.last_insert_rowid(),
        schedule_id: schedule_id.to_string(),
        created_at,
        record: record.clone(),
    })
}

fn stored_record_from_row(row: &Row<'_>) -> rusqlite::Result<StoredRecord> {
    Ok(StoredRecord {
        id: row.get(0)?,
        schedule_id: row.get(1)?,
        created_at: row.get(2)?,
        record: AssetDepreciationRecord {
            asset_id: row.get(3)?,
            company_id: row.get(4)?,
            financial_year: row.get(5)?,
            month: row.get(6)?,
            initial_cost: row.get(7)?,
            depreciation_percentage: row.get(8)?,
            monthly_depreciation_cost: row.get(9)?,
            total_depreciated_cost: row.get(10)?,
            mfd: row.get(11)?,
            manufacturing_year: row.get(12)?,
            manufacturing_month: row.get(13)?,
        },
    })
}
