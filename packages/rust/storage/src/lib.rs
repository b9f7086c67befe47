//! Turso Embedded / libSQL storage layer for the rigmate catalog.
//!
//! The [`Storage`] struct wraps a libSQL database holding the component
//! catalog and its append-only price history. The `(ctype, dedup_key)`
//! unique constraint is what makes ingestion's dedup-and-upsert atomic per
//! key; the engine computes keys and merge results, storage enforces them.
//!
//! **Access rules:**
//! - CLI: read-write (sole writer) via [`Storage::open`]
//! - Anything else (exports, inspection tooling): [`Storage::open_readonly`]

mod migrations;

use std::path::Path;

use chrono::{DateTime, Utc};
use libsql::{Connection, Database, params};
use rigmate_catalog::{DedupKey, PricePoint};
use rigmate_shared::{
    Component, ComponentId, ComponentType, Condition, Result, RigmateError, Scores, Specs,
};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RigmateError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| RigmateError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| RigmateError::Storage(e.to_string()))?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open a database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| RigmateError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| RigmateError::Storage(e.to_string()))?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    RigmateError::Storage(format!("migration v{} failed: {e}", migration.version))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(RigmateError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Component operations
    // -----------------------------------------------------------------------

    /// Upsert a component by its dedup key.
    ///
    /// On conflict the stored id, type, and first_seen are preserved; every
    /// other column takes the incoming value. Returns the id actually stored
    /// (the existing one when a concurrent writer got there first).
    pub async fn upsert_component(&self, component: &Component) -> Result<ComponentId> {
        self.check_writable()?;
        let key = DedupKey::of(component).storage_key();
        let specs_json = serde_json::to_string(&component.specs)
            .map_err(|e| RigmateError::Storage(e.to_string()))?;
        let (benchmark, gaming, productivity, ai) = scores_columns(component.scores.as_ref());

        self.conn
            .execute(
                "INSERT INTO components (
                   id, ctype, dedup_key, manufacturer, model, raw_name, description,
                   specs_json, price_dzd, benchmark_score, gaming_score,
                   productivity_score, ai_score, condition, source_url, location,
                   first_seen, last_seen)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
                 ON CONFLICT(ctype, dedup_key) DO UPDATE SET
                   manufacturer = excluded.manufacturer,
                   model = excluded.model,
                   raw_name = excluded.raw_name,
                   description = excluded.description,
                   specs_json = excluded.specs_json,
                   price_dzd = excluded.price_dzd,
                   benchmark_score = excluded.benchmark_score,
                   gaming_score = excluded.gaming_score,
                   productivity_score = excluded.productivity_score,
                   ai_score = excluded.ai_score,
                   condition = excluded.condition,
                   source_url = excluded.source_url,
                   location = excluded.location,
                   last_seen = excluded.last_seen",
                params![
                    component.id.as_str(),
                    component.ctype.as_str(),
                    key.as_str(),
                    component.manufacturer.as_deref(),
                    component.model.as_deref(),
                    component.raw_name.as_str(),
                    component.description.as_deref(),
                    specs_json.as_str(),
                    component.price_dzd as i64,
                    benchmark,
                    gaming,
                    productivity,
                    ai,
                    component.condition.map(condition_to_str),
                    component.source_url.as_str(),
                    component.location.as_deref(),
                    component.first_seen.to_rfc3339(),
                    component.last_seen.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| RigmateError::Storage(e.to_string()))?;

        // Resolve the surviving id for the key.
        let mut rows = self
            .conn
            .query(
                "SELECT id FROM components WHERE ctype = ?1 AND dedup_key = ?2",
                params![component.ctype.as_str(), key.as_str()],
            )
            .await
            .map_err(|e| RigmateError::Storage(e.to_string()))?;
        match rows.next().await {
            Ok(Some(row)) => {
                let id: String = row
                    .get(0)
                    .map_err(|e| RigmateError::Storage(e.to_string()))?;
                Ok(ComponentId(id))
            }
            _ => Ok(component.id.clone()),
        }
    }

    /// Get a component by id.
    pub async fn get_component(&self, id: &ComponentId) -> Result<Option<Component>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {COMPONENT_COLUMNS} FROM components WHERE id = ?1"),
                params![id.as_str()],
            )
            .await
            .map_err(|e| RigmateError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_component(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(RigmateError::Storage(e.to_string())),
        }
    }

    /// Load the whole catalog, ordered by id for stable snapshots.
    pub async fn load_catalog(&self) -> Result<Vec<Component>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {COMPONENT_COLUMNS} FROM components ORDER BY id"),
                params![],
            )
            .await
            .map_err(|e| RigmateError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_component(&row)?);
        }
        Ok(results)
    }

    /// List components of one category.
    pub async fn list_by_type(&self, ctype: ComponentType) -> Result<Vec<Component>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {COMPONENT_COLUMNS} FROM components WHERE ctype = ?1 ORDER BY id"
                ),
                params![ctype.as_str()],
            )
            .await
            .map_err(|e| RigmateError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_component(&row)?);
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Price history operations
    // -----------------------------------------------------------------------

    /// Append one price observation.
    pub async fn append_price_point(
        &self,
        id: &ComponentId,
        price_dzd: u64,
        observed_at: DateTime<Utc>,
    ) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "INSERT INTO price_history (component_id, price_dzd, observed_at)
                 VALUES (?1, ?2, ?3)",
                params![id.as_str(), price_dzd as i64, observed_at.to_rfc3339()],
            )
            .await
            .map_err(|e| RigmateError::Storage(e.to_string()))?;
        Ok(())
    }

    /// All price observations for a component, oldest first.
    pub async fn price_history(&self, id: &ComponentId) -> Result<Vec<PricePoint>> {
        let mut rows = self
            .conn
            .query(
                "SELECT price_dzd, observed_at FROM price_history
                 WHERE component_id = ?1 ORDER BY id",
                params![id.as_str()],
            )
            .await
            .map_err(|e| RigmateError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let price: i64 = row
                .get(0)
                .map_err(|e| RigmateError::Storage(e.to_string()))?;
            let observed_at: String = row
                .get(1)
                .map_err(|e| RigmateError::Storage(e.to_string()))?;
            results.push(PricePoint {
                price_dzd: price as u64,
                observed_at: parse_timestamp(&observed_at)?,
            });
        }
        Ok(results)
    }
}

const COMPONENT_COLUMNS: &str = "id, ctype, manufacturer, model, raw_name, description, \
     specs_json, price_dzd, benchmark_score, gaming_score, productivity_score, ai_score, \
     condition, source_url, location, first_seen, last_seen";

fn condition_to_str(condition: Condition) -> &'static str {
    match condition {
        Condition::New => "new",
        Condition::Used => "used",
        Condition::Refurbished => "refurbished",
    }
}

fn condition_from_str(s: &str) -> Option<Condition> {
    match s {
        "new" => Some(Condition::New),
        "used" => Some(Condition::Used),
        "refurbished" => Some(Condition::Refurbished),
        _ => None,
    }
}

fn scores_columns(scores: Option<&Scores>) -> (Option<i64>, Option<i64>, Option<i64>, Option<i64>) {
    match scores {
        Some(s) => (
            Some(i64::from(s.benchmark)),
            Some(i64::from(s.gaming)),
            Some(i64::from(s.productivity)),
            Some(i64::from(s.ai)),
        ),
        None => (None, None, None, None),
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RigmateError::Storage(format!("invalid date: {e}")))
}

/// Convert a database row to a [`Component`].
fn row_to_component(row: &libsql::Row) -> Result<Component> {
    let ctype_str: String = row
        .get(1)
        .map_err(|e| RigmateError::Storage(e.to_string()))?;
    let ctype: ComponentType = ctype_str
        .parse()
        .map_err(|_| RigmateError::Storage(format!("unknown component type {ctype_str:?}")))?;

    let specs_json: String = row
        .get(6)
        .map_err(|e| RigmateError::Storage(e.to_string()))?;
    let specs: Specs =
        serde_json::from_str(&specs_json).map_err(|e| RigmateError::Storage(e.to_string()))?;

    // Scores are all-or-none; the benchmark column decides.
    let scores = match row.get::<i64>(8).ok() {
        Some(benchmark) => Some(Scores {
            benchmark: benchmark as u8,
            gaming: row.get::<i64>(9).unwrap_or(0) as u8,
            productivity: row.get::<i64>(10).unwrap_or(0) as u8,
            ai: row.get::<i64>(11).unwrap_or(0) as u8,
        }),
        None => None,
    };

    Ok(Component {
        id: ComponentId(
            row.get::<String>(0)
                .map_err(|e| RigmateError::Storage(e.to_string()))?,
        ),
        ctype,
        manufacturer: row.get::<String>(2).ok(),
        model: row.get::<String>(3).ok(),
        raw_name: row
            .get::<String>(4)
            .map_err(|e| RigmateError::Storage(e.to_string()))?,
        description: row.get::<String>(5).ok(),
        specs,
        price_dzd: row
            .get::<i64>(7)
            .map_err(|e| RigmateError::Storage(e.to_string()))? as u64,
        scores,
        condition: row
            .get::<String>(12)
            .ok()
            .and_then(|s| condition_from_str(&s)),
        source_url: row
            .get::<String>(13)
            .map_err(|e| RigmateError::Storage(e.to_string()))?,
        location: row.get::<String>(14).ok(),
        first_seen: parse_timestamp(
            &row.get::<String>(15)
                .map_err(|e| RigmateError::Storage(e.to_string()))?,
        )?,
        last_seen: parse_timestamp(
            &row.get::<String>(16)
                .map_err(|e| RigmateError::Storage(e.to_string()))?,
        )?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigmate_shared::{SpecValue, spec_keys};
    use uuid::Uuid;

    /// Create a temp file storage for testing.
    async fn test_storage() -> Storage {
        let tmp = std::env::temp_dir().join(format!("rigmate_test_{}.db", Uuid::now_v7()));
        Storage::open(&tmp).await.expect("open test db")
    }

    fn cpu_component(id: &str) -> Component {
        let now = Utc::now();
        Component {
            id: ComponentId::from(id),
            ctype: ComponentType::Cpu,
            manufacturer: Some("AMD".into()),
            model: Some("Ryzen 5 5600X".into()),
            raw_name: "AMD Ryzen 5 5600X".into(),
            description: Some("6 cores".into()),
            specs: [(spec_keys::SOCKET.to_string(), SpecValue::Text("AM4".into()))].into(),
            price_dzd: 25_000,
            scores: Some(Scores::clamped(65.0, 79.0, 87.0, 69.0)),
            condition: Some(Condition::Used),
            source_url: "https://example.test/a".into(),
            location: Some("Alger".into()),
            first_seen: now,
            last_seen: now,
        }
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let storage = test_storage().await;
        let version = storage.get_schema_version().await;
        assert_eq!(version, 1);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!("rigmate_test_{}.db", Uuid::now_v7()));
        let _s1 = Storage::open(&tmp).await.expect("first open");
        drop(_s1);
        let s2 = Storage::open(&tmp).await.expect("second open");
        assert_eq!(s2.get_schema_version().await, 1);
    }

    #[tokio::test]
    async fn component_roundtrip() {
        let storage = test_storage().await;
        let component = cpu_component("ryzen-5-5600x-abc123");

        storage.upsert_component(&component).await.expect("upsert");

        let found = storage
            .get_component(&component.id)
            .await
            .expect("get")
            .expect("present");
        assert_eq!(found.manufacturer.as_deref(), Some("AMD"));
        assert_eq!(
            found.specs.get(spec_keys::SOCKET).and_then(SpecValue::as_text),
            Some("AM4")
        );
        assert_eq!(found.scores, component.scores);
        assert_eq!(found.condition, Some(Condition::Used));
        assert_eq!(found.price_dzd, 25_000);
    }

    #[tokio::test]
    async fn upsert_same_key_keeps_original_id() {
        let storage = test_storage().await;
        let first = cpu_component("ryzen-5-5600x-abc123");
        storage.upsert_component(&first).await.expect("insert");

        // Same dedup key under a different candidate id.
        let mut second = cpu_component("ryzen-5-5600x-zzz999");
        second.price_dzd = 23_000;
        let stored_id = storage.upsert_component(&second).await.expect("upsert");

        assert_eq!(stored_id, first.id);
        let found = storage
            .get_component(&first.id)
            .await
            .unwrap()
            .expect("row survives under original id");
        assert_eq!(found.price_dzd, 23_000);
        assert_eq!(storage.load_catalog().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unscored_component_stays_unscored() {
        let storage = test_storage().await;
        let mut component = cpu_component("mystery-cpu-111111");
        component.manufacturer = None;
        component.model = None;
        component.scores = None;
        storage.upsert_component(&component).await.unwrap();

        let found = storage
            .get_component(&component.id)
            .await
            .unwrap()
            .expect("present");
        assert!(found.scores.is_none());
    }

    #[tokio::test]
    async fn list_by_type_filters() {
        let storage = test_storage().await;
        storage
            .upsert_component(&cpu_component("cpu-a-000001"))
            .await
            .unwrap();

        let cpus = storage.list_by_type(ComponentType::Cpu).await.unwrap();
        assert_eq!(cpus.len(), 1);
        let gpus = storage.list_by_type(ComponentType::Gpu).await.unwrap();
        assert!(gpus.is_empty());
    }

    #[tokio::test]
    async fn price_history_appends_in_order() {
        let storage = test_storage().await;
        let component = cpu_component("cpu-hist-000001");
        storage.upsert_component(&component).await.unwrap();

        storage
            .append_price_point(&component.id, 25_000, Utc::now())
            .await
            .expect("first point");
        storage
            .append_price_point(&component.id, 23_000, Utc::now())
            .await
            .expect("second point");

        let points = storage.price_history(&component.id).await.expect("history");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].price_dzd, 25_000);
        assert_eq!(points[1].price_dzd, 23_000);
    }

    #[tokio::test]
    async fn readonly_rejects_writes() {
        let tmp = std::env::temp_dir().join(format!("rigmate_test_{}.db", Uuid::now_v7()));
        let rw = Storage::open(&tmp).await.unwrap();
        rw.upsert_component(&cpu_component("cpu-ro-000001"))
            .await
            .unwrap();
        drop(rw);

        let ro = Storage::open_readonly(&tmp).await.unwrap();
        let result = ro.upsert_component(&cpu_component("cpu-ro-000002")).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("read-only"));
    }
}
