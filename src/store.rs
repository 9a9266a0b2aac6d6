//! Record Store
//!
//! Insert / latest-lookup / stats over a document collection.
//! `MongoRecordStore` talks to MongoDB; `MemoryRecordStore` keeps records in
//! process and backs the tests and `--in-memory` runs.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use parking_lot::Mutex;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{BotError, BotResult};
use crate::record::{AggregateStats, StatValue, UserRecord};

/// Storage capability used by the command handlers
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append a record. Several records per user may coexist.
    async fn insert(&self, record: UserRecord) -> BotResult<()>;

    /// Most recently stored record for `user_id`
    async fn find_latest(&self, user_id: i64) -> BotResult<Option<UserRecord>>;

    /// Database-level storage summary
    async fn stats(&self) -> BotResult<AggregateStats>;

    /// Release the underlying connection
    async fn shutdown(&self) {}
}

/// MongoDB-backed store
pub struct MongoRecordStore {
    client: Client,
    database: Database,
    collection: Collection<UserRecord>,
}

impl MongoRecordStore {
    /// Connect, verify the server answers, and ensure the lookup index exists
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let uri = config.require_mongo_uri()?;

        let mut options = ClientOptions::parse(uri).await?;
        options.app_name = Some("recordbot".to_string());
        options.server_selection_timeout =
            Some(Duration::from_secs(config.server_selection_timeout_secs));

        let client = Client::with_options(options)?;
        let database = client.database(&config.database_name);
        let collection = database.collection::<UserRecord>(&config.collection_name);

        database.run_command(doc! { "ping": 1 }).await?;
        info!(
            "MongoDB reachable: database={}, collection={}",
            config.database_name, config.collection_name
        );

        let index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "created_at": -1 })
            .build();
        collection.create_index(index).await?;
        debug!("Ensured index on user_id/created_at");

        Ok(Self {
            client,
            database,
            collection,
        })
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    async fn insert(&self, record: UserRecord) -> BotResult<()> {
        let result = self.collection.insert_one(&record).await?;
        debug!("Inserted record {:?} for user {}", result.inserted_id, record.user_id);
        Ok(())
    }

    async fn find_latest(&self, user_id: i64) -> BotResult<Option<UserRecord>> {
        let record = self
            .collection
            .find_one(doc! { "user_id": user_id })
            .sort(doc! { "created_at": -1, "_id": -1 })
            .await?;
        Ok(record)
    }

    async fn stats(&self) -> BotResult<AggregateStats> {
        let reply: Document = self.database.run_command(doc! { "dbStats": 1 }).await?;
        AggregateStats::from_db_stats(&reply)
    }

    async fn shutdown(&self) {
        self.client.clone().shutdown().await;
        info!("MongoDB client shut down");
    }
}

/// In-process store. Records are kept in insertion order.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<UserRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// All records stored for `user_id`, oldest first
    pub fn records_for(&self, user_id: i64) -> Vec<UserRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, mut record: UserRecord) -> BotResult<()> {
        record.id.get_or_insert_with(ObjectId::new);
        self.records.lock().push(record);
        Ok(())
    }

    async fn find_latest(&self, user_id: i64) -> BotResult<Option<UserRecord>> {
        let records = self.records.lock();
        Ok(records.iter().rev().find(|r| r.user_id == user_id).cloned())
    }

    async fn stats(&self) -> BotResult<AggregateStats> {
        let records = self.records.lock();
        let mut data_size: i64 = 0;
        for record in records.iter() {
            let bytes = bson::to_vec(record)
                .map_err(|e| BotError::StoreError(format!("encode failed: {}", e)))?;
            data_size += bytes.len() as i64;
        }

        let objects = records.len() as i64;
        let avg = if objects == 0 {
            0.0
        } else {
            data_size as f64 / objects as f64
        };

        Ok(AggregateStats {
            data_size: StatValue::Int(data_size),
            storage_size: StatValue::Int(data_size),
            index_size: StatValue::Int(0),
            object_count: StatValue::Int(objects),
            collection_count: StatValue::Int(if objects == 0 { 0 } else { 1 }),
            avg_object_size: StatValue::Float(avg),
        })
    }
}
