//! User Records and Store Statistics
//!
//! `UserRecord` is the only persisted entity. `AggregateStats` mirrors the
//! `dbStats` reply of the backing store and is never written.

use bson::{oid::ObjectId, Bson, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{BotError, BotResult};

/// Identity of the user issuing a command, as supplied by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub chat_id: i64,
}

impl CallerIdentity {
    pub fn new(user_id: i64, first_name: &str, chat_id: i64) -> Self {
        Self {
            user_id,
            username: None,
            first_name: first_name.to_string(),
            last_name: None,
            chat_id,
        }
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn with_last_name(mut self, last_name: &str) -> Self {
        self.last_name = Some(last_name.to_string());
        self
    }
}

/// One stored message plus the identity of its author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub message: String,
    pub chat_id: i64,
    /// Absent on documents written before insert timestamps were recorded
    #[serde(default, with = "optional_bson_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// `Option<DateTime<Utc>>` stored as a BSON datetime; missing or null reads as `None`
mod optional_bson_datetime {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.map(bson::DateTime::from_chrono).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(Option::<bson::DateTime>::deserialize(deserializer)?.map(|dt| dt.to_chrono()))
    }
}

impl UserRecord {
    /// Build a new record for `caller`, stamped with the current time
    pub fn new(caller: &CallerIdentity, message: &str) -> Self {
        Self {
            id: None,
            user_id: caller.user_id,
            username: caller.username.clone(),
            first_name: caller.first_name.clone(),
            last_name: caller.last_name.clone(),
            message: message.to_string(),
            chat_id: caller.chat_id,
            created_at: Some(Utc::now()),
        }
    }
}

/// A numeric value reported by the store, kept in the representation it arrived in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue {
    Int(i64),
    Float(f64),
}

impl StatValue {
    fn from_bson(field: &str, value: &Bson) -> BotResult<Self> {
        match value {
            Bson::Int32(v) => Ok(Self::Int(i64::from(*v))),
            Bson::Int64(v) => Ok(Self::Int(*v)),
            Bson::Double(v) => Ok(Self::Float(*v)),
            other => Err(BotError::StoreError(format!(
                "dbStats field '{}' is not numeric: {}",
                field, other
            ))),
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Int(v) => write!(f, "{}", v),
            StatValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for StatValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// Database-level storage summary
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStats {
    pub data_size: StatValue,
    pub storage_size: StatValue,
    pub index_size: StatValue,
    pub object_count: StatValue,
    pub collection_count: StatValue,
    pub avg_object_size: StatValue,
}

impl AggregateStats {
    /// Read the six reported fields out of a `dbStats` reply
    pub fn from_db_stats(doc: &Document) -> BotResult<Self> {
        let field = |name: &str| -> BotResult<StatValue> {
            let value = doc.get(name).ok_or_else(|| {
                BotError::StoreError(format!("dbStats reply is missing '{}'", name))
            })?;
            StatValue::from_bson(name, value)
        };

        Ok(Self {
            data_size: field("dataSize")?,
            storage_size: field("storageSize")?,
            index_size: field("indexSize")?,
            object_count: field("objects")?,
            collection_count: field("collections")?,
            avg_object_size: field("avgObjSize")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_record_copies_caller_identity() {
        let caller = CallerIdentity::new(7, "Ada", 99)
            .with_username("ada")
            .with_last_name("Lovelace");
        let record = UserRecord::new(&caller, "notes");

        assert_eq!(record.user_id, 7);
        assert_eq!(record.chat_id, 99);
        assert_eq!(record.username.as_deref(), Some("ada"));
        assert_eq!(record.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(record.message, "notes");
        assert!(record.id.is_none());
    }

    #[test]
    fn test_record_document_shape() {
        let caller = CallerIdentity::new(7, "Ada", 99);
        let record = UserRecord::new(&caller, "notes");
        let doc = bson::to_document(&record).unwrap();

        assert!(!doc.contains_key("_id"));
        assert_eq!(doc.get_i64("user_id").unwrap(), 7);
        assert_eq!(doc.get_str("message").unwrap(), "notes");
        assert!(doc.get_datetime("created_at").is_ok());
        assert_eq!(doc.get("username"), Some(&Bson::Null));
    }

    #[test]
    fn test_record_without_timestamp_deserializes() {
        let id = ObjectId::new();
        let legacy = doc! {
            "_id": id,
            "user_id": 1001_i64,
            "username": "alice",
            "first_name": "Alice",
            "last_name": Bson::Null,
            "message": "hello world",
            "chat_id": 5001_i32,
        };
        let record: UserRecord = bson::from_document(legacy).unwrap();

        assert_eq!(record.id, Some(id));
        assert_eq!(record.message, "hello world");
        assert_eq!(record.chat_id, 5001);
        assert!(record.last_name.is_none());
        assert!(record.created_at.is_none());
    }

    #[test]
    fn test_record_timestamp_round_trips() {
        let caller = CallerIdentity::new(7, "Ada", 99);
        let record = UserRecord::new(&caller, "notes");
        let doc = bson::to_document(&record).unwrap();
        let back: UserRecord = bson::from_document(doc).unwrap();

        let millis = |r: &UserRecord| r.created_at.map(|t| t.timestamp_millis());
        assert!(back.created_at.is_some());
        assert_eq!(millis(&back), millis(&record));
    }

    #[test]
    fn test_stats_from_mixed_numeric_types() {
        let reply = doc! {
            "db": "mydatabase",
            "collections": 1_i32,
            "objects": 3_i64,
            "avgObjSize": 120.5,
            "dataSize": 361.5,
            "storageSize": 20480_i32,
            "indexSize": 40960_i64,
            "ok": 1.0,
        };
        let stats = AggregateStats::from_db_stats(&reply).unwrap();

        assert_eq!(stats.collection_count, StatValue::Int(1));
        assert_eq!(stats.object_count, StatValue::Int(3));
        assert_eq!(stats.avg_object_size, StatValue::Float(120.5));
        assert_eq!(stats.storage_size.to_string(), "20480");
        assert_eq!(stats.data_size.to_string(), "361.5");
    }

    #[test]
    fn test_stats_missing_field_is_store_error() {
        let reply = doc! { "dataSize": 1_i32 };
        let err = AggregateStats::from_db_stats(&reply).unwrap_err();
        assert!(matches!(err, BotError::StoreError(_)));
    }

    #[test]
    fn test_stats_non_numeric_field_is_store_error() {
        let reply = doc! {
            "collections": "one",
            "objects": 0_i32,
            "avgObjSize": 0_i32,
            "dataSize": 0_i32,
            "storageSize": 0_i32,
            "indexSize": 0_i32,
        };
        let err = AggregateStats::from_db_stats(&reply).unwrap_err();
        assert!(err.to_string().contains("collections"));
    }
}
