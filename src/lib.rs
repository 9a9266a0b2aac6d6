//! RecordBot
//!
//! Telegram bot that stores user-submitted messages in MongoDB and reports
//! storage usage back to the user.
//!
//! # Commands
//!
//! - `/start`: greeting and command list
//! - `/store <text>`: save a message
//! - `/get_data`: show your most recent message
//! - `/usage`: database storage statistics
//!
//! # Architecture
//!
//! ```text
//! Telegram ──► Dispatcher ──► CommandRouter ──► CommandHandler ──► RecordStore
//!  (polling)                   (name table)      (start/store/...)   (MongoDB / memory)
//!                                                      │
//!                                                      └── format (reply text)
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod handlers;
pub mod logging;
pub mod record;
pub mod router;
pub mod store;
pub mod telegram;

pub use config::Config;
pub use error::{BotError, BotResult};
pub use handlers::build_router;
pub use record::{AggregateStats, CallerIdentity, StatValue, UserRecord};
pub use router::{CommandHandler, CommandInvocation, CommandRouter};
pub use store::{MemoryRecordStore, MongoRecordStore, RecordStore};
