//! Command Handlers
//!
//! `/start`, `/store`, `/get_data` and `/usage`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::error::{BotError, BotResult};
use crate::format;
use crate::record::{CallerIdentity, UserRecord};
use crate::router::{CommandHandler, CommandRouter};
use crate::store::RecordStore;

/// Build the router with every bot command wired to `store`
pub fn build_router(store: Arc<dyn RecordStore>) -> CommandRouter {
    CommandRouter::new()
        .register(Arc::new(StartHandler))
        .register(Arc::new(StoreHandler::new(Arc::clone(&store))))
        .register(Arc::new(GetDataHandler::new(Arc::clone(&store))))
        .register(Arc::new(UsageHandler::new(store)))
}

/// `/start`: static greeting
pub struct StartHandler;

#[async_trait]
impl CommandHandler for StartHandler {
    fn name(&self) -> &'static str {
        "start"
    }

    fn description(&self) -> &'static str {
        "Show the welcome message"
    }

    async fn handle(&self, caller: &CallerIdentity, _args: &[String]) -> BotResult<String> {
        Ok(format::greeting(&caller.first_name))
    }
}

/// `/store <text>`: persist a record
pub struct StoreHandler {
    store: Arc<dyn RecordStore>,
}

impl StoreHandler {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler for StoreHandler {
    fn name(&self) -> &'static str {
        "store"
    }

    fn description(&self) -> &'static str {
        "Save a message: /store <text>"
    }

    async fn handle(&self, caller: &CallerIdentity, args: &[String]) -> BotResult<String> {
        let text = args.join(" ");
        if text.is_empty() {
            return Err(BotError::MissingArgument("text"));
        }

        let record = UserRecord::new(caller, &text);
        self.store.insert(record).await?;
        info!("Stored record for user {} ({} bytes)", caller.user_id, text.len());

        Ok(format::store_confirmation(&caller.first_name, &text))
    }
}

/// `/get_data`: show the caller's latest record
pub struct GetDataHandler {
    store: Arc<dyn RecordStore>,
}

impl GetDataHandler {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler for GetDataHandler {
    fn name(&self) -> &'static str {
        "get_data"
    }

    fn description(&self) -> &'static str {
        "Show your most recently stored message"
    }

    async fn handle(&self, caller: &CallerIdentity, _args: &[String]) -> BotResult<String> {
        let record = self
            .store
            .find_latest(caller.user_id)
            .await?
            .ok_or(BotError::RecordNotFound(caller.user_id))?;

        Ok(format::format_record(&record))
    }
}

/// `/usage`: database storage statistics
pub struct UsageHandler {
    store: Arc<dyn RecordStore>,
}

impl UsageHandler {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler for UsageHandler {
    fn name(&self) -> &'static str {
        "usage"
    }

    fn description(&self) -> &'static str {
        "Show database storage usage"
    }

    async fn handle(&self, _caller: &CallerIdentity, _args: &[String]) -> BotResult<String> {
        let stats = self.store.stats().await?;
        Ok(format::format_stats(&stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRecordStore;

    fn caller() -> CallerIdentity {
        CallerIdentity::new(5, "Grace", 50).with_username("grace")
    }

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn test_start_greets_by_first_name() {
        let reply = StartHandler.handle(&caller(), &[]).await.unwrap();
        assert!(reply.starts_with("Hello Grace,"));
    }

    #[tokio::test]
    async fn test_store_empty_text_does_not_insert() {
        let store = Arc::new(MemoryRecordStore::new());
        let handler = StoreHandler::new(store.clone());

        let err = handler.handle(&caller(), &[]).await.unwrap_err();
        assert_eq!(err, BotError::MissingArgument("text"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_store_persists_caller_identity() {
        let store = Arc::new(MemoryRecordStore::new());
        let handler = StoreHandler::new(store.clone());

        let reply = handler.handle(&caller(), &args(&["hello", "world"])).await.unwrap();
        assert_eq!(reply, "Thank you, Grace! Your message \"hello world\" has been saved.");

        let saved = store.records_for(5);
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].message, "hello world");
        assert_eq!(saved[0].chat_id, 50);
        assert_eq!(saved[0].username.as_deref(), Some("grace"));
    }

    #[tokio::test]
    async fn test_get_data_not_found() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        let err = GetDataHandler::new(store).handle(&caller(), &[]).await.unwrap_err();
        assert_eq!(err, BotError::RecordNotFound(5));
    }

    #[tokio::test]
    async fn test_usage_reports_stats() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        let reply = UsageHandler::new(store).handle(&caller(), &[]).await.unwrap();
        assert!(reply.contains("Document Count: 0"));
    }

    #[test]
    fn test_router_lists_all_commands() {
        let router = build_router(Arc::new(MemoryRecordStore::new()));
        let names: Vec<_> = router.commands().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["start", "store", "get_data", "usage"]);
    }
}
