//! Response Formatting
//!
//! Pure functions turning records and stats into reply text.

use crate::record::{AggregateStats, UserRecord};

/// Telegram rejects messages above 4096 characters; stay below it
pub const MAX_MESSAGE_LEN: usize = 4000;

/// Greeting for `/start`
pub fn greeting(first_name: &str) -> String {
    format!(
        "Hello {}, welcome to the bot! You can store data with /store, \
        retrieve data with /get_data, or check usage with /usage.",
        first_name
    )
}

/// Confirmation after a successful `/store`
pub fn store_confirmation(first_name: &str, message: &str) -> String {
    format!(
        "Thank you, {}! Your message \"{}\" has been saved.",
        first_name, message
    )
}

/// Stored record as `key: value` lines
pub fn format_record(record: &UserRecord) -> String {
    let mut lines = vec!["Here is your stored data:".to_string()];

    if let Some(id) = &record.id {
        lines.push(format!("id: {}", quote(&id.to_hex())));
    }
    lines.push(format!("user_id: {}", record.user_id));
    lines.push(format!("username: {}", quote_opt(record.username.as_deref())));
    lines.push(format!("first_name: {}", quote(&record.first_name)));
    lines.push(format!("last_name: {}", quote_opt(record.last_name.as_deref())));
    lines.push(format!("message: {}", quote(&record.message)));
    lines.push(format!("chat_id: {}", record.chat_id));
    let stored_at = record
        .created_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    lines.push(format!("stored_at: {}", quote_opt(stored_at.as_deref())));

    lines.join("\n")
}

/// Storage summary for `/usage`
pub fn format_stats(stats: &AggregateStats) -> String {
    format!(
        "Database Usage Info:\n\n\
        Data Size: {} bytes\n\
        Storage Size: {} bytes\n\
        Total Index Size: {} bytes\n\
        Document Count: {}\n\
        Collection Count: {}\n\
        Avg. Object Size: {} bytes",
        stats.data_size,
        stats.storage_size,
        stats.index_size,
        stats.object_count,
        stats.collection_count,
        stats.avg_object_size,
    )
}

/// Split `text` into pieces of at most `MAX_MESSAGE_LEN` bytes without breaking UTF-8
pub fn chunk_message(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let split_at = remaining
            .char_indices()
            .take_while(|(i, c)| i + c.len_utf8() <= MAX_MESSAGE_LEN)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(remaining.len());
        let (chunk, rest) = remaining.split_at(split_at);
        chunks.push(chunk.to_string());
        remaining = rest;
    }
    chunks
}

fn quote(s: &str) -> String {
    // serde_json escapes quotes and control characters for us
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

fn quote_opt(s: Option<&str>) -> String {
    s.map(quote).unwrap_or_else(|| "null".to_string())
}
