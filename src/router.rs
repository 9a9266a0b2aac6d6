//! Command Router
//!
//! Parses `/command args` text and dispatches it to the handler registered
//! under that name. Unknown commands yield no reply.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::BotResult;
use crate::record::CallerIdentity;

/// A parsed inbound command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// Command name without the leading slash or bot mention
    pub name: String,
    /// Whitespace-separated argument tokens
    pub args: Vec<String>,
}

impl CommandInvocation {
    /// Parse message text as a command.
    ///
    /// Returns `None` for plain text and for commands addressed to a different
    /// bot (`/cmd@OtherBot`). A mention is accepted when it matches
    /// `bot_username`, compared case-insensitively.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let head = tokens.next()?.strip_prefix('/')?;

        let name = match head.split_once('@') {
            Some((name, mention)) => {
                let ours = bot_username
                    .map(|u| u.eq_ignore_ascii_case(mention))
                    .unwrap_or(false);
                if !ours {
                    return None;
                }
                name
            }
            None => head,
        };

        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            args: tokens.map(str::to_string).collect(),
        })
    }

    /// Arguments joined by single spaces
    pub fn joined_args(&self) -> String {
        self.args.join(" ")
    }
}

/// A bot command capability
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Command name as typed after the slash
    fn name(&self) -> &'static str;

    /// One-line description for the command menu
    fn description(&self) -> &'static str;

    /// Produce the reply text for `caller`
    async fn handle(&self, caller: &CallerIdentity, args: &[String]) -> BotResult<String>;
}

/// Static name -> handler table
#[derive(Default)]
pub struct CommandRouter {
    handlers: Vec<Arc<dyn CommandHandler>>,
    by_name: HashMap<&'static str, usize>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. A later registration under the same name replaces the earlier one.
    pub fn register(mut self, handler: Arc<dyn CommandHandler>) -> Self {
        let name = handler.name();
        match self.by_name.get(name) {
            Some(&idx) => self.handlers[idx] = handler,
            None => {
                self.by_name.insert(name, self.handlers.len());
                self.handlers.push(handler);
            }
        }
        self
    }

    /// Registered `(name, description)` pairs in registration order
    pub fn commands(&self) -> Vec<(&'static str, &'static str)> {
        self.handlers
            .iter()
            .map(|h| (h.name(), h.description()))
            .collect()
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Run the matching handler and return its reply.
    ///
    /// Handler errors are converted into their user-facing reply here.
    pub async fn dispatch(
        &self,
        invocation: &CommandInvocation,
        caller: &CallerIdentity,
    ) -> Option<String> {
        let Some(&idx) = self.by_name.get(invocation.name.as_str()) else {
            debug!("Ignoring unknown command /{}", invocation.name);
            return None;
        };
        let handler = &self.handlers[idx];

        info!(
            "Dispatching /{}: user={}, chat={}, args={}",
            invocation.name,
            caller.user_id,
            caller.chat_id,
            invocation.args.len()
        );

        match handler.handle(caller, &invocation.args).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                if e.is_store_fault() {
                    warn!("/{} failed for user {}: {}", invocation.name, caller.user_id, e);
                } else {
                    debug!("/{} rejected for user {}: {}", invocation.name, caller.user_id, e);
                }
                Some(e.user_reply().to_string())
            }
        }
    }

    /// Parse `text` and dispatch it
    pub async fn dispatch_text(
        &self,
        text: &str,
        bot_username: Option<&str>,
        caller: &CallerIdentity,
    ) -> Option<String> {
        let invocation = CommandInvocation::parse(text, bot_username)?;
        self.dispatch(&invocation, caller).await
    }
}
