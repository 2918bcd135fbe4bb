use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use ocrelay_commands::{ChatContext, ContextKey};

/// Per-conversation [`ChatContext`]s, keyed by platform and conversation.
///
/// Conversations without an entry read as the default (no active session);
/// only non-default contexts are kept.
#[derive(Debug, Default)]
pub struct ContextStore {
    contexts: DashMap<ContextKey, ChatContext>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the context for `key`.
    pub fn load(&self, key: &ContextKey) -> ChatContext {
        self.contexts
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Write back the context returned from a dispatch.
    pub fn save(&self, key: ContextKey, context: ChatContext) {
        if context == ChatContext::default() {
            if self.contexts.remove(&key).is_some() {
                debug!(context = %key, "context reset");
            }
        } else {
            self.contexts.insert(key, context);
        }
    }

    /// Write `updated` only if the stored context still equals `expected`.
    ///
    /// Returns false, leaving the entry alone, when another dispatch for the
    /// same conversation wrote first.
    pub fn compare_and_save(
        &self,
        key: ContextKey,
        expected: &ChatContext,
        updated: ChatContext,
    ) -> bool {
        let is_default = updated == ChatContext::default();
        match self.contexts.entry(key) {
            Entry::Occupied(entry) if entry.get() != expected => {
                debug!(context = %entry.key(), "context changed concurrently; keeping newer");
                false
            }
            Entry::Occupied(entry) if is_default => {
                entry.remove();
                true
            }
            Entry::Occupied(mut entry) => {
                entry.insert(updated);
                true
            }
            Entry::Vacant(entry) if *expected != ChatContext::default() => {
                debug!(context = %entry.key(), "context cleared concurrently; keeping newer");
                false
            }
            Entry::Vacant(_) if is_default => true,
            Entry::Vacant(entry) => {
                entry.insert(updated);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
