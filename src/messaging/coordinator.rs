//! Coordinator: background-context logic
//!
//! Initializes storage on install, forwards context-menu saves to the
//! page, and persists terms sent by other contexts. A send that finds no
//! listener in the tab re-injects it, waits, and retries exactly once; if
//! that fails too the message is dropped with a warning.

use crate::config::TimingConfig;
use crate::error::{TransportError, VocabError};
use crate::messaging::{ContextMenuItem, Message, Response, TabId, TabMessenger, Timer, CONTEXT_MENU_ID};
use crate::terms::{TermMap, TermStorage};

pub struct Coordinator<S, M, T> {
    storage: S,
    messenger: M,
    timer: T,
    timing: TimingConfig,
}

impl<S, M, T> Coordinator<S, M, T>
where
    S: TermStorage,
    M: TabMessenger,
    T: Timer,
{
    pub fn new(storage: S, messenger: M, timer: T, timing: TimingConfig) -> Self {
        Self {
            storage,
            messenger,
            timer,
            timing,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub fn context_menu_item(&self) -> ContextMenuItem {
        ContextMenuItem::default()
    }

    /// Create the empty term record if none exists. Returns true if created.
    pub async fn on_installed(&self) -> Result<bool, VocabError> {
        if self.storage.get_terms().await?.is_some() {
            return Ok(false);
        }
        self.storage.set_terms(&TermMap::new()).await?;
        log::info!("[Coordinator] initialized empty term record");
        Ok(true)
    }

    /// Context-menu click: ask the page to open the entry surface.
    /// Returns whether the page received the request.
    pub async fn on_context_menu(&self, menu_item_id: &str, tab: TabId, selection: &str) -> bool {
        if menu_item_id != CONTEXT_MENU_ID || selection.is_empty() {
            return false;
        }
        log::debug!("[Coordinator] context menu save for '{}'", selection);

        let message = Message::ShowDefinitionPopup {
            term: selection.to_string(),
        };
        match self.send_with_retry(tab, &message).await {
            Ok(_) => true,
            Err(e) => {
                log::warn!("[Coordinator] dropped definition request for tab {}: {}", tab, e);
                false
            }
        }
    }

    /// Send; on "no receiver" inject the listener, wait, retry once
    pub async fn send_with_retry(&self, tab: TabId, message: &Message) -> Result<Option<Response>, TransportError> {
        match self.messenger.send_to_tab(tab, message).await {
            Err(TransportError::NoReceiver(reason)) => {
                log::warn!("[Coordinator] no listener in tab {} ({}), re-injecting", tab, reason);
                self.messenger.inject_listener(tab).await?;
                self.timer.sleep(self.timing.reinject_retry_delay_ms).await;
                self.messenger.send_to_tab(tab, message).await
            }
            other => other,
        }
    }

    /// Handle a message addressed to the background. `None` for actions
    /// handled elsewhere.
    pub async fn handle_message(&self, message: &Message) -> Option<Response> {
        match message {
            Message::SaveTerm { term, definition } => Some(match self.save_term(term, definition).await {
                Ok(()) => Response::ok(),
                Err(e) => {
                    log::error!("[Coordinator] failed to save '{}': {}", term, e);
                    Response::failure(e.to_string())
                }
            }),
            Message::ShowDefinitionPopup { .. } | Message::RescanPage => None,
        }
    }

    /// Read, insert, write back. A blank definition is a no-op.
    pub async fn save_term(&self, term: &str, definition: &str) -> Result<(), VocabError> {
        if term.is_empty() {
            return Err(VocabError::Message("term must not be empty".to_string()));
        }
        if definition.trim().is_empty() {
            log::debug!("[Coordinator] ignored blank definition for '{}'", term);
            return Ok(());
        }
        let mut terms = self.storage.get_terms().await?.unwrap_or_default();
        terms.insert(term.to_string(), definition.to_string());
        self.storage.set_terms(&terms).await?;
        log::info!("[Coordinator] saved term '{}'", term);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
