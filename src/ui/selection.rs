//! SelectionFlow: selection -> "Note" affordance -> definition entry
//!
//! ```text
//! Idle --release--> Selecting --settled(text)--> NoteVisible
//!   ^                   |                            | activate
//!   |               settled("")                      v
//!   +----- save / dismiss / press outside ---- DefinitionEntry
//! ```
//!
//! Every input returns the effects the host must carry out, in order.
//! Timers are the host's job: `ScheduleSettle` asks for a later
//! `selection_settled`, `ScheduleNoteTimeout` for a later `note_expired`,
//! and `OpenEntry` is rendered after its `open_delay_ms`.

use serde::{Deserialize, Serialize};

use crate::config::{GeometryConfig, TimingConfig, VocabConfig};
use crate::terms::TermStore;
use crate::ui::tooltip::{Point, Viewport};

// =============================================================================
// Types
// =============================================================================

/// Snapshot of the page selection once it has settled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionContext {
    /// Selected text, untrimmed
    pub text: String,
    /// Pointer position at release
    pub pointer: Point,
    /// Host clock (ms)
    pub now_ms: f64,
    /// Release happened inside the entry surface
    #[serde(default)]
    pub inside_entry: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum FlowState {
    Idle,
    Selecting,
    #[serde(rename_all = "camelCase")]
    NoteVisible {
        text: String,
        pointer: Point,
        expires_at_ms: f64,
    },
    #[serde(rename_all = "camelCase")]
    DefinitionEntry { term: String, anchor: Point },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "camelCase")]
pub enum FlowEffect {
    #[serde(rename_all = "camelCase")]
    ScheduleSettle { delay_ms: u32 },
    ShowNote { text: String, position: Point },
    HideNote,
    #[serde(rename_all = "camelCase")]
    ScheduleNoteTimeout { delay_ms: u32, expires_at_ms: f64 },
    #[serde(rename_all = "camelCase")]
    OpenEntry {
        term: String,
        /// Existing definition for the exact term, if any
        prefill: Option<String>,
        position: Point,
        /// Wait before rendering; keeps the click that hid the note from
        /// reaching the new surface
        open_delay_ms: u32,
        focus_delay_ms: u32,
    },
    CloseEntry,
    CommitTerm { term: String, definition: String },
}

/// Entry surface below the anchor, clamped to the right edge and flipped
/// above when it would overflow the bottom
pub fn place_entry(anchor: Point, viewport: Viewport, geometry: &GeometryConfig) -> Point {
    let mut x = anchor.x;
    let mut y = anchor.y + geometry.entry_offset_y;

    if x + geometry.entry_width > viewport.width {
        x = viewport.width - geometry.entry_edge_margin;
    }
    if y + geometry.entry_height > viewport.height {
        y = anchor.y - geometry.entry_flip_y;
    }
    Point::new(x, y)
}

// =============================================================================
// SelectionFlow
// =============================================================================

#[derive(Debug, Clone)]
pub struct SelectionFlow {
    state: FlowState,
    /// Last settled selection (trimmed), kept across states
    last_text: String,
    timing: TimingConfig,
    geometry: GeometryConfig,
}

impl Default for SelectionFlow {
    fn default() -> Self {
        Self::new(&VocabConfig::default())
    }
}

impl SelectionFlow {
    pub fn new(config: &VocabConfig) -> Self {
        Self {
            state: FlowState::Idle,
            last_text: String::new(),
            timing: config.timing,
            geometry: config.geometry,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn is_entry_open(&self) -> bool {
        matches!(self.state, FlowState::DefinitionEntry { .. })
    }

    pub fn is_note_visible(&self) -> bool {
        matches!(self.state, FlowState::NoteVisible { .. })
    }

    /// Pointer released anywhere on the page
    pub fn pointer_released(&mut self) -> Vec<FlowEffect> {
        match self.state {
            FlowState::DefinitionEntry { .. } => Vec::new(),
            FlowState::NoteVisible { .. } => vec![self.settle_effect()],
            FlowState::Idle | FlowState::Selecting => {
                self.state = FlowState::Selecting;
                vec![self.settle_effect()]
            }
        }
    }

    fn settle_effect(&self) -> FlowEffect {
        FlowEffect::ScheduleSettle {
            delay_ms: self.timing.selection_debounce_ms,
        }
    }

    /// Selection read after the debounce
    pub fn selection_settled(&mut self, ctx: &SelectionContext) -> Vec<FlowEffect> {
        if ctx.inside_entry || self.is_entry_open() {
            return Vec::new();
        }

        let text = ctx.text.trim();
        let note_visible = self.is_note_visible();
        if note_visible && text == self.last_text {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if note_visible {
            effects.push(FlowEffect::HideNote);
        }
        self.last_text = text.to_string();

        if text.is_empty() {
            self.state = FlowState::Idle;
            return effects;
        }

        let expires_at_ms = ctx.now_ms + f64::from(self.timing.note_timeout_ms);
        effects.push(FlowEffect::ShowNote {
            text: text.to_string(),
            position: Point::new(ctx.pointer.x, ctx.pointer.y + self.geometry.note_offset_y),
        });
        effects.push(FlowEffect::ScheduleNoteTimeout {
            delay_ms: self.timing.note_timeout_ms,
            expires_at_ms,
        });
        self.state = FlowState::NoteVisible {
            text: text.to_string(),
            pointer: ctx.pointer,
            expires_at_ms,
        };
        effects
    }

    /// Note timer fired; stale timers (note replaced since) are ignored
    pub fn note_expired(&mut self, now_ms: f64) -> Vec<FlowEffect> {
        match self.state {
            FlowState::NoteVisible { expires_at_ms, .. } if now_ms >= expires_at_ms => {
                self.state = FlowState::Idle;
                vec![FlowEffect::HideNote]
            }
            _ => Vec::new(),
        }
    }

    /// User pressed the note: swap it for the entry surface
    pub fn activate_note(&mut self, store: &TermStore, viewport: Viewport) -> Vec<FlowEffect> {
        let (text, pointer) = match &self.state {
            FlowState::NoteVisible { text, pointer, .. } => (text.clone(), *pointer),
            _ => return Vec::new(),
        };
        let delay = self.timing.note_activation_delay_ms;
        let mut effects = vec![FlowEffect::HideNote];
        effects.extend(self.enter(text, pointer, delay, store, viewport));
        effects
    }

    /// Open the entry surface for `term` directly (context-menu path)
    pub fn open_entry(&mut self, term: &str, anchor: Point, store: &TermStore, viewport: Viewport) -> Vec<FlowEffect> {
        match self.state {
            FlowState::DefinitionEntry { .. } => Vec::new(),
            FlowState::NoteVisible { .. } => {
                let mut effects = vec![FlowEffect::HideNote];
                effects.extend(self.enter(term.to_string(), anchor, 0, store, viewport));
                effects
            }
            FlowState::Idle | FlowState::Selecting => self.enter(term.to_string(), anchor, 0, store, viewport),
        }
    }

    fn enter(
        &mut self,
        term: String,
        anchor: Point,
        open_delay_ms: u32,
        store: &TermStore,
        viewport: Viewport,
    ) -> Vec<FlowEffect> {
        let effect = FlowEffect::OpenEntry {
            prefill: store.get(&term).map(str::to_string),
            position: place_entry(anchor, viewport, &self.geometry),
            open_delay_ms,
            focus_delay_ms: self.timing.entry_focus_delay_ms,
            term: term.clone(),
        };
        log::debug!("[SelectionFlow] entry opened for '{}'", term);
        self.state = FlowState::DefinitionEntry { term, anchor };
        vec![effect]
    }

    /// Pointer pressed; outside the entry surface this dismisses it
    pub fn pointer_pressed(&mut self, inside_entry: bool) -> Vec<FlowEffect> {
        if self.is_entry_open() && !inside_entry {
            return self.dismiss();
        }
        Vec::new()
    }

    /// Save button: commit non-blank text, close either way
    pub fn save(&mut self, text: &str) -> Vec<FlowEffect> {
        let term = match &self.state {
            FlowState::DefinitionEntry { term, .. } => term.clone(),
            _ => return Vec::new(),
        };
        self.state = FlowState::Idle;

        let definition = text.trim();
        let mut effects = Vec::with_capacity(2);
        if !definition.is_empty() {
            effects.push(FlowEffect::CommitTerm {
                term,
                definition: definition.to_string(),
            });
        }
        effects.push(FlowEffect::CloseEntry);
        effects
    }

    pub fn dismiss(&mut self) -> Vec<FlowEffect> {
        if !self.is_entry_open() {
            return Vec::new();
        }
        self.state = FlowState::Idle;
        vec![FlowEffect::CloseEntry]
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 1000.0,
        height: 800.0,
    };

    fn ctx(text: &str, x: f64, y: f64, now_ms: f64) -> SelectionContext {
        SelectionContext {
            text: text.to_string(),
            pointer: Point::new(x, y),
            now_ms,
            inside_entry: false,
        }
    }

    fn select(flow: &mut SelectionFlow, text: &str) -> Vec<FlowEffect> {
        flow.pointer_released();
        flow.selection_settled(&ctx(text, 100.0, 100.0, 0.0))
    }

    // -------------------------------------------------------------------------
    // Requirement 1: Selection shows the note after settling
    // -------------------------------------------------------------------------
    #[test]
    fn test_release_schedules_settle() {
        let mut flow = SelectionFlow::default();
        assert_eq!(flow.pointer_released(), vec![FlowEffect::ScheduleSettle { delay_ms: 10 }]);
        assert_eq!(flow.state(), &FlowState::Selecting);
    }

    #[test]
    fn test_settled_selection_shows_note() {
        let mut flow = SelectionFlow::default();
        flow.pointer_released();
        let effects = flow.selection_settled(&ctx("  gravity ", 100.0, 200.0, 1_000.0));
        assert_eq!(
            effects,
            vec![
                FlowEffect::ShowNote {
                    text: "gravity".to_string(),
                    position: Point::new(100.0, 220.0),
                },
                FlowEffect::ScheduleNoteTimeout {
                    delay_ms: 5000,
                    expires_at_ms: 6_000.0,
                },
            ]
        );
        assert!(flow.is_note_visible());
    }

    #[test]
    fn test_empty_selection_returns_to_idle() {
        let mut flow = SelectionFlow::default();
        assert!(select(&mut flow, "   ").is_empty());
        assert_eq!(flow.state(), &FlowState::Idle);

        select(&mut flow, "gravity");
        assert_eq!(select(&mut flow, ""), vec![FlowEffect::HideNote]);
        assert_eq!(flow.state(), &FlowState::Idle);
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Same selection keeps the note, new selection replaces it
    // -------------------------------------------------------------------------
    #[test]
    fn test_same_selection_is_noop() {
        let mut flow = SelectionFlow::default();
        select(&mut flow, "gravity");
        assert_eq!(flow.pointer_released(), vec![FlowEffect::ScheduleSettle { delay_ms: 10 }]);
        assert!(flow.selection_settled(&ctx("gravity", 5.0, 5.0, 10.0)).is_empty());
        assert!(flow.is_note_visible());
    }

    #[test]
    fn test_new_selection_replaces_note() {
        let mut flow = SelectionFlow::default();
        select(&mut flow, "gravity");
        let effects = select(&mut flow, "levity");
        assert_eq!(effects[0], FlowEffect::HideNote);
        assert!(matches!(&effects[1], FlowEffect::ShowNote { text, .. } if text == "levity"));
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Note expires
    // -------------------------------------------------------------------------
    #[test]
    fn test_note_expires_after_timeout() {
        let mut flow = SelectionFlow::default();
        select(&mut flow, "gravity");
        assert!(flow.note_expired(4_999.0).is_empty());
        assert_eq!(flow.note_expired(5_000.0), vec![FlowEffect::HideNote]);
        assert_eq!(flow.state(), &FlowState::Idle);

        // Same text can bring the note back after it expired
        assert_eq!(select(&mut flow, "gravity").len(), 2);
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Activation opens the entry surface with prefill
    // -------------------------------------------------------------------------
    #[test]
    fn test_activate_note_opens_entry() {
        let mut store = TermStore::new();
        store.save("gravity", "a force");

        let mut flow = SelectionFlow::default();
        select(&mut flow, "gravity");
        let effects = flow.activate_note(&store, VIEWPORT);
        assert_eq!(
            effects,
            vec![
                FlowEffect::HideNote,
                FlowEffect::OpenEntry {
                    term: "gravity".to_string(),
                    prefill: Some("a force".to_string()),
                    position: Point::new(100.0, 120.0),
                    open_delay_ms: 50,
                    focus_delay_ms: 100,
                },
            ]
        );
        assert!(flow.is_entry_open());
    }

    #[test]
    fn test_activation_delay_comes_from_config() {
        let mut config = VocabConfig::default();
        config.timing.note_activation_delay_ms = 120;
        let mut flow = SelectionFlow::new(&config);
        select(&mut flow, "gravity");
        let effects = flow.activate_note(&TermStore::new(), VIEWPORT);
        assert!(matches!(&effects[1], FlowEffect::OpenEntry { open_delay_ms: 120, .. }));

        let mut flow = SelectionFlow::new(&config);
        let effects = flow.open_entry("gravity", Point::new(0.0, 0.0), &TermStore::new(), VIEWPORT);
        assert!(matches!(&effects[0], FlowEffect::OpenEntry { open_delay_ms: 0, .. }));
    }

    #[test]
    fn test_prefill_requires_exact_key() {
        let mut store = TermStore::new();
        store.save("gravity", "a force");

        let mut flow = SelectionFlow::default();
        let effects = flow.open_entry("Gravity", Point::new(0.0, 0.0), &store, VIEWPORT);
        assert!(matches!(&effects[0], FlowEffect::OpenEntry { prefill: None, .. }));
    }

    #[test]
    fn test_only_one_entry_surface() {
        let store = TermStore::new();
        let mut flow = SelectionFlow::default();
        assert_eq!(flow.open_entry("a", Point::new(0.0, 0.0), &store, VIEWPORT).len(), 1);
        assert!(flow.open_entry("b", Point::new(0.0, 0.0), &store, VIEWPORT).is_empty());
        assert_eq!(flow.state(), &FlowState::DefinitionEntry { term: "a".to_string(), anchor: Point::new(0.0, 0.0) });
    }

    #[test]
    fn test_entry_placement_clamps_and_flips() {
        let geometry = GeometryConfig::default();
        assert_eq!(place_entry(Point::new(800.0, 100.0), VIEWPORT, &geometry), Point::new(690.0, 120.0));
        assert_eq!(place_entry(Point::new(100.0, 700.0), VIEWPORT, &geometry), Point::new(100.0, 480.0));

        // Centered anchor used by the context-menu path
        let anchor = VIEWPORT.entry_anchor(&geometry);
        assert_eq!(place_entry(anchor, VIEWPORT, &geometry), Point::new(350.0, 320.0));
    }

    // -------------------------------------------------------------------------
    // Requirement 5: Save, dismiss, outside press
    // -------------------------------------------------------------------------
    #[test]
    fn test_save_commits_trimmed_definition() {
        let store = TermStore::new();
        let mut flow = SelectionFlow::default();
        flow.open_entry("gravity", Point::new(0.0, 0.0), &store, VIEWPORT);
        assert_eq!(
            flow.save("  a force \n"),
            vec![
                FlowEffect::CommitTerm {
                    term: "gravity".to_string(),
                    definition: "a force".to_string(),
                },
                FlowEffect::CloseEntry,
            ]
        );
        assert_eq!(flow.state(), &FlowState::Idle);
    }

    #[test]
    fn test_blank_save_only_closes() {
        let store = TermStore::new();
        let mut flow = SelectionFlow::default();
        flow.open_entry("gravity", Point::new(0.0, 0.0), &store, VIEWPORT);
        assert_eq!(flow.save("   "), vec![FlowEffect::CloseEntry]);
        assert!(flow.save("late").is_empty());
    }

    #[test]
    fn test_press_outside_dismisses() {
        let store = TermStore::new();
        let mut flow = SelectionFlow::default();
        flow.open_entry("gravity", Point::new(0.0, 0.0), &store, VIEWPORT);

        assert!(flow.pointer_pressed(true).is_empty());
        assert!(flow.is_entry_open());
        assert!(flow.pointer_released().is_empty());

        assert_eq!(flow.pointer_pressed(false), vec![FlowEffect::CloseEntry]);
        assert!(!flow.is_entry_open());
        assert!(flow.dismiss().is_empty());
    }

    #[test]
    fn test_effects_serialize_for_js() {
        let json = serde_json::to_value(FlowEffect::ScheduleNoteTimeout {
            delay_ms: 5000,
            expires_at_ms: 1.0,
        })
        .unwrap();
        assert_eq!(json["effect"], "scheduleNoteTimeout");
        assert_eq!(json["delayMs"], 5000);
    }
}
