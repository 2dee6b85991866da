//! Edit session: staging state, both undo/redo histories, the unaffected
//! color, and the action-script recorder/replayer.
//!
//! One `EditSession` exists per loaded image set and is owned by the
//! top-level controller; there is no ambient global state. Every mutation
//! goes through a method here, and the caller rebuilds [`ProcessingParams`]
//! via [`EditSession::processing_params`] after each one to re-render.
//!
//! Apply semantics (per operator kind): the staged state is committed to that
//! kind's history (discarding any redo branch), one [`Action`] is appended to
//! the recorded session, and staging snaps back to identity. Undo/redo move
//! the cursor and also reset staging so sliders never show stale values.

use rayon::prelude::*;
use serde_json::Value;

use crate::error::Result;
use crate::history::History;
use crate::loader::SourceImage;
use crate::ops::{Action, ColorChangeState, TransparencyState, UnaffectedColorState};
use crate::processor::{self, OperatorSet, ProcessingParams};

#[derive(Debug, Clone, Default)]
pub struct EditSession {
    transparency: History<TransparencyState>,
    color_change: History<ColorChangeState>,
    transparency_staging: TransparencyState,
    color_change_staging: ColorChangeState,
    unaffected_color: UnaffectedColorState,
    /// Every Apply event of this session, both kinds interleaved in
    /// chronological order. This is what gets saved as an action script.
    recorded_session: Vec<Action>,
    /// An externally loaded script, kept as raw JSON values so unknown
    /// action types survive until replay (where they are skipped).
    loaded_script: Option<Vec<Value>>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Staging access
    // ------------------------------------------------------------------

    pub fn transparency_staging(&self) -> &TransparencyState {
        &self.transparency_staging
    }

    pub fn transparency_staging_mut(&mut self) -> &mut TransparencyState {
        &mut self.transparency_staging
    }

    pub fn color_change_staging(&self) -> &ColorChangeState {
        &self.color_change_staging
    }

    pub fn color_change_staging_mut(&mut self) -> &mut ColorChangeState {
        &mut self.color_change_staging
    }

    pub fn unaffected_color(&self) -> &UnaffectedColorState {
        &self.unaffected_color
    }

    pub fn unaffected_color_mut(&mut self) -> &mut UnaffectedColorState {
        &mut self.unaffected_color
    }

    // ------------------------------------------------------------------
    // Transparency history
    // ------------------------------------------------------------------

    /// Commit the staged transparency state, record it, reset staging.
    pub fn apply_transparency(&mut self) {
        let state = self.transparency_staging.clone();
        self.recorded_session
            .push(Action::Transparency(state.clone()));
        self.transparency.apply(state);
        self.transparency_staging = TransparencyState::default();
        tracing::debug!(
            cursor = self.transparency.cursor(),
            "applied transparency operator"
        );
    }

    pub fn undo_transparency(&mut self) -> bool {
        let moved = self.transparency.undo();
        if moved {
            self.transparency_staging = TransparencyState::default();
        }
        moved
    }

    pub fn redo_transparency(&mut self) -> bool {
        let moved = self.transparency.redo();
        if moved {
            self.transparency_staging = TransparencyState::default();
        }
        moved
    }

    pub fn can_undo_transparency(&self) -> bool {
        self.transparency.can_undo()
    }

    pub fn can_redo_transparency(&self) -> bool {
        self.transparency.can_redo()
    }

    /// Soft reset: staged values back to identity, history untouched.
    pub fn reset_transparency_staging(&mut self) {
        self.transparency_staging = TransparencyState::default();
    }

    /// Hard reset: staging and history both collapse to identity.
    pub fn hard_reset_transparency(&mut self) {
        self.transparency_staging = TransparencyState::default();
        self.transparency.hard_reset();
    }

    // ------------------------------------------------------------------
    // Color-change history
    // ------------------------------------------------------------------

    /// Commit the staged color-change state, record it, reset staging.
    pub fn apply_color_change(&mut self) {
        let state = self.color_change_staging.clone();
        self.recorded_session
            .push(Action::ColorChange(state.clone()));
        self.color_change.apply(state);
        self.color_change_staging = ColorChangeState::default();
        tracing::debug!(
            cursor = self.color_change.cursor(),
            "applied color-change operator"
        );
    }

    pub fn undo_color_change(&mut self) -> bool {
        let moved = self.color_change.undo();
        if moved {
            self.color_change_staging = ColorChangeState::default();
        }
        moved
    }

    pub fn redo_color_change(&mut self) -> bool {
        let moved = self.color_change.redo();
        if moved {
            self.color_change_staging = ColorChangeState::default();
        }
        moved
    }

    pub fn can_undo_color_change(&self) -> bool {
        self.color_change.can_undo()
    }

    pub fn can_redo_color_change(&self) -> bool {
        self.color_change.can_redo()
    }

    pub fn reset_color_change_staging(&mut self) {
        self.color_change_staging = ColorChangeState::default();
    }

    pub fn hard_reset_color_change(&mut self) {
        self.color_change_staging = ColorChangeState::default();
        self.color_change.hard_reset();
    }

    /// Hard reset of everything edit-related: both histories, both staging
    /// states and the unaffected color. Used when the active frame changes
    /// or a new image set loads.
    pub fn reset_all(&mut self) {
        self.hard_reset_transparency();
        self.hard_reset_color_change();
        self.unaffected_color = UnaffectedColorState::default();
    }

    // ------------------------------------------------------------------
    // Parameter snapshot
    // ------------------------------------------------------------------

    /// Build the pipeline input from current state: active history prefix
    /// plus staging per kind, so uncommitted edits are always previewed.
    pub fn processing_params(&self) -> ProcessingParams {
        ProcessingParams {
            transparency: OperatorSet {
                history: self.transparency.active().to_vec(),
                staging: self.transparency_staging.clone(),
            },
            color_change: OperatorSet {
                history: self.color_change.active().to_vec(),
                staging: self.color_change_staging.clone(),
            },
            unaffected_color: self.unaffected_color.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Action script
    // ------------------------------------------------------------------

    pub fn recorded_actions(&self) -> &[Action] {
        &self.recorded_session
    }

    /// Serialize the recorded session, order preserved.
    pub fn save_script(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.recorded_session)?)
    }

    /// Parse an externally supplied script. On a parse error nothing is
    /// touched; any previously loaded script stays in place.
    pub fn load_script(&mut self, raw: &str) -> Result<()> {
        let script: Vec<Value> = serde_json::from_str(raw)?;
        tracing::debug!(actions = script.len(), "loaded action script");
        self.loaded_script = Some(script);
        Ok(())
    }

    pub fn has_script(&self) -> bool {
        self.loaded_script.is_some()
    }

    /// Replay the loaded script: hard-reset everything, then append each
    /// recognized action to its kind's history with the cursor at the tail.
    ///
    /// Relative order is preserved within each kind only; the original
    /// cross-kind interleaving is not reconstructed. Actions with an unknown
    /// `type` (or unreadable params) are skipped without failing the replay.
    ///
    /// Returns false when no script is loaded.
    pub fn run_script(&mut self) -> bool {
        let Some(script) = self.loaded_script.clone() else {
            return false;
        };

        self.reset_all();
        for value in script {
            match serde_json::from_value::<Action>(value.clone()) {
                Ok(Action::Transparency(state)) => self.transparency.push(state),
                Ok(Action::ColorChange(state)) => self.color_change.push(state),
                Err(_) => {
                    tracing::debug!(
                        action_type = value.get("type").and_then(serde_json::Value::as_str).unwrap_or("?"),
                        "skipping unrecognized action"
                    );
                }
            }
        }
        true
    }

    /// Drop the recorded session, the loaded script and all edits.
    pub fn refresh_session(&mut self) {
        self.recorded_session.clear();
        self.loaded_script = None;
        self.reset_all();
    }

    // ------------------------------------------------------------------
    // Apply to all
    // ------------------------------------------------------------------

    /// Bake the current resolved parameters into every image, then
    /// hard-reset all edit state: the processed pixels become the new
    /// baseline and the folded-in history is intentionally discarded.
    pub fn apply_to_all(&mut self, images: &mut [SourceImage]) {
        let params = self.processing_params();
        images.par_iter_mut().for_each(|source| {
            source.image = processor::process_image(&source.image, &params);
        });
        tracing::debug!(count = images.len(), "applied session to all frames");
        self.reset_all();
    }
}
