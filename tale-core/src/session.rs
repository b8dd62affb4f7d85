//! StorySession - the primary public API for running a story.
//!
//! Wraps the narrator, the story state, and the scene journal into one
//! turn-driving interface: seed, propose, advance, finish. Compaction is
//! handled here so the front end never touches the rolling buffer.

use crate::journal::{JournalError, SceneJournal, DEFAULT_JOURNAL_PATH};
use crate::story::{ActionMenu, StoryError, StoryState, StorySummary};
use crate::teller::{Narrator, Storyteller, TellerConfig, TellerError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from StorySession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Storyteller error: {0}")]
    Teller(#[from] TellerError),

    #[error("Story error: {0}")]
    Story(#[from] StoryError),

    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("No API key configured - set ANTHROPIC_API_KEY environment variable")]
    NoApiKey,
}

/// Configuration for creating a new story session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Player character name.
    pub character_name: String,

    /// Opening scene supplied by the player; generated when absent.
    pub opening_scene: Option<String>,

    /// Path of the scene journal.
    pub journal_path: PathBuf,

    /// Model to use for the storyteller.
    pub model: Option<String>,

    /// Maximum tokens for storyteller responses.
    pub max_tokens: usize,

    /// Temperature for storyteller generation.
    pub temperature: Option<f32>,
}

impl SessionConfig {
    /// Create a new session config for the named character.
    pub fn new(character_name: impl Into<String>) -> Self {
        Self {
            character_name: character_name.into(),
            opening_scene: None,
            journal_path: PathBuf::from(DEFAULT_JOURNAL_PATH),
            model: None,
            max_tokens: 4096,
            temperature: Some(0.8),
        }
    }

    /// Set the opening scene instead of generating one.
    pub fn with_opening_scene(mut self, scene: impl Into<String>) -> Self {
        self.opening_scene = Some(scene.into());
        self
    }

    /// Set the scene journal path.
    pub fn with_journal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.journal_path = path.into();
        self
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set max tokens for responses.
    pub fn with_max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = tokens;
        self
    }

    /// Set temperature for generation.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// Outcome of one advanced turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The newly narrated scene.
    pub scene: String,

    /// Whether this turn folded the rolling buffer into the summary.
    pub compacted: bool,
}

/// A running story.
///
/// Drives the turn loop: `begin` seeds the opening scene and runs the
/// initial summarization, then each turn is `propose_actions` followed by
/// `advance`, and `finish` flushes whatever the summary has not absorbed.
pub struct StorySession<N = Storyteller> {
    narrator: N,
    state: StoryState,
    journal: SceneJournal,
    opening_scene: Option<String>,
}

impl StorySession<Storyteller> {
    /// Create a session backed by the live storyteller.
    ///
    /// Requires `ANTHROPIC_API_KEY` environment variable to be set.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let teller_config = TellerConfig {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };

        let narrator = Storyteller::from_env()
            .map_err(|_| SessionError::NoApiKey)?
            .with_config(teller_config);

        Ok(Self::with_narrator(narrator, config))
    }
}

impl<N: Narrator> StorySession<N> {
    /// Create a session around a specific narrator.
    pub fn with_narrator(narrator: N, config: SessionConfig) -> Self {
        Self {
            narrator,
            state: StoryState::new(config.character_name),
            journal: SceneJournal::new(config.journal_path),
            opening_scene: config.opening_scene,
        }
    }

    /// Start the story. Call once, before the first turn.
    ///
    /// The opening scene (supplied or generated) becomes the current scene
    /// and the first entry in the rolling buffer, and the initial
    /// summarization folds it into the summary. Returns the opening scene.
    pub async fn begin(&mut self) -> Result<String, SessionError> {
        let opening = match self.opening_scene.take() {
            Some(scene) => scene,
            None => {
                self.narrator
                    .opening_scene(self.state.character_name())
                    .await?
            }
        };

        self.state.record_scene(opening.clone());

        let summary = self
            .narrator
            .summarize(self.state.recent_scenes(), self.state.summary())
            .await?;
        self.state.replace_summary(summary);

        Ok(opening)
    }

    /// Propose this turn's actions for the current scene.
    pub async fn propose_actions(&self) -> Result<ActionMenu, SessionError> {
        let options = self
            .narrator
            .propose_actions(self.state.current_scene(), self.state.character_name())
            .await?;

        Ok(ActionMenu::new(options)?)
    }

    /// Advance the story by the player's 1-based menu choice.
    ///
    /// An out-of-range choice fails with [`StoryError::InvalidChoice`]
    /// before any generation call, leaving the session untouched, so the
    /// caller can re-prompt against the same menu.
    pub async fn advance(
        &mut self,
        menu: &ActionMenu,
        choice: i64,
    ) -> Result<TurnOutcome, SessionError> {
        let action = menu.resolve(choice)?;

        let scene = self
            .narrator
            .next_scene(
                action,
                self.state.current_scene(),
                self.state.character_name(),
                self.state.summary(),
            )
            .await?;

        self.state.record_scene(scene.clone());

        let compacted = if self.state.needs_compaction() {
            self.compact().await?;
            true
        } else {
            false
        };

        Ok(TurnOutcome { scene, compacted })
    }

    /// Fold the rolling buffer into the summary and journal it.
    ///
    /// Staged so that a failure at any step leaves the buffer and summary
    /// exactly as they were: summarize first, then journal, and only after
    /// both succeed install the new summary and clear the buffer.
    async fn compact(&mut self) -> Result<(), SessionError> {
        tracing::info!(
            scenes = self.state.recent_scenes().len(),
            "compacting the rolling scene buffer"
        );

        let summary = self
            .narrator
            .summarize(self.state.recent_scenes(), self.state.summary())
            .await?;
        self.journal.append(self.state.recent_scenes()).await?;
        self.state.complete_compaction(summary);

        Ok(())
    }

    /// Wind the story down: flush unsummarized scenes to the journal.
    ///
    /// Writes nothing when the buffer is empty. The buffer is cleared only
    /// after a successful write.
    pub async fn finish(&mut self) -> Result<(), SessionError> {
        if self.state.recent_scenes().is_empty() {
            return Ok(());
        }

        tracing::info!(
            scenes = self.state.recent_scenes().len(),
            "flushing pending scenes before exit"
        );
        self.journal.append(self.state.recent_scenes()).await?;
        self.state.clear_recent_scenes();

        Ok(())
    }

    /// Get a reference to the narrator.
    pub fn narrator(&self) -> &N {
        &self.narrator
    }

    /// Get the player character's name.
    pub fn character_name(&self) -> &str {
        self.state.character_name()
    }

    /// Get the current scene.
    pub fn current_scene(&self) -> &str {
        self.state.current_scene()
    }

    /// Get the cumulative summary.
    pub fn summary(&self) -> &StorySummary {
        self.state.summary()
    }

    /// Number of scenes waiting in the rolling buffer.
    pub fn recent_scene_count(&self) -> usize {
        self.state.recent_scenes().len()
    }
}
