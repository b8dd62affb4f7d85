//! Story state types.
//!
//! Holds everything the loop threads between turns: the character name,
//! the current scene, the cumulative summary, and the rolling buffer of
//! scenes not yet folded into the summary.

use serde::{Deserialize, Serialize};
use tale_macros::Structured;
use thiserror::Error;

/// Maximum number of recent scenes to hold before compaction.
///
/// The buffer is allowed to reach this length; the append that pushes it
/// past the limit triggers a summarize-and-flush.
pub const MAX_RECENT_SCENES: usize = 5;

/// Errors arising from story bookkeeping rather than generation.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("choice {choice} is out of range (valid choices are 1 through {available})")]
    InvalidChoice { choice: i64, available: usize },

    #[error("the storyteller proposed no actions")]
    NoActions,
}

// ============================================================================
// Cumulative summary
// ============================================================================

/// The cumulative, structured digest of the story so far.
///
/// Produced whole by each summarization call and stored as-is; the engine
/// never merges a new summary into an old one. List fields keep insertion
/// order and are not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Structured)]
#[structured(name = "story_summary")]
pub struct StorySummary {
    /// Narrative summary of the whole story up to this point.
    pub story_summary: String,
    /// One summary per scene, in story order.
    pub scene_summaries: Vec<String>,
    /// Characters introduced so far.
    pub characters_introduced: Vec<String>,
    /// Locations introduced so far.
    pub locations_introduced: Vec<String>,
    /// Notable objects introduced so far.
    pub objects_introduced: Vec<String>,
    /// Events that have occurred so far.
    pub events_introduced: Vec<String>,
    /// Relationships established so far.
    pub relationships_introduced: Vec<String>,
    /// Conflicts in play so far.
    pub conflicts_introduced: Vec<String>,
    /// Threads opened but not yet resolved.
    pub open_threads: Vec<String>,
}

impl StorySummary {
    /// True when no summarization has produced content yet.
    pub fn is_empty(&self) -> bool {
        self.story_summary.is_empty()
            && self.scene_summaries.is_empty()
            && self.characters_introduced.is_empty()
            && self.locations_introduced.is_empty()
            && self.objects_introduced.is_empty()
            && self.events_introduced.is_empty()
            && self.relationships_introduced.is_empty()
            && self.conflicts_introduced.is_empty()
            && self.open_threads.is_empty()
    }

    /// Render the summary as prompt context.
    pub fn as_context(&self) -> String {
        let mut context = String::new();

        if !self.story_summary.is_empty() {
            context.push_str("## Story So Far\n");
            context.push_str(&self.story_summary);
            context.push_str("\n\n");
        }

        push_section(&mut context, "Scene Summaries", &self.scene_summaries);
        push_section(&mut context, "Characters", &self.characters_introduced);
        push_section(&mut context, "Locations", &self.locations_introduced);
        push_section(&mut context, "Objects", &self.objects_introduced);
        push_section(&mut context, "Events", &self.events_introduced);
        push_section(&mut context, "Relationships", &self.relationships_introduced);
        push_section(&mut context, "Conflicts", &self.conflicts_introduced);
        push_section(&mut context, "Open Threads", &self.open_threads);

        context.trim_end().to_string()
    }
}

fn push_section(context: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    context.push_str(&format!("### {title}\n"));
    for item in items {
        context.push_str(&format!("- {item}\n"));
    }
    context.push('\n');
}

// ============================================================================
// Action menu
// ============================================================================

/// The ordered set of actions offered to the player this turn.
///
/// Numbering shown to the player is 1-based; `resolve` owns the conversion
/// back to an index and the bounds check.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionMenu {
    options: Vec<String>,
}

impl ActionMenu {
    /// Build a menu from proposed options, rejecting an empty list.
    pub fn new(options: Vec<String>) -> Result<Self, StoryError> {
        if options.is_empty() {
            return Err(StoryError::NoActions);
        }
        Ok(Self { options })
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Resolve a player's 1-based choice to the chosen action text.
    ///
    /// The bounds check stays in the i64 domain; casting the choice to
    /// usize first would wrap values past u32::MAX on 32-bit targets.
    pub fn resolve(&self, choice: i64) -> Result<&str, StoryError> {
        if choice < 1 || choice > self.options.len() as i64 {
            return Err(StoryError::InvalidChoice {
                choice,
                available: self.options.len(),
            });
        }
        Ok(&self.options[choice as usize - 1])
    }

    /// Render the options as a 1-based numbered list.
    pub fn numbered(&self) -> String {
        self.options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("{}. {option}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============================================================================
// Story state
// ============================================================================

/// Mutable state of one running story.
///
/// The rolling scene buffer is owned here and only ever emptied through
/// `complete_compaction` (after a successful summarize and journal write)
/// or `clear_recent_scenes` (after a successful quit-time flush).
#[derive(Debug, Clone)]
pub struct StoryState {
    character_name: String,
    current_scene: String,
    summary: StorySummary,
    recent_scenes: Vec<String>,
}

impl StoryState {
    /// Create state for a new story. No scene is recorded yet.
    pub fn new(character_name: impl Into<String>) -> Self {
        Self {
            character_name: character_name.into(),
            current_scene: String::new(),
            summary: StorySummary::default(),
            recent_scenes: Vec::new(),
        }
    }

    pub fn character_name(&self) -> &str {
        &self.character_name
    }

    pub fn current_scene(&self) -> &str {
        &self.current_scene
    }

    pub fn summary(&self) -> &StorySummary {
        &self.summary
    }

    pub fn recent_scenes(&self) -> &[String] {
        &self.recent_scenes
    }

    /// Record a new scene: it becomes the current scene and joins the
    /// rolling buffer.
    pub fn record_scene(&mut self, scene: String) {
        self.current_scene = scene.clone();
        self.recent_scenes.push(scene);
    }

    /// True when the buffer has outgrown `MAX_RECENT_SCENES`.
    pub fn needs_compaction(&self) -> bool {
        self.recent_scenes.len() > MAX_RECENT_SCENES
    }

    /// Replace the summary without touching the rolling buffer.
    ///
    /// Used by the initial summarization, which folds the opening scene
    /// into the summary while leaving it in the buffer.
    pub fn replace_summary(&mut self, summary: StorySummary) {
        self.summary = summary;
    }

    /// Finish a compaction: install the new summary and empty the buffer.
    ///
    /// Callers must have journaled the buffered scenes first; this is the
    /// point of no return for them.
    pub fn complete_compaction(&mut self, summary: StorySummary) {
        self.summary = summary;
        self.recent_scenes.clear();
    }

    /// Drop buffered scenes after they have been flushed to the journal.
    pub(crate) fn clear_recent_scenes(&mut self) {
        self.recent_scenes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> StorySummary {
        StorySummary {
            story_summary: "Aria follows a stranger through the dusk market.".to_string(),
            scene_summaries: vec!["Aria arrives at the market.".to_string()],
            characters_introduced: vec!["Aria".to_string(), "The cloaked figure".to_string()],
            locations_introduced: vec!["Market square".to_string()],
            objects_introduced: Vec::new(),
            events_introduced: vec!["A figure beckons".to_string()],
            relationships_introduced: Vec::new(),
            conflicts_introduced: Vec::new(),
            open_threads: vec!["Who is the cloaked figure?".to_string()],
        }
    }

    #[test]
    fn test_menu_rejects_empty_options() {
        let result = ActionMenu::new(Vec::new());
        assert!(matches!(result, Err(StoryError::NoActions)));
    }

    #[test]
    fn test_menu_resolves_in_range_choices() {
        let menu = ActionMenu::new(vec![
            "Browse the stalls".to_string(),
            "Follow a cloaked figure".to_string(),
            "Return home".to_string(),
        ])
        .unwrap();

        assert_eq!(menu.resolve(1).unwrap(), "Browse the stalls");
        assert_eq!(menu.resolve(2).unwrap(), "Follow a cloaked figure");
        assert_eq!(menu.resolve(3).unwrap(), "Return home");
    }

    #[test]
    fn test_menu_rejects_out_of_range_choices() {
        let menu = ActionMenu::new(vec!["Wait".to_string(), "Run".to_string()]).unwrap();

        for bad in [0, 3, -1, 99] {
            match menu.resolve(bad) {
                Err(StoryError::InvalidChoice { choice, available }) => {
                    assert_eq!(choice, bad);
                    assert_eq!(available, 2);
                }
                other => panic!("expected InvalidChoice for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_menu_rejects_huge_choices() {
        // (1 << 32) + 1 wraps to 1 through a usize cast on 32-bit targets.
        let menu = ActionMenu::new(vec!["Wait".to_string(), "Run".to_string()]).unwrap();

        for bad in [(1_i64 << 32) + 1, 1_i64 << 32, i64::MAX, i64::MIN] {
            match menu.resolve(bad) {
                Err(StoryError::InvalidChoice { choice, available }) => {
                    assert_eq!(choice, bad);
                    assert_eq!(available, 2);
                }
                other => panic!("expected InvalidChoice for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_menu_numbering_is_one_based() {
        let menu = ActionMenu::new(vec!["Wait".to_string(), "Run".to_string()]).unwrap();
        assert_eq!(menu.numbered(), "1. Wait\n2. Run");
    }

    #[test]
    fn test_record_scene_updates_current_and_buffer() {
        let mut state = StoryState::new("Aria");
        state.record_scene("A quiet market square at dusk.".to_string());
        state.record_scene("An alley swallows the stranger.".to_string());

        assert_eq!(state.current_scene(), "An alley swallows the stranger.");
        assert_eq!(state.recent_scenes().len(), 2);
        assert_eq!(state.recent_scenes()[0], "A quiet market square at dusk.");
    }

    #[test]
    fn test_compaction_triggers_strictly_above_limit() {
        let mut state = StoryState::new("Aria");
        for i in 0..MAX_RECENT_SCENES {
            state.record_scene(format!("Scene {i}"));
            assert!(!state.needs_compaction(), "no compaction at {} scenes", i + 1);
        }

        state.record_scene("One more".to_string());
        assert!(state.needs_compaction());
    }

    #[test]
    fn test_complete_compaction_replaces_summary_and_clears_buffer() {
        let mut state = StoryState::new("Aria");
        for i in 0..6 {
            state.record_scene(format!("Scene {i}"));
        }

        let summary = sample_summary();
        state.complete_compaction(summary.clone());

        assert_eq!(state.summary(), &summary);
        assert!(state.recent_scenes().is_empty());
        assert_eq!(state.current_scene(), "Scene 5");
    }

    #[test]
    fn test_replace_summary_keeps_buffer() {
        let mut state = StoryState::new("Aria");
        state.record_scene("Opening".to_string());
        state.replace_summary(sample_summary());

        assert_eq!(state.recent_scenes().len(), 1);
        assert!(!state.summary().is_empty());
    }

    #[test]
    fn test_summary_replacement_is_wholesale() {
        let mut state = StoryState::new("Aria");
        state.replace_summary(sample_summary());

        let replacement = StorySummary {
            story_summary: "A different story entirely.".to_string(),
            ..StorySummary::default()
        };
        state.replace_summary(replacement.clone());

        assert_eq!(state.summary(), &replacement);
        assert!(state.summary().characters_introduced.is_empty());
    }

    #[test]
    fn test_empty_summary_renders_empty_context() {
        assert!(StorySummary::default().as_context().is_empty());
        assert!(StorySummary::default().is_empty());
    }

    #[test]
    fn test_summary_context_sections() {
        let context = sample_summary().as_context();

        assert!(context.starts_with("## Story So Far\n"));
        assert!(context.contains("### Characters\n- Aria\n- The cloaked figure"));
        assert!(context.contains("### Open Threads\n- Who is the cloaked figure?"));
        assert!(!context.contains("### Objects"));
    }
}
