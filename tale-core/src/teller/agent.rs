//! AI storyteller agent.
//!
//! The Storyteller drives all four generation calls through the Claude
//! API's structured extraction: each call forces a tool whose schema is
//! the expected result type, so responses come back as typed values.

use super::schema::{NextActions, Scene};
use crate::story::StorySummary;
use async_trait::async_trait;
use claude::{Claude, Message, Request};
use thiserror::Error;

/// Errors from the storyteller agent.
#[derive(Debug, Error)]
pub enum TellerError {
    #[error("Claude API error: {0:?}")]
    Api(#[from] claude::Error),
}

/// Configuration for the storyteller.
#[derive(Debug, Clone)]
pub struct TellerConfig {
    /// The model to use (defaults to the client's default model).
    pub model: Option<String>,

    /// Maximum tokens for responses.
    pub max_tokens: usize,

    /// Temperature for generation.
    pub temperature: Option<f32>,
}

impl Default for TellerConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 4096,
            temperature: Some(0.8),
        }
    }
}

/// The generation operations the story loop depends on.
///
/// [`Storyteller`] implements this against the live API; tests drive the
/// loop with the scripted narrator from [`crate::testing`].
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Invent an opening scene for the named character.
    async fn opening_scene(&self, character_name: &str) -> Result<String, TellerError>;

    /// Offer an ordered list of next actions for the current scene.
    async fn propose_actions(
        &self,
        scene: &str,
        character_name: &str,
    ) -> Result<Vec<String>, TellerError>;

    /// Narrate the consequence of the chosen action and the next scene.
    async fn next_scene(
        &self,
        action: &str,
        scene: &str,
        character_name: &str,
        summary: &StorySummary,
    ) -> Result<String, TellerError>;

    /// Produce the replacement summary covering the whole story so far.
    async fn summarize(
        &self,
        scenes: &[String],
        prior: &StorySummary,
    ) -> Result<StorySummary, TellerError>;
}

/// The AI storyteller.
pub struct Storyteller {
    client: Claude,
    config: TellerConfig,
}

impl Storyteller {
    /// Create a new Storyteller with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Claude::new(api_key),
            config: TellerConfig::default(),
        }
    }

    /// Create a Storyteller from the ANTHROPIC_API_KEY environment variable.
    pub fn from_env() -> Result<Self, TellerError> {
        let client = Claude::from_env()?;
        Ok(Self {
            client,
            config: TellerConfig::default(),
        })
    }

    /// Configure the Storyteller.
    pub fn with_config(mut self, config: TellerConfig) -> Self {
        self.config = config;
        self
    }

    fn request(&self, system: String, content: impl Into<String>) -> Request {
        let mut request = Request::new(vec![Message::user(content)])
            .with_system(system)
            .with_max_tokens(self.config.max_tokens);

        if let Some(ref model) = self.config.model {
            request = request.with_model(model);
        }

        if let Some(temp) = self.config.temperature {
            request = request.with_temperature(temp);
        }

        request
    }
}

#[async_trait]
impl Narrator for Storyteller {
    async fn opening_scene(&self, character_name: &str) -> Result<String, TellerError> {
        tracing::debug!(character = character_name, "generating opening scene");

        let request = self.request(opening_scene_system(), character_name);
        let scene: Scene = self.client.extract(request).await?;
        Ok(scene.scene_description)
    }

    async fn propose_actions(
        &self,
        scene: &str,
        character_name: &str,
    ) -> Result<Vec<String>, TellerError> {
        tracing::debug!("proposing next actions");

        let request = self.request(next_actions_system(character_name), scene);
        let actions: NextActions = self.client.extract(request).await?;
        Ok(actions.options)
    }

    async fn next_scene(
        &self,
        action: &str,
        scene: &str,
        character_name: &str,
        summary: &StorySummary,
    ) -> Result<String, TellerError> {
        tracing::debug!(action, "advancing the scene");

        let system = next_scene_system(action, scene, character_name, summary);
        let request = self.request(system, action);
        let scene: Scene = self.client.extract(request).await?;
        Ok(scene.scene_description)
    }

    async fn summarize(
        &self,
        scenes: &[String],
        prior: &StorySummary,
    ) -> Result<StorySummary, TellerError> {
        tracing::debug!(scene_count = scenes.len(), "summarizing the story");

        let request = self.request(summarize_system(), summarize_content(scenes, prior));
        let summary: StorySummary = self.client.extract(request).await?;
        Ok(summary)
    }
}

// ============================================================================
// Prompt building
// ============================================================================

fn opening_scene_system() -> String {
    include_str!("prompts/opening_scene.txt").trim_end().to_string()
}

fn next_actions_system(character_name: &str) -> String {
    let mut prompt = include_str!("prompts/next_actions.txt").trim_end().to_string();
    prompt.push_str(&format!("\n\nThe player's name is {character_name}."));
    prompt
}

fn next_scene_system(
    action: &str,
    scene: &str,
    character_name: &str,
    summary: &StorySummary,
) -> String {
    let mut prompt = include_str!("prompts/next_scene.txt").trim_end().to_string();

    prompt.push_str("\n\n## This Turn\n");
    prompt.push_str(&format!("The character's name is {character_name}.\n"));
    prompt.push_str(&format!("The last scene was: {scene}\n"));
    prompt.push_str(&format!("The player chose: {action}\n"));

    let context = summary.as_context();
    if !context.is_empty() {
        prompt.push('\n');
        prompt.push_str(&context);
    }

    prompt
}

fn summarize_system() -> String {
    include_str!("prompts/summarize.txt").trim_end().to_string()
}

fn summarize_content(scenes: &[String], prior: &StorySummary) -> String {
    let mut content = scenes.join("\n\n");

    let context = prior.as_context();
    if !context.is_empty() {
        content.push_str("\n\n");
        content.push_str(&context);
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TellerConfig::default();
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.temperature, Some(0.8));
        assert!(config.model.is_none());
    }

    #[test]
    fn test_storyteller_with_config() {
        let teller = Storyteller::new("test-key").with_config(TellerConfig {
            model: Some("claude-3-haiku".to_string()),
            max_tokens: 512,
            temperature: None,
        });

        assert_eq!(teller.config.max_tokens, 512);
        assert_eq!(teller.config.model.as_deref(), Some("claude-3-haiku"));
    }

    #[test]
    fn test_next_actions_system_names_the_player() {
        let prompt = next_actions_system("Aria");
        assert!(prompt.contains("The player's name is Aria."));
        assert!(prompt.starts_with("You are the dungeon master"));
    }

    #[test]
    fn test_next_scene_system_carries_turn_context() {
        let summary = StorySummary {
            story_summary: "Aria wanders a strange market.".to_string(),
            open_threads: vec!["Who rang the bell?".to_string()],
            ..StorySummary::default()
        };

        let prompt = next_scene_system(
            "Follow a cloaked figure",
            "A quiet market square at dusk.",
            "Aria",
            &summary,
        );

        assert!(prompt.contains("The character's name is Aria."));
        assert!(prompt.contains("The last scene was: A quiet market square at dusk."));
        assert!(prompt.contains("The player chose: Follow a cloaked figure"));
        assert!(prompt.contains("## Story So Far"));
        assert!(prompt.contains("- Who rang the bell?"));
    }

    #[test]
    fn test_next_scene_system_without_summary_context() {
        let prompt = next_scene_system("Wait", "An empty road.", "Aria", &StorySummary::default());
        assert!(prompt.contains("The player chose: Wait"));
        assert!(!prompt.contains("## Story So Far"));
    }

    #[test]
    fn test_summarize_content_joins_scenes_then_context() {
        let scenes = vec!["First scene.".to_string(), "Second scene.".to_string()];
        let prior = StorySummary {
            story_summary: "It began quietly.".to_string(),
            ..StorySummary::default()
        };

        let content = summarize_content(&scenes, &prior);
        assert!(content.starts_with("First scene.\n\nSecond scene."));
        assert!(content.contains("## Story So Far\nIt began quietly."));
    }

    #[test]
    fn test_summarize_content_for_fresh_story() {
        let scenes = vec!["Opening.".to_string()];
        let content = summarize_content(&scenes, &StorySummary::default());
        assert_eq!(content, "Opening.");
    }
}
