//! Testing utilities for the story engine.
//!
//! This module provides tools for integration testing:
//! - `ScriptedNarrator` for deterministic testing without API calls
//! - `NarratorCall` for verifying what the session asked for

use crate::story::StorySummary;
use crate::teller::{Narrator, TellerError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A scripted reply: either a value or a failure message that will
/// surface as an API error.
type Scripted<T> = Result<T, String>;

/// A record of one narrator invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum NarratorCall {
    OpeningScene { character_name: String },
    ProposeActions { scene: String },
    NextScene { action: String },
    Summarize { scenes: Vec<String> },
}

/// A narrator that returns scripted replies.
///
/// Use this for deterministic integration tests without API calls.
/// Replies are queued per operation and consumed in order; an exhausted
/// queue falls back to a bland default so long flows need only script
/// the turns they assert on. Queued failures let tests exercise the
/// error paths.
#[derive(Debug, Default)]
pub struct ScriptedNarrator {
    openings: Mutex<VecDeque<Scripted<String>>>,
    menus: Mutex<VecDeque<Scripted<Vec<String>>>>,
    scenes: Mutex<VecDeque<Scripted<String>>>,
    summaries: Mutex<VecDeque<Scripted<StorySummary>>>,
    calls: Mutex<Vec<NarratorCall>>,
}

impl ScriptedNarrator {
    /// Create a narrator with empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an opening scene.
    pub fn push_opening(&self, scene: impl Into<String>) {
        self.openings.lock().unwrap().push_back(Ok(scene.into()));
    }

    /// Queue a set of action options.
    pub fn push_actions(&self, options: &[&str]) {
        self.menus
            .lock()
            .unwrap()
            .push_back(Ok(options.iter().map(|o| o.to_string()).collect()));
    }

    /// Queue a failing action proposal.
    pub fn push_actions_failure(&self, message: impl Into<String>) {
        self.menus.lock().unwrap().push_back(Err(message.into()));
    }

    /// Queue a next scene.
    pub fn push_scene(&self, scene: impl Into<String>) {
        self.scenes.lock().unwrap().push_back(Ok(scene.into()));
    }

    /// Queue a failing scene generation.
    pub fn push_scene_failure(&self, message: impl Into<String>) {
        self.scenes.lock().unwrap().push_back(Err(message.into()));
    }

    /// Queue a summary.
    pub fn push_summary(&self, summary: StorySummary) {
        self.summaries.lock().unwrap().push_back(Ok(summary));
    }

    /// Queue a failing summarization.
    pub fn push_summarize_failure(&self, message: impl Into<String>) {
        self.summaries.lock().unwrap().push_back(Err(message.into()));
    }

    /// All invocations so far, in order.
    pub fn calls(&self) -> Vec<NarratorCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of summarize invocations so far.
    pub fn summarize_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, NarratorCall::Summarize { .. }))
            .count()
    }

    fn record(&self, call: NarratorCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn take<T>(queue: &Mutex<VecDeque<Scripted<T>>>) -> Option<Scripted<T>> {
        queue.lock().unwrap().pop_front()
    }

    fn failure(message: String) -> TellerError {
        TellerError::Api(claude::Error::Api {
            status: 503,
            message,
        })
    }
}

#[async_trait]
impl Narrator for ScriptedNarrator {
    async fn opening_scene(&self, character_name: &str) -> Result<String, TellerError> {
        self.record(NarratorCall::OpeningScene {
            character_name: character_name.to_string(),
        });

        match Self::take(&self.openings) {
            Some(Ok(scene)) => Ok(scene),
            Some(Err(message)) => Err(Self::failure(message)),
            None => Ok(format!(
                "{character_name} stands at the edge of an untold story."
            )),
        }
    }

    async fn propose_actions(
        &self,
        scene: &str,
        _character_name: &str,
    ) -> Result<Vec<String>, TellerError> {
        self.record(NarratorCall::ProposeActions {
            scene: scene.to_string(),
        });

        match Self::take(&self.menus) {
            Some(Ok(options)) => Ok(options),
            Some(Err(message)) => Err(Self::failure(message)),
            None => Ok(vec!["Press on.".to_string()]),
        }
    }

    async fn next_scene(
        &self,
        action: &str,
        _scene: &str,
        _character_name: &str,
        _summary: &StorySummary,
    ) -> Result<String, TellerError> {
        self.record(NarratorCall::NextScene {
            action: action.to_string(),
        });

        match Self::take(&self.scenes) {
            Some(Ok(scene)) => Ok(scene),
            Some(Err(message)) => Err(Self::failure(message)),
            None => Ok("The story continues.".to_string()),
        }
    }

    async fn summarize(
        &self,
        scenes: &[String],
        _summary: &StorySummary,
    ) -> Result<StorySummary, TellerError> {
        self.record(NarratorCall::Summarize {
            scenes: scenes.to_vec(),
        });

        match Self::take(&self.summaries) {
            Some(Ok(summary)) => Ok(summary),
            Some(Err(message)) => Err(Self::failure(message)),
            None => Ok(StorySummary::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let narrator = ScriptedNarrator::new();
        narrator.push_scene("Scene one.");
        narrator.push_scene("Scene two.");

        let summary = StorySummary::default();
        let first = narrator
            .next_scene("act", "here", "Aria", &summary)
            .await
            .unwrap();
        let second = narrator
            .next_scene("act", "here", "Aria", &summary)
            .await
            .unwrap();

        assert_eq!(first, "Scene one.");
        assert_eq!(second, "Scene two.");
    }

    #[tokio::test]
    async fn test_defaults_after_exhaustion() {
        let narrator = ScriptedNarrator::new();
        let summary = StorySummary::default();

        let opening = narrator.opening_scene("Aria").await.unwrap();
        let options = narrator.propose_actions("here", "Aria").await.unwrap();
        let scene = narrator
            .next_scene("act", "here", "Aria", &summary)
            .await
            .unwrap();

        assert!(opening.contains("Aria"));
        assert_eq!(options, vec!["Press on."]);
        assert_eq!(scene, "The story continues.");
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let narrator = ScriptedNarrator::new();
        narrator.push_summarize_failure("model overloaded");

        let result = narrator.summarize(&[], &StorySummary::default()).await;

        assert!(matches!(result, Err(TellerError::Api(_))));
    }

    #[tokio::test]
    async fn test_call_log() {
        let narrator = ScriptedNarrator::new();
        let summary = StorySummary::default();

        narrator.opening_scene("Aria").await.unwrap();
        narrator.propose_actions("the square", "Aria").await.unwrap();

        let calls = narrator.calls();
        assert_eq!(
            calls[0],
            NarratorCall::OpeningScene {
                character_name: "Aria".to_string()
            }
        );
        assert_eq!(
            calls[1],
            NarratorCall::ProposeActions {
                scene: "the square".to_string()
            }
        );

        narrator.summarize(&[], &summary).await.unwrap();
        assert_eq!(narrator.summarize_count(), 1);
    }
}
