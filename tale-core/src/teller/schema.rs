//! Structured result schemas for the non-summary generation calls.
//!
//! The summary schema lives with the story state ([`crate::story::StorySummary`])
//! because the wire value is also the stored value.

use serde::{Deserialize, Serialize};
use tale_macros::Structured;

/// A single narrated scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Structured)]
#[structured(name = "scene")]
pub struct Scene {
    /// The scene text shown to the player.
    pub scene_description: String,
}

/// Candidate actions for the player's next move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Structured)]
#[structured(name = "next_actions")]
pub struct NextActions {
    /// Short action descriptions, in the order they are offered.
    pub options: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use claude::Structured as _;

    #[test]
    fn test_scene_schema() {
        assert_eq!(Scene::schema_name(), "scene");

        let schema = Scene::schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["scene_description"]["type"], "string");
        assert!(schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .any(|v| v == "scene_description"));
    }

    #[test]
    fn test_next_actions_schema() {
        assert_eq!(NextActions::schema_name(), "next_actions");

        let schema = NextActions::schema();
        assert_eq!(schema["properties"]["options"]["type"], "array");
        assert_eq!(schema["properties"]["options"]["items"]["type"], "string");
    }
}
