//! Turn-based interactive fiction engine with an AI storyteller.
//!
//! This crate provides:
//! - A turn loop of scenes and numbered action menus
//! - AI-powered scene and action generation using Claude
//! - A rolling scene buffer compacted into a cumulative summary
//! - An append-only journal of summarized scene windows
//!
//! # Quick Start
//!
//! ```ignore
//! use tale_core::{SessionConfig, StorySession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::new("Aria");
//!
//!     let mut session = StorySession::new(config)?;
//!
//!     let opening = session.begin().await?;
//!     println!("{opening}");
//!
//!     let menu = session.propose_actions().await?;
//!     let outcome = session.advance(&menu, 1).await?;
//!     println!("{}", outcome.scene);
//!
//!     session.finish().await?;
//!     Ok(())
//! }
//! ```

pub mod journal;
pub mod session;
pub mod story;
pub mod teller;
pub mod testing;

// Re-export for convenience
pub use tale_macros::Structured;

// Primary public API
pub use journal::{JournalError, SceneJournal, SceneRecord, DEFAULT_JOURNAL_PATH};
pub use session::{SessionConfig, SessionError, StorySession, TurnOutcome};
pub use story::{ActionMenu, StoryError, StoryState, StorySummary, MAX_RECENT_SCENES};
pub use teller::{Narrator, NextActions, Scene, Storyteller, TellerConfig, TellerError};
pub use testing::{NarratorCall, ScriptedNarrator};

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    /// Report the weather for a location
    #[derive(Structured, Deserialize)]
    #[structured(name = "weather_report")]
    struct WeatherReport {
        /// City or region being reported on
        location: String,
        /// Sky conditions right now
        conditions: Vec<String>,
        /// Optional temperature in celsius
        temperature: Option<f64>,
    }

    #[test]
    fn test_structured_derive() {
        use claude::Structured as _;

        assert_eq!(WeatherReport::schema_name(), "weather_report");
        assert_eq!(
            WeatherReport::schema_description(),
            "Report the weather for a location"
        );
    }

    #[test]
    fn test_structured_schema() {
        use claude::Structured as _;

        let schema = WeatherReport::schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["location"]["type"], "string");
        assert_eq!(schema["properties"]["conditions"]["type"], "array");
        assert_eq!(schema["properties"]["conditions"]["items"]["type"], "string");
        assert_eq!(schema["properties"]["temperature"]["type"], "number");

        // location is required, temperature is not (it's Option)
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "location"));
        assert!(required.iter().any(|v| v == "conditions"));
        assert!(!required.iter().any(|v| v == "temperature"));
    }

    #[test]
    fn test_structured_as_tool() {
        use claude::Structured as _;

        let tool = WeatherReport::as_tool();
        assert_eq!(tool.name, "weather_report");
        assert!(!tool.description.is_empty());
    }

    #[test]
    fn test_default_schema_name_is_snake_case() {
        use claude::Structured as _;

        /// A single die roll
        #[derive(Structured, Deserialize)]
        struct DieRoll {
            /// Number rolled
            value: i64,
        }

        assert_eq!(DieRoll::schema_name(), "die_roll");
        let schema = DieRoll::schema();
        assert_eq!(schema["properties"]["value"]["type"], "integer");
    }
}
