//! Story files: the line sequence and branching of every context.
//!
//! ```json
//! {
//!   "ChapterOne": {
//!     "lines": [{ "speaker": "Mara", "body": "We should go." }],
//!     "choices": [{ "label": "Go", "target": "ChapterTwo" }],
//!     "next": null
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tableau_narrative::NarrativeLine;
use tokio::fs;

use crate::error::HostError;

/// A branch offered when a context's lines run out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoryChoice {
    /// Button text.
    pub label: String,
    /// Context loaded when picked.
    pub target: String,
}

/// What one context shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Lines shown in order.
    pub lines: Vec<NarrativeLine>,
    /// Branches offered after the last line.
    pub choices: Vec<StoryChoice>,
    /// Context loaded after the last line when there are no choices.
    pub next: Option<String>,
}

impl Scene {
    /// Labels of the branches.
    #[must_use]
    pub fn choice_labels(&self) -> Vec<String> {
        self.choices.iter().map(|c| c.label.clone()).collect()
    }
}

/// Every context's scene, by context name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Story {
    scenes: BTreeMap<String, Scene>,
}

impl Story {
    /// Parses story JSON.
    ///
    /// # Errors
    ///
    /// Returns the parser error.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Reads and parses a story file.
    ///
    /// # Errors
    ///
    /// Returns `HostError::StoryRead` or `HostError::StoryFormat`.
    pub async fn load(path: &Path) -> Result<Self, HostError> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|source| HostError::StoryRead {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&contents).map_err(|source| HostError::StoryFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The scene of `context`, if the story has one.
    #[must_use]
    pub fn scene(&self, context: &str) -> Option<&Scene> {
        self.scenes.get(context)
    }

    /// A short story used when no file is configured.
    #[must_use]
    pub fn demo() -> Self {
        let scene = |lines: Vec<NarrativeLine>, choices: Vec<StoryChoice>, next: Option<&str>| Scene {
            lines,
            choices,
            next: next.map(str::to_owned),
        };
        let choice = |label: &str, target: &str| StoryChoice {
            label: label.to_owned(),
            target: target.to_owned(),
        };

        let mut scenes = BTreeMap::new();
        scenes.insert(
            "CharacterSelectionScene".to_owned(),
            scene(
                vec![
                    NarrativeLine::narration("Choose who walks into the rain."),
                    NarrativeLine::spoken("Mara", "I'll go first.").with_portrait("mara"),
                ],
                Vec::new(),
                Some("ChapterOne"),
            ),
        );
        scenes.insert(
            "ChapterOne".to_owned(),
            scene(
                vec![
                    NarrativeLine::narration("The rain had not stopped for days."),
                    NarrativeLine::spoken("Mara", "We should go.").with_portrait("mara_worried"),
                    NarrativeLine::spoken("Tomas", "Not yet."),
                    NarrativeLine::spoken("Mara", "Then when?"),
                ],
                vec![
                    choice("Leave tonight", "ChapterTwo"),
                    choice("Wait for morning", "ChapterOne"),
                ],
                None,
            ),
        );
        scenes.insert(
            "ChapterTwo".to_owned(),
            scene(
                vec![
                    NarrativeLine::narration("The road north was empty."),
                    NarrativeLine::spoken("Tomas", "You were right."),
                ],
                Vec::new(),
                Some("MainMenuScene"),
            ),
        );
        Self { scenes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_story_with_defaults() {
        let story = Story::from_json(
            r#"{
                "ChapterOne": {
                    "lines": [
                        { "body": "Rain." },
                        { "speaker": "Mara", "body": "Go.", "portrait": "mara" }
                    ],
                    "choices": [{ "label": "Go", "target": "ChapterTwo" }]
                },
                "ChapterTwo": {}
            }"#,
        )
        .unwrap();

        let one = story.scene("ChapterOne").unwrap();
        assert_eq!(one.lines.len(), 2);
        assert!(one.lines[0].is_narration());
        assert_eq!(one.lines[1].portrait.as_deref(), Some("mara"));
        assert_eq!(one.choice_labels(), vec!["Go".to_owned()]);
        assert_eq!(one.next, None);
        assert_eq!(story.scene("ChapterTwo"), Some(&Scene::default()));
        assert!(story.scene("Missing").is_none());
    }

    #[test]
    fn test_rejects_line_without_body() {
        let result = Story::from_json(r#"{ "ChapterOne": { "lines": [{ "speaker": "Mara" }] } }"#);

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_reports_missing_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("absent.json");

        let err = Story::load(&path).await.unwrap_err();

        assert!(matches!(err, HostError::StoryRead { .. }));
    }

    #[tokio::test]
    async fn test_load_reports_bad_json() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("story.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Story::load(&path).await.unwrap_err();

        assert!(matches!(err, HostError::StoryFormat { .. }));
    }

    #[test]
    fn test_demo_story_chains_back_to_main_menu() {
        let story = Story::demo();

        assert_eq!(
            story.scene("ChapterTwo").and_then(|s| s.next.as_deref()),
            Some("MainMenuScene")
        );
        assert_eq!(story.scene("ChapterOne").map(|s| s.choices.len()), Some(2));
    }
}
