use serde::{Deserialize, Serialize};
use url::Url;

/// Lifecycle of a whole generation job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Pending,
    Generating,
    /// Generated; assets are still being relocated to durable storage.
    Uploading,
    Completed,
    Failed,
}

/// Lifecycle of one scene asset on the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneResourceStatus {
    Pending,
    Generating,
    Uploading,
    Completed,
    Failed,
}

/// One scene of a book as reported by `GET /book/{id}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookScene {
    pub scene_number: u32,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<Url>,
    #[serde(default)]
    pub audio_url: Option<Url>,
    #[serde(default)]
    pub image_status: Option<SceneResourceStatus>,
    #[serde(default)]
    pub audio_status: Option<SceneResourceStatus>,
}

impl BookScene {
    /// A scene counts as generated once its image is done and, when audio
    /// was requested, its audio is done too.
    #[must_use]
    pub fn is_generated(&self, require_audio: bool) -> bool {
        let image_done = self.image_status == Some(SceneResourceStatus::Completed);
        let audio_done =
            !require_audio || self.audio_status == Some(SceneResourceStatus::Completed);
        image_done && audio_done
    }
}

/// Book snapshot returned by the status endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<BookStatus>,
    #[serde(default)]
    pub has_audio: Option<bool>,
    #[serde(default)]
    pub scenes: Vec<BookScene>,
}

impl Book {
    #[must_use]
    pub fn total_scenes(&self) -> usize {
        self.scenes.len()
    }

    #[must_use]
    pub fn generated_scenes(&self, require_audio: bool) -> usize {
        self.scenes
            .iter()
            .filter(|s| s.is_generated(require_audio))
            .count()
    }
}

/// One-time upload target minted by `POST /r2/presigned-url`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedTarget {
    /// Time-limited, credential-embedded PUT target.
    pub upload_url: Url,
    /// Where the object will be publicly reachable once uploaded.
    pub public_url: Url,
}

/// Options for starting a generation job.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_model: Option<String>,
    pub generate_audio: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            voice_id: None,
            image_model: None,
            generate_audio: true,
        }
    }
}

/// Acknowledgment of an (asynchronous) generation start.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAck {
    pub book_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Which of a scene's assets to regenerate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegenerateTarget {
    Image,
    Audio,
    Both,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn scene(image: Option<SceneResourceStatus>, audio: Option<SceneResourceStatus>) -> BookScene {
        BookScene {
            scene_number: 1,
            content: None,
            image_url: None,
            audio_url: None,
            image_status: image,
            audio_status: audio,
        }
    }

    #[rstest]
    #[case::both_done(
        Some(SceneResourceStatus::Completed),
        Some(SceneResourceStatus::Completed),
        true,
        true
    )]
    #[case::audio_pending(
        Some(SceneResourceStatus::Completed),
        Some(SceneResourceStatus::Generating),
        true,
        false
    )]
    #[case::audio_not_required(
        Some(SceneResourceStatus::Completed),
        Some(SceneResourceStatus::Pending),
        false,
        true
    )]
    #[case::image_pending(Some(SceneResourceStatus::Generating), None, false, false)]
    #[case::no_statuses(None, None, true, false)]
    fn scene_generated(
        #[case] image: Option<SceneResourceStatus>,
        #[case] audio: Option<SceneResourceStatus>,
        #[case] require_audio: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(scene(image, audio).is_generated(require_audio), expected);
    }

    #[test]
    fn book_counts_generated_scenes() {
        let book = Book {
            id: "b1".into(),
            title: None,
            status: Some(BookStatus::Generating),
            has_audio: Some(true),
            scenes: vec![
                scene(
                    Some(SceneResourceStatus::Completed),
                    Some(SceneResourceStatus::Completed),
                ),
                scene(
                    Some(SceneResourceStatus::Completed),
                    Some(SceneResourceStatus::Uploading),
                ),
                scene(Some(SceneResourceStatus::Generating), None),
                scene(None, None),
            ],
        };

        assert_eq!(book.total_scenes(), 4);
        assert_eq!(book.generated_scenes(true), 1);
        assert_eq!(book.generated_scenes(false), 2);
    }

    #[test]
    fn book_deserializes_backend_shape() {
        let json = r#"{
            "_id": "66f0a1",
            "title": "The Fox and the Lantern",
            "createdAt": "2026-01-12T08:30:00Z",
            "status": "generating",
            "hasAudio": true,
            "scenes": [
                {
                    "sceneNumber": 1,
                    "content": "Once upon a time...",
                    "imageUrl": "https://cdn.example.com/img1.png",
                    "imageStatus": "completed",
                    "audioStatus": "generating"
                },
                { "sceneNumber": 2 }
            ]
        }"#;

        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.id, "66f0a1");
        assert_eq!(book.status, Some(BookStatus::Generating));
        assert_eq!(book.scenes.len(), 2);
        assert_eq!(
            book.scenes[0].image_status,
            Some(SceneResourceStatus::Completed)
        );
        assert!(book.scenes[1].image_status.is_none());
    }

    #[test]
    fn generate_options_serializes_compactly() {
        let options = GenerateOptions::default();
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json, serde_json::json!({ "generateAudio": true }));

        let options = GenerateOptions {
            voice_id: Some("narrator-2".into()),
            image_model: Some("doubao".into()),
            generate_audio: false,
        };
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "voiceId": "narrator-2",
                "imageModel": "doubao",
                "generateAudio": false
            })
        );
    }

    #[test]
    fn presigned_target_deserializes_camel_case() {
        let json = r#"{
            "uploadUrl": "https://r2.example.com/put?sig=abc",
            "publicUrl": "https://cdn.example.com/storybook/images/image_1_5.png"
        }"#;
        let target: PresignedTarget = serde_json::from_str(json).unwrap();
        assert_eq!(target.upload_url.host_str(), Some("r2.example.com"));
    }
}
