//! ZIP bundling of a completed job's assets for download.
//!
//! The bundle always contains `story.txt`, `metadata.json`, and
//! `README.md` from the database row. The MP3 and PNG are fetched
//! from object storage; a failed media fetch is logged and that entry
//! skipped, so a customer still gets a partial bundle rather than an
//! error page.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use drowse_clients::ObjectStore;
use drowse_core::error::CoreError;
use drowse_db::models::asset::GeneratedAsset;
use drowse_db::models::job::Job;

const FALLBACK_FOLDER: &str = "sleep-story";

/// A finished download bundle.
pub struct ZipBundle {
    /// Suggested download filename, e.g. `The Quiet River.zip`.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Folder/file-safe variant of the episode title.
fn safe_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == ' ' || c == '-' { c } else { ' ' })
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        FALLBACK_FOLDER.to_string()
    } else {
        cleaned
    }
}

fn metadata_json(job: &Job, asset: &GeneratedAsset) -> serde_json::Value {
    let customization = job.customization();
    serde_json::json!({
        "title": asset.title,
        "description": asset.description,
        "created_at": asset.created_at,
        "customization": job.customization,
        "character_name": customization.character_name,
        "companion_name": customization.companion_name,
        "location": {
            "climate": customization.climate,
            "region": customization.region,
        },
        "values": customization.values.unwrap_or_default(),
    })
}

fn readme(job: &Job, asset: &GeneratedAsset, audio_name: &str) -> String {
    let customization = job.customization();
    let mut details = String::new();
    if let Some(name) = &customization.character_name {
        details.push_str(&format!("- Main Character: {name}\n"));
    }
    if let (Some(name), Some(animal)) =
        (&customization.companion_name, &customization.companion_animal)
    {
        details.push_str(&format!("- Companion: {name} ({animal})\n"));
    }
    if let (Some(climate), Some(region)) = (&customization.climate, &customization.region) {
        details.push_str(&format!("- Setting: {climate} {region}\n"));
    }
    if let Some(values) = &customization.values {
        if !values.is_empty() {
            details.push_str(&format!("- Values: {}\n", values.join(", ")));
        }
    }

    format!(
        "# {title}\n\n\
         {description}\n\n\
         ## Contents\n\
         - story.txt: The full text of your sleep story\n\
         - {audio_name}: Audio narration of your story\n\
         - artwork.png: Custom artwork for your story\n\
         - metadata.json: Story details and customization info\n\n\
         ## Story Details\n\
         {details}\n\
         Created with \u{2764}\u{FE0F} by Key To Sleep\n",
        title = asset.title,
        description = asset.description,
    )
}

/// Assemble the download ZIP for a completed job.
///
/// Only archive construction itself is a hard error; missing media is
/// tolerated.
pub async fn build_bundle(
    store: &dyn ObjectStore,
    job: &Job,
    asset: &GeneratedAsset,
) -> Result<ZipBundle, CoreError> {
    let title = safe_title(&asset.title);
    let audio_name = format!("{title}.mp3");

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let zip_err = |e: zip::result::ZipError| CoreError::Internal(format!("ZIP write failed: {e}"));
    let io_err = |e: std::io::Error| CoreError::Internal(format!("ZIP write failed: {e}"));

    writer
        .start_file(format!("{title}/story.txt"), options)
        .map_err(zip_err)?;
    writer.write_all(asset.story_text.as_bytes()).map_err(io_err)?;

    let metadata = serde_json::to_string_pretty(&metadata_json(job, asset))
        .map_err(|e| CoreError::Internal(format!("Failed to serialize metadata: {e}")))?;
    writer
        .start_file(format!("{title}/metadata.json"), options)
        .map_err(zip_err)?;
    writer.write_all(metadata.as_bytes()).map_err(io_err)?;

    match store.fetch(&asset.audio_url).await {
        Ok(audio) => {
            writer
                .start_file(format!("{title}/{audio_name}"), options)
                .map_err(zip_err)?;
            writer.write_all(&audio).map_err(io_err)?;
        }
        Err(e) => {
            tracing::error!(job_id = job.id, error = %e, "Skipping audio in bundle");
        }
    }

    match store.fetch(&asset.artwork_url).await {
        Ok(artwork) => {
            writer
                .start_file(format!("{title}/artwork.png"), options)
                .map_err(zip_err)?;
            writer.write_all(&artwork).map_err(io_err)?;
        }
        Err(e) => {
            tracing::error!(job_id = job.id, error = %e, "Skipping artwork in bundle");
        }
    }

    writer
        .start_file(format!("{title}/README.md"), options)
        .map_err(zip_err)?;
    writer
        .write_all(readme(job, asset, &audio_name).as_bytes())
        .map_err(io_err)?;

    let cursor = writer.finish().map_err(zip_err)?;
    Ok(ZipBundle {
        filename: format!("{title}.zip"),
        bytes: cursor.into_inner(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::Utc;
    use zip::ZipArchive;

    use drowse_db::models::status::JobStatus;

    use super::*;

    struct MapStore {
        objects: HashMap<String, Vec<u8>>,
    }

    #[async_trait]
    impl ObjectStore for MapStore {
        async fn put(
            &self,
            _key: &str,
            _body: Vec<u8>,
            _content_type: &str,
        ) -> Result<String, CoreError> {
            unimplemented!("bundle tests only fetch")
        }

        async fn fetch(&self, url: &str) -> Result<Vec<u8>, CoreError> {
            self.objects.get(url).cloned().ok_or(CoreError::Service {
                status: 404,
                body: "missing".into(),
            })
        }
    }

    fn completed_job() -> Job {
        Job {
            id: 7,
            token: "2026-08-29-luna-x7k2mq".into(),
            status_id: JobStatus::Completed.id(),
            customization: serde_json::json!({
                "characterName": "Luna",
                "climate": "snowy",
                "region": "mountains"
            }),
            phone_number: None,
            sms_consent: false,
            payment_session_id: None,
            error_message: None,
            created_at: Utc::now(),
            started_at: Some(Utc::now()),
            completed_at: Some(Utc::now()),
        }
    }

    fn asset() -> GeneratedAsset {
        GeneratedAsset {
            id: 1,
            job_id: 7,
            episode_id: "20260829T120000000Z".into(),
            story_text: "Once, a quiet river.".into(),
            title: "The Quiet River".into(),
            description: "A slow drift toward sleep.".into(),
            artwork_url: "https://cdn.test/artwork.png".into(),
            artwork_prompt: "A small boat under lantern light.".into(),
            audio_url: "https://cdn.test/audio.mp3".into(),
            created_at: Utc::now(),
        }
    }

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[tokio::test]
    async fn full_bundle_contains_all_five_entries() {
        let store = MapStore {
            objects: HashMap::from([
                ("https://cdn.test/audio.mp3".to_string(), vec![0xFF, 0xFB]),
                ("https://cdn.test/artwork.png".to_string(), vec![0x89]),
            ]),
        };

        let bundle = build_bundle(&store, &completed_job(), &asset()).await.unwrap();
        assert_eq!(bundle.filename, "The Quiet River.zip");

        let names = entry_names(&bundle.bytes);
        assert!(names.contains(&"The Quiet River/story.txt".to_string()));
        assert!(names.contains(&"The Quiet River/metadata.json".to_string()));
        assert!(names.contains(&"The Quiet River/The Quiet River.mp3".to_string()));
        assert!(names.contains(&"The Quiet River/artwork.png".to_string()));
        assert!(names.contains(&"The Quiet River/README.md".to_string()));
    }

    #[tokio::test]
    async fn missing_media_yields_partial_bundle() {
        let store = MapStore {
            objects: HashMap::new(),
        };

        let bundle = build_bundle(&store, &completed_job(), &asset()).await.unwrap();

        let names = entry_names(&bundle.bytes);
        assert!(names.contains(&"The Quiet River/story.txt".to_string()));
        assert!(names.contains(&"The Quiet River/README.md".to_string()));
        assert!(!names.iter().any(|n| n.ends_with(".mp3")));
        assert!(!names.iter().any(|n| n.ends_with(".png")));
    }

    #[test]
    fn safe_title_falls_back_when_empty() {
        assert_eq!(safe_title("!!!"), "sleep-story");
        assert_eq!(safe_title("The  Quiet / River"), "The Quiet River");
    }
}
