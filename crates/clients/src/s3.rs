//! S3-backed asset storage.
//!
//! Assets are written publicly readable under a date/token prefix so a
//! bucket listing groups one job's files together:
//! `sleep-stories/2026-08-29/<job token>/audio.mp3`.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use chrono::NaiveDate;

use drowse_core::error::CoreError;

use crate::traits::ObjectStore;

const KEY_PREFIX: &str = "sleep-stories";

/// Build the storage key for one asset of a job.
pub fn asset_key(date: NaiveDate, job_token: &str, asset: &str, extension: &str) -> String {
    format!(
        "{KEY_PREFIX}/{}/{job_token}/{asset}.{extension}",
        date.format("%Y-%m-%d")
    )
}

/// Stores assets in an S3 bucket and serves them by public URL.
#[derive(Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    http: reqwest::Client,
    bucket: String,
    region: String,
}

impl S3Store {
    /// Build a store from the ambient AWS environment configuration.
    pub async fn from_env(bucket: String, region: String) -> Self {
        let config = aws_config::from_env()
            .region(aws_config::Region::new(region.clone()))
            .load()
            .await;
        Self {
            client: aws_sdk_s3::Client::new(&config),
            http: reqwest::Client::new(),
            bucket,
            region,
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{key}",
            self.bucket, self.region
        )
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CoreError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| CoreError::Persistence(format!("S3 upload of {key} failed: {e}")))?;

        tracing::info!(key, size, "Uploaded asset to S3");
        Ok(self.public_url(key))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, CoreError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("Asset fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Service {
                status: status.as_u16(),
                body: format!("asset fetch from {url} failed"),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CoreError::Internal(format!("Asset fetch failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_key_groups_by_date_and_token() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let key = asset_key(date, "2026-08-29-luna-x7k2mq", "audio", "mp3");
        assert_eq!(key, "sleep-stories/2026-08-29/2026-08-29-luna-x7k2mq/audio.mp3");
    }
}
