//! 検出サーバー呼び出し
//!
//! 失敗（接続失敗・タイムアウト・非2xx・不正JSON）は全て
//! `DetectionResponse::connection_failed()` に正規化し、呼び出し側へエラーを返さない。

use crate::config::Config;
use crate::error::{Result, VisionShopError};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};
use vision_shop_common::detection::{self, DetectRequest};
use vision_shop_common::DetectionResponse;

/// 画像1枚を検出にかける
pub trait Detector: Send + Sync + 'static {
    fn detect(&self, image: String) -> impl Future<Output = DetectionResponse> + Send;
}

pub struct DetectionClient {
    client: reqwest::Client,
    url: String,
}

impl DetectionClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.detect_url()?, config.timeout(), config.accept_invalid_certs)
    }

    pub fn new(url: String, timeout: Duration, accept_invalid_certs: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn try_detect(&self, image: &str) -> Result<DetectionResponse> {
        let response = self
            .client
            .post(&self.url)
            .json(&DetectRequest { image })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VisionShopError::ServerStatus(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(detection::parse_response(&body)?)
    }
}

impl Detector for DetectionClient {
    async fn detect(&self, image: String) -> DetectionResponse {
        let result = self.try_detect(&image).await;
        match &result {
            Ok(response) => debug!(?response, "detection response"),
            Err(e) => warn!(url = %self.url, error = %e, "detection failed"),
        }
        detection::normalize(result)
    }
}
