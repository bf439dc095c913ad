//! 検出エンドポイントの入出力
//!
//! `POST <base>/detect` に `{"image": "<data URL>"}` を送り、
//! `DetectionResponse` 形式のJSONを受け取る。
//! 通信処理そのものはシェル側（reqwest / fetch）が持つ。

use crate::error::{Error, Result};
use crate::types::DetectionResponse;
use serde::Serialize;

/// 既定の検出サーバー
pub const DEFAULT_ENDPOINT: &str = "https://192.168.1.111:5000";

/// 検出リクエストのタイムアウト
pub const DETECT_TIMEOUT_MS: u64 = 5000;

const DETECT_PATH: &str = "/detect";

/// 検出リクエスト
#[derive(Debug, Clone, Serialize)]
pub struct DetectRequest<'a> {
    pub image: &'a str,
}

/// ベースURLから検出エンドポイントURLを作る
pub fn detect_url(base_url: &str) -> Result<String> {
    let base = base_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(Error::Config("endpoint is empty".to_string()));
    }
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(Error::Config(format!(
            "endpoint must start with http:// or https://: {}",
            base
        )));
    }
    Ok(format!("{}{}", base, DETECT_PATH))
}

/// リクエストボディ
pub fn request_body(image: &str) -> Result<String> {
    Ok(serde_json::to_string(&DetectRequest { image })?)
}

/// レスポンスボディを解析する
pub fn parse_response(body: &str) -> Result<DetectionResponse> {
    Ok(serde_json::from_str(body)?)
}

/// 失敗を「商品なし」に正規化する
///
/// 検出処理の呼び出し側は決してエラーを受け取らない。
pub fn normalize<E>(result: std::result::Result<DetectionResponse, E>) -> DetectionResponse {
    result.unwrap_or_else(|_| DetectionResponse::connection_failed())
}

/// Data URLからBase64データ部分を抽出
///
/// # Arguments
/// * `data_url` - "data:image/jpeg;base64,/9j/4AAQ..." 形式のData URL
///
/// # Returns
/// Base64エンコードされたデータ部分、または抽出失敗時はNone
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split(',').nth(1)
}

/// Data URLからMIMEタイプを抽出
///
/// 抽出失敗時は"image/jpeg"をデフォルトとして返す
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    data_url
        .split(':')
        .nth(1)
        .and_then(|s| s.split(';').next())
        .unwrap_or("image/jpeg")
}

/// Base64データからData URLを組み立てる
pub fn to_data_url(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// Data URLの形式チェック
pub fn validate_data_url(data_url: &str) -> Result<()> {
    if !data_url.starts_with("data:") {
        return Err(Error::InvalidDataUrl("missing data: scheme".to_string()));
    }
    match extract_base64_from_data_url(data_url) {
        Some(data) if !data.is_empty() => Ok(()),
        _ => Err(Error::InvalidDataUrl("empty payload".to_string())),
    }
}
