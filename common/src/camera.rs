//! カメラ撮影の共通定義
//!
//! 背面カメラ・1280×720 を希望し、撮影フレームは品質0.7のJPEGで送る。
//! ストリームの取得と解放はシェル側で行う。取得に失敗したカメラは
//! 以後ずっと `Unavailable` のままで、自動リトライはしない。

use serde::Serialize;

pub const IDEAL_WIDTH: u32 = 1280;
pub const IDEAL_HEIGHT: u32 = 720;

/// 背面カメラ
pub const FACING_MODE: &str = "environment";

/// JPEG品質（0.0〜1.0）
pub const JPEG_QUALITY: f64 = 0.7;

pub const JPEG_MIME: &str = "image/jpeg";

pub const CAMERA_DENIED_MESSAGE: &str = "Camera access denied. Check permissions.";

/// getUserMedia の video 制約
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    pub facing_mode: &'static str,
    pub width: Ideal,
    pub height: Ideal,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Ideal {
    pub ideal: u32,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FACING_MODE,
            width: Ideal { ideal: IDEAL_WIDTH },
            height: Ideal { ideal: IDEAL_HEIGHT },
        }
    }
}

/// カメラの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraStatus {
    Starting,
    Active,
    Unavailable(String),
}

impl CameraStatus {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CameraStatus::Unavailable(_))
    }
}

/// フレーム供給元
pub trait FrameSource {
    /// 現在のフレームをJPEGのData URLにする。準備できていなければ None
    fn capture_frame(&mut self) -> Option<String>;

    fn status(&self) -> CameraStatus;
}

/// JPEG品質を 1〜100 の整数に直す（画像エンコーダ用）
pub fn jpeg_quality_percent(quality: f64) -> u8 {
    (quality.clamp(0.01, 1.0) * 100.0).round() as u8
}
