//! フォルダ内の静止画をカメラ代わりに使うフレーム供給元
//!
//! 撮影のたびに次の画像を返し、末尾まで来たら先頭に戻る。
//! フォルダが開けない・画像がない場合は `Unavailable` になり、以後は常に None。

mod encode;

pub use encode::encode_frame;

use std::path::{Path, PathBuf};
use tracing::warn;
use vision_shop_common::camera::{CameraStatus, FrameSource};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

pub struct FolderCamera {
    frames: Vec<PathBuf>,
    cursor: usize,
    status: CameraStatus,
}

impl FolderCamera {
    /// フォルダを開く。失敗しても `Unavailable` のカメラを返す
    pub fn open(folder: &Path) -> Self {
        if !folder.is_dir() {
            return Self::unavailable(format!("フォルダが見つかりません: {}", folder.display()));
        }

        let frames = scan_frames(folder);
        if frames.is_empty() {
            return Self::unavailable(format!("画像がありません: {}", folder.display()));
        }

        Self {
            frames,
            cursor: 0,
            status: CameraStatus::Active,
        }
    }

    fn unavailable(message: String) -> Self {
        warn!(%message, "camera unavailable");
        Self {
            frames: Vec::new(),
            cursor: 0,
            status: CameraStatus::Unavailable(message),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for FolderCamera {
    fn capture_frame(&mut self) -> Option<String> {
        if self.status != CameraStatus::Active {
            return None;
        }

        let path = self.frames.get(self.cursor)?.clone();
        self.cursor = (self.cursor + 1) % self.frames.len();

        match encode_frame(&path) {
            Ok(data_url) => Some(data_url),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "frame capture failed");
                None
            }
        }
    }

    fn status(&self) -> CameraStatus {
        self.status.clone()
    }
}

/// 直下の画像ファイルをファイル名順に集める
fn scan_frames(folder: &Path) -> Vec<PathBuf> {
    let mut frames: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();

    frames.sort();
    frames
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("shelf.jpg")));
        assert!(is_image_file(Path::new("shelf.JPEG")));
        assert!(is_image_file(Path::new("shelf.png")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("noext")));
    }

    #[test]
    fn test_missing_folder_is_unavailable() {
        let mut camera = FolderCamera::open(Path::new("/nonexistent/path/12345"));
        assert!(camera.status().is_unavailable());
        assert!(camera.capture_frame().is_none());
    }
}
