//! ブラウザカメラ（getUserMedia）
//!
//! ストリームは `CameraStream` が所有し、drop 時に全トラックを停止する。

use leptos::html::{Canvas, Video};
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, MediaStream, MediaStreamConstraints, MediaStreamTrack};
use vision_shop_common::camera::{
    CameraStatus, FrameSource, VideoConstraints, CAMERA_DENIED_MESSAGE, JPEG_MIME, JPEG_QUALITY,
};

/// HTMLMediaElement.HAVE_CURRENT_DATA
const HAVE_CURRENT_DATA: u16 = 2;

/// 取得済みのカメラストリーム
pub struct CameraStream {
    stream: MediaStream,
}

impl CameraStream {
    pub fn media(&self) -> &MediaStream {
        &self.stream
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
    }
}

/// 背面カメラ・1280x720 を要求してストリームを開く
pub async fn open_stream() -> Result<CameraStream, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window がありません"))?;
    let devices = window.navigator().media_devices()?;

    let video = serde_wasm_bindgen::to_value(&VideoConstraints::default()).map_err(JsValue::from)?;
    let constraints = MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::FALSE);
    constraints.set_video(&video);

    let promise = devices.get_user_media_with_constraints(&constraints)?;
    let stream: MediaStream = JsFuture::from(promise).await?.dyn_into()?;
    Ok(CameraStream { stream })
}

/// 映像要素・キャンバス・状態への参照
#[derive(Clone, Copy)]
pub struct CameraHandle {
    pub video: NodeRef<Video>,
    pub canvas: NodeRef<Canvas>,
    pub status: RwSignal<CameraStatus>,
}

impl CameraHandle {
    pub fn new() -> Self {
        Self {
            video: NodeRef::new(),
            canvas: NodeRef::new(),
            status: RwSignal::new(CameraStatus::Starting),
        }
    }

    /// ストリームを映像要素につないで再生する
    pub async fn attach(&self, stream: &CameraStream) -> Result<(), JsValue> {
        let video = self
            .video
            .get_untracked()
            .ok_or_else(|| JsValue::from_str("video 要素がありません"))?;
        video.set_muted(true);
        video.set_autoplay(true);
        video.set_attribute("playsinline", "")?;
        video.set_src_object(Some(stream.media()));
        JsFuture::from(video.play()?).await?;
        Ok(())
    }

    pub fn mark_active(&self) {
        self.status.try_set(CameraStatus::Active);
    }

    /// 取得失敗。以降は再試行しない
    pub fn mark_unavailable(&self, error: &JsValue) {
        web_sys::console::warn_2(&JsValue::from_str("カメラ取得失敗:"), error);
        self.status
            .try_set(CameraStatus::Unavailable(CAMERA_DENIED_MESSAGE.to_string()));
    }

    fn draw_frame(&self) -> Result<Option<String>, JsValue> {
        let (Some(video), Some(canvas)) = (self.video.get_untracked(), self.canvas.get_untracked())
        else {
            return Ok(None);
        };
        if video.ready_state() < HAVE_CURRENT_DATA || video.video_width() == 0 {
            return Ok(None);
        }

        canvas.set_width(video.video_width());
        canvas.set_height(video.video_height());
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d コンテキストがありません"))?
            .dyn_into()?;
        ctx.draw_image_with_html_video_element(&video, 0.0, 0.0)?;

        let data_url = canvas
            .to_data_url_with_type_and_encoder_options(JPEG_MIME, &JsValue::from_f64(JPEG_QUALITY))?;
        Ok(Some(data_url))
    }
}

impl FrameSource for CameraHandle {
    fn capture_frame(&mut self) -> Option<String> {
        if self.status.get_untracked() != CameraStatus::Active {
            return None;
        }
        match self.draw_frame() {
            Ok(frame) => frame,
            Err(e) => {
                web_sys::console::warn_2(&JsValue::from_str("フレーム取得失敗:"), &e);
                None
            }
        }
    }

    fn status(&self) -> CameraStatus {
        self.status.get_untracked()
    }
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn wasm_video_constraints_are_plain_object() {
        let value = serde_wasm_bindgen::to_value(&VideoConstraints::default())
            .expect("変換失敗");
        let facing = js_sys::Reflect::get(&value, &JsValue::from_str("facingMode"))
            .expect("facingMode がありません");
        assert_eq!(facing.as_string().as_deref(), Some("environment"));

        let width = js_sys::Reflect::get(&value, &JsValue::from_str("width")).expect("width がありません");
        let ideal = js_sys::Reflect::get(&width, &JsValue::from_str("ideal")).expect("ideal がありません");
        assert_eq!(ideal.as_f64(), Some(1280.0));
    }
}
