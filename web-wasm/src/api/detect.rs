//! 検出サーバー呼び出し（fetch）
//!
//! 失敗は全て `DetectionResponse::connection_failed()` にする。
//! `DETECT_TIMEOUT_MS` を過ぎたら AbortController で打ち切る。

use gloo::timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestInit, RequestMode, Response};
use vision_shop_common::detection::{self, DETECT_TIMEOUT_MS};
use vision_shop_common::DetectionResponse;

/// 画像1枚を検出にかける（エラーは返さない）
pub async fn detect(url: &str, image: &str) -> DetectionResponse {
    let result = post_detect(url, image).await;
    if let Err(e) = &result {
        web_sys::console::warn_2(&JsValue::from_str("検出失敗:"), e);
    }
    detection::normalize(result)
}

async fn post_detect(url: &str, image: &str) -> Result<DetectionResponse, JsValue> {
    let body = detection::request_body(image).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let controller = AbortController::new()?;
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(&body));
    opts.set_signal(Some(&controller.signal()));

    let request = Request::new_with_str_and_init(url, &opts)?;
    request.headers().set("Content-Type", "application/json")?;

    // 関数を抜けるとタイマーは解除される
    let _timeout = Timeout::new(DETECT_TIMEOUT_MS as u32, move || controller.abort());

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window がありません"))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let resp: Response = resp_value.dyn_into()?;

    if !resp.ok() {
        return Err(JsValue::from_str(&format!("Server error: {}", resp.status())));
    }

    let text = JsFuture::from(resp.text()?)
        .await?
        .as_string()
        .ok_or_else(|| JsValue::from_str("レスポンスが文字列ではありません"))?;

    detection::parse_response(&text).map_err(|e| JsValue::from_str(&e.to_string()))
}
