//! 検出サーバーURLの保存（localStorage）

use gloo::storage::{LocalStorage, Storage};
use vision_shop_common::detection::{detect_url, DEFAULT_ENDPOINT};

const ENDPOINT_KEY: &str = "vision-shop.endpoint";

pub fn load_endpoint() -> String {
    LocalStorage::get::<String>(ENDPOINT_KEY)
        .ok()
        .and_then(|url| validate_endpoint(&url).ok())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

pub fn save_endpoint(endpoint: &str) -> Result<(), String> {
    LocalStorage::set(ENDPOINT_KEY, endpoint).map_err(|e| format!("保存失敗: {}", e))
}

/// 入力されたURLを検証し、前後の空白を除いて返す
pub fn validate_endpoint(input: &str) -> Result<String, String> {
    let endpoint = input.trim();
    detect_url(endpoint).map_err(|e| e.to_string())?;
    Ok(endpoint.to_string())
}


#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn wasm_saved_endpoint_is_loaded() {
        save_endpoint("http://10.0.0.9:5000").expect("保存失敗");
        assert_eq!(load_endpoint(), "http://10.0.0.9:5000");

        LocalStorage::delete(ENDPOINT_KEY);
        assert_eq!(load_endpoint(), DEFAULT_ENDPOINT);
    }
}
