//! データモデル
//!
//! - DetectionResponse: 検出サーバーの応答
//! - ProductItem: 検出された商品
//! - CartItem: カート明細（ProductItem + 数量 + 作成時刻）

use rand::Rng;
use serde::{Deserialize, Serialize};

/// 検出結果が価格を持たない場合の既定値
pub const DEFAULT_PRICE: f64 = 0.0;

/// 検出結果がカテゴリを持たない場合の既定値
pub const DEFAULT_CATEGORY: &str = "General";

/// カート追加時の信頼度（APIは信頼度を返さないため固定値）
pub const PLACEHOLDER_CONFIDENCE: f64 = 0.9;

/// 通信失敗時の理由文字列
pub const CONNECTION_FAILED_REASON: &str = "Connection failed";

const ID_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// 検出サーバーの応答
///
/// `item_found` が false の場合、`name`/`price`/`category` は無効として扱う。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResponse {
    #[serde(default)]
    pub item_found: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DetectionResponse {
    /// 商品を検出した応答
    pub fn found(name: impl Into<String>, price: f64, category: impl Into<String>) -> Self {
        Self {
            item_found: true,
            name: Some(name.into()),
            price: Some(price),
            category: Some(category.into()),
            reason: None,
        }
    }

    /// 商品なしの応答
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self {
            item_found: false,
            reason: Some(reason.into()),
            ..Default::default()
        }
    }

    /// 通信失敗（HTTPエラー・接続失敗・デコード失敗を全てこれに正規化する）
    pub fn connection_failed() -> Self {
        Self::not_found(CONNECTION_FAILED_REASON)
    }

    /// 有効な検出名。`item_found` が false、または名前が空なら None
    pub fn detected_name(&self) -> Option<&str> {
        if !self.item_found {
            return None;
        }
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// 検出された商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductItem {
    /// クライアント側で生成するID（明細の識別には使わない）
    pub id: String,
    pub name: String,
    pub price: f64,
    pub category: String,
    /// 0.0〜1.0
    pub confidence: f64,
}

impl ProductItem {
    /// 検出結果から商品を作る。有効な検出名がなければ None
    pub fn from_detection(detection: &DetectionResponse) -> Option<Self> {
        let name = detection.detected_name()?;
        Some(Self {
            id: generate_item_id(),
            name: name.to_string(),
            price: detection.price.unwrap_or(DEFAULT_PRICE),
            category: detection
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            confidence: PLACEHOLDER_CONFIDENCE,
        })
    }
}

/// カート明細
///
/// `timestamp`（作成時刻ミリ秒）が削除・数量変更のキーになる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(flatten)]
    pub product: ProductItem,
    pub quantity: u32,
    pub timestamp: u64,
}

impl CartItem {
    pub fn new(product: ProductItem, timestamp: u64) -> Self {
        Self {
            product,
            quantity: 1,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.product.name
    }

    /// 明細小計（単価 × 数量）
    pub fn subtotal(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// 9文字の小文字英数字ID
pub fn generate_item_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
        .collect()
}
