use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionShopError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("JPEGエンコードエラー: {0}")]
    ImageEncode(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("検出サーバーがエラーを返しました: {0}")]
    ServerStatus(u16),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("不明なコマンド: {0}")]
    InvalidCommand(String),
}

impl From<vision_shop_common::Error> for VisionShopError {
    fn from(err: vision_shop_common::Error) -> Self {
        match err {
            vision_shop_common::Error::Json(e) => VisionShopError::JsonParse(e),
            vision_shop_common::Error::Config(msg) => VisionShopError::Config(msg),
            other => VisionShopError::ImageLoad(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, VisionShopError>;
