//! Vision Shop CLI
//!
//! フォルダ内の画像をカメラ代わりにして検出サーバーへ送り、
//! 検出した商品をコンソールで読み上げ・カートに追加する。

pub mod camera;
pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod feedback;
pub mod session;
pub mod shell;
