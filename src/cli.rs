use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vision-shop")]
#[command(about = "カメラで商品を認識して読み上げる買い物アシスタント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 検出サーバーのベースURL（設定ファイルより優先）
    #[arg(long, global = true)]
    pub endpoint: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像1枚を検出サーバーに送って結果を表示
    Detect {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,
    },

    /// 買い物セッション（フォルダ内の画像をカメラ代わりに使う）
    Shop {
        /// フレーム画像のフォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// 起動と同時にスキャンを開始
        #[arg(long)]
        autostart: bool,

        /// 効果音の表示を省略
        #[arg(long)]
        quiet: bool,
    },

    /// 設定
    Config {
        /// 検出サーバーのベースURLを設定
        #[arg(long)]
        set_endpoint: Option<String>,

        /// タイムアウト秒数を設定
        #[arg(long)]
        set_timeout: Option<u64>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}
