use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vision_shop::camera::{encode_frame, FolderCamera};
use vision_shop::cli::{Cli, Commands};
use vision_shop::config::Config;
use vision_shop::detector::{DetectionClient, Detector};
use vision_shop::feedback::ConsoleFeedback;
use vision_shop::session::ShopSession;
use vision_shop::shell;
use vision_shop_common::{CameraStatus, FrameSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load()?;
    // --endpoint はその実行だけに効かせ、設定ファイルには保存しない
    let runtime_config = Config {
        endpoint_override: cli.endpoint.clone(),
        ..config.clone()
    };

    match cli.command {
        Commands::Detect { image } => {
            let client = DetectionClient::from_config(&runtime_config)?;
            let frame = encode_frame(&image)
                .with_context(|| format!("画像を読み込めません: {}", image.display()))?;

            println!("🔎 {} に送信中...", client.url());
            let response = client.detect(frame).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Shop { folder, autostart, quiet } => {
            println!("🛍 vision-shop - 買い物セッション\n");

            let client = DetectionClient::from_config(&runtime_config)?;
            let camera = FolderCamera::open(&folder);
            if camera.status() == CameraStatus::Active {
                println!("📷 {}枚のフレームを使用: {}", camera.frame_count(), folder.display());
            }
            println!("🔗 検出サーバー: {}\n", client.url());

            let mut session = ShopSession::new(camera, client, ConsoleFeedback::new(quiet));
            if autostart {
                session.start().await;
            }
            shell::run_shell(&mut session).await?;

            println!("\n{}", shell::render_cart(&session.cart().await));
        }

        Commands::Config { set_endpoint, set_timeout, show } => {
            if let Some(endpoint) = set_endpoint {
                config.set_endpoint(endpoint)?;
                println!("✔ 検出サーバーを設定しました");
            }

            if let Some(seconds) = set_timeout {
                config.set_timeout(seconds)?;
                println!("✔ タイムアウトを設定しました");
            }

            if show {
                println!("設定:");
                println!("  検出サーバー: {}", config.endpoint);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  自己署名証明書: {}", if config.accept_invalid_certs { "許可" } else { "拒否" });
                println!("  設定ファイル: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
