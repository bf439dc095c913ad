//! 対話シェル
//!
//! 1行1コマンドで操作を受け付ける。空行（Enter）はカメラ画面のタップ扱い。

use crate::detector::Detector;
use crate::error::{Result, VisionShopError};
use crate::session::ShopSession;
use tokio::io::{AsyncBufReadExt, BufReader};
use vision_shop_common::{format_money, AddOutcome, Cart, CameraStatus, Feedback, FrameSource};

/// シェルコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// 開始/停止ボタン
    Toggle,
    Start,
    Stop,
    /// 検出中の商品を追加（タップ）
    Add,
    Remove(usize),
    Increment(usize),
    Decrement(usize),
    Clear,
    /// 合計を読み上げ
    Total,
    /// カート表示
    Cart,
    Help,
    Quit,
}

pub const USAGE: &str = "操作: [Enter]追加 [s]開始/停止 [c]カート [+ N]増やす [- N]減らす [rm N]削除 [clear]全削除 [t]合計 [h]ヘルプ [q]終了";

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Ok(ShellCommand::Add);
        };
        let arg = parts.next();

        let command = match head.to_lowercase().as_str() {
            "s" | "scan" => ShellCommand::Toggle,
            "start" => ShellCommand::Start,
            "stop" => ShellCommand::Stop,
            "a" | "add" | "tap" => ShellCommand::Add,
            "rm" | "remove" => ShellCommand::Remove(parse_index(head, arg)?),
            "+" | "inc" => ShellCommand::Increment(parse_index(head, arg)?),
            "-" | "dec" => ShellCommand::Decrement(parse_index(head, arg)?),
            "clear" => ShellCommand::Clear,
            "t" | "total" => ShellCommand::Total,
            "c" | "cart" => ShellCommand::Cart,
            "h" | "help" | "?" => ShellCommand::Help,
            "q" | "quit" | "exit" => ShellCommand::Quit,
            _ => return Err(VisionShopError::InvalidCommand(line.trim().to_string())),
        };
        Ok(command)
    }
}

fn parse_index(head: &str, arg: Option<&str>) -> Result<usize> {
    arg.and_then(|a| a.parse::<usize>().ok())
        .filter(|&n| n >= 1)
        .ok_or_else(|| VisionShopError::InvalidCommand(format!("{} には明細番号が必要です", head)))
}

/// カートの表示
pub fn render_cart(cart: &Cart) -> String {
    let mut out = String::from("🛒 Shopping Cart\n");
    if cart.is_empty() {
        out.push_str("  Cart is empty. Scan an item.\n");
    }
    for (i, line) in cart.lines().iter().enumerate() {
        out.push_str(&format!(
            "  {:>2}. {} x{}  {} ({} each) [{}]\n",
            i + 1,
            line.name(),
            line.quantity,
            format_money(line.subtotal()),
            format_money(line.product.price),
            line.product.category,
        ));
    }
    out.push_str(&format!("  Total: {}", format_money(cart.total())));
    out
}

/// 標準入力からコマンドを読み、終了まで処理する
pub async fn run_shell<C, D, F>(session: &mut ShopSession<C, D, F>) -> Result<()>
where
    C: FrameSource + Send + 'static,
    D: Detector,
    F: Feedback + Send + Sync + 'static,
{
    if let CameraStatus::Unavailable(message) = session.camera_status().await {
        println!("📷 カメラを使用できません: {}", message);
    }
    println!("{}", USAGE);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if command == ShellCommand::Quit {
            break;
        }
        if let Err(e) = execute(session, command).await {
            println!("{}", e);
        }
    }

    session.stop().await;
    Ok(())
}

/// 1コマンド実行
pub async fn execute<C, D, F>(session: &mut ShopSession<C, D, F>, command: ShellCommand) -> Result<()>
where
    C: FrameSource + Send + 'static,
    D: Detector,
    F: Feedback + Send + Sync + 'static,
{
    match command {
        ShellCommand::Toggle => {
            let scanning = session.toggle_scanning().await;
            println!("{}", if scanning { "▶ STOP SCANNER" } else { "■ START SCANNER" });
        }
        ShellCommand::Start => {
            session.start().await;
        }
        ShellCommand::Stop => {
            session.stop().await;
        }
        ShellCommand::Add => {
            if let AddOutcome::Added { name, .. } | AddOutcome::Merged { name, .. } = session.add().await {
                println!("✔ ADDED {}", name);
            }
        }
        ShellCommand::Remove(index) => {
            session.remove(index).await?;
        }
        ShellCommand::Increment(index) => {
            session.update_quantity(index, 1).await?;
        }
        ShellCommand::Decrement(index) => {
            session.update_quantity(index, -1).await?;
        }
        ShellCommand::Clear => session.clear().await,
        ShellCommand::Total => session.announce_total().await,
        ShellCommand::Cart => println!("{}", render_cart(&session.cart().await)),
        ShellCommand::Help => {
            session.help();
            println!("{}", USAGE);
        }
        ShellCommand::Quit => {}
    }
    Ok(())
}
