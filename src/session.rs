//! 買い物セッション
//!
//! スキャン制御・カート・カメラ・検出・フィードバックを束ね、
//! ユーザー操作（開始/停止・追加・削除・数量変更…）を受け付ける。
//!
//! スキャン中は `SCAN_INTERVAL_MS` ごとの tick で1サイクルを試みる。
//! 検出中の tick は `ScanController` が捨てるので、サイクルは重ならない。
//! 撮影（画像のデコード・JPEGエンコード）はブロッキングスレッドで行う。

use crate::detector::Detector;
use crate::error::{Result, VisionShopError};
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use vision_shop_common::feedback::{phrases, Feedback, Priority, SoundKind};
use vision_shop_common::{
    AddOutcome, CameraStatus, Cart, FrameSource, ScanController, ScanSession, SCAN_INTERVAL_MS,
};

/// 現在時刻（エポックミリ秒）
pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[derive(Debug, Default)]
pub struct ShopState {
    pub scan: ScanController,
    pub cart: Cart,
}

struct Inner<C, D, F> {
    state: Mutex<ShopState>,
    camera: std::sync::Mutex<C>,
    detector: D,
    feedback: F,
}

pub struct ShopSession<C, D, F> {
    inner: Arc<Inner<C, D, F>>,
    ticker: Option<JoinHandle<()>>,
}

impl<C, D, F> ShopSession<C, D, F>
where
    C: FrameSource + Send + 'static,
    D: Detector,
    F: Feedback + Send + Sync + 'static,
{
    pub fn new(camera: C, detector: D, feedback: F) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ShopState::default()),
                camera: std::sync::Mutex::new(camera),
                detector,
                feedback,
            }),
            ticker: None,
        }
    }

    pub async fn camera_status(&self) -> CameraStatus {
        self.inner
            .camera
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .status()
    }

    pub async fn is_scanning(&self) -> bool {
        self.inner.state.lock().await.scan.is_scanning()
    }

    /// 開始/停止ボタン
    pub async fn toggle_scanning(&mut self) -> bool {
        self.inner.feedback.play_sound(SoundKind::Click);
        if self.is_scanning().await {
            self.stop().await;
            false
        } else {
            self.start().await;
            true
        }
    }

    /// スキャン開始。すぐに1サイクル実行し、以後は周期実行する
    pub async fn start(&mut self) -> bool {
        let started = {
            let mut state = self.inner.state.lock().await;
            state.scan.start(&self.inner.feedback)
        };
        if !started {
            return false;
        }

        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }

        let inner = Arc::clone(&self.inner);
        self.ticker = Some(tokio::spawn(async move {
            // 最初の tick は即座に完了する
            let mut interval = tokio::time::interval(Duration::from_millis(SCAN_INTERVAL_MS));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                Inner::tick(&inner).await;
            }
        }));
        info!("scanning started");
        true
    }

    /// スキャン停止。実行中の検出は取り消さず、応答が来ても捨てる
    pub async fn stop(&mut self) -> bool {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        let stopped = self.inner.state.lock().await.scan.stop();
        if stopped {
            info!("scanning stopped");
        }
        stopped
    }

    /// カメラ画面タップ（検出中の商品を追加）
    pub async fn add(&self) -> AddOutcome {
        let mut guard = self.inner.state.lock().await;
        let state = &mut *guard;
        let last_seen = state.scan.last_seen().cloned();
        state
            .cart
            .add_detected(last_seen.as_ref(), now_ms(), &self.inner.feedback)
    }

    /// 明細削除（表示番号は1始まり）
    pub async fn remove(&self, index: usize) -> Result<bool> {
        let mut state = self.inner.state.lock().await;
        let timestamp = line_timestamp(&state.cart, index)?;
        Ok(state.cart.remove(timestamp, &self.inner.feedback))
    }

    /// 数量変更（表示番号は1始まり）
    pub async fn update_quantity(&self, index: usize, delta: i64) -> Result<Option<u32>> {
        let mut state = self.inner.state.lock().await;
        let timestamp = line_timestamp(&state.cart, index)?;
        Ok(state.cart.update_quantity(timestamp, delta, &self.inner.feedback))
    }

    pub async fn clear(&self) {
        self.inner.state.lock().await.cart.clear(&self.inner.feedback);
    }

    pub async fn announce_total(&self) {
        self.inner.state.lock().await.cart.announce_total(&self.inner.feedback);
    }

    pub fn help(&self) {
        self.inner.feedback.speak(phrases::HELP, Priority::High);
    }

    pub async fn cart(&self) -> Cart {
        self.inner.state.lock().await.cart.clone()
    }

    pub async fn scan_session(&self) -> ScanSession {
        self.inner.state.lock().await.scan.session().clone()
    }
}

impl<C, D, F> Inner<C, D, F>
where
    C: FrameSource + Send + 'static,
    D: Detector,
    F: Feedback + Send + Sync + 'static,
{
    /// 1回の tick。検出中なら何もしない
    async fn tick(inner: &Arc<Self>) {
        let Some(ticket) = inner.state.lock().await.scan.begin_cycle() else {
            return;
        };

        let camera = Arc::clone(inner);
        let frame = tokio::task::spawn_blocking(move || {
            camera
                .camera
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .capture_frame()
        })
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "frame capture task failed");
            None
        });
        let Some(frame) = frame else {
            inner.state.lock().await.scan.abandon_cycle(ticket);
            return;
        };

        // 検出待ちの間も tick とユーザー操作は進む
        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            let response = inner.detector.detect(frame).await;
            let mut state = inner.state.lock().await;
            let outcome = state
                .scan
                .finish_cycle(ticket, &response, now_ms(), &inner.feedback);
            debug!(?outcome, "cycle finished");
        });
    }
}

impl<C, D, F> Drop for ShopSession<C, D, F> {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

fn line_timestamp(cart: &Cart, index: usize) -> Result<u64> {
    index
        .checked_sub(1)
        .and_then(|i| cart.lines().get(i))
        .map(|line| line.timestamp)
        .ok_or_else(|| VisionShopError::InvalidCommand(format!("明細番号 {} はありません", index)))
}
