//! スキャン制御（状態機械）
//!
//! Idle ⇄ Scanning の2状態。タイマーやネットワークは持たず、
//! シェル側が start/stop とタイマー tick・検出応答をここへ流し込む。
//!
//! - 1サイクル = 撮影 → 検出 → 結果反映
//! - 実行中のサイクルがあれば tick は捨てる（キューしない）
//! - 同じ商品の読み上げは `ANNOUNCE_COOLDOWN_MS` に1回まで
//! - stop 後に届いた応答は世代番号で破棄する

use crate::feedback::{phrases, Feedback, Priority, SoundKind};
use crate::types::DetectionResponse;
use tracing::debug;

/// スキャン周期
pub const SCAN_INTERVAL_MS: u64 = 500;

/// 同じ商品を再アナウンスするまでの最小間隔
pub const ANNOUNCE_COOLDOWN_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
}

/// 1サイクル分の引換券（開始時の世代を持つ）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTicket {
    generation: u64,
}

/// サイクル完了時の結果
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// 商品を検出し、読み上げた
    Announced { name: String },
    /// 商品を検出したが、直近に読み上げ済み
    Seen { name: String },
    /// 商品なし（通信失敗を含む）
    NotFound,
    /// stop 後・再 start 後に届いた古い応答
    Stale,
}

/// スキャンセッションの状態
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSession {
    is_scanning: bool,
    last_seen: Option<DetectionResponse>,
    last_announced_name: Option<String>,
    last_announced_at: u64,
    cycle_in_flight: bool,
    generation: u64,
}

impl ScanSession {
    pub fn is_scanning(&self) -> bool {
        self.is_scanning
    }

    pub fn last_seen(&self) -> Option<&DetectionResponse> {
        self.last_seen.as_ref()
    }

    pub fn last_announced_name(&self) -> Option<&str> {
        self.last_announced_name.as_deref()
    }

    pub fn last_announced_at(&self) -> u64 {
        self.last_announced_at
    }

    pub fn is_cycle_in_flight(&self) -> bool {
        self.cycle_in_flight
    }
}

/// スキャン制御
#[derive(Debug, Clone, Default)]
pub struct ScanController {
    session: ScanSession,
}

impl ScanController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn state(&self) -> ScanState {
        if self.session.is_scanning {
            ScanState::Scanning
        } else {
            ScanState::Idle
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.session.is_scanning
    }

    /// 現在追加可能な検出結果
    pub fn last_seen(&self) -> Option<&DetectionResponse> {
        self.session.last_seen.as_ref()
    }

    /// Idle → Scanning
    ///
    /// 呼び出し側はこの直後に1サイクル実行し、`SCAN_INTERVAL_MS` のタイマーを張る。
    /// すでにスキャン中なら false。
    pub fn start<F: Feedback>(&mut self, feedback: &F) -> bool {
        if self.session.is_scanning {
            return false;
        }
        self.session.is_scanning = true;
        self.session.cycle_in_flight = false;
        self.session.generation = self.session.generation.wrapping_add(1);
        feedback.speak(phrases::SCANNER_ACTIVE, Priority::High);
        debug!(generation = self.session.generation, "scan started");
        true
    }

    /// Scanning → Idle
    ///
    /// 呼び出し側はタイマーを解除する。実行中のサイクルの応答は後で破棄される。
    pub fn stop(&mut self) -> bool {
        if !self.session.is_scanning {
            return false;
        }
        let generation = self.session.generation.wrapping_add(1);
        self.session = ScanSession {
            generation,
            ..Default::default()
        };
        debug!(generation, "scan stopped");
        true
    }

    /// tick 時に呼ぶ。サイクルを開始できれば引換券を返す
    pub fn begin_cycle(&mut self) -> Option<CycleTicket> {
        if !self.session.is_scanning {
            return None;
        }
        if self.session.cycle_in_flight {
            debug!("tick dropped: cycle in flight");
            return None;
        }
        self.session.cycle_in_flight = true;
        Some(CycleTicket {
            generation: self.session.generation,
        })
    }

    /// 撮影できなかった場合。状態は変えずに実行中フラグだけ下ろす
    pub fn abandon_cycle(&mut self, ticket: CycleTicket) {
        if self.is_current(ticket) {
            self.session.cycle_in_flight = false;
        }
    }

    /// 検出応答を反映する
    pub fn finish_cycle<F: Feedback>(
        &mut self,
        ticket: CycleTicket,
        response: &DetectionResponse,
        now_ms: u64,
        feedback: &F,
    ) -> CycleOutcome {
        if !self.is_current(ticket) {
            debug!(
                ticket = ticket.generation,
                current = self.session.generation,
                "stale detection discarded"
            );
            return CycleOutcome::Stale;
        }
        self.session.cycle_in_flight = false;

        let Some(name) = response.detected_name() else {
            self.session.last_seen = None;
            return CycleOutcome::NotFound;
        };
        let name = name.to_string();

        let elapsed = now_ms.saturating_sub(self.session.last_announced_at);
        let is_new_item = self.session.last_announced_name.as_deref() != Some(name.as_str());

        let outcome = if is_new_item || elapsed > ANNOUNCE_COOLDOWN_MS {
            feedback.play_sound(SoundKind::Success);
            feedback.speak(&phrases::detection(&name, response.price), Priority::High);
            self.session.last_announced_name = Some(name.clone());
            self.session.last_announced_at = now_ms;
            CycleOutcome::Announced { name }
        } else {
            CycleOutcome::Seen { name }
        };

        self.session.last_seen = Some(response.clone());
        outcome
    }

    fn is_current(&self, ticket: CycleTicket) -> bool {
        self.session.is_scanning && ticket.generation == self.session.generation
    }
}

/// カメラ上の状態表示
pub fn status_label(session: &ScanSession) -> &'static str {
    match (session.is_scanning, session.cycle_in_flight) {
        (false, _) => "PAUSED",
        (true, true) => "IDENTIFYING...",
        (true, false) => "LIVE SCANNING",
    }
}
