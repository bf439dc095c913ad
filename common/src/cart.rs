//! カートモデル
//!
//! 明細は新規追加分を先頭に積む（新しい順）。同名の商品は数量を加算し、
//! 既存明細の位置と `timestamp` は保持する。永続化はしない。

use crate::feedback::{phrases, Feedback, Priority, SoundKind};
use crate::types::{CartItem, DetectionResponse, ProductItem};
use tracing::debug;

/// 連続タップを無視する間隔
pub const ADD_DEBOUNCE_MS: u64 = 500;

/// 「追加しました」表示を出しておく時間
pub const ADDED_FEEDBACK_MS: u64 = 1500;

/// 追加操作の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// 新しい明細を先頭に追加
    Added { name: String, timestamp: u64 },
    /// 既存明細の数量を加算
    Merged { name: String, quantity: u32, timestamp: u64 },
    /// 有効な検出結果がない
    NothingToAdd,
    /// 直前の追加から `ADD_DEBOUNCE_MS` 以内
    Debounced,
}

impl AddOutcome {
    /// 追加を受け付けた場合の商品名（表示用）
    pub fn accepted_name(&self) -> Option<&str> {
        match self {
            AddOutcome::Added { name, .. } | AddOutcome::Merged { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// カート
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    last_add_at: Option<u64>,
    last_timestamp: u64,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// 表示順の明細
    pub fn lines(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, timestamp: u64) -> Option<&CartItem> {
        self.items.iter().find(|i| i.timestamp == timestamp)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.name() == name)
    }

    /// 検出中の商品をカートに入れる
    pub fn add_detected<F: Feedback>(
        &mut self,
        detection: Option<&DetectionResponse>,
        now_ms: u64,
        feedback: &F,
    ) -> AddOutcome {
        if let Some(last) = self.last_add_at {
            // 時計が戻った場合も窓の内側として扱う
            if now_ms.saturating_sub(last) < ADD_DEBOUNCE_MS {
                debug!(now_ms, last, "add debounced");
                return AddOutcome::Debounced;
            }
        }

        let Some(product) = detection.and_then(ProductItem::from_detection) else {
            feedback.play_sound(SoundKind::Error);
            feedback.speak(phrases::NOTHING_TO_ADD, Priority::High);
            return AddOutcome::NothingToAdd;
        };

        self.last_add_at = Some(now_ms);

        let outcome = match self.items.iter().position(|i| i.product.name == product.name) {
            Some(index) => {
                let line = &mut self.items[index];
                line.quantity = line.quantity.saturating_add(1);
                feedback.speak(&phrases::added_another(&product.name), Priority::High);
                AddOutcome::Merged {
                    name: product.name,
                    quantity: line.quantity,
                    timestamp: line.timestamp,
                }
            }
            None => {
                let timestamp = self.next_timestamp(now_ms);
                feedback.speak(&phrases::added(&product.name), Priority::High);
                let name = product.name.clone();
                self.items.insert(0, CartItem::new(product, timestamp));
                AddOutcome::Added { name, timestamp }
            }
        };

        feedback.play_sound(SoundKind::Success);
        debug!(?outcome, lines = self.items.len(), "cart add");
        outcome
    }

    /// 明細を削除する。見つからなければ何もしない
    pub fn remove<F: Feedback>(&mut self, timestamp: u64, feedback: &F) -> bool {
        let Some(index) = self.items.iter().position(|i| i.timestamp == timestamp) else {
            return false;
        };
        self.items.remove(index);
        feedback.speak(phrases::REMOVED, Priority::High);
        true
    }

    /// 数量を増減する（1未満にはならない）
    ///
    /// 変更後の数量を返す。明細がなければ None。
    pub fn update_quantity<F: Feedback>(
        &mut self,
        timestamp: u64,
        delta: i64,
        feedback: &F,
    ) -> Option<u32> {
        let line = self.items.iter_mut().find(|i| i.timestamp == timestamp)?;
        let new_quantity = i64::from(line.quantity)
            .saturating_add(delta)
            .clamp(1, i64::from(u32::MAX)) as u32;

        if new_quantity != line.quantity {
            line.quantity = new_quantity;
            feedback.speak(&phrases::quantity(new_quantity), Priority::High);
        }
        Some(new_quantity)
    }

    /// 全明細を削除する
    pub fn clear<F: Feedback>(&mut self, feedback: &F) {
        self.items.clear();
        feedback.speak(phrases::CLEARED, Priority::High);
    }

    /// 合計（単価 × 数量の総和）。丸めは表示時のみ
    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// 合計を読み上げる
    pub fn announce_total<F: Feedback>(&self, feedback: &F) {
        if self.items.is_empty() {
            feedback.speak(phrases::CART_EMPTY, Priority::High);
        } else {
            feedback.speak(&phrases::total(self.total()), Priority::High);
        }
    }

    // 同一ミリ秒の追加でもキーが重複しないようにする
    fn next_timestamp(&mut self, now_ms: u64) -> u64 {
        let timestamp = now_ms.max(self.last_timestamp.saturating_add(1));
        self.last_timestamp = timestamp;
        timestamp
    }
}

/// 金額表示（"$1.50"）
pub fn format_money(amount: f64) -> String {
    format!("${:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::RecordingFeedback;

    fn banana() -> DetectionResponse {
        DetectionResponse::found("Banana", 0.5, "Groceries")
    }

    fn apple() -> DetectionResponse {
        DetectionResponse::found("Apple", 1.2, "Groceries")
    }

    // =============================================
    // 追加テスト
    // =============================================

    #[test]
    fn test_add_new_line() {
        let feedback = RecordingFeedback::new();
        let mut cart = Cart::new();

        let outcome = cart.add_detected(Some(&banana()), 1_000, &feedback);

        assert_eq!(
            outcome,
            AddOutcome::Added { name: "Banana".to_string(), timestamp: 1_000 }
        );
        assert_eq!(cart.len(), 1);
        let line = &cart.lines()[0];
        assert_eq!(line.name(), "Banana");
        assert_eq!(line.quantity, 1);
        assert_eq!(line.product.category, "Groceries");
        assert_eq!(line.product.confidence, 0.9);
        assert_eq!(feedback.spoken(), vec!["Added Banana.".to_string()]);
        assert_eq!(feedback.sounds(), vec![SoundKind::Success]);
    }

    #[test]
    fn test_add_same_name_merges() {
        let feedback = RecordingFeedback::new();
        let mut cart = Cart::new();

        cart.add_detected(Some(&banana()), 1_000, &feedback);
        let outcome = cart.add_detected(Some(&banana()), 2_000, &feedback);

        assert_eq!(
            outcome,
            AddOutcome::Merged { name: "Banana".to_string(), quantity: 2, timestamp: 1_000 }
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.lines()[0].timestamp, 1_000);
        assert_eq!(feedback.last_spoken().as_deref(), Some("Added another Banana."));
    }

    #[test]
    fn test_new_lines_prepended_merge_keeps_position() {
        let feedback = RecordingFeedback::new();
        let mut cart = Cart::new();

        cart.add_detected(Some(&banana()), 1_000, &feedback);
        cart.add_detected(Some(&apple()), 2_000, &feedback);
        cart.add_detected(Some(&banana()), 3_000, &feedback);

        let names: Vec<&str> = cart.lines().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["Apple", "Banana"]);
        assert_eq!(cart.find_by_name("Banana").map(|l| l.quantity), Some(2));
    }

    #[test]
    fn test_add_nothing_detected() {
        let feedback = RecordingFeedback::new();
        let mut cart = Cart::new();

        assert_eq!(cart.add_detected(None, 1_000, &feedback), AddOutcome::NothingToAdd);
        assert_eq!(
            cart.add_detected(Some(&DetectionResponse::connection_failed()), 3_000, &feedback),
            AddOutcome::NothingToAdd
        );
        assert!(cart.is_empty());
        assert_eq!(feedback.sounds(), vec![SoundKind::Error, SoundKind::Error]);
        assert_eq!(feedback.last_spoken().as_deref(), Some("Nothing to add."));
    }

    #[test]
    fn test_add_debounce() {
        let feedback = RecordingFeedback::new();
        let mut cart = Cart::new();

        cart.add_detected(Some(&banana()), 10_000, &feedback);
        // 別の商品でも500ms以内は無視
        assert_eq!(cart.add_detected(Some(&apple()), 10_300, &feedback), AddOutcome::Debounced);
        assert_eq!(cart.add_detected(Some(&banana()), 10_499, &feedback), AddOutcome::Debounced);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 1);

        // 窓を過ぎれば受け付ける
        let outcome = cart.add_detected(Some(&apple()), 10_500, &feedback);
        assert!(matches!(outcome, AddOutcome::Added { .. }));
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_add_debounce_when_clock_steps_back() {
        let feedback = RecordingFeedback::new();
        let mut cart = Cart::new();

        cart.add_detected(Some(&banana()), 10_000, &feedback);
        assert_eq!(cart.add_detected(Some(&banana()), 9_000, &feedback), AddOutcome::Debounced);
        assert_eq!(cart.lines()[0].quantity, 1);

        // 直前に受け付けた時刻から窓を過ぎれば受け付ける
        let outcome = cart.add_detected(Some(&banana()), 10_500, &feedback);
        assert!(matches!(outcome, AddOutcome::Merged { quantity: 2, .. }));
    }

    #[test]
    fn test_debounced_add_is_silent() {
        let feedback = RecordingFeedback::new();
        let mut cart = Cart::new();

        cart.add_detected(Some(&banana()), 10_000, &feedback);
        feedback.clear();
        cart.add_detected(Some(&banana()), 10_100, &feedback);
        assert!(feedback.spoken().is_empty());
        assert!(feedback.sounds().is_empty());
    }

    #[test]
    fn test_timestamps_unique_per_line() {
        let feedback = RecordingFeedback::new();
        let mut cart = Cart::new();

        cart.add_detected(Some(&banana()), 5_000, &feedback);
        cart.remove(5_000, &feedback);
        // 時計が戻っても新しい明細のキーは重複しない
        cart.add_detected(Some(&apple()), 4_000, &feedback);
        assert_eq!(cart.lines()[0].timestamp, 5_001);
    }

    // =============================================
    // 削除・数量変更・クリア テスト
    // =============================================

    #[test]
    fn test_remove() {
        let feedback = RecordingFeedback::new();
        let mut cart = Cart::new();
        cart.add_detected(Some(&banana()), 1_000, &feedback);
        feedback.clear();

        assert!(!cart.remove(42, &feedback));
        assert!(feedback.spoken().is_empty());

        assert!(cart.remove(1_000, &feedback));
        assert!(cart.is_empty());
        assert_eq!(feedback.spoken(), vec!["Removed.".to_string()]);
    }

    #[test]
    fn test_update_quantity_never_below_one() {
        let feedback = RecordingFeedback::new();
        let mut cart = Cart::new();
        cart.add_detected(Some(&banana()), 1_000, &feedback);

        assert_eq!(cart.update_quantity(1_000, 3, &feedback), Some(4));
        assert_eq!(cart.update_quantity(1_000, -1, &feedback), Some(3));
        assert_eq!(cart.update_quantity(1_000, -100, &feedback), Some(1));
        assert_eq!(cart.update_quantity(1_000, i64::MIN, &feedback), Some(1));
        assert_eq!(cart.lines()[0].quantity, 1);
        assert_eq!(cart.update_quantity(99, 1, &feedback), None);
    }

    #[test]
    fn test_update_quantity_speaks_only_on_change() {
        let feedback = RecordingFeedback::new();
        let mut cart = Cart::new();
        cart.add_detected(Some(&banana()), 1_000, &feedback);
        feedback.clear();

        cart.update_quantity(1_000, -1, &feedback);
        assert!(feedback.spoken().is_empty());

        cart.update_quantity(1_000, 1, &feedback);
        assert_eq!(feedback.spoken(), vec!["2".to_string()]);
    }

    #[test]
    fn test_clear() {
        let feedback = RecordingFeedback::new();
        let mut cart = Cart::new();
        cart.add_detected(Some(&banana()), 1_000, &feedback);
        cart.add_detected(Some(&apple()), 2_000, &feedback);

        cart.clear(&feedback);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0.0);
        assert_eq!(feedback.last_spoken().as_deref(), Some("Cleared."));
    }

    // =============================================
    // 合計テスト
    // =============================================

    #[test]
    fn test_total() {
        let feedback = RecordingFeedback::new();
        let mut cart = Cart::new();
        assert_eq!(cart.total(), 0.0);

        cart.add_detected(Some(&banana()), 1_000, &feedback);
        cart.add_detected(Some(&apple()), 2_000, &feedback);
        cart.update_quantity(1_000, 2, &feedback);

        // 0.5 * 3 + 1.2 * 1
        assert!((cart.total() - 2.7).abs() < 1e-9);
        assert_eq!(format_money(cart.total()), "$2.70");
    }

    #[test]
    fn test_announce_total() {
        let feedback = RecordingFeedback::new();
        let mut cart = Cart::new();

        cart.announce_total(&feedback);
        assert_eq!(feedback.last_spoken().as_deref(), Some("Cart empty."));

        cart.add_detected(Some(&banana()), 1_000, &feedback);
        cart.announce_total(&feedback);
        assert_eq!(feedback.last_spoken().as_deref(), Some("Total 0.50 dollars."));
    }

    #[test]
    fn test_accepted_name() {
        let added = AddOutcome::Added { name: "Milk".to_string(), timestamp: 1 };
        assert_eq!(added.accepted_name(), Some("Milk"));
        assert_eq!(AddOutcome::Debounced.accepted_name(), None);
    }
}
