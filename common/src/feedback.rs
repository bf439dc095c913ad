//! 音声・効果音フィードバック
//!
//! 読み上げと効果音は撃ちっぱなし。失敗しても呼び出し側には返さない。
//! 実際の出力先（ブラウザ / コンソール）は `Feedback` を実装する側が決める。

use std::cell::RefCell;

/// 読み上げ優先度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// 再生中・待機中の読み上げを取り消してから読み上げる
    High,
    /// 割り込まずにキューへ追加する
    Normal,
}

/// 効果音の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    Success,
    Error,
    Click,
}

impl SoundKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundKind::Success => "success",
            SoundKind::Error => "error",
            SoundKind::Click => "click",
        }
    }

    /// 発振器のパラメータ
    pub fn tone(&self) -> ToneSpec {
        match self {
            SoundKind::Success => ToneSpec {
                frequency_hz: 880.0,
                start_gain: 0.1,
                decay_secs: 0.2,
            },
            SoundKind::Error => ToneSpec {
                frequency_hz: 220.0,
                start_gain: 0.2,
                decay_secs: 0.4,
            },
            SoundKind::Click => ToneSpec {
                frequency_hz: 440.0,
                start_gain: 0.05,
                decay_secs: 0.1,
            },
        }
    }
}

/// 単音の合成パラメータ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub frequency_hz: f32,
    pub start_gain: f32,
    /// ゲインが `END_GAIN` まで指数減衰する時間
    pub decay_secs: f64,
}

impl ToneSpec {
    pub const END_GAIN: f32 = 0.001;
    /// 発振器を止めるまでの時間
    pub const STOP_AFTER_SECS: f64 = 0.5;
}

/// 読み上げ設定
pub const SPEECH_RATE: f32 = 1.1;
pub const SPEECH_PITCH: f32 = 1.0;
pub const SPEECH_VOLUME: f32 = 1.0;

/// 合成音声の候補
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub name: String,
    pub lang: String,
}

/// 音声を選ぶ
///
/// en-US かつ名前に Google / Natural を含むものを優先し、なければ先頭。
/// 候補が空なら None（読み上げ不能）。
pub fn select_voice(voices: &[VoiceInfo]) -> Option<usize> {
    voices
        .iter()
        .position(|v| {
            v.lang.contains("en-US") && (v.name.contains("Google") || v.name.contains("Natural"))
        })
        .or(if voices.is_empty() { None } else { Some(0) })
}

/// フィードバック出力先
pub trait Feedback {
    fn speak(&self, text: &str, priority: Priority);
    fn play_sound(&self, kind: SoundKind);
}

impl<T: Feedback + ?Sized> Feedback for &T {
    fn speak(&self, text: &str, priority: Priority) {
        (**self).speak(text, priority)
    }

    fn play_sound(&self, kind: SoundKind) {
        (**self).play_sound(kind)
    }
}

/// 読み上げ文言
pub mod phrases {
    pub const SCANNER_ACTIVE: &str = "Scanner active.";
    pub const NOTHING_TO_ADD: &str = "Nothing to add.";
    pub const REMOVED: &str = "Removed.";
    pub const CLEARED: &str = "Cleared.";
    pub const CART_EMPTY: &str = "Cart empty.";
    pub const HELP: &str = "Scan items with camera. Tap screen to add. Scroll down for cart.";

    /// 検出アナウンス（"<name>. <price>"、価格なしなら "<name>."）
    pub fn detection(name: &str, price: Option<f64>) -> String {
        match price {
            Some(price) => format!("{}. {}", name, price),
            None => format!("{}.", name),
        }
    }

    pub fn added(name: &str) -> String {
        format!("Added {}.", name)
    }

    pub fn added_another(name: &str) -> String {
        format!("Added another {}.", name)
    }

    pub fn quantity(quantity: u32) -> String {
        quantity.to_string()
    }

    pub fn total(total: f64) -> String {
        format!("Total {:.2} dollars.", total)
    }
}

/// 出力を記録するだけの実装（テスト・ヘッドレス実行用）
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    spoken: RefCell<Vec<(String, Priority)>>,
    sounds: RefCell<Vec<SoundKind>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.borrow().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn last_spoken(&self) -> Option<String> {
        self.spoken.borrow().last().map(|(t, _)| t.clone())
    }

    pub fn last_priority(&self) -> Option<Priority> {
        self.spoken.borrow().last().map(|(_, p)| *p)
    }

    pub fn sounds(&self) -> Vec<SoundKind> {
        self.sounds.borrow().clone()
    }

    pub fn clear(&self) {
        self.spoken.borrow_mut().clear();
        self.sounds.borrow_mut().clear();
    }
}

impl Feedback for RecordingFeedback {
    fn speak(&self, text: &str, priority: Priority) {
        self.spoken.borrow_mut().push((text.to_string(), priority));
    }

    fn play_sound(&self, kind: SoundKind) {
        self.sounds.borrow_mut().push(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, lang: &str) -> VoiceInfo {
        VoiceInfo {
            name: name.to_string(),
            lang: lang.to_string(),
        }
    }

    // =============================================
    // 音声選択テスト
    // =============================================

    #[test]
    fn test_select_voice_prefers_quality_en_us() {
        let voices = vec![
            voice("Alex", "en-US"),
            voice("Google Deutsch", "de-DE"),
            voice("Google US English", "en-US"),
        ];
        assert_eq!(select_voice(&voices), Some(2));
    }

    #[test]
    fn test_select_voice_natural() {
        let voices = vec![voice("Kyoko", "ja-JP"), voice("Microsoft Aria Online (Natural)", "en-US")];
        assert_eq!(select_voice(&voices), Some(1));
    }

    #[test]
    fn test_select_voice_falls_back_to_first() {
        let voices = vec![voice("Kyoko", "ja-JP"), voice("Alex", "en-US")];
        assert_eq!(select_voice(&voices), Some(0));
    }

    #[test]
    fn test_select_voice_empty() {
        assert_eq!(select_voice(&[]), None);
    }

    // =============================================
    // 効果音・文言テスト
    // =============================================

    #[test]
    fn test_tones_are_distinct() {
        let success = SoundKind::Success.tone();
        let error = SoundKind::Error.tone();
        let click = SoundKind::Click.tone();

        assert!(success.frequency_hz > click.frequency_hz);
        assert!(click.frequency_hz > error.frequency_hz);
        assert!(error.decay_secs > success.decay_secs);
        assert!(success.decay_secs > click.decay_secs);
    }

    #[test]
    fn test_detection_phrase() {
        assert_eq!(phrases::detection("Banana", Some(0.5)), "Banana. 0.5");
        assert_eq!(phrases::detection("Bread", Some(3.0)), "Bread. 3");
        assert_eq!(phrases::detection("Bread", None), "Bread.");
    }

    #[test]
    fn test_total_phrase() {
        assert_eq!(phrases::total(1.0), "Total 1.00 dollars.");
        assert_eq!(phrases::total(12.345), "Total 12.35 dollars.");
    }

    #[test]
    fn test_recording_feedback_keeps_history() {
        let feedback = RecordingFeedback::new();
        feedback.speak("first", Priority::Normal);
        feedback.speak("second", Priority::High);
        feedback.play_sound(SoundKind::Click);

        assert_eq!(feedback.spoken(), vec!["first".to_string(), "second".to_string()]);
        assert_eq!(feedback.last_priority(), Some(Priority::High));
        assert_eq!(feedback.sounds(), vec![SoundKind::Click]);

        feedback.clear();
        assert!(feedback.spoken().is_empty());
        assert!(feedback.sounds().is_empty());
    }
}
