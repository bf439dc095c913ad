//! コンソールへのフィードバック出力
//!
//! 読み上げは「🔊」、効果音は「♪」付きで標準出力へ書く。
//! 高優先度の読み上げは直前の行を打ち切ったものとして改行してから出す。

use vision_shop_common::feedback::{Feedback, Priority, SoundKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleFeedback {
    /// 効果音を表示しない
    pub quiet_sounds: bool,
}

impl ConsoleFeedback {
    pub fn new(quiet_sounds: bool) -> Self {
        Self { quiet_sounds }
    }
}

impl Feedback for ConsoleFeedback {
    fn speak(&self, text: &str, priority: Priority) {
        match priority {
            Priority::High => println!("\n🔊 {}", text),
            Priority::Normal => println!("🔊 {}", text),
        }
    }

    fn play_sound(&self, kind: SoundKind) {
        if self.quiet_sounds {
            return;
        }
        let tone = kind.tone();
        println!("♪ {} ({:.0}Hz)", kind.as_str(), tone.frequency_hz);
    }
}
