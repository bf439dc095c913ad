//! ブラウザの音声合成・効果音
//!
//! どちらも使えない環境では何もしない（エラーは握りつぶす）。

use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use web_sys::{AudioContext, SpeechSynthesisUtterance, SpeechSynthesisVoice};
use vision_shop_common::feedback::{
    select_voice, Feedback, Priority, SoundKind, ToneSpec, VoiceInfo, SPEECH_PITCH, SPEECH_RATE,
    SPEECH_VOLUME,
};

thread_local! {
    /// 効果音用に使い回す AudioContext（初回の効果音で作る）
    static AUDIO: RefCell<Option<AudioContext>> = const { RefCell::new(None) };
}

#[derive(Clone, Copy, Default)]
pub struct BrowserFeedback;

impl Feedback for BrowserFeedback {
    fn speak(&self, text: &str, priority: Priority) {
        let _ = speak(text, priority);
    }

    fn play_sound(&self, kind: SoundKind) {
        let _ = play_tone(kind.tone());
    }
}

fn speak(text: &str, priority: Priority) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or(JsValue::NULL)?;
    let synth = window.speech_synthesis()?;

    // スキャン周期に遅れないよう、高優先度は読み上げ中のものを打ち切る
    if priority == Priority::High {
        synth.cancel();
    }

    let utterance = SpeechSynthesisUtterance::new_with_text(text)?;
    utterance.set_rate(SPEECH_RATE);
    utterance.set_pitch(SPEECH_PITCH);
    utterance.set_volume(SPEECH_VOLUME);

    let voices: Vec<SpeechSynthesisVoice> = synth
        .get_voices()
        .iter()
        .filter_map(|v| v.dyn_into().ok())
        .collect();
    let infos: Vec<VoiceInfo> = voices
        .iter()
        .map(|v| VoiceInfo {
            name: v.name(),
            lang: v.lang(),
        })
        .collect();
    if let Some(index) = select_voice(&infos) {
        utterance.set_voice(Some(&voices[index]));
    }

    synth.speak(&utterance);
    Ok(())
}

fn audio_context() -> Result<AudioContext, JsValue> {
    AUDIO.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(ctx) = slot.as_ref() {
            return Ok(ctx.clone());
        }
        let ctx = AudioContext::new()?;
        *slot = Some(ctx.clone());
        Ok(ctx)
    })
}

fn play_tone(tone: ToneSpec) -> Result<(), JsValue> {
    let ctx = audio_context()?;
    // 自動再生制限で止まっている場合がある
    let _ = ctx.resume();
    let osc = ctx.create_oscillator()?;
    let gain = ctx.create_gain()?;

    osc.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;

    let now = ctx.current_time();
    osc.frequency().set_value_at_time(tone.frequency_hz, now)?;
    gain.gain().set_value_at_time(tone.start_gain, now)?;
    gain.gain()
        .exponential_ramp_to_value_at_time(ToneSpec::END_GAIN, now + tone.decay_secs)?;

    osc.start()?;
    osc.stop_with_when(now + ToneSpec::STOP_AFTER_SECS)?;
    Ok(())
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn wasm_tones_share_one_audio_context() {
        let first = audio_context().expect("AudioContext 作成失敗");
        BrowserFeedback.play_sound(SoundKind::Click);
        BrowserFeedback.play_sound(SoundKind::Success);
        let second = audio_context().expect("AudioContext 取得失敗");

        assert_eq!(JsValue::from(first), JsValue::from(second));
    }
}
