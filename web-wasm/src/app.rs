//! メインアプリケーションコンポーネント

use gloo::timers::callback::{Interval, Timeout};
use leptos::prelude::*;
use leptos::task::spawn_local;
use vision_shop_common::{
    detect_url, phrases, CameraStatus, Cart, DetectionResponse, Feedback, FrameSource, Priority,
    ScanController, SoundKind, ADDED_FEEDBACK_MS, SCAN_INTERVAL_MS,
};
use crate::api::detect::detect;
use crate::camera::CameraHandle;
use crate::components::{
    camera_feed::CameraFeed,
    cart_summary::CartSummary,
    header::Header,
    scan_button::ScanButton,
    settings_panel::SettingsPanel,
    total_footer::TotalFooter,
};
use crate::feedback::BrowserFeedback;
use crate::settings;

fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// スキャン開始。すぐに1サイクル実行してから周期タイマーを張る
///
/// 返した `Interval` を drop するとタイマーは止まる。
pub(crate) fn start_scanning<C>(scan: RwSignal<ScanController>, run_cycle: C) -> Interval
where
    C: Fn() + 'static,
{
    scan.update(|s| {
        s.start(&BrowserFeedback);
    });
    run_cycle();
    Interval::new(SCAN_INTERVAL_MS as u32, run_cycle)
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let scan = RwSignal::new(ScanController::new());
    let cart = RwSignal::new(Cart::new());
    let added = RwSignal::new(None::<String>);
    let endpoint = RwSignal::new(settings::load_endpoint());
    let camera = CameraHandle::new();

    // drop でタイマーは解除される
    let ticker = StoredValue::new_local(None::<Interval>);
    let added_timeout = StoredValue::new_local(None::<Timeout>);

    // 検出サイクル（実行中なら tick ごと捨てる）
    let run_cycle = move || {
        let Some(ticket) = scan.try_update(|s| s.begin_cycle()).flatten() else {
            return;
        };
        let mut source = camera;
        let Some(image) = source.capture_frame() else {
            scan.update(|s| s.abandon_cycle(ticket));
            return;
        };
        let url = detect_url(&endpoint.get_untracked());

        spawn_local(async move {
            let response = match url {
                Ok(url) => detect(&url, &image).await,
                Err(_) => DetectionResponse::connection_failed(),
            };
            scan.try_update(|s| s.finish_cycle(ticket, &response, now_ms(), &BrowserFeedback));
        });
    };

    let on_toggle = move |_| {
        BrowserFeedback.play_sound(SoundKind::Click);
        if scan.with_untracked(|s| s.is_scanning()) {
            ticker.set_value(None);
            scan.update(|s| {
                s.stop();
            });
        } else {
            ticker.set_value(Some(start_scanning(scan, run_cycle)));
        }
    };

    // 画面タップで検出中の商品を追加
    let on_tap = move |_| {
        let detection = scan.with_untracked(|s| s.last_seen().cloned());
        let outcome = cart.try_update(|c| c.add_detected(detection.as_ref(), now_ms(), &BrowserFeedback));
        if let Some(name) = outcome.as_ref().and_then(|o| o.accepted_name()) {
            added.set(Some(name.to_string()));
            added_timeout.set_value(Some(Timeout::new(ADDED_FEEDBACK_MS as u32, move || {
                added.try_set(None);
            })));
        }
    };

    let on_remove = move |timestamp: u64| {
        cart.update(|c| {
            c.remove(timestamp, &BrowserFeedback);
        });
    };

    let on_change_quantity = move |(timestamp, delta): (u64, i64)| {
        cart.update(|c| {
            c.update_quantity(timestamp, delta, &BrowserFeedback);
        });
    };

    let on_clear = move |_| {
        cart.update(|c| c.clear(&BrowserFeedback));
    };

    let on_announce_total = move |_| {
        cart.with_untracked(|c| c.announce_total(&BrowserFeedback));
    };

    let on_help = move |_| {
        BrowserFeedback.speak(phrases::HELP, Priority::High);
    };

    let on_save_endpoint = move |value: String| match settings::validate_endpoint(&value) {
        Ok(value) => {
            if let Err(e) = settings::save_endpoint(&value) {
                web_sys::console::warn_1(&e.into());
            }
            endpoint.set(value);
        }
        Err(e) => web_sys::console::warn_1(&e.into()),
    };

    let is_scanning = Signal::derive(move || scan.with(|s| s.is_scanning()));
    let camera_ready = Signal::derive(move || camera.status.get() == CameraStatus::Active);

    view! {
        <div class="container">
            <Header on_help=on_help />

            <CameraFeed camera=camera scan=scan added=added on_tap=on_tap />

            <ScanButton is_scanning=is_scanning camera_ready=camera_ready on_toggle=on_toggle />

            <CartSummary
                cart=cart
                on_remove=on_remove
                on_change_quantity=on_change_quantity
                on_clear=on_clear
            />

            <TotalFooter cart=cart on_announce_total=on_announce_total />

            <SettingsPanel endpoint=endpoint on_save=on_save_endpoint />
        </div>
    }
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn wasm_start_runs_first_cycle_immediately() {
        let scan = RwSignal::new(ScanController::new());
        let cycles = Rc::new(Cell::new(0));

        let counter = Rc::clone(&cycles);
        let ticker = start_scanning(scan, move || {
            if scan.try_update(|s| s.begin_cycle()).flatten().is_some() {
                counter.set(counter.get() + 1);
            }
        });

        assert_eq!(cycles.get(), 1);
        assert!(scan.with_untracked(|s| s.is_scanning()));
        assert!(scan.with_untracked(|s| s.session().is_cycle_in_flight()));
        drop(ticker);
    }
}
