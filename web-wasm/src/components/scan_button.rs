//! スキャン開始・停止ボタン

use leptos::prelude::*;

#[component]
pub fn ScanButton<F>(
    is_scanning: Signal<bool>,
    camera_ready: Signal<bool>,
    on_toggle: F,
) -> impl IntoView
where
    F: Fn(()) + 'static + Clone,
{
    view! {
        <button
            class=move || if is_scanning.get() { "btn btn-stop" } else { "btn btn-primary" }
            disabled=move || !camera_ready.get()
            on:click=move |_| on_toggle(())
        >
            {move || if is_scanning.get() { "Stop Scanning" } else { "Start Scanning" }}
        </button>
    }
}
