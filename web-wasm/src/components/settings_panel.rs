//! 設定パネルコンポーネント

use leptos::prelude::*;

#[component]
pub fn SettingsPanel<F>(endpoint: RwSignal<String>, on_save: F) -> impl IntoView
where
    F: Fn(String) + 'static + Clone,
{
    let (draft, set_draft) = signal(endpoint.get_untracked());

    view! {
        <div class="settings-panel">
            <div class="form-group">
                <label for="endpoint">"Detection server"</label>
                <input
                    type="url"
                    id="endpoint"
                    placeholder="https://192.168.1.111:5000"
                    prop:value=move || draft.get()
                    on:input=move |ev| {
                        set_draft.set(event_target_value(&ev));
                    }
                />
                <button class="btn btn-secondary" on:click=move |_| on_save(draft.get_untracked())>
                    "Save"
                </button>
            </div>
            <p class="text-muted">{move || format!("Using {}", endpoint.get())}</p>
        </div>
    }
}
