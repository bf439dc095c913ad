//! ヘッダーコンポーネント

use leptos::prelude::*;

#[component]
pub fn Header<F>(on_help: F) -> impl IntoView
where
    F: Fn(()) + 'static + Clone,
{
    view! {
        <header class="header">
            <h1>"Vision Shop"</h1>
            <button class="btn btn-help" on:click=move |_| on_help(())>"?"</button>
        </header>
    }
}
