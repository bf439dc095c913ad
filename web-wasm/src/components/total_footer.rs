//! 合計表示

use leptos::prelude::*;
use vision_shop_common::{format_money, Cart};

#[component]
pub fn TotalFooter<F>(cart: RwSignal<Cart>, on_announce_total: F) -> impl IntoView
where
    F: Fn(()) + 'static + Clone,
{
    view! {
        <footer class="total-footer">
            <span class="total-label">"Total"</span>
            <span class="total-amount">{move || cart.with(|c| format_money(c.total()))}</span>
            <button class="btn btn-primary" on:click=move |_| on_announce_total(())>
                "Read Total"
            </button>
        </footer>
    }
}
