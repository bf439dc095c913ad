//! カート一覧コンポーネント

use leptos::prelude::*;
use vision_shop_common::{format_money, Cart, CartItem};

#[component]
pub fn CartSummary<FR, FQ, FC>(
    cart: RwSignal<Cart>,
    on_remove: FR,
    on_change_quantity: FQ,
    on_clear: FC,
) -> impl IntoView
where
    FR: Fn(u64) + Clone + Send + Sync + 'static,
    FQ: Fn((u64, i64)) + Clone + Send + Sync + 'static,
    FC: Fn(()) + 'static + Clone,
{
    let lines = move || cart.with(|c| c.lines().to_vec());

    view! {
        <section class="cart-summary">
            <div class="cart-header">
                <h2>{move || format!("Cart ({})", cart.with(|c| c.len()))}</h2>
                <button
                    class="btn btn-secondary"
                    disabled=move || cart.with(|c| c.is_empty())
                    on:click=move |_| on_clear(())
                >
                    "Clear"
                </button>
            </div>

            <Show
                when=move || !cart.with(|c| c.is_empty())
                fallback=|| view! { <p class="text-muted">"Tap the camera view to add the item you see."</p> }
            >
                <ul class="cart-lines">
                    <For
                        each=lines
                        key=|item: &CartItem| (item.timestamp, item.quantity)
                        children={
                            let on_remove = on_remove.clone();
                            let on_change_quantity = on_change_quantity.clone();
                            move |item: CartItem| {
                                let timestamp = item.timestamp;
                                let on_remove = on_remove.clone();
                                let on_inc = on_change_quantity.clone();
                                let on_dec = on_change_quantity.clone();
                                view! {
                                    <li class="cart-line">
                                        <div class="cart-line-info">
                                            <span class="cart-line-name">{item.name().to_string()}</span>
                                            <span class="cart-line-unit">
                                                {format!("{} each", format_money(item.product.price))}
                                            </span>
                                        </div>
                                        <div class="cart-line-controls">
                                            <button
                                                class="btn btn-small"
                                                disabled={item.quantity <= 1}
                                                on:click=move |_| on_dec((timestamp, -1))
                                            >
                                                "-"
                                            </button>
                                            <span class="cart-line-qty">{item.quantity}</span>
                                            <button
                                                class="btn btn-small"
                                                on:click=move |_| on_inc((timestamp, 1))
                                            >
                                                "+"
                                            </button>
                                        </div>
                                        <span class="cart-line-subtotal">{format_money(item.subtotal())}</span>
                                        <button
                                            class="btn btn-small btn-remove"
                                            on:click=move |_| on_remove(timestamp)
                                        >
                                            "Remove"
                                        </button>
                                    </li>
                                }
                            }
                        }
                    />
                </ul>
            </Show>
        </section>
    }
}
