//! Vision Shop Web App (Leptos + WASM)

mod app;
mod api;
mod camera;
mod components;
mod feedback;
mod settings;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(app::App);
}
