//! カメラ表示コンポーネント
//!
//! 画面タップが「追加」操作。状態表示と追加済み表示を重ねる。

use leptos::prelude::*;
use leptos::task::spawn_local;
use vision_shop_common::{format_money, status_label, CameraStatus, ScanController};
use crate::camera::{open_stream, CameraHandle, CameraStream};

#[component]
pub fn CameraFeed<F>(
    camera: CameraHandle,
    scan: RwSignal<ScanController>,
    added: RwSignal<Option<String>>,
    on_tap: F,
) -> impl IntoView
where
    F: Fn(()) + 'static + Clone,
{
    let stream = StoredValue::new_local(None::<CameraStream>);

    // video 要素が出来たら一度だけカメラを開く
    Effect::new(move |started: Option<bool>| {
        if started == Some(true) {
            return true;
        }
        if camera.video.get().is_none() {
            return false;
        }
        spawn_local(async move {
            match open_stream().await {
                Ok(opened) => {
                    let attached = camera.attach(&opened).await;
                    // 破棄済みならここで drop されトラックが止まる
                    if stream.try_set_value(Some(opened)).is_some() {
                        return;
                    }
                    match attached {
                        Ok(()) => camera.mark_active(),
                        Err(e) => {
                            stream.try_set_value(None);
                            camera.mark_unavailable(&e);
                        }
                    }
                }
                Err(e) => camera.mark_unavailable(&e),
            }
        });
        true
    });

    on_cleanup(move || {
        stream.try_set_value(None);
    });

    let label = move || scan.with(|s| status_label(s.session()));
    let seen = move || {
        scan.with(|s| {
            s.last_seen().and_then(|d| {
                d.detected_name().map(|name| match d.price {
                    Some(price) => format!("{} {}", name, format_money(price)),
                    None => name.to_string(),
                })
            })
        })
    };
    let unavailable = move || match camera.status.get() {
        CameraStatus::Unavailable(message) => Some(message),
        _ => None,
    };

    view! {
        <div class="camera-feed" on:click=move |_| on_tap(())>
            <video node_ref=camera.video class="camera-video"></video>
            <canvas node_ref=camera.canvas class="hidden"></canvas>

            <div class="camera-status">{label}</div>

            {move || seen().map(|text| view! { <div class="camera-seen">{text}</div> })}

            {move || added.get().map(|name| view! {
                <div class="camera-added">{format!("Added {}", name)}</div>
            })}

            {move || unavailable().map(|message| view! {
                <div class="camera-unavailable">{message}</div>
            })}
        </div>
    }
}
