use crate::app::{Controller, Signals};
use crate::render::{Avatar, ContactRow};
use ev::MouseEvent;
use leptos::*;

#[component]
pub fn ProfileBadge(avatar: Avatar, alt: String) -> impl IntoView {
    match avatar {
        Avatar::Photo(url) => view! {
            <div class="avatar">
                <img class="avatar-photo" src=url alt=alt />
            </div>
        }
        .into_view(),
        Avatar::Initial(initial) => view! { <div class="avatar">{initial.to_string()}</div> }
            .into_view(),
    }
}

#[component]
fn Row(row: ContactRow) -> impl IntoView {
    let controller = expect_context::<Controller>();
    let conversation = row.conversation;
    let onclick = move |ev: MouseEvent| {
        ev.prevent_default();
        let controller = controller.clone();
        spawn_local(async move {
            controller.open(conversation).await;
        });
    };
    let alt = row.label.clone();
    view! {
        <button
            type="button"
            class="list-group-item list-group-item-action d-flex align-items-center justify-content-between contact-btn"
            class:active=row.active
            on:click=onclick
        >
            <div class="d-flex align-items-center">
                <ProfileBadge avatar=row.avatar alt />
                <span>{row.label}</span>
            </div>
            {row.detail.map(|detail| view! { <span class="text-muted small">{detail}</span> })}
        </button>
    }
}

#[component]
pub fn Nav() -> impl IntoView {
    let signals = expect_context::<Signals>();
    view! {
        <aside class="col-md-4 col-lg-3 border-end contacts-panel">
            <h6 class="text-uppercase text-muted px-3 pt-3">"Contacts"</h6>
            <div class="list-group list-group-flush" id="list">
                {move || {
                    signals
                        .contacts
                        .get()
                        .into_iter()
                        .map(|row| view! { <Row row /> })
                        .collect::<Vec<_>>()
                }}
            </div>
            <div class="d-flex align-items-center justify-content-between px-3 pt-3">
                <h6 class="text-uppercase text-muted mb-0">"Groups"</h6>
                <button
                    type="button"
                    class="btn btn-sm btn-outline-primary"
                    on:click=move |_| signals.group_form_open.set(true)
                >
                    "+ New group"
                </button>
            </div>
            <div class="list-group list-group-flush" id="groupList">
                {move || {
                    signals
                        .groups
                        .get()
                        .into_iter()
                        .map(|row| view! { <Row row /> })
                        .collect::<Vec<_>>()
                }}
            </div>
        </aside>
    }
}
