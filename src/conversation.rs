use crate::app::{Controller, Signals};
use crate::browser;
use crate::message::{DraftPreview, Message};
use crate::render::ComposeMode;
use leptos::leptos_dom::ev::SubmitEvent;
use leptos::logging::error;
use leptos::*;
use web_sys::HtmlInputElement;

#[component]
pub fn Conversation() -> impl IntoView {
    let signals = expect_context::<Signals>();
    let controller = expect_context::<Controller>();
    let (message, set_message) = create_signal(String::new());
    let messages_ref = create_node_ref::<html::Main>();
    let file_input = create_node_ref::<html::Input>();

    create_effect(move |_| {
        let compose = signals.compose.get();
        set_message.set(compose.text);
    });

    create_effect(move |_| {
        signals.thread.with(|_| ());
        request_animation_frame(move || {
            if let Some(main) = messages_ref.get_untracked() {
                main.set_scroll_top(main.scroll_height());
            }
        });
    });

    let update_message = move |ev| {
        let v = event_target_value(&ev);
        set_message.set(v);
    };

    let submit_ctrl = controller.clone();
    let send_message = move |ev: SubmitEvent| {
        ev.prevent_default();
        let content = message.get_untracked();
        let controller = submit_ctrl.clone();
        spawn_local(async move {
            controller.submit(&content).await;
        });
    };

    let attach_ctrl = controller.clone();
    let select_file = move |ev: ev::Event| {
        let input: HtmlInputElement = event_target(&ev);
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        input.set_value("");
        let controller = attach_ctrl.clone();
        spawn_local(async move {
            match browser::read_file(file).await {
                Ok(draft) => controller.attach(draft),
                Err(err) => error!("Could not read attachment {err}"),
            }
        });
    };

    let export_ctrl = controller.clone();
    let export = move |_| {
        let controller = export_ctrl.clone();
        spawn_local(async move {
            controller.export().await;
        });
    };

    let cancel_edit = move |_: ev::MouseEvent| controller.cancel_edit();
    let editing = move || matches!(signals.compose.with(|c| c.mode), ComposeMode::Editing(_));

    view! {
        <section class="col-md-8 col-lg-9 d-flex flex-column vh-100">
            <header class="d-flex align-items-center justify-content-between border-bottom p-3">
                <div>
                    <h5 id="chatTitle" class="mb-0">
                        {move || {
                            signals
                                .thread
                                .with(|t| {
                                    t.as_ref()
                                        .map(|t| t.title.clone())
                                        .unwrap_or_else(|| "Select a conversation".to_owned())
                                })
                        }}
                    </h5>
                    <small id="chatSubtitle" class="text-muted">
                        {move || {
                            signals
                                .thread
                                .with(|t| t.as_ref().map(|t| t.subtitle.clone()).unwrap_or_default())
                        }}
                    </small>
                </div>
                <button
                    id="downloadCsvBtn"
                    type="button"
                    class="btn btn-sm btn-outline-success"
                    disabled=move || signals.thread.with(Option::is_none)
                    on:click=export
                >
                    "Export CSV"
                </button>
            </header>
            <main class="messages flex-grow-1 overflow-auto p-3" id="chat_section" node_ref=messages_ref>
                {move || {
                    signals
                        .thread
                        .get()
                        .map(|thread| {
                            thread
                                .rows
                                .into_iter()
                                .map(|row| view! { <Message row /> })
                                .collect::<Vec<_>>()
                        })
                }}
            </main>
            <form class="border-top p-3" id="messageForm" on:submit=send_message>
                {move || signals.draft.get().map(|draft| view! { <DraftPreview draft /> })}
                <div class="d-flex align-items-center gap-2">
                    <input
                        id="attachmentInput"
                        type="file"
                        class="d-none"
                        node_ref=file_input
                        on:change=select_file
                    />
                    <button
                        id="attachBtn"
                        type="button"
                        class="btn btn-outline-secondary"
                        on:click=move |_| {
                            if let Some(input) = file_input.get() {
                                input.click();
                            }
                        }
                    >
                        "📎"
                        <span class="visually-hidden">"Attach file"</span>
                    </button>
                    <label for="messageInput" class="visually-hidden">
                        "Your message"
                    </label>
                    <input
                        id="messageInput"
                        class="form-control"
                        placeholder="Your message..."
                        on:input=update_message
                        prop:value=message
                    />
                    <Show when=editing>
                        <button type="button" class="btn btn-outline-secondary" on:click=cancel_edit.clone()>
                            "Cancel"
                        </button>
                    </Show>
                    <button id="sendBtn" type="submit" class="btn btn-primary">
                        {move || signals.compose.with(|c| c.button_label())}
                    </button>
                </div>
            </form>
        </section>
    }
}
