use crate::app::Controller;
use crate::browser;
use crate::render::{AttachmentView, DraftView, MessageRow, Preview, REACTIONS};
use leptos::*;

#[component]
fn PreviewMedia(preview: Preview, alt: String) -> impl IntoView {
    match preview {
        Preview::Image(url) => view! {
            <img src=url class="attachment-thumbnail" alt=alt />
        }
        .into_view(),
        Preview::Video { url, mime } => view! {
            <video controls class="attachment-thumbnail">
                <source src=url type=mime />
                "Your browser does not support the video tag."
            </video>
        }
        .into_view(),
        Preview::Icon(icon) => view! { <div class="attachment-icon">{icon}</div> }.into_view(),
    }
}

#[component]
fn AttachmentBlock(attachment: AttachmentView) -> impl IntoView {
    let AttachmentView {
        url,
        file_name,
        preview,
    } = attachment;
    let open_url = url.clone();
    let download_name = file_name.clone();
    let alt = file_name.clone();
    view! {
        <div class="attachment-container">
            <PreviewMedia preview alt />
            <div class="attachment-info">
                <div class="attachment-name">{file_name}</div>
            </div>
            <div class="attachment-actions">
                <button
                    type="button"
                    class="btn btn-sm btn-outline-primary btn-open"
                    on:click=move |_| browser::open(&open_url)
                >
                    "Open"
                </button>
                <button
                    type="button"
                    class="btn btn-sm btn-outline-secondary btn-download"
                    on:click=move |_| browser::download_url(&url, &download_name)
                >
                    "Download"
                </button>
            </div>
        </div>
    }
}

#[component]
pub fn DraftPreview(draft: DraftView) -> impl IntoView {
    let controller = expect_context::<Controller>();
    let DraftView {
        file_name,
        size,
        preview,
        object_url,
    } = draft;
    let alt = file_name.clone();
    let open = move |_| {
        if let Some(url) = &object_url {
            browser::open(url);
        }
    };
    view! {
        <div class="attachment-preview">
            <PreviewMedia preview alt />
            <div class="attachment-info">
                <div class="attachment-name">{file_name}</div>
                <div class="attachment-size">{size}</div>
            </div>
            <div class="attachment-actions">
                <button type="button" class="btn btn-sm btn-outline-primary btn-open" on:click=open>
                    "Open"
                </button>
                <button
                    type="button"
                    class="btn btn-sm btn-outline-secondary btn-download"
                    on:click=move |_| controller.discard_draft()
                >
                    "Remove"
                </button>
            </div>
        </div>
    }
}

#[component]
pub fn Message(row: MessageRow) -> impl IntoView {
    let controller = expect_context::<Controller>();
    let id = row.id;

    let reactions = REACTIONS
        .iter()
        .map(|&emoji| {
            let controller = controller.clone();
            let react = move |_| {
                let controller = controller.clone();
                spawn_local(async move {
                    controller.react(id, emoji).await;
                });
            };
            view! {
                <button type="button" class="msg-btn" on:click=react>
                    {emoji}
                </button>
            }
        })
        .collect::<Vec<_>>();

    let edit_ctrl = controller.clone();
    let edit = move |_| edit_ctrl.begin_edit(id);
    let delete = move |_| {
        let controller = controller.clone();
        spawn_local(async move {
            controller.remove(id).await;
        });
    };

    view! {
        <div class=row.direction.class() data-msg-id=id>
            <div class="d-flex justify-content-between align-items-start gap-2">
                <div class="flex-grow-1">
                    <div class="msg-text" inner_html=row.body_html />
                    {row.attachment.map(|attachment| view! { <AttachmentBlock attachment /> })}
                    {row
                        .sender_label
                        .map(|label| view! { <div class="small text-muted">{label}</div> })}
                </div>
                <div class="msg-actions align-items-center">
                    <div class="reaction-picker">{reactions}</div>
                    <button type="button" class="msg-btn" on:click=edit>
                        "✏️"
                    </button>
                    <button type="button" class="msg-btn" on:click=delete>
                        "🗑️"
                    </button>
                </div>
            </div>
            <div class="d-flex align-items-center gap-2 mt-1">
                <small class="time-badge">{row.time}</small>
                {row.reaction.map(|reaction| view! { <span class="reaction-badge mt-1">{reaction}</span> })}
            </div>
        </div>
    }
}
