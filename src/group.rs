use crate::app::{Controller, Signals};
use crate::nav::ProfileBadge;
use leptos::leptos_dom::ev::SubmitEvent;
use leptos::*;

#[component]
pub fn GroupForm() -> impl IntoView {
    let signals = expect_context::<Signals>();
    let controller = expect_context::<Controller>();
    let (name, set_name) = create_signal(String::new());
    let (selected, set_selected) = create_signal(Vec::<u32>::new());

    // Closing the form resets it.
    create_effect(move |_| {
        if !signals.group_form_open.get() {
            set_name.set(String::new());
            set_selected.set(vec![]);
        }
    });

    let create_group = move |ev: SubmitEvent| {
        ev.prevent_default();
        let controller = controller.clone();
        let name = name.get_untracked();
        let member_ids = selected.get_untracked();
        spawn_local(async move {
            controller.create_group(&name, member_ids).await;
        });
    };

    let members = move || {
        signals
            .members
            .get()
            .into_iter()
            .map(|option| {
                let id = option.id;
                let checkbox_id = format!("member-{id}");
                let toggle = move |ev| {
                    let checked = event_target_checked(&ev);
                    set_selected.update(|ids| {
                        if checked {
                            if !ids.contains(&id) {
                                ids.push(id);
                            }
                        } else {
                            ids.retain(|other| *other != id);
                        }
                    });
                };
                let alt = option.label.clone();
                view! {
                    <div class="col-sm-6">
                        <div class="form-check">
                            <input
                                class="form-check-input"
                                type="checkbox"
                                value=id
                                id=checkbox_id.clone()
                                prop:checked=move || selected.with(|ids| ids.contains(&id))
                                on:change=toggle
                            />
                            <label
                                class="form-check-label d-flex align-items-center"
                                for=checkbox_id
                            >
                                <ProfileBadge avatar=option.avatar alt />
                                {option.label}
                                <span class="text-muted small ms-1">
                                    {format!("({})", option.email)}
                                </span>
                            </label>
                        </div>
                    </div>
                }
            })
            .collect::<Vec<_>>()
    };

    view! {
        <Show when=move || signals.group_form_open.get()>
            <div class="group-modal position-fixed top-0 start-0 w-100 h-100 d-flex align-items-center justify-content-center">
                <form class="card p-3 w-50" id="groupForm" on:submit=create_group.clone()>
                    <h5 class="card-title">"New group"</h5>
                    <input
                        id="groupName"
                        class="form-control mb-3"
                        placeholder="Group name"
                        on:input=move |ev| set_name.set(event_target_value(&ev))
                        prop:value=name
                    />
                    <div class="row mb-3" id="groupMembers">
                        {members}
                    </div>
                    <div class="d-flex justify-content-end gap-2">
                        <button
                            type="button"
                            class="btn btn-outline-secondary"
                            on:click=move |_| signals.group_form_open.set(false)
                        >
                            "Close"
                        </button>
                        <button type="submit" class="btn btn-primary">
                            "Create"
                        </button>
                    </div>
                </form>
            </div>
        </Show>
    }
}
