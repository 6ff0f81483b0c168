use crate::api::HttpBackend;
use crate::browser::{self, BrowserSession};
use crate::controller::{ChatController, View};
use crate::conversation::Conversation;
use crate::group::GroupForm;
use crate::login::Login;
use crate::nav::Nav;
use crate::render::{Compose, ContactRow, DraftView, MemberOption, ThreadView};
use leptos::logging::error;
use leptos::*;
use std::rc::Rc;

pub type Controller = Rc<ChatController<HttpBackend, SignalView>>;

/// Reactive handles the components render from.
#[derive(Clone, Copy)]
pub struct Signals {
    pub contacts: RwSignal<Vec<ContactRow>>,
    pub groups: RwSignal<Vec<ContactRow>>,
    pub members: RwSignal<Vec<MemberOption>>,
    pub thread: RwSignal<Option<ThreadView>>,
    pub compose: RwSignal<Compose>,
    pub draft: RwSignal<Option<DraftView>>,
    pub group_form_open: RwSignal<bool>,
}

impl Signals {
    fn new() -> Self {
        Self {
            contacts: create_rw_signal(vec![]),
            groups: create_rw_signal(vec![]),
            members: create_rw_signal(vec![]),
            thread: create_rw_signal(None),
            compose: create_rw_signal(Compose::new_message()),
            draft: create_rw_signal(None),
            group_form_open: create_rw_signal(false),
        }
    }
}

pub struct SignalView {
    signals: Signals,
}

impl View for SignalView {
    fn contacts(&self, rows: Vec<ContactRow>) {
        self.signals.contacts.set(rows);
    }

    fn groups(&self, rows: Vec<ContactRow>) {
        self.signals.groups.set(rows);
    }

    fn members(&self, options: Vec<MemberOption>) {
        self.signals.members.set(options);
    }

    fn thread(&self, thread: ThreadView) {
        self.signals.thread.set(Some(thread));
    }

    fn compose(&self, compose: Compose) {
        self.signals.compose.set(compose);
    }

    fn draft(&self, draft: Option<DraftView>) {
        let previous = self
            .signals
            .draft
            .with_untracked(|d| d.as_ref().and_then(|d| d.object_url.clone()));
        if let Some(url) = previous {
            browser::revoke(&url);
        }
        self.signals.draft.set(draft);
    }

    fn alert(&self, message: &str) {
        browser::alert(message);
    }

    fn download(&self, file_name: &str, bytes: Vec<u8>) {
        if let Err(err) = browser::download_bytes(file_name, &bytes) {
            error!("Download of {file_name} failed {err}");
        }
    }

    fn group_created(&self) {
        self.signals.group_form_open.set(false);
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = match browser::config() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid page configuration {err}");
            return view! { <div class="alert alert-danger m-3">"Chat is unavailable."</div> }
                .into_view();
        }
    };
    if !config.authenticated {
        return view! { <Login logout_url=config.logout_url /> }.into_view();
    }

    let signals = Signals::new();
    let controller: Controller = Rc::new(ChatController::new(
        HttpBackend::new(config.clone(), BrowserSession::new(&config)),
        SignalView { signals },
        &config,
    ));
    provide_context(signals);
    provide_context(controller.clone());
    spawn_local(async move {
        controller.start().await;
    });

    let logout_url = config.logout_url.clone();
    let greeting = format!("Hello, {}", config.user_name);
    view! {
        <div class="container-fluid chat-app">
            <header class="d-flex align-items-center justify-content-between py-2">
                <span id="userGreeting" class="fw-semibold">
                    {greeting}
                </span>
                <button
                    id="logoutBtn"
                    type="button"
                    class="btn btn-sm btn-outline-secondary"
                    on:click=move |_| browser::redirect(&logout_url)
                >
                    "Logout"
                </button>
            </header>
            <div class="row g-0">
                <Nav />
                <Conversation />
            </div>
            <GroupForm />
        </div>
    }
    .into_view()
}
