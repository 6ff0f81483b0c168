use crate::api::{Backend, MessagePatch, NewGroup};
use crate::cache::MessageCache;
use crate::config::Config;
use crate::error::ApiError;
use crate::render::{
    contact_rows, draft_view, group_rows, member_options, thread_view, Compose, ComposeMode,
    ContactRow, DraftView, MemberOption, ThreadView,
};
use crate::state::{AttachmentDraft, Conversation, Group, User};
use leptos::logging::{error, log, warn};
use std::cell::RefCell;

/// The DOM handles the controller writes to.
pub trait View {
    fn contacts(&self, rows: Vec<ContactRow>);
    fn groups(&self, rows: Vec<ContactRow>);
    fn members(&self, options: Vec<MemberOption>);
    fn thread(&self, thread: ThreadView);
    fn compose(&self, compose: Compose);
    fn draft(&self, draft: Option<DraftView>);
    fn alert(&self, message: &str);
    fn download(&self, file_name: &str, bytes: Vec<u8>);
    fn group_created(&self);
}

#[derive(Debug, Default)]
pub struct AppState {
    pub active: Option<Conversation>,
    pub edit_target: Option<u32>,
    pub draft: Option<AttachmentDraft>,
    pub cache: MessageCache,
    pub users: Vec<User>,
    pub groups: Vec<Group>,
}

fn alert_message(err: &ApiError, fallback: &str) -> String {
    let message = err.to_string();
    if message.is_empty() {
        fallback.to_owned()
    } else {
        message
    }
}

/// Owns the application state and binds user actions to backend calls.
///
/// Every mutation is followed by a full reload of the affected thread; nothing is patched
/// locally. `state` is never borrowed across an `.await`.
pub struct ChatController<B, V> {
    backend: B,
    view: V,
    me: Option<u32>,
    media_url: String,
    state: RefCell<AppState>,
}

impl<B: Backend, V: View> ChatController<B, V> {
    pub fn new(backend: B, view: V, config: &Config) -> Self {
        Self {
            backend,
            view,
            me: config.current_user_id,
            media_url: config.media_url.clone(),
            state: RefCell::new(AppState::default()),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> std::cell::Ref<'_, AppState> {
        self.state.borrow()
    }

    pub fn active(&self) -> Option<Conversation> {
        self.state.borrow().active
    }

    #[cfg(test)]
    pub fn edit_target(&self) -> Option<u32> {
        self.state.borrow().edit_target
    }

    fn render_lists(&self) {
        let (contacts, groups) = {
            let state = self.state.borrow();
            (
                contact_rows(&state.users, state.active, &self.media_url),
                group_rows(&state.groups, state.active),
            )
        };
        self.view.contacts(contacts);
        self.view.groups(groups);
    }

    fn render_thread(&self, conversation: Conversation) {
        let thread = {
            let state = self.state.borrow();
            if state.active != Some(conversation) {
                return;
            }
            thread_view(
                conversation,
                state.cache.get(&conversation).unwrap_or_default(),
                &state.users,
                &state.groups,
                self.me,
            )
        };
        self.view.thread(thread);
    }

    fn clear_draft(&self) {
        let had_draft = self.state.borrow_mut().draft.take().is_some();
        if had_draft {
            self.view.draft(None);
        }
    }

    /// Makes `conversation` the active one. A pending edit is dropped without asking.
    pub fn select(&self, conversation: Conversation) {
        {
            let mut state = self.state.borrow_mut();
            state.active = Some(conversation);
            state.edit_target = None;
        }
        self.clear_draft();
        self.view.compose(Compose::new_message());
        self.render_lists();
    }

    pub async fn open(&self, conversation: Conversation) {
        self.select(conversation);
        self.load(conversation).await;
    }

    pub async fn load(&self, conversation: Conversation) {
        match self.backend.list_messages(conversation).await {
            Ok(messages) => {
                self.state
                    .borrow_mut()
                    .cache
                    .replace(conversation, messages);
                self.render_thread(conversation);
            }
            Err(err) => error!(
                "Error loading messages for {}: {err}",
                conversation.cache_key()
            ),
        }
    }

    async fn reload_active(&self) {
        let active = self.active();
        if let Some(conversation) = active {
            self.load(conversation).await;
        }
    }

    pub async fn start(&self) {
        self.load_users().await;
        self.load_groups().await;
    }

    pub async fn load_users(&self) {
        match self.backend.list_users().await {
            Ok(users) => {
                let options = member_options(&users, &self.media_url);
                self.state.borrow_mut().users = users;
                self.view.members(options);
                self.render_lists();
            }
            Err(err) => error!("Error loading users: {err}"),
        }
    }

    pub async fn load_groups(&self) {
        match self.backend.list_groups().await {
            Ok(groups) => {
                self.state.borrow_mut().groups = groups;
                self.render_lists();
            }
            Err(err) => error!("Error loading groups: {err}"),
        }
    }

    pub fn attach(&self, draft: AttachmentDraft) {
        let view = draft_view(&draft);
        self.state.borrow_mut().draft = Some(draft);
        self.view.draft(Some(view));
    }

    pub fn discard_draft(&self) {
        self.clear_draft();
    }

    pub fn begin_edit(&self, id: u32) {
        let text = match self.state.borrow().cache.find(id) {
            Some(message) => message.text.clone(),
            None => {
                warn!("Message {id} is not cached");
                return;
            }
        };
        self.state.borrow_mut().edit_target = Some(id);
        self.view.compose(Compose {
            text,
            mode: ComposeMode::Editing(id),
        });
    }

    pub fn cancel_edit(&self) {
        self.state.borrow_mut().edit_target = None;
        self.view.compose(Compose::new_message());
    }

    /// Compose form handler: updates the message being edited, or sends a new one.
    pub async fn submit(&self, text: &str) {
        let text = text.trim();
        let (active, edit_target, draft) = {
            let state = self.state.borrow();
            (state.active, state.edit_target, state.draft.clone())
        };
        let Some(conversation) = active else {
            return;
        };
        if text.is_empty() && draft.is_none() {
            return;
        }

        if let Some(id) = edit_target {
            if let Err(err) = self.edit(id, text).await {
                error!("Error editing message {id}: {err}");
            }
            return;
        }

        match self.send(conversation, text, draft.as_ref()).await {
            Ok(()) => self.view.compose(Compose::new_message()),
            Err(err) => {
                error!("Error sending message: {err}");
                self.view.alert(&alert_message(&err, "Failed to send"));
            }
        }
    }

    pub async fn send(
        &self,
        conversation: Conversation,
        text: &str,
        attachment: Option<&AttachmentDraft>,
    ) -> Result<(), ApiError> {
        let message = self
            .backend
            .send_message(conversation, text, attachment)
            .await?;
        log!("Sent message {}", message.id);
        self.clear_draft();
        self.load(conversation).await;
        Ok(())
    }

    pub async fn edit(&self, id: u32, text: &str) -> Result<(), ApiError> {
        self.backend
            .update_message(id, MessagePatch::Text(text.to_owned()))
            .await?;
        self.state.borrow_mut().edit_target = None;
        self.clear_draft();
        self.view.compose(Compose::new_message());
        self.reload_active().await;
        Ok(())
    }

    /// Sends the reaction as is. Whether a repeated emoji clears it is up to the backend.
    pub async fn react(&self, id: u32, emoji: &str) {
        match self
            .backend
            .update_message(id, MessagePatch::Reaction(emoji.to_owned()))
            .await
        {
            Ok(_) => self.reload_active().await,
            Err(err) => error!("Error reacting to message {id}: {err}"),
        }
    }

    pub async fn remove(&self, id: u32) {
        match self.backend.delete_message(id).await {
            Ok(()) => self.reload_active().await,
            Err(err) => error!("Error deleting message {id}: {err}"),
        }
    }

    pub async fn export(&self) {
        let Some(conversation) = self.active() else {
            return;
        };
        if self.me.is_none() {
            return;
        }
        match self.backend.export_messages(conversation).await {
            Ok(bytes) => self
                .view
                .download(&conversation.export_file_name(), bytes),
            Err(err) => error!("Error exporting {}: {err}", conversation.cache_key()),
        }
    }

    pub async fn create_group(&self, name: &str, member_ids: Vec<u32>) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let group = NewGroup {
            name: name.to_owned(),
            member_ids,
        };
        match self.backend.create_group(&group).await {
            Ok(created) => {
                log!("Created group {}", created.id);
                self.load_groups().await;
                self.view.group_created();
            }
            Err(err) => {
                error!("Error creating group: {err}");
                self.view.alert(&alert_message(&err, "Group create failed"));
            }
        }
    }
}
