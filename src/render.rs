//! View records derived from cached state. Nothing here touches the network or the DOM.

use crate::state::{Attachment, AttachmentDraft, Conversation, Group, Message, User};
use chrono::{DateTime, Local, Utc};

pub const REACTIONS: [&str; 6] = ["❤️", "😂", "👍", "🎉", "🙏", "😮"];

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

#[derive(Debug, Clone, PartialEq)]
pub enum Avatar {
    Photo(String),
    Initial(char),
}

impl Avatar {
    fn of(user: &User, media_url: &str) -> Self {
        match user.profile_photo_url(media_url) {
            Some(url) => Avatar::Photo(url),
            None => Avatar::Initial(user.initial()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactRow {
    pub conversation: Conversation,
    pub label: String,
    pub avatar: Avatar,
    pub detail: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    pub fn class(&self) -> &'static str {
        match self {
            Direction::Outbound => "message-bubble message-out",
            Direction::Inbound => "message-bubble message-in",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Image(String),
    Video { url: String, mime: String },
    Icon(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentView {
    pub url: String,
    pub file_name: String,
    pub preview: Preview,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageRow {
    pub id: u32,
    pub direction: Direction,
    pub body_html: String,
    pub sender_label: Option<String>,
    pub attachment: Option<AttachmentView>,
    pub reaction: Option<String>,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThreadView {
    pub conversation: Conversation,
    pub title: String,
    pub subtitle: String,
    pub rows: Vec<MessageRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftView {
    pub file_name: String,
    pub size: String,
    pub preview: Preview,
    pub object_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberOption {
    pub id: u32,
    pub label: String,
    pub email: String,
    pub avatar: Avatar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeMode {
    New,
    Editing(u32),
}

/// State of the compose box. Editing and composing a new message are exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Compose {
    pub text: String,
    pub mode: ComposeMode,
}

impl Compose {
    pub fn new_message() -> Self {
        Self {
            text: String::new(),
            mode: ComposeMode::New,
        }
    }

    pub fn button_label(&self) -> &'static str {
        match self.mode {
            ComposeMode::New => "Send",
            ComposeMode::Editing(_) => "Save",
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let _ = pulldown_cmark_escape::escape_html(&mut out, text);
    out
}

pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_owned();
    }
    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < SIZE_UNITS.len() && bytes >= scale * 1024 {
        scale *= 1024;
        unit += 1;
    }
    let value = (bytes as f64 / scale as f64 * 100.0).round() / 100.0;
    format!("{value} {}", SIZE_UNITS[unit])
}

pub fn file_icon(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match ext.as_str() {
        "pdf" | "txt" => "📄",
        "doc" | "docx" => "📝",
        "xls" | "xlsx" | "csv" => "📊",
        "zip" | "rar" | "7z" => "📦",
        "mp3" | "wav" => "🎵",
        "mp4" | "avi" => "🎬",
        "jpg" | "jpeg" | "png" | "gif" => "🖼️",
        _ => "📎",
    }
}

pub fn format_time(at: DateTime<Utc>) -> String {
    DateTime::<Local>::from(at).format("%H:%M").to_string()
}

pub fn contact_rows(
    users: &[User],
    active: Option<Conversation>,
    media_url: &str,
) -> Vec<ContactRow> {
    users
        .iter()
        .map(|user| {
            let conversation = Conversation::User(user.id);
            ContactRow {
                conversation,
                label: user.display_name(),
                avatar: Avatar::of(user, media_url),
                detail: None,
                active: active == Some(conversation),
            }
        })
        .collect()
}

pub fn group_rows(groups: &[Group], active: Option<Conversation>) -> Vec<ContactRow> {
    groups
        .iter()
        .map(|group| {
            let conversation = Conversation::Group(group.id);
            let initial = group
                .name
                .chars()
                .next()
                .and_then(|c| c.to_uppercase().next())
                .unwrap_or('?');
            ContactRow {
                conversation,
                label: format!("{} (Group)", group.name),
                avatar: Avatar::Initial(initial),
                detail: Some(format!("{} members", group.member_count())),
                active: active == Some(conversation),
            }
        })
        .collect()
}

pub fn member_options(users: &[User], media_url: &str) -> Vec<MemberOption> {
    users
        .iter()
        .map(|user| MemberOption {
            id: user.id,
            label: user.display_name(),
            email: user.email.clone(),
            avatar: Avatar::of(user, media_url),
        })
        .collect()
}

fn attachment_view(attachment: &Attachment) -> AttachmentView {
    let preview = if attachment.is_image {
        Preview::Image(attachment.url.clone())
    } else if attachment.is_video {
        Preview::Video {
            url: attachment.url.clone(),
            mime: "video/mp4".to_owned(),
        }
    } else {
        Preview::Icon(file_icon(&attachment.file_name))
    };
    AttachmentView {
        url: attachment.url.clone(),
        file_name: attachment.file_name.clone(),
        preview,
    }
}

pub fn thread_view(
    conversation: Conversation,
    messages: &[Message],
    users: &[User],
    groups: &[Group],
    me: Option<u32>,
) -> ThreadView {
    let (title, subtitle) = match conversation {
        Conversation::User(id) => match users.iter().find(|u| u.id == id) {
            Some(user) => {
                let name = user.display_name();
                (name.clone(), format!("Chatting with {name}"))
            }
            None => ("User".to_owned(), "Chatting with user".to_owned()),
        },
        Conversation::Group(id) => match groups.iter().find(|g| g.id == id) {
            Some(group) => (
                group.name.clone(),
                format!("{} members", group.member_count()),
            ),
            None => ("Group".to_owned(), "Group chat".to_owned()),
        },
    };

    let rows = messages
        .iter()
        .map(|message| {
            let direction = if Some(message.sender.id) == me {
                Direction::Outbound
            } else {
                Direction::Inbound
            };
            let sender_label = match conversation {
                Conversation::Group(_) => Some(
                    users
                        .iter()
                        .find(|u| u.id == message.sender.id)
                        .unwrap_or(&message.sender)
                        .display_name(),
                ),
                Conversation::User(_) => None,
            };
            MessageRow {
                id: message.id,
                direction,
                body_html: escape_html(&message.text),
                sender_label,
                attachment: message.attachment.as_ref().map(attachment_view),
                reaction: message.reaction.clone(),
                time: format_time(message.created_at),
            }
        })
        .collect();

    ThreadView {
        conversation,
        title,
        subtitle,
        rows,
    }
}

pub fn draft_view(draft: &AttachmentDraft) -> DraftView {
    let preview = match &draft.object_url {
        Some(url) if draft.is_image() => Preview::Image(url.clone()),
        Some(url) if draft.is_video() => Preview::Video {
            url: url.clone(),
            mime: draft.mime_type.clone(),
        },
        _ => Preview::Icon(file_icon(&draft.file_name)),
    };
    DraftView {
        file_name: draft.file_name.clone(),
        size: format_file_size(draft.size),
        preview,
        object_url: draft.object_url.clone(),
    }
}
