use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile_photo: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        if !self.name.is_empty() {
            self.name.clone()
        } else if !self.email.is_empty() {
            self.email.clone()
        } else {
            format!("User {}", self.id)
        }
    }

    pub fn initial(&self) -> char {
        self.display_name()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('?')
    }

    /// Absolute and `/media/` paths are used as is, anything else is relative to `media_url`.
    pub fn profile_photo_url(&self, media_url: &str) -> Option<String> {
        let photo = self.profile_photo.as_deref().filter(|p| !p.is_empty())?;
        if photo.starts_with("http://") || photo.starts_with("https://") || photo.starts_with("/media/")
        {
            Some(photo.to_owned())
        } else {
            Some(format!("{media_url}{photo}"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Group {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub members: Vec<User>,
}

impl Group {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub url: String,
    pub file_name: String,
    pub is_image: bool,
    pub is_video: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "MessageRecord")]
pub struct Message {
    pub id: u32,
    pub sender: User,
    pub text: String,
    pub reaction: Option<String>,
    pub attachment: Option<Attachment>,
    pub created_at: DateTime<Utc>,
}

/// Message as the backend serializes it, attachment metadata flattened.
#[derive(Deserialize)]
struct MessageRecord {
    id: u32,
    sender: User,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    reaction: Option<String>,
    #[serde(default)]
    attachment_url: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    is_image: Option<bool>,
    #[serde(default)]
    is_video: Option<bool>,
    created_at: DateTime<Utc>,
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        let attachment = record
            .attachment_url
            .filter(|url| !url.is_empty())
            .map(|url| Attachment {
                url,
                file_name: record
                    .file_name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| "attachment".to_owned()),
                is_image: record.is_image.unwrap_or(false),
                is_video: record.is_video.unwrap_or(false),
            });
        Message {
            id: record.id,
            sender: record.sender,
            text: record.text.unwrap_or_default(),
            reaction: record.reaction.filter(|reaction| !reaction.is_empty()),
            attachment,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversation {
    User(u32),
    Group(u32),
}

impl Conversation {
    pub fn id(&self) -> u32 {
        match self {
            Conversation::User(id) | Conversation::Group(id) => *id,
        }
    }

    pub fn cache_key(&self) -> String {
        match self {
            Conversation::User(id) => format!("user-{id}"),
            Conversation::Group(id) => format!("group-{id}"),
        }
    }

    /// Query parameter selecting this conversation on the messages endpoints.
    pub fn query(&self) -> (&'static str, u32) {
        match self {
            Conversation::User(id) => ("user_id", *id),
            Conversation::Group(id) => ("group_id", *id),
        }
    }

    /// Multipart field naming the recipient of a new message.
    pub fn target_field(&self) -> &'static str {
        match self {
            Conversation::User(_) => "to_user",
            Conversation::Group(_) => "to_group",
        }
    }

    pub fn export_file_name(&self) -> String {
        match self {
            Conversation::User(id) => format!("chat-with-{id}.csv"),
            Conversation::Group(id) => format!("group-{id}.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentDraft {
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
    pub bytes: Vec<u8>,
    pub object_url: Option<String>,
}

impl AttachmentDraft {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u32, name: &str, email: &str) -> User {
        User {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
            profile_photo: None,
        }
    }

    #[test]
    fn display_name_falls_back() {
        assert_eq!(user(1, "Ada", "ada@example.com").display_name(), "Ada");
        assert_eq!(user(1, "", "ada@example.com").display_name(), "ada@example.com");
        assert_eq!(user(4, "", "").display_name(), "User 4");
        assert_eq!(user(1, "ada", "").initial(), 'A');
    }

    #[test]
    fn profile_photo_paths() {
        let mut u = user(1, "Ada", "");
        assert_eq!(u.profile_photo_url("/media/"), None);
        u.profile_photo = Some("profile_photos/ada.png".to_owned());
        assert_eq!(
            u.profile_photo_url("/media/").as_deref(),
            Some("/media/profile_photos/ada.png")
        );
        u.profile_photo = Some("https://cdn.example.com/ada.png".to_owned());
        assert_eq!(
            u.profile_photo_url("/media/").as_deref(),
            Some("https://cdn.example.com/ada.png")
        );
        u.profile_photo = Some("/media/ada.png".to_owned());
        assert_eq!(u.profile_photo_url("/static/").as_deref(), Some("/media/ada.png"));
    }

    #[test]
    fn message_optional_fields_default() {
        let message: Message = serde_json::from_str(
            r#"{
                "id": 3,
                "sender": {"id": 7, "name": "Bob", "email": "bob@example.com", "profile_photo": null},
                "to_user": 1,
                "to_group": null,
                "reaction": "",
                "attachment_url": null,
                "file_name": null,
                "is_deleted": false,
                "created_at": "2024-03-01T10:15:00.123456Z"
            }"#,
        )
        .unwrap();
        assert_eq!(message.text, "");
        assert_eq!(message.reaction, None);
        assert_eq!(message.attachment, None);
    }

    #[test]
    fn message_attachment_metadata() {
        let message: Message = serde_json::from_str(
            r#"{
                "id": 4,
                "sender": {"id": 7},
                "text": "see file",
                "reaction": "👍",
                "attachment_url": "http://localhost/media/message_attachments/cat.png",
                "is_image": true,
                "created_at": "2024-03-01T10:15:00+00:00"
            }"#,
        )
        .unwrap();
        assert_eq!(message.reaction.as_deref(), Some("👍"));
        let attachment = message.attachment.unwrap();
        assert_eq!(attachment.file_name, "attachment");
        assert!(attachment.is_image);
        assert!(!attachment.is_video);
    }

    #[test]
    fn conversation_keys() {
        assert_eq!(Conversation::User(7).cache_key(), "user-7");
        assert_eq!(Conversation::Group(2).cache_key(), "group-2");
        assert_eq!(Conversation::User(7).query(), ("user_id", 7));
        assert_eq!(Conversation::Group(2).query(), ("group_id", 2));
        assert_eq!(Conversation::User(7).export_file_name(), "chat-with-7.csv");
        assert_eq!(Conversation::Group(2).export_file_name(), "group-2.csv");
        assert_ne!(Conversation::User(2), Conversation::Group(2));
    }
}
