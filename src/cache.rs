use crate::state::{Conversation, Message};
use std::collections::HashMap;

/// Messages per conversation, in server order. Entries are only ever replaced whole.
#[derive(Debug, Default)]
pub struct MessageCache {
    threads: HashMap<Conversation, Vec<Message>>,
}

impl MessageCache {
    pub fn replace(&mut self, conversation: Conversation, messages: Vec<Message>) {
        self.threads.insert(conversation, messages);
    }

    pub fn get(&self, conversation: &Conversation) -> Option<&[Message]> {
        self.threads.get(conversation).map(Vec::as_slice)
    }

    pub fn find(&self, id: u32) -> Option<&Message> {
        self.threads
            .values()
            .flat_map(|messages| messages.iter())
            .find(|message| message.id == id)
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.threads.keys().map(Conversation::cache_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::User;
    use chrono::{TimeZone, Utc};

    fn message(id: u32, text: &str) -> Message {
        Message {
            id,
            sender: User {
                id: 1,
                name: "Ada".to_owned(),
                email: String::new(),
                profile_photo: None,
            },
            text: text.to_owned(),
            reaction: None,
            attachment: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn replace_does_not_merge() {
        let mut cache = MessageCache::default();
        let conv = Conversation::User(7);
        cache.replace(conv, vec![message(1, "a"), message(2, "b")]);
        cache.replace(conv, vec![message(3, "c")]);
        assert_eq!(cache.get(&conv).unwrap(), &[message(3, "c")][..]);
        assert!(cache.get(&Conversation::Group(7)).is_none());
    }

    #[test]
    fn find_across_threads() {
        let mut cache = MessageCache::default();
        cache.replace(Conversation::User(7), vec![message(1, "a")]);
        cache.replace(Conversation::Group(2), vec![message(9, "group")]);
        assert_eq!(cache.find(9).unwrap().text, "group");
        assert!(cache.find(4).is_none());
        let mut keys: Vec<_> = cache.keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["group-2", "user-7"]);
    }
}
