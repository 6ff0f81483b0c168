use crate::browser::BrowserSession;
use crate::config::Config;
use crate::error::ApiError;
use crate::state::{AttachmentDraft, Conversation, Group, Message, User};
use async_trait::async_trait;
use leptos::logging::log;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePatch {
    Text(String),
    Reaction(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGroup {
    pub name: String,
    pub member_ids: Vec<u32>,
}

/// REST calls the chat client makes. Every path is relative to the API base.
#[async_trait(?Send)]
pub trait Backend {
    async fn list_messages(&self, conversation: Conversation) -> Result<Vec<Message>, ApiError>;

    async fn send_message(
        &self,
        conversation: Conversation,
        text: &str,
        attachment: Option<&AttachmentDraft>,
    ) -> Result<Message, ApiError>;

    async fn update_message(&self, id: u32, patch: MessagePatch) -> Result<Message, ApiError>;

    async fn delete_message(&self, id: u32) -> Result<(), ApiError>;

    async fn export_messages(&self, conversation: Conversation) -> Result<Vec<u8>, ApiError>;

    async fn list_groups(&self) -> Result<Vec<Group>, ApiError>;

    async fn create_group(&self, group: &NewGroup) -> Result<Group, ApiError>;

    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
}

/// Credentials attached to every request, and where a rejected session goes.
pub trait Session {
    fn csrf_token(&self) -> Option<String>;
    fn bearer_token(&self) -> Option<String>;
    fn expired(&self, logout_url: &str);
}

pub struct HttpBackend<S = BrowserSession> {
    client: reqwest::Client,
    config: Config,
    session: S,
}

impl<S: Session> HttpBackend<S> {
    pub fn new(config: Config, session: S) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            session,
        }
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self
            .config
            .endpoint(path)
            .map_err(|e| ApiError::Browser(format!("Invalid endpoint {path}: {e}")))?;
        let mut builder = self.client.request(method, url);
        if let Some(csrf) = self.session.csrf_token() {
            builder = builder.header("X-CSRFToken", csrf);
        }
        if let Some(token) = self.session.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        #[cfg(target_arch = "wasm32")]
        let builder = builder.fetch_credentials_same_origin();
        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let res = builder.send().await?;
        let status = res.status();
        if status == StatusCode::UNAUTHORIZED {
            self.session.expired(&self.config.logout_url);
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = res.bytes().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
        Ok(res)
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let res = self.send(builder).await?;
        let body = res.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait(?Send)]
impl<S: Session> Backend for HttpBackend<S> {
    async fn list_messages(&self, conversation: Conversation) -> Result<Vec<Message>, ApiError> {
        log!("Loading messages for {}", conversation.cache_key());
        let builder = self
            .request(Method::GET, "messages/")?
            .query(&[conversation.query()]);
        self.json(builder).await
    }

    async fn send_message(
        &self,
        conversation: Conversation,
        text: &str,
        attachment: Option<&AttachmentDraft>,
    ) -> Result<Message, ApiError> {
        log!("Sending message to {}", conversation.cache_key());
        let mut form = Form::new().text("text", text.to_owned()).text(
            conversation.target_field(),
            conversation.id().to_string(),
        );
        if let Some(draft) = attachment {
            let mut part = Part::bytes(draft.bytes.clone()).file_name(draft.file_name.clone());
            if !draft.mime_type.is_empty() {
                part = part.mime_str(&draft.mime_type)?;
            }
            form = form.part("attachment", part);
        }
        let builder = self.request(Method::POST, "messages/")?.multipart(form);
        self.json(builder).await
    }

    async fn update_message(&self, id: u32, patch: MessagePatch) -> Result<Message, ApiError> {
        log!("Updating message {id}");
        let builder = self
            .request(Method::PATCH, &format!("messages/{id}/"))?
            .json(&patch);
        self.json(builder).await
    }

    async fn delete_message(&self, id: u32) -> Result<(), ApiError> {
        log!("Deleting message {id}");
        let builder = self.request(Method::DELETE, &format!("messages/{id}/"))?;
        self.send(builder).await?;
        Ok(())
    }

    async fn export_messages(&self, conversation: Conversation) -> Result<Vec<u8>, ApiError> {
        log!("Exporting {}", conversation.cache_key());
        let builder = self
            .request(Method::GET, "messages/export/")?
            .query(&[conversation.query()]);
        let res = self.send(builder).await?;
        Ok(res.bytes().await?.to_vec())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, ApiError> {
        let builder = self.request(Method::GET, "groups/")?;
        self.json(builder).await
    }

    async fn create_group(&self, group: &NewGroup) -> Result<Group, ApiError> {
        log!("Creating group {}", group.name);
        let builder = self.request(Method::POST, "groups/")?.json(group);
        self.json(builder).await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let builder = self.request(Method::GET, "users/")?;
        self.json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Multipart, Query, State};
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;
    use url::Url;

    /// One request as the test server received it.
    #[derive(Debug, Default)]
    struct Seen {
        csrf: Option<String>,
        bearer: Option<String>,
        query: HashMap<String, String>,
        // Field name to text value, or to the file name for file parts.
        fields: Vec<(String, String)>,
    }

    type Requests = Arc<Mutex<Vec<Seen>>>;

    fn seen(headers: &HeaderMap, query: HashMap<String, String>) -> Seen {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };
        Seen {
            csrf: header("x-csrftoken"),
            bearer: header("authorization"),
            query,
            fields: vec![],
        }
    }

    fn message_json() -> Value {
        json!({
            "id": 1,
            "sender": {"id": 7, "name": "Bob"},
            "text": "hi",
            "created_at": "2024-03-01T10:15:00Z"
        })
    }

    async fn list_messages(
        State(requests): State<Requests>,
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        requests.lock().unwrap().push(seen(&headers, query));
        Json(json!([message_json()]))
    }

    async fn create_message(
        State(requests): State<Requests>,
        headers: HeaderMap,
        mut multipart: Multipart,
    ) -> Json<Value> {
        let mut request = seen(&headers, HashMap::new());
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_owned();
            let file_name = field.file_name().map(str::to_owned);
            let value = match file_name {
                Some(file_name) => file_name,
                None => field.text().await.unwrap(),
            };
            request.fields.push((name, value));
        }
        requests.lock().unwrap().push(request);
        Json(message_json())
    }

    async fn spawn_api() -> (Config, Requests) {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Requests::default();
        let app = Router::new()
            .route("/api/messages/", get(list_messages).post(create_message))
            .route("/api/users/", get(|| async { StatusCode::UNAUTHORIZED }))
            .route(
                "/api/groups/",
                get(|| async { (StatusCode::BAD_REQUEST, Json(json!({"detail": "Name taken"}))) }),
            )
            .with_state(requests.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        let mut config = Config::new(Url::parse(&format!("http://{addr}/api/")).unwrap());
        config.logout_url = format!("http://{addr}/?logout=1");
        (config, requests)
    }

    #[derive(Default)]
    struct FakeSession {
        csrf: Option<String>,
        token: Option<String>,
        expired: RefCell<Vec<String>>,
    }

    impl Session for FakeSession {
        fn csrf_token(&self) -> Option<String> {
            self.csrf.clone()
        }

        fn bearer_token(&self) -> Option<String> {
            self.token.clone()
        }

        fn expired(&self, logout_url: &str) {
            self.expired.borrow_mut().push(logout_url.to_owned());
        }
    }

    fn signed_in() -> FakeSession {
        FakeSession {
            csrf: Some("tok".to_owned()),
            token: Some("jwt".to_owned()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn list_sends_credentials_and_query() {
        let (config, requests) = spawn_api().await;
        let backend = HttpBackend::new(config, signed_in());

        let messages = backend.list_messages(Conversation::User(7)).await.unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender.name, "Bob");
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].csrf.as_deref(), Some("tok"));
        assert_eq!(requests[0].bearer.as_deref(), Some("Bearer jwt"));
        assert_eq!(
            requests[0].query,
            HashMap::from([("user_id".to_owned(), "7".to_owned())])
        );
    }

    #[tokio::test]
    async fn anonymous_requests_carry_no_credentials() {
        let (config, requests) = spawn_api().await;
        let backend = HttpBackend::new(config, FakeSession::default());

        backend.list_messages(Conversation::Group(2)).await.unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].csrf, None);
        assert_eq!(requests[0].bearer, None);
        assert_eq!(
            requests[0].query,
            HashMap::from([("group_id".to_owned(), "2".to_owned())])
        );
    }

    #[tokio::test]
    async fn send_posts_multipart_fields() {
        let (config, requests) = spawn_api().await;
        let backend = HttpBackend::new(config, signed_in());
        let draft = AttachmentDraft {
            file_name: "notes.pdf".to_owned(),
            mime_type: "application/pdf".to_owned(),
            size: 3,
            bytes: vec![1, 2, 3],
            object_url: None,
        };

        let sent = backend
            .send_message(Conversation::Group(2), "hello", Some(&draft))
            .await
            .unwrap();

        assert_eq!(sent.id, 1);
        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].csrf.as_deref(), Some("tok"));
        assert_eq!(
            requests[0].fields,
            vec![
                ("text".to_owned(), "hello".to_owned()),
                ("to_group".to_owned(), "2".to_owned()),
                ("attachment".to_owned(), "notes.pdf".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn text_only_send_targets_user() {
        let (config, requests) = spawn_api().await;
        let backend = HttpBackend::new(config, signed_in());

        backend
            .send_message(Conversation::User(7), "hi", None)
            .await
            .unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(
            requests[0].fields,
            vec![
                ("text".to_owned(), "hi".to_owned()),
                ("to_user".to_owned(), "7".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn unauthorized_signs_out() {
        let (config, _requests) = spawn_api().await;
        let logout_url = config.logout_url.clone();
        let backend = HttpBackend::new(config, signed_in());

        let err = backend.list_users().await.unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(*backend.session.expired.borrow(), vec![logout_url]);
    }

    #[tokio::test]
    async fn failed_status_carries_detail() {
        let (config, _requests) = spawn_api().await;
        let backend = HttpBackend::new(config, signed_in());

        let err = backend.list_groups().await.unwrap_err();

        match err {
            ApiError::Status { status, detail } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(detail, "Name taken");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(backend.session.expired.borrow().is_empty());
    }

    #[test]
    fn patch_bodies() {
        let text = serde_json::to_value(MessagePatch::Text("hi".to_owned())).unwrap();
        assert_eq!(text, serde_json::json!({"text": "hi"}));
        let reaction = serde_json::to_value(MessagePatch::Reaction("🎉".to_owned())).unwrap();
        assert_eq!(reaction, serde_json::json!({"reaction": "🎉"}));
    }

    #[test]
    fn new_group_body() {
        let group = NewGroup {
            name: "Team".to_owned(),
            member_ids: vec![2, 5],
        };
        assert_eq!(
            serde_json::to_value(&group).unwrap(),
            serde_json::json!({"name": "Team", "member_ids": [2, 5]})
        );
    }
}
