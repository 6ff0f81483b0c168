use crate::api::Session;
use crate::config::Config;
use crate::error::{ApiError, ConfigError};
use crate::state::AttachmentDraft;
use leptos::logging::warn;
use leptos::{document, window};
use percent_encoding::percent_decode_str;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, File, HtmlAnchorElement, HtmlDocument};

pub fn config() -> Result<Config, ConfigError> {
    let origin = window()
        .location()
        .origin()
        .map_err(|e| ConfigError::Browser(format!("{e:?}")))?;
    let dataset = document().body().map(|body| body.dataset());
    Config::from_dataset(&origin, |key| dataset.as_ref().and_then(|d| d.get(key)))
}

/// Value of `name` in a `document.cookie` string. Values that are not valid
/// percent-encoded UTF-8 are returned raw.
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|cookie| {
        let (key, value) = cookie.trim().split_once('=')?;
        (key == name).then(|| match percent_decode_str(value).decode_utf8() {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => value.to_owned(),
        })
    })
}

fn cookie(name: &str) -> Option<String> {
    let document: HtmlDocument = document().dyn_into().ok()?;
    let cookies = document.cookie().ok()?;
    cookie_value(&cookies, name)
}

fn stored_token(key: &str) -> Option<String> {
    let storage = window().local_storage().ok()??;
    storage.get_item(key).ok()?.filter(|token| !token.is_empty())
}

/// CSRF cookie and local storage token of the signed-in page.
pub struct BrowserSession {
    csrf_cookie: String,
    token_key: String,
}

impl BrowserSession {
    pub fn new(config: &Config) -> Self {
        Self {
            csrf_cookie: config.csrf_cookie.clone(),
            token_key: config.token_key.clone(),
        }
    }
}

impl Session for BrowserSession {
    fn csrf_token(&self) -> Option<String> {
        cookie(&self.csrf_cookie)
    }

    fn bearer_token(&self) -> Option<String> {
        stored_token(&self.token_key)
    }

    fn expired(&self, logout_url: &str) {
        warn!("Session rejected, signing out");
        redirect(logout_url);
    }
}

pub fn redirect(url: &str) {
    if let Err(err) = window().location().set_href(url) {
        warn!("Redirect to {url} failed {err:?}");
    }
}

pub fn alert(message: &str) {
    let _ = window().alert_with_message(message);
}

pub fn open(url: &str) {
    if let Err(err) = window().open_with_url_and_target(url, "_blank") {
        warn!("Could not open {url} {err:?}");
    }
}

fn click_anchor(href: &str, file_name: &str) -> Result<(), ApiError> {
    let anchor: HtmlAnchorElement = document()
        .create_element("a")?
        .dyn_into()
        .map_err(|_| ApiError::Browser("anchor element".to_owned()))?;
    anchor.set_href(href);
    anchor.set_download(file_name);
    let body = document()
        .body()
        .ok_or_else(|| ApiError::Browser("missing body".to_owned()))?;
    body.append_child(&anchor)?;
    anchor.click();
    body.remove_child(&anchor)?;
    Ok(())
}

pub fn download_url(url: &str, file_name: &str) {
    if let Err(err) = click_anchor(url, file_name) {
        warn!("Download of {file_name} failed {err}");
    }
}

pub fn download_bytes(file_name: &str, bytes: &[u8]) -> Result<(), ApiError> {
    let array = js_sys::Uint8Array::from(bytes);
    let blob = Blob::new_with_u8_array_sequence(&js_sys::Array::of1(&array))?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;
    let result = click_anchor(&url, file_name);
    web_sys::Url::revoke_object_url(&url)?;
    result
}

pub fn revoke(url: &str) {
    let _ = web_sys::Url::revoke_object_url(url);
}

pub async fn read_file(file: File) -> Result<AttachmentDraft, ApiError> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    let object_url = web_sys::Url::create_object_url_with_blob(&file).ok();
    Ok(AttachmentDraft {
        file_name: file.name(),
        mime_type: file.type_(),
        size: file.size() as u64,
        bytes,
        object_url,
    })
}
