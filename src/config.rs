use crate::error::ConfigError;
use url::Url;

const DEFAULT_API_BASE: &str = "/api/";
const DEFAULT_MEDIA_URL: &str = "/media/";
const LOGOUT_PATH: &str = "/?logout=1";

/// Page level settings, read once from the `<body>` data attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base: Url,
    pub media_url: String,
    pub current_user_id: Option<u32>,
    pub user_name: String,
    pub authenticated: bool,
    pub logout_url: String,
    pub csrf_cookie: String,
    pub token_key: String,
}

impl Config {
    pub fn new(api_base: Url) -> Self {
        Self {
            api_base,
            media_url: DEFAULT_MEDIA_URL.to_owned(),
            current_user_id: None,
            user_name: "User".to_owned(),
            authenticated: false,
            logout_url: LOGOUT_PATH.to_owned(),
            csrf_cookie: "csrftoken".to_owned(),
            token_key: "access".to_owned(),
        }
    }

    /// `attr` looks up a data attribute by its camel-cased dataset name.
    pub fn from_dataset<F>(origin: &str, attr: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let origin = Url::parse(origin)?;
        let api_base = attr("apiBase").unwrap_or_else(|| DEFAULT_API_BASE.to_owned());
        let mut api_base = origin.join(&api_base)?;
        // Endpoint paths are joined onto the base, which drops a last segment without a slash.
        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }
        let mut config = Config::new(api_base);
        if let Some(media_url) = attr("mediaUrl").filter(|m| !m.is_empty()) {
            config.media_url = media_url;
        }
        config.current_user_id = match attr("userId").filter(|id| !id.trim().is_empty()) {
            Some(id) => Some(
                id.trim()
                    .parse()
                    .map_err(|_| ConfigError::UserId(id.clone()))?,
            ),
            None => None,
        };
        if let Some(name) = attr("userName").filter(|n| !n.is_empty()) {
            config.user_name = name;
        }
        config.authenticated = attr("authenticated").as_deref() == Some("true");
        config.logout_url = origin.join(LOGOUT_PATH)?.to_string();
        Ok(config)
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.api_base.join(path)
    }
}
