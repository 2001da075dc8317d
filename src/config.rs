use crate::error::HistoryError;

pub const REDIRECT_STORAGE_KEY: &str = "Login:redirect_to_app";
pub const POSTS_PATH: &str = "/posts";
pub const PREVIEW_FRAME_ID: &str = "ifrm0";
pub const CANONICAL_HREF_ATTRIBUTE: &str = "data-canonical-href";
pub const NARROW_LAYOUT_MAX_WIDTH: f64 = 768.0;

/// Ids and constants the page relies on. Defaults match the shipped
/// `new.html`; a host page can override any subset through JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub messages_id: String,
    pub login_message_id: String,
    pub form_id: String,
    pub save_button_id: String,
    pub refresh_link_id: String,
    pub table_body_id: String,
    pub posts_table_id: String,
    pub preview_column_id: String,
    pub loading_id: String,
    pub destroy_link_id: String,
    pub hide_preview_id: String,
    pub logout_link_id: String,
    pub preview_container_class: String,
    pub preview_frame_id: String,
    pub redirect_storage_key: String,
    pub posts_path: String,
    pub narrow_layout_max_width: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        PageConfig {
            messages_id: "messages".into(),
            login_message_id: "login_message".into(),
            form_id: "form".into(),
            save_button_id: "save".into(),
            refresh_link_id: "refresh_link".into(),
            table_body_id: "table_body".into(),
            posts_table_id: "posts".into(),
            preview_column_id: "iframe_col".into(),
            loading_id: "loadingDiv".into(),
            destroy_link_id: "destroy_link".into(),
            hide_preview_id: "hide_preview".into(),
            logout_link_id: "logout_link".into(),
            preview_container_class: "privly_iframe".into(),
            preview_frame_id: PREVIEW_FRAME_ID.into(),
            redirect_storage_key: REDIRECT_STORAGE_KEY.into(),
            posts_path: POSTS_PATH.into(),
            narrow_layout_max_width: NARROW_LAYOUT_MAX_WIDTH,
        }
    }
}

impl PageConfig {
    pub fn from_json(json: &str) -> Result<Self, HistoryError> {
        serde_json::from_str(json).map_err(|err| HistoryError::Config(err.to_string()))
    }

    pub fn posts_url(&self, domain: &str) -> String {
        format!("{}{}", domain.trim_end_matches('/'), self.posts_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PageConfig::from_json(r#"{"table_body_id": "rows", "posts_path": "/api/posts"}"#)
            .unwrap();

        assert_eq!(config.table_body_id, "rows");
        assert_eq!(config.posts_path, "/api/posts");
        assert_eq!(config.messages_id, "messages");
        assert_eq!(config.redirect_storage_key, "Login:redirect_to_app");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = PageConfig::from_json(r#"{"table_bdy_id": "rows"}"#).unwrap_err();
        assert!(matches!(err, HistoryError::Config(_)));
    }

    #[test]
    fn posts_url_joins_domain() {
        let config = PageConfig::default();
        assert_eq!(config.posts_url("https://privlyalpha.org"), "https://privlyalpha.org/posts");
        assert_eq!(config.posts_url("https://privlyalpha.org/"), "https://privlyalpha.org/posts");
    }
}
