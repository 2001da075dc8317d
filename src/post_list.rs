use chrono::{DateTime, Utc};

use crate::collaborators::NetworkResponse;
use crate::config::CANONICAL_HREF_ATTRIBUTE;
use crate::date_diff::DateDiffFormatter;
use crate::error::HistoryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    #[serde(rename = "privly_application")]
    pub application: String,
    #[serde(rename = "privly_URL")]
    pub url: String,
    pub created_at: ServerTime,
    pub burn_after_date: ServerTime,
    pub updated_at: ServerTime,
}

/// A timestamp as the content server wrote it, plus its parsed instant. The
/// text is what the table sorts on, so it is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerTime {
    pub raw: String,
    pub at: DateTime<Utc>,
}

impl TryFrom<String> for ServerTime {
    type Error = chrono::ParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let at = DateTime::parse_from_rfc3339(raw.trim())?.with_timezone(&Utc);
        Ok(ServerTime { raw, at })
    }
}

impl From<ServerTime> for String {
    fn from(time: ServerTime) -> String {
        time.raw
    }
}

/// Body of the content server's post index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostListResponse {
    pub json: Vec<PostRecord>,
}

impl PostListResponse {
    pub fn from_response(url: &str, response: NetworkResponse) -> Result<Self, HistoryError> {
        if !response.is_ok() {
            return Err(HistoryError::Network {
                url: url.to_string(),
                reason: format!("status {}", response.status),
            });
        }
        Ok(serde_json::from_value(response.body)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Web,
    Firefox,
    Chrome,
}

impl Platform {
    pub fn from_name(name: &str) -> Self {
        match name {
            "FIREFOX" => Platform::Firefox,
            "CHROME" => Platform::Chrome,
            _ => Platform::Web,
        }
    }

    pub fn application_prefix(self) -> &'static str {
        match self {
            Platform::Web => "/apps/",
            Platform::Firefox => "/content/privly-applications/",
            Platform::Chrome => "/privly-applications/",
        }
    }

    /// Where this platform serves `application`'s viewer for the post at `url`.
    pub fn local_href(self, application: &str, url: &str) -> String {
        format!(
            "{}{}/show.html?privlyOriginalURL={}",
            self.application_prefix(),
            application,
            urlencoding::encode(url)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeTime {
    pub raw: String,
    pub relative: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRow {
    pub application: String,
    pub canonical_href: String,
    pub preview_label: String,
    pub created: RelativeTime,
    pub burn_after: RelativeTime,
    pub updated: RelativeTime,
}

pub struct PostListRenderer<'a> {
    formatter: &'a DateDiffFormatter,
    platform: Platform,
}

impl<'a> PostListRenderer<'a> {
    pub fn new(formatter: &'a DateDiffFormatter, platform: Platform) -> Self {
        PostListRenderer {
            formatter,
            platform,
        }
    }

    pub fn render(&self, records: &[PostRecord]) -> Vec<PostRow> {
        records.iter().map(|record| self.render_row(record)).collect()
    }

    fn render_row(&self, record: &PostRecord) -> PostRow {
        PostRow {
            application: record.application.clone(),
            canonical_href: self.platform.local_href(&record.application, &record.url),
            preview_label: format!("Preview {}", record.application),
            created: self.relative(&record.created_at, true),
            burn_after: self.relative(&record.burn_after_date, false),
            updated: self.relative(&record.updated_at, true),
        }
    }

    fn relative(&self, time: &ServerTime, is_past: bool) -> RelativeTime {
        RelativeTime {
            raw: time.raw.clone(),
            relative: self.formatter.format(time.at, is_past),
        }
    }
}

/// The iframe a row preview is shown in. Styled like the frames the
/// extension's content script injects so the previewed app can resize it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewFrame {
    pub id: String,
    pub canonical_href: String,
}

impl PreviewFrame {
    pub fn new(id: &str, canonical_href: &str) -> Self {
        PreviewFrame {
            id: id.to_string(),
            canonical_href: canonical_href.to_string(),
        }
    }

    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("frameborder", "0".into()),
            ("vspace", "0".into()),
            ("hspace", "0".into()),
            ("width", "100%".into()),
            ("marginwidth", "0".into()),
            ("marginheight", "0".into()),
            ("height", "1px".into()),
            ("style", "width: 100%; height: 32px; overflow: hidden;".into()),
            ("scrolling", "no".into()),
            ("overflow", "hidden".into()),
            ("data-privly-accept-resize", "true".into()),
            (CANONICAL_HREF_ATTRIBUTE, self.canonical_href.clone()),
            ("src", self.canonical_href.clone()),
            ("id", self.id.clone()),
            ("name", self.id.clone()),
        ]
    }
}
