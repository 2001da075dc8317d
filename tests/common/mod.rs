#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use privly_history::{
    ExtensionMessaging, FixedClock, HistoryError, NetworkResponse, NetworkService, Page,
    PageConfig, PageHandles, PayloadHandler, Platform, PostRow, PreviewFrame, Tooltip,
    UrlParameters, ViewStateMachine,
};
use serde_json::json;

pub const DOMAIN: &str = "https://privlyalpha.org";
pub const PAGE_HREF: &str = "https://privlyalpha.org/apps/History/new.html";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 6, 12, 12, 0, 0).unwrap()
}

#[derive(Default)]
pub struct RecordingPage {
    pub href: String,
    pub storage_unavailable: bool,
    pub append_fails_after: Option<usize>,
    pub storage: RefCell<HashMap<String, String>>,
    pub elements: RefCell<HashSet<String>>,
    pub visibility: RefCell<Vec<(String, bool)>>,
    pub enabled: RefCell<HashMap<String, bool>>,
    pub heights: RefCell<HashMap<String, f64>>,
    pub attributes: RefCell<HashMap<(String, String), String>>,
    pub classes: RefCell<HashMap<(String, String), bool>>,
    pub rows: RefCell<Vec<PostRow>>,
    pub tables: RefCell<Vec<String>>,
    pub hidden_rows: RefCell<Vec<usize>>,
    pub previews: RefCell<Vec<PreviewFrame>>,
    pub opened: RefCell<Vec<String>>,
    pub scrolls: Cell<usize>,
    pub reloads: Cell<usize>,
}

impl RecordingPage {
    pub fn new() -> Self {
        RecordingPage {
            href: PAGE_HREF.to_string(),
            ..RecordingPage::default()
        }
    }

    pub fn visibility_changes(&self, id: &str) -> Vec<bool> {
        self.visibility
            .borrow()
            .iter()
            .filter(|(element, _)| element == id)
            .map(|(_, visible)| *visible)
            .collect()
    }

    pub fn is_visible(&self, id: &str) -> Option<bool> {
        self.visibility_changes(id).last().copied()
    }
}

impl Page for RecordingPage {
    fn location_href(&self) -> String {
        self.href.clone()
    }

    fn set_local_item(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        if self.storage_unavailable {
            return Err(HistoryError::Storage("quota exceeded".into()));
        }
        self.storage
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn element_exists(&self, id: &str) -> bool {
        self.elements.borrow().contains(id)
    }

    fn set_visible(&self, id: &str, visible: bool) {
        self.visibility.borrow_mut().push((id.to_string(), visible));
    }

    fn set_enabled(&self, id: &str, enabled: bool) {
        self.enabled.borrow_mut().insert(id.to_string(), enabled);
    }

    fn set_element_height(&self, id: &str, height_px: f64) -> bool {
        if !self.element_exists(id) {
            return false;
        }
        self.heights.borrow_mut().insert(id.to_string(), height_px);
        true
    }

    fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.attributes
            .borrow()
            .get(&(id.to_string(), name.to_string()))
            .cloned()
    }

    fn set_class(&self, id: &str, class: &str, present: bool) {
        self.classes
            .borrow_mut()
            .insert((id.to_string(), class.to_string()), present);
    }

    fn append_rows(&self, table_body_id: &str, rows: &[PostRow]) -> Result<(), HistoryError> {
        let limit = self.append_fails_after.unwrap_or(rows.len());
        self.rows
            .borrow_mut()
            .extend_from_slice(&rows[..limit.min(rows.len())]);
        if limit < rows.len() {
            return Err(HistoryError::NotFound(format!("#{}", table_body_id)));
        }
        Ok(())
    }

    fn init_table(&self, table_id: &str) {
        self.tables.borrow_mut().push(table_id.to_string());
    }

    fn hide_row(&self, _table_body_id: &str, index: usize) {
        self.hidden_rows.borrow_mut().push(index);
    }

    fn show_preview(&self, _container_class: &str, frame: &PreviewFrame) -> Result<(), HistoryError> {
        self.elements.borrow_mut().insert(frame.id.clone());
        let mut attributes = self.attributes.borrow_mut();
        for (name, value) in frame.attributes() {
            attributes.insert((frame.id.clone(), name.to_string()), value);
        }
        self.previews.borrow_mut().push(frame.clone());
        Ok(())
    }

    fn open_window(&self, href: &str) {
        self.opened.borrow_mut().push(href.to_string());
    }

    fn scroll_to_top(&self) {
        self.scrolls.set(self.scrolls.get() + 1);
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }
}

pub struct FakeNetwork {
    pub platform: Platform,
    pub auth: Result<(), HistoryError>,
    pub list: Result<NetworkResponse, HistoryError>,
    pub delete: Result<NetworkResponse, HistoryError>,
    /// While set, deletes stay in flight.
    pub delete_held: Cell<bool>,
    pub auth_checks: RefCell<Vec<String>>,
    pub gets: RefCell<Vec<String>>,
    pub deletes: RefCell<Vec<String>>,
    pub nav: RefCell<Vec<&'static str>>,
}

impl FakeNetwork {
    pub fn signed_in(list_body: serde_json::Value) -> Self {
        FakeNetwork {
            platform: Platform::Web,
            auth: Ok(()),
            list: Ok(NetworkResponse {
                status: 200,
                body: list_body,
            }),
            delete: Ok(NetworkResponse {
                status: 200,
                body: json!({}),
            }),
            delete_held: Cell::new(false),
            auth_checks: RefCell::new(Vec::new()),
            gets: RefCell::new(Vec::new()),
            deletes: RefCell::new(Vec::new()),
            nav: RefCell::new(Vec::new()),
        }
    }

    pub fn signed_out() -> Self {
        FakeNetwork {
            auth: Err(HistoryError::AuthenticationFailure {
                domain: DOMAIN.into(),
                reason: "not signed in".into(),
            }),
            ..FakeNetwork::signed_in(json!({ "json": [] }))
        }
    }
}

impl NetworkService for FakeNetwork {
    async fn init_privly_service(&self, domain: &str) -> Result<(), HistoryError> {
        self.auth_checks.borrow_mut().push(domain.to_string());
        self.auth.clone()
    }

    async fn same_origin_get(&self, url: &str) -> Result<NetworkResponse, HistoryError> {
        self.gets.borrow_mut().push(url.to_string());
        self.list.clone()
    }

    async fn same_origin_delete(&self, url: &str) -> Result<NetworkResponse, HistoryError> {
        self.deletes.borrow_mut().push(url.to_string());
        while self.delete_held.get() {
            tokio::task::yield_now().await;
        }
        self.delete.clone()
    }

    fn initialize_navigation(&self) {
        self.nav.borrow_mut().push("initialize");
    }

    fn show_logged_in_nav(&self) {
        self.nav.borrow_mut().push("logged_in");
    }

    fn show_logged_out_nav(&self) {
        self.nav.borrow_mut().push("logged_out");
    }

    fn content_server_domain(&self) -> String {
        DOMAIN.to_string()
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}

#[derive(Default)]
pub struct FakeMessaging {
    pub initial_content: RefCell<Option<PayloadHandler>>,
    pub message_secret: RefCell<Option<PayloadHandler>>,
    pub secrets_fired: Cell<usize>,
    pub urls: RefCell<Vec<String>>,
}

impl ExtensionMessaging for FakeMessaging {
    fn set_initial_content_handler(&self, handler: PayloadHandler) {
        *self.initial_content.borrow_mut() = Some(handler);
    }

    fn set_message_secret_handler(&self, handler: PayloadHandler) {
        *self.message_secret.borrow_mut() = Some(handler);
    }

    fn fire_message_secret_event(&self) {
        self.secrets_fired.set(self.secrets_fired.get() + 1);
    }

    fn fire_url_event(&self, url: &str) {
        self.urls.borrow_mut().push(url.to_string());
    }
}

/// Query-string parsing as done by the page's parameter script: the
/// application URL is the decoded `privlyOriginalURL` of a local href.
pub struct QueryParameters;

impl UrlParameters for QueryParameters {
    fn application_url(&self, url: &str) -> String {
        self.parameter_hash(url)
            .remove("privlyOriginalURL")
            .unwrap_or_else(|| url.to_string())
    }

    fn parameter_hash(&self, url: &str) -> HashMap<String, String> {
        let query = url.split_once('?').map(|(_, query)| query).unwrap_or("");
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .filter_map(|(key, value)| {
                urlencoding::decode(value)
                    .ok()
                    .map(|value| (key.to_string(), value.into_owned()))
            })
            .collect()
    }
}

#[derive(Default)]
pub struct CountingTooltip {
    pub shown: Cell<usize>,
}

impl Tooltip for CountingTooltip {
    fn show(&self) {
        self.shown.set(self.shown.get() + 1);
    }
}

pub struct Harness {
    pub page: Rc<RecordingPage>,
    pub network: Rc<FakeNetwork>,
    pub messaging: Rc<FakeMessaging>,
    pub machine: ViewStateMachine<Rc<FakeNetwork>>,
}

pub fn harness(network: FakeNetwork) -> Harness {
    harness_with_page(network, RecordingPage::new())
}

pub fn harness_with_page(network: FakeNetwork, page: RecordingPage) -> Harness {
    init_logger();

    let page = Rc::new(page);
    let network = Rc::new(network);
    let messaging = Rc::new(FakeMessaging::default());
    let handles = PageHandles {
        page: page.clone(),
        messaging: messaging.clone(),
        url_parameters: Rc::new(QueryParameters),
    };
    let machine = ViewStateMachine::new(
        PageConfig::default(),
        network.clone(),
        handles,
        FixedClock(now()),
    );

    Harness {
        page,
        network,
        messaging,
        machine,
    }
}

pub const FIRST_POST_URL: &str = "https://privlyalpha.org/apps/PlainPost/show?privlyApp=PlainPost&privlyDataURL=https%3A%2F%2Fprivlyalpha.org%2Fposts%2F12.json";
pub const FIRST_POST_DATA_URL: &str = "https://privlyalpha.org/posts/12.json";

pub fn two_posts() -> serde_json::Value {
    json!({
        "json": [
            {
                "privly_application": "PlainPost",
                "privly_URL": FIRST_POST_URL,
                "created_at": "2014-06-12T10:30:00Z",
                "burn_after_date": "2014-06-14T15:00:00Z",
                "updated_at": "2014-06-12T11:00:00.000Z"
            },
            {
                "privly_application": "Message",
                "privly_URL": "https://privlyalpha.org/apps/Message/show?privlyApp=Message&privlyDataURL=https%3A%2F%2Fprivlyalpha.org%2Fposts%2F13.json",
                "created_at": "2014-06-09T12:00:00Z",
                "burn_after_date": "2014-06-12T12:00:30Z",
                "updated_at": "2014-06-09T12:00:00Z"
            }
        ]
    })
}
