//! Boundaries the page core talks through. The browser build implements
//! these against the DOM and the Privly JavaScript globals; tests use
//! recording fakes.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::HistoryError;
use crate::post_list::{Platform, PostRow, PreviewFrame};

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl NetworkResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Access to the content server. Authentication itself is entirely the
/// service's business; the page only learns whether it succeeded.
#[allow(async_fn_in_trait)]
pub trait NetworkService {
    async fn init_privly_service(&self, domain: &str) -> Result<(), HistoryError>;
    async fn same_origin_get(&self, url: &str) -> Result<NetworkResponse, HistoryError>;
    async fn same_origin_delete(&self, url: &str) -> Result<NetworkResponse, HistoryError>;

    fn initialize_navigation(&self);
    fn show_logged_in_nav(&self);
    fn show_logged_out_nav(&self);
    fn content_server_domain(&self) -> String;
    fn platform(&self) -> Platform;
}

impl<T: NetworkService + ?Sized> NetworkService for Rc<T> {
    async fn init_privly_service(&self, domain: &str) -> Result<(), HistoryError> {
        (**self).init_privly_service(domain).await
    }

    async fn same_origin_get(&self, url: &str) -> Result<NetworkResponse, HistoryError> {
        (**self).same_origin_get(url).await
    }

    async fn same_origin_delete(&self, url: &str) -> Result<NetworkResponse, HistoryError> {
        (**self).same_origin_delete(url).await
    }

    fn initialize_navigation(&self) {
        (**self).initialize_navigation()
    }

    fn show_logged_in_nav(&self) {
        (**self).show_logged_in_nav()
    }

    fn show_logged_out_nav(&self) {
        (**self).show_logged_out_nav()
    }

    fn content_server_domain(&self) -> String {
        (**self).content_server_domain()
    }

    fn platform(&self) -> Platform {
        (**self).platform()
    }
}

pub type PayloadHandler = Box<dyn Fn(serde_json::Value)>;

/// Pathway to the browser extension or mobile framework hosting the page.
pub trait ExtensionMessaging {
    fn set_initial_content_handler(&self, handler: PayloadHandler);
    fn set_message_secret_handler(&self, handler: PayloadHandler);
    fn fire_message_secret_event(&self);
    fn fire_url_event(&self, url: &str);
}

pub trait UrlParameters {
    fn application_url(&self, url: &str) -> String;
    fn parameter_hash(&self, url: &str) -> HashMap<String, String>;
}

pub trait Tooltip {
    fn show(&self);
}

/// The document the page renders into. Element lookups are by id; a missing
/// element turns the call into a no-op unless the method says otherwise.
pub trait Page {
    fn location_href(&self) -> String;
    fn set_local_item(&self, key: &str, value: &str) -> Result<(), HistoryError>;

    fn element_exists(&self, id: &str) -> bool;
    fn set_visible(&self, id: &str, visible: bool);
    fn set_enabled(&self, id: &str, enabled: bool);
    /// Returns false when no element has this id.
    fn set_element_height(&self, id: &str, height_px: f64) -> bool;
    fn attribute(&self, id: &str, name: &str) -> Option<String>;
    fn set_class(&self, id: &str, class: &str, present: bool);

    fn append_rows(&self, table_body_id: &str, rows: &[PostRow]) -> Result<(), HistoryError>;
    fn init_table(&self, table_id: &str);
    fn hide_row(&self, table_body_id: &str, index: usize);
    fn show_preview(&self, container_class: &str, frame: &PreviewFrame)
        -> Result<(), HistoryError>;

    fn open_window(&self, href: &str);
    fn scroll_to_top(&self);
    fn reload(&self);
}

#[derive(Clone)]
pub struct PageHandles {
    pub page: Rc<dyn Page>,
    pub messaging: Rc<dyn ExtensionMessaging>,
    pub url_parameters: Rc<dyn UrlParameters>,
}
