//! Bindings to the scripts every Privly application page loads before this
//! module: the network service, the extension bridge, the URL parameter
//! parser and the tooltip.

use std::cell::RefCell;
use std::collections::HashMap;

use js_sys::{Function, Reflect};
use log::warn;
use privly_history::{ExtensionMessaging, PayloadHandler, Tooltip, UrlParameters};
use serde_json::Value;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = privlyNetworkService, js_name = initPrivlyService)]
    pub fn init_privly_service(
        domain: &str,
        on_success: &Function,
        on_failure: &Function,
        on_other_failure: &Function,
    );

    #[wasm_bindgen(js_namespace = privlyNetworkService, js_name = sameOriginGetRequest)]
    pub fn same_origin_get_request(url: &str, on_complete: &Function);

    #[wasm_bindgen(js_namespace = privlyNetworkService, js_name = sameOriginDeleteRequest)]
    pub fn same_origin_delete_request(url: &str, on_complete: &Function, options: &JsValue);

    #[wasm_bindgen(js_namespace = privlyNetworkService, js_name = initializeNavigation)]
    pub fn initialize_navigation();

    #[wasm_bindgen(js_namespace = privlyNetworkService, js_name = showLoggedInNav)]
    pub fn show_logged_in_nav();

    #[wasm_bindgen(js_namespace = privlyNetworkService, js_name = showLoggedOutNav)]
    pub fn show_logged_out_nav();

    #[wasm_bindgen(js_namespace = privlyNetworkService, js_name = contentServerDomain)]
    pub fn content_server_domain() -> String;

    #[wasm_bindgen(js_namespace = privlyNetworkService, js_name = platformName)]
    pub fn platform_name() -> String;

    #[wasm_bindgen(js_namespace = privlyExtension, js_name = firePrivlyMessageSecretEvent)]
    fn fire_privly_message_secret_event();

    #[wasm_bindgen(js_namespace = privlyExtension, js_name = firePrivlyURLEvent)]
    fn fire_privly_url_event(url: &str);

    #[wasm_bindgen(js_namespace = privlyParameters, js_name = getApplicationUrl)]
    fn get_application_url(url: &str) -> String;

    #[wasm_bindgen(js_namespace = privlyParameters, js_name = getParameterHash)]
    fn get_parameter_hash(url: &str) -> JsValue;

    #[wasm_bindgen(js_namespace = privlyTooltip, js_name = tooltip)]
    fn tooltip();
}

#[wasm_bindgen(inline_js = "export function init_data_table(id) { \
    if (window.jQuery && window.jQuery.fn.dataTable) { \
        window.jQuery('#' + id).dataTable({ bPaginate: false, bFilter: false }); \
    } \
}")]
extern "C" {
    pub fn init_data_table(id: &str);
}

/// Best-effort conversion of a JS value into JSON; anything that does not
/// survive `JSON.stringify` becomes `null`.
pub fn js_to_json(value: &JsValue) -> Value {
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|json| json.as_string())
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or(Value::Null)
}

pub fn property(target: &JsValue, name: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

/// `privlyExtension`. Handlers installed into its callback slots are owned
/// here so they live as long as the bridge does.
#[derive(Default)]
pub struct PrivlyExtension {
    handlers: RefCell<Vec<Closure<dyn FnMut(JsValue)>>>,
}

impl PrivlyExtension {
    fn install(&self, slot: &str, handler: PayloadHandler) {
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |data: JsValue| {
            handler(js_to_json(&data));
        });

        match property(&js_sys::global(), "privlyExtension") {
            Some(extension) => {
                if Reflect::set(&extension, &JsValue::from_str(slot), callback.as_ref()).is_err() {
                    warn!("could not install privlyExtension.{}", slot);
                }
            }
            None => warn!("privlyExtension is not loaded, {} ignored", slot),
        }

        self.handlers.borrow_mut().push(callback);
    }
}

impl ExtensionMessaging for PrivlyExtension {
    fn set_initial_content_handler(&self, handler: PayloadHandler) {
        self.install("initialContent", handler);
    }

    fn set_message_secret_handler(&self, handler: PayloadHandler) {
        self.install("messageSecret", handler);
    }

    fn fire_message_secret_event(&self) {
        fire_privly_message_secret_event();
    }

    fn fire_url_event(&self, url: &str) {
        fire_privly_url_event(url);
    }
}

pub struct PrivlyParameters;

impl UrlParameters for PrivlyParameters {
    fn application_url(&self, url: &str) -> String {
        get_application_url(url)
    }

    fn parameter_hash(&self, url: &str) -> HashMap<String, String> {
        match js_to_json(&get_parameter_hash(url)) {
            Value::Object(parameters) => parameters
                .into_iter()
                .filter_map(|(key, value)| match value {
                    Value::String(value) => Some((key, value)),
                    _ => None,
                })
                .collect(),
            _ => HashMap::new(),
        }
    }
}

pub struct PrivlyTooltip;

impl Tooltip for PrivlyTooltip {
    fn show(&self) {
        tooltip();
    }
}
