use std::cell::RefCell;
use std::rc::Rc;

use futures_channel::oneshot;
use log::debug;
use privly_history::{HistoryError, NetworkResponse, NetworkService, Platform};
use serde_json::json;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::bindings::{self, js_to_json, property};

type Settle<T> = Rc<RefCell<Option<oneshot::Sender<T>>>>;

/// Completes `slot` with whatever `outcome` builds from the callback
/// argument. Only the first callback to fire is delivered.
fn settle_with<T: 'static>(
    slot: Settle<T>,
    outcome: impl Fn(JsValue) -> T + 'static,
) -> Closure<dyn FnMut(JsValue)> {
    Closure::<dyn FnMut(JsValue)>::new(move |argument: JsValue| {
        if let Some(sender) = slot.borrow_mut().take() {
            let _ = sender.send(outcome(argument));
        }
    })
}

/// The response objects handed to request callbacks carry the decoded body
/// under `json` and the transport under `jqXHR`.
fn network_response(response: &JsValue) -> NetworkResponse {
    let status = property(response, "jqXHR")
        .and_then(|jq_xhr| property(&jq_xhr, "status"))
        .and_then(|status| status.as_f64())
        .map(|status| status as u16)
        .unwrap_or(0);
    let body = property(response, "json")
        .map(|body| js_to_json(&body))
        .unwrap_or(serde_json::Value::Null);

    NetworkResponse {
        status,
        body: json!({ "json": body }),
    }
}

fn dropped(url: &str) -> HistoryError {
    HistoryError::Network {
        url: url.to_string(),
        reason: "request callback was never called".into(),
    }
}

/// `privlyNetworkService`, with its callback-style requests turned into
/// futures.
#[derive(Debug, Default)]
pub struct PrivlyNetworkService;

impl NetworkService for PrivlyNetworkService {
    async fn init_privly_service(&self, domain: &str) -> Result<(), HistoryError> {
        let (sender, receiver) = oneshot::channel::<Result<(), &'static str>>();
        let slot = Rc::new(RefCell::new(Some(sender)));

        let on_success = settle_with(slot.clone(), |_| Ok(()));
        let on_failure = settle_with(slot.clone(), |_| Err("not signed in"));
        let on_other_failure = settle_with(slot, |_| Err("content server unreachable"));

        bindings::init_privly_service(
            domain,
            on_success.as_ref().unchecked_ref(),
            on_failure.as_ref().unchecked_ref(),
            on_other_failure.as_ref().unchecked_ref(),
        );
        // the service may call back more than once, after this future is gone
        on_success.forget();
        on_failure.forget();
        on_other_failure.forget();

        let outcome = receiver.await.unwrap_or(Err("authentication callback was never called"));
        debug!("authentication check against {}: {:?}", domain, outcome);

        outcome.map_err(|reason| HistoryError::AuthenticationFailure {
            domain: domain.to_string(),
            reason: reason.to_string(),
        })
    }

    async fn same_origin_get(&self, url: &str) -> Result<NetworkResponse, HistoryError> {
        let (sender, receiver) = oneshot::channel();
        let on_complete = settle_with(Rc::new(RefCell::new(Some(sender))), |response| {
            network_response(&response)
        });

        bindings::same_origin_get_request(url, on_complete.as_ref().unchecked_ref());
        on_complete.forget();

        receiver.await.map_err(|_| dropped(url))
    }

    async fn same_origin_delete(&self, url: &str) -> Result<NetworkResponse, HistoryError> {
        let (sender, receiver) = oneshot::channel();
        let on_complete = settle_with(Rc::new(RefCell::new(Some(sender))), |response| {
            network_response(&response)
        });

        bindings::same_origin_delete_request(
            url,
            on_complete.as_ref().unchecked_ref(),
            &js_sys::Object::new(),
        );
        on_complete.forget();

        receiver.await.map_err(|_| dropped(url))
    }

    fn initialize_navigation(&self) {
        bindings::initialize_navigation();
    }

    fn show_logged_in_nav(&self) {
        bindings::show_logged_in_nav();
    }

    fn show_logged_out_nav(&self) {
        bindings::show_logged_out_nav();
    }

    fn content_server_domain(&self) -> String {
        bindings::content_server_domain()
    }

    fn platform(&self) -> Platform {
        Platform::from_name(&bindings::platform_name())
    }
}
