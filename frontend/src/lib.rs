extern crate console_error_panic_hook;

pub mod bindings;
pub mod connection;
pub mod dom;
pub mod events;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use log::{debug, info, warn};
use privly_history::{
    HistoryError, Page, PageConfig, PageHandles, SystemClock, ViewState, ViewStateMachine,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, MessageEvent};

use connection::PrivlyNetworkService;
use dom::DomPage;
use events::EventRouter;

pub type HistoryMachine = ViewStateMachine<PrivlyNetworkService>;

struct PageSession {
    machine: Rc<HistoryMachine>,
    page: Rc<DomPage>,
    events: EventRouter,
}

thread_local! {
    static PAGE_SESSION: RefCell<Option<PageSession>> = RefCell::new(None);
}

static RUNTIME: Once = Once::new();

fn init_runtime() {
    RUNTIME.call_once(|| {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::default());
    });
}

fn to_js_error(err: HistoryError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub fn bootstrap() -> Result<(), JsValue> {
    start_session(PageConfig::default()).map_err(to_js_error)
}

#[wasm_bindgen]
pub fn bootstrap_with_config(config_json: &str) -> Result<(), JsValue> {
    let config = PageConfig::from_json(config_json).map_err(to_js_error)?;
    start_session(config).map_err(to_js_error)
}

/// Sends the previewed post's URL to the extension so the host page's form
/// can submit it.
#[wasm_bindgen]
pub fn post_url() -> Result<(), JsValue> {
    PAGE_SESSION.with(|session| {
        let session = session.borrow();
        let session = session
            .as_ref()
            .ok_or_else(|| JsValue::from_str("history page is not running"))?;

        session
            .machine
            .frame_router()
            .forward_canonical_url()
            .map(|_| ())
            .map_err(to_js_error)
    })
}

#[wasm_bindgen]
pub fn first_run() -> Result<(), JsValue> {
    init_runtime();
    let page = DomPage::new().map_err(to_js_error)?;

    privly_history::first_run::first_run(
        &PrivlyNetworkService,
        &page,
        &bindings::PrivlyTooltip,
        &PageConfig::default(),
    );
    Ok(())
}

fn start_session(config: PageConfig) -> Result<(), HistoryError> {
    init_runtime();

    let page = Rc::new(DomPage::new()?);
    // headless browsers load the page without its navigation
    if !page.element_exists(&config.logout_link_id) {
        info!("#{} missing, history page not started", config.logout_link_id);
        return Ok(());
    }

    let handles = PageHandles {
        page: page.clone(),
        messaging: Rc::new(bindings::PrivlyExtension::default()),
        url_parameters: Rc::new(bindings::PrivlyParameters),
    };
    let machine = Rc::new(ViewStateMachine::new(
        config,
        PrivlyNetworkService,
        handles,
        SystemClock,
    ));

    let mut events = EventRouter::new();
    let window = dom::window()?;
    let current_origin = window.location().origin().unwrap_or_default();

    let router_machine = machine.clone();
    events.listen(&window, "message", move |event: Event| {
        route_frame_message(&router_machine, &current_origin, event);
    })?;

    let reload_machine = machine.clone();
    events.listen_if_present(
        page.document(),
        &machine.config().refresh_link_id,
        "click",
        move |_event: Event| {
            if let Err(err) = reload_machine.reload() {
                debug!("refresh ignored: {}", err);
            }
        },
    )?;

    PAGE_SESSION.with(|session| {
        *session.borrow_mut() = Some(PageSession {
            machine: machine.clone(),
            page,
            events,
        });
    });

    wasm_bindgen_futures::spawn_local(async move {
        match machine.start().await {
            Ok(ViewState::PostCompleted) => {
                if let Err(err) = wire_post_list(&machine) {
                    warn!("post list actions unavailable: {}", err);
                }
            }
            Ok(state) => info!("history page settled in {:?}", state),
            Err(err) => warn!("history page failed to start: {}", err),
        }
    });

    Ok(())
}

fn route_frame_message(machine: &HistoryMachine, current_origin: &str, event: Event) {
    let Ok(message) = event.dyn_into::<MessageEvent>() else {
        return;
    };
    let Some(payload) = message.data().as_string() else {
        return;
    };

    let outcome = machine
        .frame_router()
        .route_resize_message(&message.origin(), current_origin, &payload);
    debug!("frame message: {:?}", outcome);
}

/// Index carried by the row button an event started from, if any.
fn clicked_row(event: &Event, selector: &str) -> Option<usize> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let button = target.closest(selector).ok()??;
    button.get_attribute("data-row-index")?.parse().ok()
}

fn wire_post_list(machine: &Rc<HistoryMachine>) -> Result<(), HistoryError> {
    PAGE_SESSION.with(|session| {
        let mut session = session.borrow_mut();
        let session = session
            .as_mut()
            .ok_or_else(|| HistoryError::NotFound("history page session".into()))?;
        let document = session.page.document().clone();
        let config = machine.config();

        let rows_machine = machine.clone();
        session.events.listen_by_id(
            &document,
            &config.table_body_id,
            "click",
            move |event: Event| {
                let outcome = if let Some(index) = clicked_row(&event, "button.preview_link") {
                    rows_machine.preview(index).map(|_| ())
                } else if let Some(index) = clicked_row(&event, "button.open_link") {
                    rows_machine.open(index)
                } else {
                    return;
                };
                if let Err(err) = outcome {
                    warn!("row action failed: {}", err);
                }
            },
        )?;

        let destroy_machine = machine.clone();
        session.events.listen_if_present(
            &document,
            &config.destroy_link_id,
            "click",
            move |_event: Event| {
                let machine = destroy_machine.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(err) = machine.destroy().await {
                        warn!("destroy failed: {}", err);
                    }
                });
            },
        )?;

        let hide_machine = machine.clone();
        session.events.listen_if_present(
            &document,
            &config.hide_preview_id,
            "click",
            move |_event: Event| {
                let _ = hide_machine.hide_preview();
            },
        )?;

        let window = dom::window()?;
        let resize_window = window.clone();
        let resize_machine = machine.clone();
        session.events.listen(&window, "resize", move |_event: Event| {
            let width = resize_window
                .inner_width()
                .ok()
                .and_then(|width| width.as_f64())
                .unwrap_or_default();
            let _ = resize_machine.on_window_resize(width);
        })?;

        info!("post list wired with {} listeners", session.events.len());
        Ok(())
    })
}
