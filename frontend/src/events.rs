use log::debug;
use privly_history::HistoryError;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, EventTarget};

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// Owns every DOM listener the page registers. Dropping the router (or
/// calling `teardown`) unregisters them all.
#[derive(Default)]
pub struct EventRouter {
    listeners: Vec<Listener>,
}

impl EventRouter {
    pub fn new() -> Self {
        EventRouter::default()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn listen(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), HistoryError> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);

        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|_| HistoryError::NotFound(format!("{} listener target", event)))?;

        self.listeners.push(Listener {
            target: target.clone(),
            event,
            callback,
        });
        Ok(())
    }

    pub fn listen_by_id(
        &mut self,
        document: &Document,
        id: &str,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), HistoryError> {
        let element = document
            .get_element_by_id(id)
            .ok_or_else(|| HistoryError::NotFound(format!("#{}", id)))?;

        self.listen(&element, event, handler)
    }

    /// Like `listen_by_id`, but a missing element is skipped. Returns whether
    /// the listener was installed.
    pub fn listen_if_present(
        &mut self,
        document: &Document,
        id: &str,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<bool, HistoryError> {
        match document.get_element_by_id(id) {
            Some(element) => self.listen(&element, event, handler).map(|_| true),
            None => {
                debug!("no #{}, {} listener skipped", id, event);
                Ok(false)
            }
        }
    }

    pub fn teardown(&mut self) {
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        debug!("event listeners removed");
    }
}

impl Drop for EventRouter {
    fn drop(&mut self) {
        self.teardown();
    }
}
