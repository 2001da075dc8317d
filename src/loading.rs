use std::cell::Cell;
use std::future::Future;

use crate::collaborators::Page;

/// Shows the loading region while any request is outstanding.
pub struct LoadingIndicator {
    element_id: String,
    in_flight: Cell<usize>,
}

impl LoadingIndicator {
    pub fn new(element_id: &str) -> Self {
        LoadingIndicator {
            element_id: element_id.to_string(),
            in_flight: Cell::new(0),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    pub fn begin(&self, page: &dyn Page) {
        let previous = self.in_flight.get();
        self.in_flight.set(previous + 1);
        if previous == 0 {
            page.set_visible(&self.element_id, true);
        }
    }

    pub fn end(&self, page: &dyn Page) {
        let previous = self.in_flight.get();
        if previous == 0 {
            return;
        }
        self.in_flight.set(previous - 1);
        if previous == 1 {
            page.set_visible(&self.element_id, false);
        }
    }

    pub async fn track<F: Future>(&self, page: &dyn Page, request: F) -> F::Output {
        self.begin(page);
        let output = request.await;
        self.end(page);
        output
    }
}
