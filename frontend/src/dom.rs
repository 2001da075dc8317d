use log::warn;
use privly_history::config::CANONICAL_HREF_ATTRIBUTE;
use privly_history::{HistoryError, Page, PostRow, PreviewFrame};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

use crate::bindings;

pub fn window() -> Result<Window, HistoryError> {
    web_sys::window().ok_or_else(|| HistoryError::NotFound("window".into()))
}

fn dom_error(what: &str) -> HistoryError {
    HistoryError::NotFound(what.to_string())
}

pub struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    pub fn new() -> Result<Self, HistoryError> {
        let window = window()?;
        let document = window
            .document()
            .ok_or_else(|| dom_error("document"))?;

        Ok(DomPage { window, document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn html_element(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    }

    fn create(&self, tag: &str) -> Result<Element, HistoryError> {
        self.document
            .create_element(tag)
            .map_err(|_| dom_error(&format!("<{}> element", tag)))
    }

    fn append(&self, parent: &Element, child: &Element) -> Result<(), HistoryError> {
        parent
            .append_child(child)
            .map(|_| ())
            .map_err(|_| dom_error("append target"))
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) -> Result<(), HistoryError> {
        element
            .set_attribute(name, value)
            .map_err(|_| dom_error(&format!("attribute {}", name)))
    }

    fn row_button(
        &self,
        class: &str,
        label: &str,
        row: &PostRow,
        index: usize,
    ) -> Result<Element, HistoryError> {
        let button = self.create("button")?;
        self.set_attribute(&button, "type", "submit")?;
        self.set_attribute(&button, "class", class)?;
        self.set_attribute(&button, CANONICAL_HREF_ATTRIBUTE, &row.canonical_href)?;
        self.set_attribute(&button, "data-row-index", &index.to_string())?;
        button.set_text_content(Some(label));
        Ok(button)
    }

    /// A cell holding the raw timestamp (hidden by the `myHide` class) with
    /// the relative time in an `<i>` beside it.
    fn time_cell(&self, raw: &str, relative: &str) -> Result<Element, HistoryError> {
        let cell = self.create("td")?;
        cell.set_text_content(Some(raw));
        cell.set_class_name("myHide");

        let annotation = self.create("i")?;
        annotation.set_text_content(Some(relative));
        self.append(&cell, &annotation)?;
        Ok(cell)
    }

    fn row(&self, row: &PostRow, index: usize) -> Result<Element, HistoryError> {
        let tr = self.create("tr")?;
        self.set_attribute(&tr, "data-row-index", &index.to_string())?;

        let actions = self.create("td")?;
        let preview = self.row_button("btn btn-default preview_link", &row.preview_label, row, index)?;
        let open = self.row_button("btn btn-info open_link", "Open", row, index)?;
        self.append(&actions, &preview)?;
        self.append(&actions, &open)?;
        self.append(&tr, &actions)?;

        for time in [&row.created, &row.burn_after, &row.updated] {
            let cell = self.time_cell(&time.raw, &time.relative)?;
            self.append(&tr, &cell)?;
        }

        Ok(tr)
    }
}

impl Page for DomPage {
    fn location_href(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn set_local_item(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        let storage = self
            .window
            .local_storage()
            .ok()
            .flatten()
            .ok_or_else(|| HistoryError::Storage("localStorage is not available".into()))?;

        storage
            .set_item(key, value)
            .map_err(|_| HistoryError::Storage(format!("could not write {}", key)))
    }

    fn element_exists(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn set_visible(&self, id: &str, visible: bool) {
        let Some(element) = self.html_element(id) else {
            return;
        };
        let style = element.style();

        if !visible {
            let _ = style.set_property("display", "none");
            return;
        }

        // fall back to block when a stylesheet hides the element by default
        let _ = style.remove_property("display");
        let hidden_by_stylesheet = self
            .window
            .get_computed_style(&element)
            .ok()
            .flatten()
            .and_then(|computed| computed.get_property_value("display").ok())
            .map(|display| display == "none")
            .unwrap_or(false);
        if hidden_by_stylesheet {
            let _ = style.set_property("display", "block");
        }
    }

    fn set_enabled(&self, id: &str, enabled: bool) {
        if let Some(element) = self.document.get_element_by_id(id) {
            let _ = if enabled {
                element.remove_attribute("disabled")
            } else {
                element.set_attribute("disabled", "")
            };
        }
    }

    fn set_element_height(&self, id: &str, height_px: f64) -> bool {
        match self.html_element(id) {
            Some(element) => element
                .style()
                .set_property("height", &format!("{}px", height_px))
                .is_ok(),
            None => false,
        }
    }

    fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.document
            .get_element_by_id(id)
            .and_then(|element| element.get_attribute(name))
    }

    fn set_class(&self, id: &str, class: &str, present: bool) {
        if let Some(element) = self.document.get_element_by_id(id) {
            let _ = element.class_list().toggle_with_force(class, present);
        }
    }

    fn append_rows(&self, table_body_id: &str, rows: &[PostRow]) -> Result<(), HistoryError> {
        let body = self
            .document
            .get_element_by_id(table_body_id)
            .ok_or_else(|| dom_error(&format!("#{}", table_body_id)))?;

        for (index, row) in rows.iter().enumerate() {
            let tr = self.row(row, index)?;
            self.append(&body, &tr)?;
        }
        Ok(())
    }

    fn init_table(&self, table_id: &str) {
        bindings::init_data_table(table_id);
    }

    fn hide_row(&self, table_body_id: &str, index: usize) {
        // the table plugin may reorder rows, so match on the index attribute
        let selector = format!("#{} tr[data-row-index=\"{}\"]", table_body_id, index);
        match self.document.query_selector(&selector) {
            Ok(Some(row)) => {
                if let Ok(row) = row.dyn_into::<HtmlElement>() {
                    let _ = row.style().set_property("display", "none");
                }
            }
            _ => warn!("no row {} to hide", index),
        }
    }

    fn show_preview(&self, container_class: &str, frame: &PreviewFrame) -> Result<(), HistoryError> {
        let containers = self
            .document
            .get_elements_by_class_name(container_class);

        for position in 0..containers.length() {
            let Some(container) = containers.item(position) else {
                continue;
            };
            container.set_inner_html("");

            let iframe = self.create("iframe")?;
            for (name, value) in frame.attributes() {
                self.set_attribute(&iframe, name, &value)?;
            }
            self.append(&container, &iframe)?;
        }
        Ok(())
    }

    fn open_window(&self, href: &str) {
        if self.window.open_with_url_and_target(href, "_blank").is_err() {
            warn!("could not open {}", href);
        }
    }

    fn scroll_to_top(&self) {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
    }

    fn reload(&self) {
        let _ = self.window.location().reload();
    }
}
