use std::rc::Rc;
use std::str::FromStr;

use log::debug;

use crate::collaborators::{ExtensionMessaging, Page};
use crate::config::CANONICAL_HREF_ATTRIBUTE;
use crate::error::{DropReason, HistoryError};

/// A `<elementId>,<heightPx>` resize request posted by an embedded iframe.
/// Fractional heights are kept as sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeMessage {
    pub element_id: String,
    pub height_px: f64,
}

impl FromStr for ResizeMessage {
    type Err = HistoryError;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let mut components = payload.split(',');
        let element_id = components.next().unwrap_or_default();
        let height = components
            .next()
            .ok_or(HistoryError::MalformedFrameMessage(DropReason::MissingHeight))?;

        if element_id.is_empty() {
            return Err(HistoryError::MalformedFrameMessage(DropReason::EmptyElementId));
        }

        let height_px = height
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|height| height.is_finite() && *height >= 0.0)
            .ok_or(HistoryError::MalformedFrameMessage(DropReason::InvalidHeight))?;

        Ok(ResizeMessage {
            element_id: element_id.to_string(),
            height_px,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Resized(ResizeMessage),
    UnknownElement(ResizeMessage),
    Dropped(DropReason),
}

pub struct FrameMessageRouter {
    page: Rc<dyn Page>,
    messaging: Rc<dyn ExtensionMessaging>,
    preview_frame_id: String,
}

impl FrameMessageRouter {
    pub fn new(
        page: Rc<dyn Page>,
        messaging: Rc<dyn ExtensionMessaging>,
        preview_frame_id: &str,
    ) -> Self {
        FrameMessageRouter {
            page,
            messaging,
            preview_frame_id: preview_frame_id.to_string(),
        }
    }

    /// Applies a resize request from an embedded frame. Anything from another
    /// origin or not shaped like `id,height` is dropped without touching the
    /// document; the payload is only ever read as an id and a number.
    pub fn route_resize_message(
        &self,
        sender_origin: &str,
        current_origin: &str,
        raw_payload: &str,
    ) -> RouteOutcome {
        if sender_origin != current_origin {
            debug!("dropping frame message from {}", sender_origin);
            return RouteOutcome::Dropped(DropReason::ForeignOrigin);
        }

        let message = match raw_payload.parse::<ResizeMessage>() {
            Ok(message) => message,
            Err(HistoryError::MalformedFrameMessage(reason)) => {
                debug!("dropping frame message {:?}: {}", raw_payload, reason);
                return RouteOutcome::Dropped(reason);
            }
            Err(_) => return RouteOutcome::Dropped(DropReason::InvalidHeight),
        };

        if self
            .page
            .set_element_height(&message.element_id, message.height_px)
        {
            RouteOutcome::Resized(message)
        } else {
            debug!("no element {} to resize", message.element_id);
            RouteOutcome::UnknownElement(message)
        }
    }

    /// Sends the preview frame's canonical URL to the hosting extension so it
    /// can be submitted to the host page's form.
    pub fn forward_canonical_url(&self) -> Result<String, HistoryError> {
        let href = self
            .page
            .attribute(&self.preview_frame_id, CANONICAL_HREF_ATTRIBUTE)
            .ok_or_else(|| {
                HistoryError::NotFound(format!(
                    "{} on #{}",
                    CANONICAL_HREF_ATTRIBUTE, self.preview_frame_id
                ))
            })?;

        self.messaging.fire_url_event(&href);
        Ok(href)
    }

    pub fn initialize_messaging(&self) {
        self.messaging
            .set_initial_content_handler(Box::new(|data| {
                debug!("initial content from extension: {}", data);
            }));
        self.messaging
            .set_message_secret_handler(Box::new(|data| {
                debug!("message secret from extension: {}", data);
            }));

        self.messaging.fire_message_secret_event();
    }
}
