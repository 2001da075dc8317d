extern crate chrono;
extern crate log;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;

pub mod collaborators;
pub mod config;
pub mod date_diff;
pub mod error;
pub mod first_run;
pub mod frame_message;
pub mod loading;
pub mod post_list;
pub mod view_state;

pub use collaborators::{
    ExtensionMessaging, NetworkResponse, NetworkService, Page, PageHandles, PayloadHandler,
    Tooltip, UrlParameters,
};
pub use config::PageConfig;
pub use date_diff::{Clock, DateDiffFormatter, FixedClock, SystemClock};
pub use error::{DropReason, HistoryError};
pub use frame_message::{FrameMessageRouter, ResizeMessage, RouteOutcome};
pub use loading::LoadingIndicator;
pub use post_list::{
    Platform, PostListRenderer, PostListResponse, PostRecord, PostRow, PreviewFrame, ServerTime,
};
pub use view_state::{DestroyOutcome, ViewState, ViewStateMachine};
