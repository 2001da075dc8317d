use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{info, warn};

use crate::collaborators::{NetworkService, Page, PageHandles, UrlParameters};
use crate::config::{PageConfig, CANONICAL_HREF_ATTRIBUTE};
use crate::date_diff::{Clock, DateDiffFormatter};
use crate::error::HistoryError;
use crate::frame_message::FrameMessageRouter;
use crate::loading::LoadingIndicator;
use crate::post_list::{PostListRenderer, PostListResponse, PostRecord, PostRow, PreviewFrame};

const DATA_URL_PARAMETER: &str = "privlyDataURL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewState {
    /// Waiting on the content server to say whether the user is signed in.
    PendingLogin,
    /// Not signed in. Only a full page reload leaves this state.
    LoginFailure,
    /// Signed in; the post index has been requested.
    PendingPost,
    /// The post index is on screen.
    PostCompleted,
}

impl ViewState {
    pub fn can_transition_to(self, next: ViewState) -> bool {
        matches!(
            (self, next),
            (ViewState::PendingLogin, ViewState::LoginFailure)
                | (ViewState::PendingLogin, ViewState::PendingPost)
                | (ViewState::PendingPost, ViewState::PostCompleted)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ViewState::LoginFailure | ViewState::PostCompleted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyOutcome {
    /// The server accepted the delete; `row` is the row that was hidden.
    Removed { row: Option<usize> },
    /// The delete did not go through and the row stays on screen.
    Kept(HistoryError),
}

/// Drives the history page through login, post index fetch and the row
/// actions. Methods take `&self` so the machine can sit behind an `Rc` shared
/// with event handlers while a request is awaited.
pub struct ViewStateMachine<N: NetworkService> {
    config: PageConfig,
    state: Cell<ViewState>,
    started: Cell<bool>,
    network: N,
    page: Rc<dyn Page>,
    url_parameters: Rc<dyn UrlParameters>,
    frame_router: FrameMessageRouter,
    formatter: DateDiffFormatter,
    loading: LoadingIndicator,
    rows: RefCell<Vec<PostRow>>,
    previewed_row: Cell<Option<usize>>,
}

impl<N: NetworkService> ViewStateMachine<N> {
    pub fn new(
        config: PageConfig,
        network: N,
        handles: PageHandles,
        clock: impl Clock + 'static,
    ) -> Self {
        let frame_router = FrameMessageRouter::new(
            handles.page.clone(),
            handles.messaging,
            &config.preview_frame_id,
        );
        let loading = LoadingIndicator::new(&config.loading_id);

        ViewStateMachine {
            config,
            state: Cell::new(ViewState::PendingLogin),
            started: Cell::new(false),
            network,
            page: handles.page,
            url_parameters: handles.url_parameters,
            frame_router,
            formatter: DateDiffFormatter::new(clock),
            loading,
            rows: RefCell::new(Vec::new()),
            previewed_row: Cell::new(None),
        }
    }

    pub fn state(&self) -> ViewState {
        self.state.get()
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn rows(&self) -> Vec<PostRow> {
        self.rows.borrow().clone()
    }

    pub fn previewed_row(&self) -> Option<usize> {
        self.previewed_row.get()
    }

    pub fn frame_router(&self) -> &FrameMessageRouter {
        &self.frame_router
    }

    pub fn loading(&self) -> &LoadingIndicator {
        &self.loading
    }

    /// Runs the page from PendingLogin until it settles in LoginFailure,
    /// PendingPost (post index unavailable) or PostCompleted.
    pub async fn start(&self) -> Result<ViewState, HistoryError> {
        if self.started.replace(true) {
            return Err(HistoryError::InvalidState {
                action: "start",
                state: self.state(),
            });
        }

        let here = self.page.location_href();
        if let Err(err) = self
            .page
            .set_local_item(&self.config.redirect_storage_key, &here)
        {
            warn!("could not remember login redirect: {}", err);
        }

        self.network.initialize_navigation();
        self.frame_router.initialize_messaging();

        let domain = self.network.content_server_domain();
        let auth = self
            .loading
            .track(&*self.page, self.network.init_privly_service(&domain))
            .await;

        match auth {
            Ok(()) => self.enter_pending_post(&domain).await?,
            Err(err) => {
                warn!("{}", err);
                self.enter_login_failure()?;
            }
        }

        Ok(self.state())
    }

    /// Asks the page to reload; the only way out of LoginFailure.
    pub fn reload(&self) -> Result<(), HistoryError> {
        self.require(ViewState::LoginFailure, "reload")?;
        self.page.reload();
        Ok(())
    }

    pub fn preview(&self, index: usize) -> Result<PreviewFrame, HistoryError> {
        self.require(ViewState::PostCompleted, "preview")?;
        let href = self.row_href(index)?;

        self.page.scroll_to_top();
        self.page.set_visible(&self.config.preview_column_id, true);

        let frame = PreviewFrame::new(&self.config.preview_frame_id, &href);
        self.page
            .show_preview(&self.config.preview_container_class, &frame)?;
        self.previewed_row.set(Some(index));

        Ok(frame)
    }

    pub fn open(&self, index: usize) -> Result<(), HistoryError> {
        self.require(ViewState::PostCompleted, "open")?;
        let href = self.row_href(index)?;
        self.page.open_window(&href);
        Ok(())
    }

    /// Deletes the post shown in the preview frame. A failed delete is
    /// reported through the outcome and leaves the row where it is.
    pub async fn destroy(&self) -> Result<DestroyOutcome, HistoryError> {
        self.require(ViewState::PostCompleted, "destroy")?;

        let canonical_href = self
            .page
            .attribute(&self.config.preview_frame_id, CANONICAL_HREF_ATTRIBUTE)
            .ok_or_else(|| HistoryError::NotFound(format!("#{}", self.config.preview_frame_id)))?;
        let application_url = self.url_parameters.application_url(&canonical_href);
        let data_url = self
            .url_parameters
            .parameter_hash(&application_url)
            .remove(DATA_URL_PARAMETER)
            .ok_or_else(|| HistoryError::NotFound(DATA_URL_PARAMETER.to_string()))?;
        // the frame may be re-pointed at another row while the request is out
        let row = self.previewed_row.get();

        let response = self
            .loading
            .track(&*self.page, self.network.same_origin_delete(&data_url))
            .await;

        let err = match response {
            Ok(response) if response.is_ok() => {
                if let Some(index) = row {
                    self.page.hide_row(&self.config.table_body_id, index);
                }
                if self.previewed_row.get() == row {
                    self.previewed_row.set(None);
                    self.page.set_visible(&self.config.preview_column_id, false);
                }
                info!("destroyed {}", data_url);
                return Ok(DestroyOutcome::Removed { row });
            }
            Ok(response) => HistoryError::DeleteRequestFailure {
                url: data_url,
                status: response.status,
            },
            Err(err) => err,
        };

        warn!("post kept: {}", err);
        Ok(DestroyOutcome::Kept(err))
    }

    pub fn hide_preview(&self) -> Result<(), HistoryError> {
        self.require(ViewState::PostCompleted, "hide preview")?;
        self.page.set_visible(&self.config.preview_column_id, false);
        Ok(())
    }

    /// Narrow windows get bordered cells so the stacked table stays readable.
    pub fn on_window_resize(&self, width: f64) -> Result<(), HistoryError> {
        self.require(ViewState::PostCompleted, "resize")?;
        let narrow = width < self.config.narrow_layout_max_width;
        self.page
            .set_class(&self.config.posts_table_id, "cell-border", narrow);
        Ok(())
    }

    fn enter_login_failure(&self) -> Result<(), HistoryError> {
        self.transition(ViewState::LoginFailure)?;

        self.page.set_visible(&self.config.messages_id, false);
        self.page.set_visible(&self.config.login_message_id, true);
        self.network.show_logged_out_nav();
        Ok(())
    }

    async fn enter_pending_post(&self, domain: &str) -> Result<(), HistoryError> {
        self.transition(ViewState::PendingPost)?;

        self.network.show_logged_in_nav();
        self.page.set_enabled(&self.config.save_button_id, true);
        self.page.set_visible(&self.config.messages_id, false);
        self.page.set_visible(&self.config.form_id, true);

        let url = self.config.posts_url(domain);
        let response = self
            .loading
            .track(&*self.page, self.network.same_origin_get(&url))
            .await;

        match response.and_then(|response| PostListResponse::from_response(&url, response)) {
            Ok(list) => self.enter_post_completed(list.json),
            Err(err) => {
                warn!("post index unavailable: {}", err);
                Ok(())
            }
        }
    }

    fn enter_post_completed(&self, records: Vec<PostRecord>) -> Result<(), HistoryError> {
        self.transition(ViewState::PostCompleted)?;

        let rows = PostListRenderer::new(&self.formatter, self.network.platform()).render(&records);
        // rows that did make it on screen stay actionable if appending fails
        *self.rows.borrow_mut() = rows.clone();
        self.page.append_rows(&self.config.table_body_id, &rows)?;
        self.page.init_table(&self.config.posts_table_id);
        info!("rendered {} posts", rows.len());
        Ok(())
    }

    fn transition(&self, next: ViewState) -> Result<(), HistoryError> {
        let current = self.state.get();
        if !current.can_transition_to(next) {
            return Err(HistoryError::InvalidState {
                action: "transition",
                state: current,
            });
        }

        info!("view state {:?} -> {:?}", current, next);
        self.state.set(next);
        Ok(())
    }

    fn require(&self, expected: ViewState, action: &'static str) -> Result<(), HistoryError> {
        let state = self.state.get();
        if state != expected {
            return Err(HistoryError::InvalidState { action, state });
        }
        Ok(())
    }

    fn row_href(&self, index: usize) -> Result<String, HistoryError> {
        self.rows
            .borrow()
            .get(index)
            .map(|row| row.canonical_href.clone())
            .ok_or_else(|| HistoryError::NotFound(format!("post row {}", index)))
    }
}
