use log::info;

use crate::collaborators::{NetworkService, Page, Tooltip};
use crate::config::PageConfig;

/// Shows the first-run page: the form with the navigation of a signed-in
/// user, plus a preview of the tooltip the extension adds to host pages.
pub fn first_run<N: NetworkService>(
    network: &N,
    page: &dyn Page,
    tooltip: &dyn Tooltip,
    config: &PageConfig,
) {
    network.initialize_navigation();
    page.set_visible(&config.messages_id, false);
    page.set_visible(&config.form_id, true);
    tooltip.show();
    network.show_logged_in_nav();

    tooltip.show();
    info!("first run page shown");
}
