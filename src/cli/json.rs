use super::dashboard::LOADING_MESSAGE;
use super::ui;
use crate::core::refresh::{Dashboard, Presenter};
use anyhow::{Context, Result};
use tracing::error;

pub fn render_json(dashboard: &Dashboard) -> Result<String> {
    serde_json::to_string_pretty(dashboard).context("Failed to serialize dashboard")
}

/// Emits each dashboard as pretty JSON on stdout. The spinner goes to
/// stderr so the output stays parseable.
#[derive(Default)]
pub struct JsonPresenter {
    indicator: ui::LoadingIndicator,
}

impl Presenter for JsonPresenter {
    fn loading(&self) {
        self.indicator.start(LOADING_MESSAGE);
    }

    fn present(&self, dashboard: &Dashboard) {
        self.indicator.clear();
        match render_json(dashboard) {
            Ok(json) => println!("{json}"),
            Err(e) => error!(error = %e, "Could not render dashboard"),
        }
    }
}
