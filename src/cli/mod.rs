pub mod calc;
pub mod dashboard;
pub mod json;
pub mod setup;
pub mod ui;

pub use calc::CalcPresenter;
pub use dashboard::TerminalPresenter;
pub use json::JsonPresenter;
