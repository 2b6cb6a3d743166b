//! Reusable back-office UI components
//!
//! Each component renders its own container from plain data and re-renders
//! the whole subtree on change. Rendering lives in pure `render_html` models;
//! the web-sys bindings only swap markup and dispatch delegated clicks.

pub mod components;
pub mod error;
pub mod models;
pub mod utils;

pub use components::comparison_table::{ComparisonTable, ComparisonTableOptions};
pub use components::confirmation_modal::{ConfirmationModal, ConfirmationOptions};
pub use components::display_modal::{DisplayModal, DisplayModalOptions};
pub use components::edit_modal::{EditModal, EditModalOptions};
pub use components::filters::{Filter, FiltersComponent, FiltersOptions};
pub use components::statistics_cards::{StatCard, StatisticsCards, StatisticsOptions};
pub use components::table::{TableComponent, TableOptions};
pub use error::{Result, UiError};
