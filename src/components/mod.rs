//! UI components
//!
//! Every component owns one container element and keeps its state in a
//! pure model that renders to markup; the bindings only mount and dispatch.

pub mod action;
pub mod comparison_table;
pub mod confirmation_modal;
pub mod display_modal;
pub mod edit_modal;
pub mod filters;
pub mod statistics_cards;
pub mod table;
