//! Items × suppliers offer comparison grid
//!
//! [`ComparisonState`] owns everything observable (options, dataset, column
//! toggles) and renders to a string; [`ComparisonTable`] binds one state to
//! a container element and routes delegated clicks back into it.

mod columns;
mod export;
mod render;
mod state;

pub use columns::{ColumnKey, GENERAL_COLUMNS, SUPPLIER_COLUMNS};
pub use export::{escape_csv, ExportCell, ExportTable, ExportValue, CSV_MIME};
pub use state::{ComparisonState, ComparisonTableOptions, Summary, SupplierTotals};

use crate::components::action::Action;
use crate::error::Result;
use crate::models::{ComparisonData, ComparisonDataPatch, Recommendations, SupplierId};
use crate::utils::dom;
use crate::utils::log_trace::{log_error, log_info, log_info_with_data};
use crate::utils::sheetjs;
use gloo::events::EventListener;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

const LOG: &str = "comparison-table";

pub type RecommendationChangeFn = Rc<dyn Fn(usize, &SupplierId, &Recommendations)>;
pub type RecommendAllFn = Rc<dyn Fn(&SupplierId, &Recommendations)>;

#[derive(Clone, Default)]
struct Callbacks {
    on_recommendation_change: Option<RecommendationChangeFn>,
    on_supplier_recommend_all: Option<RecommendAllFn>,
    auto_save: Option<Rc<dyn Fn()>>,
}

struct Inner {
    container: Element,
    state: RefCell<ComparisonState>,
    callbacks: RefCell<Callbacks>,
    listener: RefCell<Option<EventListener>>,
}

/// Cheap handle; clones share the same table
#[derive(Clone)]
pub struct ComparisonTable {
    inner: Rc<Inner>,
}

impl ComparisonTable {
    pub fn new(container_id: &str, options: ComparisonTableOptions) -> Result<Self> {
        let container = dom::container(container_id)?;
        let inner = Rc::new(Inner {
            container,
            state: RefCell::new(ComparisonState::new(options)),
            callbacks: RefCell::new(Callbacks::default()),
            listener: RefCell::new(None),
        });

        let weak: Weak<Inner> = Rc::downgrade(&inner);
        let listener = dom::listen_actions(&inner.container, LOG, move |action, _| {
            if let Some(inner) = weak.upgrade() {
                ComparisonTable { inner }.dispatch(action);
            }
        });
        *inner.listener.borrow_mut() = Some(listener);

        let table = ComparisonTable { inner };
        table.render();
        log_info(LOG, &format!("Initialised in #{}", container_id));
        Ok(table)
    }

    fn dispatch(&self, action: Action) {
        match action {
            Action::ToggleColumn(key) => self.toggle_column_minimization(key),
            Action::ToggleRecommendation { item_index, supplier_id } => {
                self.toggle_recommendation(item_index, &supplier_id)
            }
            Action::RecommendAll(supplier_id) => self.recommend_supplier_for_all(&supplier_id),
            _ => {}
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut ComparisonState) -> R) -> R {
        let result = f(&mut self.inner.state.borrow_mut());
        self.render();
        result
    }

    fn read<R>(&self, f: impl FnOnce(&ComparisonState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    pub fn render(&self) {
        let html = self.read(|s| s.render_html());
        self.inner.container.set_inner_html(&html);
    }

    // ============================================
    // Callbacks
    // ============================================

    pub fn on_recommendation_change(&self, f: impl Fn(usize, &SupplierId, &Recommendations) + 'static) {
        self.inner.callbacks.borrow_mut().on_recommendation_change = Some(Rc::new(f));
    }

    pub fn on_supplier_recommend_all(&self, f: impl Fn(&SupplierId, &Recommendations) + 'static) {
        self.inner.callbacks.borrow_mut().on_supplier_recommend_all = Some(Rc::new(f));
    }

    pub fn on_auto_save(&self, f: impl Fn() + 'static) {
        self.inner.callbacks.borrow_mut().auto_save = Some(Rc::new(f));
    }

    // ============================================
    // Data
    // ============================================

    pub fn set_data(&self, data: ComparisonData) {
        log_info_with_data(
            LOG,
            "Data set",
            serde_json::json!({
                "items": data.items.len(),
                "suppliers": data.suppliers.len(),
            }),
        );
        self.update(|s| s.set_data(data));
    }

    pub fn update_data(&self, patch: ComparisonDataPatch) {
        self.update(|s| s.update_data(patch));
    }

    pub fn get_recommendations(&self) -> Recommendations {
        self.read(|s| s.get_recommendations())
    }

    pub fn set_recommendations(&self, recs: Recommendations) {
        self.update(|s| s.set_recommendations(recs));
    }

    pub fn set_currency_rates(&self, rates: Option<BTreeMap<String, f64>>) {
        self.update(|s| s.set_currency_rates(rates));
    }

    pub fn toggle_recommendation(&self, item_index: usize, supplier_id: &SupplierId) {
        let recs = {
            let mut state = self.inner.state.borrow_mut();
            state.toggle_recommendation(item_index, supplier_id);
            state.get_recommendations()
        };
        let callbacks = self.inner.callbacks.borrow().clone();
        if let Some(cb) = &callbacks.on_recommendation_change {
            cb(item_index, supplier_id, &recs);
        }
        if let Some(save) = &callbacks.auto_save {
            save();
        }
        self.render();
    }

    pub fn recommend_supplier_for_all(&self, supplier_id: &SupplierId) {
        let recs = {
            let mut state = self.inner.state.borrow_mut();
            state.recommend_supplier_for_all(supplier_id);
            state.get_recommendations()
        };
        let callbacks = self.inner.callbacks.borrow().clone();
        if let Some(cb) = &callbacks.on_supplier_recommend_all {
            cb(supplier_id, &recs);
        }
        if let Some(save) = &callbacks.auto_save {
            save();
        }
        self.render();
    }

    pub fn calculate_supplier_totals(&self, supplier_id: &SupplierId) -> SupplierTotals {
        self.read(|s| s.calculate_supplier_totals(supplier_id))
    }

    pub fn calculate_summary(&self) -> Summary {
        self.read(|s| s.calculate_summary())
    }

    pub fn convert_currency(&self, amount: f64, from: &str, to: &str) -> f64 {
        self.read(|s| s.convert_currency(amount, from, to))
    }

    pub fn format_currency(&self, amount: f64, currency: &str) -> String {
        self.read(|s| s.format_currency(amount, currency))
    }

    // ============================================
    // Columns
    // ============================================

    pub fn toggle_column_minimization(&self, key: ColumnKey) {
        self.update(|s| s.toggle_column_minimization(key));
    }

    pub fn set_column_minimization(&self, key: ColumnKey, minimized: bool) {
        self.update(|s| s.set_column_minimization(key, minimized));
    }

    pub fn is_column_minimized(&self, key: ColumnKey) -> bool {
        self.read(|s| s.is_column_minimized(key))
    }

    pub fn show_column(&self, key: ColumnKey) {
        self.set_column_visibility(key, true);
    }

    pub fn hide_column(&self, key: ColumnKey) {
        self.set_column_visibility(key, false);
    }

    pub fn toggle_column(&self, key: ColumnKey) {
        self.update(|s| s.toggle_column(key));
    }

    pub fn set_column_visibility(&self, key: ColumnKey, visible: bool) {
        self.update(|s| s.set_column_visibility(key, visible));
    }

    pub fn set_column_visibilities(&self, visibilities: BTreeMap<ColumnKey, bool>) {
        self.update(|s| s.set_column_visibilities(visibilities));
    }

    pub fn get_column_visibility(&self) -> BTreeMap<ColumnKey, bool> {
        self.read(|s| s.get_column_visibility())
    }

    pub fn set_column_order(&self, order: Vec<ColumnKey>) {
        self.update(|s| s.set_column_order(order));
    }

    pub fn get_column_order(&self) -> Vec<ColumnKey> {
        self.read(|s| s.get_column_order())
    }

    // ============================================
    // Export
    // ============================================

    pub fn export_to_csv(&self, filename: &str) -> Result<()> {
        let content = self.read(|s| s.build_csv())?;
        let filename = if filename.ends_with(".csv") {
            filename.to_string()
        } else {
            format!("{}.csv", filename)
        };
        dom::download_text(&content, CSV_MIME, &filename)?;
        log_info("export", &format!("CSV written: {}", filename));
        Ok(())
    }

    pub async fn export_to_excel(&self, filename: &str) -> Result<()> {
        let sheet = self.read(|s| s.build_sheet());
        let filename = if filename.ends_with(".xlsx") {
            filename.to_string()
        } else {
            format!("{}.xlsx", filename)
        };
        sheetjs::write_workbook(&sheet, &filename).await
    }

    /// Fire-and-forget variant for click handlers
    pub fn spawn_export_to_excel(&self, filename: &str) {
        let table = self.clone();
        let filename = filename.to_string();
        spawn_local(async move {
            if let Err(e) = table.export_to_excel(&filename).await {
                log_error("export", &format!("Excel export failed: {}", e));
            }
        });
    }

    /// Detaches the click listener and empties the container
    pub fn destroy(&self) {
        self.inner.listener.borrow_mut().take();
        self.inner.container.set_inner_html("");
        log_info(LOG, "Destroyed");
    }
}
