//! Generic data table: sorting, pagination, row actions, inline editing

mod column;
mod state;

pub use column::{get_path, set_path, ColumnType, TableAction, TableColumn};
pub use state::{EditOutcome, SortDirection, TableOptions, TableState};

use crate::components::action::Action;
use crate::components::comparison_table::CSV_MIME;
use crate::error::Result;
use crate::utils::dom;
use crate::utils::log_trace::{log_debug, log_error, log_info, log_warn};
use gloo::events::{EventListener, EventListenerOptions};
use serde_json::Value;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlElement, HtmlInputElement, HtmlSelectElement, KeyboardEvent};

const LOG: &str = "table";

pub type EditFuture = Pin<Box<dyn Future<Output = std::result::Result<Option<Value>, String>>>>;
/// `(row, field, new_value, old_value)`; `Ok(Some(obj))` replaces row fields,
/// `Err` rolls the edit back
pub type EditFn = Rc<dyn Fn(Value, String, Value, Value) -> EditFuture>;

#[derive(Clone, Default)]
struct Callbacks {
    on_row_click: Option<Rc<dyn Fn(&Value, usize)>>,
    on_sort: Option<Rc<dyn Fn(&str, SortDirection)>>,
    on_page_change: Option<Rc<dyn Fn(usize)>>,
    on_refresh: Option<Rc<dyn Fn()>>,
    on_export: Option<Rc<dyn Fn()>>,
    on_edit: Option<EditFn>,
}

struct EditSession {
    row: usize,
    field: String,
    cell: Element,
    original_html: String,
    committing: bool,
    listeners: Vec<EventListener>,
}

struct Inner {
    container: Element,
    state: RefCell<TableState>,
    callbacks: RefCell<Callbacks>,
    listener: RefCell<Option<EventListener>>,
    editing: RefCell<Option<EditSession>>,
}

#[derive(Clone)]
pub struct TableComponent {
    inner: Rc<Inner>,
}

impl TableComponent {
    pub fn new(container_id: &str, options: TableOptions) -> Result<Self> {
        let container = dom::container(container_id)?;
        let inner = Rc::new(Inner {
            container,
            state: RefCell::new(TableState::new(options)),
            callbacks: RefCell::new(Callbacks::default()),
            listener: RefCell::new(None),
            editing: RefCell::new(None),
        });

        let weak: Weak<Inner> = Rc::downgrade(&inner);
        let listener = dom::listen_actions(&inner.container, LOG, move |action, el| {
            if let Some(inner) = weak.upgrade() {
                TableComponent { inner }.dispatch(action, el);
            }
        });
        *inner.listener.borrow_mut() = Some(listener);

        let table = TableComponent { inner };
        table.render();
        Ok(table)
    }

    fn dispatch(&self, action: Action, el: Element) {
        match action {
            Action::Sort(field) => self.handle_sort(&field),
            Action::Page(page) => self.change_page(page),
            Action::Refresh => {
                let cb = self.inner.callbacks.borrow().on_refresh.clone();
                if let Some(cb) = cb {
                    cb();
                }
            }
            Action::Export => self.handle_export(),
            Action::RowClick(index) => {
                let cb = self.inner.callbacks.borrow().on_row_click.clone();
                let row = self.inner.state.borrow().row(index).cloned();
                if let (Some(cb), Some(row)) = (cb, row) {
                    cb(&row, index);
                }
            }
            Action::RowAction { action, row } => self.handle_row_action(&action, row),
            Action::EditCell { row, field } => self.start_edit(row, &field, el),
            _ => {}
        }
    }

    pub fn render(&self) {
        let html = self.inner.state.borrow().render_html();
        // a re-render orphans any open editor
        self.inner.editing.borrow_mut().take();
        self.inner.container.set_inner_html(&html);
    }

    fn handle_row_action(&self, key: &str, index: usize) {
        let (action, row) = {
            let state = self.inner.state.borrow();
            let action = state.options.actions.iter().find(|a| a.key == key).cloned();
            (action, state.row(index).cloned())
        };
        match (action.and_then(|a| a.on_click), row) {
            (Some(on_click), Some(row)) => on_click(&row, index),
            _ => log_debug(LOG, &format!("Action not found or no onClick handler: {}", key)),
        }
    }

    fn handle_export(&self) {
        let cb = self.inner.callbacks.borrow().on_export.clone();
        match cb {
            Some(cb) => cb(),
            None => {
                let filename = self
                    .inner
                    .state
                    .borrow()
                    .options
                    .title
                    .clone()
                    .unwrap_or_else(|| "tablo".to_string());
                if let Err(e) = self.export_to_csv(&filename) {
                    log_error("export", &format!("CSV export failed: {}", e));
                }
            }
        }
    }

    // ============================================
    // Sorting & paging
    // ============================================

    /// Flips or starts the sort; the caller re-sorts the data in `on_sort`
    pub fn handle_sort(&self, field: &str) {
        let direction = self.inner.state.borrow_mut().handle_sort(field);
        self.render();
        let cb = self.inner.callbacks.borrow().on_sort.clone();
        if let Some(cb) = cb {
            cb(field, direction);
        }
    }

    pub fn change_page(&self, page: usize) {
        if !self.inner.state.borrow_mut().change_page(page) {
            log_debug(LOG, &format!("Page {} out of range", page));
            return;
        }
        let cb = self.inner.callbacks.borrow().on_page_change.clone();
        if let Some(cb) = cb {
            cb(page);
        }
        self.render();
    }

    pub fn set_sort_state(&self, field: &str, direction: SortDirection) {
        self.inner.state.borrow_mut().set_sort_state(field, direction);
        self.render();
    }

    // ============================================
    // Data & columns
    // ============================================

    pub fn update_data(&self, data: Vec<Value>, total_items: Option<usize>) {
        self.inner.state.borrow_mut().update_data(data, total_items);
        self.render();
    }

    pub fn set_loading(&self, loading: bool) {
        self.inner.state.borrow_mut().options.loading = loading;
        self.render();
    }

    pub fn update_column(&self, field: &str, update: impl FnOnce(&mut TableColumn)) {
        if self.inner.state.borrow_mut().update_column(field, update) {
            self.render();
        }
    }

    pub fn get_column(&self, field: &str) -> Option<TableColumn> {
        self.inner.state.borrow().get_column(field).cloned()
    }

    pub fn add_action(&self, action: TableAction) {
        self.inner.state.borrow_mut().add_action(action);
        self.render();
    }

    pub fn remove_action(&self, key: &str) {
        self.inner.state.borrow_mut().remove_action(key);
        self.render();
    }

    pub fn data(&self) -> Vec<Value> {
        self.inner.state.borrow().options.data.clone()
    }

    // ============================================
    // Callbacks
    // ============================================

    pub fn on_row_click(&self, f: impl Fn(&Value, usize) + 'static) {
        self.inner.callbacks.borrow_mut().on_row_click = Some(Rc::new(f));
    }

    pub fn on_sort(&self, f: impl Fn(&str, SortDirection) + 'static) {
        self.inner.callbacks.borrow_mut().on_sort = Some(Rc::new(f));
    }

    pub fn on_page_change(&self, f: impl Fn(usize) + 'static) {
        self.inner.callbacks.borrow_mut().on_page_change = Some(Rc::new(f));
    }

    pub fn on_refresh(&self, f: impl Fn() + 'static) {
        self.inner.callbacks.borrow_mut().on_refresh = Some(Rc::new(f));
    }

    /// Replaces the built-in CSV download
    pub fn on_export(&self, f: impl Fn() + 'static) {
        self.inner.callbacks.borrow_mut().on_export = Some(Rc::new(f));
    }

    pub fn on_edit<F, Fut>(&self, f: F)
    where
        F: Fn(Value, String, Value, Value) -> Fut + 'static,
        Fut: Future<Output = std::result::Result<Option<Value>, String>> + 'static,
    {
        let edit: EditFn = Rc::new(move |row, field, new_value, old_value| {
            Box::pin(f(row, field, new_value, old_value)) as EditFuture
        });
        self.inner.callbacks.borrow_mut().on_edit = Some(edit);
    }

    // ============================================
    // Inline editing
    // ============================================

    fn start_edit(&self, row: usize, field: &str, cell: Element) {
        if self.inner.editing.borrow().is_some() {
            return;
        }
        let Some(editor) = self.inner.state.borrow().editor_html(row, field) else {
            return;
        };
        let original_html = cell.inner_html();
        cell.set_inner_html(&editor);
        let Some(input) = dom::find(&cell, ".inline-editor") else {
            cell.set_inner_html(&original_html);
            return;
        };

        let weak = Rc::downgrade(&self.inner);
        let keydown = EventListener::new_with_options(
            &input,
            "keydown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(key) = event.dyn_ref::<KeyboardEvent>().map(|e| e.key()) else {
                    return;
                };
                let Some(inner) = weak.upgrade() else { return };
                match key.as_str() {
                    "Enter" => {
                        event.prevent_default();
                        TableComponent { inner }.commit_edit();
                    }
                    "Escape" => {
                        event.prevent_default();
                        TableComponent { inner }.end_edit(None);
                    }
                    _ => {}
                }
            },
        );
        let weak = Rc::downgrade(&self.inner);
        let blur = EventListener::new(&input, "blur", move |_| {
            if let Some(inner) = weak.upgrade() {
                TableComponent { inner }.commit_edit();
            }
        });

        *self.inner.editing.borrow_mut() = Some(EditSession {
            row,
            field: field.to_string(),
            cell,
            original_html,
            committing: false,
            listeners: vec![keydown, blur],
        });
        if let Some(input) = input.dyn_ref::<HtmlElement>() {
            let _ = input.focus();
        }
    }

    fn commit_edit(&self) {
        let (row, field, cell) = {
            let mut editing = self.inner.editing.borrow_mut();
            match editing.as_mut() {
                Some(session) if !session.committing => {
                    session.committing = true;
                    (session.row, session.field.clone(), session.cell.clone())
                }
                _ => return,
            }
        };
        let text = dom::find(&cell, ".inline-editor")
            .and_then(|el| editor_value(&el))
            .unwrap_or_default();

        let outcome = self.inner.state.borrow_mut().commit_edit(row, &field, &text);
        match outcome {
            EditOutcome::Unchanged => self.end_edit(None),
            EditOutcome::Rejected(message) => {
                log_warn(LOG, &message);
                self.end_edit(None);
            }
            EditOutcome::Changed { old_value, new_value } => {
                let on_edit = self.inner.callbacks.borrow().on_edit.clone();
                let Some(on_edit) = on_edit else {
                    let html = self.inner.state.borrow().cell_html(row, &field);
                    self.end_edit(html);
                    return;
                };
                let row_value = self.inner.state.borrow().row(row).cloned().unwrap_or(Value::Null);
                let table = self.clone();
                spawn_local(async move {
                    match on_edit(row_value, field.clone(), new_value, old_value.clone()).await {
                        Ok(update) => {
                            if let Some(update) = update {
                                table.inner.state.borrow_mut().merge_row(row, update);
                            }
                            let html = table.inner.state.borrow().cell_html(row, &field);
                            table.end_edit(html);
                            log_info(LOG, &format!("Row {} field {} updated", row, field));
                        }
                        Err(e) => {
                            log_error(LOG, &format!("Düzenleme başarısız: {}", e));
                            table.inner.state.borrow_mut().revert_edit(row, &field, old_value);
                            table.end_edit(None);
                        }
                    }
                });
            }
        }
    }

    /// Closes the editor with new cell markup, or restores the original
    fn end_edit(&self, html: Option<String>) {
        let Some(session) = self.inner.editing.borrow_mut().take() else {
            return;
        };
        let EditSession { cell, original_html, listeners, .. } = session;
        cell.set_inner_html(html.as_deref().unwrap_or(&original_html));
        // listeners may be the caller; release them after this turn
        spawn_local(async move { drop(listeners) });
    }

    // ============================================
    // Export & teardown
    // ============================================

    pub fn export_to_csv(&self, filename: &str) -> Result<()> {
        let content = self.inner.state.borrow().build_csv()?;
        let filename = if filename.ends_with(".csv") {
            filename.to_string()
        } else {
            format!("{}.csv", filename)
        };
        dom::download_text(&content, CSV_MIME, &filename)?;
        log_info("export", &format!("CSV written: {}", filename));
        Ok(())
    }

    pub fn destroy(&self) {
        self.inner.editing.borrow_mut().take();
        self.inner.listener.borrow_mut().take();
        self.inner.container.set_inner_html("");
    }
}

fn editor_value(el: &Element) -> Option<String> {
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    el.dyn_ref::<HtmlSelectElement>().map(|select| select.value())
}
