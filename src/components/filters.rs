//! Declarative filter bar: text, dropdown, date, datetime, select,
//! checkbox and date-range fields with apply/clear buttons

use crate::components::action::Action;
use crate::error::Result;
use crate::models::SelectOption;
use crate::utils::dom;
use crate::utils::format::{escape_html, is_truthy, value_text};
use crate::utils::log_trace::{log_debug, log_info, log_warn};
use gloo::events::EventListener;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement, HtmlSelectElement, KeyboardEvent};

const LOG: &str = "filters";
/// Grid columns left for fields; the button column takes the other two
const AVAILABLE_COLUMNS: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct FiltersOptions {
    pub title: String,
    pub show_clear_button: bool,
    pub show_apply_button: bool,
    pub apply_button_text: String,
    pub clear_button_text: String,
}

impl Default for FiltersOptions {
    fn default() -> Self {
        FiltersOptions {
            title: "Filtreler".to_string(),
            show_clear_button: true,
            show_apply_button: true,
            apply_button_text: "Filtrele".to_string(),
            clear_button_text: "Temizle".to_string(),
        }
    }
}

impl FiltersOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    /// `input_type` is the html type: text, number, email ...
    Text { input_type: String, placeholder: String },
    /// Select with a search box over its options
    Dropdown { options: Vec<SelectOption>, placeholder: String, searchable: bool },
    Date,
    Datetime,
    Select { options: Vec<SelectOption>, placeholder: String },
    Checkbox,
    DateRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Checked(bool),
    Range { start: String, end: String },
}

impl FilterValue {
    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::Text(s) => Value::String(s.clone()),
            FilterValue::Checked(b) => Value::Bool(*b),
            FilterValue::Range { start, end } => json!({ "start": start, "end": end }),
        }
    }

    fn empty_like(&self) -> FilterValue {
        match self {
            FilterValue::Text(_) => FilterValue::Text(String::new()),
            FilterValue::Checked(_) => FilterValue::Checked(false),
            FilterValue::Range { .. } => FilterValue::Range { start: String::new(), end: String::new() },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub id: String,
    pub label: String,
    pub kind: FilterKind,
    pub col_size: u8,
    pub value: FilterValue,
}

impl Filter {
    fn new(id: &str, label: &str, kind: FilterKind) -> Self {
        let (col_size, value) = match kind {
            FilterKind::Checkbox => (2, FilterValue::Checked(false)),
            FilterKind::DateRange => (3, FilterValue::Range { start: String::new(), end: String::new() }),
            _ => (2, FilterValue::Text(String::new())),
        };
        Filter {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            col_size,
            value,
        }
    }

    pub fn text(id: &str, label: &str) -> Self {
        Filter::new(
            id,
            label,
            FilterKind::Text { input_type: "text".to_string(), placeholder: String::new() },
        )
    }

    pub fn dropdown(id: &str, label: &str, options: Vec<SelectOption>) -> Self {
        Filter::new(
            id,
            label,
            FilterKind::Dropdown { options, placeholder: "Seçiniz".to_string(), searchable: true },
        )
    }

    pub fn date(id: &str, label: &str) -> Self {
        Filter::new(id, label, FilterKind::Date)
    }

    pub fn datetime(id: &str, label: &str) -> Self {
        Filter::new(id, label, FilterKind::Datetime)
    }

    pub fn select(id: &str, label: &str, options: Vec<SelectOption>) -> Self {
        Filter::new(id, label, FilterKind::Select { options, placeholder: "Seçiniz".to_string() })
    }

    pub fn checkbox(id: &str, label: &str) -> Self {
        Filter::new(id, label, FilterKind::Checkbox)
    }

    pub fn date_range(id: &str, label: &str) -> Self {
        Filter::new(id, label, FilterKind::DateRange)
    }

    pub fn with_col_size(mut self, size: u8) -> Self {
        self.col_size = size.clamp(1, 12);
        self
    }

    /// Ignored for kinds without a placeholder
    pub fn with_placeholder(mut self, text: &str) -> Self {
        match &mut self.kind {
            FilterKind::Text { placeholder, .. }
            | FilterKind::Dropdown { placeholder, .. }
            | FilterKind::Select { placeholder, .. } => *placeholder = text.to_string(),
            _ => {}
        }
        self
    }

    pub fn with_input_type(mut self, html_type: &str) -> Self {
        if let FilterKind::Text { input_type, .. } = &mut self.kind {
            *input_type = html_type.to_string();
        }
        self
    }

    pub fn not_searchable(mut self) -> Self {
        if let FilterKind::Dropdown { searchable, .. } = &mut self.kind {
            *searchable = false;
        }
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        if let FilterValue::Text(v) = &mut self.value {
            *v = value.to_string();
        }
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        if let FilterValue::Checked(v) = &mut self.value {
            *v = checked;
        }
        self
    }

    pub fn with_range(mut self, start: &str, end: &str) -> Self {
        if let FilterValue::Range { .. } = self.value {
            self.value = FilterValue::Range { start: start.to_string(), end: end.to_string() };
        }
        self
    }

    fn options(&self) -> Option<&[SelectOption]> {
        match &self.kind {
            FilterKind::Dropdown { options, .. } | FilterKind::Select { options, .. } => Some(options),
            _ => None,
        }
    }

    /// Accepts the loose JSON a caller hands to `set_filter_values`
    fn assign(&mut self, value: &Value) {
        self.value = match (&self.value, value) {
            (FilterValue::Checked(_), v) => FilterValue::Checked(is_truthy(v)),
            (FilterValue::Range { start, end }, v) => {
                let pick = |key: &str, current: &String| match v.get(key).map(value_text) {
                    Some(s) if !s.is_empty() => s,
                    _ => current.clone(),
                };
                FilterValue::Range { start: pick("start", start), end: pick("end", end) }
            }
            (FilterValue::Text(_), v) => FilterValue::Text(value_text(v)),
        };
    }
}

/// Options whose label contains `query`, case-insensitively
pub fn matching_options<'a>(options: &'a [SelectOption], query: &str) -> Vec<&'a SelectOption> {
    let query = query.trim().to_lowercase();
    options
        .iter()
        .filter(|o| query.is_empty() || o.label.to_lowercase().contains(&query))
        .collect()
}

fn options_html(options: &[&SelectOption], placeholder: &str, current: &str) -> String {
    let mut html = format!(r#"<option value="">{}</option>"#, escape_html(placeholder));
    for option in options {
        let value = value_text(&option.value);
        html.push_str(&format!(
            r#"<option value="{}"{}{}>{}</option>"#,
            escape_html(&value),
            if !current.is_empty() && value == current { " selected" } else { "" },
            if option.disabled { " disabled" } else { "" },
            escape_html(&option.label)
        ));
    }
    html
}

// ============================================
// State
// ============================================

#[derive(Debug, Clone)]
pub struct FiltersState {
    pub options: FiltersOptions,
    filters: Vec<Filter>,
    pub loading: bool,
}

impl FiltersState {
    pub fn new(options: FiltersOptions) -> Self {
        FiltersState {
            options,
            filters: Vec::new(),
            loading: false,
        }
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn filter(&self, id: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.id == id)
    }

    fn filter_mut(&mut self, id: &str) -> Option<&mut Filter> {
        self.filters.iter_mut().find(|f| f.id == id)
    }

    /// A filter with an existing id replaces it in place
    pub fn add_filter(&mut self, filter: Filter) -> &mut Self {
        match self.filter_mut(&filter.id) {
            Some(existing) => *existing = filter,
            None => self.filters.push(filter),
        }
        self
    }

    pub fn remove_filter(&mut self, id: &str) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f.id != id);
        self.filters.len() != before
    }

    pub fn remove_all_filters(&mut self) {
        self.filters.clear();
    }

    /// Only dropdown and select filters carry options
    pub fn update_filter_options(&mut self, id: &str, new_options: Vec<SelectOption>) -> bool {
        match self.filter_mut(id).map(|f| &mut f.kind) {
            Some(FilterKind::Dropdown { options, .. }) | Some(FilterKind::Select { options, .. }) => {
                *options = new_options;
                true
            }
            _ => false,
        }
    }

    pub fn set_value(&mut self, id: &str, value: FilterValue) -> bool {
        match self.filter_mut(id) {
            Some(filter) => {
                filter.value = value;
                true
            }
            None => false,
        }
    }

    pub fn get_filter_values(&self) -> Map<String, Value> {
        self.filters.iter().map(|f| (f.id.clone(), f.value.to_json())).collect()
    }

    /// Unknown ids are skipped; range bounds are only replaced when given
    pub fn set_filter_values(&mut self, values: &Map<String, Value>) {
        for (id, value) in values {
            if let Some(filter) = self.filter_mut(id) {
                filter.assign(value);
            }
        }
    }

    pub fn clear_filters(&mut self) {
        for filter in &mut self.filters {
            filter.value = filter.value.empty_like();
        }
    }

    /// Shrinks fields proportionally when they overflow the row
    pub fn adjusted_col_size(&self, filter: &Filter) -> u8 {
        let total: u32 = self.filters.iter().map(|f| f.col_size as u32).sum();
        if total <= AVAILABLE_COLUMNS as u32 {
            return filter.col_size;
        }
        let scaled = filter.col_size as u32 * AVAILABLE_COLUMNS as u32 / total;
        scaled.max(1) as u8
    }

    fn control_id(prefix: &str, filter: &Filter) -> String {
        escape_html(&format!("{}-{}", prefix, filter.id))
    }

    fn render_control(&self, prefix: &str, filter: &Filter) -> String {
        let id = Self::control_id(prefix, filter);
        let label = escape_html(&filter.label);
        let text = match &filter.value {
            FilterValue::Text(s) => escape_html(s),
            _ => String::new(),
        };
        let caption = format!(r#"<label class="form-label small mb-1" for="{}">{}</label>"#, id, label);
        match &filter.kind {
            FilterKind::Text { input_type, placeholder } => format!(
                r#"{}<input type="{}" class="form-control form-control-sm filter-input" id="{}" placeholder="{}" value="{}">"#,
                caption,
                escape_html(input_type),
                id,
                escape_html(placeholder),
                text
            ),
            FilterKind::Date | FilterKind::Datetime => format!(
                r#"{}<input type="{}" class="form-control form-control-sm filter-input" id="{}" value="{}">"#,
                caption,
                if filter.kind == FilterKind::Date { "date" } else { "datetime-local" },
                id,
                text
            ),
            FilterKind::Select { options, placeholder } => format!(
                r#"{}<select class="form-control form-control-sm filter-input" id="{}">{}</select>"#,
                caption,
                id,
                options_html(&options.iter().collect::<Vec<_>>(), placeholder, &value_text(&filter.value.to_json()))
            ),
            FilterKind::Dropdown { options, placeholder, searchable } => {
                let search = if *searchable {
                    r#"<input type="search" class="form-control form-control-sm mb-1 filter-search" placeholder="Ara...">"#
                } else {
                    ""
                };
                format!(
                    r#"{}<div class="filter-dropdown">{}<select class="form-select form-select-sm filter-input" id="{}">{}</select></div>"#,
                    caption,
                    search,
                    id,
                    options_html(&options.iter().collect::<Vec<_>>(), placeholder, &value_text(&filter.value.to_json()))
                )
            }
            FilterKind::Checkbox => format!(
                r#"<label class="form-label small mb-1">{label}</label><div class="checkbox-container"><input class="form-check-input filter-input" type="checkbox" id="{id}"{checked}><label class="checkbox-label" for="{id}">{label}</label></div>"#,
                label = label,
                id = id,
                checked = if filter.value == FilterValue::Checked(true) { " checked" } else { "" }
            ),
            FilterKind::DateRange => {
                let (start, end) = match &filter.value {
                    FilterValue::Range { start, end } => (escape_html(start), escape_html(end)),
                    _ => (String::new(), String::new()),
                };
                format!(
                    r#"<label class="form-label small mb-1" for="{id}-start">{label}</label><div class="row g-2"><div class="col-6"><input type="date" class="form-control form-control-sm filter-start" id="{id}-start" placeholder="Başlangıç" value="{start}"></div><div class="col-6"><input type="date" class="form-control form-control-sm filter-end" id="{id}-end" placeholder="Bitiş" value="{end}"></div></div>"#,
                    id = id,
                    label = label,
                    start = start,
                    end = end
                )
            }
        }
    }

    fn render_buttons(&self) -> String {
        let o = &self.options;
        if !o.show_apply_button && !o.show_clear_button {
            return String::new();
        }
        let mut buttons = String::new();
        if o.show_apply_button {
            buttons.push_str(&format!(
                r#"<button type="button" class="btn btn-sm btn-primary"{}><i class="fas fa-search me-1"></i>{}</button>"#,
                Action::ApplyFilters.attrs(),
                escape_html(&o.apply_button_text)
            ));
        }
        if o.show_clear_button {
            buttons.push_str(&format!(
                r#"<button type="button" class="btn btn-sm btn-outline-secondary"{}><i class="fas fa-times me-1"></i>{}</button>"#,
                Action::ClearFilters.attrs(),
                escape_html(&o.clear_button_text)
            ));
        }
        format!(
            r#"<div class="col-md-2 ms-auto"><label class="form-label small mb-1">&nbsp;</label><div class="d-grid gap-1">{}</div></div>"#,
            buttons
        )
    }

    /// Field row only; `prefix` namespaces the control ids
    pub fn render_filters_html(&self, prefix: &str) -> String {
        let mut html = String::new();
        for filter in &self.filters {
            html.push_str(&format!(
                r#"<div class="col-md-{}" data-filter-id="{}">{}</div>"#,
                self.adjusted_col_size(filter),
                escape_html(&filter.id),
                self.render_control(prefix, filter)
            ));
        }
        html.push_str(&self.render_buttons());
        html
    }

    pub fn render_html(&self, prefix: &str) -> String {
        format!(
            r#"<div class="filters-component{}"><div class="row mb-3"><div class="col-12"><div class="dashboard-card compact"><div class="card-header"><h6 class="card-title mb-0"><i class="fas fa-filter me-2 text-primary"></i><span class="filters-title">{}</span></h6></div><div class="card-body py-3"><div class="row g-2 filters-container">{}</div></div></div></div></div></div>"#,
            if self.loading { " loading" } else { "" },
            escape_html(&self.options.title),
            self.render_filters_html(prefix)
        )
    }
}

// ============================================
// Browser binding
// ============================================

type ApplyFn = Rc<dyn Fn(Map<String, Value>)>;
type ChangeFn = Rc<dyn Fn(&str, Value)>;

#[derive(Clone, Default)]
struct Callbacks {
    on_apply: Option<ApplyFn>,
    on_clear: Option<Rc<dyn Fn()>>,
    on_filter_change: Option<ChangeFn>,
}

struct Inner {
    container: Element,
    prefix: String,
    state: RefCell<FiltersState>,
    callbacks: RefCell<Callbacks>,
    listeners: RefCell<Vec<EventListener>>,
}

#[derive(Clone)]
pub struct FiltersComponent {
    inner: Rc<Inner>,
}

impl FiltersComponent {
    pub fn new(container_id: &str, options: FiltersOptions) -> Result<Self> {
        let container = dom::container(container_id)?;
        let filters = FiltersComponent {
            inner: Rc::new(Inner {
                container,
                prefix: format!("{}-filter", container_id),
                state: RefCell::new(FiltersState::new(options)),
                callbacks: RefCell::new(Callbacks::default()),
                listeners: RefCell::new(Vec::new()),
            }),
        };
        filters.render();
        filters.bind();
        Ok(filters)
    }

    fn bind(&self) {
        let root = &self.inner.container;
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let actions = dom::listen_actions(root, LOG, move |action, _| {
            let Some(inner) = weak.upgrade() else { return };
            let filters = FiltersComponent { inner };
            match action {
                Action::ApplyFilters => filters.apply_filters(),
                Action::ClearFilters => filters.clear_filters(),
                _ => {}
            }
        });

        let weak = Rc::downgrade(&self.inner);
        let change = EventListener::new(root, "change", move |e| {
            let Some(inner) = weak.upgrade() else { return };
            if let Some(target) = e.target().and_then(|t| t.dyn_into::<Element>().ok()) {
                FiltersComponent { inner }.handle_change(&target);
            }
        });

        let weak = Rc::downgrade(&self.inner);
        let search = EventListener::new(root, "input", move |e| {
            let Some(inner) = weak.upgrade() else { return };
            let Some(input) = e.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) else {
                return;
            };
            if input.class_list().contains("filter-search") {
                FiltersComponent { inner }.handle_search(&input);
            }
        });

        let weak = Rc::downgrade(&self.inner);
        let enter = EventListener::new(root, "keydown", move |e| {
            let Some(inner) = weak.upgrade() else { return };
            let is_enter = e.dyn_ref::<KeyboardEvent>().map_or(false, |k| k.key() == "Enter");
            let target = e.target().and_then(|t| t.dyn_into::<Element>().ok());
            let on_text = target.as_ref().and_then(|t| filter_id_of(t)).map_or(false, |id| {
                matches!(inner.state.borrow().filter(&id).map(|f| &f.kind), Some(FilterKind::Text { .. }))
            });
            if is_enter && on_text {
                e.prevent_default();
                FiltersComponent { inner }.apply_filters();
            }
        });

        *self.inner.listeners.borrow_mut() = vec![actions, change, search, enter];
    }

    pub fn render(&self) {
        let html = self.inner.state.borrow().render_html(&self.inner.prefix);
        self.inner.container.set_inner_html(&html);
    }

    /// Re-renders the field row, keeping the card around it
    fn render_filters(&self) {
        let html = self.inner.state.borrow().render_filters_html(&self.inner.prefix);
        match dom::find(&self.inner.container, ".filters-container") {
            Some(row) => row.set_inner_html(&html),
            None => self.render(),
        }
    }

    fn wrapper(&self, id: &str) -> Option<Element> {
        dom::find_by_attr(&self.inner.container, "data-filter-id", id)
    }

    /// Current control value of one filter, or `None` when it is not mounted
    fn read_control(&self, filter: &Filter) -> Option<FilterValue> {
        let wrapper = self.wrapper(&filter.id)?;
        let input = |selector: &str| {
            dom::find(&wrapper, selector).and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        };
        match filter.value {
            FilterValue::Checked(_) => input(".filter-input").map(|i| FilterValue::Checked(i.checked())),
            FilterValue::Range { .. } => Some(FilterValue::Range {
                start: input(".filter-start").map(|i| i.value()).unwrap_or_default(),
                end: input(".filter-end").map(|i| i.value()).unwrap_or_default(),
            }),
            FilterValue::Text(_) => {
                let el = dom::find(&wrapper, ".filter-input")?;
                let text = el
                    .dyn_ref::<HtmlInputElement>()
                    .map(|i| i.value())
                    .or_else(|| el.dyn_ref::<HtmlSelectElement>().map(|s| s.value()))?;
                Some(FilterValue::Text(text))
            }
        }
    }

    /// Pulls typed-but-uncommitted input into the state
    fn sync_from_dom(&self) {
        let filters: Vec<Filter> = self.inner.state.borrow().filters().to_vec();
        let mut state = self.inner.state.borrow_mut();
        for filter in &filters {
            if let Some(value) = self.read_control(filter) {
                state.set_value(&filter.id, value);
            }
        }
    }

    fn handle_change(&self, target: &Element) {
        if target.class_list().contains("filter-search") {
            return;
        }
        let Some(id) = filter_id_of(target) else { return };
        let Some(filter) = self.inner.state.borrow().filter(&id).cloned() else {
            return;
        };
        let Some(value) = self.read_control(&filter) else { return };
        let json = value.to_json();
        self.inner.state.borrow_mut().set_value(&id, value);
        log_debug(LOG, &format!("{} changed", id));
        let cb = self.inner.callbacks.borrow().on_filter_change.clone();
        if let Some(cb) = cb {
            cb(&id, json);
        }
    }

    fn handle_search(&self, input: &HtmlInputElement) {
        let Some(id) = filter_id_of(input) else { return };
        self.sync_from_dom();
        let html = {
            let state = self.inner.state.borrow();
            let Some(filter) = state.filter(&id) else { return };
            let Some(options) = filter.options() else { return };
            let placeholder = match &filter.kind {
                FilterKind::Dropdown { placeholder, .. } => placeholder.as_str(),
                _ => "",
            };
            options_html(
                &matching_options(options, &input.value()),
                placeholder,
                &value_text(&filter.value.to_json()),
            )
        };
        if let Some(select) = self.wrapper(&id).and_then(|w| dom::find(&w, "select.filter-input")) {
            select.set_inner_html(&html);
        }
    }

    /// Builder entry for every filter kind, see the [`Filter`] constructors
    pub fn add_filter(&self, filter: Filter) -> &Self {
        self.sync_from_dom();
        self.inner.state.borrow_mut().add_filter(filter);
        self.render_filters();
        self
    }

    pub fn remove_filter(&self, id: &str) -> &Self {
        self.sync_from_dom();
        if self.inner.state.borrow_mut().remove_filter(id) {
            self.render_filters();
        } else {
            log_warn(LOG, &format!("Unknown filter \"{}\"", id));
        }
        self
    }

    pub fn remove_all_filters(&self) -> &Self {
        self.inner.state.borrow_mut().remove_all_filters();
        self.render_filters();
        self
    }

    pub fn update_filter_options(&self, id: &str, options: Vec<SelectOption>) -> &Self {
        self.sync_from_dom();
        if self.inner.state.borrow_mut().update_filter_options(id, options) {
            self.render_filters();
        }
        self
    }

    pub fn get_filter_values(&self) -> Map<String, Value> {
        self.sync_from_dom();
        self.inner.state.borrow().get_filter_values()
    }

    pub fn set_filter_values(&self, values: &Map<String, Value>) {
        self.sync_from_dom();
        self.inner.state.borrow_mut().set_filter_values(values);
        self.render_filters();
    }

    pub fn clear_filters(&self) {
        self.inner.state.borrow_mut().clear_filters();
        self.render_filters();
        log_info(LOG, "Filters cleared");
        let cb = self.inner.callbacks.borrow().on_clear.clone();
        if let Some(cb) = cb {
            cb();
        }
    }

    pub fn apply_filters(&self) {
        let values = self.get_filter_values();
        let cb = self.inner.callbacks.borrow().on_apply.clone();
        if let Some(cb) = cb {
            cb(values);
        }
    }

    pub fn on_apply(&self, f: impl Fn(Map<String, Value>) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_apply = Some(Rc::new(f));
        self
    }

    pub fn on_clear(&self, f: impl Fn() + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_clear = Some(Rc::new(f));
        self
    }

    /// `f(filter_id, value)` on every committed control change
    pub fn on_filter_change(&self, f: impl Fn(&str, Value) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_filter_change = Some(Rc::new(f));
        self
    }

    pub fn set_loading(&self, loading: bool) {
        self.inner.state.borrow_mut().loading = loading;
        if let Some(el) = dom::find(&self.inner.container, ".filters-component") {
            let classes = el.class_list();
            let _ = if loading { classes.add_1("loading") } else { classes.remove_1("loading") };
        }
    }

    pub fn set_title(&self, title: &str) {
        self.inner.state.borrow_mut().options.title = title.to_string();
        if let Some(el) = dom::find(&self.inner.container, ".filters-title") {
            el.set_text_content(Some(title));
        }
    }

    pub fn destroy(&self) {
        self.inner.listeners.borrow_mut().clear();
        self.inner.state.borrow_mut().remove_all_filters();
        self.inner.container.set_inner_html("");
    }
}

fn filter_id_of(el: &Element) -> Option<String> {
    el.closest("[data-filter-id]").ok()??.get_attribute("data-filter-id")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn birimler() -> Vec<SelectOption> {
        vec![
            SelectOption::new("adet", "Adet"),
            SelectOption::new("kg", "Kilogram"),
            SelectOption::new("ton", "Ton"),
        ]
    }

    fn state() -> FiltersState {
        let mut state = FiltersState::new(FiltersOptions::default());
        state
            .add_filter(Filter::text("arama", "Arama").with_placeholder("Talep no"))
            .add_filter(Filter::dropdown("birim", "Birim", birimler()).with_value("kg"))
            .add_filter(Filter::checkbox("acil", "Sadece acil"))
            .add_filter(Filter::date_range("tarih", "Tarih").with_range("2024-01-01", ""));
        state
    }

    #[test]
    fn test_filter_values_by_kind() {
        let values = state().get_filter_values();
        assert_eq!(values["arama"], json!(""));
        assert_eq!(values["birim"], json!("kg"));
        assert_eq!(values["acil"], json!(false));
        assert_eq!(values["tarih"], json!({ "start": "2024-01-01", "end": "" }));
    }

    #[test]
    fn test_set_values_keeps_missing_range_bound() {
        let mut state = state();
        let values = json!({ "acil": true, "tarih": { "end": "2024-02-01" }, "yok": "x", "arama": 42 });
        state.set_filter_values(values.as_object().unwrap());

        let values = state.get_filter_values();
        assert_eq!(values["acil"], json!(true));
        assert_eq!(values["tarih"], json!({ "start": "2024-01-01", "end": "2024-02-01" }));
        assert_eq!(values["arama"], json!("42"));
        assert!(!values.contains_key("yok"));
    }

    #[test]
    fn test_clear_filters() {
        let mut state = state();
        state.set_value("acil", FilterValue::Checked(true));
        state.clear_filters();
        let values = state.get_filter_values();
        assert_eq!(values["birim"], json!(""));
        assert_eq!(values["acil"], json!(false));
        assert_eq!(values["tarih"], json!({ "start": "", "end": "" }));
    }

    #[test]
    fn test_remove_and_replace() {
        let mut state = state();
        assert!(state.remove_filter("acil"));
        assert!(!state.remove_filter("acil"));
        state.add_filter(Filter::text("arama", "Yeni Arama"));
        assert_eq!(state.filters().len(), 3);
        assert_eq!(state.filters()[0].label, "Yeni Arama");
        state.remove_all_filters();
        assert!(state.get_filter_values().is_empty());
    }

    #[test]
    fn test_update_options_only_on_option_filters() {
        let mut state = state();
        assert!(state.update_filter_options("birim", vec![SelectOption::new("m", "Metre")]));
        assert!(!state.update_filter_options("arama", birimler()));
        let html = state.render_filters_html("f");
        assert!(html.contains(r#"<option value="m">Metre</option>"#));
        assert!(!html.contains("Kilogram"));
    }

    #[test]
    fn test_column_sizes_shrink_when_overflowing() {
        let state = state();
        // 2 + 2 + 2 + 3 fits in ten columns
        assert_eq!(state.adjusted_col_size(&state.filters()[3]), 3);

        let mut crowded = FiltersState::new(FiltersOptions::default());
        for i in 0..6 {
            crowded.add_filter(Filter::date(&format!("d{}", i), "Tarih").with_col_size(4));
        }
        // 4 * 10 / 24 rounds down to 1
        assert_eq!(crowded.adjusted_col_size(&crowded.filters()[0]), 1);
        assert!(crowded.render_filters_html("f").contains(r#"<div class="col-md-1" data-filter-id="d0">"#));
    }

    #[test]
    fn test_render_markup() {
        let html = state().render_html("demo-filter");
        assert!(html.contains("Filtreler"));
        assert!(html.contains(r#"id="demo-filter-arama" placeholder="Talep no""#));
        assert!(html.contains(r#"<option value="kg" selected>Kilogram</option>"#));
        assert!(html.contains("filter-search"));
        assert!(html.contains(r#"type="checkbox" id="demo-filter-acil">"#));
        assert!(html.contains(r#"id="demo-filter-tarih-start" placeholder="Başlangıç" value="2024-01-01""#));
        assert!(html.contains(r#"data-action="apply-filters""#));
        assert!(html.contains(r#"data-action="clear-filters""#));
    }

    #[test]
    fn test_hidden_buttons_and_loading() {
        let options =
            FiltersOptions::from_json(r#"{"showApplyButton":false,"showClearButton":false}"#).unwrap();
        let mut state = FiltersState::new(options);
        state.add_filter(Filter::select("durum", "Durum", birimler()).with_placeholder("Tümü"));
        state.loading = true;
        let html = state.render_html("f");
        assert!(!html.contains("data-action"));
        assert!(html.contains(r#"class="filters-component loading""#));
        assert!(html.contains(r#"<option value="">Tümü</option>"#));
    }

    #[test]
    fn test_matching_options_ignores_case() {
        let options = birimler();
        let labels = |query: &str| -> Vec<String> {
            matching_options(&options, query).iter().map(|o| o.label.clone()).collect()
        };
        assert_eq!(labels("KILO"), vec!["Kilogram"]);
        assert_eq!(labels(" to "), vec!["Ton"]);
        assert_eq!(labels("").len(), 3);
        assert!(labels("metre").is_empty());
    }
}
