//! Read-only structured viewer in a bootstrap modal

use crate::components::action::Action;
use crate::error::Result;
use crate::models::{Field, FieldType, ModalSize, Section};
use crate::utils::dom;
use crate::utils::format::{
    escape_html, format_date_tr, format_datetime_tr, format_number, format_time_tr,
    format_try_currency, is_truthy, number_text, value_text,
};
use crate::utils::log_trace::{log_error, log_info, log_warn};
use gloo::events::EventListener;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

const LOG: &str = "display-modal";
const DEFAULT_SECTION_TITLE: &str = "Genel Bilgiler";
const IMAGE_SELECTOR: &str = "img.field-image";
const IMAGE_FALLBACK: &str = "Resim yüklenemedi";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DisplayModalOptions {
    pub title: String,
    pub icon: String,
    pub show_edit_button: bool,
    pub edit_button_text: String,
    pub size: ModalSize,
    pub fullscreen: bool,
}

impl Default for DisplayModalOptions {
    fn default() -> Self {
        DisplayModalOptions {
            title: "Görüntüle".to_string(),
            icon: "fas fa-eye".to_string(),
            show_edit_button: false,
            edit_button_text: "Düzenle".to_string(),
            size: ModalSize::Lg,
            fullscreen: false,
        }
    }
}

impl DisplayModalOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================
// Value formatting
// ============================================

/// Empty unless the value is present; 0 and false count as present
fn is_empty_value(value: &Value) -> bool {
    matches!(value, Value::Null) || matches!(value, Value::String(s) if s.is_empty())
}

/// Display string for a field. A custom formatter takes precedence over the
/// type; unparseable dates are shown as-is.
pub fn format_value(field: &Field) -> String {
    let value = &field.value;
    if value.is_null() {
        return String::new();
    }
    if let Some(format) = &field.format {
        return format(value);
    }

    match (field.field_type, value) {
        (FieldType::Date, Value::String(s)) => format_date_tr(s).unwrap_or_else(|| s.clone()),
        (FieldType::Datetime, Value::String(s)) => {
            format_datetime_tr(s).unwrap_or_else(|| s.clone())
        }
        (FieldType::Time, Value::String(s)) => format_time_tr(s).unwrap_or_else(|| s.clone()),
        (FieldType::Number, Value::Number(n)) => n.as_f64().map(format_number).unwrap_or_default(),
        (FieldType::Currency, Value::Number(n)) => {
            n.as_f64().map(format_try_currency).unwrap_or_default()
        }
        (FieldType::Percentage, Value::Number(n)) => format!("{}%", number_text(n)),
        (FieldType::Json, v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| value_text(v)),
        (_, v) => value_text(v),
    }
}

/// The `.field-value` element of one field
pub fn render_value_html(field: &Field) -> String {
    let value = &field.value;
    let mut classes = vec!["field-value".to_string(), field.field_type.as_str().to_string()];
    let mut attrs = String::new();
    if field.copyable {
        classes.push("copyable".to_string());
        attrs.push_str(r#" title="Kopyalamak için tıklayın""#);
        attrs.push_str(&Action::Copy.attrs());
    }

    let inner = match (field.field_type, value) {
        (FieldType::Image, v) if is_truthy(v) => format!(
            r#"<img class="field-image" src="{}" alt="{}">"#,
            escape_html(&value_text(v)),
            escape_html(&field.label)
        ),
        (FieldType::Badge, v) if is_truthy(v) => format!(
            r#"<span class="badge {}">{}</span>"#,
            escape_html(field.badge_class.as_deref().unwrap_or("bg-primary")),
            escape_html(&value_text(v))
        ),
        (FieldType::List, Value::Array(items)) => items
            .iter()
            .map(|item| {
                let text = match item {
                    Value::Object(_) | Value::Array(_) => item.to_string(),
                    other => value_text(other),
                };
                format!(r#"<div class="list-item">{}</div>"#, escape_html(&text))
            })
            .collect(),
        (FieldType::Boolean, v) => {
            let yes = is_truthy(v);
            classes.push(if yes { "true" } else { "false" }.to_string());
            let text = if yes { "Evet" } else { "Hayır" };
            text.to_string()
        }
        (FieldType::Url, v) if is_truthy(v) => {
            let url = escape_html(&value_text(v));
            format!(r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#, url, url)
        }
        (FieldType::Email, v) if is_truthy(v) => {
            let email = escape_html(&value_text(v));
            format!(r#"<a href="mailto:{}">{}</a>"#, email, email)
        }
        _ => escape_html(&format_value(field)),
    };

    if is_empty_value(value) {
        classes.push("empty".to_string());
    }
    format!(r#"<div class="{}"{}>{}</div>"#, classes.join(" "), attrs, inner)
}

fn render_field_html(field: &Field) -> String {
    let label = if field.icon.is_empty() {
        escape_html(&field.label)
    } else {
        format!(
            r#"<i class="{} me-1"></i>{}"#,
            escape_html(&field.icon),
            escape_html(&field.label)
        )
    };
    format!(
        r#"<div class="col-md-{}"><div class="field-display mb-2" data-field-id="{}"><label class="field-label">{}</label>{}</div></div>"#,
        field.col_size,
        escape_html(&field.id),
        label,
        render_value_html(field)
    )
}

fn render_section_html(section: &Section) -> String {
    let mut html = format!(
        r#"<div class="display-section compact mb-3" data-section-id="{}">"#,
        escape_html(&section.id)
    );
    if let Some(title) = &section.title {
        html.push_str(&format!(
            r#"<h6 class="section-subtitle compact {}"><i class="{} me-2"></i>{}</h6>"#,
            escape_html(&section.icon_color),
            escape_html(&section.icon),
            escape_html(title)
        ));
    }
    if let Some(custom) = section.custom_content.as_deref().filter(|c| !c.is_empty()) {
        // caller-supplied markup, inserted as-is
        html.push_str(&format!(r#"<div class="custom-content">{}</div>"#, custom));
    }
    if !section.fields.is_empty() {
        html.push_str(r#"<div class="row g-2">"#);
        for field in &section.fields {
            html.push_str(&render_field_html(field));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

// ============================================
// State
// ============================================

#[derive(Debug, Clone)]
pub struct DisplayModalState {
    pub options: DisplayModalOptions,
    initial_options: DisplayModalOptions,
    sections: Vec<Section>,
    /// field id → (section, field) position; later duplicates win
    fields: HashMap<String, (usize, usize)>,
    pub loading: bool,
}

impl DisplayModalState {
    pub fn new(options: DisplayModalOptions) -> Self {
        DisplayModalState {
            initial_options: options.clone(),
            options,
            sections: Vec::new(),
            fields: HashMap::new(),
            loading: false,
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn add_section(&mut self, section: Section) -> &mut Self {
        let section = section.normalized();
        let s_idx = self.sections.len();
        let fields: Vec<Field> = section.fields.into_iter().map(Field::normalized).collect();
        for (f_idx, field) in fields.iter().enumerate() {
            self.fields.insert(field.id.clone(), (s_idx, f_idx));
        }
        self.sections.push(Section { fields, ..section });
        self
    }

    /// Untitled unless the section sets a title itself
    pub fn add_custom_section(&mut self, section: Section) -> &mut Self {
        self.add_section(section)
    }

    fn last_section(&mut self) -> &mut Section {
        if self.sections.is_empty() {
            self.add_section(Section::new(DEFAULT_SECTION_TITLE));
        }
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    pub fn add_field(&mut self, field: Field) -> &mut Self {
        let field = field.normalized();
        let id = field.id.clone();
        let section = self.last_section();
        section.fields.push(field);
        let f_idx = section.fields.len() - 1;
        let s_idx = self.sections.len() - 1;
        self.fields.insert(id, (s_idx, f_idx));
        self
    }

    pub fn add_custom_content(&mut self, html: &str) -> &mut Self {
        let section = self.last_section();
        section
            .custom_content
            .get_or_insert_with(String::new)
            .push_str(html);
        self
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        let (s, f) = self.fields.get(id)?;
        self.sections.get(*s)?.fields.get(*f)
    }

    pub fn get_field_value(&self, id: &str) -> Option<&Value> {
        self.field(id).map(|f| &f.value)
    }

    /// Updates one field and returns its new `.field-value` markup;
    /// None for unknown ids
    pub fn set_field_value(&mut self, id: &str, value: Value) -> Option<String> {
        let (s, f) = *self.fields.get(id)?;
        let field = self.sections.get_mut(s)?.fields.get_mut(f)?;
        field.value = value;
        Some(render_value_html(field))
    }

    pub fn get_data(&self) -> Map<String, Value> {
        self.fields
            .keys()
            .filter_map(|id| Some((id.clone(), self.get_field_value(id)?.clone())))
            .collect()
    }

    /// Applies every known id; returns (id, markup) for the fields that changed
    pub fn set_data(&mut self, data: Map<String, Value>) -> Vec<(String, String)> {
        data.into_iter()
            .filter_map(|(id, value)| {
                let html = self.set_field_value(&id, value)?;
                Some((id, html))
            })
            .collect()
    }

    pub fn clear_data(&mut self) {
        self.sections.clear();
        self.fields.clear();
        self.loading = false;
    }

    /// Clears content and restores construction-time options
    pub fn reset(&mut self) {
        self.clear_data();
        self.options = self.initial_options.clone();
    }

    pub fn render_content_html(&self) -> String {
        self.sections.iter().map(render_section_html).collect()
    }

    /// Modal frame; sections are rendered into `.display-modal-content`
    pub fn render_shell_html(&self, modal_id: &str) -> String {
        let o = &self.options;
        format!(
            r#"<div class="modal fade display-modal-container" id="{id}" tabindex="-1" aria-hidden="true"><div class="modal-dialog {size}"><div class="modal-content compact"><div class="modal-header compact"><h6 class="modal-title"><i class="modal-icon {icon} me-2"></i><span class="modal-title-text">{title}</span></h6><button type="button" class="btn-close" data-bs-dismiss="modal" aria-label="Close"></button></div><div class="modal-body compact"><div class="display-modal-content">{content}</div><div class="modal-loading" style="display: {loading};"><div class="spinner"></div></div></div><div class="modal-footer compact"><button type="button" class="btn btn-sm btn-outline-secondary" data-bs-dismiss="modal"><i class="fas fa-times me-1"></i>Kapat</button><button type="button" class="btn btn-sm btn-primary edit-btn"{edit_action} style="display: {edit_display};"><i class="fas fa-edit me-1"></i><span class="edit-btn-text">{edit_text}</span></button></div></div></div></div>"#,
            id = escape_html(modal_id),
            size = o.size.dialog_class(o.fullscreen),
            icon = escape_html(&o.icon),
            title = escape_html(&o.title),
            content = self.render_content_html(),
            loading = if self.loading { "flex" } else { "none" },
            edit_action = Action::Edit.attrs(),
            edit_display = if o.show_edit_button { "inline-block" } else { "none" },
            edit_text = escape_html(&o.edit_button_text),
        )
    }
}

// ============================================
// Browser binding
// ============================================

type EditFn = Rc<dyn Fn(&Map<String, Value>)>;
type CloseFn = Rc<dyn Fn()>;

struct Inner {
    container: Element,
    modal_id: String,
    state: RefCell<DisplayModalState>,
    on_edit: RefCell<Option<EditFn>>,
    on_close: RefCell<Option<CloseFn>>,
    listeners: RefCell<Vec<EventListener>>,
}

#[derive(Clone)]
pub struct DisplayModal {
    inner: Rc<Inner>,
}

impl DisplayModal {
    pub fn new(container_id: &str, options: DisplayModalOptions) -> Result<Self> {
        let container = dom::container(container_id)?;
        let modal = DisplayModal {
            inner: Rc::new(Inner {
                container,
                modal_id: format!("{}-display-modal", container_id),
                state: RefCell::new(DisplayModalState::new(options)),
                on_edit: RefCell::new(None),
                on_close: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
            }),
        };
        modal.mount();
        Ok(modal)
    }

    /// Writes the frame and (re)binds the listeners
    fn mount(&self) {
        let html = self.inner.state.borrow().render_shell_html(&self.inner.modal_id);
        self.inner.container.set_inner_html(&html);

        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let actions = dom::listen_actions(&self.inner.container, LOG, move |action, el| {
            if let Some(inner) = weak.upgrade() {
                DisplayModal { inner }.dispatch(action, el);
            }
        });

        let mut listeners = vec![actions];
        if let Some(modal_el) = self.modal_element() {
            let weak = Rc::downgrade(&self.inner);
            listeners.push(dom::on_modal_hidden(&modal_el, move |_| {
                let Some(inner) = weak.upgrade() else { return };
                let on_close = inner.on_close.borrow().clone();
                if let Some(cb) = on_close {
                    cb();
                }
            }));
        }
        *self.inner.listeners.borrow_mut() = listeners;
        Self::bind_image_fallbacks(&self.inner.container);
    }

    fn dispatch(&self, action: Action, el: Element) {
        match action {
            Action::Edit => self.handle_edit(),
            Action::Copy => Self::copy_element_text(el),
            _ => {}
        }
    }

    fn modal_element(&self) -> Option<Element> {
        dom::find_by_attr(&self.inner.container, "id", &self.inner.modal_id)
    }

    fn content_element(&self) -> Option<Element> {
        dom::find(&self.inner.container, ".display-modal-content")
    }

    fn handle_edit(&self) {
        let data = self.get_data();
        let on_edit = self.inner.on_edit.borrow().clone();
        if let Some(cb) = on_edit {
            cb(&data);
        }
    }

    fn copy_element_text(el: Element) {
        let text = el.text_content().unwrap_or_default();
        spawn_local(async move {
            match dom::copy_to_clipboard(&text).await {
                Ok(()) => dom::flash_class(el, "copied", 2000),
                Err(e) => log_error("clipboard", &format!("Failed to copy text: {}", e)),
            }
        });
    }

    /// Swaps broken images for a text notice
    /// Swaps broken images under `root` for the fallback text
    fn bind_image_fallbacks(root: &Element) {
        for img in dom::find_all(root, IMAGE_SELECTOR) {
            let target = img.clone();
            EventListener::once(&img, "error", move |_| {
                if let Some(value) = target.parent_element() {
                    value.set_text_content(Some(IMAGE_FALLBACK));
                    let _ = value.class_list().add_1("empty");
                }
            })
            .forget();
        }
    }

    pub fn add_section(&self, section: Section) -> &Self {
        self.inner.state.borrow_mut().add_section(section);
        self
    }

    pub fn add_field(&self, field: Field) -> &Self {
        self.inner.state.borrow_mut().add_field(field);
        self
    }

    pub fn add_custom_content(&self, html: &str) -> &Self {
        self.inner.state.borrow_mut().add_custom_content(html);
        self
    }

    pub fn add_custom_section(&self, section: Section) -> &Self {
        self.inner.state.borrow_mut().add_custom_section(section);
        self
    }

    pub fn render(&self) -> &Self {
        let html = self.inner.state.borrow().render_content_html();
        match self.content_element() {
            Some(content) => content.set_inner_html(&html),
            None => log_warn(LOG, "Content element missing; modal not mounted"),
        }
        Self::bind_image_fallbacks(&self.inner.container);
        self
    }

    pub fn set_field_value(&self, id: &str, value: Value) {
        let html = self.inner.state.borrow_mut().set_field_value(id, value);
        if let Some(html) = html {
            self.replace_value_node(id, &html);
        }
    }

    fn replace_value_node(&self, id: &str, html: &str) {
        let Some(field) = dom::find_by_attr(&self.inner.container, "data-field-id", id) else {
            return;
        };
        if let Some(node) = dom::find(&field, ".field-value") {
            node.set_outer_html(html);
            Self::bind_image_fallbacks(&field);
        }
    }

    pub fn get_field_value(&self, id: &str) -> Option<Value> {
        self.inner.state.borrow().get_field_value(id).cloned()
    }

    pub fn get_data(&self) -> Map<String, Value> {
        self.inner.state.borrow().get_data()
    }

    pub fn set_data(&self, data: Map<String, Value>) {
        let changed = self.inner.state.borrow_mut().set_data(data);
        for (id, html) in changed {
            self.replace_value_node(&id, &html);
        }
    }

    pub fn show(&self) -> Result<()> {
        let modal = self
            .modal_element()
            .ok_or_else(|| crate::error::UiError::Dom("display modal is not mounted".to_string()))?;
        dom::show_modal(&modal)
    }

    pub fn hide(&self) -> Result<()> {
        let modal = self
            .modal_element()
            .ok_or_else(|| crate::error::UiError::Dom("display modal is not mounted".to_string()))?;
        dom::hide_modal(&modal)
    }

    pub fn set_loading(&self, loading: bool) {
        self.inner.state.borrow_mut().loading = loading;
        if let Some(el) = dom::find(&self.inner.container, ".modal-loading") {
            dom::set_display(&el, if loading { "flex" } else { "none" });
        }
        if let Some(btn) = dom::find(&self.inner.container, ".edit-btn") {
            dom::set_disabled(&btn, loading);
        }
    }

    pub fn on_edit(&self, f: impl Fn(&Map<String, Value>) + 'static) -> &Self {
        *self.inner.on_edit.borrow_mut() = Some(Rc::new(f));
        self
    }

    pub fn on_close(&self, f: impl Fn() + 'static) -> &Self {
        *self.inner.on_close.borrow_mut() = Some(Rc::new(f));
        self
    }

    pub fn set_title(&self, title: &str) -> &Self {
        self.inner.state.borrow_mut().options.title = title.to_string();
        if let Some(el) = dom::find(&self.inner.container, ".modal-title-text") {
            el.set_text_content(Some(title));
        }
        self
    }

    pub fn set_icon(&self, icon: &str) -> &Self {
        self.inner.state.borrow_mut().options.icon = icon.to_string();
        match dom::find(&self.inner.container, ".modal-icon") {
            Some(el) => el.set_class_name(&format!("modal-icon {} me-2", icon)),
            None => log_warn(LOG, "Modal icon element not found"),
        }
        self
    }

    pub fn set_show_edit_button(&self, show: bool) -> &Self {
        self.inner.state.borrow_mut().options.show_edit_button = show;
        if let Some(btn) = dom::find(&self.inner.container, ".edit-btn") {
            dom::set_display(&btn, if show { "inline-block" } else { "none" });
        }
        self
    }

    pub fn set_edit_button_text(&self, text: &str) -> &Self {
        self.inner.state.borrow_mut().options.edit_button_text = text.to_string();
        if let Some(el) = dom::find(&self.inner.container, ".edit-btn-text") {
            el.set_text_content(Some(text));
        }
        self
    }

    /// Drops sections, fields and callbacks
    pub fn clear_data(&self) {
        self.inner.state.borrow_mut().clear_data();
        *self.inner.on_edit.borrow_mut() = None;
        *self.inner.on_close.borrow_mut() = None;
        if let Some(content) = self.content_element() {
            content.set_inner_html("");
        }
    }

    pub fn reset(&self) {
        self.clear_data();
        self.inner.state.borrow_mut().reset();
        self.mount();
        log_info(LOG, "Reset");
    }

    pub fn destroy(&self) {
        if let Some(modal) = self.modal_element() {
            let _ = dom::dispose_modal(&modal);
        }
        self.inner.listeners.borrow_mut().clear();
        self.inner.state.borrow_mut().clear_data();
        self.inner.container.set_inner_html("");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(field_type: FieldType, value: Value) -> Field {
        Field::new("f", "Alan").with_type(field_type).with_value(value)
    }

    #[test]
    fn test_format_value_by_type() {
        assert_eq!(format_value(&field(FieldType::Date, json!("2024-03-15"))), "15.03.2024");
        assert_eq!(
            format_value(&field(FieldType::Datetime, json!("2024-03-15T14:30:00"))),
            "15.03.2024 14:30:00"
        );
        assert_eq!(format_value(&field(FieldType::Date, json!("yarın"))), "yarın");
        assert_eq!(format_value(&field(FieldType::Number, json!(1234567.891))), "1.234.567,891");
        assert_eq!(format_value(&field(FieldType::Currency, json!(1234.5))), "₺1.234,50");
        assert_eq!(format_value(&field(FieldType::Currency, json!("n/a"))), "n/a");
        assert_eq!(format_value(&field(FieldType::Percentage, json!(12.5))), "12.5%");
        assert_eq!(format_value(&field(FieldType::Percentage, json!(40))), "40%");
        assert_eq!(
            format_value(&field(FieldType::Json, json!({ "a": 1 }))),
            "{\n  \"a\": 1\n}"
        );
        assert_eq!(format_value(&field(FieldType::Text, Value::Null)), "");
    }

    #[test]
    fn test_custom_format_takes_precedence() {
        let f = field(FieldType::Currency, json!(10)).with_format(|v| format!("{} adet", v));
        assert_eq!(format_value(&f), "10 adet");
        // pure: same input, same output
        assert_eq!(format_value(&f), format_value(&f));
    }

    #[test]
    fn test_value_markup_variants() {
        let html = render_value_html(&field(FieldType::Boolean, json!(false)));
        assert!(html.contains("false") && html.contains("Hayır"));
        assert!(!html.contains("empty"));

        let html = render_value_html(&field(FieldType::Badge, json!("Onaylandı")).with_badge_class("bg-success"));
        assert!(html.contains(r#"<span class="badge bg-success">Onaylandı</span>"#));

        let html = render_value_html(&field(FieldType::List, json!(["a", { "b": 2 }])));
        assert_eq!(html.matches("list-item").count(), 2);
        assert!(html.contains("{&quot;b&quot;:2}"));

        let html = render_value_html(&field(FieldType::Email, json!("a@b.com")));
        assert!(html.contains(r#"href="mailto:a@b.com""#));

        let html = render_value_html(&field(FieldType::Url, json!("https://x.tr")));
        assert!(html.contains(r#"target="_blank""#));

        let html = render_value_html(&field(FieldType::Image, json!("/img/a.png")));
        assert!(html.contains(r#"<img class="field-image" src="/img/a.png""#));

        let html = render_value_html(&field(FieldType::Text, json!("")));
        assert!(html.contains("field-value text empty"));

        let html = render_value_html(&field(FieldType::Number, json!(0)));
        assert!(!html.contains("empty"));

        let html = render_value_html(&field(FieldType::Text, json!("<script>")));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_copyable_value() {
        let html = render_value_html(&field(FieldType::Text, json!("ABC")).copyable());
        assert!(html.contains("copyable"));
        assert!(html.contains(r#"title="Kopyalamak için tıklayın""#));
        assert!(html.contains(r#"data-action="copy""#));
    }

    #[test]
    fn test_add_field_creates_default_section() {
        let mut state = DisplayModalState::new(DisplayModalOptions::default());
        state.add_field(Field::new("a", "A")).add_custom_content("<hr>");
        assert_eq!(state.sections().len(), 1);
        assert_eq!(state.sections()[0].title.as_deref(), Some("Genel Bilgiler"));
        assert_eq!(state.sections()[0].custom_content.as_deref(), Some("<hr>"));
    }

    #[test]
    fn test_sections_render_in_order() {
        let mut state = DisplayModalState::new(DisplayModalOptions::default());
        state
            .add_section(Section::new("Birinci").with_field(Field::new("a", "A")))
            .add_custom_section(Section::custom("<p>özel</p>"))
            .add_section(Section::new("İkinci"));
        let html = state.render_content_html();
        let first = html.find("Birinci").unwrap();
        let custom = html.find("<p>özel</p>").unwrap();
        let second = html.find("İkinci").unwrap();
        assert!(first < custom && custom < second);
        // untitled custom section renders no heading
        assert_eq!(html.matches("section-subtitle").count(), 2);
    }

    #[test]
    fn test_set_field_value_only_touches_that_field() {
        let mut state = DisplayModalState::new(DisplayModalOptions::default());
        state
            .add_field(Field::new("name", "Ad").with_value("Vida"))
            .add_field(Field::new("price", "Fiyat").with_type(FieldType::Currency).with_value(0));
        let before: Vec<String> = state.sections()[0].fields.iter().map(render_field_html).collect();

        let html = state.set_field_value("price", json!(1234.5)).unwrap();
        assert!(html.contains("₺1.234,50"));

        let after: Vec<String> = state.sections()[0].fields.iter().map(render_field_html).collect();
        assert_eq!(before[0], after[0]);
        assert_ne!(before[1], after[1]);
        assert!(after[1].contains("₺1.234,50"));
    }

    #[test]
    fn test_replaced_image_matches_fallback_selector() {
        let mut state = DisplayModalState::new(DisplayModalOptions::default());
        state.add_field(Field::new("foto", "Fotoğraf").with_type(FieldType::Image));
        let html = state.set_field_value("foto", json!("/img/b.png")).unwrap();

        let (tag, class) = IMAGE_SELECTOR.split_once('.').unwrap();
        assert!(html.contains(&format!(r#"<{} class="{}" src="/img/b.png""#, tag, class)));
        assert!(html.contains("field-value"));
    }

    #[test]
    fn test_unknown_field_is_ignored() {
        let mut state = DisplayModalState::new(DisplayModalOptions::default());
        state.add_field(Field::new("a", "A"));
        assert!(state.set_field_value("missing", json!(1)).is_none());
        assert_eq!(state.get_field_value("missing"), None);
    }

    #[test]
    fn test_get_and_set_data() {
        let mut state = DisplayModalState::new(DisplayModalOptions::default());
        state
            .add_field(Field::new("a", "A").with_value(1))
            .add_field(Field::new("b", "B").with_value("x"));
        let mut data = state.get_data();
        assert_eq!(data["a"], json!(1));

        data.insert("b".to_string(), json!("y"));
        data.insert("zzz".to_string(), json!(0));
        let changed = state.set_data(data);
        assert_eq!(changed.len(), 2);
        assert_eq!(state.get_field_value("b"), Some(&json!("y")));
    }

    #[test]
    fn test_duplicate_ids_last_wins() {
        let mut state = DisplayModalState::new(DisplayModalOptions::default());
        state
            .add_field(Field::new("dup", "First").with_value(1))
            .add_field(Field::new("dup", "Second").with_value(2));
        assert_eq!(state.field("dup").map(|f| f.label.as_str()), Some("Second"));
    }

    #[test]
    fn test_shell_reflects_options() {
        let options = DisplayModalOptions {
            size: ModalSize::Xl,
            show_edit_button: true,
            ..Default::default()
        };
        let state = DisplayModalState::new(options);
        let html = state.render_shell_html("x-modal");
        assert!(html.contains("modal-dialog modal-xl"));
        assert!(html.contains(r#"style="display: inline-block;""#));
        assert!(html.contains("Görüntüle"));

        let full = DisplayModalState::new(DisplayModalOptions { fullscreen: true, ..Default::default() });
        assert!(full.render_shell_html("y").contains("modal-fullscreen"));
    }

    #[test]
    fn test_reset_restores_initial_options() {
        let mut state = DisplayModalState::new(DisplayModalOptions::default());
        state.options.title = "Sipariş".to_string();
        state.add_field(Field::new("a", "A"));
        state.reset();
        assert_eq!(state.options.title, "Görüntüle");
        assert!(state.sections().is_empty());
        assert!(state.get_data().is_empty());
    }

    #[test]
    fn test_options_from_json() {
        let options = DisplayModalOptions::from_json(r#"{"title":"Talep","size":"sm"}"#).unwrap();
        assert_eq!(options.size, ModalSize::Sm);
        assert_eq!(options.icon, "fas fa-eye");
        assert!(DisplayModalOptions::from_json(r#"{"colour":"red"}"#).is_err());
    }
}
