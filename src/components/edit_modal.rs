//! Sectioned form in a bootstrap modal with validation and async save

use crate::components::action::Action;
use crate::error::{Result, UiError};
use crate::models::{generate_id, InputField, InputType, ModalSize};
use crate::utils::dom;
use crate::utils::format::{escape_html, value_text};
use crate::utils::log_trace::{log_error, log_info, log_warn};
use gloo::events::EventListener;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::OnceLock;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

const LOG: &str = "edit-modal";
const DEFAULT_SECTION_TITLE: &str = "Genel Bilgiler";
const REQUIRED_MESSAGE: &str = "Bu alan gereklidir";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct EditModalOptions {
    pub title: String,
    pub icon: String,
    pub save_button_text: String,
    pub size: ModalSize,
}

impl Default for EditModalOptions {
    fn default() -> Self {
        EditModalOptions {
            title: "Düzenle".to_string(),
            icon: "fas fa-edit".to_string(),
            save_button_text: "Kaydet".to_string(),
            size: ModalSize::Lg,
        }
    }
}

impl EditModalOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormSection {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub icon_color: String,
    pub fields: Vec<InputField>,
}

impl Default for FormSection {
    fn default() -> Self {
        FormSection {
            id: String::new(),
            title: "Bölüm".to_string(),
            icon: "fas fa-info-circle".to_string(),
            icon_color: "text-primary".to_string(),
            fields: Vec::new(),
        }
    }
}

impl FormSection {
    pub fn new(title: &str) -> Self {
        FormSection {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_icon(mut self, icon: &str, color: &str) -> Self {
        self.icon = icon.to_string();
        self.icon_color = color.to_string();
        self
    }

    pub fn with_field(mut self, field: InputField) -> Self {
        self.fields.push(field);
        self
    }
}

// ============================================
// Validation
// ============================================

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Required fields must be non-empty; emails and numbers are only checked
/// when a value is present
pub fn is_field_valid(field: &InputField, value: &Value) -> bool {
    if field.required && is_blank(value) {
        return false;
    }
    if is_blank(value) {
        return true;
    }
    match field.input_type {
        InputType::Email => email_regex().map_or(false, |re| re.is_match(&value_text(value))),
        InputType::Number => {
            let Ok(num) = value_text(value).trim().parse::<f64>() else {
                return false;
            };
            field.min.map_or(true, |min| num >= min) && field.max.map_or(true, |max| num <= max)
        }
        _ => true,
    }
}

// ============================================
// Markup
// ============================================

fn attr_if(cond: bool, attr: &str) -> &str {
    if cond {
        attr
    } else {
        ""
    }
}

fn render_label(field: &InputField, class: &str, for_id: Option<&str>) -> String {
    let for_attr = for_id
        .map(|id| format!(r#" for="{}""#, escape_html(id)))
        .unwrap_or_default();
    let icon = if field.icon.is_empty() {
        String::new()
    } else {
        format!(r#"<i class="{} me-1"></i>"#, escape_html(&field.icon))
    };
    format!(
        r#"<label class="{}"{}>{}{}</label>"#,
        class,
        for_attr,
        icon,
        escape_html(&field.label)
    )
}

fn number_attr(name: &str, value: Option<f64>) -> String {
    value
        .map(|v| format!(r#" {}="{}""#, name, v))
        .unwrap_or_default()
}

fn render_input(field: &InputField) -> String {
    let id = escape_html(&field.id);
    let name = escape_html(&field.name);
    let value = escape_html(&value_text(&field.value));
    let placeholder = escape_html(&field.placeholder);
    let required = attr_if(field.required, " required");
    let readonly = attr_if(field.readonly, " readonly");
    let readonly_class = attr_if(field.readonly, " readonly-field");

    match field.input_type {
        InputType::Text | InputType::Email | InputType::Password => format!(
            r#"<input type="{}" class="form-control field-input{}" id="{}" name="{}" placeholder="{}" value="{}"{}{}>"#,
            field.input_type.as_str(), readonly_class, id, name, placeholder, value, required, readonly
        ),
        InputType::Number => format!(
            r#"<input type="number" class="form-control field-input number-field{}" id="{}" name="{}" placeholder="{}" value="{}"{}{}{}{}{}>"#,
            readonly_class,
            id,
            name,
            placeholder,
            value,
            number_attr("min", field.min),
            number_attr("max", field.max),
            number_attr("step", field.step),
            required,
            readonly
        ),
        InputType::Date | InputType::DatetimeLocal | InputType::Time => format!(
            r#"<input type="{}" class="form-control field-input date-field{}" id="{}" name="{}" value="{}"{}{}>"#,
            field.input_type.as_str(), readonly_class, id, name, value, required, readonly
        ),
        InputType::Textarea => format!(
            r#"<textarea class="form-control field-input textarea-field{}" id="{}" name="{}" placeholder="{}" rows="{}"{}{}>{}</textarea>"#,
            readonly_class,
            id,
            name,
            placeholder,
            field.rows.unwrap_or(3),
            required,
            readonly,
            value
        ),
        InputType::Select => {
            let current = value_text(&field.value);
            let prompt: &str = if field.placeholder.is_empty() { "Seçiniz..." } else { &field.placeholder };
            let mut html = format!(
                r#"<select class="form-select field-input select-field" id="{}" name="{}"{}{}><option value="">{}</option>"#,
                id,
                name,
                required,
                attr_if(field.multiple, " multiple"),
                escape_html(prompt)
            );
            for option in &field.options {
                let option_value = value_text(&option.value);
                html.push_str(&format!(
                    r#"<option value="{}"{}{}>{}</option>"#,
                    escape_html(&option_value),
                    attr_if(option_value == current, " selected"),
                    attr_if(option.disabled, " disabled"),
                    escape_html(&option.label)
                ));
            }
            html.push_str("</select>");
            html
        }
        InputType::Checkbox => {
            let checked = matches!(&field.value, Value::Bool(true))
                || matches!(&field.value, Value::String(s) if s == "true");
            format!(
                r#"<div class="checkbox-field custom-checkbox"><input type="checkbox" class="field-input" id="{}" name="{}"{}{}>{}</div>"#,
                id,
                name,
                attr_if(checked, " checked"),
                required,
                render_label(field, "field-label checkbox-label", Some(&field.id))
            )
        }
        InputType::Radio => {
            let current = value_text(&field.value);
            let mut html = r#"<div class="radio-group">"#.to_string();
            for (i, option) in field.options.iter().enumerate() {
                let option_value = value_text(&option.value);
                let option_id = escape_html(&format!("{}-{}", field.id, i));
                html.push_str(&format!(
                    r#"<div class="radio-field"><input type="radio" class="form-check-input field-input" id="{}" name="{}" value="{}"{}{}><label class="field-label" for="{}">{}</label></div>"#,
                    option_id,
                    name,
                    escape_html(&option_value),
                    attr_if(!current.is_empty() && option_value == current, " checked"),
                    required,
                    option_id,
                    escape_html(&option.label)
                ));
            }
            html.push_str("</div>");
            html
        }
        InputType::File => format!(
            r#"<input type="file" class="form-control field-input file-field" id="{}" name="{}" accept="{}"{}{}>"#,
            id,
            name,
            escape_html(field.accept.as_deref().unwrap_or("*/*")),
            required,
            attr_if(field.multiple, " multiple")
        ),
        InputType::Color => {
            let color = if value.is_empty() { "#000000".to_string() } else { value };
            format!(
                r#"<input type="color" class="form-control field-input color-field" id="{}" name="{}" value="{}">"#,
                id, name, color
            )
        }
        InputType::Range => {
            let min = field.min.unwrap_or(0.0);
            let shown = if value.is_empty() { min.to_string() } else { value };
            format!(
                r#"<div class="range-field"><input type="range" class="form-control field-input" id="{}" name="{}" min="{}" max="{}" step="{}" value="{}"{}><div class="range-value">{}</div></div>"#,
                id,
                name,
                min,
                field.max.unwrap_or(100.0),
                field.step.unwrap_or(1.0),
                shown,
                required,
                shown
            )
        }
    }
}

fn render_field(field: &InputField) -> String {
    let label = if field.input_type == InputType::Checkbox {
        String::new()
    } else {
        let class = if field.required { "field-label required" } else { "field-label" };
        render_label(field, class, None)
    };
    format!(
        r#"<div class="col-md-{}"><div class="field-group mb-2" data-field-id="{}">{}{}<div class="field-help">{}</div><div class="field-error">{}</div></div></div>"#,
        field.col_size,
        escape_html(&field.id),
        label,
        render_input(field),
        escape_html(&field.help),
        REQUIRED_MESSAGE
    )
}

fn render_section(section: &FormSection) -> String {
    let fields: String = section.fields.iter().map(render_field).collect();
    format!(
        r#"<div class="form-section compact mb-3" data-section-id="{}"><h6 class="section-subtitle compact {}"><i class="{} me-2"></i>{}</h6><div class="row g-2">{}</div></div>"#,
        escape_html(&section.id),
        escape_html(&section.icon_color),
        escape_html(&section.icon),
        escape_html(&section.title),
        fields
    )
}

// ============================================
// State
// ============================================

#[derive(Debug, Clone)]
pub struct EditModalState {
    pub options: EditModalOptions,
    sections: Vec<FormSection>,
    fields: HashMap<String, (usize, usize)>,
    pub loading: bool,
}

impl EditModalState {
    pub fn new(options: EditModalOptions) -> Self {
        EditModalState {
            options,
            sections: Vec::new(),
            fields: HashMap::new(),
            loading: false,
        }
    }

    pub fn sections(&self) -> &[FormSection] {
        &self.sections
    }

    pub fn add_section(&mut self, mut section: FormSection) -> &mut Self {
        if section.id.is_empty() {
            section.id = generate_id("section");
        }
        let s_idx = self.sections.len();
        section.fields = section.fields.into_iter().map(InputField::normalized).collect();
        for (f_idx, field) in section.fields.iter().enumerate() {
            self.fields.insert(field.id.clone(), (s_idx, f_idx));
        }
        self.sections.push(section);
        self
    }

    pub fn add_field(&mut self, field: InputField) -> &mut Self {
        if self.sections.is_empty() {
            self.add_section(FormSection::new(DEFAULT_SECTION_TITLE));
        }
        let field = field.normalized();
        let s_idx = self.sections.len() - 1;
        let section = &mut self.sections[s_idx];
        self.fields.insert(field.id.clone(), (s_idx, section.fields.len()));
        section.fields.push(field);
        self
    }

    pub fn field(&self, id: &str) -> Option<&InputField> {
        let (s, f) = self.fields.get(id)?;
        self.sections.get(*s)?.fields.get(*f)
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// False for unknown ids
    pub fn set_field_value(&mut self, id: &str, value: Value) -> bool {
        let Some(&(s, f)) = self.fields.get(id) else {
            return false;
        };
        match self.sections.get_mut(s).and_then(|sec| sec.fields.get_mut(f)) {
            Some(field) => {
                field.value = value;
                true
            }
            None => false,
        }
    }

    pub fn get_field_value(&self, id: &str) -> Option<&Value> {
        self.field(id).map(|f| &f.value)
    }

    pub fn get_form_data(&self) -> Map<String, Value> {
        self.fields
            .keys()
            .filter_map(|id| Some((id.clone(), self.get_field_value(id)?.clone())))
            .collect()
    }

    /// Ids of fields whose current value fails validation
    pub fn invalid_fields(&self) -> Vec<String> {
        let mut invalid: Vec<String> = self
            .fields
            .keys()
            .filter(|id| self.field(id).map_or(false, |f| !is_field_valid(f, &f.value)))
            .cloned()
            .collect();
        invalid.sort();
        invalid
    }

    pub fn clear_form(&mut self) {
        for section in &mut self.sections {
            for field in &mut section.fields {
                field.value = Value::String(String::new());
            }
        }
    }

    /// Each field back to its `default_value`, or empty
    pub fn reset_form(&mut self) {
        for section in &mut self.sections {
            for field in &mut section.fields {
                field.value = field
                    .default_value
                    .clone()
                    .unwrap_or_else(|| Value::String(String::new()));
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.sections.clear();
        self.fields.clear();
    }

    pub fn render_form_html(&self) -> String {
        self.sections.iter().map(render_section).collect()
    }

    pub fn save_button_html(&self) -> String {
        if self.loading {
            r#"<i class="fas fa-spinner fa-spin me-1"></i>Kaydediliyor..."#.to_string()
        } else {
            format!(
                r#"<i class="fas fa-save me-1"></i><span class="save-btn-text">{}</span>"#,
                escape_html(&self.options.save_button_text)
            )
        }
    }

    pub fn render_shell_html(&self, modal_id: &str) -> String {
        let o = &self.options;
        format!(
            r#"<div class="modal fade edit-modal-container" id="{id}" tabindex="-1" inert><div class="modal-dialog {size}"><div class="modal-content compact"><div class="modal-header compact"><h6 class="modal-title"><i class="modal-icon {icon} me-2"></i><span class="modal-title-text">{title}</span></h6><button type="button" class="btn-close" data-bs-dismiss="modal" aria-label="Close"></button></div><div class="modal-body compact"><form class="edit-modal-form" novalidate>{form}</form><div class="modal-loading" style="display: {loading};"><div class="spinner"></div></div></div><div class="modal-footer compact"><button type="button" class="btn btn-sm btn-outline-secondary" data-bs-dismiss="modal"><i class="fas fa-times me-1"></i>İptal</button><button type="button" class="btn btn-sm btn-primary save-edit-btn"{save_action}{disabled}>{save}</button></div></div></div></div>"#,
            id = escape_html(modal_id),
            size = o.size.dialog_class(false),
            icon = escape_html(&o.icon),
            title = escape_html(&o.title),
            form = self.render_form_html(),
            loading = if self.loading { "flex" } else { "none" },
            save_action = Action::Save.attrs(),
            disabled = attr_if(self.loading, " disabled"),
            save = self.save_button_html(),
        )
    }
}

// ============================================
// Browser binding
// ============================================

pub type SaveFuture = Pin<Box<dyn Future<Output = std::result::Result<(), String>>>>;
pub type SaveFn = Rc<dyn Fn(Map<String, Value>) -> SaveFuture>;

#[derive(Clone, Default)]
struct Callbacks {
    on_save: Option<SaveFn>,
    on_cancel: Option<Rc<dyn Fn()>>,
}

struct Inner {
    container: Element,
    modal_id: String,
    state: RefCell<EditModalState>,
    callbacks: RefCell<Callbacks>,
    listeners: RefCell<Vec<EventListener>>,
}

#[derive(Clone)]
pub struct EditModal {
    inner: Rc<Inner>,
}

impl EditModal {
    pub fn new(container_id: &str, options: EditModalOptions) -> Result<Self> {
        let container = dom::container(container_id)?;
        let modal_id = format!("{}-edit-modal", container_id);
        let state = EditModalState::new(options);
        container.set_inner_html(&state.render_shell_html(&modal_id));

        let modal = EditModal {
            inner: Rc::new(Inner {
                container,
                modal_id,
                state: RefCell::new(state),
                callbacks: RefCell::new(Callbacks::default()),
                listeners: RefCell::new(Vec::new()),
            }),
        };
        modal.bind();
        Ok(modal)
    }

    fn bind(&self) {
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let actions = dom::listen_actions(&self.inner.container, LOG, move |action, _| {
            if let (Action::Save, Some(inner)) = (action, weak.upgrade()) {
                EditModal { inner }.handle_save();
            }
        });
        let mut listeners = vec![actions];

        if let Some(form) = self.form() {
            for event in ["input", "change"] {
                let weak = Rc::downgrade(&self.inner);
                listeners.push(EventListener::new(&form, event, move |e| {
                    let Some(inner) = weak.upgrade() else { return };
                    let target = e.target().and_then(|t| t.dyn_into::<Element>().ok());
                    if let Some(target) = target {
                        EditModal { inner }.handle_input(&target);
                    }
                }));
            }
        }

        if let Some(modal_el) = self.modal_element() {
            let weak = Rc::downgrade(&self.inner);
            listeners.push(dom::on_modal_hidden(&modal_el, move |_| {
                let Some(inner) = weak.upgrade() else { return };
                if let Some(el) = (EditModal { inner: inner.clone() }).modal_element() {
                    let _ = el.set_attribute("inert", "");
                }
                let on_cancel = inner.callbacks.borrow().on_cancel.clone();
                if let Some(cb) = on_cancel {
                    cb();
                }
            }));
        }
        *self.inner.listeners.borrow_mut() = listeners;
    }

    fn modal_element(&self) -> Option<Element> {
        dom::find_by_attr(&self.inner.container, "id", &self.inner.modal_id)
    }

    fn form(&self) -> Option<Element> {
        dom::find(&self.inner.container, ".edit-modal-form")
    }

    fn field_group(&self, id: &str) -> Option<Element> {
        dom::find_by_attr(&self.inner.container, "data-field-id", id)
    }

    fn handle_input(&self, target: &Element) {
        let Ok(Some(group)) = target.closest(".field-group") else {
            return;
        };
        if let Some(range) = target.dyn_ref::<HtmlInputElement>().filter(|i| i.type_() == "range") {
            if let Some(display) = dom::find(&group, ".range-value") {
                display.set_text_content(Some(&range.value()));
            }
        }
        if let Some(id) = group.get_attribute("data-field-id") {
            self.validate_field(&id);
        }
    }

    pub fn add_section(&self, section: FormSection) -> &Self {
        self.inner.state.borrow_mut().add_section(section);
        self
    }

    pub fn add_field(&self, field: InputField) -> &Self {
        self.inner.state.borrow_mut().add_field(field);
        self
    }

    pub fn render(&self) -> &Self {
        let html = self.inner.state.borrow().render_form_html();
        match self.form() {
            Some(form) => form.set_inner_html(&html),
            None => log_warn(LOG, "Form element missing; modal not mounted"),
        }
        self
    }

    /// Current value as the user sees it: checkbox → bool, radio → checked
    /// option or null, anything else → the control's string value
    pub fn get_field_value(&self, id: &str) -> Option<Value> {
        let input_type = self.inner.state.borrow().field(id)?.input_type;
        let Some(group) = self.field_group(id) else {
            return self.inner.state.borrow().get_field_value(id).cloned();
        };
        let value = match input_type {
            InputType::Checkbox => dom::find(&group, "input.field-input")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| Value::Bool(input.checked())),
            InputType::Radio => Some(
                dom::find(&group, "input.field-input:checked")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    .map(|input| Value::String(input.value()))
                    .unwrap_or(Value::Null),
            ),
            _ => dom::find(&group, ".field-input").and_then(|el| control_value(&el)).map(Value::String),
        };
        if let Some(v) = &value {
            self.inner.state.borrow_mut().set_field_value(id, v.clone());
        }
        value
    }

    pub fn set_field_value(&self, id: &str, value: Value) {
        let input_type = {
            let mut state = self.inner.state.borrow_mut();
            if !state.set_field_value(id, value.clone()) {
                return;
            }
            state.field(id).map(|f| f.input_type)
        };
        let (Some(input_type), Some(group)) = (input_type, self.field_group(id)) else {
            return;
        };
        let text = value_text(&value);
        match input_type {
            InputType::Checkbox => {
                if let Some(input) = dom::find(&group, "input.field-input")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                {
                    input.set_checked(text == "true");
                }
            }
            InputType::Radio => {
                for el in dom::find_all(&group, "input.field-input") {
                    if let Ok(input) = el.dyn_into::<HtmlInputElement>() {
                        input.set_checked(!text.is_empty() && input.value() == text);
                    }
                }
            }
            // browsers refuse programmatic values on file inputs
            InputType::File => {}
            _ => {
                if let Some(el) = dom::find(&group, ".field-input") {
                    set_control_value(&el, &text);
                }
                if let Some(display) = dom::find(&group, ".range-value") {
                    display.set_text_content(Some(&text));
                }
            }
        }
    }

    pub fn get_form_data(&self) -> Map<String, Value> {
        let ids: Vec<String> = self.inner.state.borrow().field_ids().cloned().collect();
        ids.into_iter()
            .filter_map(|id| {
                let value = self.get_field_value(&id)?;
                Some((id, value))
            })
            .collect()
    }

    pub fn set_form_data(&self, data: Map<String, Value>) {
        for (id, value) in data {
            self.set_field_value(&id, value);
        }
    }

    /// Marks the group and returns whether the field passed
    fn validate_field(&self, id: &str) -> bool {
        let value = self.get_field_value(id).unwrap_or(Value::Null);
        let valid = match self.inner.state.borrow().field(id) {
            Some(field) => is_field_valid(field, &value),
            None => return true,
        };
        if let Some(group) = self.field_group(id) {
            let classes = group.class_list();
            let _ = classes.remove_2("has-error", "has-success");
            let _ = classes.add_1(if valid { "has-success" } else { "has-error" });
            if let Some(error) = dom::find(&group, ".field-error") {
                let _ = if valid {
                    error.class_list().remove_1("show")
                } else {
                    error.class_list().add_1("show")
                };
            }
        }
        valid
    }

    pub fn validate_form(&self) -> bool {
        let ids: Vec<String> = self.inner.state.borrow().field_ids().cloned().collect();
        // every field is marked, not just the first failure
        ids.iter().fold(true, |all, id| self.validate_field(id) && all)
    }

    fn handle_save(&self) {
        if self.inner.state.borrow().loading {
            return;
        }
        if !self.validate_form() {
            log_warn(LOG, "Form has invalid fields");
            return;
        }
        let data = self.get_form_data();
        let Some(on_save) = self.inner.callbacks.borrow().on_save.clone() else {
            return;
        };

        self.set_loading(true);
        let modal = self.clone();
        spawn_local(async move {
            match on_save(data).await {
                Ok(()) => log_info(LOG, "Saved"),
                Err(e) => log_error(LOG, &format!("Save error: {}", e)),
            }
            modal.set_loading(false);
        });
    }

    pub fn on_save<F, Fut>(&self, f: F) -> &Self
    where
        F: Fn(Map<String, Value>) -> Fut + 'static,
        Fut: Future<Output = std::result::Result<(), String>> + 'static,
    {
        let save: SaveFn = Rc::new(move |data| Box::pin(f(data)) as SaveFuture);
        self.inner.callbacks.borrow_mut().on_save = Some(save);
        self
    }

    pub fn on_cancel(&self, f: impl Fn() + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_cancel = Some(Rc::new(f));
        self
    }

    pub fn set_loading(&self, loading: bool) {
        let button_html = {
            let mut state = self.inner.state.borrow_mut();
            state.loading = loading;
            state.save_button_html()
        };
        if let Some(el) = dom::find(&self.inner.container, ".modal-loading") {
            dom::set_display(&el, if loading { "flex" } else { "none" });
        }
        if let Some(btn) = dom::find(&self.inner.container, ".save-edit-btn") {
            dom::set_disabled(&btn, loading);
            btn.set_inner_html(&button_html);
        }
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

    pub fn set_save_button_text(&self, text: &str) -> &Self {
        self.inner.state.borrow_mut().options.save_button_text = text.to_string();
        if let Some(el) = dom::find(&self.inner.container, ".save-btn-text") {
            el.set_text_content(Some(text));
        }
        self
    }

    pub fn clear_form(&self) -> &Self {
        let ids: Vec<String> = self.inner.state.borrow().field_ids().cloned().collect();
        for id in ids {
            self.set_field_value(&id, Value::String(String::new()));
        }
        self
    }

    pub fn reset_form(&self) -> &Self {
        let defaults: Vec<(String, Value)> = {
            let state = self.inner.state.borrow();
            state
                .field_ids()
                .filter_map(|id| {
                    let field = state.field(id)?;
                    let value = field.default_value.clone().unwrap_or_else(|| Value::String(String::new()));
                    Some((id.clone(), value))
                })
                .collect()
        };
        for (id, value) in defaults {
            self.set_field_value(&id, value);
        }
        self
    }

    /// Drops every section and field
    pub fn clear_all(&self) -> &Self {
        self.inner.state.borrow_mut().clear_all();
        if let Some(form) = self.form() {
            form.set_inner_html("");
        }
        self
    }

    pub fn show(&self) -> Result<()> {
        let modal = self.modal_element().ok_or_else(|| UiError::Dom("edit modal is not mounted".to_string()))?;
        let _ = modal.remove_attribute("inert");
        dom::show_modal(&modal)
    }

    pub fn hide(&self) -> Result<()> {
        let modal = self.modal_element().ok_or_else(|| UiError::Dom("edit modal is not mounted".to_string()))?;
        let _ = modal.set_attribute("inert", "");
        dom::hide_modal(&modal)
    }

    pub fn destroy(&self) {
        if let Some(modal) = self.modal_element() {
            let _ = dom::dispose_modal(&modal);
        }
        self.inner.listeners.borrow_mut().clear();
        self.inner.state.borrow_mut().clear_all();
        self.inner.container.set_inner_html("");
    }
}

fn control_value(el: &Element) -> Option<String> {
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
        return Some(area.value());
    }
    el.dyn_ref::<HtmlSelectElement>().map(|select| select.value())
}

fn set_control_value(el: &Element, value: &str) {
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        input.set_value(value);
    } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
        area.set_value(value);
    } else if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
        select.set_value(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SelectOption;
    use serde_json::json;

    fn input(input_type: InputType) -> InputField {
        InputField::new("f", "Alan", input_type)
    }

    #[test]
    fn test_required_validation() {
        let field = input(InputType::Text).required();
        assert!(!is_field_valid(&field, &json!("")));
        assert!(!is_field_valid(&field, &Value::Null));
        assert!(is_field_valid(&field, &json!("x")));

        let checkbox = input(InputType::Checkbox).required();
        assert!(!is_field_valid(&checkbox, &json!(false)));
        assert!(is_field_valid(&checkbox, &json!(true)));

        assert!(is_field_valid(&input(InputType::Text), &json!("")));
    }

    #[test]
    fn test_email_validation() {
        let field = input(InputType::Email);
        assert!(is_field_valid(&field, &json!("ali@firma.com.tr")));
        assert!(!is_field_valid(&field, &json!("ali@firma")));
        assert!(!is_field_valid(&field, &json!("ali veli@firma.com")));
        assert!(is_field_valid(&field, &json!("")));
    }

    #[test]
    fn test_number_validation() {
        let field = input(InputType::Number).with_range(Some(1.0), Some(10.0));
        assert!(is_field_valid(&field, &json!("5")));
        assert!(is_field_valid(&field, &json!(10)));
        assert!(!is_field_valid(&field, &json!("0")));
        assert!(!is_field_valid(&field, &json!("11")));
        assert!(!is_field_valid(&field, &json!("beş")));
    }

    #[test]
    fn test_add_field_creates_default_section() {
        let mut state = EditModalState::new(EditModalOptions::default());
        state.add_field(InputField::new("ad", "Ad", InputType::Text));
        assert_eq!(state.sections().len(), 1);
        assert_eq!(state.sections()[0].title, "Genel Bilgiler");
    }

    #[test]
    fn test_render_inputs() {
        let mut state = EditModalState::new(EditModalOptions::default());
        state
            .add_field(InputField::new("ad", "Ad", InputType::Text).required().with_value("Ali"))
            .add_field(
                InputField::new("birim", "Birim", InputType::Select)
                    .with_options(vec![SelectOption::new("kg", "Kilogram"), SelectOption::new("adet", "Adet")])
                    .with_value("adet"),
            )
            .add_field(InputField::new("aktif", "Aktif", InputType::Checkbox).with_value(true))
            .add_field(InputField::new("not", "Not", InputType::Textarea).with_value("<b>"));
        let html = state.render_form_html();
        assert!(html.contains(r#"class="field-label required""#));
        assert!(html.contains(r#"value="Ali" required"#));
        assert!(html.contains(r#"<option value="adet" selected>Adet</option>"#));
        assert!(html.contains(" checked"));
        assert!(html.contains(">&lt;b&gt;</textarea>"));
        assert_eq!(html.matches("Bu alan gereklidir").count(), 4);
    }

    #[test]
    fn test_radio_and_range_markup() {
        let radio = input(InputType::Radio)
            .with_options(vec![SelectOption::new(1, "Bir"), SelectOption::new(2, "İki")])
            .with_value(2);
        let html = render_input(&radio);
        assert!(html.contains(r#"id="f-1" name="f" value="2" checked"#));
        assert!(!html.contains(r#"value="1" checked"#));

        let range = input(InputType::Range).with_range(Some(5.0), None).with_value("");
        let html = render_input(&range);
        assert!(html.contains(r#"min="5" max="100""#));
        assert!(html.contains(r#"<div class="range-value">5</div>"#));
    }

    #[test]
    fn test_form_data_and_reset() {
        let mut state = EditModalState::new(EditModalOptions::default());
        let mut miktar = InputField::new("miktar", "Miktar", InputType::Number).with_value(3);
        miktar.default_value = Some(json!(1));
        state
            .add_field(miktar)
            .add_field(InputField::new("email", "E-posta", InputType::Email).with_value("x"));

        assert_eq!(state.invalid_fields(), vec!["email".to_string()]);
        assert!(state.set_field_value("email", json!("a@b.co")));
        assert!(!state.set_field_value("yok", json!(1)));
        assert!(state.invalid_fields().is_empty());

        state.reset_form();
        let data = state.get_form_data();
        assert_eq!(data["miktar"], json!(1));
        assert_eq!(data["email"], json!(""));

        state.clear_form();
        assert_eq!(state.get_field_value("miktar"), Some(&json!("")));

        state.clear_all();
        assert!(state.get_form_data().is_empty());
    }

    #[test]
    fn test_loading_button() {
        let mut state = EditModalState::new(EditModalOptions::default());
        assert!(state.save_button_html().contains("Kaydet"));
        state.loading = true;
        assert!(state.save_button_html().contains("Kaydediliyor..."));
        assert!(state.render_shell_html("m").contains(r#"data-action="save""#));
    }

    #[test]
    fn test_options_from_json() {
        let options = EditModalOptions::from_json(r#"{"title":"Talep Düzenle","size":"xl"}"#).unwrap();
        assert_eq!(options.size, ModalSize::Xl);
        assert_eq!(options.save_button_text, "Kaydet");
    }
}
