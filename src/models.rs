//! Data structures shared by the components

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

/// Generates `prefix-N` ids for sections/fields configured without one
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Custom value formatter; takes precedence over type-based formatting
pub type FormatFn = Rc<dyn Fn(&Value) -> String>;

// ============================================
// Display modal
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalSize {
    Sm,
    #[default]
    Lg,
    Xl,
}

impl ModalSize {
    /// Bootstrap dialog class, `modal-fullscreen` wins when requested
    pub fn dialog_class(&self, fullscreen: bool) -> &'static str {
        if fullscreen {
            return "modal-fullscreen";
        }
        match self {
            ModalSize::Sm => "modal-sm",
            ModalSize::Lg => "modal-lg",
            ModalSize::Xl => "modal-xl",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Date,
    #[serde(alias = "datetime-local")]
    Datetime,
    Time,
    Number,
    Currency,
    Percentage,
    Json,
    Badge,
    Boolean,
    Url,
    Email,
    Image,
    List,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Time => "time",
            FieldType::Number => "number",
            FieldType::Currency => "currency",
            FieldType::Percentage => "percentage",
            FieldType::Json => "json",
            FieldType::Badge => "badge",
            FieldType::Boolean => "boolean",
            FieldType::Url => "url",
            FieldType::Email => "email",
            FieldType::Image => "image",
            FieldType::List => "list",
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub value: Value,
    pub icon: String,
    pub col_size: u8,
    pub copyable: bool,
    pub badge_class: Option<String>,
    #[serde(skip)]
    pub format: Option<FormatFn>,
}

impl Default for Field {
    fn default() -> Self {
        Field {
            id: String::new(),
            name: String::new(),
            label: "Alan".to_string(),
            field_type: FieldType::Text,
            value: Value::String(String::new()),
            icon: String::new(),
            col_size: 12,
            copyable: false,
            badge_class: None,
            format: None,
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("type", &self.field_type)
            .field("value", &self.value)
            .field("custom_format", &self.format.is_some())
            .finish()
    }
}

impl Field {
    pub fn new(id: &str, label: &str) -> Self {
        Field {
            id: id.to_string(),
            name: id.to_string(),
            label: label.to_string(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = icon.to_string();
        self
    }

    pub fn with_col_size(mut self, col_size: u8) -> Self {
        self.col_size = col_size.clamp(1, 12);
        self
    }

    pub fn copyable(mut self) -> Self {
        self.copyable = true;
        self
    }

    pub fn with_badge_class(mut self, class: &str) -> Self {
        self.badge_class = Some(class.to_string());
        self
    }

    pub fn with_format(mut self, format: impl Fn(&Value) -> String + 'static) -> Self {
        self.format = Some(Rc::new(format));
        self
    }

    /// Fills the defaults a config may leave blank (id, name)
    pub(crate) fn normalized(mut self) -> Self {
        if self.id.is_empty() {
            self.id = generate_id("field");
        }
        if self.name.is_empty() {
            self.name = self.id.clone();
        }
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub title: Option<String>,
    pub icon: String,
    pub icon_color: String,
    pub fields: Vec<Field>,
    pub custom_content: Option<String>,
}

impl Default for Section {
    fn default() -> Self {
        Section {
            id: String::new(),
            title: Some("Bölüm".to_string()),
            icon: "fas fa-info-circle".to_string(),
            icon_color: "text-primary".to_string(),
            fields: Vec::new(),
            custom_content: None,
        }
    }
}

impl Section {
    pub fn new(title: &str) -> Self {
        Section {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    /// Section holding only custom HTML; untitled unless `with_title` is used
    pub fn custom(content: &str) -> Self {
        Section {
            title: None,
            custom_content: Some(content.to_string()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_icon(mut self, icon: &str, color: &str) -> Self {
        self.icon = icon.to_string();
        self.icon_color = color.to_string();
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub(crate) fn normalized(mut self) -> Self {
        if self.id.is_empty() {
            self.id = generate_id("section");
        }
        self
    }
}

// ============================================
// Edit modal
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputType {
    #[default]
    Text,
    Email,
    Password,
    Number,
    Date,
    DatetimeLocal,
    Time,
    Textarea,
    #[serde(alias = "dropdown")]
    Select,
    Checkbox,
    Radio,
    File,
    Color,
    Range,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Email => "email",
            InputType::Password => "password",
            InputType::Number => "number",
            InputType::Date => "date",
            InputType::DatetimeLocal => "datetime-local",
            InputType::Time => "time",
            InputType::Textarea => "textarea",
            InputType::Select => "select",
            InputType::Checkbox => "checkbox",
            InputType::Radio => "radio",
            InputType::File => "file",
            InputType::Color => "color",
            InputType::Range => "range",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: Value,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<Value>, label: &str) -> Self {
        SelectOption {
            value: value.into(),
            label: label.to_string(),
            disabled: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputField {
    pub id: String,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub input_type: InputType,
    pub value: Value,
    pub default_value: Option<Value>,
    pub placeholder: String,
    pub help: String,
    pub required: bool,
    pub readonly: bool,
    pub icon: String,
    pub col_size: u8,
    pub options: Vec<SelectOption>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub rows: Option<u32>,
    pub accept: Option<String>,
    pub multiple: bool,
}

impl Default for InputField {
    fn default() -> Self {
        InputField {
            id: String::new(),
            name: String::new(),
            label: "Alan".to_string(),
            input_type: InputType::Text,
            value: Value::String(String::new()),
            default_value: None,
            placeholder: String::new(),
            help: String::new(),
            required: false,
            readonly: false,
            icon: String::new(),
            col_size: 12,
            options: Vec::new(),
            min: None,
            max: None,
            step: None,
            rows: None,
            accept: None,
            multiple: false,
        }
    }
}

impl InputField {
    pub fn new(id: &str, label: &str, input_type: InputType) -> Self {
        InputField {
            id: id.to_string(),
            name: id.to_string(),
            label: label.to_string(),
            input_type,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    pub fn with_col_size(mut self, col_size: u8) -> Self {
        self.col_size = col_size.clamp(1, 12);
        self
    }

    pub(crate) fn normalized(mut self) -> Self {
        if self.id.is_empty() {
            self.id = generate_id("field");
        }
        if self.name.is_empty() {
            self.name = self.id.clone();
        }
        self
    }
}

// ============================================
// Comparison table
// ============================================

/// Supplier identifier. Backend ids arrive as numbers, markup attributes as
/// strings; both normalise to the same string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SupplierId(pub String);

impl SupplierId {
    pub fn new(id: impl fmt::Display) -> Self {
        SupplierId(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SupplierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SupplierId {
    fn from(s: &str) -> Self {
        SupplierId(s.to_string())
    }
}

impl From<i64> for SupplierId {
    fn from(n: i64) -> Self {
        SupplierId(n.to_string())
    }
}

impl<'de> Deserialize<'de> for SupplierId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl<'de> Visitor<'de> for IdVisitor {
            type Value = SupplierId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a supplier id (string or integer)")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<SupplierId, E> {
                Ok(SupplierId(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<SupplierId, E> {
                Ok(SupplierId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<SupplierId, E> {
                Ok(SupplierId(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<SupplierId, E> {
                if v.fract() == 0.0 {
                    Ok(SupplierId(format!("{}", v as i64)))
                } else {
                    Ok(SupplierId(v.to_string()))
                }
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Accepts numbers, numeric strings and null (→ 0), like `parseFloat(x) || 0`
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    })
}

fn lenient_days<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let days = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(days.filter(|d| *d > 0.0).map(|d| d.round() as u32))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub job_no: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    #[serde(default)]
    pub default_currency: Option<String>,
}

impl Supplier {
    pub fn currency(&self) -> &str {
        self.default_currency
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or("TRY")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_price: f64,
    #[serde(default, deserialize_with = "lenient_days")]
    pub delivery_days: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Offer {
    /// Only offers with a positive total take part in rendering and totals
    pub fn is_active(&self) -> bool {
        self.total_price > 0.0
    }
}

pub type Recommendations = BTreeMap<usize, Option<SupplierId>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComparisonData {
    pub items: Vec<Item>,
    pub suppliers: Vec<Supplier>,
    pub offers: HashMap<SupplierId, BTreeMap<usize, Offer>>,
    pub item_recommendations: Recommendations,
}

impl ComparisonData {
    pub fn offer(&self, supplier_id: &SupplierId, item_index: usize) -> Option<&Offer> {
        self.offers.get(supplier_id).and_then(|m| m.get(&item_index))
    }

    pub fn active_offer(&self, supplier_id: &SupplierId, item_index: usize) -> Option<&Offer> {
        self.offer(supplier_id, item_index).filter(|o| o.is_active())
    }

    pub fn recommended_for(&self, item_index: usize) -> Option<&SupplierId> {
        self.item_recommendations
            .get(&item_index)
            .and_then(|r| r.as_ref())
    }

    pub fn supplier(&self, id: &SupplierId) -> Option<&Supplier> {
        self.suppliers.iter().find(|s| &s.id == id)
    }
}

/// Partial dataset for `update_data`; absent parts keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComparisonDataPatch {
    pub items: Option<Vec<Item>>,
    pub suppliers: Option<Vec<Supplier>>,
    pub offers: Option<HashMap<SupplierId, BTreeMap<usize, Offer>>>,
    pub item_recommendations: Option<Recommendations>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_supplier_id_number_and_string_match() {
        let a: SupplierId = serde_json::from_value(json!(7)).unwrap();
        let b: SupplierId = serde_json::from_value(json!("7")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_comparison_data_from_js_shape() {
        let data: ComparisonData = serde_json::from_value(json!({
            "items": [{ "name": "Bolt", "code": "B1", "quantity": "10", "unit": "pcs" }],
            "suppliers": [{ "id": 1, "name": "Acme", "default_currency": "USD" }],
            "offers": { "1": { "0": { "unitPrice": 2, "totalPrice": 20, "deliveryDays": 5 } } },
            "itemRecommendations": { "0": null }
        }))
        .unwrap();

        assert_eq!(data.items[0].quantity, 10.0);
        let offer = data.active_offer(&SupplierId::from(1), 0).unwrap();
        assert_eq!(offer.delivery_days, Some(5));
        assert_eq!(data.recommended_for(0), None);
        assert_eq!(data.suppliers[0].currency(), "USD");
    }

    #[test]
    fn test_offer_active_only_with_positive_total() {
        let offer = Offer { unit_price: 2.0, total_price: 0.0, ..Default::default() };
        assert!(!offer.is_active());
    }

    #[test]
    fn test_field_defaults_from_config() {
        let field: Field = serde_json::from_value(json!({ "id": "price", "type": "currency" })).unwrap();
        let field = field.normalized();
        assert_eq!(field.name, "price");
        assert_eq!(field.label, "Alan");
        assert_eq!(field.col_size, 12);
        assert_eq!(field.field_type, FieldType::Currency);
    }
}
