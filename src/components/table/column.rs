//! Column and row-action definitions

use crate::models::SelectOption;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::rc::Rc;

pub type CellFormatFn = Rc<dyn Fn(&Value, &Value) -> String>;
pub type ValueGetterFn = Rc<dyn Fn(&Value) -> Value>;
pub type ValidateFn = Rc<dyn Fn(&str, &Value) -> Result<(), String>>;
pub type OptionsFn = Rc<dyn Fn(&Value) -> Vec<SelectOption>>;
pub type VisibleFn = Rc<dyn Fn(&Value, usize) -> bool>;
pub type RowFn = Rc<dyn Fn(&Value, usize)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Date,
    Boolean,
    Select,
}

#[derive(Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableColumn {
    pub field: String,
    pub label: String,
    pub sortable: bool,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub editable: bool,
    pub options: Vec<SelectOption>,
    /// Output is trusted markup
    #[serde(skip)]
    pub formatter: Option<CellFormatFn>,
    #[serde(skip)]
    pub value_getter: Option<ValueGetterFn>,
    #[serde(skip)]
    pub validator: Option<ValidateFn>,
    /// Per-row select options; wins over `options`
    #[serde(skip)]
    pub options_for_row: Option<OptionsFn>,
}

impl Default for TableColumn {
    fn default() -> Self {
        TableColumn {
            field: String::new(),
            label: String::new(),
            sortable: true,
            column_type: ColumnType::Text,
            editable: true,
            options: Vec::new(),
            formatter: None,
            value_getter: None,
            validator: None,
            options_for_row: None,
        }
    }
}

impl fmt::Debug for TableColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableColumn")
            .field("field", &self.field)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("column_type", &self.column_type)
            .field("editable", &self.editable)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

impl TableColumn {
    pub fn new(field: &str, label: &str) -> Self {
        TableColumn {
            field: field.to_string(),
            label: label.to_string(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.column_type = ColumnType::Select;
        self.options = options;
        self
    }

    pub fn with_options_for_row(mut self, f: impl Fn(&Value) -> Vec<SelectOption> + 'static) -> Self {
        self.column_type = ColumnType::Select;
        self.options_for_row = Some(Rc::new(f));
        self
    }

    /// `f(value, row)`
    pub fn with_formatter(mut self, f: impl Fn(&Value, &Value) -> String + 'static) -> Self {
        self.formatter = Some(Rc::new(f));
        self
    }

    pub fn with_value_getter(mut self, f: impl Fn(&Value) -> Value + 'static) -> Self {
        self.value_getter = Some(Rc::new(f));
        self
    }

    /// `f(new_text, row)`; an `Err` message rejects the edit
    pub fn with_validator(mut self, f: impl Fn(&str, &Value) -> Result<(), String> + 'static) -> Self {
        self.validator = Some(Rc::new(f));
        self
    }

    pub fn select_options(&self, row: &Value) -> Vec<SelectOption> {
        match &self.options_for_row {
            Some(f) => f(row),
            None => self.options.clone(),
        }
    }
}

/// Button rendered in the "İşlemler" column
#[derive(Clone)]
pub struct TableAction {
    pub key: String,
    pub label: String,
    pub title: Option<String>,
    pub icon: String,
    pub class: Option<String>,
    pub visible: Option<VisibleFn>,
    pub on_click: Option<RowFn>,
}

impl fmt::Debug for TableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableAction")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("icon", &self.icon)
            .finish()
    }
}

impl TableAction {
    pub fn new(key: &str, label: &str, icon: &str) -> Self {
        TableAction {
            key: key.to_string(),
            label: label.to_string(),
            title: None,
            icon: icon.to_string(),
            class: None,
            visible: None,
            on_click: None,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn visible_when(mut self, f: impl Fn(&Value, usize) -> bool + 'static) -> Self {
        self.visible = Some(Rc::new(f));
        self
    }

    pub fn on_click(mut self, f: impl Fn(&Value, usize) + 'static) -> Self {
        self.on_click = Some(Rc::new(f));
        self
    }

    pub fn is_visible(&self, row: &Value, index: usize) -> bool {
        self.visible.as_ref().map_or(true, |f| f(row, index))
    }
}

/// Looks up `a.b.c` in nested objects
pub fn get_path<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(row, |value, key| value.get(key))
}

/// Writes `a.b.c`, creating intermediate objects as needed
pub fn set_path(row: &mut Value, path: &str, new_value: Value) {
    let (parents, last) = match path.rsplit_once('.') {
        Some((parents, last)) => (Some(parents), last),
        None => (None, path),
    };
    let mut current = row;
    for key in parents.into_iter().flat_map(|p| p.split('.')) {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Some(map) = current.as_object_mut() else { return };
        current = map.entry(key.to_string()).or_insert(Value::Null);
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Some(map) = current.as_object_mut() {
        map.insert(last.to_string(), new_value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dotted_paths() {
        let mut row = json!({ "talep": { "no": "T-1" }, "adet": 3 });
        assert_eq!(get_path(&row, "talep.no"), Some(&json!("T-1")));
        assert_eq!(get_path(&row, "adet"), Some(&json!(3)));
        assert_eq!(get_path(&row, "talep.yok"), None);

        set_path(&mut row, "talep.no", json!("T-2"));
        set_path(&mut row, "tedarikci.ad", json!("Acme"));
        assert_eq!(row["talep"]["no"], json!("T-2"));
        assert_eq!(row["tedarikci"]["ad"], json!("Acme"));
    }

    #[test]
    fn test_column_from_json() {
        let column: TableColumn =
            serde_json::from_str(r#"{"field":"tarih","label":"Tarih","type":"date","sortable":false}"#).unwrap();
        assert_eq!(column.column_type, ColumnType::Date);
        assert!(!column.sortable);
        assert!(column.editable);
    }

    #[test]
    fn test_action_visibility() {
        let action = TableAction::new("sil", "Sil", "fas fa-trash").visible_when(|row, _| row["durum"] == "taslak");
        assert!(action.is_visible(&json!({ "durum": "taslak" }), 0));
        assert!(!action.is_visible(&json!({ "durum": "onaylı" }), 0));
        assert!(TableAction::new("gor", "Gör", "fas fa-eye").is_visible(&json!({}), 0));
    }
}
