use super::column::{get_path, set_path, ColumnType, TableAction, TableColumn};
use crate::components::action::Action;
use crate::error::Result;
use crate::utils::format::{escape_html, format_date_tr, format_number, is_truthy, value_text};
use serde::Deserialize;
use serde_json::Value;
use std::ops::RangeInclusive;

#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct TableOptions {
    pub columns: Vec<TableColumn>,
    pub data: Vec<Value>,
    pub sortable: bool,
    pub pagination: bool,
    pub items_per_page: usize,
    pub current_page: usize,
    pub total_items: usize,
    pub editable: bool,
    pub editable_columns: Vec<String>,
    #[serde(skip)]
    pub actions: Vec<TableAction>,
    pub action_column_width: String,
    pub table_class: String,
    pub responsive: bool,
    pub striped: bool,
    pub bordered: bool,
    pub small: bool,
    pub title: Option<String>,
    pub empty_message: String,
    pub empty_icon: String,
    pub loading: bool,
    pub exportable: bool,
    pub refreshable: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            columns: Vec::new(),
            data: Vec::new(),
            sortable: true,
            pagination: false,
            items_per_page: 20,
            current_page: 1,
            total_items: 0,
            editable: false,
            editable_columns: Vec::new(),
            actions: Vec::new(),
            action_column_width: "auto".to_string(),
            table_class: "table table-hover".to_string(),
            responsive: true,
            striped: false,
            bordered: false,
            small: false,
            title: None,
            empty_message: "Veri bulunamadı".to_string(),
            empty_icon: "fas fa-inbox".to_string(),
            loading: false,
            exportable: false,
            refreshable: false,
        }
    }
}

impl TableOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn yes_no(value: &Value) -> &'static str {
    if is_truthy(value) {
        "Evet"
    } else {
        "Hayır"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Result of committing an inline edit to the row data
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Unchanged,
    Rejected(String),
    Changed { old_value: Value, new_value: Value },
}

pub struct TableState {
    pub options: TableOptions,
    sort: Option<(String, SortDirection)>,
}

impl TableState {
    pub fn new(options: TableOptions) -> Self {
        TableState { options, sort: None }
    }

    pub fn sort_state(&self) -> Option<(&str, SortDirection)> {
        self.sort.as_ref().map(|(field, dir)| (field.as_str(), *dir))
    }

    pub fn get_column(&self, field: &str) -> Option<&TableColumn> {
        self.options.columns.iter().find(|c| c.field == field)
    }

    /// Same field flips the direction, a new field starts ascending
    pub fn handle_sort(&mut self, field: &str) -> SortDirection {
        let direction = match &self.sort {
            Some((current, dir)) if current == field => dir.flipped(),
            _ => SortDirection::Asc,
        };
        self.sort = Some((field.to_string(), direction));
        direction
    }

    pub fn set_sort_state(&mut self, field: &str, direction: SortDirection) {
        self.sort = Some((field.to_string(), direction));
    }

    /// Server-side totals win; client-side data falls back to its length
    fn total_items(&self) -> usize {
        if self.options.total_items > 0 {
            self.options.total_items
        } else {
            self.options.data.len()
        }
    }

    pub fn total_pages(&self) -> usize {
        let per_page = self.options.items_per_page.max(1);
        self.total_items().div_ceil(per_page)
    }

    /// Current page ±2, clamped to the valid range
    pub fn page_window(&self) -> RangeInclusive<usize> {
        let current = self.options.current_page;
        let start = current.saturating_sub(2).max(1);
        let end = (current + 2).min(self.total_pages());
        start..=end
    }

    /// False when `page` is out of range
    pub fn change_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.options.current_page = page;
        true
    }

    /// Data rows of the current page with their absolute indexes
    pub fn page_rows(&self) -> Vec<(usize, &Value)> {
        let rows = self.options.data.iter().enumerate();
        if !self.options.pagination {
            return rows.collect();
        }
        let per_page = self.options.items_per_page.max(1);
        let start = self.options.current_page.saturating_sub(1) * per_page;
        rows.skip(start).take(per_page).collect()
    }

    pub fn update_data(&mut self, data: Vec<Value>, total_items: Option<usize>) {
        self.options.data = data;
        if let Some(total) = total_items {
            self.options.total_items = total;
        }
    }

    /// False when no column has that field
    pub fn update_column(&mut self, field: &str, update: impl FnOnce(&mut TableColumn)) -> bool {
        match self.options.columns.iter_mut().find(|c| c.field == field) {
            Some(column) => {
                update(column);
                true
            }
            None => false,
        }
    }

    pub fn add_action(&mut self, action: TableAction) {
        self.options.actions.push(action);
    }

    pub fn remove_action(&mut self, key: &str) {
        self.options.actions.retain(|a| a.key != key);
    }

    pub fn is_column_editable(&self, field: &str) -> bool {
        if !self.options.editable {
            return false;
        }
        if self.get_column(field).map_or(false, |c| !c.editable) {
            return false;
        }
        self.options.editable_columns.is_empty() || self.options.editable_columns.iter().any(|f| f == field)
    }

    pub fn cell_value(&self, row: &Value, column: &TableColumn) -> Value {
        match &column.value_getter {
            Some(getter) => getter(row),
            None => get_path(row, &column.field).cloned().unwrap_or(Value::Null),
        }
    }

    /// Cell markup; built-in formats are escaped, custom formatters are not
    pub fn format_cell(&self, value: &Value, column: &TableColumn, row: &Value) -> String {
        if let Some(formatter) = &column.formatter {
            return formatter(value, row);
        }
        let text = match (column.column_type, value) {
            (_, Value::Null) => "N/A".to_string(),
            (ColumnType::Date, Value::String(s)) => format_date_tr(s).unwrap_or_else(|| s.clone()),
            (ColumnType::Number, Value::Number(n)) => n.as_f64().map(format_number).unwrap_or_default(),
            (ColumnType::Boolean, v) => yes_no(v).to_string(),
            (_, v) => value_text(v),
        };
        escape_html(&text)
    }

    /// Applies an edited text to the row. Number columns store parsed numbers
    /// when the text parses.
    pub fn commit_edit(&mut self, row_index: usize, field: &str, text: &str) -> EditOutcome {
        let Some(row) = self.options.data.get(row_index) else {
            return EditOutcome::Rejected(format!("Satır bulunamadı: {}", row_index));
        };
        let old_value = get_path(row, field).cloned().unwrap_or(Value::Null);
        if value_text(&old_value) == text {
            return EditOutcome::Unchanged;
        }

        let column = self.get_column(field);
        if let Some(validator) = column.and_then(|c| c.validator.as_ref()) {
            if let Err(message) = validator(text, row) {
                return EditOutcome::Rejected(message);
            }
        }

        let new_value = match column.map(|c| c.column_type) {
            Some(ColumnType::Number) => text
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(text.to_string())),
            _ => Value::String(text.to_string()),
        };

        if let Some(row) = self.options.data.get_mut(row_index) {
            set_path(row, field, new_value.clone());
        }
        EditOutcome::Changed { old_value, new_value }
    }

    pub fn revert_edit(&mut self, row_index: usize, field: &str, old_value: Value) {
        if let Some(row) = self.options.data.get_mut(row_index) {
            set_path(row, field, old_value);
        }
    }

    /// Merges a server response object into the row
    pub fn merge_row(&mut self, row_index: usize, update: Value) {
        let (Some(Value::Object(row)), Value::Object(update)) = (self.options.data.get_mut(row_index), update) else {
            return;
        };
        for (key, value) in update {
            row.insert(key, value);
        }
    }

    pub fn row(&self, index: usize) -> Option<&Value> {
        self.options.data.get(index)
    }

    pub fn cell_html(&self, row_index: usize, field: &str) -> Option<String> {
        let row = self.options.data.get(row_index)?;
        let column = self.get_column(field)?;
        Some(self.format_cell(&self.cell_value(row, column), column, row))
    }

    // ============================================
    // Markup
    // ============================================

    fn colspan(&self) -> usize {
        self.options.columns.len() + usize::from(!self.options.actions.is_empty())
    }

    fn table_class(&self) -> String {
        let mut classes = vec![self.options.table_class.as_str()];
        if self.options.striped {
            classes.push("table-striped");
        }
        if self.options.bordered {
            classes.push("table-bordered");
        }
        if self.options.small {
            classes.push("table-sm");
        }
        classes.join(" ")
    }

    fn render_header(&self) -> String {
        let mut html = String::from("<tr>");
        for column in &self.options.columns {
            let field = escape_html(&column.field);
            let label = escape_html(&column.label);
            if self.options.sortable && column.sortable {
                let icon = match self.sort_state() {
                    Some((f, SortDirection::Asc)) if f == column.field => "fa-sort-up",
                    Some((f, SortDirection::Desc)) if f == column.field => "fa-sort-down",
                    _ => "fa-sort",
                };
                html.push_str(&format!(
                    r#"<th class="sortable" data-field="{}"{}>{} <i class="fas {} sort-icon"></i></th>"#,
                    field,
                    Action::Sort(column.field.clone()).attrs(),
                    label,
                    icon
                ));
            } else {
                html.push_str(&format!(r#"<th data-field="{}">{}</th>"#, field, label));
            }
        }
        if !self.options.actions.is_empty() {
            html.push_str(&format!(
                r#"<th style="width: {}">İşlemler</th>"#,
                escape_html(&self.options.action_column_width)
            ));
        }
        html.push_str("</tr>");
        html
    }

    fn render_actions(&self, row: &Value, index: usize) -> String {
        self.options
            .actions
            .iter()
            .filter(|a| a.is_visible(row, index))
            .map(|a| {
                format!(
                    r#"<button type="button" class="btn btn-sm {} action-btn" title="{}"{}><i class="{}"></i></button>"#,
                    escape_html(a.class.as_deref().unwrap_or("btn-outline-secondary")),
                    escape_html(a.title.as_deref().unwrap_or(&a.label)),
                    Action::RowAction { action: a.key.clone(), row: index }.attrs(),
                    escape_html(&a.icon)
                )
            })
            .collect()
    }

    fn render_row(&self, index: usize, row: &Value) -> String {
        let mut html = format!(r#"<tr class="table-row"{}>"#, Action::RowClick(index).attrs());
        for column in &self.options.columns {
            let content = self.format_cell(&self.cell_value(row, column), column, row);
            if self.is_column_editable(&column.field) {
                html.push_str(&format!(
                    r#"<td class="editable-cell" data-field="{}"{}>{}</td>"#,
                    escape_html(&column.field),
                    Action::EditCell { row: index, field: column.field.clone() }.attrs(),
                    content
                ));
            } else {
                html.push_str(&format!("<td>{}</td>", content));
            }
        }
        if !self.options.actions.is_empty() {
            html.push_str(&format!(
                r#"<td><div class="action-buttons">{}</div></td>"#,
                self.render_actions(row, index)
            ));
        }
        html.push_str("</tr>");
        html
    }

    fn render_body(&self) -> String {
        if self.options.loading {
            return format!(
                r#"<tr><td colspan="{}" class="text-center"><div class="loading-state"><i class="fas fa-spinner fa-spin"></i><p>Yükleniyor...</p></div></td></tr>"#,
                self.colspan()
            );
        }
        if self.options.data.is_empty() {
            return format!(
                r#"<tr><td colspan="{}" class="text-center"><div class="empty-state"><i class="{}"></i><h5>Veri Bulunamadı</h5><p>{}</p></div></td></tr>"#,
                self.colspan(),
                escape_html(&self.options.empty_icon),
                escape_html(&self.options.empty_message)
            );
        }
        self.page_rows()
            .into_iter()
            .map(|(index, row)| self.render_row(index, row))
            .collect()
    }

    fn render_pagination(&self) -> String {
        let total = self.total_pages();
        if total <= 1 {
            return String::new();
        }
        let current = self.options.current_page;
        let mut html = String::from(r#"<div class="card-footer"><nav><ul class="pagination justify-content-center">"#);
        html.push_str(&format!(
            r#"<li class="page-item{}"><button type="button" class="page-link"{}><i class="fas fa-chevron-left"></i></button></li>"#,
            if current <= 1 { " disabled" } else { "" },
            Action::Page(current.saturating_sub(1)).attrs()
        ));
        for page in self.page_window() {
            html.push_str(&format!(
                r#"<li class="page-item{}"><button type="button" class="page-link"{}>{}</button></li>"#,
                if page == current { " active" } else { "" },
                Action::Page(page).attrs(),
                page
            ));
        }
        html.push_str(&format!(
            r#"<li class="page-item{}"><button type="button" class="page-link"{}><i class="fas fa-chevron-right"></i></button></li>"#,
            if current >= total { " disabled" } else { "" },
            Action::Page(current + 1).attrs()
        ));
        html.push_str("</ul></nav></div>");
        html
    }

    pub fn render_html(&self) -> String {
        let o = &self.options;
        let mut buttons = String::new();
        if o.refreshable {
            buttons.push_str(&format!(
                r#"<button type="button" class="btn btn-sm btn-outline-secondary"{}><i class="fas fa-sync-alt me-1"></i>Yenile</button>"#,
                Action::Refresh.attrs()
            ));
        }
        if o.exportable {
            buttons.push_str(&format!(
                r#"<button type="button" class="btn btn-sm btn-outline-secondary"{}><i class="fas fa-download me-1"></i>Dışa Aktar</button>"#,
                Action::Export.attrs()
            ));
        }
        let table = format!(
            r#"<table class="{}"><thead>{}</thead><tbody>{}</tbody></table>"#,
            escape_html(&self.table_class()),
            self.render_header(),
            self.render_body()
        );
        let table = if o.responsive {
            format!(r#"<div class="table-responsive">{}</div>"#, table)
        } else {
            table
        };
        format!(
            r#"<div class="dashboard-card"><div class="card-header"><h5 class="card-title"><i class="fas fa-table me-2 text-primary"></i>{}</h5><div class="card-actions">{}</div></div><div class="card-body">{}</div>{}</div>"#,
            escape_html(o.title.as_deref().unwrap_or("Tablo")),
            buttons,
            table,
            if o.pagination { self.render_pagination() } else { String::new() }
        )
    }

    /// Editor control for one cell, pre-filled with its current value
    pub fn editor_html(&self, row_index: usize, field: &str) -> Option<String> {
        let row = self.options.data.get(row_index)?;
        let current = value_text(get_path(row, field).unwrap_or(&Value::Null));
        let column = self.get_column(field);
        let html = match column.map(|c| c.column_type) {
            Some(ColumnType::Select) => {
                let options: String = column
                    .map(|c| c.select_options(row))
                    .unwrap_or_default()
                    .iter()
                    .map(|option| {
                        let value = value_text(&option.value);
                        format!(
                            r#"<option value="{}"{}>{}</option>"#,
                            escape_html(&value),
                            if value == current { " selected" } else { "" },
                            escape_html(&option.label)
                        )
                    })
                    .collect();
                format!(r#"<select class="form-control form-control-sm inline-editor">{}</select>"#, options)
            }
            Some(ColumnType::Date) => format!(
                r#"<input type="date" class="form-control form-control-sm inline-editor" value="{}">"#,
                escape_html(&current)
            ),
            _ => format!(
                r#"<input type="text" class="form-control form-control-sm inline-editor" value="{}">"#,
                escape_html(&current)
            ),
        };
        Some(html)
    }

    // ============================================
    // Export
    // ============================================

    /// All rows (not just the current page) as plain-text CSV with a BOM
    pub fn build_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
        writer.write_record(self.options.columns.iter().map(|c| c.label.as_str()))?;
        for row in &self.options.data {
            writer.write_record(self.options.columns.iter().map(|column| {
                let value = self.cell_value(row, column);
                match (column.column_type, &value) {
                    (_, Value::Null) => String::new(),
                    (ColumnType::Boolean, v) => yes_no(v).to_string(),
                    (ColumnType::Date, Value::String(s)) => format_date_tr(s).unwrap_or_else(|| s.clone()),
                    (_, v) => value_text(v),
                }
            }))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| crate::error::UiError::Export(e.to_string()))?;
        let body = String::from_utf8(bytes).map_err(|e| crate::error::UiError::Export(e.to_string()))?;
        Ok(format!("\u{feff}{}", body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SelectOption;
    use serde_json::json;

    fn rows(n: usize) -> Vec<Value> {
        (1..=n)
            .map(|i| json!({ "no": i, "ad": format!("Talep {}", i), "detay": { "birim": "adet" } }))
            .collect()
    }

    fn state() -> TableState {
        TableState::new(TableOptions {
            columns: vec![
                TableColumn::new("no", "No").with_type(ColumnType::Number),
                TableColumn::new("ad", "Ad"),
                TableColumn::new("detay.birim", "Birim").not_sortable(),
            ],
            data: rows(3),
            ..Default::default()
        })
    }

    #[test]
    fn test_sort_toggles_direction() {
        let mut state = state();
        assert_eq!(state.handle_sort("ad"), SortDirection::Asc);
        assert_eq!(state.handle_sort("ad"), SortDirection::Desc);
        assert_eq!(state.handle_sort("ad"), SortDirection::Asc);
        assert_eq!(state.handle_sort("no"), SortDirection::Asc);

        let html = state.render_html();
        assert!(html.contains("fa-sort-up"));
        assert_eq!(html.matches(r#"data-action="sort""#).count(), 2);
    }

    #[test]
    fn test_pagination_window_and_bounds() {
        let mut state = state();
        state.options.pagination = true;
        state.options.items_per_page = 10;
        state.update_data(rows(95), None);
        assert_eq!(state.total_pages(), 10);

        assert!(state.change_page(5));
        assert_eq!(state.page_window(), 3..=7);
        assert!(!state.change_page(0));
        assert!(!state.change_page(11));
        assert_eq!(state.options.current_page, 5);

        assert!(state.change_page(1));
        assert_eq!(state.page_window(), 1..=3);
        assert!(state.change_page(10));
        assert_eq!(state.page_window(), 8..=10);

        let page: Vec<usize> = state.page_rows().iter().map(|(i, _)| *i).collect();
        assert_eq!(page, (90..95).collect::<Vec<_>>());

        let html = state.render_html();
        assert!(html.contains(r#"<li class="page-item active"><button type="button" class="page-link" data-action="page" data-args="[10]">10</button>"#));
        assert!(html.contains(r#"<li class="page-item disabled"><button type="button" class="page-link" data-action="page" data-args="[11]">"#));
    }

    #[test]
    fn test_server_side_total() {
        let mut state = state();
        state.options.pagination = true;
        state.options.items_per_page = 20;
        state.update_data(rows(20), Some(45));
        assert_eq!(state.total_pages(), 3);
    }

    #[test]
    fn test_loading_and_empty_states() {
        let mut state = state();
        state.add_action(TableAction::new("sil", "Sil", "fas fa-trash"));
        state.options.loading = true;
        let html = state.render_html();
        assert!(html.contains(r#"colspan="4""#));
        assert!(html.contains("Yükleniyor..."));

        state.options.loading = false;
        state.update_data(Vec::new(), None);
        let html = state.render_html();
        assert!(html.contains("Veri bulunamadı"));
        assert!(html.contains("fas fa-inbox"));
    }

    #[test]
    fn test_cell_formatting() {
        let state = state();
        let row = json!({ "tarih": "2024-03-15", "tutar": 1234.5, "aktif": true });
        let date = TableColumn::new("tarih", "Tarih").with_type(ColumnType::Date);
        let number = TableColumn::new("tutar", "Tutar").with_type(ColumnType::Number);
        let flag = TableColumn::new("aktif", "Aktif").with_type(ColumnType::Boolean);
        let missing = TableColumn::new("yok", "Yok");
        let custom = TableColumn::new("tutar", "Tutar").with_formatter(|v, _| format!("<b>{}</b>", v));

        assert_eq!(state.format_cell(&state.cell_value(&row, &date), &date, &row), "15.03.2024");
        assert_eq!(state.format_cell(&state.cell_value(&row, &number), &number, &row), "1.234,5");
        assert_eq!(state.format_cell(&state.cell_value(&row, &flag), &flag, &row), "Evet");
        assert_eq!(state.format_cell(&state.cell_value(&row, &missing), &missing, &row), "N/A");
        assert_eq!(state.format_cell(&state.cell_value(&row, &custom), &custom, &row), "<b>1234.5</b>");
    }

    #[test]
    fn test_dotted_field_and_value_getter() {
        let state = state();
        let row = json!({ "detay": { "birim": "kg" }, "a": 2, "b": 3 });
        let nested = TableColumn::new("detay.birim", "Birim");
        let computed = TableColumn::new("toplam", "Toplam").with_value_getter(|r| {
            json!(r["a"].as_i64().unwrap_or(0) * r["b"].as_i64().unwrap_or(0))
        });
        assert_eq!(state.cell_value(&row, &nested), json!("kg"));
        assert_eq!(state.cell_value(&row, &computed), json!(6));
    }

    #[test]
    fn test_actions_respect_visibility() {
        let mut state = state();
        state.add_action(TableAction::new("duzenle", "Düzenle", "fas fa-edit"));
        state.add_action(
            TableAction::new("sil", "Sil", "fas fa-trash")
                .with_class("btn-outline-danger")
                .visible_when(|_, index| index == 0),
        );
        let html = state.render_html();
        assert!(html.contains("İşlemler"));
        assert_eq!(html.matches(r#"data-action="row-action""#).count(), 4);
        assert_eq!(html.matches("btn-outline-danger").count(), 1);

        state.remove_action("sil");
        assert_eq!(state.render_html().matches(r#"data-action="row-action""#).count(), 3);
    }

    #[test]
    fn test_editable_columns() {
        let mut state = state();
        assert!(!state.is_column_editable("ad"));
        state.options.editable = true;
        assert!(state.is_column_editable("ad"));
        state.update_column("no", |c| c.editable = false);
        assert!(!state.is_column_editable("no"));
        state.options.editable_columns = vec!["detay.birim".to_string()];
        assert!(!state.is_column_editable("ad"));
        assert!(state.is_column_editable("detay.birim"));
        assert!(!state.update_column("yok", |c| c.editable = false));

        let html = state.render_html();
        assert_eq!(html.matches(r#"data-action="edit-cell""#).count(), 3);
    }

    #[test]
    fn test_commit_edit() {
        let mut state = state();
        state.update_column("ad", |c| {
            c.validator = Some(std::rc::Rc::new(|text: &str, _: &Value| {
                if text.trim().is_empty() {
                    Err("Ad boş olamaz".to_string())
                } else {
                    Ok(())
                }
            }))
        });

        assert_eq!(state.commit_edit(0, "ad", "Talep 1"), EditOutcome::Unchanged);
        assert_eq!(state.commit_edit(0, "ad", " "), EditOutcome::Rejected("Ad boş olamaz".to_string()));
        assert_eq!(state.row(0).map(|r| r["ad"].clone()), Some(json!("Talep 1")));

        let outcome = state.commit_edit(0, "no", "42");
        assert_eq!(
            outcome,
            EditOutcome::Changed { old_value: json!(1), new_value: json!(42.0) }
        );
        assert_eq!(state.cell_html(0, "no").as_deref(), Some("42"));

        state.commit_edit(1, "detay.birim", "kg");
        assert_eq!(state.row(1).map(|r| r["detay"]["birim"].clone()), Some(json!("kg")));
        state.revert_edit(1, "detay.birim", json!("adet"));
        assert_eq!(state.row(1).map(|r| r["detay"]["birim"].clone()), Some(json!("adet")));

        assert!(matches!(state.commit_edit(9, "ad", "x"), EditOutcome::Rejected(_)));
    }

    #[test]
    fn test_merge_row() {
        let mut state = state();
        state.merge_row(0, json!({ "ad": "Sunucudan", "durum": "onaylı" }));
        let row = state.row(0).cloned().unwrap_or_default();
        assert_eq!(row["ad"], json!("Sunucudan"));
        assert_eq!(row["durum"], json!("onaylı"));
        assert_eq!(row["no"], json!(1));
    }

    #[test]
    fn test_editor_markup() {
        let mut state = state();
        state.update_column("ad", |c| {
            c.column_type = ColumnType::Select;
            c.options = vec![SelectOption::new("Talep 1", "Bir"), SelectOption::new("Talep 2", "İki")];
        });
        let html = state.editor_html(0, "ad").unwrap_or_default();
        assert!(html.contains(r#"<option value="Talep 1" selected>Bir</option>"#));
        assert!(state.editor_html(0, "no").unwrap_or_default().contains(r#"type="text""#));
        assert!(state.editor_html(7, "no").is_none());
    }

    #[test]
    fn test_build_csv() {
        let state = state();
        let text = state.build_csv().unwrap();
        assert!(text.starts_with('\u{feff}'));
        let mut reader = csv::Reader::from_reader(text.trim_start_matches('\u{feff}').as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["No", "Ad", "Birim"]);
        let records: Vec<csv::StringRecord> = reader.records().filter_map(|r| r.ok()).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(&records[2][1], "Talep 3");
        assert_eq!(&records[0][2], "adet");
    }

    #[test]
    fn test_options_from_json() {
        let options = TableOptions::from_json(
            r#"{"columns":[{"field":"ad","label":"Ad"}],"pagination":true,"itemsPerPage":5}"#,
        )
        .unwrap();
        assert_eq!(options.items_per_page, 5);
        assert_eq!(options.columns.len(), 1);
        assert_eq!(options.empty_message, "Veri bulunamadı");
        assert!(TableOptions::from_json(r#"{"rowsPerPage":5}"#).is_err());
    }
}
