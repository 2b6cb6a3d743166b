//! Delegated click actions
//!
//! Rendered markup tags clickable elements with `data-action` and a JSON array
//! in `data-args`; the container's single click listener parses them back
//! into an [`Action`] and hands it to the owning component.

use crate::components::comparison_table::ColumnKey;
use crate::models::SupplierId;
use crate::utils::format::escape_html;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // comparison table
    ToggleColumn(ColumnKey),
    ToggleRecommendation { item_index: usize, supplier_id: SupplierId },
    RecommendAll(SupplierId),
    // modals
    Copy,
    Edit,
    Confirm,
    Save,
    // data table
    Sort(String),
    Page(usize),
    Refresh,
    Export,
    RowClick(usize),
    RowAction { action: String, row: usize },
    EditCell { row: usize, field: String },
    // filters
    ApplyFilters,
    ClearFilters,
    // statistics cards
    CardClick(usize),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::ToggleColumn(_) => "toggle-column",
            Action::ToggleRecommendation { .. } => "toggle-recommendation",
            Action::RecommendAll(_) => "recommend-all",
            Action::Copy => "copy",
            Action::Edit => "edit",
            Action::Confirm => "confirm",
            Action::Save => "save",
            Action::Sort(_) => "sort",
            Action::Page(_) => "page",
            Action::Refresh => "refresh",
            Action::Export => "export",
            Action::RowClick(_) => "row-click",
            Action::RowAction { .. } => "row-action",
            Action::EditCell { .. } => "edit-cell",
            Action::ApplyFilters => "apply-filters",
            Action::ClearFilters => "clear-filters",
            Action::CardClick(_) => "card-click",
        }
    }

    fn args(&self) -> Vec<Value> {
        match self {
            Action::ToggleColumn(key) => vec![key.as_str().into()],
            Action::ToggleRecommendation { item_index, supplier_id } => {
                vec![(*item_index).into(), supplier_id.as_str().into()]
            }
            Action::RecommendAll(supplier_id) => vec![supplier_id.as_str().into()],
            Action::Sort(field) => vec![field.as_str().into()],
            Action::Page(page) => vec![(*page).into()],
            Action::RowClick(row) => vec![(*row).into()],
            Action::RowAction { action, row } => vec![action.as_str().into(), (*row).into()],
            Action::EditCell { row, field } => vec![(*row).into(), field.as_str().into()],
            Action::CardClick(index) => vec![(*index).into()],
            _ => Vec::new(),
        }
    }

    /// Markup attributes for this action, e.g. ` data-action="page" data-args="[3]"`
    pub fn attrs(&self) -> String {
        let args = self.args();
        if args.is_empty() {
            format!(r#" data-action="{}""#, self.name())
        } else {
            format!(
                r#" data-action="{}" data-args="{}""#,
                self.name(),
                escape_html(&Value::Array(args).to_string())
            )
        }
    }

    /// Parses attribute values (already entity-decoded by the browser)
    pub fn parse(name: &str, args: Option<&str>) -> Option<Action> {
        let args: Vec<Value> = match args.map(str::trim) {
            Some(raw) if !raw.is_empty() => serde_json::from_str(raw).ok()?,
            _ => Vec::new(),
        };

        let action = match name {
            "toggle-column" => Action::ToggleColumn(ColumnKey::parse(&arg_string(&args, 0)?)?),
            "toggle-recommendation" => Action::ToggleRecommendation {
                item_index: arg_usize(&args, 0)?,
                supplier_id: SupplierId(arg_string(&args, 1)?),
            },
            "recommend-all" => Action::RecommendAll(SupplierId(arg_string(&args, 0)?)),
            "copy" => Action::Copy,
            "edit" => Action::Edit,
            "confirm" => Action::Confirm,
            "save" => Action::Save,
            "sort" => Action::Sort(arg_string(&args, 0)?),
            "page" => Action::Page(arg_usize(&args, 0)?),
            "refresh" => Action::Refresh,
            "export" => Action::Export,
            "row-click" => Action::RowClick(arg_usize(&args, 0)?),
            "row-action" => Action::RowAction {
                action: arg_string(&args, 0)?,
                row: arg_usize(&args, 1)?,
            },
            "edit-cell" => Action::EditCell {
                row: arg_usize(&args, 0)?,
                field: arg_string(&args, 1)?,
            },
            "apply-filters" => Action::ApplyFilters,
            "clear-filters" => Action::ClearFilters,
            "card-click" => Action::CardClick(arg_usize(&args, 0)?),
            _ => return None,
        };
        Some(action)
    }
}

fn arg_string(args: &[Value], i: usize) -> Option<String> {
    match args.get(i)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn arg_usize(args: &[Value], i: usize) -> Option<usize> {
    match args.get(i)? {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reverses the entity escaping a browser undoes when reading attributes
    fn unescape(s: &str) -> String {
        s.replace("&quot;", "\"").replace("&#39;", "'").replace("&amp;", "&")
    }

    fn parse_attrs(attrs: &str) -> Option<Action> {
        let name = attrs.split("data-action=\"").nth(1)?.split('"').next()?;
        let args = attrs
            .split("data-args=\"")
            .nth(1)
            .and_then(|s| s.split('"').next())
            .map(unescape);
        Action::parse(name, args.as_deref())
    }

    #[test]
    fn test_recommendation_action_from_markup() {
        let action = Action::ToggleRecommendation {
            item_index: 3,
            supplier_id: SupplierId::from("42"),
        };
        assert_eq!(parse_attrs(&action.attrs()), Some(action));
    }

    #[test]
    fn test_numeric_supplier_id_arg() {
        let action = Action::parse("recommend-all", Some("[42]"));
        assert_eq!(action, Some(Action::RecommendAll(SupplierId::from("42"))));
    }

    #[test]
    fn test_unknown_or_malformed() {
        assert_eq!(Action::parse("explode", None), None);
        assert_eq!(Action::parse("page", Some("not json")), None);
        assert_eq!(Action::parse("toggle-column", Some("[\"nope\"]")), None);
        assert_eq!(Action::parse("refresh", None), Some(Action::Refresh));
    }

    #[test]
    fn test_filter_and_card_actions_from_markup() {
        for action in [Action::ApplyFilters, Action::ClearFilters, Action::CardClick(2)] {
            assert_eq!(parse_attrs(&action.attrs()), Some(action));
        }
        assert_eq!(Action::parse("card-click", None), None);
    }
}
