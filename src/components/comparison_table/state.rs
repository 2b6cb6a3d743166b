//! Comparison table state: options, dataset, column toggles and aggregation

use super::columns::{default_column_order, ColumnKey, GENERAL_COLUMNS, SUPPLIER_COLUMNS};
use crate::error::Result;
use crate::models::{ComparisonData, ComparisonDataPatch, Recommendations, SupplierId};
use crate::utils::format::format_number_tr;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ComparisonTableOptions {
    pub show_summary: bool,
    pub show_summary_row: bool,
    pub show_recommendations: bool,
    /// Shows the EUR estimate in the summary section
    pub show_currency_conversion: bool,
    pub show_delivery_days: bool,
    pub show_notes: bool,
    pub show_euro_total: bool,
    pub show_original_total: bool,
    pub show_unit_price: bool,
    pub column_order: Vec<ColumnKey>,
    /// Units of each currency per one TRY
    pub currency_rates: Option<BTreeMap<String, f64>>,
    pub currency_symbols: BTreeMap<String, String>,
}

impl Default for ComparisonTableOptions {
    fn default() -> Self {
        let currency_symbols = [("TRY", "₺"), ("USD", "$"), ("EUR", "€"), ("GBP", "£")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ComparisonTableOptions {
            show_summary: true,
            show_summary_row: true,
            show_recommendations: true,
            show_currency_conversion: true,
            show_delivery_days: true,
            show_notes: true,
            show_euro_total: true,
            show_original_total: true,
            show_unit_price: true,
            column_order: default_column_order(),
            currency_rates: None,
            currency_symbols,
        }
    }
}

impl ComparisonTableOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let mut options: ComparisonTableOptions = serde_json::from_str(json)?;
        options.column_order = sanitize_order(options.column_order);
        Ok(options)
    }

    fn flag_mut(&mut self, key: ColumnKey) -> Option<&mut bool> {
        match key {
            ColumnKey::UnitPrice => Some(&mut self.show_unit_price),
            ColumnKey::DeliveryDays => Some(&mut self.show_delivery_days),
            ColumnKey::OriginalTotal => Some(&mut self.show_original_total),
            ColumnKey::EuroTotal => Some(&mut self.show_euro_total),
            ColumnKey::Recommendations => Some(&mut self.show_recommendations),
            _ => None,
        }
    }

    pub fn is_visible(&self, key: ColumnKey) -> bool {
        match key {
            ColumnKey::UnitPrice => self.show_unit_price,
            ColumnKey::DeliveryDays => self.show_delivery_days,
            ColumnKey::OriginalTotal => self.show_original_total,
            ColumnKey::EuroTotal => self.show_euro_total,
            ColumnKey::Recommendations => self.show_recommendations,
            _ => true,
        }
    }
}

/// Supplier columns only, first occurrence wins
fn sanitize_order(order: Vec<ColumnKey>) -> Vec<ColumnKey> {
    let mut seen = BTreeSet::new();
    order
        .into_iter()
        .filter(|k| !k.is_general() && seen.insert(*k))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierTotals {
    pub original_total: f64,
    pub unit_price_total: f64,
    pub max_delivery_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_items: usize,
    pub total_quantity: String,
    pub recommended_suppliers: usize,
    #[serde(rename = "totalAmountEUR")]
    pub total_amount_eur: f64,
}

#[derive(Debug, Clone)]
pub struct ComparisonState {
    pub options: ComparisonTableOptions,
    pub data: ComparisonData,
    minimized: BTreeMap<ColumnKey, bool>,
}

impl ComparisonState {
    pub fn new(options: ComparisonTableOptions) -> Self {
        let minimized = GENERAL_COLUMNS
            .iter()
            .chain(SUPPLIER_COLUMNS.iter())
            .map(|k| (*k, false))
            .collect();
        let mut options = options;
        options.column_order = sanitize_order(options.column_order);
        ComparisonState {
            options,
            data: ComparisonData::default(),
            minimized,
        }
    }

    pub fn set_data(&mut self, data: ComparisonData) {
        self.data = data;
    }

    pub fn update_data(&mut self, patch: ComparisonDataPatch) {
        let mut data = self.data.clone();
        if let Some(items) = patch.items {
            data.items = items;
        }
        if let Some(suppliers) = patch.suppliers {
            data.suppliers = suppliers;
        }
        if let Some(offers) = patch.offers {
            data.offers = offers;
        }
        if let Some(recs) = patch.item_recommendations {
            data.item_recommendations = recs;
        }
        self.set_data(data);
    }

    pub fn is_empty(&self) -> bool {
        self.data.items.is_empty() || self.data.suppliers.is_empty()
    }

    // ============================================
    // Column state
    // ============================================

    pub fn is_column_minimized(&self, key: ColumnKey) -> bool {
        self.minimized.get(&key).copied().unwrap_or(false)
    }

    pub fn toggle_column_minimization(&mut self, key: ColumnKey) {
        let current = self.is_column_minimized(key);
        self.minimized.insert(key, !current);
    }

    pub fn set_column_minimization(&mut self, key: ColumnKey, minimized: bool) {
        self.minimized.insert(key, minimized);
    }

    /// Supplier columns currently rendered, in configured order
    pub fn visible_columns(&self) -> Vec<ColumnKey> {
        self.options
            .column_order
            .iter()
            .copied()
            .filter(|k| self.options.is_visible(*k))
            .collect()
    }

    /// Colspan of one supplier block; minimized columns still occupy a slot
    pub fn visible_columns_count(&self) -> usize {
        self.visible_columns().len()
    }

    pub fn general_columns_count(&self) -> usize {
        GENERAL_COLUMNS.len()
    }

    /// Returns false for keys without a visibility flag (general columns)
    pub fn set_column_visibility(&mut self, key: ColumnKey, visible: bool) -> bool {
        match self.options.flag_mut(key) {
            Some(flag) => {
                *flag = visible;
                true
            }
            None => false,
        }
    }

    pub fn toggle_column(&mut self, key: ColumnKey) -> bool {
        let visible = self.options.is_visible(key);
        self.set_column_visibility(key, !visible)
    }

    pub fn set_column_visibilities<I>(&mut self, visibilities: I)
    where
        I: IntoIterator<Item = (ColumnKey, bool)>,
    {
        for (key, visible) in visibilities {
            self.set_column_visibility(key, visible);
        }
    }

    pub fn get_column_visibility(&self) -> BTreeMap<ColumnKey, bool> {
        SUPPLIER_COLUMNS
            .iter()
            .map(|k| (*k, self.options.is_visible(*k)))
            .collect()
    }

    pub fn set_column_order(&mut self, order: Vec<ColumnKey>) {
        self.options.column_order = sanitize_order(order);
    }

    pub fn get_column_order(&self) -> Vec<ColumnKey> {
        self.options.column_order.clone()
    }

    // ============================================
    // Currency
    // ============================================

    pub fn convert_currency(&self, amount: f64, from: &str, to: &str) -> f64 {
        if from == to {
            return amount;
        }
        let Some(rates) = &self.options.currency_rates else {
            return amount;
        };
        match (rates.get(from), rates.get(to)) {
            (Some(&from_rate), Some(&to_rate)) if from_rate != 0.0 && to_rate != 0.0 => {
                amount / from_rate * to_rate
            }
            _ => amount,
        }
    }

    pub fn format_currency(&self, amount: f64, currency: &str) -> String {
        let prefix = self
            .options
            .currency_symbols
            .get(currency)
            .cloned()
            .unwrap_or_else(|| format!("{} ", currency));
        format!("{}{:.2}", prefix, amount)
    }

    pub fn set_currency_rates(&mut self, rates: Option<BTreeMap<String, f64>>) {
        self.options.currency_rates = rates;
    }

    // ============================================
    // Recommendations
    // ============================================

    pub fn is_recommended(&self, item_index: usize, supplier_id: &SupplierId) -> bool {
        self.data.recommended_for(item_index) == Some(supplier_id)
    }

    /// Sets the supplier as the item's recommendation, or clears it if it already was
    pub fn toggle_recommendation(&mut self, item_index: usize, supplier_id: &SupplierId) {
        let next = if self.is_recommended(item_index, supplier_id) {
            None
        } else {
            Some(supplier_id.clone())
        };
        self.data.item_recommendations.insert(item_index, next);
    }

    /// Flip-flops the supplier's recommendation across every item it has an
    /// active offer for
    pub fn recommend_supplier_for_all(&mut self, supplier_id: &SupplierId) {
        let offered: Vec<usize> = (0..self.data.items.len())
            .filter(|idx| self.data.active_offer(supplier_id, *idx).is_some())
            .collect();
        let all_recommended = !offered.is_empty()
            && offered
                .iter()
                .all(|idx| self.is_recommended(*idx, supplier_id));

        for idx in offered {
            let next = if all_recommended {
                None
            } else {
                Some(supplier_id.clone())
            };
            self.data.item_recommendations.insert(idx, next);
        }
    }

    pub fn get_recommendations(&self) -> Recommendations {
        self.data.item_recommendations.clone()
    }

    pub fn set_recommendations(&mut self, recs: Recommendations) {
        self.data.item_recommendations = recs;
    }

    // ============================================
    // Aggregation
    // ============================================

    pub fn calculate_supplier_totals(&self, supplier_id: &SupplierId) -> SupplierTotals {
        let mut totals = SupplierTotals::default();
        for idx in 0..self.data.items.len() {
            if let Some(offer) = self.data.active_offer(supplier_id, idx) {
                totals.original_total += offer.total_price;
                totals.unit_price_total += offer.unit_price;
                if let Some(days) = offer.delivery_days {
                    totals.max_delivery_days = totals.max_delivery_days.max(days);
                }
            }
        }
        totals
    }

    pub fn calculate_summary(&self) -> Summary {
        // quantity per unit, first-seen order
        let mut by_unit: Vec<(String, f64)> = Vec::new();
        for item in &self.data.items {
            match by_unit.iter_mut().find(|(unit, _)| *unit == item.unit) {
                Some((_, qty)) => *qty += item.quantity,
                None => by_unit.push((item.unit.clone(), item.quantity)),
            }
        }
        let total_quantity = if by_unit.is_empty() {
            "-".to_string()
        } else {
            by_unit
                .iter()
                .map(|(unit, qty)| format!("{} {}", format_number_tr(*qty, 2, 2), unit))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let recommended: BTreeSet<&SupplierId> = self
            .data
            .item_recommendations
            .values()
            .flatten()
            .collect();

        let mut total_amount_eur = 0.0;
        if self.options.currency_rates.is_some() {
            for (idx, supplier_id) in &self.data.item_recommendations {
                let Some(supplier_id) = supplier_id else { continue };
                let Some(offer) = self.data.active_offer(supplier_id, *idx) else { continue };
                if let Some(supplier) = self.data.supplier(supplier_id) {
                    total_amount_eur +=
                        self.convert_currency(offer.total_price, supplier.currency(), "EUR");
                }
            }
        }

        Summary {
            total_items: self.data.items.len(),
            total_quantity,
            recommended_suppliers: recommended.len(),
            total_amount_eur,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn sample_data() -> ComparisonData {
        serde_json::from_value(json!({
            "items": [
                { "name": "Civata M8", "code": "CV-8", "job_no": "J-100", "quantity": 10, "unit": "adet" },
                { "name": "Sac 2mm", "code": "SC-2", "quantity": 2.5, "unit": "ton" },
                { "name": "Somun M8", "code": "SM-8", "quantity": 5, "unit": "adet" }
            ],
            "suppliers": [
                { "id": 1, "name": "Acme", "default_currency": "USD" },
                { "id": 2, "name": "Yerel", "default_currency": "TRY" }
            ],
            "offers": {
                "1": {
                    "0": { "unitPrice": 2, "totalPrice": 20, "deliveryDays": 5 },
                    "1": { "unitPrice": 100, "totalPrice": 250, "deliveryDays": 12 },
                    "2": { "unitPrice": 1, "totalPrice": 0 }
                },
                "2": {
                    "0": { "unitPrice": 50, "totalPrice": 500, "deliveryDays": 3 },
                    "2": { "unitPrice": 4, "totalPrice": 20 }
                }
            },
            "itemRecommendations": {}
        }))
        .unwrap()
    }

    fn rates() -> BTreeMap<String, f64> {
        [("TRY", 1.0), ("USD", 0.03), ("EUR", 0.025)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn state() -> ComparisonState {
        let mut state = ComparisonState::new(ComparisonTableOptions::default());
        state.set_data(sample_data());
        state
    }

    #[test]
    fn test_options_reject_unknown_keys() {
        assert!(ComparisonTableOptions::from_json(r#"{"showSummary": false}"#).is_ok());
        assert!(ComparisonTableOptions::from_json(r#"{"showEverything": true}"#).is_err());
    }

    #[test]
    fn test_convert_same_currency_is_identity() {
        let mut state = state();
        assert_eq!(state.convert_currency(12.34, "USD", "USD"), 12.34);
        state.set_currency_rates(Some(rates()));
        assert_eq!(state.convert_currency(12.34, "USD", "USD"), 12.34);
    }

    #[test]
    fn test_convert_round_trip() {
        let mut state = state();
        state.set_currency_rates(Some(rates()));
        let eur = state.convert_currency(100.0, "USD", "EUR");
        assert!((eur - 83.333_333).abs() < 1e-4);
        let back = state.convert_currency(eur, "EUR", "USD");
        assert!((back - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_convert_missing_rate_returns_amount() {
        let mut state = state();
        assert_eq!(state.convert_currency(5.0, "USD", "EUR"), 5.0);
        state.set_currency_rates(Some(rates()));
        assert_eq!(state.convert_currency(5.0, "GBP", "EUR"), 5.0);
    }

    #[test]
    fn test_format_currency() {
        let state = state();
        assert_eq!(state.format_currency(2.0, "USD"), "$2.00");
        assert_eq!(state.format_currency(1234.567, "TRY"), "₺1234.57");
        assert_eq!(state.format_currency(3.0, "CHF"), "CHF 3.00");
    }

    #[test]
    fn test_toggle_recommendation_sets_and_clears() {
        let mut state = state();
        let acme = SupplierId::from(1);
        let yerel = SupplierId::from(2);

        state.toggle_recommendation(0, &acme);
        assert!(state.is_recommended(0, &acme));
        state.toggle_recommendation(0, &yerel);
        assert!(state.is_recommended(0, &yerel));
        assert!(!state.is_recommended(0, &acme));
        state.toggle_recommendation(0, &yerel);
        assert_eq!(state.data.recommended_for(0), None);
    }

    #[test]
    fn test_recommend_all_flip_flop() {
        let mut state = state();
        let acme = SupplierId::from(1);
        state.toggle_recommendation(2, &SupplierId::from(2));
        let before = state.get_recommendations();

        state.recommend_supplier_for_all(&acme);
        assert!(state.is_recommended(0, &acme));
        assert!(state.is_recommended(1, &acme));
        // item 2 has a zero-total offer from acme: untouched
        assert!(state.is_recommended(2, &SupplierId::from(2)));

        state.recommend_supplier_for_all(&acme);
        for idx in [0, 1, 2] {
            assert_eq!(
                state.data.recommended_for(idx),
                before.get(&idx).and_then(|r| r.as_ref())
            );
        }
    }

    #[test]
    fn test_recommend_all_with_partial_selection_recommends_everything() {
        let mut state = state();
        let acme = SupplierId::from(1);
        state.toggle_recommendation(0, &acme);
        state.recommend_supplier_for_all(&acme);
        assert!(state.is_recommended(0, &acme));
        assert!(state.is_recommended(1, &acme));
    }

    #[test]
    fn test_supplier_totals_ignore_inactive_offers() {
        let state = state();
        let totals = state.calculate_supplier_totals(&SupplierId::from(1));
        assert_eq!(totals.original_total, 270.0);
        assert_eq!(totals.unit_price_total, 102.0);
        assert_eq!(totals.max_delivery_days, 12);
    }

    #[test]
    fn test_summary() {
        let mut state = state();
        let summary = state.calculate_summary();
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.total_quantity, "15,00 adet, 2,50 ton");
        assert_eq!(summary.recommended_suppliers, 0);
        assert_eq!(summary.total_amount_eur, 0.0);

        state.set_currency_rates(Some(rates()));
        state.toggle_recommendation(0, &SupplierId::from(2));
        state.toggle_recommendation(1, &SupplierId::from(1));
        let summary = state.calculate_summary();
        assert_eq!(summary.recommended_suppliers, 2);
        // 500 TRY -> 12.5 EUR, 250 USD -> 208.33 EUR
        assert!((summary.total_amount_eur - 220.833_333).abs() < 1e-4);
    }

    #[test]
    fn test_summary_empty_quantity() {
        let state = ComparisonState::new(ComparisonTableOptions::default());
        assert_eq!(state.calculate_summary().total_quantity, "-");
    }

    #[test]
    fn test_column_visibility_and_order() {
        let mut state = state();
        assert_eq!(state.visible_columns_count(), 5);
        assert!(state.set_column_visibility(ColumnKey::EuroTotal, false));
        assert!(!state.set_column_visibility(ColumnKey::Item, false));
        assert_eq!(state.visible_columns_count(), 4);
        assert_eq!(state.get_column_visibility()[&ColumnKey::EuroTotal], false);

        state.set_column_order(vec![
            ColumnKey::Recommendations,
            ColumnKey::Item,
            ColumnKey::UnitPrice,
            ColumnKey::Recommendations,
        ]);
        assert_eq!(
            state.get_column_order(),
            vec![ColumnKey::Recommendations, ColumnKey::UnitPrice]
        );
        assert_eq!(state.visible_columns_count(), 2);
    }

    #[test]
    fn test_minimization_does_not_change_counts() {
        let mut state = state();
        state.toggle_column_minimization(ColumnKey::UnitPrice);
        assert!(state.is_column_minimized(ColumnKey::UnitPrice));
        assert_eq!(state.visible_columns_count(), 5);
        state.set_column_minimization(ColumnKey::UnitPrice, false);
        assert!(!state.is_column_minimized(ColumnKey::UnitPrice));
    }

    #[test]
    fn test_update_data_keeps_missing_parts() {
        let mut state = state();
        state.update_data(ComparisonDataPatch {
            items: Some(Vec::new()),
            ..Default::default()
        });
        assert!(state.data.items.is_empty());
        assert_eq!(state.data.suppliers.len(), 2);
        assert!(state.is_empty());
    }
}
