//! Markup for the comparison grid

use super::columns::{ColumnKey, GENERAL_COLUMNS};
use super::state::ComparisonState;
use crate::components::action::Action;
use crate::models::{Item, Offer, Supplier};
use crate::utils::format::escape_html;

const MINIMIZED_STYLE: &str = r#" style="width: 40px; min-width: 40px;""#;

fn class_attr(classes: &[&str]) -> String {
    classes
        .iter()
        .filter(|c| !c.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cell whose column is collapsed to a rotated sliver
fn minimized_td(classes: &[&str], inner: &str) -> String {
    let mut all = classes.to_vec();
    all.push("minimized-cell");
    format!(
        r#"<td class="{}"{}><div class="minimized-content">{}</div></td>"#,
        class_attr(&all),
        MINIMIZED_STYLE,
        inner
    )
}

fn rotated(text: &str) -> String {
    format!(r#"<span class="rotated-text">{}</span>"#, text)
}

impl ComparisonState {
    pub fn render_html(&self) -> String {
        if self.is_empty() {
            return r#"<div class="comparison-table-empty"><i class="fas fa-table"></i><p>Karşılaştırma tablosu için veri bulunamadı.</p></div>"#
                .to_string();
        }

        // with every offer column hidden the supplier blocks have no cells at all
        let columns = self.visible_columns_count();
        let group_span = self.data.suppliers.len() * columns;
        let mut html = String::new();
        html.push_str(r#"<div class="card"><div class="card-header"><h5 class="mb-0"><i class="fas fa-table me-2"></i>Karşılaştırma Tablosu</h5></div>"#);
        html.push_str(r#"<div class="card-body"><div class="table-responsive"><table class="table table-bordered comparison-table"><thead class="table-primary">"#);

        html.push_str("<tr>");
        html.push_str(&self.render_general_headers());
        if group_span > 0 {
            html.push_str(&format!(
                r#"<th class="text-center supplier-group-header" colspan="{}">Tedarikçi Teklifleri</th>"#,
                group_span
            ));
        }
        html.push_str("</tr>");

        html.push_str(r#"<tr class="supplier-subheaders">"#);
        if columns > 0 {
            for supplier in &self.data.suppliers {
                html.push_str(&self.render_supplier_subheader(supplier));
            }
        }
        html.push_str("</tr>");

        html.push_str(r#"<tr class="supplier-headers">"#);
        for supplier in &self.data.suppliers {
            for key in self.visible_columns() {
                html.push_str(&self.render_column_header(key, supplier));
            }
        }
        html.push_str("</tr></thead><tbody>");

        for (idx, item) in self.data.items.iter().enumerate() {
            html.push_str(&format!(r#"<tr class="comparison-row" data-item-index="{}">"#, idx));
            html.push_str(&self.render_general_cells(item));
            for supplier in &self.data.suppliers {
                html.push_str(&self.render_supplier_cells(idx, supplier));
            }
            html.push_str("</tr>");
        }
        if self.options.show_summary_row {
            html.push_str(&self.render_summary_row());
        }
        html.push_str("</tbody></table></div></div></div>");

        if self.options.show_summary {
            html.push_str(&self.render_summary_section());
        }
        html
    }

    fn render_general_headers(&self) -> String {
        let mut html = String::new();
        for key in GENERAL_COLUMNS {
            let action = Action::ToggleColumn(key).attrs();
            if self.is_column_minimized(key) {
                html.push_str(&format!(
                    r#"<th rowspan="3" class="align-middle minimized-column clickable-header"{}{} title="Genişlet {}"><div class="minimized-header">{}</div></th>"#,
                    MINIMIZED_STYLE,
                    action,
                    key.label(),
                    rotated(key.label())
                ));
            } else {
                html.push_str(&format!(
                    r#"<th rowspan="3" class="align-middle clickable-header"{} title="Küçült {}"><i class="fas {} me-1"></i>{}</th>"#,
                    action,
                    key.label(),
                    key.icon().unwrap_or_default(),
                    key.label()
                ));
            }
        }
        html
    }

    fn render_supplier_subheader(&self, supplier: &Supplier) -> String {
        let name = escape_html(&supplier.name);
        let recommend_all = if self.options.show_recommendations {
            format!(
                r#"<button class="btn btn-sm btn-outline-warning recommend-all-btn"{}><i class="fas fa-star me-1"></i>Hepsi için Öner</button>"#,
                Action::RecommendAll(supplier.id.clone()).attrs()
            )
        } else {
            String::new()
        };
        format!(
            r#"<th class="text-center align-middle" colspan="{}"><div class="d-flex flex-column align-items-center gap-1"><div class="fw-semibold supplier-name-truncate" title="{}">{}</div><div class="small text-muted">{}</div>{}</div></th>"#,
            self.visible_columns_count(),
            name,
            name,
            escape_html(supplier.currency()),
            recommend_all
        )
    }

    fn render_column_header(&self, key: ColumnKey, supplier: &Supplier) -> String {
        let action = Action::ToggleColumn(key).attrs();
        if self.is_column_minimized(key) {
            return format!(
                r#"<th class="text-center align-middle minimized-column clickable-header"{}{} title="Genişlet {}"><div class="minimized-header">{}</div></th>"#,
                MINIMIZED_STYLE,
                action,
                key.label(),
                rotated(key.short_label())
            );
        }

        let currency = escape_html(supplier.currency());
        let icon = key
            .icon()
            .map(|i| format!(r#"<i class="fas {} me-1"></i>"#, i))
            .unwrap_or_default();
        let caption = match key {
            ColumnKey::UnitPrice => format!(r#"{}Birim Fiyat<br><small class="text-muted">{}</small>"#, icon, currency),
            ColumnKey::DeliveryDays => format!(r#"{}Teslim<br><small class="text-muted">Gün</small>"#, icon),
            ColumnKey::OriginalTotal => format!(r#"Toplam<br><small class="text-muted">{}</small>"#, currency),
            ColumnKey::EuroTotal => format!(r#"{}Euro Toplam<br><small class="text-muted">EUR</small>"#, icon),
            ColumnKey::Recommendations => format!("{}Öner", icon),
            _ => key.label().to_string(),
        };
        format!(
            r#"<th class="text-center align-middle clickable-header"{} title="Küçült {}"><div class="text-center">{}</div></th>"#,
            action,
            key.label(),
            caption
        )
    }

    fn render_general_cells(&self, item: &Item) -> String {
        let mut html = String::new();
        for key in GENERAL_COLUMNS {
            let content = match key {
                ColumnKey::Item => format!(
                    r#"<strong>{}</strong><br><small class="text-muted">{}</small>"#,
                    escape_html(&item.name),
                    escape_html(&item.code)
                ),
                ColumnKey::JobNo => match item.job_no.as_deref() {
                    Some(job_no) if !job_no.is_empty() => escape_html(job_no),
                    _ => "-".to_string(),
                },
                ColumnKey::Quantity => item.quantity.to_string(),
                _ => escape_html(&item.unit),
            };
            if self.is_column_minimized(key) {
                html.push_str(&minimized_td(&[], &rotated(&content)));
            } else {
                html.push_str(&format!("<td>{}</td>", content));
            }
        }
        html
    }

    fn render_supplier_cells(&self, item_index: usize, supplier: &Supplier) -> String {
        if self.visible_columns_count() == 0 {
            return String::new();
        }
        let Some(offer) = self.data.active_offer(&supplier.id, item_index) else {
            return format!(
                r#"<td class="text-muted text-center no-offer" colspan="{}">Teklif yok</td>"#,
                self.visible_columns_count()
            );
        };

        let recommended = self.is_recommended(item_index, &supplier.id);
        let rec_class = if recommended { "recommended-cell" } else { "" };
        let mut html = String::new();
        for key in self.visible_columns() {
            let minimized = self.is_column_minimized(key);
            if key == ColumnKey::Recommendations {
                html.push_str(&self.render_recommendation_cell(item_index, supplier, recommended, minimized));
                continue;
            }

            let (value, caption) = self.offer_cell_parts(key, offer, supplier);
            if minimized {
                html.push_str(&minimized_td(&["text-center", rec_class], &rotated(&value)));
            } else {
                html.push_str(&format!(
                    r#"<td class="{}"><div class="fw-bold">{}</div>{}</td>"#,
                    class_attr(&["text-center", rec_class]),
                    value,
                    caption
                ));
            }
        }
        html
    }

    /// Display value and the caption rendered under it
    fn offer_cell_parts(&self, key: ColumnKey, offer: &Offer, supplier: &Supplier) -> (String, String) {
        let currency = supplier.currency();
        let currency_caption = format!(r#"<small class="text-muted">{}</small>"#, escape_html(currency));
        match key {
            ColumnKey::UnitPrice => (self.format_currency(offer.unit_price, currency), currency_caption),
            ColumnKey::DeliveryDays => {
                let days = offer
                    .delivery_days
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let mut caption = r#"<small class="text-muted">gün</small>"#.to_string();
                if self.options.show_notes {
                    if let Some(notes) = offer.notes.as_deref().filter(|n| !n.is_empty()) {
                        caption.push_str(&format!(
                            r#"<br><small class="text-muted offer-notes">{}</small>"#,
                            escape_html(notes)
                        ));
                    }
                }
                (days, caption)
            }
            ColumnKey::OriginalTotal => (self.format_currency(offer.total_price, currency), currency_caption),
            ColumnKey::EuroTotal => {
                let euro = self.convert_currency(offer.total_price, currency, "EUR");
                (
                    self.format_currency(euro, "EUR"),
                    r#"<small class="text-muted">EUR</small>"#.to_string(),
                )
            }
            _ => (String::new(), String::new()),
        }
    }

    fn render_recommendation_cell(
        &self,
        item_index: usize,
        supplier: &Supplier,
        recommended: bool,
        minimized: bool,
    ) -> String {
        let action = Action::ToggleRecommendation {
            item_index,
            supplier_id: supplier.id.clone(),
        }
        .attrs();
        let btn_class = if recommended { "btn-warning" } else { "btn-outline-warning" };
        let rec_class = if recommended { "recommended-cell" } else { "" };
        if minimized {
            let button = format!(
                r#"<button class="btn btn-sm {} recommendation-btn-mini"{}><i class="fas fa-star"></i></button>"#,
                btn_class, action
            );
            minimized_td(&["text-center", rec_class], &button)
        } else {
            format!(
                r#"<td class="{}"><button class="btn btn-sm {} recommendation-btn"{}><i class="fas fa-star"></i></button></td>"#,
                class_attr(&["text-center", rec_class]),
                btn_class,
                action
            )
        }
    }

    fn render_summary_row(&self) -> String {
        let mut html = format!(
            r#"<tr class="table-info summary-row"><td colspan="{}" class="text-center fw-bold"><i class="fas fa-calculator me-2"></i>TOPLAM</td>"#,
            self.general_columns_count()
        );
        for supplier in &self.data.suppliers {
            let totals = self.calculate_supplier_totals(&supplier.id);
            let currency = supplier.currency();
            for key in self.visible_columns() {
                let (value, caption) = match key {
                    ColumnKey::UnitPrice => (
                        self.format_currency(totals.unit_price_total, currency),
                        Some(currency.to_string()),
                    ),
                    ColumnKey::OriginalTotal => (
                        self.format_currency(totals.original_total, currency),
                        Some(currency.to_string()),
                    ),
                    ColumnKey::EuroTotal => (
                        self.format_currency(
                            self.convert_currency(totals.original_total, currency, "EUR"),
                            "EUR",
                        ),
                        Some("EUR".to_string()),
                    ),
                    _ => ("-".to_string(), None),
                };

                if self.is_column_minimized(key) {
                    html.push_str(&minimized_td(&["text-center fw-bold summary-cell"], &rotated(&value)));
                } else if let Some(caption) = caption {
                    html.push_str(&format!(
                        r#"<td class="text-center fw-bold summary-cell"><div class="text-primary">{}</div><small class="text-muted">{}</small></td>"#,
                        value,
                        escape_html(&caption)
                    ));
                } else {
                    html.push_str(&format!(
                        r#"<td class="text-center fw-bold summary-cell"><div class="text-muted">{}</div></td>"#,
                        value
                    ));
                }
            }
        }
        html.push_str("</tr>");
        html
    }

    fn render_summary_section(&self) -> String {
        let summary = self.calculate_summary();
        let mut blocks = vec![
            ("Toplam Malzeme Sayısı", summary.total_items.to_string()),
            ("Toplam Miktar", escape_html(&summary.total_quantity)),
            ("Önerilen Tedarikçi Sayısı", summary.recommended_suppliers.to_string()),
        ];
        if self.options.show_currency_conversion {
            blocks.push((
                "Toplam Tahmini Tutar (EUR)",
                self.format_currency(summary.total_amount_eur, "EUR"),
            ));
        }

        let body: String = blocks
            .iter()
            .map(|(label, value)| {
                format!(
                    r#"<div class="col-md-3"><div class="summary-item"><label class="form-label">{}</label><div class="form-control-plaintext">{}</div></div></div>"#,
                    label, value
                )
            })
            .collect();
        format!(
            r#"<div class="row mt-3"><div class="col-12"><div class="card"><div class="card-header"><h5 class="mb-0"><i class="fas fa-calculator me-2"></i>Özet Bilgiler</h5></div><div class="card-body"><div class="row">{}</div></div></div></div></div>"#,
            body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::state::{tests::sample_data, ComparisonTableOptions};
    use super::*;
    use crate::models::ComparisonData;
    use serde_json::json;

    fn single_offer(total_price: f64) -> ComparisonData {
        serde_json::from_value(json!({
            "items": [{ "name": "Bolt", "code": "B1", "quantity": 10, "unit": "pcs" }],
            "suppliers": [{ "id": 1, "name": "Acme", "default_currency": "USD" }],
            "offers": { "1": { "0": { "unitPrice": 2, "totalPrice": total_price, "deliveryDays": 5 } } },
            "itemRecommendations": {}
        }))
        .unwrap()
    }

    fn render(data: ComparisonData) -> (ComparisonState, String) {
        let mut state = ComparisonState::new(ComparisonTableOptions::default());
        state.set_data(data);
        let html = state.render_html();
        (state, html)
    }

    /// The `<tbody>` part, where data rows live
    fn body(html: &str) -> &str {
        let start = html.find("<tbody>").unwrap();
        let end = html.find("</tbody>").unwrap();
        &html[start..end]
    }

    #[test]
    fn test_empty_state() {
        let (_, html) = render(ComparisonData::default());
        assert!(html.contains("Karşılaştırma tablosu için veri bulunamadı."));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn test_single_active_offer_row() {
        let (_, html) = render(single_offer(20.0));
        let body = body(&html);
        assert_eq!(body.matches(r#"class="comparison-row""#).count(), 1);
        assert!(body.contains("$2.00"));
        assert!(body.contains("$20.00"));
        assert!(body.contains(r#"<div class="fw-bold">5</div>"#));
        assert!(!html.contains("Teklif yok"));
    }

    #[test]
    fn test_zero_total_collapses_to_no_offer_cell() {
        let (state, html) = render(single_offer(0.0));
        let expected = format!(r#"colspan="{}">Teklif yok</td>"#, state.visible_columns_count());
        assert_eq!(html.matches("Teklif yok").count(), 1);
        assert!(html.contains(&expected));
        assert!(!body(&html).contains("$2.00"));
    }

    #[test]
    fn test_no_offer_colspan_ignores_minimization() {
        let mut state = ComparisonState::new(ComparisonTableOptions::default());
        state.set_data(single_offer(0.0));
        state.toggle_column_minimization(ColumnKey::UnitPrice);
        state.set_column_visibility(ColumnKey::EuroTotal, false);
        let html = state.render_html();

        assert!(html.contains(r#"<td class="text-muted text-center no-offer" colspan="4">Teklif yok</td>"#));
        assert!(html.contains(r#"class="text-center supplier-group-header" colspan="4""#));
    }

    #[test]
    fn test_all_offer_columns_hidden_emits_no_supplier_cells() {
        for data in [single_offer(0.0), single_offer(20.0), sample_data()] {
            let mut state = ComparisonState::new(ComparisonTableOptions::default());
            state.set_data(data);
            state.set_column_visibilities([
                (ColumnKey::UnitPrice, false),
                (ColumnKey::DeliveryDays, false),
                (ColumnKey::OriginalTotal, false),
                (ColumnKey::EuroTotal, false),
                (ColumnKey::Recommendations, false),
            ]);
            let html = state.render_html();

            assert!(!html.contains(r#"colspan="0""#));
            assert!(!html.contains("Teklif yok"));
            assert!(!html.contains("supplier-group-header"));
            // general cells per row plus the TOPLAM cell
            let body = body(&html);
            let rows = body.matches(r#"class="comparison-row""#).count();
            assert_eq!(body.matches("<td").count(), rows * state.general_columns_count() + 1);
        }
    }

    #[test]
    fn test_minimized_column_cells() {
        let mut state = ComparisonState::new(ComparisonTableOptions::default());
        state.set_data(single_offer(20.0));
        state.toggle_column_minimization(ColumnKey::DeliveryDays);
        let html = state.render_html();

        assert!(html.contains(r#"title="Genişlet Teslim""#));
        assert!(html.contains(r#"<span class="rotated-text">5</span>"#));
        assert!(html.contains(r#"title="Küçült Birim Fiyat""#));
    }

    #[test]
    fn test_recommended_cells_and_buttons() {
        let mut state = ComparisonState::new(ComparisonTableOptions::default());
        state.set_data(single_offer(20.0));
        state.toggle_recommendation(0, &crate::models::SupplierId::from("1"));
        let html = state.render_html();
        assert!(html.contains("recommended-cell"));
        assert!(html.contains("btn btn-sm btn-warning recommendation-btn"));
        assert!(html.contains(r#"data-action="toggle-recommendation" data-args="[0,&quot;1&quot;]""#));
        assert!(html.contains(r#"data-action="recommend-all""#));
    }

    #[test]
    fn test_summary_row_and_section() {
        let (state, html) = render(sample_data());
        assert!(html.contains(&format!(r#"<td colspan="{}" class="text-center fw-bold">"#, state.general_columns_count())));
        assert!(html.contains("TOPLAM"));
        assert!(html.contains("$270.00"));
        assert!(html.contains("Özet Bilgiler"));
        assert!(html.contains("15,00 adet, 2,50 ton"));
    }

    #[test]
    fn test_hidden_summary_parts() {
        let options = ComparisonTableOptions {
            show_summary: false,
            show_summary_row: false,
            show_recommendations: false,
            ..Default::default()
        };
        let mut state = ComparisonState::new(options);
        state.set_data(sample_data());
        let html = state.render_html();
        assert!(!html.contains("TOPLAM"));
        assert!(!html.contains("Özet Bilgiler"));
        assert!(!html.contains("Hepsi için Öner"));
        assert!(!html.contains("recommendation-btn"));
    }

    #[test]
    fn test_notes_are_escaped() {
        let mut data = single_offer(20.0);
        if let Some(offer) = data.offers.get_mut(&crate::models::SupplierId::from("1")).and_then(|m| m.get_mut(&0)) {
            offer.notes = Some("<b>acil</b>".to_string());
        }
        let (_, html) = render(data);
        assert!(html.contains("&lt;b&gt;acil&lt;/b&gt;"));
    }
}
