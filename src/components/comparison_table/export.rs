//! CSV / XLSX export of the comparison grid

use super::columns::ColumnKey;
use super::state::ComparisonState;
use crate::error::{Result, UiError};
use crate::models::Supplier;
use crate::utils::sheetjs::{Cell, CellStyle, Merge, SheetSpec};

pub const CSV_MIME: &str = "text/csv;charset=utf-8";
const BOM: &str = "\u{FEFF}";

const GENERAL_HEADERS: [(&str, u16); 5] = [
    ("Malzeme", 30),
    ("Kod", 14),
    ("İş No", 12),
    ("Miktar", 10),
    ("Birim", 10),
];
const SUPPLIER_COL_WIDTH: u16 = 16;

const HEADER_FILL: &str = "4472C4";
const SUBHEADER_FILL: &str = "D9E1F2";
const SUMMARY_FILL: &str = "FFF2CC";
const RECOMMENDED_FILL: &str = "C6EFCE";

/// Quotes one CSV field when it contains a delimiter, quote or line break
pub fn escape_csv(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    write_field(value).unwrap_or_else(|_| format!("\"{}\"", value.replace('"', "\"\"")))
}

fn write_field(value: &str) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    // a whole record, so the writer closes any open quote
    writer.write_record([value])?;
    let bytes = writer
        .into_inner()
        .map_err(|e| UiError::Export(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| UiError::Export(e.to_string()))?;
    Ok(text.strip_suffix('\n').unwrap_or(&text).to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportValue {
    Text(String),
    Number(f64),
}

impl ExportValue {
    fn to_csv(&self) -> String {
        match self {
            ExportValue::Text(s) => s.clone(),
            ExportValue::Number(n) => format!("{:.2}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportCell {
    pub value: ExportValue,
    pub highlight: bool,
}

impl ExportCell {
    fn text(s: impl Into<String>) -> Self {
        ExportCell { value: ExportValue::Text(s.into()), highlight: false }
    }

    fn number(n: f64) -> Self {
        ExportCell { value: ExportValue::Number(n), highlight: false }
    }
}

/// Grid as exported: general columns, then one block per supplier
#[derive(Debug, Clone)]
pub struct ExportTable {
    pub supplier_headers: Vec<(String, Vec<String>)>,
    pub rows: Vec<Vec<ExportCell>>,
    pub summary: Option<Vec<ExportCell>>,
}

impl ExportTable {
    pub fn width(&self) -> usize {
        GENERAL_HEADERS.len()
            + self
                .supplier_headers
                .iter()
                .map(|(_, cols)| cols.len())
                .sum::<usize>()
    }

    /// Flat header row, supplier columns prefixed with the supplier name
    pub fn header_row(&self) -> Vec<String> {
        let mut header: Vec<String> = GENERAL_HEADERS.iter().map(|(h, _)| h.to_string()).collect();
        for (name, cols) in &self.supplier_headers {
            for col in cols {
                header.push(format!("{} - {}", name, col));
            }
        }
        header
    }
}

fn export_label(key: ColumnKey, supplier: &Supplier) -> String {
    match key {
        ColumnKey::UnitPrice => format!("Birim Fiyat ({})", supplier.currency()),
        ColumnKey::DeliveryDays => "Teslim (Gün)".to_string(),
        ColumnKey::OriginalTotal => format!("Toplam ({})", supplier.currency()),
        ColumnKey::EuroTotal => "Euro Toplam (EUR)".to_string(),
        ColumnKey::Recommendations => "Önerilen".to_string(),
        other => other.label().to_string(),
    }
}

impl ComparisonState {
    pub fn export_table(&self) -> ExportTable {
        let columns = self.visible_columns();
        let supplier_headers = self
            .data
            .suppliers
            .iter()
            .map(|s| {
                (
                    s.name.clone(),
                    columns.iter().map(|k| export_label(*k, s)).collect(),
                )
            })
            .collect();

        let mut rows = Vec::with_capacity(self.data.items.len());
        for (idx, item) in self.data.items.iter().enumerate() {
            let mut row = vec![
                ExportCell::text(item.name.clone()),
                ExportCell::text(item.code.clone()),
                ExportCell::text(item.job_no.clone().filter(|j| !j.is_empty()).unwrap_or_else(|| "-".to_string())),
                ExportCell::number(item.quantity),
                ExportCell::text(item.unit.clone()),
            ];
            for supplier in &self.data.suppliers {
                let offer = self.data.active_offer(&supplier.id, idx);
                let recommended = self.is_recommended(idx, &supplier.id);
                for key in &columns {
                    let mut cell = match (offer, key) {
                        (None, _) => ExportCell::text("-"),
                        (Some(o), ColumnKey::UnitPrice) => ExportCell::number(o.unit_price),
                        (Some(o), ColumnKey::DeliveryDays) => ExportCell::text(
                            o.delivery_days.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                        ),
                        (Some(o), ColumnKey::OriginalTotal) => ExportCell::number(o.total_price),
                        (Some(o), ColumnKey::EuroTotal) => ExportCell::number(
                            self.convert_currency(o.total_price, supplier.currency(), "EUR"),
                        ),
                        (Some(_), ColumnKey::Recommendations) => {
                            ExportCell::text(if recommended { "Evet" } else { "" })
                        }
                        (Some(_), _) => ExportCell::text(""),
                    };
                    cell.highlight = recommended && offer.is_some();
                    row.push(cell);
                }
            }
            rows.push(row);
        }

        let summary = self.options.show_summary_row.then(|| {
            let mut row = vec![ExportCell::text("TOPLAM")];
            row.extend((1..GENERAL_HEADERS.len()).map(|_| ExportCell::text("")));
            for supplier in &self.data.suppliers {
                let totals = self.calculate_supplier_totals(&supplier.id);
                for key in &columns {
                    row.push(match key {
                        ColumnKey::UnitPrice => ExportCell::number(totals.unit_price_total),
                        ColumnKey::DeliveryDays if totals.max_delivery_days > 0 => {
                            ExportCell::text(format!("Maks. Teslim: {}", totals.max_delivery_days))
                        }
                        ColumnKey::OriginalTotal => ExportCell::number(totals.original_total),
                        ColumnKey::EuroTotal => ExportCell::number(self.convert_currency(
                            totals.original_total,
                            supplier.currency(),
                            "EUR",
                        )),
                        _ => ExportCell::text("-"),
                    });
                }
            }
            row
        });

        ExportTable { supplier_headers, rows, summary }
    }

    /// CSV document (with BOM) ready for download
    pub fn build_csv(&self) -> Result<String> {
        let table = self.export_table();
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        writer.write_record(table.header_row())?;
        for row in table.rows.iter().chain(table.summary.iter()) {
            writer.write_record(row.iter().map(|c| c.value.to_csv()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| UiError::Export(e.to_string()))?;
        let body = String::from_utf8(bytes).map_err(|e| UiError::Export(e.to_string()))?;
        Ok(format!("{}{}", BOM, body))
    }

    /// Styled worksheet: title, supplier group header, sub-headers, data, summary
    pub fn build_sheet(&self) -> SheetSpec {
        let table = self.export_table();
        let width = table.width();
        let general = GENERAL_HEADERS.len();

        let title_style = CellStyle {
            bold: true,
            font_size: Some(14),
            align_center: true,
            ..Default::default()
        };
        let header_style = CellStyle {
            bold: true,
            font_color: Some("FFFFFF"),
            fill: Some(HEADER_FILL),
            align_center: true,
            border: true,
            ..Default::default()
        };
        let subheader_style = CellStyle {
            bold: true,
            fill: Some(SUBHEADER_FILL),
            align_center: true,
            border: true,
            ..Default::default()
        };
        let body_style = CellStyle { border: true, ..Default::default() };
        let highlight_style = CellStyle {
            fill: Some(RECOMMENDED_FILL),
            border: true,
            ..Default::default()
        };
        let summary_style = CellStyle {
            bold: true,
            fill: Some(SUMMARY_FILL),
            border: true,
            ..Default::default()
        };

        let mut rows = Vec::new();
        let mut merges = vec![Merge { start: (0, 0), end: (0, width.saturating_sub(1)) }];

        let mut title_row = vec![Cell::text("Tedarikçi Karşılaştırma Tablosu").styled(title_style)];
        title_row.resize(width, Cell::empty());
        rows.push(title_row);

        // general headers span both header rows
        let mut group_row = Vec::with_capacity(width);
        let mut sub_row = Vec::with_capacity(width);
        for (col, (label, _)) in GENERAL_HEADERS.iter().enumerate() {
            group_row.push(Cell::text(*label).styled(header_style.clone()));
            sub_row.push(Cell::empty().styled(header_style.clone()));
            merges.push(Merge { start: (1, col), end: (2, col) });
        }
        let mut col = general;
        for (name, cols) in &table.supplier_headers {
            if cols.is_empty() {
                continue;
            }
            merges.push(Merge { start: (1, col), end: (1, col + cols.len() - 1) });
            for (i, label) in cols.iter().enumerate() {
                group_row.push(if i == 0 {
                    Cell::text(name.clone()).styled(header_style.clone())
                } else {
                    Cell::empty().styled(header_style.clone())
                });
                sub_row.push(Cell::text(label.clone()).styled(subheader_style.clone()));
            }
            col += cols.len();
        }
        rows.push(group_row);
        rows.push(sub_row);

        let to_cell = |c: &ExportCell, style: &CellStyle| {
            let cell = match &c.value {
                ExportValue::Text(s) => Cell::text(s.clone()),
                ExportValue::Number(n) => Cell::number(*n),
            };
            cell.styled(style.clone())
        };
        for row in &table.rows {
            rows.push(
                row.iter()
                    .map(|c| to_cell(c, if c.highlight { &highlight_style } else { &body_style }))
                    .collect(),
            );
        }
        if let Some(summary) = &table.summary {
            let r = rows.len();
            merges.push(Merge { start: (r, 0), end: (r, general - 1) });
            rows.push(summary.iter().map(|c| to_cell(c, &summary_style)).collect());
        }

        let mut col_widths: Vec<u16> = GENERAL_HEADERS.iter().map(|(_, w)| *w).collect();
        col_widths.resize(width, SUPPLIER_COL_WIDTH);

        SheetSpec {
            name: "Karşılaştırma".to_string(),
            rows,
            merges,
            col_widths,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::state::{tests::sample_data, ComparisonTableOptions};
    use super::*;
    use crate::models::SupplierId;

    fn reparse(line: &str) -> Vec<String> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(line.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        record.iter().map(|s| s.to_string()).collect()
    }

    fn state() -> ComparisonState {
        let mut state = ComparisonState::new(ComparisonTableOptions::default());
        state.set_data(sample_data());
        state
    }

    #[test]
    fn test_escape_csv_reparses_to_original() {
        for value in ["plain", "a,b", "say \"hi\"", "line1\nline2", "mixed, \"quoted\"\r\nend"] {
            let escaped = escape_csv(value);
            assert_eq!(reparse(&escaped), vec![value.to_string()], "value: {:?}", value);
        }
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("line\n"), "\"line\n\"");
    }

    #[test]
    fn test_escaped_cells_join_into_one_row() {
        let row = [escape_csv("a,b"), escape_csv("c"), escape_csv("say \"hi\"")].join(",");
        assert_eq!(row, "\"a,b\",c,\"say \"\"hi\"\"\"");
        assert_eq!(reparse(&row), vec!["a,b", "c", "say \"hi\""]);
    }

    #[test]
    fn test_csv_document_layout() {
        let mut state = state();
        state.toggle_recommendation(0, &SupplierId::from(1));
        let csv_text = state.build_csv().unwrap();
        assert!(csv_text.starts_with('\u{FEFF}'));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(csv_text.trim_start_matches('\u{FEFF}').as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        // header + 3 items + summary
        assert_eq!(records.len(), 5);
        assert_eq!(&records[0][0], "Malzeme");
        assert_eq!(&records[0][5], "Acme - Birim Fiyat (USD)");
        assert_eq!(&records[1][0], "Civata M8");
        assert_eq!(&records[1][5], "2.00");
        assert_eq!(&records[1][9], "Evet");
        assert_eq!(&records[4][0], "TOPLAM");
        assert_eq!(&records[4][7], "270.00");
        assert_eq!(&records[4][6], "Maks. Teslim: 12");
    }

    #[test]
    fn test_csv_without_summary_row() {
        let mut state = state();
        state.options.show_summary_row = false;
        state.set_column_visibility(ColumnKey::EuroTotal, false);
        let table = state.export_table();
        assert!(table.summary.is_none());
        assert_eq!(table.width(), 5 + 2 * 4);
    }

    #[test]
    fn test_item_without_offer_exports_dashes() {
        let table = state().export_table();
        // item 1 has no offer from supplier 2 (second block starts at 5 + 5)
        assert_eq!(table.rows[1][10].value, ExportValue::Text("-".to_string()));
    }

    #[test]
    fn test_sheet_structure() {
        let sheet = state().build_sheet();
        // title + 2 header rows + 3 items + summary
        assert_eq!(sheet.rows.len(), 7);
        assert_eq!(sheet.col_widths.len(), 15);
        assert!(sheet.merges.contains(&Merge { start: (0, 0), end: (0, 14) }));
        assert!(sheet.merges.contains(&Merge { start: (1, 5), end: (1, 9) }));
        assert!(sheet.merges.contains(&Merge { start: (6, 0), end: (6, 4) }));
        assert_eq!(sheet.rows[1][5].value, crate::utils::sheetjs::CellValue::Text("Acme".to_string()));
    }
}
