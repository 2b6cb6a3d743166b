//! XLSX output through the CDN-hosted xlsx-js-style bundle
//!
//! The worksheet itself (cells, styles, merges, widths) is described in plain
//! Rust and serialised to the object layout the library expects; the browser
//! side only loads the script and hands the object to `XLSX.writeFile`.

use crate::error::{Result, UiError};
use crate::utils::dom;
use crate::utils::log_trace::{log_error, log_info};
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_json::{json, Map, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// Build-time override via `BACKOFFICE_XLSX_CDN_URL`
pub fn cdn_url() -> &'static str {
    option_env!("BACKOFFICE_XLSX_CDN_URL")
        .unwrap_or("https://cdn.jsdelivr.net/npm/xlsx-js-style@1.2.0/dist/xlsx.bundle.js")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CellStyle {
    pub bold: bool,
    pub font_color: Option<&'static str>,
    pub fill: Option<&'static str>,
    pub align_center: bool,
    pub border: bool,
    pub font_size: Option<u8>,
}

impl CellStyle {
    fn to_json(&self) -> Value {
        let mut font = Map::new();
        if self.bold {
            font.insert("bold".into(), Value::Bool(true));
        }
        if let Some(color) = self.font_color {
            font.insert("color".into(), json!({ "rgb": color }));
        }
        if let Some(size) = self.font_size {
            font.insert("sz".into(), json!(size));
        }

        let mut style = Map::new();
        if !font.is_empty() {
            style.insert("font".into(), Value::Object(font));
        }
        if let Some(fill) = self.fill {
            style.insert("fill".into(), json!({ "fgColor": { "rgb": fill } }));
        }
        if self.align_center {
            style.insert(
                "alignment".into(),
                json!({ "horizontal": "center", "vertical": "center", "wrapText": true }),
            );
        }
        if self.border {
            let side = json!({ "style": "thin", "color": { "rgb": "BFBFBF" } });
            style.insert(
                "border".into(),
                json!({ "top": side, "bottom": side, "left": side, "right": side }),
            );
        }
        Value::Object(style)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: Option<CellStyle>,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell { value: CellValue::Text(s.into()), style: None }
    }

    pub fn number(n: f64) -> Self {
        Cell { value: CellValue::Number(n), style: None }
    }

    pub fn empty() -> Self {
        Cell { value: CellValue::Empty, style: None }
    }

    pub fn styled(mut self, style: CellStyle) -> Self {
        self.style = Some(style);
        self
    }
}

/// Inclusive zero-based cell range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merge {
    pub start: (usize, usize),
    pub end: (usize, usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetSpec {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
    pub merges: Vec<Merge>,
    pub col_widths: Vec<u16>,
}

/// `(0, 0)` → `A1`, `(4, 27)` → `AB5`
pub fn cell_address(row: usize, col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    let col_name: String = letters.iter().rev().collect();
    format!("{}{}", col_name, row + 1)
}

impl SheetSpec {
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Worksheet object in xlsx-js-style layout (`A1` keys, `!ref`, `!merges`, `!cols`)
    pub fn to_worksheet(&self) -> Value {
        let mut sheet = Map::new();
        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let mut obj = Map::new();
                match &cell.value {
                    CellValue::Text(s) => {
                        obj.insert("t".into(), json!("s"));
                        obj.insert("v".into(), json!(s));
                    }
                    CellValue::Number(n) => {
                        obj.insert("t".into(), json!("n"));
                        obj.insert("v".into(), json!(n));
                    }
                    CellValue::Empty => {
                        if cell.style.is_none() {
                            continue;
                        }
                        obj.insert("t".into(), json!("s"));
                        obj.insert("v".into(), json!(""));
                    }
                }
                if let Some(style) = &cell.style {
                    obj.insert("s".into(), style.to_json());
                }
                sheet.insert(cell_address(r, c), Value::Object(obj));
            }
        }

        let width = self.width().max(1);
        let height = self.rows.len().max(1);
        sheet.insert(
            "!ref".into(),
            json!(format!("A1:{}", cell_address(height - 1, width - 1))),
        );
        let merges: Vec<Value> = self
            .merges
            .iter()
            .map(|m| {
                json!({
                    "s": { "r": m.start.0, "c": m.start.1 },
                    "e": { "r": m.end.0, "c": m.end.1 }
                })
            })
            .collect();
        sheet.insert("!merges".into(), Value::Array(merges));
        let cols: Vec<Value> = self.col_widths.iter().map(|w| json!({ "wch": w })).collect();
        sheet.insert("!cols".into(), Value::Array(cols));
        Value::Object(sheet)
    }
}

// ============================================
// Browser side
// ============================================

fn xlsx_global() -> Option<JsValue> {
    let window = web_sys::window()?;
    let xlsx = Reflect::get(&window, &JsValue::from_str("XLSX")).ok()?;
    if xlsx.is_undefined() || xlsx.is_null() {
        None
    } else {
        Some(xlsx)
    }
}

/// Returns the `XLSX` global, injecting the CDN script on first use
pub async fn ensure_loaded() -> Result<JsValue> {
    if let Some(xlsx) = xlsx_global() {
        return Ok(xlsx);
    }

    let url = cdn_url();
    log_info("export", &format!("Loading spreadsheet library from {}", url));
    let document = dom::document()?;
    let script: web_sys::HtmlScriptElement = document
        .create_element("script")
        .map_err(UiError::dom)?
        .dyn_into()
        .map_err(|_| UiError::Dom("script element cast failed".to_string()))?;
    script.set_src(url);

    let loaded = Promise::new(&mut |resolve, reject| {
        script.set_onload(Some(&resolve));
        script.set_onerror(Some(&reject));
    });
    let head = document
        .head()
        .ok_or_else(|| UiError::Dom("document has no head".to_string()))?;
    head.append_child(&script).map_err(UiError::dom)?;

    JsFuture::from(loaded)
        .await
        .map_err(|_| UiError::ExportLibrary(url.to_string()))?;
    xlsx_global().ok_or_else(|| UiError::ExportLibrary(url.to_string()))
}

fn call(target: &JsValue, name: &str, args: &[&JsValue]) -> Result<JsValue> {
    let f: Function = Reflect::get(target, &JsValue::from_str(name))
        .map_err(UiError::dom)?
        .dyn_into()
        .map_err(|_| UiError::Export(format!("XLSX.{} is not a function", name)))?;
    let result = match args {
        [] => f.call0(target),
        [a] => f.call1(target, a),
        [a, b] => f.call2(target, a, b),
        [a, b, c] => f.call3(target, a, b, c),
        _ => return Err(UiError::Export(format!("too many arguments for {}", name))),
    };
    result.map_err(|e| UiError::Export(format!("{:?}", e)))
}

pub async fn write_workbook(sheet: &SheetSpec, filename: &str) -> Result<()> {
    let xlsx = match ensure_loaded().await {
        Ok(xlsx) => xlsx,
        Err(e) => {
            log_error("export", &e.to_string());
            dom::alert(&e.to_string());
            return Err(e);
        }
    };

    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    let worksheet = sheet
        .to_worksheet()
        .serialize(&serializer)
        .map_err(|e| UiError::Export(e.to_string()))?;

    let utils = Reflect::get(&xlsx, &JsValue::from_str("utils")).map_err(UiError::dom)?;
    let workbook = call(&utils, "book_new", &[])?;
    call(
        &utils,
        "book_append_sheet",
        &[&workbook, &worksheet, &JsValue::from_str(&sheet.name)],
    )?;
    call(&xlsx, "writeFile", &[&workbook, &JsValue::from_str(filename)])?;
    log_info("export", &format!("Excel written: {}", filename));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_address() {
        assert_eq!(cell_address(0, 0), "A1");
        assert_eq!(cell_address(4, 25), "Z5");
        assert_eq!(cell_address(4, 27), "AB5");
        assert_eq!(cell_address(9, 701), "ZZ10");
    }

    #[test]
    fn test_worksheet_layout() {
        let sheet = SheetSpec {
            name: "Sheet".to_string(),
            rows: vec![
                vec![Cell::text("Title").styled(CellStyle { bold: true, ..Default::default() })],
                vec![Cell::text("a"), Cell::number(2.5), Cell::empty()],
            ],
            merges: vec![Merge { start: (0, 0), end: (0, 2) }],
            col_widths: vec![30, 12, 12],
        };
        let ws = sheet.to_worksheet();

        assert_eq!(ws["!ref"], "A1:C2");
        assert_eq!(ws["A1"]["s"]["font"]["bold"], true);
        assert_eq!(ws["B2"]["t"], "n");
        assert_eq!(ws["B2"]["v"], 2.5);
        assert!(ws.get("C2").is_none());
        assert_eq!(ws["!merges"][0]["e"]["c"], 2);
        assert_eq!(ws["!cols"][1]["wch"], 12);
    }

    #[test]
    fn test_cdn_url_has_default() {
        assert!(cdn_url().starts_with("https://"));
    }
}
