//! Time-ordered trace log for component events
//! Keeps the most recent entries in memory and mirrors them to the console

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const MAX_LOG_ENTRIES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub category: String, // "comparison-table", "clipboard", "export", ...
    pub message: String,
    pub data: Option<serde_json::Value>,
}

pub struct LogTrace {
    logs: VecDeque<LogEntry>,
}

impl Default for LogTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl LogTrace {
    pub fn new() -> Self {
        LogTrace {
            logs: VecDeque::with_capacity(MAX_LOG_ENTRIES),
        }
    }

    pub fn log(&mut self, level: LogLevel, category: &str, message: &str, data: Option<serde_json::Value>) {
        let entry = LogEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level,
            category: category.to_string(),
            message: message.to_string(),
            data,
        };

        write_console(level, &format!("[{}] {}", category, message));

        if self.logs.len() >= MAX_LOG_ENTRIES {
            self.logs.pop_front();
        }
        self.logs.push_back(entry);
    }

    pub fn get_logs(&self) -> Vec<LogEntry> {
        self.logs.iter().cloned().collect()
    }

    pub fn get_logs_json(&self) -> String {
        let logs: Vec<&LogEntry> = self.logs.iter().collect();
        serde_json::to_string_pretty(&logs).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn clear(&mut self) {
        self.logs.clear();
    }
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: LogLevel, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        LogLevel::Error => web_sys::console::error_1(&value),
        LogLevel::Warn => web_sys::console::warn_1(&value),
        LogLevel::Debug => web_sys::console::debug_1(&value),
        LogLevel::Info => web_sys::console::log_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(level: LogLevel, line: &str) {
    if level == LogLevel::Error || level == LogLevel::Warn {
        eprintln!("{}", line);
    }
}

// Global trace instance
thread_local! {
    static LOG_TRACE: std::cell::RefCell<LogTrace> = std::cell::RefCell::new(LogTrace::new());
}

pub fn log_debug(category: &str, message: &str) {
    LOG_TRACE.with(|trace| trace.borrow_mut().log(LogLevel::Debug, category, message, None));
}

pub fn log_info(category: &str, message: &str) {
    LOG_TRACE.with(|trace| trace.borrow_mut().log(LogLevel::Info, category, message, None));
}

pub fn log_info_with_data(category: &str, message: &str, data: serde_json::Value) {
    LOG_TRACE.with(|trace| trace.borrow_mut().log(LogLevel::Info, category, message, Some(data)));
}

pub fn log_warn(category: &str, message: &str) {
    LOG_TRACE.with(|trace| trace.borrow_mut().log(LogLevel::Warn, category, message, None));
}

pub fn log_error(category: &str, message: &str) {
    LOG_TRACE.with(|trace| trace.borrow_mut().log(LogLevel::Error, category, message, None));
}

pub fn log_error_with_data(category: &str, message: &str, data: serde_json::Value) {
    LOG_TRACE.with(|trace| trace.borrow_mut().log(LogLevel::Error, category, message, Some(data)));
}

pub fn get_logs_json() -> String {
    LOG_TRACE.with(|trace| trace.borrow().get_logs_json())
}

pub fn clear_logs() {
    LOG_TRACE.with(|trace| trace.borrow_mut().clear());
}

/// Downloads the current trace as a JSON file
pub fn download_logs() -> crate::error::Result<()> {
    let json_str = get_logs_json();
    let filename = format!(
        "log_trace_{}.json",
        chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S")
    );
    crate::utils::dom::download_text(&json_str, "application/json", &filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_drops_oldest() {
        let mut trace = LogTrace::new();
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            trace.log(LogLevel::Debug, "test", &format!("entry {}", i), None);
        }
        assert_eq!(trace.len(), MAX_LOG_ENTRIES);
        assert_eq!(trace.get_logs()[0].message, "entry 5");
    }

    #[test]
    fn test_json_dump_contains_level_and_data() {
        let mut trace = LogTrace::new();
        trace.log(
            LogLevel::Warn,
            "comparison-table",
            "rate missing",
            Some(serde_json::json!({ "currency": "GBP" })),
        );
        let json = trace.get_logs_json();
        assert!(json.contains("\"level\": \"warn\""));
        assert!(json.contains("\"currency\": \"GBP\""));
    }
}
