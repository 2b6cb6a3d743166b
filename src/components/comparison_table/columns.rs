//! Column keys of the comparison grid

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnKey {
    #[serde(rename = "item")]
    Item,
    #[serde(rename = "job_no")]
    JobNo,
    #[serde(rename = "quantity")]
    Quantity,
    #[serde(rename = "unit")]
    Unit,
    #[serde(rename = "unitPrice")]
    UnitPrice,
    #[serde(rename = "deliveryDays")]
    DeliveryDays,
    #[serde(rename = "originalTotal")]
    OriginalTotal,
    #[serde(rename = "euroTotal")]
    EuroTotal,
    #[serde(rename = "recommendations")]
    Recommendations,
}

pub const GENERAL_COLUMNS: [ColumnKey; 4] = [
    ColumnKey::Item,
    ColumnKey::JobNo,
    ColumnKey::Quantity,
    ColumnKey::Unit,
];

pub const SUPPLIER_COLUMNS: [ColumnKey; 5] = [
    ColumnKey::UnitPrice,
    ColumnKey::DeliveryDays,
    ColumnKey::OriginalTotal,
    ColumnKey::EuroTotal,
    ColumnKey::Recommendations,
];

impl ColumnKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKey::Item => "item",
            ColumnKey::JobNo => "job_no",
            ColumnKey::Quantity => "quantity",
            ColumnKey::Unit => "unit",
            ColumnKey::UnitPrice => "unitPrice",
            ColumnKey::DeliveryDays => "deliveryDays",
            ColumnKey::OriginalTotal => "originalTotal",
            ColumnKey::EuroTotal => "euroTotal",
            ColumnKey::Recommendations => "recommendations",
        }
    }

    /// Accepts the key form (`euroTotal`) and the option-suffix form (`EuroTotal`)
    pub fn parse(s: &str) -> Option<ColumnKey> {
        let all = GENERAL_COLUMNS.iter().chain(SUPPLIER_COLUMNS.iter());
        for key in all {
            let name = key.as_str();
            if name == s {
                return Some(*key);
            }
            let mut chars = name.chars();
            if let Some(first) = chars.next() {
                let pascal: String = first.to_uppercase().chain(chars).collect();
                if pascal == s {
                    return Some(*key);
                }
            }
        }
        None
    }

    pub fn is_general(&self) -> bool {
        GENERAL_COLUMNS.contains(self)
    }

    /// Header label
    pub fn label(&self) -> &'static str {
        match self {
            ColumnKey::Item => "Malzeme",
            ColumnKey::JobNo => "İş No",
            ColumnKey::Quantity => "Miktar",
            ColumnKey::Unit => "Birim",
            ColumnKey::UnitPrice => "Birim Fiyat",
            ColumnKey::DeliveryDays => "Teslim",
            ColumnKey::OriginalTotal => "Toplam",
            ColumnKey::EuroTotal => "Euro Toplam",
            ColumnKey::Recommendations => "Öneriler",
        }
    }

    /// Rotated label shown while the column is minimized
    pub fn short_label(&self) -> &'static str {
        match self {
            ColumnKey::EuroTotal => "Euro",
            ColumnKey::Recommendations => "Öner",
            other => other.label(),
        }
    }

    pub fn icon(&self) -> Option<&'static str> {
        match self {
            ColumnKey::Item => Some("fa-box"),
            ColumnKey::JobNo => Some("fa-tag"),
            ColumnKey::Quantity => Some("fa-hashtag"),
            ColumnKey::Unit => Some("fa-ruler"),
            ColumnKey::UnitPrice => Some("fa-tag"),
            ColumnKey::DeliveryDays => Some("fa-clock"),
            ColumnKey::OriginalTotal => None,
            ColumnKey::EuroTotal => Some("fa-euro-sign"),
            ColumnKey::Recommendations => Some("fa-star"),
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn default_column_order() -> Vec<ColumnKey> {
    SUPPLIER_COLUMNS.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_both_forms() {
        assert_eq!(ColumnKey::parse("euroTotal"), Some(ColumnKey::EuroTotal));
        assert_eq!(ColumnKey::parse("EuroTotal"), Some(ColumnKey::EuroTotal));
        assert_eq!(ColumnKey::parse("job_no"), Some(ColumnKey::JobNo));
        assert_eq!(ColumnKey::parse("price"), None);
    }

    #[test]
    fn test_serde_names_match_keys() {
        for key in GENERAL_COLUMNS.iter().chain(SUPPLIER_COLUMNS.iter()) {
            let json = serde_json::to_string(key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
        }
    }
}
