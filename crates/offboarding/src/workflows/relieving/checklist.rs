use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::RequestId;

/// Department that must sign off before a faculty member is relieved. The declaration order
/// is the fixed reporting order used everywhere a list of categories is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceCategory {
    Academic,
    Library,
    Financial,
    Asset,
}

const ACADEMIC_ITEMS: &[&str] = &[
    "syllabus_completed",
    "internal_marks_uploaded",
    "lab_records_submitted",
];
const LIBRARY_ITEMS: &[&str] = &["books_returned", "fines_paid"];
const FINANCIAL_ITEMS: &[&str] = &["advance_settled", "salary_processed"];
const ASSET_ITEMS: &[&str] = &["laptop_returned", "id_card_returned"];

impl ClearanceCategory {
    pub const fn ordered() -> [Self; 4] {
        [Self::Academic, Self::Library, Self::Financial, Self::Asset]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Academic => "Academic",
            Self::Library => "Library",
            Self::Financial => "Financial",
            Self::Asset => "Asset",
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::Library => "library",
            Self::Financial => "financial",
            Self::Asset => "asset",
        }
    }

    /// Required checklist items for the category.
    pub const fn items(self) -> &'static [&'static str] {
        match self {
            Self::Academic => ACADEMIC_ITEMS,
            Self::Library => LIBRARY_ITEMS,
            Self::Financial => FINANCIAL_ITEMS,
            Self::Asset => ASSET_ITEMS,
        }
    }

    /// Look up a declared item name, rejecting anything outside the category's schema.
    pub fn item(self, name: &str) -> Result<&'static str, ChecklistError> {
        self.items()
            .iter()
            .copied()
            .find(|item| *item == name)
            .ok_or_else(|| ChecklistError::UnknownItem {
                category: self,
                item: name.to_string(),
            })
    }
}

impl fmt::Display for ClearanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ClearanceCategory {
    type Err = ChecklistError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|category| category.key().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ChecklistError::UnknownCategory(value.to_string()))
    }
}

/// Resolved progress of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl CategoryStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChecklistError {
    #[error("'{item}' is not a {category} checklist item")]
    UnknownItem {
        category: ClearanceCategory,
        item: String,
    },
    #[error("unknown clearance category '{0}'")]
    UnknownCategory(String),
}

/// One department's checklist for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceRecord {
    pub request_id: RequestId,
    pub category: ClearanceCategory,
    pub items: BTreeMap<String, bool>,
}

impl ClearanceRecord {
    /// Fresh record with every declared item unchecked.
    pub fn new(request_id: RequestId, category: ClearanceCategory) -> Self {
        let items = category
            .items()
            .iter()
            .map(|item| ((*item).to_string(), false))
            .collect();

        Self {
            request_id,
            category,
            items,
        }
    }

    pub fn set(&mut self, item: &str, value: bool) -> Result<(), ChecklistError> {
        let item = self.category.item(item)?;
        self.items.insert(item.to_string(), value);
        Ok(())
    }

    pub fn status(&self) -> CategoryStatus {
        resolve(self.category, Some(&self.items))
    }

    pub fn progress(&self) -> ItemProgress {
        ItemProgress::count(self.category, Some(&self.items))
    }
}

/// Completed/total counts for a category's declared items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProgress {
    pub completed: usize,
    pub total: usize,
}

impl ItemProgress {
    pub fn count(category: ClearanceCategory, items: Option<&BTreeMap<String, bool>>) -> Self {
        let required = category.items();
        let completed = items.map_or(0, |items| {
            required
                .iter()
                .filter(|item| items.get(**item).copied().unwrap_or(false))
                .count()
        });

        Self {
            completed,
            total: required.len(),
        }
    }
}

/// Declared items for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistSchemaEntry {
    pub category: ClearanceCategory,
    pub category_label: &'static str,
    pub items: Vec<&'static str>,
}

/// The full item schema in fixed category order.
pub fn checklist_schema() -> Vec<ChecklistSchemaEntry> {
    ClearanceCategory::ordered()
        .into_iter()
        .map(|category| ChecklistSchemaEntry {
            category,
            category_label: category.label(),
            items: category.items().to_vec(),
        })
        .collect()
}

/// Map a category's checklist to its status. A missing record or missing keys count as
/// unchecked; keys outside the category's schema are ignored.
pub fn resolve(
    category: ClearanceCategory,
    items: Option<&BTreeMap<String, bool>>,
) -> CategoryStatus {
    let progress = ItemProgress::count(category, items);
    if progress.completed == 0 {
        CategoryStatus::NotStarted
    } else if progress.completed == progress.total {
        CategoryStatus::Completed
    } else {
        CategoryStatus::InProgress
    }
}
