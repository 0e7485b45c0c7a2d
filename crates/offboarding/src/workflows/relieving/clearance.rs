use std::collections::BTreeMap;

use serde::Serialize;

use super::checklist::{resolve, CategoryStatus, ClearanceCategory, ClearanceRecord, ItemProgress};

/// Readiness of a request across all four departments, computed from the records as read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearanceSummary {
    pub per_category: BTreeMap<ClearanceCategory, CategoryStatus>,
    pub all_complete: bool,
    pub missing: Vec<ClearanceCategory>,
}

impl ClearanceSummary {
    pub fn status_of(&self, category: ClearanceCategory) -> CategoryStatus {
        self.per_category
            .get(&category)
            .copied()
            .unwrap_or(CategoryStatus::NotStarted)
    }
}

/// Combine whatever records exist for a request into a summary. Categories without a record
/// resolve to `NotStarted`; if more than one record is supplied for a category the last wins.
pub fn aggregate(records: &[ClearanceRecord]) -> ClearanceSummary {
    let by_category: BTreeMap<ClearanceCategory, &ClearanceRecord> = records
        .iter()
        .map(|record| (record.category, record))
        .collect();

    let per_category: BTreeMap<ClearanceCategory, CategoryStatus> = ClearanceCategory::ordered()
        .into_iter()
        .map(|category| {
            let items = by_category.get(&category).map(|record| &record.items);
            (category, resolve(category, items))
        })
        .collect();

    let missing: Vec<ClearanceCategory> = per_category
        .iter()
        .filter(|(_, status)| **status != CategoryStatus::Completed)
        .map(|(category, _)| *category)
        .collect();

    ClearanceSummary {
        all_complete: missing.is_empty(),
        per_category,
        missing,
    }
}

/// Item-level view of one category for detail screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryChecklistView {
    pub category: ClearanceCategory,
    pub category_label: &'static str,
    pub status: CategoryStatus,
    pub status_label: &'static str,
    pub completed: usize,
    pub total: usize,
    pub items: BTreeMap<String, bool>,
}

/// Build the four category views in fixed order, filling unchecked items for absent records.
pub fn checklist_views(records: &[ClearanceRecord]) -> Vec<CategoryChecklistView> {
    ClearanceCategory::ordered()
        .into_iter()
        .map(|category| {
            let record = records
                .iter()
                .rev()
                .find(|record| record.category == category);
            let items: BTreeMap<String, bool> = category
                .items()
                .iter()
                .map(|item| {
                    let value = record
                        .and_then(|record| record.items.get(*item).copied())
                        .unwrap_or(false);
                    ((*item).to_string(), value)
                })
                .collect();
            let ItemProgress { completed, total } = ItemProgress::count(category, Some(&items));
            let status = resolve(category, Some(&items));

            CategoryChecklistView {
                category,
                category_label: category.label(),
                status,
                status_label: status.label(),
                completed,
                total,
                items,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::relieving::domain::RequestId;

    fn record(category: ClearanceCategory, values: &[bool]) -> ClearanceRecord {
        let mut record = ClearanceRecord::new(RequestId("rel-test".to_string()), category);
        for (item, value) in category.items().iter().zip(values) {
            record.set(item, *value).expect("declared item");
        }
        record
    }

    #[test]
    fn single_incomplete_category_is_reported() {
        let records = vec![
            record(ClearanceCategory::Academic, &[true, true, true]),
            record(ClearanceCategory::Library, &[true, true]),
            record(ClearanceCategory::Financial, &[false, true]),
            record(ClearanceCategory::Asset, &[true, true]),
        ];

        let summary = aggregate(&records);

        assert!(!summary.all_complete);
        assert_eq!(summary.missing, vec![ClearanceCategory::Financial]);
        assert_eq!(
            summary.status_of(ClearanceCategory::Financial),
            CategoryStatus::InProgress
        );
    }

    #[test]
    fn no_records_means_everything_outstanding() {
        let summary = aggregate(&[]);

        assert!(!summary.all_complete);
        assert_eq!(summary.missing, ClearanceCategory::ordered().to_vec());
        assert!(summary
            .per_category
            .values()
            .all(|status| *status == CategoryStatus::NotStarted));
        assert_eq!(summary.per_category.len(), 4);
    }

    #[test]
    fn missing_keeps_fixed_order_regardless_of_input_order() {
        let records = vec![
            record(ClearanceCategory::Asset, &[true, false]),
            record(ClearanceCategory::Library, &[true, true]),
        ];

        let summary = aggregate(&records);

        assert_eq!(
            summary.missing,
            vec![
                ClearanceCategory::Academic,
                ClearanceCategory::Financial,
                ClearanceCategory::Asset,
            ]
        );
    }

    #[test]
    fn all_items_checked_is_complete() {
        let records: Vec<_> = ClearanceCategory::ordered()
            .into_iter()
            .map(|category| record(category, &vec![true; category.items().len()]))
            .collect();

        let summary = aggregate(&records);

        assert!(summary.all_complete);
        assert!(summary.missing.is_empty());
    }

    #[test]
    fn checklist_views_fill_absent_records() {
        let views = checklist_views(&[record(ClearanceCategory::Library, &[true, false])]);

        assert_eq!(views.len(), 4);
        assert_eq!(views[0].category, ClearanceCategory::Academic);
        assert_eq!(views[0].items.len(), 3);
        assert_eq!(views[0].status, CategoryStatus::NotStarted);
        assert_eq!(views[1].completed, 1);
        assert_eq!(views[1].total, 2);
        assert_eq!(views[1].status_label, "In Progress");
    }
}
