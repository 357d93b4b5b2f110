//! Filter/sort/paginate computation

use std::cmp::Ordering;

use crate::model::FieldPath;
use crate::model::Record;
use crate::model::Value;

use super::ColumnDescriptor;
use super::SearchPolicy;
use super::SortOrder;
use super::ViewState;

/// One computed table view: the rows to show plus pagination totals.
///
/// Borrows the records it was computed from; nothing is cloned.
#[derive(Debug)]
pub struct TableSnapshot<'a> {
    /// The rows visible on the current page, in display order.
    pub rows: Vec<&'a Record>,
    /// Number of records that survived the filter.
    pub total_count: usize,
    /// Total number of pages, at least 1.
    pub total_pages: usize,
    /// The page this snapshot was computed for.
    pub page: usize,
}

/// Derives a filtered, sorted, paginated view from an in-memory
/// collection.
///
/// `compute` is a pure function of the records, the view state and this
/// model's configuration: no hidden state, no side effects, O(n log n)
/// per call dominated by the sort. Missing fields, empty input and
/// incomparable sort values all degrade gracefully instead of erroring.
///
/// # Example
///
/// ```
/// use medidesk_lib::model::Record;
/// use medidesk_lib::table::{ColumnDescriptor, TableViewModel, ViewState};
///
/// let records = vec![
///     Record::new("patients").set("name", "Bob").set("age", 40i64),
///     Record::new("patients").set("name", "Al").set("age", 30i64),
/// ];
///
/// let model = TableViewModel::new(
///     vec![ColumnDescriptor::new("name", "Name")],
///     10,
/// );
/// let mut state = ViewState::new();
/// state.toggle_sort("age");
///
/// let snapshot = model.compute(&records, &state);
/// assert_eq!(snapshot.rows[0].get_string("name").unwrap(), Some("Al"));
/// ```
#[derive(Debug, Clone)]
pub struct TableViewModel {
    /// The columns this table renders.
    pub columns: Vec<ColumnDescriptor>,
    /// Rows per page. Zero is normalized to 1.
    pub page_size: usize,
    /// Which fields the search term matches against.
    pub search: SearchPolicy,
}

impl TableViewModel {
    /// Creates a view-model with the default all-fields search policy.
    pub fn new(columns: Vec<ColumnDescriptor>, page_size: usize) -> Self {
        Self {
            columns,
            page_size: page_size.max(1),
            search: SearchPolicy::default(),
        }
    }

    /// Replaces the search policy.
    pub fn search_policy(mut self, policy: SearchPolicy) -> Self {
        self.search = policy;
        self
    }

    /// Computes the visible rows for the given records and view state.
    pub fn compute<'a>(&self, records: &'a [Record], state: &ViewState) -> TableSnapshot<'a> {
        let mut rows = filter(records, &state.search_term, &self.search);
        sort(&mut rows, state.sort_key.as_ref(), state.sort_order);

        let total_count = rows.len();
        let (rows, total_pages) = paginate(rows, state.current_page, self.page_size);

        TableSnapshot {
            rows,
            total_count,
            total_pages,
            page: state.current_page,
        }
    }

    /// Renders one record as a row of display strings, one per column.
    pub fn render_row(&self, record: &Record) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| {
                let value = column.key.resolve(record);
                column.render_value(value.as_deref())
            })
            .collect()
    }
}

/// Keeps the records matching `term` under the given policy.
///
/// An empty term keeps everything, in order.
pub fn filter<'a>(
    records: &'a [Record],
    term: &str,
    policy: &SearchPolicy,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| policy.matches(record, term))
        .collect()
}

/// Sorts rows by the value at `sort_key`, stably.
///
/// With no key the filtered order is preserved. Values are compared with
/// [`Value::compare`]; rows where the key is missing on either side count
/// as equal, so the stable sort keeps their prior relative order.
pub fn sort(rows: &mut [&Record], sort_key: Option<&FieldPath>, order: SortOrder) {
    let Some(key) = sort_key else {
        return;
    };

    rows.sort_by(|a, b| {
        let ordering = compare_at(a, b, key);
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

fn compare_at(a: &Record, b: &Record, key: &FieldPath) -> Ordering {
    match (key.resolve(a), key.resolve(b)) {
        (Some(va), Some(vb)) => Value::compare(&va, &vb),
        // Missing on either side: incomparable, stable order wins.
        _ => Ordering::Equal,
    }
}

/// Cuts rows into the requested page.
///
/// Returns the slice `[(page-1)*size, page*size)` and the total page
/// count, which is at least 1 even for empty input. A page past the end
/// yields an empty slice; the stored page number is never clamped here.
pub fn paginate(rows: Vec<&Record>, page: usize, page_size: usize) -> (Vec<&Record>, usize) {
    let page_size = page_size.max(1);
    let total_pages = rows.len().div_ceil(page_size).max(1);

    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size);
    let visible = rows
        .into_iter()
        .skip(start)
        .take(page_size)
        .collect();

    (visible, total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::MISSING_PLACEHOLDER;

    fn patient(name: &str, age: i64) -> Record {
        Record::new("patients").set("name", name).set("age", age)
    }

    fn sample() -> Vec<Record> {
        vec![patient("Bob", 40), patient("Al", 30), patient("Cy", 30)]
    }

    fn names(rows: &[&Record]) -> Vec<String> {
        rows.iter()
            .map(|r| r.get_string("name").unwrap().unwrap().to_string())
            .collect()
    }

    fn model(page_size: usize) -> TableViewModel {
        TableViewModel::new(
            vec![
                ColumnDescriptor::new("name", "Name"),
                ColumnDescriptor::new("age", "Age"),
            ],
            page_size,
        )
    }

    #[test]
    fn empty_search_is_identity() {
        let records = sample();
        let rows = filter(&records, "", &SearchPolicy::all_fields());
        assert_eq!(names(&rows), vec!["Bob", "Al", "Cy"]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let records = sample();
        let rows = filter(&records, "BOB", &SearchPolicy::all_fields());
        assert_eq!(names(&rows), vec!["Bob"]);

        // Numbers match through their string form.
        let rows = filter(&records, "30", &SearchPolicy::all_fields());
        assert_eq!(names(&rows), vec!["Al", "Cy"]);
    }

    #[test]
    fn selected_policy_limits_scope() {
        let records = sample();
        let rows = filter(&records, "bob", &SearchPolicy::fields(["age"]));
        assert!(rows.is_empty());
    }

    #[test]
    fn sort_by_age_keeps_ties_in_input_order() {
        let records = sample();
        let mut rows: Vec<&Record> = records.iter().collect();
        let key = FieldPath::new("age");

        sort(&mut rows, Some(&key), SortOrder::Ascending);
        assert_eq!(names(&rows), vec!["Al", "Cy", "Bob"]);

        let mut rows: Vec<&Record> = records.iter().collect();
        sort(&mut rows, Some(&key), SortOrder::Descending);
        // Descending flips the comparator only; Al/Cy stay in input order.
        assert_eq!(names(&rows), vec!["Bob", "Al", "Cy"]);
    }

    #[test]
    fn no_sort_key_preserves_order() {
        let records = sample();
        let mut rows: Vec<&Record> = records.iter().collect();
        sort(&mut rows, None, SortOrder::Descending);
        assert_eq!(names(&rows), vec!["Bob", "Al", "Cy"]);
    }

    #[test]
    fn incomparable_sort_values_fall_back_to_stable_order() {
        let records = vec![
            Record::new("patients").set("name", "Bob").set("age", "n/a"),
            patient("Al", 30),
            Record::new("patients").set("name", "Cy"),
        ];
        let mut rows: Vec<&Record> = records.iter().collect();
        let key = FieldPath::new("age");
        sort(&mut rows, Some(&key), SortOrder::Ascending);
        assert_eq!(names(&rows), vec!["Bob", "Al", "Cy"]);
    }

    #[test]
    fn paginate_slices_and_counts() {
        let records = sample();
        let rows: Vec<&Record> = records.iter().collect();

        let (page2, total_pages) = paginate(rows, 2, 2);
        assert_eq!(total_pages, 2);
        assert_eq!(names(&page2), vec!["Cy"]);
    }

    #[test]
    fn paginate_partitions_without_loss_or_duplication() {
        let records: Vec<Record> = (0..7).map(|i| patient(&format!("p{i}"), i)).collect();
        let page_size = 3;

        let all: Vec<&Record> = records.iter().collect();
        let (_, total_pages) = paginate(all.clone(), 1, page_size);
        assert_eq!(total_pages, 3);

        let mut seen = Vec::new();
        for page in 1..=total_pages {
            let (rows, _) = paginate(all.clone(), page, page_size);
            assert!(rows.len() <= page_size);
            seen.extend(names(&rows));
        }
        assert_eq!(seen, names(&all));
    }

    #[test]
    fn page_past_the_end_is_empty_not_an_error() {
        let records = sample();
        let rows: Vec<&Record> = records.iter().collect();
        let (visible, total_pages) = paginate(rows, 9, 2);
        assert_eq!(total_pages, 2);
        assert!(visible.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_page_and_one_total_page() {
        let (visible, total_pages) = paginate(Vec::new(), 1, 10);
        assert!(visible.is_empty());
        assert_eq!(total_pages, 1);
    }

    #[test]
    fn zero_page_size_is_normalized() {
        let records = sample();
        let rows: Vec<&Record> = records.iter().collect();
        let (visible, total_pages) = paginate(rows, 1, 0);
        assert_eq!(visible.len(), 1);
        assert_eq!(total_pages, 3);
    }

    #[test]
    fn compute_is_deterministic() {
        let records = sample();
        let model = model(2);
        let mut state = ViewState::new();
        state.set_search("3");
        state.toggle_sort("age");
        state.set_page(1);

        let first = model.compute(&records, &state);
        let second = model.compute(&records, &state);
        assert_eq!(names(&first.rows), names(&second.rows));
        assert_eq!(first.total_pages, second.total_pages);
        assert_eq!(first.total_count, second.total_count);
    }

    #[test]
    fn compute_composes_filter_sort_paginate() {
        let records = sample();
        let model = model(2);
        let mut state = ViewState::new();
        state.toggle_sort("age");
        state.set_page(2);

        let snapshot = model.compute(&records, &state);
        assert_eq!(snapshot.total_count, 3);
        assert_eq!(snapshot.total_pages, 2);
        assert_eq!(names(&snapshot.rows), vec!["Bob"]);
    }

    #[test]
    fn page_survives_search_change() {
        let mut state = ViewState::new();
        state.set_page(3);
        state.set_search("cardio");
        state.toggle_sort("name");
        assert_eq!(state.current_page, 3);
    }

    #[test]
    fn toggle_sort_cycles_direction() {
        let mut state = ViewState::new();
        state.toggle_sort("age");
        assert_eq!(state.sort_order, SortOrder::Ascending);
        state.toggle_sort("age");
        assert_eq!(state.sort_order, SortOrder::Descending);
        state.toggle_sort("name");
        assert_eq!(state.sort_key, Some(FieldPath::new("name")));
        assert_eq!(state.sort_order, SortOrder::Ascending);
    }

    #[test]
    fn missing_column_renders_placeholder() {
        let record = Record::new("patients").set("name", "Al");
        let model = TableViewModel::new(
            vec![
                ColumnDescriptor::new("name", "Name"),
                ColumnDescriptor::new("department.name", "Department"),
            ],
            10,
        );
        let row = model.render_row(&record);
        assert_eq!(row, vec!["Al".to_string(), MISSING_PLACEHOLDER.to_string()]);
    }

    #[test]
    fn custom_renderer_sees_missing_values() {
        let record = Record::new("patients").set("name", "Al");
        let column = ColumnDescriptor::new("age", "Age")
            .render_with(|value| match value {
                Some(v) => format!("{} yrs", v.display_string()),
                None => "unknown".to_string(),
            });
        assert_eq!(column.render_value(column.key.resolve(&record).as_deref()), "unknown");
    }

    #[test]
    fn nested_sort_key_resolves_through_records() {
        let records = vec![
            Record::new("staff")
                .set("name", "Bea")
                .set("department", Record::new("departments").set("name", "Surgery")),
            Record::new("staff")
                .set("name", "Ada")
                .set("department", Record::new("departments").set("name", "Cardiology")),
        ];
        let mut rows: Vec<&Record> = records.iter().collect();
        let key = FieldPath::new("department.name");
        sort(&mut rows, Some(&key), SortOrder::Ascending);
        assert_eq!(names(&rows), vec!["Ada", "Bea"]);
    }
}
