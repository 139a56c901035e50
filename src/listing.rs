//! Turns the raw entry set returned by the store into what the user sees:
//! filter on the `result` field, partition by the parity of the address number,
//! then flatten each entry into labelled lines.

use std::fmt;

use crate::models::{Entry, Field, FieldSet};

/// Sentinel filter value that keeps every entry.
pub const FILTER_ALL: &str = "all";

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Keep the store's order.
    #[default]
    None,
    /// Even address numbers first.
    Even,
    /// Odd address numbers first.
    Odd,
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::None => write!(f, "unsorted"),
            SortMode::Even => write!(f, "even first"),
            SortMode::Odd => write!(f, "odd first"),
        }
    }
}

/// Equality predicate on the `result` field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultFilter {
    #[default]
    All,
    /// Case-sensitive exact match.
    Exact(String),
}

impl ResultFilter {
    /// Interpret a filter selector value; only the literal `"all"` means
    /// no filtering.
    pub fn from_selector(value: &str) -> Self {
        if value == FILTER_ALL {
            ResultFilter::All
        } else {
            ResultFilter::Exact(value.to_string())
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            ResultFilter::All => true,
            ResultFilter::Exact(value) => entry.fields.result == *value,
        }
    }

    /// The selector value this filter corresponds to.
    pub fn selector(&self) -> &str {
        match self {
            ResultFilter::All => FILTER_ALL,
            ResultFilter::Exact(value) => value,
        }
    }
}

/// Sort mode and filter for one refresh.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListView {
    pub sort: SortMode,
    pub filter: ResultFilter,
}

impl ListView {
    /// View produced by the "sort by even/odd" triggers: sorting resets the
    /// filter.
    pub fn sorted(sort: SortMode) -> Self {
        Self {
            sort,
            filter: ResultFilter::All,
        }
    }

    /// View produced by the filter selector: filtering resets the sort.
    pub fn filtered(filter: ResultFilter) -> Self {
        Self {
            sort: SortMode::None,
            filter,
        }
    }
}

/// First maximal run of ASCII digits in `address`, parsed as base 10, or `0`
/// when the address has no digits. Runs that overflow `u64` saturate.
pub fn extract_address_number(address: &str) -> u64 {
    first_digit_run(address)
        .map(|digits| {
            digits.bytes().fold(0u64, |acc, b| {
                acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
            })
        })
        .unwrap_or(0)
}

/// Parity of the address number, read from the last digit of the run so that
/// saturated values still sort correctly.
pub fn address_number_is_even(address: &str) -> bool {
    first_digit_run(address)
        .and_then(|digits| digits.bytes().last())
        .map_or(true, |last| (last - b'0') % 2 == 0)
}

fn first_digit_run(address: &str) -> Option<&str> {
    let start = address.find(|c: char| c.is_ascii_digit())?;
    let rest = &address[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}

/// Apply `view` to `entries`. The parity partition is stable: entries of the
/// same parity keep the store's relative order.
pub fn arrange(entries: Vec<Entry>, view: &ListView) -> Vec<Entry> {
    let mut kept: Vec<Entry> = entries
        .into_iter()
        .filter(|entry| view.filter.matches(entry))
        .collect();

    match view.sort {
        SortMode::None => {}
        SortMode::Even => kept.sort_by_key(|e| !address_number_is_even(&e.fields.address)),
        SortMode::Odd => kept.sort_by_key(|e| address_number_is_even(&e.fields.address)),
    }

    kept
}

/// One entry flattened into `(label, value)` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    /// Delete target for this block.
    pub id: i64,
    pub lines: Vec<(&'static str, String)>,
}

impl RenderedEntry {
    pub fn render(entry: &Entry, field_set: FieldSet) -> Self {
        let lines = field_set
            .fields()
            .iter()
            .map(|&field| (field.label(), entry.display_value(field).to_string()))
            .collect();
        Self {
            id: entry.id,
            lines,
        }
    }

    /// Value rendered for `field`, if the field set shows it.
    pub fn value(&self, field: Field) -> Option<&str> {
        self.lines
            .iter()
            .find(|(label, _)| *label == field.label())
            .map(|(_, value)| value.as_str())
    }
}

/// Everything the list pane needs after a refresh. A new listing replaces the
/// previous one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Listing {
    pub view: ListView,
    pub entries: Vec<RenderedEntry>,
    /// `"all"` followed by every distinct result value in the store, in the
    /// order first seen.
    pub filter_options: Vec<String>,
}

impl Listing {
    /// Build the listing for `view` from the full, unfiltered store contents.
    pub fn build(all: Vec<Entry>, view: ListView, field_set: FieldSet) -> Self {
        let mut filter_options = vec![FILTER_ALL.to_string()];
        for entry in &all {
            if !filter_options.contains(&entry.fields.result) {
                filter_options.push(entry.fields.result.clone());
            }
        }

        let entries = arrange(all, &view)
            .iter()
            .map(|entry| RenderedEntry::render(entry, field_set))
            .collect();

        Self {
            view,
            entries,
            filter_options,
        }
    }

    /// Filter option following the current one, wrapping around.
    pub fn next_filter(&self) -> ResultFilter {
        let current = self.view.filter.selector();
        let next = self
            .filter_options
            .iter()
            .position(|option| option == current)
            .map_or(0, |idx| (idx + 1) % self.filter_options.len());
        self.filter_options
            .get(next)
            .map_or(ResultFilter::All, |option| ResultFilter::from_selector(option))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryFields;

    fn entry(id: i64, address: &str, result: &str) -> Entry {
        Entry {
            id,
            fields: EntryFields {
                name: format!("person {id}"),
                address: address.into(),
                result: result.into(),
                ..EntryFields::default()
            },
        }
    }

    fn ids(entries: &[Entry]) -> Vec<i64> {
        entries.iter().map(|e| e.id).collect()
    }

    #[test]
    fn extracts_first_digit_run() {
        assert_eq!(extract_address_number("12 Main St"), 12);
        assert_eq!(extract_address_number("Main St"), 0);
        assert_eq!(extract_address_number("Apt 4, 221B Baker St"), 4);
        assert_eq!(extract_address_number("007 Bond Rd"), 7);
        assert_eq!(extract_address_number(""), 0);
    }

    #[test]
    fn ignores_non_ascii_digits() {
        assert_eq!(extract_address_number("٣ Cairo St 9"), 9);
    }

    #[test]
    fn huge_runs_saturate_but_keep_parity() {
        let address = "123456789012345678901234567891 Long Rd";
        assert_eq!(extract_address_number(address), u64::MAX);
        assert!(!address_number_is_even(address));
        assert!(address_number_is_even("No number"));
    }

    #[test]
    fn filter_is_case_sensitive() {
        let all = vec![entry(1, "1 A", "Pass"), entry(2, "2 B", "pass"), entry(3, "3 C", "Pass")];
        let view = ListView::filtered(ResultFilter::from_selector("Pass"));
        assert_eq!(ids(&arrange(all, &view)), vec![1, 3]);
    }

    #[test]
    fn all_selector_keeps_everything() {
        let all = vec![entry(1, "1 A", "Pass"), entry(2, "2 B", "Fail")];
        let view = ListView::filtered(ResultFilter::from_selector("all"));
        assert_eq!(ids(&arrange(all, &view)), vec![1, 2]);
    }

    #[test]
    fn even_sort_partitions_stably() {
        let all = vec![
            entry(1, "1 A", "x"),
            entry(2, "2 B", "x"),
            entry(3, "No number", "x"),
            entry(4, "5 C", "x"),
            entry(5, "10 D", "x"),
        ];
        let sorted = arrange(all.clone(), &ListView::sorted(SortMode::Even));
        assert_eq!(ids(&sorted), vec![2, 3, 5, 1, 4]);

        let again = arrange(all, &ListView::sorted(SortMode::Even));
        assert_eq!(sorted, again);
    }

    #[test]
    fn odd_sort_is_the_mirror() {
        let all = vec![
            entry(1, "2 A", "x"),
            entry(2, "3 B", "x"),
            entry(3, "4 C", "x"),
            entry(4, "7 D", "x"),
        ];
        let sorted = arrange(all, &ListView::sorted(SortMode::Odd));
        assert_eq!(ids(&sorted), vec![2, 4, 1, 3]);
    }

    #[test]
    fn no_sort_keeps_store_order() {
        let all = vec![entry(3, "1 A", "x"), entry(1, "2 B", "x"), entry(2, "3 C", "x")];
        assert_eq!(ids(&arrange(all, &ListView::default())), vec![3, 1, 2]);
    }

    #[test]
    fn renders_fields_in_label_order() {
        let mut e = entry(9, "12 Main St", "Pass");
        e.fields.phone = "555".into();
        let rendered = RenderedEntry::render(&e, FieldSet::Basic);
        let labels: Vec<&str> = rendered.lines.iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec!["Name", "Address", "Phone", "Email", "Result"]);
        assert_eq!(rendered.value(Field::Email), Some("N/A"));
        assert_eq!(rendered.value(Field::IdType), None);
        assert_eq!(rendered.id, 9);

        let extended = RenderedEntry::render(&e, FieldSet::Extended);
        assert_eq!(extended.lines.len(), 11);
        assert_eq!(extended.lines[10], ("Result", "Pass".to_string()));
    }

    #[test]
    fn listing_collects_filter_options_from_unfiltered_set() {
        let all = vec![
            entry(1, "1 A", "Pass"),
            entry(2, "2 B", "Fail"),
            entry(3, "3 C", "Pass"),
        ];
        let listing = Listing::build(
            all,
            ListView::filtered(ResultFilter::Exact("Fail".into())),
            FieldSet::Extended,
        );
        assert_eq!(listing.filter_options, vec!["all", "Pass", "Fail"]);
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.next_filter(), ResultFilter::All);
    }

    #[test]
    fn next_filter_cycles_through_options() {
        let listing = Listing::build(
            vec![entry(1, "1 A", "Pass"), entry(2, "2 B", "Fail")],
            ListView::default(),
            FieldSet::Basic,
        );
        assert_eq!(listing.next_filter(), ResultFilter::Exact("Pass".into()));
    }
}
