use crate::models::ticket::TicketRow;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Active widget selections. Within one column any selected value matches;
/// across columns every non-empty selection must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub types: Vec<String>,
    pub properties: Vec<String>,
    pub due_dates: Vec<NaiveDate>,
}

fn selected<T: PartialEq>(choices: &[T], value: Option<&T>) -> bool {
    choices.is_empty() || value.is_some_and(|v| choices.contains(v))
}

impl FilterSelection {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.properties.is_empty() && self.due_dates.is_empty()
    }

    pub fn matches(&self, row: &TicketRow) -> bool {
        selected(&self.types, row.kind.as_ref())
            && selected(&self.properties, row.property.as_ref())
            && selected(&self.due_dates, row.due_date.as_ref())
    }

    /// Rows that pass every active filter, in their original order.
    pub fn apply(&self, rows: &[TicketRow]) -> Vec<TicketRow> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Option lists offered by the three widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub types: Vec<String>,
    pub properties: Vec<String>,
    pub due_dates: Vec<NaiveDate>,
}

impl FilterOptions {
    /// Sorted distinct non-null values. Callers pass the unfiltered rows so
    /// the lists never shrink with the selection.
    pub fn from_rows(rows: &[TicketRow]) -> Self {
        let types: BTreeSet<&String> = rows.iter().filter_map(|r| r.kind.as_ref()).collect();
        let properties: BTreeSet<&String> =
            rows.iter().filter_map(|r| r.property.as_ref()).collect();
        let due_dates: BTreeSet<NaiveDate> = rows.iter().filter_map(|r| r.due_date).collect();

        Self {
            types: types.into_iter().cloned().collect(),
            properties: properties.into_iter().cloned().collect(),
            due_dates: due_dates.into_iter().collect(),
        }
    }
}
