use chrono::NaiveDate;

use super::time::month_start;

/// Calendar UI selection: the selected day and the month being displayed.
///
/// The two are independent. Any date is accepted; `None` means nothing is
/// selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    selected_date: Option<NaiveDate>,
    display_month: NaiveDate,
}

impl SelectionState {
    /// Starts with `initial` selected and its month displayed.
    pub fn new(initial: NaiveDate) -> Self {
        Self {
            selected_date: Some(initial),
            display_month: month_start(initial),
        }
    }

    /// Starts with no selection, displaying the month containing `month`.
    pub fn unselected(month: NaiveDate) -> Self {
        Self {
            selected_date: None,
            display_month: month_start(month),
        }
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    /// Always the first day of a month.
    pub fn display_month(&self) -> NaiveDate {
        self.display_month
    }

    /// Sets the selection unconditionally.
    pub fn select_date(&mut self, date: Option<NaiveDate>) {
        self.selected_date = date;
    }

    /// Displays the month containing `date`. The selection is left alone.
    pub fn change_month(&mut self, date: NaiveDate) {
        self.display_month = month_start(date);
    }
}
