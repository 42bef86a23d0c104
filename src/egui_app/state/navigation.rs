//! Table/detail drill-down state.

/// Which of the two views is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Table,
    Detail,
}

/// Selection on an unloaded store or outside it. Handled as a no-op by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("No rows are loaded yet")]
    NotReady,
    #[error("Row {index} is out of range for {len} rows")]
    OutOfRange { index: usize, len: usize },
}

/// `selected_record_index` is only read while `mode` is `Detail`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub mode: ViewMode,
    pub selected_record_index: usize,
}

impl NavigationState {
    /// Enter the detail view for `index`; `loaded_rows` is `None` until rows load.
    /// State is untouched on error.
    pub fn select(
        &mut self,
        index: usize,
        loaded_rows: Option<usize>,
    ) -> Result<(), NavigationError> {
        let len = loaded_rows.ok_or(NavigationError::NotReady)?;
        if index >= len {
            return Err(NavigationError::OutOfRange { index, len });
        }
        self.mode = ViewMode::Detail;
        self.selected_record_index = index;
        Ok(())
    }

    /// Return to the table, keeping the last selection.
    pub fn close(&mut self) {
        self.mode = ViewMode::Table;
    }

    /// Selected index while the detail view is open.
    pub fn detail_index(&self) -> Option<usize> {
        (self.mode == ViewMode::Detail).then_some(self.selected_record_index)
    }
}
