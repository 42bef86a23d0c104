use super::AnomalyController;
use crate::egui_app::state::NavigationError;

impl AnomalyController {
    /// Open the detail view for row `index`.
    ///
    /// Requires rows to be loaded and `index` to be in range; otherwise the
    /// navigation state is left as it was.
    pub fn select_row(&mut self, index: usize) -> Result<(), NavigationError> {
        let loaded_rows = self
            .pipeline
            .phase
            .dataset_loaded()
            .then(|| self.view.row_count());
        self.view.navigation_mut().select(index, loaded_rows)
    }

    /// Return to the table, keeping the selected index.
    pub fn close_detail(&mut self) {
        self.view.navigation_mut().close();
    }
}
