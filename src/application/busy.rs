// Busy-state guard for action buttons
use crate::application::document::Document;

/// Disables a trigger control and swaps in a busy label for as long as
/// the guard lives. Dropping it re-enables the control and restores the
/// idle label on every exit path.
pub struct BusyButton<'a> {
    document: &'a dyn Document,
    id: String,
    idle_label: String,
}

impl<'a> BusyButton<'a> {
    pub fn engage(document: &'a dyn Document, id: &str, busy_label: &str, idle_label: &str) -> Self {
        document.set_disabled(id, true);
        document.set_text(id, busy_label);
        Self {
            document,
            id: id.to_string(),
            idle_label: idle_label.to_string(),
        }
    }
}

impl Drop for BusyButton<'_> {
    fn drop(&mut self) {
        self.document.set_disabled(&self.id, false);
        self.document.set_text(&self.id, &self.idle_label);
    }
}
