//! Presentation contracts
//!
//! The screen never renders anything itself. It talks to the host UI through
//! these traits, implemented by the platform layer over FFI or by the
//! in-memory types in [`crate::memory`].

use std::sync::Arc;

/// Static description of a preference row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceSpec {
    /// Preference key
    pub key: &'static str,
    /// Row title
    pub title: &'static str,
    /// Adapter position of the row
    pub order: usize,
}

/// A preference row able to show a summary line
pub trait SummaryPreference: Send + Sync {
    /// Adapter position of the row
    fn order(&self) -> usize;

    /// Replace the summary line
    fn set_summary(&self, summary: &str);
}

/// A row currently materialised by the list
pub trait RowHandle {
    /// Force a redraw of the row
    fn invalidate(&self);
}

/// Scrollable, possibly recycling, list of preference rows
pub trait ListContainer: Send + Sync {
    /// Row bound to `position`, or `None` when it is not materialised
    fn find_row_for_position(&self, position: usize) -> Option<Box<dyn RowHandle + '_>>;
}

/// Screen host: owns the preference rows and the list rendering them
pub trait PreferenceHost: Send + Sync {
    /// Set the activity title
    fn set_title(&self, title: &str);

    /// Inflate preference rows
    fn add_preferences(&self, preferences: &[PreferenceSpec]);

    /// Look up an inflated row by key
    fn find_preference(&self, key: &str) -> Option<Arc<dyn SummaryPreference>>;

    /// List rendering the rows
    fn list_container(&self) -> Arc<dyn ListContainer>;
}
