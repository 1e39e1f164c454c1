//! In-memory presentation layer
//!
//! Headless implementations of the view contracts, used by the settings
//! harness and by tests. [`VirtualizedList`] behaves like a recycling list:
//! only rows inside the viewport are materialised.

use crate::view::{ListContainer, PreferenceHost, PreferenceSpec, RowHandle, SummaryPreference};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Preference row holding its summary in memory
pub struct MemoryPreference {
    key: String,
    title: String,
    order: usize,
    summary: Mutex<Option<String>>,
    summary_updates: AtomicUsize,
}

impl MemoryPreference {
    /// Create a row from its static description
    pub fn new(spec: &PreferenceSpec) -> Self {
        Self {
            key: spec.key.to_string(),
            title: spec.title.to_string(),
            order: spec.order,
            summary: Mutex::new(None),
            summary_updates: AtomicUsize::new(0),
        }
    }

    /// Row title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Current summary line
    pub fn summary(&self) -> Option<String> {
        self.summary.lock().clone()
    }

    /// Number of `set_summary` calls
    pub fn summary_updates(&self) -> usize {
        self.summary_updates.load(Ordering::SeqCst)
    }
}

impl SummaryPreference for MemoryPreference {
    fn order(&self) -> usize {
        self.order
    }

    fn set_summary(&self, summary: &str) {
        *self.summary.lock() = Some(summary.to_string());
        self.summary_updates.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy)]
struct Viewport {
    first: usize,
    len: usize,
}

/// Recycling list with a movable viewport
pub struct VirtualizedList {
    row_count: AtomicUsize,
    viewport: Mutex<Viewport>,
    invalidations: Mutex<HashMap<usize, usize>>,
    lookups: AtomicUsize,
}

impl VirtualizedList {
    /// List showing `visible_rows` rows starting at the top
    pub fn new(visible_rows: usize) -> Self {
        Self {
            row_count: AtomicUsize::new(0),
            viewport: Mutex::new(Viewport {
                first: 0,
                len: visible_rows,
            }),
            invalidations: Mutex::new(HashMap::new()),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Set the number of adapter rows
    pub fn set_row_count(&self, rows: usize) {
        self.row_count.store(rows, Ordering::SeqCst);
    }

    /// Scroll so that `first` is the top visible row
    pub fn scroll_to(&self, first: usize) {
        self.viewport.lock().first = first;
    }

    /// Whether the row at `position` is materialised
    pub fn is_attached(&self, position: usize) -> bool {
        let viewport = *self.viewport.lock();
        position < self.row_count.load(Ordering::SeqCst)
            && position >= viewport.first
            && position < viewport.first + viewport.len
    }

    /// Redraws forced on the row at `position`
    pub fn invalidations(&self, position: usize) -> usize {
        self.invalidations
            .lock()
            .get(&position)
            .copied()
            .unwrap_or(0)
    }

    /// Number of `find_row_for_position` calls
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

struct MemoryRow<'a> {
    list: &'a VirtualizedList,
    position: usize,
}

impl RowHandle for MemoryRow<'_> {
    fn invalidate(&self) {
        *self
            .list
            .invalidations
            .lock()
            .entry(self.position)
            .or_insert(0) += 1;
    }
}

impl ListContainer for VirtualizedList {
    fn find_row_for_position(&self, position: usize) -> Option<Box<dyn RowHandle + '_>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if !self.is_attached(position) {
            return None;
        }
        Some(Box::new(MemoryRow {
            list: self,
            position,
        }))
    }
}

/// Headless preference host
pub struct InMemoryPreferenceHost {
    title: Mutex<Option<String>>,
    preferences: Mutex<Vec<Arc<MemoryPreference>>>,
    list: Arc<VirtualizedList>,
}

impl InMemoryPreferenceHost {
    /// Host whose list shows `visible_rows` rows
    pub fn new(visible_rows: usize) -> Self {
        Self {
            title: Mutex::new(None),
            preferences: Mutex::new(Vec::new()),
            list: Arc::new(VirtualizedList::new(visible_rows)),
        }
    }

    /// Activity title, once set
    pub fn title(&self) -> Option<String> {
        self.title.lock().clone()
    }

    /// Concrete row by key
    pub fn preference(&self, key: &str) -> Option<Arc<MemoryPreference>> {
        self.preferences
            .lock()
            .iter()
            .find(|p| p.key == key)
            .cloned()
    }

    /// Concrete list
    pub fn list(&self) -> Arc<VirtualizedList> {
        Arc::clone(&self.list)
    }
}

impl PreferenceHost for InMemoryPreferenceHost {
    fn set_title(&self, title: &str) {
        *self.title.lock() = Some(title.to_string());
    }

    fn add_preferences(&self, preferences: &[PreferenceSpec]) {
        let mut rows = self.preferences.lock();
        rows.extend(preferences.iter().map(|spec| Arc::new(MemoryPreference::new(spec))));
        self.list.set_row_count(rows.len());
    }

    fn find_preference(&self, key: &str) -> Option<Arc<dyn SummaryPreference>> {
        let preference: Arc<dyn SummaryPreference> = self.preference(key)?;
        Some(preference)
    }

    fn list_container(&self) -> Arc<dyn ListContainer> {
        self.list.clone()
    }
}
