//! Status change detection.

use crate::homework::{StatusRecord, StoredSnapshot};

/// Returns `true` when `fresh` should be reported.
///
/// A homework with no stored snapshot has never been reported, so it counts as changed.
#[must_use]
pub fn has_changed(fresh: &StatusRecord, stored: Option<&StoredSnapshot>) -> bool {
    match stored {
        None => true,
        Some(snapshot) => fresh.status != snapshot.status,
    }
}
