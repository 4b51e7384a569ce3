//! Daily content selection
//!
//! Picks "today's" item from an ordered pool, keyed by the rotation window's
//! local start date. A pure function of (pool snapshot, window): every
//! request inside one window sees the identical item, and the pick advances
//! only when the window does. No request-scoped randomness.

use chrono::Datelike;

use crate::domain::{EngineError, Result};
use crate::rotation::RotationWindow;

/// Select the item for the window from an ordered pool snapshot.
///
/// The index is the window's local date ordinal modulo the pool size, so the
/// pool cycles once per pool-length days. Callers must pass the pool in a
/// stable order. An empty pool yields `Unavailable`, never a panic.
pub fn select_daily<'a, T>(pool: &'a [T], window: &RotationWindow) -> Result<&'a T> {
    if pool.is_empty() {
        return Err(EngineError::Unavailable);
    }
    let ordinal = window.local_date.num_days_from_ce() as i64;
    let idx = ordinal.rem_euclid(pool.len() as i64) as usize;
    Ok(&pool[idx])
}
