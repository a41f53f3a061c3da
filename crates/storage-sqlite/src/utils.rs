//! Helpers for keeping statements under SQLite's bound-parameter limit.

/// Bound parameters a single statement may use.
///
/// Older SQLite builds cap `SQLITE_MAX_VARIABLE_NUMBER` at 999; staying under
/// it keeps statements portable to any linked library.
pub const SQLITE_MAX_PARAMS: usize = 999;

/// Split rows into batches whose multi-row `INSERT` stays under
/// [`SQLITE_MAX_PARAMS`] given `columns_per_row` bound values per row.
///
/// Always yields batches of at least one row.
pub fn chunk_for_sqlite<T>(rows: &[T], columns_per_row: usize) -> impl Iterator<Item = &[T]> {
    let rows_per_chunk = (SQLITE_MAX_PARAMS / columns_per_row.max(1)).max(1);
    rows.chunks(rows_per_chunk)
}
