/// The outcome of a statement run for its side effects.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueryResult {
    pub(crate) rows_affected: u64,
    pub(crate) last_insert_rowid: i64,
}

impl QueryResult {
    /// Rows changed by the statement. Always 0 for read-only statements.
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    pub fn last_insert_rowid(&self) -> i64 {
        self.last_insert_rowid
    }
}
