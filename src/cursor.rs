use crate::{
    conn::ConnectionCore,
    protocol::batch::{BatchState, BatchStatus, StepMode},
    protocol::parts::{Field, RsqlValue, TypeId},
    RsqlError, RsqlResult,
};

/// A cursor over the rowsets produced by a batch.
///
/// Produced by [`Connection::query`](crate::Connection::query). The cursor
/// borrows the connection mutably, so only one batch can be read at a time.
/// Rows are decoded one at a time; the values of the current row stay
/// accessible until the next call to [`next_row`](Cursor::next_row).
///
/// Dropping a cursor before the batch end leaves unread responses in the
/// stream; the connection cannot be used for another batch before the
/// cursor has returned `false` from `next_row`.
#[derive(Debug)]
pub struct Cursor<'a> {
    core: &'a mut ConnectionCore,
    state: BatchState,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(core: &'a mut ConnectionCore, state: BatchState) -> Self {
        Self { core, state }
    }

    /// Advances to the next data row.
    ///
    /// Returns `false` at the end of the current rowset or of the batch.
    /// A retained server error is raised here when the batch end is
    /// reached.
    pub fn next_row(&mut self) -> RsqlResult<bool> {
        match self.state.status() {
            // the batch produced no rowset at all
            BatchStatus::BatchEnd => Ok(false),
            BatchStatus::LayoutAvailable | BatchStatus::DataAvailable => {
                self.core.step(&mut self.state, StepMode::NextRecord)
            }
            status => Err(RsqlError::UsageDetailed(format!(
                "next_row() is not allowed in state {status:?}"
            ))),
        }
    }

    /// True if a rowset layout has been received and rows can be read.
    pub fn has_rowset(&self) -> bool {
        self.state.status() == BatchStatus::LayoutAvailable
    }

    /// The lowercase column names of the current rowset.
    pub fn column_names(&self) -> &[String] {
        self.state
            .row_layout()
            .map_or(&[], |layout| layout.colnames())
    }

    /// Number of columns of the current rowset.
    pub fn field_count(&self) -> usize {
        self.state.row().map_or(0, <[Field]>::len)
    }

    /// Position of the named column, case-insensitive.
    ///
    /// Fails for unknown, unnamed, and ambiguous column names.
    pub fn ordinal(&self, name: &str) -> RsqlResult<usize> {
        self.state
            .row_layout()
            .and_then(|layout| layout.ordinal(name))
            .ok_or_else(|| {
                RsqlError::UsageDetailed(format!("no unambiguous column named \"{name}\""))
            })
    }

    fn field(&self, i: usize) -> RsqlResult<&Field> {
        self.state
            .row()
            .and_then(|row| row.get(i))
            .ok_or_else(|| RsqlError::UsageDetailed(format!("no column with index {i}")))
    }

    /// The value of column `i` of the current row.
    ///
    /// NUMERIC values are rescaled to at most 28 digits.
    pub fn value(&self, i: usize) -> RsqlResult<RsqlValue> {
        self.field(i)?.value()
    }

    /// The value of column `i` of the current row, without rescaling.
    pub fn precise_value(&self, i: usize) -> RsqlResult<RsqlValue> {
        Ok(self.field(i)?.precise_value())
    }

    /// True if column `i` of the current row is NULL.
    pub fn is_null(&self, i: usize) -> RsqlResult<bool> {
        Ok(self.field(i)?.is_null())
    }

    /// The type of column `i`.
    pub fn type_id(&self, i: usize) -> RsqlResult<TypeId> {
        Ok(self.field(i)?.type_id())
    }

    /// All values of the current row.
    pub fn values(&self) -> RsqlResult<Vec<RsqlValue>> {
        self.state
            .row()
            .unwrap_or(&[])
            .iter()
            .map(Field::value)
            .collect()
    }

    /// Count of the last finished rowset or statement.
    pub fn affected_count(&self) -> i64 {
        self.state.last_affected_count()
    }

    /// First column of the first data row of the batch, if any was read.
    pub fn first_scalar(&self) -> Option<&RsqlValue> {
        self.state.first_scalar()
    }

    /// Last message the server sent via PRINT-style MESSAGE responses.
    pub fn last_message(&self) -> &str {
        self.state.last_message()
    }

    /// Number of rowsets seen so far in this batch.
    pub fn rowset_count(&self) -> u64 {
        self.state.rowset_count()
    }
}
