use crate::{
    protocol::msgp::BufferIn,
    protocol::parts::{fill_row, parse_row, Field, RowLayout, RsqlValue, ServerError},
    protocol::ReplyType,
    RsqlError, RsqlResult,
};

/// Progress of a batch within the response stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BatchStatus {
    /// The batch was sent; no response has been processed yet.
    BatchSent,
    /// The layout of a new rowset has been received.
    LayoutAvailable,
    /// A data row has been received and its values can be read.
    DataAvailable,
    /// The current rowset is exhausted.
    RowsetEnd,
    /// All responses of the batch have been processed.
    BatchEnd,
}

/// How far [`BatchState::step`] advances through the response stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum StepMode {
    /// Stop at the next rowset layout or data row.
    NextRecord,
    /// Process everything until the end of the batch.
    ExecuteAll,
}

// Warnings have severity <= 10 and are discarded.
const ERROR_RETENTION_THRESHOLD: u8 = 10;

/// Tracks one batch from request to the batch-end response.
///
/// The server answers a batch request with a stream of tagged responses;
/// `step` consumes them one by one and keeps the current rowset layout,
/// the current row, and the counters up to date.
#[derive(Debug)]
pub(crate) struct BatchState {
    status: BatchStatus,
    row_layout: Option<RowLayout>,
    row: Option<Vec<Field>>,
    // rows received for the current rowset, verified against the server count
    record_count: i64,
    // sum of the affected-record counts of all executed statements
    exec_record_count: i64,
    // count of the last finished rowset or statement
    last_affected_count: i64,
    rowset_count: u64,
    first_scalar: Option<RsqlValue>,
    last_message: String,
    o_server_error: Option<ServerError>,
    return_code: i64,
    server: String,
}

impl BatchState {
    pub(crate) fn new(server: &str) -> Self {
        Self {
            status: BatchStatus::BatchSent,
            row_layout: None,
            row: None,
            record_count: 0,
            exec_record_count: 0,
            last_affected_count: 0,
            rowset_count: 0,
            first_scalar: None,
            last_message: String::new(),
            o_server_error: None,
            return_code: 0,
            server: server.to_string(),
        }
    }

    /// Processes responses from the stream until a stop point is reached.
    ///
    /// Returns `Ok(true)` when a data row is available, `Ok(false)` when a
    /// rowset layout is available (`NextRecord` only) or the batch has ended.
    /// A retained server error is raised at the batch end, after the server
    /// has sent all remaining responses of the batch.
    pub(crate) fn step<R: std::io::Read>(
        &mut self,
        buffin: &mut BufferIn<R>,
        mode: StepMode,
    ) -> RsqlResult<bool> {
        loop {
            let reply_type = ReplyType::try_new(buffin.read_u64()?)?;
            trace!("BatchState::step(): got {reply_type:?}");

            match reply_type {
                ReplyType::RecordLayout => {
                    self.row_layout = Some(RowLayout::parse(buffin)?);
                    self.row = Some(parse_row(buffin)?);
                    self.record_count = 0;
                    self.rowset_count += 1;
                    self.status = BatchStatus::LayoutAvailable;
                    if mode == StepMode::NextRecord {
                        return Ok(false);
                    }
                }

                ReplyType::RecordData => {
                    let row = self
                        .row
                        .as_mut()
                        .ok_or_else(|| RsqlError::Protocol("data row without a layout".to_string()))?;
                    fill_row(buffin, row)?;
                    self.record_count += 1;
                    self.status = BatchStatus::DataAvailable;

                    if self.first_scalar.is_none() {
                        if let Some(field) = row.first() {
                            let value = field.value()?;
                            if matches!(value, RsqlValue::BINARY(_)) {
                                return Err(RsqlError::Usage(
                                    "a scalar query cannot return a byte array",
                                ));
                            }
                            self.first_scalar = Some(value);
                        }
                    }

                    if mode == StepMode::NextRecord {
                        return Ok(true);
                    }
                }

                ReplyType::RecordFinished => {
                    let record_count = buffin.read_i64()?;
                    if record_count != self.record_count {
                        return Err(RsqlError::Protocol(format!(
                            "server sent {record_count} records but {} were received",
                            self.record_count
                        )));
                    }
                    self.row_layout = None;
                    self.row = None;
                    self.last_affected_count = record_count;
                    self.status = BatchStatus::RowsetEnd;
                }

                // statements under SET NOCOUNT ON don't send this response
                ReplyType::ExecutionFinished => {
                    let count = buffin.read_i64()?;
                    self.last_affected_count = count;
                    self.exec_record_count += count;
                }

                ReplyType::Print => {
                    // read and discard the one-column rowset
                    let mut row = parse_row(buffin)?;
                    fill_row(buffin, &mut row)?;
                }

                ReplyType::Message => {
                    self.last_message = buffin.read_string()?;
                }

                ReplyType::Error => {
                    let server_error = ServerError::parse(buffin, &self.server)?;
                    // the server sends BatchEnd after an error; if state is 127
                    // it has also closed the connection
                    if server_error.severity().to_u8() > ERROR_RETENTION_THRESHOLD {
                        self.o_server_error = Some(server_error);
                    }
                }

                ReplyType::BatchEnd => {
                    self.return_code = buffin.read_i64()?;
                    self.status = BatchStatus::BatchEnd;
                    if let Some(server_error) = self.o_server_error.take() {
                        return Err(RsqlError::DbError {
                            source: server_error,
                        });
                    }
                    return Ok(false);
                }

                ReplyType::LoginFailed | ReplyType::LoginSuccess => {
                    return Err(RsqlError::Protocol(format!(
                        "unexpected response {reply_type:?} within a batch"
                    )));
                }
            }
        }
    }

    pub(crate) fn status(&self) -> BatchStatus {
        self.status
    }

    pub(crate) fn row_layout(&self) -> Option<&RowLayout> {
        self.row_layout.as_ref()
    }

    pub(crate) fn row(&self) -> Option<&[Field]> {
        self.row.as_deref()
    }

    /// Count of the last finished rowset or statement.
    pub(crate) fn last_affected_count(&self) -> i64 {
        self.last_affected_count
    }

    /// Sum of the affected-record counts of all executed statements.
    pub(crate) fn exec_record_count(&self) -> i64 {
        self.exec_record_count
    }

    /// Number of rowset layouts received so far.
    pub(crate) fn rowset_count(&self) -> u64 {
        self.rowset_count
    }

    /// First column of the first data row of the batch.
    pub(crate) fn first_scalar(&self) -> Option<&RsqlValue> {
        self.first_scalar.as_ref()
    }

    pub(crate) fn take_first_scalar(&mut self) -> Option<RsqlValue> {
        self.first_scalar.take()
    }

    /// Last message received via a MESSAGE response.
    pub(crate) fn last_message(&self) -> &str {
        &self.last_message
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchState, BatchStatus, StepMode};
    use crate::{
        protocol::msgp::{BufferIn, BufferOut, SimpleValue},
        protocol::parts::RsqlValue,
        RsqlError,
    };

    fn state() -> BatchState {
        BatchState::new("myserver:7777")
    }

    // layout of a rowset with an INT and a VARCHAR(20) column
    fn append_layout(buffout: &mut BufferOut, colnames: &[&str]) {
        buffout.append_u64(3); // RecordLayout
        buffout.append_array_header(colnames.len());
        for name in colnames {
            buffout.append_string(name);
        }
        buffout.append_array_header(2);
        buffout.append_array_header(1);
        buffout.append_u64(12); // INT
        buffout.append_array_header(3);
        buffout.append_u64(6); // VARCHAR
        buffout.append_u64(20);
        buffout.append_bool(false);
    }

    fn append_data_row(buffout: &mut BufferOut, id: i64, name: &str) {
        buffout.append_u64(4); // RecordData
        buffout.append_array_header(2);
        buffout.append_i64(id);
        buffout.append_string(name);
    }

    fn append_batch_end(buffout: &mut BufferOut, rc: i64) {
        buffout.append_u64(14);
        buffout.append_i64(rc);
    }

    #[test]
    fn select_batch_row_by_row() {
        let mut buffout = BufferOut::new();
        append_layout(&mut buffout, &["id", "name"]);
        append_data_row(&mut buffout, 1, "john");
        append_data_row(&mut buffout, 2, "mary");
        buffout.append_u64(5); // RecordFinished
        buffout.append_i64(2);
        buffout.append_u64(7); // ExecutionFinished
        buffout.append_i64(0);
        append_batch_end(&mut buffout, 0);

        let mut buffin = BufferIn::new(buffout.as_bytes());
        let mut state = state();

        assert!(!state.step(&mut buffin, StepMode::NextRecord).unwrap());
        assert_eq!(state.status(), BatchStatus::LayoutAvailable);
        assert_eq!(state.row_layout().unwrap().colnames(), ["id", "name"]);

        assert!(state.step(&mut buffin, StepMode::NextRecord).unwrap());
        assert_eq!(state.status(), BatchStatus::DataAvailable);
        assert_eq!(state.row().unwrap()[0].value().unwrap(), RsqlValue::INT(1));

        assert!(state.step(&mut buffin, StepMode::NextRecord).unwrap());
        assert_eq!(
            state.row().unwrap()[1].value().unwrap(),
            RsqlValue::STRING("mary".to_string())
        );

        assert!(!state.step(&mut buffin, StepMode::NextRecord).unwrap());
        assert_eq!(state.status(), BatchStatus::BatchEnd);
        assert_eq!(state.rowset_count(), 1);
        assert_eq!(state.first_scalar(), Some(&RsqlValue::INT(1)));
    }

    #[test]
    fn execute_all_drains_the_batch() {
        let mut buffout = BufferOut::new();
        buffout.append_u64(7); // ExecutionFinished
        buffout.append_i64(3);
        buffout.append_u64(11); // Message
        buffout.append_string("3 rows inserted");
        buffout.append_u64(7); // ExecutionFinished
        buffout.append_i64(2);
        append_batch_end(&mut buffout, 0);

        let mut buffin = BufferIn::new(buffout.as_bytes());
        let mut state = state();

        assert!(!state.step(&mut buffin, StepMode::ExecuteAll).unwrap());
        assert_eq!(state.status(), BatchStatus::BatchEnd);
        assert_eq!(state.exec_record_count(), 5);
        assert_eq!(state.last_affected_count(), 2);
        assert_eq!(state.last_message(), "3 rows inserted");
    }

    #[test]
    fn warning_does_not_fail_the_batch() {
        let mut buffout = BufferOut::new();
        buffout.append_u64(12); // Error
        buffout.append_map_str_simple(&[
            ("severity", SimpleValue::Str("EXECUTION WARNING".to_string())),
            ("state", SimpleValue::Int(1)),
            ("text", SimpleValue::Str("user not found".to_string())),
        ]);
        append_batch_end(&mut buffout, 0);

        let mut buffin = BufferIn::new(buffout.as_bytes());
        let mut state = state();
        assert!(!state.step(&mut buffin, StepMode::ExecuteAll).unwrap());
        assert_eq!(state.status(), BatchStatus::BatchEnd);
    }

    #[test]
    fn error_is_raised_at_batch_end() {
        let mut buffout = BufferOut::new();
        buffout.append_u64(12); // Error
        buffout.append_map_str_simple(&[
            ("severity", SimpleValue::Str("EXECUTION ERROR".to_string())),
            ("state", SimpleValue::Int(1)),
            ("line_no", SimpleValue::Int(3)),
            ("line_pos", SimpleValue::Int(14)),
            ("text", SimpleValue::Str("table FOO does not exist".to_string())),
        ]);
        append_batch_end(&mut buffout, 0);

        let mut buffin = BufferIn::new(buffout.as_bytes());
        let mut state = state();
        match state.step(&mut buffin, StepMode::ExecuteAll) {
            Err(RsqlError::DbError { source }) => {
                assert_eq!(source.to_string(), "3:14 table FOO does not exist (state=1)");
            }
            other => panic!("expected a server error, got {other:?}"),
        }
        // the batch-end response was consumed before the error was raised
        assert_eq!(state.status(), BatchStatus::BatchEnd);
    }

    #[test]
    fn record_count_mismatch_is_detected() {
        let mut buffout = BufferOut::new();
        append_layout(&mut buffout, &["id", "name"]);
        append_data_row(&mut buffout, 1, "john");
        buffout.append_u64(5); // RecordFinished claims two records
        buffout.append_i64(2);

        let mut buffin = BufferIn::new(buffout.as_bytes());
        let mut state = state();
        assert!(matches!(
            state.step(&mut buffin, StepMode::ExecuteAll),
            Err(RsqlError::Protocol(_))
        ));
    }

    #[test]
    fn print_output_is_discarded() {
        let mut buffout = BufferOut::new();
        buffout.append_u64(10); // Print
        buffout.append_array_header(1);
        buffout.append_array_header(3);
        buffout.append_u64(6); // VARCHAR
        buffout.append_u64(100);
        buffout.append_bool(false);
        buffout.append_array_header(1);
        buffout.append_string("hello");
        append_batch_end(&mut buffout, 0);

        let mut buffin = BufferIn::new(buffout.as_bytes());
        let mut state = state();
        assert!(!state.step(&mut buffin, StepMode::ExecuteAll).unwrap());
        assert!(state.first_scalar().is_none());
    }

    #[test]
    fn unexpected_tag_is_a_protocol_error() {
        let mut buffout = BufferOut::new();
        buffout.append_u64(99);
        let mut buffin = BufferIn::new(buffout.as_bytes());
        let mut state = state();
        assert!(matches!(
            state.step(&mut buffin, StepMode::ExecuteAll),
            Err(RsqlError::Protocol(_))
        ));
    }
}
