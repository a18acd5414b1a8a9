//! Output sinks for processed files

use crate::error::{CleanerError, Result};
use crate::models::ProcessedFile;

/// Destination for the cleaned records of one file.
///
/// Sinks are invoked one after another for each successfully processed
/// file. Any error a sink returns fails that file only, and the sinks that
/// already accepted the file are asked to discard it.
pub trait RecordSink: Send {
    /// Short name used in logs and error reports
    fn name(&self) -> &str;

    /// Persist the records of `file`, returning the number of rows written
    fn write(&mut self, file: &ProcessedFile) -> Result<usize>;

    /// Undo a successful `write` after a later sink rejected the file
    fn discard(&mut self, _file: &ProcessedFile) -> Result<()> {
        Ok(())
    }
}

/// Run a sink, reporting any error as a [`CleanerError::SinkFailure`]
pub fn deliver(sink: &mut dyn RecordSink, file: &ProcessedFile) -> Result<usize> {
    sink.write(file).map_err(|e| match e {
        failure @ CleanerError::SinkFailure { .. } => failure,
        other => CleanerError::sink(sink.name(), other),
    })
}
