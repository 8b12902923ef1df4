use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// One line of the `verify` report.
#[derive(Debug, Serialize)]
pub struct OutcomeRecord<'a> {
    pub order_number: &'a str,
    pub outcome: String,
}

/// Writes verification outcomes as CSV.
pub struct OutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, record: &OutcomeRecord<'_>) -> Result<()> {
        self.writer.serialize(record)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
