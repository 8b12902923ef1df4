use crate::domain::callback::CallbackPayload;
use crate::error::{PaymentError, Result};
use std::io::Read;

/// Reads recorded gateway callbacks from a CSV source.
///
/// The header row uses the gateway's field names
/// (`ORDER_NUMBER,RETURN_CODE,AUTHCODE,SETTLED,INCIDENT_ID`). Whitespace is
/// trimmed, and trailing optional columns may be omitted.
pub struct CallbackReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CallbackReader<R> {
    /// Creates a new `CallbackReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes callbacks.
    pub fn callbacks(self) -> impl Iterator<Item = Result<CallbackPayload>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}
