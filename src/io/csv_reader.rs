use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::{Stream, StreamExt};
use tokio::fs::File;
use tokio_util::compat::TokioAsyncReadCompatExt;

use super::error::IoError;
use super::parse::RawRecord;
use crate::domain::Record;

/// Async stream of records from a `key,value` CSV input
pub struct CsvRecordStream {
    inner: Pin<Box<dyn Stream<Item = Result<Record, IoError>> + Send>>,
}

impl CsvRecordStream {
    /// Create a new record stream from an async reader
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let csv_reader = AsyncReaderBuilder::new()
            .trim(csv_async::Trim::All)
            .flexible(true)
            .create_deserializer(reader);

        let stream = csv_reader
            .into_deserialize::<RawRecord>()
            .map(|result| result.map(RawRecord::into_record).map_err(IoError::from));

        Self {
            inner: Box::pin(stream),
        }
    }

    /// Create a new record stream from a file path
    ///
    /// # Example
    /// ```rust,ignore
    /// let records: Vec<Record> = CsvRecordStream::from_file("orders.csv").await?.try_collect().await?;
    /// ```
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let file = File::open(path.as_ref()).await?;
        Ok(Self::new(file.compat()))
    }
}

impl Stream for CsvRecordStream {
    type Item = Result<Record, IoError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::io::Cursor;
    use serde_json::json;

    #[tokio::test]
    async fn reads_valid_csv_stream() {
        let csv_data = r#"key,value
1,"{""amount"": 10, ""user-id"": 2}"
3,"{""amount"": 500, ""user-id"": 4}"
"#;
        let reader = Cursor::new(csv_data.as_bytes());
        let mut stream = CsvRecordStream::new(reader);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first, Record::new(1, json!({"amount": 10, "user-id": 2})));

        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second, Record::new(3, json!({"amount": 500, "user-id": 4})));

        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn handles_whitespace_and_plain_strings() {
        let csv_data = "\
key,value
  a  ,  hello  
";
        let reader = Cursor::new(csv_data.as_bytes());
        let mut stream = CsvRecordStream::new(reader);

        let record = stream.next().await.unwrap().unwrap();
        assert_eq!(record, Record::new("a", "hello"));
    }

    #[tokio::test]
    async fn handles_missing_value_column() {
        let csv_data = "\
key
k1
";
        let reader = Cursor::new(csv_data.as_bytes());
        let mut stream = CsvRecordStream::new(reader);

        let record = stream.next().await.unwrap().unwrap();
        assert_eq!(record, Record::new("k1", serde_json::Value::Null));
    }

    #[tokio::test]
    async fn handles_empty_csv() {
        let reader = Cursor::new("key,value\n".as_bytes());
        let mut stream = CsvRecordStream::new(reader);

        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, "key,value\n1,2\n3,4\n").unwrap();

        let records: Vec<_> = CsvRecordStream::from_file(&path).await.unwrap().collect().await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.is_ok()));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let result = CsvRecordStream::from_file("/nonexistent/orders.csv").await;
        assert!(matches!(result, Err(IoError::Io(_))));
    }
}
