use csv_async::AsyncWriter;
use tokio::io::AsyncWrite;
use tokio_util::compat::TokioAsyncWriteCompatExt;

use super::error::IoError;
use crate::experiment::ExperimentOutputs;

/// Write experiment outputs as `entity,key,value` CSV rows
///
/// Entities appear in id order, records in the order the entity produced
/// them. Keys and values are written as compact JSON.
pub async fn write_outputs<W>(outputs: &ExperimentOutputs, writer: W) -> Result<(), IoError>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut csv_writer = AsyncWriter::from_writer(writer.compat_write());
    csv_writer.write_record(&["entity", "key", "value"]).await?;

    for (entity, records) in &outputs.entities {
        for record in records {
            let key = serde_json::to_string(&record.key)?;
            let value = serde_json::to_string(&record.value)?;
            csv_writer
                .write_record(&[entity.as_str(), key.as_str(), value.as_str()])
                .await?;
        }
    }

    csv_writer.flush().await?;
    Ok(())
}
