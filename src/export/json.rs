use crate::error::ExportError;
use serde::Serialize;
use std::io::Write;

/// Write any serializable data structure as pretty JSON
pub fn write_json<T, W>(data: &T, mut writer: W) -> Result<(), ExportError>
where
    T: Serialize + ?Sized,
    W: Write,
{
    let json_data = to_json_string(data)?;
    writer.write_all(json_data.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn to_json_string<T: Serialize + ?Sized>(data: &T) -> Result<String, ExportError> {
    serde_json::to_string_pretty(data).map_err(|e| ExportError::SerializationError(e.to_string()))
}
