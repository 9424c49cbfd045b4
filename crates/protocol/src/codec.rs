use std::io::{self, Read, Write};

use anyhow::{Context, Result, bail};
use bincode::config;
use serde::{Serialize, de::DeserializeOwned};

/// Upper bound on a single frame body. Anything larger is treated as a
/// corrupt length prefix rather than allocated.
pub const MAX_MESSAGE_LEN: usize = 64 * 1024 * 1024;

/// Read a single length-prefixed bincode message from `reader`.
///
/// Wire format:
///   - 4-byte big-endian length (u32)
///   - that many bytes of bincode payload
pub fn read_message<R, T>(reader: &mut R) -> Result<T>
where
    R: Read,
    T: DeserializeOwned,
{
    match read_message_opt(reader)? {
        Some(msg) => Ok(msg),
        None => bail!("unexpected end of stream before message header"),
    }
}

/// Like [`read_message`], but a stream that ends exactly on a frame boundary
/// yields `Ok(None)`.
pub fn read_message_opt<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf[..1]) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    reader
        .read_exact(&mut len_buf[1..])
        .context("truncated message header")?;

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_LEN {
        bail!("message length {len} exceeds limit of {MAX_MESSAGE_LEN} bytes");
    }

    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .with_context(|| format!("truncated message body (expected {len} bytes)"))?;

    let (msg, _bytes_read): (T, usize) =
        bincode::serde::decode_from_slice(&buf, config::standard())?;
    Ok(Some(msg))
}

/// Write a single length-prefixed bincode message to `writer`.
///
/// Wire format:
///   - 4-byte big-endian length (u32)
///   - bincode payload
pub fn write_message<W, T>(writer: &mut W, msg: &T) -> Result<()>
where
    W: Write,
    T: Serialize,
{
    let bytes = bincode::serde::encode_to_vec(msg, config::standard())?;
    if bytes.len() > MAX_MESSAGE_LEN {
        bail!(
            "message of {} bytes exceeds limit of {MAX_MESSAGE_LEN} bytes",
            bytes.len()
        );
    }
    let len = bytes.len() as u32;

    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
