use std::io::{self, Read};

use crate::{Error, Result};

fn read_byte<R: Read>(reader: &mut R) -> Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

pub(crate) fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::UnexpectedEof,
        _ => Error::IoError(e),
    })
}

/// Reads an element id, keeping the length marker bits.
///
/// Returns `None` when the stream ends cleanly before the first byte.
pub fn read_id<R: Read>(reader: &mut R) -> Result<Option<(u32, usize)>> {
    let Some(first) = read_byte(reader)? else {
        return Ok(None);
    };

    let length = first.leading_zeros() as usize + 1;
    if length > 4 {
        return Err(Error::InvalidElementId(first));
    }

    let mut rest = [0u8; 3];
    read_exact(reader, &mut rest[..length - 1])?;

    let id = rest[..length - 1]
        .iter()
        .fold(first as u32, |id, byte| (id << 8) | *byte as u32);
    Ok(Some((id, length)))
}

/// Reads an element data size.
///
/// A size with every value bit set means "unknown" and is returned as `None`.
pub fn read_size<R: Read>(reader: &mut R) -> Result<(Option<u64>, usize)> {
    let first = read_byte(reader)?.ok_or(Error::UnexpectedEof)?;

    let length = first.leading_zeros() as usize + 1;
    if length > 8 {
        return Err(Error::InvalidSize(first));
    }

    let mut rest = [0u8; 7];
    read_exact(reader, &mut rest[..length - 1])?;

    let marker_mask = (0xffu16 >> length) as u8;
    let value = rest[..length - 1]
        .iter()
        .fold((first & marker_mask) as u64, |value, byte| {
            (value << 8) | *byte as u64
        });

    let unknown = (1u64 << (7 * length)) - 1;
    if value == unknown {
        Ok((None, length))
    } else {
        Ok((Some(value), length))
    }
}

/// Big-endian unsigned integer of up to 8 bytes.
pub fn decode_unsigned(data: &[u8]) -> Option<u64> {
    if data.len() > 8 {
        return None;
    }
    Some(
        data.iter()
            .fold(0u64, |value, byte| (value << 8) | *byte as u64),
    )
}
