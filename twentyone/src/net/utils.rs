use std::io::{self, Read, Write};

use super::{
    errors::{ProtocolError, Result},
    messages::Message,
};

/// Fills `buf` from `reader`, looping over short reads.
///
/// A zero-length read means the peer hung up and is reported as
/// [`ProtocolError::ConnectionClosed`] rather than as an invalid message.
pub fn read_exact_bytes<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Err(ProtocolError::ConnectionClosed),
            Ok(n) => filled += n,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error.into()),
        }
    }
    Ok(())
}

/// Reads exactly `T::LEN` bytes and decodes them as a `T`.
pub fn read_message<T: Message, R: Read>(reader: &mut R) -> Result<T> {
    let mut buf = vec![0; T::LEN];
    read_exact_bytes(reader, &mut buf)?;
    Ok(T::decode(&buf)?)
}

/// Writes a whole message in one chunk.
pub fn write_message<T: Message, W: Write>(writer: &mut W, value: &T) -> Result<()> {
    writer.write_all(&value.encode())?;
    Ok(())
}
