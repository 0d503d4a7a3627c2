//! Read helpers that report how far a short read got.

use std::io::{self, Read};

/// Fill `buf` from `reader`, stopping early only at end of input.
///
/// Unlike [`Read::read_exact`], the number of bytes read is returned on a
/// short read so callers can tell how much of a field was present.
/// Interrupted reads are retried.
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while let Some(rest) = buf.get_mut(filled..).filter(|rest| !rest.is_empty()) {
        match reader.read(rest) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
