//! Signature check for DOL images.
//!
//! DOL has no magic number. What passes for one is the shape of the first
//! text slot in practically every image: its file offset is `0x100` (data
//! starts right after the header) and the next text offset is unused.

use crate::error::{DolError, Result};

const FIRST_PROBE: [u8; 6] = [0x00, 0x00, 0x01, 0x00, 0x00, 0x00];
const SECOND_PROBE: [u8; 6] = [0x00; 6];

fn probe(buf: &[u8], at: usize, expected: &[u8; 6]) -> bool {
    buf.get(at..at + expected.len())
        .is_some_and(|window| window == expected)
}

/// Returns true when `buf` looks like a DOL image.
///
/// This is a heuristic. Crafted or unusual images can fool it either way.
pub fn check(buf: &[u8]) -> bool {
    let verdict = probe(buf, 0, &FIRST_PROBE) && probe(buf, 6, &SECOND_PROBE);
    log::debug!("DOL signature check on {} bytes: {verdict}", buf.len());
    verdict
}

/// Like [`check`], but declines with [`DolError::SignatureMismatch`].
pub fn ensure_signature(buf: &[u8]) -> Result<()> {
    if check(buf) {
        Ok(())
    } else {
        Err(DolError::SignatureMismatch)
    }
}
