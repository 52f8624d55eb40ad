use crate::error::{DolError, Result};
use crate::header::Header;
use byteorder::{ReadBytesExt, BE};
use serde::Serialize;
use std::io::{self, Cursor};

/// Size in bytes of the on-disk header. Segment data starts right after it.
pub const HEADER_SIZE: usize = 0x100;

/// Number of text (code) segment slots.
pub const TEXT_SEGMENTS: usize = 7;

/// Number of data segment slots.
pub const DATA_SEGMENTS: usize = 11;

/// Reserved words between the entry point and the end of the header.
pub const PADDING_WORDS: usize = 7;

/// Represents the header of a DOL executable, as loaded by the GameCube and Wii.
///
/// The format has no magic number and no version field. Every field is a
/// big-endian `u32`, laid out in the order declared here:
///
/// ```text
/// 0x00  text file offsets  x7
/// 0x1c  data file offsets  x11
/// 0x48  text load addresses x7
/// 0x64  data load addresses x11
/// 0x90  text sizes          x7
/// 0xac  data sizes          x11
/// 0xd8  bss address
/// 0xdc  bss size
/// 0xe0  entry point
/// 0xe4  reserved, up to 0x100
/// ```
///
/// Reference: [YAGCD, DOL format](https://www.gc-forever.com/yagcd/chap14.html#sec14.2)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DolHeader {
    /// File offsets of the text segments.
    ///
    /// A zero offset marks the slot as absent.
    pub text_file_offset: [u32; TEXT_SEGMENTS],

    /// File offsets of the data segments.
    pub data_file_offset: [u32; DATA_SEGMENTS],

    /// Virtual addresses the text segments are loaded to.
    ///
    /// A zero address marks the slot as absent.
    pub text_load_addr: [u32; TEXT_SEGMENTS],

    /// Virtual addresses the data segments are loaded to.
    pub data_load_addr: [u32; DATA_SEGMENTS],

    /// Byte length of each text segment.
    pub text_size: [u32; TEXT_SEGMENTS],

    /// Byte length of each data segment.
    pub data_size: [u32; DATA_SEGMENTS],

    /// Virtual address of the zero-filled region.
    pub bss_addr: u32,

    /// Length of the zero-filled region.
    pub bss_size: u32,

    /// Virtual address where execution starts.
    pub entry_point: u32,

    /// Reserved, ignored by loaders.
    pub padding: [u32; PADDING_WORDS],
}

/// Fails with [`DolError::BufferTooSmall`] unless `buf` can hold a full header.
pub fn ensure_size(buf: &[u8]) -> Result<()> {
    if buf.len() < HEADER_SIZE {
        log::warn!(
            "Buffer of {} bytes is smaller than a DOL header ({:#x})",
            buf.len(),
            HEADER_SIZE
        );
        return Err(DolError::BufferTooSmall { len: buf.len() });
    }
    Ok(())
}

/// Fails with [`DolError::NameMismatch`] unless `name` ends in `.dol`, ignoring case.
///
/// Loaders only accept DOL images that come from a `.dol` file, independently
/// of what the signature check says about the contents.
pub fn ensure_extension(name: &str) -> Result<()> {
    let accepted = name
        .len()
        .checked_sub(4)
        .and_then(|at| name.get(at..))
        .is_some_and(|ext| ext.eq_ignore_ascii_case(".dol"));

    if !accepted {
        log::warn!("Rejecting {name:?}: missing .dol extension");
        return Err(DolError::NameMismatch {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn read_words<R: io::Read, const N: usize>(cur: &mut R) -> io::Result<[u32; N]> {
    let mut words = [0u32; N];
    cur.read_u32_into::<BE>(&mut words)?;
    Ok(words)
}

impl DolHeader {
    /// Parses the header of the image in `buf`, loaded from `name`.
    ///
    /// Both admission gates run: the buffer must hold a full header and the
    /// name must carry the `.dol` extension.
    pub fn parse(buf: &[u8], name: &str) -> Result<DolHeader> {
        ensure_size(buf)?;
        ensure_extension(name)?;

        let mut cursor = Cursor::new(&buf[..HEADER_SIZE]);
        let header = Self::from_reader(&mut cursor)?;
        log::debug!(
            "Parsed DOL header: {} text, {} data, bss {:#x}+{:#x}, entry {:#x}",
            header.text_slots().filter(|s| s.is_present()).count(),
            header.data_slots().filter(|s| s.is_present()).count(),
            header.bss_addr,
            header.bss_size,
            header.entry_point
        );
        Ok(header)
    }

    pub fn from_reader<R: io::Read>(cur: &mut R) -> Result<DolHeader> {
        Ok(DolHeader {
            text_file_offset: read_words(cur)?,
            data_file_offset: read_words(cur)?,
            text_load_addr: read_words(cur)?,
            data_load_addr: read_words(cur)?,
            text_size: read_words(cur)?,
            data_size: read_words(cur)?,
            bss_addr: cur.read_u32::<BE>()?,
            bss_size: cur.read_u32::<BE>()?,
            entry_point: cur.read_u32::<BE>()?,
            padding: read_words(cur)?,
        })
    }

    /// Iterates over the seven text slots, present or not.
    pub fn text_slots(&self) -> impl Iterator<Item = SegmentSlot> + '_ {
        (0..TEXT_SEGMENTS).map(|index| SegmentSlot {
            index,
            file_offset: self.text_file_offset[index],
            load_addr: self.text_load_addr[index],
            size: self.text_size[index],
        })
    }

    /// Iterates over the eleven data slots, present or not.
    pub fn data_slots(&self) -> impl Iterator<Item = SegmentSlot> + '_ {
        (0..DATA_SEGMENTS).map(|index| SegmentSlot {
            index,
            file_offset: self.data_file_offset[index],
            load_addr: self.data_load_addr[index],
            size: self.data_size[index],
        })
    }
}

/// One text or data slot of the header, gathered from the three parallel tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSlot {
    pub index: usize,
    pub file_offset: u32,
    pub load_addr: u32,
    pub size: u32,
}

impl SegmentSlot {
    /// A slot is in use only when both its file offset and load address are set.
    pub fn is_present(&self) -> bool {
        self.file_offset != 0 && self.load_addr != 0
    }
}

impl Header for DolHeader {
    fn entry_point(&self) -> u64 {
        self.entry_point as u64
    }

    fn is_64(&self) -> bool {
        false
    }

    fn is_big_endian(&self) -> bool {
        true
    }

    fn format_name(&self) -> &'static str {
        "DOL"
    }
}

/// Writes `header` back into its on-disk form. Only fixtures need this.
#[cfg(test)]
pub(crate) fn to_bytes(header: &DolHeader) -> Vec<u8> {
    use byteorder::WriteBytesExt;

    let mut out = Vec::with_capacity(HEADER_SIZE);
    let words = header
        .text_file_offset
        .iter()
        .chain(&header.data_file_offset)
        .chain(&header.text_load_addr)
        .chain(&header.data_load_addr)
        .chain(&header.text_size)
        .chain(&header.data_size)
        .chain([&header.bss_addr, &header.bss_size, &header.entry_point])
        .chain(&header.padding);
    for word in words {
        out.write_u32::<BE>(*word).unwrap();
    }
    assert_eq!(out.len(), HEADER_SIZE);
    out
}

/// The header used throughout the tests: a single text segment and a bss region.
#[cfg(test)]
pub(crate) fn sample_header() -> DolHeader {
    let mut header = DolHeader::default();
    header.text_file_offset[0] = 0x100;
    header.text_load_addr[0] = 0x8000_3100;
    header.text_size[0] = 0x2000;
    header.bss_addr = 0x8001_0000;
    header.bss_size = 0x4000;
    header.entry_point = 0x8000_3100;
    header
}
