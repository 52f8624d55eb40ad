use std::fmt;

use serde::{Serialize, Serializer};

use crate::header::dol::{DolHeader, SegmentSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Text,
    Data,
    Bss,
}

impl SectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Text => "text",
            SectionKind::Data => "data",
            SectionKind::Bss => "bss",
        }
    }

    /// Protection every section of this kind gets.
    pub fn perm(self) -> Perm {
        match self {
            SectionKind::Text => Perm::RX,
            SectionKind::Data => Perm::R,
            SectionKind::Bss => Perm::RW,
        }
    }
}

/// Memory protection of a mapped section, printed the `ls -l` way (`r-x`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Perm(u8);

impl Perm {
    pub const READ: u8 = 0b100;
    pub const WRITE: u8 = 0b010;
    pub const EXEC: u8 = 0b001;

    pub const RX: Perm = Perm(Self::READ | Self::EXEC);
    pub const R: Perm = Perm(Self::READ);
    pub const RW: Perm = Perm(Self::READ | Self::WRITE);

    pub fn readable(self) -> bool {
        self.0 & Self::READ != 0
    }

    pub fn writable(self) -> bool {
        self.0 & Self::WRITE != 0
    }

    pub fn executable(self) -> bool {
        self.0 & Self::EXEC != 0
    }
}

impl fmt::Display for Perm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |set, c| if set { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            flag(self.readable(), 'r'),
            flag(self.writable(), 'w'),
            flag(self.executable(), 'x')
        )
    }
}

impl Serialize for Perm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DolSection {
    pub name: String,
    pub kind: SectionKind,
    /// Load address.
    pub vma: u64,
    pub size: u64,
    /// In-memory size. DOL has no separate field for it, so it equals `size`.
    pub vsize: u64,
    /// Zero for bss, which has no bytes on disk.
    pub file_offset: u64,
    pub perm: Perm,
    pub should_map: bool,
}

impl DolSection {
    fn from_slot(kind: SectionKind, slot: &SegmentSlot) -> Self {
        DolSection {
            name: format!("{}_{}", kind.as_str(), slot.index),
            kind,
            vma: slot.load_addr as u64,
            size: slot.size as u64,
            vsize: slot.size as u64,
            file_offset: slot.file_offset as u64,
            perm: kind.perm(),
            should_map: true,
        }
    }

    fn bss(header: &DolHeader) -> Self {
        DolSection {
            name: SectionKind::Bss.as_str().to_string(),
            kind: SectionKind::Bss,
            vma: header.bss_addr as u64,
            size: header.bss_size as u64,
            vsize: header.bss_size as u64,
            file_offset: 0,
            perm: SectionKind::Bss.perm(),
            should_map: true,
        }
    }

    /// Builds the loadable sections described by `header`.
    ///
    /// Present text slots come first, then present data slots, each by
    /// ascending index. A single bss section closes the list, even when its
    /// address and size are both zero.
    pub fn from_header(header: &DolHeader) -> Vec<Self> {
        let text = header
            .text_slots()
            .filter(SegmentSlot::is_present)
            .map(|slot| Self::from_slot(SectionKind::Text, &slot));
        let data = header
            .data_slots()
            .filter(SegmentSlot::is_present)
            .map(|slot| Self::from_slot(SectionKind::Data, &slot));

        let mut sections: Vec<Self> = text.chain(data).collect();
        sections.push(Self::bss(header));
        sections
    }
}
