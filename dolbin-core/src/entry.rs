use serde::Serialize;

use crate::header::dol::DolHeader;

/// Mask turning an entry address into the physical address reported with it.
///
/// This keeps the low 16 bits of the virtual address. It does not resolve
/// to a file offset, and nothing else derives addresses this way.
pub const ENTRY_PHYS_MASK: u64 = 0xFFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryPoint {
    pub vaddr: u64,
    pub paddr: u64,
}

impl EntryPoint {
    pub fn from_header(header: &DolHeader) -> Self {
        let vaddr = header.entry_point as u64;
        EntryPoint {
            vaddr,
            paddr: vaddr & ENTRY_PHYS_MASK,
        }
    }
}

/// A DOL image has exactly one entry point.
pub fn entries(header: &DolHeader) -> Vec<EntryPoint> {
    vec![EntryPoint::from_header(header)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::dol::sample_header;

    #[test]
    fn sample_entry() {
        assert_eq!(
            entries(&sample_header()),
            vec![EntryPoint {
                vaddr: 0x8000_3100,
                paddr: 0x3100,
            }]
        );
    }

    #[test]
    fn paddr_keeps_low_half() {
        for entry_point in [0, 0xffff, 0x1_0000, 0x8000_0000, 0x8123_4567, u32::MAX] {
            let header = DolHeader {
                entry_point,
                ..DolHeader::default()
            };
            let found = entries(&header);
            assert_eq!(found.len(), 1);
            let entry = found[0];
            assert_eq!(entry.vaddr, entry_point as u64);
            assert_eq!(entry.paddr, entry.vaddr & 0xFFFF);
        }
    }
}
