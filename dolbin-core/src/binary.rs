use crate::entry::{self, EntryPoint};
use crate::error::Result;
use crate::header::dol::DolHeader;
use crate::header::Header;
use crate::info::{BinInfo, LOAD_BASE};
use crate::sections::DolSection;
use anyhow::Context;

/// A loaded DOL image: the parsed header and the name it was loaded from.
///
/// The header is read once in [`DolBinary::load`]; every query afterwards
/// builds fresh records from it.
#[derive(Debug, Clone)]
pub struct DolBinary {
    pub path: String,
    pub header: DolHeader,
}

impl DolBinary {
    /// Parses the DOL header of `buf`, which was read from `name`.
    ///
    /// The buffer must hold at least a full header and `name` must end in
    /// `.dol`. The signature check is not repeated here; see [`crate::check`].
    pub fn load(buf: &[u8], name: &str) -> Result<Self> {
        let header = DolHeader::parse(buf, name)?;
        log::info!(
            "Loaded {} image {name} ({} bytes), entry {:#x}",
            header.format_name(),
            buf.len(),
            header.entry_point()
        );
        Ok(Self {
            path: name.to_string(),
            header,
        })
    }

    /// Reads `path` from disk and loads it.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let buf = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let name = path.display().to_string();
        Self::load(&buf, &name).with_context(|| format!("loading {name}"))
    }

    pub fn sections(&self) -> Vec<DolSection> {
        DolSection::from_header(&self.header)
    }

    pub fn entries(&self) -> Vec<EntryPoint> {
        entry::entries(&self.header)
    }

    pub fn info(&self) -> BinInfo {
        BinInfo::new(&self.path)
    }

    /// Always [`LOAD_BASE`], whatever the header says.
    pub fn base_address(&self) -> u64 {
        LOAD_BASE
    }

    pub fn get_entry_offset(&self) -> u64 {
        self.header.entry_point()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DolError;
    use crate::header::dol::{sample_header, to_bytes};
    use crate::sections::{Perm, SectionKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn sample_image_end_to_end() {
        let mut buf = to_bytes(&sample_header());
        buf.resize(0x2100, 0);
        let bin = DolBinary::load(&buf, "sample.dol").unwrap();

        let sections = bin.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name, "text_0");
        assert_eq!(sections[0].kind, SectionKind::Text);
        assert_eq!(sections[0].file_offset, 0x100);
        assert_eq!(sections[0].vma, 0x8000_3100);
        assert_eq!(sections[0].size, 0x2000);
        assert_eq!(sections[0].perm, Perm::RX);
        assert_eq!(sections[1].name, "bss");
        assert_eq!(sections[1].vma, 0x8001_0000);
        assert_eq!(sections[1].size, 0x4000);
        assert_eq!(sections[1].perm, Perm::RW);

        assert_eq!(
            bin.entries(),
            vec![EntryPoint {
                vaddr: 0x8000_3100,
                paddr: 0x3100
            }]
        );
        assert_eq!(bin.base_address(), 0x80b0_0000);
        assert_eq!(bin.get_entry_offset(), 0x8000_3100);
        assert_eq!(bin.info().file, "sample.dol");
    }

    #[test]
    fn base_address_ignores_header() {
        let mut header = sample_header();
        header.text_load_addr[0] = 0x8100_0000;
        header.bss_addr = 0x9000_0000;
        let bin = DolBinary::load(&to_bytes(&header), "x.dol").unwrap();
        assert_eq!(bin.base_address(), LOAD_BASE);
    }

    #[test]
    fn queries_are_repeatable() {
        let bin = DolBinary::load(&to_bytes(&sample_header()), "x.dol").unwrap();
        assert_eq!(bin.sections(), bin.sections());
        assert_eq!(bin.entries(), bin.entries());
        assert_eq!(bin.info(), bin.info());
    }

    #[test]
    fn size_gate_runs_before_name_gate() {
        let err = DolBinary::load(&[0u8; 0x10], "x.elf").unwrap_err();
        assert!(matches!(err, DolError::BufferTooSmall { len: 0x10 }), "{err:?}");
    }

    #[test]
    fn name_gate_ignores_signature() {
        // Valid signature, wrong name.
        let buf = to_bytes(&sample_header());
        assert!(crate::check(&buf));
        let err = DolBinary::load(&buf, "sample.bin").unwrap_err();
        assert!(matches!(err, DolError::NameMismatch { .. }), "{err:?}");
    }

    #[test]
    fn load_does_not_require_signature() {
        let mut header = sample_header();
        header.text_file_offset[0] = 0x2000;
        let buf = to_bytes(&header);
        assert!(!crate::check(&buf));
        assert!(DolBinary::load(&buf, "odd.dol").is_ok());
    }

    #[test]
    fn open_reads_from_disk() {
        let dir = std::env::temp_dir().join(format!("dolbin-open-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("disk.dol");
        std::fs::write(&path, to_bytes(&sample_header())).unwrap();

        let bin = DolBinary::open(&path).unwrap();
        assert_eq!(bin.path, path.display().to_string());
        assert_eq!(bin.header, sample_header());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn open_reports_missing_file() {
        let err = DolBinary::open("/nonexistent/dolbin/missing.dol").unwrap_err();
        assert!(err.to_string().contains("missing.dol"), "{err}");
    }
}
