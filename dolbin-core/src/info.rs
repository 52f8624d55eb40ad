use serde::Serialize;

/// Base virtual address reported for every DOL image.
///
/// Fixed rather than taken from the header: the segments carry absolute load
/// addresses of their own. Deriving it from the lowest segment address would
/// be a possible refinement.
pub const LOAD_BASE: u64 = 0x80b0_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Little,
    Big,
}

/// Static description of the image, the same for every DOL apart from `file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinInfo {
    pub file: String,
    pub bin_type: &'static str,
    pub machine: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
    pub bits: u32,
    pub endian: Endianness,
    pub has_va: bool,
}

impl BinInfo {
    pub fn new(file: &str) -> Self {
        BinInfo {
            file: file.to_string(),
            bin_type: "ROM",
            machine: "Nintendo Wii",
            os: "wii-ios",
            arch: "ppc",
            bits: 32,
            endian: Endianness::Big,
            has_va: true,
        }
    }

    pub fn is_big_endian(&self) -> bool {
        self.endian == Endianness::Big
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_is_constant_apart_from_file() {
        let a = BinInfo::new("a.dol");
        let b = BinInfo::new("/tmp/b.DOL");
        assert_eq!(a.file, "a.dol");
        assert_eq!(b.file, "/tmp/b.DOL");
        assert_eq!(
            BinInfo {
                file: String::new(),
                ..a
            },
            BinInfo {
                file: String::new(),
                ..b
            }
        );
    }

    #[test]
    fn powerpc_big_endian_32() {
        let info = BinInfo::new("main.dol");
        assert_eq!(info.arch, "ppc");
        assert_eq!(info.bits, 32);
        assert!(info.is_big_endian());
        assert!(info.has_va);
        assert_eq!(info.bin_type, "ROM");
    }
}
