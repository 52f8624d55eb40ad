pub mod dol;

pub trait Header: std::fmt::Debug + Send + Sync {
    /// Returns the virtual address of the entry point.
    fn entry_point(&self) -> u64;

    /// Returns true if this is a 64-bit binary.
    fn is_64(&self) -> bool;

    /// Returns true if multi-byte fields are stored big-endian.
    fn is_big_endian(&self) -> bool;

    /// Returns a short human-readable name, e.g. "DOL".
    fn format_name(&self) -> &'static str;
}
