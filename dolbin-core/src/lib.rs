pub mod binary;
pub mod detect;
pub mod entry;
pub mod error;
pub mod header;
pub mod info;
pub mod plugin;
pub mod sections;

pub use binary::*;
pub use detect::check;
pub use entry::EntryPoint;
pub use error::{DolError, Result};
pub use header::dol::DolHeader;
pub use header::Header;
pub use info::{BinInfo, LOAD_BASE};
pub use plugin::*;
pub use sections::*;
