//! Format handlers and the registry a host keeps them in.
//!
//! A handler is stateless. Everything it learns about an image lives in the
//! [`LoadedImage`] returned by [`FormatHandler::load_buffer`], which the host
//! owns and queries until it closes the image.

use serde::Serialize;

use crate::binary::DolBinary;
use crate::detect;
use crate::entry::EntryPoint;
use crate::error::Result;
use crate::info::BinInfo;
use crate::sections::DolSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PluginDescriptor {
    pub name: &'static str,
    pub desc: &'static str,
    pub license: &'static str,
}

/// Per-image state handed back to the host on a successful load.
pub trait LoadedImage: std::fmt::Debug + Send + Sync {
    fn sections(&self) -> Vec<DolSection>;

    fn entries(&self) -> Vec<EntryPoint>;

    fn info(&self) -> BinInfo;

    fn base_address(&self) -> u64;
}

pub trait FormatHandler: Send + Sync {
    fn descriptor(&self) -> &PluginDescriptor;

    /// Cheap, buffer-only guess at whether this handler understands `buf`.
    fn check_buffer(&self, buf: &[u8]) -> bool;

    /// Parses `buf`, read from `name`, into an image the host can query.
    fn load_buffer(&self, buf: &[u8], name: &str) -> Result<Box<dyn LoadedImage>>;
}

impl LoadedImage for DolBinary {
    fn sections(&self) -> Vec<DolSection> {
        DolBinary::sections(self)
    }

    fn entries(&self) -> Vec<EntryPoint> {
        DolBinary::entries(self)
    }

    fn info(&self) -> BinInfo {
        DolBinary::info(self)
    }

    fn base_address(&self) -> u64 {
        DolBinary::base_address(self)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DolPlugin;

impl DolPlugin {
    pub const DESCRIPTOR: PluginDescriptor = PluginDescriptor {
        name: "dol",
        desc: "Nintendo Dolphin binary format",
        license: "BSD",
    };
}

impl FormatHandler for DolPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &Self::DESCRIPTOR
    }

    fn check_buffer(&self, buf: &[u8]) -> bool {
        detect::check(buf)
    }

    fn load_buffer(&self, buf: &[u8], name: &str) -> Result<Box<dyn LoadedImage>> {
        Ok(Box::new(DolBinary::load(buf, name)?))
    }
}

#[derive(Default)]
pub struct PluginRegistry {
    handlers: Vec<Box<dyn FormatHandler>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every handler this crate ships.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(DolPlugin));
        registry
    }

    pub fn register(&mut self, handler: Box<dyn FormatHandler>) {
        log::debug!("Registering format handler {}", handler.descriptor().name);
        self.handlers.push(handler);
    }

    pub fn handlers(&self) -> impl Iterator<Item = &dyn FormatHandler> + '_ {
        self.handlers.iter().map(|h| &**h as &dyn FormatHandler)
    }

    pub fn get(&self, name: &str) -> Option<&dyn FormatHandler> {
        self.handlers().find(|h| h.descriptor().name == name)
    }

    /// First handler, in registration order, whose check accepts `buf`.
    pub fn detect(&self, buf: &[u8]) -> Option<&dyn FormatHandler> {
        let found = self.handlers().find(|h| h.check_buffer(buf));
        match found {
            Some(h) => log::info!("Detected format {}", h.descriptor().name),
            None => log::warn!("No registered format recognises this buffer"),
        }
        found
    }
}
