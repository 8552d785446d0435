//! Loaded-image records.
//!
//! The binary loader maps EFI executables into the emulated address space and
//! records one [`LoadedImage`] per mapping, in load order. The debugger
//! console only reads these records: the first image is the primary target,
//! and the full list backs the "all mapped binaries" view.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Metadata for one binary mapped into the emulated address space.
///
/// `entrypoint` is the offset of the entry point from the image base, as read
/// from the executable header; the absolute and mapped entry addresses are
/// derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedImage {
    pub file_path: String,
    pub base_addr: u64,
    pub mapped_addr: u64,
    pub entrypoint: u64,
    pub size: u64,
    pub nr_sections: u32,
}

impl LoadedImage {
    /// Absolute entry point address at the on-disk base.
    pub fn absolute_entry(&self) -> u64 {
        self.base_addr.wrapping_add(self.entrypoint)
    }

    /// Entry point address inside the emulated mapping.
    pub fn mapped_entry(&self) -> u64 {
        self.mapped_addr.wrapping_add(self.entrypoint)
    }
}

/// Insertion-ordered collection of every image the loader has mapped.
///
/// Populated by the loader, read-only everywhere else. The loader guarantees
/// it is non-empty by the time any introspection runs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRegistry {
    images: Vec<LoadedImage>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record; load order is insertion order.
    pub fn push(&mut self, image: LoadedImage) {
        self.images.push(image);
    }

    /// The first image loaded, treated as the primary target.
    pub fn primary(&self) -> Option<&LoadedImage> {
        self.images.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadedImage> {
        self.images.iter()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(path: &str, base: u64) -> LoadedImage {
        LoadedImage {
            file_path: path.to_string(),
            base_addr: base,
            mapped_addr: base + 0x8000,
            entrypoint: 0x20,
            size: 0x500,
            nr_sections: 3,
        }
    }

    #[test]
    fn entry_addresses_are_base_plus_offset() {
        let img = image("/a/EFI.dxe", 0x1000);
        assert_eq!(img.absolute_entry(), 0x1020);
        assert_eq!(img.mapped_entry(), 0x9020);
    }

    #[test]
    fn primary_is_first_inserted() {
        let mut reg = ImageRegistry::new();
        reg.push(image("/a/first.dxe", 0x1000));
        reg.push(image("/a/second.dxe", 0x2000));

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.primary().map(|i| i.file_path.as_str()), Some("/a/first.dxe"));
        let paths: Vec<_> = reg.iter().map(|i| i.file_path.as_str()).collect();
        assert_eq!(paths, ["/a/first.dxe", "/a/second.dxe"]);
    }

    #[test]
    fn registry_round_trips_through_json() {
        let mut reg = ImageRegistry::new();
        reg.push(image("/a/EFI.dxe", 0x1000));

        let json = serde_json::to_string(&reg).expect("serialize");
        let back: ImageRegistry = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, reg);
    }
}
