//! The typelib container: construction, validation, lookups, and symbol binding.
//!
//! A typelib is a single immutable byte buffer describing the public API of one
//! module: a directory of named entries (functions, callbacks, constants,
//! structures, unions, enumerations, flags, interfaces, and classes) with typed
//! blobs describing each entry's shape, plus a string pool and optional side
//! sections.
//!
//! # Architecture
//!
//! - [`header`] - The fixed 112-byte header and its fast structural checks
//! - [`directory`] - Directory entries and checked 1-based index access
//! - [`section`] - The optional section table
//! - [`types`] - Type expressions (simple type slots and complex type blobs)
//! - [`blobs`] - Typed views over every blob kind
//! - [`lookup`] - Name, type-registration-name, and error-domain lookups
//! - The validator and the shared-library binding are internal to this module
//!
//! # Thread Safety
//!
//! A validated typelib is a pure read-only structure: lookups may run concurrently
//! from any number of threads. Shared-library binding is lazy and one-shot; when
//! two threads race on the first symbol request, exactly one opens the libraries
//! and both observe the published handles. Share a typelib between threads with
//! [`std::sync::Arc`]: cloning the `Arc` retains it, dropping the last clone
//! releases it and closes the opened libraries.

pub mod blobs;
pub mod directory;
pub mod header;
pub mod lookup;
pub mod section;
pub mod types;

mod shlib;
mod validate;

use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::{
    file::{string_at, TypelibData},
    typelib::{
        directory::{dir_entry, DirEntry},
        header::Header,
        lookup::DirectoryIndex,
        shlib::SharedLibraries,
    },
    Result,
};

/// A loaded typelib.
///
/// Constructing a `Typelib` runs the fast header check (length, magic, version,
/// declared size, blob-size table, table alignment); the full structural
/// validation of every local entry is a separate, explicit step via
/// [`Typelib::validate`]. After successful validation all lookups operate on
/// trusted structure.
///
/// # Examples
///
/// ```rust,no_run
/// use typelib::Typelib;
///
/// let typelib = Typelib::from_path(std::path::Path::new("Gdk-4.0.typelib"))?;
/// typelib.validate()?;
///
/// println!("namespace: {}", typelib.namespace()?);
/// if let Some(entry) = typelib.entry_by_name("Display") {
///     println!("Display is blob type {}", entry.blob_type);
/// }
/// # Ok::<(), typelib::Error>(())
/// ```
pub struct Typelib {
    data: TypelibData,
    header: Header,
    library_paths: Vec<PathBuf>,
    directory_index: Option<Box<dyn DirectoryIndex>>,
    libraries: OnceLock<SharedLibraries>,
}

impl Typelib {
    /// Construct a typelib from an owned byte buffer.
    ///
    /// # Errors
    /// Returns [`Error::InvalidHeader`](crate::Error::InvalidHeader) if the fast
    /// header check fails.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Typelib> {
        Typelib::new(TypelibData::Memory(bytes))
    }

    /// Construct a typelib by memory-mapping the file at `path`.
    ///
    /// The mapping stays read-only for the lifetime of the typelib; the backing
    /// file must not be modified while the typelib is alive.
    ///
    /// # Errors
    /// Returns [`Error::FileError`](crate::Error::FileError) if the file cannot be
    /// opened or mapped, or
    /// [`Error::InvalidHeader`](crate::Error::InvalidHeader) if the fast header
    /// check fails.
    pub fn from_path(path: &Path) -> Result<Typelib> {
        Typelib::new(TypelibData::from_path(path)?)
    }

    fn new(data: TypelibData) -> Result<Typelib> {
        let header = Header::read(data.as_slice())?;

        Ok(Typelib {
            data,
            header,
            library_paths: Vec::new(),
            directory_index: None,
            libraries: OnceLock::new(),
        })
    }

    /// Run the full structural validation.
    ///
    /// Checks every local directory entry, every blob reachable from it, the
    /// non-local namespace references, and the attribute table bounds. Validation
    /// aborts on the first defect; the returned error carries the breadcrumb
    /// context of the blob that failed.
    ///
    /// # Errors
    /// Any of the structural error kinds, depending on the first defect found.
    pub fn validate(&self) -> Result<()> {
        validate::validate(self.data(), &self.header)
    }

    /// The raw typelib bytes.
    pub(crate) fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// The decoded header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Length of the typelib in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Whether the buffer is empty; always false for a constructed typelib.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    /// The namespace name recorded in the header.
    ///
    /// # Errors
    /// Returns a string pool error when the typelib has not passed validation and
    /// the namespace offset is damaged.
    pub fn namespace(&self) -> Result<&str> {
        string_at(self.data(), self.header.namespace)
    }

    /// The namespace version recorded in the header.
    ///
    /// # Errors
    /// Returns a string pool error when the typelib has not passed validation and
    /// the version offset is damaged.
    pub fn nsversion(&self) -> Result<&str> {
        string_at(self.data(), self.header.nsversion)
    }

    /// The comma-separated list of C symbol prefixes, or `None` when the typelib
    /// records none.
    #[must_use]
    pub fn c_prefix(&self) -> Option<&str> {
        if self.header.c_prefix == 0 {
            return None;
        }
        string_at(self.data(), self.header.c_prefix).ok()
    }

    /// The comma-separated list of shared library names, or `None` when the
    /// typelib records none.
    #[must_use]
    pub fn shared_library(&self) -> Option<&str> {
        if self.header.shared_library == 0 {
            return None;
        }
        string_at(self.data(), self.header.shared_library).ok()
    }

    /// The `|`-separated list of immediate dependencies, or `None` when the
    /// typelib records none.
    #[must_use]
    pub fn dependencies(&self) -> Option<&str> {
        if self.header.dependencies == 0 {
            return None;
        }
        string_at(self.data(), self.header.dependencies).ok()
    }

    /// Fetch the directory entry at 1-based `index`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBlob`](crate::Error::InvalidBlob) when the index is
    /// out of range, or
    /// [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) when the entry
    /// does not fit inside the buffer.
    pub fn entry(&self, index: u16) -> Result<DirEntry> {
        dir_entry(self.data(), &self.header, index)
    }

    /// Configure the search oracle for the directory-index section.
    ///
    /// Without an oracle, name lookup falls back to a linear scan even when the
    /// section is present.
    pub fn set_directory_index(&mut self, index: Box<dyn DirectoryIndex>) {
        self.directory_index = Some(index);
    }

    pub(crate) fn directory_index(&self) -> Option<&dyn DirectoryIndex> {
        self.directory_index.as_deref()
    }

    /// Append a directory to the library search paths.
    ///
    /// Relative shared-library names are resolved against the configured paths in
    /// order before the system loader is consulted. Paths must be configured
    /// before the first [`Typelib::symbol`] call; later changes have no effect on
    /// already-opened libraries.
    pub fn add_library_path(&mut self, path: impl Into<PathBuf>) {
        self.library_paths.push(path.into());
    }

    /// Resolve `name` against the typelib's shared libraries.
    ///
    /// The libraries named in the header are opened on the first call, in
    /// declaration order, and stay open until the typelib is dropped; libraries
    /// that fail to open are skipped with a warning. Returns the address of the
    /// first match, or `None` when no opened library exports `name`.
    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<*const c_void> {
        let libraries = self
            .libraries
            .get_or_init(|| SharedLibraries::open(self.shared_library(), &self.library_paths));

        libraries.symbol(name)
    }

    #[cfg(test)]
    pub(crate) fn libraries_opened(&self) -> bool {
        self.libraries.get().is_some()
    }
}
