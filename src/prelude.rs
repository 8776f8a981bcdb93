//! # typelib Prelude
//!
//! This module provides a convenient prelude for the most commonly used types of
//! the crate. Import it to get quick access to the essentials:
//!
//! ```rust,no_run
//! use typelib::prelude::*;
//!
//! let typelib = Typelib::from_path(std::path::Path::new("GLib-2.0.typelib"))?;
//! typelib.validate()?;
//! # Ok::<(), Error>(())
//! ```

/// The main error type for all typelib operations
pub use crate::Error;

/// The result type used throughout the crate
pub use crate::Result;

/// Main entry point for loading, validating, and querying a typelib
pub use crate::Typelib;

/// The decoded fixed header
pub use crate::typelib::header::{Header, TYPELIB_MAGIC};

/// Directory entries and blob type tags
pub use crate::typelib::directory::{BlobType, DirEntry};

/// Search oracle for the directory-index section
pub use crate::typelib::lookup::DirectoryIndex;

/// Type tags of the type-expression layer
pub use crate::typelib::types::TypeTag;
