// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![allow(dead_code)]
// - 'file/mod.rs' uses mmap to map a file into memory
// - 'typelib/shlib.rs' opens shared libraries and resolves raw symbol addresses

//! # typelib
//!
//! A loader and structural validator for binary typelib files. A typelib describes
//! the public API of a single module: its namespace of functions, callbacks,
//! constants, structures, unions, enumerations, flags, interfaces, and classes,
//! along with their type signatures.
//!
//! The format is a directory of fixed-size entries over typed blobs, backed by a
//! string pool, with optional side sections. Every offset and count in the file is
//! treated as untrusted input: the validator proves a buffer well-formed before any
//! higher layer relies on its structure.
//!
//! # Architecture
//!
//! - **File layer** - Owning byte container (memory buffer or memory-mapped file)
//!   and bounds-checked access primitives
//! - **Typelib layer** - Header, directory, section table, type expressions, blob
//!   views, the structural validator, and the lookup API
//! - **Binding layer** - Lazy shared-library binding and symbol resolution
//!
//! ## Key Components
//!
//! - [`Typelib`] - Main entry point: construction, validation, lookups, symbols
//! - [`typelib::directory::DirEntry`] - One directory entry
//! - [`typelib::lookup::DirectoryIndex`] - Pluggable search oracle for the
//!   directory-index section
//! - [`Error`] and [`Result`] - Error handling
//! - [`prelude`] - Convenient re-exports of the commonly used types
//!
//! # Usage Examples
//!
//! ## Loading and validating
//!
//! ```rust,no_run
//! use typelib::Typelib;
//!
//! let typelib = Typelib::from_path(std::path::Path::new("GLib-2.0.typelib"))?;
//! typelib.validate()?;
//!
//! println!("namespace: {}", typelib.namespace()?);
//! println!("{} entries, {} local", typelib.header().n_entries, typelib.header().n_local_entries);
//! # Ok::<(), typelib::Error>(())
//! ```
//!
//! ## Lookups
//!
//! ```rust,no_run
//! use typelib::Typelib;
//!
//! # let typelib = Typelib::from_path(std::path::Path::new("GLib-2.0.typelib"))?;
//! if let Some(entry) = typelib.entry_by_name("MainLoop") {
//!     println!("MainLoop found, local: {}", entry.local);
//! }
//! if typelib.matches_gtype_name_prefix("GMainLoop") {
//!     println!("GMainLoop belongs to this namespace");
//! }
//! # Ok::<(), typelib::Error>(())
//! ```
//!
//! ## Symbol resolution
//!
//! ```rust,no_run
//! use typelib::Typelib;
//!
//! # let typelib = Typelib::from_path(std::path::Path::new("GLib-2.0.typelib"))?;
//! // the shared libraries recorded in the header open lazily on first use
//! if let Some(address) = typelib.symbol("g_main_loop_new") {
//!     println!("g_main_loop_new at {address:p}");
//! }
//! # Ok::<(), typelib::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! [`Typelib`] is [`Send`] and [`Sync`]. Validation and lookups are pure reads over
//! the immutable buffer; the only lazily-initialized state is the shared-library
//! list, which is published through a one-shot initializer.

#[macro_use]
mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
pub mod prelude;

/// The typelib container and everything it is made of: header, directory,
/// sections, type expressions, blob views, and the lookup API.
pub mod typelib;

/// `typelib` Result type.
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`]. Used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `typelib` Error type.
///
/// See [`error::Error`](Error) for the flat taxonomy of structural error kinds.
pub use error::Error;

/// Maximum length of a name in the string pool, including the NUL terminator.
pub use file::MAX_NAME_LEN;

/// Main entry point for loading, validating, and querying a typelib.
pub use typelib::Typelib;
