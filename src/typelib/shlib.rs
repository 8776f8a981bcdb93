//! Shared-library binding and symbol resolution.
//!
//! A typelib's header records a comma-separated list of shared libraries that
//! implement the described API. The libraries are opened lazily, at most once per
//! typelib, on the first symbol request. Relative names are first resolved against
//! the typelib's configured search paths, then handed to the system loader; an
//! empty list means the main program image. A library that fails to open is
//! reported as a warning and skipped so that the remaining libraries still
//! resolve. Symbol resolution walks the opened handles in their declared order and
//! returns the first match.

use std::ffi::{c_void, OsStr};
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::{debug, warn};

/// The opened shared libraries of one typelib, in declaration order.
///
/// Handles close when the owning typelib is dropped.
pub(crate) struct SharedLibraries {
    libraries: Vec<Library>,
}

impl SharedLibraries {
    /// Open every library named in `shlib_list` (comma-separated).
    ///
    /// A missing or empty list opens the main program image instead, so that
    /// typelibs describing the application itself still resolve symbols. Open
    /// failures are warnings, not errors.
    pub(crate) fn open(shlib_list: Option<&str>, search_paths: &[PathBuf]) -> SharedLibraries {
        let mut libraries = Vec::new();

        match shlib_list {
            Some(list) if !list.is_empty() => {
                for shlib in list.split(',') {
                    match open_one(shlib, search_paths) {
                        Ok(library) => {
                            debug!("loaded shared library '{shlib}'");
                            libraries.push(library);
                        }
                        Err(e) => {
                            warn!(
                                "Failed to load shared library '{shlib}' referenced by the typelib: {e}"
                            );
                        }
                    }
                }
            }
            _ => match open_self() {
                Ok(library) => libraries.push(library),
                Err(e) => warn!("Failed to open the main program image: {e}"),
            },
        }

        SharedLibraries { libraries }
    }

    /// Resolve `name` against the opened libraries in order.
    ///
    /// The returned address stays valid for as long as the owning typelib is
    /// alive, because the library handles are only closed on drop.
    pub(crate) fn symbol(&self, name: &str) -> Option<*const c_void> {
        for library in &self.libraries {
            // Safety: the symbol is treated as an opaque address; no call happens
            // through it here.
            match unsafe { library.get::<*mut c_void>(name.as_bytes()) } {
                Ok(symbol) => return Some(*symbol as *const c_void),
                Err(_) => continue,
            }
        }

        None
    }

    #[cfg(test)]
    pub(crate) fn count(&self) -> usize {
        self.libraries.len()
    }
}

fn open_one(
    shlib: &str,
    search_paths: &[PathBuf],
) -> std::result::Result<Library, libloading::Error> {
    // @-prefixed names on macOS (@rpath and friends) are loader-relative and must
    // not be combined with a configured search path.
    let loader_relative = cfg!(target_os = "macos") && shlib.starts_with('@');

    if !Path::new(shlib).is_absolute() && !loader_relative {
        for dir in search_paths {
            let candidate = dir.join(shlib);
            if let Ok(library) = open_library(candidate.as_os_str()) {
                return Ok(library);
            }
        }
    }

    open_library(OsStr::new(shlib))
}

#[cfg(unix)]
fn open_library(path: &OsStr) -> std::result::Result<Library, libloading::Error> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_GLOBAL, RTLD_LAZY};

    // Safety: opening a library runs its initializers; that is the documented
    // contract of binding a typelib to its implementation.
    unsafe { UnixLibrary::open(Some(path), RTLD_LAZY | RTLD_GLOBAL) }.map(Into::into)
}

#[cfg(not(unix))]
fn open_library(path: &OsStr) -> std::result::Result<Library, libloading::Error> {
    // Safety: see the unix variant.
    unsafe { Library::new(path) }
}

#[cfg(unix)]
fn open_self() -> std::result::Result<Library, libloading::Error> {
    Ok(libloading::os::unix::Library::this().into())
}

#[cfg(windows)]
fn open_self() -> std::result::Result<Library, libloading::Error> {
    libloading::os::windows::Library::this().map(Into::into)
}
