//! Directory lookups: by name, by type-registration name, by error domain, and
//! the C-prefix match.
//!
//! Name lookup uses the directory-index section when one is present and an oracle
//! has been configured; the oracle's candidate is always verified by comparing the
//! entry name, so hash data in the file can never redirect a lookup to the wrong
//! entry. Without a section or an oracle, lookup falls back to a linear scan over
//! the local entries.
//!
//! All lookups return `None` for absent names; they never fail.

use crate::{
    file::{io::read_le_at, string_at},
    typelib::{
        blobs::EnumBlob,
        directory::{dir_entry, BlobType, DirEntry},
        section::{section_by_id, SectionType},
        Typelib,
    },
};

/// Search oracle over the on-disk directory-index section.
///
/// The section payload is an opaque precomputed hash over the names of the local
/// directory entries. An implementation maps a name to a candidate entry position
/// in `0..n_entries`; the typelib always verifies the candidate by string
/// comparison before returning it, so an oracle may return garbage for names that
/// are not present.
pub trait DirectoryIndex: Send + Sync {
    /// Return the candidate position (0-based, within the local entries) for
    /// `name`, given the raw section payload.
    fn search(&self, hash: &[u8], name: &str, n_entries: u16) -> u16;
}

impl Typelib {
    /// Look up the directory entry with the given name.
    ///
    /// Uses the directory-index section when present and an oracle is configured
    /// (see [`Typelib::set_directory_index`]); otherwise scans the local entries.
    /// Returns `None` when no local entry has this name.
    #[must_use]
    pub fn entry_by_name(&self, name: &str) -> Option<DirEntry> {
        let data = self.data();
        let header = self.header();

        let index_section = section_by_id(data, header, SectionType::DirectoryIndex)
            .ok()
            .flatten();

        if let (Some(section), Some(oracle)) = (index_section, self.directory_index()) {
            let hash = data.get(section.offset as usize..)?;
            let candidate = oracle.search(hash, name, header.n_local_entries);

            let entry = dir_entry(data, header, candidate.checked_add(1)?).ok()?;
            let entry_name = string_at(data, entry.name).ok()?;
            if entry_name == name {
                return Some(entry);
            }
            return None;
        }

        for index in 1..=header.n_local_entries {
            let entry = dir_entry(data, header, index).ok()?;
            if string_at(data, entry.name).ok()? == name {
                return Some(entry);
            }
        }

        None
    }

    /// Look up the local registered-type entry whose type-registration name is
    /// `gtype_name`.
    ///
    /// Only struct, boxed, enum, flags, object, and interface entries carry a
    /// registration name; entries with a zero name are skipped.
    #[must_use]
    pub fn entry_by_gtype_name(&self, gtype_name: &str) -> Option<DirEntry> {
        let data = self.data();
        let header = self.header();

        for index in 1..=header.n_local_entries {
            let entry = dir_entry(data, header, index).ok()?;
            if !entry.is_registered_type() {
                continue;
            }

            // registered-type blobs share the gtype_name slot after the common
            // prefix
            let mut at = entry.offset as usize + 8;
            let name_offset = read_le_at::<u32>(data, &mut at).ok()?;
            if name_offset == 0 {
                continue;
            }

            if string_at(data, name_offset).ok()? == gtype_name {
                return Some(entry);
            }
        }

        None
    }

    /// Look up the local enum entry whose error domain is `domain`.
    ///
    /// Only plain enums participate; flags and other kinds are skipped, as are
    /// enums without a recorded error domain.
    #[must_use]
    pub fn entry_by_error_domain(&self, domain: &str) -> Option<DirEntry> {
        let data = self.data();
        let header = self.header();

        for index in 1..=header.n_local_entries {
            let entry = dir_entry(data, header, index).ok()?;
            if entry.blob_type != BlobType::Enum as u16 {
                continue;
            }

            let blob = EnumBlob::read(data, entry.offset).ok()?;
            if blob.error_domain == 0 {
                continue;
            }

            if string_at(data, blob.error_domain).ok()? == domain {
                return Some(entry);
            }
        }

        None
    }

    /// Check whether one of the recorded C prefixes is a prefix of `gtype_name`.
    ///
    /// The header's C-prefix field is a comma-separated list. A prefix matches
    /// when `gtype_name` starts with it and the immediately following character is
    /// an ASCII upper-case letter: a typelib offering the `Gdk` prefix matches
    /// `GdkX11Cursor`, but one offering `G` does not.
    #[must_use]
    pub fn matches_gtype_name_prefix(&self, gtype_name: &str) -> bool {
        let Some(c_prefix) = self.c_prefix() else {
            return false;
        };
        if c_prefix.is_empty() {
            return false;
        }

        for prefix in c_prefix.split(',') {
            if let Some(rest) = gtype_name.strip_prefix(prefix) {
                if rest.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
                    return true;
                }
            }
        }

        false
    }
}
