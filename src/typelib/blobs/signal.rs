use bitflags::bitflags;

use crate::{
    file::{bytes_at, io::read_le_at},
    Result,
};

bitflags! {
    /// Emission and closure flags of a signal blob.
    ///
    /// Exactly one of [`RUN_FIRST`](SignalFlags::RUN_FIRST),
    /// [`RUN_LAST`](SignalFlags::RUN_LAST) and
    /// [`RUN_CLEANUP`](SignalFlags::RUN_CLEANUP) must be set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SignalFlags: u16 {
        /// The signal is deprecated
        const DEPRECATED        = 1 << 0;
        /// The default handler runs in the first emission stage
        const RUN_FIRST         = 1 << 1;
        /// The default handler runs in the last emission stage
        const RUN_LAST          = 1 << 2;
        /// The default handler runs in the cleanup emission stage
        const RUN_CLEANUP       = 1 << 3;
        /// The signal does not recurse on re-emission
        const NO_RECURSE        = 1 << 4;
        /// The signal supports detail strings
        const DETAILED          = 1 << 5;
        /// The signal may be emitted with an action request
        const ACTION            = 1 << 6;
        /// Emission hooks are not supported
        const NO_HOOKS          = 1 << 7;
        /// `class_closure` names a vfunc in the containing blob
        const HAS_CLASS_CLOSURE = 1 << 8;
        /// A true return value stops further emission
        const TRUE_STOPS_EMIT   = 1 << 9;
    }
}

/// A signal blob inside an object or interface.
#[derive(Debug, Clone, Copy)]
pub struct SignalBlob {
    /// Emission and closure flags
    pub flags: SignalFlags,
    /// Index of the class closure vfunc; only meaningful when
    /// [`SignalFlags::HAS_CLASS_CLOSURE`] is set
    pub class_closure: u16,
    /// String pool offset of the signal name
    pub name: u32,
    /// Byte offset of the signature blob
    pub signature: u32,
}

impl SignalBlob {
    /// Size of an on-disk signal blob in bytes
    pub const SIZE: usize = 16;

    /// Decode the signal blob at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the blob
    /// does not fit inside the buffer.
    pub fn read(data: &[u8], offset: u32) -> Result<SignalBlob> {
        bytes_at(data, offset, SignalBlob::SIZE)?;

        let mut cursor = offset as usize;
        let flags = SignalFlags::from_bits_truncate(read_le_at::<u16>(data, &mut cursor)?);
        let class_closure = read_le_at::<u16>(data, &mut cursor)?;
        let name = read_le_at::<u32>(data, &mut cursor)?;
        // skip the reserved word
        cursor += 4;
        let signature = read_le_at::<u32>(data, &mut cursor)?;

        Ok(SignalBlob {
            flags,
            class_closure,
            name,
            signature,
        })
    }

    /// How many of the three run-stage flags are set; must be exactly one for the
    /// blob to be valid.
    #[must_use]
    pub fn run_flag_count(&self) -> u32 {
        (self.flags & (SignalFlags::RUN_FIRST | SignalFlags::RUN_LAST | SignalFlags::RUN_CLEANUP))
            .bits()
            .count_ones()
    }
}
