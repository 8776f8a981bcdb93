use bitflags::bitflags;

use crate::{
    file::{bytes_at, io::read_le_at},
    Result,
};

bitflags! {
    /// Implementation-contract flags of a vfunc blob.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VFuncFlags: u16 {
        /// Overriding implementations must chain up to the parent implementation
        const MUST_CHAIN_UP           = 1 << 0;
        /// Derived classes must implement the vfunc
        const MUST_BE_IMPLEMENTED     = 1 << 1;
        /// Derived classes must not implement the vfunc
        const MUST_NOT_BE_IMPLEMENTED = 1 << 2;
        /// `class_closure` names the signal whose class closure this vfunc is
        const HAS_CLASS_CLOSURE       = 1 << 3;
        /// The vfunc may raise an error through its last argument
        const THROWS                  = 1 << 4;
        /// The vfunc is asynchronous
        const IS_ASYNC                = 1 << 5;
    }
}

/// A vfunc blob inside an object or interface.
#[derive(Debug, Clone, Copy)]
pub struct VFuncBlob {
    /// String pool offset of the vfunc name
    pub name: u32,
    /// Implementation-contract flags
    pub flags: VFuncFlags,
    /// Index of the class closure; only meaningful when
    /// [`VFuncFlags::HAS_CLASS_CLOSURE`] is set
    pub class_closure: u16,
    /// Byte offset of the vfunc pointer inside the class structure
    pub struct_offset: u16,
    /// 1-based index of the invoker method in the containing blob, or 0
    pub invoker: u16,
    /// Byte offset of the signature blob
    pub signature: u32,
}

impl VFuncBlob {
    /// Size of an on-disk vfunc blob in bytes
    pub const SIZE: usize = 20;

    /// Decode the vfunc blob at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the blob
    /// does not fit inside the buffer.
    pub fn read(data: &[u8], offset: u32) -> Result<VFuncBlob> {
        bytes_at(data, offset, VFuncBlob::SIZE)?;

        let mut cursor = offset as usize;
        let name = read_le_at::<u32>(data, &mut cursor)?;
        let flags = VFuncFlags::from_bits_truncate(read_le_at::<u16>(data, &mut cursor)?);
        let class_closure = read_le_at::<u16>(data, &mut cursor)?;
        let struct_offset = read_le_at::<u16>(data, &mut cursor)?;
        let invoker = read_le_at::<u16>(data, &mut cursor)? & 0x03FF;
        // skip the reserved word
        cursor += 4;
        let signature = read_le_at::<u32>(data, &mut cursor)?;

        Ok(VFuncBlob {
            name,
            flags,
            class_closure,
            struct_offset,
            invoker,
            signature,
        })
    }
}
