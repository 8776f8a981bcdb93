use bitflags::bitflags;

use crate::{
    file::{bytes_at, io::read_le_at},
    Result,
};

bitflags! {
    /// Role flags of a function blob.
    ///
    /// [`SETTER`](FunctionFlags::SETTER), [`GETTER`](FunctionFlags::GETTER) and
    /// [`WRAPS_VFUNC`](FunctionFlags::WRAPS_VFUNC) are only permitted on methods of
    /// objects and interfaces; [`CONSTRUCTOR`](FunctionFlags::CONSTRUCTOR) is only
    /// permitted on methods of container kinds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FunctionFlags: u16 {
        /// The function is deprecated
        const DEPRECATED  = 1 << 0;
        /// The function sets the property named by `index`
        const SETTER      = 1 << 1;
        /// The function gets the property named by `index`
        const GETTER      = 1 << 2;
        /// The function constructs an instance of its container
        const CONSTRUCTOR = 1 << 3;
        /// The function is an invoker for the vfunc named by `index`
        const WRAPS_VFUNC = 1 << 4;
        /// The function may raise an error through its last argument
        const THROWS      = 1 << 5;
    }
}

/// A function blob: a callable with a symbol to resolve against the typelib's
/// shared libraries and a signature describing its calling convention.
#[derive(Debug, Clone, Copy)]
pub struct FunctionBlob {
    /// Raw blob type tag, expected to be function
    pub blob_type: u16,
    /// Role flags
    pub flags: FunctionFlags,
    /// Property or vfunc index; only meaningful when a setter, getter, or
    /// wrapper flag is set
    pub index: u16,
    /// String pool offset of the function name
    pub name: u32,
    /// String pool offset of the exported symbol name
    pub symbol: u32,
    /// Byte offset of the signature blob
    pub signature: u32,
    /// Whether the function is a static method
    pub is_static: bool,
}

impl FunctionBlob {
    /// Size of an on-disk function blob in bytes
    pub const SIZE: usize = 20;

    /// Decode the function blob at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the blob
    /// does not fit inside the buffer.
    pub fn read(data: &[u8], offset: u32) -> Result<FunctionBlob> {
        bytes_at(data, offset, FunctionBlob::SIZE)?;

        let mut cursor = offset as usize;
        let blob_type = read_le_at::<u16>(data, &mut cursor)?;
        let raw_flags = read_le_at::<u16>(data, &mut cursor)?;
        let name = read_le_at::<u32>(data, &mut cursor)?;
        let symbol = read_le_at::<u32>(data, &mut cursor)?;
        let signature = read_le_at::<u32>(data, &mut cursor)?;
        let raw_flags2 = read_le_at::<u16>(data, &mut cursor)?;

        Ok(FunctionBlob {
            blob_type,
            flags: FunctionFlags::from_bits_truncate(raw_flags & 0x003F),
            index: raw_flags >> 6,
            name,
            symbol,
            signature,
            is_static: raw_flags2 & 0x0001 != 0,
        })
    }
}
