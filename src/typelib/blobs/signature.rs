use bitflags::bitflags;

use crate::{
    file::{bytes_at, io::read_le_at},
    Result,
};

bitflags! {
    /// Return value and invocation flags of a signature.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SignatureFlags: u16 {
        /// The return value may be NULL
        const MAY_RETURN_NULL              = 1 << 0;
        /// The caller owns the returned value
        const CALLER_OWNS_RETURN_VALUE     = 1 << 1;
        /// The caller owns the returned container but not its elements
        const CALLER_OWNS_RETURN_CONTAINER = 1 << 2;
        /// The return value is skipped by language bindings
        const SKIP_RETURN                  = 1 << 3;
        /// Ownership of the instance argument is transferred to the callee
        const INSTANCE_TRANSFER_OWNERSHIP  = 1 << 4;
        /// The callable may raise an error through its last argument
        const THROWS                       = 1 << 5;
    }
}

bitflags! {
    /// Direction and ownership flags of an argument.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ArgFlags: u32 {
        /// The argument is passed into the callable
        const IN                           = 1 << 0;
        /// The argument is returned through a pointer
        const OUT                          = 1 << 1;
        /// The caller allocates storage for an out argument
        const CALLER_ALLOCATES             = 1 << 2;
        /// The argument may be NULL
        const NULLABLE                     = 1 << 3;
        /// The argument may be omitted
        const OPTIONAL                     = 1 << 4;
        /// Ownership of the value transfers to the callee
        const TRANSFER_OWNERSHIP           = 1 << 5;
        /// Ownership of the container transfers, but not its elements
        const TRANSFER_CONTAINER_OWNERSHIP = 1 << 6;
        /// The argument is the real return value of the callable
        const RETURN_VALUE                 = 1 << 7;
        /// The argument is skipped by language bindings
        const SKIP                         = 1 << 11;
    }
}

/// A signature blob: the return type slot and flags, followed contiguously by the
/// argument blobs.
#[derive(Debug, Clone, Copy)]
pub struct SignatureBlob {
    /// Raw return type slot; zero means the signature records no return type
    pub return_type: u32,
    /// Return value and invocation flags
    pub flags: SignatureFlags,
    /// Number of argument blobs following the signature
    pub n_arguments: u16,
}

impl SignatureBlob {
    /// Size of the fixed signature prefix in bytes; arguments follow contiguously
    pub const SIZE: usize = 8;

    /// Decode the signature blob at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the
    /// prefix does not fit inside the buffer.
    pub fn read(data: &[u8], offset: u32) -> Result<SignatureBlob> {
        bytes_at(data, offset, SignatureBlob::SIZE)?;

        let mut cursor = offset as usize;
        Ok(SignatureBlob {
            return_type: read_le_at::<u32>(data, &mut cursor)?,
            flags: SignatureFlags::from_bits_truncate(read_le_at::<u16>(data, &mut cursor)?),
            n_arguments: read_le_at::<u16>(data, &mut cursor)?,
        })
    }
}

/// An argument blob.
#[derive(Debug, Clone, Copy)]
pub struct ArgBlob {
    /// String pool offset of the argument name
    pub name: u32,
    /// Direction and ownership flags
    pub flags: ArgFlags,
    /// Asynchronous scope of a callback argument
    pub scope: u8,
    /// Index of the user-data argument for a callback argument, or -1
    pub closure: i8,
    /// Index of the destroy-notification argument, or -1
    pub destroy: i8,
}

impl ArgBlob {
    /// Size of an on-disk argument blob in bytes
    pub const SIZE: usize = 16;

    /// Offset of the argument type slot within the blob
    pub const TYPE_OFFSET: u32 = 12;

    /// Decode the argument blob at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBuffer`](crate::Error::TruncatedBuffer) if the blob
    /// does not fit inside the buffer.
    pub fn read(data: &[u8], offset: u32) -> Result<ArgBlob> {
        bytes_at(data, offset, ArgBlob::SIZE)?;

        let mut cursor = offset as usize;
        let name = read_le_at::<u32>(data, &mut cursor)?;
        let raw_flags = read_le_at::<u32>(data, &mut cursor)?;
        let closure = read_le_at::<i8>(data, &mut cursor)?;
        let destroy = read_le_at::<i8>(data, &mut cursor)?;

        Ok(ArgBlob {
            name,
            flags: ArgFlags::from_bits_truncate(raw_flags),
            scope: ((raw_flags >> 8) & 0x07) as u8,
            closure,
            destroy,
        })
    }
}
