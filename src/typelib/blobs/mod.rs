//! Typed views over the fixed-layout blobs embedded in a typelib.
//!
//! Every blob kind has a fixed prefix size recorded both here (as a `SIZE`
//! constant) and in the header; the two must agree for a file to load. Each view's
//! `read` decodes the prefix at a byte offset after bounds-checking it. Variable
//! tails (arguments, fields, methods, values, and so on) are walked by the
//! validator using these same constants.

mod attribute;
mod callback;
mod common;
mod constant;
mod enums;
mod field;
mod function;
mod interface;
mod object;
mod property;
mod signal;
mod signature;
mod structs;
mod union;
mod vfunc;

pub use attribute::AttributeBlob;
pub use callback::CallbackBlob;
pub use common::CommonBlob;
pub use constant::ConstantBlob;
pub use enums::{EnumBlob, ValueBlob};
pub use field::{FieldBlob, FieldFlags};
pub use function::{FunctionBlob, FunctionFlags};
pub use interface::InterfaceBlob;
pub use object::ObjectBlob;
pub use property::{PropertyBlob, PropertyFlags};
pub use signal::{SignalBlob, SignalFlags};
pub use signature::{ArgBlob, ArgFlags, SignatureBlob, SignatureFlags};
pub use structs::StructBlob;
pub use union::UnionBlob;
pub use vfunc::{VFuncBlob, VFuncFlags};
