//! Whole-file structural validation.
//!
//! The validator walks every local entry reachable from the directory and checks
//! each blob's local invariants: tags, name hygiene, cross-reference ranges,
//! declared counts against observed tails, alignment, and the flag matrices. It is
//! a pure reader over the immutable buffer; a single failure aborts the whole pass.
//!
//! While descending into named blobs the validator keeps a breadcrumb stack of the
//! enclosing blob names. On failure the stack is rendered into the error message
//! (`In directory (Context: Device/get_name): ...`) so that a defect deep inside a
//! tail can be located without offsets.

use crate::{
    file::{bytes_at, io::read_le_at, is_aligned, string_at, validate_name},
    typelib::{
        blobs::{
            ArgBlob, CallbackBlob, CommonBlob, ConstantBlob, EnumBlob, FieldBlob, FunctionBlob,
            FunctionFlags, InterfaceBlob, ObjectBlob, PropertyBlob, SignalBlob, SignalFlags,
            SignatureBlob, StructBlob, UnionBlob, VFuncBlob, VFuncFlags, ValueBlob,
        },
        directory::{dir_entry, BlobType, DirEntry},
        header::Header,
        types::{ArrayTypeBlob, ComplexTypeFlags, ErrorTypeBlob, ParamTypeBlob, SimpleType, TypeTag},
    },
    Error, Result,
};

/// Run the full structural validation over `data`.
///
/// `header` must be the decoded header of the same buffer. Errors come back with
/// the breadcrumb context of the blob being validated when the failure occurred.
pub(crate) fn validate(data: &[u8], header: &Header) -> Result<()> {
    let mut validator = Validator {
        data,
        header,
        context: Vec::new(),
    };

    if let Err(e) = validator.validate_header() {
        return Err(validator.contextualize("header", e));
    }
    if let Err(e) = validator.validate_directory() {
        return Err(validator.contextualize("directory", e));
    }
    if let Err(e) = validator.validate_attributes() {
        return Err(validator.contextualize("attributes", e));
    }

    Ok(())
}

/// Narrow a 64-bit tail cursor back to a buffer offset.
///
/// Tail arithmetic is done in u64 so that attacker-chosen counts cannot wrap; a
/// cursor that no longer fits in u32 is necessarily outside the buffer.
fn offset32(value: u64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| typelib_error!(TruncatedBuffer, "Offset {} exceeds the buffer range", value))
}

struct Validator<'a> {
    data: &'a [u8],
    header: &'a Header,
    context: Vec<&'a str>,
}

impl<'a> Validator<'a> {
    fn contextualize(&self, section: &str, error: Error) -> Error {
        if self.context.is_empty() {
            error.prefixed(&format!("In {section}: "))
        } else {
            // innermost frame first, matching the order defects are found in
            let path = self
                .context
                .iter()
                .rev()
                .copied()
                .collect::<Vec<_>>()
                .join("/");
            error.prefixed(&format!("In {section} (Context: {path}): "))
        }
    }

    fn validate_header(&mut self) -> Result<()> {
        let header = Header::read(self.data)?;
        validate_name(self.data, "namespace", header.namespace)?;
        Ok(())
    }

    fn validate_directory(&mut self) -> Result<()> {
        let dir_size = u64::from(self.header.n_entries) * DirEntry::SIZE as u64;
        bytes_at(self.data, self.header.directory, offset32(dir_size)? as usize)?;

        for i in 0..self.header.n_entries {
            let entry = dir_entry(self.data, self.header, i + 1)?;

            validate_name(self.data, "entry", entry.name)?;

            if (entry.local && entry.blob_type == BlobType::Invalid as u16)
                || entry.blob_type > BlobType::MAX
            {
                return Err(typelib_error!(InvalidDirectory, "Invalid entry type"));
            }

            if i < self.header.n_local_entries {
                if !entry.local {
                    return Err(typelib_error!(
                        InvalidDirectory,
                        "Too few local directory entries"
                    ));
                }

                if !is_aligned(entry.offset) {
                    return Err(typelib_error!(InvalidDirectory, "Misaligned entry"));
                }

                self.validate_blob(entry.offset, entry.blob_type)?;
            } else {
                if entry.local {
                    return Err(typelib_error!(
                        InvalidDirectory,
                        "Too many local directory entries"
                    ));
                }

                validate_name(self.data, "namespace", entry.offset)?;
            }
        }

        Ok(())
    }

    fn validate_attributes(&mut self) -> Result<()> {
        let end = u64::from(self.header.attributes)
            + u64::from(self.header.n_attributes) * crate::typelib::blobs::AttributeBlob::SIZE as u64;
        if u64::from(self.header.size) < end {
            return Err(typelib_error!(TruncatedBuffer, "The buffer is too short"));
        }

        Ok(())
    }

    fn validate_blob(&mut self, offset: u32, entry_type: u16) -> Result<()> {
        let common = CommonBlob::read(self.data, offset)?;

        if common.blob_type != entry_type {
            return Err(typelib_error!(
                InvalidBlob,
                "Wrong blob type {}, directory entry says {}",
                common.blob_type,
                entry_type
            ));
        }

        match BlobType::from_u16(common.blob_type) {
            Some(BlobType::Function) => self.validate_function_blob(offset, None),
            Some(BlobType::Callback) => self.validate_callback_blob(offset),
            Some(kind @ (BlobType::Struct | BlobType::Boxed)) => {
                self.validate_struct_blob(offset, kind)
            }
            Some(kind @ (BlobType::Enum | BlobType::Flags)) => {
                self.validate_enum_blob(offset, kind)
            }
            Some(BlobType::Object) => self.validate_object_blob(offset),
            Some(BlobType::Interface) => self.validate_interface_blob(offset),
            Some(BlobType::Constant) => self.validate_constant_blob(offset),
            Some(BlobType::Union) => self.validate_union_blob(offset),
            _ => Err(typelib_error!(InvalidEntry, "Invalid blob type")),
        }
    }

    // Type expressions

    fn validate_type_blob(&mut self, offset: u32) -> Result<()> {
        match SimpleType::read(self.data, offset)? {
            SimpleType::Basic { tag, pointer } => {
                let Some(tag) = TypeTag::from_u8(tag).filter(|t| t.is_basic()) else {
                    return Err(typelib_error!(
                        InvalidBlob,
                        "Invalid non-basic tag {} in simple type",
                        tag
                    ));
                };

                if tag >= TypeTag::Utf8 && tag != TypeTag::Unichar && !pointer {
                    return Err(typelib_error!(
                        InvalidBlob,
                        "Pointer type expected for tag {}",
                        tag as u8
                    ));
                }

                Ok(())
            }
            SimpleType::Offset(complex_offset) => {
                let flags = ComplexTypeFlags::read(self.data, complex_offset)?;

                match TypeTag::from_u8(flags.tag) {
                    Some(TypeTag::Array) => self.validate_array_type_blob(complex_offset),
                    Some(TypeTag::Interface) => self.validate_interface_type_blob(complex_offset),
                    Some(TypeTag::GList | TypeTag::GSList) => {
                        self.validate_param_type_blob(complex_offset, 1)
                    }
                    Some(TypeTag::GHash) => self.validate_param_type_blob(complex_offset, 2),
                    Some(TypeTag::Error) => self.validate_error_type_blob(complex_offset),
                    _ => Err(typelib_error!(InvalidBlob, "Wrong tag in complex type")),
                }
            }
        }
    }

    fn validate_array_type_blob(&mut self, offset: u32) -> Result<()> {
        // the dimension field is not cross-checked against the enclosing signature
        ArrayTypeBlob::read(self.data, offset)?;
        self.validate_type_blob(offset + ArrayTypeBlob::TYPE_OFFSET)
    }

    fn validate_interface_type_blob(&mut self, offset: u32) -> Result<()> {
        let blob = crate::typelib::types::InterfaceTypeBlob::read(self.data, offset)?;

        // non-local targets are accepted as opaque; the index itself must resolve
        dir_entry(self.data, self.header, blob.interface)?;
        Ok(())
    }

    fn validate_param_type_blob(&mut self, offset: u32, n_params: u16) -> Result<()> {
        let flags = ComplexTypeFlags::read(self.data, offset)?;
        let blob = ParamTypeBlob::read(self.data, offset)?;

        if !blob.pointer {
            return Err(typelib_error!(
                InvalidBlob,
                "Pointer type expected for tag {}",
                flags.tag
            ));
        }

        if blob.n_types != n_params {
            return Err(typelib_error!(InvalidBlob, "Parameter type number mismatch"));
        }

        for i in 0..n_params {
            let param_offset = offset32(
                u64::from(offset)
                    + ParamTypeBlob::SIZE as u64
                    + u64::from(i) * SimpleType::SIZE as u64,
            )?;
            self.validate_type_blob(param_offset)?;
        }

        Ok(())
    }

    fn validate_error_type_blob(&mut self, offset: u32) -> Result<()> {
        let blob = ErrorTypeBlob::read(self.data, offset)?;

        if !blob.pointer {
            return Err(typelib_error!(
                InvalidBlob,
                "Pointer type expected for tag {}",
                TypeTag::Error as u8
            ));
        }

        Ok(())
    }

    // Callables

    fn validate_signature_blob(&mut self, offset: u32) -> Result<()> {
        let blob = SignatureBlob::read(self.data, offset)?;

        if blob.return_type != 0 {
            self.validate_type_blob(offset)?;
        }

        for i in 0..blob.n_arguments {
            let arg_offset = offset32(
                u64::from(offset)
                    + SignatureBlob::SIZE as u64
                    + u64::from(i) * ArgBlob::SIZE as u64,
            )?;
            self.validate_arg_blob(arg_offset)?;
        }

        Ok(())
    }

    fn validate_arg_blob(&mut self, offset: u32) -> Result<()> {
        let blob = ArgBlob::read(self.data, offset)?;

        validate_name(self.data, "argument", blob.name)?;
        self.validate_type_blob(offset + ArgBlob::TYPE_OFFSET)
    }

    /// Resolve the complex tag of a signature's return type, for the constructor
    /// return-type rule.
    fn constructor_return_tag(&mut self, signature_offset: u32) -> Result<u8> {
        let blob = SignatureBlob::read(self.data, signature_offset)?;

        if blob.return_type == 0 {
            return Err(typelib_error!(InvalidBlob, "No return type found in signature"));
        }

        match SimpleType::read(self.data, signature_offset)? {
            SimpleType::Basic { tag, .. } => Err(typelib_error!(
                InvalidBlob,
                "Expected non-basic type but got {}",
                tag
            )),
            SimpleType::Offset(complex_offset) => {
                Ok(ComplexTypeFlags::read(self.data, complex_offset)?.tag)
            }
        }
    }

    fn validate_function_blob(&mut self, offset: u32, container: Option<BlobType>) -> Result<()> {
        let blob = FunctionBlob::read(self.data, offset)?;

        if blob.blob_type != BlobType::Function as u16 {
            return Err(typelib_error!(
                InvalidBlob,
                "Wrong blob type {}, expected function",
                blob.blob_type
            ));
        }

        let name = validate_name(self.data, "function", blob.name)?;
        self.context.push(name);

        validate_name(self.data, "function symbol", blob.symbol)?;

        if blob.flags.contains(FunctionFlags::CONSTRUCTOR)
            && !matches!(
                container,
                Some(
                    BlobType::Boxed
                        | BlobType::Struct
                        | BlobType::Union
                        | BlobType::Object
                        | BlobType::Interface
                )
            )
        {
            return Err(typelib_error!(InvalidBlob, "Constructor not allowed"));
        }

        let accessor = blob.flags.intersects(
            FunctionFlags::SETTER | FunctionFlags::GETTER | FunctionFlags::WRAPS_VFUNC,
        );

        if accessor && !matches!(container, Some(BlobType::Object | BlobType::Interface)) {
            return Err(typelib_error!(
                InvalidBlob,
                "Setter, getter or wrapper not allowed"
            ));
        }

        if blob.index != 0 && !accessor {
            return Err(typelib_error!(InvalidBlob, "Must be setter, getter or wrapper"));
        }

        self.validate_signature_blob(blob.signature)?;

        if blob.flags.contains(FunctionFlags::CONSTRUCTOR) {
            let tag = self.constructor_return_tag(blob.signature)?;
            if tag != TypeTag::Interface as u8
                && matches!(container, Some(BlobType::Object | BlobType::Interface))
            {
                let tag_name = TypeTag::from_u8(tag)
                    .map_or_else(|| tag.to_string(), |t| t.to_string());
                return Err(typelib_error!(
                    InvalidBlob,
                    "Invalid return type '{}' for constructor '{}'",
                    tag_name,
                    string_at(self.data, blob.symbol).unwrap_or("<invalid>")
                ));
            }
        }

        self.context.pop();
        Ok(())
    }

    fn validate_callback_blob(&mut self, offset: u32) -> Result<()> {
        let blob = CallbackBlob::read(self.data, offset)?;

        if blob.blob_type != BlobType::Callback as u16 {
            return Err(typelib_error!(InvalidBlob, "Wrong blob type"));
        }

        let name = validate_name(self.data, "callback", blob.name)?;
        self.context.push(name);

        self.validate_signature_blob(blob.signature)?;

        self.context.pop();
        Ok(())
    }

    // Members of compound blobs

    fn validate_constant_blob(&mut self, offset: u32) -> Result<()> {
        let blob = ConstantBlob::read(self.data, offset)?;

        if blob.blob_type != BlobType::Constant as u16 {
            return Err(typelib_error!(InvalidBlob, "Wrong blob type"));
        }

        validate_name(self.data, "constant", blob.name)?;

        let type_offset = offset + ConstantBlob::TYPE_OFFSET;
        self.validate_type_blob(type_offset)?;

        if !is_aligned(blob.offset) {
            return Err(typelib_error!(InvalidBlob, "Misaligned constant value"));
        }

        if let SimpleType::Basic { tag, .. } = SimpleType::read(self.data, type_offset)? {
            // the tag was established as basic by validate_type_blob above
            if let Some(tag) = TypeTag::from_u8(tag) {
                if tag == TypeTag::Void {
                    return Err(typelib_error!(InvalidBlob, "Constant value type void"));
                }

                if let Some(width) = tag.fixed_size() {
                    if blob.size != width {
                        return Err(typelib_error!(InvalidBlob, "Constant value size mismatch"));
                    }
                }
            }
        }

        Ok(())
    }

    fn validate_value_blob(&mut self, offset: u32) -> Result<()> {
        let blob = ValueBlob::read(self.data, offset)?;

        // duplicate values are permitted, only the name is checked
        validate_name(self.data, "value", blob.name)?;
        Ok(())
    }

    /// Validate one field; returns whether an embedded callback follows it, so the
    /// caller can advance its tail cursor and keep the callback tally.
    fn validate_field_blob(&mut self, offset: u32) -> Result<bool> {
        let blob = FieldBlob::read(self.data, offset)?;

        validate_name(self.data, "field", blob.name)?;

        if blob.has_embedded_type() {
            self.validate_callback_blob(offset + FieldBlob::SIZE as u32)?;
        } else {
            self.validate_type_blob(offset + FieldBlob::TYPE_OFFSET)?;
        }

        Ok(blob.has_embedded_type())
    }

    fn validate_property_blob(&mut self, offset: u32) -> Result<()> {
        let blob = PropertyBlob::read(self.data, offset)?;

        validate_name(self.data, "property", blob.name)?;
        self.validate_type_blob(offset + PropertyBlob::TYPE_OFFSET)
    }

    /// `container_offset` points at the object or interface blob owning the signal.
    fn validate_signal_blob(&mut self, offset: u32, container_offset: u32) -> Result<()> {
        let blob = SignalBlob::read(self.data, offset)?;

        validate_name(self.data, "signal", blob.name)?;

        if blob.run_flag_count() != 1 {
            return Err(typelib_error!(InvalidBlob, "Invalid signal run flags"));
        }

        if blob.flags.contains(SignalFlags::HAS_CLASS_CLOSURE) {
            let n_signals = self.container_count(container_offset, |object| object.n_signals, |iface| {
                iface.n_signals
            })?;

            if blob.class_closure >= n_signals {
                return Err(typelib_error!(InvalidBlob, "Invalid class closure index"));
            }
        }

        self.validate_signature_blob(blob.signature)
    }

    fn validate_vfunc_blob(&mut self, offset: u32, container_offset: u32) -> Result<()> {
        let blob = VFuncBlob::read(self.data, offset)?;

        validate_name(self.data, "vfunc", blob.name)?;

        if blob.flags.contains(VFuncFlags::HAS_CLASS_CLOSURE) {
            let n_vfuncs = self.container_count(container_offset, |object| object.n_vfuncs, |iface| {
                iface.n_vfuncs
            })?;

            if blob.class_closure >= n_vfuncs {
                return Err(typelib_error!(InvalidBlob, "Invalid class closure index"));
            }
        }

        self.validate_signature_blob(blob.signature)
    }

    /// Read a member count from the object or interface blob at `container_offset`.
    fn container_count(
        &self,
        container_offset: u32,
        from_object: impl FnOnce(&ObjectBlob) -> u16,
        from_interface: impl FnOnce(&InterfaceBlob) -> u16,
    ) -> Result<u16> {
        let common = CommonBlob::read(self.data, container_offset)?;

        if common.blob_type == BlobType::Object as u16 {
            Ok(from_object(&ObjectBlob::read(self.data, container_offset)?))
        } else {
            Ok(from_interface(&InterfaceBlob::read(
                self.data,
                container_offset,
            )?))
        }
    }

    // Compound blobs

    fn validate_struct_blob(&mut self, offset: u32, kind: BlobType) -> Result<()> {
        let blob = StructBlob::read(self.data, offset)?;

        if blob.blob_type != kind as u16 {
            return Err(typelib_error!(InvalidBlob, "Wrong blob type"));
        }

        let name = validate_name(self.data, "struct", blob.name)?;
        self.context.push(name);

        if !blob.unregistered {
            validate_name(self.data, "boxed", blob.gtype_name)?;
            validate_name(self.data, "boxed", blob.gtype_init)?;
        } else if blob.gtype_name != 0 || blob.gtype_init != 0 {
            return Err(typelib_error!(InvalidBlob, "Gtype data in struct"));
        }

        let tail = StructBlob::SIZE as u64
            + u64::from(blob.n_fields) * FieldBlob::SIZE as u64
            + u64::from(blob.n_methods) * FunctionBlob::SIZE as u64;
        bytes_at(self.data, offset, offset32(tail)? as usize)?;

        let mut cursor = u64::from(offset) + StructBlob::SIZE as u64;

        for _ in 0..blob.n_fields {
            let embedded = self.validate_field_blob(offset32(cursor)?)?;
            cursor += FieldBlob::SIZE as u64;
            if embedded {
                cursor += CallbackBlob::SIZE as u64;
            }
        }

        for _ in 0..blob.n_methods {
            self.validate_function_blob(offset32(cursor)?, Some(kind))?;
            cursor += FunctionBlob::SIZE as u64;
        }

        self.context.pop();
        Ok(())
    }

    fn validate_enum_blob(&mut self, offset: u32, kind: BlobType) -> Result<()> {
        let blob = EnumBlob::read(self.data, offset)?;

        if blob.blob_type != kind as u16 {
            return Err(typelib_error!(InvalidBlob, "Wrong blob type"));
        }

        if !blob.unregistered {
            validate_name(self.data, "enum", blob.gtype_name)?;
            validate_name(self.data, "enum", blob.gtype_init)?;
        } else if blob.gtype_name != 0 || blob.gtype_init != 0 {
            return Err(typelib_error!(InvalidBlob, "Gtype data in unregistered enum"));
        }

        let name = validate_name(self.data, "enum", blob.name)?;

        let tail = EnumBlob::SIZE as u64
            + u64::from(blob.n_values) * ValueBlob::SIZE as u64
            + u64::from(blob.n_methods) * FunctionBlob::SIZE as u64;
        bytes_at(self.data, offset, offset32(tail)? as usize)?;

        self.context.push(name);

        let mut cursor = u64::from(offset) + EnumBlob::SIZE as u64;

        for _ in 0..blob.n_values {
            self.validate_value_blob(offset32(cursor)?)?;
            cursor += ValueBlob::SIZE as u64;
        }

        for _ in 0..blob.n_methods {
            self.validate_function_blob(offset32(cursor)?, Some(BlobType::Enum))?;
            cursor += FunctionBlob::SIZE as u64;
        }

        self.context.pop();
        Ok(())
    }

    fn validate_object_blob(&mut self, offset: u32) -> Result<()> {
        let blob = ObjectBlob::read(self.data, offset)?;

        if blob.blob_type != BlobType::Object as u16 {
            return Err(typelib_error!(InvalidBlob, "Wrong blob type"));
        }

        validate_name(self.data, "object", blob.gtype_name)?;
        validate_name(self.data, "object", blob.gtype_init)?;
        let name = validate_name(self.data, "object", blob.name)?;

        if blob.parent > self.header.n_entries {
            return Err(typelib_error!(InvalidBlob, "Invalid parent index"));
        }

        if blob.parent != 0 {
            let entry = dir_entry(self.data, self.header, blob.parent)?;
            if entry.blob_type != BlobType::Object as u16 && (entry.local || entry.blob_type != 0) {
                return Err(typelib_error!(InvalidBlob, "Parent not object"));
            }
        }

        if blob.gtype_struct != 0 {
            let entry = dir_entry(self.data, self.header, blob.gtype_struct)?;
            if entry.blob_type != BlobType::Struct as u16 && entry.local {
                return Err(typelib_error!(
                    InvalidBlob,
                    "Class struct invalid type or not local"
                ));
            }
        }

        let padded_interfaces = u64::from(blob.n_interfaces) + u64::from(blob.n_interfaces % 2);
        let tail = ObjectBlob::SIZE as u64
            + padded_interfaces * 2
            + u64::from(blob.n_fields) * FieldBlob::SIZE as u64
            + u64::from(blob.n_properties) * PropertyBlob::SIZE as u64
            + u64::from(blob.n_methods) * FunctionBlob::SIZE as u64
            + u64::from(blob.n_signals) * SignalBlob::SIZE as u64
            + u64::from(blob.n_vfuncs) * VFuncBlob::SIZE as u64
            + u64::from(blob.n_constants) * ConstantBlob::SIZE as u64;
        bytes_at(self.data, offset, offset32(tail)? as usize)?;

        let mut cursor = u64::from(offset) + ObjectBlob::SIZE as u64;

        for _ in 0..blob.n_interfaces {
            let mut at = offset32(cursor)? as usize;
            let iface = read_le_at::<u16>(self.data, &mut at)?;

            if iface == 0 || iface > self.header.n_entries {
                return Err(typelib_error!(InvalidBlob, "Invalid interface index"));
            }

            let entry = dir_entry(self.data, self.header, iface)?;
            if entry.blob_type != BlobType::Interface as u16
                && (entry.local || entry.blob_type != 0)
            {
                return Err(typelib_error!(InvalidBlob, "Not an interface"));
            }

            cursor += 2;
        }

        cursor += 2 * u64::from(blob.n_interfaces % 2);

        self.context.push(name);

        let mut n_field_callbacks: u16 = 0;
        for _ in 0..blob.n_fields {
            let embedded = self.validate_field_blob(offset32(cursor)?)?;
            cursor += FieldBlob::SIZE as u64;
            if embedded {
                cursor += CallbackBlob::SIZE as u64;
                n_field_callbacks += 1;
            }
        }

        if blob.n_field_callbacks != n_field_callbacks {
            return Err(typelib_error!(
                InvalidBlob,
                "Incorrect number of field callbacks; expected {}, got {}",
                blob.n_field_callbacks,
                n_field_callbacks
            ));
        }

        for _ in 0..blob.n_properties {
            self.validate_property_blob(offset32(cursor)?)?;
            cursor += PropertyBlob::SIZE as u64;
        }

        for _ in 0..blob.n_methods {
            self.validate_function_blob(offset32(cursor)?, Some(BlobType::Object))?;
            cursor += FunctionBlob::SIZE as u64;
        }

        for _ in 0..blob.n_signals {
            self.validate_signal_blob(offset32(cursor)?, offset)?;
            cursor += SignalBlob::SIZE as u64;
        }

        for _ in 0..blob.n_vfuncs {
            self.validate_vfunc_blob(offset32(cursor)?, offset)?;
            cursor += VFuncBlob::SIZE as u64;
        }

        for _ in 0..blob.n_constants {
            self.validate_constant_blob(offset32(cursor)?)?;
            cursor += ConstantBlob::SIZE as u64;
        }

        self.context.pop();
        Ok(())
    }

    fn validate_interface_blob(&mut self, offset: u32) -> Result<()> {
        let blob = InterfaceBlob::read(self.data, offset)?;

        if blob.blob_type != BlobType::Interface as u16 {
            return Err(typelib_error!(
                InvalidBlob,
                "Wrong blob type; expected interface, got {}",
                blob.blob_type
            ));
        }

        validate_name(self.data, "interface", blob.gtype_name)?;
        validate_name(self.data, "interface", blob.gtype_init)?;
        let name = validate_name(self.data, "interface", blob.name)?;

        let padded_prerequisites =
            u64::from(blob.n_prerequisites) + u64::from(blob.n_prerequisites % 2);
        let tail = InterfaceBlob::SIZE as u64
            + padded_prerequisites * 2
            + u64::from(blob.n_properties) * PropertyBlob::SIZE as u64
            + u64::from(blob.n_methods) * FunctionBlob::SIZE as u64
            + u64::from(blob.n_signals) * SignalBlob::SIZE as u64
            + u64::from(blob.n_vfuncs) * VFuncBlob::SIZE as u64
            + u64::from(blob.n_constants) * ConstantBlob::SIZE as u64;
        bytes_at(self.data, offset, offset32(tail)? as usize)?;

        let mut cursor = u64::from(offset) + InterfaceBlob::SIZE as u64;

        for _ in 0..blob.n_prerequisites {
            let mut at = offset32(cursor)? as usize;
            let req = read_le_at::<u16>(self.data, &mut at)?;

            if req == 0 || req > self.header.n_entries {
                return Err(typelib_error!(InvalidBlob, "Invalid prerequisite index"));
            }

            let entry = dir_entry(self.data, self.header, req)?;
            if entry.blob_type != BlobType::Interface as u16
                && entry.blob_type != BlobType::Object as u16
                && (entry.local || entry.blob_type != 0)
            {
                return Err(typelib_error!(InvalidBlob, "Not an interface or object"));
            }

            cursor += 2;
        }

        cursor += 2 * u64::from(blob.n_prerequisites % 2);

        self.context.push(name);

        for _ in 0..blob.n_properties {
            self.validate_property_blob(offset32(cursor)?)?;
            cursor += PropertyBlob::SIZE as u64;
        }

        for _ in 0..blob.n_methods {
            self.validate_function_blob(offset32(cursor)?, Some(BlobType::Interface))?;
            cursor += FunctionBlob::SIZE as u64;
        }

        for _ in 0..blob.n_signals {
            self.validate_signal_blob(offset32(cursor)?, offset)?;
            cursor += SignalBlob::SIZE as u64;
        }

        for _ in 0..blob.n_vfuncs {
            self.validate_vfunc_blob(offset32(cursor)?, offset)?;
            cursor += VFuncBlob::SIZE as u64;
        }

        for _ in 0..blob.n_constants {
            self.validate_constant_blob(offset32(cursor)?)?;
            cursor += ConstantBlob::SIZE as u64;
        }

        self.context.pop();
        Ok(())
    }

    fn validate_union_blob(&mut self, offset: u32) -> Result<()> {
        // unions are accepted after the fixed prefix check; their tails are not
        // walked by this validator
        UnionBlob::read(self.data, offset)?;
        Ok(())
    }
}
