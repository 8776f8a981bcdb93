//! Shared test support: a typelib builder that assembles complete, well-formed
//! binary typelibs (header, directory, blobs, section table, string pool) so that
//! tests can exercise the validator and the lookup API against realistic inputs,
//! and mutate single fields to provoke specific failures.

use std::collections::HashMap;

use crate::typelib::{
    directory::BlobType,
    header::{Header, TYPELIB_MAGIC},
    types::{SimpleType, TypeTag},
};

/// A type expression for the builder.
#[derive(Debug, Clone)]
pub(crate) enum Ty {
    /// A basic type encoded inline
    Basic { tag: TypeTag, pointer: bool },
    /// A reference to a directory entry
    Iface(u16),
    /// An array of an element type
    Array(Box<Ty>),
    /// A list with one parameter type
    List { elem: Box<Ty>, pointer: bool },
    /// A singly-linked list with one parameter type
    SList { elem: Box<Ty>, pointer: bool },
    /// A hash table with key and value parameter types
    Hash {
        key: Box<Ty>,
        value: Box<Ty>,
        pointer: bool,
    },
    /// An error type
    Error { pointer: bool },
    /// A raw inline slot value, for malformed-type tests
    RawSlot(u32),
}

impl Ty {
    pub(crate) fn basic(tag: TypeTag) -> Ty {
        Ty::Basic {
            tag,
            pointer: false,
        }
    }

    pub(crate) fn pointer(tag: TypeTag) -> Ty {
        Ty::Basic { tag, pointer: true }
    }

    pub(crate) fn list(elem: Ty) -> Ty {
        Ty::List {
            elem: Box::new(elem),
            pointer: true,
        }
    }

    pub(crate) fn hash(key: Ty, value: Ty) -> Ty {
        Ty::Hash {
            key: Box::new(key),
            value: Box::new(value),
            pointer: true,
        }
    }
}

/// A signature: optional return type plus named arguments.
#[derive(Debug, Clone)]
pub(crate) struct SigDef {
    pub(crate) ret: Option<Ty>,
    pub(crate) args: Vec<(String, Ty)>,
}

impl SigDef {
    pub(crate) fn returns(ty: Ty) -> SigDef {
        SigDef {
            ret: Some(ty),
            args: Vec::new(),
        }
    }

    pub(crate) fn void() -> SigDef {
        SigDef {
            ret: None,
            args: Vec::new(),
        }
    }

    pub(crate) fn arg(mut self, name: &str, ty: Ty) -> SigDef {
        self.args.push((name.to_string(), ty));
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FunctionDef {
    pub(crate) name: String,
    pub(crate) symbol: String,
    pub(crate) sig: SigDef,
    pub(crate) constructor: bool,
    pub(crate) setter: bool,
    pub(crate) getter: bool,
    pub(crate) wraps_vfunc: bool,
    pub(crate) index: u16,
}

impl FunctionDef {
    pub(crate) fn new(name: &str, symbol: &str, sig: SigDef) -> FunctionDef {
        FunctionDef {
            name: name.to_string(),
            symbol: symbol.to_string(),
            sig,
            constructor: false,
            setter: false,
            getter: false,
            wraps_vfunc: false,
            index: 0,
        }
    }

    pub(crate) fn constructor(mut self) -> FunctionDef {
        self.constructor = true;
        self
    }

    pub(crate) fn setter(mut self, index: u16) -> FunctionDef {
        self.setter = true;
        self.index = index;
        self
    }

    pub(crate) fn index(mut self, index: u16) -> FunctionDef {
        self.index = index;
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FieldDef {
    pub(crate) name: String,
    pub(crate) ty: Ty,
    pub(crate) callback: Option<(String, SigDef)>,
}

impl FieldDef {
    pub(crate) fn new(name: &str, ty: Ty) -> FieldDef {
        FieldDef {
            name: name.to_string(),
            ty,
            callback: None,
        }
    }

    pub(crate) fn callback(name: &str, cb_name: &str, sig: SigDef) -> FieldDef {
        FieldDef {
            name: name.to_string(),
            ty: Ty::basic(TypeTag::Void),
            callback: Some((cb_name.to_string(), sig)),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PropertyDef {
    pub(crate) name: String,
    pub(crate) ty: Ty,
}

#[derive(Debug, Clone)]
pub(crate) struct SignalDef {
    pub(crate) name: String,
    /// Raw run-stage bits, exactly as stored (bit 1 first, bit 2 last, bit 3 cleanup)
    pub(crate) run_flags: u16,
    pub(crate) has_class_closure: bool,
    pub(crate) class_closure: u16,
    pub(crate) sig: SigDef,
}

impl SignalDef {
    pub(crate) fn new(name: &str, sig: SigDef) -> SignalDef {
        SignalDef {
            name: name.to_string(),
            run_flags: 1 << 2, // run_last
            has_class_closure: false,
            class_closure: 0,
            sig,
        }
    }

    pub(crate) fn run_flags(mut self, raw: u16) -> SignalDef {
        self.run_flags = raw;
        self
    }

    pub(crate) fn class_closure(mut self, index: u16) -> SignalDef {
        self.has_class_closure = true;
        self.class_closure = index;
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct VFuncDef {
    pub(crate) name: String,
    pub(crate) has_class_closure: bool,
    pub(crate) class_closure: u16,
    pub(crate) sig: SigDef,
}

impl VFuncDef {
    pub(crate) fn new(name: &str, sig: SigDef) -> VFuncDef {
        VFuncDef {
            name: name.to_string(),
            has_class_closure: false,
            class_closure: 0,
            sig,
        }
    }

    pub(crate) fn class_closure(mut self, index: u16) -> VFuncDef {
        self.has_class_closure = true;
        self.class_closure = index;
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ConstantDef {
    pub(crate) name: String,
    pub(crate) ty: Ty,
    pub(crate) size: u32,
    pub(crate) offset: u32,
}

impl ConstantDef {
    pub(crate) fn new(name: &str, ty: Ty, size: u32) -> ConstantDef {
        ConstantDef {
            name: name.to_string(),
            ty,
            size,
            // payload offsets are only checked for alignment
            offset: 0,
        }
    }

    pub(crate) fn offset(mut self, offset: u32) -> ConstantDef {
        self.offset = offset;
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ValueDef {
    pub(crate) name: String,
    pub(crate) value: i32,
}

#[derive(Debug, Clone)]
pub(crate) struct StructDef {
    pub(crate) name: String,
    pub(crate) kind: BlobType,
    pub(crate) gtype: Option<(String, String)>,
    pub(crate) fields: Vec<FieldDef>,
    pub(crate) methods: Vec<FunctionDef>,
}

impl StructDef {
    pub(crate) fn new(name: &str) -> StructDef {
        StructDef {
            name: name.to_string(),
            kind: BlobType::Struct,
            gtype: None,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub(crate) fn gtype(mut self, gtype_name: &str, gtype_init: &str) -> StructDef {
        self.gtype = Some((gtype_name.to_string(), gtype_init.to_string()));
        self
    }

    pub(crate) fn field(mut self, field: FieldDef) -> StructDef {
        self.fields.push(field);
        self
    }

    pub(crate) fn method(mut self, method: FunctionDef) -> StructDef {
        self.methods.push(method);
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EnumDef {
    pub(crate) name: String,
    pub(crate) kind: BlobType,
    pub(crate) gtype: Option<(String, String)>,
    pub(crate) error_domain: Option<String>,
    pub(crate) values: Vec<ValueDef>,
    pub(crate) methods: Vec<FunctionDef>,
}

impl EnumDef {
    pub(crate) fn new(name: &str) -> EnumDef {
        EnumDef {
            name: name.to_string(),
            kind: BlobType::Enum,
            gtype: None,
            error_domain: None,
            values: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub(crate) fn flags(mut self) -> EnumDef {
        self.kind = BlobType::Flags;
        self
    }

    pub(crate) fn gtype(mut self, gtype_name: &str, gtype_init: &str) -> EnumDef {
        self.gtype = Some((gtype_name.to_string(), gtype_init.to_string()));
        self
    }

    pub(crate) fn error_domain(mut self, domain: &str) -> EnumDef {
        self.error_domain = Some(domain.to_string());
        self
    }

    pub(crate) fn value(mut self, name: &str, value: i32) -> EnumDef {
        self.values.push(ValueDef {
            name: name.to_string(),
            value,
        });
        self
    }

    pub(crate) fn method(mut self, method: FunctionDef) -> EnumDef {
        self.methods.push(method);
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ObjectDef {
    pub(crate) name: String,
    pub(crate) gtype_name: String,
    pub(crate) gtype_init: String,
    pub(crate) parent: u16,
    pub(crate) gtype_struct: u16,
    pub(crate) interfaces: Vec<u16>,
    pub(crate) fields: Vec<FieldDef>,
    pub(crate) properties: Vec<PropertyDef>,
    pub(crate) methods: Vec<FunctionDef>,
    pub(crate) signals: Vec<SignalDef>,
    pub(crate) vfuncs: Vec<VFuncDef>,
    pub(crate) constants: Vec<ConstantDef>,
    pub(crate) n_field_callbacks: Option<u16>,
}

impl ObjectDef {
    pub(crate) fn new(name: &str) -> ObjectDef {
        ObjectDef {
            name: name.to_string(),
            gtype_name: format!("Test{name}"),
            gtype_init: format!("test_{}_get_type", name.to_lowercase()),
            parent: 0,
            gtype_struct: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            signals: Vec::new(),
            vfuncs: Vec::new(),
            constants: Vec::new(),
            n_field_callbacks: None,
        }
    }

    pub(crate) fn parent(mut self, index: u16) -> ObjectDef {
        self.parent = index;
        self
    }

    pub(crate) fn gtype_struct(mut self, index: u16) -> ObjectDef {
        self.gtype_struct = index;
        self
    }

    pub(crate) fn interface(mut self, index: u16) -> ObjectDef {
        self.interfaces.push(index);
        self
    }

    pub(crate) fn field(mut self, field: FieldDef) -> ObjectDef {
        self.fields.push(field);
        self
    }

    pub(crate) fn property(mut self, name: &str, ty: Ty) -> ObjectDef {
        self.properties.push(PropertyDef {
            name: name.to_string(),
            ty,
        });
        self
    }

    pub(crate) fn method(mut self, method: FunctionDef) -> ObjectDef {
        self.methods.push(method);
        self
    }

    pub(crate) fn signal(mut self, signal: SignalDef) -> ObjectDef {
        self.signals.push(signal);
        self
    }

    pub(crate) fn vfunc(mut self, vfunc: VFuncDef) -> ObjectDef {
        self.vfuncs.push(vfunc);
        self
    }

    pub(crate) fn constant(mut self, constant: ConstantDef) -> ObjectDef {
        self.constants.push(constant);
        self
    }

    pub(crate) fn n_field_callbacks(mut self, count: u16) -> ObjectDef {
        self.n_field_callbacks = Some(count);
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct InterfaceDef {
    pub(crate) name: String,
    pub(crate) gtype_name: String,
    pub(crate) gtype_init: String,
    pub(crate) prerequisites: Vec<u16>,
    pub(crate) properties: Vec<PropertyDef>,
    pub(crate) methods: Vec<FunctionDef>,
    pub(crate) signals: Vec<SignalDef>,
    pub(crate) vfuncs: Vec<VFuncDef>,
    pub(crate) constants: Vec<ConstantDef>,
}

impl InterfaceDef {
    pub(crate) fn new(name: &str) -> InterfaceDef {
        InterfaceDef {
            name: name.to_string(),
            gtype_name: format!("Test{name}"),
            gtype_init: format!("test_{}_get_type", name.to_lowercase()),
            prerequisites: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            signals: Vec::new(),
            vfuncs: Vec::new(),
            constants: Vec::new(),
        }
    }

    pub(crate) fn prerequisite(mut self, index: u16) -> InterfaceDef {
        self.prerequisites.push(index);
        self
    }

    pub(crate) fn method(mut self, method: FunctionDef) -> InterfaceDef {
        self.methods.push(method);
        self
    }

    pub(crate) fn signal(mut self, signal: SignalDef) -> InterfaceDef {
        self.signals.push(signal);
        self
    }

    pub(crate) fn vfunc(mut self, vfunc: VFuncDef) -> InterfaceDef {
        self.vfuncs.push(vfunc);
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) enum EntryDef {
    Function(FunctionDef),
    Callback {
        name: String,
        sig: SigDef,
    },
    Struct(StructDef),
    Enum(EnumDef),
    Object(ObjectDef),
    Interface(InterfaceDef),
    Union {
        name: String,
    },
    Constant(ConstantDef),
    NonLocal {
        name: String,
        namespace: String,
        blob_type: u16,
    },
}

impl EntryDef {
    fn is_local(&self) -> bool {
        !matches!(self, EntryDef::NonLocal { .. })
    }
}

/// Assembles complete binary typelibs for tests.
pub(crate) struct TypelibBuilder {
    namespace: String,
    nsversion: String,
    shared_library: Option<String>,
    c_prefix: Option<String>,
    entries: Vec<EntryDef>,
    directory_index: Option<Vec<u8>>,
}

impl TypelibBuilder {
    pub(crate) fn new(namespace: &str) -> TypelibBuilder {
        TypelibBuilder {
            namespace: namespace.to_string(),
            nsversion: "1.0".to_string(),
            shared_library: None,
            c_prefix: None,
            entries: Vec::new(),
            directory_index: None,
        }
    }

    pub(crate) fn nsversion(mut self, version: &str) -> TypelibBuilder {
        self.nsversion = version.to_string();
        self
    }

    pub(crate) fn shared_library(mut self, list: &str) -> TypelibBuilder {
        self.shared_library = Some(list.to_string());
        self
    }

    pub(crate) fn c_prefix(mut self, list: &str) -> TypelibBuilder {
        self.c_prefix = Some(list.to_string());
        self
    }

    pub(crate) fn directory_index(mut self, hash: Vec<u8>) -> TypelibBuilder {
        self.directory_index = Some(hash);
        self
    }

    pub(crate) fn entry(mut self, entry: EntryDef) -> TypelibBuilder {
        self.entries.push(entry);
        self
    }

    pub(crate) fn function(self, name: &str, symbol: &str, sig: SigDef) -> TypelibBuilder {
        self.entry(EntryDef::Function(FunctionDef::new(name, symbol, sig)))
    }

    pub(crate) fn object(self, object: ObjectDef) -> TypelibBuilder {
        self.entry(EntryDef::Object(object))
    }

    pub(crate) fn interface(self, interface: InterfaceDef) -> TypelibBuilder {
        self.entry(EntryDef::Interface(interface))
    }

    pub(crate) fn enumeration(self, def: EnumDef) -> TypelibBuilder {
        self.entry(EntryDef::Enum(def))
    }

    pub(crate) fn structure(self, def: StructDef) -> TypelibBuilder {
        self.entry(EntryDef::Struct(def))
    }

    pub(crate) fn constant(self, def: ConstantDef) -> TypelibBuilder {
        self.entry(EntryDef::Constant(def))
    }

    pub(crate) fn non_local(self, name: &str, namespace: &str, blob_type: u16) -> TypelibBuilder {
        self.entry(EntryDef::NonLocal {
            name: name.to_string(),
            namespace: namespace.to_string(),
            blob_type,
        })
    }

    /// Emit the complete typelib.
    pub(crate) fn build(self) -> Vec<u8> {
        let mut emit = Emit::new();

        let n_entries = self.entries.len() as u16;
        let n_local_entries = self.entries.iter().take_while(|e| e.is_local()).count() as u16;

        // header placeholder; its string references are recorded as fixups like
        // every other string in the file
        emit.buf.resize(Header::SIZE, 0);
        emit.str_fixup_at(44, &self.namespace);
        emit.str_fixup_at(48, &self.nsversion);
        if let Some(shared_library) = &self.shared_library {
            emit.str_fixup_at(52, shared_library);
        }
        if let Some(c_prefix) = &self.c_prefix {
            emit.str_fixup_at(56, c_prefix);
        }

        let dir_offset = emit.buf.len();
        emit.buf.resize(dir_offset + self.entries.len() * 12, 0);

        // blobs
        for (i, entry) in self.entries.iter().enumerate() {
            let dir_pos = dir_offset + i * 12;
            match entry {
                EntryDef::NonLocal {
                    name,
                    namespace,
                    blob_type,
                } => {
                    emit.set_u16(dir_pos, *blob_type);
                    emit.set_u16(dir_pos + 2, 0);
                    emit.str_fixup_at(dir_pos + 4, name);
                    emit.str_fixup_at(dir_pos + 8, namespace);
                }
                local => {
                    let (blob_type, offset, name) = emit.entry_blob(local);
                    emit.set_u16(dir_pos, blob_type);
                    emit.set_u16(dir_pos + 2, 1);
                    emit.str_fixup_at(dir_pos + 4, &name);
                    emit.set_u32(dir_pos + 8, offset);
                }
            }
        }

        // section table and payload
        let mut sections_offset = 0u32;
        if let Some(hash) = &self.directory_index {
            emit.align4();
            sections_offset = emit.buf.len() as u32;
            let payload_offset = sections_offset + 16;
            emit.u32(1); // directory index
            emit.u32(payload_offset);
            emit.u32(0); // end sentinel
            emit.u32(0);
            emit.buf.extend_from_slice(hash);
        }

        // string pool, then patch every recorded string reference
        let pool_base = emit.buf.len() as u32;
        let pool = std::mem::take(&mut emit.strings);
        emit.buf.extend_from_slice(&pool);
        let fixups = std::mem::take(&mut emit.str_fixups);
        for (pos, rel) in fixups {
            emit.set_u32(pos, pool_base + rel);
        }

        // header scalar fields
        let size = emit.buf.len() as u32;
        emit.buf[0..16].copy_from_slice(TYPELIB_MAGIC);
        emit.buf[16] = 4; // major version
        emit.buf[17] = 0; // minor version
        emit.set_u16(20, n_entries);
        emit.set_u16(22, n_local_entries);
        emit.set_u32(24, dir_offset as u32);
        emit.set_u32(28, 0); // n_attributes
        emit.set_u32(32, 0); // attributes
        emit.set_u32(36, 0); // dependencies
        emit.set_u32(40, size);
        for (i, blob_size) in [
            12u16, 20, 12, 16, 20, 16, 16, 16, 12, 12, 24, 16, 8, 24, 32, 60, 40, 40,
        ]
        .iter()
        .enumerate()
        {
            emit.set_u16(60 + i * 2, *blob_size);
        }
        emit.set_u32(96, sections_offset);

        emit.buf
    }
}

struct Emit {
    buf: Vec<u8>,
    strings: Vec<u8>,
    string_offsets: HashMap<String, u32>,
    str_fixups: Vec<(usize, u32)>,
}

impl Emit {
    fn new() -> Emit {
        Emit {
            buf: Vec::new(),
            // keep relative offset 0 reserved so that "absent" never collides
            // with a real string
            strings: vec![0],
            string_offsets: HashMap::new(),
            str_fixups: Vec::new(),
        }
    }

    fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    fn u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn set_u16(&mut self, pos: usize, value: u16) {
        self.buf[pos..pos + 2].copy_from_slice(&value.to_le_bytes());
    }

    fn set_u32(&mut self, pos: usize, value: u32) {
        self.buf[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn align4(&mut self) {
        while self.buf.len() % 4 != 0 {
            self.buf.push(0);
        }
    }

    fn intern(&mut self, s: &str) -> u32 {
        if let Some(&offset) = self.string_offsets.get(s) {
            return offset;
        }
        let offset = self.strings.len() as u32;
        self.strings.extend_from_slice(s.as_bytes());
        self.strings.push(0);
        self.string_offsets.insert(s.to_string(), offset);
        offset
    }

    fn str_ref(&mut self, s: &str) {
        let rel = self.intern(s);
        self.str_fixups.push((self.buf.len(), rel));
        self.u32(0);
    }

    fn opt_str_ref(&mut self, s: Option<&str>) {
        match s {
            Some(s) => self.str_ref(s),
            None => self.u32(0),
        }
    }

    fn str_fixup_at(&mut self, pos: usize, s: &str) {
        let rel = self.intern(s);
        self.str_fixups.push((pos, rel));
    }

    // type expressions

    fn ty_slot(&mut self, ty: &Ty, pending: &mut Vec<(usize, Ty)>) {
        match ty {
            Ty::Basic { tag, pointer } => self.u32(SimpleType::encode_basic(*tag, *pointer)),
            Ty::RawSlot(raw) => self.u32(*raw),
            complex => {
                pending.push((self.buf.len(), complex.clone()));
                self.u32(0);
            }
        }
    }

    fn flush_types(&mut self, pending: Vec<(usize, Ty)>) {
        let mut queue = pending;
        while !queue.is_empty() {
            let mut next = Vec::new();
            for (pos, ty) in queue {
                self.align4();
                let offset = self.buf.len() as u32;
                self.set_u32(pos, offset);
                self.complex_type(&ty, &mut next);
            }
            queue = next;
        }
    }

    fn complex_type(&mut self, ty: &Ty, pending: &mut Vec<(usize, Ty)>) {
        match ty {
            Ty::Array(elem) => {
                self.u16((TypeTag::Array as u16) << 3);
                self.u16(0); // dimension
                self.ty_slot(elem, pending);
            }
            Ty::Iface(index) => {
                self.u8(((TypeTag::Interface as u8) << 3) | 1);
                self.u8(0);
                self.u16(*index);
            }
            Ty::List { elem, pointer } => {
                self.u8(((TypeTag::GList as u8) << 3) | u8::from(*pointer));
                self.u8(0);
                self.u16(1);
                self.ty_slot(elem, pending);
            }
            Ty::SList { elem, pointer } => {
                self.u8(((TypeTag::GSList as u8) << 3) | u8::from(*pointer));
                self.u8(0);
                self.u16(1);
                self.ty_slot(elem, pending);
            }
            Ty::Hash {
                key,
                value,
                pointer,
            } => {
                self.u8(((TypeTag::GHash as u8) << 3) | u8::from(*pointer));
                self.u8(0);
                self.u16(2);
                self.ty_slot(key, pending);
                self.ty_slot(value, pending);
            }
            Ty::Error { pointer } => {
                self.u8(((TypeTag::Error as u8) << 3) | u8::from(*pointer));
                self.u8(0);
                self.u16(0);
            }
            Ty::Basic { .. } | Ty::RawSlot(_) => unreachable!("inline types have no blob"),
        }
    }

    fn signature(&mut self, sig: &SigDef) -> u32 {
        self.align4();
        let offset = self.buf.len() as u32;

        let mut pending = Vec::new();
        match &sig.ret {
            Some(ty) => self.ty_slot(ty, &mut pending),
            None => self.u32(0),
        }
        self.u16(0); // flags
        self.u16(sig.args.len() as u16);

        for (name, ty) in &sig.args {
            self.str_ref(name);
            self.u32(1); // in
            self.u8(0xFF); // closure: none
            self.u8(0xFF); // destroy: none
            self.u16(0); // padding
            self.ty_slot(ty, &mut pending);
        }

        self.flush_types(pending);
        offset
    }

    fn flush_signatures(&mut self, pending: Vec<(usize, SigDef)>) {
        for (pos, sig) in pending {
            let offset = self.signature(&sig);
            self.set_u32(pos, offset);
        }
    }

    // blob bodies

    fn function(&mut self, def: &FunctionDef, sigs: &mut Vec<(usize, SigDef)>) {
        self.u16(BlobType::Function as u16);
        let flags = (u16::from(def.setter) << 1)
            | (u16::from(def.getter) << 2)
            | (u16::from(def.constructor) << 3)
            | (u16::from(def.wraps_vfunc) << 4)
            | (def.index << 6);
        self.u16(flags);
        self.str_ref(&def.name);
        self.str_ref(&def.symbol);
        sigs.push((self.buf.len(), def.sig.clone()));
        self.u32(0);
        self.u16(0); // is_static
        self.u16(0); // reserved
    }

    fn callback(&mut self, name: &str, sig: &SigDef, sigs: &mut Vec<(usize, SigDef)>) {
        self.u16(BlobType::Callback as u16);
        self.u16(0);
        self.str_ref(name);
        sigs.push((self.buf.len(), sig.clone()));
        self.u32(0);
    }

    fn field(
        &mut self,
        def: &FieldDef,
        sigs: &mut Vec<(usize, SigDef)>,
        types: &mut Vec<(usize, Ty)>,
    ) {
        self.str_ref(&def.name);
        let mut flags = 0x01u8; // readable
        if def.callback.is_some() {
            flags |= 0x04;
        }
        self.u8(flags);
        self.u8(0); // bits
        self.u16(0); // struct_offset
        self.u32(0); // reserved
        if def.callback.is_some() {
            self.u32(0); // the type slot is unused with an embedded callback
        } else {
            self.ty_slot(&def.ty, types);
        }

        if let Some((cb_name, cb_sig)) = &def.callback {
            self.callback(cb_name, cb_sig, sigs);
        }
    }

    fn property(&mut self, def: &PropertyDef, types: &mut Vec<(usize, Ty)>) {
        self.str_ref(&def.name);
        self.u32(0x06); // readable + writable
        self.u32(0); // reserved
        self.ty_slot(&def.ty, types);
    }

    fn signal(&mut self, def: &SignalDef, sigs: &mut Vec<(usize, SigDef)>) {
        let flags = def.run_flags | (u16::from(def.has_class_closure) << 8);
        self.u16(flags);
        self.u16(def.class_closure);
        self.str_ref(&def.name);
        self.u32(0); // reserved
        sigs.push((self.buf.len(), def.sig.clone()));
        self.u32(0);
    }

    fn vfunc(&mut self, def: &VFuncDef, sigs: &mut Vec<(usize, SigDef)>) {
        self.str_ref(&def.name);
        self.u16(u16::from(def.has_class_closure) << 3);
        self.u16(def.class_closure);
        self.u16(0); // struct_offset
        self.u16(0); // invoker
        self.u32(0); // reserved
        sigs.push((self.buf.len(), def.sig.clone()));
        self.u32(0);
    }

    fn constant(&mut self, def: &ConstantDef, types: &mut Vec<(usize, Ty)>) {
        self.u16(BlobType::Constant as u16);
        self.u16(0);
        self.str_ref(&def.name);
        self.ty_slot(&def.ty, types);
        self.u32(def.size);
        self.u32(def.offset);
        self.u32(0); // reserved
    }

    fn value(&mut self, def: &ValueDef) {
        self.u32(0); // flags
        self.str_ref(&def.name);
        self.i32(def.value);
    }

    /// Emit one local entry's blob (with its tails, deferred signatures, and
    /// deferred complex types); returns the directory tag, the blob offset, and
    /// the entry name.
    fn entry_blob(&mut self, entry: &EntryDef) -> (u16, u32, String) {
        self.align4();
        let offset = self.buf.len() as u32;
        let mut sigs: Vec<(usize, SigDef)> = Vec::new();
        let mut types: Vec<(usize, Ty)> = Vec::new();

        let (blob_type, name) = match entry {
            EntryDef::Function(def) => {
                self.function(def, &mut sigs);
                (BlobType::Function as u16, def.name.clone())
            }
            EntryDef::Callback { name, sig } => {
                self.callback(name, sig, &mut sigs);
                (BlobType::Callback as u16, name.clone())
            }
            EntryDef::Constant(def) => {
                self.constant(def, &mut types);
                (BlobType::Constant as u16, def.name.clone())
            }
            EntryDef::Struct(def) => {
                self.u16(def.kind as u16);
                self.u16(u16::from(def.gtype.is_none()) << 1); // unregistered
                self.str_ref(&def.name);
                match &def.gtype {
                    Some((gtype_name, gtype_init)) => {
                        self.str_ref(gtype_name);
                        self.str_ref(gtype_init);
                    }
                    None => {
                        self.u32(0);
                        self.u32(0);
                    }
                }
                self.u32(0); // size
                self.u16(def.fields.len() as u16);
                self.u16(def.methods.len() as u16);
                self.u32(0); // copy_func
                self.u32(0); // free_func

                for field in &def.fields {
                    self.field(field, &mut sigs, &mut types);
                }
                for method in &def.methods {
                    self.function(method, &mut sigs);
                }
                (def.kind as u16, def.name.clone())
            }
            EntryDef::Enum(def) => {
                self.u16(def.kind as u16);
                self.u16(u16::from(def.gtype.is_none()) << 1); // unregistered
                self.str_ref(&def.name);
                match &def.gtype {
                    Some((gtype_name, gtype_init)) => {
                        self.str_ref(gtype_name);
                        self.str_ref(gtype_init);
                    }
                    None => {
                        self.u32(0);
                        self.u32(0);
                    }
                }
                self.u16(def.values.len() as u16);
                self.u16(def.methods.len() as u16);
                self.opt_str_ref(def.error_domain.as_deref());

                for value in &def.values {
                    self.value(value);
                }
                for method in &def.methods {
                    self.function(method, &mut sigs);
                }
                (def.kind as u16, def.name.clone())
            }
            EntryDef::Object(def) => {
                self.u16(BlobType::Object as u16);
                self.u16(0);
                self.str_ref(&def.name);
                self.str_ref(&def.gtype_name);
                self.str_ref(&def.gtype_init);
                self.u16(def.parent);
                self.u16(def.gtype_struct);
                self.u16(def.interfaces.len() as u16);
                self.u16(def.fields.len() as u16);
                self.u16(def.properties.len() as u16);
                self.u16(def.methods.len() as u16);
                self.u16(def.signals.len() as u16);
                self.u16(def.vfuncs.len() as u16);
                self.u16(def.constants.len() as u16);
                let counted = def.fields.iter().filter(|f| f.callback.is_some()).count() as u16;
                self.u16(def.n_field_callbacks.unwrap_or(counted));
                for _ in 0..6 {
                    self.u32(0); // ref/unref/set/get value funcs + reserved
                }

                for interface in &def.interfaces {
                    self.u16(*interface);
                }
                if def.interfaces.len() % 2 == 1 {
                    self.u16(0); // pad to 4-byte alignment
                }
                for field in &def.fields {
                    self.field(field, &mut sigs, &mut types);
                }
                for property in &def.properties {
                    self.property(property, &mut types);
                }
                for method in &def.methods {
                    self.function(method, &mut sigs);
                }
                for signal in &def.signals {
                    self.signal(signal, &mut sigs);
                }
                for vfunc in &def.vfuncs {
                    self.vfunc(vfunc, &mut sigs);
                }
                for constant in &def.constants {
                    self.constant(constant, &mut types);
                }
                (BlobType::Object as u16, def.name.clone())
            }
            EntryDef::Interface(def) => {
                self.u16(BlobType::Interface as u16);
                self.u16(0);
                self.str_ref(&def.name);
                self.str_ref(&def.gtype_name);
                self.str_ref(&def.gtype_init);
                self.u16(0); // gtype_struct
                self.u16(def.prerequisites.len() as u16);
                self.u16(def.properties.len() as u16);
                self.u16(def.methods.len() as u16);
                self.u16(def.signals.len() as u16);
                self.u16(def.vfuncs.len() as u16);
                self.u16(def.constants.len() as u16);
                self.u16(0); // padding
                self.u32(0); // reserved
                self.u32(0); // reserved

                for prerequisite in &def.prerequisites {
                    self.u16(*prerequisite);
                }
                if def.prerequisites.len() % 2 == 1 {
                    self.u16(0); // pad to 4-byte alignment
                }
                for property in &def.properties {
                    self.property(property, &mut types);
                }
                for method in &def.methods {
                    self.function(method, &mut sigs);
                }
                for signal in &def.signals {
                    self.signal(signal, &mut sigs);
                }
                for vfunc in &def.vfuncs {
                    self.vfunc(vfunc, &mut sigs);
                }
                for constant in &def.constants {
                    self.constant(constant, &mut types);
                }
                (BlobType::Interface as u16, def.name.clone())
            }
            EntryDef::Union { name } => {
                self.u16(BlobType::Union as u16);
                self.u16(0x0002); // unregistered
                self.str_ref(name);
                self.u32(0); // gtype_name
                self.u32(0); // gtype_init
                self.u32(0); // size
                self.u16(0); // n_fields
                self.u16(0); // n_functions
                self.u32(0); // copy_func
                self.u32(0); // free_func
                self.i32(0); // discriminator_offset
                self.u32(0); // discriminator_type
                (BlobType::Union as u16, name.clone())
            }
            EntryDef::NonLocal { .. } => unreachable!("non-local entries have no blob"),
        };

        self.flush_signatures(sigs);
        self.flush_types(types);

        (blob_type, offset, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Typelib;

    #[test]
    fn minimal_typelib_is_well_formed() {
        let data = TypelibBuilder::new("X").build();
        let typelib = Typelib::from_bytes(data).unwrap();
        typelib.validate().unwrap();
        assert_eq!(typelib.namespace().unwrap(), "X");
    }

    #[test]
    fn builder_output_round_trips_every_entry_kind() {
        let data = TypelibBuilder::new("Full")
            .function(
                "hello",
                "full_hello",
                SigDef::returns(Ty::basic(TypeTag::Int32)).arg("count", Ty::basic(TypeTag::UInt32)),
            )
            .entry(EntryDef::Callback {
                name: "Notify".to_string(),
                sig: SigDef::void().arg("data", Ty::pointer(TypeTag::Utf8)),
            })
            .structure(
                StructDef::new("Point")
                    .field(FieldDef::new("x", Ty::basic(TypeTag::Int32)))
                    .field(FieldDef::new("y", Ty::basic(TypeTag::Int32)))
                    .method(FunctionDef::new(
                        "scale",
                        "full_point_scale",
                        SigDef::void().arg("factor", Ty::basic(TypeTag::Double)),
                    )),
            )
            .enumeration(
                EnumDef::new("Mode")
                    .value("off", 0)
                    .value("on", 1)
                    .value("on_again", 1),
            )
            .entry(EntryDef::Union {
                name: "Payload".to_string(),
            })
            .constant(ConstantDef::new("MAX", Ty::basic(TypeTag::UInt32), 4))
            .build();

        let typelib = Typelib::from_bytes(data).unwrap();
        typelib.validate().unwrap();
        assert_eq!(typelib.header().n_entries, 6);
        assert!(typelib.entry_by_name("Point").is_some());
        assert!(typelib.entry_by_name("Mode").is_some());
        assert!(typelib.entry_by_name("Payload").is_some());
    }
}
