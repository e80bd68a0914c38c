use std::collections::HashMap;

use bytes::BufMut;

/// One row of an exception table, catch_type is a raw pool index (0 catches everything)
pub type Handler = (u16, u16, u16, u16);

/// Assembles class files byte by byte.
/// Pool entries are interned, asking for the same constant twice returns the same index.
pub struct ClassBuilder {
    major: u16,
    minor: u16,

    pool: Vec<u8>,
    next_slot: u16,
    interned: HashMap<Vec<u8>, u16>,

    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
    trailing: Vec<u8>,
}

impl Default for ClassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassBuilder {
    pub fn new() -> Self {
        Self {
            major: 52,
            minor: 0,
            pool: vec![],
            next_slot: 1,
            interned: HashMap::new(),
            access_flags: 0x0021,
            this_class: 0,
            super_class: 0,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
            trailing: vec![],
        }
    }

    pub fn version(&mut self, major: u16, minor: u16) -> &mut Self {
        self.major = major;
        self.minor = minor;
        self
    }

    pub fn access_flags(&mut self, flags: u16) -> &mut Self {
        self.access_flags = flags;
        self
    }

    /// The number of slots in use, plus one
    pub fn pool_count(&self) -> u16 {
        self.next_slot
    }

    fn intern(&mut self, entry: Vec<u8>, slots: u16) -> u16 {
        if let Some(index) = self.interned.get(&entry) {
            return *index;
        }

        let index = self.next_slot;
        self.pool.extend_from_slice(&entry);
        self.next_slot += slots;
        self.interned.insert(entry, index);
        index
    }

    /// Append an entry without interning it, for hand-crafted corruption.
    pub fn raw_entry(&mut self, entry: &[u8], slots: u16) -> u16 {
        let index = self.next_slot;
        self.pool.extend_from_slice(entry);
        self.next_slot += slots;
        index
    }

    /// A Utf8 entry holding already-encoded modified UTF-8
    pub fn utf8_bytes(&mut self, bytes: &[u8]) -> u16 {
        let mut entry = vec![1];
        entry.put_u16(bytes.len() as u16);
        entry.extend_from_slice(bytes);
        self.intern(entry, 1)
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        self.utf8_bytes(value.as_bytes())
    }

    fn indirect(&mut self, tag: u8, target: u16) -> u16 {
        let mut entry = vec![tag];
        entry.put_u16(target);
        self.intern(entry, 1)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name = self.utf8(name);
        self.indirect(7, name)
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let value = self.utf8(value);
        self.indirect(8, value)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        let mut entry = vec![3];
        entry.put_i32(value);
        self.intern(entry, 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        let mut entry = vec![5];
        entry.put_i64(value);
        self.intern(entry, 2)
    }

    pub fn double(&mut self, value: f64) -> u16 {
        let mut entry = vec![6];
        entry.put_f64(value);
        self.intern(entry, 2)
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);

        let mut entry = vec![12];
        entry.put_u16(name);
        entry.put_u16(descriptor);
        self.intern(entry, 1)
    }

    fn member_ref(&mut self, tag: u8, class: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(class);
        let name_and_type = self.name_and_type(name, descriptor);

        let mut entry = vec![tag];
        entry.put_u16(class);
        entry.put_u16(name_and_type);
        self.intern(entry, 1)
    }

    pub fn field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(9, class, name, descriptor)
    }

    pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(10, class, name, descriptor)
    }

    pub fn this_class(&mut self, name: &str) -> &mut Self {
        self.this_class = self.class(name);
        self
    }

    pub fn super_class(&mut self, name: Option<&str>) -> &mut Self {
        self.super_class = match name {
            Some(name) => self.class(name),
            None => 0,
        };
        self
    }

    pub fn interface(&mut self, name: &str) -> &mut Self {
        let index = self.class(name);
        self.interfaces.push(index);
        self
    }

    /// Encode an attribute. The payload is written as-is after the header.
    pub fn attribute(&mut self, name: &str, payload: &[u8]) -> Vec<u8> {
        let name = self.utf8(name);

        let mut attribute = vec![];
        attribute.put_u16(name);
        attribute.put_u32(payload.len() as u32);
        attribute.extend_from_slice(payload);
        attribute
    }

    pub fn code(
        &mut self,
        max_stack: u16,
        max_locals: u16,
        code: &[u8],
        handlers: &[Handler],
        attributes: &[Vec<u8>],
    ) -> Vec<u8> {
        let mut payload = vec![];
        payload.put_u16(max_stack);
        payload.put_u16(max_locals);
        payload.put_u32(code.len() as u32);
        payload.extend_from_slice(code);

        payload.put_u16(handlers.len() as u16);
        for (start, end, handler, catch_type) in handlers {
            payload.put_u16(*start);
            payload.put_u16(*end);
            payload.put_u16(*handler);
            payload.put_u16(*catch_type);
        }

        put_attributes(&mut payload, attributes);
        self.attribute("Code", &payload)
    }

    pub fn exceptions(&mut self, classes: &[&str]) -> Vec<u8> {
        let mut payload = vec![];
        payload.put_u16(classes.len() as u16);
        for class in classes {
            let index = self.class(class);
            payload.put_u16(index);
        }

        self.attribute("Exceptions", &payload)
    }

    pub fn constant_value(&mut self, index: u16) -> Vec<u8> {
        self.attribute("ConstantValue", &index.to_be_bytes())
    }

    pub fn source_file(&mut self, name: &str) -> Vec<u8> {
        let index = self.utf8(name);
        self.attribute("SourceFile", &index.to_be_bytes())
    }

    fn member(
        &mut self,
        access: u16,
        name: &str,
        descriptor: &str,
        attributes: &[Vec<u8>],
    ) -> Vec<u8> {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);

        let mut member = vec![];
        member.put_u16(access);
        member.put_u16(name);
        member.put_u16(descriptor);
        put_attributes(&mut member, attributes);
        member
    }

    pub fn field(
        &mut self,
        access: u16,
        name: &str,
        descriptor: &str,
        attributes: &[Vec<u8>],
    ) -> &mut Self {
        let field = self.member(access, name, descriptor, attributes);
        self.fields.push(field);
        self
    }

    pub fn method(
        &mut self,
        access: u16,
        name: &str,
        descriptor: &str,
        attributes: &[Vec<u8>],
    ) -> &mut Self {
        let method = self.member(access, name, descriptor, attributes);
        self.methods.push(method);
        self
    }

    pub fn class_attribute(&mut self, attribute: Vec<u8>) -> &mut Self {
        self.attributes.push(attribute);
        self
    }

    pub fn trailing(&mut self, bytes: &[u8]) -> &mut Self {
        self.trailing.extend_from_slice(bytes);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![];
        out.put_u32(0xCAFEBABE);
        out.put_u16(self.minor);
        out.put_u16(self.major);

        out.put_u16(self.next_slot);
        out.extend_from_slice(&self.pool);

        out.put_u16(self.access_flags);
        out.put_u16(self.this_class);
        out.put_u16(self.super_class);

        out.put_u16(self.interfaces.len() as u16);
        for interface in &self.interfaces {
            out.put_u16(*interface);
        }

        for members in [&self.fields, &self.methods] {
            out.put_u16(members.len() as u16);
            for member in members {
                out.extend_from_slice(member);
            }
        }

        put_attributes(&mut out, &self.attributes);
        out.extend_from_slice(&self.trailing);
        out
    }
}

fn put_attributes(out: &mut Vec<u8>, attributes: &[Vec<u8>]) {
    out.put_u16(attributes.len() as u16);
    for attribute in attributes {
        out.extend_from_slice(attribute);
    }
}
