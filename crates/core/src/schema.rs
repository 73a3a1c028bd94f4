use serde::de::DeserializeOwned;
use serde_json::{json, Map as JsonMap, Value as Json};

use crate::error::Result;
use crate::validate::{ValidationErrors, Validator, Violation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Required,
    Optional,
    Computed,
}

#[derive(Debug, Clone, Copy)]
pub enum AttrType {
    String,
    Bool,
    Int,
    Float,
    StringList,
    StringSet,
    StringMap,
    /// A single nested object.
    Block(&'static [Attribute]),
    /// A list of nested objects.
    BlockList { attributes: &'static [Attribute], max_items: Option<usize> },
}

impl AttrType {
    fn label(&self) -> &'static str {
        match self {
            AttrType::String => "string",
            AttrType::Bool => "bool",
            AttrType::Int => "int",
            AttrType::Float => "float",
            AttrType::StringList => "list(string)",
            AttrType::StringSet => "set(string)",
            AttrType::StringMap => "map(string)",
            AttrType::Block(_) => "block",
            AttrType::BlockList { .. } => "list(block)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl DefaultValue {
    fn to_json(self) -> Json {
        match self {
            DefaultValue::Bool(b) => json!(b),
            DefaultValue::Int(n) => json!(n),
            DefaultValue::Str(s) => json!(s),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Attribute {
    pub name: &'static str,
    pub ty: AttrType,
    pub mutability: Mutability,
    pub default: Option<DefaultValue>,
    pub validators: &'static [Validator],
    pub force_new: bool,
    pub sensitive: bool,
}

impl Attribute {
    const fn new(name: &'static str, ty: AttrType, mutability: Mutability) -> Self {
        Self { name, ty, mutability, default: None, validators: &[], force_new: false, sensitive: false }
    }

    pub const fn required(name: &'static str, ty: AttrType) -> Self {
        Self::new(name, ty, Mutability::Required)
    }

    pub const fn optional(name: &'static str, ty: AttrType) -> Self {
        Self::new(name, ty, Mutability::Optional)
    }

    pub const fn computed(name: &'static str, ty: AttrType) -> Self {
        Self::new(name, ty, Mutability::Computed)
    }

    pub const fn default(self, value: DefaultValue) -> Self {
        Self { default: Some(value), ..self }
    }

    pub const fn validate(self, validators: &'static [Validator]) -> Self {
        Self { validators, ..self }
    }

    pub const fn force_new(self) -> Self {
        Self { force_new: true, ..self }
    }

    pub const fn sensitive(self) -> Self {
        Self { sensitive: true, ..self }
    }
}

/// The declared attribute set of one resource or data source type.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub type_name: &'static str,
    pub attributes: &'static [Attribute],
}

/// One printable line of a schema, nested attributes flattened to dotted paths.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRow {
    pub path: String,
    pub ty: &'static str,
    pub mutability: Mutability,
    pub default: Option<DefaultValue>,
    pub force_new: bool,
    pub sensitive: bool,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Walks the whole document and collects every violation.
    pub fn validate(&self, doc: &Json) -> std::result::Result<(), ValidationErrors> {
        let mut out = Vec::new();
        match doc.as_object() {
            Some(map) => validate_block(self.attributes, map, "", &mut out),
            None => out.push(Violation::new(self.type_name, "expected an object")),
        }
        if out.is_empty() { Ok(()) } else { Err(ValidationErrors(out)) }
    }

    /// Fills declared defaults for absent attributes, recursing into blocks.
    pub fn apply_defaults(&self, doc: &mut Json) {
        if let Some(map) = doc.as_object_mut() {
            defaults_block(self.attributes, map);
        }
    }

    /// Validate, fill defaults, then decode into the typed configuration.
    pub fn decode<T: DeserializeOwned>(&self, doc: &Json) -> Result<T> {
        self.validate(doc)?;
        let mut doc = doc.clone();
        self.apply_defaults(&mut doc);
        Ok(serde_json::from_value(doc)?)
    }

    pub fn rows(&self) -> Vec<SchemaRow> {
        let mut out = Vec::new();
        rows_block(self.attributes, "", &mut out);
        out
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() { name.to_string() } else { format!("{}.{}", prefix, name) }
}

fn validate_block(attrs: &[Attribute], map: &JsonMap<String, Json>, prefix: &str, out: &mut Vec<Violation>) {
    for key in map.keys() {
        if !attrs.iter().any(|a| a.name == key) {
            out.push(Violation::new(join_path(prefix, key), "unknown attribute"));
        }
    }
    for attr in attrs {
        let path = join_path(prefix, attr.name);
        let value = map.get(attr.name).filter(|v| !v.is_null());
        match (attr.mutability, value) {
            (Mutability::Computed, Some(_)) => {
                out.push(Violation::new(path, "computed attribute cannot be set"))
            }
            (Mutability::Required, None) => {
                out.push(Violation::new(path, "required attribute is missing"))
            }
            (_, Some(v)) => validate_value(attr, v, &path, out),
            (_, None) => {}
        }
    }
}

fn run_validators(attr: &Attribute, v: &Json, path: &str, out: &mut Vec<Violation>) {
    for validator in attr.validators {
        if let Err(message) = validator.check(v) {
            out.push(Violation::new(path, message));
        }
    }
}

fn type_error(attr: &Attribute, path: &str, out: &mut Vec<Violation>) {
    out.push(Violation::new(path, format!("expected {}", attr.ty.label())));
}

fn validate_value(attr: &Attribute, v: &Json, path: &str, out: &mut Vec<Violation>) {
    match attr.ty {
        AttrType::String if v.is_string() => run_validators(attr, v, path, out),
        AttrType::Bool if v.is_boolean() => {}
        AttrType::Int if v.is_i64() || v.is_u64() => run_validators(attr, v, path, out),
        AttrType::Float if v.is_number() => run_validators(attr, v, path, out),
        AttrType::StringList | AttrType::StringSet => match v.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}.{}", path, i);
                    if item.is_string() {
                        run_validators(attr, item, &item_path, out);
                    } else {
                        out.push(Violation::new(item_path, "expected string"));
                    }
                }
            }
            None => type_error(attr, path, out),
        },
        AttrType::StringMap => match v.as_object() {
            Some(map) => {
                for (k, item) in map {
                    if !item.is_string() {
                        out.push(Violation::new(format!("{}.{}", path, k), "expected string"));
                    }
                }
            }
            None => type_error(attr, path, out),
        },
        AttrType::Block(attributes) => match v.as_object() {
            Some(map) => validate_block(attributes, map, path, out),
            None => type_error(attr, path, out),
        },
        AttrType::BlockList { attributes, max_items } => match v.as_array() {
            Some(items) => {
                if let Some(max) = max_items {
                    if items.len() > max {
                        out.push(Violation::new(path, format!("at most {} item(s) allowed, got {}", max, items.len())));
                    }
                }
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}.{}", path, i);
                    match item.as_object() {
                        Some(map) => validate_block(attributes, map, &item_path, out),
                        None => out.push(Violation::new(item_path, "expected block")),
                    }
                }
            }
            None => type_error(attr, path, out),
        },
        _ => type_error(attr, path, out),
    }
}

fn defaults_block(attrs: &[Attribute], map: &mut JsonMap<String, Json>) {
    for attr in attrs {
        let absent = map.get(attr.name).map_or(true, Json::is_null);
        if absent {
            if let Some(d) = attr.default {
                map.insert(attr.name.to_string(), d.to_json());
            }
            continue;
        }
        match (attr.ty, map.get_mut(attr.name)) {
            (AttrType::Block(attributes), Some(Json::Object(inner))) => defaults_block(attributes, inner),
            (AttrType::BlockList { attributes, .. }, Some(Json::Array(items))) => {
                for item in items.iter_mut() {
                    if let Json::Object(inner) = item {
                        defaults_block(attributes, inner);
                    }
                }
            }
            _ => {}
        }
    }
}

fn rows_block(attrs: &[Attribute], prefix: &str, out: &mut Vec<SchemaRow>) {
    for attr in attrs {
        let path = join_path(prefix, attr.name);
        out.push(SchemaRow {
            path: path.clone(),
            ty: attr.ty.label(),
            mutability: attr.mutability,
            default: attr.default,
            force_new: attr.force_new,
            sensitive: attr.sensitive,
        });
        match attr.ty {
            AttrType::Block(attributes) | AttrType::BlockList { attributes, .. } => {
                rows_block(attributes, &path, out)
            }
            _ => {}
        }
    }
}
