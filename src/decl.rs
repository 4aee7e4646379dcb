//! JSON declaration documents: load them into shapes, and emit shapes back.
//!
//! ```json
//! { "definitions": {
//!     "UserId": { "kind": "nominal", "base": "number", "tag": "UserId" },
//!     "Node": { "kind": "record", "fields": {
//!         "value": "number",
//!         "next": { "type": { "kind": "ref", "name": "Node" }, "optional": true } } } },
//!   "root": { "kind": "ref", "name": "Node" } }
//! ```
//!
//! A bare string is a primitive (`"never"` is the bottom shape). Every
//! definition becomes a [`ShapeRef`], so definitions may refer to each other
//! and to themselves.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LoadError;
use crate::shape::{Field, Record, RefId, Shape, ShapeRef};

// ------------------------------ Wire types -------------------------------- //

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShapeDecl {
    Name(String),
    Node(NodeDecl),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDecl {
    Never,
    Primitive { name: String },
    Record { fields: IndexMap<String, FieldDecl> },
    Union { members: Vec<ShapeDecl> },
    Intersection { members: Vec<ShapeDecl> },
    Nominal { base: Box<ShapeDecl>, tag: String },
    Ref { name: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldDecl {
    Full {
        #[serde(rename = "type")]
        ty: ShapeDecl,
        #[serde(default, skip_serializing_if = "is_false")]
        optional: bool,
        #[serde(default, skip_serializing_if = "is_false")]
        readonly: bool,
    },
    Bare(ShapeDecl),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentDecl {
    #[serde(default)]
    pub definitions: IndexMap<String, ShapeDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<ShapeDecl>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

// -------------------------------- Loading --------------------------------- //

/// Named definitions of one document, each a bound reference.
#[derive(Clone, Debug, Default)]
pub struct Definitions {
    refs: IndexMap<String, ShapeRef>,
}

/// A loaded document.
#[derive(Clone, Debug)]
pub struct Document {
    pub definitions: Definitions,
    pub root: Option<Shape>,
}

impl Document {
    /// The explicit `root` if `name` is `None`, else the named definition.
    pub fn select(&self, name: Option<&str>) -> Result<Shape, LoadError> {
        match (name, &self.root) {
            (Some(name), _) => self.definitions.require(name),
            (None, Some(root)) => Ok(root.clone()),
            (None, None) => Err(LoadError::UnknownDefinition("root".into())),
        }
    }
}

impl Definitions {
    /// Declare every name first, then build and bind the bodies.
    pub fn build(decls: &IndexMap<String, ShapeDecl>) -> Result<Self, LoadError> {
        let refs = decls
            .keys()
            .map(|name| (name.clone(), ShapeRef::declare(name.clone())))
            .collect();
        let defs = Definitions { refs };
        for (decl, r) in decls.values().zip(defs.refs.values()) {
            let shape = defs.shape_of(decl)?;
            // fresh per key, so bound exactly once
            let _ = r.bind(shape);
        }
        Ok(defs)
    }

    pub fn get(&self, name: &str) -> Option<Shape> {
        self.refs.get(name).map(Shape::reference)
    }

    pub fn require(&self, name: &str) -> Result<Shape, LoadError> {
        self.get(name).ok_or_else(|| LoadError::UnknownDefinition(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.refs.keys().map(String::as_str)
    }

    pub fn refs(&self) -> impl Iterator<Item = &ShapeRef> {
        self.refs.values()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Build a shape from a declaration, resolving `ref`s against these
    /// definitions.
    pub fn shape_of(&self, decl: &ShapeDecl) -> Result<Shape, LoadError> {
        let node = match decl {
            ShapeDecl::Name(name) if name == "never" => return Ok(Shape::Never),
            ShapeDecl::Name(name) => return Ok(Shape::primitive(name.as_str())),
            ShapeDecl::Node(node) => node,
        };
        Ok(match node {
            NodeDecl::Never => Shape::Never,
            NodeDecl::Primitive { name } => Shape::primitive(name.as_str()),
            NodeDecl::Record { fields } => {
                let mut record = Record::new();
                for (name, field) in fields {
                    record.insert(name.as_str(), self.field_of(field)?);
                }
                Shape::record(record)
            }
            NodeDecl::Union { members } => Shape::union(self.shapes_of(members)?),
            NodeDecl::Intersection { members } => Shape::intersection(self.shapes_of(members)?),
            NodeDecl::Nominal { base, tag } => Shape::nominal(self.shape_of(base)?, tag.as_str()),
            NodeDecl::Ref { name } => self
                .get(name)
                .ok_or_else(|| LoadError::UnknownReference(name.clone()))?,
        })
    }

    fn shapes_of(&self, decls: &[ShapeDecl]) -> Result<Vec<Shape>, LoadError> {
        decls.iter().map(|d| self.shape_of(d)).collect()
    }

    fn field_of(&self, decl: &FieldDecl) -> Result<Field, LoadError> {
        Ok(match decl {
            FieldDecl::Bare(ty) => Field::required(self.shape_of(ty)?),
            FieldDecl::Full { ty, optional, readonly } => Field {
                shape: self.shape_of(ty)?,
                optional: *optional,
                readonly: *readonly,
            },
        })
    }
}

/// Deserialize with the JSON path of the failure in the error.
pub fn from_value_with_path<T: DeserializeOwned>(value: Value) -> Result<T, LoadError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| LoadError::Json {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, LoadError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| LoadError::Json {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

pub fn load_value(value: Value) -> Result<Document, LoadError> {
    load_decl(&from_value_with_path::<DocumentDecl>(value)?)
}

pub fn load_str(src: &str) -> Result<Document, LoadError> {
    load_decl(&from_str_with_path::<DocumentDecl>(src)?)
}

pub fn load_decl(decl: &DocumentDecl) -> Result<Document, LoadError> {
    let definitions = Definitions::build(&decl.definitions)?;
    let root = decl.root.as_ref().map(|r| definitions.shape_of(r)).transpose()?;
    Ok(Document { definitions, root })
}

// -------------------------------- Emission -------------------------------- //

/// Declaration for `root`, with every reachable reference emitted as a
/// definition. Distinct references sharing a name get numbered suffixes.
pub fn to_document(root: &Shape) -> DocumentDecl {
    let mut emitter = Emitter::default();
    let root = emitter.decl_of(root);
    while let Some(r) = emitter.pending.pop() {
        let name = emitter.names[&r.id()].clone();
        let body = match r.target() {
            Some(target) => emitter.decl_of(target),
            None => ShapeDecl::Name("never".into()),
        };
        emitter.definitions.insert(name, body);
    }
    emitter.definitions.sort_by(|a, _, b, _| emitter.order[a].cmp(&emitter.order[b]));
    DocumentDecl { definitions: emitter.definitions, root: Some(root) }
}

pub fn to_value(root: &Shape) -> serde_json::Result<Value> {
    serde_json::to_value(to_document(root))
}

#[derive(Default)]
struct Emitter {
    names: IndexMap<RefId, String>,
    order: IndexMap<String, usize>,
    pending: Vec<ShapeRef>,
    definitions: IndexMap<String, ShapeDecl>,
}

impl Emitter {
    fn decl_of(&mut self, shape: &Shape) -> ShapeDecl {
        let node = match shape {
            Shape::Never => return ShapeDecl::Name("never".into()),
            Shape::Primitive(name) => return ShapeDecl::Name(name.to_string()),
            Shape::Ref(r) => NodeDecl::Ref { name: self.name_of(r) },
            Shape::Record(record) => NodeDecl::Record {
                fields: record
                    .iter()
                    .map(|(name, field)| {
                        let ty = self.decl_of(&field.shape);
                        let decl = if field.optional || field.readonly {
                            FieldDecl::Full { ty, optional: field.optional, readonly: field.readonly }
                        } else {
                            FieldDecl::Bare(ty)
                        };
                        (name.to_string(), decl)
                    })
                    .collect(),
            },
            Shape::Union(members) => NodeDecl::Union {
                members: members.iter().map(|m| self.decl_of(m)).collect(),
            },
            Shape::Intersection(members) => NodeDecl::Intersection {
                members: members.iter().map(|m| self.decl_of(m)).collect(),
            },
            Shape::Nominal(n) => NodeDecl::Nominal {
                base: Box::new(self.decl_of(&n.base)),
                tag: n.tag.clone(),
            },
        };
        ShapeDecl::Node(node)
    }

    fn name_of(&mut self, r: &ShapeRef) -> String {
        if let Some(name) = self.names.get(&r.id()) {
            return name.clone();
        }
        let mut name = r.name().to_string();
        let mut n = 2;
        while self.order.contains_key(&name) {
            name = format!("{}_{n}", r.name());
            n += 1;
        }
        self.order.insert(name.clone(), self.order.len());
        self.names.insert(r.id(), name.clone());
        self.pending.push(r.clone());
        name
    }
}
