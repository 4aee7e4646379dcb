//! Human-readable rendering in a TypeScript-like syntax.
//!
//! References print by name, so cyclic graphs render finitely. Use
//! [`render_definitions`] to also print what the names stand for.

use std::fmt::{self, Display, Formatter, Write};

use crate::shape::{Field, Nominal, Record, Shape, ShapeRef};

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_shape(f, self, Prec::Top)
    }
}

/// `type Name = ...;` for every named reference, one per line.
pub fn render_definitions<'a, I>(refs: I) -> String
where
    I: IntoIterator<Item = &'a ShapeRef>,
{
    let mut out = String::new();
    for r in refs {
        match r.target() {
            Some(target) => {
                let _ = writeln!(out, "type {} = {};", r.name(), target);
            }
            None => {
                let _ = writeln!(out, "type {}; // unbound", r.name());
            }
        }
    }
    out
}

// Binding strength of the context a shape is printed in.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Top,
    Union,
    Intersection,
}

fn write_shape(f: &mut Formatter<'_>, shape: &Shape, prec: Prec) -> fmt::Result {
    match shape {
        Shape::Never => f.write_str("never"),
        Shape::Primitive(name) => f.write_str(name),
        Shape::Record(record) => write_record(f, record),
        Shape::Union(members) => {
            write_joined(f, members, " | ", Prec::Union, prec > Prec::Top)
        }
        Shape::Intersection(members) => {
            write_joined(f, members, " & ", Prec::Intersection, prec > Prec::Union)
        }
        Shape::Nominal(nominal) => write_nominal(f, nominal),
        Shape::Ref(r) => f.write_str(r.name()),
    }
}

fn write_joined(f: &mut Formatter<'_>, members: &[Shape], sep: &str, inner: Prec, parens: bool) -> fmt::Result {
    if parens {
        f.write_char('(')?;
    }
    for (i, m) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write_shape(f, m, inner)?;
    }
    if parens {
        f.write_char(')')?;
    }
    Ok(())
}

fn write_record(f: &mut Formatter<'_>, record: &Record) -> fmt::Result {
    if record.is_empty() {
        return f.write_str("{}");
    }
    f.write_str("{ ")?;
    for (i, (name, field)) in record.iter().enumerate() {
        if i > 0 {
            f.write_str("; ")?;
        }
        write_field(f, name, field)?;
    }
    f.write_str(" }")
}

fn write_field(f: &mut Formatter<'_>, name: &str, field: &Field) -> fmt::Result {
    if field.readonly {
        f.write_str("readonly ")?;
    }
    if is_identifier(name) {
        f.write_str(name)?;
    } else {
        let quoted = serde_json::to_string(name).map_err(|_| fmt::Error)?;
        f.write_str(&quoted)?;
    }
    if field.optional {
        f.write_char('?')?;
    }
    f.write_str(": ")?;
    write_shape(f, &field.shape, Prec::Top)
}

fn write_nominal(f: &mut Formatter<'_>, nominal: &Nominal) -> fmt::Result {
    let tag = serde_json::to_string(&nominal.tag).map_err(|_| fmt::Error)?;
    write!(f, "Nominal<{}, {}>", nominal.base, tag)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
