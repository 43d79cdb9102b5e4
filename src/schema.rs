//! Structural templates and schema comparison
//!
//! A [`Template`] describes the expected layout of a [`DerNode`] tree: classes, tag numbers,
//! primitive/constructed forms and cardinality. Some positions of a template can be *named*:
//! when a tree is compared to the template with [`compare_schema`], the nodes found at these
//! positions are returned as [`Captures`].
//!
//! The comparison is purely structural; the content of primitive values is never interpreted.
//!
//! ```rust
//! use x509_altname::node::DerNode;
//! use x509_altname::schema::{compare_schema, Template};
//! use x509_altname::asn1_rs::Tag;
//!
//! let template = Template::sequence(vec![
//!     Template::universal(Tag::Oid).named("id"),
//!     Template::repeated(Template::any()).named("rest"),
//! ]);
//! let node = DerNode::sequence(vec![
//!     DerNode::new_primitive(x509_altname::asn1_rs::Class::Universal, Tag::Oid, vec![0x2a]),
//!     DerNode::boolean(true),
//!     DerNode::boolean(false),
//! ]);
//! let captures = compare_schema(&node, &template).expect("schema mismatch");
//! assert!(captures.node("id").is_some());
//! assert_eq!(captures.repeated("rest").len(), 2);
//! ```

use std::collections::HashMap;
use std::fmt;

use asn1_rs::{Class, Tag};

use crate::node::{class_name, DerNode};

/// Expected shape at one position of a tree
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateKind {
    /// Any single node
    Any,
    /// A primitive node with the given class and tag
    Primitive { class: Class, tag: Tag },
    /// A constructed node with the given class and tag, whose children match `value` in order
    Constructed {
        class: Class,
        tag: Tag,
        value: Vec<Template>,
    },
    /// Zero or more consecutive children matching the item template.
    ///
    /// Only meaningful as a child of a `Constructed` template.
    Repeated(Box<Template>),
    /// Exactly one of the alternatives (the first matching one is selected)
    Choice(Vec<Template>),
}

/// A structural description of a tree, with optional capture names
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    pub name: Option<String>,
    pub optional: bool,
    pub kind: TemplateKind,
}

impl Template {
    pub const fn new(kind: TemplateKind) -> Self {
        Template {
            name: None,
            optional: false,
            kind,
        }
    }

    pub const fn any() -> Self {
        Self::new(TemplateKind::Any)
    }

    pub const fn primitive(class: Class, tag: Tag) -> Self {
        Self::new(TemplateKind::Primitive { class, tag })
    }

    /// A primitive universal type (OID, BOOLEAN, OCTET STRING, ...)
    pub const fn universal(tag: Tag) -> Self {
        Self::primitive(Class::Universal, tag)
    }

    pub fn constructed(class: Class, tag: Tag, value: Vec<Template>) -> Self {
        Self::new(TemplateKind::Constructed { class, tag, value })
    }

    pub fn sequence(value: Vec<Template>) -> Self {
        Self::constructed(Class::Universal, Tag::Sequence, value)
    }

    pub fn set(value: Vec<Template>) -> Self {
        Self::constructed(Class::Universal, Tag::Set, value)
    }

    /// A context-specific primitive value `[n]`
    pub const fn tagged_primitive(n: u32) -> Self {
        Self::primitive(Class::ContextSpecific, Tag(n))
    }

    /// A context-specific constructed value `[n]`
    pub fn tagged_constructed(n: u32, value: Vec<Template>) -> Self {
        Self::constructed(Class::ContextSpecific, Tag(n), value)
    }

    pub fn repeated(item: Template) -> Self {
        Self::new(TemplateKind::Repeated(Box::new(item)))
    }

    pub fn choice(alternatives: Vec<Template>) -> Self {
        Self::new(TemplateKind::Choice(alternatives))
    }

    /// Set the capture name
    pub fn named<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the capture name, if any
    pub fn with_name(mut self, name: Option<&str>) -> Self {
        self.name = name.map(String::from);
        self
    }

    /// Mark the template as optional: a non-matching child is skipped instead of failing
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// A node (or a list of nodes) found at a named position
#[derive(Clone, Debug, PartialEq)]
pub enum Captured<'a> {
    Node(&'a DerNode),
    Repeated(Vec<&'a DerNode>),
}

/// Named nodes extracted by a successful comparison
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Captures<'a> {
    map: HashMap<String, Captured<'a>>,
}

impl<'a> Captures<'a> {
    /// Return the node captured by a non-repeated template
    pub fn node(&self, name: &str) -> Option<&'a DerNode> {
        match self.map.get(name) {
            Some(Captured::Node(node)) => Some(node),
            _ => None,
        }
    }

    /// Return the nodes captured by a repeated template, in input order.
    ///
    /// An absent capture is returned as an empty slice.
    pub fn repeated(&self, name: &str) -> &[&'a DerNode] {
        match self.map.get(name) {
            Some(Captured::Repeated(nodes)) => nodes,
            _ => &[],
        }
    }

    pub fn get(&self, name: &str) -> Option<&Captured<'a>> {
        self.map.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn insert(&mut self, name: &str, captured: Captured<'a>) {
        self.map.insert(name.to_owned(), captured);
    }

    fn merge(&mut self, other: Captures<'a>) {
        self.map.extend(other.map);
    }
}

/// Reason of a failed comparison
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaMismatch {
    pub reason: String,
}

impl SchemaMismatch {
    fn new<S: Into<String>>(reason: S) -> Self {
        SchemaMismatch {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SchemaMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Compare a tree to a template.
///
/// On success, return the nodes found at every named position of the template.
pub fn compare_schema<'a>(
    node: &'a DerNode,
    template: &Template,
) -> Result<Captures<'a>, SchemaMismatch> {
    let mut captures = Captures::default();
    match &template.kind {
        TemplateKind::Repeated(item) => {
            // top-level repetition: a single node, captured as a list
            match_node(node, item, &mut Captures::default())?;
            if let Some(name) = &template.name {
                captures.insert(name, Captured::Repeated(vec![node]));
            }
        }
        _ => match_node(node, template, &mut captures)?,
    }
    Ok(captures)
}

fn describe(class: Class, tag: Tag, constructed: bool) -> String {
    let form = if constructed { "constructed" } else { "primitive" };
    match class {
        Class::Universal => format!("{} {:?}", form, tag),
        _ => format!("{} {}[{}]", form, class_name(class), tag.0),
    }
}

fn check_header(
    node: &DerNode,
    class: Class,
    tag: Tag,
    constructed: bool,
) -> Result<(), SchemaMismatch> {
    if node.class() != class || node.tag() != tag || node.is_constructed() != constructed {
        return Err(SchemaMismatch::new(format!(
            "expected {}, found {}",
            describe(class, tag, constructed),
            describe(node.class(), node.tag(), node.is_constructed())
        )));
    }
    Ok(())
}

fn match_node<'a>(
    node: &'a DerNode,
    template: &Template,
    captures: &mut Captures<'a>,
) -> Result<(), SchemaMismatch> {
    match &template.kind {
        TemplateKind::Any => (),
        TemplateKind::Primitive { class, tag } => check_header(node, *class, *tag, false)?,
        TemplateKind::Constructed { class, tag, value } => {
            check_header(node, *class, *tag, true)?;
            match_children(node.children(), value, captures)?;
        }
        TemplateKind::Choice(alternatives) => {
            let mut selected = None;
            for alt in alternatives {
                let mut scratch = Captures::default();
                if match_node(node, alt, &mut scratch).is_ok() {
                    selected = Some(scratch);
                    break;
                }
            }
            match selected {
                Some(scratch) => captures.merge(scratch),
                None => {
                    return Err(SchemaMismatch::new(format!(
                        "no choice alternative matches {}",
                        describe(node.class(), node.tag(), node.is_constructed())
                    )))
                }
            }
        }
        TemplateKind::Repeated(_) => {
            return Err(SchemaMismatch::new(
                "repeated template outside of a constructed value",
            ))
        }
    }
    if let Some(name) = &template.name {
        captures.insert(name, Captured::Node(node));
    }
    Ok(())
}

fn match_children<'a>(
    children: &'a [DerNode],
    templates: &[Template],
    captures: &mut Captures<'a>,
) -> Result<(), SchemaMismatch> {
    let mut idx = 0;
    for template in templates {
        if let TemplateKind::Repeated(item) = &template.kind {
            let mut matched = Vec::new();
            while let Some(child) = children.get(idx) {
                if match_node(child, item, &mut Captures::default()).is_err() {
                    break;
                }
                matched.push(child);
                idx += 1;
            }
            if let Some(name) = &template.name {
                captures.insert(name, Captured::Repeated(matched));
            }
            continue;
        }
        match children.get(idx) {
            Some(child) => {
                let mut scratch = Captures::default();
                match match_node(child, template, &mut scratch) {
                    Ok(()) => {
                        captures.merge(scratch);
                        idx += 1;
                    }
                    Err(_) if template.optional => (),
                    Err(e) => return Err(e),
                }
            }
            None if template.optional => (),
            None => return Err(SchemaMismatch::new("missing element")),
        }
    }
    if let Some(child) = children.get(idx) {
        return Err(SchemaMismatch::new(format!(
            "unexpected element at index {}: {}",
            idx,
            describe(child.class(), child.tag(), child.is_constructed())
        )));
    }
    Ok(())
}
