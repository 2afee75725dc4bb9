//! Runtime values a snippet manipulates.
//!
//! Plain JSON data lives next to the opaque handles service calls hand back:
//! models decoded from Resource Manager bodies, lazy pages, pollers, clients
//! and their operation groups. [`crate::normalize`] turns any of them back
//! into JSON.

use std::fmt::Write as _;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use crate::catalog::OperationSpec;
use crate::client::{OperationGroup, ServiceClient};
use crate::paging::Pager;
use crate::poller::Poller;
use crate::ExecutorError;

/// Fields whose values are free-form dictionaries: their keys are data, not
/// attribute names, and are kept verbatim.
const DICT_FIELDS: &[&str] = &[
    "tags",
    "userAssignedIdentities",
    "metadata",
    "outputs",
    "parameters",
    "additionalProperties",
];

/// Resource types whose `properties` object stays nested instead of being
/// lifted into top-level attributes.
const UNFLATTENED_TYPES: &[&str] = &[
    "ResourceGroup",
    "GenericResource",
    "GenericResourceExpanded",
    "EventData",
    "Subscription",
    "Location",
    "TenantIdDescription",
    "Provider",
];

/// Resource types whose `properties` object is itself a free-form dictionary.
const OPAQUE_PROPERTIES_TYPES: &[&str] = &["GenericResource", "GenericResourceExpanded", "EventData"];

/// A value produced while evaluating a snippet.
#[derive(Debug, Clone)]
pub enum Output {
    None,
    Bool(bool),
    Number(Number),
    Str(String),
    List(Vec<Output>),
    Map(IndexMap<String, Output>),
    Model(Model),
    Paged(Pager),
    Poller(Poller),
    Client(Arc<ServiceClient>),
    Group(OperationGroup),
    Method(BoundMethod),
    Builtin(Builtin),
}

/// A callable obtained through attribute access.
#[derive(Debug, Clone)]
pub enum BoundMethod {
    /// A service operation, e.g. `compute_client.virtual_machines.get`.
    Operation {
        group: OperationGroup,
        spec: &'static OperationSpec,
    },
    /// A method of a data value, e.g. `poller.result` or `tags.get`.
    Value {
        receiver: Box<Output>,
        method: ValueMethod,
    },
}

/// Methods available on models, mappings and pollers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMethod {
    Result,
    Wait,
    Status,
    Done,
    AsDict,
    Get,
    Keys,
    Values,
}

impl ValueMethod {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Result => "result",
            Self::Wait => "wait",
            Self::Status => "status",
            Self::Done => "done",
            Self::AsDict => "as_dict",
            Self::Get => "get",
            Self::Keys => "keys",
            Self::Values => "values",
        }
    }
}

/// Functions visible in every snippet without a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Len,
    List,
    Str,
    Dict,
    Print,
}

impl Builtin {
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "len" => Some(Self::Len),
            "list" => Some(Self::List),
            "str" => Some(Self::Str),
            "dict" => Some(Self::Dict),
            "print" => Some(Self::Print),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Len => "len",
            Self::List => "list",
            Self::Str => "str",
            Self::Dict => "dict",
            Self::Print => "print",
        }
    }
}

/// One attribute of a [`Model`].
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Key the attribute has in request and response bodies.
    pub wire_name: String,
    /// The attribute sits inside the `properties` envelope on the wire.
    pub flattened: bool,
    pub value: Output,
}

/// A resource or sub-resource decoded from a Resource Manager body.
///
/// Attribute names are the snake_case form of the wire keys; keys starting
/// with `@` or `_` become private attributes (leading `_`).
#[derive(Debug, Clone)]
pub struct Model {
    type_name: String,
    attributes: IndexMap<String, Attribute>,
}

impl Model {
    /// Decode a JSON object as a model of type `type_name`.
    #[must_use]
    pub fn from_arm(type_name: &str, object: Map<String, Value>) -> Self {
        let flatten = !UNFLATTENED_TYPES.contains(&type_name);
        let mut model = Self {
            type_name: type_name.to_owned(),
            attributes: IndexMap::new(),
        };

        for (key, value) in object {
            match value {
                Value::Object(properties) if flatten && key == "properties" => {
                    for (inner_key, inner_value) in properties {
                        model.insert(inner_key, inner_value, true);
                    }
                }
                value => model.insert(key, value, false),
            }
        }
        model
    }

    fn insert(&mut self, wire_name: String, value: Value, flattened: bool) {
        let opaque = DICT_FIELDS.contains(&wire_name.as_str())
            || (wire_name == "properties" && OPAQUE_PROPERTIES_TYPES.contains(&self.type_name.as_str()));

        let value = if opaque {
            Output::from_plain(value)
        } else {
            let nested = match &value {
                Value::Array(_) => singular(&to_pascal_case(&wire_name)),
                _ => to_pascal_case(&wire_name),
            };
            Output::from_arm(&nested, value)
        };

        self.attributes
            .entry(attribute_name(&wire_name))
            .or_insert(Attribute { wire_name, flattened, value });
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(name, attr)| (name.as_str(), attr))
    }

    /// Value of an attribute. Attributes absent from the body read as `None`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Output {
        self.attributes
            .get(name)
            .map_or(Output::None, |attr| attr.value.clone())
    }
}

impl Output {
    /// Convert JSON data verbatim: objects become mappings.
    #[must_use]
    pub fn from_plain(value: Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::Str(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from_plain).collect()),
            Value::Object(map) => Self::Map(map.into_iter().map(|(k, v)| (k, Self::from_plain(v))).collect()),
        }
    }

    /// Convert a response body: objects become models of `type_name`.
    #[must_use]
    pub fn from_arm(type_name: &str, value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Model(Model::from_arm(type_name, map)),
            Value::Array(items) => Self::List(items.into_iter().map(|v| Self::from_arm(type_name, v)).collect()),
            scalar => Self::from_plain(scalar),
        }
    }

    /// Python type name used in error messages.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::None => "NoneType".to_owned(),
            Self::Bool(_) => "bool".to_owned(),
            Self::Number(n) if n.is_f64() => "float".to_owned(),
            Self::Number(_) => "int".to_owned(),
            Self::Str(_) => "str".to_owned(),
            Self::List(_) => "list".to_owned(),
            Self::Map(_) => "dict".to_owned(),
            Self::Model(model) => model.type_name.clone(),
            Self::Paged(_) => "ItemPaged".to_owned(),
            Self::Poller(_) => "LROPoller".to_owned(),
            Self::Client(client) => client.type_name().to_owned(),
            Self::Group(group) => group.type_name(),
            Self::Method(_) => "method".to_owned(),
            Self::Builtin(_) => "builtin_function_or_method".to_owned(),
        }
    }

    /// Look up `name` on this value.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Attribute`] if the value has no such
    /// attribute or method.
    pub fn get_attribute(&self, name: &str) -> Result<Output, ExecutorError> {
        let method = |method: ValueMethod| {
            Ok(Output::Method(BoundMethod::Value {
                receiver: Box::new(self.clone()),
                method,
            }))
        };

        match (self, name) {
            (Self::Model(_), "as_dict") => method(ValueMethod::AsDict),
            (Self::Model(model), _) => Ok(model.attribute(name)),
            (Self::Map(_), "get") => method(ValueMethod::Get),
            (Self::Map(_), "keys") => method(ValueMethod::Keys),
            (Self::Map(_), "values") => method(ValueMethod::Values),
            (Self::Poller(_), "result") => method(ValueMethod::Result),
            (Self::Poller(_), "wait") => method(ValueMethod::Wait),
            (Self::Poller(_), "status") => method(ValueMethod::Status),
            (Self::Poller(_), "done") => method(ValueMethod::Done),
            (Self::Client(client), _) => client
                .group(name)
                .map(Output::Group)
                .ok_or_else(|| ExecutorError::attribute(client.type_name(), name)),
            (Self::Group(group), _) => group
                .method(name)
                .map(|spec| {
                    Output::Method(BoundMethod::Operation {
                        group: group.clone(),
                        spec,
                    })
                })
                .ok_or_else(|| ExecutorError::attribute(group.type_name(), name)),
            _ => Err(ExecutorError::attribute(self.type_name(), name)),
        }
    }

    /// Evaluate `self[index]`.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Index`] or [`ExecutorError::Key`] for missing
    /// elements and [`ExecutorError::Type`] for unsupported combinations.
    pub fn subscript(&self, index: &Output) -> Result<Output, ExecutorError> {
        match self {
            Self::List(items) => {
                let position = sequence_index(index, items.len(), "list")?;
                Ok(items[position].clone())
            }
            Self::Str(text) => {
                let chars: Vec<char> = text.chars().collect();
                let position = sequence_index(index, chars.len(), "string")?;
                Ok(Self::Str(chars[position].to_string()))
            }
            Self::Map(map) => {
                let key = index.key_string()?;
                map.get(&key).cloned().ok_or(ExecutorError::Key(key))
            }
            _ => Err(ExecutorError::type_error(format!(
                "'{}' object is not subscriptable",
                self.type_name()
            ))),
        }
    }

    /// Render a value used as a mapping key the way JSON encoding would.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Type`] for unhashable values.
    pub fn key_string(&self) -> Result<String, ExecutorError> {
        match self {
            Self::Str(s) => Ok(s.clone()),
            Self::Number(n) => Ok(n.to_string()),
            Self::Bool(b) => Ok(b.to_string()),
            Self::None => Ok("null".to_owned()),
            other => Err(ExecutorError::type_error(format!(
                "unhashable type: '{}'",
                other.type_name()
            ))),
        }
    }

    /// `str(value)`.
    #[must_use]
    pub fn to_display(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            other => other.repr(),
        }
    }

    /// `repr(value)`.
    #[must_use]
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out);
        out
    }

    fn write_repr(&self, out: &mut String) {
        match self {
            Self::None => out.push_str("None"),
            Self::Bool(true) => out.push_str("True"),
            Self::Bool(false) => out.push_str("False"),
            Self::Number(n) => {
                let _ = write!(out, "{n}");
            }
            Self::Str(s) => {
                let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
                out.push(quote);
                for c in s.chars() {
                    match c {
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        c if c == quote => {
                            out.push('\\');
                            out.push(c);
                        }
                        c => out.push(c),
                    }
                }
                out.push(quote);
            }
            Self::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_repr(out);
                }
                out.push(']');
            }
            Self::Map(map) => write_dict(out, map.iter().map(|(k, v)| (k.as_str(), v))),
            Self::Model(model) => write_dict(
                out,
                model
                    .attributes
                    .iter()
                    .filter(|(name, _)| !name.starts_with('_'))
                    .map(|(name, attr)| (name.as_str(), &attr.value)),
            ),
            Self::Method(BoundMethod::Operation { group, spec }) => {
                let _ = write!(out, "<bound method {}.{}>", group.type_name(), spec.method);
            }
            Self::Method(BoundMethod::Value { receiver, method }) => {
                let _ = write!(out, "<built-in method {} of {} object>", method.name(), receiver.type_name());
            }
            Self::Builtin(builtin) => {
                let _ = write!(out, "<built-in function {}>", builtin.name());
            }
            other => {
                let _ = write!(out, "<{} object>", other.type_name());
            }
        }
    }
}

fn write_dict<'a>(out: &mut String, entries: impl Iterator<Item = (&'a str, &'a Output)>) {
    out.push('{');
    for (i, (key, value)) in entries.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        Output::Str(key.to_owned()).write_repr(out);
        out.push_str(": ");
        value.write_repr(out);
    }
    out.push('}');
}

fn sequence_index(index: &Output, len: usize, kind: &str) -> Result<usize, ExecutorError> {
    let Output::Number(number) = index else {
        return Err(ExecutorError::type_error(format!(
            "{kind} indices must be integers, not {}",
            index.type_name()
        )));
    };
    let Some(raw) = number.as_i64() else {
        return Err(ExecutorError::type_error(format!("{kind} indices must be integers, not float")));
    };

    let len_i64 = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if raw < 0 { raw + len_i64 } else { raw };
    usize::try_from(resolved)
        .ok()
        .filter(|&position| position < len)
        .ok_or_else(|| ExecutorError::Index(format!("{kind} index out of range")))
}

/// Attribute name for a wire key: `provisioningState` → `provisioning_state`,
/// `@odata.type` → `_odata.type`.
#[must_use]
pub fn attribute_name(wire_name: &str) -> String {
    let stripped = wire_name.trim_start_matches(['@', '_']);
    if stripped.len() == wire_name.len() {
        to_snake_case(wire_name)
    } else {
        format!("_{}", to_snake_case(stripped))
    }
}

/// camelCase / PascalCase to snake_case. Acronym runs stay together:
/// `supportsHTTPSTrafficOnly` → `supports_https_traffic_only`.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_uppercase() {
            out.push(c);
            continue;
        }
        let prev = i.checked_sub(1).and_then(|p| chars.get(p)).copied();
        let next = chars.get(i + 1).copied();
        let boundary = match prev {
            Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
            Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
            _ => false,
        };
        if boundary && !out.ends_with('_') {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// snake_case or camelCase to PascalCase.
#[must_use]
pub fn to_pascal_case(name: &str) -> String {
    name.split(['_', '-', '.'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}

fn singular(name: &str) -> String {
    match name.strip_suffix('s') {
        Some(stem) if !stem.is_empty() && !stem.ends_with('s') => stem.to_owned(),
        _ => name.to_owned(),
    }
}
