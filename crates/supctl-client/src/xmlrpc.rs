// XML-RPC message encoding and response parsing
//
// Covers the subset of XML-RPC that supervisord speaks: scalar values,
// arrays, structs and fault responses.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlRpcError {
    #[error("Invalid XML: {0}")]
    Xml(String),

    #[error("Unexpected element <{0}>")]
    UnexpectedElement(String),

    #[error("Missing element <{0}>")]
    MissingElement(&'static str),

    #[error("Invalid {kind} value: {value:?}")]
    InvalidValue { kind: &'static str, value: String },

    #[error("Invalid fault: {0}")]
    InvalidFault(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Double(f64),
    String(String),
    DateTime(String),
    Base64(String),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
    Nil,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Member lookup on a struct value
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members.get(key),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    Fault { code: i64, message: String },
}

/// Encode a `methodCall` document
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(i) => out.push_str(&format!("<int>{}</int>", i)),
        Value::Bool(b) => out.push_str(if *b {
            "<boolean>1</boolean>"
        } else {
            "<boolean>0</boolean>"
        }),
        Value::Double(d) => out.push_str(&format!("<double>{}</double>", d)),
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        Value::DateTime(s) => {
            out.push_str("<dateTime.iso8601>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</dateTime.iso8601>");
        }
        Value::Base64(s) => {
            out.push_str("<base64>");
            out.push_str(s);
            out.push_str("</base64>");
        }
        Value::Array(values) => {
            out.push_str("<array><data>");
            for v in values {
                write_value(out, v);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, v) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                write_value(out, v);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

/// Parse a `methodResponse` document into its value or fault
pub fn parse_response(body: &str) -> Result<MethodResponse, XmlRpcError> {
    let root = parse_tree(body)?;
    if root.name != "methodResponse" {
        return Err(XmlRpcError::UnexpectedElement(root.name));
    }

    if let Some(fault) = root.child("fault") {
        let value = value_from(fault.require("value")?)?;
        let code = value
            .get("faultCode")
            .and_then(Value::as_i64)
            .ok_or_else(|| XmlRpcError::InvalidFault("missing faultCode".to_string()))?;
        let message = value
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Ok(MethodResponse::Fault { code, message });
    }

    let value = root
        .require("params")?
        .require("param")?
        .require("value")?;
    Ok(MethodResponse::Success(value_from(value)?))
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn require(&self, name: &'static str) -> Result<&Element, XmlRpcError> {
        self.child(name).ok_or(XmlRpcError::MissingElement(name))
    }
}

fn parse_tree(body: &str) -> Result<Element, XmlRpcError> {
    // Text is kept verbatim. Whitespace between elements only lands in
    // container elements, whose text is never read.
    let mut reader = Reader::from_str(body);

    let mut stack: Vec<Element> = Vec::new();
    loop {
        let event = reader
            .read_event()
            .map_err(|e| XmlRpcError::Xml(e.to_string()))?;
        match event {
            Event::Start(e) => stack.push(Element::new(e.name().as_ref())),
            Event::Empty(e) => {
                let element = Element::new(e.name().as_ref());
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlRpcError::Xml("unbalanced end tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| XmlRpcError::Xml(e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => {
                return Err(XmlRpcError::Xml("unexpected end of document".to_string()))
            }
            _ => {}
        }
    }
}

fn value_from(element: &Element) -> Result<Value, XmlRpcError> {
    // An untyped <value> is a string
    let Some(typed) = element.children.first() else {
        return Ok(Value::String(element.text.clone()));
    };

    let text = typed.text.as_str();
    let value = match typed.name.as_str() {
        "string" => Value::String(typed.text.clone()),
        "int" | "i4" | "i8" => Value::Int(text.trim().parse().map_err(|_| {
            XmlRpcError::InvalidValue {
                kind: "int",
                value: text.to_string(),
            }
        })?),
        "boolean" => match text.trim() {
            "1" | "true" => Value::Bool(true),
            "0" | "false" => Value::Bool(false),
            other => {
                return Err(XmlRpcError::InvalidValue {
                    kind: "boolean",
                    value: other.to_string(),
                })
            }
        },
        "double" => Value::Double(text.trim().parse().map_err(|_| {
            XmlRpcError::InvalidValue {
                kind: "double",
                value: text.to_string(),
            }
        })?),
        "dateTime.iso8601" => Value::DateTime(typed.text.clone()),
        "base64" => Value::Base64(typed.text.clone()),
        "nil" => Value::Nil,
        "array" => {
            let data = typed.require("data")?;
            let values = data
                .children
                .iter()
                .filter(|c| c.name == "value")
                .map(value_from)
                .collect::<Result<Vec<_>, _>>()?;
            Value::Array(values)
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member.require("name")?.text.clone();
                let value = value_from(member.require("value")?)?;
                members.insert(name, value);
            }
            Value::Struct(members)
        }
        other => return Err(XmlRpcError::UnexpectedElement(other.to_string())),
    };

    Ok(value)
}
