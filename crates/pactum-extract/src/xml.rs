//! `application/xml`.
//!
//! Structs are written as one element per field, named after the field's
//! serialized name. Sequences repeat the element; `null` fields are left
//! out. The root element takes the type's display name.
//!
//! Decoding is driven by the target descriptor: child elements are matched
//! to fields by name, repeated elements fill sequence fields, and text is
//! converted to the field's scalar type. Empty scalar elements keep the
//! field's default, as do unknown elements.

use bytes::Bytes;
use pactum_core::{coerce, peel, ConversionError, TypeInfo, TypeKind};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

use crate::codec::{Codec, CodecError};

const DEFAULT_ROOT: &str = "response";
const DEFAULT_ITEM: &str = "item";

/// `application/xml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

impl Codec for XmlCodec {
    fn content_type(&self) -> &str {
        "application/xml"
    }

    fn encode(&self, value: &Value, source: &TypeInfo) -> Result<Bytes, CodecError> {
        let root = source.name().unwrap_or(DEFAULT_ROOT);
        let mut writer = Writer::new(Vec::new());

        match value {
            Value::Array(items) => {
                let item = match source.kind() {
                    TypeKind::Sequence(item) => peel(&item.info())
                        .name()
                        .unwrap_or(DEFAULT_ITEM)
                        .to_string(),
                    _ => DEFAULT_ITEM.to_string(),
                };
                write(&mut writer, Event::Start(BytesStart::new(root)))?;
                for value in items {
                    write_element(&mut writer, &item, value)?;
                }
                write(&mut writer, Event::End(BytesEnd::new(root)))?;
            }
            Value::Null => write(&mut writer, Event::Empty(BytesStart::new(root)))?,
            other => write_element(&mut writer, root, other)?,
        }

        Ok(Bytes::from(writer.into_inner()))
    }

    fn decode(&self, body: &[u8], target: &TypeInfo) -> Result<Value, CodecError> {
        let root = parse_document(body)?;
        Ok(element_value(&root, target)?.unwrap_or(Value::Null))
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), CodecError> {
    writer
        .write_event(event)
        .map_err(|e| CodecError::Encode(e.to_string()))
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    value: &Value,
) -> Result<(), CodecError> {
    match value {
        Value::Null => Ok(()),
        Value::Array(items) => items
            .iter()
            .try_for_each(|item| write_element(writer, name, item)),
        Value::Object(object) => {
            write(writer, Event::Start(BytesStart::new(name)))?;
            for (key, value) in object {
                write_element(writer, key, value)?;
            }
            write(writer, Event::End(BytesEnd::new(name)))
        }
        Value::String(text) => write_text(writer, name, text),
        Value::Bool(flag) => write_text(writer, name, &flag.to_string()),
        Value::Number(number) => write_text(writer, name, &number.to_string()),
    }
}

fn write_text(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), CodecError> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

/// A parsed element; attributes are not kept.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn named(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            ..Self::default()
        }
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }
}

fn parse_document(body: &[u8]) -> Result<Element, CodecError> {
    let mut reader = Reader::from_reader(body);
    let mut open: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        match event {
            Event::Start(start) => open.push(Element::named(&start)),
            Event::Empty(start) => close(&mut open, &mut root, Element::named(&start)),
            Event::End(_) => {
                if let Some(element) = open.pop() {
                    close(&mut open, &mut root, element);
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| CodecError::Decode(e.to_string()))?;
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !open.is_empty() {
        return Err(CodecError::Decode("unclosed element".to_string()));
    }
    root.ok_or_else(|| CodecError::Decode("document has no root element".to_string()))
}

fn close(open: &mut [Element], root: &mut Option<Element>, element: Element) {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            root.get_or_insert(element);
        }
    }
}

/// The value of `element` for `info`; `None` leaves the target's default.
fn element_value(element: &Element, info: &TypeInfo) -> Result<Option<Value>, CodecError> {
    match info.kind() {
        TypeKind::Optional(inner) => element_value(element, &inner.info()),
        TypeKind::Struct(_) => {
            let mut object = Map::new();
            for field in info.fields().iter().filter(|f| !f.source.is_parameter()) {
                let field_info = peel(&field.field_type.info());
                let value = match field_info.kind() {
                    TypeKind::Sequence(item) => {
                        let item = item.info();
                        let items = element
                            .children_named(field.name)
                            .map(|child| element_value(child, &item))
                            .filter_map(Result::transpose)
                            .collect::<Result<Vec<_>, _>>()?;
                        (!items.is_empty()).then_some(Value::Array(items))
                    }
                    _ => match element.children_named(field.name).last() {
                        Some(child) => element_value(child, &field_info)?,
                        None => None,
                    },
                };
                if let Some(value) = value {
                    object.insert(field.name.to_string(), value);
                }
            }
            Ok(Some(Value::Object(object)))
        }
        TypeKind::Sequence(item) => {
            let item = item.info();
            element
                .children
                .iter()
                .map(|child| element_value(child, &item))
                .filter_map(Result::transpose)
                .collect::<Result<Vec<_>, _>>()
                .map(|items| Some(Value::Array(items)))
        }
        TypeKind::Map { value, .. } => {
            let value_info = value.info();
            let mut object = Map::new();
            for child in &element.children {
                if let Some(value) = element_value(child, &value_info)? {
                    object.insert(child.name.clone(), value);
                }
            }
            Ok(Some(Value::Object(object)))
        }
        _ => scalar_value(element, info),
    }
}

fn scalar_value(element: &Element, info: &TypeInfo) -> Result<Option<Value>, CodecError> {
    let text = element.text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    match coerce(info, text) {
        Ok(value) => Ok(Some(value)),
        Err(ConversionError::Unsupported(_)) => Ok(Some(Value::String(text.to_string()))),
        Err(e) => Err(CodecError::Decode(format!("{}: {e}", element.name))),
    }
}
