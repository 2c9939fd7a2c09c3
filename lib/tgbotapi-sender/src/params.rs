// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Method parameters and their coercion into form fields.
//!
//! Every request is sent as `multipart/form-data`, so that files can travel alongside
//! plain fields. Form fields can only hold text, which is why structured values (such as
//! a `reply_markup` keyboard or an `allowed_updates` list) are serialized into their JSON
//! representation before they are placed on the wire.
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// A binary stream to be uploaded as a file part.
#[derive(Clone, Debug, PartialEq)]
pub struct InputFile {
    pub(crate) name: String,
    pub(crate) source: FileSource,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum FileSource {
    Memory(Arc<[u8]>),
    Path(PathBuf),
}

/// The value of a single parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    File(InputFile),
    /// Any other value. It is sent as its JSON string.
    Json(Value),
}

/// Ordered collection of named parameters for one method invocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl InputFile {
    /// A file whose contents are already in memory.
    pub fn from_bytes<N: Into<String>, B: Into<Vec<u8>>>(name: N, bytes: B) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Memory(bytes.into().into()),
        }
    }

    /// A file that will be read from disk when the request is sent.
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Self {
            name,
            source: FileSource::Path(path),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The contents of a file held in memory, or `None` if it is read from disk.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.source {
            FileSource::Memory(bytes) => Some(&bytes[..]),
            FileSource::Path(_) => None,
        }
    }
}

impl ParamValue {
    /// The text form of this value, or `None` if it must be sent as a file part.
    pub fn form_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Integer(n) => Some(n.to_string()),
            Self::Float(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::File(_) => None,
            Self::Json(value) => Some(value.to_string()),
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if n.is_u64() {
                    // Out of `i64` range; the JSON text keeps every digit.
                    Self::Json(Value::Number(n))
                } else {
                    Self::Float(n.as_f64().unwrap_or_default())
                }
            }
            other => Self::Json(other),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<InputFile> for ParamValue {
    fn from(file: InputFile) -> Self {
        Self::File(file)
    }
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds parameters out of a JSON object.
    ///
    /// `null` members are skipped. Anything other than an object produces no parameters.
    pub fn from_json(value: Value) -> Self {
        let mut params = Self::new();
        if let Value::Object(map) = value {
            for (name, value) in map {
                params.set(name, value);
            }
        }
        params
    }

    /// Sets a parameter, replacing any previous value with the same name.
    ///
    /// Setting `Value::Null` removes the parameter instead.
    pub fn set<N: Into<String>, V: Into<ParamValue>>(&mut self, name: N, value: V) {
        let name = name.into();
        let value = value.into();
        self.entries.retain(|(n, _)| *n != name);
        if !matches!(value, ParamValue::Json(Value::Null)) {
            self.entries.push((name, value));
        }
    }

    /// Builder-style [`Params::set`].
    pub fn with<N: Into<String>, V: Into<ParamValue>>(mut self, name: N, value: V) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find_map(|(n, value)| (n == name).then_some(value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub(crate) fn into_entries(self) -> Vec<(String, ParamValue)> {
        self.entries
    }
}

impl<N: Into<String>, V: Into<ParamValue>> FromIterator<(N, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.set(name, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_values_become_json_text() {
        let params = Params::from_json(json!({
            "reply_markup": {"a": 1},
            "allowed_updates": [1, 2],
        }));

        assert_eq!(
            params.get("reply_markup").and_then(ParamValue::form_text),
            Some(r#"{"a":1}"#.to_string())
        );
        assert_eq!(
            params.get("allowed_updates").and_then(ParamValue::form_text),
            Some("[1,2]".to_string())
        );
    }

    #[test]
    fn primitives_are_kept() {
        let params = Params::from_json(json!({
            "chat_id": 42,
            "text": "hi",
            "silent": true,
            "latitude": 1.5,
        }));

        assert_eq!(params.get("chat_id"), Some(&ParamValue::Integer(42)));
        assert_eq!(params.get("text"), Some(&ParamValue::Text("hi".into())));
        assert_eq!(params.get("silent"), Some(&ParamValue::Bool(true)));
        assert_eq!(params.get("latitude"), Some(&ParamValue::Float(1.5)));
        assert_eq!(
            params.get("text").and_then(ParamValue::form_text),
            Some("hi".to_string())
        );
        assert_eq!(
            params.get("silent").and_then(ParamValue::form_text),
            Some("true".to_string())
        );
    }

    #[test]
    fn nulls_are_dropped() {
        let params = Params::from_json(json!({"limit": null, "offset": 3}));
        assert_eq!(params.len(), 1);
        assert!(params.get("limit").is_none());

        let params = Params::new().with("limit", 5).with("limit", Value::Null);
        assert!(params.is_empty());
    }

    #[test]
    fn files_have_no_text_form() {
        let file = InputFile::from_path("/tmp/celebi.gif");
        assert_eq!(file.name(), "celebi.gif");
        assert_eq!(file.bytes(), None);
        assert_eq!(ParamValue::from(file).form_text(), None);

        let file = InputFile::from_bytes("cert.pem", b"PEM".to_vec());
        assert_eq!(file.bytes(), Some(&b"PEM"[..]));
    }

    #[test]
    fn set_replaces_in_place_of_duplicating() {
        let params: Params = [("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
        let collected = params.iter().collect::<Vec<_>>();
        assert_eq!(
            collected,
            vec![("b", &ParamValue::Integer(2)), ("a", &ParamValue::Integer(3))]
        );
    }
}
