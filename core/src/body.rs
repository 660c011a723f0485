//! Request body representations.
//!
//! # Design
//! A body is a tagged value resolved to bytes only when a command is
//! rendered. Structured values are held as `serde_json::Value` and encoded
//! canonically (object keys sorted ascending, no whitespace). Streams are
//! one-shot: the first resolution drains the reader, later resolutions see
//! an empty body. Every failure degrades to empty content.

use std::cell::RefCell;
use std::fmt;
use std::io::Read;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

/// The body attached to a [`CurlBuilder`](crate::CurlBuilder).
pub enum Body {
    /// Raw text sent as-is.
    Text(String),

    /// Raw bytes sent as-is. The command is a `String`, so bytes that are
    /// not valid UTF-8 are decoded lossily (U+FFFD) when rendered.
    Bytes(Vec<u8>),

    /// A reader drained on first use.
    Stream(StreamBody),

    /// A structured value encoded as canonical JSON.
    Json(Value),
}

impl Body {
    pub fn stream(reader: impl Read + Send + 'static) -> Self {
        Body::Stream(StreamBody::new(reader))
    }

    /// Convert any serializable value into a JSON body.
    ///
    /// A value that cannot be represented as JSON (e.g. a map with
    /// non-string keys) yields an empty body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Body::Json(value),
            Err(err) => {
                warn!(error = %err, "body is not representable as JSON, sending none");
                Body::Bytes(Vec::new())
            }
        }
    }

    /// Resolve the body to the bytes that end up in the `-d` token.
    pub fn content(&self) -> Vec<u8> {
        match self {
            Body::Text(text) => text.as_bytes().to_vec(),
            Body::Bytes(bytes) => bytes.clone(),
            Body::Stream(stream) => stream.drain(),
            Body::Json(value) => to_canonical_json(value),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Body::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Body::Stream(stream) => f.debug_tuple("Stream").field(stream).finish(),
            Body::Json(value) => f.debug_tuple("Json").field(value).finish(),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<&[u8]> for Body {
    fn from(bytes: &[u8]) -> Self {
        Body::Bytes(bytes.to_vec())
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

/// A one-shot reader. Draining takes the reader out, so a second drain
/// returns nothing.
pub struct StreamBody {
    reader: RefCell<Option<Box<dyn Read + Send>>>,
}

impl StreamBody {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: RefCell::new(Some(Box::new(reader))),
        }
    }

    /// Read the stream to the end. A read error discards whatever was read.
    pub fn drain(&self) -> Vec<u8> {
        let Some(mut reader) = self.reader.borrow_mut().take() else {
            return Vec::new();
        };
        let mut buf = Vec::new();
        match reader.read_to_end(&mut buf) {
            Ok(_) => buf,
            Err(err) => {
                warn!(error = %err, "failed to read body stream, sending none");
                Vec::new()
            }
        }
    }

    pub fn is_drained(&self) -> bool {
        self.reader.borrow().is_none()
    }
}

impl fmt::Debug for StreamBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamBody")
            .field("drained", &self.is_drained())
            .finish()
    }
}

/// Encode `value` as compact JSON with every object's keys in ascending
/// order. Arrays keep their order.
pub fn to_canonical_json(value: &Value) -> Vec<u8> {
    match serde_json::to_vec(&canonicalize(value)) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "failed to encode JSON body, sending none");
            Vec::new()
        }
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::{self, Cursor};

    use serde_json::json;

    use super::*;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    #[derive(Serialize)]
    struct Payload {
        name: String,
        bar: String,
        slice: Vec<i32>,
    }

    #[test]
    fn text_and_bytes_are_literal() {
        assert_eq!(Body::from("test").content(), b"test");
        assert_eq!(Body::from(b"test".to_vec()).content(), b"test");
    }

    #[test]
    fn json_keys_are_sorted() {
        let body = Body::from(json!({"name": "test", "bar": "foo", "slice": [1, 2, 3]}));
        assert_eq!(
            String::from_utf8(body.content()).unwrap(),
            r#"{"bar":"foo","name":"test","slice":[1,2,3]}"#
        );
    }

    #[test]
    fn struct_fields_are_sorted() {
        let body = Body::json(&Payload {
            name: "test".to_string(),
            bar: "foo".to_string(),
            slice: vec![3, 1, 2],
        });
        assert_eq!(
            String::from_utf8(body.content()).unwrap(),
            r#"{"bar":"foo","name":"test","slice":[3,1,2]}"#
        );
    }

    #[test]
    fn nested_objects_are_sorted() {
        let body = Body::from(json!({"z": {"b": 1, "a": [{"d": 0, "c": 0}]}, "a": null}));
        assert_eq!(
            String::from_utf8(body.content()).unwrap(),
            r#"{"a":null,"z":{"a":[{"c":0,"d":0}],"b":1}}"#
        );
    }

    #[test]
    fn unrepresentable_value_is_empty() {
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple keys are not JSON");
        assert!(Body::json(&map).content().is_empty());
    }

    #[test]
    fn stream_is_drained_once() {
        let body = Body::stream(Cursor::new(b"payload".to_vec()));
        assert_eq!(body.content(), b"payload");
        assert!(body.content().is_empty());
    }

    #[test]
    fn stream_error_is_empty() {
        let body = Body::stream(FailingReader);
        assert!(body.content().is_empty());
        match body {
            Body::Stream(stream) => assert!(stream.is_drained()),
            other => panic!("unexpected body: {other:?}"),
        }
    }
}
