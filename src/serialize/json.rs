use glam::Vec2;
use serde_json::{Map, Value};
use smol_str::SmolStr;
use tracing::warn;

use super::{PropertyReader, PropertyWriter};
use crate::error::{Result, UiError};

const TYPE_KEY: &str = "$type";

enum WriteFrame {
    Object { name: String, map: Map<String, Value> },
    List { name: String, items: Vec<Value> },
}

/// Builds a `serde_json::Value` document. Objects carry their type name
/// under `"$type"`.
pub struct JsonWriter {
    stack: Vec<WriteFrame>,
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self {
            stack: vec![WriteFrame::Object {
                name: String::new(),
                map: Map::new(),
            }],
        }
    }
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes any open frames and returns the document.
    pub fn finish(mut self) -> Value {
        while self.stack.len() > 1 {
            self.close();
        }
        match self.stack.pop() {
            Some(WriteFrame::Object { map, .. }) => Value::Object(map),
            Some(WriteFrame::List { items, .. }) => Value::Array(items),
            None => Value::Null,
        }
    }

    fn put(&mut self, name: &str, value: Value) {
        match self.stack.last_mut() {
            Some(WriteFrame::Object { map, .. }) => {
                map.insert(name.to_owned(), value);
            }
            Some(WriteFrame::List { items, .. }) => items.push(value),
            None => {}
        }
    }

    fn close(&mut self) {
        if self.stack.len() <= 1 {
            warn!("unbalanced end of list or object");
            return;
        }
        let (name, value) = match self.stack.pop() {
            Some(WriteFrame::Object { name, map }) => (name, Value::Object(map)),
            Some(WriteFrame::List { name, items }) => (name, Value::Array(items)),
            None => return,
        };
        self.put(&name, value);
    }
}

impl PropertyWriter for JsonWriter {
    fn write_string(&mut self, name: &str, value: &str) {
        self.put(name, Value::from(value));
    }

    fn write_bool(&mut self, name: &str, value: bool) {
        self.put(name, Value::from(value));
    }

    fn write_int(&mut self, name: &str, value: i64) {
        self.put(name, Value::from(value));
    }

    fn write_float(&mut self, name: &str, value: f32) {
        self.put(name, Value::from(f64::from(value)));
    }

    fn write_vec2(&mut self, name: &str, value: Vec2) {
        self.put(
            name,
            Value::Array(vec![
                Value::from(f64::from(value.x)),
                Value::from(f64::from(value.y)),
            ]),
        );
    }

    fn write_enum(&mut self, name: &str, value: &str) {
        self.put(name, Value::from(value));
    }

    fn write_list(&mut self, name: &str, count: usize) {
        self.stack.push(WriteFrame::List {
            name: name.to_owned(),
            items: Vec::with_capacity(count),
        });
    }

    fn end_list(&mut self) {
        self.close();
    }

    fn write_object(&mut self, name: &str, type_name: &str) {
        let mut map = Map::new();
        map.insert(TYPE_KEY.to_owned(), Value::from(type_name));
        self.stack.push(WriteFrame::Object {
            name: name.to_owned(),
            map,
        });
    }

    fn end_object(&mut self) {
        self.close();
    }
}

enum ReadFrame {
    Object(Map<String, Value>),
    List(std::vec::IntoIter<Value>),
}

/// Reads a document produced by [`JsonWriter`].
pub struct JsonReader {
    stack: Vec<ReadFrame>,
}

impl JsonReader {
    pub fn new(document: Map<String, Value>) -> Self {
        Self {
            stack: vec![ReadFrame::Object(document)],
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(document) => Ok(Self::new(document)),
            other => Err(UiError::InvalidValue {
                name: SmolStr::new_static("document"),
                value: other.to_string(),
            }),
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        match self.stack.last() {
            Some(ReadFrame::Object(map)) => map.get(name),
            _ => None,
        }
    }

    fn take(&mut self, name: &str) -> Option<Value> {
        match self.stack.last_mut() {
            Some(ReadFrame::Object(map)) => map.remove(name),
            Some(ReadFrame::List(items)) => items.next(),
            None => None,
        }
    }

    fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        } else {
            warn!("unbalanced end of list or object");
        }
    }
}

impl PropertyReader for JsonReader {
    fn read_string(&mut self, name: &str, default: &str) -> String {
        self.get(name)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_owned()
    }

    fn read_bool(&mut self, name: &str, default: bool) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(default)
    }

    fn read_int(&mut self, name: &str, default: i64) -> i64 {
        self.get(name).and_then(Value::as_i64).unwrap_or(default)
    }

    fn read_float(&mut self, name: &str, default: f32) -> f32 {
        self.get(name)
            .and_then(Value::as_f64)
            .map_or(default, |value| value as f32)
    }

    fn read_vec2(&mut self, name: &str, default: Vec2) -> Vec2 {
        match self.get(name).and_then(Value::as_array).map(Vec::as_slice) {
            Some([x, y]) => match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => Vec2::new(x as f32, y as f32),
                _ => default,
            },
            _ => default,
        }
    }

    fn read_enum(&mut self, name: &str, default: &str) -> String {
        self.read_string(name, default)
    }

    fn read_list(&mut self, name: &str) -> usize {
        let items = match self.take(name) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let count = items.len();
        self.stack.push(ReadFrame::List(items.into_iter()));
        count
    }

    fn end_list(&mut self) {
        self.pop();
    }

    fn read_object(&mut self, name: &str) -> Result<SmolStr> {
        let Some(Value::Object(map)) = self.take(name) else {
            return Err(UiError::MissingObject(SmolStr::new(name)));
        };
        let type_name = map
            .get(TYPE_KEY)
            .and_then(Value::as_str)
            .map(SmolStr::new)
            .ok_or_else(|| UiError::MissingObject(SmolStr::new(format!("{name}.{TYPE_KEY}"))))?;
        self.stack.push(ReadFrame::Object(map));
        Ok(type_name)
    }

    fn end_object(&mut self) {
        self.pop();
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use serde_json::json;

    use super::{JsonReader, JsonWriter};
    use crate::error::UiError;
    use crate::serialize::{PropertyReader, PropertyWriter};

    #[test]
    fn nested_lists_of_objects_keep_their_shape() {
        let mut writer = JsonWriter::new();
        writer.write_object("form", "Form");
        writer.write_vec2("size", Vec2::new(3.0, 4.5));
        writer.write_list("children", 2);
        writer.write_object("", "Label");
        writer.write_string("text", "a");
        writer.end_object();
        writer.write_object("", "Button");
        writer.end_object();
        writer.end_list();
        writer.end_object();

        let document = writer.finish();
        assert_eq!(
            document,
            json!({
                "form": {
                    "$type": "Form",
                    "size": [3.0, 4.5],
                    "children": [
                        { "$type": "Label", "text": "a" },
                        { "$type": "Button" }
                    ]
                }
            })
        );

        let mut reader = JsonReader::parse(&document.to_string()).unwrap();
        assert_eq!(reader.read_object("form").unwrap(), "Form");
        assert_eq!(reader.read_vec2("size", Vec2::ZERO), Vec2::new(3.0, 4.5));
        assert_eq!(reader.read_float("missing", 7.0), 7.0);
        assert_eq!(reader.read_list("children"), 2);
        assert_eq!(reader.read_object("").unwrap(), "Label");
        assert_eq!(reader.read_string("text", ""), "a");
        reader.end_object();
        assert_eq!(reader.read_object("").unwrap(), "Button");
        reader.end_object();
        assert!(matches!(reader.read_object(""), Err(UiError::MissingObject(_))));
    }

    #[test]
    fn non_object_documents_are_rejected() {
        assert!(matches!(
            JsonReader::parse("[1, 2]"),
            Err(UiError::InvalidValue { .. })
        ));
        assert!(matches!(JsonReader::parse("{"), Err(UiError::Json(_))));
    }
}
