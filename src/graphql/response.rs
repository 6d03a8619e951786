use crate::{Error, Result};
use serde::de::{self, DeserializeOwned, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Keys a server sent that have no field of their own, kept as raw JSON.
pub type ExtraFields = BTreeMap<String, Box<RawValue>>;

/// Response envelope as returned by the server.
///
/// `data` and `errors` are independent: a partial success carries both.
/// `data`, `extensions` and any non-standard top-level keys are held as raw
/// JSON text, so re-rendering the envelope does not round numbers or drop keys.
#[derive(Debug, Clone, Default)]
pub struct GraphQLResponse {
    /// Raw `data` payload. JSON `null` and an absent key both read as `None`.
    pub data: Option<Box<RawValue>>,
    pub errors: Option<Vec<GraphQLError>>,
    pub extensions: Option<Box<RawValue>>,
    pub extra: ExtraFields,
}

impl GraphQLResponse {
    /// Raw `data`, if the server sent a non-null value.
    pub fn data(&self) -> Option<&RawValue> {
        self.data.as_deref()
    }

    /// GraphQL-level errors; empty when the key was absent.
    pub fn errors(&self) -> &[GraphQLError] {
        self.errors.as_deref().unwrap_or_default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    pub fn extensions(&self) -> Option<&RawValue> {
        self.extensions.as_deref()
    }

    /// Decode `data` into a concrete type. Returns `Ok(None)` when `data` is
    /// null or absent.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let Some(raw) = self.data() else {
            return Ok(None);
        };
        serde_json::from_str(raw.get())
            .map(Some)
            .map_err(|source| Error::Decode {
                source,
                body: raw.get().to_string(),
            })
    }
}

impl Serialize for GraphQLResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("data", &self.data)?;
        if let Some(errors) = &self.errors {
            map.serialize_entry("errors", errors)?;
        }
        if let Some(extensions) = &self.extensions {
            map.serialize_entry("extensions", extensions)?;
        }
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GraphQLResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ResponseVisitor;

        impl<'de> Visitor<'de> for ResponseVisitor {
            type Value = GraphQLResponse;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a GraphQL response object")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<GraphQLResponse, A::Error> {
                let mut data: Option<Option<Box<RawValue>>> = None;
                let mut errors: Option<Option<Vec<GraphQLError>>> = None;
                let mut extensions: Option<Option<Box<RawValue>>> = None;
                let mut extra = ExtraFields::new();

                while let Some(key) = map.next_key::<String>()? {
                    let outcome: std::result::Result<(), A::Error> = match key.as_str() {
                        "data" => set_once(&mut data, "data", map.next_value()?),
                        "errors" => set_once(&mut errors, "errors", map.next_value()?),
                        "extensions" => {
                            set_once(&mut extensions, "extensions", map.next_value()?)
                        }
                        _ => {
                            let value = map.next_value()?;
                            extra.insert(key, value);
                            Ok(())
                        }
                    };
                    outcome?;
                }

                Ok(GraphQLResponse {
                    data: data.flatten(),
                    errors: errors.flatten(),
                    extensions: extensions.flatten(),
                    extra,
                })
            }
        }

        deserializer.deserialize_map(ResponseVisitor)
    }
}

/// One entry of the response's `errors` array.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    pub message: String,
    pub locations: Option<Vec<Location>>,
    pub path: Option<Vec<PathSegment>>,
    pub extensions: Option<Box<RawValue>>,
    /// Non-standard keys some servers add, e.g. Linear's `userPresentableMessage`.
    pub extra: ExtraFields,
}

impl GraphQLError {
    pub fn locations(&self) -> &[Location] {
        self.locations.as_deref().unwrap_or_default()
    }

    pub fn path(&self) -> &[PathSegment] {
        self.path.as_deref().unwrap_or_default()
    }

    /// Look up a single extension value, e.g. `"code"`.
    pub fn extension(&self, key: &str) -> Option<Value> {
        let raw = self.extensions.as_deref()?;
        let mut fields: Map<String, Value> = serde_json::from_str(raw.get()).ok()?;
        fields.remove(key)
    }
}

impl Serialize for GraphQLError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("message", &self.message)?;
        if let Some(locations) = &self.locations {
            map.serialize_entry("locations", locations)?;
        }
        if let Some(path) = &self.path {
            map.serialize_entry("path", path)?;
        }
        if let Some(extensions) = &self.extensions {
            map.serialize_entry("extensions", extensions)?;
        }
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GraphQLError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ErrorVisitor;

        impl<'de> Visitor<'de> for ErrorVisitor {
            type Value = GraphQLError;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a GraphQL error object")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<GraphQLError, A::Error> {
                let mut message: Option<String> = None;
                let mut locations: Option<Option<Vec<Location>>> = None;
                let mut path: Option<Option<Vec<PathSegment>>> = None;
                let mut extensions: Option<Option<Box<RawValue>>> = None;
                let mut extra = ExtraFields::new();

                while let Some(key) = map.next_key::<String>()? {
                    let outcome: std::result::Result<(), A::Error> = match key.as_str() {
                        "message" => set_once(&mut message, "message", map.next_value()?),
                        "locations" => set_once(&mut locations, "locations", map.next_value()?),
                        "path" => set_once(&mut path, "path", map.next_value()?),
                        "extensions" => {
                            set_once(&mut extensions, "extensions", map.next_value()?)
                        }
                        _ => {
                            let value = map.next_value()?;
                            extra.insert(key, value);
                            Ok(())
                        }
                    };
                    outcome?;
                }

                let message =
                    message.ok_or_else(|| <A::Error as de::Error>::missing_field("message"))?;
                Ok(GraphQLError {
                    message,
                    locations: locations.flatten(),
                    path: path.flatten(),
                    extensions: extensions.flatten(),
                    extra,
                })
            }
        }

        deserializer.deserialize_map(ErrorVisitor)
    }
}

fn set_once<T, E: de::Error>(
    slot: &mut Option<T>,
    field: &'static str,
    value: T,
) -> std::result::Result<(), E> {
    if slot.is_some() {
        return Err(E::duplicate_field(field));
    }
    *slot = Some(value);
    Ok(())
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path();
        if path.is_empty() {
            return write!(f, "{}", self.message);
        }
        let joined = path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}: {}", joined, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// A response path element: a field name or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(u64),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}
