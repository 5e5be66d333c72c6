use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{IgnoredAny, MapAccess, Visitor},
};
use serde_json::{Map, Value};

const DATA_FIELD: &str = "Data";
const METADATA_FIELD: &str = "Metadata";

/// Envelope the Functions host posts to a custom handler route.
#[derive(Debug, Default)]
pub struct InvokeRequest {
    pub data: Map<String, Value>,
    pub metadata: Map<String, Value>,
}

impl InvokeRequest {
    pub fn from_body(body: &[u8]) -> Self {
        let fields = EnvelopeFields::from_body(body);
        Self {
            data: fields.data.unwrap_or_default(),
            metadata: fields.metadata.unwrap_or_default(),
        }
    }

    /// Name of the function the host is invoking, from `Metadata.sys.MethodName`.
    pub fn method_name(&self) -> Option<&str> {
        self.metadata.get("sys")?.get("MethodName")?.as_str()
    }
}

/// Narrow view of the envelope used by the ingest route, only `Metadata` is read.
///
/// `metadata` stays `None` when the field is absent or `null`, and is echoed
/// back that way in the ingest logs.
#[derive(Debug, Default, Serialize)]
pub struct IngestRequest {
    #[serde(rename = "Metadata")]
    pub metadata: Option<Map<String, Value>>,
}

impl IngestRequest {
    pub fn from_body(body: &[u8]) -> Self {
        Self {
            metadata: EnvelopeFields::from_body(body).metadata,
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvokeResponse {
    pub outputs: Map<String, Value>,
    pub logs: Vec<String>,
    pub return_value: Value,
}

/// The two open-ended envelope fields, decoded the way the host's own
/// decoder fills them.
///
/// Keys match `Data`/`Metadata` ignoring ASCII case and are applied in
/// document order: an object merges into what is already there, `null`
/// resets the field, any other value leaves it untouched. A body that is not
/// a well-formed JSON object decodes to nothing at all.
#[derive(Debug, Default)]
struct EnvelopeFields {
    data: Option<Map<String, Value>>,
    metadata: Option<Map<String, Value>>,
}

impl EnvelopeFields {
    fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

fn merge_field(slot: &mut Option<Map<String, Value>>, value: Value) {
    match value {
        Value::Object(map) => slot.get_or_insert_with(Map::new).extend(map),
        Value::Null => *slot = None,
        _ => {}
    }
}

impl<'de> Deserialize<'de> for EnvelopeFields {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EnvelopeVisitor;

        impl<'de> Visitor<'de> for EnvelopeVisitor {
            type Value = EnvelopeFields;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an invocation envelope object")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = EnvelopeFields::default();
                while let Some(key) = access.next_key::<String>()? {
                    if key.eq_ignore_ascii_case(DATA_FIELD) {
                        merge_field(&mut fields.data, access.next_value()?);
                    } else if key.eq_ignore_ascii_case(METADATA_FIELD) {
                        merge_field(&mut fields.metadata, access.next_value()?);
                    } else {
                        access.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(EnvelopeVisitor)
    }
}
