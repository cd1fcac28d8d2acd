use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

/// Message returned whenever one of the three required fields is missing or empty.
pub const MISSING_FIELDS: &str = "Must provide category, manufacturer and name.";

/// Keys a client may not set: identity and creation time belong to the store and the service.
pub const RESERVED_KEYS: [&str; 3] = ["_id", "id", "createDate"];

/// Store-assigned identifier of a product.
///
/// Serialized as the 24 character hex form of the underlying ObjectId.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[schema(value_type = String, example = "507f1f77bcf86cd799439011")]
pub struct ProductId(ObjectId);

impl ProductId {
    /// Fresh identifier, as the store would assign on insert.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for ProductId {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl FromStr for ProductId {
    type Err = mongodb::bson::oid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s).map(Self)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

// ObjectId's own serde impl produces `{"$oid": ...}`; the API exposes plain hex.
impl Serialize for ProductId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}

/// A stored product
///
/// The identifier travels under the `_id` key, as stored in MongoDB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Store-assigned identifier, sent as `_id` (there is no `id` key)
    #[serde(rename = "_id")]
    pub id: ProductId,

    pub category: String,

    pub manufacturer: String,

    pub name: String,

    /// Time of creation, kept across updates
    #[serde(rename = "createDate")]
    pub create_date: DateTime<Utc>,

    /// Any other fields sent by the client, stored and returned as-is
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

/// Request body for creating or replacing a product
///
/// The three required fields are optional here so that leaving one out is
/// reported as a validation failure instead of a malformed body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductInput {
    #[validate(
        required(message = "Must provide category, manufacturer and name."),
        length(min = 1, message = "Must provide category, manufacturer and name.")
    )]
    #[schema(example = "Book")]
    pub category: Option<String>,

    #[validate(
        required(message = "Must provide category, manufacturer and name."),
        length(min = 1, message = "Must provide category, manufacturer and name.")
    )]
    #[schema(example = "Acme")]
    pub manufacturer: Option<String>,

    #[validate(
        required(message = "Must provide category, manufacturer and name."),
        length(min = 1, message = "Must provide category, manufacturer and name.")
    )]
    #[schema(example = "Widget")]
    pub name: Option<String>,

    /// Additional fields, passed through unvalidated
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl ProductInput {
    pub fn new(
        category: impl Into<String>,
        manufacturer: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            category: Some(category.into()),
            manufacturer: Some(manufacturer.into()),
            name: Some(name.into()),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// A validated [`ProductInput`] with reserved keys removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub category: String,
    pub manufacturer: String,
    pub name: String,
    pub attributes: BTreeMap<String, Value>,
}

impl ProductFields {
    /// Product built from these fields.
    pub fn into_product(self, id: ProductId, create_date: DateTime<Utc>) -> Product {
        Product {
            id,
            category: self.category,
            manufacturer: self.manufacturer,
            name: self.name,
            create_date,
            attributes: self.attributes,
        }
    }
}

impl TryFrom<ProductInput> for ProductFields {
    type Error = ValidationErrors;

    fn try_from(input: ProductInput) -> Result<Self, Self::Error> {
        input.validate()?;

        let ProductInput {
            category,
            manufacturer,
            name,
            mut attributes,
        } = input;

        for key in RESERVED_KEYS {
            attributes.remove(key);
        }

        match (category, manufacturer, name) {
            (Some(category), Some(manufacturer), Some(name)) => Ok(Self {
                category,
                manufacturer,
                name,
                attributes,
            }),
            _ => Err(missing_fields()),
        }
    }
}

fn missing_fields() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(
        "name",
        ValidationError::new("required").with_message(MISSING_FIELDS.into()),
    );
    errors
}
