//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{self, Bson, Document, doc, oid::ObjectId},
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductFields, ProductId};
use crate::repository::{Lookup, ProductRepository};

/// Collection holding product documents
pub const COLLECTION_NAME: &str = "products";

const ID: &str = "_id";
const CATEGORY: &str = "category";
const MANUFACTURER: &str = "manufacturer";
const NAME: &str = "name";
const CREATE_DATE: &str = "createDate";

/// MongoDB implementation of the ProductRepository
///
/// Works on raw documents so that fields outside the typed model survive a
/// read or a replace unchanged.
pub struct MongoProductRepository {
    collection: Collection<Document>,
}

impl MongoProductRepository {
    /// Create a new MongoProductRepository
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION_NAME)
    }

    /// Create a new MongoProductRepository with a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Document>(collection_name);
        Self { collection }
    }
}

fn id_filter(id: ProductId) -> Document {
    doc! { ID: id.object_id() }
}

/// BSON for a client-supplied value, taken literally.
///
/// Objects stay plain documents even when their keys look like Extended JSON
/// (`$numberLong`, `$oid`). Integers beyond `i64` are stored as doubles.
fn json_to_bson(value: Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Bson::Int64(i),
            None => n.as_f64().map_or(Bson::Null, Bson::Double),
        },
        Value::String(s) => Bson::String(s),
        Value::Array(items) => Bson::Array(items.into_iter().map(json_to_bson).collect()),
        Value::Object(map) => {
            let mut document = Document::new();
            for (key, value) in map {
                document.insert(key, json_to_bson(value));
            }
            Bson::Document(document)
        }
    }
}

/// Document written for `fields`, without `_id`.
fn fields_to_document(fields: ProductFields, create_date: DateTime<Utc>) -> Document {
    let mut document = doc! {
        CATEGORY: fields.category,
        MANUFACTURER: fields.manufacturer,
        NAME: fields.name,
        CREATE_DATE: bson::DateTime::from_millis(create_date.timestamp_millis()),
    };

    for (key, value) in fields.attributes {
        document.insert(key, json_to_bson(value));
    }

    document
}

fn take_string(document: &mut Document, key: &str, id: ObjectId) -> ProductResult<String> {
    match document.remove(key) {
        Some(Bson::String(value)) => Ok(value),
        _ => Err(ProductError::database(format!(
            "document {} has no string field '{}'",
            id, key
        ))),
    }
}

fn to_chrono(date: bson::DateTime) -> ProductResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(date.timestamp_millis())
        .ok_or_else(|| ProductError::database(format!("createDate out of range: {}", date)))
}

/// Product read back from a stored document.
///
/// Documents without a `createDate` fall back to the creation time encoded
/// in their ObjectId.
fn document_to_product(mut document: Document) -> ProductResult<Product> {
    let id = match document.remove(ID) {
        Some(Bson::ObjectId(id)) => id,
        other => {
            return Err(ProductError::database(format!(
                "document has a non-ObjectId _id: {:?}",
                other
            )));
        }
    };

    let category = take_string(&mut document, CATEGORY, id)?;
    let manufacturer = take_string(&mut document, MANUFACTURER, id)?;
    let name = take_string(&mut document, NAME, id)?;

    let create_date = match document.remove(CREATE_DATE) {
        Some(Bson::DateTime(date)) => to_chrono(date)?,
        _ => to_chrono(id.timestamp())?,
    };

    let attributes: BTreeMap<_, _> = document
        .into_iter()
        .map(|(key, value)| (key, value.into_relaxed_extjson()))
        .collect();

    Ok(Product {
        id: id.into(),
        category,
        manufacturer,
        name,
        create_date,
        attributes,
    })
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> ProductResult<Vec<Product>> {
        let cursor = self.collection.find(doc! {}).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        documents.into_iter().map(document_to_product).collect()
    }

    #[instrument(skip(self, fields), fields(product_name = %fields.name))]
    async fn insert(
        &self,
        fields: ProductFields,
        create_date: DateTime<Utc>,
    ) -> ProductResult<Product> {
        let mut document = fields_to_document(fields, create_date);

        let result = self.collection.insert_one(&document).await?;
        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            ProductError::database(format!("unexpected inserted id: {}", result.inserted_id))
        })?;
        document.insert(ID, id);

        tracing::info!(product_id = %id, "Product created successfully");
        document_to_product(document)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ProductId) -> ProductResult<Lookup<Product>> {
        let document = self.collection.find_one(id_filter(id)).await?;
        document.map(document_to_product).transpose().map(Lookup::from)
    }

    #[instrument(skip(self, fields))]
    async fn replace(&self, id: ProductId, fields: ProductFields) -> ProductResult<Lookup<()>> {
        let existing = self.collection.find_one(id_filter(id)).await?;
        let Some(existing) = existing else {
            return Ok(Lookup::Missing);
        };

        let create_date = match existing.get(CREATE_DATE) {
            Some(Bson::DateTime(date)) => to_chrono(*date)?,
            _ => Utc::now(),
        };

        let replacement = fields_to_document(fields, create_date);
        let result = self
            .collection
            .replace_one(id_filter(id), replacement)
            .await?;

        // Deleted between the read and the replace
        if result.matched_count == 0 {
            return Ok(Lookup::Missing);
        }

        tracing::info!(product_id = %id, "Product updated successfully");
        Ok(Lookup::Found(()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ProductId) -> ProductResult<Lookup<()>> {
        let result = self.collection.delete_one(id_filter(id)).await?;

        if result.deleted_count == 0 {
            return Ok(Lookup::Missing);
        }

        tracing::info!(product_id = %id, "Product deleted successfully");
        Ok(Lookup::Found(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields() -> ProductFields {
        ProductFields {
            category: "Book".to_string(),
            manufacturer: "Acme".to_string(),
            name: "Widget".to_string(),
            attributes: BTreeMap::from([
                ("price".to_string(), json!(12)),
                ("tags".to_string(), json!(["new", "sale"])),
                ("dimensions".to_string(), json!({ "w": 1.5, "h": 2 })),
            ]),
        }
    }

    #[test]
    fn test_fields_to_document() {
        let created = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let document = fields_to_document(fields(), created);

        assert_eq!(document.get_str(CATEGORY).unwrap(), "Book");
        assert_eq!(
            document.get_datetime(CREATE_DATE).unwrap().timestamp_millis(),
            created.timestamp_millis()
        );
        assert_eq!(document.get_i64("price").unwrap(), 12);
        assert!(document.get_array("tags").is_ok());
        assert!(document.get_document("dimensions").is_ok());
        assert!(!document.contains_key(ID));
    }

    #[test]
    fn test_document_round_trip_keeps_attributes() {
        let created = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let id = ObjectId::new();
        let mut document = fields_to_document(fields(), created);
        document.insert(ID, id);

        let product = document_to_product(document).unwrap();
        assert_eq!(product.id, ProductId::from(id));
        assert_eq!(product.name, "Widget");
        assert_eq!(product.create_date, created);
        assert_eq!(product.attributes["price"], json!(12));
        assert_eq!(product.attributes["tags"], json!(["new", "sale"]));
        assert_eq!(product.attributes["dimensions"], json!({ "w": 1.5, "h": 2 }));
    }

    #[test]
    fn test_integer_beyond_i64_is_stored_as_double() {
        let mut fields = fields();
        fields.attributes.insert("qty".to_string(), json!(u64::MAX));

        let document = fields_to_document(fields, Utc::now());
        assert_eq!(document.get("qty"), Some(&Bson::Double(u64::MAX as f64)));
        assert_eq!(document.get("price"), Some(&Bson::Int64(12)));
    }

    #[test]
    fn test_extended_json_lookalikes_pass_through_verbatim() {
        let value = json!({
            "count": { "$numberLong": "5" },
            "ref": { "$oid": "507f1f77bcf86cd799439011" },
            "when": [{ "$date": "2024-01-01T00:00:00Z" }]
        });
        let mut fields = fields();
        fields.attributes.insert("x".to_string(), value.clone());

        let mut document = fields_to_document(fields, Utc::now());
        assert_eq!(
            document.get_document("x").unwrap().get_document("count").unwrap(),
            &doc! { "$numberLong": "5" }
        );

        document.insert(ID, ObjectId::new());
        let product = document_to_product(document).unwrap();
        assert_eq!(product.attributes["x"], value);
    }

    #[test]
    fn test_document_without_create_date_uses_object_id_time() {
        let id = ObjectId::new();
        let document = doc! {
            ID: id,
            CATEGORY: "Book",
            MANUFACTURER: "Acme",
            NAME: "Widget",
        };

        let product = document_to_product(document).unwrap();
        assert_eq!(
            product.create_date.timestamp(),
            id.timestamp().timestamp_millis() / 1000
        );
        assert!(product.attributes.is_empty());
    }

    #[test]
    fn test_document_missing_required_field_is_an_error() {
        let document = doc! { ID: ObjectId::new(), CATEGORY: "Book", NAME: "Widget" };
        assert!(matches!(
            document_to_product(document),
            Err(ProductError::Database { .. })
        ));
    }

    #[test]
    fn test_document_with_foreign_id_is_an_error() {
        let document = doc! { ID: "custom", CATEGORY: "Book", MANUFACTURER: "Acme", NAME: "Widget" };
        assert!(document_to_product(document).is_err());
    }
}
