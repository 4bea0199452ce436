//! # GraphQL documents and wire envelopes exchanged with AppSync.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Error;

pub const GET_BOOK_QUERY: &str = r#"
query bookQuery($id: ID!) {
  getBook(id: $id) {
    id
    title
    shortdescription
    price
    rating
  }
}
"#;

pub const CREATE_BOOK_MUTATION: &str = r#"
mutation createBook($input: CreateBookInput!) {
  createBook(input: $input) {
    id
    title
    shortdescription
    price
    rating
  }
}
"#;

/// Only what operation validation needs: root types, field arguments and
/// return types, and input object fields.
pub const INTROSPECTION_QUERY: &str = r#"
query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    types {
      kind
      name
      fields {
        name
        args { name }
        type { ...TypeRef }
      }
      inputFields { name }
    }
  }
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType { kind name }
    }
  }
}
"#;

/// Fields selected on `Book` by both documents.
pub const BOOK_FIELDS: &[&str] = &["id", "title", "shortdescription", "price", "rating"];

/// Fields sent inside the `createBook` input object.
pub const CREATE_BOOK_INPUT_FIELDS: &[&str] = &["title", "shortdescription", "price", "rating"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

/// What a document needs from the schema to be executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationShape {
    pub kind: OperationKind,
    pub root_field: &'static str,
    pub argument: &'static str,
    pub selection: &'static [&'static str],
    /// Input object type of `argument` and the fields sent in it.
    pub input: Option<(&'static str, &'static [&'static str])>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    pub variables: Value,
}

impl GraphqlRequest {
    pub fn new(query: &str, operation_name: Option<&str>, variables: Value) -> Self {
        GraphqlRequest {
            query: query.to_owned(),
            operation_name: operation_name.map(str::to_owned),
            variables,
        }
    }

    pub fn introspection() -> Self {
        GraphqlRequest::new(
            INTROSPECTION_QUERY,
            Some("IntrospectionQuery"),
            Value::Object(Default::default()),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<Value>>,
}

impl GraphqlResponse {
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().map_or(false, |e| !e.is_empty())
    }

    /// Yields `data`, raising the `errors` array if the service returned one.
    pub fn into_data(self) -> Result<Value, Error> {
        if let Some(errors) = self.errors.filter(|e| !e.is_empty()) {
            return Err(Error::Graphql(Value::Array(errors)));
        }
        self.data.ok_or(Error::EmptyResponse)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeRef {
    name: Option<String>,
    #[serde(default)]
    of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// Name of the type once `NON_NULL` and `LIST` wrappers are peeled off.
    fn named(&self) -> Option<&str> {
        match &self.name {
            Some(name) => Some(name),
            None => self.of_type.as_ref()?.named(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SchemaField {
    name: String,
    #[serde(default)]
    args: Option<Vec<NamedRef>>,
    #[serde(default, rename = "type")]
    ty: Option<TypeRef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaType {
    name: Option<String>,
    #[serde(default)]
    fields: Option<Vec<SchemaField>>,
    #[serde(default)]
    input_fields: Option<Vec<NamedRef>>,
}

/// The parts of an introspected schema used to check operations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    query_type: Option<NamedRef>,
    mutation_type: Option<NamedRef>,
    #[serde(default)]
    types: Vec<SchemaType>,
}

impl Schema {
    /// Builds a schema from the `data` of an introspection response.
    pub fn from_introspection(data: Value) -> Result<Schema, Error> {
        let schema = data
            .get("__schema")
            .cloned()
            .ok_or_else(|| Error::Schema("introspection result has no __schema".to_owned()))?;
        Ok(serde_json::from_value(schema)?)
    }

    fn root_type(&self, kind: OperationKind) -> Option<&str> {
        let root = match kind {
            OperationKind::Query => self.query_type.as_ref(),
            OperationKind::Mutation => self.mutation_type.as_ref(),
        };
        root.map(|r| r.name.as_str())
    }

    fn type_named(&self, name: &str) -> Option<&SchemaType> {
        self.types.iter().find(|t| t.name.as_deref() == Some(name))
    }

    fn field(&self, type_name: &str, field: &str) -> Option<&SchemaField> {
        self.type_named(type_name)?
            .fields
            .iter()
            .flatten()
            .find(|f| f.name == field)
    }

    pub fn has_root_field(&self, kind: OperationKind, field: &str) -> bool {
        self.root_type(kind)
            .map_or(false, |root| self.field(root, field).is_some())
    }

    /// Checks the root field, its argument, every selected field on the
    /// returned type and, for mutations, the input object's fields.
    pub fn validate(&self, shape: &OperationShape) -> Result<(), Error> {
        let root = self
            .root_type(shape.kind)
            .ok_or_else(|| Error::Schema(format!("schema defines no {:?} type", shape.kind)))?;
        let field = self.field(root, shape.root_field).ok_or_else(|| {
            Error::Schema(format!("type `{}` has no field `{}`", root, shape.root_field))
        })?;

        if !field.args.iter().flatten().any(|a| a.name == shape.argument) {
            return Err(Error::Schema(format!(
                "field `{}.{}` takes no argument `{}`",
                root, shape.root_field, shape.argument
            )));
        }

        let returned = field.ty.as_ref().and_then(TypeRef::named).ok_or_else(|| {
            Error::Schema(format!(
                "return type of `{}.{}` is unknown",
                root, shape.root_field
            ))
        })?;
        for selected in shape.selection {
            if self.field(returned, selected).is_none() {
                return Err(Error::Schema(format!(
                    "type `{}` has no field `{}`",
                    returned, selected
                )));
            }
        }

        if let Some((input_type, input_fields)) = shape.input {
            let input = self.type_named(input_type).ok_or_else(|| {
                Error::Schema(format!("schema defines no input type `{}`", input_type))
            })?;
            for sent in input_fields {
                if !input.input_fields.iter().flatten().any(|f| f.name == *sent) {
                    return Err(Error::Schema(format!(
                        "input type `{}` has no field `{}`",
                        input_type, sent
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn books_schema_data() -> Value {
    use serde_json::json;

    let named = |name: &str| json!({ "kind": "OBJECT", "name": name, "ofType": null });
    let fields = |names: &[&str]| -> Vec<Value> {
        names
            .iter()
            .map(|n| json!({ "name": n, "args": [], "type": named("String") }))
            .collect()
    };
    let input_fields: Vec<Value> = CREATE_BOOK_INPUT_FIELDS
        .iter()
        .map(|n| json!({ "name": n }))
        .collect();

    json!({
        "__schema": {
            "queryType": { "name": "Query" },
            "mutationType": { "name": "Mutation" },
            "types": [
                {
                    "kind": "OBJECT",
                    "name": "Query",
                    "fields": [{
                        "name": "getBook",
                        "args": [{ "name": "id" }],
                        "type": named("Book")
                    }],
                    "inputFields": null
                },
                {
                    "kind": "OBJECT",
                    "name": "Mutation",
                    "fields": [{
                        "name": "createBook",
                        "args": [{ "name": "input" }],
                        "type": named("Book")
                    }],
                    "inputFields": null
                },
                {
                    "kind": "OBJECT",
                    "name": "Book",
                    "fields": fields(BOOK_FIELDS),
                    "inputFields": null
                },
                {
                    "kind": "INPUT_OBJECT",
                    "name": "CreateBookInput",
                    "fields": null,
                    "inputFields": input_fields
                },
                { "kind": "SCALAR", "name": "String", "fields": null, "inputFields": null }
            ]
        }
    })
}

/// Copy of the books schema with `field` removed from `type_name`.
#[cfg(test)]
pub(crate) fn books_schema_without(type_name: &str, field: &str) -> Value {
    let mut data = books_schema_data();
    if let Some(types) = data["__schema"]["types"].as_array_mut() {
        for t in types.iter_mut().filter(|t| t["name"] == type_name) {
            for key in ["fields", "inputFields"] {
                if let Some(list) = t[key].as_array_mut() {
                    list.retain(|f| f["name"] != field);
                }
            }
        }
    }
    data
}
