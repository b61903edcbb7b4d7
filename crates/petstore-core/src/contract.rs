//! Interface-contract model.
//!
//! The contract is the machine-readable document the dispatcher is driven
//! by. It declares, per named operation: HTTP method, path template,
//! parameter schema (path + query, as one flat object), request-body schema
//! and response-body schema. It is loaded once at startup and is the single
//! source of truth for routing and request validation.
//!
//! # Example
//!
//! ```
//! use petstore_core::contract::{Contract, Operation, Schema};
//! use http::Method;
//!
//! let contract = Contract::builder("petstore")
//!     .version("1.0.0")
//!     .operation(
//!         Operation::builder("getPetById")
//!             .method(Method::GET)
//!             .path("/pet/{petId}")
//!             .parameters(Schema::object(vec![(
//!                 "petId",
//!                 Schema::integer().required(),
//!             )]))
//!             .build(),
//!     )
//!     .build();
//!
//! assert!(contract.get("getPetById").is_some());
//! ```

use std::collections::HashMap;

use http::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The interface contract: service metadata plus operation declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    /// The service name this contract describes.
    name: String,
    /// The contract version.
    version: String,
    /// Operations declared in this contract.
    operations: Vec<Operation>,
    /// Operation lookup by id.
    #[serde(skip)]
    operation_index: HashMap<String, usize>,
}

impl Contract {
    /// Creates a new contract builder.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ContractBuilder {
        ContractBuilder::new(name)
    }

    /// Parses a contract from its JSON document form.
    ///
    /// Only enough well-formedness is checked to build routes; the document
    /// is otherwise trusted as an external input.
    pub fn from_json_str(json: &str) -> Result<Self, ContractError> {
        let mut contract: Self = serde_json::from_str(json)?;
        contract.rebuild_index();
        Ok(contract)
    }

    /// Loads a contract document from a file path.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ContractError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Returns the service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the contract version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns all declared operations.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Looks up an operation by its id.
    #[must_use]
    pub fn get(&self, operation_id: &str) -> Option<&Operation> {
        self.operation_index
            .get(operation_id)
            .map(|&idx| &self.operations[idx])
    }

    fn rebuild_index(&mut self) {
        self.operation_index.clear();
        for (idx, op) in self.operations.iter().enumerate() {
            self.operation_index.insert(op.operation_id.clone(), idx);
        }
    }
}

/// Builder for [`Contract`] instances, used by tests and embedded defaults.
#[derive(Debug)]
pub struct ContractBuilder {
    name: String,
    version: String,
    operations: Vec<Operation>,
}

impl ContractBuilder {
    /// Creates a new contract builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "0.0.0".to_string(),
            operations: Vec::new(),
        }
    }

    /// Sets the contract version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Adds an operation.
    #[must_use]
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Builds the contract.
    #[must_use]
    pub fn build(self) -> Contract {
        let mut contract = Contract {
            name: self.name,
            version: self.version,
            operations: self.operations,
            operation_index: HashMap::new(),
        };
        contract.rebuild_index();
        contract
    }
}

/// Errors raised while loading a contract document.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The document is not valid JSON or does not match the contract shape.
    #[error("failed to parse contract document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document could not be read.
    #[error("failed to read contract document: {0}")]
    Io(#[from] std::io::Error),
}

/// A named operation declared in the contract.
///
/// Binds one HTTP method + path template pair to an operation id and the
/// schemas the dispatcher applies to inputs and outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Unique identifier (e.g. "addPet", "getPetById").
    operation_id: String,
    /// HTTP method.
    #[serde(with = "http_method_serde")]
    method: Method,
    /// Path template with `{param}` placeholders (e.g. "/pet/{petId}").
    path: String,
    /// Schema for path + query parameters as one flat object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameters: Option<Schema>,
    /// Request body schema, if the operation takes a body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_body: Option<Schema>,
    /// Response body schema, used to filter success payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response_body: Option<Schema>,
}

impl Operation {
    /// Creates a new operation builder.
    #[must_use]
    pub fn builder(operation_id: impl Into<String>) -> OperationBuilder {
        OperationBuilder::new(operation_id)
    }

    /// Returns the operation id.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path template.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the parameter schema, if declared.
    #[must_use]
    pub fn parameters(&self) -> Option<&Schema> {
        self.parameters.as_ref()
    }

    /// Returns the request-body schema, if declared.
    #[must_use]
    pub fn request_body(&self) -> Option<&Schema> {
        self.request_body.as_ref()
    }

    /// Returns the response-body schema, if declared.
    #[must_use]
    pub fn response_body(&self) -> Option<&Schema> {
        self.response_body.as_ref()
    }
}

/// Builder for [`Operation`] instances.
#[derive(Debug)]
pub struct OperationBuilder {
    operation_id: String,
    method: Method,
    path: String,
    parameters: Option<Schema>,
    request_body: Option<Schema>,
    response_body: Option<Schema>,
}

impl OperationBuilder {
    /// Creates a new operation builder.
    #[must_use]
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            method: Method::GET,
            path: "/".to_string(),
            parameters: None,
            request_body: None,
            response_body: None,
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the path template.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the parameter schema.
    #[must_use]
    pub fn parameters(mut self, schema: Schema) -> Self {
        self.parameters = Some(schema);
        self
    }

    /// Sets the request-body schema.
    #[must_use]
    pub fn request_body(mut self, schema: Schema) -> Self {
        self.request_body = Some(schema);
        self
    }

    /// Sets the response-body schema.
    #[must_use]
    pub fn response_body(mut self, schema: Schema) -> Self {
        self.response_body = Some(schema);
        self
    }

    /// Builds the operation.
    #[must_use]
    pub fn build(self) -> Operation {
        Operation {
            operation_id: self.operation_id,
            method: self.method,
            path: self.path,
            parameters: self.parameters,
            request_body: self.request_body,
            response_body: self.response_body,
        }
    }
}

/// A declared input/output schema.
///
/// A deliberately small JSON-schema-like model: enough to type-check,
/// coerce and default the petstore payloads, nothing more.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Schema {
    /// String type, with optional closed enum and minimum length.
    String {
        /// Whether this field is required.
        #[serde(default)]
        required: bool,
        /// Closed set of allowed values.
        #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
        allowed: Option<Vec<String>>,
        /// Default applied when the field is absent.
        #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
        /// Minimum length.
        #[serde(rename = "minLength", default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
    },
    /// Integer type. Numeric strings are coerced.
    Integer {
        /// Whether this field is required.
        #[serde(default)]
        required: bool,
        /// Minimum value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        /// Default applied when the field is absent.
        #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<i64>,
    },
    /// Number (float) type. Numeric strings are coerced.
    Number {
        /// Whether this field is required.
        #[serde(default)]
        required: bool,
    },
    /// Boolean type. `"true"`/`"false"` strings are coerced.
    Boolean {
        /// Whether this field is required.
        #[serde(default)]
        required: bool,
    },
    /// Array type.
    Array {
        /// Whether this field is required.
        #[serde(default)]
        required: bool,
        /// Schema for array items.
        items: Box<Schema>,
    },
    /// Object type. Unknown properties are stripped during coercion.
    Object {
        /// Whether this field is required.
        #[serde(default)]
        required: bool,
        /// Declared properties.
        #[serde(default)]
        properties: HashMap<String, Schema>,
        /// Property names that must be present after defaults are applied.
        #[serde(rename = "requiredProperties", default)]
        required_properties: Vec<String>,
    },
    /// Any type (accepts anything, passes through untouched).
    Any {
        /// Whether this field is required.
        #[serde(default)]
        required: bool,
    },
}

impl Schema {
    /// Creates a string schema.
    #[must_use]
    pub fn string() -> Self {
        Self::String {
            required: false,
            allowed: None,
            default_value: None,
            min_length: None,
        }
    }

    /// Creates an integer schema.
    #[must_use]
    pub fn integer() -> Self {
        Self::Integer {
            required: false,
            minimum: None,
            default_value: None,
        }
    }

    /// Creates a number schema.
    #[must_use]
    pub fn number() -> Self {
        Self::Number { required: false }
    }

    /// Creates a boolean schema.
    #[must_use]
    pub fn boolean() -> Self {
        Self::Boolean { required: false }
    }

    /// Creates an array schema.
    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self::Array {
            required: false,
            items: Box::new(items),
        }
    }

    /// Creates an object schema from (name, schema) pairs.
    ///
    /// Properties whose schema is marked required become required
    /// properties of the object.
    #[must_use]
    pub fn object(properties: Vec<(&str, Schema)>) -> Self {
        let required_properties: Vec<String> = properties
            .iter()
            .filter(|(_, schema)| schema.is_required())
            .map(|(name, _)| (*name).to_string())
            .collect();

        let props: HashMap<String, Schema> = properties
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect();

        Self::Object {
            required: false,
            properties: props,
            required_properties,
        }
    }

    /// Creates an "any" schema.
    #[must_use]
    pub fn any() -> Self {
        Self::Any { required: false }
    }

    /// Marks this schema as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        match &mut self {
            Self::String { required, .. }
            | Self::Integer { required, .. }
            | Self::Number { required, .. }
            | Self::Boolean { required, .. }
            | Self::Array { required, .. }
            | Self::Object { required, .. }
            | Self::Any { required, .. } => *required = true,
        }
        self
    }

    /// Restricts a string schema to a closed set of values.
    #[must_use]
    pub fn enumerated(self, values: &[&str]) -> Self {
        match self {
            Self::String {
                required,
                default_value,
                min_length,
                ..
            } => Self::String {
                required,
                allowed: Some(values.iter().map(|v| (*v).to_string()).collect()),
                default_value,
                min_length,
            },
            other => other,
        }
    }

    /// Sets the default for a string schema.
    #[must_use]
    pub fn default_str(self, value: &str) -> Self {
        match self {
            Self::String {
                required,
                allowed,
                min_length,
                ..
            } => Self::String {
                required,
                allowed,
                default_value: Some(value.to_string()),
                min_length,
            },
            other => other,
        }
    }

    /// Sets the minimum for an integer schema.
    #[must_use]
    pub fn minimum(self, min: i64) -> Self {
        match self {
            Self::Integer {
                required,
                default_value,
                ..
            } => Self::Integer {
                required,
                minimum: Some(min),
                default_value,
            },
            other => other,
        }
    }

    /// Returns whether this schema is marked as required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        match self {
            Self::String { required, .. }
            | Self::Integer { required, .. }
            | Self::Number { required, .. }
            | Self::Boolean { required, .. }
            | Self::Array { required, .. }
            | Self::Object { required, .. }
            | Self::Any { required, .. } => *required,
        }
    }

    /// Validates and normalizes a value against this schema.
    ///
    /// Coercion is the dispatcher-facing entry point. In one pass it:
    ///
    /// - applies declared defaults for absent object properties,
    /// - coerces numeric strings to numbers (path and query parameters
    ///   always arrive as strings),
    /// - strips unknown object properties,
    /// - then enforces types, required properties and enum membership.
    ///
    /// Returns the normalized value on success.
    ///
    /// # Example
    ///
    /// ```
    /// use petstore_core::contract::Schema;
    /// use serde_json::json;
    ///
    /// let schema = Schema::object(vec![("petId", Schema::integer().required())]);
    /// let coerced = schema.coerce(&json!({"petId": "42", "junk": true})).unwrap();
    /// assert_eq!(coerced, json!({"petId": 42}));
    /// ```
    pub fn coerce(&self, value: &serde_json::Value) -> Result<serde_json::Value, SchemaViolation> {
        self.coerce_at_path(value, "$")
    }

    fn coerce_at_path(
        &self,
        value: &serde_json::Value,
        path: &str,
    ) -> Result<serde_json::Value, SchemaViolation> {
        use serde_json::Value;

        // Explicit null passes through on optional fields. This is load-bearing:
        // `categoryId: null` means "detach", and must survive coercion.
        if value.is_null() {
            if self.is_required() {
                return Err(SchemaViolation::new(path, "required field is null"));
            }
            return Ok(Value::Null);
        }

        match self {
            Self::String {
                allowed,
                min_length,
                ..
            } => {
                let s = value.as_str().ok_or_else(|| {
                    SchemaViolation::new(
                        path,
                        format!("expected string, got {}", value_type_name(value)),
                    )
                })?;

                if let Some(min) = min_length {
                    if s.len() < *min {
                        return Err(SchemaViolation::new(
                            path,
                            format!("string length {} is less than minimum {}", s.len(), min),
                        ));
                    }
                }

                if let Some(values) = allowed {
                    if !values.iter().any(|v| v == s) {
                        return Err(SchemaViolation::new(
                            path,
                            format!("'{}' is not one of: {}", s, values.join(", ")),
                        ));
                    }
                }

                Ok(Value::String(s.to_string()))
            }

            Self::Integer { minimum, .. } => {
                let n = match value {
                    Value::Number(n) => n.as_i64().ok_or_else(|| {
                        SchemaViolation::new(path, "expected integer, got float")
                    })?,
                    Value::String(s) => s.parse::<i64>().map_err(|_| {
                        SchemaViolation::new(path, format!("'{}' is not an integer", s))
                    })?,
                    other => {
                        return Err(SchemaViolation::new(
                            path,
                            format!("expected integer, got {}", value_type_name(other)),
                        ))
                    }
                };

                if let Some(min) = minimum {
                    if n < *min {
                        return Err(SchemaViolation::new(
                            path,
                            format!("value {} is less than minimum {}", n, min),
                        ));
                    }
                }

                Ok(Value::from(n))
            }

            Self::Number { .. } => {
                let n = match value {
                    Value::Number(n) => n.as_f64().ok_or_else(|| {
                        SchemaViolation::new(path, "expected number")
                    })?,
                    Value::String(s) => s.parse::<f64>().map_err(|_| {
                        SchemaViolation::new(path, format!("'{}' is not a number", s))
                    })?,
                    other => {
                        return Err(SchemaViolation::new(
                            path,
                            format!("expected number, got {}", value_type_name(other)),
                        ))
                    }
                };

                Ok(serde_json::json!(n))
            }

            Self::Boolean { .. } => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::String(s) if s == "true" => Ok(Value::Bool(true)),
                Value::String(s) if s == "false" => Ok(Value::Bool(false)),
                other => Err(SchemaViolation::new(
                    path,
                    format!("expected boolean, got {}", value_type_name(other)),
                )),
            },

            Self::Array { items, .. } => {
                let arr = value.as_array().ok_or_else(|| {
                    SchemaViolation::new(
                        path,
                        format!("expected array, got {}", value_type_name(value)),
                    )
                })?;

                let mut out = Vec::with_capacity(arr.len());
                for (idx, item) in arr.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, idx);
                    out.push(items.coerce_at_path(item, &item_path)?);
                }
                Ok(Value::Array(out))
            }

            Self::Object {
                properties,
                required_properties,
                ..
            } => {
                let obj = value.as_object().ok_or_else(|| {
                    SchemaViolation::new(
                        path,
                        format!("expected object, got {}", value_type_name(value)),
                    )
                })?;

                // Declared properties only: unknown keys are stripped.
                let mut out = serde_json::Map::new();
                for (key, prop_schema) in properties {
                    let prop_path = format!("{}.{}", path, key);
                    if let Some(prop_value) = obj.get(key) {
                        out.insert(key.clone(), prop_schema.coerce_at_path(prop_value, &prop_path)?);
                    } else if let Some(default) = prop_schema.default_json() {
                        out.insert(key.clone(), default);
                    }
                }

                for required in required_properties {
                    if !out.contains_key(required) {
                        return Err(SchemaViolation::new(
                            format!("{}.{}", path, required),
                            format!("missing required property '{}'", required),
                        ));
                    }
                }

                Ok(Value::Object(out))
            }

            Self::Any { .. } => Ok(value.clone()),
        }
    }

    /// Returns the declared default as a JSON value, if any.
    fn default_json(&self) -> Option<serde_json::Value> {
        match self {
            Self::String {
                default_value: Some(v),
                ..
            } => Some(serde_json::Value::String(v.clone())),
            Self::Integer {
                default_value: Some(v),
                ..
            } => Some(serde_json::Value::from(*v)),
            _ => None,
        }
    }

    /// Filters a success payload down to the declared response shape.
    ///
    /// Only one level deep: unknown top-level properties of objects (and of
    /// array elements) are dropped; everything else passes through. Values
    /// that do not match the schema shape are returned unchanged; response
    /// filtering never fails a request.
    #[must_use]
    pub fn filter_response(&self, value: serde_json::Value) -> serde_json::Value {
        use serde_json::Value;

        match (self, value) {
            (Self::Object { properties, .. }, Value::Object(map)) => Value::Object(
                map.into_iter()
                    .filter(|(k, _)| properties.contains_key(k))
                    .collect(),
            ),
            (Self::Array { items, .. }, Value::Array(arr)) => {
                Value::Array(arr.into_iter().map(|v| items.filter_response(v)).collect())
            }
            (_, value) => value,
        }
    }
}

/// Returns a human-readable name for a JSON value type.
fn value_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// A schema violation: where it happened and what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema violation at '{path}': {message}")]
pub struct SchemaViolation {
    /// JSON path of the offending value.
    pub path: String,
    /// What went wrong.
    pub message: String,
}

impl SchemaViolation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the violation as structured details for an error body.
    #[must_use]
    pub fn to_details(&self) -> serde_json::Value {
        serde_json::json!({
            "path": self.path,
            "message": self.message,
        })
    }
}

/// Serde support for HTTP methods.
mod http_method_serde {
    use http::Method;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(method: &Method, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Method, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contract_builder_and_lookup() {
        let contract = Contract::builder("petstore")
            .version("1.0.0")
            .operation(
                Operation::builder("getPetById")
                    .method(Method::GET)
                    .path("/pet/{petId}")
                    .build(),
            )
            .operation(
                Operation::builder("addPet")
                    .method(Method::POST)
                    .path("/pet")
                    .build(),
            )
            .build();

        assert_eq!(contract.name(), "petstore");
        assert_eq!(contract.operations().len(), 2);
        assert!(contract.get("addPet").is_some());
        assert!(contract.get("nope").is_none());
    }

    #[test]
    fn test_contract_from_json() {
        let json = r#"{
            "name": "petstore",
            "version": "1.0.0",
            "operations": [
                {
                    "operationId": "getPetById",
                    "method": "GET",
                    "path": "/pet/{petId}",
                    "parameters": {
                        "type": "object",
                        "properties": {"petId": {"type": "integer", "required": true}},
                        "requiredProperties": ["petId"]
                    }
                }
            ]
        }"#;

        let contract = Contract::from_json_str(json).expect("should parse");
        let op = contract.get("getPetById").expect("operation present");
        assert_eq!(op.method(), Method::GET);
        assert_eq!(op.path(), "/pet/{petId}");
        assert!(op.parameters().is_some());
    }

    #[test]
    fn test_coerce_numeric_string() {
        let schema = Schema::integer().minimum(1);
        assert_eq!(schema.coerce(&json!("42")).unwrap(), json!(42));
        assert_eq!(schema.coerce(&json!(7)).unwrap(), json!(7));
        assert!(schema.coerce(&json!("abc")).is_err());
        assert!(schema.coerce(&json!(0)).is_err());
    }

    #[test]
    fn test_coerce_strips_unknown_properties() {
        let schema = Schema::object(vec![("name", Schema::string().required())]);
        let coerced = schema
            .coerce(&json!({"name": "Balu", "hacker": true}))
            .unwrap();
        assert_eq!(coerced, json!({"name": "Balu"}));
    }

    #[test]
    fn test_coerce_applies_defaults() {
        let schema = Schema::object(vec![(
            "status",
            Schema::string().default_str("available"),
        )]);
        let coerced = schema.coerce(&json!({})).unwrap();
        assert_eq!(coerced, json!({"status": "available"}));

        // An explicit value wins over the default.
        let coerced = schema.coerce(&json!({"status": "sold"})).unwrap();
        assert_eq!(coerced, json!({"status": "sold"}));
    }

    #[test]
    fn test_coerce_missing_required_property() {
        let schema = Schema::object(vec![("name", Schema::string().required())]);
        let err = schema.coerce(&json!({})).unwrap_err();
        assert!(err.path.contains("name"));
        assert!(err.message.contains("missing required property"));
    }

    #[test]
    fn test_coerce_enum_membership() {
        let schema = Schema::string().enumerated(&["available", "pending", "sold"]);
        assert!(schema.coerce(&json!("pending")).is_ok());

        let err = schema.coerce(&json!("lost")).unwrap_err();
        assert!(err.message.contains("not one of"));
    }

    #[test]
    fn test_coerce_null_passes_on_optional() {
        // categoryId: null must survive coercion (it means "detach").
        let schema = Schema::object(vec![("categoryId", Schema::integer())]);
        let coerced = schema.coerce(&json!({"categoryId": null})).unwrap();
        assert_eq!(coerced, json!({"categoryId": null}));

        let required = Schema::integer().required();
        assert!(required.coerce(&json!(null)).is_err());
    }

    #[test]
    fn test_coerce_boolean_strings() {
        let schema = Schema::boolean();
        assert_eq!(schema.coerce(&json!("true")).unwrap(), json!(true));
        assert_eq!(schema.coerce(&json!(false)).unwrap(), json!(false));
        assert!(schema.coerce(&json!("yes")).is_err());
    }

    #[test]
    fn test_coerce_nested_array() {
        let schema = Schema::array(Schema::object(vec![(
            "id",
            Schema::integer().required(),
        )]));
        let err = schema
            .coerce(&json!([{"id": 1}, {"id": "x"}]))
            .unwrap_err();
        assert!(err.path.contains("[1]"));
    }

    #[test]
    fn test_filter_response_object() {
        let schema = Schema::object(vec![
            ("id", Schema::integer()),
            ("name", Schema::string()),
        ]);
        let filtered = schema.filter_response(json!({
            "id": 1,
            "name": "Dogs",
            "created_at": "2024-01-01",
        }));
        assert_eq!(filtered, json!({"id": 1, "name": "Dogs"}));
    }

    #[test]
    fn test_filter_response_array_of_objects() {
        let schema = Schema::array(Schema::object(vec![("id", Schema::integer())]));
        let filtered = schema.filter_response(json!([{"id": 1, "x": 2}, {"id": 3}]));
        assert_eq!(filtered, json!([{"id": 1}, {"id": 3}]));
    }

    #[test]
    fn test_filter_response_shape_mismatch_passes_through() {
        let schema = Schema::object(vec![("id", Schema::integer())]);
        assert_eq!(schema.filter_response(json!("plain")), json!("plain"));
    }

    #[test]
    fn test_violation_details() {
        let violation = SchemaViolation::new("$.petId", "'x' is not an integer");
        let details = violation.to_details();
        assert_eq!(details["path"], "$.petId");
        assert!(details["message"].as_str().unwrap().contains("integer"));
    }

    #[test]
    fn test_schema_serialization_round_trip() {
        let schema = Schema::object(vec![
            ("name", Schema::string().required()),
            ("status", Schema::string().enumerated(&["a", "b"]).default_str("a")),
        ]);

        let json = serde_json::to_string(&schema).expect("serialize");
        assert!(json.contains("\"type\":\"object\""));

        let parsed: Schema = serde_json::from_str(&json).expect("deserialize");
        assert!(parsed.coerce(&serde_json::json!({"name": "x"})).is_ok());
    }
}
