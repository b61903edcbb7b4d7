//! Contract-derived request routing.
//!
//! The route table is built from the interface contract: every declared
//! operation becomes exactly one route, and nothing else is routable. Path
//! templates use `{param}` placeholders; matched parameter values are
//! extracted as strings and coerced later against the operation's
//! parameter schema.
//!
//! # Example
//!
//! ```rust
//! use petstore_core::contract::{Contract, Operation};
//! use petstore_server::Router;
//! use http::Method;
//!
//! let contract = Contract::builder("petstore")
//!     .operation(
//!         Operation::builder("getPetById")
//!             .method(Method::GET)
//!             .path("/pet/{petId}")
//!             .build(),
//!     )
//!     .build();
//!
//! let router = Router::from_contract(&contract);
//! let m = router.match_route(&Method::GET, "/pet/42").unwrap();
//! assert_eq!(m.operation_id(), "getPetById");
//! assert_eq!(m.param("petId"), Some("42"));
//! ```

use std::collections::HashMap;

use http::Method;

use petstore_core::Contract;

/// A matched route with extracted path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    operation_id: String,
    params: HashMap<String, String>,
}

impl RouteMatch {
    /// Creates a new route match.
    #[must_use]
    pub fn new(operation_id: impl Into<String>, params: HashMap<String, String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            params,
        }
    }

    /// Returns the matched operation id.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the extracted path parameters.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Returns one path parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    segments: Vec<PathSegment>,
    operation_id: String,
}

impl Route {
    fn new(method: Method, pattern: &str, operation_id: impl Into<String>) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.starts_with('{') && s.ends_with('}') {
                    PathSegment::Param(s[1..s.len() - 1].to_string())
                } else {
                    PathSegment::Literal(s.to_string())
                }
            })
            .collect();
        Self {
            method,
            segments,
            operation_id: operation_id.into(),
        }
    }

    fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (pattern, actual) in self.segments.iter().zip(path_segments.iter()) {
            match pattern {
                PathSegment::Literal(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                PathSegment::Param(name) => {
                    params.insert(name.clone(), (*actual).to_string());
                }
            }
        }
        Some(params)
    }
}

/// HTTP request router, derived from the interface contract.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Builds a route table from a contract: one route per declared
    /// operation.
    #[must_use]
    pub fn from_contract(contract: &Contract) -> Self {
        let mut router = Self::new();
        for op in contract.operations() {
            router.add_route(op.method().clone(), op.path(), op.operation_id());
        }
        router
    }

    /// Adds one route.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: impl AsRef<str>,
        operation_id: impl Into<String>,
    ) {
        self.routes
            .push(Route::new(method, pattern.as_ref(), operation_id));
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Matches a request against the route table. First match wins.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        for route in &self.routes {
            if route.method == *method {
                if let Some(params) = route.match_path(path) {
                    return Some(RouteMatch::new(&route.operation_id, params));
                }
            }
        }
        None
    }

    /// Checks whether an operation id has a route.
    #[must_use]
    pub fn has_operation(&self, operation_id: &str) -> bool {
        self.routes.iter().any(|r| r.operation_id == operation_id)
    }

    /// Returns all routed operation ids.
    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.operation_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petstore_core::contract::Operation;

    fn petstore_contract() -> Contract {
        Contract::builder("petstore")
            .operation(
                Operation::builder("addPet")
                    .method(Method::POST)
                    .path("/pet")
                    .build(),
            )
            .operation(
                Operation::builder("findPetsByStatus")
                    .method(Method::GET)
                    .path("/pet/findByStatus")
                    .build(),
            )
            .operation(
                Operation::builder("getPetById")
                    .method(Method::GET)
                    .path("/pet/{petId}")
                    .build(),
            )
            .operation(
                Operation::builder("deletePet")
                    .method(Method::DELETE)
                    .path("/pet/{petId}")
                    .build(),
            )
            .build()
    }

    #[test]
    fn test_from_contract_builds_every_route_once() {
        let router = Router::from_contract(&petstore_contract());
        assert_eq!(router.route_count(), 4);
        assert!(router.has_operation("addPet"));
        assert!(router.has_operation("deletePet"));
    }

    #[test]
    fn test_literal_route_wins_over_template() {
        // /pet/findByStatus is declared before /pet/{petId}, so the literal
        // path must not be captured as a petId.
        let router = Router::from_contract(&petstore_contract());

        let m = router
            .match_route(&Method::GET, "/pet/findByStatus")
            .unwrap();
        assert_eq!(m.operation_id(), "findPetsByStatus");

        let m = router.match_route(&Method::GET, "/pet/42").unwrap();
        assert_eq!(m.operation_id(), "getPetById");
        assert_eq!(m.param("petId"), Some("42"));
    }

    #[test]
    fn test_method_mismatch() {
        let router = Router::from_contract(&petstore_contract());
        assert!(router.match_route(&Method::PUT, "/pet/42").is_none());
    }

    #[test]
    fn test_path_mismatch() {
        let router = Router::from_contract(&petstore_contract());
        assert!(router.match_route(&Method::GET, "/store/42").is_none());
        assert!(router.match_route(&Method::GET, "/pet/42/extra").is_none());
    }

    #[test]
    fn test_same_path_different_methods() {
        let router = Router::from_contract(&petstore_contract());

        let get = router.match_route(&Method::GET, "/pet/7").unwrap();
        assert_eq!(get.operation_id(), "getPetById");

        let delete = router.match_route(&Method::DELETE, "/pet/7").unwrap();
        assert_eq!(delete.operation_id(), "deletePet");
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let router = Router::from_contract(&petstore_contract());
        assert!(router.match_route(&Method::POST, "/pet/").is_some());
    }

    #[test]
    fn test_param_values_are_raw_strings() {
        // The router extracts, the schema layer coerces.
        let router = Router::from_contract(&petstore_contract());
        let m = router.match_route(&Method::GET, "/pet/abc").unwrap();
        assert_eq!(m.param("petId"), Some("abc"));
    }
}
