//! Request description handed to the engine.

use serde_json::Value;
use specmock_core::HttpMethod;
use std::collections::BTreeMap;
use url::form_urlencoded;

/// An incoming request, already split into its parts.
///
/// Header names are stored lowercased. Query and form fields keep every
/// occurrence so repeated (`multi`) parameters can be collected.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: HttpMethod,
    pub path: String,
    pub query: BTreeMap<String, Vec<String>>,
    pub headers: BTreeMap<String, String>,
    pub form: BTreeMap<String, Vec<String>>,
    pub body: Option<Value>,
}

impl Request {
    /// Create a request. A query string on `path` is split into
    /// [`Request::query`] with `application/x-www-form-urlencoded` decoding.
    /// The path itself stays encoded until it is matched.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        let path = path.into();
        let mut request = Self {
            method,
            path: path.clone(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            form: BTreeMap::new(),
            body: None,
        };

        if let Some((base, query)) = path.split_once('?') {
            request.path = base.to_string();
            for (name, value) in form_urlencoded::parse(query.as_bytes()) {
                request = request.query(name, value);
            }
        }
        request
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn form(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Header value by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_query_string_split_from_path() {
        let request = Request::get("/items?limit=5&tag=a&tag=b&flag");

        assert_eq!(request.path, "/items");
        assert_eq!(request.query["limit"], vec!["5"]);
        assert_eq!(request.query["tag"], vec!["a", "b"]);
        assert_eq!(request.query["flag"], vec![""]);
    }

    #[test]
    fn test_query_string_is_decoded() {
        let request = Request::get("/items?name=a%20b&limit=%31&q=x+y&caf%C3%A9=1");

        assert_eq!(request.path, "/items");
        assert_eq!(request.query["name"], vec!["a b"]);
        assert_eq!(request.query["limit"], vec!["1"]);
        assert_eq!(request.query["q"], vec!["x y"]);
        assert_eq!(request.query["caf\u{e9}"], vec!["1"]);
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let request = Request::get("/").header("X-Request-Id", "abc");
        assert_eq!(request.header_value("x-request-id"), Some("abc"));
        assert_eq!(request.header_value("X-REQUEST-ID"), Some("abc"));
    }
}
