use std::fmt;

use axum::http::Method;

/// The documented operation: its HTTP method(s) and path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteInfo {
    methods: Vec<Method>,
    path: String,
}

impl RouteInfo {
    pub fn new(methods: impl IntoIterator<Item = Method>, path: impl Into<String>) -> Self {
        Self {
            methods: methods.into_iter().collect(),
            path: path.into(),
        }
    }

    /// Shorthand for a single-method route
    pub fn single(method: Method, path: impl Into<String>) -> Self {
        Self::new([method], path)
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for RouteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<&str> = self.methods.iter().map(Method::as_str).collect();
        write!(f, "[{}] {}", methods.join(","), self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_methods_and_path() {
        let route = RouteInfo::new([Method::GET, Method::HEAD], "/users/{id}");
        assert_eq!(route.to_string(), "[GET,HEAD] /users/{id}");
        assert_eq!(route.path(), "/users/{id}");
        assert_eq!(route.methods().len(), 2);
    }
}
