//! Response finalization module
//!
//! An ordered chain of hooks that runs on every response right before it is
//! handed to the connection for writing. Hooks only touch headers; status and
//! body are left as the handler produced them.

use hyper::header::{HeaderName, HeaderValue, SERVER};
use hyper::{HeaderMap, Response};

use crate::config::Config;

pub const CROSS_ORIGIN_OPENER_POLICY: &str = "cross-origin-opener-policy";
pub const CROSS_ORIGIN_EMBEDDER_POLICY: &str = "cross-origin-embedder-policy";

/// A step applied to response headers before they are sent
pub trait ResponseHook: Send + Sync {
    fn finalize(&self, headers: &mut HeaderMap);
}

/// Sets a header to a fixed value, replacing any value already present
#[derive(Debug, Clone)]
pub struct SetHeader {
    name: HeaderName,
    value: HeaderValue,
}

impl SetHeader {
    pub const fn new(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value }
    }

    /// Build from strings, validating the header name and value
    pub fn parse(name: &str, value: &str) -> Result<Self, String> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| format!("Invalid header name '{name}': {e}"))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| format!("Invalid value for header '{name}': {e}"))?;
        Ok(Self { name, value })
    }
}

impl ResponseHook for SetHeader {
    fn finalize(&self, headers: &mut HeaderMap) {
        headers.insert(self.name.clone(), self.value.clone());
    }
}

/// Ordered list of response hooks
#[derive(Default)]
pub struct FinalizeChain {
    hooks: Vec<Box<dyn ResponseHook>>,
}

impl FinalizeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook; hooks run in insertion order
    #[must_use]
    pub fn with(mut self, hook: impl ResponseHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// `Cross-Origin-Opener-Policy: same-origin` and
    /// `Cross-Origin-Embedder-Policy: require-corp`
    #[must_use]
    pub fn with_cross_origin_isolation(self) -> Self {
        self.with(SetHeader::new(
            HeaderName::from_static(CROSS_ORIGIN_OPENER_POLICY),
            HeaderValue::from_static("same-origin"),
        ))
        .with(SetHeader::new(
            HeaderName::from_static(CROSS_ORIGIN_EMBEDDER_POLICY),
            HeaderValue::from_static("require-corp"),
        ))
    }

    /// The server's chain: `Server`, configured headers, then isolation headers.
    ///
    /// Isolation headers go last so configured headers cannot override them.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let server_name = HeaderValue::from_str(&config.http.server_name)
            .map_err(|e| format!("Invalid server_name '{}': {e}", config.http.server_name))?;
        let mut chain = Self::new().with(SetHeader::new(SERVER, server_name));

        for rule in &config.headers {
            chain = chain.with(SetHeader::parse(&rule.name, &rule.value)?);
        }

        Ok(chain.with_cross_origin_isolation())
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        for hook in &self.hooks {
            hook.finalize(headers);
        }
    }

    /// Run every hook on the response
    pub fn apply<B>(&self, response: &mut Response<B>) {
        self.apply_headers(response.headers_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeaderRule;
    use hyper::StatusCode;

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> Vec<&'a str> {
        headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect()
    }

    #[test]
    fn test_isolation_headers_added_once() {
        let chain = FinalizeChain::new().with_cross_origin_isolation();
        let mut headers = HeaderMap::new();
        headers.append(CROSS_ORIGIN_OPENER_POLICY, HeaderValue::from_static("unsafe-none"));
        headers.append(CROSS_ORIGIN_OPENER_POLICY, HeaderValue::from_static("same-origin"));

        chain.apply_headers(&mut headers);

        assert_eq!(header(&headers, CROSS_ORIGIN_OPENER_POLICY), vec!["same-origin"]);
        assert_eq!(header(&headers, CROSS_ORIGIN_EMBEDDER_POLICY), vec!["require-corp"]);
    }

    #[test]
    fn test_apply_keeps_status_and_body() {
        let chain = FinalizeChain::new().with_cross_origin_isolation();
        let mut response = Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Content-Type", "text/plain")
            .body("404 Not Found")
            .unwrap();

        chain.apply(&mut response);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(*response.body(), "404 Not Found");
        assert_eq!(header(response.headers(), "content-type"), vec!["text/plain"]);
        assert_eq!(
            header(response.headers(), CROSS_ORIGIN_EMBEDDER_POLICY),
            vec!["require-corp"]
        );
    }

    #[test]
    fn test_hooks_run_in_order() {
        let chain = FinalizeChain::new()
            .with(SetHeader::parse("x-step", "first").unwrap())
            .with(SetHeader::parse("x-step", "second").unwrap());
        let mut headers = HeaderMap::new();

        chain.apply_headers(&mut headers);

        assert_eq!(header(&headers, "x-step"), vec!["second"]);
    }

    #[test]
    fn test_from_config_order() {
        let mut config = Config::default();
        config.http.server_name = "test-server".to_string();
        config.headers = vec![
            HeaderRule {
                name: "Cache-Control".to_string(),
                value: "no-store".to_string(),
            },
            HeaderRule {
                name: "Cross-Origin-Opener-Policy".to_string(),
                value: "unsafe-none".to_string(),
            },
        ];

        let chain = FinalizeChain::from_config(&config).unwrap();
        assert_eq!(chain.len(), 5);

        let mut headers = HeaderMap::new();
        chain.apply_headers(&mut headers);

        assert_eq!(header(&headers, "server"), vec!["test-server"]);
        assert_eq!(header(&headers, "cache-control"), vec!["no-store"]);
        assert_eq!(header(&headers, CROSS_ORIGIN_OPENER_POLICY), vec!["same-origin"]);
    }

    #[test]
    fn test_from_config_rejects_bad_header() {
        let mut config = Config::default();
        config.headers = vec![HeaderRule {
            name: "bad header".to_string(),
            value: "x".to_string(),
        }];
        assert!(FinalizeChain::from_config(&config).is_err());

        config.headers = vec![HeaderRule {
            name: "x-ok".to_string(),
            value: "line\nbreak".to_string(),
        }];
        assert!(FinalizeChain::from_config(&config).is_err());
    }
}
