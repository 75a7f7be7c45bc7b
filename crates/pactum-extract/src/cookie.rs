//! Request cookies and `Set-Cookie` values.
//!
//! ```rust
//! use pactum_extract::cookie::{SameSite, SetCookie};
//!
//! let cookie = SetCookie::new("session", "abc123")
//!     .http_only(true)
//!     .secure(true)
//!     .same_site(SameSite::Strict)
//!     .max_age_secs(3600)
//!     .path("/");
//!
//! assert_eq!(
//!     cookie.to_string(),
//!     "session=abc123; Path=/; Max-Age=3600; Secure; HttpOnly; SameSite=Strict"
//! );
//! ```

use std::fmt;
use std::time::Duration;

use http::{header, HeaderMap};
use indexmap::IndexMap;

/// Cookies sent with a request, in the order they were sent.
///
/// When a name repeats, the first occurrence is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookies {
    entries: IndexMap<String, String>,
}

impl Cookies {
    /// An empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every `Cookie` header; values that are not visible ASCII are
    /// skipped.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .fold(Self::new(), |mut jar, value| {
                jar.extend_from(value);
                jar
            })
    }

    /// Reads one `Cookie` header value.
    #[must_use]
    pub fn parse(header_value: &str) -> Self {
        let mut jar = Self::new();
        jar.extend_from(header_value);
        jar
    }

    fn extend_from(&mut self, header_value: &str) {
        let pairs = header_value
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, value)| (name.trim(), unquote(value.trim())))
            .filter(|(name, _)| !name.is_empty());

        for (name, value) in pairs {
            self.entries
                .entry(name.to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    /// Value of the cookie called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Whether a cookie called `name` was sent.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// `(name, value)` pairs in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of distinct cookie names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no cookies were sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// The `SameSite` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    /// Sent on cross-site requests too.
    None,
    /// Sent on same-site requests and top-level navigations.
    #[default]
    Lax,
    /// Sent on same-site requests only.
    Strict,
}

impl SameSite {
    /// Attribute value as written on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Lax => "Lax",
            Self::Strict => "Strict",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cookie set by a [`Reply`](crate::Reply).
///
/// Rendered with [`Display`](fmt::Display) as a `Set-Cookie` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    name: String,
    value: String,
    domain: Option<String>,
    path: Option<String>,
    max_age: Option<Duration>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl SetCookie {
    /// A session cookie with no attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            max_age: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    /// A cookie that expires `name` on the client immediately.
    #[must_use]
    pub fn remove(name: impl Into<String>) -> Self {
        Self::new(name, "").max_age(Duration::ZERO)
    }

    /// `Domain` attribute.
    #[must_use]
    pub fn domain(self, domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
            ..self
        }
    }

    /// `Path` attribute.
    #[must_use]
    pub fn path(self, path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..self
        }
    }

    /// `Max-Age` attribute, truncated to whole seconds.
    #[must_use]
    pub fn max_age(self, max_age: Duration) -> Self {
        Self {
            max_age: Some(max_age),
            ..self
        }
    }

    /// `Max-Age` attribute in seconds.
    #[must_use]
    pub fn max_age_secs(self, seconds: u64) -> Self {
        self.max_age(Duration::from_secs(seconds))
    }

    /// `Secure` flag.
    #[must_use]
    pub fn secure(self, secure: bool) -> Self {
        Self { secure, ..self }
    }

    /// `HttpOnly` flag.
    #[must_use]
    pub fn http_only(self, http_only: bool) -> Self {
        Self { http_only, ..self }
    }

    /// `SameSite` attribute.
    #[must_use]
    pub fn same_site(self, same_site: SameSite) -> Self {
        Self {
            same_site: Some(same_site),
            ..self
        }
    }

    /// Cookie name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `Set-Cookie` header value.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={domain}")?;
        }
        if let Some(path) = &self.path {
            write!(f, "; Path={path}")?;
        }
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age.as_secs())?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if let Some(same_site) = self.same_site {
            write!(f, "; SameSite={same_site}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_parse_keeps_request_order() {
        let jar = Cookies::parse("session=abc123; theme=dark;lang=en");
        let names: Vec<_> = jar.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["session", "theme", "lang"]);
        assert_eq!(jar.get("theme"), Some("dark"));
    }

    #[test]
    fn test_parse_quoted_and_malformed() {
        let jar = Cookies::parse("token=\"xyz\"; broken; =anon; empty=; half=\"open");
        assert_eq!(jar.get("token"), Some("xyz"));
        assert_eq!(jar.get("empty"), Some(""));
        assert_eq!(jar.get("half"), Some("\"open"));
        assert!(!jar.contains("broken"));
        assert_eq!(jar.len(), 3);
    }

    #[test]
    fn test_first_cookie_wins_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("id=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("id=2; other=x"));

        let jar = Cookies::from_headers(&headers);
        assert_eq!(jar.get("id"), Some("1"));
        assert_eq!(jar.get("other"), Some("x"));
        assert!(Cookies::from_headers(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn test_set_cookie_attributes() {
        let cookie = SetCookie::new("sid", "v")
            .domain("example.com")
            .path("/")
            .max_age_secs(60)
            .secure(true)
            .http_only(true)
            .same_site(SameSite::Lax);
        assert_eq!(
            cookie.to_header_value(),
            "sid=v; Domain=example.com; Path=/; Max-Age=60; Secure; HttpOnly; SameSite=Lax"
        );
        assert_eq!(SetCookie::remove("sid").to_string(), "sid=; Max-Age=0");
    }
}
