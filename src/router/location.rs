//! Path + query locations used for navigation targets.

#[cfg(test)]
#[path = "location_test.rs"]
mod location_test;

use std::fmt;

/// Query parameter carrying the originally requested location.
pub const REDIRECT_PARAM: &str = "redirect";
/// Query parameter hinting which auth form to show.
pub const MODE_PARAM: &str = "mode";

/// A navigable location: a path plus ordered, decoded query pairs.
///
/// Fragments are dropped on parse.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), query: Vec::new() }
    }

    /// Parse `path?query#fragment`. An empty path becomes `/`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let without_fragment = raw.split_once('#').map_or(raw, |(head, _)| head);
        let (path, query) = without_fragment
            .split_once('?')
            .map_or((without_fragment, ""), |(path, query)| (path, query));

        let path = if path.is_empty() { "/".to_owned() } else { path.to_owned() };
        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect();

        Self { path, query }
    }

    /// First value for `key`, if any.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Set `key` to `value`, replacing every existing occurrence in place.
    #[must_use]
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        if let Some(index) = self.query.iter().position(|(k, _)| k == key) {
            self.query[index].1 = value.to_owned();
            let mut seen = false;
            self.query.retain(|(k, _)| {
                if k != key {
                    return true;
                }
                let keep = !seen;
                seen = true;
                keep
            });
        } else {
            self.query.push((key.to_owned(), value.to_owned()));
        }
        self
    }

    /// Render as `path?query` with the query percent-encoded.
    #[must_use]
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.path)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

fn decode(raw: &str) -> String {
    let plus_as_space = raw.replace('+', " ");
    urlencoding::decode(&plus_as_space).map_or(plus_as_space.clone(), std::borrow::Cow::into_owned)
}

/// Which form the auth entry route should show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "login" => Some(Self::Login),
            "register" => Some(Self::Register),
            _ => None,
        }
    }

    /// Mode requested by `target`'s query, falling back to login.
    #[must_use]
    pub fn for_target(target: &Location) -> Self {
        target.query_value(MODE_PARAM).and_then(Self::parse).unwrap_or_default()
    }
}

/// Build the auth entry location for a blocked `original` target.
///
/// The original query is carried over, then `redirect` is set to the
/// original path + query and `mode` to the requested form.
#[must_use]
pub fn auth_redirect(entry_path: &str, original: &Location, mode: AuthMode) -> Location {
    let location = Location { path: entry_path.to_owned(), query: original.query.clone() };
    location
        .with_query(REDIRECT_PARAM, &original.full_path())
        .with_query(MODE_PARAM, mode.as_str())
}
