use crate::errors::HookError;
use regex::Regex;

/// Glob-style path pattern.
///
/// `*` matches any run of characters and `.` is taken literally. Everything
/// else is passed to the regex engine as-is, so character classes like
/// `[0-9]+` keep working. A trailing query string on the matched path is
/// always accepted.
///
/// ```
/// use gosub_request_hook::net::UrlPattern;
/// let pattern = UrlPattern::new("/pickup/[0-9]+").unwrap();
/// assert!(pattern.matches("/pickup/12?page=2"));
/// assert!(!pattern.matches("/pickup/abc"));
/// ```
#[derive(Clone, Debug)]
pub struct UrlPattern {
    source: String,
    regex: Regex,
}

impl UrlPattern {
    pub fn new(pattern: &str) -> Result<Self, HookError> {
        let translated = pattern.replace('.', "\\.").replace('*', ".*");
        let regex = Regex::new(&format!("^{translated}(?:\\?.*)?$"))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The pattern as it was given
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_path_with_optional_query() {
        let p = UrlPattern::new("/").unwrap();
        assert!(p.matches("/"));
        assert!(p.matches("/?utm=1"));
        assert!(!p.matches("/contents"));
    }

    #[test]
    fn star_matches_any_suffix() {
        let p = UrlPattern::new("/api/pc/pickup_content*").unwrap();
        assert!(p.matches("/api/pc/pickup_content"));
        assert!(p.matches("/api/pc/pickup_content/7"));
        assert!(!p.matches("/api/pc/other"));
    }

    #[test]
    fn dot_is_literal() {
        let p = UrlPattern::new("/index.html").unwrap();
        assert!(p.matches("/index.html"));
        assert!(!p.matches("/indexxhtml"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = UrlPattern::new("/broken[").unwrap_err();
        assert!(matches!(err, HookError::InvalidPattern(_)));
        assert!(err.to_string().starts_with("Invalid URL pattern"));
    }
}
