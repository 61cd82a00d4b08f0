use regex::Regex;
use tracing::debug;

/// Wildcard matcher for resource names
///
/// `*` matches any run of characters and `?` exactly one; everything else is
/// literal. Matching is anchored on both ends.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    regex: Option<Regex>,
}

impl GlobMatcher {
    pub fn compile(pattern: &str) -> Self {
        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');
        let mut literal = [0u8; 4];
        for c in pattern.chars() {
            match c {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                other => expr.push_str(&regex::escape(other.encode_utf8(&mut literal))),
            }
        }
        expr.push('$');

        let regex = match Regex::new(&expr) {
            Ok(regex) => Some(regex),
            Err(e) => {
                debug!("Invalid glob '{}': {}", pattern, e);
                None
            }
        };

        Self { regex }
    }

    /// Whether `pattern` contains any wildcard at all
    pub fn is_glob(pattern: &str) -> bool {
        pattern.contains('*') || pattern.contains('?')
    }

    /// Full-string match; a pattern that failed to compile matches nothing
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex
            .as_ref()
            .map(|regex| regex.is_match(candidate))
            .unwrap_or(false)
    }
}
