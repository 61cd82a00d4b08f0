use super::{normalize_name, ResourceType};

/// Namespace prefix of framework resources (`@android:string/ok`)
const FRAMEWORK_PACKAGE: &str = "android";

/// A parsed resource reference such as `@string/app_name` or `?attr/colorPrimary`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUrl {
    pub resource_type: ResourceType,

    /// Normalized name
    pub name: String,

    /// `@android:...` or `@*android:...`
    pub framework: bool,

    /// `@+id/...`: declares the resource where it appears
    pub create: bool,

    /// `?...`: theme attribute lookup
    pub theme: bool,
}

impl ResourceUrl {
    /// Parse a `@`/`?` reference; anything else is not a reference
    pub fn parse(value: &str) -> Option<Self> {
        Self::parse_sigil(value, false)
    }

    fn parse_sigil(value: &str, allow_glob: bool) -> Option<Self> {
        let value = value.trim();
        let (theme, rest) = if let Some(rest) = value.strip_prefix('@') {
            (false, rest)
        } else if let Some(rest) = value.strip_prefix('?') {
            (true, rest)
        } else {
            return None;
        };

        // Data binding expressions and escaped literals are not references
        if rest.starts_with('{') || rest.starts_with('@') || rest.starts_with('?') {
            return None;
        }

        let (create, rest) = match rest.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        let rest = rest.strip_prefix('*').unwrap_or(rest);

        Self::parse_body(rest, theme, create, allow_glob)
    }

    /// Parse a directive token: `@type/name`, `?type/name` or bare `type/name`
    pub fn parse_directive(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.starts_with('@') || token.starts_with('?') {
            return Self::parse_sigil(token, true);
        }
        Self::parse_body(token, false, false, true)
    }

    fn parse_body(body: &str, theme: bool, create: bool, allow_glob: bool) -> Option<Self> {
        let (package, body) = match body.split_once(':') {
            // `android:` and `pkg:` only count as a package before the type slash
            Some((package, rest)) if !package.contains('/') => (Some(package), rest),
            _ => (None, body),
        };
        let framework = package == Some(FRAMEWORK_PACKAGE);

        let (type_name, name) = match body.split_once('/') {
            Some((type_name, name)) => (type_name, name),
            // `?colorPrimary` is shorthand for `?attr/colorPrimary`
            None if theme => ("attr", body),
            None => return None,
        };

        let resource_type = ResourceType::from_name(type_name)?;
        let valid = |c: char| is_name_char(c) || (allow_glob && (c == '*' || c == '?'));
        if name.is_empty() || !name.chars().all(valid) {
            return None;
        }
        if create && resource_type != ResourceType::Id {
            return None;
        }

        Some(Self {
            resource_type,
            name: normalize_name(name),
            framework,
            create,
            theme,
        })
    }
}

/// Characters allowed inside a resource name (before normalization)
pub fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '$')
}

impl std::fmt::Display for ResourceUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sigil = if self.theme { '?' } else { '@' };
        let plus = if self.create { "+" } else { "" };
        let package = if self.framework { "android:" } else { "" };
        write!(f, "{}{}{}{}/{}", sigil, plus, package, self.resource_type, self.name)
    }
}
