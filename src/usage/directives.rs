use crate::resource::{GlobMatcher, ResourceId, ResourceRegistry, ResourceUrl};
use tracing::{debug, trace};

/// What a keep/discard directive does to the resources it names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// Force reachable and exempt from renaming
    Keep,
    /// Force unreachable
    Discard,
}

/// Raw directive text captured from `tools:keep` / `tools:discard` or config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub text: String,
}

impl Directive {
    pub fn new(kind: DirectiveKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }

    /// Comma or semicolon separated tokens, trimmed, empty ones dropped
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text
            .split([',', ';'])
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// Analysis mode selected by `tools:shrinkMode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShrinkMode {
    /// Unresolved strings may name resources built at runtime
    #[default]
    Safe,
    /// Only explicit references count
    Strict,
}

impl ShrinkMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "safe" => Some(ShrinkMode::Safe),
            "strict" => Some(ShrinkMode::Strict),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShrinkMode::Safe => "safe",
            ShrinkMode::Strict => "strict",
        }
    }
}

/// Resources a single directive token names
///
/// A glob token matches every registered resource of its type. Framework
/// tokens and unparseable tokens name nothing.
pub fn expand_token(registry: &ResourceRegistry, token: &str) -> Vec<ResourceId> {
    let Some(url) = ResourceUrl::parse_directive(token) else {
        trace!("Ignoring directive token: {}", token);
        return Vec::new();
    };
    if url.framework {
        return Vec::new();
    }

    if !GlobMatcher::is_glob(&url.name) {
        return registry
            .lookup(url.resource_type, &url.name)
            .into_iter()
            .collect();
    }

    let matcher = GlobMatcher::compile(&url.name);
    registry
        .ids_of_type(url.resource_type)
        .into_iter()
        .filter(|&id| matcher.matches(&registry.get(id).name))
        .collect()
}

/// Apply every directive to the registry
///
/// Keep directives run before discard directives, so a resource named by
/// both ends up discarded.
pub fn resolve(registry: &mut ResourceRegistry, directives: &[Directive]) {
    let ordered = directives
        .iter()
        .filter(|d| d.kind == DirectiveKind::Keep)
        .chain(directives.iter().filter(|d| d.kind == DirectiveKind::Discard));

    for directive in ordered {
        for token in directive.tokens() {
            let matched = expand_token(registry, token);
            debug!(
                "{:?} directive '{}' matched {} resource(s)",
                directive.kind,
                token,
                matched.len()
            );

            for id in matched {
                match directive.kind {
                    DirectiveKind::Keep => {
                        let resource = registry.get_mut(id);
                        resource.set_keep(true);
                        resource.set_reachable(true);
                        registry.add_to_whitelist(Some(id));
                    }
                    DirectiveKind::Discard => {
                        let resource = registry.get_mut(id);
                        resource.set_discard(true);
                        resource.set_reachable(false);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType;

    fn registry_with_icons() -> ResourceRegistry {
        let mut registry = ResourceRegistry::new();
        for name in ["icon_a", "icon_b", "other"] {
            registry.get_or_create(ResourceType::Drawable, name, None);
        }
        registry.get_or_create(ResourceType::String, "icon_text", None);
        registry
    }

    fn names(registry: &ResourceRegistry, ids: &[ResourceId]) -> Vec<String> {
        ids.iter().map(|&id| registry.get(id).to_string()).collect()
    }

    #[test]
    fn test_tokens_split_and_trim() {
        let directive = Directive::new(DirectiveKind::Keep, " @layout/a, ,@drawable/b ,");
        assert_eq!(directive.tokens().collect::<Vec<_>>(), vec!["@layout/a", "@drawable/b"]);
    }

    #[test]
    fn test_semicolon_separated_tokens() {
        let directive = Directive::new(DirectiveKind::Keep, "@layout/a;@drawable/b; @string/c,@raw/d;");
        assert_eq!(
            directive.tokens().collect::<Vec<_>>(),
            vec!["@layout/a", "@drawable/b", "@string/c", "@raw/d"]
        );

        let mut registry = registry_with_icons();
        resolve(
            &mut registry,
            &[Directive::new(DirectiveKind::Keep, "@drawable/icon_a;@string/icon_text")],
        );
        assert!(registry.is_whitelisted("icon_a"));
        assert!(registry.is_whitelisted("icon_text"));
        assert!(!registry.is_whitelisted("icon_b"));
    }

    #[test]
    fn test_expand_glob_stays_within_type() {
        let registry = registry_with_icons();
        let ids = expand_token(&registry, "@drawable/icon_*");
        assert_eq!(names(&registry, &ids), vec!["drawable/icon_a", "drawable/icon_b"]);
    }

    #[test]
    fn test_expand_framework_and_garbage() {
        let registry = registry_with_icons();
        assert!(expand_token(&registry, "@android:drawable/icon_a").is_empty());
        assert!(expand_token(&registry, "not a url").is_empty());
        assert!(expand_token(&registry, "@drawable/missing").is_empty());
    }

    #[test]
    fn test_keep_glob_marks_and_whitelists() {
        let mut registry = registry_with_icons();
        resolve(&mut registry, &[Directive::new(DirectiveKind::Keep, "drawable/icon_*")]);

        let a = registry.lookup(ResourceType::Drawable, "icon_a").unwrap();
        let other = registry.lookup(ResourceType::Drawable, "other").unwrap();
        assert!(registry.get(a).is_keep());
        assert!(registry.get(a).is_reachable());
        assert!(registry.is_whitelisted("icon_b"));
        assert!(!registry.get(other).is_reachable());
        assert!(!registry.is_whitelisted("other"));
    }

    #[test]
    fn test_discard_wins_over_keep() {
        let mut registry = registry_with_icons();
        resolve(
            &mut registry,
            &[
                Directive::new(DirectiveKind::Discard, "@drawable/icon_a"),
                Directive::new(DirectiveKind::Keep, "@drawable/icon_?"),
            ],
        );

        let a = registry.get(registry.lookup(ResourceType::Drawable, "icon_a").unwrap());
        assert!(a.is_discard());
        assert!(!a.is_reachable());
        let b = registry.get(registry.lookup(ResourceType::Drawable, "icon_b").unwrap());
        assert!(b.is_reachable());
    }

    #[test]
    fn test_shrink_mode_parse() {
        assert_eq!(ShrinkMode::parse("strict"), Some(ShrinkMode::Strict));
        assert_eq!(ShrinkMode::parse(" safe "), Some(ShrinkMode::Safe));
        assert_eq!(ShrinkMode::parse("aggressive"), None);
        assert_eq!(ShrinkMode::default(), ShrinkMode::Safe);
    }
}
