//! Parser configuration

use brook_bnode::{AllocStrategy, ScopePolicy};
use brook_graph_turtle::{Syntax, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};

/// Everything needed to set up a parse, in a form that can live in an
/// application config file.
///
/// ```
/// use brook_rdf::{ParserConfig, Syntax};
///
/// let config: ParserConfig = serde_json::from_str(r#"{
///     "syntax": "trig",
///     "strict": true,
///     "allocator": { "kind": "seeded_hash", "seed": "nightly" },
///     "scope": "per_graph"
/// }"#).unwrap();
///
/// assert_eq!(config.syntax, Syntax::TriG);
/// assert_eq!(config.base, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub syntax: Syntax,
    /// Base IRI in effect until the document sets its own
    pub base: Option<String>,
    pub strict: bool,
    pub allocator: AllocStrategy,
    pub scope: ScopePolicy,
    /// Bound on `[...]` / `(...)` nesting
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            syntax: Syntax::default(),
            base: None,
            strict: false,
            allocator: AllocStrategy::default(),
            scope: ScopePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserConfig {
    pub fn new(syntax: Syntax) -> Self {
        Self {
            syntax,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.syntax, Syntax::Turtle);
        assert_eq!(config.scope, ScopePolicy::Fixed);
        assert_eq!(config.max_depth, 1024);
        assert!(matches!(config.allocator, AllocStrategy::RandomHash { cache_size: 1000 }));
    }

    #[test]
    fn test_serde_round_trip() {
        let config = ParserConfig {
            base: Some("http://example.org/".into()),
            allocator: AllocStrategy::LabelEncoded,
            ..ParserConfig::new(Syntax::NQuads)
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["syntax"], "nquads");
        assert_eq!(json["allocator"]["kind"], "label_encoded");

        let back: ParserConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
