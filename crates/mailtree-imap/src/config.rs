//! Parser configuration types.

/// Default bound on multipart / embedded-message nesting.
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// How part paths are labelled while the tree is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathNumbering {
    /// Every child extends its parent's label: root `1`, children `1.1`, `1.2`.
    #[default]
    Nested,
    /// Top-level children use IMAP section numbers (`1`, `2`, ...), as if the
    /// root had an empty prefix. The root itself is still labelled `1`.
    Sections,
}

impl PathNumbering {
    /// Returns true if top-level children are labelled without the root prefix.
    #[must_use]
    pub const fn is_sections(self) -> bool {
        matches!(self, Self::Sections)
    }
}

/// Limits and labelling options for a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum nesting of multipart and `message/rfc822` parts.
    pub max_depth: usize,
    /// Inputs longer than this are rejected before parsing.
    pub max_input_len: Option<usize>,
    /// Path labelling scheme.
    pub numbering: PathNumbering,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_len: None,
            numbering: PathNumbering::Nested,
        }
    }
}

impl ParserConfig {
    /// Creates a configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::new()
    }
}

/// Builder for parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfigBuilder {
    max_depth: usize,
    max_input_len: Option<usize>,
    numbering: PathNumbering,
}

impl Default for ParserConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserConfigBuilder {
    /// Creates a new builder with default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_len: None,
            numbering: PathNumbering::Nested,
        }
    }

    /// Sets the maximum nesting depth. A depth of 0 is raised to 1.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = if depth == 0 { 1 } else { depth };
        self
    }

    /// Sets the maximum accepted input length in bytes.
    #[must_use]
    pub const fn max_input_len(mut self, len: usize) -> Self {
        self.max_input_len = Some(len);
        self
    }

    /// Sets the path labelling scheme.
    #[must_use]
    pub const fn numbering(mut self, numbering: PathNumbering) -> Self {
        self.numbering = numbering;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub const fn build(self) -> ParserConfig {
        ParserConfig {
            max_depth: self.max_depth,
            max_input_len: self.max_input_len,
            numbering: self.numbering,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ParserConfig::new();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_input_len, None);
        assert_eq!(config.numbering, PathNumbering::Nested);
    }

    #[test]
    fn test_config_builder() {
        let config = ParserConfig::builder()
            .max_depth(8)
            .max_input_len(4096)
            .numbering(PathNumbering::Sections)
            .build();

        assert_eq!(config.max_depth, 8);
        assert_eq!(config.max_input_len, Some(4096));
        assert!(config.numbering.is_sections());
    }

    #[test]
    fn test_config_builder_zero_depth() {
        let config = ParserConfig::builder().max_depth(0).build();
        assert_eq!(config.max_depth, 1);
    }
}
