//! Analyzer configuration

/// Whether a local may reuse the name of a declaration in an enclosing scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowingPolicy {
    /// Shadowing is legal; the nearest declaration wins
    #[default]
    Allow,
    /// Shadowing an outer declaration is reported as a duplicate
    Forbid,
}

/// What an array dimension may be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DimensionPolicy {
    /// Only a bare integer literal: `int a[3]`
    #[default]
    IntegerLiteral,
    /// Any constant expression over literals and constants: `int a[N + 1]`
    ConstantExpression,
}

/// Configuration options for one analysis run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub shadowing: ShadowingPolicy,
    pub dimensions: DimensionPolicy,
    /// Nesting bound for constant-expression validation
    pub max_const_depth: usize,
    /// Report variables that are never read
    pub warn_unused: bool,
    /// Longest accepted chain of prefix unary operators; `None` disables the check
    pub unary_chain_limit: Option<usize>,
}

impl AnalyzerConfig {
    pub const DEFAULT_MAX_CONST_DEPTH: usize = 100;
    pub const DEFAULT_UNARY_CHAIN_LIMIT: usize = 3;

    pub fn with_shadowing(mut self, shadowing: ShadowingPolicy) -> Self {
        self.shadowing = shadowing;
        self
    }

    pub fn with_dimensions(mut self, dimensions: DimensionPolicy) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_max_const_depth(mut self, depth: usize) -> Self {
        self.max_const_depth = depth;
        self
    }

    pub fn with_warn_unused(mut self, warn_unused: bool) -> Self {
        self.warn_unused = warn_unused;
        self
    }

    pub fn with_unary_chain_limit(mut self, limit: Option<usize>) -> Self {
        self.unary_chain_limit = limit;
        self
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            shadowing: ShadowingPolicy::default(),
            dimensions: DimensionPolicy::default(),
            max_const_depth: Self::DEFAULT_MAX_CONST_DEPTH,
            warn_unused: false,
            unary_chain_limit: Some(Self::DEFAULT_UNARY_CHAIN_LIMIT),
        }
    }
}
