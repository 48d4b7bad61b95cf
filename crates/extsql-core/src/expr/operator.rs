use std::fmt;

///
/// OperatorKind
///
/// Closed set of predicate operators the host can emit.
///
/// IMPORTANT:
/// Wire tags are a contract with the host engine and must not change
/// independently of it.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperatorKind {
    And,
    Between,
    Equal,
    Greater,
    GreaterEqual,
    In,
    Invalid,
    Is,
    IsNot,
    Less,
    LessEqual,
    Like,
    Not,
    NotBetween,
    NotEqual,
    NotIn,
    NotLike,
    Or,
}

impl OperatorKind {
    pub const ALL: [Self; 18] = [
        Self::And,
        Self::Between,
        Self::Equal,
        Self::Greater,
        Self::GreaterEqual,
        Self::In,
        Self::Invalid,
        Self::Is,
        Self::IsNot,
        Self::Less,
        Self::LessEqual,
        Self::Like,
        Self::Not,
        Self::NotBetween,
        Self::NotEqual,
        Self::NotIn,
        Self::NotLike,
        Self::Or,
    ];

    /// Stable wire tag naming this operator in the node stream.
    #[must_use]
    pub const fn wire_tag(self) -> &'static str {
        match self {
            Self::And => "concat.and",
            Self::Between => "cmp.between",
            Self::Equal => "cmp.eq",
            Self::Greater => "cmp.gt",
            Self::GreaterEqual => "cmp.ge",
            Self::In => "cmp.in",
            Self::Invalid => "invalid",
            Self::Is => "cmp.is",
            Self::IsNot => "cmp.is_not",
            Self::Less => "cmp.lt",
            Self::LessEqual => "cmp.le",
            Self::Like => "cmp.like",
            Self::Not => "concat.not",
            Self::NotBetween => "cmp.not_between",
            Self::NotEqual => "cmp.ne",
            Self::NotIn => "cmp.not_in",
            Self::NotLike => "cmp.not_like",
            Self::Or => "concat.or",
        }
    }

    /// Resolve an operator wire tag. Leaf and sentinel tags are not operators.
    #[must_use]
    pub fn from_wire_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.wire_tag() == tag)
    }

    /// Fewest children a well-formed node of this operator may carry.
    #[must_use]
    pub const fn min_arity(self) -> usize {
        match self {
            Self::Not | Self::Invalid => 1,
            Self::Between | Self::NotBetween => 3,
            Self::Equal
            | Self::NotEqual
            | Self::Less
            | Self::LessEqual
            | Self::Greater
            | Self::GreaterEqual
            | Self::Is
            | Self::IsNot
            | Self::Like
            | Self::NotLike
            | Self::In
            | Self::NotIn
            | Self::And
            | Self::Or => 2,
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_tag())
    }
}
