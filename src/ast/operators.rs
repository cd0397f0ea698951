use std::fmt;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Logical
    /// Logical AND (`and`)
    And,
    /// Logical OR (`or`)
    Or,

    // Comparison
    /// Equal (`=`)
    Eq,
    /// Not equal (`!=` or `<>`)
    Ne,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Le,
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Ge,

    // Pattern matching
    /// Regular expression match (`~=`)
    RegexEq,
    /// Regular expression non-match (`~!`)
    RegexNe,
    /// SQL LIKE pattern match (`like`)
    Like,
    /// Case-insensitive LIKE (`ilike`)
    ILike,

    // Membership and range
    /// Membership in a list (`in`)
    In,
    /// Closed/half-open range test (`between ... and ...`)
    Between,
    /// Null test (`is`), right operand is the null marker
    Is,

    // Arithmetic
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Modulo (`%`)
    Mod,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Logical negation (`not`)
    Not,
    /// Arithmetic negation (unary `-`)
    Neg,
    /// Element count of an array (`len`)
    Len,
    /// Boolean OR-reduction of an array (`any`)
    Any,
    /// Boolean AND-reduction of an array (`all`)
    All,
    /// Numeric sum of an array (`sum`)
    Sum,
    /// Null test (`is null`)
    IsNull,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Eq => "EQ",
            BinaryOp::Ne => "NE",
            BinaryOp::Lt => "LT",
            BinaryOp::Le => "LE",
            BinaryOp::Gt => "GT",
            BinaryOp::Ge => "GE",
            BinaryOp::RegexEq => "REQ",
            BinaryOp::RegexNe => "RNE",
            BinaryOp::Like => "LIKE",
            BinaryOp::ILike => "ILIKE",
            BinaryOp::In => "IN",
            BinaryOp::Between => "BETWEEN",
            BinaryOp::Is => "IS",
            BinaryOp::Add => "ADD",
            BinaryOp::Sub => "SUB",
            BinaryOp::Mul => "MUL",
            BinaryOp::Div => "DIV",
            BinaryOp::Mod => "MOD",
        };
        f.write_str(name)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnaryOp::Not => "NOT",
            UnaryOp::Neg => "NEG",
            UnaryOp::Len => "LEN",
            UnaryOp::Any => "ANY",
            UnaryOp::All => "ALL",
            UnaryOp::Sum => "SUM",
            UnaryOp::IsNull => "IS_NULL",
        };
        f.write_str(name)
    }
}
