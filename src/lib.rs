//! SQL Pattern Matching via Thompson NFAs
//!
//! This library compiles the two SQL pattern dialects, `LIKE` (flat wildcard
//! patterns) and `SIMILAR TO` (alternation, grouping and repetition), into
//! nondeterministic finite automata and matches candidate strings against
//! them.
//!
//! The compiler is a recursive-descent parser fused with Thompson-style
//! construction: each grammar rule directly emits an automaton fragment, with
//! no intermediate syntax tree. The matcher simulates the NFA by tracking the
//! set of reachable states per input character, expanding epsilon transitions
//! on the fly.

pub mod compiler;
pub mod matcher;
pub mod nfa;

pub use compiler::{compile, Compiler, Dialect};
pub use matcher::Matcher;
pub use nfa::{Automaton, Fragment, Nfa, StateId};

/// The result of compiling a pattern to an NFA
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that can occur during compilation
///
/// Matching itself never fails; every grammar violation is caught at compile
/// time and no partial automaton is exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The pattern, a parenthesized group or an alternation branch is empty
    EmptyPattern,
    /// An opening parenthesis with no matching close
    UnbalancedGroup,
    /// A `{...}` repetition whose bounds are missing, non-numeric,
    /// out of order or unterminated
    MalformedCount,
    /// An operator appearing where an atomic unit is required
    UnexpectedMetacharacter(char),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::EmptyPattern => write!(f, "empty pattern or group"),
            CompileError::UnbalancedGroup => write!(f, "unbalanced parenthesis"),
            CompileError::MalformedCount => write!(f, "malformed repetition count"),
            CompileError::UnexpectedMetacharacter(ch) => {
                write!(f, "unexpected metacharacter: '{}'", ch)
            }
        }
    }
}

impl std::error::Error for CompileError {}
