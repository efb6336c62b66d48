use crate::nfa::{Automaton, Fragment, Nfa};
use crate::{CompileError, CompileResult};
use log::{debug, trace};

/// The two supported pattern dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Flat wildcard patterns: `%` (any string) and `_` (any character),
    /// everything else literal
    Like,
    /// Alternation, grouping and repetition on top of the two wildcards
    SimilarTo,
}

/// Compile a pattern in the given dialect to an automaton
pub fn compile(dialect: Dialect, pattern: &str) -> CompileResult<Automaton> {
    Compiler::new(pattern).compile(dialect)
}

/// Recursive-descent compiler fused with Thompson construction
///
/// There is no syntax tree: each grammar rule emits its automaton fragment
/// directly into the arena as the pattern is consumed. On any grammar
/// violation the whole compilation aborts; no partial automaton escapes.
pub struct Compiler {
    chars: Vec<char>,
    pos: usize,
    nfa: Nfa,
}

impl Compiler {
    /// Create a compiler over the given pattern text
    pub fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            pos: 0,
            nfa: Nfa::new(),
        }
    }

    /// Compile the whole pattern, consuming the compiler
    pub fn compile(mut self, dialect: Dialect) -> CompileResult<Automaton> {
        trace!(
            "compiling {:?} pattern of {} characters",
            dialect,
            self.chars.len()
        );
        if self.chars.is_empty() {
            return Err(CompileError::EmptyPattern);
        }
        let fragment = match dialect {
            Dialect::Like => self.like_pattern()?,
            Dialect::SimilarTo => self.similar_pattern()?,
        };
        debug!(
            "compiled {:?} pattern into {} states",
            dialect,
            self.nfa.state_count()
        );
        Ok(Automaton::new(self.nfa, fragment))
    }

    // LIKE: a flat sequence of base units, concatenated in order.
    fn like_pattern(&mut self) -> CompileResult<Fragment> {
        let mut root: Option<Fragment> = None;
        while let Some(ch) = self.next_char() {
            let unit = match ch {
                '%' => {
                    let any = self.nfa.any_symbol();
                    self.nfa.closure(any)
                }
                '_' => self.nfa.any_symbol(),
                literal => self.nfa.symbol(literal),
            };
            root = Some(match root {
                None => unit,
                Some(prior) => self.nfa.concat(prior, unit),
            });
        }
        root.ok_or(CompileError::EmptyPattern)
    }

    // SIMILAR TO: the top level is a sequence of alternations. A wildcard or
    // group opener terminates a concatenation, so the loop here resumes with
    // a fresh alternation and joins the pieces left to right.
    fn similar_pattern(&mut self) -> CompileResult<Fragment> {
        let mut root = self.alternation()?;
        while !self.at_end() {
            let next = self.alternation()?;
            root = self.nfa.concat(root, next);
        }
        Ok(root)
    }

    fn alternation(&mut self) -> CompileResult<Fragment> {
        let mut left = self.concatenation()?;
        while self.peek_is('|') {
            self.pos += 1;
            let right = self.concatenation()?;
            left = self.nfa.union(left, right);
        }
        Ok(left)
    }

    fn concatenation(&mut self) -> CompileResult<Fragment> {
        let mut left = self.duplication()?;
        while !self.at_end() && !self.peek_metacharacter() {
            let right = self.duplication()?;
            left = self.nfa.concat(left, right);
        }
        Ok(left)
    }

    fn duplication(&mut self) -> CompileResult<Fragment> {
        let mut left = self.atomic()?;
        while self.peek_duplication_operator() {
            left = match self.next_char() {
                Some('*') => self.nfa.closure(left),
                Some('+') => self.nfa.one_or_more(left),
                Some('?') => self.nfa.zero_or_one(left),
                Some('{') => self.counted(left)?,
                _ => unreachable!("peeked duplication operator"),
            };
        }
        Ok(left)
    }

    fn atomic(&mut self) -> CompileResult<Fragment> {
        let ch = match self.next_char() {
            Some(ch) => ch,
            None => return Err(CompileError::EmptyPattern),
        };
        match ch {
            '(' => {
                if self.at_end() {
                    return Err(CompileError::UnbalancedGroup);
                }
                if self.peek_is(')') {
                    return Err(CompileError::EmptyPattern);
                }
                let inner = self.group_body()?;
                if !self.peek_is(')') {
                    return Err(CompileError::UnbalancedGroup);
                }
                self.pos += 1;
                Ok(inner)
            }
            '%' => {
                let any = self.nfa.any_symbol();
                Ok(self.nfa.closure(any))
            }
            '_' => Ok(self.nfa.any_symbol()),
            '*' | '+' | '?' | '{' | '|' | ')' => Err(CompileError::UnexpectedMetacharacter(ch)),
            literal => Ok(self.nfa.symbol(literal)),
        }
    }

    // A parenthesized sub-pattern is a full rich pattern again, compiled in
    // place until the matching close. Nesting recurses through atomic().
    fn group_body(&mut self) -> CompileResult<Fragment> {
        let mut root = self.alternation()?;
        while !self.at_end() && !self.peek_is(')') {
            let next = self.alternation()?;
            root = self.nfa.concat(root, next);
        }
        Ok(root)
    }

    // Remainder of a `{...}` suffix; the opening brace is already consumed.
    fn counted(&mut self, fragment: Fragment) -> CompileResult<Fragment> {
        let min = self.parse_count()?;
        if self.peek_is('}') {
            self.pos += 1;
            return Ok(self.nfa.repeat_exact(fragment, min));
        }
        if self.peek_is(',') {
            self.pos += 1;
            if self.peek_is('}') {
                self.pos += 1;
                return Ok(self.nfa.repeat_at_least(fragment, min));
            }
            let max = self.parse_count()?;
            if !self.peek_is('}') {
                return Err(CompileError::MalformedCount);
            }
            self.pos += 1;
            if max < min {
                return Err(CompileError::MalformedCount);
            }
            return Ok(self.nfa.repeat_range(fragment, min, max));
        }
        Err(CompileError::MalformedCount)
    }

    /// Parse a non-negative decimal integer from the pattern text
    fn parse_count(&mut self) -> CompileResult<u32> {
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(CompileError::MalformedCount);
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits.parse().map_err(|_| CompileError::MalformedCount)
    }

    fn peek_metacharacter(&self) -> bool {
        matches!(
            self.peek(),
            Some('|' | '*' | '_' | '%' | '+' | '?' | '(' | ')')
        )
    }

    fn peek_duplication_operator(&self) -> bool {
        matches!(self.peek(), Some('*' | '+' | '?' | '{'))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_is(&self, ch: char) -> bool {
        self.peek() == Some(ch)
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}
