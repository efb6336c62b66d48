use crate::compiler::{compile, Dialect};
use crate::nfa::Automaton;
use crate::CompileResult;
use log::trace;
use std::collections::HashSet;

/// A matcher that executes a compiled automaton against whole input strings
///
/// Owns its automaton exclusively; the graph is never mutated after
/// compilation, so one matcher may serve concurrent [`Matcher::is_match`]
/// calls against independent inputs.
pub struct Matcher {
    automaton: Automaton,
}

impl Matcher {
    /// Create a matcher for an already compiled automaton
    pub fn new(automaton: Automaton) -> Self {
        Self { automaton }
    }

    /// Compile a pattern and wrap it in a matcher
    pub fn compile(dialect: Dialect, pattern: &str) -> CompileResult<Self> {
        Ok(Self::new(compile(dialect, pattern)?))
    }

    /// The compiled automaton backing this matcher
    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    /// Check if the entire input matches
    ///
    /// Tracks the set of reachable states per input character instead of
    /// recursing, so the stack never grows with input length. The empty
    /// string matches iff the start state's epsilon closure is accepting.
    pub fn is_match(&self, input: &str) -> bool {
        let nfa = self.automaton.nfa();

        let mut seed = HashSet::new();
        seed.insert(self.automaton.start());
        let mut current = nfa.epsilon_closure(&seed);

        for ch in input.chars() {
            if current.is_empty() {
                break;
            }
            let stepped = nfa.step(&current, ch);
            current = nfa.epsilon_closure(&stepped);
        }

        let matched = nfa.is_accepting(&current);
        trace!("{} active states at end, matched={}", current.len(), matched);
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;
    use std::sync::Arc;
    use std::thread;

    fn like(pattern: &str) -> Matcher {
        Matcher::compile(Dialect::Like, pattern).unwrap()
    }

    fn similar(pattern: &str) -> Matcher {
        Matcher::compile(Dialect::SimilarTo, pattern).unwrap()
    }

    #[test]
    fn literal_like_pattern_is_string_equality() {
        let m = like("abc");
        assert!(m.is_match("abc"));
        assert!(!m.is_match("ab"));
        assert!(!m.is_match("abcd"));
        assert!(!m.is_match(""));
        assert!(!m.is_match("abd"));
    }

    #[test]
    fn like_underscore_matches_any_single_character() {
        let m = like("_");
        assert!(m.is_match("a"));
        assert!(m.is_match("%"));
        assert!(!m.is_match(""));
        assert!(!m.is_match("aa"));
    }

    #[test]
    fn like_percent_matches_any_string() {
        let m = like("%");
        assert!(m.is_match(""));
        assert!(m.is_match("a"));
        assert!(m.is_match("any string at all"));
    }

    #[test]
    fn like_mixed_wildcards() {
        let m = like("_ab%");
        assert!(!m.is_match("bba"));
        assert!(!m.is_match("ab"));
        assert!(m.is_match("zab"));
        assert!(m.is_match("cabaaaa"));
        assert!(!m.is_match("caaaaaaab"));
    }

    #[test]
    fn like_operators_are_literal() {
        let m = like("a*");
        assert!(m.is_match("a*"));
        assert!(!m.is_match("a"));
        assert!(!m.is_match("aaa"));
    }

    #[test]
    fn literal_similar_pattern_is_string_equality() {
        let m = similar("abc");
        assert!(m.is_match("abc"));
        assert!(!m.is_match("ab"));
        assert!(!m.is_match("abcd"));
        assert!(!m.is_match(""));
    }

    #[test]
    fn exact_count_repetition() {
        let m = similar("a{2}");
        assert!(!m.is_match("a"));
        assert!(m.is_match("aa"));
        assert!(!m.is_match("aaa"));
    }

    #[test]
    fn alternation_is_anchored_at_pattern_start() {
        let m = similar("(b|c)%");
        assert!(!m.is_match("abc"));
        assert!(m.is_match("bxyz"));
        assert!(m.is_match("cxyz"));
    }

    #[test]
    fn surrounding_wildcards_allow_containment() {
        let m = similar("%(b|d)%");
        assert!(m.is_match("abc"));
        assert!(m.is_match("xdy"));
        assert!(m.is_match("b"));
        assert!(!m.is_match("xyz"));
        assert!(!m.is_match(""));
    }

    #[test]
    fn alternation_of_concatenations() {
        let m = similar("ab|c");
        assert!(m.is_match("ab"));
        assert!(m.is_match("c"));
        assert!(!m.is_match("ac"));
        assert!(!m.is_match("abc"));
    }

    #[test]
    fn wildcard_terminates_a_concatenation_before_alternation() {
        // The grammar ends a concatenation at a wildcard, so the alternation
        // only spans the piece after the break: a%|b parses as a(%|b).
        let m = similar("a%|b");
        assert!(m.is_match("a"));
        assert!(m.is_match("ab"));
        assert!(m.is_match("axyz"));
        assert!(!m.is_match("b"));
    }

    #[test]
    fn grouped_repetition() {
        let m = similar("(ab){1,2}");
        assert!(!m.is_match(""));
        assert!(m.is_match("ab"));
        assert!(m.is_match("abab"));
        assert!(!m.is_match("ababab"));
        assert!(!m.is_match("aba"));
    }

    #[test]
    fn at_least_repetition() {
        let m = similar("a{2,}");
        assert!(!m.is_match("a"));
        assert!(m.is_match("aa"));
        assert!(m.is_match("aaaaaa"));
    }

    #[test]
    fn optional_suffix() {
        let m = similar("ab?");
        assert!(m.is_match("a"));
        assert!(m.is_match("ab"));
        assert!(!m.is_match("abb"));
    }

    #[test]
    fn plus_requires_at_least_one() {
        let m = similar("a+b");
        assert!(!m.is_match("b"));
        assert!(m.is_match("ab"));
        assert!(m.is_match("aaab"));
    }

    #[test]
    fn empty_input_matches_iff_start_closure_accepts() {
        assert!(similar("a*").is_match(""));
        assert!(similar("%").is_match(""));
        assert!(!similar("a").is_match(""));
        assert!(!like("_").is_match(""));
    }

    #[test]
    fn degenerate_range_behaves_like_exact_count() {
        let m = similar("a{2,2}");
        assert!(!m.is_match("a"));
        assert!(m.is_match("aa"));
        assert!(!m.is_match("aaa"));
    }

    #[test]
    fn nested_groups_match() {
        let m = similar("((a|b)c)+");
        assert!(m.is_match("ac"));
        assert!(m.is_match("bcac"));
        assert!(!m.is_match("a"));
        assert!(!m.is_match("cc"));
    }

    #[test]
    fn compiled_automata_agree_on_a_corpus() {
        // Behavioral idempotence: two compilations of the same pattern need
        // not be structurally identical, but must match the same strings.
        fn prop(bytes: Vec<u8>) -> bool {
            let input: String = bytes.iter().map(|b| (b'a' + (b % 3)) as char).collect();
            ["a{1,3}b", "%(b|c)a*", "(ab|ba)+", "_a%"].iter().all(|p| {
                let first = similar(p);
                let second = similar(p);
                first.is_match(&input) == second.is_match(&input)
            })
        }
        quickcheck(prop as fn(Vec<u8>) -> bool);
    }

    #[test]
    fn matcher_is_shareable_across_threads() {
        let m = Arc::new(similar("%(b|d)%"));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let m = Arc::clone(&m);
                thread::spawn(move || {
                    let input = if i % 2 == 0 { "abc" } else { "xyz" };
                    m.is_match(input)
                })
            })
            .collect();
        let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![true, false, true, false]);
    }
}
