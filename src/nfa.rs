use std::collections::{BTreeMap, HashMap, HashSet};

/// A state ID in the NFA
pub type StateId = usize;

/// A single NFA state in the arena
///
/// Symbol transitions hold at most one target per literal character; the
/// `any` transition is taken for characters with no literal entry. Epsilon
/// transitions keep insertion order so automaton dumps are deterministic.
#[derive(Debug, Clone)]
pub struct State {
    pub(crate) accepting: bool,
    pub(crate) symbols: BTreeMap<char, StateId>,
    pub(crate) any: Option<StateId>,
    pub(crate) epsilon: Vec<StateId>,
}

impl State {
    fn new(accepting: bool) -> Self {
        Self {
            accepting,
            symbols: BTreeMap::new(),
            any: None,
            epsilon: Vec::new(),
        }
    }
}

/// Fragment of an NFA with start and end states
///
/// Deliberately not `Clone`: construction primitives consume their fragment
/// arguments, so an end state that has been composed away cannot be reused
/// as an accepting terminus. Use [`Nfa::duplicate`] for independent copies.
#[derive(Debug)]
pub struct Fragment {
    pub start: StateId,
    pub end: StateId,
}

/// An arena of NFA states plus the Thompson construction primitives
///
/// States are shared graph nodes, not a tree: concatenation links existing
/// fragments with epsilon edges and closures introduce true cycles, so all
/// traversal here is worklist-based with a visited set.
#[derive(Debug, Clone, Default)]
pub struct Nfa {
    pub(crate) states: Vec<State>,
}

impl Nfa {
    /// Create a new empty NFA arena
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    /// Number of states in the arena
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Add a new state and return its ID
    fn state(&mut self, accepting: bool) -> StateId {
        let id = self.states.len();
        self.states.push(State::new(accepting));
        id
    }

    fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.states[from].epsilon.push(to);
    }

    fn add_symbol(&mut self, from: StateId, to: StateId, symbol: char) {
        self.states[from].symbols.insert(symbol, to);
    }

    fn add_any(&mut self, from: StateId, to: StateId) {
        self.states[from].any = Some(to);
    }

    /// New 2-state fragment matching exactly the literal `symbol`
    pub fn symbol(&mut self, symbol: char) -> Fragment {
        let start = self.state(false);
        let end = self.state(true);
        self.add_symbol(start, end, symbol);
        Fragment { start, end }
    }

    /// New 2-state fragment matching any single character
    pub fn any_symbol(&mut self) -> Fragment {
        let start = self.state(false);
        let end = self.state(true);
        self.add_any(start, end);
        Fragment { start, end }
    }

    /// New 2-state fragment matching only the empty string
    pub fn empty(&mut self) -> Fragment {
        let start = self.state(false);
        let end = self.state(true);
        self.add_epsilon(start, end);
        Fragment { start, end }
    }

    /// Join two fragments in sequence; `first.end` loses acceptance
    pub fn concat(&mut self, first: Fragment, second: Fragment) -> Fragment {
        self.add_epsilon(first.end, second.start);
        self.states[first.end].accepting = false;
        Fragment {
            start: first.start,
            end: second.end,
        }
    }

    /// Zero-or-more repetition; introduces the epsilon cycle end -> start
    pub fn closure(&mut self, fragment: Fragment) -> Fragment {
        let start = self.state(false);
        let end = self.state(true);

        self.add_epsilon(start, end);
        self.add_epsilon(start, fragment.start);

        self.add_epsilon(fragment.end, end);
        self.add_epsilon(fragment.end, fragment.start);
        self.states[fragment.end].accepting = false;
        Fragment { start, end }
    }

    /// Alternation of two fragments; both old ends lose acceptance
    pub fn union(&mut self, first: Fragment, second: Fragment) -> Fragment {
        let start = self.state(false);
        self.add_epsilon(start, first.start);
        self.add_epsilon(start, second.start);

        let end = self.state(true);
        self.add_epsilon(first.end, end);
        self.states[first.end].accepting = false;
        self.add_epsilon(second.end, end);
        self.states[second.end].accepting = false;

        Fragment { start, end }
    }

    /// One-or-more repetition: the fragment followed by a closure of an
    /// independent copy of it
    pub fn one_or_more(&mut self, fragment: Fragment) -> Fragment {
        let copy = self.duplicate(&fragment);
        let rest = self.closure(copy);
        self.concat(fragment, rest)
    }

    /// Zero-or-one repetition; like a closure without the repeat back-edge
    pub fn zero_or_one(&mut self, fragment: Fragment) -> Fragment {
        let start = self.state(false);
        let end = self.state(true);

        self.add_epsilon(start, end);
        self.add_epsilon(start, fragment.start);

        self.add_epsilon(fragment.end, end);
        self.states[fragment.end].accepting = false;
        Fragment { start, end }
    }

    /// Exactly `count` concatenated independent copies of the fragment
    ///
    /// `{0}` compiles to the epsilon-only fragment, matching just the empty
    /// string.
    pub fn repeat_exact(&mut self, fragment: Fragment, count: u32) -> Fragment {
        if count == 0 {
            return self.empty();
        }
        // Copies are taken from the pristine fragment, before any concat
        // clears its end's acceptance.
        let mut copies = Vec::with_capacity(count as usize - 1);
        for _ in 1..count {
            copies.push(self.duplicate(&fragment));
        }
        let mut result = fragment;
        for copy in copies {
            result = self.concat(result, copy);
        }
        result
    }

    /// At least `count` repetitions: `{count}` followed by a closure of an
    /// independent copy
    pub fn repeat_at_least(&mut self, fragment: Fragment, count: u32) -> Fragment {
        if count == 0 {
            return self.closure(fragment);
        }
        let copy = self.duplicate(&fragment);
        let base = self.repeat_exact(fragment, count);
        let rest = self.closure(copy);
        self.concat(base, rest)
    }

    /// Between `min` and `max` repetitions: `{min}` followed by `max - min`
    /// independent zero-or-one copies
    ///
    /// Each optional slot is its own fragment instance rather than a shared
    /// bounded loop, so the slots cannot interfere with each other.
    pub fn repeat_range(&mut self, fragment: Fragment, min: u32, max: u32) -> Fragment {
        debug_assert!(min <= max);
        if max == 0 {
            return self.empty();
        }
        let mut copies = Vec::with_capacity(max as usize - 1);
        for _ in 1..max {
            copies.push(self.duplicate(&fragment));
        }
        let mut result = if min == 0 {
            self.zero_or_one(fragment)
        } else {
            fragment
        };
        for (i, copy) in copies.into_iter().enumerate() {
            let piece = if (i as u32) + 1 < min {
                copy
            } else {
                self.zero_or_one(copy)
            };
            result = self.concat(result, piece);
        }
        result
    }

    /// Deep-copy a fragment's entire reachable state graph
    ///
    /// Walks the subgraph reachable from `fragment.start` (cycle-safe via the
    /// remap table) and allocates a fresh state for every node, then rewrites
    /// all transitions through the old-to-new index map. The copy behaves
    /// identically to the original but shares no state with it.
    pub fn duplicate(&mut self, fragment: &Fragment) -> Fragment {
        let mut remap: HashMap<StateId, StateId> = HashMap::new();
        let mut stack = vec![fragment.start];

        while let Some(id) = stack.pop() {
            if remap.contains_key(&id) {
                continue;
            }
            let accepting = self.states[id].accepting;
            let new_id = self.state(accepting);
            remap.insert(id, new_id);

            let state = &self.states[id];
            stack.extend(state.symbols.values().copied());
            stack.extend(state.any);
            stack.extend(state.epsilon.iter().copied());
        }

        for (&old, &new) in &remap {
            let source = self.states[old].clone();
            let target = &mut self.states[new];
            target.symbols = source
                .symbols
                .iter()
                .map(|(&symbol, &to)| (symbol, remap[&to]))
                .collect();
            target.any = source.any.map(|to| remap[&to]);
            target.epsilon = source.epsilon.iter().map(|&to| remap[&to]).collect();
        }

        debug_assert!(remap.contains_key(&fragment.end));
        Fragment {
            start: remap[&fragment.start],
            end: remap[&fragment.end],
        }
    }

    /// Get the epsilon closure of a set of states
    ///
    /// Worklist expansion with the closure set doubling as the visited set,
    /// so epsilon cycles from repetition constructs terminate after at most
    /// one visit per state.
    pub fn epsilon_closure(&self, states: &HashSet<StateId>) -> HashSet<StateId> {
        let mut closure = states.clone();
        let mut stack: Vec<StateId> = states.iter().copied().collect();

        while let Some(id) = stack.pop() {
            for &next in &self.states[id].epsilon {
                if closure.insert(next) {
                    stack.push(next);
                }
            }
        }

        closure
    }

    /// Advance a set of states over one input character
    ///
    /// Each state contributes its exact-character transition if present,
    /// otherwise its wildcard transition; states with neither drop out. The
    /// result is not epsilon-closed.
    pub fn step(&self, states: &HashSet<StateId>, ch: char) -> HashSet<StateId> {
        let mut next = HashSet::new();
        for &id in states {
            let state = &self.states[id];
            if let Some(to) = state.symbols.get(&ch).copied().or(state.any) {
                next.insert(to);
            }
        }
        next
    }

    /// Check if any state in the set is accepting
    pub fn is_accepting(&self, states: &HashSet<StateId>) -> bool {
        states.iter().any(|&id| self.states[id].accepting)
    }
}

/// A compiled automaton: one fragment spanning the whole pattern
///
/// Read-only after compilation; the owning [`crate::Matcher`] may serve
/// concurrent matches against it since nothing mutates the graph.
#[derive(Debug, Clone)]
pub struct Automaton {
    nfa: Nfa,
    start: StateId,
    end: StateId,
}

impl Automaton {
    /// Wrap a finished arena and its top-level fragment
    pub fn new(nfa: Nfa, fragment: Fragment) -> Self {
        Self {
            nfa,
            start: fragment.start,
            end: fragment.end,
        }
    }

    /// The underlying state arena, for read-only queries
    pub fn nfa(&self) -> &Nfa {
        &self.nfa
    }

    /// Starting state of the whole pattern
    pub fn start(&self) -> StateId {
        self.start
    }

    /// The single accepting frontier of the whole pattern
    pub fn end(&self) -> StateId {
        self.end
    }
}
