use std::fmt;

/// A pending-composition point (layer) in the automaton.
///
/// Ids are allocated from 1 upwards; 0 never identifies a real state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct State(pub u32);

impl State {
    pub fn new(id: u32) -> Self {
        State(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// The state a transition is keyed on: the baseline (no dead key pending)
/// or a specific pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateRef {
    Baseline,
    State(State),
}

impl StateRef {
    pub fn state(self) -> Option<State> {
        match self {
            StateRef::Baseline => None,
            StateRef::State(s) => Some(s),
        }
    }
}

impl From<State> for StateRef {
    fn from(state: State) -> Self {
        StateRef::State(state)
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateRef::Baseline => write!(f, "none"),
            StateRef::State(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Produce text and return to the baseline
    Emit(String),
    /// Consume the keystroke and wait in the given state
    Advance(State),
}

impl Transition {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Transition::Emit(_))
    }

    pub fn target(&self) -> Option<State> {
        match self {
            Transition::Advance(s) => Some(*s),
            Transition::Emit(_) => None,
        }
    }

    pub fn output(&self) -> Option<&str> {
        match self {
            Transition::Emit(text) => Some(text),
            Transition::Advance(_) => None,
        }
    }
}

/// One `state -> transition` entry of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct When {
    pub state: StateRef,
    pub transition: Transition,
}

impl When {
    pub fn new(state: StateRef, transition: Transition) -> Self {
        Self { state, transition }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub id: String,
    /// Kept in the document even when no key references it
    pub reserved: bool,
    pub transitions: Vec<When>,
}

impl Action {
    /// Creates an action whose baseline emits its own id
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let baseline = Transition::Emit(id.clone());
        Self::with_baseline(id, baseline)
    }

    pub fn with_baseline(id: impl Into<String>, baseline: Transition) -> Self {
        Self {
            id: id.into(),
            reserved: false,
            transitions: vec![When::new(StateRef::Baseline, baseline)],
        }
    }

    pub fn reserved(mut self) -> Self {
        self.reserved = true;
        self
    }

    pub fn baseline(&self) -> Option<&Transition> {
        self.transition(StateRef::Baseline)
    }

    pub fn transition(&self, state: StateRef) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|w| w.state == state)
            .map(|w| &w.transition)
    }

    /// Replaces the transition for `state`, or appends one if none exists
    pub fn set_transition(&mut self, state: StateRef, transition: Transition) {
        match self.transitions.iter_mut().find(|w| w.state == state) {
            Some(when) => when.transition = transition,
            None => self.transitions.push(When::new(state, transition)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminator {
    pub state: State,
    pub output: String,
}

impl Terminator {
    pub fn new(state: State, output: impl Into<String>) -> Self {
        Self {
            state,
            output: output.into(),
        }
    }
}

/// Binding of one physical key code inside a key map.
///
/// A well-formed binding carries exactly one of `output` or `action`; both
/// fields are kept optional so that loaded documents can be reported on
/// rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: u16,
    pub output: Option<String>,
    pub action: Option<String>,
}

impl KeyBinding {
    pub fn output(code: u16, output: impl Into<String>) -> Self {
        Self {
            code,
            output: Some(output.into()),
            action: None,
        }
    }

    pub fn action(code: u16, action: impl Into<String>) -> Self {
        Self {
            code,
            output: None,
            action: Some(action.into()),
        }
    }
}

/// Key bindings for one modifier layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    pub index: u16,
    pub keys: Vec<KeyBinding>,
}

impl KeyMap {
    pub fn new(index: u16) -> Self {
        Self {
            index,
            keys: Vec::new(),
        }
    }

    pub fn with_keys(index: u16, keys: Vec<KeyBinding>) -> Self {
        Self { index, keys }
    }

    pub fn key(&self, code: u16) -> Option<&KeyBinding> {
        self.keys.iter().find(|k| k.code == code)
    }
}

/// The full automaton: physical key bindings, actions and terminators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub id: i64,
    pub name: String,
    pub keymaps: Vec<KeyMap>,
    pub actions: Vec<Action>,
    pub terminators: Vec<Terminator>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn action(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn action_mut(&mut self, id: &str) -> Option<&mut Action> {
        self.actions.iter_mut().find(|a| a.id == id)
    }

    pub fn terminator(&self, state: State) -> Option<&Terminator> {
        self.terminators.iter().find(|t| t.state == state)
    }

    pub fn keymap(&self, index: u16) -> Option<&KeyMap> {
        self.keymaps.iter().find(|k| k.index == index)
    }

    pub fn keymap_mut(&mut self, index: u16) -> Option<&mut KeyMap> {
        self.keymaps.iter_mut().find(|k| k.index == index)
    }

    /// Every state id mentioned by a transition key, an advance target or a
    /// terminator, in document order (with repetitions).
    pub fn mentioned_states(&self) -> Vec<State> {
        let mut states = Vec::new();
        for action in &self.actions {
            for when in &action.transitions {
                if let StateRef::State(s) = when.state {
                    states.push(s);
                }
                if let Some(target) = when.transition.target() {
                    states.push(target);
                }
            }
        }
        states.extend(self.terminators.iter().map(|t| t.state));
        states
    }
}
