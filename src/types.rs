//! This module defines the core data structures and types used throughout the simulator,
//! including the normalized specification, instructions, execution results, and error types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

use crate::tape::Tape;

/// The table key that matches any symbol not otherwise listed for a state.
pub const WILDCARD_SYMBOL: char = '_';
/// The maximum allowed size for a program document in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The maximum number of steps to execute before giving up on a run.
pub const MAX_EXECUTION_STEPS: usize = 10000;

/// Per-state instructions, keyed by the symbol under the head.
pub type Transitions = BTreeMap<char, Instruction>;
/// The transition function. A `None` entry declares a halting state.
pub type TransitionTable = BTreeMap<String, Option<Transitions>>;
/// Named instructions that table cells may refer to by name.
pub type Synonyms = HashMap<String, Instruction>;

/// A validated, normalized Turing machine specification.
///
/// Produced by [`crate::parser::parse`]. A parsed specification always has its start state
/// and every instruction target declared in `table`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Specification {
    /// The symbol that fills every cell not yet written.
    pub blank: char,
    /// The state the machine starts in.
    pub start_state: String,
    /// The transition function.
    pub table: TransitionTable,
    /// The initial tape contents, left to right, starting under the head.
    pub input: Vec<char>,
}

impl Specification {
    /// Builds a fresh tape holding the initial input.
    pub fn initial_tape(&self) -> Tape {
        Tape::new(self.blank, &self.input)
    }

    /// Returns `true` if `state` is declared with no outgoing transitions.
    pub fn is_halting_state(&self, state: &str) -> bool {
        matches!(self.table.get(state), Some(None))
    }

    /// Number of declared states.
    pub fn state_count(&self) -> usize {
        self.table.len()
    }

    /// Number of `(state, symbol)` entries across the table.
    pub fn transition_count(&self) -> usize {
        self.table.values().flatten().map(|t| t.len()).sum()
    }
}

/// A named document together with the specification parsed from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    /// The YAML text the specification was parsed from.
    pub source: String,
    pub specification: Specification,
}

/// Represents the possible directions a head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => f.write_str("L"),
            Direction::Right => f.write_str("R"),
        }
    }
}

/// A single table cell: what to write, where to move, and which state to enter.
///
/// Omitted parts mean "leave unchanged". Instructions are value objects; once built they
/// can only be read, so one synonym may be copied into any number of cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    write: Option<char>,
    direction: Direction,
    next_state: Option<String>,
}

impl Instruction {
    /// A move-only instruction.
    pub fn new(direction: Direction) -> Self {
        Self {
            write: None,
            direction,
            next_state: None,
        }
    }

    pub fn with_write(mut self, symbol: char) -> Self {
        self.write = Some(symbol);
        self
    }

    pub fn with_next_state(mut self, state: impl Into<String>) -> Self {
        self.next_state = Some(state.into());
        self
    }

    pub fn write(&self) -> Option<char> {
        self.write
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn next_state(&self) -> Option<&str> {
        self.next_state.as_deref()
    }

    /// Fills in omitted parts from the current configuration.
    pub fn resolve(&self, state: &str, symbol: char) -> Transition {
        Transition {
            write: self.write.unwrap_or(symbol),
            direction: self.direction,
            next_state: self.next_state.as_deref().unwrap_or(state).to_string(),
        }
    }
}

/// A fully resolved instruction, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The symbol written under the head.
    pub write: char,
    /// The direction the head moves after writing.
    pub direction: Direction,
    /// The state the machine transitions to.
    pub next_state: String,
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine performed a transition and may continue.
    Continue,
    /// No instruction matched; the computation finished.
    Halt,
}

impl Step {
    pub fn is_halt(self) -> bool {
        self == Step::Halt
    }
}

/// A structured-text error, reported by the YAML deserializer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    /// 1-based line of the error, when known.
    pub line: Option<usize>,
    /// 1-based column of the error, when known.
    pub column: Option<usize>,
}

impl From<serde_yaml::Error> for SyntaxError {
    fn from(error: serde_yaml::Error) -> Self {
        let location = error.location();
        Self {
            message: error.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }
}

/// The reasons a document can fail to describe a valid machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecErrorKind {
    #[error("The document is empty")]
    EmptyDocument,
    #[error("No blank symbol was specified")]
    MissingBlank,
    #[error("The blank symbol must be a string of length 1, not {0:?}")]
    InvalidBlank(String),
    #[error("No start state was specified")]
    MissingStartState,
    #[error("The start state must be a state name, not a {0}")]
    InvalidStartState(String),
    #[error("Missing transition table")]
    MissingTable,
    #[error("Transition table has an invalid type: {0}")]
    InvalidTableType(String),
    #[error("Synonyms must be a mapping, not a {0}")]
    InvalidSynonymsType(String),
    #[error("Input must be a string or a list of symbols, not {0:?}")]
    InvalidInput(String),
    #[error("Names must be strings, numbers or booleans, not {0:?}")]
    InvalidName(String),
    #[error("A state must be a mapping of symbols to instructions or empty, not a {0}")]
    InvalidStateEntryType(String),
    #[error("Each symbol must be a single character, not {0:?}")]
    InvalidSymbol(String),
    #[error("Missing instruction")]
    MissingInstruction,
    #[error("An instruction must be a string or a mapping, not a {0}")]
    InvalidInstructionType(String),
    #[error("Unrecognized synonym {0:?}")]
    UnrecognizedSynonym(String),
    #[error("Conflicting tape movements: an instruction has both L and R")]
    ConflictingDirections,
    #[error("Missing tape movement: an instruction needs L or R")]
    MissingDirection,
    #[error("Unrecognized instruction key {0:?}")]
    UnrecognizedKey(String),
    #[error("write requires a string of length 1, not {0:?}")]
    InvalidWriteLength(String),
    #[error("A target state must be a state name, not a {0}")]
    InvalidTargetState(String),
    #[error("Undeclared state {0:?}")]
    UndeclaredState(String),
    #[error("The start state {0:?} is not declared in the transition table")]
    UndeclaredStartState(String),
}

/// Where in the document a [`SpecError`] was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub state: Option<String>,
    pub symbol: Option<String>,
    pub synonym: Option<String>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            self.synonym.as_ref().map(|s| format!("synonym '{s}'")),
            self.state.as_ref().map(|s| format!("state '{s}'")),
            self.symbol.as_ref().map(|s| format!("symbol '{s}'")),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            Ok(())
        } else {
            write!(f, " (in {})", parts.join(", "))
        }
    }
}

/// A semantically invalid specification, with enough context to point at the problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}{location}")]
pub struct SpecError {
    pub kind: SpecErrorKind,
    pub location: Location,
}

impl SpecError {
    pub fn in_state(mut self, state: &str) -> Self {
        self.location.state.get_or_insert_with(|| state.to_string());
        self
    }

    pub fn at_symbol(mut self, symbol: &str) -> Self {
        self.location.symbol.get_or_insert_with(|| symbol.to_string());
        self
    }

    pub fn in_synonym(mut self, name: &str) -> Self {
        self.location.synonym.get_or_insert_with(|| name.to_string());
        self
    }

    /// The offending value, for the kinds that carry one.
    pub fn problem_value(&self) -> Option<&str> {
        use SpecErrorKind::*;
        match &self.kind {
            InvalidBlank(v)
            | InvalidStartState(v)
            | InvalidTableType(v)
            | InvalidSynonymsType(v)
            | InvalidInput(v)
            | InvalidName(v)
            | InvalidStateEntryType(v)
            | InvalidSymbol(v)
            | InvalidInstructionType(v)
            | UnrecognizedSynonym(v)
            | UnrecognizedKey(v)
            | InvalidWriteLength(v)
            | InvalidTargetState(v)
            | UndeclaredState(v)
            | UndeclaredStartState(v) => Some(v),
            EmptyDocument | MissingBlank | MissingStartState | MissingTable
            | MissingInstruction | ConflictingDirections | MissingDirection => None,
        }
    }
}

impl From<SpecErrorKind> for SpecError {
    fn from(kind: SpecErrorKind) -> Self {
        Self {
            kind,
            location: Location::default(),
        }
    }
}

/// Engine misuse. These never describe a finished computation; that is [`Step::Halt`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    /// The current state is not a key of the transition table.
    #[error("Unknown state: {0}")]
    UnknownState(String),
    /// The current state is declared without transitions and cannot be stepped.
    #[error("State {0} is a halting state and cannot be stepped")]
    HaltingState(String),
    /// `step` was called again after it already reported a halt.
    #[error("Machine already halted in state {state} reading {symbol:?}")]
    AlreadyHalted { state: String, symbol: char },
}

/// Represents the errors surfaced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// The document is not well-formed YAML.
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    /// The document is YAML but does not describe a valid machine.
    #[error("Specification error: {0}")]
    Spec(#[from] SpecError),
    /// The engine was misused.
    #[error("Machine error: {0}")]
    Machine(#[from] MachineError),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// The program text exceeds [`MAX_PROGRAM_SIZE`].
    #[error("Program is too large: {size} bytes (limit {max})")]
    ProgramTooLarge { size: usize, max: usize },
    /// No built-in program matched the request.
    #[error("Program not found: {0}")]
    ProgramNotFound(String),
}

impl From<SpecErrorKind> for TuringMachineError {
    fn from(kind: SpecErrorKind) -> Self {
        TuringMachineError::Spec(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        let right_json = serde_json::to_string(&Direction::Right).unwrap();

        assert_eq!(left_json, "\"Left\"");
        assert_eq!(right_json, "\"Right\"");

        let left: Direction = serde_json::from_str(&left_json).unwrap();
        assert_eq!(left, Direction::Left);
    }

    #[test]
    fn test_instruction_resolve_fills_omitted_parts() {
        let move_only = Instruction::new(Direction::Left);
        assert_eq!(
            move_only.resolve("A", '1'),
            Transition {
                write: '1',
                direction: Direction::Left,
                next_state: "A".into(),
            }
        );

        let full = Instruction::new(Direction::Right)
            .with_write('0')
            .with_next_state("B");
        assert_eq!(full.write(), Some('0'));
        assert_eq!(full.next_state(), Some("B"));
        assert_eq!(
            full.resolve("A", '1'),
            Transition {
                write: '0',
                direction: Direction::Right,
                next_state: "B".into(),
            }
        );
    }

    #[test]
    fn test_spec_error_display_includes_location() {
        let error = SpecError::from(SpecErrorKind::UndeclaredState("Z".into()))
            .in_state("A")
            .at_symbol("0");

        assert_eq!(
            error.to_string(),
            "Undeclared state \"Z\" (in state 'A', symbol '0')"
        );
        assert_eq!(error.problem_value(), Some("Z"));
    }

    #[test]
    fn test_spec_error_keeps_innermost_location() {
        let error = SpecError::from(SpecErrorKind::MissingDirection)
            .in_synonym("inner")
            .in_synonym("outer");

        assert_eq!(error.location.synonym.as_deref(), Some("inner"));
        assert_eq!(error.problem_value(), None);
    }

    #[test]
    fn test_error_display() {
        let error = TuringMachineError::from(MachineError::HaltingState("done".into()));

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("halting state"));
        assert!(error_msg.contains("done"));
    }

    #[test]
    fn test_specification_counts() {
        let mut table = TransitionTable::new();
        let mut a = Transitions::new();
        a.insert('0', Instruction::new(Direction::Right));
        a.insert('1', Instruction::new(Direction::Left).with_next_state("H"));
        table.insert("A".into(), Some(a));
        table.insert("H".into(), None);

        let spec = Specification {
            blank: ' ',
            start_state: "A".into(),
            table,
            input: vec![],
        };

        assert_eq!(spec.state_count(), 2);
        assert_eq!(spec.transition_count(), 2);
        assert!(spec.is_halting_state("H"));
        assert!(!spec.is_halting_state("A"));
        assert!(!spec.is_halting_state("missing"));
    }
}
