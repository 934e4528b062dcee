//! This crate provides the core logic for a single-tape Turing machine simulator.
//! Machines are written as YAML transition tables; this crate parses and validates them,
//! executes them step by step on an unbounded tape, derives state diagrams for display,
//! and ships a small collection of built-in programs.

pub mod analyzer;
pub mod graph;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod types;

/// Re-exports the whole-table checks from the analyzer module.
pub use analyzer::{analyze, unreachable_states};
/// Re-exports the state diagram types from the graph module.
pub use graph::{derive_graph, Edge, EdgeLabel, StateGraph, StateNode};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the data model and error types from the types module.
pub use types::{
    Direction, Instruction, MachineError, Program, SpecError, SpecErrorKind, Specification,
    Step, SyntaxError, Transition, TransitionTable, TuringMachineError, MAX_EXECUTION_STEPS,
    MAX_PROGRAM_SIZE, WILDCARD_SYMBOL,
};
