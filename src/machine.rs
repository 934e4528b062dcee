//! This module defines the `TuringMachine` struct, which executes a validated
//! [`Specification`] one transition at a time against a [`Tape`].

use crate::tape::Tape;
use crate::types::{
    Direction, MachineError, Specification, Step, Transition, MAX_EXECUTION_STEPS,
    WILDCARD_SYMBOL,
};
use log::debug;

type StateObserver = Box<dyn FnMut(&str, &str)>;

/// A single-tape Turing machine.
///
/// The machine owns its state and tape. Whether it is halted is never stored: it is
/// recomputed from the current state and the symbol under the head.
pub struct TuringMachine {
    state: String,
    tape: Tape,
    specification: Specification,
    step_count: usize,
    halt_reported: bool,
    observers: Vec<StateObserver>,
}

impl TuringMachine {
    /// Creates a new `TuringMachine` in the start state, with a tape holding the input.
    pub fn new(specification: Specification) -> Self {
        Self {
            state: specification.start_state.clone(),
            tape: specification.initial_tape(),
            specification,
            step_count: 0,
            halt_reported: false,
            observers: Vec::new(),
        }
    }

    /// Looks up the transition for `state` reading `symbol`.
    ///
    /// An explicit entry for `symbol` wins over the wildcard entry. The returned transition
    /// has every omitted part filled in from `state` and `symbol`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Transition))` if an instruction matches.
    /// * `Ok(None)` if none does; the machine halts normally.
    /// * `Err(MachineError::HaltingState)` if `state` is declared without transitions.
    /// * `Err(MachineError::UnknownState)` if `state` is not in the table at all.
    pub fn lookup(&self, state: &str, symbol: char) -> Result<Option<Transition>, MachineError> {
        let transitions = self
            .specification
            .table
            .get(state)
            .ok_or_else(|| MachineError::UnknownState(state.to_string()))?
            .as_ref()
            .ok_or_else(|| MachineError::HaltingState(state.to_string()))?;

        Ok(transitions
            .get(&symbol)
            .or_else(|| transitions.get(&WILDCARD_SYMBOL))
            .map(|instruction| instruction.resolve(state, symbol)))
    }

    /// Returns the transition the next step would take, if any.
    pub fn next_transition(&self) -> Result<Option<Transition>, MachineError> {
        self.lookup(&self.state, self.tape.read())
    }

    /// Executes a single step of the computation.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue)` if a transition was applied.
    /// * `Ok(Step::Halt)` if no instruction matched. Nothing is changed.
    /// * `Err(MachineError)` if the machine is misused: stepping a declared halting state, an
    ///   unknown state, or stepping again after a halt was already reported.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        let symbol = self.tape.read();

        if self.halt_reported {
            return Err(MachineError::AlreadyHalted {
                state: self.state.clone(),
                symbol,
            });
        }

        let Some(transition) = self.lookup(&self.state, symbol)? else {
            debug!(
                "Halted in state '{}' reading {:?} after {} steps",
                self.state, symbol, self.step_count
            );
            self.halt_reported = true;
            return Ok(Step::Halt);
        };

        debug!(
            "{} {:?} -> write {:?}, move {}, {}",
            self.state, symbol, transition.write, transition.direction, transition.next_state
        );

        self.tape.write(transition.write);
        match transition.direction {
            Direction::Left => self.tape.head_left(),
            Direction::Right => self.tape.head_right(),
        }

        let previous = std::mem::replace(&mut self.state, transition.next_state);
        self.step_count += 1;
        self.notify(&previous);

        Ok(Step::Continue)
    }

    /// Steps until the machine halts or `max_steps` transitions have been taken.
    ///
    /// Entering a declared halting state ends the run like an ordinary halt; it is never
    /// stepped. Returns `Ok(Step::Continue)` when the limit is reached first.
    pub fn run_for(&mut self, max_steps: usize) -> Result<Step, MachineError> {
        for _ in 0..max_steps {
            if self.specification.is_halting_state(&self.state) {
                return Ok(Step::Halt);
            }
            if self.step()?.is_halt() {
                return Ok(Step::Halt);
            }
        }

        Ok(Step::Continue)
    }

    /// Runs with the default limit of [`MAX_EXECUTION_STEPS`].
    pub fn run(&mut self) -> Result<Step, MachineError> {
        self.run_for(MAX_EXECUTION_STEPS)
    }

    /// Checks if the machine cannot take another step.
    ///
    /// True when no instruction matches the current state and symbol, and also when the
    /// current state is a declared halting state or unknown; [`TuringMachine::step`] reports
    /// those two as errors.
    pub fn is_halted(&self) -> bool {
        !matches!(self.next_transition(), Ok(Some(_)))
    }

    /// Resets the machine to its initial configuration: start state, fresh tape, zero steps.
    pub fn reset(&mut self) {
        let previous = std::mem::replace(&mut self.state, self.specification.start_state.clone());
        self.tape = self.specification.initial_tape();
        self.step_count = 0;
        self.halt_reported = false;
        self.notify(&previous);
    }

    /// Registers a callback invoked with `(previous, current)` whenever the state is
    /// assigned, by [`TuringMachine::step`] or [`TuringMachine::reset`].
    pub fn on_state_change<F>(&mut self, observer: F)
    where
        F: FnMut(&str, &str) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self, previous: &str) {
        for observer in &mut self.observers {
            observer(previous, &self.state);
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the start state.
    pub fn start_state(&self) -> &str {
        &self.specification.start_state
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn blank(&self) -> char {
        self.specification.blank
    }

    pub fn specification(&self) -> &Specification {
        &self.specification
    }

    /// Returns the number of transitions taken since construction or the last reset.
    pub fn step_count(&self) -> usize {
        self.step_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::types::{Instruction, TransitionTable, Transitions};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn machine(input: &str) -> TuringMachine {
        TuringMachine::new(parse(input).unwrap())
    }

    #[test]
    fn test_missing_entry_halts() {
        let mut machine = machine(
            r#"
blank: ' '
start state: A
table:
  A:
    0: {write: 1, R: A}
"#,
        );

        assert!(machine.is_halted());
        assert_eq!(machine.step(), Ok(Step::Halt));
        assert_eq!(machine.state(), "A");
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.tape().cells(), vec![' ']);
    }

    #[test]
    fn test_step_writes_moves_and_transitions() {
        let mut machine = machine(
            r#"
blank: ' '
start state: A
input: '00'
table:
  A:
    0: {write: 1, R: B}
  B:
    0: {L: A}
"#,
        );

        assert!(!machine.is_halted());
        assert_eq!(machine.step(), Ok(Step::Continue));
        assert_eq!(machine.state(), "B");
        assert_eq!(machine.tape().to_string(), "1[0]");

        assert_eq!(machine.step(), Ok(Step::Continue));
        assert_eq!(machine.state(), "A");
        assert_eq!(machine.tape().to_string(), "[1]0");
        assert_eq!(machine.step_count(), 2);
    }

    #[test]
    fn test_move_only_instruction_keeps_symbol_and_state() {
        let mut machine = machine(
            r#"
blank: ' '
start state: A
input: '01'
table:
  A:
    0: R
    1: L
"#,
        );

        assert_eq!(machine.step(), Ok(Step::Continue));
        assert_eq!(machine.state(), "A");
        assert_eq!(machine.tape().to_string(), "0[1]");
        assert_eq!(machine.tape().cells(), vec!['0', '1']);
    }

    #[test]
    fn test_wildcard_fallback() {
        let machine = machine(
            r#"
blank: ' '
start state: A
table:
  A:
    x: {write: X, R: A}
    _: {write: W, L: B}
  B:
"#,
        );

        let explicit = machine.lookup("A", 'x').unwrap().unwrap();
        assert_eq!(explicit.write, 'X');
        assert_eq!(explicit.next_state, "A");

        for symbol in ['y', ' ', '0'] {
            let fallback = machine.lookup("A", symbol).unwrap().unwrap();
            assert_eq!(fallback.write, 'W');
            assert_eq!(fallback.next_state, "B");
        }
    }

    #[test]
    fn test_stepping_halting_state_is_an_error() {
        let mut machine = machine(
            r#"
blank: ' '
start state: A
table:
  A:
    ' ': {R: done}
  done:
"#,
        );

        assert_eq!(machine.step(), Ok(Step::Continue));
        assert_eq!(machine.state(), "done");
        assert!(machine.is_halted());
        assert_eq!(
            machine.step(),
            Err(MachineError::HaltingState("done".into()))
        );
        assert_eq!(
            machine.lookup("done", ' '),
            Err(MachineError::HaltingState("done".into()))
        );
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_unknown_state_is_an_error() {
        let mut table = TransitionTable::new();
        let mut a = Transitions::new();
        a.insert(' ', Instruction::new(Direction::Right).with_next_state("ghost"));
        table.insert("A".into(), Some(a));

        // Built by hand, bypassing validation.
        let mut machine = TuringMachine::new(Specification {
            blank: ' ',
            start_state: "A".into(),
            table,
            input: vec![],
        });

        assert_eq!(machine.step(), Ok(Step::Continue));
        assert!(machine.is_halted());
        assert_eq!(
            machine.step(),
            Err(MachineError::UnknownState("ghost".into()))
        );
    }

    #[test]
    fn test_step_after_halt_is_rejected() {
        let mut machine = machine(
            r#"
blank: ' '
start state: A
table:
  A:
    0: R
"#,
        );

        assert_eq!(machine.step(), Ok(Step::Halt));
        assert_eq!(
            machine.step(),
            Err(MachineError::AlreadyHalted {
                state: "A".into(),
                symbol: ' ',
            })
        );

        machine.reset();
        assert_eq!(machine.step(), Ok(Step::Halt));
    }

    #[test]
    fn test_reset_matches_fresh_machine() {
        let source = r#"
blank: '0'
start state: A
input: '11'
table:
  A:
    1: {write: 0, R: A}
    0: {L: B}
  B:
    0: L
"#;
        let fresh = machine(source);
        let mut machine = machine(source);

        assert_eq!(machine.run_for(7), Ok(Step::Continue));
        assert_ne!(machine.tape(), fresh.tape());

        machine.reset();
        assert_eq!(machine.state(), fresh.state());
        assert_eq!(machine.tape(), fresh.tape());
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.is_halted(), fresh.is_halted());
    }

    #[test]
    fn test_runs_are_deterministic() {
        let source = r#"
blank: ' '
start state: right
input: '1011'
table:
  right:
    [1,0]: R
    ' '  : {L: carry}
  carry:
    1      : {write: 0, L: carry}
    [0,' ']: {write: 1, L: done}
  done:
"#;
        let mut machine = machine(source);

        let trace = |machine: &mut TuringMachine| {
            machine.reset();
            let mut configurations = vec![(machine.state().to_string(), machine.tape().to_string())];
            while !machine.is_halted() {
                machine.step().unwrap();
                configurations.push((machine.state().to_string(), machine.tape().to_string()));
            }
            configurations
        };

        let first = trace(&mut machine);
        let second = trace(&mut machine);
        assert_eq!(first, second);
        assert_eq!(first.last().unwrap().0, "done");
        assert_eq!(machine.tape().cells().iter().collect::<String>().trim(), "1100");
    }

    #[test]
    fn test_observer_sees_state_changes() {
        let mut machine = machine(
            r#"
blank: ' '
start state: A
table:
  A:
    ' ': {write: x, R: B}
  B:
    ' ': {L: B}
"#,
        );

        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        machine.on_state_change(move |previous, current| {
            sink.borrow_mut()
                .push(format!("{previous}->{current}"));
        });

        machine.step().unwrap();
        machine.step().unwrap();
        machine.reset();

        assert_eq!(*changes.borrow(), vec!["A->B", "B->B", "B->A"]);
    }

    #[test]
    fn test_run_stops_at_limit() {
        let mut machine = machine(
            r#"
blank: ' '
start state: loop
table:
  loop:
    _: R
"#,
        );

        assert_eq!(machine.run_for(25), Ok(Step::Continue));
        assert_eq!(machine.step_count(), 25);
        assert_eq!(machine.tape().position(), 25);
    }

    #[test]
    fn test_run_stops_in_halting_state() {
        let mut machine = machine(
            r#"
blank: ' '
start state: A
table:
  A:
    ' ': {write: '1', R: done}
  done:
"#,
        );

        assert_eq!(machine.run(), Ok(Step::Halt));
        assert_eq!(machine.state(), "done");
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_run_to_halt() {
        let mut machine = machine(
            r#"
blank: ' '
start state: A
input: 'aaa'
table:
  A:
    a: {write: b, R: A}
"#,
        );

        assert_eq!(machine.run(), Ok(Step::Halt));
        assert_eq!(machine.step_count(), 3);
        assert_eq!(machine.tape().cells(), vec!['b', 'b', 'b', ' ']);
    }
}
