//! Property-based tests for the tape and the execution engine.

use proptest::prelude::*;
use tmsim::{ProgramManager, Step, Tape, TuringMachine};

const BLANK: char = '_';

fn trace(machine: &mut TuringMachine) -> Vec<(String, String)> {
    machine.reset();
    let mut configurations = vec![(machine.state().to_string(), machine.tape().to_string())];
    while !machine.is_halted() {
        machine.step().unwrap();
        configurations.push((machine.state().to_string(), machine.tape().to_string()));
    }
    configurations
}

proptest! {
    /// Moving without writing never changes what any absolute cell reads as.
    #[test]
    fn tape_reads_input_or_blank_after_moves(
        input in "[abc]{0,8}",
        moves in prop::collection::vec(any::<bool>(), 0..64),
    ) {
        let symbols: Vec<char> = input.chars().collect();
        let mut tape = Tape::new(BLANK, &symbols);

        for right in moves {
            if right {
                tape.head_right();
            } else {
                tape.head_left();
            }
        }

        for offset in -80isize..80 {
            let index = tape.position() + offset;
            let expected = usize::try_from(index)
                .ok()
                .and_then(|i| symbols.get(i).copied())
                .unwrap_or(BLANK);
            prop_assert_eq!(tape.read_offset(offset), expected);
        }
    }

    #[test]
    fn binary_increment_adds_one(n in 0u32..100_000) {
        let mut spec = ProgramManager::get_program_by_name("Binary increment")
            .unwrap()
            .specification;
        spec.input = format!("{:b}", n).chars().collect();

        let mut machine = TuringMachine::new(spec);
        prop_assert_eq!(machine.run(), Ok(Step::Halt));

        let cells: String = machine.tape().cells().into_iter().collect();
        prop_assert_eq!(cells.trim(), format!("{:b}", n + 1));
    }

    /// Repeated full runs from a reset produce the same configurations.
    #[test]
    fn runs_are_deterministic(input in "[01]{0,12}") {
        let mut spec = ProgramManager::get_program_by_name("Divisible by 3")
            .unwrap()
            .specification;
        spec.input = input.chars().collect();

        let mut machine = TuringMachine::new(spec);
        let first = trace(&mut machine);
        let second = trace(&mut machine);
        prop_assert_eq!(first, second);
    }
}
