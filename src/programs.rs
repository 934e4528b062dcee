//! Built-in example machines. They are plain YAML documents embedded at compile time and
//! loaded through the same parser as user input.

use crate::loader::ProgramLoader;
use crate::types::{Program, TuringMachineError};
use log::{error, info};

// Default embedded programs
const PROGRAM_TEXTS: [(&str, &str); 5] = [
    ("Binary increment", include_str!("../programs/binary-increment.yaml")),
    ("Divisible by 3", include_str!("../programs/divisible-by-3.yaml")),
    ("Copy 1s", include_str!("../programs/copy-1s.yaml")),
    ("Parity", include_str!("../programs/parity.yaml")),
    ("Busy beaver (2 states)", include_str!("../programs/busy-beaver-2.yaml")),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Program> = load_embedded();
}

fn load_embedded() -> Vec<Program> {
    let programs: Vec<Program> = PROGRAM_TEXTS
        .iter()
        .filter_map(|(name, text)| {
            ProgramLoader::load_program_from_string(name, text)
                .map_err(|e| error!("Failed to parse built-in program '{name}': {e}"))
                .ok()
        })
        .collect();

    info!("Loaded {} built-in programs", programs.len());
    programs
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, TuringMachineError> {
        PROGRAMS.get(index).cloned().ok_or_else(|| {
            TuringMachineError::ProgramNotFound(format!("index {} out of range", index))
        })
    }

    /// Get a program by its name, ignoring case
    pub fn get_program_by_name(name: &str) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| TuringMachineError::ProgramNotFound(format!("'{}'", name)))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS.iter().map(|program| program.name.clone()).collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let program = Self::get_program_by_index(index)?;
        let spec = &program.specification;

        Ok(ProgramInfo {
            index,
            name: program.name.clone(),
            start_state: spec.start_state.clone(),
            input: spec.input.iter().collect(),
            state_count: spec.state_count(),
            transition_count: spec.transition_count(),
        })
    }

    /// Search for programs by name
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, program)| program.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub start_state: String,
    pub input: String,
    pub state_count: usize,
    pub transition_count: usize,
}
