//! This module provides the `ProgramLoader` struct, responsible for loading machine
//! documents from files, directories and strings.

use crate::parser::parse;
use crate::types::{Program, TuringMachineError, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// `ProgramLoader` is a utility struct for loading machine documents.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path. The program is named after the
    /// file stem.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is read and parsed successfully.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * Any error [`ProgramLoader::load_program_from_string`] returns.
    pub fn load_program(path: &Path) -> Result<Program, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self::load_program_from_string(&name, &content)
    }

    /// Loads a single program from the provided string content.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the content is parsed successfully.
    /// * `Err(TuringMachineError::ProgramTooLarge)` if the content exceeds [`MAX_PROGRAM_SIZE`].
    /// * `Err(TuringMachineError::Syntax)` or `Err(TuringMachineError::Spec)` if the content is
    ///   not a valid program.
    pub fn load_program_from_string(name: &str, content: &str) -> Result<Program, TuringMachineError> {
        if content.len() > MAX_PROGRAM_SIZE {
            return Err(TuringMachineError::ProgramTooLarge {
                size: content.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        Ok(Program {
            name: name.to_string(),
            source: content.to_string(),
            specification: parse(content)?,
        })
    }

    /// Loads every `.yaml` / `.yml` file in a directory.
    ///
    /// Directories and other files are skipped. Each element of the result is either the
    /// path and its program, or the error that file produced.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), TuringMachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| EXTENSIONS.contains(&ext))
            })
            .collect();
        paths.sort();

        paths
            .into_iter()
            .map(|path| Self::load_program(&path).map(|program| (path, program)))
            .collect()
    }
}
