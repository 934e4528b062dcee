//! This module provides the parser for Turing machine documents.
//!
//! A document is YAML. `serde_yaml` turns the text into a loosely-typed [`Value`]; the
//! functions here check that value piece by piece and build a normalized [`Specification`].
//! Structural checks that need the whole table (target states, start state) live in
//! [`crate::analyzer`] and run before the specification is returned.

use crate::{
    analyzer::{analyze, unreachable_states},
    types::{
        Direction, Instruction, Specification, SpecError, SpecErrorKind, Synonyms,
        SyntaxError, TransitionTable, Transitions, TuringMachineError,
    },
};
use log::warn;
use serde_yaml::{Mapping, Value};

const KEY_BLANK: &str = "blank";
const KEY_START_STATE: &str = "start state";
const KEY_INPUT: &str = "input";
const KEY_SYNONYMS: &str = "synonyms";
const KEY_TABLE: &str = "table";

/// An instruction value as written, before synonyms are resolved.
#[derive(Debug)]
enum RawInstruction<'a> {
    /// `L` or `R` on its own.
    Direction(Direction),
    /// Any other string names a synonym.
    Synonym(&'a str),
    /// `{L: state?}`, `{R: state?, write: symbol}` and so on.
    Object(&'a Mapping),
}

/// Parses the given document into a [`Specification`].
///
/// This is the main entry point for reading machine definitions. The parsed specification
/// is validated before being returned; nothing partial is ever produced.
///
/// # Returns
///
/// * `Ok(Specification)` if the document is valid.
/// * `Err(TuringMachineError::Syntax)` if the text is not well-formed YAML.
/// * `Err(TuringMachineError::Spec)` if the document does not describe a valid machine.
pub fn parse(input: &str) -> Result<Specification, TuringMachineError> {
    if input.trim().is_empty() {
        return Err(SpecErrorKind::EmptyDocument.into());
    }

    let document: Value = serde_yaml::from_str(input).map_err(SyntaxError::from)?;
    let spec = parse_document(&document)?;

    analyze(&spec)?;

    for state in unreachable_states(&spec) {
        warn!("State '{state}' is unreachable from '{}'", spec.start_state);
    }

    Ok(spec)
}

/// Parses the top-level mapping.
fn parse_document(document: &Value) -> Result<Specification, SpecError> {
    let Some(document) = as_mapping(document) else {
        return Err(SpecErrorKind::EmptyDocument.into());
    };

    let blank = parse_blank(document.get(KEY_BLANK))?;
    let start_state = parse_start_state(document.get(KEY_START_STATE))?;
    let input = parse_input(document.get(KEY_INPUT))?;
    let synonyms = parse_synonyms(document.get(KEY_SYNONYMS))?;
    let table = parse_table(document.get(KEY_TABLE), &synonyms)?;

    Ok(Specification {
        blank,
        start_state,
        table,
        input,
    })
}

fn parse_blank(value: Option<&Value>) -> Result<char, SpecError> {
    match value {
        None | Some(Value::Null) => Err(SpecErrorKind::MissingBlank.into()),
        Some(value) => scalar_string(value)
            .as_deref()
            .and_then(single_char)
            .ok_or_else(|| SpecErrorKind::InvalidBlank(describe(value)).into()),
    }
}

fn parse_start_state(value: Option<&Value>) -> Result<String, SpecError> {
    match value {
        None | Some(Value::Null) => Err(SpecErrorKind::MissingStartState.into()),
        Some(value) => scalar_string(value)
            .ok_or_else(|| SpecErrorKind::InvalidStartState(type_name(value).into()).into()),
    }
}

/// Parses the initial tape: a string split into symbols, or a list of one-symbol scalars.
fn parse_input(value: Option<&Value>) -> Result<Vec<char>, SpecError> {
    let value = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(value) => untag(value),
    };

    if let Value::Sequence(items) = value {
        return items
            .iter()
            .map(|item| {
                scalar_string(item)
                    .as_deref()
                    .and_then(single_char)
                    .ok_or_else(|| SpecError::from(SpecErrorKind::InvalidInput(describe(item))))
            })
            .collect();
    }

    scalar_string(value)
        .map(|s| s.chars().collect())
        .ok_or_else(|| SpecErrorKind::InvalidInput(describe(value)).into())
}

/// Parses the optional synonym section. Synonyms cannot refer to each other.
fn parse_synonyms(value: Option<&Value>) -> Result<Synonyms, SpecError> {
    let mut synonyms = Synonyms::new();

    let mapping = match value {
        None | Some(Value::Null) => return Ok(synonyms),
        Some(value) => as_mapping(value).ok_or_else(|| {
            SpecError::from(SpecErrorKind::InvalidSynonymsType(type_name(value).into()))
        })?,
    };

    for (key, value) in mapping {
        let name = parse_name(key)?;
        if name == "L" || name == "R" {
            warn!("Synonym '{name}' is shadowed by the built-in direction '{name}'");
        }

        let instruction = parse_instruction(value, None).map_err(|e| e.in_synonym(&name))?;
        synonyms.insert(name, instruction);
    }

    Ok(synonyms)
}

/// Parses the transition table. Target states are not checked here; forward references
/// are legal until the whole table exists.
fn parse_table(value: Option<&Value>, synonyms: &Synonyms) -> Result<TransitionTable, SpecError> {
    let mapping = match value {
        None | Some(Value::Null) => return Err(SpecErrorKind::MissingTable.into()),
        Some(value) => as_mapping(value).ok_or_else(|| {
            SpecError::from(SpecErrorKind::InvalidTableType(type_name(value).into()))
        })?,
    };

    let mut table = TransitionTable::new();

    for (key, entry) in mapping {
        let state = parse_name(key)?;

        let transitions = match untag(entry) {
            Value::Null => None,
            Value::Mapping(cells) => {
                Some(parse_state(cells, synonyms).map_err(|e| e.in_state(&state))?)
            }
            other => {
                return Err(SpecError::from(SpecErrorKind::InvalidStateEntryType(
                    type_name(other).into(),
                ))
                .in_state(&state))
            }
        };

        if table.insert(state.clone(), transitions).is_some() {
            warn!("State '{state}' is declared more than once; the last declaration wins");
        }
    }

    Ok(table)
}

/// Parses one state's symbol-to-instruction mapping.
fn parse_state(cells: &Mapping, synonyms: &Synonyms) -> Result<Transitions, SpecError> {
    let mut transitions = Transitions::new();

    for (key, value) in cells {
        let label = describe(key);
        let symbols = parse_symbols(key).map_err(|e| e.at_symbol(&label))?;
        let instruction =
            parse_instruction(value, Some(synonyms)).map_err(|e| e.at_symbol(&label))?;

        for symbol in symbols {
            if transitions.insert(symbol, instruction.clone()).is_some() {
                warn!("Symbol '{symbol}' is listed more than once; the last entry wins");
            }
        }
    }

    Ok(transitions)
}

/// Expands a symbol key. `[0, 1]` and `"0,1"` both name two symbols sharing one instruction.
fn parse_symbols(key: &Value) -> Result<Vec<char>, SpecError> {
    let invalid = |value: &Value| SpecError::from(SpecErrorKind::InvalidSymbol(describe(value)));

    match untag(key) {
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                scalar_string(item)
                    .as_deref()
                    .and_then(single_char)
                    .ok_or_else(|| invalid(item))
            })
            .collect(),
        other => {
            let text = scalar_string(other).ok_or_else(|| invalid(other))?;
            if let Some(symbol) = single_char(&text) {
                return Ok(vec![symbol]);
            }

            text.split(',')
                .map(|part| {
                    single_char(part).ok_or_else(|| {
                        SpecError::from(SpecErrorKind::InvalidSymbol(part.to_string()))
                    })
                })
                .collect()
        }
    }
}

/// Parses an instruction value. `synonyms` is `None` while the synonyms themselves are
/// being parsed.
fn parse_instruction(value: &Value, synonyms: Option<&Synonyms>) -> Result<Instruction, SpecError> {
    match classify_instruction(value)? {
        RawInstruction::Direction(direction) => Ok(Instruction::new(direction)),
        RawInstruction::Synonym(name) => synonyms
            .and_then(|synonyms| synonyms.get(name))
            .cloned()
            .ok_or_else(|| SpecErrorKind::UnrecognizedSynonym(name.to_string()).into()),
        RawInstruction::Object(mapping) => parse_instruction_object(mapping),
    }
}

fn classify_instruction(value: &Value) -> Result<RawInstruction<'_>, SpecError> {
    match untag(value) {
        Value::Null => Err(SpecErrorKind::MissingInstruction.into()),
        Value::String(s) => Ok(match s.as_str() {
            "L" => RawInstruction::Direction(Direction::Left),
            "R" => RawInstruction::Direction(Direction::Right),
            name => RawInstruction::Synonym(name),
        }),
        Value::Mapping(mapping) => Ok(RawInstruction::Object(mapping)),
        other => Err(SpecErrorKind::InvalidInstructionType(type_name(other).into()).into()),
    }
}

/// Parses `{L|R: state?, write: symbol?}`.
fn parse_instruction_object(mapping: &Mapping) -> Result<Instruction, SpecError> {
    let mut left = None;
    let mut right = None;
    let mut write = None;
    let mut unknown = None;

    for (key, value) in mapping {
        match key.as_str() {
            Some("L") => left = Some(value),
            Some("R") => right = Some(value),
            Some("write") => write = Some(value),
            _ => {
                unknown.get_or_insert(key);
            }
        }
    }

    let (direction, target) = match (left, right) {
        (Some(_), Some(_)) => return Err(SpecErrorKind::ConflictingDirections.into()),
        (None, None) => return Err(SpecErrorKind::MissingDirection.into()),
        (Some(target), None) => (Direction::Left, target),
        (None, Some(target)) => (Direction::Right, target),
    };

    let mut instruction = Instruction::new(direction);

    match untag(target) {
        Value::Null => {}
        other => {
            let state = scalar_string(other).ok_or_else(|| {
                SpecError::from(SpecErrorKind::InvalidTargetState(type_name(other).into()))
            })?;
            instruction = instruction.with_next_state(state);
        }
    }

    if let Some(value) = write {
        let symbol = scalar_string(value)
            .as_deref()
            .and_then(single_char)
            .ok_or_else(|| SpecError::from(SpecErrorKind::InvalidWriteLength(describe(value))))?;
        instruction = instruction.with_write(symbol);
    }

    if let Some(key) = unknown {
        return Err(SpecErrorKind::UnrecognizedKey(describe(key)).into());
    }

    Ok(instruction)
}

/// Parses a state or synonym name.
fn parse_name(key: &Value) -> Result<String, SpecError> {
    scalar_string(key).ok_or_else(|| SpecErrorKind::InvalidName(describe(key)).into())
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn as_mapping(value: &Value) -> Option<&Mapping> {
    match untag(value) {
        Value::Mapping(mapping) => Some(mapping),
        _ => None,
    }
}

/// Coerces a scalar to its string form. Null and collections have none.
fn scalar_string(value: &Value) -> Option<String> {
    match untag(value) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match untag(value) {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Renders a value for diagnostics: the scalar itself, or its type.
fn describe(value: &Value) -> String {
    match untag(value) {
        Value::Sequence(items) => format!(
            "[{}]",
            items.iter().map(describe).collect::<Vec<_>>().join(", ")
        ),
        other => scalar_string(other).unwrap_or_else(|| type_name(other).to_string()),
    }
}
