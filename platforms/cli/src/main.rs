use clap::Parser;
use log::debug;
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;
use tmsim::{
    MachineError, Program, ProgramLoader, ProgramManager, Step, TuringMachine,
    TuringMachineError, MAX_EXECUTION_STEPS,
};

/// Runs a Turing machine written as a YAML transition table.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmsim-cli programs/binary-increment.yaml
  tmsim-cli --example parity --input 1101
  cat machine.yaml | tmsim-cli --debug")]
struct Cli {
    /// Path to a machine document (.yaml).
    /// If omitted and stdin is piped, the document is read from stdin.
    program: Option<String>,

    /// Run a built-in program by name instead of a file
    #[clap(short, long, conflicts_with = "program")]
    example: Option<String>,

    /// List the built-in programs and exit
    #[clap(short, long)]
    list: bool,

    /// Replace the initial tape contents
    #[clap(short, long)]
    input: Option<String>,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Give up after this many steps
    #[clap(short = 'n', long, default_value_t = MAX_EXECUTION_STEPS)]
    max_steps: usize,

    /// Print the normalized specification as JSON and exit
    #[clap(long)]
    dump: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.list {
        for name in ProgramManager::list_program_names() {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    let mut program = match load_program(&cli) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    if let Some(input) = &cli.input {
        program.specification.input = input.chars().collect();
    }

    if cli.dump {
        return match serde_json::to_string_pretty(&program.specification) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(1)
            }
        };
    }

    debug!("Running '{}' for at most {} steps", program.name, cli.max_steps);

    let mut machine = TuringMachine::new(program.specification);
    let outcome = execute(&mut machine, cli.max_steps, cli.debug);

    match outcome {
        Ok(Step::Halt) => {
            println!(
                "Halted in state {} after {} steps.",
                machine.state(),
                machine.step_count()
            );
            println!("{}", machine.tape());
            ExitCode::SUCCESS
        }
        Ok(Step::Continue) => {
            eprintln!(
                "Gave up after {} steps in state {}.",
                machine.step_count(),
                machine.state()
            );
            println!("{}", machine.tape());
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Loads the program named on the command line.
///
/// It tries a built-in example, then a file path, then stdin, in that order.
fn load_program(cli: &Cli) -> Result<Program, TuringMachineError> {
    if let Some(name) = &cli.example {
        ProgramManager::get_program_by_name(name)
    } else if let Some(path) = &cli.program {
        ProgramLoader::load_program(Path::new(path))
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| TuringMachineError::FileError(format!("Failed to read stdin: {}", e)))?;
        ProgramLoader::load_program_from_string("stdin", &buffer)
    } else {
        Err(TuringMachineError::FileError(
            "No program given; pass a file, --example <name>, or pipe a document".to_string(),
        ))
    }
}

/// Polls the machine and steps it until it halts or `max_steps` is reached.
///
/// Entering a declared halting state ends the run normally; any other engine error is
/// returned.
fn execute(
    machine: &mut TuringMachine,
    max_steps: usize,
    debug: bool,
) -> Result<Step, TuringMachineError> {
    let print_state = |machine: &TuringMachine| {
        println!(
            "Step: {}, State: {}, Tape: {}",
            machine.step_count(),
            machine.state(),
            machine.tape()
        );
    };

    if debug {
        print_state(machine);
    }

    while machine.step_count() < max_steps {
        match machine.next_transition() {
            Ok(Some(_)) => {
                machine.step()?;
                if debug {
                    print_state(machine);
                }
            }
            Ok(None) | Err(MachineError::HaltingState(_)) => return Ok(Step::Halt),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Step::Continue)
}
