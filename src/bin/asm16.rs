//! Command-line entry point: `asm16 prog1 prog2 ...`. Each argument is a
//! file stem (no `.as` suffix); every file is assembled independently, so
//! one failing file doesn't stop the rest.

use clap::Parser;

use asm16::assembler::{self, Error, Outcome};
use asm16::logging;

#[derive(Parser)]
#[command(name = "asm16", about = "Assembles .as source into a base-4 object file")]
struct Args {
    /// Source file stems, without the `.as` suffix.
    #[arg(required = true)]
    stems: Vec<String>,
}

/// Exit status taxonomy. The process exits with the status of the first
/// file that didn't fully succeed; all files are still processed.
#[repr(i32)]
enum ExitStatus {
    Success = 0,
    GeneralError = 1,
    FileNotFound = 2,
    MacroSyntaxError = 3,
    FirstPassError = 4,
    SecondPassError = 5,
    WriteError = 6,
    FileEmpty = 7,
}

fn print_line_errors(stem: &str, errors: &[Error]) {
    for error in errors {
        match error.line_number() {
            Some(line_number) => logging::diagnostic(stem, line_number, &error.to_string()),
            None => logging::error(error.to_string()),
        }
    }
}

fn assemble_one(stem: &str) -> ExitStatus {
    match assembler::assemble_file(stem) {
        Outcome::Success => {
            log::debug!("{stem}: assembled successfully");
            ExitStatus::Success
        }
        Outcome::Empty => {
            logging::error(format!("{stem}.as is empty"));
            ExitStatus::FileEmpty
        }
        Outcome::FileNotFound => {
            logging::error(format!("{stem}.as not found"));
            ExitStatus::FileNotFound
        }
        Outcome::Io(error) => {
            logging::error(error.to_string());
            ExitStatus::GeneralError
        }
        Outcome::MacroErrors(errors) => {
            print_line_errors(stem, &errors);
            ExitStatus::MacroSyntaxError
        }
        Outcome::FirstPassErrors(errors) => {
            print_line_errors(stem, &errors);
            ExitStatus::FirstPassError
        }
        Outcome::SecondPassErrors(errors) => {
            print_line_errors(stem, &errors);
            ExitStatus::SecondPassError
        }
        Outcome::WriteError(error) => {
            logging::error(error.to_string());
            ExitStatus::WriteError
        }
    }
}

fn main() {
    logging::init_tracing();
    let args = Args::parse();

    let mut final_status = ExitStatus::Success;
    for stem in &args.stems {
        let status = assemble_one(stem);
        if matches!(final_status, ExitStatus::Success) {
            final_status = status;
        }
    }

    std::process::exit(final_status as i32);
}
