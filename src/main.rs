use std::process::ExitCode;

fn main() -> ExitCode {
    match suitekit::cli::run_tool() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
