use std::process::ExitCode;

fn main() -> ExitCode {
    match dispatcherd::run_dispatcher() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("dispatcherd: {error}");
            ExitCode::FAILURE
        }
    }
}
