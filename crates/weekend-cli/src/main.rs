use std::process::ExitCode;

fn main() -> ExitCode {
    match weekend_core::run(std::env::args_os().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("weekends: {err:#}");
            ExitCode::FAILURE
        }
    }
}
