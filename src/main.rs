use std::process::ExitCode;

fn main() -> ExitCode {
    match cfgsync::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            cfgsync::ui::output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
