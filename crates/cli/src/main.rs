use std::process::ExitCode;

fn main() -> ExitCode {
    surfacefit_cli::run()
}
