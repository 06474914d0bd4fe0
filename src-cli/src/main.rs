use std::process::ExitCode;

fn main() -> ExitCode {
    iifactor_cli::run()
}
