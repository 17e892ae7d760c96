use std::process::ExitCode;

fn main() -> ExitCode {
    stylemap::cli::run()
}
