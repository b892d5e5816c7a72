use std::process;

fn main() {
    process::exit(hoist_cli::run());
}
