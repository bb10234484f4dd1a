//! `keycycle completions`: shell completion scripts

use clap::Command;
use clap_complete::{Shell, generate};

pub fn run(shell: Shell, command: &mut Command) {
    let name = command.get_name().to_string();
    generate(shell, command, name, &mut std::io::stdout());
}
