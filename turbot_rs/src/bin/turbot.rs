use std::io::IsTerminal;
use std::process::{Command, Stdio};

use turbot::cli::entrypoint::run;

/// Ctrl-C during a hidden password prompt would leave the terminal without echo.
fn install_interrupt_handler() {
    let result = ctrlc::set_handler(|| {
        if cfg!(unix) && std::io::stdin().is_terminal() {
            let _ = Command::new("stty")
                .args(["icanon", "echo"])
                .stdin(Stdio::inherit())
                .status();
        }
        eprintln!();
        std::process::exit(130);
    });
    if let Err(e) = result {
        tracing::debug!(error = %e, "interrupt handler not installed");
    }
}

fn main() {
    install_interrupt_handler();

    std::process::exit(run());
}
