use std::fmt::Write;

use crate::action::{Action, Parameter, Section};

const FLAG_COLUMN: usize = 44;

/// Render the flag listing for `program`.
pub fn render(program: &str, actions: &[Action], parameters: &[Parameter]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Usage of {}:", program);
    let _ = writeln!(out, "  {} [flags]", program);

    for (section, title) in [
        (Section::General, "Flags:"),
        (Section::Cron, "CRON JOB FLAGS:"),
        (Section::More, "MORE OPTIONS:"),
    ] {
        let _ = writeln!(out, "\n{}", title);

        let entries = parameters
            .iter()
            .filter(|p| p.section == section)
            .map(|p| (p.flag, p.value, p.help))
            .chain(
                actions
                    .iter()
                    .filter(|a| a.section == section)
                    .map(|a| (a.flag, a.value, a.help)),
            );

        for (flag, value, help) in entries {
            let name = match value {
                Some(value) => format!("-{} {}", flag, value),
                None => format!("-{}", flag),
            };
            let _ = writeln!(out, "  {:<width$} {}", name, help, width = FLAG_COLUMN);
        }
    }

    out
}

/// Write the flag listing to stderr.
pub fn print(program: &str, actions: &[Action], parameters: &[Parameter]) {
    eprint!("{}", render(program, actions, parameters));
}
