use colored::*;
use console::Term;
use std::fmt::Display;

/// User-facing terminal output: coloured glyphs, headers and a banner.
///
/// Diagnostics go through `log` instead; this is only for what the person at
/// the keyboard should read. Teal (38, 166, 154) is the primary colour, amber
/// (255, 179, 0) the accent.
pub struct Logger;

impl Logger {
    /// Prints the banner, centred on the terminal.
    /// Only interactive commands show it. `status` and `logout` skip it so
    /// their output stays short enough to paste into a bug report.
    pub fn banner() {
        let width = Term::stdout().size().1 as usize;

        let banner = r#"
                         _
  _ __ ___   ___ _ __ ___ | |__   ___ _ __
 | '_ ` _ \ / _ \ '_ ` _ \| '_ \ / _ \ '__|
 | | | | | |  __/ | | | | | |_) |  __/ |
 |_| |_| |_|\___|_| |_| |_|_.__/ \___|_|
"#;

        for line in banner.lines().filter(|l| !l.trim().is_empty()) {
            println!(
                "{:^width$}",
                line.truecolor(38, 166, 154).bold().to_string(),
                width = width
            );
        }
        println!();
    }

    /// Prints an info message with a teal bullet.
    /// The catch-all for anything that isn't good news or bad news.
    pub fn info<T: Display>(msg: T) {
        println!("{} {}", "•".truecolor(38, 166, 154).bold(), msg);
    }

    /// Prints a success message with a green checkmark.
    /// Shown whenever an account action goes through.
    pub fn success<T: Display>(msg: T) {
        println!("{} {}", "✔".green().bold(), msg);
    }

    /// Prints an error with a red X.
    /// Goes to stderr so piping `member status` somewhere stays clean.
    pub fn error<T: Display>(msg: T) {
        eprintln!("{} {}", "✖".red().bold(), msg);
    }

    /// Prints a warning with a yellow sign, also on stderr.
    /// Used when something is off but we can keep going, like a stale token.
    pub fn warn<T: Display>(msg: T) {
        eprintln!("{} {}", "⚠".yellow().bold(), msg);
    }

    /// Prints a section header in amber with underline.
    /// Each screen opens with one so you can tell where you are.
    /// The leading newline keeps it off the previous block.
    pub fn header<T: Display>(msg: T) {
        println!(
            "\n{}",
            msg.to_string().truecolor(255, 179, 0).bold().underline()
        );
    }

    /// Returns the text in bold teal for inline use.
    /// Usernames mostly. It's nice to see your own name stand out.
    pub fn highlight<T: Display>(msg: T) -> String {
        msg.to_string().truecolor(38, 166, 154).bold().to_string()
    }

    /// Returns dimmed text for hints and other stuff you can skip reading.
    pub fn dim<T: Display>(msg: T) -> String {
        msg.to_string().dimmed().to_string()
    }
}
