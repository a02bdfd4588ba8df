use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "member")]
#[command(about = "Member portal: sign up, sign in and view your account", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the auth API base URL (e.g. http://localhost:8000/api)
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Open the app at a path (defaults to /)
    Open {
        /// Route to start at, e.g. /dashboard or /auth/login?returnUrl=/dashboard
        path: Option<String>,
    },
    /// Sign in
    Login,
    /// Create a new account
    Register,
    /// Show your account (sign in first if needed)
    Dashboard,
    /// Forget the stored token
    Logout,
    /// Show whether you're signed in and as whom
    Status,
}

impl Commands {
    /// The route an interactive command starts at. `None` for commands that
    /// don't open the app.
    pub fn start_path(&self) -> Option<String> {
        match self {
            Commands::Open { path } => Some(path.clone().unwrap_or_else(|| "/".to_string())),
            Commands::Login => Some(crate::router::LOGIN_PATH.to_string()),
            Commands::Register => Some(crate::router::REGISTER_PATH.to_string()),
            Commands::Dashboard => Some(crate::router::DASHBOARD_PATH.to_string()),
            Commands::Logout | Commands::Status => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["member"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.api_url, None);
    }

    #[test]
    fn global_api_url_after_subcommand() {
        let cli = Cli::try_parse_from(["member", "status", "--api-url", "http://x/api"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Status));
        assert_eq!(cli.api_url.as_deref(), Some("http://x/api"));
    }

    #[test]
    fn start_paths() {
        let open = Cli::try_parse_from(["member", "open", "/auth/register"]).unwrap();
        assert_eq!(
            open.command.unwrap().start_path().as_deref(),
            Some("/auth/register")
        );
        assert_eq!(
            Commands::Open { path: None }.start_path().as_deref(),
            Some("/")
        );
        assert_eq!(Commands::Dashboard.start_path().as_deref(), Some("/dashboard"));
        assert_eq!(Commands::Logout.start_path(), None);
    }
}
