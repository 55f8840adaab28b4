use std::path::PathBuf;

mod init;
mod logs;
mod prompt;
mod session;
mod terminal;

use clap::ArgAction;
use init::Init;
use session::{Login, Logout, WhoAmI};

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the root of the workspace
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a new workspace
    Init(Init),

    /// Sign in with a token and the profile returned by the API
    Login(Login),

    /// Sign out, forgetting the stored session
    Logout(Logout),

    /// Show who is signed in
    #[command(name = "whoami")]
    WhoAmI(WhoAmI),

    /// Fill in, review and list daily logs
    Diario(logs::Command),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(&root)?,
            Self::Login(command) => command.run(root)?,
            Self::Logout(command) => command.run(root)?,
            Self::WhoAmI(command) => command.run(root)?,
            Self::Diario(command) => command.run(root)?,
        }
        Ok(())
    }
}
