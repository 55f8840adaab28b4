use std::{fs, path::PathBuf};

use diario::{domain::Role, Directory, Session};
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Login {
    /// Bearer token issued by the API
    #[arg(long)]
    token: String,

    /// JSON file holding the user profile returned by the API
    #[arg(long, value_name = "FILE")]
    profile: PathBuf,
}

impl Login {
    #[instrument(skip(self), fields(profile = %self.profile.display()))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root);

        let profile = fs::read_to_string(&self.profile).map_err(|e| {
            anyhow::anyhow!("Failed to read profile {}: {e}", self.profile.display())
        })?;
        let session = Session::from_profile(self.token, &profile)?;
        session.save(&directory.session_path())?;

        println!(
            "{}",
            format!(
                "✅ Signed in as {} ({})",
                session.user().nome(),
                session.user().label()
            )
            .success()
        );
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Logout {}

impl Logout {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root);
        if Session::clear(&directory.session_path())? {
            println!("{}", "✅ Signed out".success());
        } else {
            println!("{}", "ℹ️  No one was signed in".dim());
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct WhoAmI {}

impl WhoAmI {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root);
        let session = Session::load(&directory.session_path())?;
        let user = session.user();

        println!("{} ({})", user.nome().info(), user.label());
        println!("  id: {}", user.id());
        match user {
            Role::Admin { email, .. } => println!("  email: {email}"),
            Role::Teacher { email, turmas, .. } => {
                println!("  email: {email}");
                println!("  turmas: {}", join_or_dash(turmas));
            }
            Role::Guardian { email, alunos, .. } => {
                println!("  email: {email}");
                println!("  alunos: {}", join_or_dash(alunos));
            }
        }
        Ok(())
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
