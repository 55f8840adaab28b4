use std::{fs, path::Path};

use diario::{storage::META_DIR, Config};
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Init {
    /// Directory for stored logs, relative to the workspace root
    #[arg(long, value_name = "DIR")]
    records_dir: Option<std::path::PathBuf>,
}

impl Init {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let meta_dir = root.join(META_DIR);
        if meta_dir.exists() {
            anyhow::bail!("Workspace already initialized (found existing {META_DIR} directory)");
        }

        fs::create_dir_all(&meta_dir)
            .map_err(|e| anyhow::anyhow!("Failed to create {META_DIR} directory: {e}"))?;

        let mut config = Config::default();
        if let Some(records_dir) = self.records_dir {
            config.set_records_dir(records_dir);
        }

        let config_path = meta_dir.join("config.toml");
        config
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        let records_dir = root.join(config.records_dir());
        fs::create_dir_all(&records_dir)
            .map_err(|e| anyhow::anyhow!("Failed to create records directory: {e}"))?;

        println!(
            "{}",
            format!("✅ Initialized workspace in {}", root.display()).success()
        );
        println!("  Created: {META_DIR}/config.toml");
        println!("  Created: {}/", config.records_dir().display());
        println!();
        println!("Next steps:");
        println!("  elo login --token <TOKEN> --profile perfil.json");
        println!("  elo diario new <ALUNO>");

        Ok(())
    }
}
