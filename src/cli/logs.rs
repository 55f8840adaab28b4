use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use diario::{
    storage::{parse_date, RecordKey},
    Diario, Directory, Session, Wizard,
};
use tracing::instrument;
use uuid::Uuid;

use crate::cli::{
    prompt::{self, Outcome},
    terminal::Colorize,
};

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: LogCommand,
}

#[derive(Debug, clap::Parser)]
enum LogCommand {
    /// Fill in a new daily log
    New(New),

    /// Edit a stored daily log, starting from its saved answers
    Edit(Edit),

    /// Show a stored daily log
    Show(Show),

    /// List stored daily logs
    List(List),

    /// Remove one sleep period from a stored daily log
    RemoveSono(RemoveSono),
}

impl Command {
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root);
        let session = Session::load(&directory.session_path())?;

        match self.command {
            LogCommand::New(command) => command.run(&directory, &session),
            LogCommand::Edit(command) => command.run(&directory, &session),
            LogCommand::Show(command) => command.run(&directory, &session),
            LogCommand::List(command) => command.run(&directory, &session),
            LogCommand::RemoveSono(command) => command.run(&directory, &session),
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct New {
    /// The student the log is about
    aluno: String,

    /// The day being logged (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = parse_day)]
    data: Option<NaiveDate>,
}

impl New {
    #[instrument(skip(directory, session))]
    fn run(self, directory: &Directory, session: &Session) -> anyhow::Result<()> {
        let author = session.require_writer()?;
        let data = self.data.unwrap_or_else(|| Local::now().date_naive());
        let key = RecordKey::new(self.aluno, data)?;

        if directory.load(&key)?.is_some() {
            anyhow::bail!(
                "A diário for {key} already exists. Use 'elo diario edit {} {}' instead",
                key.aluno_id(),
                key.data()
            );
        }

        fill_in(directory, &key, author.nome(), Wizard::new())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// The student the log is about
    aluno: String,

    /// The day of the log (YYYY-MM-DD)
    #[arg(value_parser = parse_day)]
    data: NaiveDate,
}

impl Edit {
    #[instrument(skip(directory, session))]
    fn run(self, directory: &Directory, session: &Session) -> anyhow::Result<()> {
        let author = session.require_writer()?;
        let key = RecordKey::new(self.aluno, self.data)?;

        let Some(existing) = directory.load(&key)? else {
            anyhow::bail!("No diário stored for {key}");
        };

        fill_in(directory, &key, author.nome(), Wizard::from_saved(existing.form))
    }
}

fn fill_in(
    directory: &Directory,
    key: &RecordKey,
    author: &str,
    mut wizard: Wizard,
) -> anyhow::Result<()> {
    println!(
        "{}",
        format!("Diário de {} em {}", key.aluno_id(), key.data()).info()
    );

    match prompt::run(&mut wizard, &mut directory.saver(key, author))? {
        Outcome::Saved(path) => {
            let shown = path.strip_prefix(directory.root()).unwrap_or(&path);
            println!(
                "{}",
                format!("✅ Saved diário to {}", shown.display()).success()
            );
        }
        Outcome::Cancelled => println!("{}", "Cancelled, nothing was saved".dim()),
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(Debug, clap::Parser)]
pub struct Show {
    /// The student the log is about
    aluno: String,

    /// The day of the log (YYYY-MM-DD)
    #[arg(value_parser = parse_day)]
    data: NaiveDate,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    format: OutputFormat,
}

impl Show {
    #[instrument(skip(directory, session))]
    fn run(self, directory: &Directory, session: &Session) -> anyhow::Result<()> {
        session.require_viewer(&self.aluno)?;
        let key = RecordKey::new(self.aluno, self.data)?;

        let Some(record) = directory.load(&key)? else {
            anyhow::bail!("No diário stored for {key}");
        };

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&record)?),
            OutputFormat::Table => print_record(&record),
        }
        Ok(())
    }
}

fn print_record(record: &Diario) {
    println!(
        "{}",
        format!("Diário de {} em {}", record.aluno_id, record.data).info()
    );
    println!(
        "{}",
        format!(
            "Registrado por {} em {}",
            record.autor,
            record.atualizado_em.format("%Y-%m-%d %H:%M UTC")
        )
        .dim()
    );
    println!();

    for line in Wizard::from_saved(record.form.clone()).summary() {
        println!("  {:<20} {}", format!("{}:", line.step).dim(), line.value);
    }

    if !record.form.sono.is_empty() {
        println!();
        println!("{}", "Períodos de sono:".dim());
        for period in &record.form.sono {
            println!(
                "  {}  {} - {} ({})",
                period.id().to_string().dim(),
                period.hora_dormiu(),
                period.hora_acordou(),
                period.tempo_total()
            );
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct List {
    /// Only list logs for this student
    #[arg(long)]
    aluno: Option<String>,
}

impl List {
    #[instrument(skip(directory, session))]
    fn run(self, directory: &Directory, session: &Session) -> anyhow::Result<()> {
        let user = session.user();
        let records: Vec<Diario> = directory
            .load_all()?
            .into_iter()
            .filter(|r| self.aluno.as_ref().is_none_or(|aluno| &r.aluno_id == aluno))
            .filter(|r| user.can_view_aluno(&r.aluno_id))
            .collect();

        if records.is_empty() {
            println!("No diários found.");
            return Ok(());
        }

        println!("{:<16} {:<12} {:<6} {}", "ALUNO", "DATA", "SONO", "AUTOR");
        for record in &records {
            println!(
                "{:<16} {:<12} {:<6} {}",
                record.aluno_id,
                record.data,
                record.form.sono.len(),
                record.autor
            );
        }
        println!();
        println!("{}", format!("{} diário(s)", records.len()).dim());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct RemoveSono {
    /// The student the log is about
    aluno: String,

    /// The day of the log (YYYY-MM-DD)
    #[arg(value_parser = parse_day)]
    data: NaiveDate,

    /// The id of the sleep period to remove (see 'elo diario show')
    id: Uuid,
}

impl RemoveSono {
    #[instrument(skip(directory, session))]
    fn run(self, directory: &Directory, session: &Session) -> anyhow::Result<()> {
        session.require_writer()?;
        let key = RecordKey::new(self.aluno, self.data)?;

        if directory.remove_sleep_period(&key, self.id)? {
            println!("{}", format!("✅ Removed sleep period {}", self.id).success());
        } else {
            println!(
                "{}",
                format!("ℹ️  No sleep period {} in {key}", self.id).dim()
            );
        }
        Ok(())
    }
}
