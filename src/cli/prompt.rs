//! Interactive terminal front end for the daily log wizard

use std::fmt::Display;

use diario::domain::{
    wizard::{Back, SubmitError, SUBMITTING_LABEL},
    Disposicao, Evacuacao, Hour, ItemRequisitado, Minute, Refeicao, Step,
};
use diario::{DiarioSaver, Wizard};
use dialoguer::{Input, MultiSelect, Select};

use crate::cli::terminal::{self, Colorize};

/// How an interactive session ended.
pub enum Outcome<T> {
    /// The log was saved; holds what the saver returned.
    Saved(T),
    /// The user left the wizard without saving.
    Cancelled,
}

/// Drives `wizard` from the terminal until it is saved or abandoned.
///
/// Pressing Esc goes back one step; going back from the first step leaves
/// the wizard. A failed save is reported and the summary is shown again.
pub fn run<S: DiarioSaver>(
    wizard: &mut Wizard,
    saver: &mut S,
) -> anyhow::Result<Outcome<S::Output>> {
    loop {
        header(wizard.step());

        let advance = match wizard.step() {
            Step::Evacuacao => {
                let current = wizard.data().evacuacao;
                choose(&Evacuacao::ALL, current)?.map(|answer| wizard.set_evacuacao(answer))
            }
            Step::Disposicao => {
                let current = wizard.data().disposicao;
                choose(&Disposicao::ALL, current)?.map(|answer| wizard.set_disposicao(answer))
            }
            Step::Sono => sleep_step(wizard)?,
            Step::ItensRequisitados => items_step(wizard)?,
            Step::Observacoes => {
                let notes: String = Input::new()
                    .with_prompt("Observações")
                    .with_initial_text(wizard.data().observacoes.clone())
                    .allow_empty(true)
                    .interact_text()?;
                wizard.set_observacoes(notes);
                Some(())
            }
            Step::Resumo => match summary_step(wizard, saver)? {
                SummaryAction::Saved(output) => return Ok(Outcome::Saved(output)),
                SummaryAction::Stay => continue,
                SummaryAction::Back => None,
                SummaryAction::Cancel => return Ok(Outcome::Cancelled),
            },
            meal_step => match meal_step.meal() {
                Some(meal) => {
                    let current = wizard.data().meal(meal);
                    choose(&Refeicao::ALL, current)?.map(|answer| wizard.set_meal(meal, answer))
                }
                None => Some(()),
            },
        };

        match advance {
            Some(()) => {
                wizard.next()?;
            }
            None => {
                if wizard.previous() == Back::Exit {
                    return Ok(Outcome::Cancelled);
                }
            }
        }
    }
}

fn header(step: Step) {
    println!();
    println!(
        "{}",
        format!("[{}/{}] {step}", step.index() + 1, Step::ALL.len()).info()
    );
}

/// Pick one of `options`, starting at `current`. `None` means go back.
fn choose<T: Copy + PartialEq + Display>(options: &[T], current: T) -> anyhow::Result<Option<T>> {
    let labels: Vec<String> = options.iter().map(ToString::to_string).collect();
    let default = options.iter().position(|o| *o == current).unwrap_or(0);
    let picked = Select::new()
        .items(&labels)
        .default(default)
        .interact_opt()?;
    Ok(picked.map(|i| options[i]))
}

enum SleepAction {
    SleepHour,
    SleepMinute,
    WakeHour,
    WakeMinute,
    Add,
    Remove,
    Continue,
}

fn sleep_step(wizard: &mut Wizard) -> anyhow::Result<Option<()>> {
    loop {
        print_periods(wizard);

        let editor = wizard.sleep_editor();
        let draft = editor.draft();
        println!(
            "  Rascunho: dormiu {} - acordou {} ({})",
            draft.sleep,
            draft.wake,
            editor.draft_duration()
        );
        if let Some(warning) = editor.warning() {
            println!("  {}", format!("⚠️  {warning}").warning());
        }

        let mut actions = vec![
            (SleepAction::SleepHour, "Hora que dormiu".to_string()),
            (SleepAction::SleepMinute, "Minuto que dormiu".to_string()),
            (SleepAction::WakeHour, "Hora que acordou".to_string()),
            (SleepAction::WakeMinute, "Minuto que acordou".to_string()),
            (SleepAction::Add, disabled_label("Adicionar período", !editor.can_add())),
        ];
        if !wizard.data().sono.is_empty() {
            actions.push((SleepAction::Remove, "Remover período".to_string()));
        }
        actions.push((SleepAction::Continue, "Continuar".to_string()));

        let labels: Vec<&str> = actions.iter().map(|(_, label)| label.as_str()).collect();
        let Some(picked) = Select::new().items(&labels).default(0).interact_opt()? else {
            return Ok(None);
        };

        match actions[picked].0 {
            SleepAction::SleepHour => {
                if let Some(hour) = pick_hour(|_| false)? {
                    wizard.sleep_editor_mut().select_sleep_hour(hour);
                }
            }
            SleepAction::SleepMinute => {
                if let Some(minute) = pick_minute(|_| false)? {
                    wizard.sleep_editor_mut().select_sleep_minute(minute);
                }
            }
            SleepAction::WakeHour => {
                let editor = wizard.sleep_editor().clone();
                if let Some(hour) = pick_hour(|h| editor.is_wake_hour_disabled(h))? {
                    if !wizard.sleep_editor_mut().select_wake_hour(hour) {
                        println!("{}", "Esse horário não está disponível".warning());
                    }
                }
            }
            SleepAction::WakeMinute => {
                let editor = wizard.sleep_editor().clone();
                if let Some(minute) = pick_minute(|m| editor.is_wake_minute_disabled(m))? {
                    if !wizard.sleep_editor_mut().select_wake_minute(minute) {
                        println!("{}", "Esse horário não está disponível".warning());
                    }
                }
            }
            SleepAction::Add => {
                if let Some(period) = wizard.add_sleep_period() {
                    println!(
                        "{}",
                        format!(
                            "✅ Período adicionado: {} - {} ({})",
                            period.hora_dormiu(),
                            period.hora_acordou(),
                            period.tempo_total()
                        )
                        .success()
                    );
                }
            }
            SleepAction::Remove => remove_period(wizard)?,
            SleepAction::Continue => return Ok(Some(())),
        }
    }
}

fn print_periods(wizard: &Wizard) {
    let periods = &wizard.data().sono;
    if periods.is_empty() {
        println!("{}", "  Nenhum período registrado".dim());
        return;
    }
    for (i, period) in periods.iter().enumerate() {
        println!(
            "  {}. {} - {} ({})",
            i + 1,
            period.hora_dormiu(),
            period.hora_acordou(),
            period.tempo_total()
        );
    }
}

fn remove_period(wizard: &mut Wizard) -> anyhow::Result<()> {
    let labels: Vec<String> = wizard
        .data()
        .sono
        .iter()
        .map(|p| format!("{} - {} ({})", p.hora_dormiu(), p.hora_acordou(), p.tempo_total()))
        .collect();
    if let Some(i) = Select::new()
        .with_prompt("Remover qual período?")
        .items(&labels)
        .interact_opt()?
    {
        let id = wizard.data().sono[i].id();
        wizard.remove_sleep_period(id);
    }
    Ok(())
}

fn disabled_label(label: &str, disabled: bool) -> String {
    if disabled {
        format!("{label} (indisponível)").dim()
    } else {
        label.to_string()
    }
}

fn pick_hour(disabled: impl Fn(Hour) -> bool) -> anyhow::Result<Option<Hour>> {
    let hours: Vec<Hour> = Hour::all().collect();
    pick(&hours, disabled)
}

fn pick_minute(disabled: impl Fn(Minute) -> bool) -> anyhow::Result<Option<Minute>> {
    pick(&Minute::ALL, disabled)
}

/// Pick from a grid where some options may be disabled.
///
/// Disabled options are still listed so the grid keeps its shape. Picking
/// one is left to the caller to ignore. Narrow terminals get a short marker.
fn pick<T: Copy + Display>(
    options: &[T],
    disabled: impl Fn(T) -> bool,
) -> anyhow::Result<Option<T>> {
    let compact = terminal::is_narrow();
    let labels: Vec<String> = options
        .iter()
        .map(|o| {
            if compact && disabled(*o) {
                format!("{o} ×").dim()
            } else {
                disabled_label(&o.to_string(), disabled(*o))
            }
        })
        .collect();
    let default = options.iter().position(|o| !disabled(*o)).unwrap_or(0);
    let picked = Select::new()
        .items(&labels)
        .default(default)
        .interact_opt()?;
    Ok(picked.map(|i| options[i]))
}

fn items_step(wizard: &mut Wizard) -> anyhow::Result<Option<()>> {
    let labels: Vec<String> = ItemRequisitado::ALL.iter().map(ToString::to_string).collect();
    let selected: Vec<bool> = ItemRequisitado::ALL
        .iter()
        .map(|item| wizard.data().itens_requisitados.contains(item))
        .collect();

    let Some(picked) = MultiSelect::new()
        .with_prompt("Espaço marca, Enter confirma")
        .items(&labels)
        .defaults(&selected)
        .interact_opt()?
    else {
        return Ok(None);
    };

    for (i, item) in ItemRequisitado::ALL.into_iter().enumerate() {
        if picked.contains(&i) != selected[i] {
            wizard.toggle_item(item);
        }
    }
    Ok(Some(()))
}

enum SummaryAction<T> {
    Saved(T),
    Stay,
    Back,
    Cancel,
}

fn summary_step<S: DiarioSaver>(
    wizard: &mut Wizard,
    saver: &mut S,
) -> anyhow::Result<SummaryAction<S::Output>> {
    for line in wizard.summary() {
        println!("  {:<20} {}", format!("{}:", line.step).dim(), line.value);
    }
    println!();

    let options = [wizard.submit_label(), "Voltar", "Cancelar"];
    let Some(picked) = Select::new().items(&options).default(0).interact_opt()? else {
        return Ok(SummaryAction::Back);
    };

    match picked {
        0 => {
            println!("{}", SUBMITTING_LABEL.dim());
            match wizard.submit(saver) {
                Ok(output) => Ok(SummaryAction::Saved(output)),
                Err(SubmitError::Save(e)) => {
                    eprintln!("{}", format!("❌ {e}").warning());
                    Ok(SummaryAction::Stay)
                }
                Err(e) => Err(e.into()),
            }
        }
        1 => Ok(SummaryAction::Back),
        _ => Ok(SummaryAction::Cancel),
    }
}
