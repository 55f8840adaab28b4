//! The step-by-step daily log wizard.
//!
//! The wizard walks a fixed, linear sequence of [`Step`]s, each bound to one
//! field of [`DiarioFormData`]. Answers are kept when moving back and forth.
//! On the summary step the form is handed to a [`DiarioSaver`].

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
    diario::{DiarioFormData, Disposicao, Evacuacao, ItemRequisitado, Meal, Refeicao},
    sleep::{SleepEditor, SleepPeriod},
};

/// A step of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    /// Breakfast.
    #[default]
    CafeDaManha,
    /// Lunch.
    Almoco,
    /// Afternoon snack.
    LancheDaTarde,
    /// Milk.
    Leite,
    /// Bowel movement.
    Evacuacao,
    /// Mood.
    Disposicao,
    /// Sleep periods.
    Sono,
    /// Items to send in.
    ItensRequisitados,
    /// Free-text notes.
    Observacoes,
    /// Review and submit.
    Resumo,
}

impl Step {
    /// Every step, in order.
    pub const ALL: [Self; 10] = [
        Self::CafeDaManha,
        Self::Almoco,
        Self::LancheDaTarde,
        Self::Leite,
        Self::Evacuacao,
        Self::Disposicao,
        Self::Sono,
        Self::ItensRequisitados,
        Self::Observacoes,
        Self::Resumo,
    ];

    /// The first step.
    pub const FIRST: Self = Self::CafeDaManha;

    /// The last step.
    pub const LAST: Self = Self::Resumo;

    /// Zero-based position of this step.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The step at a position, if any.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The meal this step asks about, if it is a meal step.
    #[must_use]
    pub const fn meal(self) -> Option<Meal> {
        match self {
            Self::CafeDaManha => Some(Meal::CafeDaManha),
            Self::Almoco => Some(Meal::Almoco),
            Self::LancheDaTarde => Some(Meal::LancheDaTarde),
            Self::Leite => Some(Meal::Leite),
            _ => None,
        }
    }

    fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(meal) = self.meal() {
            return fmt::Display::fmt(&meal, f);
        }
        f.write_str(match self {
            Self::Evacuacao => "Evacuação",
            Self::Disposicao => "Disposição",
            Self::Sono => "Sono",
            Self::ItensRequisitados => "Itens requisitados",
            Self::Observacoes => "Observações",
            _ => "Resumo",
        })
    }
}

/// Result of moving back one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Back {
    /// Moved to the given step.
    Moved(Step),
    /// Already on the first step; the caller should leave the wizard.
    Exit,
}

/// Errors raised by wizard navigation and submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    /// `next` was called on the summary step.
    #[error("already on the last step")]
    NoNextStep,

    /// Submit was requested before reaching the summary step.
    #[error("cannot submit from step '{0}': review the summary first")]
    NotOnSummary(Step),

    /// A submission is already in flight.
    #[error("a submission is already in progress")]
    AlreadySubmitting,

    /// A completion was reported with no submission in flight.
    #[error("no submission in progress")]
    NotSubmitting,
}

/// Errors raised by [`Wizard::submit`].
#[derive(Debug, Error)]
pub enum SubmitError<E> {
    /// The wizard was not in a state that allows submitting.
    #[error(transparent)]
    Wizard(#[from] WizardError),

    /// The saver reported a failure. It is passed through untouched.
    #[error("failed to save diário: {0}")]
    Save(#[source] E),
}

/// Persists a completed daily log.
///
/// This is the boundary to whatever keeps records: a remote API, a local
/// outbox, or a test double.
pub trait DiarioSaver {
    /// What the saver hands back on success.
    type Output;

    /// The saver's failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save the completed form.
    ///
    /// # Errors
    ///
    /// Returns whatever failure the underlying store reports.
    fn save(&mut self, form: &DiarioFormData) -> Result<Self::Output, Self::Error>;
}

/// Label of the submit control while idle.
pub const SUBMIT_LABEL: &str = "Salvar diário";

/// Label of the submit control while a submission is in flight.
pub const SUBMITTING_LABEL: &str = "Salvando...";

/// One line of the summary screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    /// The step the answer belongs to.
    pub step: Step,
    /// The answer, rendered for display.
    pub value: String,
}

/// The daily log wizard.
///
/// Exclusively owns the in-progress [`DiarioFormData`] along with the
/// [`SleepEditor`] draft used on the sleep step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wizard {
    step: Step,
    data: DiarioFormData,
    editor: SleepEditor,
    submitting: bool,
}

impl Wizard {
    /// Starts a wizard with every answer at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a wizard seeded from a previously saved log.
    #[must_use]
    pub fn from_saved(data: DiarioFormData) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// The active step.
    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// The answers so far.
    #[must_use]
    pub const fn data(&self) -> &DiarioFormData {
        &self.data
    }

    /// Whether `next` is available from the active step.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.step() != Step::LAST
    }

    /// Whether the active step offers submitting instead of `next`.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.step() == Step::LAST && !self.submitting
    }

    /// Moves to the following step.
    ///
    /// Leaving the sleep step drops any period that was never finalized.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::NoNextStep`] on the summary step; the step is
    /// left unchanged.
    #[instrument(skip(self), fields(from = %self.step()))]
    pub fn next(&mut self) -> Result<Step, WizardError> {
        let next = self.step().next().ok_or(WizardError::NoNextStep)?;

        if self.step() == Step::Sono {
            let before = self.data.sono.len();
            self.data.sono.retain(SleepPeriod::is_finalized);
            let dropped = before - self.data.sono.len();
            if dropped > 0 {
                warn!(dropped, "discarding unfinalized sleep periods");
            }
        }

        debug!(to = %next, "advancing");
        self.step = next;
        Ok(next)
    }

    /// Moves to the preceding step.
    ///
    /// On the first step this signals [`Back::Exit`] and stays put.
    pub fn previous(&mut self) -> Back {
        let Some(previous) = self.step().previous() else {
            return Back::Exit;
        };
        debug!(from = %self.step(), to = %previous, "going back");
        self.step = previous;
        Back::Moved(previous)
    }

    /// Records the answer for a meal.
    pub const fn set_meal(&mut self, meal: Meal, answer: Refeicao) {
        *self.data.meal_mut(meal) = answer;
    }

    /// Records the bowel movement answer.
    pub const fn set_evacuacao(&mut self, answer: Evacuacao) {
        self.data.evacuacao = answer;
    }

    /// Records the mood answer.
    pub const fn set_disposicao(&mut self, answer: Disposicao) {
        self.data.disposicao = answer;
    }

    /// Adds or removes a requested item. Returns whether it is now selected.
    pub fn toggle_item(&mut self, item: ItemRequisitado) -> bool {
        if self.data.itens_requisitados.remove(&item) {
            false
        } else {
            self.data.itens_requisitados.insert(item);
            true
        }
    }

    /// Replaces the free-text notes.
    pub fn set_observacoes(&mut self, notes: String) {
        self.data.observacoes = notes;
    }

    /// The sleep editor draft.
    #[must_use]
    pub const fn sleep_editor(&self) -> &SleepEditor {
        &self.editor
    }

    /// Mutable access to the sleep editor draft.
    pub const fn sleep_editor_mut(&mut self) -> &mut SleepEditor {
        &mut self.editor
    }

    /// Adds the sleep editor's draft to the log.
    ///
    /// Returns `None` when the draft has equal sleep and wake times.
    pub fn add_sleep_period(&mut self) -> Option<&SleepPeriod> {
        self.editor.add(&mut self.data.sono)
    }

    /// Removes a sleep period by id. Returns whether one was removed.
    pub fn remove_sleep_period(&mut self, id: Uuid) -> bool {
        SleepEditor::remove(&mut self.data.sono, id)
    }

    /// Every answer, rendered for the summary step.
    #[must_use]
    pub fn summary(&self) -> Vec<SummaryLine> {
        let data = &self.data;
        Step::ALL
            .into_iter()
            .filter(|step| *step != Step::Resumo)
            .map(|step| {
                let value = match step {
                    Step::Evacuacao => data.evacuacao.to_string(),
                    Step::Disposicao => data.disposicao.to_string(),
                    Step::Sono if data.sono.is_empty() => "Não dormiu".to_string(),
                    Step::Sono => data
                        .sono
                        .iter()
                        .map(|p| {
                            format!(
                                "{} - {} ({})",
                                p.hora_dormiu(),
                                p.hora_acordou(),
                                p.tempo_total()
                            )
                        })
                        .collect::<Vec<_>>()
                        .join(", "),
                    Step::ItensRequisitados if data.itens_requisitados.is_empty() => {
                        "Nenhum".to_string()
                    }
                    Step::ItensRequisitados => data
                        .itens_requisitados
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                    Step::Observacoes if data.observacoes.trim().is_empty() => "-".to_string(),
                    Step::Observacoes => data.observacoes.clone(),
                    meal_step => meal_step
                        .meal()
                        .map_or_else(String::new, |meal| data.meal(meal).to_string()),
                };
                SummaryLine { step, value }
            })
            .collect()
    }

    /// Whether a submission is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The label of the submit control.
    #[must_use]
    pub const fn submit_label(&self) -> &'static str {
        if self.submitting {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    /// Marks a submission as in flight and returns the form to send.
    ///
    /// # Errors
    ///
    /// Fails when not on the summary step, or when a submission is already
    /// in flight.
    pub fn begin_submit(&mut self) -> Result<&DiarioFormData, WizardError> {
        if self.step() != Step::LAST {
            return Err(WizardError::NotOnSummary(self.step()));
        }
        if self.submitting {
            return Err(WizardError::AlreadySubmitting);
        }
        self.submitting = true;
        Ok(&self.data)
    }

    /// Marks the in-flight submission as finished, whatever its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::NotSubmitting`] if nothing was in flight.
    pub const fn finish_submit(&mut self) -> Result<(), WizardError> {
        if !self.submitting {
            return Err(WizardError::NotSubmitting);
        }
        self.submitting = false;
        Ok(())
    }

    /// Hands the completed form to `saver` and waits for it.
    ///
    /// The saver's failure is returned as-is; nothing is retried.
    ///
    /// # Errors
    ///
    /// Fails when the wizard is not ready to submit, or when the saver fails.
    #[instrument(skip_all)]
    pub fn submit<S: DiarioSaver>(
        &mut self,
        saver: &mut S,
    ) -> Result<S::Output, SubmitError<S::Error>> {
        let result = saver.save(self.begin_submit()?);
        self.finish_submit()?;

        match result {
            Ok(output) => {
                info!(periods = self.data.sono.len(), "diário submitted");
                Ok(output)
            }
            Err(e) => {
                warn!(error = %e, "diário submission failed");
                Err(SubmitError::Save(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::domain::clock::{ClockTime, Hour, Minute};

    /// Records every form it is asked to save.
    #[derive(Default)]
    struct Recorder {
        saved: Vec<DiarioFormData>,
    }

    impl DiarioSaver for Recorder {
        type Output = usize;
        type Error = Infallible;

        fn save(&mut self, form: &DiarioFormData) -> Result<usize, Infallible> {
            self.saved.push(form.clone());
            Ok(self.saved.len())
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("servidor indisponível")]
    struct Unavailable;

    struct Failing;

    impl DiarioSaver for Failing {
        type Output = ();
        type Error = Unavailable;

        fn save(&mut self, _form: &DiarioFormData) -> Result<(), Unavailable> {
            Err(Unavailable)
        }
    }

    fn period(sleep: &str, wake: &str) -> SleepPeriod {
        let sleep: ClockTime = sleep.parse().unwrap();
        let wake: ClockTime = wake.parse().unwrap();
        SleepPeriod::new(sleep, wake)
    }

    fn walk_to_summary(wizard: &mut Wizard) {
        while wizard.has_next() {
            wizard.next().unwrap();
        }
    }

    #[test]
    fn step_indices_are_contiguous() {
        for (i, step) in Step::ALL.into_iter().enumerate() {
            assert_eq!(step.index(), i);
            assert_eq!(Step::from_index(i), Some(step));
        }
        assert_eq!(Step::Sono.index(), 6);
        assert_eq!(Step::from_index(10), None);
    }

    #[test]
    fn previous_on_first_step_signals_exit() {
        let mut wizard = Wizard::new();
        assert_eq!(wizard.previous(), Back::Exit);
        assert_eq!(wizard.step(), Step::FIRST);
    }

    #[test]
    fn next_on_last_step_is_unavailable() {
        let mut wizard = Wizard::new();
        walk_to_summary(&mut wizard);

        assert_eq!(wizard.step(), Step::Resumo);
        assert!(!wizard.has_next());
        assert_eq!(wizard.next(), Err(WizardError::NoNextStep));
        assert_eq!(wizard.step(), Step::Resumo);
    }

    #[test]
    fn navigation_never_leaves_bounds() {
        let mut wizard = Wizard::new();
        for _ in 0..15 {
            let _ = wizard.next();
            assert!(wizard.step().index() <= 9);
        }
        for _ in 0..15 {
            wizard.previous();
            assert!(wizard.step().index() <= 9);
        }
        assert_eq!(wizard.step(), Step::FIRST);
    }

    #[test]
    fn answers_survive_navigation() {
        let mut wizard = Wizard::new();
        wizard.set_meal(Meal::CafeDaManha, Refeicao::Bom);
        wizard.next().unwrap();
        wizard.set_meal(Meal::Almoco, Refeicao::NaoAceitou);
        assert_eq!(wizard.previous(), Back::Moved(Step::CafeDaManha));

        assert_eq!(wizard.data().cafe_da_manha, Refeicao::Bom);
        assert_eq!(wizard.data().almoco, Refeicao::NaoAceitou);
    }

    #[test]
    fn meal_steps_come_first_in_meal_order() {
        let meals: Vec<Meal> = Step::ALL.into_iter().filter_map(Step::meal).collect();
        assert_eq!(meals, Meal::ALL);
        assert!(Step::ALL[..Meal::ALL.len()].iter().all(|s| s.meal().is_some()));
    }

    #[test]
    fn toggle_item_adds_then_removes() {
        let mut wizard = Wizard::new();
        assert!(wizard.toggle_item(ItemRequisitado::Pomada));
        assert!(wizard.data().itens_requisitados.contains(&ItemRequisitado::Pomada));
        assert!(!wizard.toggle_item(ItemRequisitado::Pomada));
        assert!(wizard.data().itens_requisitados.is_empty());
    }

    #[test]
    fn leaving_sleep_step_drops_unfinalized_periods() {
        let kept = period("09:00", "10:00");
        let mut pending = serde_json::to_value(period("13:00", "14:00")).unwrap();
        pending["salvo"] = false.into();
        let pending: SleepPeriod = serde_json::from_value(pending).unwrap();
        assert!(!pending.is_finalized());

        let mut wizard = Wizard::from_saved(DiarioFormData {
            sono: vec![kept.clone(), pending],
            ..DiarioFormData::default()
        });
        while wizard.step() != Step::Sono {
            wizard.next().unwrap();
        }
        assert_eq!(wizard.data().sono.len(), 2);

        wizard.next().unwrap();
        assert_eq!(wizard.data().sono, vec![kept]);
    }

    #[test]
    fn sleep_periods_added_through_editor_survive_the_sleep_step() {
        let mut wizard = Wizard::new();
        while wizard.step() != Step::Sono {
            wizard.next().unwrap();
        }
        let editor = wizard.sleep_editor_mut();
        editor.select_sleep_hour(Hour::new(9).unwrap());
        assert!(editor.select_wake_hour(Hour::new(10).unwrap()));
        assert!(editor.select_wake_minute(Minute::Fifteen));
        let id = wizard.add_sleep_period().unwrap().id();

        wizard.next().unwrap();
        assert_eq!(wizard.data().sono.len(), 1);
        assert_eq!(wizard.data().sono[0].id(), id);
        assert_eq!(wizard.data().sono[0].tempo_total(), "01:15");
    }

    #[test]
    fn submit_before_summary_is_rejected() {
        let mut wizard = Wizard::new();
        let mut saver = Recorder::default();

        let err = wizard.submit(&mut saver).unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Wizard(WizardError::NotOnSummary(Step::CafeDaManha))
        ));
        assert!(saver.saved.is_empty());
    }

    #[test]
    fn seeded_sleep_periods_are_submitted_in_order() {
        let a = period("08:00", "09:30");
        let b = period("13:15", "15:00");
        let mut wizard = Wizard::from_saved(DiarioFormData {
            sono: vec![a.clone(), b.clone()],
            ..DiarioFormData::default()
        });
        walk_to_summary(&mut wizard);

        let mut saver = Recorder::default();
        wizard.submit(&mut saver).unwrap();

        assert_eq!(saver.saved.len(), 1);
        assert_eq!(saver.saved[0].sono, vec![a, b]);
    }

    #[test]
    fn submit_label_tracks_in_flight_state() {
        let mut wizard = Wizard::new();
        walk_to_summary(&mut wizard);
        assert_eq!(wizard.submit_label(), SUBMIT_LABEL);

        wizard.begin_submit().unwrap();
        assert!(wizard.is_submitting());
        assert!(!wizard.can_submit());
        assert_eq!(wizard.submit_label(), SUBMITTING_LABEL);
        assert_eq!(
            wizard.begin_submit().unwrap_err(),
            WizardError::AlreadySubmitting
        );

        wizard.finish_submit().unwrap();
        assert!(!wizard.is_submitting());
        assert!(wizard.can_submit());
    }

    #[test]
    fn failed_save_is_returned_and_clears_busy_state() {
        let mut wizard = Wizard::new();
        walk_to_summary(&mut wizard);

        let err = wizard.submit(&mut Failing).unwrap_err();
        assert!(matches!(err, SubmitError::Save(Unavailable)));
        assert_eq!(err.to_string(), "failed to save diário: servidor indisponível");
        assert!(!wizard.is_submitting());
    }

    #[test]
    fn summary_lists_every_answer_step() {
        let mut wizard = Wizard::new();
        wizard.set_evacuacao(Evacuacao::Liquida);
        wizard.toggle_item(ItemRequisitado::Fralda);
        wizard.toggle_item(ItemRequisitado::CremeDental);
        wizard.data.sono.push(period("09:00", "10:15"));

        let summary = wizard.summary();
        assert_eq!(summary.len(), 9);
        let value = |step| {
            summary
                .iter()
                .find(|line| line.step == step)
                .map(|line| line.value.as_str())
                .unwrap()
        };
        assert_eq!(value(Step::CafeDaManha), "Ótimo");
        assert_eq!(value(Step::Evacuacao), "Líquida");
        assert_eq!(value(Step::Sono), "09:00 - 10:15 (01:15)");
        assert_eq!(value(Step::ItensRequisitados), "Fralda, Creme dental");
        assert_eq!(value(Step::Observacoes), "-");
    }
}
