//! End-to-end flows through the public API: fill in a log with the wizard,
//! store it, seed a new wizard from it and submit again.

use std::fs;

use chrono::NaiveDate;
use diario::{
    domain::{Back, Evacuacao, Hour, ItemRequisitado, Meal, Minute, Refeicao},
    Directory, RecordKey, Step, Wizard,
};
use tempfile::TempDir;

fn hour(h: u8) -> Hour {
    Hour::new(h).unwrap()
}

fn key() -> RecordKey {
    RecordKey::new("aluno-7", NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()).unwrap()
}

fn advance_to(wizard: &mut Wizard, step: Step) {
    while wizard.step() != step {
        wizard.next().unwrap();
    }
}

#[test]
fn fill_in_and_store_a_log() {
    let tmp = TempDir::new().unwrap();
    let directory = Directory::new(tmp.path().to_path_buf());
    let key = key();

    let mut wizard = Wizard::new();
    assert_eq!(wizard.previous(), Back::Exit);

    wizard.set_meal(Meal::Almoco, Refeicao::Regular);
    wizard.set_evacuacao(Evacuacao::Dura);
    advance_to(&mut wizard, Step::Sono);

    let editor = wizard.sleep_editor_mut();
    editor.select_sleep_hour(hour(9));
    assert!(editor.select_wake_hour(hour(10)));
    assert!(editor.select_wake_minute(Minute::Fifteen));
    assert_eq!(
        wizard.add_sleep_period().map(|p| p.tempo_total().to_string()),
        Some("01:15".to_string())
    );

    advance_to(&mut wizard, Step::ItensRequisitados);
    wizard.toggle_item(ItemRequisitado::Fralda);
    advance_to(&mut wizard, Step::Resumo);
    assert!(wizard.next().is_err());

    let path = wizard.submit(&mut directory.saver(&key, "Marta")).unwrap();
    assert!(path.ends_with("diarios/aluno-7/2024-05-06.yaml"));
    assert!(!wizard.is_submitting());

    let stored = directory.load(&key).unwrap().unwrap();
    assert_eq!(stored.autor, "Marta");
    assert_eq!(stored.form.almoco, Refeicao::Regular);
    assert_eq!(stored.form.sono.len(), 1);
    assert_eq!(stored.form.sono[0].hora_dormiu(), "09:00");
    assert_eq!(stored.form.sono[0].hora_acordou(), "10:15");
    assert!(stored.form.itens_requisitados.contains(&ItemRequisitado::Fralda));
}

#[test]
fn seeded_periods_are_resubmitted_in_order() {
    let tmp = TempDir::new().unwrap();
    let directory = Directory::new(tmp.path().to_path_buf());
    let key = key();

    let mut first = Wizard::new();
    advance_to(&mut first, Step::Sono);
    for (sleep, wake) in [(13, 14), (9, 10)] {
        let editor = first.sleep_editor_mut();
        editor.select_sleep_hour(hour(sleep));
        assert!(editor.select_wake_hour(hour(wake)));
        first.add_sleep_period().unwrap();
    }
    advance_to(&mut first, Step::Resumo);
    first.submit(&mut directory.saver(&key, "Marta")).unwrap();

    let stored = directory.load(&key).unwrap().unwrap();
    let mut wizard = Wizard::from_saved(stored.form.clone());
    advance_to(&mut wizard, Step::Resumo);
    wizard.submit(&mut directory.saver(&key, "Paulo")).unwrap();

    let resubmitted = directory.load(&key).unwrap().unwrap();
    assert_eq!(resubmitted.autor, "Paulo");
    assert_eq!(resubmitted.form.sono, stored.form.sono);
    assert_eq!(resubmitted.form.sono[0].hora_dormiu(), "13:00");
    assert_eq!(resubmitted.form.sono[1].hora_dormiu(), "09:00");
}

#[test]
fn unfinalized_periods_from_disk_are_dropped_after_the_sleep_step() {
    let tmp = TempDir::new().unwrap();
    let directory = Directory::new(tmp.path().to_path_buf());
    let key = key();

    let dir = tmp.path().join("diarios/aluno-7");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("2024-05-06.yaml"),
        r"alunoId: aluno-7
data: 2024-05-06
autor: Marta
atualizadoEm: 2024-05-06T15:00:00Z
sono:
- id: 5f0c1d3e-8d8b-4c4e-9a57-1f0e2b9c7a10
  sleepHour: 9
  sleepMinute: 0
  wakeHour: 10
  wakeMinute: 0
  horaDormiu: '09:00'
  horaAcordou: '10:00'
  tempoTotal: '01:00'
- id: 0b8e4f52-2a39-4d55-8f0a-6c3d2e1b4a97
  sleepHour: 14
  sleepMinute: 0
  wakeHour: 14
  wakeMinute: 30
  horaDormiu: '14:00'
  horaAcordou: '14:30'
  tempoTotal: '00:30'
  salvo: false
",
    )
    .unwrap();

    let stored = directory.load(&key).unwrap().unwrap();
    assert_eq!(stored.form.sono.len(), 2);

    let mut wizard = Wizard::from_saved(stored.form);
    advance_to(&mut wizard, Step::Sono);
    assert_eq!(wizard.data().sono.len(), 2);

    wizard.next().unwrap();
    assert_eq!(wizard.data().sono.len(), 1);
    assert_eq!(wizard.data().sono[0].hora_dormiu(), "09:00");
}

#[test]
fn wake_grid_blocks_times_before_sleep() {
    let mut wizard = Wizard::new();
    let editor = wizard.sleep_editor_mut();
    editor.select_sleep_hour(hour(11));
    editor.select_sleep_minute(Minute::Thirty);

    assert!(editor.is_wake_hour_disabled(hour(10)));
    assert!(!editor.is_wake_hour_disabled(hour(11)));
    assert!(editor.is_wake_minute_disabled(Minute::Zero));
    assert!(editor.is_wake_minute_disabled(Minute::Thirty));
    assert!(!editor.is_wake_minute_disabled(Minute::FortyFive));

    assert!(!editor.select_wake_hour(hour(8)));
    assert_eq!(editor.draft().wake.to_string(), "11:45");
}
