//! The daily log record and its answer enumerations.

use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::sleep::SleepPeriod;

/// How well a meal was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Refeicao {
    /// Ate everything.
    #[default]
    Otimo,
    /// Ate most of it.
    Bom,
    /// Ate some of it.
    Regular,
    /// Refused the meal.
    NaoAceitou,
    /// The meal was not offered.
    NaoSeAplica,
}

impl Refeicao {
    /// Every answer, in presentation order.
    pub const ALL: [Self; 5] = [
        Self::Otimo,
        Self::Bom,
        Self::Regular,
        Self::NaoAceitou,
        Self::NaoSeAplica,
    ];
}

impl fmt::Display for Refeicao {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Otimo => "Ótimo",
            Self::Bom => "Bom",
            Self::Regular => "Regular",
            Self::NaoAceitou => "Não aceitou",
            Self::NaoSeAplica => "Não se aplica",
        })
    }
}

/// Bowel movement quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Evacuacao {
    /// Normal.
    #[default]
    Normal,
    /// Liquid.
    Liquida,
    /// Hard.
    Dura,
    /// No bowel movement.
    NaoEvacuou,
}

impl Evacuacao {
    /// Every answer, in presentation order.
    pub const ALL: [Self; 4] = [Self::Normal, Self::Liquida, Self::Dura, Self::NaoEvacuou];
}

impl fmt::Display for Evacuacao {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "Normal",
            Self::Liquida => "Líquida",
            Self::Dura => "Dura",
            Self::NaoEvacuou => "Não evacuou",
        })
    }
}

/// Mood over the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Disposicao {
    /// Normal.
    #[default]
    Normal,
    /// Agitated.
    Agitado,
    /// Calm.
    Calmo,
    /// Sleepy.
    Sonolento,
    /// Tired.
    Cansado,
}

impl Disposicao {
    /// Every answer, in presentation order.
    pub const ALL: [Self; 5] = [
        Self::Normal,
        Self::Agitado,
        Self::Calmo,
        Self::Sonolento,
        Self::Cansado,
    ];
}

impl fmt::Display for Disposicao {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "Normal",
            Self::Agitado => "Agitado",
            Self::Calmo => "Calmo",
            Self::Sonolento => "Sonolento",
            Self::Cansado => "Cansado",
        })
    }
}

/// An item the family is asked to send in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemRequisitado {
    /// Diapers.
    Fralda,
    /// Wet wipes.
    LencoUmedecido,
    /// Ointment.
    Pomada,
    /// Milk.
    Leite,
    /// Toothbrush.
    EscovaDeDente,
    /// Toothpaste.
    CremeDental,
}

impl ItemRequisitado {
    /// Every item, in presentation order.
    pub const ALL: [Self; 6] = [
        Self::Fralda,
        Self::LencoUmedecido,
        Self::Pomada,
        Self::Leite,
        Self::EscovaDeDente,
        Self::CremeDental,
    ];
}

impl fmt::Display for ItemRequisitado {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Fralda => "Fralda",
            Self::LencoUmedecido => "Lenço umedecido",
            Self::Pomada => "Pomada",
            Self::Leite => "Leite",
            Self::EscovaDeDente => "Escova de dente",
            Self::CremeDental => "Creme dental",
        })
    }
}

/// The four meals asked about in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Meal {
    /// Breakfast.
    CafeDaManha,
    /// Lunch.
    Almoco,
    /// Afternoon snack.
    LancheDaTarde,
    /// Milk bottle.
    Leite,
}

impl Meal {
    /// Every meal, in the order the wizard asks about them.
    pub const ALL: [Self; 4] = [Self::CafeDaManha, Self::Almoco, Self::LancheDaTarde, Self::Leite];
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::CafeDaManha => "Café da manhã",
            Self::Almoco => "Almoço",
            Self::LancheDaTarde => "Lanche da tarde",
            Self::Leite => "Leite",
        })
    }
}

/// The draft of one day's log for one student.
///
/// Every field has a default, so a saved record carrying only some of the
/// fields still loads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiarioFormData {
    /// Breakfast.
    pub cafe_da_manha: Refeicao,
    /// Lunch.
    pub almoco: Refeicao,
    /// Afternoon snack.
    pub lanche_da_tarde: Refeicao,
    /// Milk.
    pub leite: Refeicao,
    /// Bowel movement.
    pub evacuacao: Evacuacao,
    /// Mood.
    pub disposicao: Disposicao,
    /// Sleep periods, in the order they were added.
    pub sono: Vec<SleepPeriod>,
    /// Items to send in.
    pub itens_requisitados: BTreeSet<ItemRequisitado>,
    /// Free-text notes.
    pub observacoes: String,
}

impl DiarioFormData {
    /// The answer recorded for a meal.
    #[must_use]
    pub const fn meal(&self, meal: Meal) -> Refeicao {
        match meal {
            Meal::CafeDaManha => self.cafe_da_manha,
            Meal::Almoco => self.almoco,
            Meal::LancheDaTarde => self.lanche_da_tarde,
            Meal::Leite => self.leite,
        }
    }

    /// Mutable access to the answer for a meal.
    pub const fn meal_mut(&mut self, meal: Meal) -> &mut Refeicao {
        match meal {
            Meal::CafeDaManha => &mut self.cafe_da_manha,
            Meal::Almoco => &mut self.almoco,
            Meal::LancheDaTarde => &mut self.lanche_da_tarde,
            Meal::Leite => &mut self.leite,
        }
    }
}

/// A submitted daily log, as kept by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diario {
    /// The student this log is about.
    pub aluno_id: String,
    /// The day being logged.
    pub data: NaiveDate,
    /// Display name of whoever submitted the log.
    pub autor: String,
    /// When the log was last written.
    pub atualizado_em: DateTime<Utc>,
    /// The answers.
    #[serde(flatten)]
    pub form: DiarioFormData,
}

impl Diario {
    /// Wraps completed answers into a record stamped with the current time.
    #[must_use]
    pub fn new(aluno_id: String, data: NaiveDate, autor: String, form: DiarioFormData) -> Self {
        Self {
            aluno_id,
            data,
            autor,
            atualizado_em: Utc::now(),
            form,
        }
    }
}
