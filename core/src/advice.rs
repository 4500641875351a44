//! The overseer's assessment of the estate after a month.
//!
//! Each category has a good and a bad verdict. Message codes pair up:
//! the bad code is the good code with its low bit set.

use crate::{state::SimState, step::MonthReport, table::TableSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    OxenFed,
    SlavesFed,
    HorsesFed,
    Overseers,
    OverseerStress,
    ManurePerAcre,
    SlaveHealth,
    OxenHealth,
    HorseHealth,
    Credit,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::OxenFed,
        Category::SlavesFed,
        Category::HorsesFed,
        Category::Overseers,
        Category::OverseerStress,
        Category::ManurePerAcre,
        Category::SlaveHealth,
        Category::OxenHealth,
        Category::HorseHealth,
        Category::Credit,
    ];

    /// Message code of the good verdict.
    pub fn base_code(&self) -> u32 {
        2000 + 10 * *self as u32
    }

    fn phrases(&self) -> (&'static str, &'static str) {
        match self {
            Self::OxenFed => ("The oxen look well fed.", "The oxen look poorly fed."),
            Self::SlavesFed => ("The slaves look well fed.", "The slaves don't look well fed."),
            Self::HorsesFed => ("The horses look well fed.", "The horses don't look well fed."),
            Self::Overseers => ("There are plenty of overseers.", "There are not enough overseers."),
            Self::OverseerStress => ("The overseers are at ease.", "The overseers are under stress."),
            Self::ManurePerAcre => ("The fields are well manured.", "There is not enough manure per acre."),
            Self::SlaveHealth => ("The slaves look healthy.", "The slaves look sick."),
            Self::OxenHealth => ("The oxen look healthy.", "The oxen look sick."),
            Self::HorseHealth => ("The horses look healthy.", "The horses look sick."),
            Self::Credit => ("Your credit rating is good.", "Your credit rating is bad."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    pub category: Category,
    pub good:     bool,
    pub code:     u32,
    pub phrase:   &'static str,
}

impl Advice {
    fn new(category: Category, good: bool) -> Self {
        let (good_phrase, bad_phrase) = category.phrases();
        Self {
            category,
            good,
            code: category.base_code() | (!good) as u32,
            phrase: if good { good_phrase } else { bad_phrase },
        }
    }
}

/// Thresholds for a good verdict.
const WELL_FED: f64 = 0.0;
const HEALTHY: f64 = 0.6;
const MAX_SLAVES_PER_OVERSEER: f64 = 20.0;
const MAX_CALM_PRESSURE: f64 = 2.0;
const GOOD_CREDIT: f64 = 0.7;

/// Judge every category from the month just closed.
///
/// Feeding is judged by whether the ration delivered improves health, so
/// the verdict follows the nourishment tables. Manure is judged against
/// the dressing that gives the best yield.
pub fn assess(state: &SimState, report: &MonthReport, tables: &TableSet) -> Vec<Advice> {
    let best_dressing = best_input(&tables.wt_yield);

    Category::ALL
        .into_iter()
        .map(|category| {
            let good = match category {
                Category::OxenFed => tables.ox_nourish.evaluate(report.ox_fed) > WELL_FED,
                Category::SlavesFed => tables.sl_nourish.evaluate(report.sl_fed) > WELL_FED,
                Category::HorsesFed => tables.hs_nourish.evaluate(report.hs_fed) > WELL_FED,
                Category::Overseers => {
                    state.slaves <= 0.0
                        || (report.sl_per_ov > 0.0 && report.sl_per_ov <= MAX_SLAVES_PER_OVERSEER)
                }
                Category::OverseerStress => state.ov_press <= MAX_CALM_PRESSURE,
                Category::ManurePerAcre => {
                    report.acres_sown <= 0.0 || report.mn_per_acre >= 0.5 * best_dressing
                }
                Category::SlaveHealth => state.sl_health >= HEALTHY,
                Category::OxenHealth => state.ox_health >= HEALTHY,
                Category::HorseHealth => state.hs_health >= HEALTHY,
                Category::Credit => state.credit_rating >= GOOD_CREDIT,
            };
            Advice::new(category, good)
        })
        .collect()
}

/// Input at which a table reaches its largest sample.
fn best_input(table: &crate::table::InterpolationTable) -> f64 {
    let samples = table.samples();
    let mut best = 0;
    for (i, v) in samples.iter().enumerate() {
        if *v > samples[best] {
            best = i;
        }
    }
    table.input_min() + (table.input_max() - table.input_min()) * best as f64 / 10.0
}
