//! The saved simulation state: every stock, ratio, control and market
//! figure that survives from one month to the next.
//!
//! Ratios (`*_health`, `credit_rating`) stay in [0, 1]; stocks never go
//! negative. The step engine enforces both; a load may bring anything in,
//! and the next step clamps it back.

use crate::{
    records::{make_players, Contract, Player, MAX_OFFERS, MAX_PENDING, MAX_PLAYERS},
    rng::SubsystemRng,
    types::{Commodity, Herd},
};
use serde::{Deserialize, Serialize};

/// Per-commodity market figures. `demand` and `production` are yearly
/// flows; `supply` is what the market currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub supply:     f64,
    pub demand:     f64,
    pub production: f64,
    pub price:      f64,
}

impl Market {
    fn seeded(supply: f64, flow: f64, price: f64) -> Self {
        Self { supply, demand: flow, production: flow, price }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Markets {
    /// Yearly growth of world supply, demand and production.
    pub world_growth: f64,
    pub wheat:  Market,
    pub slaves: Market,
    pub oxen:   Market,
    pub horses: Market,
    pub manure: Market,
    pub land:   Market,
}

impl Markets {
    pub fn get(&self, c: Commodity) -> &Market {
        match c {
            Commodity::Wheat => &self.wheat,
            Commodity::Slaves => &self.slaves,
            Commodity::Oxen => &self.oxen,
            Commodity::Horses => &self.horses,
            Commodity::Manure => &self.manure,
            Commodity::Land => &self.land,
        }
    }

    pub fn get_mut(&mut self, c: Commodity) -> &mut Market {
        match c {
            Commodity::Wheat => &mut self.wheat,
            Commodity::Slaves => &mut self.slaves,
            Commodity::Oxen => &mut self.oxen,
            Commodity::Horses => &mut self.horses,
            Commodity::Manure => &mut self.manure,
            Commodity::Land => &mut self.land,
        }
    }
}

impl Default for Markets {
    fn default() -> Self {
        Self {
            world_growth: 0.05,
            wheat:  Market::seeded(1e6, 1e7, 5.0),
            slaves: Market::seeded(1e3, 1e4, 500.0),
            oxen:   Market::seeded(1e4, 1e5, 90.0),
            horses: Market::seeded(1e4, 1e5, 100.0),
            manure: Market::seeded(1e4, 1e5, 20.0),
            land:   Market::seeded(1e2, 1e3, 8000.0),
        }
    }
}

/// Acres in each phase of the crop cycle and the wheat each cohort
/// is expected to yield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Fields {
    pub fallow:   f64,
    pub sewn:     f64,
    pub grown:    f64,
    pub ripe:     f64,
    pub wt_sewn:  f64,
    pub wt_grown: f64,
    pub wt_ripe:  f64,
}

impl Fields {
    pub fn total_acres(&self) -> f64 {
        self.fallow + self.sewn + self.grown + self.ripe
    }
}

/// Settings chosen by the player before each month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Controls {
    /// Bushels per slave per month.
    pub sl_feed_rt: f64,
    /// Bushels per ox per month.
    pub ox_feed_rt: f64,
    /// Bushels per horse per month.
    pub hs_feed_rt: f64,
    /// Acres to sow this month.
    pub ln_to_sew:  f64,
    /// Tons of manure to spread this month.
    pub mn_to_sprd: f64,
    /// Stones to add to the pyramid per month.
    pub py_quota:   f64,
}

impl Controls {
    pub fn feed_rate(&self, herd: Herd) -> f64 {
        match herd {
            Herd::Slaves => self.sl_feed_rt,
            Herd::Oxen => self.ox_feed_rt,
            Herd::Horses => self.hs_feed_rt,
        }
    }
}

/// Last month's stock values, kept for trend display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct History {
    pub wheat:  f64,
    pub slaves: f64,
    pub horses: f64,
    pub oxen:   f64,
    pub manure: f64,
    pub gold:   f64,
}

/// Seat index of each rival personality in `players`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rivals {
    pub banker:   f64,
    pub good_guy: f64,
    pub bad_guy:  f64,
    pub dumb_guy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    // ── Calendar ─────────────────────────────────────
    pub month: f64,
    pub year:  f64,

    // ── Treasury and credit ──────────────────────────
    pub gold:          f64,
    pub loan:          f64,
    pub credit_limit:  f64,
    pub credit_lower:  f64,
    pub credit_rating: f64,
    /// Monthly interest on the loan, in percent. Set at game start and
    /// not carried in saves.
    pub interest:      f64,

    // ── Labor and herds ──────────────────────────────
    pub slaves:    f64,
    pub sl_health: f64,
    pub overseers: f64,
    /// Production pressure felt by the overseers, 0..=10.
    pub ov_press:  f64,
    pub ov_pay:    f64,
    pub oxen:      f64,
    pub ox_health: f64,
    pub horses:    f64,
    pub hs_health: f64,

    // ── Land and stores ──────────────────────────────
    pub fields: Fields,
    pub wheat:  f64,
    pub manure: f64,

    // ── Pyramid ──────────────────────────────────────
    pub py_stones: f64,
    pub py_base:   f64,
    pub py_height: f64,

    pub controls:  Controls,
    pub history:   History,
    pub markets:   Markets,
    pub inflation: f64,
    pub rivals:    Rivals,

    pub offers:  [Contract; MAX_OFFERS],
    pub pending: [Contract; MAX_PENDING],
    pub players: [Player; MAX_PLAYERS],
}

impl Default for SimState {
    /// A fresh estate: empty stores, full health, default market.
    fn default() -> Self {
        Self {
            month: 1.0,
            year:  1.0,
            gold:          0.0,
            loan:          0.0,
            credit_limit:  50_000.0,
            credit_lower:  50_000.0,
            credit_rating: 1.0,
            interest:      0.5,
            slaves:    0.0,
            sl_health: 1.0,
            overseers: 0.0,
            ov_press:  0.0,
            ov_pay:    300.0,
            oxen:      0.0,
            ox_health: 1.0,
            horses:    0.0,
            hs_health: 1.0,
            fields: Fields::default(),
            wheat:  0.0,
            manure: 0.0,
            py_stones: 0.0,
            py_base:   300.0,
            py_height: 0.0,
            controls:  Controls::default(),
            history:   History::default(),
            markets:   Markets::default(),
            inflation: 0.001,
            rivals:    Rivals::default(),
            offers:  [Contract::default(); MAX_OFFERS],
            pending: [Contract::default(); MAX_PENDING],
            players: [Player::default(); MAX_PLAYERS],
        }
    }
}

impl SimState {
    /// Start a new game: defaults plus a freshly seated table of rivals.
    pub fn new_game(rng: &mut SubsystemRng) -> Self {
        let (players, seats) = make_players(rng);
        Self {
            players,
            rivals: Rivals {
                banker:   seats[0] as f64,
                good_guy: seats[1] as f64,
                bad_guy:  seats[2] as f64,
                dumb_guy: seats[3] as f64,
            },
            ..Self::default()
        }
    }

    pub fn herd(&self, herd: Herd) -> f64 {
        match herd {
            Herd::Slaves => self.slaves,
            Herd::Oxen => self.oxen,
            Herd::Horses => self.horses,
        }
    }

    pub fn health(&self, herd: Herd) -> f64 {
        match herd {
            Herd::Slaves => self.sl_health,
            Herd::Oxen => self.ox_health,
            Herd::Horses => self.hs_health,
        }
    }

    /// Market value of everything the pharaoh owns, before debt.
    pub fn assets(&self) -> f64 {
        let m = &self.markets;
        self.gold
            + self.wheat * m.wheat.price
            + self.slaves * m.slaves.price
            + self.oxen * m.oxen.price
            + self.horses * m.horses.price
            + self.manure * m.manure.price
            + self.fields.total_acres() * m.land.price
    }

    pub fn net_worth(&self) -> f64 {
        self.assets() - self.loan
    }
}
