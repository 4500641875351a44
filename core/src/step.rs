//! The monthly step: advances the estate by one month.
//!
//! `advance` is a pure function of the prior state, the response tables
//! and the configuration. Stages run in dependency order:
//!
//!   1. ratios between stocks (table inputs)
//!   2. table lookups: motivation, work capacity, birth and death rates
//!   3. feeding and health
//!   4. herd populations
//!   5. the crop cycle, processed ripe-first so an acre moves one phase
//!   6. manure
//!   7. world market and inflation
//!   8. payroll, interest and credit
//!   9. pyramid, pending contracts, history and calendar
//!
//! Stocks never go negative and ratios stay in [0, 1]. Out-of-domain
//! input is clamped, never rejected. Conditions the caller must react to
//! come back as [`StepSignal`]s.

use crate::{
    clock::next_month,
    config::SimConfig,
    state::SimState,
    table::TableSet,
    types::{Commodity, Herd},
};
use serde::{Deserialize, Serialize};

/// Things that happened this month that the game must react to or narrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum StepSignal {
    /// Payroll exceeded gold and the credit limit; gold was clamped to 0.
    Bankruptcy { shortfall: f64 },
    /// The bank covered a cash shortfall by extending the loan.
    AutomaticLoan { amount: f64 },
    DebtWarning { debt_asset: f64, supported: f64 },
    HealthExhausted { herd: Herd },
    HealthRestored { herd: Herd },
    /// A pending contract's delivery month has arrived.
    ContractDue { slot: usize },
    PyramidComplete,
}

/// Intermediate figures from one month, for advice and display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthReport {
    pub sl_per_ov:       f64,
    pub ox_per_sl:       f64,
    pub hs_per_ov:       f64,
    pub ov_eff:          f64,
    pub lash_per_sl:     f64,
    pub sl_eff:          f64,
    /// Man-hours per day the month's tasks call for.
    pub work_required:   f64,
    /// Man-hours per day the slaves can deliver.
    pub work_capacity:   f64,
    /// Fraction of the required work that got done.
    pub wk_eff:          f64,
    /// Hours per day each slave was driven.
    pub sl_labor:        f64,
    /// Fraction of the requested rations actually fed.
    pub feed_fraction:   f64,
    pub sl_fed:          f64,
    pub ox_fed:          f64,
    pub hs_fed:          f64,
    pub births:          [f64; 3],
    pub deaths:          [f64; 3],
    pub acres_sown:      f64,
    pub acres_harvested: f64,
    pub acres_lost:      f64,
    pub mn_per_acre:     f64,
    pub wheat_eaten:     f64,
    pub wheat_sown:      f64,
    pub wheat_rotted:    f64,
    pub wheat_harvested: f64,
    pub manure_made:     f64,
    pub manure_spread:   f64,
    pub payroll:         f64,
    pub interest:        f64,
    pub debt_asset:      f64,
    pub debt_supported:  f64,
    pub stones_added:    f64,
}

impl MonthReport {
    pub fn births_of(&self, herd: Herd) -> f64 { self.births[herd_index(herd)] }
    pub fn deaths_of(&self, herd: Herd) -> f64 { self.deaths[herd_index(herd)] }
}

fn herd_index(herd: Herd) -> usize {
    match herd {
        Herd::Slaves => 0,
        Herd::Oxen => 1,
        Herd::Horses => 2,
    }
}

#[derive(Debug, Clone)]
pub struct MonthOutcome {
    pub state:   SimState,
    pub report:  MonthReport,
    pub signals: Vec<StepSignal>,
}

/// `num / den`, or 0 when the denominator is not positive.
pub fn safe_ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 && num.is_finite() {
        num / den
    } else {
        0.0
    }
}

fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

fn non_neg(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, f64::MAX) }
}

/// Force every stock non-negative and every ratio into range.
/// Applied to the input (a load may bring anything in) and the output.
pub fn normalize(s: &mut SimState) {
    let month = if s.month.is_finite() { s.month.floor() as i64 } else { 1 };
    s.month = ((month - 1).rem_euclid(12) + 1) as f64;
    s.year = if s.year.is_finite() { s.year.max(1.0) } else { 1.0 };

    for v in [
        &mut s.gold, &mut s.loan, &mut s.credit_limit, &mut s.credit_lower, &mut s.interest,
        &mut s.slaves, &mut s.overseers, &mut s.ov_pay, &mut s.oxen, &mut s.horses,
        &mut s.wheat, &mut s.manure, &mut s.py_stones, &mut s.py_base, &mut s.py_height,
        &mut s.fields.fallow, &mut s.fields.sewn, &mut s.fields.grown, &mut s.fields.ripe,
        &mut s.fields.wt_sewn, &mut s.fields.wt_grown, &mut s.fields.wt_ripe,
        &mut s.controls.sl_feed_rt, &mut s.controls.ox_feed_rt, &mut s.controls.hs_feed_rt,
        &mut s.controls.ln_to_sew, &mut s.controls.mn_to_sprd, &mut s.controls.py_quota,
    ] {
        *v = non_neg(*v);
    }
    for c in Commodity::ALL {
        let m = s.markets.get_mut(c);
        m.supply = non_neg(m.supply);
        m.demand = non_neg(m.demand);
        m.production = non_neg(m.production);
        m.price = non_neg(m.price);
    }
    for v in [&mut s.sl_health, &mut s.ox_health, &mut s.hs_health, &mut s.credit_rating] {
        *v = clamp01(*v);
    }
    s.ov_press = if s.ov_press.is_nan() { 0.0 } else { s.ov_press.clamp(0.0, 10.0) };
}

/// Advance `state` by one month.
pub fn advance(state: &SimState, tables: &TableSet, config: &SimConfig) -> MonthOutcome {
    let eco = &config.economy;
    let mut prior = state.clone();
    normalize(&mut prior);
    let mut next = prior.clone();
    let mut report = MonthReport::default();
    let mut signals = Vec::new();

    // ── 1. Ratios ────────────────────────────────────────────
    let sl_per_ov = safe_ratio(prior.slaves, prior.overseers);
    let ox_per_sl = safe_ratio(prior.oxen, prior.slaves);
    let hs_per_ov = safe_ratio(prior.horses, prior.overseers);
    let mounted = tables.hs_eff.evaluate(prior.hs_health) * hs_per_ov.min(1.0);
    let ov_eff = tables.ov_eff.evaluate(mounted);
    let ov_eff_per_sl = safe_ratio(ov_eff * prior.overseers, prior.slaves);
    let lash_per_sl = safe_ratio(
        tables.stress_lash.evaluate(prior.ov_press) * prior.overseers,
        prior.slaves,
    );

    // ── 2. Lookups and work ──────────────────────────────────
    let pos_motive = tables.pos_motive.evaluate(ov_eff_per_sl);
    let neg_motive = tables.neg_motive.evaluate(lash_per_sl);
    let sl_eff = clamp01(eco.base_motive + pos_motive + neg_motive);
    let ox_eff = tables.ox_eff.evaluate(prior.ox_health);
    let ox_mult = 1.0 + (tables.ox_mult_k.evaluate(ox_per_sl) - 1.0) * ox_eff;
    let wk_able = tables.wk_able_sl.evaluate(prior.sl_health);

    // Rations are taken before anything is sown.
    let ctl = prior.controls;
    let requested = [
        prior.slaves * ctl.sl_feed_rt,
        prior.oxen * ctl.ox_feed_rt,
        prior.horses * ctl.hs_feed_rt,
    ];
    let total_requested: f64 = requested.iter().sum();
    let feed_fraction = if total_requested > prior.wheat {
        safe_ratio(prior.wheat, total_requested)
    } else {
        1.0
    };
    let eaten = (total_requested * feed_fraction).min(prior.wheat);
    let wheat_after_feed = non_neg(prior.wheat - eaten);

    let seed_per_acre = eco.wt_sewn_per_acre.max(0.0);
    let sow_target = ctl
        .ln_to_sew
        .min(prior.fields.fallow)
        .min(if seed_per_acre > 0.0 { wheat_after_feed / seed_per_acre } else { f64::MAX });
    let spread_target = if sow_target > 0.0 { ctl.mn_to_sprd.min(prior.manure) } else { 0.0 };

    let work_required = sow_target * eco.wk_sew_per_acre
        + (prior.fields.sewn + prior.fields.grown) * eco.wk_tend_per_acre
        + prior.fields.ripe * eco.wk_harvest_per_acre
        + spread_target * eco.wk_spread_per_ton
        + prior.oxen * eco.wk_ox_tend
        + prior.horses * eco.wk_hs_tend
        + ctl.py_quota * eco.wk_per_stone;
    let work_capacity = prior.slaves * wk_able * sl_eff * ox_mult;
    let wk_eff = if work_required > 0.0 {
        clamp01(work_capacity / work_required)
    } else {
        1.0
    };
    let sl_labor = safe_ratio(work_required, prior.slaves * ox_mult).min(24.0);
    let sl_sick = tables.wk_sick.evaluate(sl_labor) + tables.lash_sick.evaluate(lash_per_sl);

    next.ov_press = (prior.ov_press * (1.0 - eco.ov_relax) + eco.ov_stress_gain * (1.0 - wk_eff))
        .clamp(0.0, 10.0);

    // ── 3. Feeding and health ────────────────────────────────
    let sl_fed = ctl.sl_feed_rt * feed_fraction;
    let ox_fed = ctl.ox_feed_rt * feed_fraction;
    let hs_fed = ctl.hs_feed_rt * feed_fraction;
    if prior.slaves > 0.0 {
        next.sl_health = clamp01(prior.sl_health + tables.sl_nourish.evaluate(sl_fed) - sl_sick);
    }
    if prior.oxen > 0.0 {
        next.ox_health = clamp01(prior.ox_health + tables.ox_nourish.evaluate(ox_fed) - eco.ox_age);
    }
    if prior.horses > 0.0 {
        next.hs_health = clamp01(prior.hs_health + tables.hs_nourish.evaluate(hs_fed) - eco.hs_age);
    }
    for herd in Herd::ALL {
        if prior.herd(herd) <= 0.0 {
            continue;
        }
        let (before, after) = (prior.health(herd), next.health(herd));
        if before > 0.0 && after <= 0.0 {
            signals.push(StepSignal::HealthExhausted { herd });
        } else if before < 1.0 && after >= 1.0 {
            signals.push(StepSignal::HealthRestored { herd });
        }
    }

    // ── 4. Populations ───────────────────────────────────────
    let rates = [
        (tables.sl_brth_k.evaluate(prior.sl_health), tables.sl_dth_k.evaluate(prior.sl_health)),
        (tables.ox_brth_k.evaluate(prior.ox_health), tables.ox_dth_k.evaluate(prior.ox_health)),
        (tables.hs_brth_k.evaluate(prior.hs_health), tables.hs_dth_k.evaluate(prior.hs_health)),
    ];
    for herd in Herd::ALL {
        let i = herd_index(herd);
        let stock = prior.herd(herd);
        let (birth_k, death_k) = rates[i];
        report.births[i] = stock * birth_k;
        report.deaths[i] = stock * death_k;
        let updated = non_neg(stock + report.births[i] - report.deaths[i]);
        match herd {
            Herd::Slaves => next.slaves = updated,
            Herd::Oxen => next.oxen = updated,
            Herd::Horses => next.horses = updated,
        }
    }

    // ── 5. Crop cycle ────────────────────────────────────────
    let f = prior.fields;
    let mut returned = 0.0;

    let harvested = f.ripe * wk_eff;
    let harvest_share = safe_ratio(harvested, f.ripe);
    let wheat_harvested = f.wt_ripe * harvest_share * tables.season_yield.evaluate(prior.month);
    let lost = (f.ripe - harvested) * clamp01(eco.ripe_spoil_rt);
    returned += harvested + lost;
    next.fields.ripe = non_neg(f.ripe - harvested - lost);
    next.fields.wt_ripe =
        non_neg(f.wt_ripe * (1.0 - harvest_share) * (1.0 - clamp01(eco.ripe_spoil_rt)));

    let ripening = f.grown * clamp01(eco.ripen_fraction);
    let wt_ripening = f.wt_grown * clamp01(eco.ripen_fraction);
    next.fields.ripe += ripening;
    next.fields.wt_ripe += wt_ripening;
    next.fields.grown = non_neg(f.grown - ripening);
    next.fields.wt_grown = non_neg(f.wt_grown - wt_ripening);

    let growing = f.sewn * clamp01(eco.grow_fraction);
    let wt_growing = f.wt_sewn * clamp01(eco.grow_fraction);
    next.fields.grown += growing;
    next.fields.wt_grown += wt_growing;
    next.fields.sewn = non_neg(f.sewn - growing);
    next.fields.wt_sewn = non_neg(f.wt_sewn - wt_growing);

    let acres_sown = sow_target * wk_eff;
    let manure_spread = spread_target * wk_eff;
    let mn_per_acre = safe_ratio(manure_spread, acres_sown);
    let wheat_sown = (acres_sown * seed_per_acre).min(wheat_after_feed);
    next.fields.sewn += acres_sown;
    next.fields.wt_sewn += acres_sown * tables.wt_yield.evaluate(mn_per_acre);
    next.fields.fallow = non_neg(f.fallow - acres_sown) + returned;

    let stored = non_neg(wheat_after_feed - wheat_sown);
    let wheat_rotted = stored * clamp01(eco.wt_rot_rt);
    next.wheat = non_neg(stored - wheat_rotted + wheat_harvested);

    // ── 6. Manure ────────────────────────────────────────────
    let manure_made = prior.slaves * eco.mn_per_slave
        + prior.oxen * eco.mn_per_ox
        + prior.horses * eco.mn_per_horse;
    let heap = non_neg(prior.manure - manure_spread);
    next.manure = non_neg(heap - heap * clamp01(eco.mn_rot_rt) + manure_made);

    // ── 7. Market ────────────────────────────────────────────
    let growth = (1.0 + prior.markets.world_growth).max(0.0).powf(1.0 / 12.0);
    let inflate = (1.0 + prior.inflation).max(0.0);
    let gain = config.market.price_gain;
    for c in Commodity::ALL {
        let m = next.markets.get_mut(c);
        m.supply = non_neg(m.supply + (m.production - m.demand) / 12.0) * growth;
        m.demand *= growth;
        m.production *= growth;
        let pressure = if m.supply > 0.0 {
            ((m.demand / 12.0 - m.supply) / m.supply).clamp(-1.0, 1.0)
        } else {
            1.0
        };
        m.price = (m.price * (1.0 + gain * pressure) * inflate).max(config.market.price_floor);
    }
    next.ov_pay = non_neg(prior.ov_pay * inflate);

    // ── 8. Finance ───────────────────────────────────────────
    let fin = &config.finance;
    let payroll = prior.overseers * prior.ov_pay;
    let rate = (prior.interest + (1.0 - prior.credit_rating) * fin.credit_penalty_pct) / 100.0;
    let interest = prior.loan * rate.max(0.0);
    next.loan = prior.loan + interest;
    next.gold = prior.gold - payroll;
    if next.gold < 0.0 {
        let shortfall = -next.gold;
        next.gold = 0.0;
        if next.loan + shortfall <= prior.credit_limit {
            next.loan += shortfall;
            signals.push(StepSignal::AutomaticLoan { amount: shortfall });
        } else {
            log::warn!("bankrupt: short {shortfall:.0} gold with loan at {:.0}", next.loan);
            signals.push(StepSignal::Bankruptcy { shortfall });
        }
    }

    let assets = next.assets();
    let debt_asset = safe_ratio(next.loan, assets);
    let supported = tables.debt_support.evaluate(prior.credit_rating);
    next.credit_rating = if next.loan > 0.0 && (assets <= 0.0 || debt_asset > supported) {
        clamp01(prior.credit_rating - fin.rating_drop)
    } else {
        clamp01(prior.credit_rating + fin.rating_recovery)
    };
    let supported_now = tables.debt_support.evaluate(next.credit_rating);
    next.credit_limit = next.credit_lower.max(supported_now * non_neg(assets));
    if next.loan > 0.0 && debt_asset > fin.debt_warning_fraction * supported {
        signals.push(StepSignal::DebtWarning { debt_asset, supported });
    }

    // ── 9. Pyramid, contracts, history, calendar ─────────────
    let stones_added = ctl.py_quota * wk_eff;
    next.py_stones = prior.py_stones + stones_added;
    next.py_height = pyramid_height(next.py_stones, prior.py_base);
    let apex = prior.py_base.floor();
    if apex >= 1.0 && pyramid_height(prior.py_stones, prior.py_base) < apex && next.py_height >= apex {
        signals.push(StepSignal::PyramidComplete);
    }

    for (slot, contract) in next.pending.iter_mut().enumerate() {
        if contract.is_active() && contract.months_left > 0 {
            contract.months_left -= 1;
            if contract.months_left == 0 {
                signals.push(StepSignal::ContractDue { slot });
            }
        }
    }

    next.history.wheat = prior.wheat;
    next.history.slaves = prior.slaves;
    next.history.horses = prior.horses;
    next.history.oxen = prior.oxen;
    next.history.manure = prior.manure;
    next.history.gold = prior.gold;

    let (month, year) = next_month(prior.month, prior.year);
    next.month = month;
    next.year = year;

    normalize(&mut next);

    report = MonthReport {
        sl_per_ov,
        ox_per_sl,
        hs_per_ov,
        ov_eff,
        lash_per_sl,
        sl_eff,
        work_required,
        work_capacity,
        wk_eff,
        sl_labor,
        feed_fraction,
        sl_fed,
        ox_fed,
        hs_fed,
        acres_sown,
        acres_harvested: harvested,
        acres_lost: lost,
        mn_per_acre,
        wheat_eaten: eaten,
        wheat_sown,
        wheat_rotted,
        wheat_harvested,
        manure_made,
        manure_spread,
        payroll,
        interest,
        debt_asset,
        debt_supported: supported,
        stones_added,
        ..report
    };

    log::debug!(
        "month {}/{}: wk_eff={:.3} feed={:.3} slaves={:.1} wheat={:.1} gold={:.0} loan={:.0}",
        prior.month, prior.year, wk_eff, feed_fraction, next.slaves, next.wheat, next.gold, next.loan
    );

    MonthOutcome { state: next, report, signals }
}

/// Height of a square pyramid with `base` stones on a side, built from
/// `stones`: complete layers plus the filled fraction of the next one.
/// Closed form, so the cost does not grow with the base.
pub fn pyramid_height(stones: f64, base: f64) -> f64 {
    let n = base.floor();
    if !(n >= 1.0) {
        return 0.0;
    }
    let stones = if stones.is_nan() { 0.0 } else { stones.max(0.0) };

    let total = stacked_stones(n);
    if !total.is_finite() {
        // Too wide to total in f64; every layer laid so far is full width.
        let height = stones / (n * n);
        return if height.is_nan() { 0.0 } else { height.min(n) };
    }
    let unbuilt = total - stones;
    if unbuilt <= 0.0 {
        return n;
    }

    // Side of the next layer: the smallest m whose m-layer pyramid holds
    // at least the unbuilt stones. m^3/3 < stacked_stones(m) < (m+1)^3/3,
    // so the cube-root estimate is within a step or two.
    let mut m = (3.0 * unbuilt).cbrt().ceil().clamp(1.0, n);
    for _ in 0..4 {
        if m > 1.0 && stacked_stones(m - 1.0) >= unbuilt { m -= 1.0 } else { break }
    }
    for _ in 0..4 {
        if m < n && stacked_stones(m) < unbuilt { m += 1.0 } else { break }
    }
    let partial = ((stacked_stones(m) - unbuilt) / (m * m)).clamp(0.0, 1.0);
    (n - m + partial).clamp(0.0, n)
}

/// Stones in a complete square pyramid `side` stones wide at the base.
fn stacked_stones(side: f64) -> f64 {
    side * (side + 1.0) * (2.0 * side + 1.0) / 6.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_ratio_guards_zero_denominator() {
        assert_eq!(safe_ratio(5.0, 0.0), 0.0);
        assert_eq!(safe_ratio(5.0, -1.0), 0.0);
        assert_eq!(safe_ratio(6.0, 3.0), 2.0);
    }

    #[test]
    fn pyramid_layers_fill_from_the_base() {
        assert_eq!(pyramid_height(0.0, 3.0), 0.0);
        assert_eq!(pyramid_height(9.0, 3.0), 1.0);
        assert_eq!(pyramid_height(11.0, 3.0), 1.5);
        assert_eq!(pyramid_height(14.0, 3.0), 3.0);
        assert_eq!(pyramid_height(100.0, 3.0), 3.0);
        assert_eq!(pyramid_height(50.0, 0.5), 0.0);
        assert_eq!(pyramid_height(f64::NAN, 3.0), 0.0);
    }

    #[test]
    fn pyramid_height_matches_layer_by_layer_count() {
        for base in [1.0, 2.0, 7.0, 40.0, 300.0] {
            let total = stacked_stones(base);
            let mut stones = 0.0;
            while stones <= total {
                let mut side = base;
                let mut remaining = stones;
                let mut expected = 0.0;
                while side >= 1.0 && remaining >= side * side {
                    remaining -= side * side;
                    expected += 1.0;
                    side -= 1.0;
                }
                if side >= 1.0 {
                    expected += remaining / (side * side);
                }
                let got = pyramid_height(stones, base);
                assert!((got - expected).abs() < 1e-9, "base {base} stones {stones}: {got} vs {expected}");
                stones += (total / 97.0).max(1.0).floor();
            }
        }
    }

    #[test]
    fn pyramid_height_is_bounded_for_huge_inputs() {
        assert_eq!(pyramid_height(1e300, 1e17), 1e17);
        let h = pyramid_height(f64::INFINITY, f64::MAX);
        assert!(h.is_finite() && h >= 0.0);
        let h = pyramid_height(1e20, 1e200);
        assert!(h.is_finite() && h >= 0.0 && h < 1.0);
        let h = pyramid_height(3.0e9, 1e9);
        assert!(h.is_finite() && (0.0..=1e9).contains(&h));
    }

    #[test]
    fn normalize_wraps_month_and_clamps_ratios() {
        let mut s = SimState { month: 14.0, sl_health: 1.7, wheat: -3.0, ..SimState::default() };
        s.ov_press = f64::NAN;
        normalize(&mut s);
        assert_eq!(s.month, 2.0);
        assert_eq!(s.sl_health, 1.0);
        assert_eq!(s.wheat, 0.0);
        assert_eq!(s.ov_press, 0.0);
    }
}
