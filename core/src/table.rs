//! Piecewise-linear response curves.
//!
//! Every nonlinear relationship in the monthly step (birth and death
//! rates, nourishment, efficiency, motivation, yield) is one of these
//! tables. A table samples its curve at 11 evenly spaced inputs across
//! `[input_min, input_max]`; inputs outside the range are clamped.

/// Number of samples in every table.
pub const TABLE_SAMPLES: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationTable {
    input_min: f64,
    input_max: f64,
    samples:   [f64; TABLE_SAMPLES],
}

impl InterpolationTable {
    /// Build a table. Panics if the input range is empty or inverted;
    /// tables are fixed domain data built once at start-up.
    pub fn new(input_min: f64, input_max: f64, samples: [f64; TABLE_SAMPLES]) -> Self {
        assert!(input_max > input_min, "interpolation table needs input_max > input_min");
        Self { input_min, input_max, samples }
    }

    pub fn input_min(&self) -> f64 { self.input_min }
    pub fn input_max(&self) -> f64 { self.input_max }
    pub fn samples(&self) -> &[f64; TABLE_SAMPLES] { &self.samples }

    /// Evaluate the curve at `x`, clamping `x` into the table's domain.
    /// A NaN input evaluates as `input_min`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let x = if x.is_nan() { self.input_min } else { x.clamp(self.input_min, self.input_max) };
        let last = (TABLE_SAMPLES - 1) as f64;
        let t = (x - self.input_min) / (self.input_max - self.input_min) * last;
        let i = t.floor();
        let idx = i as usize;
        if idx >= TABLE_SAMPLES - 1 {
            return self.samples[TABLE_SAMPLES - 1];
        }
        let frac = t - i;
        self.samples[idx] * (1.0 - frac) + self.samples[idx + 1] * frac
    }
}

/// The fixed set of curves the monthly step reads.
/// Names follow the estate's variable vocabulary: `sl` slaves, `ox` oxen,
/// `hs` horses, `ov` overseers, `wt` wheat, `mn` manure, `wk` work.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSet {
    /// Supportable debt/asset ratio, by credit rating.
    pub debt_support: InterpolationTable,
    /// Fraction of horses born per month, by horse health.
    pub hs_brth_k:    InterpolationTable,
    /// Fraction of horses dying per month, by horse health.
    pub hs_dth_k:     InterpolationTable,
    /// Horse effectiveness at carrying overseers, by horse health.
    pub hs_eff:       InterpolationTable,
    /// Monthly change in horse health, by bushels fed per horse.
    pub hs_nourish:   InterpolationTable,
    /// Monthly slave health lost to lashing, by lashes per slave.
    pub lash_sick:    InterpolationTable,
    /// Slave motivation from fear, by lashes per slave.
    pub neg_motive:   InterpolationTable,
    /// Overseer efficiency, by mounted fraction.
    pub ov_eff:       InterpolationTable,
    /// Fraction of oxen born per month, by oxen health.
    pub ox_brth_k:    InterpolationTable,
    /// Fraction of oxen dying per month, by oxen health.
    pub ox_dth_k:     InterpolationTable,
    /// Oxen effectiveness at field work, by oxen health.
    pub ox_eff:       InterpolationTable,
    /// Labor multiplier from oxen, by oxen per slave.
    pub ox_mult_k:    InterpolationTable,
    /// Monthly change in oxen health, by bushels fed per ox.
    pub ox_nourish:   InterpolationTable,
    /// Slave motivation from supervision, by overseer efficiency per slave.
    pub pos_motive:   InterpolationTable,
    /// Harvest factor by calendar month.
    pub season_yield: InterpolationTable,
    /// Fraction of slaves born per month, by slave health.
    pub sl_brth_k:    InterpolationTable,
    /// Fraction of slaves dying per month, by slave health.
    pub sl_dth_k:     InterpolationTable,
    /// Monthly change in slave health, by bushels fed per slave.
    pub sl_nourish:   InterpolationTable,
    /// Lashes per overseer per month, by overseer pressure.
    pub stress_lash:  InterpolationTable,
    /// Man-hours per day a slave can work, by slave health.
    pub wk_able_sl:   InterpolationTable,
    /// Monthly slave health lost to workload, by hours per day.
    pub wk_sick:      InterpolationTable,
    /// Bushels yielded per acre sown, by tons of manure per acre.
    pub wt_yield:     InterpolationTable,
}

impl TableSet {
    pub fn standard() -> Self {
        use InterpolationTable as T;
        Self {
            debt_support: T::new(0.0, 1.0, [0.0, 0.5, 0.7, 0.75, 0.8, 0.9, 1.0, 1.3, 1.7, 2.3, 3.0]),
            hs_brth_k:    T::new(0.0, 1.0, [0.0, 0.0012, 0.0027, 0.0045, 0.001, 0.02, 0.04, 0.05, 0.06, 0.065, 0.07]),
            hs_dth_k:     T::new(0.0, 1.0, [1.0, 0.5, 0.245, 0.065, 0.03, 0.02, 0.01, 0.01, 0.008, 0.007, 0.005]),
            hs_eff:       T::new(0.0, 1.0, [0.0, 0.0, 0.015, 0.065, 0.190, 0.660, 0.835, 0.930, 0.99, 1.0, 1.0]),
            hs_nourish:   T::new(0.0, 75.0, [-1.0, -0.1, -0.046, 0.0, 0.0695, 0.079, 0.0865, 0.092, 0.0965, 0.099, 0.1]),
            lash_sick:    T::new(0.0, 100.0, [0.0, 0.01, 0.03, 0.05, 0.1, 0.15, 0.2, 0.25, 0.3, 0.6, 1.0]),
            neg_motive:   T::new(0.0, 100.0, [0.0, 0.1, 0.2, 0.3, 0.35, 0.38, 0.42, 0.45, 0.47, 0.48, 0.5]),
            ov_eff:       T::new(0.0, 1.0, [0.3, 0.44, 0.58, 0.681, 0.762, 0.825, 0.884, 0.930, 0.965, 0.983, 0.997]),
            ox_brth_k:    T::new(0.0, 1.0, [0.0, 0.0009, 0.00285, 0.00795, 0.0159, 0.0280, 0.0380, 0.05, 0.06, 0.065, 0.07]),
            ox_dth_k:     T::new(0.0, 1.0, [1.0, 0.5, 0.216, 0.0959, 0.0559, 0.031, 0.021, 0.01, 0.009, 0.005, 0.004]),
            ox_eff:       T::new(0.0, 1.0, [0.0, 0.2, 0.1, 0.23, 0.4, 0.7, 0.87, 0.94, 0.965, 0.985, 1.0]),
            ox_mult_k:    T::new(0.0, 1.0, [1.0, 1.44, 1.89, 2.27, 2.65, 3.0, 3.27, 3.5, 3.72, 3.88, 4.0]),
            ox_nourish:   T::new(0.0, 100.0, [-1.0, -0.1, -0.0055, 0.0, 0.044, 0.068, 0.0825, 0.0915, 0.0960, 0.0980, 0.1]),
            pos_motive:   T::new(0.0, 0.1, [0.0, 0.1, 0.2, 0.3, 0.4, 0.45, 0.52, 0.6, 0.63, 0.66, 0.7]),
            season_yield: T::new(1.0, 12.0, [0.2, 0.35, 0.5, 0.8, 1.0, 1.5, 1.0, 0.8, 0.55, 0.4, 0.25]),
            sl_brth_k:    T::new(0.0, 1.0, [0.0, 0.0021, 0.007, 0.0161, 0.0364, 0.0644, 0.0980, 0.121, 0.134, 0.139, 0.14]),
            sl_dth_k:     T::new(0.0, 1.0, [1.0, 0.485, 0.235, 0.135, 0.0855, 0.0605, 0.0405, 0.0255, 0.0155, 0.0105, 0.002]),
            sl_nourish:   T::new(0.0, 10.0, [-1.0, -0.5, -0.185, 0.036, 0.0565, 0.074, 0.0865, 0.098, 0.12, 0.25, 0.18]),
            stress_lash:  T::new(0.0, 10.0, [0.0, 20.0, 80.0, 150.0, 300.0, 500.0, 600.0, 700.0, 800.0, 900.0, 1000.0]),
            wk_able_sl:   T::new(0.0, 1.0, [0.0, 1.0, 5.0, 10.0, 14.0, 15.0, 17.0, 18.0, 19.0, 19.5, 20.0]),
            wk_sick:      T::new(0.0, 24.0, [0.0, 0.0005, 0.0015, 0.002, 0.005, 0.015, 0.03, 0.1, 0.25, 0.5, 1.0]),
            wt_yield:     T::new(0.0, 10.0, [20.0, 35.0, 70.0, 100.0, 150.0, 200.0, 180.0, 140.0, 100.0, 50.0, 0.0]),
        }
    }

    /// Every table with its conventional name, for inspection and tests.
    pub fn named(&self) -> [(&'static str, &InterpolationTable); 22] {
        [
            ("tDebtSupport", &self.debt_support),
            ("tHsBrthK", &self.hs_brth_k),
            ("tHsDthK", &self.hs_dth_k),
            ("tHsEff", &self.hs_eff),
            ("tHsNourish", &self.hs_nourish),
            ("tLashSick", &self.lash_sick),
            ("tNegMotive", &self.neg_motive),
            ("tOvEff", &self.ov_eff),
            ("tOxBrthK", &self.ox_brth_k),
            ("tOxDthK", &self.ox_dth_k),
            ("tOxEff", &self.ox_eff),
            ("tOxMultK", &self.ox_mult_k),
            ("tOxNourish", &self.ox_nourish),
            ("tPosMotive", &self.pos_motive),
            ("tSeasonYeild", &self.season_yield),
            ("tSlBrthK", &self.sl_brth_k),
            ("tSlDthK", &self.sl_dth_k),
            ("tSlNourish", &self.sl_nourish),
            ("tStressLash", &self.stress_lash),
            ("tWkAble_sl", &self.wk_able_sl),
            ("tWkSick", &self.wk_sick),
            ("tWtYeild", &self.wt_yield),
        ]
    }
}

impl Default for TableSet {
    fn default() -> Self { Self::standard() }
}
