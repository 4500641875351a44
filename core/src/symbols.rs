//! Symbol table: name-indexed access to the saved state.
//!
//! The table maps each symbol name to accessors for one cell of
//! [`SimState`]: a number, or a fixed-length byte blob. It is the only
//! route by which a save file reaches the state.
//!
//! Text format, one record per line:
//!
//! ```text
//! wheat:1234.5
//! players:4b 68 75 66 75 20 ...
//! ```
//!
//! Numbers are written with 8 significant digits (C `%.8g`) and read
//! permissively: the longest numeric prefix is used and text with no
//! numeric prefix reads as 0. Blobs are two lower-case hex digits plus one
//! filler byte per byte. The format carries no type tags; a record is
//! interpreted by the kind registered under its name, so registration
//! order and the name set are part of the save format.

use crate::{
    error::{SimError, SimResult},
    records::{pack, unpack, Contract, Player},
    state::SimState,
};

/// Longest record `load` accepts, excluding the newline.
pub const MAX_RECORD_LEN: usize = 2047;

type GetNumber = fn(&SimState) -> f64;
type SetNumber = fn(&mut SimState, f64);
type GetBlob = fn(&SimState) -> Vec<u8>;
type SetBlob = fn(&mut SimState, &[u8]) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Number,
    Blob(usize),
}

#[derive(Clone, Copy)]
enum Access {
    Number { get: GetNumber, set: SetNumber },
    Blob { len: usize, get: GetBlob, set: SetBlob },
}

#[derive(Clone, Copy)]
pub struct Symbol {
    name:   &'static str,
    access: Access,
}

impl Symbol {
    pub fn number(name: &'static str, get: GetNumber, set: SetNumber) -> Self {
        Self { name, access: Access::Number { get, set } }
    }

    /// `set` returns false if the bytes do not form a valid value, in
    /// which case it must leave the state untouched.
    pub fn blob(name: &'static str, len: usize, get: GetBlob, set: SetBlob) -> Self {
        Self { name, access: Access::Blob { len, get, set } }
    }

    pub fn name(&self) -> &'static str { self.name }

    pub fn kind(&self) -> SymbolKind {
        match self.access {
            Access::Number { .. } => SymbolKind::Number,
            Access::Blob { len, .. } => SymbolKind::Blob(len),
        }
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Symbol").field("name", &self.name).field("kind", &self.kind()).finish()
    }
}

/// An ordered, read-only set of symbols.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Build a table. Panics on a duplicate name; tables are assembled
    /// once from static lists.
    pub fn new(symbols: Vec<Symbol>) -> Self {
        for (i, s) in symbols.iter().enumerate() {
            assert!(
                symbols[..i].iter().all(|t| t.name != s.name),
                "duplicate symbol '{}'",
                s.name
            );
        }
        Self { symbols }
    }

    pub fn len(&self) -> usize { self.symbols.len() }
    pub fn is_empty(&self) -> bool { self.symbols.is_empty() }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    fn find(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.find(name).map(Symbol::kind)
    }

    pub fn get_number(&self, state: &SimState, name: &str) -> Option<f64> {
        match self.find(name)?.access {
            Access::Number { get, .. } => Some(get(state)),
            Access::Blob { .. } => None,
        }
    }

    pub fn set_number(&self, state: &mut SimState, name: &str, value: f64) -> SimResult<()> {
        let sym = self
            .find(name)
            .ok_or_else(|| SimError::UnknownSymbol { name: name.to_string() })?;
        match sym.access {
            Access::Number { set, .. } => {
                set(state, value);
                Ok(())
            }
            Access::Blob { .. } => Err(SimError::MalformedValue {
                name: name.to_string(),
                reason: "symbol holds a blob, not a number".into(),
            }),
        }
    }

    /// Apply one `NAME:VALUE` record. Returns false, leaving the state
    /// untouched, for an unknown name or an undecodable blob.
    pub fn store(&self, state: &mut SimState, record: &str) -> bool {
        match self.try_store(state, record) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("record rejected: {e}");
                false
            }
        }
    }

    /// [`store`](Self::store) with the reason for a rejection.
    pub fn try_store(&self, state: &mut SimState, record: &str) -> SimResult<()> {
        let (name, value) = record.split_once(':').ok_or(SimError::MissingSeparator)?;
        let sym = self
            .find(name)
            .ok_or_else(|| SimError::UnknownSymbol { name: name.to_string() })?;
        match sym.access {
            Access::Number { set, .. } => {
                set(state, parse_number(value));
                Ok(())
            }
            Access::Blob { len, set, .. } => {
                let bytes = decode_hex_groups(value, len).ok_or_else(|| SimError::MalformedValue {
                    name: name.to_string(),
                    reason: format!("expected {len} hex byte groups"),
                })?;
                if set(state, &bytes) {
                    Ok(())
                } else {
                    Err(SimError::MalformedValue {
                        name: name.to_string(),
                        reason: "bytes do not form a valid record".into(),
                    })
                }
            }
        }
    }

    /// Apply every newline-terminated record in `buffer`. Empty lines,
    /// over-long lines and rejected records are skipped. Returns the number
    /// of records applied.
    pub fn load(&self, state: &mut SimState, buffer: &str) -> usize {
        let mut applied = 0;
        for line in buffer.split('\n') {
            if line.is_empty() {
                continue;
            }
            if line.len() > MAX_RECORD_LEN {
                log::warn!("skipping {}-byte record (limit {MAX_RECORD_LEN})", line.len());
                continue;
            }
            if self.store(state, line) {
                applied += 1;
            }
        }
        applied
    }

    /// Render every symbol, in registration order, one record per line.
    pub fn dump(&self, state: &SimState) -> String {
        let mut out = String::new();
        for sym in &self.symbols {
            out.push_str(sym.name);
            out.push(':');
            match sym.access {
                Access::Number { get, .. } => out.push_str(&format_number(get(state))),
                Access::Blob { get, .. } => out.push_str(&encode_hex_groups(&get(state))),
            }
            out.push('\n');
        }
        out
    }

    /// The registry for a full save, in save-file order.
    pub fn standard() -> Self {
        macro_rules! num {
            ($name:literal, $($field:ident).+) => {
                Symbol::number($name, |s| s.$($field).+, |s, v| s.$($field).+ = v)
            };
        }

        Self::new(vec![
            num!("creditLimit", credit_limit),
            num!("creditLower", credit_lower),
            num!("creditRating", credit_rating),
            num!("gold", gold),
            num!("horses", horses),
            num!("hsHealth", hs_health),
            num!("loan", loan),
            num!("lnFallow", fields.fallow),
            num!("lnGrown", fields.grown),
            num!("lnRipe", fields.ripe),
            num!("lnSewn", fields.sewn),
            num!("manure", manure),
            num!("overseers", overseers),
            num!("ovPress", ov_press),
            num!("oxen", oxen),
            num!("oxHealth", ox_health),
            num!("pyStones", py_stones),
            num!("slaves", slaves),
            num!("slHealth", sl_health),
            num!("wheat", wheat),
            num!("wtGrown", fields.wt_grown),
            num!("wtRipe", fields.wt_ripe),
            num!("wtSewn", fields.wt_sewn),
            num!("month", month),
            num!("year", year),
            num!("hsFeedRt", controls.hs_feed_rt),
            num!("lnToSew", controls.ln_to_sew),
            num!("mnToSprd", controls.mn_to_sprd),
            num!("oxFeedRt", controls.ox_feed_rt),
            num!("pyQuota", controls.py_quota),
            num!("pyBase", py_base),
            num!("pyHeight", py_height),
            num!("slFeedRt", controls.sl_feed_rt),
            num!("olWt", history.wheat),
            num!("olSl", history.slaves),
            num!("olHs", history.horses),
            num!("olOx", history.oxen),
            num!("olMn", history.manure),
            num!("oldGold", history.gold),
            num!("wtPrice", markets.wheat.price),
            num!("slPrice", markets.slaves.price),
            num!("lnPrice", markets.land.price),
            num!("oxPrice", markets.oxen.price),
            num!("hsPrice", markets.horses.price),
            num!("mnPrice", markets.manure.price),
            num!("ovPay", ov_pay),
            num!("inflation", inflation),
            num!("banker", rivals.banker),
            num!("goodGuy", rivals.good_guy),
            num!("badGuy", rivals.bad_guy),
            num!("dumbGuy", rivals.dumb_guy),
            num!("worldGrowth", markets.world_growth),
            num!("slSupply", markets.slaves.supply),
            num!("slDemand", markets.slaves.demand),
            num!("slProduction", markets.slaves.production),
            num!("hsSupply", markets.horses.supply),
            num!("hsDemand", markets.horses.demand),
            num!("hsProduction", markets.horses.production),
            num!("oxSupply", markets.oxen.supply),
            num!("oxDemand", markets.oxen.demand),
            num!("oxProduction", markets.oxen.production),
            num!("wtSupply", markets.wheat.supply),
            num!("wtDemand", markets.wheat.demand),
            num!("wtProduction", markets.wheat.production),
            num!("lnSupply", markets.land.supply),
            num!("lnDemand", markets.land.demand),
            num!("lnProduction", markets.land.production),
            num!("mnSupply", markets.manure.supply),
            num!("mnDemand", markets.manure.demand),
            num!("mnProduction", markets.manure.production),
            Symbol::blob(
                "contOffer",
                crate::records::MAX_OFFERS * crate::records::CONTRACT_LEN,
                |s| pack(&s.offers, Contract::to_bytes),
                |s, b| match unpack(b, Contract::from_bytes) {
                    Some(v) => { s.offers = v; true }
                    None => false,
                },
            ),
            Symbol::blob(
                "contPend",
                crate::records::MAX_PENDING * crate::records::CONTRACT_LEN,
                |s| pack(&s.pending, Contract::to_bytes),
                |s, b| match unpack(b, Contract::from_bytes) {
                    Some(v) => { s.pending = v; true }
                    None => false,
                },
            ),
            Symbol::blob(
                "players",
                crate::records::MAX_PLAYERS * crate::records::PLAYER_LEN,
                |s| pack(&s.players, Player::to_bytes),
                |s, b| match unpack(b, Player::from_bytes) {
                    Some(v) => { s.players = v; true }
                    None => false,
                },
            ),
        ])
    }
}

impl Default for SymbolTable {
    fn default() -> Self { Self::standard() }
}

/// Permissive decimal parse: optional leading whitespace and sign, digits
/// with an optional fraction, optional exponent. Only the longest such
/// prefix is read; no numeric prefix at all reads as 0.
pub fn parse_number(text: &str) -> f64 {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let start = i;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        mantissa_digits += i - frac_start;
    }
    if mantissa_digits == 0 {
        return 0.0;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    text[start..i].parse().unwrap_or(0.0)
}

/// Render like C's `%.8g`.
pub fn format_number(v: f64) -> String {
    const SIG: usize = 8;
    if v.is_nan() {
        return "nan".into();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".into() } else { "-inf".into() };
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0".into() } else { "0".into() };
    }

    let sci = format!("{:.*e}", SIG - 1, v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= SIG as i32 {
        let mantissa = trim_fraction(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    } else {
        let decimals = (SIG as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, v)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode `len` groups of two hex digits, each followed by one filler byte.
/// The final filler may be missing.
fn decode_hex_groups(text: &str, len: usize) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    if len > 0 && bytes.len() < len * 3 - 1 {
        return None;
    }
    (0..len)
        .map(|n| {
            let hi = hex_digit(bytes[n * 3])?;
            let lo = hex_digit(bytes[n * 3 + 1])?;
            Some(hi << 4 | lo)
        })
        .collect()
}

fn encode_hex_groups(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 3);
    for b in bytes {
        let _ = write!(out, "{b:02x} ");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_like_percent_g() {
        assert_eq!(format_number(1234.5), "1234.5");
        assert_eq!(format_number(50000.0), "50000");
        assert_eq!(format_number(1e7), "10000000");
        assert_eq!(format_number(1e8), "1e+08");
        assert_eq!(format_number(0.05), "0.05");
        assert_eq!(format_number(0.00001234), "1.234e-05");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(1.0 / 3.0), "0.33333333");
        assert_eq!(format_number(123456789.0), "1.2345679e+08");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn permissive_parse_reads_numeric_prefix() {
        assert_eq!(parse_number("72.3"), 72.3);
        assert_eq!(parse_number("  -4e2xyz"), -400.0);
        assert_eq!(parse_number("1e"), 1.0);
        assert_eq!(parse_number("5."), 5.0);
        assert_eq!(parse_number(".5"), 0.5);
        assert_eq!(parse_number("+.e5"), 0.0);
        assert_eq!(parse_number("garbage"), 0.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("12\r"), 12.0);
    }

    #[test]
    fn hex_groups_accept_missing_final_filler() {
        assert_eq!(decode_hex_groups("0a ff", 2), Some(vec![0x0a, 0xff]));
        assert_eq!(decode_hex_groups("0a-FF-", 2), Some(vec![0x0a, 0xff]));
        assert_eq!(decode_hex_groups("0a f", 2), None);
        assert_eq!(decode_hex_groups("0g ff ", 2), None);
        assert_eq!(encode_hex_groups(&[0x0a, 0xff]), "0a ff ");
    }
}
