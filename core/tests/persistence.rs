//! Symbol table and save-file text format.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

use pharaoh_core::{
    config::SimConfig,
    error::SimError,
    records::{Contract, Personality, Player, Side, MAX_OFFERS, MAX_PENDING, MAX_PLAYERS},
    state::{Controls, Fields, History, Market, Markets, Rivals, SimState},
    step::advance,
    symbols::{Symbol, SymbolKind, SymbolTable, MAX_RECORD_LEN},
    table::TableSet,
    types::Commodity,
};

const SAVE_ORDER: [&str; 73] = [
    "creditLimit", "creditLower", "creditRating", "gold", "horses", "hsHealth", "loan",
    "lnFallow", "lnGrown", "lnRipe", "lnSewn", "manure", "overseers", "ovPress", "oxen",
    "oxHealth", "pyStones", "slaves", "slHealth", "wheat", "wtGrown", "wtRipe", "wtSewn",
    "month", "year", "hsFeedRt", "lnToSew", "mnToSprd", "oxFeedRt", "pyQuota", "pyBase",
    "pyHeight", "slFeedRt", "olWt", "olSl", "olHs", "olOx", "olMn", "oldGold", "wtPrice",
    "slPrice", "lnPrice", "oxPrice", "hsPrice", "mnPrice", "ovPay", "inflation", "banker",
    "goodGuy", "badGuy", "dumbGuy", "worldGrowth", "slSupply", "slDemand", "slProduction",
    "hsSupply", "hsDemand", "hsProduction", "oxSupply", "oxDemand", "oxProduction",
    "wtSupply", "wtDemand", "wtProduction", "lnSupply", "lnDemand", "lnProduction",
    "mnSupply", "mnDemand", "mnProduction", "contOffer", "contPend", "players",
];

fn market(base: f64) -> Market {
    Market { supply: base, demand: base * 2.0, production: base * 3.0, price: base / 4.0 }
}

/// Every field set, none to its default. Listing every field keeps this
/// in step with `SimState`: a new field fails to compile here.
fn full_state() -> SimState {
    let mut offers = [Contract::default(); MAX_OFFERS];
    offers[0] = Contract::new(1, Commodity::Oxen, Side::Sell, 4, 25.0, 91.75);
    let mut pending = [Contract::default(); MAX_PENDING];
    pending[7] = Contract {
        reserved: [0x5a, 0x01],
        ..Contract::new(3, Commodity::Land, Side::Buy, 11, 0.1, 8_000.0)
    };
    let mut players: [Player; MAX_PLAYERS] = [
        Player::new("Khufu of Thebes", Personality::BadGuy, 61_000.0),
        Player::new("Tiye of Kush", Personality::Banker, 150_000.0),
        Player::new("Seti of Punt", Personality::DumbGuy, 52_500.0),
        Player::new("Narmer of Tanis", Personality::GoodGuy, 99_999.0),
    ];
    players[2].reserved = [7, 0, 0, 0, 0, 0, 0xff];

    SimState {
        month: 7.0,
        year: 3.0,
        gold: 12_345.5,
        loan: 2_000.0,
        credit_limit: 75_000.0,
        credit_lower: 40_000.0,
        credit_rating: 0.75,
        // Not saved: must match the default to compare after a load.
        interest: 0.5,
        slaves: 321.0,
        sl_health: 0.8125,
        overseers: 12.0,
        ov_press: 2.5,
        ov_pay: 310.0,
        oxen: 45.0,
        ox_health: 0.625,
        horses: 9.0,
        hs_health: 0.5,
        fields: Fields {
            fallow: 400.0,
            sewn: 30.0,
            grown: 20.0,
            ripe: 10.0,
            wt_sewn: 3_000.0,
            wt_grown: 2_000.0,
            wt_ripe: 1_000.0,
        },
        wheat: 98_765.25,
        manure: 640.0,
        py_stones: 1_234.0,
        py_base: 250.0,
        py_height: 0.125,
        controls: Controls {
            sl_feed_rt: 6.5,
            ox_feed_rt: 55.0,
            hs_feed_rt: 45.0,
            ln_to_sew: 60.0,
            mn_to_sprd: 120.0,
            py_quota: 15.0,
        },
        history: History {
            wheat: 90_000.0,
            slaves: 300.0,
            horses: 8.0,
            oxen: 44.0,
            manure: 600.0,
            gold: 11_000.0,
        },
        markets: Markets {
            world_growth: 0.0625,
            wheat: market(1_000_000.0),
            slaves: market(1_200.0),
            oxen: market(16_000.0),
            horses: market(8_000.0),
            manure: market(20_000.0),
            land: market(400.0),
        },
        inflation: 0.002,
        rivals: Rivals { banker: 1.0, good_guy: 3.0, bad_guy: 0.0, dumb_guy: 2.0 },
        offers,
        pending,
        players,
    }
}

#[test]
fn single_number_dumps_as_one_line_and_loads_back() {
    let table = SymbolTable::new(vec![Symbol::number("wheat", |s| s.wheat, |s, v| s.wheat = v)]);
    let state = SimState { wheat: 1234.5, ..SimState::default() };

    let text = table.dump(&state);
    assert_eq!(text, "wheat:1234.5\n");

    let mut restored = SimState::default();
    assert_eq!(table.load(&mut restored, &text), 1);
    assert_eq!(restored.wheat, 1234.5);
}

#[test]
fn standard_table_keeps_save_order() {
    let table = SymbolTable::standard();
    let names: Vec<&str> = table.symbols().map(|s| s.name()).collect();
    assert_eq!(names, SAVE_ORDER.to_vec());
    assert_eq!(table.kind_of("contOffer"), Some(SymbolKind::Blob(192)));
    assert_eq!(table.kind_of("contPend"), Some(SymbolKind::Blob(192)));
    assert_eq!(table.kind_of("players"), Some(SymbolKind::Blob(128)));
    assert_eq!(table.kind_of("gold"), Some(SymbolKind::Number));
    assert_eq!(table.kind_of("Gold"), None, "lookup is case-sensitive");
}

#[test]
fn every_state_field_round_trips() {
    let table = SymbolTable::standard();
    let state = full_state();

    let mut restored = SimState::default();
    let applied = table.load(&mut restored, &table.dump(&state));

    assert_eq!(applied, SAVE_ORDER.len());
    assert_eq!(restored, state);
}

#[test]
fn number_symbols_address_distinct_cells() {
    let table = SymbolTable::standard();
    let mut state = SimState::default();
    let numbers: Vec<&str> = table
        .symbols()
        .filter(|s| s.kind() == SymbolKind::Number)
        .map(|s| s.name())
        .collect();

    for (i, name) in numbers.iter().enumerate() {
        table.set_number(&mut state, name, 1000.0 + i as f64).unwrap();
    }
    for (i, name) in numbers.iter().enumerate() {
        assert_eq!(table.get_number(&state, name), Some(1000.0 + i as f64), "{name} aliases another symbol");
    }
}

#[test]
fn stepped_state_round_trips_through_text() {
    let table = SymbolTable::standard();
    let tables = TableSet::standard();
    let config = SimConfig::default_test();
    let mut state = full_state();
    for _ in 0..5 {
        state = advance(&state, &tables, &config).state;
    }

    let text = table.dump(&state);
    let mut restored = SimState::default();
    table.load(&mut restored, &text);

    assert_eq!(table.dump(&restored), text);
    assert_eq!(restored.offers, state.offers);
    assert_eq!(restored.pending, state.pending);
    assert_eq!(restored.players, state.players);
    for sym in table.symbols().filter(|s| s.kind() == SymbolKind::Number) {
        let a = table.get_number(&state, sym.name()).unwrap();
        let b = table.get_number(&restored, sym.name()).unwrap();
        assert!((a - b).abs() <= 1e-7 * a.abs().max(1e-300), "{}: {a} vs {b}", sym.name());
    }
}

#[test]
fn blobs_dump_as_hex_groups_with_filler() {
    let table = SymbolTable::standard();
    let text = table.dump(&full_state());
    let line = text.lines().find(|l| l.starts_with("players:")).unwrap();
    let body = &line["players:".len()..];

    assert_eq!(body.len(), 128 * 3);
    assert!(body.starts_with("4b 68 75 66 75 20 6f 66 20 "), "{body}");
    assert!(body.ends_with(' '));
    assert!(body.bytes().all(|b| b == b' ' || b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
}

fn hex_line(name: &str, bytes: &[u8]) -> String {
    let body: String = bytes.iter().map(|b| format!("{b:02x} ")).collect();
    format!("{name}:{body}")
}

#[test]
fn arbitrary_blob_bytes_dump_back_unchanged() {
    let table = SymbolTable::standard();
    let mut rng = Pcg64Mcg::seed_from_u64(0xb10b);

    for case in 0..50 {
        for (name, len) in [("contOffer", 192), ("contPend", 192), ("players", 128)] {
            let mut bytes = vec![0u8; len];
            rng.fill_bytes(&mut bytes);
            let line = hex_line(name, &bytes);

            let mut state = SimState::default();
            assert!(table.store(&mut state, &line), "case {case}: {name} rejected");

            let dumped = table.dump(&state);
            let out = dumped.lines().find(|l| l.starts_with(&format!("{name}:"))).unwrap();
            assert_eq!(out, line, "case {case}: {name} changed on the way through");
        }
    }
}

#[test]
fn flag_and_reserved_bytes_are_not_normalised() {
    let table = SymbolTable::standard();
    let mut bytes = [0u8; 192];
    bytes[..8].copy_from_slice(&[0x05, 0x2a, 0x4f, 0x74, 0x99, 0xbe, 0xe3, 0x08]);
    let line = hex_line("contOffer", &bytes);

    let mut state = SimState::default();
    assert!(table.store(&mut state, &line));
    assert_eq!(state.offers[0].active, 0x05);
    assert_eq!(state.offers[0].side, 0x74);
    assert_eq!(state.offers[0].reserved, [0xe3, 0x08]);
    assert!(table.dump(&state).contains(&line));
}

#[test]
fn unknown_symbol_leaves_state_untouched() {
    let table = SymbolTable::standard();
    let mut state = full_state();
    let before = table.dump(&state);

    assert!(!table.store(&mut state, "unknownName:5"));
    assert_eq!(table.dump(&state), before);
    assert_eq!(state, full_state());

    assert!(matches!(
        table.try_store(&mut state, "unknownName:5"),
        Err(SimError::UnknownSymbol { .. })
    ));
    assert!(matches!(table.try_store(&mut state, "wheat"), Err(SimError::MissingSeparator)));
}

#[test]
fn numbers_parse_permissively() {
    let table = SymbolTable::standard();
    let mut state = SimState::default();

    assert!(table.store(&mut state, "gold:12abc"));
    assert_eq!(state.gold, 12.0);
    assert!(table.store(&mut state, "gold:abc"));
    assert_eq!(state.gold, 0.0);
    assert!(table.store(&mut state, "loan: -2.5e3"));
    assert_eq!(state.loan, -2500.0);
    assert!(table.store(&mut state, "slaves:"));
    assert_eq!(state.slaves, 0.0);
}

#[test]
fn malformed_blob_is_rejected_without_mutation() {
    let table = SymbolTable::standard();
    let mut state = full_state();

    assert!(!table.store(&mut state, "contOffer:zz"));
    assert!(!table.store(&mut state, "players:00 11 22"));
    let bad_digit = format!("contPend:{}", "0g ".repeat(192));
    assert!(!table.store(&mut state, &bad_digit));
    assert_eq!(state, full_state());

    assert!(matches!(
        table.try_store(&mut state, "contOffer:zz"),
        Err(SimError::MalformedValue { .. })
    ));
}

#[test]
fn blob_without_final_filler_is_accepted() {
    let table = SymbolTable::standard();
    let mut state = SimState::default();
    let source = full_state();
    let line = table
        .dump(&source)
        .lines()
        .find(|l| l.starts_with("contOffer:"))
        .unwrap()
        .trim_end()
        .to_string();

    assert!(table.store(&mut state, &line));
    assert_eq!(state.offers, source.offers);
}

#[test]
fn load_skips_bad_lines_and_counts_the_rest() {
    let table = SymbolTable::standard();
    let mut state = SimState::default();
    let long = format!("gold:{}", "1".repeat(MAX_RECORD_LEN));
    let buffer = format!("wheat:5\n\nbogus:1\n{long}\nslaves:40\nno separator\nyear:9");

    let applied = table.load(&mut state, &buffer);

    assert_eq!(applied, 3);
    assert_eq!(state.wheat, 5.0);
    assert_eq!(state.slaves, 40.0);
    assert_eq!(state.year, 9.0);
    assert_eq!(state.gold, 0.0, "over-long record skipped");
}

#[test]
fn set_number_rejects_blobs_and_unknown_names() {
    let table = SymbolTable::standard();
    let mut state = SimState::default();
    assert!(table.set_number(&mut state, "players", 1.0).is_err());
    assert!(table.set_number(&mut state, "nope", 1.0).is_err());
    assert_eq!(table.get_number(&state, "players"), None);
    assert_eq!(table.get_number(&state, "nope"), None);
}

#[test]
#[should_panic(expected = "duplicate symbol")]
fn duplicate_names_are_rejected() {
    SymbolTable::new(vec![
        Symbol::number("gold", |s| s.gold, |s, v| s.gold = v),
        Symbol::number("gold", |s| s.loan, |s, v| s.loan = v),
    ]);
}
