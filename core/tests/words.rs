//! Spelling magnitudes out for the speech sink.

use pharaoh_core::words::{format_quantity, narrate_numbers, to_words};

#[test]
fn zero_reads_as_zero() {
    assert_eq!(to_words(0.0), "zero");
    assert_eq!(to_words(0.75), "zero");
}

#[test]
fn small_numbers_and_teens() {
    assert_eq!(to_words(1.0), "one");
    assert_eq!(to_words(11.0), "eleven");
    assert_eq!(to_words(13.0), "thirteen");
    assert_eq!(to_words(19.0), "nineteen");
}

#[test]
fn decades_combine_with_ones() {
    assert_eq!(to_words(20.0), "twenty");
    assert_eq!(to_words(42.0), "forty two");
    assert_eq!(to_words(99.0), "ninety nine");
}

#[test]
fn bands_decompose_recursively() {
    assert_eq!(to_words(100.0), "one hundred");
    assert_eq!(to_words(1500.0), "one thousand five hundred");
    assert_eq!(to_words(2_000.0), "two thousand");
    assert_eq!(to_words(1_000_001.0), "one million one");
    assert_eq!(to_words(345_678.0), "three hundred forty five thousand six hundred seventy eight");
    assert_eq!(to_words(7e15), "seven quadrillion");
    assert_eq!(to_words(2.5e15), "two quadrillion five hundred trillion");
}

#[test]
fn internal_zeros_are_elided() {
    for n in [2_000.0, 3_000_000.0, 40_000.0, 1e9, 5e12] {
        let words = to_words(n);
        assert!(!words.contains("zero"), "{n} -> {words}");
        assert!(!words.contains("  "), "{n} -> {words}");
    }
}

#[test]
fn fractions_are_dropped() {
    assert_eq!(to_words(12.9), "twelve");
}

#[test]
fn very_large_numbers_use_fixed_phrase() {
    assert_eq!(to_words(1e18), "a really big number");
    assert_eq!(to_words(5e20), "a really big number");
}

#[test]
fn words_are_deterministic() {
    for n in [0.0, 7.0, 815.0, 1e6 + 17.0, 123_456_789.0] {
        assert_eq!(to_words(n), to_words(n));
    }
}

#[test]
fn digit_runs_in_text_become_words() {
    assert_eq!(narrate_numbers("You have 25 slaves"), "You have twenty five slaves");
    assert_eq!(narrate_numbers("Price 3.75 gold"), "Price three.75 gold");
    assert_eq!(narrate_numbers("Year 12"), "Year twelve");
    assert_eq!(narrate_numbers("no digits"), "no digits");
}

#[test]
fn quantities_format_for_status_lines() {
    assert_eq!(format_quantity(0.5), "0.5");
    assert_eq!(format_quantity(45.678), "45.68");
    assert_eq!(format_quantity(98_765.4), "98765");
    assert_eq!(format_quantity(1.5e8), "1.50e8");
}
