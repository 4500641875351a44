//! Deterministic ruler names for the neighbouring players.
//!
//! All generation is deterministic (same RNG seed = same names).

use crate::rng::SubsystemRng;

/// Deterministic name generator using curated name lists
pub struct NameGenerator;

impl NameGenerator {
    /// Generate a ruler name ("Name of Realm") deterministically
    pub fn generate_ruler_name(rng: &mut SubsystemRng) -> String {
        let name = Self::generate_given_name(rng);
        let realm = Self::generate_realm(rng);
        format!("{} of {}", name, realm)
    }

    /// Generate a given name from the curated list
    pub fn generate_given_name(rng: &mut SubsystemRng) -> &'static str {
        let names = Self::given_names();
        let index = rng.next_u64_below(names.len() as u64) as usize;
        names[index]
    }

    /// Generate a realm from the curated list
    pub fn generate_realm(rng: &mut SubsystemRng) -> &'static str {
        let realms = Self::realms();
        let index = rng.next_u64_below(realms.len() as u64) as usize;
        realms[index]
    }

    fn given_names() -> &'static [&'static str] {
        &[
            "Khufu", "Djoser", "Sneferu", "Menkaure", "Khafre", "Userkaf", "Sahure",
            "Teti", "Pepi", "Mentu", "Amenemhat", "Senusret", "Ahmose", "Thutmose",
            "Hatshepsut", "Tiye", "Nefertari", "Seti", "Ramesses", "Merneptah",
            "Sobek", "Ankhesen", "Meritaten", "Psamtik", "Nekau", "Taharqa",
            "Shabaka", "Piye", "Osorkon", "Takelot", "Sheshonq", "Hor", "Iry",
            "Narmer", "Hetepheres", "Khentkaus", "Nitocris", "Sobekneferu",
        ]
    }

    fn realms() -> &'static [&'static str] {
        &[
            "Thebes", "Memphis", "Byblos", "Nubia", "Kush", "Punt", "Sais",
            "Tanis", "Abydos", "Edfu", "Buto", "Avaris", "Ugarit", "Mari",
            "Tyre", "Sidon", "Libya", "Sinai", "Elam", "Kerma",
        ]
    }
}
