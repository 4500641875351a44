//! Fixed-size binary records carried in a save: trade contracts and the
//! rival players. Each record has a stable byte layout (big-endian
//! numbers) so the symbol table can round-trip it through hex text.

use crate::{
    name_generator::NameGenerator,
    rng::SubsystemRng,
    types::Commodity,
};
use serde::{Deserialize, Serialize};

pub const MAX_OFFERS: usize = 8;
pub const MAX_PENDING: usize = 8;
pub const MAX_PLAYERS: usize = 4;

pub const CONTRACT_LEN: usize = 24;
pub const PLAYER_LEN: usize = 32;
pub const PLAYER_NAME_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Buy,
    Sell,
}

impl Side {
    pub fn code(&self) -> u8 {
        match self {
            Self::Buy => 0,
            Self::Sell => 1,
        }
    }
}

/// A trade contract, either on offer or accepted and pending delivery.
///
/// Flag bytes and the reserved gap are held as read, so a record loaded
/// from a save writes back byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Contract {
    /// Non-zero while the contract is live.
    pub active:      u8,
    /// Player slot of the counter-party.
    pub party:       u8,
    /// `Commodity` code; kept raw so unknown codes survive a round trip.
    pub commodity:   u8,
    /// Zero buys, anything else sells.
    pub side:        u8,
    pub months_left: u16,
    pub reserved:    [u8; 2],
    pub quantity:    f64,
    pub price:       f64,
}

impl Contract {
    /// A live contract.
    pub fn new(party: u8, commodity: Commodity, side: Side, months_left: u16, quantity: f64, price: f64) -> Self {
        Self {
            active: 1,
            party,
            commodity: commodity as u8,
            side: side.code(),
            months_left,
            reserved: [0; 2],
            quantity,
            price,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active != 0
    }

    pub fn side(&self) -> Side {
        if self.side == 0 { Side::Buy } else { Side::Sell }
    }

    pub fn commodity(&self) -> Option<Commodity> {
        Commodity::from_code(self.commodity)
    }

    pub fn to_bytes(&self) -> [u8; CONTRACT_LEN] {
        let mut out = [0u8; CONTRACT_LEN];
        out[0] = self.active;
        out[1] = self.party;
        out[2] = self.commodity;
        out[3] = self.side;
        out[4..6].copy_from_slice(&self.months_left.to_be_bytes());
        out[6..8].copy_from_slice(&self.reserved);
        out[8..16].copy_from_slice(&self.quantity.to_be_bytes());
        out[16..24].copy_from_slice(&self.price.to_be_bytes());
        out
    }

    pub fn from_bytes(b: &[u8; CONTRACT_LEN]) -> Self {
        Self {
            active:      b[0],
            party:       b[1],
            commodity:   b[2],
            side:        b[3],
            months_left: u16::from_be_bytes([b[4], b[5]]),
            reserved:    [b[6], b[7]],
            quantity:    f64::from_be_bytes(be8(&b[8..16])),
            price:       f64::from_be_bytes(be8(&b[16..24])),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Personality {
    #[default]
    Banker = 0,
    GoodGuy = 1,
    BadGuy = 2,
    DumbGuy = 3,
}

impl Personality {
    pub const ALL: [Personality; 4] = [
        Personality::Banker,
        Personality::GoodGuy,
        Personality::BadGuy,
        Personality::DumbGuy,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| *p as u8 == code)
    }
}

/// A neighbouring ruler the pharaoh trades with. The personality byte
/// and reserved gap are held as read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Player {
    pub name:        [u8; PLAYER_NAME_LEN],
    /// `Personality` code.
    pub personality: u8,
    pub reserved:    [u8; 7],
    pub wealth:      f64,
}

impl Player {
    pub fn new(name: &str, personality: Personality, wealth: f64) -> Self {
        let mut buf = [0u8; PLAYER_NAME_LEN];
        let bytes = name.as_bytes();
        let n = bytes.len().min(PLAYER_NAME_LEN);
        buf[..n].copy_from_slice(&bytes[..n]);
        Self { name: buf, personality: personality as u8, reserved: [0; 7], wealth }
    }

    /// The name up to its first NUL, lossily decoded.
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|b| *b == 0).unwrap_or(PLAYER_NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    /// None for a code no personality uses.
    pub fn personality(&self) -> Option<Personality> {
        Personality::from_code(self.personality)
    }

    pub fn to_bytes(&self) -> [u8; PLAYER_LEN] {
        let mut out = [0u8; PLAYER_LEN];
        out[..PLAYER_NAME_LEN].copy_from_slice(&self.name);
        out[16] = self.personality;
        out[17..24].copy_from_slice(&self.reserved);
        out[24..32].copy_from_slice(&self.wealth.to_be_bytes());
        out
    }

    pub fn from_bytes(b: &[u8; PLAYER_LEN]) -> Self {
        let mut name = [0u8; PLAYER_NAME_LEN];
        name.copy_from_slice(&b[..PLAYER_NAME_LEN]);
        let mut reserved = [0u8; 7];
        reserved.copy_from_slice(&b[17..24]);
        Self {
            name,
            personality: b[16],
            reserved,
            wealth:      f64::from_be_bytes(be8(&b[24..32])),
        }
    }
}

fn be8(slice: &[u8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(slice);
    out
}

/// Pack a fixed array of records into one contiguous byte blob.
pub fn pack<T, const N: usize, const L: usize>(items: &[T; N], encode: impl Fn(&T) -> [u8; L]) -> Vec<u8> {
    items.iter().flat_map(|item| encode(item)).collect()
}

/// Inverse of [`pack`]. `bytes` must be exactly `N * L` long.
pub fn unpack<T: Default + Copy, const N: usize, const L: usize>(
    bytes: &[u8],
    decode: impl Fn(&[u8; L]) -> T,
) -> Option<[T; N]> {
    if bytes.len() != N * L {
        return None;
    }
    let mut out = [T::default(); N];
    for (slot, chunk) in out.iter_mut().zip(bytes.chunks_exact(L)) {
        let mut rec = [0u8; L];
        rec.copy_from_slice(chunk);
        *slot = decode(&rec);
    }
    Some(out)
}

/// Seat the rival players for a new game. Personalities are dealt to
/// seats in a seeded shuffle; the returned array maps each personality
/// (by its code) to the seat it landed in.
pub fn make_players(rng: &mut SubsystemRng) -> ([Player; MAX_PLAYERS], [usize; 4]) {
    let mut order = Personality::ALL;
    for i in (1..order.len()).rev() {
        let j = rng.next_u64_below(i as u64 + 1) as usize;
        order.swap(i, j);
    }

    let mut players = [Player::default(); MAX_PLAYERS];
    let mut seats = [0usize; 4];
    for (seat, personality) in order.into_iter().enumerate() {
        let name = NameGenerator::generate_ruler_name(rng);
        let wealth = (rng.uniform(5.0e4, 2.0e5)).round();
        players[seat] = Player::new(&name, personality, wealth);
        seats[personality as usize] = seat;
    }
    (players, seats)
}
