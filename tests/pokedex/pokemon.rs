//! Record shapes used by the pokedex suite.

use keyed_store::Record;
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize, Record)]
pub struct Pokemon {
    pub id: String,
    pub attack: u32,
    pub defense: u32,
}

impl Pokemon {
    pub fn new(id: &str, attack: u32, defense: u32) -> Self {
        Self {
            id: id.to_string(),
            attack,
            defense,
        }
    }
}

/// A second, unrelated record shape keyed by a differently named field.
#[derive(Clone, Debug, PartialEq, Deserialize, Record)]
pub struct Trainer {
    #[record(id)]
    pub name: String,
    pub badges: u8,
}
