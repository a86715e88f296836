use super::error::RelayError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const STARTING_LIFE: i64 = 20;
pub const STARTING_SCORE: i64 = 0;

/// Wire form of a match's state, as sent in `estado` broadcasts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSnapshot {
    #[serde(rename = "turno")]
    pub turn: u64,
    #[serde(rename = "jogador_da_vez")]
    pub current_player: Option<String>,
    #[serde(rename = "vida")]
    pub life: BTreeMap<String, i64>,
    #[serde(rename = "pontuacao")]
    pub score: BTreeMap<String, i64>,
}

/// Turn-based state of one match (pure logic, no I/O).
///
/// `turn_order` is the authoritative rotation: names in the order they first
/// joined. Its entries are exactly the keys of `life` and `score`.
#[derive(Debug, Clone, Default)]
pub struct MatchState {
    turn: u64,
    current_player: Option<String>,
    turn_order: Vec<String>,
    life: HashMap<String, i64>,
    score: HashMap<String, i64>,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn current_player(&self) -> Option<&str> {
        self.current_player.as_deref()
    }

    pub fn players(&self) -> &[String] {
        &self.turn_order
    }

    pub fn has_player(&self, name: &str) -> bool {
        self.life.contains_key(name)
    }

    pub fn life_of(&self, name: &str) -> Option<i64> {
        self.life.get(name).copied()
    }

    pub fn score_of(&self, name: &str) -> Option<i64> {
        self.score.get(name).copied()
    }

    /// Track a player. Returns false if the name already has state, which is
    /// left untouched. The first player to arrive takes the first turn.
    pub fn add_player(&mut self, name: &str) -> bool {
        let is_new = !self.has_player(name);
        if is_new {
            self.turn_order.push(name.to_string());
            self.life.insert(name.to_string(), STARTING_LIFE);
            self.score.insert(name.to_string(), STARTING_SCORE);
        }
        if self.current_player.is_none() {
            self.current_player = Some(name.to_string());
        }
        is_new
    }

    /// Advance to the next player in join order, wrapping around
    pub fn pass_turn(&mut self) -> Result<(), RelayError> {
        if self.turn_order.is_empty() {
            return Err(RelayError::EmptyMatchTurnAdvance);
        }

        let next = match self
            .current_player
            .as_ref()
            .and_then(|current| self.turn_order.iter().position(|name| name == current))
        {
            Some(index) => (index + 1) % self.turn_order.len(),
            None => 0,
        };

        self.turn += 1;
        self.current_player = Some(self.turn_order[next].clone());
        Ok(())
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            turn: self.turn,
            current_player: self.current_player.clone(),
            life: self.life.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            score: self.score.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        }
    }
}
