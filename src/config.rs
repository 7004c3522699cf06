use std::io::Read;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::card::{Character, ClanTable};
use crate::error::CoupError;

pub const DEFAULT_WAIT_TIME_MS: u64 = 60_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    Original,
    Inquisitor,
    Reformation,
    ReformationInquisitor,
}

/// In the order they are offered with the `game_type:<n>` buttons.
pub static VARIANTS: [Variant; 4] = [
    Variant::Original,
    Variant::Inquisitor,
    Variant::Reformation,
    Variant::ReformationInquisitor,
];

impl Variant {
    pub fn from_index(index: usize) -> Option<Self> {
        VARIANTS.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Original => "Original",
            Variant::Inquisitor => "Inquisitor",
            Variant::Reformation => "Reformation",
            Variant::ReformationInquisitor => "Reformation + Inquisitor",
        }
    }

    pub fn uses_inquisitor(self) -> bool {
        matches!(self, Variant::Inquisitor | Variant::ReformationInquisitor)
    }

    pub fn is_reformation(self) -> bool {
        matches!(self, Variant::Reformation | Variant::ReformationInquisitor)
    }

    pub fn clan_table(self) -> ClanTable {
        ClanTable::new(self.uses_inquisitor())
    }
}

/// Everything needed to set up a table apart from the player names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// when unset the players pick the version at the table
    pub variant: Option<Variant>,
    pub start_player: Option<usize>,
    pub seed: Option<u64>,
    /// dealt first, in order, before the rest of the shuffled deck
    pub card_overrides: Vec<Character>,
    pub wait_time_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            variant: None,
            start_player: None,
            seed: None,
            card_overrides: Vec::new(),
            wait_time_ms: DEFAULT_WAIT_TIME_MS,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, CoupError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CoupError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn wait_time(&self) -> Duration {
        Duration::from_millis(self.wait_time_ms)
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn with_start_player(mut self, start_player: usize) -> Self {
        self.start_player = Some(start_player);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_card_overrides(mut self, cards: &[Character]) -> Self {
        self.card_overrides = cards.to_vec();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use crate::card::Character::{Duke, Inquisitor};
    use crate::config::{GameConfig, Variant, DEFAULT_WAIT_TIME_MS};
    use crate::error::CoupError;

    #[test]
    fn empty_json_uses_defaults() {
        let config = GameConfig::from_json("{}").unwrap();

        assert_eq!(config, GameConfig::default());
        assert_eq!(config.wait_time(), Duration::from_millis(DEFAULT_WAIT_TIME_MS));
    }

    #[test]
    fn full_json() {
        let config = GameConfig::from_json(r#"{
            "variant": "ReformationInquisitor",
            "start_player": 1,
            "seed": 42,
            "card_overrides": ["Duke", "Inquisitor"],
            "wait_time_ms": 500
        }"#).unwrap();

        assert_eq!(config.variant, Some(Variant::ReformationInquisitor));
        assert_eq!(config.start_player, Some(1));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.card_overrides, vec![Duke, Inquisitor]);
        assert_eq!(config.wait_time(), Duration::from_millis(500));
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let err = GameConfig::from_json(r#"{"variant": "Chess"}"#).unwrap_err();
        assert!(matches!(err, CoupError::Config(_)));
    }

    #[test]
    fn variant_indexes() {
        for index in 0..4 {
            assert_eq!(Variant::from_index(index).unwrap().index(), index);
        }
        assert_eq!(Variant::from_index(4), None);

        assert!(!Variant::Original.uses_inquisitor());
        assert!(!Variant::Original.is_reformation());
        assert!(Variant::Inquisitor.uses_inquisitor());
        assert!(Variant::Reformation.is_reformation());
        assert!(!Variant::Reformation.uses_inquisitor());
        assert!(Variant::ReformationInquisitor.uses_inquisitor());
        assert!(Variant::ReformationInquisitor.is_reformation());
    }
}
