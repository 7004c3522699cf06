use std::fmt::{Display, Formatter};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::card::Character::{Ambassador, Assassin, Captain, Contessa, Duke, Inquisitor};

pub const CARDS_PER_CLAN: usize = 3;
pub const CARDS_PER_PLAYER: usize = 2;
pub const TOTAL_CARDS: usize = CLAN_VARIANTS.len() * CARDS_PER_CLAN;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Character {
    Duke,
    Assassin,
    Contessa,
    Captain,
    Ambassador,
    Inquisitor,
}

pub static CHARACTER_VARIANTS: [Character; 6] = [
    Duke,
    Assassin,
    Contessa,
    Captain,
    Ambassador,
    Inquisitor,
];

impl Character {
    pub fn name(self) -> &'static str {
        match self {
            Duke => "Duke",
            Assassin => "Assassin",
            Contessa => "Contessa",
            Captain => "Captain",
            Ambassador => "Ambassador",
            Inquisitor => "Inquisitor",
        }
    }

    /// The name as it appears inside a sentence, ie "the duke".
    pub fn object_name(self) -> &'static str {
        match self {
            Duke => "the duke",
            Assassin => "the assassin",
            Contessa => "the contessa",
            Captain => "the captain",
            Ambassador => "the ambassador",
            Inquisitor => "the inquisitor",
        }
    }

    pub fn clan(self) -> Clan {
        match self {
            Duke => Clan::TaxCollectors,
            Captain => Clan::Thieves,
            Contessa => Clan::Intouchables,
            Assassin => Clan::Assassins,
            Ambassador | Inquisitor => Clan::Negotiators,
        }
    }
}

impl Display for Character {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The role a character plays. A claim is always a claim about a clan, the
/// variant decides which character stands for it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Clan {
    TaxCollectors,
    Thieves,
    Intouchables,
    Assassins,
    Negotiators,
}

pub static CLAN_VARIANTS: [Clan; 5] = [
    Clan::TaxCollectors,
    Clan::Thieves,
    Clan::Intouchables,
    Clan::Assassins,
    Clan::Negotiators,
];

impl Clan {
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClanSet(u8);

impl ClanSet {
    pub const EMPTY: ClanSet = ClanSet(0);

    pub fn of(clan: Clan) -> Self {
        ClanSet(clan.bit())
    }

    pub fn with(self, clan: Clan) -> Self {
        ClanSet(self.0 | clan.bit())
    }

    pub fn contains(self, clan: Clan) -> bool {
        self.0 & clan.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item=Clan> {
        CLAN_VARIANTS.iter().copied().filter(move |&clan| self.contains(clan))
    }
}

/// Which character represents each clan in the current variant. Built once
/// when the variant is known and never mutated afterwards.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClanTable {
    characters: [Character; 5],
}

impl ClanTable {
    pub fn new(uses_inquisitor: bool) -> Self {
        let negotiator = if uses_inquisitor { Inquisitor } else { Ambassador };

        Self {
            characters: [Duke, Captain, Contessa, Assassin, negotiator],
        }
    }

    pub fn character(&self, clan: Clan) -> Character {
        self.characters[clan as usize]
    }

    pub fn characters(&self) -> impl Iterator<Item=Character> + '_ {
        self.characters.iter().copied()
    }

    pub fn contains(&self, character: Character) -> bool {
        self.characters.contains(&character)
    }

    /// Lists the clans' characters for a sentence, eg "the captain or the ambassador".
    pub fn describe(&self, clans: ClanSet) -> String {
        let names: Vec<&str> = clans
            .iter()
            .map(|clan| self.character(clan).object_name())
            .collect();

        join_names(&names, " or ")
    }
}

/// "a", "a or b", "a, b or c"
pub fn join_names(names: &[&str], final_separator: &str) -> String {
    match names.split_last() {
        None => String::new(),
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{}{}{}", rest.join(", "), final_separator, last),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub character: Character,
    pub dead: bool,
}

impl Card {
    pub fn new(character: Character) -> Self {
        Self { character, dead: false }
    }
}

/// The draw pile. The logical top of the deck is the end of the vec, cards
/// that come back from a hand are pushed there before the deck is reshuffled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Character>,
}

impl Deck {
    /// Builds a shuffled deck of three copies of every clan's character. The
    /// overrides are then moved to the top in order so that they are the
    /// first cards to be drawn.
    pub fn new<R: Rng + ?Sized>(table: &ClanTable, overrides: &[Character], rng: &mut R) -> Self {
        let mut deck = Self {
            cards: table.characters()
                .flat_map(|card| std::iter::repeat(card).take(CARDS_PER_CLAN))
                .collect(),
        };

        deck.shuffle(rng);

        let mut dst = deck.cards.len();

        for &card in overrides {
            match deck.cards[..dst].iter().position(|&c| c == card) {
                Some(pos) => {
                    dst -= 1;
                    deck.cards.swap(pos, dst);
                }
                None => {
                    log::warn!("card override {card:?} is not available in the deck, skipping it");
                }
            }
        }

        deck
    }

    /// Checks that a deck built from `table` can honour every override.
    pub fn can_supply(table: &ClanTable, overrides: &[Character]) -> bool {
        CHARACTER_VARIANTS.iter().all(|&character| {
            let wanted = overrides.iter().filter(|&&c| c == character).count();
            wanted == 0 || (table.contains(character) && wanted <= CARDS_PER_CLAN)
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Character] {
        &self.cards
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn take(&mut self) -> Character {
        self.cards.pop().expect("tried to draw from an empty deck")
    }

    pub fn put_back(&mut self, card: Character) {
        self.cards.push(card);
    }

    pub fn count(&self, character: Character) -> usize {
        self.cards.iter().filter(|&&c| c == character).count()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use crate::card::{Clan, ClanSet, ClanTable, Deck, CARDS_PER_CLAN, TOTAL_CARDS};
    use crate::card::Character::{Ambassador, Assassin, Captain, Contessa, Duke, Inquisitor};

    #[test]
    fn deck_has_three_of_each_clan() {
        let mut rng = Pcg64::seed_from_u64(7);
        let table = ClanTable::new(false);
        let deck = Deck::new(&table, &[], &mut rng);

        assert_eq!(deck.len(), TOTAL_CARDS);
        for character in table.characters() {
            assert_eq!(deck.count(character), CARDS_PER_CLAN);
        }
        assert_eq!(deck.count(Inquisitor), 0);
    }

    #[test]
    fn inquisitor_replaces_ambassador() {
        let mut rng = Pcg64::seed_from_u64(7);
        let table = ClanTable::new(true);
        let deck = Deck::new(&table, &[], &mut rng);

        assert_eq!(deck.count(Ambassador), 0);
        assert_eq!(deck.count(Inquisitor), CARDS_PER_CLAN);
        assert_eq!(table.character(Clan::Negotiators), Inquisitor);
    }

    #[test]
    fn overrides_are_drawn_first() {
        let mut rng = Pcg64::seed_from_u64(99);
        let table = ClanTable::new(false);
        let mut deck = Deck::new(&table, &[Contessa, Contessa, Duke, Assassin], &mut rng);

        assert_eq!(deck.take(), Contessa);
        assert_eq!(deck.take(), Contessa);
        assert_eq!(deck.take(), Duke);
        assert_eq!(deck.take(), Assassin);
        assert_eq!(deck.len(), TOTAL_CARDS - 4);
    }

    #[test]
    fn can_supply_checks_variant_and_counts() {
        let original = ClanTable::new(false);
        let inquisitor = ClanTable::new(true);

        assert!(Deck::can_supply(&original, &[Duke, Duke, Duke, Ambassador]));
        assert!(!Deck::can_supply(&original, &[Duke, Duke, Duke, Duke]));
        assert!(!Deck::can_supply(&original, &[Inquisitor]));
        assert!(Deck::can_supply(&inquisitor, &[Inquisitor, Captain]));
        assert!(!Deck::can_supply(&inquisitor, &[Ambassador]));
    }

    #[test]
    fn describe_clans() {
        let table = ClanTable::new(false);

        assert_eq!(table.describe(ClanSet::of(Clan::TaxCollectors)), "the duke");
        assert_eq!(
            table.describe(ClanSet::of(Clan::Negotiators).with(Clan::Thieves)),
            "the captain or the ambassador"
        );
        assert_eq!(
            table.describe(ClanSet::of(Clan::Negotiators).with(Clan::Thieves).with(Clan::TaxCollectors)),
            "the duke, the captain or the ambassador"
        );
        assert_eq!(table.describe(ClanSet::EMPTY), "");
    }
}
