pub mod action;
pub mod ai;
pub mod card;
pub mod challenge;
pub mod config;
pub mod error;
pub mod host;
pub mod resolver;
pub mod stack;
pub mod transcript;

#[cfg(test)]
mod testing;

pub use action::Action;
pub use card::{Card, Character, Clan};
pub use config::{GameConfig, Variant};
pub use error::CoupError;
pub use host::{Button, Host, RecordingHost, TimerId};

use std::fmt::{Debug, Formatter};
use std::time::Duration;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use crate::card::{ClanSet, ClanTable, Deck, CARDS_PER_PLAYER};
use crate::config::VARIANTS;
use crate::stack::{Frame, Stack};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;
pub const START_COINS: u32 = 2;
pub const COUP_COST: u32 = 7;
pub const ASSASSINATION_COST: u32 = 3;
pub const FORCED_COUP_COINS: u32 = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Allegiance {
    Loyalist,
    Reformist,
}

impl Allegiance {
    /// Seats alternate between the two allegiances.
    fn for_seat(seat: usize) -> Self {
        if seat & 1 == 0 {
            Allegiance::Loyalist
        } else {
            Allegiance::Reformist
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Allegiance::Loyalist => Allegiance::Reformist,
            Allegiance::Reformist => Allegiance::Loyalist,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Allegiance::Loyalist => "👑",
            Allegiance::Reformist => "✊",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub coins: u32,
    // empty until the cards are dealt, then always two
    pub cards: Vec<Card>,
    pub allegiance: Allegiance,
}

impl Player {
    pub fn is_alive(&self) -> bool {
        self.cards.iter().any(|card| !card.dead)
    }

    pub fn living_cards(&self) -> impl Iterator<Item=usize> + '_ {
        self.cards
            .iter()
            .enumerate()
            .filter_map(|(slot, card)| if card.dead { None } else { Some(slot) })
    }

    pub fn living_count(&self) -> usize {
        self.living_cards().count()
    }

    /// The slot of the only card left alive, if there is exactly one.
    pub fn single_living_card(&self) -> Option<usize> {
        let mut living = self.living_cards();
        match (living.next(), living.next()) {
            (Some(slot), None) => Some(slot),
            _ => None,
        }
    }

    /// Whether any living card belongs to one of the clans.
    pub fn holds(&self, clans: ClanSet) -> bool {
        self.cards.iter().any(|card| !card.dead && clans.contains(card.character.clan()))
    }
}

/// A single table of Coup.
///
/// The game is driven entirely from the outside: button presses come in
/// through `handle_action` and expired timers through `handle_timeout`.
/// Between calls the game's progress lives on the continuation stack.
pub struct Coup<H: Host> {
    pub(crate) host: H,
    pub(crate) rng: Pcg64,
    pub(crate) players: Vec<Player>,
    pub(crate) deck: Deck,
    pub(crate) stack: Stack,
    pub(crate) current_player: usize,
    pub(crate) variant: Option<Variant>,
    pub(crate) clans: ClanTable,
    pub(crate) treasury: u32,
    pub(crate) action_taken: bool,
    pub(crate) wait_time: Duration,
    card_overrides: Vec<Character>,
    game_over_timer: Option<TimerId>,
    over: bool,
}

impl<H: Host> Debug for Coup<H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let frames: Vec<&str> = self.stack.iter().map(Frame::name).collect();
        f.write_str(format!("P {} | T ${} | {:?}\n", self.current_player, self.treasury, frames).as_str())?;
        for (player_idx, player) in self.players.iter().enumerate() {
            f.write_str(format!("\tP {player_idx}: ${} | {:?} | {:?}\n", player.coins, player.allegiance, player.cards).as_str())?;
        }
        Ok(())
    }
}

impl<H: Host> Coup<H> {
    pub fn new(host: H, names: Vec<String>, config: GameConfig) -> Result<Self, CoupError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&names.len()) {
            return Err(CoupError::InvalidPlayerCount(names.len()));
        }

        if let Some(idx) = names.iter().position(|name| name.trim().is_empty()) {
            return Err(CoupError::EmptyName(idx));
        }

        if let Some(start) = config.start_player {
            if start >= names.len() {
                return Err(CoupError::StartPlayerOutOfRange { start, players: names.len() });
            }
        }

        let can_supply = match config.variant {
            Some(variant) => Deck::can_supply(&variant.clan_table(), &config.card_overrides),
            None => VARIANTS.iter().any(|v| Deck::can_supply(&v.clan_table(), &config.card_overrides)),
        };
        if !can_supply {
            return Err(CoupError::ImpossibleOverrides);
        }

        let mut rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };

        let current_player = match config.start_player {
            Some(start) => start,
            None => rng.gen_range(0..names.len()),
        };

        let players = names
            .into_iter()
            .enumerate()
            .map(|(seat, name)| Player {
                name,
                coins: START_COINS,
                cards: Vec::with_capacity(CARDS_PER_PLAYER),
                allegiance: Allegiance::for_seat(seat),
            })
            .collect();

        let mut coup = Self {
            host,
            rng,
            players,
            deck: Deck::default(),
            stack: Stack::new(),
            current_player,
            variant: None,
            clans: ClanTable::new(false),
            treasury: 0,
            action_taken: false,
            wait_time: config.wait_time(),
            card_overrides: config.card_overrides,
            game_over_timer: None,
            over: false,
        };

        coup.stack.push(Frame::ChooseAction);

        match config.variant {
            Some(variant) => coup.start_game(variant),
            None => {
                coup.stack.push(Frame::ChooseGameType);
                coup.send_game_type_prompt();
            }
        }

        Ok(coup)
    }

    /// Feeds a button press into the game. Anything that isn't valid for
    /// whatever the game is currently waiting on is ignored.
    pub fn handle_action(&mut self, player: usize, data: &str) {
        if player >= self.players.len() {
            log::debug!("ignoring {data:?} from unknown player {player}");
            return;
        }

        if self.over {
            log::debug!("ignoring {data:?} from player {player}, the game is over");
            return;
        }

        let Some(action) = Action::parse(data) else {
            log::debug!("ignoring unknown button data {data:?} from player {player}");
            return;
        };

        log::debug!("player {player} {action:?}");

        self.dispatch(player, action);
        self.drain_idle();
    }

    pub fn press(&mut self, player: usize, action: Action) {
        self.handle_action(player, &action.data());
    }

    /// Called by the host when a timer armed by this game expires.
    pub fn handle_timeout(&mut self, id: TimerId) {
        if self.game_over_timer == Some(id) {
            self.game_over_timer = None;
            log::info!("game over, winner {:?}", self.winner());
            self.host.game_over();
            return;
        }

        match self.stack.top_mut() {
            Some(Frame::Challenge(ctx)) if ctx.timer == Some(id) => {
                ctx.timer = None;
                log::debug!("nobody objected in time, accepting");
                self.resolve_challenge();
                self.drain_idle();
            }
            _ => log::warn!("ignoring stale timer {id:?}"),
        }
    }

    fn dispatch(&mut self, player: usize, action: Action) {
        match self.stack.top() {
            None => {}
            Some(Frame::ChooseAction) => self.choose_action_input(player, action),
            Some(Frame::ChooseGameType) => self.choose_game_type_input(action),
            Some(&Frame::LoseCard { player: loser }) => self.lose_card_input(player, loser, action),
            Some(Frame::Challenge(_)) => self.challenge_input(player, action),
            Some(Frame::Reveal(_)) => self.reveal_input(player, action),
            Some(Frame::Exchange(_)) => self.exchange_input(player, action),
            Some(Frame::Interrogate(_)) => self.interrogate_input(player, action),
        }
    }

    /// Lets the frames move on by themselves until one of them needs input.
    fn drain_idle(&mut self) {
        while self.action_taken {
            self.action_taken = false;

            match self.stack.top() {
                Some(Frame::ChooseAction) => self.choose_action_idle(),
                Some(&Frame::LoseCard { player }) => self.lose_card_idle(player),
                Some(Frame::Challenge(_)) => self.challenge_idle(),
                Some(Frame::Reveal(_)) => self.reveal_idle(),
                Some(Frame::Exchange(_)) => self.exchange_idle(),
                Some(Frame::Interrogate(_)) => self.interrogate_idle(),
                Some(Frame::ChooseGameType) | None => break,
            }
        }
    }

    pub(crate) fn take_action(&mut self) {
        self.action_taken = true;
    }

    /// Pops the top frame, releasing anything it still holds on to.
    pub(crate) fn pop_frame(&mut self) -> Frame {
        let frame = self.stack.pop();

        if let Some(timer) = frame.timer() {
            self.host.cancel(timer);
        }

        frame
    }

    fn send_game_type_prompt(&mut self) {
        let buttons: Vec<Button> = VARIANTS
            .iter()
            .map(|v| Button::new(v.name(), Action::GameType(v.index()).data()))
            .collect();

        self.host.send_broadcast("Please choose which version of the game you want to play.", &buttons);
    }

    fn choose_game_type_input(&mut self, action: Action) {
        let Action::GameType(index) = action else { return };
        let Some(variant) = Variant::from_index(index) else { return };

        self.pop_frame();
        self.note(&format!("The chosen version is: {}", variant.name()));
        self.start_game(variant);
    }

    fn start_game(&mut self, variant: Variant) {
        log::info!("starting a {} game with {} players", variant.name(), self.players.len());

        self.variant = Some(variant);
        self.clans = variant.clan_table();
        self.deck = Deck::new(&self.clans, &self.card_overrides, &mut self.rng);

        for player_idx in 0..self.players.len() {
            let cards = vec![Card::new(self.deck.take()), Card::new(self.deck.take())];
            self.players[player_idx].cards = cards;
        }

        // the first player gets a handicap when there are only two
        if self.players.len() == 2 {
            self.players[self.current_player].coins -= 1;
        }

        for player_idx in 0..self.players.len() {
            self.show_cards(player_idx);
        }

        self.show_stats();
    }

    // the turn is over once the stack has drained back down to choosing an action
    fn choose_action_idle(&mut self) {
        let mut next = self.current_player;

        loop {
            next = (next + 1) % self.players.len();

            if next == self.current_player || self.players[next].is_alive() {
                break;
            }
        }

        self.current_player = next;
        self.show_stats();
    }

    fn show_stats(&mut self) {
        let finished = self.is_finished();
        let reformation = self.is_reformation();
        let mut text = String::new();
        let mut winner = None;

        for (player_idx, player) in self.players.iter().enumerate() {
            let alive = player.is_alive();

            if finished {
                if alive {
                    text.push_str("🏆 ");
                }
            } else if player_idx == self.current_player {
                text.push_str("👉 ");
            }

            text.push_str(&player.name);
            text.push_str(":\n");

            for card in &player.cards {
                if card.dead {
                    text.push('☠');
                    text.push_str(card.character.name());
                    text.push('☠');
                } else {
                    text.push_str("🂠");
                }
            }

            if alive {
                text.push_str(", ");
                text.push_str(&coins_text(player.coins));

                if reformation {
                    text.push(' ');
                    text.push_str(player.allegiance.symbol());
                }

                winner = Some(player_idx);
            }

            text.push_str("\n\n");
        }

        if reformation {
            text.push_str(&format!("Treasury: {}\n\n", self.treasury));
        }

        if finished {
            let name = match winner {
                Some(winner) => self.players[winner].name.as_str(),
                None => "Nobody",
            };
            text.push_str(&format!("{name} won!"));
        } else {
            let name = &self.players[self.current_player].name;
            text.push_str(&format!("{name}, it’s your turn. What do you want to do?"));
        }

        let buttons = if finished { Vec::new() } else { self.turn_buttons() };

        self.host.send_broadcast(&text, &buttons);

        if finished && !self.over {
            self.over = true;
            self.game_over_timer = Some(self.host.arm_timeout(Duration::ZERO));
        }
    }

    pub(crate) fn note(&mut self, text: &str) {
        self.host.send_broadcast(text, &[]);
    }

    /// Privately tells a living player what they are holding.
    pub(crate) fn show_cards(&mut self, player_idx: usize) {
        let player = &self.players[player_idx];

        if !player.is_alive() {
            return;
        }

        let mut text = String::from("Your cards are:");

        for card in &player.cards {
            text.push('\n');
            if card.dead {
                text.push('☠');
                text.push_str(card.character.name());
                text.push('☠');
            } else {
                text.push_str(card.character.name());
            }
        }

        self.host.send_private(player_idx, &text, &[]);
    }

    pub(crate) fn name(&self, player_idx: usize) -> &str {
        &self.players[player_idx].name
    }

    pub fn is_reformation(&self) -> bool {
        self.variant.map_or(false, Variant::is_reformation)
    }

    /// True once every living player shares the same allegiance.
    pub fn is_reunified(&self) -> bool {
        let mut living = self.players.iter().filter(|p| p.is_alive()).map(|p| p.allegiance);

        match living.next() {
            Some(first) => living.all(|allegiance| allegiance == first),
            None => true,
        }
    }

    /// Whether `other` is shielded from `actor` by sharing their allegiance.
    pub(crate) fn allegiance_protects(&self, actor: usize, other: usize) -> bool {
        self.is_reformation()
            && !self.is_reunified()
            && self.players[actor].allegiance == self.players[other].allegiance
    }

    pub(crate) fn is_valid_target(&self, actor: usize, target: usize) -> bool {
        target < self.players.len()
            && target != actor
            && self.players[target].is_alive()
            && !self.allegiance_protects(actor, target)
    }

    /// True when at most one player is left standing.
    pub fn is_finished(&self) -> bool {
        self.variant.is_some() && self.players.iter().filter(|p| p.is_alive()).count() <= 1
    }

    /// True once the final status has gone out, from then on input is ignored.
    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn winner(&self) -> Option<usize> {
        if !self.is_finished() {
            return None;
        }

        self.players.iter().position(|p| p.is_alive())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_idx: usize) -> &Player {
        &self.players[player_idx]
    }

    pub fn current_player(&self) -> usize {
        self.current_player
    }

    pub fn treasury(&self) -> u32 {
        self.treasury
    }

    pub fn variant(&self) -> Option<Variant> {
        self.variant
    }

    pub fn clan_table(&self) -> &ClanTable {
        &self.clans
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn wait_time(&self) -> Duration {
        self.wait_time
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn top_frame(&self) -> Option<&Frame> {
        self.stack.top()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Every card in the game wherever it currently is: the deck, the hands
    /// and the cards on offer during an exchange.
    pub fn card_count(&self) -> usize {
        let mut count = self.deck.len() + self.players.iter().map(|p| p.cards.len()).sum::<usize>();

        for frame in self.stack.iter() {
            if let Frame::Exchange(ctx) = frame {
                count = count - self.players[ctx.player].cards.len() + ctx.hand.len() + ctx.offered.len();
            }
        }

        count
    }

    /// All the presses that would currently do something, as (player, action).
    pub fn actions(&self) -> Vec<(usize, Action)> {
        let mut actions = Vec::with_capacity(self.players.len() * 3);

        if self.over {
            return actions;
        }

        match self.stack.top() {
            None => {}
            Some(Frame::ChooseGameType) => {
                for player_idx in 0..self.players.len() {
                    for variant in VARIANTS {
                        actions.push((player_idx, Action::GameType(variant.index())));
                    }
                }
            }
            Some(Frame::ChooseAction) => {
                let player = self.current_player;
                for action in self.turn_actions() {
                    actions.push((player, action));
                }
            }
            Some(&Frame::LoseCard { player }) => {
                for slot in self.players[player].living_cards() {
                    actions.push((player, Action::Lose(slot)));
                }
            }
            Some(Frame::Challenge(ctx)) => {
                for (player_idx, player) in self.players.iter().enumerate() {
                    if player_idx == ctx.actor || !player.is_alive() {
                        continue;
                    }

                    actions.push((player_idx, Action::Accept));

                    if ctx.challengeable {
                        actions.push((player_idx, Action::Challenge));
                    }

                    if ctx.blockable && self.can_block(ctx, player_idx) {
                        actions.push((player_idx, Action::Block));
                    }
                }
            }
            Some(Frame::Reveal(reveal)) => {
                let challenged = &self.players[reveal.challenged];

                if reveal.inverted {
                    actions.push((reveal.challenged, Action::Reveal(0)));
                    if !challenged.holds(reveal.clans) {
                        actions.push((reveal.challenged, Action::Reveal(1)));
                    }
                } else {
                    for slot in challenged.living_cards() {
                        actions.push((reveal.challenged, Action::Reveal(slot)));
                    }
                }
            }
            Some(Frame::Exchange(ctx)) => {
                for index in 0..ctx.offered.len() {
                    actions.push((ctx.player, Action::Keep(index)));
                }
            }
            Some(Frame::Interrogate(ctx)) => match ctx.shown {
                None => {
                    for slot in self.players[ctx.target].living_cards() {
                        actions.push((ctx.target, Action::Show(slot)));
                    }
                }
                Some(_) => {
                    actions.push((ctx.inquisitor, Action::CanKeep(true)));
                    actions.push((ctx.inquisitor, Action::CanKeep(false)));
                }
            },
        }

        actions
    }
}

impl Coup<RecordingHost> {
    /// Moves the host's clock forward and delivers every timer that expires,
    /// including ones armed with no delay while handling the others.
    pub fn advance(&mut self, by: Duration) {
        let mut due = self.host.advance(by);

        while !due.is_empty() {
            for id in due {
                self.handle_timeout(id);
            }

            due = self.host.advance(Duration::ZERO);
        }
    }
}

pub(crate) fn coins_text(coins: u32) -> String {
    if coins == 1 {
        "1 coin".to_string()
    } else {
        format!("{coins} coins")
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use crate::card::Character::{Ambassador, Assassin, Captain, Contessa, Duke};
    use crate::card::TOTAL_CARDS;
    use crate::config::{GameConfig, Variant};
    use crate::error::CoupError;
    use crate::host::{Recipient, RecordingHost};
    use crate::stack::Frame;
    use crate::testing::{game, names, press, status_buttons};
    use crate::{Action, Coup};

    #[test]
    fn rejects_bad_tables() {
        let config = GameConfig::default().with_variant(Variant::Original);

        let err = Coup::new(RecordingHost::new(), names(1), config.clone()).unwrap_err();
        assert!(matches!(err, CoupError::InvalidPlayerCount(1)));

        let err = Coup::new(RecordingHost::new(), names(7), config.clone()).unwrap_err();
        assert!(matches!(err, CoupError::InvalidPlayerCount(7)));

        let err = Coup::new(RecordingHost::new(), vec!["Alice".into(), " ".into()], config.clone()).unwrap_err();
        assert!(matches!(err, CoupError::EmptyName(1)));

        let err = Coup::new(RecordingHost::new(), names(3), config.clone().with_start_player(3)).unwrap_err();
        assert!(matches!(err, CoupError::StartPlayerOutOfRange { start: 3, players: 3 }));

        let err = Coup::new(RecordingHost::new(), names(3), config.with_card_overrides(&[Duke, Duke, Duke, Duke])).unwrap_err();
        assert!(matches!(err, CoupError::ImpossibleOverrides));
    }

    #[test]
    fn deals_and_shows_status() {
        let coup = game(3, Variant::Original, 1, &[Duke, Captain, Contessa, Assassin, Ambassador, Duke]);

        assert_eq!(coup.player(0).cards[0].character, Duke);
        assert_eq!(coup.player(0).cards[1].character, Captain);
        assert_eq!(coup.player(1).cards[0].character, Contessa);
        assert_eq!(coup.player(2).cards[1].character, Duke);
        assert_eq!(coup.card_count(), TOTAL_CARDS);
        assert_eq!(coup.current_player(), 1);

        // everybody got to see their own cards
        for player_idx in 0..3 {
            assert!(coup.host().last_private(player_idx).unwrap().text.starts_with("Your cards are:"));
        }
        assert_eq!(
            coup.host().last_private(0).unwrap().text,
            "Your cards are:\nDuke\nCaptain"
        );

        let status = coup.host().last_broadcast().unwrap();
        assert_eq!(
            status.text,
            "Alice:\n🂠🂠, 2 coins\n\n\
             👉 Bob:\n🂠🂠, 2 coins\n\n\
             Charles:\n🂠🂠, 2 coins\n\n\
             Bob, it’s your turn. What do you want to do?"
        );
        assert_eq!(
            status.button_data(),
            vec!["income", "foreign_aid", "tax", "exchange", "steal"]
        );
    }

    #[test]
    fn two_player_handicap() {
        let coup = game(2, Variant::Original, 1, &[]);

        assert_eq!(coup.player(0).coins, 2);
        assert_eq!(coup.player(1).coins, 1);
    }

    #[test]
    fn income_passes_the_turn() {
        let mut coup = game(3, Variant::Original, 0, &[]);

        press(&mut coup, 0, "income");

        assert_eq!(coup.player(0).coins, 3);
        assert_eq!(coup.current_player(), 1);
        assert!(coup.host().broadcasts().any(|m| m == "💲 Alice takes 1 coin of income"));
    }

    #[test]
    fn only_the_current_player_acts() {
        let mut coup = game(3, Variant::Original, 0, &[]);
        coup.host_mut().clear();

        press(&mut coup, 1, "income");
        press(&mut coup, 0, "bogus");
        press(&mut coup, 0, "income:3");
        press(&mut coup, 9, "income");

        assert!(coup.host().messages().is_empty());
        assert_eq!(coup.current_player(), 0);
        assert_eq!(coup.player(1).coins, 2);
    }

    #[test]
    fn foreign_aid_times_out() {
        let mut coup = game(2, Variant::Original, 1, &[]);

        // make it the turn of the player that starts with 2 coins
        press(&mut coup, 1, "income");
        assert_eq!(coup.current_player(), 0);
        assert_eq!(coup.player(0).coins, 2);

        press(&mut coup, 0, "foreign_aid");
        let prompt = coup.host().last_broadcast().unwrap();
        assert_eq!(
            prompt.text,
            "💴 Alice receives 2 coins from foreign aid.\n\
             Does somebody want to claim to have the duke and block them?"
        );
        assert_eq!(prompt.button_data(), vec!["block", "accept"]);

        coup.advance(Duration::from_secs(59));
        assert_eq!(coup.player(0).coins, 2);

        coup.advance(Duration::from_secs(1));
        assert_eq!(coup.player(0).coins, 4);
        assert_eq!(coup.current_player(), 1);
        assert_eq!(coup.host().pending_timers(), 0);
    }

    #[test]
    fn accepting_early_cancels_the_timer() {
        let mut coup = game(3, Variant::Original, 0, &[]);

        press(&mut coup, 0, "foreign_aid");
        assert_eq!(coup.host().pending_timers(), 1);

        press(&mut coup, 1, "accept");
        coup.advance(Duration::from_secs(59));
        press(&mut coup, 2, "accept");

        assert_eq!(coup.player(0).coins, 4);
        assert_eq!(coup.current_player(), 1);
        assert_eq!(coup.host().pending_timers(), 0);

        // right about when the old timer would have gone off
        coup.host_mut().clear();
        coup.advance(Duration::from_secs(2));
        assert!(coup.host().messages().is_empty());
        assert_eq!(coup.player(0).coins, 4);
    }

    #[test]
    fn stale_timer_is_ignored() {
        let mut coup = game(3, Variant::Original, 0, &[]);

        press(&mut coup, 0, "foreign_aid");
        press(&mut coup, 1, "accept");
        press(&mut coup, 2, "accept");
        coup.host_mut().clear();

        coup.handle_timeout(crate::TimerId(0));
        coup.handle_timeout(crate::TimerId(1234));

        assert!(coup.host().messages().is_empty());
        assert_eq!(coup.player(0).coins, 4);
    }

    #[test]
    fn second_drain_is_a_no_op() {
        let mut coup = game(3, Variant::Original, 0, &[]);

        press(&mut coup, 0, "tax");
        let depth = coup.stack_depth();
        coup.host_mut().clear();

        coup.drain_idle();

        assert!(coup.host().messages().is_empty());
        assert_eq!(coup.stack_depth(), depth);
    }

    #[test]
    fn ten_coins_forces_a_coup() {
        let mut coup = game(3, Variant::Original, 0, &[]);
        coup.players[0].coins = 10;
        coup.show_stats();

        assert_eq!(status_buttons(&coup), vec!["coup"]);
        assert!(coup.actions().iter().all(|(_, a)| matches!(a, Action::Coup(Some(_)))));

        press(&mut coup, 0, "income");
        assert_eq!(coup.player(0).coins, 10);

        press(&mut coup, 0, "coup");
        let prompt = coup.host().last_broadcast().unwrap();
        assert_eq!(prompt.text, "Alice, who do you want to kill during the coup?");
        assert_eq!(prompt.button_data(), vec!["coup:1", "coup:2"]);

        press(&mut coup, 0, "coup:2");
        assert_eq!(coup.player(0).coins, 3);
        assert!(matches!(coup.top_frame(), Some(Frame::LoseCard { player: 2 })));
        assert_eq!(coup.host().last_private(2).unwrap().button_data(), vec!["lose:0", "lose:1"]);

        press(&mut coup, 2, "lose:1");
        assert!(coup.player(2).cards[1].dead);
        assert_eq!(coup.current_player(), 1);
    }

    #[test]
    fn dead_players_are_skipped() {
        let mut coup = game(3, Variant::Original, 0, &[]);
        coup.players[1].cards[0].dead = true;
        coup.players[1].cards[1].dead = true;

        press(&mut coup, 0, "income");
        assert_eq!(coup.current_player(), 2);

        press(&mut coup, 2, "steal");
        assert_eq!(coup.host().last_broadcast().unwrap().button_data(), vec!["steal:0"]);

        press(&mut coup, 2, "steal:1");
        assert!(matches!(coup.top_frame(), Some(Frame::ChooseAction)));
    }

    #[test]
    fn last_player_standing_wins() {
        let mut coup = game(2, Variant::Original, 0, &[Duke, Captain, Contessa, Assassin]);
        coup.players[0].coins = 7;
        coup.players[1].cards[0].dead = true;

        press(&mut coup, 0, "coup:1");

        assert!(coup.is_finished());
        assert!(coup.is_over());
        assert_eq!(coup.winner(), Some(0));

        let status = coup.host().last_broadcast().unwrap();
        assert!(status.text.starts_with("🏆 Alice:\n🂠🂠, 0 coins\n\nBob:\n☠Contessa☠☠Assassin☠\n\n"));
        assert!(status.text.ends_with("Alice won!"));
        assert!(status.buttons.is_empty());

        // game over is reported exactly once, from a zero delay timer
        assert_eq!(coup.host().game_over_count(), 0);
        coup.advance(Duration::ZERO);
        assert_eq!(coup.host().game_over_count(), 1);
        coup.advance(Duration::from_secs(3600));
        assert_eq!(coup.host().game_over_count(), 1);

        // nothing happens after the game is over
        coup.host_mut().clear();
        press(&mut coup, 0, "income");
        assert!(coup.host().messages().is_empty());
        assert!(coup.actions().is_empty());
    }

    #[test]
    fn players_choose_the_variant() {
        let mut coup = Coup::new(
            RecordingHost::new(),
            names(3),
            GameConfig::default().with_start_player(0).with_seed(3),
        ).unwrap();

        let prompt = coup.host().last_broadcast().unwrap();
        assert_eq!(prompt.text, "Please choose which version of the game you want to play.");
        assert_eq!(prompt.button_data(), vec!["game_type:0", "game_type:1", "game_type:2", "game_type:3"]);
        assert_eq!(coup.variant(), None);
        assert!(!coup.is_finished());

        // turn actions aren't available yet
        press(&mut coup, 0, "income");
        assert_eq!(coup.variant(), None);
        press(&mut coup, 2, "game_type:4");
        assert_eq!(coup.variant(), None);

        // anybody can pick
        press(&mut coup, 2, "game_type:1");
        assert_eq!(coup.variant(), Some(Variant::Inquisitor));
        assert_eq!(coup.current_player(), 0);
        assert_eq!(coup.card_count(), TOTAL_CARDS);
        assert!(coup.host().broadcasts().any(|m| m == "The chosen version is: Inquisitor"));
        assert_eq!(
            status_buttons(&coup),
            vec!["income", "foreign_aid", "tax", "exchange", "inspect", "steal"]
        );
        assert!(coup.host().messages().iter().any(|m| m.to == Recipient::Player(1)));
    }

    #[test]
    fn same_seed_same_game() {
        let config = GameConfig::default().with_variant(Variant::Original).with_seed(1234);
        let a = Coup::new(RecordingHost::new(), names(4), config.clone()).unwrap();
        let b = Coup::new(RecordingHost::new(), names(4), config).unwrap();

        assert_eq!(a.players(), b.players());
        assert_eq!(a.deck(), b.deck());
        assert_eq!(a.current_player(), b.current_player());
    }
}
