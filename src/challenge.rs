use crate::action::Action;
use crate::card::{join_names, ClanSet};
use crate::host::{Button, Host, TimerId};
use crate::stack::Frame;
use crate::Coup;

/// What happens once a claim goes through unopposed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Accepted {
    ForeignAid,
    Tax,
    Exchange,
    Embezzle,
    Assassinate { target: usize },
    Steal { target: usize },
    Inspect { target: usize },
    /// the frame below gets blocked
    Block,
}

/// A claim waiting for the rest of the table to challenge it, block it or
/// let it through.
#[derive(Clone, Debug)]
pub struct ChallengeContext {
    pub actor: usize,
    pub challengeable: bool,
    pub blockable: bool,
    /// the actor claims *not* to have the challenged clans
    pub inverted: bool,
    pub challenged_clans: ClanSet,
    pub blocking_clans: ClanSet,
    /// when set only this player may block
    pub target: Option<usize>,
    /// bitmask of players that pressed accept since the prompt was last shown
    pub accepted: u32,
    pub timer: Option<TimerId>,
    pub message: String,
    pub on_accept: Accepted,
}

impl ChallengeContext {
    pub fn new(actor: usize, message: String, on_accept: Accepted) -> Self {
        Self {
            actor,
            challengeable: false,
            blockable: false,
            inverted: false,
            challenged_clans: ClanSet::EMPTY,
            blocking_clans: ClanSet::EMPTY,
            target: None,
            accepted: 0,
            timer: None,
            message,
            on_accept,
        }
    }

    pub fn challengeable_by(mut self, clans: ClanSet) -> Self {
        self.challengeable = true;
        self.challenged_clans = clans;
        self
    }

    pub fn blockable_by(mut self, clans: ClanSet, target: Option<usize>) -> Self {
        self.blockable = true;
        self.blocking_clans = clans;
        self.target = target;
        self
    }

    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RevealContext {
    pub challenger: usize,
    pub challenged: usize,
    pub clans: ClanSet,
    pub inverted: bool,
}

impl<H: Host> Coup<H> {
    pub(crate) fn check_challenge(&mut self, ctx: ChallengeContext) {
        debug_assert!(ctx.challengeable || ctx.blockable);

        self.stack.push(Frame::Challenge(Box::new(ctx)));
        self.take_action();
    }

    pub(crate) fn top_challenge(&self) -> &ChallengeContext {
        match self.stack.top() {
            Some(Frame::Challenge(ctx)) => &**ctx,
            other => panic!("expected a challenge on top of the stack, found {other:?}"),
        }
    }

    pub(crate) fn top_challenge_mut(&mut self) -> &mut ChallengeContext {
        match self.stack.top_mut() {
            Some(Frame::Challenge(ctx)) => &mut **ctx,
            other => panic!("expected a challenge on top of the stack, found {other:?}"),
        }
    }

    fn top_reveal(&self) -> RevealContext {
        match self.stack.top() {
            Some(Frame::Reveal(reveal)) => **reveal,
            other => panic!("expected a reveal on top of the stack, found {other:?}"),
        }
    }

    /// Whether `player` is allowed to block the claim.
    pub(crate) fn can_block(&self, ctx: &ChallengeContext, player: usize) -> bool {
        match ctx.target {
            Some(target) => player == target,
            None => !self.allegiance_protects(ctx.actor, player),
        }
    }

    /// The players who have to accept before the claim goes through.
    pub(crate) fn quorum(&self, ctx: &ChallengeContext) -> u32 {
        self.players
            .iter()
            .enumerate()
            .filter(|&(idx, player)| idx != ctx.actor && player.is_alive())
            .filter(|&(idx, _)| ctx.challengeable || (ctx.blockable && self.can_block(ctx, idx)))
            .fold(0, |mask, (idx, _)| mask | 1 << idx)
    }

    pub(crate) fn is_accepted(&self, ctx: &ChallengeContext) -> bool {
        let quorum = self.quorum(ctx);
        ctx.accepted & quorum == quorum
    }

    fn cancel_challenge_timer(&mut self) {
        if let Some(timer) = self.top_challenge_mut().timer.take() {
            self.host.cancel(timer);
        }
    }

    pub(crate) fn challenge_input(&mut self, player: usize, action: Action) {
        match action {
            Action::Accept => {
                self.top_challenge_mut().accepted |= 1 << player;

                if self.is_accepted(self.top_challenge()) {
                    self.resolve_challenge();
                }
            }
            Action::Challenge => {
                let ctx = self.top_challenge();

                if !ctx.challengeable || player == ctx.actor || !self.players[player].is_alive() {
                    return;
                }

                let reveal = RevealContext {
                    challenger: player,
                    challenged: ctx.actor,
                    clans: ctx.challenged_clans,
                    inverted: ctx.inverted,
                };

                self.cancel_challenge_timer();
                self.stack.push(Frame::Reveal(Box::new(reveal)));
                self.take_action();
            }
            Action::Block => {
                let ctx = self.top_challenge();

                if !ctx.blockable
                    || player == ctx.actor
                    || !self.players[player].is_alive()
                    || !self.can_block(ctx, player) {
                    return;
                }

                let clans = ctx.blocking_clans;
                let message = format!(
                    "{} claims to have {} and blocks the action.",
                    self.name(player),
                    self.clans.describe(clans),
                );

                self.cancel_challenge_timer();
                self.check_challenge(ChallengeContext::new(player, message, Accepted::Block).challengeable_by(clans));
            }
            _ => {}
        }
    }

    /// Pops the claim on top of the stack and carries it out.
    pub(crate) fn resolve_challenge(&mut self) {
        let Frame::Challenge(ctx) = self.pop_frame() else {
            panic!("resolved a challenge that wasn't on top of the stack");
        };

        self.take_action();
        self.accept_action(ctx.actor, ctx.on_accept);
    }

    pub(crate) fn challenge_idle(&mut self) {
        // everybody has to accept again every time the question is asked
        self.top_challenge_mut().accepted = 0;

        // eg. a failed challenge killed the only player who could block
        if self.is_accepted(self.top_challenge()) {
            self.resolve_challenge();
            return;
        }

        let (text, buttons) = self.challenge_prompt(self.top_challenge());

        // a fresh window every time the question is asked
        self.cancel_challenge_timer();
        let timer = self.host.arm_timeout(self.wait_time);
        self.top_challenge_mut().timer = Some(timer);

        self.host.send_broadcast(&text, &buttons);
    }

    fn challenge_prompt(&self, ctx: &ChallengeContext) -> (String, Vec<Button>) {
        let mut text = ctx.message.clone();
        let mut buttons = Vec::with_capacity(3);

        if ctx.challengeable {
            text.push_str("\nDoes somebody want to challenge them?");
            buttons.push(Button::new("Challenge", Action::Challenge.data()));
        }

        if ctx.blockable {
            let cards = self.clans.describe(ctx.blocking_clans);
            let or = if ctx.challengeable { "Or " } else { "" };

            text.push('\n');
            text.push_str(&match ctx.target {
                Some(target) => format!(
                    "{or}{}, do you want to claim to have {cards} and block them?",
                    self.name(target),
                ),
                None if self.is_reformation() && !self.is_reunified() => {
                    let does = if ctx.challengeable { "does" } else { "Does" };
                    format!("{or}{does} somebody from another allegiance want to claim to have {cards} and block them?")
                }
                None => {
                    let does = if ctx.challengeable { "does" } else { "Does" };
                    format!("{or}{does} somebody want to claim to have {cards} and block them?")
                }
            });

            buttons.push(Button::new("Block", Action::Block.data()));
        }

        buttons.push(Button::new("Accept", Action::Accept.data()));

        (text, buttons)
    }

    pub(crate) fn reveal_input(&mut self, player: usize, action: Action) {
        let reveal = self.top_reveal();

        let Action::Reveal(choice) = action else { return };

        if player != reveal.challenged {
            return;
        }

        let challenged = &self.players[player];
        let innocent = !challenged.holds(reveal.clans);
        let living = challenged.cards.get(choice).map_or(false, |card| !card.dead);

        if reveal.inverted {
            match choice {
                0 => self.concede(reveal),
                1 if innocent => self.show_hand(reveal),
                _ => {}
            }
        } else if living {
            self.do_reveal(reveal, choice);
        }
    }

    pub(crate) fn reveal_idle(&mut self) {
        let reveal = self.top_reveal();
        let challenged = &self.players[reveal.challenged];

        if !challenged.is_alive() {
            log::debug!("{} has nothing left to reveal, dropping the claim", challenged.name);
            self.take_action();
            self.pop_frame();
            self.pop_frame();
            return;
        }

        if !reveal.inverted {
            if let Some(slot) = challenged.single_living_card() {
                self.do_reveal(reveal, slot);
                return;
            }
        }

        let challenger_name = self.name(reveal.challenger);
        let challenged_name = challenged.name.as_str();
        let cards = self.clans.describe(reveal.clans);

        let (announce, question, buttons) = if reveal.inverted {
            let mut buttons = vec![Button::new("Concede", Action::Reveal(0).data())];

            if !challenged.holds(reveal.clans) {
                buttons.push(Button::new("Show cards", Action::Reveal(1).data()));
            }

            (
                format!("{challenger_name} challenged and now {challenged_name} is choosing whether to concede."),
                format!("{challenger_name} believes that you do have {cards}.\nDo you want to concede?"),
                buttons,
            )
        } else {
            let buttons: Vec<Button> = challenged
                .living_cards()
                .map(|slot| Button::new(challenged.cards[slot].character.name(), Action::Reveal(slot).data()))
                .collect();

            (
                format!("{challenger_name} challenged and now {challenged_name} is choosing which card to reveal."),
                format!("{challenger_name} doesn’t believe that you have {cards}.\nWhich card do you want to show them?"),
                buttons,
            )
        };

        self.host.send_broadcast(&announce, &[]);
        self.host.send_private(reveal.challenged, &question, &buttons);
    }

    fn do_reveal(&mut self, reveal: RevealContext, slot: usize) {
        let character = self.players[reveal.challenged].cards[slot].character;
        let challenger = self.name(reveal.challenger).to_string();
        let challenged = self.name(reveal.challenged).to_string();

        if reveal.clans.contains(character.clan()) {
            self.note(&format!(
                "{challenger} challenged but {challenged} did have {}. \
                 {challenger} loses a card and {challenged} receives a replacement from the deck.",
                character.object_name(),
            ));

            self.change_card(reveal.challenged, slot);
            self.pop_frame();
            self.top_challenge_mut().challengeable = false;
            self.take_action();
            self.lose_card(reveal.challenger);
        } else {
            let text = format!(
                "{challenger} challenged and {challenged} didn’t have {} so {challenged} loses a card.",
                self.clans.describe(reveal.clans),
            );
            self.note(&text);

            self.kill_card(reveal.challenged, slot);
            self.show_cards(reveal.challenged);
            self.take_action();
            self.pop_frame();
            // the claim goes down with the card
            self.pop_frame();
        }
    }

    fn concede(&mut self, reveal: RevealContext) {
        let challenged = self.name(reveal.challenged);
        let text = format!(
            "{} challenged and {challenged} conceded so {challenged} loses a card.",
            self.name(reveal.challenger),
        );
        self.note(&text);

        self.take_action();
        self.pop_frame();
        self.pop_frame();
        self.lose_card(reveal.challenged);
    }

    /// The challenged player proves they hold none of the clans by showing
    /// their whole hand, which then gets swapped for fresh cards.
    fn show_hand(&mut self, reveal: RevealContext) {
        let player = &self.players[reveal.challenged];
        let shown: Vec<&str> = player
            .living_cards()
            .map(|slot| player.cards[slot].character.object_name())
            .collect();
        let challenger = self.name(reveal.challenger);
        let challenged = player.name.as_str();

        let text = format!(
            "{challenger} challenged and {challenged} showed {} so {challenged} changes their cards and {challenger} loses a card.",
            join_names(&shown, " and "),
        );
        self.note(&text);

        self.change_hand(reveal.challenged);
        self.pop_frame();
        self.top_challenge_mut().challengeable = false;
        self.take_action();
        self.lose_card(reveal.challenger);
    }

    /// Swaps one living card for a random one from the deck.
    pub(crate) fn change_card(&mut self, player_idx: usize, slot: usize) {
        let card = self.players[player_idx].cards[slot];
        assert!(!card.dead, "changing a dead card");

        self.deck.put_back(card.character);
        self.deck.shuffle(&mut self.rng);
        self.players[player_idx].cards[slot].character = self.deck.take();

        self.show_cards(player_idx);
    }

    fn change_hand(&mut self, player_idx: usize) {
        let living: Vec<usize> = self.players[player_idx].living_cards().collect();

        for &slot in &living {
            self.deck.put_back(self.players[player_idx].cards[slot].character);
        }

        self.deck.shuffle(&mut self.rng);

        for &slot in &living {
            self.players[player_idx].cards[slot].character = self.deck.take();
        }

        self.show_cards(player_idx);
    }

    pub(crate) fn kill_card(&mut self, player_idx: usize, slot: usize) {
        let player = &mut self.players[player_idx];
        player.cards[slot].dead = true;

        if !player.is_alive() {
            log::info!("{} is out of the game", player.name);
        }
    }

    pub(crate) fn lose_card(&mut self, player: usize) {
        self.stack.push(Frame::LoseCard { player });
    }

    pub(crate) fn lose_card_input(&mut self, player: usize, loser: usize, action: Action) {
        let Action::Lose(slot) = action else { return };

        if player != loser {
            return;
        }

        if !self.players[player].cards.get(slot).map_or(false, |card| !card.dead) {
            return;
        }

        self.take_action();
        self.kill_card(player, slot);
        self.show_cards(player);
        self.pop_frame();
    }

    /// True when the frames on top of the stack already take every card the
    /// player has left.
    fn is_losing_all_cards(&self, player: usize) -> bool {
        let living = self.players[player].living_count();

        self.stack.len() >= living
            && self
                .stack
                .iter()
                .rev()
                .take(living)
                .all(|frame| matches!(frame, &Frame::LoseCard { player: loser } if loser == player))
    }

    pub(crate) fn lose_card_idle(&mut self, player: usize) {
        if self.is_losing_all_cards(player) {
            self.take_action();
            self.pop_frame();

            let living: Vec<usize> = self.players[player].living_cards().collect();
            for slot in living {
                self.kill_card(player, slot);
            }

            return;
        }

        let buttons: Vec<Button> = self.players[player]
            .living_cards()
            .map(|slot| Button::new(self.players[player].cards[slot].character.name(), Action::Lose(slot).data()))
            .collect();

        self.host.send_private(player, "Which card do you want to lose?", &buttons);
    }
}
