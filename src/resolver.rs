use crate::action::Action;
use crate::card::{Card, Character, Clan, ClanSet, CARDS_PER_PLAYER};
use crate::challenge::{Accepted, ChallengeContext};
use crate::host::{Button, Host};
use crate::stack::Frame;
use crate::{Coup, ASSASSINATION_COST, COUP_COST, FORCED_COUP_COINS};

/// Cards drawn from the deck during an exchange, on top of the living hand.
const EXCHANGE_DRAW: usize = 2;
const INQUISITOR_EXCHANGE_DRAW: usize = 1;
const FOREIGN_AID_COINS: u32 = 2;
const TAX_COINS: u32 = 3;
const MAX_STEAL: u32 = 2;
const CONVERT_SELF_COST: u32 = 1;
const CONVERT_OTHER_COST: u32 = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeContext {
    pub player: usize,
    /// the cards the player ends up with, dead ones first
    pub hand: Vec<Card>,
    pub offered: Vec<Character>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InterrogateContext {
    pub inquisitor: usize,
    pub target: usize,
    /// slot of the card the target chose to show
    pub shown: Option<usize>,
}

impl<H: Host> Coup<H> {
    pub(crate) fn choose_action_input(&mut self, player: usize, action: Action) {
        if player != self.current_player {
            return;
        }

        if self.players[player].coins >= FORCED_COUP_COINS && !matches!(action, Action::Coup(_)) {
            log::debug!("player {player} has to coup, ignoring {action:?}");
            return;
        }

        match action {
            Action::Income => self.do_income(),
            Action::ForeignAid => self.do_foreign_aid(),
            Action::Coup(target) => self.do_coup(target),
            Action::Tax => self.do_tax(),
            Action::Assassinate(target) => self.do_assassinate(target),
            Action::Exchange => self.do_exchange(),
            Action::Steal(target) => self.do_steal(target),
            Action::Convert(target) => self.do_convert(target),
            Action::Embezzle => self.do_embezzle(),
            Action::Inspect(target) => self.do_inspect(target),
            _ => {}
        }
    }

    /// Every fully targeted action the current player could take.
    pub(crate) fn turn_actions(&self) -> Vec<Action> {
        let actor = self.current_player;
        let coins = self.players[actor].coins;
        let targets: Vec<usize> = (0..self.players.len())
            .filter(|&target| self.is_valid_target(actor, target))
            .collect();
        let mut actions = Vec::new();

        if coins >= FORCED_COUP_COINS {
            actions.extend(targets.iter().map(|&t| Action::Coup(Some(t))));
            return actions;
        }

        actions.push(Action::Income);
        actions.push(Action::ForeignAid);

        if coins >= COUP_COST {
            actions.extend(targets.iter().map(|&t| Action::Coup(Some(t))));
        }

        if self.is_reformation() {
            for (target, player) in self.players.iter().enumerate() {
                if player.is_alive() && coins >= convert_cost(actor, target) {
                    actions.push(Action::Convert(Some(target)));
                }
            }

            actions.push(Action::Embezzle);
        }

        actions.push(Action::Tax);

        if coins >= ASSASSINATION_COST {
            actions.extend(targets.iter().map(|&t| Action::Assassinate(Some(t))));
        }

        actions.push(Action::Exchange);

        if self.uses_inquisitor() {
            actions.extend(targets.iter().map(|&t| Action::Inspect(Some(t))));
        }

        actions.extend(targets.iter().map(|&t| Action::Steal(Some(t))));

        actions
    }

    /// The buttons under the status message.
    pub(crate) fn turn_buttons(&self) -> Vec<Button> {
        let coins = self.players[self.current_player].coins;
        let mut buttons = Vec::new();

        if coins >= FORCED_COUP_COINS {
            buttons.push(Button::new("Coup", "coup"));
            return buttons;
        }

        buttons.push(Button::new("Income", "income"));
        buttons.push(Button::new("Foreign aid", "foreign_aid"));

        if coins >= COUP_COST {
            buttons.push(Button::new("Coup", "coup"));
        }

        if self.is_reformation() {
            if coins > 0 {
                buttons.push(Button::new("Convert", "convert"));
            }
            buttons.push(Button::new("Embezzle", "embezzle"));
        }

        buttons.push(Button::new("Tax (Duke)", "tax"));

        if coins >= ASSASSINATION_COST {
            buttons.push(Button::new("Assassinate (Assassin)", "assassinate"));
        }

        let negotiator = self.clans.character(Clan::Negotiators);
        buttons.push(Button::new(format!("Exchange ({})", negotiator.name()), "exchange"));

        if self.uses_inquisitor() {
            buttons.push(Button::new("Interrogate (Inquisitor)", "inspect"));
        }

        buttons.push(Button::new("Steal (Captain)", "steal"));

        buttons
    }

    fn uses_inquisitor(&self) -> bool {
        self.variant.map_or(false, |variant| variant.uses_inquisitor())
    }

    /// Asks the current player to pick one of `targets`, each button sends
    /// `make(target)` back.
    fn send_select_target(&mut self, question: &str, targets: Vec<usize>, make: fn(Option<usize>) -> Action) {
        let buttons: Vec<Button> = targets
            .into_iter()
            .map(|target| Button::new(self.players[target].name.as_str(), make(Some(target)).data()))
            .collect();

        let text = format!("{}, {question}", self.name(self.current_player));
        self.host.send_broadcast(&text, &buttons);
    }

    fn valid_targets(&self) -> Vec<usize> {
        (0..self.players.len())
            .filter(|&target| self.is_valid_target(self.current_player, target))
            .collect()
    }

    /// Resolves the target of a targeted action. With no target the player is
    /// asked for one and `None` comes back, as it does for an invalid one.
    fn pick_target(&mut self, target: Option<usize>, question: &str, make: fn(Option<usize>) -> Action) -> Option<usize> {
        match target {
            None => {
                let targets = self.valid_targets();
                self.send_select_target(question, targets, make);
                None
            }
            Some(target) if self.is_valid_target(self.current_player, target) => Some(target),
            Some(target) => {
                log::debug!("player {} can't target {target}", self.current_player);
                None
            }
        }
    }

    fn do_income(&mut self) {
        let actor = self.current_player;
        let text = format!("💲 {} takes 1 coin of income", self.name(actor));

        self.note(&text);
        self.players[actor].coins += 1;
        self.take_action();
    }

    fn do_foreign_aid(&mut self) {
        let actor = self.current_player;
        let message = format!("💴 {} receives 2 coins from foreign aid.", self.name(actor));

        self.check_challenge(
            ChallengeContext::new(actor, message, Accepted::ForeignAid)
                .blockable_by(ClanSet::of(Clan::TaxCollectors), None),
        );
    }

    fn do_coup(&mut self, target: Option<usize>) {
        let actor = self.current_player;

        if self.players[actor].coins < COUP_COST {
            return;
        }

        let Some(target) = self.pick_target(target, "who do you want to kill during the coup?", Action::Coup) else {
            return;
        };

        let text = format!("💣 {} does a coup against {}", self.name(actor), self.name(target));
        self.note(&text);

        self.players[actor].coins -= COUP_COST;
        self.take_action();
        self.lose_card(target);
    }

    fn do_tax(&mut self) {
        let actor = self.current_player;
        let message = format!("💸 {} claims to have the duke and takes 3 coins from tax.", self.name(actor));

        self.check_challenge(
            ChallengeContext::new(actor, message, Accepted::Tax)
                .challengeable_by(ClanSet::of(Clan::TaxCollectors)),
        );
    }

    fn do_assassinate(&mut self, target: Option<usize>) {
        let actor = self.current_player;

        if self.players[actor].coins < ASSASSINATION_COST {
            return;
        }

        let Some(target) = self.pick_target(target, "who do you want to assassinate?", Action::Assassinate) else {
            return;
        };

        let message = format!("🗡 {} wants to assassinate {}.", self.name(actor), self.name(target));

        self.check_challenge(
            ChallengeContext::new(actor, message, Accepted::Assassinate { target })
                .challengeable_by(ClanSet::of(Clan::Assassins))
                .blockable_by(ClanSet::of(Clan::Intouchables), Some(target)),
        );
    }

    fn do_exchange(&mut self) {
        let actor = self.current_player;
        let message = format!(
            "🔄 {} claims to have {} and wants to exchange cards.",
            self.name(actor),
            self.clans.character(Clan::Negotiators).object_name(),
        );

        self.check_challenge(
            ChallengeContext::new(actor, message, Accepted::Exchange)
                .challengeable_by(ClanSet::of(Clan::Negotiators)),
        );
    }

    fn do_steal(&mut self, target: Option<usize>) {
        let actor = self.current_player;

        let Some(target) = self.pick_target(target, "who do you want to steal from?", Action::Steal) else {
            return;
        };

        let message = format!("💰 {} wants to steal from {}.", self.name(actor), self.name(target));

        self.check_challenge(
            ChallengeContext::new(actor, message, Accepted::Steal { target })
                .challengeable_by(ClanSet::of(Clan::Thieves))
                .blockable_by(ClanSet::of(Clan::Negotiators).with(Clan::Thieves), Some(target)),
        );
    }

    fn do_convert(&mut self, target: Option<usize>) {
        let actor = self.current_player;

        if !self.is_reformation() || self.players[actor].coins == 0 {
            return;
        }

        let target = match target {
            Some(target) => target,
            None => {
                let targets: Vec<usize> = (0..self.players.len())
                    .filter(|&target| self.players[target].is_alive())
                    .collect();
                self.send_select_target("who do you want to convert?", targets, Action::Convert);
                return;
            }
        };

        // allegiance doesn't matter here, converting is how it changes
        if target >= self.players.len() || !self.players[target].is_alive() {
            return;
        }

        let cost = convert_cost(actor, target);

        if self.players[actor].coins < cost {
            return;
        }

        let text = if target == actor {
            format!("{} pays 1 coin to the treasury and converts themself.", self.name(actor))
        } else {
            format!("{} pays 2 coins to the treasury and converts {}.", self.name(actor), self.name(target))
        };
        self.note(&text);

        self.players[actor].coins -= cost;
        self.treasury += cost;
        self.players[target].allegiance = self.players[target].allegiance.flipped();
        self.take_action();
    }

    fn do_embezzle(&mut self) {
        if !self.is_reformation() {
            return;
        }

        let actor = self.current_player;
        let message = format!(
            "💼 {} claims not to have the duke and embezzles the money in the treasury.",
            self.name(actor),
        );

        self.check_challenge(
            ChallengeContext::new(actor, message, Accepted::Embezzle)
                .challengeable_by(ClanSet::of(Clan::TaxCollectors))
                .inverted(),
        );
    }

    fn do_inspect(&mut self, target: Option<usize>) {
        if !self.uses_inquisitor() {
            return;
        }

        let actor = self.current_player;

        let Some(target) = self.pick_target(target, "who do you want to interrogate?", Action::Inspect) else {
            return;
        };

        let message = format!(
            "🔍 {} claims to have the inquisitor and wants to interrogate {}",
            self.name(actor),
            self.name(target),
        );

        self.check_challenge(
            ChallengeContext::new(actor, message, Accepted::Inspect { target })
                .challengeable_by(ClanSet::of(Clan::Negotiators)),
        );
    }

    /// Carries out a claim that nobody stopped. The claim's frame is already
    /// off the stack.
    pub(crate) fn accept_action(&mut self, actor: usize, accepted: Accepted) {
        log::debug!("player {actor} {accepted:?} went through");

        match accepted {
            Accepted::ForeignAid => {
                let text = format!("Nobody blocked, {} takes the two coins", self.name(actor));
                self.note(&text);
                self.players[actor].coins += FOREIGN_AID_COINS;
            }
            Accepted::Tax => {
                let text = format!("Nobody challenged, {} takes the 3 coins.", self.name(actor));
                self.note(&text);
                self.players[actor].coins += TAX_COINS;
            }
            Accepted::Embezzle => {
                let text = format!("Nobody challenged, {} takes the money in the treasury.", self.name(actor));
                self.note(&text);
                self.players[actor].coins += std::mem::take(&mut self.treasury);
            }
            Accepted::Assassinate { target } => {
                let text = format!(
                    "Nobody blocked or challenged, {} assassinates {}",
                    self.name(actor),
                    self.name(target),
                );
                self.note(&text);
                self.pay_assassin(actor);

                // the target might have died challenging the assassin
                if self.players[target].is_alive() {
                    self.lose_card(target);
                }
            }
            Accepted::Steal { target } => {
                let text = format!("Nobody blocked or challenged, {} steals from {}.", self.name(actor), self.name(target));
                self.note(&text);

                let amount = self.players[target].coins.min(MAX_STEAL);
                self.players[target].coins -= amount;
                self.players[actor].coins += amount;
            }
            Accepted::Exchange => {
                let text = format!("Nobody challenged, {} exchanges cards.", self.name(actor));
                self.note(&text);
                self.start_exchange(actor);
            }
            Accepted::Inspect { target } => {
                if !self.players[target].is_alive() {
                    return;
                }

                let text = format!(
                    "Nobody challenged, {} chooses a card to show to {}",
                    self.name(target),
                    self.name(actor),
                );
                self.note(&text);

                self.stack.push(Frame::Interrogate(Box::new(InterrogateContext {
                    inquisitor: actor,
                    target,
                    shown: None,
                })));
            }
            Accepted::Block => self.block_action(),
        }
    }

    /// The claim on top of the stack was blocked and the block held.
    fn block_action(&mut self) {
        let ctx = self.top_challenge();
        let (actor, blocked) = (ctx.actor, ctx.on_accept);

        // the assassin pays even when the assassination is blocked
        if let Accepted::Assassinate { .. } = blocked {
            self.pay_assassin(actor);
        }

        self.note("Nobody challenged. The action was blocked.");
        self.pop_frame();
        self.take_action();
    }

    fn pay_assassin(&mut self, actor: usize) {
        let player = &mut self.players[actor];
        player.coins = player.coins.saturating_sub(ASSASSINATION_COST);
    }

    fn start_exchange(&mut self, player_idx: usize) {
        let draw = if self.uses_inquisitor() { INQUISITOR_EXCHANGE_DRAW } else { EXCHANGE_DRAW };
        let player = &self.players[player_idx];

        let hand: Vec<Card> = player.cards.iter().copied().filter(|card| card.dead).collect();
        let mut offered: Vec<Character> = player
            .cards
            .iter()
            .filter(|card| !card.dead)
            .map(|card| card.character)
            .collect();

        for _ in 0..draw {
            offered.push(self.deck.take());
        }

        self.stack.push(Frame::Exchange(Box::new(ExchangeContext {
            player: player_idx,
            hand,
            offered,
        })));
    }

    fn top_exchange_mut(&mut self) -> &mut ExchangeContext {
        match self.stack.top_mut() {
            Some(Frame::Exchange(ctx)) => &mut **ctx,
            other => panic!("expected an exchange on top of the stack, found {other:?}"),
        }
    }

    pub(crate) fn exchange_input(&mut self, player: usize, action: Action) {
        let Action::Keep(index) = action else { return };

        let ctx = self.top_exchange_mut();

        if player != ctx.player || index >= ctx.offered.len() {
            return;
        }

        let character = ctx.offered.remove(index);
        ctx.hand.push(Card::new(character));

        if ctx.hand.len() < CARDS_PER_PLAYER {
            self.take_action();
            return;
        }

        let Frame::Exchange(ctx) = self.pop_frame() else {
            unreachable!("exchange frame went missing");
        };
        let ExchangeContext { player, hand, offered } = *ctx;

        for card in offered {
            self.deck.put_back(card);
        }
        self.deck.shuffle(&mut self.rng);

        self.players[player].cards = hand;
        self.show_cards(player);
        self.take_action();
    }

    pub(crate) fn exchange_idle(&mut self) {
        let ctx = self.top_exchange_mut();
        let player = ctx.player;
        let buttons: Vec<Button> = ctx
            .offered
            .iter()
            .enumerate()
            .map(|(index, character)| Button::new(character.name(), Action::Keep(index).data()))
            .collect();

        self.host.send_private(player, "Which cards do you want to keep?", &buttons);
    }

    fn top_interrogate(&self) -> InterrogateContext {
        match self.stack.top() {
            Some(Frame::Interrogate(ctx)) => **ctx,
            other => panic!("expected an interrogation on top of the stack, found {other:?}"),
        }
    }

    fn set_shown(&mut self, slot: usize) {
        if let Some(Frame::Interrogate(ctx)) = self.stack.top_mut() {
            ctx.shown = Some(slot);
        }
    }

    pub(crate) fn interrogate_input(&mut self, player: usize, action: Action) {
        let ctx = self.top_interrogate();

        match (action, ctx.shown) {
            (Action::Show(slot), None) if player == ctx.target => {
                let target = &self.players[ctx.target];

                if !target.cards.get(slot).map_or(false, |card| !card.dead) {
                    return;
                }

                let text = format!(
                    "{} is now deciding whether you can keep {}",
                    self.name(ctx.inquisitor),
                    target.cards[slot].character.object_name(),
                );

                self.set_shown(slot);
                self.host.send_private(ctx.target, &text, &[]);
                self.take_action();
            }
            (Action::CanKeep(keep), Some(slot)) if player == ctx.inquisitor => {
                let text = if keep {
                    format!(
                        "{} let {} keep the card that they showed.",
                        self.name(ctx.inquisitor),
                        self.name(ctx.target),
                    )
                } else {
                    self.change_card(ctx.target, slot);
                    format!(
                        "{} made {} change the card that they showed.",
                        self.name(ctx.inquisitor),
                        self.name(ctx.target),
                    )
                };

                self.note(&text);
                self.pop_frame();
                self.take_action();
            }
            _ => {}
        }
    }

    pub(crate) fn interrogate_idle(&mut self) {
        let ctx = self.top_interrogate();
        let target = &self.players[ctx.target];

        let slot = match ctx.shown {
            Some(slot) => slot,
            None => match target.single_living_card() {
                Some(slot) => {
                    self.set_shown(slot);
                    slot
                }
                None => {
                    let buttons: Vec<Button> = target
                        .living_cards()
                        .map(|slot| Button::new(target.cards[slot].character.name(), Action::Show(slot).data()))
                        .collect();
                    let text = format!("Which card do you want to show to {}?", self.name(ctx.inquisitor));

                    self.host.send_private(ctx.target, &text, &buttons);
                    return;
                }
            },
        };

        self.ask_inquisitor(ctx.inquisitor, ctx.target, slot);
    }

    fn ask_inquisitor(&mut self, inquisitor: usize, target: usize, slot: usize) {
        let text = format!(
            "{} shows {} to you. Can they keep it?",
            self.name(target),
            self.players[target].cards[slot].character.object_name(),
        );
        let buttons = [
            Button::new("Yes", Action::CanKeep(true).data()),
            Button::new("No", Action::CanKeep(false).data()),
        ];

        self.host.send_private(inquisitor, &text, &buttons);
    }
}

fn convert_cost(actor: usize, target: usize) -> u32 {
    if actor == target {
        CONVERT_SELF_COST
    } else {
        CONVERT_OTHER_COST
    }
}
