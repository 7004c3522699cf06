use crate::card::Character;
use crate::config::{GameConfig, Variant};
use crate::host::RecordingHost;
use crate::Coup;

pub const NAMES: [&str; 6] = ["Alice", "Bob", "Charles", "Dora", "Edith", "Fred"];

pub fn names(count: usize) -> Vec<String> {
    NAMES.iter().cycle().take(count).map(|name| name.to_string()).collect()
}

/// A table with a fixed seed where the first cards dealt are `overrides`,
/// two per player in seat order.
pub fn game(players: usize, variant: Variant, start: usize, overrides: &[Character]) -> Coup<RecordingHost> {
    let config = GameConfig::default()
        .with_variant(variant)
        .with_start_player(start)
        .with_seed(42)
        .with_card_overrides(overrides);

    Coup::new(RecordingHost::new(), names(players), config).unwrap()
}

pub fn press(coup: &mut Coup<RecordingHost>, player: usize, data: &str) {
    coup.handle_action(player, data);
}

/// Lets the challenge window run out.
pub fn wait(coup: &mut Coup<RecordingHost>) {
    let wait_time = coup.wait_time();
    coup.advance(wait_time);
}

/// The buttons of the most recent status message.
pub fn status_buttons(coup: &Coup<RecordingHost>) -> Vec<String> {
    coup.host()
        .messages()
        .iter()
        .rev()
        .find(|m| m.text.ends_with("What do you want to do?"))
        .map(|m| m.buttons.iter().map(|b| b.data.clone()).collect())
        .unwrap_or_default()
}

pub fn last_text(coup: &Coup<RecordingHost>) -> String {
    coup.host().last_broadcast().map(|m| m.text.clone()).unwrap_or_default()
}
