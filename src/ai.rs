// random play through the same presses and timeouts a chat front end would deliver

use std::time::Duration;
use rand::Rng;
use crate::host::RecordingHost;
use crate::transcript::Event;
use crate::Coup;

/// Chance of letting the challenge window run out instead of pressing a button.
const WAIT_CHANCE: f64 = 0.2;

/// Makes one random move: either presses one of the currently useful buttons
/// or, while a timer is pending, lets the clock run. Returns what was done.
pub fn step<R: Rng + ?Sized>(game: &mut Coup<RecordingHost>, rng: &mut R) -> Event {
    let mut actions = game.actions();
    let waiting = game.host().pending_timers() > 0;

    if actions.is_empty() || (waiting && rng.gen_bool(WAIT_CHANCE)) {
        let wait_time = game.wait_time();
        game.advance(wait_time);
        return Event::wait(wait_time);
    }

    let random_index = rng.gen_range(0..actions.len());
    let (player, action) = actions.remove(random_index);

    game.press(player, action);

    Event::press(player, action.data())
}

/// Plays random moves until somebody wins, giving up after `max_moves`.
pub fn simulate<R: Rng + ?Sized>(game: &mut Coup<RecordingHost>, rng: &mut R, max_moves: usize) -> Option<usize> {
    for _ in 0..max_moves {
        if game.is_over() {
            game.advance(Duration::ZERO);
            return game.winner();
        }

        step(game, rng);
        game.host_mut().clear();
    }

    log::warn!("gave up on a game after {max_moves} moves");
    None
}
