use std::collections::BTreeMap;
use std::time::Duration;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// A button shown under a message. `data` is what comes back through
/// `Coup::handle_action` when it is pressed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// The outside world as seen by a game: the chat transport and the timer
/// scheduler.
///
/// A timer armed with `arm_timeout` must be reported back exactly once via
/// `Coup::handle_timeout` unless it is cancelled first.
pub trait Host {
    fn send_broadcast(&mut self, text: &str, buttons: &[Button]);
    fn send_private(&mut self, player: usize, text: &str, buttons: &[Button]);
    fn game_over(&mut self);
    fn arm_timeout(&mut self, delay: Duration) -> TimerId;
    fn cancel(&mut self, id: TimerId);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    Everyone,
    Player(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub to: Recipient,
    pub text: String,
    pub buttons: Vec<Button>,
}

impl Message {
    pub fn button_data(&self) -> Vec<&str> {
        self.buttons.iter().map(|b| b.data.as_str()).collect()
    }
}

/// A host that keeps everything in memory and runs timers off a virtual
/// clock. Used by the tests, the simulations and the terminal front end.
#[derive(Debug, Default)]
pub struct RecordingHost {
    messages: Vec<Message>,
    game_overs: usize,
    now: Duration,
    next_timer: u64,
    timers: BTreeMap<TimerId, Duration>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn take_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn last_broadcast(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.to == Recipient::Everyone)
    }

    pub fn last_private(&self, player: usize) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.to == Recipient::Player(player))
    }

    pub fn broadcasts(&self) -> impl Iterator<Item=&str> + '_ {
        self.messages
            .iter()
            .filter(|m| m.to == Recipient::Everyone)
            .map(|m| m.text.as_str())
    }

    pub fn game_over_count(&self) -> usize {
        self.game_overs
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Moves the clock forward and hands back the timers that became due,
    /// earliest first. They are no longer pending afterwards.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerId> {
        self.now += by;

        let now = self.now;
        let mut due: Vec<(Duration, TimerId)> = self.timers
            .iter()
            .map(|(&id, &at)| (at, id))
            .filter(|&(at, _)| at <= now)
            .collect();
        due.sort();

        for (_, id) in &due {
            self.timers.remove(id);
        }

        due.into_iter().map(|(_, id)| id).collect()
    }
}

impl Host for RecordingHost {
    fn send_broadcast(&mut self, text: &str, buttons: &[Button]) {
        self.messages.push(Message {
            to: Recipient::Everyone,
            text: text.to_string(),
            buttons: buttons.to_vec(),
        });
    }

    fn send_private(&mut self, player: usize, text: &str, buttons: &[Button]) {
        self.messages.push(Message {
            to: Recipient::Player(player),
            text: text.to_string(),
            buttons: buttons.to_vec(),
        });
    }

    fn game_over(&mut self) {
        self.game_overs += 1;
    }

    fn arm_timeout(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        self.timers.insert(id, self.now + delay);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use crate::host::{Button, Host, Recipient, RecordingHost};

    #[test]
    fn timers_fire_in_order() {
        let mut host = RecordingHost::new();

        let late = host.arm_timeout(Duration::from_secs(60));
        let early = host.arm_timeout(Duration::from_secs(1));
        let cancelled = host.arm_timeout(Duration::from_secs(2));
        host.cancel(cancelled);

        assert_eq!(host.advance(Duration::from_millis(999)), vec![]);
        assert_eq!(host.advance(Duration::from_secs(100)), vec![early, late]);
        assert_eq!(host.pending_timers(), 0);
        assert_eq!(host.advance(Duration::from_secs(100)), vec![]);
    }

    #[test]
    fn zero_delay_fires_on_next_advance() {
        let mut host = RecordingHost::new();
        let id = host.arm_timeout(Duration::ZERO);

        assert!(host.is_pending(id));
        assert_eq!(host.advance(Duration::ZERO), vec![id]);
    }

    #[test]
    fn records_messages() {
        let mut host = RecordingHost::new();

        host.send_broadcast("hello", &[Button::new("Income", "income")]);
        host.send_private(1, "psst", &[]);
        host.game_over();

        assert_eq!(host.messages().len(), 2);
        assert_eq!(host.last_broadcast().unwrap().button_data(), vec!["income"]);
        assert_eq!(host.last_private(1).unwrap().text, "psst");
        assert_eq!(host.last_private(0), None);
        assert_eq!(host.game_over_count(), 1);

        let taken = host.take_messages();
        assert_eq!(taken[1].to, Recipient::Player(1));
        assert!(host.messages().is_empty());
    }
}
