use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::error::CoupError;
use crate::host::RecordingHost;
use crate::Coup;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Press,
    Wait,
}

/// Something that came into a game from the outside, one row of a transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub player: Option<usize>,
    pub data: Option<String>,
    pub millis: Option<u64>,
}

impl Event {
    pub fn press(player: usize, data: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Press,
            player: Some(player),
            data: Some(data.into()),
            millis: None,
        }
    }

    pub fn wait(duration: Duration) -> Self {
        Self {
            kind: EventKind::Wait,
            player: None,
            data: None,
            millis: Some(duration.as_millis() as u64),
        }
    }

    fn is_well_formed(&self) -> bool {
        match self.kind {
            EventKind::Press => self.player.is_some() && self.data.is_some(),
            EventKind::Wait => self.millis.is_some(),
        }
    }
}

/// Every press and clock advance of a game, in order. Replaying it against a
/// game built from the same config ends in the same state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    events: Vec<Event>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<(), CoupError> {
        let mut writer = csv::Writer::from_writer(writer);

        for event in &self.events {
            writer.serialize(event)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn read<R: Read>(reader: R) -> Result<Self, CoupError> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut events = Vec::new();

        for (row, result) in reader.deserialize().enumerate() {
            let event: Event = result?;

            if !event.is_well_formed() {
                return Err(CoupError::MalformedEvent(row));
            }

            events.push(event);
        }

        Ok(Self { events })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CoupError> {
        self.write(File::create(path)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CoupError> {
        Self::read(File::open(path)?)
    }

    /// Feeds every event into `game`.
    pub fn replay(&self, game: &mut Coup<RecordingHost>) {
        for event in &self.events {
            match (event.kind, event.player, &event.data, event.millis) {
                (EventKind::Press, Some(player), Some(data), _) => game.handle_action(player, data),
                (EventKind::Wait, _, _, Some(millis)) => game.advance(Duration::from_millis(millis)),
                _ => log::warn!("skipping malformed event {event:?}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use crate::ai::step;
    use crate::config::GameConfig;
    use crate::error::CoupError;
    use crate::host::RecordingHost;
    use crate::testing::names;
    use crate::transcript::{Event, EventKind, Transcript};
    use crate::Coup;

    #[test]
    fn csv_round_trip() {
        let mut transcript = Transcript::new();
        transcript.push(Event::press(0, "game_type:2"));
        transcript.push(Event::press(3, "steal:1"));
        transcript.push(Event::wait(Duration::from_secs(60)));

        let mut buffer = Vec::new();
        transcript.write(&mut buffer).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert_eq!(text, "kind,player,data,millis\npress,0,game_type:2,\npress,3,steal:1,\nwait,,,60000\n");

        let read = Transcript::read(buffer.as_slice()).unwrap();
        assert_eq!(read, transcript);
        assert_eq!(read.events()[2].kind, EventKind::Wait);
    }

    #[test]
    fn rejects_incomplete_rows() {
        let err = Transcript::read("kind,player,data,millis\npress,0,income,\nwait,,,\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CoupError::MalformedEvent(1)));

        let err = Transcript::read("kind,player,data,millis\nshout,0,income,\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CoupError::Csv(_)));
    }

    #[test]
    fn replay_reproduces_the_game() {
        let config = GameConfig::default().with_seed(77);
        let mut rng = Pcg64::seed_from_u64(5);
        let mut original = Coup::new(RecordingHost::new(), names(4), config.clone()).unwrap();
        let mut transcript = Transcript::new();

        for _ in 0..300 {
            if original.is_over() {
                break;
            }
            transcript.push(step(&mut original, &mut rng));
        }

        let mut replayed = Coup::new(RecordingHost::new(), names(4), config).unwrap();
        transcript.replay(&mut replayed);

        assert_eq!(replayed.players(), original.players());
        assert_eq!(replayed.deck(), original.deck());
        assert_eq!(replayed.current_player(), original.current_player());
        assert_eq!(replayed.treasury(), original.treasury());
        assert_eq!(replayed.stack_depth(), original.stack_depth());
        assert_eq!(replayed.host().messages(), original.host().messages());
    }
}
