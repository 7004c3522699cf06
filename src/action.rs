use std::fmt::{Debug, Display, Formatter};
use serde::{Deserialize, Serialize};

/// A button press, parsed from its `"command[:n]"` data string.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Action {
    Income,
    ForeignAid,
    Coup(Option<usize>),
    Tax,
    Assassinate(Option<usize>),
    Exchange,
    Steal(Option<usize>),
    Convert(Option<usize>),
    Embezzle,
    Inspect(Option<usize>),
    Accept,
    Challenge,
    Block,
    Lose(usize), // card slot
    Reveal(usize), // card slot, or 0 = concede / 1 = show cards when inverted
    Keep(usize), // index into the offered cards
    Show(usize), // card slot
    CanKeep(bool),
    GameType(usize),
}

impl Action {
    /// Returns `None` for anything that isn't a command the engine knows,
    /// including known commands with a missing or malformed argument.
    /// Commands that take no argument reject one (`"income:1"` is invalid).
    pub fn parse(data: &str) -> Option<Action> {
        let (name, arg) = match data.split_once(':') {
            Some((name, arg)) => {
                if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                (name, Some(arg.parse::<usize>().ok()?))
            }
            None => (data, None),
        };

        let action = match (name, arg) {
            ("income", None) => Action::Income,
            ("foreign_aid", None) => Action::ForeignAid,
            ("coup", target) => Action::Coup(target),
            ("tax", None) => Action::Tax,
            ("assassinate", target) => Action::Assassinate(target),
            ("exchange", None) => Action::Exchange,
            ("steal", target) => Action::Steal(target),
            ("convert", target) => Action::Convert(target),
            ("embezzle", None) => Action::Embezzle,
            ("inspect", target) => Action::Inspect(target),
            ("accept", None) => Action::Accept,
            ("challenge", None) => Action::Challenge,
            ("block", None) => Action::Block,
            ("lose", Some(slot)) => Action::Lose(slot),
            ("reveal", Some(slot)) => Action::Reveal(slot),
            ("keep", Some(index)) => Action::Keep(index),
            ("show", Some(slot)) => Action::Show(slot),
            ("can_keep", Some(0)) => Action::CanKeep(false),
            ("can_keep", Some(1)) => Action::CanKeep(true),
            ("game_type", Some(index)) => Action::GameType(index),
            _ => return None,
        };

        Some(action)
    }

    pub fn command(&self) -> &'static str {
        match self {
            Action::Income => "income",
            Action::ForeignAid => "foreign_aid",
            Action::Coup(_) => "coup",
            Action::Tax => "tax",
            Action::Assassinate(_) => "assassinate",
            Action::Exchange => "exchange",
            Action::Steal(_) => "steal",
            Action::Convert(_) => "convert",
            Action::Embezzle => "embezzle",
            Action::Inspect(_) => "inspect",
            Action::Accept => "accept",
            Action::Challenge => "challenge",
            Action::Block => "block",
            Action::Lose(_) => "lose",
            Action::Reveal(_) => "reveal",
            Action::Keep(_) => "keep",
            Action::Show(_) => "show",
            Action::CanKeep(_) => "can_keep",
            Action::GameType(_) => "game_type",
        }
    }

    pub fn arg(&self) -> Option<usize> {
        match *self {
            Action::Coup(target)
            | Action::Assassinate(target)
            | Action::Steal(target)
            | Action::Convert(target)
            | Action::Inspect(target) => target,
            Action::Lose(n)
            | Action::Reveal(n)
            | Action::Keep(n)
            | Action::Show(n)
            | Action::GameType(n) => Some(n),
            Action::CanKeep(keep) => Some(keep as usize),
            _ => None,
        }
    }

    /// The button data that parses back into this action.
    pub fn data(&self) -> String {
        match self.arg() {
            Some(arg) => format!("{}:{}", self.command(), arg),
            None => self.command().to_string(),
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.data())
    }
}

impl Debug for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Income => f.write_str("takes income"),
            Action::ForeignAid => f.write_str("asks for foreign aid"),
            Action::Coup(Some(target)) => f.write_fmt(format_args!("coups player {target}")),
            Action::Coup(None) => f.write_str("wants to coup"),
            Action::Tax => f.write_str("collects tax"),
            Action::Assassinate(Some(target)) => f.write_fmt(format_args!("assassinates player {target}")),
            Action::Assassinate(None) => f.write_str("wants to assassinate"),
            Action::Exchange => f.write_str("exchanges cards"),
            Action::Steal(Some(target)) => f.write_fmt(format_args!("steals from player {target}")),
            Action::Steal(None) => f.write_str("wants to steal"),
            Action::Convert(Some(target)) => f.write_fmt(format_args!("converts player {target}")),
            Action::Convert(None) => f.write_str("wants to convert"),
            Action::Embezzle => f.write_str("embezzles the treasury"),
            Action::Inspect(Some(target)) => f.write_fmt(format_args!("interrogates player {target}")),
            Action::Inspect(None) => f.write_str("wants to interrogate"),
            Action::Accept => f.write_str("accepts"),
            Action::Challenge => f.write_str("challenges"),
            Action::Block => f.write_str("blocks"),
            Action::Lose(slot) => f.write_fmt(format_args!("loses card {slot}")),
            Action::Reveal(slot) => f.write_fmt(format_args!("reveals card {slot}")),
            Action::Keep(index) => f.write_fmt(format_args!("keeps offered card {index}")),
            Action::Show(slot) => f.write_fmt(format_args!("shows card {slot}")),
            Action::CanKeep(true) => f.write_str("lets them keep the card"),
            Action::CanKeep(false) => f.write_str("makes them change the card"),
            Action::GameType(index) => f.write_fmt(format_args!("picks game type {index}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::action::Action;

    #[test]
    fn parse_commands() {
        assert_eq!(Action::parse("income"), Some(Action::Income));
        assert_eq!(Action::parse("coup"), Some(Action::Coup(None)));
        assert_eq!(Action::parse("coup:3"), Some(Action::Coup(Some(3))));
        assert_eq!(Action::parse("lose:1"), Some(Action::Lose(1)));
        assert_eq!(Action::parse("can_keep:0"), Some(Action::CanKeep(false)));
        assert_eq!(Action::parse("game_type:2"), Some(Action::GameType(2)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Action::parse(""), None);
        assert_eq!(Action::parse(":1"), None);
        assert_eq!(Action::parse("Income"), None);
        assert_eq!(Action::parse("income:1"), None);
        assert_eq!(Action::parse("lose"), None);
        assert_eq!(Action::parse("lose:"), None);
        assert_eq!(Action::parse("lose:-1"), None);
        assert_eq!(Action::parse("lose:+1"), None);
        assert_eq!(Action::parse("lose:1x"), None);
        assert_eq!(Action::parse("can_keep:2"), None);
        assert_eq!(Action::parse("coup:99999999999999999999999999"), None);
    }

    #[test]
    fn data_parses_back() {
        for action in [Action::Income, Action::Steal(Some(2)), Action::Steal(None), Action::CanKeep(true), Action::Keep(3)] {
            assert_eq!(Action::parse(&action.data()), Some(action));
        }
    }
}
