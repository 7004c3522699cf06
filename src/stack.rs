use crate::challenge::{ChallengeContext, RevealContext};
use crate::host::TimerId;
use crate::resolver::{ExchangeContext, InterrogateContext};

pub const MAX_DEPTH: usize = 8;

/// One suspended step of the game. Only the frame on top of the stack gets
/// to see player input; when the stack goes idle the top frame gets a chance
/// to move on by itself.
#[derive(Debug)]
pub enum Frame {
    /// always at the bottom, the current player picks their action
    ChooseAction,
    ChooseGameType,
    LoseCard { player: usize },
    Challenge(Box<ChallengeContext>),
    Reveal(Box<RevealContext>),
    Exchange(Box<ExchangeContext>),
    Interrogate(Box<InterrogateContext>),
}

impl Frame {
    pub fn name(&self) -> &'static str {
        match self {
            Frame::ChooseAction => "choose_action",
            Frame::ChooseGameType => "choose_game_type",
            Frame::LoseCard { .. } => "lose_card",
            Frame::Challenge(_) => "challenge",
            Frame::Reveal(_) => "reveal",
            Frame::Exchange(_) => "exchange",
            Frame::Interrogate(_) => "interrogate",
        }
    }

    /// The timer owned by this frame, it has to be cancelled when the frame goes away.
    pub fn timer(&self) -> Option<TimerId> {
        match self {
            Frame::Challenge(ctx) => ctx.timer,
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Stack {
    frames: Vec<Frame>,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(MAX_DEPTH),
        }
    }

    pub fn push(&mut self, frame: Frame) {
        assert!(
            self.frames.len() < MAX_DEPTH,
            "continuation stack overflow pushing {}",
            frame.name()
        );

        log::debug!("push {} at depth {}", frame.name(), self.frames.len());
        self.frames.push(frame);
    }

    /// Removes the top frame. Releasing whatever the frame owns is up to the
    /// caller, see `Coup::pop_frame`.
    pub fn pop(&mut self) -> Frame {
        let frame = self.frames.pop().expect("popped an empty continuation stack");
        log::debug!("pop {} at depth {}", frame.name(), self.frames.len());
        frame
    }

    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item=&Frame> + '_ {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::stack::{Frame, Stack, MAX_DEPTH};

    #[test]
    fn lifo() {
        let mut stack = Stack::new();
        stack.push(Frame::ChooseAction);
        stack.push(Frame::LoseCard { player: 1 });

        assert_eq!(stack.len(), 2);
        assert!(matches!(stack.top(), Some(Frame::LoseCard { player: 1 })));
        assert!(matches!(stack.pop(), Frame::LoseCard { player: 1 }));
        assert!(matches!(stack.pop(), Frame::ChooseAction));
        assert!(stack.is_empty());
        assert!(stack.top().is_none());
    }

    #[test]
    #[should_panic]
    fn overflow_is_fatal() {
        let mut stack = Stack::new();
        for player in 0..=MAX_DEPTH {
            stack.push(Frame::LoseCard { player });
        }
    }

    #[test]
    #[should_panic]
    fn popping_empty_is_fatal() {
        Stack::new().pop();
    }
}
