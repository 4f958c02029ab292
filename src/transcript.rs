use crate::message::Turn;

/// Append-only turn history for one session.
///
/// The model is stateless between calls, so this sequence is the entire
/// context it sees. Turns are never rewritten or pruned; insertion order is
/// the conversation order. One instance per session — sharing a transcript
/// across sessions or threads is not supported.
#[derive(Default, Clone, Debug)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The full history, in order, for submission to the model.
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Turn> + '_ {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
