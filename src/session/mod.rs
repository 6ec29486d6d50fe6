// Conversation sessions and the turn reducer

mod conversation;
mod turn;

pub use conversation::{ConversationSession, Message, Sender};
pub use turn::{reduce, CommittedTurn, PendingTurn, TurnCommit, TurnInput};
