// Risk inference and crisis escalation
//
// lexicon -> classifier -> escalation -> presenter

mod classifier;
mod escalation;
mod lexicon;
mod presenter;
mod tier;

pub use classifier::{classify, message_length, Classification, LengthThresholds, RiskClassifier};
pub use escalation::{EscalationController, EscalationOutcome, RiskState, DEFAULT_MENTION_THRESHOLD};
pub use lexicon::{Lexicon, LexiconFile, CANONICAL_PHRASES};
pub use presenter::{AlertView, Helpline, TierIndicator, QUICK_REPLIES};
pub use tier::{RiskSignal, RiskTier, SignalSource};
