// Domain models

mod action;
mod series;
mod status;

pub use action::{ChatReply, Decision, DecisionOutcome, LiveEvent, PendingAction, Severity};
pub use series::{Sample, SeriesWindow};
pub use status::{Alarm, AlarmsPayload, HostDetail, HostInfoPayload, StatusSnapshot};
