// Analysis: the "Analyze Match" action.
// pipeline = orchestration state machine, handlers = HTTP surface, views = HTML.

pub mod handlers;
pub mod pipeline;
pub mod views;
