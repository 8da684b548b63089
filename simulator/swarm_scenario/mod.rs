// Swarm Scenario Module

pub mod event_sink;
pub mod scenario;

pub use event_sink::LoggingEventSink;
pub use scenario::ScenarioFile;
