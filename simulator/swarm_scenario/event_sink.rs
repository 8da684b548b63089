//! Event logging for simulator

use swarm_sim::{Event, EventSink, SimTick};

/// Logging event sink that outputs events to console
pub struct LoggingEventSink {
    enabled: bool,
}

impl LoggingEventSink {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// One console line per event, `None` while disabled
    pub fn render(&self, tick: SimTick, event: &Event) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let line = match *event {
            Event::PeerJoined { peer, connections } => {
                format!("{:>5} join:  p:{} conns:{}", tick, peer, connections)
            }
            Event::PeerLeft { peer, role } => {
                format!("{:>5} leave: p:{} ({})", tick, peer, role)
            }
            Event::ChunkTransferred {
                sender,
                receiver,
                chunk,
            } => {
                format!("{:>5} xfer:  c:{} {} -> {}", tick, chunk, sender, receiver)
            }
            Event::DownloadCompleted { peer } => {
                format!("{:>5} done:  p:{} complete", tick, peer)
            }
            Event::DownloadStalled { peer, owned } => {
                format!("{:>5} stall: p:{} owns {}", tick, peer, owned)
            }
            Event::StateChange {
                from_state,
                to_state,
            } => {
                format!("{:>5} state: {} -> {}", tick, from_state, to_state)
            }
        };
        Some(line)
    }
}

impl EventSink for LoggingEventSink {
    fn log(&mut self, tick: SimTick, event: Event) {
        if let Some(line) = self.render(tick, &event) {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_each_event() {
        let sink = LoggingEventSink::new(true);
        let cases = [
            (
                Event::PeerJoined {
                    peer: 7,
                    connections: 3,
                },
                "    4 join:  p:7 conns:3",
            ),
            (
                Event::PeerLeft {
                    peer: 2,
                    role: "Leecher",
                },
                "    4 leave: p:2 (Leecher)",
            ),
            (
                Event::ChunkTransferred {
                    sender: 1,
                    receiver: 0,
                    chunk: 5,
                },
                "    4 xfer:  c:5 1 -> 0",
            ),
            (Event::DownloadCompleted { peer: 0 }, "    4 done:  p:0 complete"),
            (
                Event::DownloadStalled { peer: 0, owned: 6 },
                "    4 stall: p:0 owns 6",
            ),
            (
                Event::StateChange {
                    from_state: "Idle",
                    to_state: "Running",
                },
                "    4 state: Idle -> Running",
            ),
        ];

        for (event, expected) in cases {
            assert_eq!(sink.render(4, &event).as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_disabled_sink_renders_nothing() {
        let mut sink = LoggingEventSink::new(false);
        let event = Event::DownloadCompleted { peer: 0 };
        assert_eq!(sink.render(1, &event), None);

        // Also safe to feed through the trait
        sink.log(1, event);
    }

    #[test]
    fn test_sink_drives_a_run() {
        use swarm_sim::{SwarmConfig, SwarmController};

        let config = SwarmConfig {
            seed: Some([3u8; 32]),
            ..SwarmConfig::with_size(6, 10)
        };
        let sink = LoggingEventSink::new(true);
        let start = Event::StateChange {
            from_state: "Idle",
            to_state: "Running",
        };
        assert!(sink.render(0, &start).is_some());

        let mut controller = SwarmController::new_with_sink(config, Box::new(sink)).unwrap();
        let summary = controller.run(50);
        assert!(summary.ticks <= 50);
    }
}
