// rov_runtime/src/runtime/plugins/io/logging_sink.rs

use bevy::prelude::*;

use rov_core::actuation::ActuationSink;
use rov_core::allocation::ThrusterCommand;
use rov_core::error::ActuationError;

/// An actuation sink with no hardware behind it: validates the channel count and
/// logs every change of the commanded pulses.
#[derive(Debug)]
pub struct LoggingSink {
    channels: usize,
    last: Option<ThrusterCommand>,
    writes: u64,
}

impl LoggingSink {
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            last: None,
            writes: 0,
        }
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl ActuationSink for LoggingSink {
    fn write(&mut self, command: &ThrusterCommand) -> Result<(), ActuationError> {
        if command.len() != self.channels {
            return Err(ActuationError::ChannelMismatch {
                expected: self.channels,
                found: command.len(),
            });
        }

        self.writes += 1;
        if self.last.as_ref() != Some(command) {
            let pulses: Vec<String> = command
                .pulses_us
                .iter()
                .map(|p| format!("{:.0}", p))
                .collect();
            debug!("Thruster pulses (us): [{}]", pulses.join(", "));
            self.last = Some(command.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rov_core::allocation::PulseRange;

    #[test]
    fn accepts_matching_channel_count() {
        let mut sink = LoggingSink::new(8);
        let neutral = ThrusterCommand::neutral(8, &PulseRange::default());
        sink.write(&neutral).unwrap();
        sink.write(&neutral).unwrap();
        assert_eq!(sink.writes(), 2);
    }

    #[test]
    fn rejects_wrong_channel_count() {
        let mut sink = LoggingSink::new(8);
        let short = ThrusterCommand::neutral(6, &PulseRange::default());
        assert!(matches!(
            sink.write(&short),
            Err(ActuationError::ChannelMismatch {
                expected: 8,
                found: 6
            })
        ));
        assert_eq!(sink.writes(), 0);
    }
}
