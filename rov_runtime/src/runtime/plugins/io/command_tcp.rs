// rov_runtime/src/runtime/plugins/io/command_tcp.rs

//! Line-based operator commands:
//!
//! ```text
//! auto                          toggle manual/autonomous once
//! pid {"p":1,"i":0,"d":0.1}     switch to (or retune) PID
//! lqr {"q":1,"r":[1,1,1,1,1,1]} switch to (or retune) LQR
//! goal [0,0,-1,0,0,0]           move the setpoint
//! state                         telemetry snapshot as JSON
//! stop                          finish the loop and go neutral
//! ```
//!
//! Every line gets exactly one reply line: `ok`, a JSON document, or `error: <reason>`.

use bevy::prelude::*;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use rov_core::control::params::ParameterUpdate;
use rov_core::error::CoreError;
use rov_core::prelude::ParameterChannel;

use crate::runtime::core::shared::SharedIo;
use crate::runtime::plugins::io::signals::shutdown_requested;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("malformed arguments: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("no telemetry published yet")]
    NoTelemetry,

    #[error(transparent)]
    Rejected(#[from] CoreError),
}

/// Executes one command line and returns the reply body.
pub fn handle_line(
    line: &str,
    io: &SharedIo,
    channel: &ParameterChannel,
) -> Result<String, CommandError> {
    let line = line.trim();
    let (verb, args) = match line.split_once(char::is_whitespace) {
        Some((verb, args)) => (verb, args.trim()),
        None => (line, ""),
    };

    match verb {
        "auto" => {
            io.request_toggle();
            Ok("ok".to_string())
        }
        "stop" => {
            io.request_shutdown();
            Ok("ok".to_string())
        }
        "state" => {
            let telemetry = io.telemetry.latest().ok_or(CommandError::NoTelemetry)?;
            Ok(serde_json::to_string(&telemetry)?)
        }
        "pid" | "lqr" | "goal" => {
            let update = parse_update(verb, args)?;
            channel.submit(&update).map_err(CoreError::from)?;
            Ok("ok".to_string())
        }
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

// `ParameterUpdate` is externally tagged, so the verb becomes the tag.
fn parse_update(verb: &str, args: &str) -> Result<ParameterUpdate, serde_json::Error> {
    let body: Value = serde_json::from_str(args)?;
    let mut tagged = serde_json::Map::new();
    tagged.insert(verb.to_string(), body);
    serde_json::from_value(Value::Object(tagged))
}

/// Open sessions beyond this are refused with an error line.
pub const MAX_SESSIONS: usize = 8;

/// Longest accepted command line in bytes, newline included.
pub const MAX_LINE: usize = 4096;

/// Accepts operator sessions until the loop shuts down.
pub async fn serve(listener: TcpListener, io: SharedIo, channel: ParameterChannel) {
    let sessions = Arc::new(Semaphore::new(MAX_SESSIONS));
    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Failed to accept command connection: {}", e);
                    continue;
                }
            },
            _ = shutdown_requested(&io) => break,
        };

        let Ok(permit) = sessions.clone().try_acquire_owned() else {
            warn!("Refusing command session from {}: {} already open", peer, MAX_SESSIONS);
            let mut stream = stream;
            let _ = stream.write_all(b"error: too many sessions\n").await;
            continue;
        };

        let io = io.clone();
        let channel = channel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = session(stream, &io, &channel) => {}
                _ = shutdown_requested(&io) => {}
            }
            drop(permit);
            debug!("Command session from {} closed", peer);
        });
    }
    debug!("Command server stopped");
}

async fn session(stream: TcpStream, io: &SharedIo, channel: &ParameterChannel) {
    let peer = stream
        .peer_addr()
        .map_or_else(|_| "unknown".to_string(), |a| a.to_string());
    debug!("Command session opened from {}", peer);

    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    loop {
        line.clear();
        let read = (&mut reader)
            .take(MAX_LINE as u64 + 1)
            .read_line(&mut line)
            .await;
        match read {
            Ok(0) => break,
            Ok(n) if n > MAX_LINE => {
                warn!("Command line from {} exceeds {} bytes, closing", peer, MAX_LINE);
                let _ = writer.write_all(b"error: line too long\n").await;
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Command session from {} dropped: {}", peer, e);
                break;
            }
        }
        if line.trim().is_empty() {
            continue;
        }

        let mut reply = match handle_line(&line, io, channel) {
            Ok(body) => body,
            Err(e) => {
                warn!("Command '{}' from {} failed: {}", line.trim(), peer, e);
                format!("error: {}", e)
            }
        };
        reply.push('\n');
        if writer.write_all(reply.as_bytes()).await.is_err() {
            break;
        }
    }
}
