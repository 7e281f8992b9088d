// rov_runtime/src/runtime/plugins/io/gamepad_udp.rs

use bevy::prelude::*;
use std::io;
use std::net::UdpSocket;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rov_core::input::GamepadState;
use rov_core::types::AxisCommand;

use crate::runtime::core::shared::SharedIo;

const MAX_DATAGRAM: usize = 2048;

/// Decodes one gamepad datagram into a deadzone-filtered command.
pub fn parse_datagram(bytes: &[u8], deadzone: f64) -> Result<AxisCommand, serde_json::Error> {
    let pad: GamepadState = serde_json::from_slice(bytes)?;
    Ok(pad.to_axis_command(deadzone))
}

pub fn bind(addr: &str) -> io::Result<UdpSocket> {
    let socket = UdpSocket::bind(addr)?;
    // Wake up periodically so the thread notices a shutdown.
    socket.set_read_timeout(Some(Duration::from_millis(250)))?;
    Ok(socket)
}

/// Publishes every valid datagram into the command slot until shutdown.
pub fn spawn(socket: UdpSocket, deadzone: f64, io: SharedIo) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("gamepad-udp".to_string())
        .spawn(move || {
            let mut buf = [0u8; MAX_DATAGRAM];
            while !io.shutdown_requested() {
                let (len, from) = match socket.recv_from(&mut buf) {
                    Ok(received) => received,
                    Err(e)
                        if matches!(
                            e.kind(),
                            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                        ) =>
                    {
                        continue
                    }
                    Err(e) => {
                        error!("Gamepad socket failed: {}", e);
                        break;
                    }
                };

                match parse_datagram(&buf[..len], deadzone) {
                    Ok(command) => io.command.publish(command),
                    Err(e) => warn!("Ignoring malformed gamepad datagram from {}: {}", from, e),
                }
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rov_core::types::Axis;

    #[test]
    fn datagram_is_shaped_into_axes() {
        let cmd = parse_datagram(br#"{"lx":0.1,"ly":0.9,"lt":1.0,"auto":true}"#, 0.2).unwrap();
        assert_eq!(cmd.get(Axis::Sway), 0.0);
        assert_eq!(cmd.get(Axis::Surge), 0.9);
        assert_eq!(cmd.get(Axis::Heave), 1.0);
        assert!(cmd.flags.mode_toggle);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_datagram(b"not json", 0.2).is_err());
    }

    #[test]
    fn listener_publishes_received_pads() {
        let io = SharedIo::default();
        let socket = bind("127.0.0.1:0").unwrap();
        let addr = socket.local_addr().unwrap();
        let handle = spawn(socket, 0.2, io.clone()).unwrap();

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(b"{{broken", addr).unwrap();
        sender.send_to(br#"{"ly": -0.5}"#, addr).unwrap();

        let mut received = None;
        for _ in 0..100 {
            received = io.command.latest();
            if received.is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        io.request_shutdown();
        handle.join().unwrap();

        assert_eq!(received.unwrap().get(Axis::Surge), -0.5);
    }
}
