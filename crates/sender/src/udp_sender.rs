//! Transporte UDP dos registros de telemetria (broadcast ou unicast).

use std::net::UdpSocket;
use telemetry_core::config::ClientConfig;
use telemetry_core::dispatch::{EventSender, SendError};
use telemetry_core::protocol::encode_record;
use telemetry_core::types::TelemetryRecord;
use tracing::{debug, info};

pub struct UdpEventSender {
    sock: Option<UdpSocket>,
    dest_addr: String,
}

impl UdpEventSender {
    /// Cria o socket conforme `[client]`.
    pub fn bind(cfg: &ClientConfig) -> std::io::Result<Self> {
        let sock = UdpSocket::bind(if cfg.bind_ip.is_empty() {
            "0.0.0.0:0".to_string()
        } else {
            format!("{}:0", cfg.bind_ip)
        })?;

        if cfg.mode == "broadcast" || cfg.dest_ip == "255.255.255.255" {
            sock.set_broadcast(true)?;
            info!("Modo BROADCAST ativado");
        } else {
            info!("Modo UNICAST → {}", cfg.dest_ip);
        }

        Ok(Self {
            sock: Some(sock),
            dest_addr: format!("{}:{}", cfg.dest_ip, cfg.port),
        })
    }

    pub fn dest_addr(&self) -> &str {
        &self.dest_addr
    }
}

impl EventSender for UdpEventSender {
    fn send(&mut self, record: &TelemetryRecord) -> Result<(), SendError> {
        let sock = self
            .sock
            .as_ref()
            .ok_or_else(|| SendError::Transport("socket fechado".into()))?;
        let frame = encode_record(record).map_err(|e| SendError::Transport(e.to_string()))?;
        let sent = sock.send_to(&frame, &self.dest_addr)?;
        debug!("→ {} bytes para {}", sent, self.dest_addr);
        Ok(())
    }

    fn close(&mut self) {
        if self.sock.take().is_some() {
            info!("Socket UDP fechado");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use telemetry_core::protocol::decode_record;

    fn loopback() -> (UdpSocket, ClientConfig) {
        let rx = UdpSocket::bind("127.0.0.1:0").unwrap();
        rx.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let cfg = ClientConfig {
            mode: "unicast".into(),
            dest_ip: "127.0.0.1".into(),
            port: rx.local_addr().unwrap().port(),
            bind_ip: "127.0.0.1".into(),
            ..ClientConfig::default()
        };
        (rx, cfg)
    }

    #[test]
    fn sends_framed_record() {
        let (rx, cfg) = loopback();
        let mut sender = UdpEventSender::bind(&cfg).unwrap();
        let record = TelemetryRecord::new(Some("rpi".into()), b"{}".to_vec())
            .with_property("temp", 20.5_f32);

        sender.send(&record).unwrap();

        let mut buf = [0u8; 2048];
        let n = rx.recv(&mut buf).unwrap();
        assert_eq!(decode_record(&buf[..n]).unwrap(), record);
    }

    #[test]
    fn send_after_close_fails() {
        let (_rx, cfg) = loopback();
        let mut sender = UdpEventSender::bind(&cfg).unwrap();
        sender.close();
        let record = TelemetryRecord::new(None, Vec::new());
        assert!(matches!(sender.send(&record), Err(SendError::Transport(_))));
    }
}
