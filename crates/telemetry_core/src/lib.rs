//! # Telemetry Core
//!
//! Crate compartilhada do cliente de telemetria: amostras de sensores,
//! formatação dos registros, fila de envio assíncrona, framing binário
//! (bincode) e configuração TOML.
//!
//! ## Módulos
//! - [`types`] – `SensorType`, `SampleBag` e `TelemetryRecord`
//! - [`format`] – Formatadores (propriedades e ConnectTheDots JSON)
//! - [`dispatch`] – Fila de envio com ciclo Open/Close e worker dedicado
//! - [`protocol`] – Encode/decode binário com magic byte
//! - [`config`] – Configuração unificada via TOML

pub mod config;
pub mod dispatch;
pub mod format;
pub mod protocol;
pub mod types;

// Re-exports convenientes
pub use config::{AppConfig, ClientConfig, DispatchConfig, FormatKind, SensorConfig};
pub use dispatch::{
    ClosePolicy, DispatchError, DispatchQueue, DispatchStats, EventSender, RetryPolicy, SendError,
    SendOutcome,
};
pub use format::{ConnectTheDotsFormatter, EventFormatter, FormatError, PropertiesFormatter};
pub use protocol::{decode_record, encode_record, PROTOCOL_VERSION};
pub use types::{PropertyValue, SampleBag, SensorType, TelemetryRecord};
