//! # TMP102
//!
//! Driver do sensor de temperatura Texas Instruments TMP102 sobre os traits
//! do [`embedded-hal`](https://docs.rs/embedded-hal).
//!
//! ## Módulos
//! - [`registers`] – Mapa de registradores, endereçamento e bitfield de configuração
//! - [`codec`] – Codec de temperatura 12 bits (complemento de dois)
//! - [`driver`] – Open, leitura (contínua e one-shot), setters e thresholds
//! - [`alert`] – Monitor do pino ALERT e inscrições
//! - [`error`] – Erros de transação, configuração e abertura

pub mod alert;
pub mod codec;
pub mod driver;
pub mod error;
pub mod registers;

#[cfg(test)]
mod mock;

// Re-exports convenientes
pub use alert::{AlertEvent, AlertInput, AlertSubscription, PolledAlertPin};
pub use codec::Temperature;
pub use driver::{OneShotPolicy, Settings, Tmp102};
pub use error::{ConfigurationError, Error, OpenError, OpenStage, TransactionError};
pub use registers::{
    AddressSelect, AlertPolarity, BusSpeed, ConfigurationRegister, ConsecutiveFaults,
    ConversionRate, Register, ThermostatMode,
};
