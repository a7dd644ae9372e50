//! Codec de temperatura de 12 bits (complemento de dois, 0.0625 °C/LSB).
//!
//! O código bruto fica justificado à esquerda no par de bytes do registrador:
//!
//! ```text
//! byte0: T11 T10 T9 T8 T7 T6 T5 T4
//! byte1: T3  T2  T1 T0 0  0  0  0
//! ```
//!
//! O mesmo formato serve para o registrador de temperatura e para os
//! limites T_HIGH / T_LOW.

use crate::error::ConfigurationError;

/// Resolução do conversor (°C por LSB).
pub const RESOLUTION: f32 = 0.0625;

const RAW_MASK: u16 = 0x0FFF;
const SIGN_BIT: u16 = 0x0800;

/// Menor temperatura representável em 12 bits.
pub const MIN_CELSIUS: f32 = -128.0;
/// Maior temperatura representável em 12 bits.
pub const MAX_CELSIUS: f32 = 127.9375;

/// Faixa do código em LSB (complemento de dois, 12 bits).
const MIN_STEPS: f32 = -2048.0;
const MAX_STEPS: f32 = 2047.0;

/// Temperatura como código bruto de 12 bits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Temperature {
    raw: u16,
}

impl Temperature {
    /// Decodifica o par de bytes de um registrador.
    pub fn from_register_bytes(bytes: [u8; 2]) -> Self {
        let raw = ((bytes[0] as u16) << 4) | ((bytes[1] as u16) >> 4);
        Self { raw }
    }

    /// Codifica um valor em °C, arredondando para o LSB mais próximo.
    pub fn from_celsius(celsius: f32) -> Result<Self, ConfigurationError> {
        // Faixa conferida depois do arredondamento
        let steps = (celsius / RESOLUTION).round();
        if !(MIN_STEPS..=MAX_STEPS).contains(&steps) {
            return Err(ConfigurationError::TemperatureOutOfRange(celsius));
        }

        Ok(Self {
            raw: (steps as i16 as u16) & RAW_MASK,
        })
    }

    /// Código bruto de 12 bits.
    pub fn raw(self) -> u16 {
        self.raw
    }

    pub fn to_register_bytes(self) -> [u8; 2] {
        [((self.raw >> 4) & 0xFF) as u8, ((self.raw << 4) & 0xF0) as u8]
    }

    pub fn celsius(self) -> f32 {
        let raw = self.raw & RAW_MASK;
        if raw & SIGN_BIT == SIGN_BIT {
            let magnitude = !(raw - 1) & RAW_MASK;
            -RESOLUTION * magnitude as f32
        } else {
            RESOLUTION * raw as f32
        }
    }
}
