//! Mapa de registradores do TMP102 e bitfield do registrador de configuração.
//!
//! ```text
//!  15   14 13  12 11  10   9    8    7 6   5    4   3..0
//! ┌────┬─────┬─────┬────┬────┬────┬─────┬────┬────┬──────┐
//! │ OS │ R1R0│ F1F0│ POL│ TM │ SD │ CR  │ AL │ EM │ res. │
//! └────┴─────┴─────┴────┴────┴────┴─────┴────┴────┴──────┘
//! ```
//!
//! O registrador trafega em big-endian: `byte0` é o byte alto.

use core::str::FromStr;

/// Endereço base do TMP102 (A0 ligado em GND).
pub const ADDRESS_BASE: u8 = 0x48;

/// Clock I2C padrão (kHz). Acima disso o barramento opera em fast mode.
pub const CLOCK_RATE_KHZ_DEFAULT: u32 = 100;

/// Registradores acessíveis via pointer register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    /// Temperatura (somente leitura)
    Temperature = 0x00,
    /// Configuração (leitura/escrita)
    Configuration = 0x01,
    /// Limite inferior do alerta (T_LOW)
    TemperatureLow = 0x02,
    /// Limite superior do alerta (T_HIGH)
    TemperatureHigh = 0x03,
}

impl Register {
    pub fn addr(self) -> u8 {
        self as u8
    }
}

/// Ligação do pino A0, que define o endereço do dispositivo.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AddressSelect {
    /// A0 → GND (0x48)
    #[default]
    Gnd,
    /// A0 → V+ (0x49)
    Vdd,
    /// A0 → SDA (0x4A)
    Sda,
    /// A0 → SCL (0x4B)
    Scl,
}

impl From<AddressSelect> for u8 {
    fn from(select: AddressSelect) -> Self {
        ADDRESS_BASE
            + match select {
                AddressSelect::Gnd => 0,
                AddressSelect::Vdd => 1,
                AddressSelect::Sda => 2,
                AddressSelect::Scl => 3,
            }
    }
}

/// Velocidade do barramento I2C.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusSpeed {
    /// 100 kHz
    Standard,
    /// 400 kHz
    Fast,
}

impl BusSpeed {
    pub fn from_clock_khz(khz: u32) -> Self {
        if khz <= CLOCK_RATE_KHZ_DEFAULT {
            BusSpeed::Standard
        } else {
            BusSpeed::Fast
        }
    }
}

// ──────────────────────────────────────────────
// Campos do registrador de configuração
// ──────────────────────────────────────────────

const EXTENDED_MODE: u16 = 1 << 4;
const ALERT: u16 = 1 << 5;
const CONV_RATE_SHIFT: u16 = 6;
const CONV_RATE_MASK: u16 = 0b11 << CONV_RATE_SHIFT;
const SHUTDOWN_MODE: u16 = 1 << 8;
const THERMOSTAT_MODE: u16 = 1 << 9;
const POLARITY: u16 = 1 << 10;
const FAULT_QUEUE_SHIFT: u16 = 11;
const FAULT_QUEUE_MASK: u16 = 0b11 << FAULT_QUEUE_SHIFT;
const CONV_RES_SHIFT: u16 = 13;
const CONV_RES_MASK: u16 = 0b11 << CONV_RES_SHIFT;
const ONE_SHOT: u16 = 1 << 15;

/// Taxa de conversão contínua.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConversionRate {
    #[cfg_attr(feature = "serde", serde(rename = "0.25hz"))]
    Hz0_25 = 0b00,
    #[cfg_attr(feature = "serde", serde(rename = "1hz"))]
    Hz1 = 0b01,
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "4hz"))]
    Hz4 = 0b10,
    #[cfg_attr(feature = "serde", serde(rename = "8hz"))]
    Hz8 = 0b11,
}

impl ConversionRate {
    fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b00 => ConversionRate::Hz0_25,
            0b01 => ConversionRate::Hz1,
            0b10 => ConversionRate::Hz4,
            _ => ConversionRate::Hz8,
        }
    }
}

impl FromStr for ConversionRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0.25hz" | "0.25" => Ok(ConversionRate::Hz0_25),
            "1hz" | "1" => Ok(ConversionRate::Hz1),
            "4hz" | "4" => Ok(ConversionRate::Hz4),
            "8hz" | "8" => Ok(ConversionRate::Hz8),
            other => Err(format!("Taxa de conversão inválida: {other}")),
        }
    }
}

/// Modo do termostato (pino ALERT).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ThermostatMode {
    #[default]
    Comparator,
    Interrupt,
}

/// Polaridade do pino ALERT.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AlertPolarity {
    #[default]
    ActiveLow,
    ActiveHigh,
}

/// Falhas consecutivas antes de ativar o alerta (fault queue).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConsecutiveFaults {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "1"))]
    One = 0b00,
    #[cfg_attr(feature = "serde", serde(rename = "2"))]
    Two = 0b01,
    #[cfg_attr(feature = "serde", serde(rename = "4"))]
    Four = 0b10,
    #[cfg_attr(feature = "serde", serde(rename = "6"))]
    Six = 0b11,
}

impl ConsecutiveFaults {
    fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b00 => ConsecutiveFaults::One,
            0b01 => ConsecutiveFaults::Two,
            0b10 => ConsecutiveFaults::Four,
            _ => ConsecutiveFaults::Six,
        }
    }
}

/// Cópia local do registrador de configuração.
///
/// Cada `with_*` altera só o próprio campo; bits reservados e campos não
/// mapeados atravessam intactos qualquer read-modify-write.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigurationRegister(u16);

impl ConfigurationRegister {
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }

    pub fn to_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    fn flag(self, mask: u16) -> bool {
        self.0 & mask == mask
    }

    fn with_flag(self, mask: u16, on: bool) -> Self {
        if on { Self(self.0 | mask) } else { Self(self.0 & !mask) }
    }

    fn with_field(self, mask: u16, shift: u16, value: u16) -> Self {
        Self((self.0 & !mask) | ((value << shift) & mask))
    }

    pub fn extended_mode(self) -> bool {
        self.flag(EXTENDED_MODE)
    }

    pub fn with_extended_mode(self, on: bool) -> Self {
        self.with_flag(EXTENDED_MODE, on)
    }

    /// Flag de alerta (somente leitura no dispositivo).
    pub fn alert(self) -> bool {
        self.flag(ALERT)
    }

    pub fn conversion_rate(self) -> ConversionRate {
        ConversionRate::from_bits((self.0 & CONV_RATE_MASK) >> CONV_RATE_SHIFT)
    }

    pub fn with_conversion_rate(self, rate: ConversionRate) -> Self {
        self.with_field(CONV_RATE_MASK, CONV_RATE_SHIFT, rate as u16)
    }

    pub fn shutdown_mode(self) -> bool {
        self.flag(SHUTDOWN_MODE)
    }

    pub fn with_shutdown_mode(self, on: bool) -> Self {
        self.with_flag(SHUTDOWN_MODE, on)
    }

    pub fn thermostat_mode(self) -> ThermostatMode {
        if self.flag(THERMOSTAT_MODE) {
            ThermostatMode::Interrupt
        } else {
            ThermostatMode::Comparator
        }
    }

    pub fn with_thermostat_mode(self, mode: ThermostatMode) -> Self {
        self.with_flag(THERMOSTAT_MODE, mode == ThermostatMode::Interrupt)
    }

    pub fn alert_polarity(self) -> AlertPolarity {
        if self.flag(POLARITY) {
            AlertPolarity::ActiveHigh
        } else {
            AlertPolarity::ActiveLow
        }
    }

    pub fn with_alert_polarity(self, polarity: AlertPolarity) -> Self {
        self.with_flag(POLARITY, polarity == AlertPolarity::ActiveHigh)
    }

    pub fn consecutive_faults(self) -> ConsecutiveFaults {
        ConsecutiveFaults::from_bits((self.0 & FAULT_QUEUE_MASK) >> FAULT_QUEUE_SHIFT)
    }

    pub fn with_consecutive_faults(self, faults: ConsecutiveFaults) -> Self {
        self.with_field(FAULT_QUEUE_MASK, FAULT_QUEUE_SHIFT, faults as u16)
    }

    /// Resolução de conversão (R1:R0). Não utilizada pelo driver.
    pub fn conversion_resolution(self) -> u8 {
        ((self.0 & CONV_RES_MASK) >> CONV_RES_SHIFT) as u8
    }

    /// One-shot / conversion ready.
    pub fn one_shot(self) -> bool {
        self.flag(ONE_SHOT)
    }

    pub fn with_one_shot(self, on: bool) -> Self {
        self.with_flag(ONE_SHOT, on)
    }
}
