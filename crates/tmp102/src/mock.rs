//! Barramento e pino simulados para os testes do driver.

use embedded_hal::digital::{self, InputPin};
use embedded_hal::i2c::{self, ErrorKind, I2c, NoAcknowledgeSource, Operation};
use std::collections::VecDeque;
use std::convert::Infallible;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Read(u8),
    Write(u8, [u8; 2]),
}

/// Banco de registradores do TMP102 com log de transações.
pub struct MockBus {
    pub address: u8,
    pub registers: [[u8; 2]; 4],
    /// Valores devolvidos, em ordem, pelas próximas leituras de configuração
    pub config_script: VecDeque<[u8; 2]>,
    pub log: Vec<Transaction>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pointer: u8,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            address: 0x48,
            // Valores de power-on: 0 °C, 4 Hz comparator, T_LOW 75 °C, T_HIGH 80 °C
            registers: [[0x00, 0x00], [0x60, 0xA0], [0x4B, 0x00], [0x50, 0x00]],
            config_script: VecDeque::new(),
            log: Vec::new(),
            fail_reads: false,
            fail_writes: false,
            pointer: 0,
        }
    }

    pub fn writes(&self) -> Vec<(u8, [u8; 2])> {
        self.log
            .iter()
            .filter_map(|t| match *t {
                Transaction::Write(reg, value) => Some((reg, value)),
                Transaction::Read(_) => None,
            })
            .collect()
    }

    pub fn reads_of(&self, register: u8) -> usize {
        self.log
            .iter()
            .filter(|t| **t == Transaction::Read(register))
            .count()
    }
}

impl i2c::ErrorType for MockBus {
    type Error = ErrorKind;
}

impl I2c for MockBus {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    self.pointer = bytes[0];
                    if bytes.len() == 3 {
                        if self.fail_writes {
                            return Err(ErrorKind::Bus);
                        }
                        let value = [bytes[1], bytes[2]];
                        self.registers[self.pointer as usize] = value;
                        self.log.push(Transaction::Write(self.pointer, value));
                    }
                }
                Operation::Read(buf) => {
                    if self.fail_reads {
                        return Err(ErrorKind::ArbitrationLoss);
                    }
                    let reg = self.pointer as usize;
                    if reg == 1 {
                        if let Some(next) = self.config_script.pop_front() {
                            self.registers[1] = next;
                        }
                    }
                    buf.copy_from_slice(&self.registers[reg]);
                    self.log.push(Transaction::Read(self.pointer));
                }
            }
        }
        Ok(())
    }
}

/// Pino que devolve uma sequência de níveis e depois fica em baixo.
pub struct ScriptedPin {
    levels: VecDeque<bool>,
}

impl ScriptedPin {
    pub fn new(levels: impl IntoIterator<Item = bool>) -> Self {
        Self {
            levels: levels.into_iter().collect(),
        }
    }
}

impl digital::ErrorType for ScriptedPin {
    type Error = Infallible;
}

impl InputPin for ScriptedPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.levels.pop_front().unwrap_or(false))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}
