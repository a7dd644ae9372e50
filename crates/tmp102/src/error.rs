use crate::registers::Register;
use embedded_hal::i2c::ErrorKind;

/// Direção da transação I2C que falhou.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

/// Falha de uma transação no barramento, já desacoplada do erro do HAL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Falha de I2C ({direction:?} no registrador {register:?}): {kind:?}")]
pub struct TransactionError {
    pub register: Register,
    pub direction: Direction,
    pub kind: ErrorKind,
}

/// Configuração rejeitada antes de tocar no dispositivo.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Modo estendido (13 bits) não suportado")]
    ExtendedModeUnsupported,

    #[error("Temperatura fora da faixa de 12 bits: {0} °C")]
    TemperatureOutOfRange(f32),
}

/// Erros das operações do driver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Driver não inicializado (open não concluído)")]
    NotReady,

    #[error("Conversão one-shot não terminou após {polls} leituras")]
    ConversionTimeout { polls: u32 },

    #[error("Falha ao armar pino de alerta: {0}")]
    AlertPin(String),
}

/// Etapa do `open` em que a falha ocorreu.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpenStage {
    LoadConfiguration,
    WriteConfiguration,
    WriteTemperatureHigh,
    WriteTemperatureLow,
    ArmAlertPin,
}

/// Falha de abertura do driver. O driver fica "not ready" e o `open` pode
/// ser repetido.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Falha ao abrir TMP102 na etapa {stage:?}: {source}")]
pub struct OpenError {
    pub stage: OpenStage,
    #[source]
    pub source: Error,
}
