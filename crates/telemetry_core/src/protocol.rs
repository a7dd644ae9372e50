//! Frame UDP de um [`TelemetryRecord`].
//!
//! ```text
//! ┌──────┬────────┬───────────────────────────┐
//! │ 0x54 │ versão │ TelemetryRecord (bincode) │
//! └──────┴────────┴───────────────────────────┘
//! ```
//!
//! Um registro por datagrama. O frame inteiro precisa caber num datagrama
//! UDP; registros maiores são recusados no encode.

use crate::types::TelemetryRecord;

/// Primeiro byte de todo frame ('T').
pub const MAGIC_BYTE: u8 = 0x54;

/// Versão 2: corpo é um `TelemetryRecord`.
pub const PROTOCOL_VERSION: u8 = 2;

const HEADER: [u8; 2] = [MAGIC_BYTE, PROTOCOL_VERSION];

/// Maior datagrama UDP sobre IPv4.
pub const MAX_UDP_PAYLOAD: usize = 65507;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Pacote muito curto ({0} bytes, mínimo {min})", min = HEADER.len())]
    TooShort(usize),

    #[error("Frame de {0} bytes não cabe num datagrama ({MAX_UDP_PAYLOAD})")]
    TooLarge(usize),

    #[error("Magic byte inválido: 0x{0:02X} (esperado 0x{MAGIC_BYTE:02X})")]
    InvalidMagic(u8),

    #[error("Versão incompatível: {0} (suportada: {PROTOCOL_VERSION})")]
    VersionMismatch(u8),

    #[error("Erro de serialização: {0}")]
    Serialize(String),

    #[error("Erro de deserialização: {0}")]
    Deserialize(String),
}

/// Monta o frame de um registro.
pub fn encode_record(record: &TelemetryRecord) -> Result<Vec<u8>, ProtocolError> {
    let body_len = bincode::serialized_size(record)
        .map_err(|e| ProtocolError::Serialize(e.to_string()))?;
    let frame_len = HEADER.len().saturating_add(usize::try_from(body_len).unwrap_or(usize::MAX));
    if frame_len > MAX_UDP_PAYLOAD {
        return Err(ProtocolError::TooLarge(frame_len));
    }

    let mut frame = Vec::with_capacity(frame_len);
    frame.extend_from_slice(&HEADER);
    bincode::serialize_into(&mut frame, record)
        .map_err(|e| ProtocolError::Serialize(e.to_string()))?;
    Ok(frame)
}

pub fn decode_record(frame: &[u8]) -> Result<TelemetryRecord, ProtocolError> {
    let body = strip_header(frame)?;
    bincode::deserialize(body).map_err(|e| ProtocolError::Deserialize(e.to_string()))
}

/// Confere magic e versão, devolvendo o corpo.
fn strip_header(frame: &[u8]) -> Result<&[u8], ProtocolError> {
    let Some(([magic, version], body)) = frame.split_first_chunk::<2>() else {
        return Err(ProtocolError::TooShort(frame.len()));
    };
    match (*magic, *version) {
        (MAGIC_BYTE, PROTOCOL_VERSION) => Ok(body),
        (MAGIC_BYTE, other) => Err(ProtocolError::VersionMismatch(other)),
        (other, _) => Err(ProtocolError::InvalidMagic(other)),
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
