//! Tipos compartilhados: amostras de sensores e registros de telemetria.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ──────────────────────────────────────────────
// Amostras
// ──────────────────────────────────────────────

/// Tipo de sensor de origem de uma amostra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SensorType {
    Accelerometer,
    Humidity,
    Temperature,
    Unknown,
}

/// Conjunto de valores brutos por tipo de sensor, coletados num ciclo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBag {
    values: BTreeMap<SensorType, f32>,
}

impl SampleBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere ou substitui o valor de um sensor.
    pub fn insert(&mut self, sensor: SensorType, value: f32) {
        self.values.insert(sensor, value);
    }

    pub fn get(&self, sensor: SensorType) -> Option<f32> {
        self.values.get(&sensor).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SensorType, f32)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(SensorType, f32)> for SampleBag {
    fn from_iter<T: IntoIterator<Item = (SensorType, f32)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

// ──────────────────────────────────────────────
// Registro formatado
// ──────────────────────────────────────────────

/// Valor de uma propriedade do registro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Float(f32),
    Text(String),
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Text(v)
    }
}

/// Registro pronto para envio. Imutável depois de construído.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    partition_key: Option<String>,
    body: Vec<u8>,
    properties: BTreeMap<String, PropertyValue>,
}

impl TelemetryRecord {
    pub fn new(partition_key: Option<String>, body: Vec<u8>) -> Self {
        Self {
            partition_key,
            body,
            properties: BTreeMap::new(),
        }
    }

    /// Acrescenta uma propriedade durante a construção.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn partition_key(&self) -> Option<&str> {
        self.partition_key.as_deref()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
