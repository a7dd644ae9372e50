//! Estratégias de formatação: [`SampleBag`] → [`TelemetryRecord`].
//!
//! - [`PropertiesFormatter`] – valores como propriedades do registro, corpo vazio
//! - [`ConnectTheDotsFormatter`] – corpo JSON no esquema ConnectTheDots

use crate::types::{SampleBag, SensorType, TelemetryRecord};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Fonte de tempo dos formatadores.
pub type Clock = fn() -> DateTime<Utc>;

/// Erros de formatação.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Nenhum sensor suportado no bag")]
    NoSupportedSensor,

    #[error("Erro de serialização JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Converte um bag de amostras num registro pronto para envio.
pub trait EventFormatter: Send + Sync {
    fn format(&self, bag: &SampleBag) -> Result<TelemetryRecord, FormatError>;
}

fn timestamp(clock: Clock) -> String {
    clock().to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ──────────────────────────────────────────────
// Propriedades simples
// ──────────────────────────────────────────────

/// Registro com propriedades `time` e `temp`, particionado pelo device id.
#[derive(Debug, Clone)]
pub struct PropertiesFormatter {
    device_id: String,
    clock: Clock,
}

impl PropertiesFormatter {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

impl EventFormatter for PropertiesFormatter {
    fn format(&self, bag: &SampleBag) -> Result<TelemetryRecord, FormatError> {
        let temp = bag
            .get(SensorType::Temperature)
            .ok_or(FormatError::NoSupportedSensor)?;

        Ok(TelemetryRecord::new(Some(self.device_id.clone()), Vec::new())
            .with_property("time", timestamp(self.clock))
            .with_property("temp", temp))
    }
}

// ──────────────────────────────────────────────
// ConnectTheDots (JSON)
// ──────────────────────────────────────────────

/// Objeto de sensor serializado no corpo do registro.
#[derive(Debug, Clone, Serialize)]
struct ConnectTheDotsSensor<'a> {
    guid: &'a str,
    displayname: &'a str,
    organization: &'a str,
    location: &'a str,
    measurename: &'a str,
    unitofmeasure: &'a str,
    timecreated: String,
    value: f64,
}

/// Corpo JSON no formato esperado pelo dashboard ConnectTheDots.
#[derive(Debug, Clone)]
pub struct ConnectTheDotsFormatter {
    guid: String,
    display_name: String,
    organization: String,
    location: String,
    clock: Clock,
}

impl ConnectTheDotsFormatter {
    pub fn new(
        guid: impl Into<String>,
        display_name: impl Into<String>,
        organization: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            guid: guid.into(),
            display_name: display_name.into(),
            organization: organization.into(),
            location: location.into(),
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

impl EventFormatter for ConnectTheDotsFormatter {
    fn format(&self, bag: &SampleBag) -> Result<TelemetryRecord, FormatError> {
        let temp = bag
            .get(SensorType::Temperature)
            .ok_or(FormatError::NoSupportedSensor)?;

        let sensor = ConnectTheDotsSensor {
            guid: &self.guid,
            displayname: &self.display_name,
            organization: &self.organization,
            location: &self.location,
            measurename: "Temperature",
            unitofmeasure: "C",
            timecreated: timestamp(self.clock),
            value: f64::from(temp),
        };

        let body = serde_json::to_vec(&sensor)?;
        Ok(TelemetryRecord::new(Some(self.guid.clone()), body))
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PropertyValue;
    use chrono::TimeZone;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap()
    }

    fn temperature_bag(value: f32) -> SampleBag {
        [(SensorType::Temperature, value)].into_iter().collect()
    }

    #[test]
    fn properties_formatter_sets_time_temp_and_key() {
        let fmt = PropertiesFormatter::new("rpi-01").with_clock(fixed_clock);
        let record = fmt.format(&temperature_bag(23.5)).unwrap();

        assert_eq!(record.partition_key(), Some("rpi-01"));
        assert!(record.body().is_empty());
        assert_eq!(record.property("temp"), Some(&PropertyValue::Float(23.5)));
        assert_eq!(
            record.property("time"),
            Some(&PropertyValue::Text("2025-03-14T15:09:26.000000Z".into()))
        );
    }

    #[test]
    fn connect_the_dots_body_is_json_sensor_object() {
        let fmt = ConnectTheDotsFormatter::new("guid-1", "raspberrypi2", "my organization", "my location")
            .with_clock(fixed_clock);
        let record = fmt.format(&temperature_bag(-4.25)).unwrap();

        let json: serde_json::Value = serde_json::from_slice(record.body()).unwrap();
        assert_eq!(json["guid"], "guid-1");
        assert_eq!(json["displayname"], "raspberrypi2");
        assert_eq!(json["organization"], "my organization");
        assert_eq!(json["location"], "my location");
        assert_eq!(json["measurename"], "Temperature");
        assert_eq!(json["unitofmeasure"], "C");
        assert_eq!(json["timecreated"], "2025-03-14T15:09:26.000000Z");
        assert_eq!(json["value"], -4.25);
        assert!(record.properties().is_empty());
    }

    #[test]
    fn unsupported_sensors_are_rejected() {
        let bag: SampleBag = [(SensorType::Humidity, 40.0_f32)].into_iter().collect();
        let fmt = PropertiesFormatter::new("x");
        assert!(matches!(fmt.format(&bag), Err(FormatError::NoSupportedSensor)));
    }

    #[test]
    fn formatters_are_usable_as_trait_objects() {
        let formatters: Vec<Box<dyn EventFormatter>> = vec![
            Box::new(PropertiesFormatter::new("a")),
            Box::new(ConnectTheDotsFormatter::new("a", "b", "c", "d")),
        ];
        for f in &formatters {
            assert_eq!(f.format(&temperature_bag(1.0)).unwrap().partition_key(), Some("a"));
        }
    }
}
