//! Configuração unificada via TOML.
//!
//! Um único `config.toml` ao lado do executável com as seções
//! `[sensor]`, `[client]` e `[dispatch]`.

use crate::dispatch::{ClosePolicy, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tmp102::codec::{MAX_CELSIUS, MIN_CELSIUS};
use tmp102::{
    AddressSelect, AlertPolarity, ConsecutiveFaults, ConversionRate, OneShotPolicy, Settings,
    Temperature, ThermostatMode,
};
use tracing::{info, warn};

/// Configuração do sensor TMP102.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Dispositivo I2C (ex: "/dev/i2c-1")
    pub i2c_bus: String,
    /// Ligação do pino A0
    pub address_select: AddressSelect,
    /// Clock do barramento (kHz)
    pub clock_rate_khz: u32,
    pub conversion_rate: ConversionRate,
    pub shutdown_mode: bool,
    pub thermostat_mode: ThermostatMode,
    pub alert_polarity: AlertPolarity,
    pub consecutive_faults: ConsecutiveFaults,
    /// Limite superior do alerta (°C)
    pub temperature_high: f32,
    /// Limite inferior do alerta (°C)
    pub temperature_low: f32,
    /// GPIO do pino ALERT (0 = sem alerta)
    pub alert_pin: u32,
    /// Leituras máximas aguardando a conversão one-shot
    pub one_shot_max_polls: u32,
    /// Intervalo de amostragem em segundos
    pub sample_interval_secs: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            i2c_bus: "/dev/i2c-1".into(),
            address_select: AddressSelect::Gnd,
            clock_rate_khz: tmp102::registers::CLOCK_RATE_KHZ_DEFAULT,
            conversion_rate: settings.conversion_rate,
            shutdown_mode: settings.shutdown_mode,
            thermostat_mode: settings.thermostat_mode,
            alert_polarity: settings.alert_polarity,
            consecutive_faults: settings.consecutive_faults,
            temperature_high: settings.temperature_high,
            temperature_low: settings.temperature_low,
            alert_pin: 0,
            one_shot_max_polls: OneShotPolicy::default().max_polls,
            sample_interval_secs: 5.0,
        }
    }
}

impl SensorConfig {
    /// Parâmetros do `open` do driver.
    pub fn settings(&self) -> Settings {
        Settings {
            conversion_rate: self.conversion_rate,
            shutdown_mode: self.shutdown_mode,
            thermostat_mode: self.thermostat_mode,
            alert_polarity: self.alert_polarity,
            consecutive_faults: self.consecutive_faults,
            temperature_high: self.temperature_high,
            temperature_low: self.temperature_low,
        }
    }

    pub fn one_shot_policy(&self) -> OneShotPolicy {
        OneShotPolicy {
            max_polls: self.one_shot_max_polls,
            ..OneShotPolicy::default()
        }
    }
}

/// Formato dos registros enviados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    /// Propriedades `time`/`temp`
    Properties,
    /// Corpo JSON ConnectTheDots
    ConnectTheDots,
}

/// Configuração do cliente de telemetria.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub device_name: String,
    /// Identificador do dispositivo (vazio = usa `device_name`)
    pub device_id: String,
    pub format: FormatKind,
    pub organization: String,
    pub location: String,
    /// Modo de envio: "broadcast" ou "unicast"
    pub mode: String,
    /// IP de destino (255.255.255.255 para broadcast)
    pub dest_ip: String,
    /// Porta UDP
    pub port: u16,
    /// IP local para bind (vazio = auto)
    pub bind_ip: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            device_name: "raspberrypi2".into(),
            device_id: String::new(),
            format: FormatKind::ConnectTheDots,
            organization: "my organization".into(),
            location: "my location".into(),
            mode: "broadcast".into(),
            dest_ip: "255.255.255.255".into(),
            port: 5005,
            bind_ip: String::new(),
        }
    }
}

impl ClientConfig {
    /// Device id efetivo.
    pub fn device_id(&self) -> &str {
        if self.device_id.is_empty() {
            &self.device_name
        } else {
            &self.device_id
        }
    }
}

/// Reenvio e fechamento da fila.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// true = entrega pendentes no close; false = descarta
    pub drain_on_close: bool,
    pub drain_timeout_secs: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            max_retries: retry.max_retries,
            initial_backoff_ms: retry.initial_backoff.as_millis() as u64,
            max_backoff_ms: retry.max_backoff.as_millis() as u64,
            drain_on_close: true,
            drain_timeout_secs: 5.0,
        }
    }
}

impl DispatchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }

    pub fn close_policy(&self) -> ClosePolicy {
        if self.drain_on_close {
            ClosePolicy::Drain {
                timeout: Duration::from_secs_f64(self.drain_timeout_secs.max(0.0)),
            }
        } else {
            ClosePolicy::Discard
        }
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sensor: SensorConfig,
    pub client: ClientConfig,
    pub dispatch: DispatchConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let sensor = &self.sensor;

        if sensor.i2c_bus.is_empty() {
            errors.push("Dispositivo I2C não pode ser vazio".into());
        }
        for (name, value) in [
            ("temperature_high", sensor.temperature_high),
            ("temperature_low", sensor.temperature_low),
        ] {
            if Temperature::from_celsius(value).is_err() {
                errors.push(format!(
                    "{name} fora da faixa: {value} ({MIN_CELSIUS}–{MAX_CELSIUS} °C)"
                ));
            }
        }
        if sensor.one_shot_max_polls == 0 {
            errors.push("one_shot_max_polls deve ser > 0".into());
        }
        if !(0.1..=3600.0).contains(&sensor.sample_interval_secs) {
            errors.push(format!(
                "Intervalo de amostragem inválido: {} (0.1–3600.0)",
                sensor.sample_interval_secs
            ));
        }

        if self.client.port == 0 {
            errors.push("Porta do cliente não pode ser 0".into());
        }
        if self.client.dest_ip.is_empty() {
            errors.push("IP de destino não pode ser vazio".into());
        }
        if self.client.device_id().is_empty() {
            errors.push("device_name ou device_id deve ser informado".into());
        }

        if self.dispatch.initial_backoff_ms > self.dispatch.max_backoff_ms {
            errors.push("initial_backoff_ms maior que max_backoff_ms".into());
        }
        if !self.dispatch.drain_timeout_secs.is_finite() || self.dispatch.drain_timeout_secs < 0.0 {
            errors.push("drain_timeout_secs inválido".into());
        }

        errors
    }
}
