//! Driver do TMP102 sobre [`embedded_hal::i2c::I2c`].
//!
//! Toda alteração de configuração passa por [`Tmp102::commit`], que compara
//! com a cópia local e faz no máximo uma escrita no barramento.

use crate::alert::{AlertInput, AlertNotifier, AlertSubscription, AlertWatcher};
use crate::codec::Temperature;
use crate::error::{ConfigurationError, Direction, Error, OpenError, OpenStage, TransactionError};
use crate::registers::{
    AddressSelect, AlertPolarity, BusSpeed, ConfigurationRegister, ConsecutiveFaults,
    ConversionRate, Register, ThermostatMode,
};
use embedded_hal::i2c::{Error as _, I2c};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Parâmetros aplicados no `open`.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub conversion_rate: ConversionRate,
    pub shutdown_mode: bool,
    pub thermostat_mode: ThermostatMode,
    pub alert_polarity: AlertPolarity,
    pub consecutive_faults: ConsecutiveFaults,
    /// Limite superior do alerta (°C)
    pub temperature_high: f32,
    /// Limite inferior do alerta (°C)
    pub temperature_low: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            conversion_rate: ConversionRate::Hz4,
            shutdown_mode: false,
            thermostat_mode: ThermostatMode::Comparator,
            alert_polarity: AlertPolarity::ActiveLow,
            consecutive_faults: ConsecutiveFaults::One,
            temperature_high: 80.0,
            temperature_low: 75.0,
        }
    }
}

/// Limite da espera pela conversão one-shot em shutdown mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OneShotPolicy {
    /// Leituras do registrador de configuração antes de desistir
    pub max_polls: u32,
    /// Pausa entre leituras
    pub poll_interval: Duration,
}

impl Default for OneShotPolicy {
    fn default() -> Self {
        Self {
            max_polls: 1000,
            poll_interval: Duration::from_millis(1),
        }
    }
}

/// Texas Instruments TMP102.
pub struct Tmp102<I> {
    i2c: I,
    address: u8,
    bus_speed: BusSpeed,
    config: ConfigurationRegister,
    ready: bool,
    one_shot: OneShotPolicy,
    notifier: AlertNotifier,
    watcher: Option<AlertWatcher>,
}

impl<I: I2c> Tmp102<I> {
    /// Cria o driver sem tocar no barramento. É preciso chamar `open`.
    pub fn new(i2c: I, address_select: AddressSelect, clock_rate_khz: u32) -> Self {
        Self {
            i2c,
            address: address_select.into(),
            bus_speed: BusSpeed::from_clock_khz(clock_rate_khz),
            config: ConfigurationRegister::default(),
            ready: false,
            one_shot: OneShotPolicy::default(),
            notifier: AlertNotifier::default(),
            watcher: None,
        }
    }

    pub fn with_one_shot_policy(mut self, policy: OneShotPolicy) -> Self {
        self.one_shot = policy;
        self
    }

    /// Devolve o barramento, parando o monitor do pino de alerta.
    pub fn release(mut self) -> I {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }
        self.i2c
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn bus_speed(&self) -> BusSpeed {
        self.bus_speed
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Abre o driver sem pino de alerta.
    pub fn open(&mut self, settings: &Settings) -> Result<(), OpenError> {
        self.open_inner(settings, None::<NoAlertPin>)
    }

    /// Abre o driver e arma o monitor do pino ALERT.
    pub fn open_with_alert<A: AlertInput>(
        &mut self,
        settings: &Settings,
        alert_pin: A,
    ) -> Result<(), OpenError> {
        self.open_inner(settings, Some(alert_pin))
    }

    fn open_inner<A: AlertInput>(
        &mut self,
        settings: &Settings,
        alert_pin: Option<A>,
    ) -> Result<(), OpenError> {
        self.ready = false;
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }

        let result = self.configure(settings, alert_pin);
        match &result {
            Ok(()) => {
                self.ready = true;
                info!(
                    "TMP102 aberto em 0x{:02X} ({:?}) – config 0x{:04X}",
                    self.address,
                    self.bus_speed,
                    self.config.bits()
                );
            }
            Err(e) => warn!("{e}"),
        }
        result
    }

    fn configure<A: AlertInput>(
        &mut self,
        settings: &Settings,
        alert_pin: Option<A>,
    ) -> Result<(), OpenError> {
        let stage = |stage: OpenStage| move |source: Error| OpenError { stage, source };

        // Thresholds validados antes de qualquer escrita
        let high = Temperature::from_celsius(settings.temperature_high)
            .map_err(|e| stage(OpenStage::WriteTemperatureHigh)(e.into()))?;
        let low = Temperature::from_celsius(settings.temperature_low)
            .map_err(|e| stage(OpenStage::WriteTemperatureLow)(e.into()))?;

        self.load_configuration()
            .map_err(stage(OpenStage::LoadConfiguration))?;

        // O codec é de 12 bits: EM sempre desligado após o open
        let config = self
            .config
            .with_extended_mode(false)
            .with_conversion_rate(settings.conversion_rate)
            .with_shutdown_mode(settings.shutdown_mode)
            .with_thermostat_mode(settings.thermostat_mode)
            .with_alert_polarity(settings.alert_polarity)
            .with_consecutive_faults(settings.consecutive_faults);
        self.write_configuration(config)
            .map_err(stage(OpenStage::WriteConfiguration))?;

        self.write_register(Register::TemperatureHigh, high.to_register_bytes())
            .map_err(stage(OpenStage::WriteTemperatureHigh))?;
        self.write_register(Register::TemperatureLow, low.to_register_bytes())
            .map_err(stage(OpenStage::WriteTemperatureLow))?;

        if let Some(pin) = alert_pin {
            let watcher = AlertWatcher::spawn(pin, self.notifier.clone())
                .map_err(|e| stage(OpenStage::ArmAlertPin)(Error::AlertPin(e.to_string())))?;
            self.watcher = Some(watcher);
        }

        Ok(())
    }

    /// Inscreve-se nos alertas do pino ALERT.
    pub fn subscribe_alerts(&self) -> AlertSubscription {
        self.notifier.subscribe()
    }

    /// Lê a temperatura atual (°C).
    ///
    /// Em shutdown mode dispara uma conversão one-shot e relê a configuração
    /// até o bit OS limpar, respeitando o [`OneShotPolicy`].
    pub fn temperature(&mut self) -> Result<f32, Error> {
        self.ensure_ready()?;

        if self.config.shutdown_mode() {
            self.one_shot_conversion()?;
        }

        let bytes = self.read_register(Register::Temperature)?;
        Ok(Temperature::from_register_bytes(bytes).celsius())
    }

    fn one_shot_conversion(&mut self) -> Result<(), Error> {
        self.write_configuration(self.config.with_one_shot(true))?;

        for _ in 0..self.one_shot.max_polls {
            self.load_configuration()?;
            if !self.config.one_shot() {
                return Ok(());
            }
            if !self.one_shot.poll_interval.is_zero() {
                std::thread::sleep(self.one_shot.poll_interval);
            }
        }

        // Sem isso o próximo commit regravaria OS=1
        self.config = self.config.with_one_shot(false);
        Err(Error::ConversionTimeout {
            polls: self.one_shot.max_polls,
        })
    }

    // ──────────────────────────────────────────
    // Campos de configuração
    // ──────────────────────────────────────────

    pub fn configuration(&self) -> ConfigurationRegister {
        self.config
    }

    pub fn extended_mode(&self) -> bool {
        self.config.extended_mode()
    }

    /// Só aceita `false`: o modo de 13 bits não é suportado.
    pub fn set_extended_mode(&mut self, on: bool) -> Result<(), Error> {
        if on {
            return Err(ConfigurationError::ExtendedModeUnsupported.into());
        }
        self.commit(self.config.with_extended_mode(false))
    }

    pub fn conversion_rate(&self) -> ConversionRate {
        self.config.conversion_rate()
    }

    pub fn set_conversion_rate(&mut self, rate: ConversionRate) -> Result<(), Error> {
        self.commit(self.config.with_conversion_rate(rate))
    }

    pub fn shutdown_mode(&self) -> bool {
        self.config.shutdown_mode()
    }

    pub fn set_shutdown_mode(&mut self, on: bool) -> Result<(), Error> {
        self.commit(self.config.with_shutdown_mode(on))
    }

    pub fn thermostat_mode(&self) -> ThermostatMode {
        self.config.thermostat_mode()
    }

    pub fn set_thermostat_mode(&mut self, mode: ThermostatMode) -> Result<(), Error> {
        self.commit(self.config.with_thermostat_mode(mode))
    }

    pub fn alert_polarity(&self) -> AlertPolarity {
        self.config.alert_polarity()
    }

    pub fn set_alert_polarity(&mut self, polarity: AlertPolarity) -> Result<(), Error> {
        self.commit(self.config.with_alert_polarity(polarity))
    }

    pub fn consecutive_faults(&self) -> ConsecutiveFaults {
        self.config.consecutive_faults()
    }

    pub fn set_consecutive_faults(&mut self, faults: ConsecutiveFaults) -> Result<(), Error> {
        self.commit(self.config.with_consecutive_faults(faults))
    }

    /// Relê a configuração e devolve o flag de alerta.
    pub fn alert_active(&mut self) -> Result<bool, Error> {
        self.ensure_ready()?;
        self.load_configuration()?;
        Ok(self.config.alert())
    }

    /// Grava `config` se diferir da cópia local. Zero ou uma escrita.
    pub fn commit(&mut self, config: ConfigurationRegister) -> Result<(), Error> {
        self.ensure_ready()?;
        if config == self.config {
            return Ok(());
        }
        if config.extended_mode() {
            return Err(ConfigurationError::ExtendedModeUnsupported.into());
        }
        self.write_configuration(config)
    }

    // ──────────────────────────────────────────
    // Limites de alerta
    // ──────────────────────────────────────────

    pub fn temperature_high(&mut self) -> Result<f32, Error> {
        self.read_threshold(Register::TemperatureHigh)
    }

    pub fn set_temperature_high(&mut self, celsius: f32) -> Result<(), Error> {
        self.write_threshold(Register::TemperatureHigh, celsius)
    }

    pub fn temperature_low(&mut self) -> Result<f32, Error> {
        self.read_threshold(Register::TemperatureLow)
    }

    pub fn set_temperature_low(&mut self, celsius: f32) -> Result<(), Error> {
        self.write_threshold(Register::TemperatureLow, celsius)
    }

    fn read_threshold(&mut self, register: Register) -> Result<f32, Error> {
        self.ensure_ready()?;
        let bytes = self.read_register(register)?;
        Ok(Temperature::from_register_bytes(bytes).celsius())
    }

    fn write_threshold(&mut self, register: Register, celsius: f32) -> Result<(), Error> {
        self.ensure_ready()?;
        let value = Temperature::from_celsius(celsius)?;
        self.write_register(register, value.to_register_bytes())
    }

    // ──────────────────────────────────────────
    // Acesso ao barramento
    // ──────────────────────────────────────────

    fn ensure_ready(&self) -> Result<(), Error> {
        if self.ready { Ok(()) } else { Err(Error::NotReady) }
    }

    fn load_configuration(&mut self) -> Result<(), Error> {
        let bytes = self.read_register(Register::Configuration)?;
        self.config = ConfigurationRegister::from_bytes(bytes);
        Ok(())
    }

    fn write_configuration(&mut self, config: ConfigurationRegister) -> Result<(), Error> {
        self.write_register(Register::Configuration, config.to_bytes())?;
        debug!("Configuração TMP102: 0x{:04X} → 0x{:04X}", self.config.bits(), config.bits());
        self.config = config;
        Ok(())
    }

    fn read_register(&mut self, register: Register) -> Result<[u8; 2], Error> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register.addr()], &mut buf)
            .map_err(|e| TransactionError {
                register,
                direction: Direction::Read,
                kind: e.kind(),
            })?;
        Ok(buf)
    }

    fn write_register(&mut self, register: Register, data: [u8; 2]) -> Result<(), Error> {
        self.i2c
            .write(self.address, &[register.addr(), data[0], data[1]])
            .map_err(|e| TransactionError {
                register,
                direction: Direction::Write,
                kind: e.kind(),
            })?;
        Ok(())
    }
}

/// Placeholder para `open` sem pino de alerta.
struct NoAlertPin;

impl AlertInput for NoAlertPin {
    type Error = core::convert::Infallible;

    fn wait_for_rising_edge(&mut self, _timeout: Duration) -> Result<bool, Self::Error> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{AlertEvent, PolledAlertPin};
    use crate::mock::{MockBus, ScriptedPin, Transaction};
    use embedded_hal::i2c::ErrorKind;

    const CONFIG: u8 = 0x01;

    fn opened(settings: &Settings) -> Tmp102<MockBus> {
        let mut sensor = Tmp102::new(MockBus::new(), AddressSelect::Gnd, 100);
        sensor.open(settings).unwrap();
        sensor
    }

    fn bus(sensor: &mut Tmp102<MockBus>) -> &mut MockBus {
        &mut sensor.i2c
    }

    #[test]
    fn open_applies_settings_and_thresholds() {
        let settings = Settings {
            conversion_rate: ConversionRate::Hz8,
            thermostat_mode: ThermostatMode::Interrupt,
            alert_polarity: AlertPolarity::ActiveHigh,
            consecutive_faults: ConsecutiveFaults::Four,
            temperature_high: 30.0,
            temperature_low: -10.0,
            ..Settings::default()
        };
        let mut sensor = opened(&settings);
        assert!(sensor.is_ready());

        let writes = bus(&mut sensor).writes();
        assert_eq!(writes.len(), 3);
        // 0x60A0 com CR=11, TM, POL, F=10 → 0x76E0
        assert_eq!(writes[0], (CONFIG, [0x76, 0xE0]));
        assert_eq!(writes[1], (0x03, [0x1E, 0x00]));
        assert_eq!(writes[2], (0x02, [0xF6, 0x00]));

        assert_eq!(sensor.conversion_rate(), ConversionRate::Hz8);
        assert_eq!(sensor.thermostat_mode(), ThermostatMode::Interrupt);
        assert_eq!(sensor.temperature_high().unwrap(), 30.0);
        assert_eq!(sensor.temperature_low().unwrap(), -10.0);
    }

    #[test]
    fn open_preserves_reserved_bits() {
        let mut i2c = MockBus::new();
        i2c.registers[1] = [0x60, 0xAF];
        let mut sensor = Tmp102::new(i2c, AddressSelect::Gnd, 100);
        sensor.open(&Settings::default()).unwrap();
        assert_eq!(sensor.configuration().bits() & 0x000F, 0x000F);
        assert_eq!(sensor.configuration().conversion_resolution(), 0b11);
    }

    #[test]
    fn open_leaves_extended_mode_off() {
        let mut i2c = MockBus::new();
        // Dispositivo deixado em 13 bits por outro host
        i2c.registers[1] = [0x60, 0xB0];
        let mut sensor = Tmp102::new(i2c, AddressSelect::Gnd, 100);
        sensor.open(&Settings::default()).unwrap();

        assert!(!sensor.extended_mode());
        assert_eq!(bus(&mut sensor).writes()[0], (CONFIG, [0x60, 0xA0]));

        bus(&mut sensor).log.clear();
        sensor.set_shutdown_mode(true).unwrap();
        assert_eq!(bus(&mut sensor).writes(), vec![(CONFIG, [0x61, 0xA0])]);
    }

    #[test]
    fn open_failure_leaves_driver_not_ready() {
        let mut i2c = MockBus::new();
        i2c.fail_reads = true;
        let mut sensor = Tmp102::new(i2c, AddressSelect::Gnd, 100);

        let err = sensor.open(&Settings::default()).unwrap_err();
        assert_eq!(err.stage, OpenStage::LoadConfiguration);
        assert!(matches!(
            err.source,
            Error::Transaction(TransactionError {
                register: Register::Configuration,
                direction: Direction::Read,
                kind: ErrorKind::ArbitrationLoss,
            })
        ));
        assert!(!sensor.is_ready());
        assert_eq!(sensor.temperature(), Err(Error::NotReady));
        assert_eq!(sensor.set_shutdown_mode(true), Err(Error::NotReady));

        // Open pode ser repetido
        bus(&mut sensor).fail_reads = false;
        sensor.open(&Settings::default()).unwrap();
        assert!(sensor.is_ready());
    }

    #[test]
    fn open_reports_write_stage() {
        let mut i2c = MockBus::new();
        i2c.fail_writes = true;
        let mut sensor = Tmp102::new(i2c, AddressSelect::Gnd, 100);
        let err = sensor.open(&Settings::default()).unwrap_err();
        assert_eq!(err.stage, OpenStage::WriteConfiguration);
        assert!(!sensor.is_ready());
    }

    #[test]
    fn open_rejects_out_of_range_threshold_before_bus_access() {
        let mut sensor = Tmp102::new(MockBus::new(), AddressSelect::Gnd, 100);
        let settings = Settings {
            temperature_high: 200.0,
            ..Settings::default()
        };
        let err = sensor.open(&settings).unwrap_err();
        assert_eq!(err.stage, OpenStage::WriteTemperatureHigh);
        assert!(bus(&mut sensor).log.is_empty());
    }

    #[test]
    fn wrong_address_is_a_transaction_error() {
        let mut sensor = Tmp102::new(MockBus::new(), AddressSelect::Scl, 400);
        assert_eq!(sensor.address(), 0x4B);
        assert_eq!(sensor.bus_speed(), BusSpeed::Fast);
        assert!(sensor.open(&Settings::default()).is_err());
    }

    #[test]
    fn continuous_mode_reads_temperature_register() {
        let mut sensor = opened(&Settings::default());
        bus(&mut sensor).registers[0] = [0x19, 0x00];
        bus(&mut sensor).log.clear();

        assert_eq!(sensor.temperature().unwrap(), 25.0);
        assert_eq!(bus(&mut sensor).log, vec![Transaction::Read(0x00)]);
    }

    #[test]
    fn negative_temperature_reading() {
        let mut sensor = opened(&Settings::default());
        bus(&mut sensor).registers[0] = [0xE6, 0x00];
        assert_eq!(sensor.temperature().unwrap(), -26.0);
    }

    #[test]
    fn shutdown_mode_runs_one_shot_handshake() {
        let settings = Settings {
            shutdown_mode: true,
            ..Settings::default()
        };
        let mut sensor = opened(&settings).with_one_shot_policy(OneShotPolicy {
            max_polls: 10,
            poll_interval: Duration::ZERO,
        });
        let base = sensor.configuration();
        let b = bus(&mut sensor);
        b.registers[0] = [0x19, 0x00];
        b.log.clear();
        // Conversão em andamento na primeira leitura, concluída na segunda
        b.config_script.push_back(base.with_one_shot(true).to_bytes());
        b.config_script.push_back(base.to_bytes());

        assert_eq!(sensor.temperature().unwrap(), 25.0);

        let b = bus(&mut sensor);
        assert_eq!(b.writes(), vec![(CONFIG, base.with_one_shot(true).to_bytes())]);
        assert_eq!(b.reads_of(CONFIG), 2);
        assert_eq!(b.reads_of(0x00), 1);
        assert!(!sensor.configuration().one_shot());
    }

    #[test]
    fn one_shot_gives_up_after_poll_budget() {
        let settings = Settings {
            shutdown_mode: true,
            ..Settings::default()
        };
        let mut sensor = opened(&settings).with_one_shot_policy(OneShotPolicy {
            max_polls: 3,
            poll_interval: Duration::ZERO,
        });
        // Dispositivo nunca limpa o bit: a escrita do one-shot fica no registrador
        bus(&mut sensor).log.clear();

        assert_eq!(sensor.temperature(), Err(Error::ConversionTimeout { polls: 3 }));
        assert_eq!(bus(&mut sensor).reads_of(CONFIG), 3);
        assert_eq!(bus(&mut sensor).reads_of(0x00), 0);
    }

    #[test]
    fn commit_after_one_shot_timeout_does_not_restart_conversion() {
        let settings = Settings {
            shutdown_mode: true,
            ..Settings::default()
        };
        let mut sensor = opened(&settings).with_one_shot_policy(OneShotPolicy {
            max_polls: 2,
            poll_interval: Duration::ZERO,
        });
        assert!(sensor.temperature().is_err());
        assert!(!sensor.configuration().one_shot());
        bus(&mut sensor).log.clear();

        sensor.set_consecutive_faults(ConsecutiveFaults::Two).unwrap();
        let writes = bus(&mut sensor).writes();
        assert_eq!(writes.len(), 1);
        let written = ConfigurationRegister::from_bytes(writes[0].1);
        assert!(!written.one_shot());
        assert!(written.shutdown_mode());
        assert_eq!(written.consecutive_faults(), ConsecutiveFaults::Two);
    }

    #[test]
    fn unchanged_field_issues_no_write() {
        let mut sensor = opened(&Settings::default());
        bus(&mut sensor).log.clear();

        sensor.set_conversion_rate(ConversionRate::Hz4).unwrap();
        sensor.set_shutdown_mode(false).unwrap();
        sensor.set_thermostat_mode(ThermostatMode::Comparator).unwrap();
        sensor.set_alert_polarity(AlertPolarity::ActiveLow).unwrap();
        sensor.set_consecutive_faults(ConsecutiveFaults::One).unwrap();
        sensor.set_extended_mode(false).unwrap();

        assert!(bus(&mut sensor).log.is_empty());
    }

    #[test]
    fn changed_field_issues_single_masked_write() {
        let mut i2c = MockBus::new();
        i2c.registers[1] = [0x60, 0xA3];
        let mut sensor = Tmp102::new(i2c, AddressSelect::Gnd, 100);
        sensor.open(&Settings::default()).unwrap();
        bus(&mut sensor).log.clear();

        sensor.set_consecutive_faults(ConsecutiveFaults::Six).unwrap();
        let writes = bus(&mut sensor).writes();
        assert_eq!(writes.len(), 1);
        let written = ConfigurationRegister::from_bytes(writes[0].1);
        assert_eq!(written.consecutive_faults(), ConsecutiveFaults::Six);
        assert_eq!(written.bits() & 0x000F, 0x0003);
        assert_eq!(written.conversion_rate(), ConversionRate::Hz4);
    }

    #[test]
    fn extended_mode_is_rejected_without_bus_writes() {
        let mut sensor = opened(&Settings::default());
        bus(&mut sensor).log.clear();

        assert_eq!(
            sensor.set_extended_mode(true),
            Err(Error::Configuration(ConfigurationError::ExtendedModeUnsupported))
        );
        let raw = sensor.configuration().with_extended_mode(true);
        assert!(sensor.commit(raw).is_err());
        assert!(bus(&mut sensor).writes().is_empty());
        assert!(!sensor.extended_mode());
    }

    #[test]
    fn threshold_write_encodes_low_register() {
        let mut sensor = opened(&Settings::default());
        bus(&mut sensor).log.clear();
        sensor.set_temperature_low(75.0).unwrap();
        assert_eq!(bus(&mut sensor).writes(), vec![(0x02, [0x4B, 0x00])]);
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let mut sensor = opened(&Settings::default());
        bus(&mut sensor).log.clear();
        assert!(matches!(
            sensor.set_temperature_high(300.0),
            Err(Error::Configuration(ConfigurationError::TemperatureOutOfRange(_)))
        ));
        assert!(bus(&mut sensor).log.is_empty());
    }

    #[test]
    fn alert_flag_is_reloaded() {
        let mut sensor = opened(&Settings::default());
        let with_alert = sensor.configuration().bits() | (1 << 5);
        bus(&mut sensor).registers[1] = with_alert.to_be_bytes();
        assert!(sensor.alert_active().unwrap());
    }

    #[test]
    fn alert_pin_edges_reach_subscribers() {
        let mut sensor = Tmp102::new(MockBus::new(), AddressSelect::Gnd, 100);
        let sub = sensor.subscribe_alerts();
        let pin = PolledAlertPin::new(ScriptedPin::new([false, true]), Duration::ZERO);
        sensor.open_with_alert(&Settings::default(), pin).unwrap();

        assert_eq!(sub.recv_timeout(Duration::from_secs(2)), Some(AlertEvent));
        // Leitura de temperatura segue normalmente em paralelo
        assert!(sensor.temperature().is_ok());

        let _i2c = sensor.release();
        assert_eq!(sub.recv(), None);
    }
}
