//! Acesso ao hardware no Linux: I2C via `/dev/i2c-*` e pino ALERT via GPIO sysfs.

use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{I2cdev, SysfsPin};
use std::time::Duration;
use telemetry_core::config::SensorConfig;
use tmp102::{PolledAlertPin, Tmp102};
use tracing::{info, warn};

/// Intervalo entre tentativas de abrir o sensor.
const OPEN_RETRY: Duration = Duration::from_secs(2);

/// Amostragem do nível do pino ALERT.
const ALERT_POLL: Duration = Duration::from_millis(10);

pub type Sensor = Tmp102<I2cdev>;

/// Abre o sensor, tentando novamente até conseguir.
pub fn open_with_retry(cfg: &SensorConfig) -> Sensor {
    let mut attempt = 1u32;
    loop {
        match open_sensor(cfg) {
            Ok(sensor) => return sensor,
            Err(e) => {
                warn!("Tentativa {attempt}: sensor indisponível ({e}). Nova tentativa em {:?}", OPEN_RETRY);
                attempt += 1;
                std::thread::sleep(OPEN_RETRY);
            }
        }
    }
}

fn open_sensor(cfg: &SensorConfig) -> Result<Sensor, String> {
    let bus = I2cdev::new(&cfg.i2c_bus).map_err(|e| format!("{}: {e}", cfg.i2c_bus))?;
    let mut sensor = Tmp102::new(bus, cfg.address_select, cfg.clock_rate_khz)
        .with_one_shot_policy(cfg.one_shot_policy());
    let settings = cfg.settings();

    if cfg.alert_pin == 0 {
        sensor.open(&settings).map_err(|e| e.to_string())?;
    } else {
        let pin = alert_pin(cfg.alert_pin)?;
        sensor
            .open_with_alert(&settings, PolledAlertPin::new(pin, ALERT_POLL))
            .map_err(|e| e.to_string())?;
        info!("Pino ALERT monitorado no GPIO {}", cfg.alert_pin);
    }

    Ok(sensor)
}

fn alert_pin(number: u32) -> Result<SysfsPin, String> {
    let pin = SysfsPin::new(u64::from(number));
    pin.export().map_err(|e| format!("GPIO {number}: {e}"))?;
    pin.set_direction(Direction::In)
        .map_err(|e| format!("GPIO {number}: {e}"))?;
    Ok(pin)
}
