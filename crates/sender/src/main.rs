//! # Telemetria Sender
//!
//! Lê a temperatura de um TMP102 via I2C e envia os registros via UDP
//! (broadcast ou unicast) através da fila de despacho assíncrona.
//! Requer acesso a `/dev/i2c-*` e ao GPIO sysfs (Linux).
//!
//! ## Uso
//! ```bash
//! telemetry_sender                  # Amostra indefinidamente
//! telemetry_sender --samples 10     # Encerra após 10 amostras
//! ```

#[cfg(target_os = "linux")]
mod hardware;
mod udp_sender;

use telemetry_core::config::{AppConfig, ClientConfig, FormatKind};
use telemetry_core::dispatch::DispatchQueue;
use telemetry_core::format::{ConnectTheDotsFormatter, EventFormatter, PropertiesFormatter};
use tracing::{error, info, warn};
use udp_sender::UdpEventSender;

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let sample_limit = sample_limit(std::env::args().skip(1));

    // ── Carregar config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("Config inválida: {e}");
        }
        std::process::exit(1);
    }

    // ── Transporte + fila ──
    let sender = match UdpEventSender::bind(&config.client) {
        Ok(sender) => sender,
        Err(e) => {
            error!("Falha ao criar socket UDP: {e}");
            std::process::exit(1);
        }
    };
    let dest_addr = sender.dest_addr().to_string();

    let queue = DispatchQueue::new(build_formatter(&config.client), Box::new(sender))
        .with_retry_policy(config.dispatch.retry_policy())
        .with_close_policy(config.dispatch.close_policy());
    if let Err(e) = queue.open() {
        error!("Falha ao abrir a fila de envio: {e}");
        std::process::exit(1);
    }

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   🌡 TELEMETRIA SENDER – TMP102 (Rust)");
    println!("══════════════════════════════════════════════");
    println!("  Sensor:    {} @ {:?}", config.sensor.i2c_bus, config.sensor.address_select);
    println!("  Destino:   {dest_addr}");
    println!("  Formato:   {:?}", config.client.format);
    println!("  Intervalo: {:.1}s", config.sensor.sample_interval_secs);
    println!("  Protocolo: bincode v{}", telemetry_core::PROTOCOL_VERSION);
    println!("══════════════════════════════════════════════");
    println!();

    run(&config, &queue, sample_limit);

    queue.close();
    let stats = queue.stats();
    info!(
        "Encerrado – enviados {} | reenvios {} | perdidos {} | descartados {}",
        stats.sent, stats.retries, stats.dropped, stats.discarded
    );
}

/// Formatador escolhido em `[client].format`.
fn build_formatter(cfg: &ClientConfig) -> Box<dyn EventFormatter> {
    match cfg.format {
        FormatKind::Properties => Box::new(PropertiesFormatter::new(cfg.device_id())),
        FormatKind::ConnectTheDots => Box::new(ConnectTheDotsFormatter::new(
            cfg.device_id(),
            cfg.device_name.clone(),
            cfg.organization.clone(),
            cfg.location.clone(),
        )),
    }
}

/// `--samples N` limita o número de ciclos.
fn sample_limit(mut args: impl Iterator<Item = String>) -> Option<u64> {
    while let Some(arg) = args.next() {
        if arg == "--samples" {
            match args.next().map(|n| n.parse::<u64>()) {
                Some(Ok(n)) => return Some(n),
                _ => warn!("--samples requer um número; ignorado"),
            }
        }
    }
    None
}

// ──────────────────────────────────────────────
// Loop de amostragem
// ──────────────────────────────────────────────

#[cfg(target_os = "linux")]
fn run(config: &AppConfig, queue: &DispatchQueue, sample_limit: Option<u64>) {
    use std::time::{Duration, Instant};
    use telemetry_core::dispatch::SendOutcome;
    use telemetry_core::types::{SampleBag, SensorType};

    let mut sensor = hardware::open_with_retry(&config.sensor);

    // Encerra sozinha quando o driver é liberado
    let alerts = sensor.subscribe_alerts();
    let alert_log = std::thread::Builder::new()
        .name("alert-log".into())
        .spawn(move || {
            while alerts.recv().is_some() {
                warn!("⚠ ALERTA do TMP102: temperatura fora dos limites configurados");
            }
        });
    if let Err(e) = &alert_log {
        warn!("Alertas não serão registrados: {e}");
    }

    let interval = Duration::from_secs_f64(config.sensor.sample_interval_secs);
    let mut taken = 0u64;

    while sample_limit.is_none_or(|limit| taken < limit) {
        let cycle_start = Instant::now();
        taken += 1;

        match sensor.temperature() {
            Ok(temp) => {
                let mut bag = SampleBag::new();
                bag.insert(SensorType::Temperature, temp);
                match queue.send_async(&bag) {
                    Ok(SendOutcome::Queued) => {
                        info!("{:.4}°C | na fila {}", temp, queue.pending());
                    }
                    Ok(outcome) => warn!("Amostra não enfileirada: {outcome:?}"),
                    Err(e) => error!("Erro ao formatar amostra: {e}"),
                }
            }
            Err(e) => error!("Erro ao ler temperatura: {e}"),
        }

        // Dormir pelo tempo restante do intervalo
        let elapsed = cycle_start.elapsed();
        if elapsed < interval {
            std::thread::sleep(interval - elapsed);
        }
    }

    drop(sensor.release());
    if let Ok(handle) = alert_log {
        let _ = handle.join();
    }
}

#[cfg(not(target_os = "linux"))]
fn run(_config: &AppConfig, _queue: &DispatchQueue, _sample_limit: Option<u64>) {
    error!("Acesso ao TMP102 (I2C/GPIO) disponível apenas no Linux");
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry_core::types::{SampleBag, SensorType};

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_sample_limit() {
        assert_eq!(sample_limit(args(&["--samples", "10"])), Some(10));
        assert_eq!(sample_limit(args(&[])), None);
        assert_eq!(sample_limit(args(&["--samples", "x"])), None);
    }

    #[test]
    fn formatter_follows_config() {
        let bag: SampleBag = [(SensorType::Temperature, 21.0_f32)].into_iter().collect();
        let mut cfg = ClientConfig {
            device_id: "dev-7".into(),
            ..ClientConfig::default()
        };

        let record = build_formatter(&cfg).format(&bag).unwrap();
        assert!(!record.body().is_empty());
        assert_eq!(record.partition_key(), Some("dev-7"));

        cfg.format = FormatKind::Properties;
        let record = build_formatter(&cfg).format(&bag).unwrap();
        assert!(record.body().is_empty());
        assert!(record.property("temp").is_some());
    }
}
