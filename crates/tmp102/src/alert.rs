//! Notificação de alerta via pino ALERT (borda de subida).
//!
//! Uma thread dedicada observa o pino e publica [`AlertEvent`] para cada
//! [`AlertSubscription`] viva. Dropar a subscription cancela a inscrição.

use crossbeam_channel::{Receiver, Sender, unbounded};
use embedded_hal::digital::InputPin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Janela máxima de espera por borda antes de checar o pedido de parada.
const WATCH_SLICE: Duration = Duration::from_millis(50);

/// Alerta disparado pelo sensor. Não carrega dados.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertEvent;

/// Entrada capaz de detectar a borda de subida do pino ALERT.
pub trait AlertInput: Send + 'static {
    type Error: core::fmt::Debug;

    /// Bloqueia até uma borda de subida ou até `timeout`.
    /// Retorna `true` se a borda ocorreu.
    fn wait_for_rising_edge(&mut self, timeout: Duration) -> Result<bool, Self::Error>;
}

/// Detecta bordas amostrando o nível de um [`InputPin`].
pub struct PolledAlertPin<P> {
    pin: P,
    poll_interval: Duration,
    last_high: Option<bool>,
}

impl<P: InputPin> PolledAlertPin<P> {
    pub fn new(pin: P, poll_interval: Duration) -> Self {
        Self {
            pin,
            poll_interval,
            last_high: None,
        }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P> AlertInput for PolledAlertPin<P>
where
    P: InputPin + Send + 'static,
{
    type Error = P::Error;

    fn wait_for_rising_edge(&mut self, timeout: Duration) -> Result<bool, Self::Error> {
        let deadline = Instant::now() + timeout;
        loop {
            let high = self.pin.is_high()?;
            // A primeira amostra só define a referência
            let rising = self.last_high == Some(false) && high;
            self.last_high = Some(high);
            if rising {
                return Ok(true);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            std::thread::sleep(self.poll_interval.min(deadline - now));
        }
    }
}

/// Inscrição nos alertas de um driver.
#[derive(Debug)]
pub struct AlertSubscription {
    rx: Receiver<AlertEvent>,
}

impl AlertSubscription {
    /// Bloqueia até o próximo alerta. `None` quando o driver foi liberado.
    pub fn recv(&self) -> Option<AlertEvent> {
        self.rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<AlertEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    pub fn try_recv(&self) -> Option<AlertEvent> {
        self.rx.try_recv().ok()
    }

    /// Receiver bruto, para uso em `crossbeam_channel::select!`.
    pub fn receiver(&self) -> &Receiver<AlertEvent> {
        &self.rx
    }
}

/// Lista de inscritos compartilhada entre o driver e a thread do pino.
#[derive(Clone, Default)]
pub(crate) struct AlertNotifier {
    subscribers: Arc<Mutex<Vec<Sender<AlertEvent>>>>,
}

impl AlertNotifier {
    pub(crate) fn subscribe(&self) -> AlertSubscription {
        let (tx, rx) = unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        AlertSubscription { rx }
    }

    /// Publica um alerta e descarta inscrições mortas. Retorna quantos
    /// inscritos receberam.
    pub(crate) fn notify(&self) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(AlertEvent).is_ok());
        subscribers.len()
    }
}

/// Thread que observa o pino ALERT.
pub(crate) struct AlertWatcher {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl AlertWatcher {
    pub(crate) fn spawn<A: AlertInput>(mut pin: A, notifier: AlertNotifier) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = std::thread::Builder::new()
            .name("tmp102-alert".into())
            .spawn(move || {
                while !flag.load(Ordering::Acquire) {
                    match pin.wait_for_rising_edge(WATCH_SLICE) {
                        Ok(true) => {
                            let delivered = notifier.notify();
                            debug!("Alerta TMP102 → {delivered} inscritos");
                        }
                        Ok(false) => {}
                        Err(e) => {
                            warn!("Erro ao ler pino de alerta: {e:?}");
                            std::thread::sleep(WATCH_SLICE);
                        }
                    }
                }
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub(crate) fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Thread do pino de alerta terminou com panic");
            }
        }
    }
}

impl Drop for AlertWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
