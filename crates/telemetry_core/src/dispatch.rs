//! Fila de despacho assíncrono de telemetria.
//!
//! Desacopla a cadência de amostragem da latência de rede: `send_async`
//! formata o bag na thread do chamador e enfileira o registro; uma única
//! thread de envio consome a fila em ordem FIFO e chama o [`EventSender`].
//!
//! Ciclo de vida: `Created → Open → Closed`. Um cliente fechado é terminal.
//!
//! A fila não tem limite: um [`EventSender`] lento faz a memória crescer
//! enquanto a amostragem continuar. Limite a taxa de amostragem no chamador.

use crate::format::{EventFormatter, FormatError};
use crate::types::{SampleBag, TelemetryRecord};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, select, unbounded};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Falha de uma transmissão.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Erro de transporte: {0}")]
    Transport(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Transporte que efetivamente envia um registro.
pub trait EventSender: Send + 'static {
    fn send(&mut self, record: &TelemetryRecord) -> Result<(), SendError>;

    /// Libera o transporte. Chamado uma única vez, no fechamento.
    fn close(&mut self) {}
}

/// Erros do ciclo de vida da fila.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Cliente já foi fechado e não pode ser reaberto")]
    Terminated,

    #[error("Falha ao iniciar thread de envio: {0}")]
    Spawn(#[source] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Resultado de `send_async`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Registro formatado e enfileirado
    Queued,
    /// Bag vazio, nada a fazer
    EmptyBag,
    /// Cliente não está aberto; registro descartado
    NotOpen,
}

/// Política de reenvio após falha de transmissão.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Tentativas extras após a primeira falha
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Espera antes da tentativa `attempt` (1 = primeiro reenvio).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// O que acontece com registros pendentes no `close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosePolicy {
    /// Entrega o que foi enfileirado antes do close, até `timeout`
    Drain { timeout: Duration },
    /// Cancela imediatamente; só o envio em andamento termina
    Discard,
}

impl Default for ClosePolicy {
    fn default() -> Self {
        ClosePolicy::Drain {
            timeout: Duration::from_secs(5),
        }
    }
}

/// Contadores da fila.
#[derive(Debug, Default)]
struct Counters {
    sent: AtomicU64,
    retries: AtomicU64,
    dropped: AtomicU64,
    discarded: AtomicU64,
}

/// Snapshot dos contadores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Registros entregues ao transporte
    pub sent: u64,
    /// Reenvios após falha
    pub retries: u64,
    /// Registros abandonados após esgotar os reenvios
    pub dropped: u64,
    /// Registros pendentes descartados no close
    pub discarded: u64,
}

/// Thread de envio em execução.
struct Worker {
    records: Sender<TelemetryRecord>,
    /// Cópia do receptor para contar o que ficou na fila se a thread travar
    backlog: Receiver<TelemetryRecord>,
    cancel: Sender<()>,
    done: Receiver<()>,
    handle: JoinHandle<()>,
}

enum Lifecycle {
    Created(Box<dyn EventSender>),
    Open(Worker),
    Closed,
}

/// Cliente de telemetria com fila FIFO e uma thread de envio.
pub struct DispatchQueue {
    formatter: Box<dyn EventFormatter>,
    retry: RetryPolicy,
    close_policy: ClosePolicy,
    state: Mutex<Lifecycle>,
    counters: Arc<Counters>,
}

impl DispatchQueue {
    pub fn new(formatter: Box<dyn EventFormatter>, sender: Box<dyn EventSender>) -> Self {
        Self {
            formatter,
            retry: RetryPolicy::default(),
            close_policy: ClosePolicy::default(),
            state: Mutex::new(Lifecycle::Created(sender)),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_close_policy(mut self, policy: ClosePolicy) -> Self {
        self.close_policy = policy;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inicia a thread de envio. Abrir duas vezes não tem efeito.
    pub fn open(&self) -> Result<(), DispatchError> {
        self.open_with(|builder, work| builder.spawn(work))
    }

    fn open_with<S>(&self, spawn: S) -> Result<(), DispatchError>
    where
        S: FnOnce(std::thread::Builder, Box<dyn FnOnce() + Send>) -> std::io::Result<JoinHandle<()>>,
    {
        let mut state = self.lock();
        let sender = match std::mem::replace(&mut *state, Lifecycle::Closed) {
            Lifecycle::Created(sender) => sender,
            Lifecycle::Open(worker) => {
                *state = Lifecycle::Open(worker);
                debug!("Fila de telemetria já aberta");
                return Ok(());
            }
            Lifecycle::Closed => return Err(DispatchError::Terminated),
        };

        let (records_tx, records_rx) = unbounded::<TelemetryRecord>();
        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(0);
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(0);
        let retry = self.retry;
        let counters = Arc::clone(&self.counters);
        let backlog = records_rx.clone();

        // O transporte só chega à thread se o spawn der certo
        let (handoff_tx, handoff_rx) = crossbeam_channel::bounded::<Box<dyn EventSender>>(1);
        let _ = handoff_tx.send(sender);
        let worker_handoff = handoff_rx.clone();

        let builder = std::thread::Builder::new().name("telemetry-dispatch".into());
        let spawned = spawn(
            builder,
            Box::new(move || {
                if let Ok(sender) = worker_handoff.try_recv() {
                    sender_loop(sender, &records_rx, &cancel_rx, retry, &counters);
                }
                drop(done_tx);
            }),
        );

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                if let Ok(mut sender) = handoff_rx.try_recv() {
                    sender.close();
                }
                warn!("Falha ao iniciar thread de envio: {e}");
                return Err(DispatchError::Spawn(e));
            }
        };

        *state = Lifecycle::Open(Worker {
            records: records_tx,
            backlog,
            cancel: cancel_tx,
            done: done_rx,
            handle,
        });
        info!("Fila de telemetria aberta (retries: {})", self.retry.max_retries);
        Ok(())
    }

    /// Formata o bag e enfileira o registro sem bloquear no envio.
    pub fn send_async(&self, bag: &SampleBag) -> Result<SendOutcome, DispatchError> {
        if bag.is_empty() {
            return Ok(SendOutcome::EmptyBag);
        }
        if !self.is_open() {
            debug!("send_async com cliente fechado, ignorando");
            return Ok(SendOutcome::NotOpen);
        }

        let record = self.formatter.format(bag)?;
        Ok(self.enqueue(record))
    }

    fn enqueue(&self, record: TelemetryRecord) -> SendOutcome {
        let state = self.lock();
        match &*state {
            Lifecycle::Open(worker) => match worker.records.send(record) {
                Ok(()) => SendOutcome::Queued,
                Err(_) => SendOutcome::NotOpen,
            },
            _ => SendOutcome::NotOpen,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(*self.lock(), Lifecycle::Open(_))
    }

    /// Registros aguardando envio.
    pub fn pending(&self) -> usize {
        match &*self.lock() {
            Lifecycle::Open(worker) => worker.records.len(),
            _ => 0,
        }
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            sent: self.counters.sent.load(Ordering::Relaxed),
            retries: self.counters.retries.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
        }
    }

    /// Fecha o cliente e libera o transporte. Fechar duas vezes não tem efeito.
    pub fn close(&self) {
        let worker = {
            let mut state = self.lock();
            match std::mem::replace(&mut *state, Lifecycle::Closed) {
                Lifecycle::Open(worker) => worker,
                Lifecycle::Created(mut sender) => {
                    sender.close();
                    info!("Fila de telemetria fechada sem ter sido aberta");
                    return;
                }
                Lifecycle::Closed => return,
            }
        };

        let Worker {
            records,
            backlog,
            cancel,
            done,
            handle,
        } = worker;

        // Sem producers a thread esvazia a fila e encerra
        drop(records);

        let finished = match self.close_policy {
            ClosePolicy::Drain { timeout } => match done.recv_timeout(timeout) {
                Err(RecvTimeoutError::Disconnected) => true,
                _ => {
                    warn!("Fila não esvaziou em {timeout:?}, cancelando envio");
                    false
                }
            },
            ClosePolicy::Discard => false,
        };

        if !finished {
            drop(cancel);
            if !matches!(
                done.recv_timeout(Duration::from_secs(1)),
                Err(RecvTimeoutError::Disconnected)
            ) {
                let stranded = backlog.try_iter().count() as u64;
                self.counters.discarded.fetch_add(stranded, Ordering::Relaxed);
                warn!(
                    "Thread de envio bloqueada no transporte; seguindo sem aguardar \
                     ({stranded} registros descartados)"
                );
                return;
            }
        }

        if handle.join().is_err() {
            warn!("Thread de envio terminou com panic");
        }

        let stats = self.stats();
        info!(
            "Fila de telemetria fechada – enviados {} | descartados {} | perdidos {}",
            stats.sent, stats.discarded, stats.dropped
        );
    }
}

impl Drop for DispatchQueue {
    fn drop(&mut self) {
        self.close();
    }
}

// ──────────────────────────────────────────────
// Thread de envio
// ──────────────────────────────────────────────

fn sender_loop(
    mut sender: Box<dyn EventSender>,
    records: &Receiver<TelemetryRecord>,
    cancel: &Receiver<()>,
    retry: RetryPolicy,
    counters: &Counters,
) {
    let mut discarded = 0u64;
    loop {
        let record = select! {
            recv(cancel) -> _ => break,
            recv(records) -> msg => match msg {
                Ok(record) => record,
                Err(_) => break,
            },
        };
        // Com ambos prontos o select escolhe ao acaso; o cancelamento vence
        if is_cancelled(cancel) {
            discarded += 1;
            break;
        }
        deliver(sender.as_mut(), &record, cancel, retry, counters);
    }

    discarded += records.try_iter().count() as u64;
    if discarded > 0 {
        counters.discarded.fetch_add(discarded, Ordering::Relaxed);
        warn!("{discarded} registros pendentes descartados no fechamento");
    }

    sender.close();
}

fn is_cancelled(cancel: &Receiver<()>) -> bool {
    matches!(cancel.try_recv(), Err(TryRecvError::Disconnected))
}

/// Envia um registro com reenvio e backoff. O backoff é interrompido pelo
/// cancelamento.
fn deliver(
    sender: &mut dyn EventSender,
    record: &TelemetryRecord,
    cancel: &Receiver<()>,
    retry: RetryPolicy,
    counters: &Counters,
) {
    let mut attempt = 0;
    loop {
        match sender.send(record) {
            Ok(()) => {
                counters.sent.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "→ registro enviado ({} bytes, chave {:?})",
                    record.body().len(),
                    record.partition_key()
                );
                return;
            }
            Err(e) if attempt < retry.max_retries => {
                attempt += 1;
                let wait = retry.backoff(attempt);
                warn!("Falha ao enviar registro: {e}. Tentativa {attempt} em {wait:?}");
                if let Err(RecvTimeoutError::Disconnected) = cancel.recv_timeout(wait) {
                    counters.discarded.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                counters.retries.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Registro descartado após {} tentativas: {e}", attempt + 1);
                return;
            }
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
