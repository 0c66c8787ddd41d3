//! # Engine Runtime
//!
//! Runs a [`SessionEngine`] inside one tokio task. Hosts that want to share
//! the engine across tasks talk to it through a cloneable [`EngineHandle`];
//! transport events, media events and host requests all travel on the same
//! queue, which keeps them strictly ordered.
//!
//! ```rust
//! use std::sync::Arc;
//! use rdispatch_session_core::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> rdispatch_session_core::Result<()> {
//! let engine = SessionEngine::new(
//!     SessionConfig::new("1001", "Dispatcher"),
//!     Arc::new(MemoryTransport::new()),
//!     Arc::new(NoopMedia),
//! )?;
//! let (handle, task) = EngineRuntime::spawn(engine, 64);
//!
//! let key = handle.create(CallRequest::new(CallType::Voice, "2002", "Unit 2")).await?;
//! assert!(handle.session(key).await?.is_some());
//!
//! handle.shutdown().await;
//! task.await.unwrap();
//! # Ok(())
//! # }
//! ```

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::adapters::{MediaEvent, TransportEvent};
use crate::api::{CallRequest, SessionEngine};
use crate::errors::{Result, SessionError};
use crate::session::CallSession;
use crate::types::{CallStatistics, SessionKey};

type Job = Box<dyn FnOnce(&mut SessionEngine) + Send>;

enum Command {
    Transport(TransportEvent),
    Media { key: SessionKey, event: MediaEvent },
    Run(Job),
    Shutdown,
}

/// Spawns engine tasks
pub struct EngineRuntime;

impl EngineRuntime {
    /// Move `engine` into a new task. The task ends on
    /// [`EngineHandle::shutdown`] or when every handle is dropped.
    pub fn spawn(engine: SessionEngine, capacity: usize) -> (EngineHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(run(engine, rx));
        (EngineHandle { tx }, task)
    }

    /// [`spawn`](Self::spawn) with the engine's configured channel capacity.
    pub fn start(engine: SessionEngine) -> (EngineHandle, JoinHandle<()>) {
        let capacity = engine.config().channel_capacity;
        Self::spawn(engine, capacity)
    }
}

async fn run(mut engine: SessionEngine, mut rx: mpsc::Receiver<Command>) {
    info!(user_id = %engine.config().user_id, "engine runtime started");
    while let Some(command) = rx.recv().await {
        match command {
            Command::Transport(event) => engine.handle_transport_event(event),
            Command::Media { key, event } => engine.handle_media_event(&key, event),
            Command::Run(job) => job(&mut engine),
            Command::Shutdown => {
                debug!("engine runtime shutting down");
                break;
            }
        }
    }
    info!(sessions = engine.sessions().len(), "engine runtime stopped");
}

/// Cloneable access to an engine running in an [`EngineRuntime`]
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Command>,
}

impl EngineHandle {
    async fn submit(&self, command: Command) -> Result<()> {
        self.tx.send(command).await.map_err(|_| SessionError::RuntimeClosed)
    }

    /// Feed a signaling transport event.
    pub async fn transport_event(&self, event: TransportEvent) -> Result<()> {
        self.submit(Command::Transport(event)).await
    }

    /// Feed a media layer event.
    pub async fn media_event(&self, key: SessionKey, event: MediaEvent) -> Result<()> {
        self.submit(Command::Media { key, event }).await
    }

    /// Run `f` against the engine on its task and return its result.
    pub async fn execute<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut SessionEngine) -> R + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |engine| {
            let _ = reply_tx.send(f(engine));
        });
        self.submit(Command::Run(job)).await?;
        reply_rx.await.map_err(|_| SessionError::RuntimeClosed)
    }

    pub async fn create(&self, request: CallRequest) -> Result<SessionKey> {
        self.execute(move |engine| engine.create(request)).await?
    }

    pub async fn accept_call(&self, key: SessionKey) -> Result<()> {
        self.execute(move |engine| engine.accept_call(&key)).await?
    }

    pub async fn reject_call(&self, key: SessionKey) -> Result<()> {
        self.execute(move |engine| engine.reject_call(&key)).await?
    }

    pub async fn leave_call(&self, key: SessionKey) -> Result<()> {
        self.execute(move |engine| engine.leave_call(&key)).await?
    }

    pub async fn destroy_call(&self, key: SessionKey) -> Result<()> {
        self.execute(move |engine| engine.destroy_call(&key)).await?
    }

    pub async fn grab_speak(&self, key: SessionKey) -> Result<()> {
        self.execute(move |engine| engine.grab_speak(&key)).await?
    }

    pub async fn free_speak(&self, key: SessionKey) -> Result<()> {
        self.execute(move |engine| engine.free_speak(&key)).await?
    }

    pub async fn session(&self, key: SessionKey) -> Result<Option<CallSession>> {
        self.execute(move |engine| engine.session(&key)).await
    }

    pub async fn sessions(&self) -> Result<Vec<CallSession>> {
        self.execute(|engine| engine.sessions()).await
    }

    pub async fn statistics(&self) -> Result<CallStatistics> {
        self.execute(|engine| engine.statistics()).await
    }

    /// Stop the engine task. Commands already queued are processed first.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown).await;
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MemoryTransport, NoopMedia};
    use crate::config::SessionConfig;
    use crate::types::CallType;
    use std::sync::Arc;

    fn engine(transport: &MemoryTransport) -> SessionEngine {
        SessionEngine::new(
            SessionConfig::new("1001", "Dispatcher"),
            Arc::new(transport.clone()),
            Arc::new(NoopMedia),
        )
        .unwrap()
    }

    #[test]
    fn test_queued_commands_run_before_shutdown() {
        let transport = MemoryTransport::new();
        tokio_test::block_on(async {
            let (handle, task) = EngineRuntime::spawn(engine(&transport), 4);
            let create = handle.create(CallRequest::new(CallType::Voice, "2002", "Unit 2"));
            let key = create.await.unwrap();
            handle.shutdown().await;
            task.await.unwrap();
            assert_eq!(key.as_str(), "1001@2002");
        });
        assert_eq!(transport.frames().len(), 1);
    }

    #[test]
    fn test_closed_runtime_rejects_requests() {
        let transport = MemoryTransport::new();
        tokio_test::block_on(async {
            let (handle, task) = EngineRuntime::start(engine(&transport));
            handle.shutdown().await;
            task.await.unwrap();
            let result = handle.destroy_call(SessionKey::new("R1")).await;
            assert!(matches!(result, Err(SessionError::RuntimeClosed)));
        });
    }
}
