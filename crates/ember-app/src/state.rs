//! State shared between the driver and the dispatch loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use ember_core::commands::DispatchCommand;
use ember_core::error::Result as DispatchResult;
use ember_core::events::DispatchEvent;
use ember_core::state::{FleetReport, FleetSnapshot};

use crate::error::AppError;

/// Commands sent from the driver to the dispatch loop thread.
#[derive(Debug)]
pub enum LoopCommand {
    /// An operator command to forward to the dispatch engine.
    Dispatch(DispatchCommand),
    /// Run a final tick and stop the loop.
    Shutdown,
}

/// Driver-side handle on a running dispatch loop.
///
/// The loop thread owns the engine. Everything here is either a channel end
/// or a copy of state the loop publishes after each cycle.
pub struct LoopHandle {
    pub(crate) command_tx: mpsc::Sender<LoopCommand>,
    pub(crate) event_rx: mpsc::Receiver<DispatchEvent>,
    /// Report taken after the most recent tick. `None` until the first tick.
    pub(crate) latest_report: Arc<Mutex<Option<FleetReport>>>,
    pub(crate) thread: JoinHandle<DispatchResult<FleetSnapshot>>,
}

impl LoopHandle {
    pub fn send(&self, command: DispatchCommand) -> Result<(), AppError> {
        self.command_tx
            .send(LoopCommand::Dispatch(command))
            .map_err(|_| AppError::LoopClosed)
    }

    pub fn send_all(
        &self,
        commands: impl IntoIterator<Item = DispatchCommand>,
    ) -> Result<(), AppError> {
        commands.into_iter().try_for_each(|command| self.send(command))
    }

    /// Ask the loop to stop after one more tick. Idempotent.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(LoopCommand::Shutdown);
    }

    /// Events as the loop emits them. Ends once the loop thread exits.
    pub fn events(&self) -> mpsc::Iter<'_, DispatchEvent> {
        self.event_rx.iter()
    }

    pub fn latest_report(&self) -> Option<FleetReport> {
        match self.latest_report.lock() {
            Ok(lock) => lock.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Wait for the loop to exit and return its final snapshot.
    pub fn join(self) -> Result<FleetSnapshot, AppError> {
        match self.thread.join() {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => Err(AppError::LoopPanicked),
        }
    }
}
