// src/interface/command.rs
// Pollable handle to a command executing on a collaborator.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use futures::channel::oneshot;

/// Observed state of a command handle
#[derive(Debug, PartialEq)]
pub enum CommandStatus<T> {
    /// Still running
    Pending,
    /// Finished with a value; the handle is spent after this
    Ready(T),
    /// The collaborator dropped the command without resolving it
    Abandoned,
}

/// Receiving side of an asynchronous command.
///
/// Polling never blocks. The collaborator keeps the matching
/// [`CommandCompleter`] and resolves it from whatever thread or callback
/// finishes the work.
pub struct CommandHandle<T> {
    receiver: oneshot::Receiver<T>,
    spent: bool,
}

/// Resolving side of an asynchronous command
pub struct CommandCompleter<T> {
    sender: oneshot::Sender<T>,
}

impl<T> CommandHandle<T> {
    /// Creates a pending command and the completer that resolves it
    pub fn pending() -> (CommandCompleter<T>, CommandHandle<T>) {
        let (sender, receiver) = oneshot::channel();
        (
            CommandCompleter { sender },
            CommandHandle {
                receiver,
                spent: false,
            },
        )
    }

    /// Creates a command that has already finished
    pub fn resolved(value: T) -> CommandHandle<T> {
        let (completer, handle) = Self::pending();
        completer.complete(value);
        handle
    }

    /// Checks the command without blocking
    pub fn poll(&mut self) -> CommandStatus<T> {
        if self.spent {
            return CommandStatus::Abandoned;
        }
        match self.receiver.try_recv() {
            Ok(Some(value)) => {
                self.spent = true;
                CommandStatus::Ready(value)
            }
            Ok(None) => CommandStatus::Pending,
            Err(oneshot::Canceled) => {
                self.spent = true;
                CommandStatus::Abandoned
            }
        }
    }

    /// Polls every `period` until the command resolves or `timeout` elapses.
    /// Returns `Pending` on timeout; the handle stays usable.
    pub fn wait(&mut self, timeout: Duration, period: Duration) -> CommandStatus<T> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.poll() {
                CommandStatus::Pending => {}
                status => return status,
            }
            let now = Instant::now();
            if now >= deadline {
                return CommandStatus::Pending;
            }
            thread::sleep(period.min(deadline - now));
        }
    }
}

impl<T> CommandCompleter<T> {
    /// Resolves the command. Ignored if the handle was already dropped.
    pub fn complete(self, value: T) {
        let _ = self.sender.send(value);
    }

    /// Whether the owner of the handle has gone away
    pub fn is_canceled(&self) -> bool {
        self.sender.is_canceled()
    }
}

impl<T> fmt::Debug for CommandHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CommandHandle").field("spent", &self.spent).finish()
    }
}

impl<T> fmt::Debug for CommandCompleter<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CommandCompleter")
            .field("canceled", &self.is_canceled())
            .finish()
    }
}
