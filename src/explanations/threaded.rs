use std::sync::mpsc;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::JoinHandle;

use crate::basic_types::Cause;
use crate::basic_types::EventKind;
use crate::basic_types::PropagatorId;
use crate::basic_types::VariableId;
use crate::explanations::event_store::NO_VALUE;
use crate::explanations::DomainEventObserver;
use crate::explanations::EventStore;

enum Command {
    Record {
        variable: VariableId,
        cause: Cause,
        kind: EventKind,
        first: i32,
        second: i32,
        third: i32,
    },
    Clear,
    Flush(mpsc::SyncSender<()>),
    Shutdown,
}

/// An event recorder that moves log maintenance off the propagation thread.
///
/// Notifications are messages on a channel drained by a background worker
/// into the shared [`EventStore`]; the propagation hot path only pays for a
/// send. Every read goes through [`ThreadedEventRecorder::with_events`],
/// which first waits for the queue to drain ([`ThreadedEventRecorder::flush`])
/// so that a pushed event is observed by any later read.
///
/// The worker starts lazily with the first recorded event and is joined by
/// [`ThreadedEventRecorder::close`] (also called on drop). Only event
/// ingestion is offloaded: explanation scans and refutation bookkeeping stay
/// on the search thread.
#[derive(Debug)]
pub struct ThreadedEventRecorder {
    store: Arc<Mutex<EventStore>>,
    sender: Option<mpsc::Sender<Command>>,
    worker: Option<JoinHandle<()>>,
}

impl Default for ThreadedEventRecorder {
    fn default() -> Self {
        ThreadedEventRecorder::new()
    }
}

impl ThreadedEventRecorder {
    pub fn new() -> ThreadedEventRecorder {
        ThreadedEventRecorder {
            store: Arc::new(Mutex::new(EventStore::default())),
            sender: None,
            worker: None,
        }
    }

    fn sender(&mut self) -> &mpsc::Sender<Command> {
        if self.sender.is_none() {
            let (sender, receiver) = mpsc::channel();
            let store = Arc::clone(&self.store);
            let worker = thread::spawn(move || {
                while let Ok(command) = receiver.recv() {
                    match command {
                        Command::Record {
                            variable,
                            cause,
                            kind,
                            first,
                            second,
                            third,
                        } => {
                            let _ = store
                                .lock()
                                .expect("event store mutex poisoned")
                                .push_event(variable, cause, kind, first, second, third);
                        }
                        Command::Clear => {
                            store.lock().expect("event store mutex poisoned").clear();
                        }
                        Command::Flush(ack) => {
                            // The sender blocks on the acknowledgement, which
                            // orders every earlier message before the read
                            // that follows.
                            let _ = ack.send(());
                        }
                        Command::Shutdown => break,
                    }
                }
            });
            self.sender = Some(sender);
            self.worker = Some(worker);
        }

        self.sender.as_ref().expect("just installed")
    }

    fn send(&mut self, command: Command) {
        self.sender()
            .send(command)
            .expect("event recorder worker disconnected");
    }

    /// Record a raw event. The observer implementation below maps the
    /// notification surface onto this.
    #[allow(clippy::too_many_arguments, reason = "mirrors the event slot layout")]
    pub fn record(
        &mut self,
        variable: VariableId,
        cause: Cause,
        kind: EventKind,
        first: i32,
        second: i32,
        third: i32,
    ) {
        self.send(Command::Record {
            variable,
            cause,
            kind,
            first,
            second,
            third,
        });
    }

    /// Wait until every queued command has been applied to the store.
    pub fn flush(&mut self) {
        if self.sender.is_none() {
            return;
        }
        let (ack_sender, ack_receiver) = mpsc::sync_channel(0);
        self.send(Command::Flush(ack_sender));
        ack_receiver
            .recv()
            .expect("event recorder worker disconnected");
    }

    /// Queue a clear of the log (restart boundary).
    pub fn clear(&mut self) {
        if self.sender.is_some() {
            self.send(Command::Clear);
        } else {
            self.store
                .lock()
                .expect("event store mutex poisoned")
                .clear();
        }
    }

    /// Drain the queue, then read the store.
    pub fn with_events<R>(&mut self, read: impl FnOnce(&EventStore) -> R) -> R {
        self.flush();
        let store = self.store.lock().expect("event store mutex poisoned");
        read(&store)
    }

    pub fn len(&mut self) -> usize {
        self.with_events(EventStore::len)
    }

    pub fn is_empty(&mut self) -> bool {
        self.with_events(EventStore::is_empty)
    }

    /// Stop and join the worker. Safe to call more than once; recording
    /// after closing restarts the worker.
    pub fn close(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Command::Shutdown);
        }
        if let Some(worker) = self.worker.take() {
            worker.join().expect("event recorder worker panicked");
        }
    }
}

impl Drop for ThreadedEventRecorder {
    fn drop(&mut self) {
        self.close();
    }
}

impl DomainEventObserver for ThreadedEventRecorder {
    fn on_remove_value(&mut self, variable: VariableId, value: i32, cause: Cause) {
        self.record(variable, cause, EventKind::Removal, value, NO_VALUE, NO_VALUE);
    }

    fn on_update_lower_bound(
        &mut self,
        variable: VariableId,
        new_lower_bound: i32,
        old_lower_bound: i32,
        cause: Cause,
    ) {
        self.record(
            variable,
            cause,
            EventKind::LowerBound,
            new_lower_bound,
            old_lower_bound,
            NO_VALUE,
        );
    }

    fn on_update_upper_bound(
        &mut self,
        variable: VariableId,
        new_upper_bound: i32,
        old_upper_bound: i32,
        cause: Cause,
    ) {
        self.record(
            variable,
            cause,
            EventKind::UpperBound,
            new_upper_bound,
            old_upper_bound,
            NO_VALUE,
        );
    }

    fn on_instantiate(
        &mut self,
        variable: VariableId,
        value: i32,
        old_lower_bound: i32,
        old_upper_bound: i32,
        cause: Cause,
    ) {
        self.record(
            variable,
            cause,
            EventKind::Assign,
            value,
            old_lower_bound,
            old_upper_bound,
        );
    }

    fn on_propagator_activated(&mut self, variable: VariableId, propagator: PropagatorId) {
        self.record(
            variable,
            Cause::Propagator(propagator),
            EventKind::Activation,
            propagator.0 as i32,
            NO_VALUE,
            NO_VALUE,
        );
    }
}
