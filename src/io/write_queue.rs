//! Background persistence of settings writes.
//!
//! A single worker thread owns all slow persistence work (local flush,
//! remote load/save). Intents are handled strictly in submission order, so
//! the last write issued is also the last one written, whatever the network
//! latency of each call. Results come back through a channel and are applied
//! on the UI thread.

use crate::settings::UserSettings;
use crate::sync::SettingsSynchronizer;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// Monotonic id of a submitted intent.
pub type Sequence = u64;

/// Why a save was requested. Only explicit actions are reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOrigin {
    Update,
    Reset,
    /// Saves triggered by the application itself, such as theme mirroring.
    Background,
}

impl SaveOrigin {
    pub fn is_explicit(self) -> bool {
        !matches!(self, SaveOrigin::Background)
    }
}

#[derive(Debug, Clone)]
pub enum WriteIntent {
    /// Persist the full settings object locally, then remotely if signed in.
    Save {
        settings: UserSettings,
        origin: SaveOrigin,
    },
    /// Reconcile with the server copy.
    Sync,
}

#[derive(Debug, Clone)]
pub enum Completion {
    Saved {
        seq: Sequence,
        origin: SaveOrigin,
        /// The value now held in storage (the server echo when there is one).
        settings: UserSettings,
        local_persisted: bool,
    },
    Synced {
        seq: Sequence,
        settings: UserSettings,
        /// False when the local copy was returned instead.
        from_remote: bool,
    },
}

impl Completion {
    pub fn seq(&self) -> Sequence {
        match self {
            Completion::Saved { seq, .. } | Completion::Synced { seq, .. } => *seq,
        }
    }
}

enum Job {
    Intent(Sequence, WriteIntent),
    Barrier(Sender<()>),
}

/// Ordered queue of persistence intents served by one worker thread.
pub struct WriteQueue {
    sender: Sender<Job>,
    completions: Receiver<Completion>,
    repaint: Arc<Mutex<Option<egui::Context>>>,
    last_seq: Sequence,
}

impl WriteQueue {
    /// Starts the worker thread.
    pub fn spawn(synchronizer: SettingsSynchronizer) -> Self {
        let (sender, jobs) = channel::<Job>();
        let (done, completions) = channel();
        let repaint: Arc<Mutex<Option<egui::Context>>> = Arc::new(Mutex::new(None));

        let worker_repaint = Arc::clone(&repaint);

        thread::Builder::new()
            .name("settings-writer".to_string())
            .spawn(move || {
                for job in jobs {
                    match job {
                        Job::Intent(seq, intent) => {
                            log::debug!("Processing settings intent #{seq}");
                            let completion = run_intent(&synchronizer, seq, intent);
                            if done.send(completion).is_err() {
                                break;
                            }
                            if let Some(ctx) = worker_repaint
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .as_ref()
                            {
                                ctx.request_repaint();
                            }
                        }
                        Job::Barrier(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
                log::debug!("Settings writer stopped");
            })
            .map_err(|e| log::error!("Could not start the settings writer thread: {e}"))
            .ok();

        Self {
            sender,
            completions,
            repaint,
            last_seq: 0,
        }
    }

    /// Registers the context to repaint whenever a completion is ready.
    pub fn set_repaint_context(&self, ctx: &egui::Context) {
        *self.repaint.lock().unwrap_or_else(PoisonError::into_inner) = Some(ctx.clone());
    }

    /// Queues `intent` behind everything submitted before it.
    pub fn submit(&mut self, intent: WriteIntent) -> Sequence {
        self.last_seq += 1;
        let seq = self.last_seq;

        if self.sender.send(Job::Intent(seq, intent)).is_err() {
            log::error!("Settings writer is gone, dropping intent #{seq}");
        }
        seq
    }

    /// Sequence number of the most recently submitted intent.
    pub fn last_seq(&self) -> Sequence {
        self.last_seq
    }

    /// Returns the next available completion without blocking.
    pub fn try_completion(&self) -> Option<Completion> {
        self.completions.try_recv().ok()
    }

    /// Blocks until every intent submitted so far has been processed.
    pub fn wait_idle(&self) {
        let (ack, wait) = channel();
        if self.sender.send(Job::Barrier(ack)).is_ok() {
            let _ = wait.recv();
        }
    }

    /// Like `wait_idle`, giving up after `timeout`. Returns true if every
    /// intent submitted so far has been processed.
    pub fn wait_idle_for(&self, timeout: Duration) -> bool {
        let (ack, wait) = channel();
        if self.sender.send(Job::Barrier(ack)).is_err() {
            return true;
        }
        match wait.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => false,
        }
    }
}

fn run_intent(
    synchronizer: &SettingsSynchronizer,
    seq: Sequence,
    intent: WriteIntent,
) -> Completion {
    match intent {
        WriteIntent::Sync => match synchronizer.try_sync() {
            Ok(settings) => Completion::Synced {
                seq,
                settings,
                from_remote: true,
            },
            Err(e) => {
                log::warn!("Settings sync #{seq} failed, keeping local copy: {e}");
                Completion::Synced {
                    seq,
                    settings: synchronizer.local().load(),
                    from_remote: false,
                }
            }
        },
        WriteIntent::Save { settings, origin } => {
            let local = synchronizer.local();
            let local_persisted = local.save(&settings).is_ok();

            if !synchronizer.auth().is_authenticated() {
                return Completion::Saved {
                    seq,
                    origin,
                    settings,
                    local_persisted,
                };
            }

            match synchronizer.remote().save(&settings) {
                Ok(stored) => {
                    if stored != settings {
                        let _ = local.save(&stored);
                    }
                    Completion::Saved {
                        seq,
                        origin,
                        settings: stored,
                        local_persisted,
                    }
                }
                Err(e) => {
                    log::warn!("Remote settings save #{seq} failed: {e}");
                    Completion::Saved {
                        seq,
                        origin,
                        settings,
                        local_persisted,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionAuth;
    use crate::error::Result;
    use crate::io::{LocalSettingsAdapter, RemoteSettings};
    use crate::storage::{shared, MemoryStorage};
    use std::time::Duration;

    /// Remote whose first save is slow, so a reordering queue would let the
    /// second write land first.
    struct SlowFirstRemote {
        stored: Mutex<Vec<String>>,
    }

    impl RemoteSettings for SlowFirstRemote {
        fn load(&self) -> Result<UserSettings> {
            Ok(UserSettings::default())
        }

        fn save(&self, settings: &UserSettings) -> Result<UserSettings> {
            if settings.account.display_name == "first" {
                thread::sleep(Duration::from_millis(50));
            }
            self.stored.lock().unwrap().push(settings.account.display_name.clone());
            Ok(settings.clone())
        }
    }

    fn named(name: &str) -> UserSettings {
        let mut settings = UserSettings::default();
        settings.account.display_name = name.to_string();
        settings
    }

    #[test]
    fn test_intents_complete_in_submission_order() {
        let remote = Arc::new(SlowFirstRemote {
            stored: Mutex::new(Vec::new()),
        });
        let local = LocalSettingsAdapter::new(shared(MemoryStorage::new()));
        let auth = Arc::new(SessionAuth::with_token(Some("token".to_string())));
        let mut queue = WriteQueue::spawn(SettingsSynchronizer::new(local.clone(), remote.clone(), auth));

        for name in ["first", "second"] {
            queue.submit(WriteIntent::Save {
                settings: named(name),
                origin: SaveOrigin::Update,
            });
        }
        queue.wait_idle();

        assert_eq!(*remote.stored.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(local.load().account.display_name, "second");

        let seqs: Vec<_> = std::iter::from_fn(|| queue.try_completion()).map(|c| c.seq()).collect();
        assert_eq!(seqs, vec![1, 2]);
        assert_eq!(queue.last_seq(), 2);
    }

    #[test]
    fn test_signed_out_save_skips_remote() {
        let remote = Arc::new(SlowFirstRemote {
            stored: Mutex::new(Vec::new()),
        });
        let local = LocalSettingsAdapter::new(shared(MemoryStorage::new()));
        let mut queue = WriteQueue::spawn(SettingsSynchronizer::new(
            local,
            remote.clone(),
            Arc::new(SessionAuth::new()),
        ));

        queue.submit(WriteIntent::Save {
            settings: named("offline"),
            origin: SaveOrigin::Update,
        });
        queue.wait_idle();

        match queue.try_completion() {
            Some(Completion::Saved {
                local_persisted: true,
                ..
            }) => {}
            other => panic!("unexpected completion: {other:?}"),
        }
        assert!(remote.stored.lock().unwrap().is_empty());
    }

    /// Remote whose saves block until the test releases them.
    struct GatedRemote {
        gate: Mutex<Receiver<()>>,
    }

    impl RemoteSettings for GatedRemote {
        fn load(&self) -> Result<UserSettings> {
            Ok(UserSettings::default())
        }

        fn save(&self, settings: &UserSettings) -> Result<UserSettings> {
            let _ = self.gate.lock().unwrap().recv();
            Ok(settings.clone())
        }
    }

    #[test]
    fn test_wait_idle_for_gives_up_on_hung_remote() {
        let (release, gate) = channel();
        let local = LocalSettingsAdapter::new(shared(MemoryStorage::new()));
        let auth = Arc::new(SessionAuth::with_token(Some("token".to_string())));
        let remote = Arc::new(GatedRemote { gate: Mutex::new(gate) });
        let mut queue = WriteQueue::spawn(SettingsSynchronizer::new(local.clone(), remote, auth));

        queue.submit(WriteIntent::Save {
            settings: named("pending"),
            origin: SaveOrigin::Reset,
        });

        assert!(!queue.wait_idle_for(Duration::from_millis(50)));
        assert!(queue.try_completion().is_none());

        release.send(()).unwrap();
        assert!(queue.wait_idle_for(Duration::from_secs(5)));
        assert_eq!(queue.try_completion().map(|c| c.seq()), Some(1));
        assert_eq!(local.load().account.display_name, "pending");
    }
}
