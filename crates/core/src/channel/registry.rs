//! Reference-counted registry of shared push channels.
//!
//! At most one [`SharedChannel`] exists per process instance id. Every
//! subscription holds a [`ChannelLease`]; the channel is created by the
//! first acquire and torn down when the last lease is dropped.

use super::supervisor::{ReconnectPolicy, SharedChannel};
use super::transport::PushTransport;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

struct RegistryEntry {
    channel: Arc<SharedChannel>,
    ref_count: usize,
}

type Entries = Arc<Mutex<HashMap<String, RegistryEntry>>>;

/// Hands out shared push channels keyed by process instance id.
///
/// Cloning the registry yields another handle to the same set of channels.
#[derive(Clone)]
pub struct ChannelRegistry {
    entries: Entries,
    transport: Arc<dyn PushTransport>,
    policy: ReconnectPolicy,
}

impl ChannelRegistry {
    pub fn new(transport: Arc<dyn PushTransport>, policy: ReconnectPolicy) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            transport,
            policy,
        }
    }

    /// Obtain the channel for `process_instance_id`, opening it if this is
    /// the first holder.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn acquire(&self, process_instance_id: &str) -> ChannelLease {
        let mut entries = lock(&self.entries);

        let entry = entries
            .entry(process_instance_id.to_string())
            .or_insert_with(|| {
                debug!(%process_instance_id, "opening shared push channel");
                RegistryEntry {
                    channel: Arc::new(SharedChannel::spawn(
                        process_instance_id,
                        Arc::clone(&self.transport),
                        self.policy,
                    )),
                    ref_count: 0,
                }
            });
        entry.ref_count += 1;

        ChannelLease {
            process_instance_id: process_instance_id.to_string(),
            channel: Arc::clone(&entry.channel),
            entries: Arc::clone(&self.entries),
        }
    }

    /// Number of channels currently open.
    pub fn active_channels(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Number of live leases on the channel for `process_instance_id`.
    pub fn ref_count(&self, process_instance_id: &str) -> usize {
        lock(&self.entries)
            .get(process_instance_id)
            .map_or(0, |entry| entry.ref_count)
    }
}

/// A held reference to a shared channel. Dropping it releases the reference.
pub struct ChannelLease {
    process_instance_id: String,
    channel: Arc<SharedChannel>,
    entries: Entries,
}

impl ChannelLease {
    pub fn channel(&self) -> &SharedChannel {
        &self.channel
    }

    pub fn process_instance_id(&self) -> &str {
        &self.process_instance_id
    }
}

impl Drop for ChannelLease {
    fn drop(&mut self) {
        let removed = {
            let mut entries = lock(&self.entries);
            let last = match entries.get_mut(&self.process_instance_id) {
                Some(entry) if entry.ref_count > 1 => {
                    entry.ref_count -= 1;
                    false
                }
                Some(_) => true,
                None => false,
            };
            if last {
                entries.remove(&self.process_instance_id)
            } else {
                None
            }
        };

        // Shut down outside the lock; other holders may still keep an Arc.
        if let Some(entry) = removed {
            debug!(
                process_instance_id = %self.process_instance_id,
                "last subscriber left; closing shared push channel"
            );
            entry.channel.shutdown();
        }
    }
}

fn lock(entries: &Entries) -> MutexGuard<'_, HashMap<String, RegistryEntry>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}
