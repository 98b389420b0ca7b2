use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::schedule::{Day, SlotEdit};

/// Address of one slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub day: Day,
    pub room: String,
    pub index: usize,
}

/// Idempotent "set these fields of slot (day, room, index)" command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotCommand {
    pub key: SlotKey,
    pub edit: SlotEdit,
}

/// Coalesces rapid edits per slot and releases them once the slot has been idle for `delay`
#[derive(Debug)]
pub struct CommandQueue {
    delay: Duration,
    pending: HashMap<SlotKey, (SlotEdit, Instant)>,
}

impl CommandQueue {
    pub fn new(delay: Duration) -> Self {
        CommandQueue {
            delay,
            pending: HashMap::new(),
        }
    }

    /// Merges into the pending edit for the same slot and pushes its deadline back
    pub fn push(&mut self, command: SlotCommand, now: Instant) {
        let deadline = now + self.delay;
        match self.pending.get_mut(&command.key) {
            Some((edit, due)) => {
                edit.merge(command.edit);
                *due = deadline;
            }
            None => {
                self.pending.insert(command.key, (command.edit, deadline));
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|(_, due)| *due).min()
    }

    /// Removes and returns the commands due at `now`, earliest first
    pub fn drain_ready(&mut self, now: Instant) -> Vec<SlotCommand> {
        let ready: Vec<SlotKey> = self
            .pending
            .iter()
            .filter(|(_, (_, due))| *due <= now)
            .map(|(key, _)| key.clone())
            .collect();
        self.take(ready)
    }

    pub fn drain_all(&mut self) -> Vec<SlotCommand> {
        let keys: Vec<SlotKey> = self.pending.keys().cloned().collect();
        self.take(keys)
    }

    fn take(&mut self, keys: Vec<SlotKey>) -> Vec<SlotCommand> {
        let mut taken: Vec<(Instant, SlotCommand)> = keys
            .into_iter()
            .filter_map(|key| {
                self.pending
                    .remove(&key)
                    .map(|(edit, due)| (due, SlotCommand { key, edit }))
            })
            .collect();
        taken.sort_by_key(|(due, _)| *due);
        taken.into_iter().map(|(_, command)| command).collect()
    }
}

/// Spawns the debounced dispatcher. Commands sent on the returned channel are coalesced
/// and handed to `sink` once idle; dropping every sender flushes what is left.
pub fn spawn_dispatcher<F>(delay: Duration, mut sink: F) -> mpsc::UnboundedSender<SlotCommand>
where
    F: FnMut(SlotCommand) + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<SlotCommand>();

    tokio::spawn(async move {
        let mut queue = CommandQueue::new(delay);
        loop {
            let received = match queue.next_deadline() {
                Some(deadline) => tokio::select! {
                    command = rx.recv() => command,
                    _ = sleep_until(deadline) => {
                        for command in queue.drain_ready(Instant::now()) {
                            sink(command);
                        }
                        continue;
                    }
                },
                None => rx.recv().await,
            };

            match received {
                Some(command) => {
                    debug!("Queued edit for {}[{}] on {}", command.key.room, command.key.index, command.key.day);
                    queue.push(command, Instant::now());
                }
                None => {
                    for command in queue.drain_all() {
                        sink(command);
                    }
                    break;
                }
            }
        }
    });

    tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn key(room: &str, index: usize) -> SlotKey {
        SlotKey {
            day: Day::Lundi,
            room: room.to_string(),
            index,
        }
    }

    fn set_professor(room: &str, index: usize, professor: &str) -> SlotCommand {
        SlotCommand {
            key: key(room, index),
            edit: SlotEdit {
                professor: Some(professor.to_string()),
                ..SlotEdit::default()
            },
        }
    }

    #[test]
    fn last_write_for_a_slot_wins() {
        let t0 = Instant::now();
        let mut queue = CommandQueue::new(Duration::from_millis(500));
        queue.push(set_professor("A1", 2, "P1"), t0);
        queue.push(set_professor("A1", 2, "P2"), t0 + Duration::from_millis(100));

        let drained = queue.drain_all();
        assert_eq!(drained, vec![set_professor("A1", 2, "P2")]);
        assert_eq!(queue.next_deadline(), None);
    }

    #[test]
    fn releases_only_idle_slots_in_deadline_order() {
        let t0 = Instant::now();
        let mut queue = CommandQueue::new(Duration::from_millis(500));
        queue.push(set_professor("A2", 0, "P3"), t0 + Duration::from_millis(50));
        queue.push(set_professor("A1", 2, "P1"), t0);
        queue.push(set_professor("B1", 4, "P4"), t0 + Duration::from_millis(400));

        assert!(queue.drain_ready(t0 + Duration::from_millis(499)).is_empty());
        let ready = queue.drain_ready(t0 + Duration::from_millis(600));
        assert_eq!(ready, vec![set_professor("A1", 2, "P1"), set_professor("A2", 0, "P3")]);
        assert_eq!(queue.next_deadline(), Some(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn repeated_edits_push_the_deadline_back() {
        let t0 = Instant::now();
        let mut queue = CommandQueue::new(Duration::from_millis(500));
        queue.push(set_professor("A1", 2, "P1"), t0);
        queue.push(set_professor("A1", 2, "P1"), t0 + Duration::from_millis(400));
        assert!(queue.drain_ready(t0 + Duration::from_millis(600)).is_empty());
        assert_eq!(queue.drain_ready(t0 + Duration::from_millis(900)).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dispatcher_coalesces_bursts() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let tx = spawn_dispatcher(Duration::from_millis(300), move |command| {
            sink.lock().unwrap().push(command);
        });

        tx.send(set_professor("A1", 2, "P1")).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(set_professor("A1", 2, "P2")).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(received.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(*received.lock().unwrap(), vec![set_professor("A1", 2, "P2")]);
    }

    #[tokio::test(start_paused = true)]
    async fn closing_the_channel_flushes_pending_commands() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let tx = spawn_dispatcher(Duration::from_secs(60), move |command| {
            sink.lock().unwrap().push(command);
        });

        tx.send(set_professor("A1", 1, "P1")).unwrap();
        drop(tx);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(received.lock().unwrap().len(), 1);
    }
}
