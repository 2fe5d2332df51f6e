//! Customer identifier generation.

use crate::domain::CUSTOMER_ID_LEN;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Mutex;

const ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub trait IdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random 8-character identifiers drawn from `A-Z0-9`.
///
/// Uniqueness is not checked here; a collision surfaces as a duplicate key on insert.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..CUSTOMER_ID_LEN)
            .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
            .collect()
    }
}

/// Hands out a fixed list of ids, then falls back to random ones.
#[derive(Debug, Default)]
pub struct ScriptedIds {
    queue: Mutex<VecDeque<String>>,
}

impl ScriptedIds {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: Mutex::new(ids.into_iter().map(Into::into).collect()),
        }
    }
}

impl IdSource for ScriptedIds {
    fn next_id(&self) -> String {
        let scripted = match self.queue.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(_) => None,
        };
        scripted.unwrap_or_else(|| RandomIds.next_id())
    }
}
