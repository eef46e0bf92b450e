use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

const BASE62_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const LENGTH: usize = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    Panel,
    Request,
}

impl Prefix {
    fn as_str(&self) -> &'static str {
        match self {
            Prefix::Panel => "pnl",
            Prefix::Request => "req",
        }
    }
}

static LAST_TIMESTAMP: AtomicU64 = AtomicU64::new(0);
static COUNTER: Mutex<u32> = Mutex::new(0);

fn random_base62(length: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut result = String::with_capacity(length);
    for _ in 0..length {
        let idx = rng.gen_range(0..62);
        result.push(BASE62_CHARS[idx] as char);
    }
    result
}

fn next_counter(reset: bool) -> u32 {
    let mut counter = COUNTER.lock().unwrap_or_else(|e| e.into_inner());
    if reset {
        *counter = 0;
    }
    *counter += 1;
    *counter
}

/// Creates a sortable identifier: `<prefix>_<12 hex time chars><14 random chars>`.
pub fn create(prefix: Prefix, timestamp: Option<u64>) -> String {
    let current_timestamp = timestamp.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    });

    let last = LAST_TIMESTAMP.swap(current_timestamp, Ordering::Relaxed);
    let counter_val = next_counter(current_timestamp != last);
    let now = current_timestamp * 0x1000 + u64::from(counter_val);

    let mut time_bytes = [0u8; 6];
    for (i, byte) in time_bytes.iter_mut().enumerate() {
        *byte = ((now >> (40 - 8 * i)) & 0xff) as u8;
    }

    format!(
        "{}_{}{}",
        prefix.as_str(),
        hex::encode(time_bytes),
        random_base62(LENGTH - 12)
    )
}

/// Identifies one chat panel (and therefore one conversation session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(String);

impl PanelId {
    pub fn new() -> Self {
        Self(create(Prefix::Panel, None))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PanelId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for PanelId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for PanelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
