//! Instance accounting and copy budgets.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;

/// Lifecycle of a single element instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstanceState {
    Live,
    Dropped,
}

/// Records every instance constructed and destroyed through it.
///
/// Each instance gets a serial number. Destroying an instance twice panics
/// immediately with its serial, so double drops surface at the faulty call
/// rather than as heap corruption. Cloning a ledger shares its records.
#[derive(Clone, Default)]
pub struct Ledger {
    instances: Arc<Mutex<IndexMap<u64, InstanceState>>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, IndexMap<u64, InstanceState>> {
        // A panic inside `retire` poisons the lock; the records stay usable.
        self.instances.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a new instance and return its serial.
    pub fn enroll(&self) -> u64 {
        let mut records = self.records();
        let serial = records.len() as u64;
        records.insert(serial, InstanceState::Live);
        serial
    }

    /// Mark an instance destroyed.
    ///
    /// # Panics
    ///
    /// Panics if the instance was already destroyed or never enrolled.
    pub fn retire(&self, serial: u64) {
        let mut records = self.records();
        match records.get(&serial).copied() {
            Some(InstanceState::Live) => {
                records.insert(serial, InstanceState::Dropped);
            }
            Some(InstanceState::Dropped) => {
                drop(records);
                panic!("double drop of instance {serial}");
            }
            None => {
                drop(records);
                panic!("drop of unknown instance {serial}");
            }
        }
    }

    /// Total instances ever constructed.
    pub fn constructed(&self) -> usize {
        self.records().len()
    }

    /// Instances destroyed so far.
    pub fn dropped(&self) -> usize {
        self.records()
            .values()
            .filter(|&&s| s == InstanceState::Dropped)
            .count()
    }

    /// Instances constructed and not yet destroyed.
    pub fn live(&self) -> usize {
        self.constructed() - self.dropped()
    }

    /// Serials of live instances, in construction order.
    pub fn live_serials(&self) -> Vec<u64> {
        self.records()
            .iter()
            .filter(|(_, state)| **state == InstanceState::Live)
            .map(|(&serial, _)| serial)
            .collect()
    }
}

/// A shared allowance of successful copies.
///
/// Unlimited by default. After [`fail_after(n)`](CopyBudget::fail_after), the
/// next `n` copies succeed and every copy after that fails until the budget
/// is reset.
#[derive(Clone)]
pub struct CopyBudget {
    remaining: Arc<AtomicUsize>,
    copies: Arc<AtomicUsize>,
}

impl CopyBudget {
    pub fn unlimited() -> Self {
        Self {
            remaining: Arc::new(AtomicUsize::new(usize::MAX)),
            copies: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Allow `successes` more copies, then fail.
    pub fn fail_after(&self, successes: usize) {
        self.remaining.store(successes, Ordering::Relaxed);
    }

    /// Lift the limit.
    pub fn reset(&self) {
        self.remaining.store(usize::MAX, Ordering::Relaxed);
    }

    /// Successful copies so far.
    pub fn copies(&self) -> usize {
        self.copies.load(Ordering::Relaxed)
    }

    /// Draw one copy from the budget. Returns `false` once it is exhausted.
    pub fn draw(&self) -> bool {
        let granted = self
            .remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |left| {
                match left {
                    0 => None,
                    usize::MAX => Some(usize::MAX),
                    n => Some(n - 1),
                }
            })
            .is_ok();
        if granted {
            self.copies.fetch_add(1, Ordering::Relaxed);
        }
        granted
    }
}

impl Default for CopyBudget {
    fn default() -> Self {
        Self::unlimited()
    }
}
