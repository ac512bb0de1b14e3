//! One-slot handoff channel
//!
//! Capacity is exactly one value. `send` never blocks and is refused while a
//! value is in flight; `receive` blocks the calling task until a value is
//! available or its timeout expires. Blocked receivers are released in FIFO
//! order.
//!
//! A value sent while a receiver is pended is handed to that receiver
//! directly: it is parked against the receiver's task id rather than in the
//! open slot, so no third task can take it between the send and the wake-up.

use core::cell::RefCell;

use heapless::Deque;
use portable_atomic::{AtomicU32, Ordering};

use crate::config::CFG_PEND_LIST_MAX;
use crate::critical::{critical_section, is_isr_context, Mutex};
use crate::error::{OsError, OsResult};
use crate::kernel::Kernel;
use crate::types::{OsPendStatus, OsTaskId, OsTick};

/// Timeout value that blocks until a value arrives
pub const WAIT_FOREVER: OsTick = 0;

/// FIFO list of tasks waiting on a kernel object
#[derive(Debug)]
pub struct PendList {
    tasks: Deque<OsTaskId, CFG_PEND_LIST_MAX>,
}

impl PendList {
    /// Create a new empty pend list
    pub const fn new() -> Self {
        PendList { tasks: Deque::new() }
    }

    /// Check if list is empty
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of pended tasks
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if `task` is pended
    pub fn contains(&self, task: OsTaskId) -> bool {
        self.tasks.iter().any(|&t| t == task)
    }

    /// Insert task at tail
    pub fn insert(&mut self, task: OsTaskId) -> OsResult<()> {
        self.tasks.push_back(task).map_err(|_| OsError::PendListFull)
    }

    /// Remove the task at the head of the list
    #[inline]
    pub fn pop_head(&mut self) -> Option<OsTaskId> {
        self.tasks.pop_front()
    }

    /// Remove specific task from list, keeping the order of the others
    pub fn remove(&mut self, task: OsTaskId) {
        for _ in 0..self.tasks.len() {
            if let Some(t) = self.tasks.pop_front() {
                if t != task {
                    // Cannot fail: one element was just popped
                    let _ = self.tasks.push_back(t);
                }
            }
        }
    }
}

impl Default for PendList {
    fn default() -> Self {
        Self::new()
    }
}

struct Inner<T> {
    /// Value waiting for whichever receiver comes first
    slot: Option<T>,
    /// Value already promised to a pended receiver
    handed: Option<(OsTaskId, T)>,
    /// Receivers waiting for a value
    pend_list: PendList,
}

impl<T> Inner<T> {
    #[inline]
    fn is_occupied(&self) -> bool {
        self.slot.is_some() || self.handed.is_some()
    }

    /// Take the value handed to `task`, if any
    fn take_handed(&mut self, task: OsTaskId) -> Option<T> {
        match self.handed.take() {
            Some((owner, value)) if owner == task => Some(value),
            other => {
                self.handed = other;
                None
            }
        }
    }
}

/// Capacity-1 channel between tasks
pub struct Handoff<'k, T, K> {
    kernel: &'k K,
    inner: Mutex<RefCell<Inner<T>>>,
    rejected: AtomicU32,
}

impl<'k, T, K: Kernel> Handoff<'k, T, K> {
    /// Create an empty handoff whose receivers block on `kernel`
    pub const fn new(kernel: &'k K) -> Self {
        Handoff {
            kernel,
            inner: Mutex::new(RefCell::new(Inner {
                slot: None,
                handed: None,
                pend_list: PendList::new(),
            })),
            rejected: AtomicU32::new(0),
        }
    }

    /// Offer a value without blocking
    ///
    /// Returns `false` and drops `value` if a value is still in flight.
    pub fn send(&self, value: T) -> bool {
        let woken = critical_section(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if inner.is_occupied() {
                return Err(value);
            }

            match inner.pend_list.pop_head() {
                Some(task) => {
                    inner.handed = Some((task, value));
                    Ok(Some(task))
                }
                None => {
                    inner.slot = Some(value);
                    Ok(None)
                }
            }
        });

        match woken {
            Ok(Some(task)) => {
                self.kernel.task_post(task);
                true
            }
            Ok(None) => true,
            Err(_dropped) => {
                let n = self.rejected.fetch_add(1, Ordering::Relaxed) + 1;
                crate::trace!("handoff occupied, send dropped (#{})", n);
                false
            }
        }
    }

    /// Take a value, blocking up to `timeout` ticks ([`WAIT_FOREVER`] = no limit)
    ///
    /// # Returns
    /// * `Ok(value)` - A value was received
    /// * `Err(OsError::Timeout)` - Timeout expired
    /// * `Err(OsError::PendListFull)` - Too many tasks already waiting
    /// * `Err(OsError::PendIsr)` - Called from an interrupt handler
    /// * `Err(OsError::TaskNoMoreTcb)` - The caller is not a kernel task
    pub fn receive(&self, timeout: OsTick) -> OsResult<T> {
        if is_isr_context() {
            return Err(OsError::PendIsr);
        }

        let me = self.kernel.task_current()?;
        let start = self.kernel.tick_get();

        loop {
            let ready = critical_section(|cs| -> OsResult<Option<T>> {
                let mut inner = self.inner.borrow_ref_mut(cs);
                if let Some(value) = inner.take_handed(me) {
                    return Ok(Some(value));
                }
                if !inner.pend_list.contains(me) {
                    if let Some(value) = inner.slot.take() {
                        return Ok(Some(value));
                    }
                    inner.pend_list.insert(me)?;
                }
                Ok(None)
            })?;

            if let Some(value) = ready {
                return Ok(value);
            }

            let remaining = if timeout == WAIT_FOREVER {
                WAIT_FOREVER
            } else {
                let elapsed = self.kernel.tick_get().wrapping_sub(start);
                if elapsed >= timeout {
                    return self.abandon(me);
                }
                timeout - elapsed
            };

            if self.kernel.task_pend(remaining) == OsPendStatus::Timeout {
                return self.abandon(me);
            }
        }
    }

    /// Take a value if one is waiting in the slot
    ///
    /// Values already handed to a pended receiver are not visible here.
    pub fn try_receive(&self) -> OsResult<T> {
        critical_section(|cs| {
            self.inner
                .borrow_ref_mut(cs)
                .slot
                .take()
                .ok_or(OsError::PendWouldBlock)
        })
    }

    /// Leave the pend list after a timeout, unless a value arrived meanwhile
    fn abandon(&self, me: OsTaskId) -> OsResult<T> {
        critical_section(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if let Some(value) = inner.take_handed(me) {
                return Ok(value);
            }
            inner.pend_list.remove(me);
            Err(OsError::Timeout)
        })
    }

    /// Whether a value is in flight (in the slot or handed to a receiver)
    pub fn is_occupied(&self) -> bool {
        critical_section(|cs| self.inner.borrow_ref(cs).is_occupied())
    }

    /// Number of receivers currently pended
    pub fn waiting(&self) -> usize {
        critical_section(|cs| self.inner.borrow_ref(cs).pend_list.len())
    }

    /// Number of sends refused because the slot was occupied
    pub fn rejected(&self) -> u32 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Kernel the receivers block on
    #[inline]
    pub fn kernel(&self) -> &'k K {
        self.kernel
    }
}
