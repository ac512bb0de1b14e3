//! Thread-backed kernel

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, Thread};
use std::time::{Duration, Instant};

use crate::config::{CFG_ADOPT_MAX, CFG_TASK_MAX, CFG_TICK_RATE_HZ};
use crate::error::{OsError, OsResult};
use crate::kernel::{Kernel, TaskSpec, TimeBase};
use crate::types::{OsPendStatus, OsTaskId, OsTick};

// Adopted ids follow the created ones
const _: () = assert!(CFG_TASK_MAX + CFG_ADOPT_MAX <= OsTaskId::MAX as usize + 1);

thread_local! {
    /// Dropped when the thread exits, which frees its adopted slot
    static ALIVE: Arc<()> = Arc::new(());
}

/// Foreign thread taken on as a task
struct Adopted {
    thread: Thread,
    alive: Weak<()>,
}

impl Adopted {
    #[inline]
    fn is_alive(&self) -> bool {
        self.alive.strong_count() > 0
    }
}

/// Kernel whose tasks are OS threads
///
/// Priorities are validated but not enforced; the host scheduler decides.
/// Threads that call into the kernel without having been created by it are
/// adopted as tasks on first use. Adopted threads get ids after the created
/// ones, do not count against [`CFG_TASK_MAX`], and give their slot back
/// when they exit. At most [`CFG_ADOPT_MAX`] can be live at once.
pub struct StdKernel {
    epoch: Instant,
    tick: Duration,
    tasks: Mutex<Vec<Thread>>,
    adopted: Mutex<[Option<Adopted>; CFG_ADOPT_MAX]>,
}

impl StdKernel {
    /// Kernel ticking every `tick`
    pub fn new(tick: Duration) -> Self {
        StdKernel {
            epoch: Instant::now(),
            tick: tick.max(Duration::from_micros(1)),
            tasks: Mutex::new(Vec::with_capacity(CFG_TASK_MAX)),
            adopted: Mutex::new(core::array::from_fn(|_| None)),
        }
    }

    /// Kernel ticking at [`CFG_TICK_RATE_HZ`]
    pub fn with_default_tick() -> Self {
        Self::new(Duration::from_secs(1) / CFG_TICK_RATE_HZ)
    }

    /// Duration of one tick
    #[inline]
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Number of tasks created so far
    pub fn task_count(&self) -> usize {
        self.lock_tasks().len()
    }

    /// Number of live adopted threads
    pub fn adopted_count(&self) -> usize {
        self.lock_adopted()
            .iter()
            .flatten()
            .filter(|a| a.is_alive())
            .count()
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<Thread>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_adopted(&self) -> MutexGuard<'_, [Option<Adopted>; CFG_ADOPT_MAX]> {
        self.adopted.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Id of the calling thread as an adopted task, taking a free slot if
    /// it has none yet
    fn adopt(&self, me: Thread) -> OsResult<OsTaskId> {
        let mut adopted = self.lock_adopted();

        let mut free = None;
        for (slot, entry) in adopted.iter().enumerate() {
            match entry {
                Some(a) if a.thread.id() == me.id() => {
                    return Ok((CFG_TASK_MAX + slot) as OsTaskId);
                }
                Some(a) if a.is_alive() => {}
                _ => {
                    free.get_or_insert(slot);
                }
            }
        }

        let slot = free.ok_or(OsError::TaskNoMoreTcb)?;
        // Fails only while the thread is tearing down its locals
        let alive = ALIVE
            .try_with(Arc::downgrade)
            .map_err(|_| OsError::TaskNoMoreTcb)?;
        adopted[slot] = Some(Adopted { thread: me, alive });

        crate::debug!("thread adopted as task {}", CFG_TASK_MAX + slot);
        Ok((CFG_TASK_MAX + slot) as OsTaskId)
    }

    fn instant_of(&self, tick: OsTick) -> Instant {
        self.epoch + self.tick * tick
    }

    fn ticks_to_duration(&self, ticks: OsTick) -> Duration {
        self.tick * ticks
    }
}

impl Default for StdKernel {
    fn default() -> Self {
        Self::with_default_tick()
    }
}

impl TimeBase for StdKernel {
    fn tick_get(&self) -> OsTick {
        (self.epoch.elapsed().as_nanos() / self.tick.as_nanos()) as OsTick
    }

    /// Sleeps to the tick boundary `ticks` ticks from now, like a tick-driven
    /// kernel would.
    fn time_dly(&self, ticks: OsTick) {
        if ticks == 0 {
            return;
        }
        let until = self.instant_of(self.tick_get().wrapping_add(ticks));
        let now = Instant::now();
        if until > now {
            thread::sleep(until - now);
        }
    }
}

impl Kernel for StdKernel {
    fn task_create<F>(&self, spec: TaskSpec, entry: F) -> OsResult<OsTaskId>
    where
        F: FnOnce() + Send + 'static,
    {
        spec.validate()?;

        // Held across the spawn so the new thread cannot adopt itself
        // before it is registered under its id.
        let mut tasks = self.lock_tasks();
        if tasks.len() >= CFG_TASK_MAX {
            return Err(OsError::TaskNoMoreTcb);
        }

        let handle = thread::Builder::new()
            .name(spec.name.into())
            .stack_size(spec.stk_size.max(64 * 1024))
            .spawn(entry)
            .map_err(|_| OsError::TaskNoMoreTcb)?;

        let id = tasks.len() as OsTaskId;
        tasks.push(handle.thread().clone());

        crate::debug!("task {} '{}' created at prio {}", id, spec.name, spec.prio);
        Ok(id)
    }

    fn task_current(&self) -> OsResult<OsTaskId> {
        let me = thread::current();
        if let Some(pos) = self.lock_tasks().iter().position(|t| t.id() == me.id()) {
            return Ok(pos as OsTaskId);
        }
        self.adopt(me)
    }

    fn task_pend(&self, timeout: OsTick) -> OsPendStatus {
        if timeout == 0 {
            thread::park();
            return OsPendStatus::Ok;
        }

        let deadline = Instant::now() + self.ticks_to_duration(timeout);
        thread::park_timeout(self.ticks_to_duration(timeout));
        if Instant::now() >= deadline {
            OsPendStatus::Timeout
        } else {
            OsPendStatus::Ok
        }
    }

    fn task_post(&self, task: OsTaskId) {
        let task = task as usize;
        let target = if task < CFG_TASK_MAX {
            self.lock_tasks().get(task).cloned()
        } else {
            self.lock_adopted()
                .get(task - CFG_TASK_MAX)
                .and_then(Option::as_ref)
                .filter(|a| a.is_alive())
                .map(|a| a.thread.clone())
        };

        if let Some(thread) = target {
            thread.unpark();
        }
    }
}
