#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(feature = "avr", feature(naked_functions))]

//! Core of a single-core, round-robin, tick-preemptible task kernel.
//!
//! Tasks and the kernel share one flat address space and one binary image;
//! there is no privilege separation and no IPC. A task enters the kernel by
//! calling into it directly (see [`arch`]); the kernel never enters a task
//! except by restoring its saved stack pointer.

pub mod api;
pub mod arch;
mod defmt_log;
pub mod scheduler;
pub mod syscall;
pub mod task;
pub mod tcb;

#[cfg(all(test, feature = "std"))]
mod tests;

pub use abi::{KernelError, KernelRequest, Pid, TaskFn, TaskState};
pub use task::TaskDesc;
pub use tcb::Tcb;

/// Fixed size of the task table. A linear scan walks all of it on every
/// create and every dispatch, so this is also the crate's one real scaling
/// knob.
pub const MAXTHREAD: usize = 16;

/// Size in bytes of each task's private stack workspace.
pub const WORKSPACE: usize = 256;

/// Every piece of kernel-owned state, collected into one struct so exactly
/// one instance of it ever exists (constructed by [`Kernel::init`]).
pub struct Kernel {
    process: [Tcb; MAXTHREAD],
    /// Index of the currently running (or about-to-run) task.
    cp: usize,
    /// Round-robin scan cursor for the next dispatch.
    next_p: usize,
    /// Count of non-Dead slots.
    tasks: usize,
    last_pid: Pid,
    kernel_active: bool,
    err: KernelError,
}

impl Kernel {
    const fn empty() -> Self {
        const DEAD: Tcb = Tcb::dead();
        Kernel {
            process: [DEAD; MAXTHREAD],
            cp: 0,
            next_p: 0,
            tasks: 0,
            last_pid: 0,
            kernel_active: false,
            err: KernelError::NoErr,
        }
    }

    /// `OS_Init`. Resets every slot to `Dead` and clears all scheduling
    /// state. Must run before any `Task_Create` call.
    pub fn init(&mut self) {
        *self = Self::empty();
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.kernel_active
    }

    #[inline]
    pub fn task_count(&self) -> usize {
        self.tasks
    }

    #[inline]
    pub fn current(&self) -> &Tcb {
        &self.process[self.cp]
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut Tcb {
        &mut self.process[self.cp]
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.cp
    }

    #[inline]
    pub fn slot(&self, index: usize) -> &Tcb {
        &self.process[index]
    }

    #[inline]
    pub fn slot_mut(&mut self, index: usize) -> &mut Tcb {
        &mut self.process[index]
    }

    #[inline]
    pub fn err(&self) -> KernelError {
        self.err
    }

    /// Clears the sticky error. `err` is never cleared automatically, so a
    /// caller that wants a fresh read has to do this itself.
    #[inline]
    pub fn clear_err(&mut self) {
        self.err = KernelError::NoErr;
    }

    fn set_err(&mut self, err: KernelError) {
        if err != KernelError::NoErr {
            defmt::warn!("kernel error: {}", err);
        }
        self.err = err;
    }

    /// Linear scan for the first `Dead` slot. Returns its index, or `None`
    /// with `err` set to `MaxProcessErr` if the table is full.
    fn find_dead_slot(&mut self) -> Option<usize> {
        if let Some(i) = self.process.iter().position(|t| t.state == TaskState::Dead) {
            Some(i)
        } else {
            self.set_err(KernelError::MaxProcessErr);
            None
        }
    }

    /// `findProcessByPID`. Linear scan by pid, skipping `Dead` slots.
    fn find_by_pid(&self, pid: Pid) -> Option<usize> {
        self.process.iter().position(|t| t.state != TaskState::Dead && t.pid == pid)
    }

    /// `findPIDByFuncPtr`. First task whose entry point matches `f`.
    pub fn find_pid_by_func_ptr(&self, f: TaskFn) -> Option<Pid> {
        self.process
            .iter()
            .find(|t| t.state != TaskState::Dead && t.code == Some(f))
            .map(|t| t.pid)
    }
}

static mut KERNEL: Kernel = Kernel::empty();

/// # Safety
/// The kernel is single-threaded: every mutator other than the tick ISR runs
/// with interrupts disabled, and the tick ISR only ever touches the
/// `request_arg`/`state` pair of `Sleeping` slots. There is never a second
/// concurrent borrow.
#[inline]
pub fn kernel() -> &'static mut Kernel {
    unsafe { &mut *core::ptr::addr_of_mut!(KERNEL) }
}
