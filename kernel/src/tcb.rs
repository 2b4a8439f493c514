//! The per-task control block and its lifecycle fields.

use crate::WORKSPACE;
use abi::{KernelRequest, Pid, TaskFn, TaskState};

/// One task's complete kernel-visible state.
///
/// `workspace` backs both the task's call stack and its saved-register
/// frame; `sp` always points somewhere inside it for any non-`Dead` task.
pub struct Tcb {
    pub pid: Pid,
    /// 0 (highest) through 10. Recorded, never consulted by the scheduler.
    pub priority: u8,
    pub state: TaskState,
    pub request: KernelRequest,
    /// Target pid for `Suspend`/`Resume`, remaining ticks for `Sleep`.
    pub request_arg: i32,
    /// Creation-time argument, stashed for the task's own use.
    pub arg: i32,
    pub sp: *mut u8,
    pub workspace: [u8; WORKSPACE],
    pub code: Option<TaskFn>,
}

impl Tcb {
    pub const fn dead() -> Self {
        Tcb {
            pid: 0,
            priority: 0,
            state: TaskState::Dead,
            request: KernelRequest::None_,
            request_arg: 0,
            arg: 0,
            sp: core::ptr::null_mut(),
            workspace: [0; WORKSPACE],
            code: None,
        }
    }
}
