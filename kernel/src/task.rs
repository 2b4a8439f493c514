//! Task creation: finding a slot and synthesizing a task's initial stack.

use crate::{arch, Kernel, WORKSPACE};
use abi::{KernelRequest, Pid, TaskFn, TaskState};

/// A statically-described task, as emitted by the `codegen` crate from the
/// board's task list.
#[derive(Clone, Copy)]
pub struct TaskDesc {
    pub name: &'static str,
    pub entrypoint: TaskFn,
    pub priority: u8,
    pub arg: i32,
}

impl Kernel {
    /// `Kernel_Create_Task`. Finds the first `Dead` slot, zeroes its
    /// workspace, synthesizes an initial stack frame for `code`, and marks
    /// the slot `Ready`.
    ///
    /// Returns `None` (with `err` set to `MaxProcessErr`) if the table is
    /// full; creates no task and leaves every other slot untouched.
    pub fn create_task(&mut self, code: TaskFn, priority: u8, arg: i32) -> Option<Pid> {
        let slot = self.find_dead_slot()?;
        let tcb = &mut self.process[slot];
        tcb.workspace = [0; WORKSPACE];
        tcb.sp = arch::synth_initial_stack(&mut tcb.workspace, code);
        self.last_pid += 1;
        let tcb = &mut self.process[slot];
        tcb.pid = self.last_pid;
        tcb.priority = priority;
        tcb.arg = arg;
        tcb.code = Some(code);
        tcb.request = KernelRequest::None_;
        tcb.request_arg = 0;
        tcb.state = TaskState::Ready;
        self.tasks += 1;
        self.clear_err();
        Some(tcb.pid)
    }

    /// Resets the kernel and creates one task per entry in `tasks`, in
    /// order. Used to bring up the board's statically-declared task list
    /// before the first call to `OS_Start`.
    pub fn init_with_tasks(&mut self, tasks: &[TaskDesc]) {
        self.init();
        for t in tasks {
            self.create_task(t.entrypoint, t.priority, t.arg);
        }
    }
}
