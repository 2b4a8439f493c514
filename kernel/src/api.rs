//! Public task-facing surface: `OS_Init`/`OS_Start` and the `Task_*` family.
//!
//! Tasks and the kernel link into one image, so these are ordinary function
//! calls, not a trap into another privilege level -- calling one of the
//! `Task_*` functions below *is* "entering the kernel".

use crate::{arch, kernel};
use abi::{KernelRequest, Pid, TaskFn};

/// `OS_Init`.
pub extern "C" fn os_init() {
    kernel().init();
}

/// Board bring-up variant of `OS_Init` that also creates every task in a
/// statically-declared list (see `codegen`'s generated `TASKS` array).
pub fn os_init_with_tasks(tasks: &[crate::TaskDesc]) {
    kernel().init_with_tasks(tasks);
}

/// `OS_Start`. No-op if the kernel is already active or no task has been
/// created yet; otherwise starts the tick timer and enters the syscall loop,
/// which never returns.
pub extern "C" fn os_start() {
    let k = kernel();
    if k.is_active() || k.task_count() == 0 {
        return;
    }
    arch::disable_interrupts();
    arch::init_tick_timer();
    k.kernel_active = true;
    k.run_syscall_loop();
}

/// `Task_Create`. Before `OS_Start`, creates synchronously. After, records a
/// `Create` request and enters the kernel; the caller stays current.
///
/// Returns `0` on `MaxProcessErr`, otherwise the new pid.
pub extern "C" fn task_create(code: TaskFn, priority: u8, arg: i32) -> Pid {
    let k = kernel();
    if !k.is_active() {
        return k.create_task(code, priority, arg).unwrap_or(0);
    }
    arch::disable_interrupts();
    {
        let tcb = k.current_mut();
        tcb.code = Some(code);
        tcb.priority = priority;
        tcb.arg = arg;
        tcb.request = KernelRequest::Create;
    }
    // Safety: called from task context with interrupts disabled above, per
    // the switch primitive's contract (arch module docs).
    unsafe { arch::enter_kernel() };
    k.current().request_arg as Pid
}

/// `Task_Yield`.
pub extern "C" fn task_yield() {
    enter_with(KernelRequest::Yield, 0);
}

/// `Task_Terminate`. Does not return.
pub extern "C" fn task_terminate() -> ! {
    enter_with(KernelRequest::Terminate, 0);
    // unreachable: a terminated task is never dispatched again
    loop {}
}

/// `Task_Suspend`.
pub extern "C" fn task_suspend(pid: Pid) {
    enter_with(KernelRequest::Suspend, pid as i32);
}

/// `Task_Resume`.
pub extern "C" fn task_resume(pid: Pid) {
    enter_with(KernelRequest::Resume, pid as i32);
}

/// `Task_Sleep`. Blocks unconditionally for `ticks` tick-ISR invocations;
/// there is no cancellation.
pub extern "C" fn task_sleep(ticks: i32) {
    enter_with(KernelRequest::Sleep, ticks);
}

/// `Task_GetArg`. Kept exactly as buggy as the source this was distilled
/// from: it never reads back the creation-time argument.
pub extern "C" fn task_get_arg() -> i32 {
    0
}

/// `findPIDByFuncPtr`. Returns `-1` if no live task's entry point matches.
pub extern "C" fn find_pid_by_func_ptr(f: TaskFn) -> i32 {
    match kernel().find_pid_by_func_ptr(f) {
        Some(pid) => pid as i32,
        None => -1,
    }
}

/// Shared tail for every `Task_*` call that just enters the kernel with a
/// request and waits to be dispatched back. Returns `false` (setting
/// `KernelInactiveErr`) if called before `OS_Start`.
fn enter_with(request: KernelRequest, request_arg: i32) -> bool {
    let k = kernel();
    if !k.is_active() {
        k.set_err(abi::KernelError::KernelInactiveErr);
        return false;
    }
    arch::disable_interrupts();
    {
        let tcb = k.current_mut();
        tcb.request = request;
        tcb.request_arg = request_arg;
    }
    // Safety: called from task context with interrupts disabled above, per
    // the switch primitive's contract (arch module docs).
    unsafe { arch::enter_kernel() };
    true
}
