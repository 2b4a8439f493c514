//! `std`-only backend used only under `#[cfg(test)]`. There is no real
//! stack switch here -- tests drive the scheduler and syscall-loop logic
//! directly rather than by actually transferring control through
//! `enter_kernel`/`exit_kernel`.

use std::cell::RefCell;

use crate::TaskFn;

thread_local! {
    static LOG: RefCell<Vec<u8>> = RefCell::new(Vec::new());
}

static mut CURRENT_SP: *mut u8 = std::ptr::null_mut();

pub fn disable_interrupts() {}
pub fn enable_interrupts() {}
pub fn init_tick_timer() {}

pub fn current_sp() -> *mut u8 {
    unsafe { CURRENT_SP }
}

pub fn set_current_sp(sp: *mut u8) {
    unsafe { CURRENT_SP = sp }
}

/// # Safety
/// Never actually invoked by the test suite; present only so portable code
/// compiles under the `std` feature.
pub unsafe extern "C" fn enter_kernel() {}

/// # Safety
/// See [`enter_kernel`].
pub unsafe extern "C" fn exit_kernel() {}

/// A plain heap allocation standing in for a task's real stack memory.
/// Tests only ever inspect the resulting pointer's non-null-ness, never
/// dereference through it as a real stack.
pub fn synth_initial_stack(workspace: &mut [u8], _code: TaskFn) -> *mut u8 {
    workspace.as_mut_ptr()
}

pub fn log(bytes: &[u8]) {
    LOG.with(|log| log.borrow_mut().extend_from_slice(bytes));
}

#[cfg(test)]
pub(crate) fn drain_log() -> Vec<u8> {
    LOG.with(|log| std::mem::take(&mut *log.borrow_mut()))
}
