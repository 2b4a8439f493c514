#![no_std]

use defmt::Format;

/// Task identifier. `0` is never assigned to a real task.
pub type Pid = u16;

/// A task's entry point. Called once with its creation-time argument;
/// returning from it falls through to the termination trampoline instead
/// of undefined behavior.
pub type TaskFn = extern "C" fn(arg: i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
#[repr(u8)]
pub enum TaskState {
    Dead,
    Ready,
    Running,
    Suspended,
    Sleeping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
#[repr(u8)]
pub enum KernelRequest {
    None_,
    Create,
    Yield,
    Terminate,
    Suspend,
    Resume,
    Sleep,
}

/// Sticky last-error code. Never cleared automatically; a caller that cares
/// about a prior failure has to read and clear it itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
#[repr(u8)]
pub enum KernelError {
    NoErr,
    InvalidKernelRequestErr,
    KernelInactiveErr,
    MaxProcessErr,
    PidNotFoundErr,
    SuspendNonrunningTaskErr,
    ResumeNonsuspendedTaskErr,
}

impl Default for KernelError {
    fn default() -> Self {
        KernelError::NoErr
    }
}
