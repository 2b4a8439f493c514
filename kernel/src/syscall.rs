//! The system-call dispatch loop and the suspend/resume handlers it calls
//! into.

use crate::{arch, Kernel};
use abi::{KernelError, KernelRequest, TaskState};

impl Kernel {
    /// `Next_Kernel_Request`. Entered once by [`crate::api::os_start`] and
    /// never returns.
    pub fn run_syscall_loop(&mut self) -> ! {
        self.dispatch();
        loop {
            self.current_mut().request = KernelRequest::None_;
            arch::set_current_sp(self.current().sp);
            // Safety: called from kernel context with interrupts disabled,
            // per the switch primitive's contract (arch module docs).
            unsafe { arch::exit_kernel() };
            self.current_mut().sp = arch::current_sp();
            self.handle_request();
        }
    }

    /// One request dispatch, split out of [`run_syscall_loop`] so it can be
    /// driven directly without a real context switch.
    pub(crate) fn handle_request(&mut self) {
        match self.current().request {
            KernelRequest::Create => {
                let tcb = self.current();
                let (code, priority, arg) = (tcb.code, tcb.priority, tcb.arg);
                if let Some(code) = code {
                    let pid = self.create_task(code, priority, arg);
                    // the caller reads this back once exit_kernel returns it to task context
                    self.current_mut().request_arg = pid.unwrap_or(0) as i32;
                }
                // deliberate: the creating task stays current, no dispatch
            }
            KernelRequest::Terminate => {
                self.current_mut().state = TaskState::Dead;
                self.tasks -= 1;
                self.dispatch();
            }
            KernelRequest::Suspend => {
                self.handle_suspend();
                // deliberate: caller stays current, no dispatch
            }
            KernelRequest::Resume => {
                self.handle_resume();
                // deliberate: caller stays current, no dispatch
            }
            KernelRequest::Sleep => {
                self.current_mut().state = TaskState::Sleeping;
                self.dispatch();
            }
            KernelRequest::Yield | KernelRequest::None_ => {
                // None_ is what an ISR-driven kernel entry looks like -- an implicit yield
                self.current_mut().state = TaskState::Ready;
                self.dispatch();
            }
        }
    }

    /// `Kernel_Suspend_Task`. Target pid comes from the current task's
    /// `request_arg`. A task can never suspend itself through this path:
    /// the caller is `Running`, not `Ready`, at request time.
    fn handle_suspend(&mut self) {
        let target = self.current().request_arg as u16;
        match self.find_by_pid(target) {
            None => self.set_err(KernelError::PidNotFoundErr),
            Some(slot) if self.slot(slot).state != TaskState::Ready => {
                self.set_err(KernelError::SuspendNonrunningTaskErr)
            }
            Some(slot) => {
                self.slot_mut(slot).state = TaskState::Suspended;
                self.clear_err();
            }
        }
    }

    /// `Kernel_Resume_Task`.
    fn handle_resume(&mut self) {
        let target = self.current().request_arg as u16;
        match self.find_by_pid(target) {
            None => self.set_err(KernelError::PidNotFoundErr),
            Some(slot) if self.slot(slot).state != TaskState::Suspended => {
                self.set_err(KernelError::ResumeNonsuspendedTaskErr)
            }
            Some(slot) => {
                self.slot_mut(slot).state = TaskState::Ready;
                self.clear_err();
            }
        }
    }
}
