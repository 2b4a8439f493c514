//! The round-robin dispatcher and the tick handler that wakes sleepers.

use crate::{arch, Kernel, MAXTHREAD};
use abi::TaskState;

impl Kernel {
    /// `Dispatch`. Scans forward from `next_p` for the first `Ready` slot,
    /// wrapping modulo `MAXTHREAD`. Priority is never consulted -- the tie
    /// break is purely positional.
    ///
    /// If a full lap finds nothing ready, interrupts are re-enabled so the
    /// tick ISR can promote a sleeper, and the scan continues; interrupts
    /// are disabled again before the chosen slot is touched. A caller that
    /// was just preempted can be re-selected if it is the only ready slot.
    ///
    /// Must be called with interrupts already disabled.
    pub fn dispatch(&mut self) {
        let mut swept = 0;
        loop {
            if self.process[self.next_p].state == TaskState::Ready {
                break;
            }
            self.next_p = (self.next_p + 1) % MAXTHREAD;
            swept += 1;
            if swept > MAXTHREAD {
                arch::enable_interrupts();
            }
        }
        arch::disable_interrupts();
        self.cp = self.next_p;
        self.next_p = (self.next_p + 1) % MAXTHREAD;
        self.process[self.cp].state = TaskState::Running;
    }

    /// Tick ISR body. Decrements `request_arg` for every `Sleeping` slot and
    /// promotes it to `Ready` once that reaches zero. Never invokes the
    /// dispatcher or the syscall loop itself.
    pub fn tick(&mut self) {
        for tcb in self.process.iter_mut() {
            if tcb.state == TaskState::Sleeping {
                tcb.request_arg -= 1;
                if tcb.request_arg <= 0 {
                    tcb.state = TaskState::Ready;
                }
            }
        }
    }
}
