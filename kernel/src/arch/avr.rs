//! AVR backend: the real context-switch primitive and tick timer.
//!
//! Register addresses below are the ATmega2560's (the board this kernel was
//! written against). `enter_kernel`/`exit_kernel` are the only places a
//! stack pointer crosses the task/kernel boundary, and both run with
//! interrupts disabled throughout.

use core::arch::asm;
use core::ptr;

use crate::TaskFn;

const SREG: *mut u8 = 0x5F as *mut u8;
const TCCR1A: *mut u8 = 0x80 as *mut u8;
const TCCR1B: *mut u8 = 0x81 as *mut u8;
const TIMSK1: *mut u8 = 0x6F as *mut u8;
const OCR1AH: *mut u8 = 0x89 as *mut u8;
const OCR1AL: *mut u8 = 0x88 as *mut u8;

/// Compare-match value for a ~10ms tick at 16MHz with a /1024 prescaler.
const TICK_LENG: u16 = 157;

static mut KERNEL_SP: *mut u8 = ptr::null_mut();
static mut CURRENT_SP: *mut u8 = ptr::null_mut();

#[inline]
pub fn disable_interrupts() {
    unsafe { asm!("cli") }
}

#[inline]
pub fn enable_interrupts() {
    unsafe { asm!("sei") }
}

#[inline]
pub fn current_sp() -> *mut u8 {
    unsafe { CURRENT_SP }
}

#[inline]
pub fn set_current_sp(sp: *mut u8) {
    unsafe { CURRENT_SP = sp }
}

/// Configures Timer1 for CTC mode with a /1024 prescaler and enables its
/// compare-match-A interrupt. The vector for that interrupt is `tick_isr`.
pub fn init_tick_timer() {
    unsafe {
        ptr::write_volatile(TCCR1A, 0);
        // CTC mode (WGM12), prescaler 1024 (CS12 | CS10)
        ptr::write_volatile(TCCR1B, 0b0000_1101);
        ptr::write_volatile(OCR1AH, (TICK_LENG >> 8) as u8);
        ptr::write_volatile(OCR1AL, TICK_LENG as u8);
        ptr::write_volatile(TIMSK1, 0b0000_0010); // OCIE1A
    }
}

/// `Enter_Kernel`. Called from task context with interrupts enabled. Saves
/// the full register file and SREG onto the calling task's own stack,
/// records the resulting stack pointer into `CURRENT_SP`, and switches onto
/// the kernel stack.
#[naked]
pub unsafe extern "C" fn enter_kernel() {
    asm!(
        "cli",
        "push r0",
        "push r1",
        "push r2",
        "push r3",
        "push r4",
        "push r5",
        "push r6",
        "push r7",
        "push r8",
        "push r9",
        "push r10",
        "push r11",
        "push r12",
        "push r13",
        "push r14",
        "push r15",
        "push r16",
        "push r17",
        "push r18",
        "push r19",
        "push r20",
        "push r21",
        "push r22",
        "push r23",
        "push r24",
        "push r25",
        "push r26",
        "push r27",
        "push r28",
        "push r29",
        "push r30",
        "push r31",
        "in r0, {sreg}",
        "push r0",
        "lds r26, {current_sp}",
        "lds r27, {current_sp}+1",
        "in r0, 0x3d",
        "st x+, r0",
        "in r0, 0x3e",
        "st x, r0",
        "lds r28, {kernel_sp}",
        "lds r29, {kernel_sp}+1",
        "out 0x3d, r28",
        "out 0x3e, r29",
        "pop r0",
        "out {sreg}, r0",
        "pop r31",
        "pop r30",
        "pop r29",
        "pop r28",
        "pop r27",
        "pop r26",
        "pop r25",
        "pop r24",
        "pop r23",
        "pop r22",
        "pop r21",
        "pop r20",
        "pop r19",
        "pop r18",
        "pop r17",
        "pop r16",
        "pop r15",
        "pop r14",
        "pop r13",
        "pop r12",
        "pop r11",
        "pop r10",
        "pop r9",
        "pop r8",
        "pop r7",
        "pop r6",
        "pop r5",
        "pop r4",
        "pop r3",
        "pop r2",
        "pop r1",
        "pop r0",
        "ret",
        sreg = const 0x3f,
        current_sp = sym CURRENT_SP,
        kernel_sp = sym KERNEL_SP,
        options(noreturn),
    )
}

/// `Exit_Kernel`. Symmetric to [`enter_kernel`]: saves the kernel's full
/// register file and SREG onto the kernel's own stack, stores `SP` into
/// `KERNEL_SP`, loads `SP` from `CURRENT_SP`, and restores the task's full
/// saved frame -- including its flags, which re-enables interrupts on
/// return if the task had them enabled.
#[naked]
pub unsafe extern "C" fn exit_kernel() {
    asm!(
        "push r0",
        "push r1",
        "push r2",
        "push r3",
        "push r4",
        "push r5",
        "push r6",
        "push r7",
        "push r8",
        "push r9",
        "push r10",
        "push r11",
        "push r12",
        "push r13",
        "push r14",
        "push r15",
        "push r16",
        "push r17",
        "push r18",
        "push r19",
        "push r20",
        "push r21",
        "push r22",
        "push r23",
        "push r24",
        "push r25",
        "push r26",
        "push r27",
        "push r28",
        "push r29",
        "push r30",
        "push r31",
        "in r0, {sreg}",
        "push r0",
        "lds r26, {kernel_sp}",
        "lds r27, {kernel_sp}+1",
        "in r0, 0x3d",
        "st x+, r0",
        "in r0, 0x3e",
        "st x, r0",
        "lds r28, {current_sp}",
        "lds r29, {current_sp}+1",
        "out 0x3d, r28",
        "out 0x3e, r29",
        "pop r0",
        "out {sreg}, r0",
        "pop r31",
        "pop r30",
        "pop r29",
        "pop r28",
        "pop r27",
        "pop r26",
        "pop r25",
        "pop r24",
        "pop r23",
        "pop r22",
        "pop r21",
        "pop r20",
        "pop r19",
        "pop r18",
        "pop r17",
        "pop r16",
        "pop r15",
        "pop r14",
        "pop r13",
        "pop r12",
        "pop r11",
        "pop r10",
        "pop r9",
        "pop r8",
        "pop r7",
        "pop r6",
        "pop r5",
        "pop r4",
        "pop r3",
        "pop r2",
        "pop r1",
        "pop r0",
        "ret",
        sreg = const 0x3f,
        current_sp = sym CURRENT_SP,
        kernel_sp = sym KERNEL_SP,
        options(noreturn),
    )
}

/// Writes a task's entry point and the termination trampoline's address
/// onto a fresh workspace so that, on first dispatch, `enter_kernel`'s
/// register/SREG restore lands directly in `code` with interrupts enabled,
/// and falling off the end of `code` returns into the trampoline instead of
/// undefined memory.
///
/// AVR's `ret`/`call` use a two-byte address; the third, always-zero byte
/// below accounts for targets whose program counter is wider than 16 bits.
pub fn synth_initial_stack(workspace: &mut [u8], code: TaskFn) -> *mut u8 {
    let top = workspace.len();
    let mut sp = top;

    let mut push_addr = |sp: &mut usize, addr: usize| {
        workspace[*sp - 1] = 0;
        workspace[*sp - 2] = (addr >> 8) as u8;
        workspace[*sp - 3] = addr as u8;
        *sp -= 3;
    };

    push_addr(&mut sp, (task_terminate_trampoline as TaskFn) as usize);
    push_addr(&mut sp, code as usize);

    // reserve space for the 32 GP registers + SREG that enter_kernel pushes.
    // SREG is the last one enter_kernel pushes, so it lands at the lowest
    // address of the block -- exactly where `sp` ends up once the reservation
    // is done. Set its I-bit so the task's first dispatch restores interrupts
    // enabled, per the concurrency model's requirement that every task starts
    // that way (the workspace is otherwise zeroed, which would leave
    // interrupts disabled on a freshly created task).
    sp -= 33;
    workspace[sp] = 0x80;

    unsafe { workspace.as_mut_ptr().add(sp) }
}

extern "C" fn task_terminate_trampoline(_arg: i32) {
    crate::api::task_terminate();
}

const UCSR0A: *mut u8 = 0xC0 as *mut u8;
const UDR0: *mut u8 = 0xC6 as *mut u8;
const UDRE0: u8 = 1 << 5;

/// Blocking single-byte UART transmit. Logging is never load-bearing for
/// kernel correctness -- this is purely a debug sink.
pub fn log(bytes: &[u8]) {
    for &b in bytes {
        unsafe {
            while ptr::read_volatile(UCSR0A) & UDRE0 == 0 {}
            ptr::write_volatile(UDR0, b);
        }
    }
}
