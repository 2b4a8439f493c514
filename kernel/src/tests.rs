//! Scheduler and syscall-loop tests, run against `arch::sim` since there is
//! no real stack switch to exercise off real hardware. Each test builds a
//! fresh `Kernel` and drives it one step at a time.

use super::*;
use abi::{KernelError, KernelRequest, TaskState};

extern "C" fn task_a(_arg: i32) {}
extern "C" fn task_b(_arg: i32) {}
extern "C" fn task_c(_arg: i32) {}

fn fresh() -> Kernel {
    let mut k = Kernel::empty();
    k.init();
    k
}

#[test]
fn create_before_start_is_synchronous() {
    let mut k = fresh();
    let pid = k.create_task(task_a, 1, 42).expect("slot available");
    assert_eq!(pid, 1);
    assert_eq!(k.task_count(), 1);
    assert_eq!(k.err(), KernelError::NoErr);
}

#[test]
fn pids_are_monotonic_and_never_reused() {
    let mut k = fresh();
    let a = k.create_task(task_a, 0, 0).unwrap();
    let b = k.create_task(task_b, 0, 0).unwrap();
    assert!(b > a);

    // kill a, recycle its slot, and confirm the new task gets a fresh pid
    let slot = k.find_by_pid(a).unwrap();
    k.slot_mut(slot).state = TaskState::Dead;
    k.tasks -= 1;

    let c = k.create_task(task_c, 0, 0).unwrap();
    assert!(c > b, "a dead slot's pid is never handed out again");
}

#[test]
fn creation_fails_past_maxthread() {
    let mut k = fresh();
    for _ in 0..MAXTHREAD {
        assert!(k.create_task(task_a, 0, 0).is_some());
    }
    assert_eq!(k.create_task(task_a, 0, 0), None);
    assert_eq!(k.err(), KernelError::MaxProcessErr);
}

#[test]
fn dispatch_picks_the_next_ready_slot_round_robin() {
    let mut k = fresh();
    let a = k.create_task(task_a, 0, 0).unwrap();
    let b = k.create_task(task_b, 0, 0).unwrap();

    k.dispatch();
    assert_eq!(k.current().pid, a);
    assert_eq!(k.current().state, TaskState::Running);

    // a yields, b should run next
    k.current_mut().state = TaskState::Ready;
    k.dispatch();
    assert_eq!(k.current().pid, b);

    k.current_mut().state = TaskState::Ready;
    k.dispatch();
    assert_eq!(k.current().pid, a, "round robin wraps back to the start");
}

#[test]
fn ping_pong_alternates_forever_on_yield() {
    let mut k = fresh();
    let a = k.create_task(task_a, 0, 0).unwrap();
    let b = k.create_task(task_b, 0, 0).unwrap();
    k.dispatch();

    let mut seen = [a, b, a, b, a, b];
    for expected in seen.iter_mut() {
        assert_eq!(k.current().pid, *expected);
        k.current_mut().request = KernelRequest::Yield;
        k.handle_request();
    }
}

#[test]
fn suspend_and_resume_round_trip() {
    let mut k = fresh();
    let a = k.create_task(task_a, 0, 0).unwrap();
    let b = k.create_task(task_b, 0, 0).unwrap();
    k.dispatch();
    assert_eq!(k.current().pid, a);

    // a suspends b; b must not be dispatched again until resumed
    k.current_mut().request = KernelRequest::Suspend;
    k.current_mut().request_arg = b as i32;
    k.handle_request();
    assert_eq!(k.err(), KernelError::NoErr);
    assert_eq!(k.slot(k.find_by_pid(b).unwrap()).state, TaskState::Suspended);
    // deliberate: the suspending task stays current
    assert_eq!(k.current().pid, a);

    k.current_mut().state = TaskState::Ready;
    k.dispatch();
    assert_eq!(k.current().pid, a, "b is suspended, a is the only one ready");

    k.current_mut().request = KernelRequest::Resume;
    k.current_mut().request_arg = b as i32;
    k.handle_request();
    assert_eq!(k.err(), KernelError::NoErr);
    assert_eq!(k.slot(k.find_by_pid(b).unwrap()).state, TaskState::Ready);
}

#[test]
fn suspend_races_are_rejected() {
    let mut k = fresh();
    let a = k.create_task(task_a, 0, 0).unwrap();
    let b = k.create_task(task_b, 0, 0).unwrap();
    k.dispatch();

    // suspend an already-suspended task
    k.current_mut().request = KernelRequest::Suspend;
    k.current_mut().request_arg = b as i32;
    k.handle_request();
    assert_eq!(k.err(), KernelError::NoErr);

    k.current_mut().request = KernelRequest::Suspend;
    k.current_mut().request_arg = b as i32;
    k.handle_request();
    assert_eq!(k.err(), KernelError::SuspendNonrunningTaskErr);

    // resume a task that was never suspended
    k.current_mut().request = KernelRequest::Resume;
    k.current_mut().request_arg = a as i32;
    k.handle_request();
    assert_eq!(k.err(), KernelError::ResumeNonsuspendedTaskErr);

    // act on an unknown pid
    k.current_mut().request = KernelRequest::Resume;
    k.current_mut().request_arg = 999;
    k.handle_request();
    assert_eq!(k.err(), KernelError::PidNotFoundErr);
}

#[test]
fn sleep_wakes_up_after_exactly_n_ticks() {
    let mut k = fresh();
    let a = k.create_task(task_a, 0, 0).unwrap();
    let _b = k.create_task(task_b, 0, 0).unwrap();
    k.dispatch();
    assert_eq!(k.current().pid, a);

    k.current_mut().request = KernelRequest::Sleep;
    k.current_mut().request_arg = 3;
    k.handle_request();
    let slot = k.find_by_pid(a).unwrap();
    assert_eq!(k.slot(slot).state, TaskState::Sleeping);

    k.tick();
    k.tick();
    assert_eq!(k.slot(slot).state, TaskState::Sleeping, "not yet 3 ticks");
    k.tick();
    assert_eq!(k.slot(slot).state, TaskState::Ready, "woken on the third tick");
}

#[test]
fn terminate_frees_its_slot_and_lowers_the_task_count() {
    let mut k = fresh();
    let a = k.create_task(task_a, 0, 0).unwrap();
    let _b = k.create_task(task_b, 0, 0).unwrap();
    k.dispatch();
    assert_eq!(k.current().pid, a);
    assert_eq!(k.task_count(), 2);

    k.current_mut().request = KernelRequest::Terminate;
    k.handle_request();
    assert_eq!(k.task_count(), 1, "the dead slot no longer counts as a task");

    let slot = k.find_by_pid(a);
    assert!(slot.is_none(), "a dead task is not found by pid lookup");
}

#[test]
fn find_pid_by_func_ptr_matches_live_tasks_only() {
    let mut k = fresh();
    let a = k.create_task(task_a, 0, 0).unwrap();
    assert_eq!(k.find_pid_by_func_ptr(task_a), Some(a));
    assert_eq!(k.find_pid_by_func_ptr(task_b), None);

    let slot = k.find_by_pid(a).unwrap();
    k.slot_mut(slot).state = TaskState::Dead;
    assert_eq!(
        k.find_pid_by_func_ptr(task_a),
        None,
        "a dead slot's entry point is no longer a match"
    );
}

#[test]
fn init_with_tasks_creates_every_entry_in_order() {
    let mut k = fresh();
    let tasks = [
        TaskDesc { name: "a", entrypoint: task_a, priority: 1, arg: 10 },
        TaskDesc { name: "b", entrypoint: task_b, priority: 2, arg: 20 },
    ];
    k.init_with_tasks(&tasks);
    assert_eq!(k.task_count(), 2);
    assert_eq!(k.find_pid_by_func_ptr(task_a), Some(1));
    assert_eq!(k.find_pid_by_func_ptr(task_b), Some(2));
}
