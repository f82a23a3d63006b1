// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Dispatch order while listeners change the list they are being dispatched from.

use std::{cell::{Cell, RefCell},
          rc::{Rc, Weak}};

use pretty_assertions::assert_eq;
use r3bl_callback::{Callback, ConnectionId, ConnectionIdentity, ListenerFailed,
                    TrackedCallback};

type Log = Rc<RefCell<Vec<String>>>;

fn new_log() -> Log { Rc::new(RefCell::new(vec![])) }

fn take(log: &Log) -> Vec<String> { std::mem::take(&mut *log.borrow_mut()) }

/// Listener that records `name` and returns `value`.
fn recorder(log: &Log, name: &'static str, value: i32) -> impl Fn(&i32) -> i32 + 'static {
    let log = log.clone();
    move |arg| {
        log.borrow_mut().push(format!("{name}{arg}"));
        value
    }
}

#[test]
fn test_every_listener_runs_once_in_registration_order() {
    let log = new_log();
    let callback = Callback::<i32, i32>::new();
    for (name, value) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
        callback.add(recorder(&log, name, value));
    }

    assert_eq!(callback.call(0), vec![1, 2, 3, 4]);
    assert_eq!(take(&log), vec!["a0", "b0", "c0", "d0"]);
}

#[test]
fn test_cancelled_listener_is_skipped_in_same_call() {
    let log = new_log();
    let callback = Rc::new(Callback::<i32, i32>::new());
    let target = Rc::new(Cell::new(ConnectionId::default()));

    callback.add(recorder(&log, "a", 1));
    {
        let weak = Rc::downgrade(&callback);
        let target = target.clone();
        let b = recorder(&log, "b", 2);
        callback.add(move |arg| {
            if let Some(callback) = weak.upgrade() {
                assert!(callback.cancel(&target.get()));
            }
            b(arg)
        });
    }
    target.set(*callback.add(recorder(&log, "c", 3)).id());

    assert_eq!(callback.call(0), vec![1, 2]);
    assert_eq!(take(&log), vec!["a0", "b0"]);
    assert_eq!(callback.len(), 2);
}

#[test]
fn test_listener_cancels_a_visited_listener_mid_call() {
    let log = new_log();
    let callback = Rc::new(Callback::<i32, i32>::new());
    let first = *callback.add(recorder(&log, "a", 1)).id();

    let weak = Rc::downgrade(&callback);
    let b = recorder(&log, "b", 2);
    callback.add(move |arg| {
        if let Some(callback) = weak.upgrade() {
            callback.cancel(&first);
        }
        b(arg)
    });
    callback.add(recorder(&log, "c", 3));

    assert_eq!(callback.call(0), vec![1, 2, 3]);
    assert_eq!(take(&log), vec!["a0", "b0", "c0"]);

    assert_eq!(callback.call(1), vec![2, 3]);
    assert_eq!(take(&log), vec!["b1", "c1"]);
}

#[test]
fn test_listener_cancels_itself() {
    let log = new_log();
    let callback = Callback::<i32, i32>::new();

    callback.add(recorder(&log, "a", 1));
    {
        let log = log.clone();
        callback.add_with_connection(move |mut connection, arg| {
            log.borrow_mut().push(format!("once{arg}"));
            assert!(connection.disconnect());
            assert!(!connection.connected());
            0
        });
    }
    callback.add(recorder(&log, "c", 3));

    assert_eq!(callback.call(0), vec![1, 0, 3]);
    assert_eq!(callback.call(1), vec![1, 3]);
    assert_eq!(take(&log), vec!["a0", "once0", "c0", "a1", "c1"]);
}

#[test]
fn test_listener_added_mid_call_is_visited_once() {
    let log = new_log();
    let callback = Rc::new(Callback::<i32, i32>::new());
    let added = Rc::new(Cell::new(false));

    {
        let weak = Rc::downgrade(&callback);
        let log = log.clone();
        let added = added.clone();
        callback.add(move |arg| {
            if !added.replace(true) {
                if let Some(callback) = weak.upgrade() {
                    callback.add(recorder(&log, "late", 9));
                }
            }
            log.borrow_mut().push(format!("a{arg}"));
            1
        });
    }
    callback.add(recorder(&log, "b", 2));

    assert_eq!(callback.call(0), vec![1, 2, 9]);
    assert_eq!(take(&log), vec!["a0", "b0", "late0"]);

    assert_eq!(callback.call(1), vec![1, 2, 9]);
    assert_eq!(take(&log), vec!["a1", "b1", "late1"]);
}

#[test]
fn test_last_listener_adding_extends_the_same_call() {
    let log = new_log();
    let callback = Rc::new(Callback::<i32, i32>::new());
    let weak = Rc::downgrade(&callback);
    let inner_log = log.clone();

    callback.add_with_connection(move |mut connection, arg| {
        // Only once, then step aside.
        connection.disconnect();
        if let Some(callback) = weak.upgrade() {
            callback.add(recorder(&inner_log, "tail", 7));
        }
        inner_log.borrow_mut().push(format!("last{arg}"));
        0
    });

    assert_eq!(callback.call(0), vec![0, 7]);
    assert_eq!(take(&log), vec!["last0", "tail0"]);
}

#[test]
fn test_cancel_and_reregister_is_visited_at_the_tail() {
    let log = new_log();
    let callback = Rc::new(Callback::<i32, i32>::new());

    {
        let weak: Weak<Callback<i32, i32>> = Rc::downgrade(&callback);
        let log = log.clone();
        callback.add_with_connection(move |mut connection, arg| {
            log.borrow_mut().push(format!("a{arg}"));
            connection.disconnect();
            if let Some(callback) = weak.upgrade() {
                callback.add(recorder(&log, "a'", 10));
            }
            1
        });
    }
    callback.add(recorder(&log, "b", 2));
    callback.add(recorder(&log, "c", 3));

    assert_eq!(callback.call(0), vec![1, 2, 3, 10]);
    assert_eq!(take(&log), vec!["a0", "b0", "c0", "a'0"]);

    assert_eq!(callback.call(1), vec![2, 3, 10]);
    assert_eq!(take(&log), vec!["b1", "c1", "a'1"]);
}

#[test]
fn test_nested_call_completes_before_outer_resumes() {
    let log = new_log();
    let callback = Rc::new(Callback::<i32, i32>::new());
    let inner_results = Rc::new(RefCell::new(vec![]));

    {
        let weak = Rc::downgrade(&callback);
        let log = log.clone();
        let inner_results = inner_results.clone();
        callback.add(move |arg| {
            log.borrow_mut().push(format!("a{arg}"));
            if *arg == 0 {
                if let Some(callback) = weak.upgrade() {
                    assert_eq!(callback.call_depth(), 1);
                    *inner_results.borrow_mut() = callback.call(1);
                    assert_eq!(callback.call_depth(), 1);
                }
            }
            1
        });
    }
    callback.add(recorder(&log, "b", 2));
    callback.add(recorder(&log, "c", 3));

    assert_eq!(callback.call(0), vec![1, 2, 3]);
    assert_eq!(*inner_results.borrow(), vec![1, 2, 3]);
    assert_eq!(take(&log), vec!["a0", "a1", "b1", "c1", "b0", "c0"]);
    assert_eq!(callback.call_depth(), 0);
}

/// B is last. In the nested call it appends N, while both frames have run past B.
#[test]
fn test_append_in_nested_call_extends_both_calls() {
    let log = new_log();
    let callback = Rc::new(Callback::<i32, i32>::new());
    let inner_results = Rc::new(RefCell::new(vec![]));

    callback.add(recorder(&log, "a", 1));
    {
        let weak = Rc::downgrade(&callback);
        let log = log.clone();
        let inner_results = inner_results.clone();
        callback.add(move |arg| {
            log.borrow_mut().push(format!("b{arg}"));
            if let Some(callback) = weak.upgrade() {
                match *arg {
                    0 => *inner_results.borrow_mut() = callback.call(1),
                    1 => {
                        callback.add(recorder(&log, "n", 9));
                    }
                    _ => {}
                }
            }
            2
        });
    }

    assert_eq!(callback.call(0), vec![1, 2, 9]);
    assert_eq!(*inner_results.borrow(), vec![1, 2, 9]);
    assert_eq!(take(&log), vec!["a0", "b0", "a1", "b1", "n1", "n0"]);
    assert_eq!(callback.len(), 3);
}

#[test]
fn test_cancel_inside_nested_call_is_seen_by_outer_call() {
    let log = new_log();
    let callback = Rc::new(Callback::<i32, i32>::new());
    let c_id = Rc::new(Cell::new(ConnectionId::default()));

    {
        let weak = Rc::downgrade(&callback);
        let log = log.clone();
        callback.add(move |arg| {
            log.borrow_mut().push(format!("a{arg}"));
            if *arg == 0 {
                if let Some(callback) = weak.upgrade() {
                    callback.emit(1);
                }
            }
            1
        });
    }
    {
        let weak = Rc::downgrade(&callback);
        let b = recorder(&log, "b", 2);
        let c_id = c_id.clone();
        callback.add(move |arg| {
            if *arg == 1 {
                if let Some(callback) = weak.upgrade() {
                    callback.cancel(&c_id.get());
                }
            }
            b(arg)
        });
    }
    c_id.set(*callback.add(recorder(&log, "c", 3)).id());
    callback.add(recorder(&log, "d", 4));

    // Outer frame is parked on "b" while the nested call removes "c".
    assert_eq!(callback.call(0), vec![1, 2, 4]);
    assert_eq!(take(&log), vec!["a0", "a1", "b1", "d1", "b0", "d0"]);
}

#[test]
fn test_cancel_the_slot_the_outer_call_is_parked_on() {
    let log = new_log();
    let callback = Rc::new(Callback::<i32, i32>::new());
    let b_id = Rc::new(Cell::new(ConnectionId::default()));

    {
        let weak = Rc::downgrade(&callback);
        let log = log.clone();
        let b_id = b_id.clone();
        callback.add(move |arg| {
            log.borrow_mut().push(format!("a{arg}"));
            if *arg == 0 {
                if let Some(callback) = weak.upgrade() {
                    // Outer cursor is on "b". Remove it, then dispatch again.
                    callback.cancel(&b_id.get());
                    callback.emit(1);
                }
            }
            1
        });
    }
    b_id.set(*callback.add(recorder(&log, "b", 2)).id());
    callback.add(recorder(&log, "c", 3));

    assert_eq!(callback.call(0), vec![1, 3]);
    assert_eq!(take(&log), vec!["a0", "a1", "c1", "c0"]);
}

#[test]
fn test_clear_mid_call_stops_remaining_listeners() {
    let log = new_log();
    let callback = Rc::new(Callback::<i32, i32>::new());

    callback.add(recorder(&log, "a", 1));
    {
        let weak = Rc::downgrade(&callback);
        let b = recorder(&log, "b", 2);
        callback.add(move |arg| {
            if let Some(callback) = weak.upgrade() {
                callback.clear();
            }
            b(arg)
        });
    }
    callback.add(recorder(&log, "c", 3));

    assert_eq!(callback.call(0), vec![1, 2]);
    assert_eq!(take(&log), vec!["a0", "b0"]);
    assert!(callback.is_empty());
    assert_eq!(callback.call(1), Vec::<i32>::new());
}

/// A, B, C return 1, 2, 3. B cancels C the first time it runs.
#[test]
fn test_three_listeners_where_b_cancels_c() {
    let callback = Rc::new(Callback::<(), i32>::new());
    let c_id = Rc::new(Cell::new(ConnectionId::default()));

    callback.add(|_| 1);
    {
        let weak = Rc::downgrade(&callback);
        let c_id = c_id.clone();
        callback.add(move |_| {
            if let Some(callback) = weak.upgrade() {
                callback.cancel(&c_id.get());
            }
            2
        });
    }
    c_id.set(*callback.add(|_| 3).id());

    assert_eq!(callback.call(()), vec![1, 2]);
    assert_eq!(callback.call(()), vec![1, 2]);
}

#[test]
fn test_try_call_stops_at_first_error() {
    let log = new_log();
    let callback = Callback::<i32, Result<i32, String>>::new();

    {
        let log = log.clone();
        callback.add(move |arg| {
            log.borrow_mut().push(format!("ok{arg}"));
            Ok(1)
        });
    }
    let mut failing = callback.add(|arg| Err(format!("bad {arg}")));
    {
        let log = log.clone();
        callback.add(move |arg| {
            log.borrow_mut().push(format!("never{arg}"));
            Ok(3)
        });
    }

    let error = callback.try_call(5).unwrap_err();
    assert_eq!(error.id, *failing.id());
    assert_eq!(error.source, "bad 5");
    assert_eq!(take(&log), vec!["ok5"]);
    assert_eq!(callback.call_depth(), 0);

    failing.disconnect();
    assert_eq!(callback.try_call(6).unwrap(), vec![1, 3]);
    assert_eq!(take(&log), vec!["ok6", "never6"]);
}

#[test]
fn test_try_call_reports_id_of_self_cancelled_listener() {
    let callback = TrackedCallback::<(), Result<(), &'static str>>::new();
    callback.add(|_| Ok(()));
    let connection = callback.add_with_connection(|mut connection, _| {
        connection.disconnect();
        Err("gone")
    });
    let expected = ConnectionId::from(connection.id());

    let error: ListenerFailed<&'static str> = callback.try_call(()).unwrap_err();
    assert_eq!(error.id, expected);
    assert_eq!(error.id.value, 2);
    assert!(!connection.id().is_valid());
    assert_eq!(callback.len(), 1);
}

#[test]
fn test_try_call_error_inside_nested_call() {
    let callback = Rc::new(Callback::<u8, Result<u8, String>>::new());
    let nested_failed = Rc::new(Cell::new(false));

    {
        let weak = Rc::downgrade(&callback);
        let nested_failed = nested_failed.clone();
        callback.add(move |arg| {
            if *arg == 0 {
                if let Some(callback) = weak.upgrade() {
                    nested_failed.set(callback.try_call(1).is_err());
                    assert_eq!(callback.call_depth(), 1);
                }
            }
            Ok(*arg)
        });
    }
    callback.add(|arg| {
        if *arg == 1 {
            Err("nested".to_string())
        } else {
            Ok(10)
        }
    });

    assert_eq!(callback.try_call(0).unwrap(), vec![0, 10]);
    assert!(nested_failed.get());
    assert_eq!(callback.call_depth(), 0);
}
