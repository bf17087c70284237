mod common;

use common::*;
use kernel::{Config, DisplayWindow, Error, Hardware};

#[test]
fn switching_foreground_swaps_screen_contents() {
    let mut k = boot();
    k.hw_mut().poke(Config::VIDEO_PHYS, b"tty0 text");
    k.hw_mut().poke(Config::backing_frame(term(1)), b"tty1 text");

    assert_eq!(k.switch_foreground(term(1)), Ok(()));
    assert_eq!(k.hw().peek(Config::VIDEO_PHYS, 9), b"tty1 text");
    assert_eq!(k.hw().peek(Config::backing_frame(term(0)), 9), b"tty0 text");
    assert_eq!(k.foreground_terminal(), term(1));
    assert_eq!(foreground_count(&k), 1);
}

#[test]
fn switching_to_current_foreground_is_a_no_op() {
    let mut k = boot();
    k.hw_mut().poke(Config::VIDEO_PHYS, b"keep");
    let loads = k.hw().directory_loads.len();
    assert_eq!(k.switch_foreground(term(0)), Ok(()));
    assert_eq!(k.hw().peek(Config::VIDEO_PHYS, 4), b"keep");
    assert_eq!(k.hw().directory_loads.len(), loads);
    assert_eq!(k.switch_foreground(term(3)), Err(Error::InvalidArgument));
}

#[test]
fn display_window_tracks_the_scheduled_terminal() {
    let mut k = boot();
    tick(&mut k);
    assert_eq!(k.spaces().window(), DisplayWindow::Visible);
    tick(&mut k);
    assert_eq!(k.spaces().window(), DisplayWindow::Backing(term(1)));
    tick(&mut k);
    assert_eq!(k.spaces().window(), DisplayWindow::Backing(term(2)));

    k.switch_foreground(term(2)).unwrap();
    assert_eq!(k.spaces().window(), DisplayWindow::Visible);
    assert!(k.hw().interrupts_enabled());

    tick(&mut k);
    assert_eq!(k.spaces().window(), DisplayWindow::Backing(term(0)));
}

#[test]
fn exactly_one_foreground_throughout() {
    let mut k = boot();
    for round in 0..12 {
        tick(&mut k);
        if round % 4 == 3 {
            k.switch_foreground(term(round % 3)).unwrap();
        }
        assert_eq!(foreground_count(&k), 1);
    }
}

#[test]
fn one_terminal_rotates_onto_itself() {
    let config = kernel::KernelConfig {
        terminal_count: 1,
        ..kernel::KernelConfig::default()
    };
    let mut k = boot_with(config, leak(standard_files()));
    assert_eq!(tick(&mut k).slot, slot(0));
    let again = tick(&mut k);
    assert_eq!(again.slot, slot(0));
    assert_eq!(k.live_count(), 1);
    assert_eq!(k.spaces().window(), DisplayWindow::Visible);
}

#[test]
fn echo_reaches_the_screen_while_a_background_terminal_runs() {
    let mut k = boot();
    tick(&mut k);
    tick(&mut k);
    assert_eq!(k.spaces().window(), DisplayWindow::Backing(term(1)));
    let loads = k.hw().directory_loads.len();

    k.keyboard_input(b'x');
    assert_eq!(
        k.console().last_window(),
        Some((term(0), DisplayWindow::Visible))
    );
    assert_eq!(k.spaces().window(), DisplayWindow::Backing(term(1)));
    assert_eq!(k.hw().directory_loads.len(), loads + 2);
    assert!(k.hw().interrupts_enabled());

    // Output from the running process still goes to its own copy.
    k.write(1, b"bg").unwrap();
    assert_eq!(
        k.console().last_window(),
        Some((term(1), DisplayWindow::Backing(term(1))))
    );
}

#[test]
fn echo_in_front_leaves_the_mapping_alone() {
    let mut k = boot();
    tick(&mut k);
    let loads = k.hw().directory_loads.len();
    k.keyboard_input(b'x');
    assert_eq!(
        k.console().last_window(),
        Some((term(0), DisplayWindow::Visible))
    );
    assert_eq!(k.hw().directory_loads.len(), loads);
}

#[test]
fn foreground_switch_follows_the_process_on_the_cpu() {
    let config = kernel::KernelConfig {
        process_capacity: 3,
        ..kernel::KernelConfig::default()
    };
    let mut k = boot_with(config, leak(standard_files()));
    tick(&mut k);
    execute(&mut k, "testprog");
    execute(&mut k, "testprog");
    assert_eq!(k.live_count(), 3);

    // No slot is left for terminal 1's shell, so the tick hands the cpu
    // back to the process on terminal 0.
    let back = tick(&mut k);
    assert_eq!(back.slot, slot(2));
    assert_eq!(k.current_terminal(), term(1));
    assert_eq!(k.spaces().window(), DisplayWindow::Visible);

    k.switch_foreground(term(2)).unwrap();
    assert_eq!(k.spaces().window(), DisplayWindow::Backing(term(0)));
    k.write(1, b"still tty0").unwrap();
    assert_eq!(
        k.console().last_window(),
        Some((term(0), DisplayWindow::Backing(term(0))))
    );

    k.switch_foreground(term(0)).unwrap();
    assert_eq!(k.spaces().window(), DisplayWindow::Visible);
}
