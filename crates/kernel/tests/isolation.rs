mod common;

use common::*;
use kernel::{Config, Error};
use types::{EXEC_MAGIC, PROGRAM_LOAD_VA, USER_BASE, USER_END};

#[test]
fn marker_is_private_to_its_process() {
    let mut k = boot();
    tick(&mut k);
    k.copy_to_user(SCRATCH, b"MARK").unwrap();

    tick(&mut k);
    let mut seen = [0u8; 4];
    k.copy_from_user(SCRATCH, &mut seen).unwrap();
    assert_ne!(&seen, b"MARK");

    tick(&mut k);
    tick(&mut k);
    assert_eq!(k.current(), Some(slot(0)));
    k.copy_from_user(SCRATCH, &mut seen).unwrap();
    assert_eq!(&seen, b"MARK");
}

#[test]
fn each_process_gets_its_own_frame() {
    let mut k = boot();
    for _ in 0..3 {
        tick(&mut k);
    }
    let offset = PROGRAM_LOAD_VA - USER_BASE;
    for n in 0..3 {
        let image = k.hw().peek(Config::user_frame(slot(n)) + offset, 4);
        assert_eq!(image, EXEC_MAGIC);
    }

    let mut head = [0u8; 4];
    k.copy_from_user(PROGRAM_LOAD_VA, &mut head).unwrap();
    assert_eq!(head, EXEC_MAGIC);
}

#[test]
fn user_copies_stay_inside_the_user_region() {
    let mut k = boot();
    tick(&mut k);

    assert_eq!(k.copy_to_user(0x0010_0000, b"x"), Err(Error::InvalidArgument));
    assert_eq!(k.copy_to_user(USER_END - 2, b"xyz"), Err(Error::InvalidArgument));
    assert_eq!(k.copy_to_user(USER_END - 3, b"xyz"), Ok(()));
    let mut buf = [0u8; 8];
    assert_eq!(k.copy_from_user(USER_BASE - 4, &mut buf), Err(Error::InvalidArgument));
}

#[test]
fn kernel_memory_is_not_user_visible() {
    let mut k = boot();
    tick(&mut k);
    let spaces = k.spaces();

    assert_eq!(spaces.translate(Config::VIDEO_PHYS, true), None);
    assert_eq!(spaces.translate(Config::KERNEL_PHYS_BASE, true), None);
    assert_eq!(spaces.translate(Config::user_frame(slot(1)), true), None);
    assert_eq!(
        spaces.translate(Config::KERNEL_PHYS_BASE + 0x10, false),
        Some(Config::KERNEL_PHYS_BASE + 0x10)
    );
    // Page 0 stays unmapped so null dereferences fault.
    assert_eq!(spaces.translate(0x10, false), None);
}

#[test]
fn every_switch_reloads_the_directory() {
    let mut k = boot();
    let before = k.hw().directory_loads.len();
    tick(&mut k);
    assert!(k.hw().directory_loads.len() > before);

    let before = k.hw().directory_loads.len();
    execute(&mut k, "testprog");
    assert!(k.hw().directory_loads.len() > before);
    assert!(
        k.hw()
            .directory_loads
            .iter()
            .all(|&frame| frame == k.spaces().directory_frame())
    );
}
