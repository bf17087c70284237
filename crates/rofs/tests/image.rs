use rofs::{BLOCK_SIZE, FileSystem, FileType, FsError, Image, ImageBuilder, MAX_DATA_BLOCKS};

fn sample() -> Vec<u8> {
    let big: Vec<u8> = (0..BLOCK_SIZE + 100).map(|i| (i % 251) as u8).collect();
    ImageBuilder::new()
        .directory(".")
        .rtc("rtc")
        .file("frame0.txt", b"/\\/\\/\\ fish\n")
        .file("big", &big)
        .file("verylargetextwithverylongname.tx", b"long")
        .build()
        .unwrap()
}

#[test]
fn lookup_finds_each_kind() {
    let bytes = sample();
    let fs = Image::new(&bytes).unwrap();

    assert_eq!(fs.lookup(b".").unwrap().kind, FileType::Directory);
    assert_eq!(fs.lookup(b"rtc").unwrap().kind, FileType::Rtc);
    let file = fs.lookup(b"frame0.txt").unwrap();
    assert_eq!(file.kind, FileType::Regular);
    assert_eq!(fs.file_len(file.inode).unwrap(), 12);
    assert!(fs.lookup(b"frame0").is_none());
    assert!(fs.lookup(b"").is_none());
}

#[test]
fn full_width_names_match_exactly() {
    let bytes = sample();
    let fs = Image::new(&bytes).unwrap();

    let name = b"verylargetextwithverylongname.tx";
    assert_eq!(name.len(), 32);
    assert_eq!(fs.lookup(name).unwrap().name(), name);
    assert!(fs.lookup(b"verylargetextwithverylongname.txt").is_none());
}

#[test]
fn reads_across_block_boundary() {
    let bytes = sample();
    let fs = Image::new(&bytes).unwrap();
    let inode = fs.lookup(b"big").unwrap().inode;

    let mut buf = [0u8; 200];
    let n = fs.read(inode, (BLOCK_SIZE - 50) as u32, &mut buf).unwrap();
    assert_eq!(n, 150);
    for (k, b) in buf[..n].iter().enumerate() {
        assert_eq!(*b, ((BLOCK_SIZE - 50 + k) % 251) as u8);
    }

    assert_eq!(fs.read(inode, (BLOCK_SIZE + 100) as u32, &mut buf).unwrap(), 0);
}

#[test]
fn directory_entries_in_order() {
    let bytes = sample();
    let fs = Image::new(&bytes).unwrap();

    let names: Vec<Vec<u8>> = (0..)
        .map_while(|i| fs.entry(i))
        .map(|d| d.name().to_vec())
        .collect();
    assert_eq!(names.len(), 5);
    assert_eq!(names[0], b".");
    assert_eq!(names[3], b"big");
}

#[test]
fn rejects_bad_references() {
    let bytes = sample();
    let fs = Image::new(&bytes).unwrap();
    let mut buf = [0u8; 4];

    assert_eq!(fs.read(99, 0, &mut buf), Err(FsError::BadInode(99)));
    assert_eq!(fs.file_len(3), Err(FsError::BadInode(3)));
}

#[test]
fn rejects_truncated_images() {
    let bytes = sample();
    assert!(matches!(Image::new(&bytes[..100]), Err(FsError::Truncated(100))));
    assert!(matches!(
        Image::new(&bytes[..bytes.len() - 1]),
        Err(FsError::Truncated(_))
    ));
}

#[test]
fn oversized_inode_length_is_an_error() {
    let mut bytes = sample();
    // Inode 0 lives in block 1; its first word is the length.
    let len = 5 * 1024 * 1024u32;
    bytes[BLOCK_SIZE..BLOCK_SIZE + 4].copy_from_slice(&len.to_le_bytes());
    let fs = Image::new(&bytes).unwrap();

    let bad = FsError::BadLength { inode: 0, len };
    assert_eq!(fs.file_len(0), Err(bad));
    let mut buf = [0u8; 64];
    assert_eq!(fs.read(0, (MAX_DATA_BLOCKS * BLOCK_SIZE) as u32, &mut buf), Err(bad));
    assert_eq!(fs.read(0, 0, &mut buf), Err(bad));

    let inode = fs.lookup(b"big").unwrap().inode;
    assert_eq!(fs.file_len(inode).unwrap(), (BLOCK_SIZE + 100) as u32);
}
