//! 32-bit x86 two-level paging without PAE: a page directory of 1024 entries,
//! each either a 4 MiB page or a pointer to a page table of 1024 4 KiB pages.

/// Small page size in bytes (4 KiB).
pub const PAGE_SIZE: usize = 4096;
/// Large page size in bytes (4 MiB).
pub const LARGE_PAGE_SIZE: usize = 4 << 20;
/// Entries per directory or table.
pub const ENTRY_COUNT: usize = 1024;

/// Entry flag bits shared by directory and table entries.
pub const PTE_PRESENT: u32 = 1 << 0;
pub const PTE_WRITABLE: u32 = 1 << 1;
pub const PTE_USER: u32 = 1 << 2;
/// Directory entries only: maps a 4 MiB page instead of a table.
pub const PDE_LARGE: u32 = 1 << 7;

const SMALL_FRAME_MASK: u32 = 0xffff_f000;
const LARGE_FRAME_MASK: u32 = 0xffc0_0000;

/// Permission descriptor for a mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagePerms {
    pub write: bool,
    pub user: bool,
}

impl PagePerms {
    pub const fn new(write: bool, user: bool) -> Self {
        Self { write, user }
    }

    pub const fn user_rw() -> Self {
        Self::new(true, true)
    }

    pub const fn kernel_rw() -> Self {
        Self::new(true, false)
    }

    const fn to_flags(self) -> u32 {
        let mut flags = PTE_PRESENT;
        if self.write {
            flags |= PTE_WRITABLE;
        }
        if self.user {
            flags |= PTE_USER;
        }
        flags
    }
}

/// One raw directory or table entry.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Entry(u32);

impl Entry {
    pub const EMPTY: Entry = Entry(0);

    /// A 4 KiB page, or a directory entry pointing at a page table.
    pub const fn small(frame: u32, perms: PagePerms) -> Self {
        Self((frame & SMALL_FRAME_MASK) | perms.to_flags())
    }

    /// A 4 MiB directory entry.
    pub const fn large(frame: u32, perms: PagePerms) -> Self {
        Self((frame & LARGE_FRAME_MASK) | perms.to_flags() | PDE_LARGE)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_present(self) -> bool {
        self.0 & PTE_PRESENT != 0
    }

    pub const fn is_large(self) -> bool {
        self.0 & PDE_LARGE != 0
    }

    pub const fn is_user(self) -> bool {
        self.0 & PTE_USER != 0
    }

    pub const fn is_writable(self) -> bool {
        self.0 & PTE_WRITABLE != 0
    }

    /// Physical base this entry refers to.
    pub const fn frame(self) -> u32 {
        if self.is_large() {
            self.0 & LARGE_FRAME_MASK
        } else {
            self.0 & SMALL_FRAME_MASK
        }
    }
}

impl core::fmt::Debug for Entry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Entry({:#010x})", self.0)
    }
}

/// A page directory or page table. Both share the same layout and must sit
/// on a page boundary.
#[repr(C, align(4096))]
#[derive(Clone)]
pub struct PageTable {
    entries: [Entry; ENTRY_COUNT],
}

impl PageTable {
    pub const fn new() -> Self {
        Self {
            entries: [Entry::EMPTY; ENTRY_COUNT],
        }
    }

    pub fn get(&self, index: usize) -> Entry {
        self.entries[index]
    }

    pub fn set(&mut self, index: usize, entry: Entry) {
        self.entries[index] = entry;
    }

    pub fn clear(&mut self, index: usize) {
        self.entries[index] = Entry::EMPTY;
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::new()
    }
}

pub const fn directory_index(va: u32) -> usize {
    (va >> 22) as usize
}

pub const fn table_index(va: u32) -> usize {
    ((va >> 12) & 0x3ff) as usize
}

/// Resolves the table a directory entry points at.
///
/// The walker never dereferences physical addresses itself; whoever owns the
/// tables maps a frame back to the table it allocated.
pub trait TableLookup {
    fn table(&self, frame: u32) -> Option<&PageTable>;
}

/// Walks `directory` for `va`. With `user` set, every level must carry the
/// user bit, exactly as the MMU checks a ring-3 access.
pub fn translate<T: TableLookup + ?Sized>(
    directory: &PageTable,
    tables: &T,
    va: u32,
    user: bool,
) -> Option<u32> {
    let pde = directory.get(directory_index(va));
    if !pde.is_present() || (user && !pde.is_user()) {
        return None;
    }
    if pde.is_large() {
        return Some(pde.frame() | (va & (LARGE_PAGE_SIZE as u32 - 1)));
    }

    let table = tables.table(pde.frame())?;
    let pte = table.get(table_index(va));
    if !pte.is_present() || (user && !pte.is_user()) {
        return None;
    }
    Some(pte.frame() | (va & (PAGE_SIZE as u32 - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct One(u32, PageTable);

    impl TableLookup for One {
        fn table(&self, frame: u32) -> Option<&PageTable> {
            (frame == self.0).then_some(&self.1)
        }
    }

    #[test]
    fn walks_large_and_small_pages() {
        let mut dir = PageTable::new();
        dir.set(32, Entry::large(0x0080_0000, PagePerms::user_rw()));
        dir.set(0, Entry::small(0x0010_0000, PagePerms::kernel_rw()));

        let mut low = PageTable::new();
        low.set(0xb8, Entry::small(0x000b_9000, PagePerms::kernel_rw()));
        let tables = One(0x0010_0000, low);

        assert_eq!(translate(&dir, &tables, 0x0804_8010, true), Some(0x0084_8010));
        assert_eq!(translate(&dir, &tables, 0x000b_8004, false), Some(0x000b_9004));
        // Supervisor-only page is invisible to user accesses.
        assert_eq!(translate(&dir, &tables, 0x000b_8004, true), None);
        assert_eq!(translate(&dir, &tables, 0x0c00_0000, false), None);
    }

    #[test]
    fn entry_encoding() {
        let e = Entry::large(0x00c1_2345, PagePerms::user_rw());
        assert_eq!(e.raw(), 0x00c0_0000 | PDE_LARGE | PTE_USER | PTE_WRITABLE | PTE_PRESENT);
        assert!(e.is_large() && e.is_user() && e.is_writable());
        assert_eq!(Entry::small(0xb8123, PagePerms::kernel_rw()).frame(), 0xb8000);
    }
}
