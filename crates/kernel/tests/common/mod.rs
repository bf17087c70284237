#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;

use kernel::{
    Console, DisplayWindow, Hardware, Kernel, KernelConfig, ProcessSlot, Resume, Switch,
    TerminalId,
};
use rofs::{Image, ImageBuilder};
use types::mmu::PAGE_SIZE;
use types::{EXEC_MAGIC, PROGRAM_LOAD_VA, PageTable};

/// Entry address baked into every test program.
pub const ENTRY: u32 = PROGRAM_LOAD_VA + 0x40;
/// User address well clear of the loaded image, for syscall buffers.
pub const SCRATCH: u32 = 0x0810_0000;

pub const FRAME0: &[u8] = b"/\\/\\/\\ <>< fish\n      <>< fish\n";

/// A CPU with sparse physical memory that records every privileged write.
pub struct Machine {
    pages: HashMap<u32, Box<[u8; PAGE_SIZE]>>,
    pub directory_loads: Vec<u32>,
    pub kernel_stacks: Vec<u32>,
    esp0: u32,
    interrupts: bool,
    next_frame_pointer: Cell<u32>,
    next_table: u32,
}

impl Machine {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            directory_loads: Vec::new(),
            kernel_stacks: Vec::new(),
            esp0: 0,
            interrupts: true,
            next_frame_pointer: Cell::new(0x007f_f000),
            next_table: 0x0030_0000,
        }
    }

    pub fn peek(&self, addr: u32, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        self.read_phys(addr, &mut out);
        out
    }

    pub fn poke(&mut self, addr: u32, data: &[u8]) {
        self.write_phys(addr, data);
    }
}

impl Hardware for Machine {
    fn table_frame(&mut self, _table: *const PageTable) -> u32 {
        let frame = self.next_table;
        self.next_table += PAGE_SIZE as u32;
        frame
    }

    fn load_page_directory(&mut self, frame: u32) {
        self.directory_loads.push(frame);
    }

    fn set_kernel_stack(&mut self, top: u32) {
        self.esp0 = top;
        self.kernel_stacks.push(top);
    }

    fn kernel_stack(&self) -> u32 {
        self.esp0
    }

    fn frame_pointer(&self) -> u32 {
        let fp = self.next_frame_pointer.get();
        self.next_frame_pointer.set(fp - 0x20);
        fp
    }

    fn interrupts_enabled(&self) -> bool {
        self.interrupts
    }

    fn disable_interrupts(&mut self) {
        self.interrupts = false;
    }

    fn enable_interrupts(&mut self) {
        self.interrupts = true;
    }

    fn read_phys(&self, addr: u32, buf: &mut [u8]) {
        for (i, b) in buf.iter_mut().enumerate() {
            let at = addr + i as u32;
            let page = at & !(PAGE_SIZE as u32 - 1);
            *b = self
                .pages
                .get(&page)
                .map_or(0, |p| p[(at - page) as usize]);
        }
    }

    fn write_phys(&mut self, addr: u32, data: &[u8]) {
        for (i, b) in data.iter().enumerate() {
            let at = addr + i as u32;
            let page = at & !(PAGE_SIZE as u32 - 1);
            let frame = self
                .pages
                .entry(page)
                .or_insert_with(|| Box::new([0u8; PAGE_SIZE]));
            frame[(at - page) as usize] = *b;
        }
    }
}

/// Collects what each terminal printed, and where the text-buffer page
/// pointed for every write.
#[derive(Default)]
pub struct Screens {
    text: HashMap<TerminalId, Vec<u8>>,
    pub windows: Vec<(TerminalId, DisplayWindow)>,
}

impl Screens {
    pub fn last_window(&self) -> Option<(TerminalId, DisplayWindow)> {
        self.windows.last().copied()
    }

    pub fn text(&self, terminal: usize) -> Vec<u8> {
        self.text
            .get(&TerminalId::new(terminal))
            .cloned()
            .unwrap_or_default()
    }
}

impl Console for Screens {
    fn write(&mut self, terminal: TerminalId, window: DisplayWindow, bytes: &[u8]) {
        self.windows.push((terminal, window));
        self.text.entry(terminal).or_default().extend_from_slice(bytes);
    }
}

pub type TestKernel = Kernel<Machine, Image<'static>, Screens>;

/// An executable image whose body is `body`.
pub fn program(body: &[u8]) -> Vec<u8> {
    let mut image = vec![0u8; 28];
    image[..4].copy_from_slice(&EXEC_MAGIC);
    image[24..28].copy_from_slice(&ENTRY.to_le_bytes());
    image.extend_from_slice(body);
    image
}

pub fn leak(builder: ImageBuilder) -> Image<'static> {
    let bytes = builder.build().unwrap();
    Image::new(Box::leak(bytes.into_boxed_slice())).unwrap()
}

pub fn standard_files() -> ImageBuilder {
    ImageBuilder::new()
        .directory(".")
        .rtc("rtc")
        .file("shell", &program(b"shell body"))
        .file("testprog", &program(b"testprog body"))
        .file("frame0.txt", FRAME0)
        .file("notexec", b"plain text, long enough to hold a header")
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn boot() -> TestKernel {
    boot_with(KernelConfig::default(), leak(standard_files()))
}

pub fn boot_with(config: KernelConfig, fs: Image<'static>) -> TestKernel {
    init_logging();
    Kernel::new(Machine::new(), fs, Screens::default(), config).unwrap()
}

/// Completes a transfer the way the CPU would: the new context runs with
/// interrupts enabled.
pub fn enter(k: &mut TestKernel, resume: Resume) -> Switch {
    let switch = resume
        .switch()
        .unwrap_or_else(|| panic!("expected a context switch, got {resume:?}"));
    k.hw_mut().enable_interrupts();
    switch
}

pub fn tick(k: &mut TestKernel) -> Switch {
    let resume = k.timer_tick();
    enter(k, resume)
}

pub fn execute(k: &mut TestKernel, command: &str) -> Switch {
    let switch = k.execute(command.as_bytes()).unwrap();
    k.hw_mut().enable_interrupts();
    switch
}

pub fn slot(n: usize) -> ProcessSlot {
    ProcessSlot::new(n)
}

pub fn term(n: usize) -> TerminalId {
    TerminalId::new(n)
}

pub fn foreground_count(k: &TestKernel) -> usize {
    k.terminals()
        .ids()
        .filter(|&t| k.terminals().get(t).is_foreground)
        .count()
}
