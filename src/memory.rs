//! # Memory and the Memory Bus
//!
//! The CPU reaches memory through the [`MemoryBus`] trait, so tests can hand it
//! a plain store and a host can hand it one that notifies a display.
//!
//! [`Memory`] is the store used by the simulator. It is logically an array of
//! `address_mask + 1` cells, each holding a value no wider than the data mask.
//! The 16- and 32-bit profiles span four billion cells, so storage is sparse:
//! fixed-size pages are allocated on first write and unwritten cells read as 0.
//!
//! Writes through [`Memory::store`] that land in the frame-buffer window
//! (`0x200..=0x5FF`) are reported to an optional [`WriteObserver`].

use std::collections::HashMap;
use std::fmt;
use std::fmt::Write as _;

use crate::width::WidthProfile;

/// First cell of the 32x32 frame buffer.
pub const FRAME_BUFFER_START: u32 = 0x200;

/// Last cell of the 32x32 frame buffer.
pub const FRAME_BUFFER_END: u32 = 0x5FF;

/// Side length of the square display in pixels.
pub const DISPLAY_SIDE: u32 = 32;

/// Zero-page cell refreshed with a random value before every instruction.
pub const RANDOM_CELL: u32 = 0xFE;

/// Zero-page cell receiving the last key pressed on the host.
pub const KEYPRESS_CELL: u32 = 0xFF;

const PAGE_BITS: u32 = 12;
const PAGE_CELLS: usize = 1 << PAGE_BITS;
const PAGE_OFFSET_MASK: u32 = (1 << PAGE_BITS) - 1;

/// Memory bus trait for the CPU to read and write cells.
///
/// Addresses and values are `u32` so one trait serves every bus width.
/// Implementations mask addresses to their profile's address mask and values
/// to its data mask.
///
/// # Examples
///
/// ```
/// use sim6502::{Memory, MemoryBus, WidthProfile};
///
/// let mut mem = Memory::new(WidthProfile::eight_bit());
/// mem.write(0x1234, 0x42);
/// assert_eq!(mem.read(0x1234), 0x42);
///
/// // values are masked to the data width
/// mem.write(0x1235, 0x1FF);
/// assert_eq!(mem.read(0x1235), 0xFF);
/// ```
pub trait MemoryBus {
    /// The width profile this bus was built for.
    fn profile(&self) -> WidthProfile;

    /// Reads the cell at `addr`. Must never panic.
    fn read(&self, addr: u32) -> u32;

    /// Writes `value` to the cell at `addr`. Must never panic.
    fn write(&mut self, addr: u32, value: u32);

    /// Reads a little-endian word: `lo | hi << data_width`.
    ///
    /// On the 32-bit profile a word is a single cell.
    fn read_word(&self, addr: u32) -> u32 {
        let profile = self.profile();
        if profile.data_width() >= 32 {
            return self.read(addr);
        }

        let lo = self.read(addr);
        let hi = self.read(addr.wrapping_add(1) & profile.address_mask());
        (lo | (hi << profile.data_width())) & profile.address_mask()
    }
}

/// Receives a callback for every store into the frame-buffer window.
///
/// Any `FnMut(u32, u32)` closure is an observer.
pub trait WriteObserver {
    fn cell_written(&mut self, address: u32, value: u32);
}

impl<F: FnMut(u32, u32)> WriteObserver for F {
    fn cell_written(&mut self, address: u32, value: u32) {
        self(address, value)
    }
}

/// Sparse, width-aware cell store.
///
/// # Examples
///
/// ```
/// use sim6502::{Memory, WidthProfile};
///
/// let mut mem = Memory::new(WidthProfile::new(16).unwrap());
/// mem.store(0x1_0000, 0xBEEF);
/// assert_eq!(mem.get(0x1_0000), 0xBEEF);
/// assert_eq!(mem.get(0xFFFF_FFFF), 0);
/// ```
pub struct Memory {
    profile: WidthProfile,
    pages: HashMap<u32, Box<[u32; PAGE_CELLS]>>,
    observer: Option<Box<dyn WriteObserver>>,
}

impl Memory {
    /// Creates an empty memory for `profile`. Every cell reads 0.
    pub fn new(profile: WidthProfile) -> Self {
        Self {
            profile,
            pages: HashMap::new(),
            observer: None,
        }
    }

    /// Installs the frame-buffer write observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: Box<dyn WriteObserver>) {
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    pub fn profile(&self) -> WidthProfile {
        self.profile
    }

    /// Reads the cell at `addr` (masked to the address mask).
    pub fn get(&self, addr: u32) -> u32 {
        let addr = addr & self.profile.address_mask();
        self.pages
            .get(&(addr >> PAGE_BITS))
            .map(|page| page[(addr & PAGE_OFFSET_MASK) as usize])
            .unwrap_or(0)
    }

    /// Reads a little-endian pair of cells. A single cell on the 32-bit profile.
    pub fn get_word(&self, addr: u32) -> u32 {
        self.read_word(addr)
    }

    /// Writes a cell without notifying the observer.
    pub fn set(&mut self, addr: u32, value: u32) {
        let addr = addr & self.profile.address_mask();
        let value = value & self.profile.data_mask();
        let page_index = addr >> PAGE_BITS;

        if value == 0 && !self.pages.contains_key(&page_index) {
            return;
        }

        let page = self
            .pages
            .entry(page_index)
            .or_insert_with(|| Box::new([0; PAGE_CELLS]));
        page[(addr & PAGE_OFFSET_MASK) as usize] = value;
    }

    /// Masks `value` to the data width, writes it and notifies the observer
    /// when `addr` falls inside the frame buffer.
    pub fn store(&mut self, addr: u32, value: u32) {
        let addr = addr & self.profile.address_mask();
        let value = value & self.profile.data_mask();
        self.set(addr, value);

        if (FRAME_BUFFER_START..=FRAME_BUFFER_END).contains(&addr) {
            if let Some(observer) = self.observer.as_mut() {
                observer.cell_written(addr, value);
            }
        }
    }

    /// Stores a run of cells starting at `start`.
    pub fn load(&mut self, start: u32, cells: &[u32]) {
        let mut addr = start;
        for &cell in cells {
            self.store(addr, cell);
            addr = addr.wrapping_add(1) & self.profile.address_mask();
        }
    }

    /// Zeroes every cell in `start..=end` without notifying the observer.
    pub fn clear_range(&mut self, start: u32, end: u32) {
        let start = start & self.profile.address_mask();
        let end = end & self.profile.address_mask();
        if start > end {
            return;
        }

        let first_page = start >> PAGE_BITS;
        let last_page = end >> PAGE_BITS;
        let indices: Vec<u32> = self
            .pages
            .keys()
            .copied()
            .filter(|index| (first_page..=last_page).contains(index))
            .collect();

        for index in indices {
            let page_start = index << PAGE_BITS;
            let page_end = page_start | PAGE_OFFSET_MASK;
            if start <= page_start && page_end <= end {
                self.pages.remove(&index);
            } else if let Some(page) = self.pages.get_mut(&index) {
                let from = start.max(page_start) & PAGE_OFFSET_MASK;
                let to = end.min(page_end) & PAGE_OFFSET_MASK;
                page[from as usize..=to as usize].fill(0);
            }
        }
    }

    /// Drops every cell.
    pub fn clear(&mut self) {
        self.pages.clear();
    }

    /// Formats `length` cells from `start` as a hex listing, 16 cells per line.
    ///
    /// ```
    /// use sim6502::{Memory, WidthProfile};
    ///
    /// let mut mem = Memory::new(WidthProfile::eight_bit());
    /// mem.load(0x600, &[0xA9, 0x01]);
    /// assert_eq!(mem.format_dump(0x600, 3), "0600: A9 01 00");
    /// ```
    pub fn format_dump(&self, start: u32, length: u32) -> String {
        let address_digits = self.profile.address_digits();
        let data_digits = self.profile.data_digits();
        let mut out = String::new();

        for offset in 0..length {
            let addr = start.wrapping_add(offset) & self.profile.address_mask();
            if offset % 16 == 0 {
                if offset > 0 {
                    out.push('\n');
                }
                let _ = write!(out, "{:0width$X}:", addr, width = address_digits);
            }
            let _ = write!(out, " {:0width$X}", self.get(addr), width = data_digits);
        }

        out
    }
}

impl MemoryBus for Memory {
    fn profile(&self) -> WidthProfile {
        self.profile
    }

    fn read(&self, addr: u32) -> u32 {
        self.get(addr)
    }

    fn write(&mut self, addr: u32, value: u32) {
        self.store(addr, value);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(WidthProfile::eight_bit())
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("profile", &self.profile)
            .field("pages", &self.pages.len())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Maps a frame-buffer address to its `(x, y)` pixel on the 32x32 display.
///
/// Returns `None` outside the frame buffer.
pub fn pixel_coordinates(addr: u32) -> Option<(u32, u32)> {
    if !(FRAME_BUFFER_START..=FRAME_BUFFER_END).contains(&addr) {
        return None;
    }
    let offset = addr - FRAME_BUFFER_START;
    Some((offset % DISPLAY_SIDE, offset / DISPLAY_SIDE))
}

/// Palette entry used for a frame-buffer cell value.
pub fn palette_index(value: u32) -> u8 {
    (value & 0x0F) as u8
}
