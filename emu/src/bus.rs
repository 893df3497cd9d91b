//! # Address-Space Backends
//!
//! Each core sees a flat 32-bit virtual address space assembled from the
//! console's physical regions. The two layouts are independent
//! implementations of the [`Bus`] capability; main RAM and the shared
//! work RAM are the only regions both cores map, and those are reference
//! counted and locked so the cores can run on separate threads.
//!
//! An address no region claims is a hard error: guests reading from the
//! void get a diagnosable access fault, never silent zeroes.

use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Fatal access fault: no byte exists behind this address.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("access to unmapped address 0x{address:08X}")]
pub struct UnmappedAccess {
    pub address: u32,
}

/// A RAM region shared between the two cores.
pub type SharedRam = Arc<Mutex<Vec<u8>>>;

#[must_use]
pub fn shared_ram(len: usize) -> SharedRam {
    Arc::new(Mutex::new(vec![0; len]))
}

pub const ITCM_BASE: u32 = 0x0000_0000;
pub const ITCM_MIRROR_BASE: u32 = 0x1000_0000;
pub const ITCM_SIZE: usize = 0x8000;

/// Default DTCM base; relocatable per bus instance.
pub const DEFAULT_DTCM_BASE: u32 = 0x027C_0000;
pub const DTCM_SIZE: usize = 0x4000;

pub const MAIN_RAM_BASE: u32 = 0x0200_0000;
pub const MAIN_RAM_SIZE: usize = 0x40_0000;

pub const SHARED_WRAM_BASE: u32 = 0x0300_0000;
pub const SHARED_WRAM_SIZE: usize = 0x8000;

pub const IO_BASE: u32 = 0x0400_0000;
pub const IO_SIZE: usize = 0x1100;

pub const PALETTE_BASE: u32 = 0x0500_0000;
pub const PALETTE_SIZE: usize = 0x800;

pub const OAM_BASE: u32 = 0x0700_0000;
pub const OAM_SIZE: usize = 0x800;

pub const ARM9_BIOS_BASE: u32 = 0xFFFF_0000;
pub const ARM9_BIOS_SIZE: usize = 0x8000;

pub const ARM7_BIOS_BASE: u32 = 0x0000_0000;
pub const ARM7_BIOS_SIZE: usize = 0x4000;

pub const ARM7_WRAM_BASE: u32 = 0x0380_0000;
pub const ARM7_WRAM_SIZE: usize = 0x1_0000;

/// Byte-addressable virtual address space of one core.
///
/// Implementations resolve an address to a region; the provided helpers
/// build the little-endian multi-byte accesses on top.
pub trait Bus {
    /// # Errors
    ///
    /// [`UnmappedAccess`] when no region claims the address.
    fn read_byte(&self, address: u32) -> Result<u8, UnmappedAccess>;

    /// # Errors
    ///
    /// [`UnmappedAccess`] when no region claims the address.
    fn write_byte(&mut self, address: u32, value: u8) -> Result<(), UnmappedAccess>;

    /// Little-endian read of up to eight bytes.
    ///
    /// # Errors
    ///
    /// [`UnmappedAccess`] when any touched address is unmapped.
    fn read_bytes(&self, address: u32, count: usize) -> Result<u64, UnmappedAccess> {
        let mut value = 0_u64;
        for i in 0..count.min(8) {
            value |= u64::from(self.read_byte(address.wrapping_add(i as u32))?) << (8 * i);
        }
        Ok(value)
    }

    /// # Errors
    ///
    /// [`UnmappedAccess`] when any touched address is unmapped.
    fn read_word(&self, address: u32) -> Result<u32, UnmappedAccess> {
        Ok(self.read_bytes(address, 4)? as u32)
    }

    /// # Errors
    ///
    /// [`UnmappedAccess`] when any touched address is unmapped.
    fn read_half_word(&self, address: u32) -> Result<u16, UnmappedAccess> {
        Ok(self.read_bytes(address, 2)? as u16)
    }

    /// # Errors
    ///
    /// [`UnmappedAccess`] when any touched address is unmapped.
    fn write_word(&mut self, address: u32, value: u32) -> Result<(), UnmappedAccess> {
        for i in 0..4 {
            self.write_byte(address.wrapping_add(i), (value >> (8 * i)) as u8)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`UnmappedAccess`] when any touched address is unmapped.
    fn write_half_word(&mut self, address: u32, value: u16) -> Result<(), UnmappedAccess> {
        for i in 0..2 {
            self.write_byte(address.wrapping_add(i), (value >> (8 * i)) as u8)?;
        }
        Ok(())
    }
}

fn offset_in(address: u32, base: u32, size: usize) -> Option<usize> {
    if u64::from(address) >= u64::from(base) && u64::from(address) < u64::from(base) + size as u64 {
        Some((address - base) as usize)
    } else {
        None
    }
}

/// The ARM9-class core's address space.
///
/// The DTCM base is an instance field configured at construction; the
/// TCMs shadow main RAM where they overlap, so they are resolved first.
pub struct Arm9Bus {
    itcm: Vec<u8>,
    dtcm: Vec<u8>,
    dtcm_base: u32,
    main_ram: SharedRam,
    shared_wram: SharedRam,
    io: Vec<u8>,
    palette: Vec<u8>,
    oam: Vec<u8>,
    bios: Vec<u8>,
}

impl Arm9Bus {
    #[must_use]
    pub fn new(main_ram: SharedRam, shared_wram: SharedRam) -> Self {
        Self::with_dtcm_base(main_ram, shared_wram, DEFAULT_DTCM_BASE)
    }

    #[must_use]
    pub fn with_dtcm_base(main_ram: SharedRam, shared_wram: SharedRam, dtcm_base: u32) -> Self {
        Self {
            itcm: vec![0; ITCM_SIZE],
            dtcm: vec![0; DTCM_SIZE],
            dtcm_base,
            main_ram,
            shared_wram,
            io: vec![0; IO_SIZE],
            palette: vec![0; PALETTE_SIZE],
            oam: vec![0; OAM_SIZE],
            bios: vec![0; ARM9_BIOS_SIZE],
        }
    }

    #[must_use]
    pub const fn dtcm_base(&self) -> u32 {
        self.dtcm_base
    }
}

impl Default for Arm9Bus {
    /// A standalone space with private main RAM and WRAM.
    fn default() -> Self {
        Self::new(shared_ram(MAIN_RAM_SIZE), shared_ram(SHARED_WRAM_SIZE))
    }
}

impl Bus for Arm9Bus {
    fn read_byte(&self, address: u32) -> Result<u8, UnmappedAccess> {
        if let Some(i) = offset_in(address, ITCM_BASE, ITCM_SIZE) {
            return Ok(self.itcm[i]);
        }
        if let Some(i) = offset_in(address, ITCM_MIRROR_BASE, ITCM_SIZE) {
            return Ok(self.itcm[i]);
        }
        if let Some(i) = offset_in(address, self.dtcm_base, DTCM_SIZE) {
            return Ok(self.dtcm[i]);
        }
        if let Some(i) = offset_in(address, MAIN_RAM_BASE, MAIN_RAM_SIZE) {
            return Ok(self.main_ram.lock().unwrap()[i]);
        }
        if let Some(i) = offset_in(address, SHARED_WRAM_BASE, SHARED_WRAM_SIZE) {
            return Ok(self.shared_wram.lock().unwrap()[i]);
        }
        if let Some(i) = offset_in(address, IO_BASE, IO_SIZE) {
            return Ok(self.io[i]);
        }
        if let Some(i) = offset_in(address, PALETTE_BASE, PALETTE_SIZE) {
            return Ok(self.palette[i]);
        }
        if let Some(i) = offset_in(address, OAM_BASE, OAM_SIZE) {
            return Ok(self.oam[i]);
        }
        if let Some(i) = offset_in(address, ARM9_BIOS_BASE, ARM9_BIOS_SIZE) {
            return Ok(self.bios[i]);
        }
        Err(UnmappedAccess { address })
    }

    fn write_byte(&mut self, address: u32, value: u8) -> Result<(), UnmappedAccess> {
        if let Some(i) = offset_in(address, ITCM_BASE, ITCM_SIZE) {
            self.itcm[i] = value;
            return Ok(());
        }
        if let Some(i) = offset_in(address, ITCM_MIRROR_BASE, ITCM_SIZE) {
            self.itcm[i] = value;
            return Ok(());
        }
        if let Some(i) = offset_in(address, self.dtcm_base, DTCM_SIZE) {
            self.dtcm[i] = value;
            return Ok(());
        }
        if let Some(i) = offset_in(address, MAIN_RAM_BASE, MAIN_RAM_SIZE) {
            self.main_ram.lock().unwrap()[i] = value;
            return Ok(());
        }
        if let Some(i) = offset_in(address, SHARED_WRAM_BASE, SHARED_WRAM_SIZE) {
            self.shared_wram.lock().unwrap()[i] = value;
            return Ok(());
        }
        if let Some(i) = offset_in(address, IO_BASE, IO_SIZE) {
            self.io[i] = value;
            return Ok(());
        }
        if let Some(i) = offset_in(address, PALETTE_BASE, PALETTE_SIZE) {
            self.palette[i] = value;
            return Ok(());
        }
        if let Some(i) = offset_in(address, OAM_BASE, OAM_SIZE) {
            self.oam[i] = value;
            return Ok(());
        }
        if let Some(i) = offset_in(address, ARM9_BIOS_BASE, ARM9_BIOS_SIZE) {
            self.bios[i] = value;
            return Ok(());
        }
        Err(UnmappedAccess { address })
    }
}

/// The ARM7-class core's address space: low BIOS, the shared regions and
/// a private work RAM.
pub struct Arm7Bus {
    bios: Vec<u8>,
    main_ram: SharedRam,
    shared_wram: SharedRam,
    wram: Vec<u8>,
    io: Vec<u8>,
}

impl Arm7Bus {
    #[must_use]
    pub fn new(main_ram: SharedRam, shared_wram: SharedRam) -> Self {
        Self {
            bios: vec![0; ARM7_BIOS_SIZE],
            main_ram,
            shared_wram,
            wram: vec![0; ARM7_WRAM_SIZE],
            io: vec![0; IO_SIZE],
        }
    }
}

impl Default for Arm7Bus {
    fn default() -> Self {
        Self::new(shared_ram(MAIN_RAM_SIZE), shared_ram(SHARED_WRAM_SIZE))
    }
}

impl Bus for Arm7Bus {
    fn read_byte(&self, address: u32) -> Result<u8, UnmappedAccess> {
        if let Some(i) = offset_in(address, ARM7_BIOS_BASE, ARM7_BIOS_SIZE) {
            return Ok(self.bios[i]);
        }
        if let Some(i) = offset_in(address, MAIN_RAM_BASE, MAIN_RAM_SIZE) {
            return Ok(self.main_ram.lock().unwrap()[i]);
        }
        if let Some(i) = offset_in(address, SHARED_WRAM_BASE, SHARED_WRAM_SIZE) {
            return Ok(self.shared_wram.lock().unwrap()[i]);
        }
        if let Some(i) = offset_in(address, ARM7_WRAM_BASE, ARM7_WRAM_SIZE) {
            return Ok(self.wram[i]);
        }
        if let Some(i) = offset_in(address, IO_BASE, IO_SIZE) {
            return Ok(self.io[i]);
        }
        Err(UnmappedAccess { address })
    }

    fn write_byte(&mut self, address: u32, value: u8) -> Result<(), UnmappedAccess> {
        if let Some(i) = offset_in(address, ARM7_BIOS_BASE, ARM7_BIOS_SIZE) {
            self.bios[i] = value;
            return Ok(());
        }
        if let Some(i) = offset_in(address, MAIN_RAM_BASE, MAIN_RAM_SIZE) {
            self.main_ram.lock().unwrap()[i] = value;
            return Ok(());
        }
        if let Some(i) = offset_in(address, SHARED_WRAM_BASE, SHARED_WRAM_SIZE) {
            self.shared_wram.lock().unwrap()[i] = value;
            return Ok(());
        }
        if let Some(i) = offset_in(address, ARM7_WRAM_BASE, ARM7_WRAM_SIZE) {
            self.wram[i] = value;
            return Ok(());
        }
        if let Some(i) = offset_in(address, IO_BASE, IO_SIZE) {
            self.io[i] = value;
            return Ok(());
        }
        Err(UnmappedAccess { address })
    }
}
