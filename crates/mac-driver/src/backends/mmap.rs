// SPDX-License-Identifier: AGPL-3.0-only

//! Physical register window mapped into a Linux process
//!
//! Opens a memory device node (`/dev/mem`, or a UIO node exposing the
//! block) with `O_SYNC` so the kernel maps the range uncached, then maps the
//! page containing the block. All unsafe is confined to map/unmap and the
//! volatile accessors.

// Physical addresses are u64; on the 64-bit hosts this runs on they fit usize.
#![allow(clippy::cast_possible_truncation)]

use crate::backend::{BackendType, RegisterBlock};
use crate::error::{MacError, Result};
use mac_chip::{map, Register};
use rustix::fd::{AsFd, OwnedFd};
use rustix::fs::{open, Mode, OFlags};
use rustix::io::Errno;
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

/// MAC register block mapped through a memory device node
///
/// The mapping covers whole pages; `regs` points at the block inside it.
#[derive(Debug)]
pub struct MappedRegion {
    mapping: NonNull<u8>,
    mapping_len: usize,
    regs: NonNull<u32>,
    base: u64,
    path: PathBuf,
    _fd: OwnedFd,
}

// SAFETY: Send - MappedRegion owns the mapping exclusively and every access
// goes through &mut self. The mapping is process-wide, so moving the owner to
// another thread does not invalidate it.
unsafe impl Send for MappedRegion {}

impl MappedRegion {
    /// Map the register block at physical address `base`
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `base` is not a valid block address
    /// - the device node does not exist ([`MacError::DeviceNotFound`])
    /// - the device node cannot be opened, e.g. permission denied ([`MacError::Io`])
    /// - mmap fails
    pub fn map(path: impl AsRef<Path>, base: u64) -> Result<Self> {
        let path = path.as_ref();

        if !map::is_valid_base(base) {
            return Err(MacError::invalid_config(format!(
                "base address {base:#x} is not word aligned"
            )));
        }

        let fd = open(
            path,
            OFlags::RDWR | OFlags::SYNC | OFlags::CLOEXEC,
            Mode::empty(),
        )
        .map_err(|e| {
            if e == Errno::NOENT {
                MacError::device_not_found(path)
            } else {
                tracing::warn!("Cannot open {}: {e}", path.display());
                MacError::from(std::io::Error::from(e))
            }
        })?;

        let page_size = rustix::param::page_size();
        let page_mask = page_size as u64 - 1;
        let page_base = base & !page_mask;
        let within_page = (base - page_base) as usize;
        let mapping_len = (within_page + map::WINDOW_SIZE).next_multiple_of(page_size);

        tracing::debug!(
            "Mapping {} at {page_base:#x} (+{within_page:#x}), {mapping_len:#x} bytes",
            path.display()
        );

        // SAFETY: mmap necessary for MMIO - maps the block's page(s) into the
        // process. Invariants: (1) fd is open RDWR; (2) page_base is page
        // aligned; (3) mapping_len is a non-zero page multiple; (4) the
        // mapping is only touched through volatile accesses and unmapped in
        // Drop.
        let addr = unsafe {
            mmap(
                std::ptr::null_mut(),
                mapping_len,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                fd.as_fd(),
                page_base,
            )
        }
        .map_err(|e| MacError::map_failed(format!("mmap of {page_base:#x} failed: {e}")))?;

        let mapping = NonNull::new(addr.cast::<u8>())
            .ok_or_else(|| MacError::map_failed("mmap returned a null mapping"))?;

        // SAFETY: within_page + WINDOW_SIZE <= mapping_len, so the block lies
        // inside the mapping; base is word aligned, and page_base is page
        // aligned, so the pointer is u32 aligned.
        let regs = unsafe { mapping.add(within_page).cast::<u32>() };

        tracing::info!(
            "Mapped MAC block {base:#x} from {} at {:p}",
            path.display(),
            regs
        );

        Ok(Self {
            mapping,
            mapping_len,
            regs,
            base,
            path: path.to_path_buf(),
            _fd: fd,
        })
    }

    /// Physical base address of the block
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Device node the block was mapped from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegisterBlock for MappedRegion {
    fn read(&mut self, reg: Register) -> u32 {
        // SAFETY: read_volatile necessary for MMIO - the device changes
        // STATUS and RESULT. reg.index() < 6 words, inside the mapped window.
        unsafe { self.regs.add(reg.index()).read_volatile() }
    }

    fn write(&mut self, reg: Register, value: u32) {
        // SAFETY: write_volatile necessary for MMIO - CONTROL.START has a
        // side effect and must not be elided. Bounds as in read().
        unsafe { self.regs.add(reg.index()).write_volatile(value) }
    }

    fn backend_type(&self) -> BackendType {
        BackendType::DevMem
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        // SAFETY: mapping/mapping_len come from the successful mmap in map();
        // Drop runs once and no references into the mapping outlive self.
        if let Err(e) = unsafe { munmap(self.mapping.as_ptr().cast(), self.mapping_len) } {
            tracing::warn!("munmap of MAC block at {:#x} failed: {e}", self.base);
        }
        tracing::debug!("Unmapped MAC block at {:#x}", self.base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_device_node_is_reported() {
        let err = MappedRegion::map("/nonexistent/mem", map::DEFAULT_BASE).unwrap_err();
        assert!(matches!(err, MacError::DeviceNotFound { .. }), "{err}");
    }

    #[test]
    fn open_failures_surface_as_io_errors() {
        // A directory cannot be opened read-write (EISDIR).
        let err = MappedRegion::map(std::env::temp_dir(), map::DEFAULT_BASE).unwrap_err();
        match err {
            MacError::Io { source } => {
                assert_eq!(source.raw_os_error(), Some(Errno::ISDIR.raw_os_error()));
            }
            other => panic!("expected Io error, got {other}"),
        }
    }

    #[test]
    fn unaligned_base_is_rejected() {
        let err = MappedRegion::map("/dev/mem", 0x2000_1002).unwrap_err();
        assert!(matches!(err, MacError::InvalidConfig { .. }), "{err}");
    }
}
