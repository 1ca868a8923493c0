//! Shared-memory glyph store
//!
//! A named POSIX shared-memory segment holding the 256-byte glyph store.
//! Whichever process opens it first creates it zero-filled; it outlives
//! both processes and is only removed by [`unlink`].
//!
//! Access is unsynchronised by contract. Every byte is read and written
//! with volatile accesses, and a reader may observe a half-written set.

#![allow(unsafe_code)]

use core::ffi::c_void;
use core::ptr::NonNull;
use std::io;

use graphyte_core::GlyphSource;
use graphyte_protocol::glyph::{offset, GLYPHS_PER_SET, ROWS_PER_GLYPH, SET_COUNT};
use graphyte_protocol::{Glyph, GlyphStore, STORE_SIZE};
use rustix::fs::{ftruncate, Mode};
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use rustix::shm;
use tracing::debug;

/// Default segment name
pub const DEFAULT_SHM_NAME: &str = "/lcd_custom_chars";

/// Permission bits of a newly created segment (before umask)
const SEGMENT_MODE: u32 = 0o666;

/// Errors while acquiring or removing the segment
#[derive(Debug, thiserror::Error)]
pub enum ShmError {
    #[error("failed to open shared memory segment {name}")]
    Open {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to size shared memory segment {name}")]
    Resize {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to map shared memory segment {name}")]
    Map {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove shared memory segment {name}")]
    Unlink {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Mapped glyph store, unmapped on drop
#[derive(Debug)]
pub struct SharedGlyphStore {
    name: String,
    base: NonNull<u8>,
}

impl SharedGlyphStore {
    /// Open (creating if needed) and map a segment
    pub fn open(name: &str) -> Result<Self, ShmError> {
        let fd = shm::open(
            name,
            shm::OFlags::CREATE | shm::OFlags::RDWR,
            Mode::from_bits_truncate(SEGMENT_MODE),
        )
        .map_err(|e| ShmError::Open {
            name: name.to_owned(),
            source: e.into(),
        })?;

        // A new segment is zero length; growing it zero-fills
        ftruncate(&fd, STORE_SIZE as u64).map_err(|e| ShmError::Resize {
            name: name.to_owned(),
            source: e.into(),
        })?;

        // SAFETY: a fresh shared mapping of STORE_SIZE bytes backed by a
        // descriptor sized to at least that length
        let ptr = unsafe {
            mmap(
                core::ptr::null_mut(),
                STORE_SIZE,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                &fd,
                0,
            )
        }
        .map_err(|e| ShmError::Map {
            name: name.to_owned(),
            source: e.into(),
        })?;

        let base = NonNull::new(ptr.cast::<u8>()).ok_or_else(|| ShmError::Map {
            name: name.to_owned(),
            source: io::Error::other("mmap returned null"),
        })?;

        debug!(name, size = STORE_SIZE, "glyph store mapped");
        Ok(Self {
            name: name.to_owned(),
            base,
        })
    }

    /// Segment name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn read_byte(&self, index: usize) -> u8 {
        debug_assert!(index < STORE_SIZE);
        // SAFETY: index is within the STORE_SIZE mapping owned by self
        unsafe { self.base.as_ptr().add(index).read_volatile() }
    }

    fn write_byte(&self, index: usize, value: u8) {
        debug_assert!(index < STORE_SIZE);
        // SAFETY: index is within the STORE_SIZE mapping owned by self
        unsafe { self.base.as_ptr().add(index).write_volatile(value) }
    }

    /// Copy the whole store out
    pub fn load(&self) -> GlyphStore {
        let mut bytes = [0u8; STORE_SIZE];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = self.read_byte(i);
        }
        // The buffer is exactly STORE_SIZE long
        GlyphStore::from_bytes(&bytes).unwrap_or_default()
    }

    /// Overwrite the whole store
    pub fn save(&self, store: &GlyphStore) {
        for (i, byte) in store.to_bytes().into_iter().enumerate() {
            self.write_byte(i, byte);
        }
    }

    /// Zero every byte
    pub fn zero(&self) {
        for i in 0..STORE_SIZE {
            self.write_byte(i, 0);
        }
    }
}

impl GlyphSource for SharedGlyphStore {
    fn read_glyph(&self, set: usize, glyph: usize) -> Glyph {
        if set >= SET_COUNT || glyph >= GLYPHS_PER_SET {
            return Glyph::EMPTY;
        }
        let start = offset(set, glyph, 0);
        let mut rows = [0u8; ROWS_PER_GLYPH];
        for (row, value) in rows.iter_mut().enumerate() {
            *value = self.read_byte(start + row);
        }
        Glyph::new(rows)
    }
}

impl Drop for SharedGlyphStore {
    fn drop(&mut self) {
        // SAFETY: base/STORE_SIZE is the mapping created in open, and no
        // reference into it outlives self
        let result = unsafe { munmap(self.base.as_ptr().cast::<c_void>(), STORE_SIZE) };
        if let Err(e) = result {
            debug!(name = %self.name, error = %e, "munmap failed");
        }
    }
}

/// Remove a segment by name
///
/// Existing mappings stay valid; the next open creates a fresh segment.
pub fn unlink(name: &str) -> Result<(), ShmError> {
    shm::unlink(name).map_err(|e| ShmError::Unlink {
        name: name.to_owned(),
        source: e.into(),
    })
}
