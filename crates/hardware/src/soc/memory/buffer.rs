//! RAM Buffer Implementation.
//!
//! This module provides a safe wrapper around the host allocation that backs guest RAM.
//! On Unix systems it uses an anonymous `mmap`, so pages are only committed when the
//! guest touches them and a 1 GiB board costs nothing until it runs.

use std::io;
use std::slice;

/// Host memory backing one RAM region.
///
/// On Unix systems, this uses `mmap` to allocate anonymous, zero-filled memory.
/// Elsewhere it falls back to a boxed slice.
#[derive(Debug)]
pub struct RamBuffer {
    ptr: *mut u8,
    size: usize,
    is_mmap: bool,
}

// SAFETY: the buffer exclusively owns its allocation; all access goes through
// `&self`/`&mut self` slices, so the usual borrow rules apply across threads.
unsafe impl Send for RamBuffer {}
// SAFETY: shared references only hand out immutable slices.
unsafe impl Sync for RamBuffer {}

impl RamBuffer {
    /// Allocates a zero-filled buffer of `size` bytes.
    ///
    /// A size of 0 performs no allocation.
    ///
    /// # Errors
    ///
    /// Returns the OS error if `mmap` fails.
    pub fn new(size: usize) -> io::Result<Self> {
        if size == 0 {
            return Ok(Self {
                ptr: std::ptr::NonNull::dangling().as_ptr(),
                size: 0,
                is_mmap: false,
            });
        }

        #[cfg(unix)]
        {
            // SAFETY: anonymous private mapping with no fixed address; the result is
            // checked against MAP_FAILED before use.
            let ptr = unsafe {
                libc::mmap(
                    std::ptr::null_mut(),
                    size,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                    -1,
                    0,
                )
            };

            if ptr == libc::MAP_FAILED {
                return Err(io::Error::last_os_error());
            }

            Ok(Self {
                ptr: ptr as *mut u8,
                size,
                is_mmap: true,
            })
        }

        #[cfg(not(unix))]
        {
            let boxed = vec![0u8; size].into_boxed_slice();
            Ok(Self {
                ptr: Box::into_raw(boxed) as *mut u8,
                size,
                is_mmap: false,
            })
        }
    }

    /// Returns the size of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` for a zero-sized buffer.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Views the whole buffer.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `size` bytes (or dangling with size 0) for the
        // lifetime of `self`.
        unsafe { slice::from_raw_parts(self.ptr, self.size) }
    }

    /// Views the whole buffer mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above; `&mut self` guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.ptr, self.size) }
    }
}

impl Drop for RamBuffer {
    fn drop(&mut self) {
        if self.size == 0 {
            return;
        }
        if self.is_mmap {
            #[cfg(unix)]
            // SAFETY: `ptr`/`size` are exactly what `mmap` returned.
            unsafe {
                let _ = libc::munmap(self.ptr as *mut _, self.size);
            }
        } else {
            #[cfg(not(unix))]
            // SAFETY: `ptr`/`size` came from `Box::into_raw` of a boxed slice of that length.
            unsafe {
                drop(Box::from_raw(slice::from_raw_parts_mut(self.ptr, self.size)));
            }
        }
    }
}
