//! Fixed-capacity buffer for plaintext passphrases.
//!
//! On Linux the bytes live in their own anonymous mapping, advised with
//! `MADV_DONTDUMP` and `MADV_WIPEONFORK` so they stay out of core dumps and
//! read as zeros in forked children. Elsewhere a heap box is used. Either
//! way the whole allocation is zeroed on drop.

use anyhow::Result;
use zeroize::Zeroize;

pub struct SecretBuffer {
    backing: Backing,
    capacity: usize,
    len: usize,
}

enum Backing {
    #[cfg(target_os = "linux")]
    Mapped {
        ptr: std::ptr::NonNull<u8>,
        mapped_len: usize,
        isolated: bool,
    },
    #[allow(dead_code)]
    Heap(Box<[u8]>),
}

impl SecretBuffer {
    /// Allocates `capacity` zeroed bytes.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let backing = Backing::allocate(capacity)?;
        Ok(Self {
            backing,
            capacity,
            len: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The stored secret, without the zero padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.full()[..self.len]
    }

    /// The whole capacity, padding included.
    pub fn full(&self) -> &[u8] {
        &self.backing.bytes()[..self.capacity]
    }

    /// Zeroes the buffer and copies in as much of `data` as fits.
    pub fn fill_from(&mut self, data: &[u8]) {
        self.clear();
        let n = data.len().min(self.capacity);
        let capacity = self.capacity;
        self.backing.bytes_mut()[..capacity][..n].copy_from_slice(&data[..n]);
        self.len = n;
    }

    pub fn clear(&mut self) {
        self.backing.bytes_mut().zeroize();
        self.len = 0;
    }

    /// Whether the memory was successfully excluded from dumps and forks.
    pub fn is_isolated(&self) -> bool {
        match &self.backing {
            #[cfg(target_os = "linux")]
            Backing::Mapped { isolated, .. } => *isolated,
            Backing::Heap(_) => false,
        }
    }
}

impl std::fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBuffer")
            .field("capacity", &self.capacity)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl Backing {
    #[cfg(target_os = "linux")]
    fn allocate(capacity: usize) -> Result<Self> {
        use anyhow::Context;

        // SAFETY: sysconf has no preconditions.
        let page = match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
            n if n > 0 => n as usize,
            _ => 4096,
        };
        let mapped_len = capacity.max(1).div_ceil(page) * page;

        // SAFETY: a fresh private anonymous mapping; no existing memory is
        // touched and the result is checked against MAP_FAILED.
        let raw = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                mapped_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if raw == libc::MAP_FAILED {
            return Err(std::io::Error::last_os_error()).context("mmap for passphrase buffer failed");
        }
        let ptr = std::ptr::NonNull::new(raw.cast::<u8>())
            .context("mmap returned a null passphrase buffer")?;

        let isolated = advise(raw, mapped_len, libc::MADV_DONTDUMP, "MADV_DONTDUMP")
            & advise(raw, mapped_len, libc::MADV_WIPEONFORK, "MADV_WIPEONFORK");

        Ok(Backing::Mapped {
            ptr,
            mapped_len,
            isolated,
        })
    }

    #[cfg(not(target_os = "linux"))]
    fn allocate(capacity: usize) -> Result<Self> {
        tracing::debug!("no memory isolation hint on this platform");
        Ok(Backing::Heap(vec![0u8; capacity].into_boxed_slice()))
    }

    fn bytes(&self) -> &[u8] {
        match self {
            #[cfg(target_os = "linux")]
            // SAFETY: ptr is valid for mapped_len bytes until Drop unmaps it.
            Backing::Mapped {
                ptr, mapped_len, ..
            } => unsafe { std::slice::from_raw_parts(ptr.as_ptr(), *mapped_len) },
            Backing::Heap(b) => &b[..],
        }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        match self {
            #[cfg(target_os = "linux")]
            // SAFETY: as in bytes(), and &mut self guarantees exclusivity.
            Backing::Mapped {
                ptr, mapped_len, ..
            } => unsafe { std::slice::from_raw_parts_mut(ptr.as_ptr(), *mapped_len) },
            Backing::Heap(b) => &mut b[..],
        }
    }
}

impl Drop for Backing {
    fn drop(&mut self) {
        self.bytes_mut().zeroize();
        #[cfg(target_os = "linux")]
        unmap(self);
    }
}

#[cfg(target_os = "linux")]
fn unmap(backing: &mut Backing) {
    if let Backing::Mapped {
        ptr, mapped_len, ..
    } = backing
    {
        // SAFETY: ptr/mapped_len come from the mmap in allocate and are
        // unmapped exactly once, from Drop.
        unsafe {
            libc::munmap(ptr.as_ptr().cast(), *mapped_len);
        }
    }
}

/// Best-effort madvise; failure only costs the hint.
#[cfg(target_os = "linux")]
fn advise(addr: *mut libc::c_void, len: usize, advice: libc::c_int, name: &str) -> bool {
    // SAFETY: addr/len describe a mapping we own.
    let rc = unsafe { libc::madvise(addr, len, advice) };
    if rc == 0 {
        tracing::trace!(advice = name, "passphrase buffer advised");
        true
    } else {
        tracing::debug!(
            advice = name,
            error = %std::io::Error::last_os_error(),
            "madvise hint unavailable"
        );
        false
    }
}
