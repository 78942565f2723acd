//! Process hardening for secret material
//!
//! Recovered private keys and decrypted share payloads must never reach disk.
//! Core dumps are disabled via `setrlimit(RLIMIT_CORE, 0)` before any vault is
//! opened. The call is best-effort: containers and some unprivileged
//! environments refuse it, in which case a warning is logged and recovery
//! proceeds.

use std::sync::atomic::{AtomicBool, Ordering};

static CORE_DUMPS_DISABLED: AtomicBool = AtomicBool::new(false);

/// Disable core dumps for the current process.
///
/// Returns `true` if core dumps are off (now or from an earlier call).
///
/// # Example
/// ```
/// tssrecover_core::memory::disable_core_dumps();
/// ```
pub fn disable_core_dumps() -> bool {
    if CORE_DUMPS_DISABLED.load(Ordering::SeqCst) {
        return true;
    }

    let ok = platform::disable_core_dumps_impl();
    if ok {
        CORE_DUMPS_DISABLED.store(true, Ordering::SeqCst);
        log::debug!("Core dumps disabled");
    }
    ok
}

#[cfg(unix)]
mod platform {
    pub fn disable_core_dumps_impl() -> bool {
        let rlim = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        // SAFETY: setrlimit only reads the struct we pass by reference
        let result = unsafe { libc::setrlimit(libc::RLIMIT_CORE, &rlim) };
        if result != 0 {
            log::warn!(
                "Failed to disable core dumps: {}",
                std::io::Error::last_os_error()
            );
            return false;
        }
        true
    }
}

#[cfg(not(unix))]
mod platform {
    pub fn disable_core_dumps_impl() -> bool {
        log::warn!("Core dump prevention is not supported on this platform");
        false
    }
}
