//! Lifetime management for the engine's log callback.
//!
//! The engine keeps a bare function pointer and may call it from any of its
//! threads until it is told to stop. That pointer is always [`deliver`], a
//! trampoline that looks up the current handler in a process-wide slot. The
//! slot holds the strong reference (the anchor) that keeps the handler alive.
//!
//! Ordering rules:
//! - the anchor is stored before the engine receives the pointer;
//! - the engine is told to stop before the anchor is released;
//! - installing a new handler over an old one performs both steps for the
//!   old handler first.
//!
//! Registration and deregistration run inside one critical section. A
//! guard only ever deregisters the handler it installed itself.

use arw_api::LogCallbackFn;
use once_cell::sync::Lazy;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Receives one engine log line per call.
pub type LogHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Target used when forwarding engine messages into `log`.
pub const LOG_TARGET: &str = "arwrapper";

struct Registration {
    anchor: LogHandler,
    native_fn: LogCallbackFn,
    owner: u64,
}

static TRANSITION: Mutex<()> = Mutex::new(());
static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);
static ACTIVE: Lazy<RwLock<Option<Registration>>> = Lazy::new(|| RwLock::new(None));

/// Trampoline handed to the engine.
unsafe extern "C" fn deliver(message: *const c_char) {
    if message.is_null() {
        return;
    }
    let handler = {
        let slot = ACTIVE.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().map(|registration| Arc::clone(&registration.anchor))
    };
    let Some(handler) = handler else {
        return;
    };
    let text = CStr::from_ptr(message).to_string_lossy();
    // Unwinding into the engine is undefined behaviour.
    if catch_unwind(AssertUnwindSafe(|| handler(&*text))).is_err() {
        log::error!(target: LOG_TARGET, "log handler panicked; message dropped");
    }
}

/// Handler that forwards engine messages into the `log` facade.
pub fn forward_to_log() -> LogHandler {
    Arc::new(|message: &str| {
        let message = message.trim_end();
        if !message.is_empty() {
            log::info!(target: LOG_TARGET, "{}", message);
        }
    })
}

/// Whether any handler is anchored in this process.
pub fn is_registered() -> bool {
    ACTIVE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// The function pointer most recently handed to the engine, if still active.
pub fn installed_pointer() -> Option<LogCallbackFn> {
    ACTIVE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map(|registration| registration.native_fn)
}

/// Tell the engine to stop, then drop the anchor. Caller holds `TRANSITION`.
fn release(install: &mut impl FnMut(Option<LogCallbackFn>)) -> bool {
    if !is_registered() {
        return false;
    }
    install(None);
    let old = ACTIVE
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    drop(old);
    log::debug!("Log callback deregistered");
    true
}

fn active_owner() -> Option<u64> {
    ACTIVE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map(|registration| registration.owner)
}

/// One session's claim on the callback slot.
///
/// The slot holds at most one registration. Each registration carries the
/// token of the guard that made it, so a guard whose handler has since been
/// replaced by another guard leaves the slot alone when it deregisters.
///
/// `install` closures passed to the methods forward to the engine's
/// registration entry point.
#[derive(Debug, Default)]
pub struct LogCallbackGuard {
    token: Option<u64>,
}

impl LogCallbackGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this guard's handler is the one currently installed.
    pub fn is_registered(&self) -> bool {
        self.token.is_some() && self.token == active_owner()
    }

    /// Install `handler` in place of whatever is installed, or deregister
    /// this guard's handler when it is `None`.
    pub fn register(
        &mut self,
        handler: Option<LogHandler>,
        mut install: impl FnMut(Option<LogCallbackFn>),
    ) {
        let Some(anchor) = handler else {
            self.deregister(install);
            return;
        };
        let _transition = TRANSITION.lock().unwrap_or_else(PoisonError::into_inner);

        release(&mut install);
        let owner = NEXT_OWNER.fetch_add(1, Ordering::Relaxed);
        let native_fn: LogCallbackFn = deliver;
        *ACTIVE.write().unwrap_or_else(PoisonError::into_inner) = Some(Registration {
            anchor,
            native_fn,
            owner,
        });
        install(Some(native_fn));
        self.token = Some(owner);
        log::debug!("Log callback registered");
    }

    /// Stop the engine calling back, then release the handler. Does nothing
    /// if another guard has replaced this guard's handler.
    pub fn deregister(&mut self, mut install: impl FnMut(Option<LogCallbackFn>)) {
        let Some(token) = self.token.take() else {
            return;
        };
        let _transition = TRANSITION.lock().unwrap_or_else(PoisonError::into_inner);
        if active_owner() == Some(token) {
            release(&mut install);
        } else {
            log::debug!("Log callback already replaced; nothing to deregister");
        }
    }
}
