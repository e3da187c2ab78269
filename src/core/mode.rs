//! Raw terminal discipline
//!
//! Switches the controlling terminal into byte-at-a-time, no-echo input and puts
//! it back afterwards. The captured discipline lives in a process-wide slot so
//! that the atexit hook and the termination-signal handlers can restore it even
//! when no `TerminalMode` destructor ever runs.
//!
//! Every path funnels into [`restore_active`] or its non-blocking twin. The
//! snapshot is copied out and reapplied, and the slot is only emptied once the
//! reapply has finished. Later paths find an empty slot.

use std::sync::{Mutex, Once, TryLockError};

use tracing::{debug, trace, warn};

use crate::error::{ConsoleError, Result};

#[cfg(unix)]
use std::os::unix::io::RawFd;

#[cfg(unix)]
use termios::{tcsetattr, Termios, ECHO, ICANON, TCSANOW, VMIN, VTIME};

/// Written straight to stdout from the signal handler, where nothing may allocate.
#[cfg(unix)]
const SHOW_CURSOR: &[u8] = b"\x1b[?25h";

/// Snapshot of the terminal discipline taken before raw mode was applied.
#[derive(Clone, Copy)]
pub struct TerminalState {
    #[cfg(unix)]
    fd: RawFd,
    #[cfg(unix)]
    termios: Termios,
}

impl std::fmt::Debug for TerminalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("TerminalState");
        #[cfg(unix)]
        s.field("fd", &self.fd);
        s.finish_non_exhaustive()
    }
}

impl TerminalState {
    #[cfg(unix)]
    fn capture(fd: RawFd) -> Result<Self> {
        // SAFETY: isatty only inspects the descriptor.
        if unsafe { libc::isatty(fd) } != 1 {
            return Err(ConsoleError::NoTerminal);
        }
        let termios = Termios::from_fd(fd)?;
        Ok(Self { fd, termios })
    }

    #[cfg(not(unix))]
    fn capture() -> Result<Self> {
        Ok(Self {})
    }

    /// Reapply this snapshot verbatim.
    #[cfg(unix)]
    fn apply(&self) -> std::io::Result<()> {
        tcsetattr(self.fd, TCSANOW, &self.termios)
    }

    #[cfg(not(unix))]
    fn apply(&self) -> std::io::Result<()> {
        crossterm::terminal::disable_raw_mode()
    }
}

/// The one active snapshot per process.
static ACTIVE: Mutex<Option<TerminalState>> = Mutex::new(None);

static HOOKS: Once = Once::new();

/// Restore the active snapshot, if any.
///
/// Returns `true` when a snapshot was reapplied and `false` when the terminal
/// had already been restored.
pub fn restore_active() -> bool {
    restore_slot(&ACTIVE, |state| {
        if let Err(e) = state.apply() {
            warn!("Failed to restore terminal discipline: {}", e);
        }
    })
}

/// Restore path for contexts that must not block or allocate.
fn restore_without_blocking() {
    restore_slot_without_blocking(&ACTIVE, |state| {
        let _ = state.apply();
    });
}

/// The snapshot stays in the slot until `apply` has returned, so a signal
/// arriving mid-restore still finds it.
fn restore_slot(slot: &Mutex<Option<TerminalState>>, apply: impl Fn(&TerminalState)) -> bool {
    let snapshot = slot.lock().unwrap_or_else(|e| e.into_inner()).as_ref().copied();
    let Some(state) = snapshot else {
        return false;
    };
    apply(&state);
    slot.lock().unwrap_or_else(|e| e.into_inner()).take();
    true
}

fn restore_slot_without_blocking(
    slot: &Mutex<Option<TerminalState>>,
    apply: impl Fn(&TerminalState),
) -> bool {
    let snapshot = match slot.try_lock() {
        Ok(guard) => guard.as_ref().copied(),
        Err(TryLockError::Poisoned(e)) => e.into_inner().as_ref().copied(),
        // Only held for a copy or a take; the interrupted path finishes the restore.
        Err(TryLockError::WouldBlock) => None,
    };
    let Some(state) = snapshot else {
        return false;
    };
    apply(&state);
    if let Ok(mut guard) = slot.try_lock() {
        guard.take();
    }
    true
}

fn install_exit_hooks() {
    HOOKS.call_once(|| {
        #[cfg(unix)]
        // SAFETY: both handlers only touch the snapshot slot and async-signal-safe
        // libc calls.
        unsafe {
            libc::atexit(restore_at_exit);
            for sig in [libc::SIGINT, libc::SIGTERM, libc::SIGHUP, libc::SIGQUIT] {
                libc::signal(sig, restore_on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t);
            }
        }
        debug!("Installed terminal exit hooks");
    });
}

#[cfg(unix)]
extern "C" fn restore_at_exit() {
    restore_without_blocking();
}

#[cfg(unix)]
extern "C" fn restore_on_signal(sig: libc::c_int) {
    restore_without_blocking();
    // SAFETY: write, signal and raise are async-signal-safe.
    unsafe {
        libc::write(libc::STDOUT_FILENO, SHOW_CURSOR.as_ptr().cast(), SHOW_CURSOR.len());
        libc::signal(sig, libc::SIG_DFL);
        libc::raise(sig);
    }
}

/// Scoped raw-mode session on the controlling terminal.
///
/// Dropping it restores the captured discipline.
pub struct TerminalMode {
    #[cfg(unix)]
    fd: RawFd,
    active: bool,
}

impl TerminalMode {
    /// Put stdin's terminal into raw input mode.
    pub fn enter_raw() -> Result<Self> {
        #[cfg(unix)]
        {
            Self::enter_raw_fd(libc::STDIN_FILENO)
        }
        #[cfg(not(unix))]
        {
            Self::claim(TerminalState::capture)?;
            if let Err(e) = crossterm::terminal::enable_raw_mode() {
                restore_active();
                return Err(e.into());
            }
            install_exit_hooks();
            debug!("Entered raw mode");
            Ok(Self { active: true })
        }
    }

    /// Put the terminal behind `fd` into raw input mode.
    #[cfg(unix)]
    pub fn enter_raw_fd(fd: RawFd) -> Result<Self> {
        let state = Self::claim(|| TerminalState::capture(fd))?;

        let mut raw = state.termios;
        raw.c_lflag &= !(ICANON | ECHO);
        raw.c_cc[VMIN] = 1;
        raw.c_cc[VTIME] = 0;
        if let Err(e) = tcsetattr(fd, TCSANOW, &raw) {
            restore_active();
            return Err(e.into());
        }

        install_exit_hooks();
        debug!(fd, "Entered raw mode");
        Ok(Self { fd, active: true })
    }

    /// Capture a snapshot into the process slot, refusing a second session.
    fn claim(capture: impl FnOnce() -> Result<TerminalState>) -> Result<TerminalState> {
        let mut slot = ACTIVE.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return Err(ConsoleError::AlreadyActive);
        }
        let state = capture()?;
        *slot = Some(state);
        Ok(state)
    }

    /// Whether this session still holds raw mode.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Toggle local echo on the live discipline without touching the snapshot.
    pub fn set_echo(&mut self, enabled: bool) -> Result<()> {
        #[cfg(unix)]
        {
            let mut current = Termios::from_fd(self.fd)?;
            if enabled {
                current.c_lflag |= ECHO;
            } else {
                current.c_lflag &= !ECHO;
            }
            tcsetattr(self.fd, TCSANOW, &current)?;
        }
        trace!(enabled, "Terminal echo");
        Ok(())
    }

    /// Reapply the captured discipline. Calling it again is a no-op.
    pub fn restore(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if restore_active() {
            debug!("Restored terminal discipline");
        }
    }
}

impl Drop for TerminalMode {
    fn drop(&mut self) {
        self.restore();
    }
}
