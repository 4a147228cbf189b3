//! Ctrl+C handling for the long-running loops
//!
//! The SIGINT handler only clears a static flag, which the generator loop
//! and the monitor poll between iterations.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Install the SIGINT handler and return a flag that clears on Ctrl+C
pub fn install() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    INTERRUPTED.store(false, Ordering::SeqCst);
    set_handler()?;

    let flag = Arc::clone(&running);
    std::thread::spawn(move || {
        while flag.load(Ordering::SeqCst) {
            if INTERRUPTED.load(Ordering::SeqCst) {
                log::info!("Interrupted, stopping");
                flag.store(false, Ordering::SeqCst);
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
    });

    Ok(running)
}

#[cfg(unix)]
fn set_handler() -> Result<()> {
    // SAFETY: the handler only performs an atomic store, which is async-signal-safe
    let previous = unsafe { libc::signal(libc::SIGINT, handle_sigint as *const () as libc::sighandler_t) };
    if previous == libc::SIG_ERR {
        anyhow::bail!("Failed to set Ctrl+C handler");
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_handler() -> Result<()> {
    // Ctrl+C falls back to terminating the process
    Ok(())
}

#[cfg(unix)]
extern "C" fn handle_sigint(_: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_sigint_clears_running_flag() {
        let running = install().unwrap();
        assert!(running.load(Ordering::SeqCst));

        // SAFETY: raising SIGINT runs the handler installed above
        unsafe {
            libc::raise(libc::SIGINT);
        }

        let deadline = Instant::now() + Duration::from_secs(2);
        while running.load(Ordering::SeqCst) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(!running.load(Ordering::SeqCst));
    }
}
