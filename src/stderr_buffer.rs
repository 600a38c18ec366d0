use std::sync::{Mutex, MutexGuard};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn lock() -> MutexGuard<'static, Option<Vec<String>>> {
    BUFFER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Activate buffering. While active, log records and `warn()` calls are
/// stored instead of printed to stderr.
pub fn activate() {
    *lock() = Some(Vec::new());
}

/// Whether messages are currently being buffered.
pub fn is_active() -> bool {
    lock().is_some()
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    lock().take().unwrap_or_default()
}

/// Write a warning message. If buffering is active the message is stored;
/// otherwise it is printed to stderr immediately.
pub fn warn(msg: String) {
    let mut guard = lock();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_collects_while_active() {
        activate();
        assert!(is_active());
        warn("first".to_string());
        warn("second 2".to_string());

        let drained = drain();
        assert_eq!(drained, vec!["first".to_string(), "second 2".to_string()]);
        assert!(!is_active());
        assert!(drain().is_empty());
    }
}
