//! Process-wide panic tracker (spec.md §9 "global mutable state"; SPEC_FULL
//! §B). Grounded on
//! `examples/original_source/.../infrastructure/self_diagnostics.go`'s
//! `RecordPanic`/`lastPanicMsg` behind a mutex: one lock-guarded record,
//! initialized lazily, with explicit read/record operations — never a raw
//! mutable global.

use std::sync::{Mutex, OnceLock};

#[derive(Debug, Clone)]
pub struct PanicRecord {
    pub target_id: uuid::Uuid,
    pub message: String,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}

fn registry() -> &'static Mutex<Option<PanicRecord>> {
    static REGISTRY: OnceLock<Mutex<Option<PanicRecord>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(None))
}

/// Record a caught worker panic. Overwrites any previous record — only the
/// most recent panic matters for diagnostics.
pub fn record_panic(target_id: uuid::Uuid, message: impl Into<String>) {
    let mut guard = registry().lock().unwrap();
    *guard = Some(PanicRecord {
        target_id,
        message: message.into(),
        occurred_at: chrono::Utc::now(),
    });
}

/// Read the most recent panic, if any have occurred since process start.
pub fn last_panic() -> Option<PanicRecord> {
    registry().lock().unwrap().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn records_and_reads_back_a_panic() {
        let target_id = uuid::Uuid::new_v4();
        record_panic(target_id, "boom");
        let record = last_panic().expect("panic should be recorded");
        assert_eq!(record.target_id, target_id);
        assert_eq!(record.message, "boom");
    }

    #[test]
    #[serial]
    fn a_later_panic_overwrites_the_earlier_one() {
        record_panic(uuid::Uuid::new_v4(), "first");
        let second_id = uuid::Uuid::new_v4();
        record_panic(second_id, "second");
        let record = last_panic().unwrap();
        assert_eq!(record.target_id, second_id);
        assert_eq!(record.message, "second");
    }
}
