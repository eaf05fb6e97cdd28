//! Human-readable verdicts for homework statuses.

use crate::error::{Result, WatchError};
use crate::homework::StatusRecord;

/// Recognized statuses and their verdict text.
pub const HOMEWORK_VERDICTS: [(&str, &str); 3] = [
    (
        "approved",
        "Работа проверена: ревьюеру всё понравилось. Ура!",
    ),
    ("reviewing", "Работа взята на проверку ревьюером."),
    ("rejected", "Работа проверена: у ревьюера есть замечания."),
];

/// Map a status code to its verdict.
///
/// # Errors
///
/// Returns [`WatchError::UnknownStatus`] for any status outside the table.
pub fn resolve(status: &str) -> Result<&'static str> {
    HOMEWORK_VERDICTS
        .iter()
        .find(|(key, _)| *key == status)
        .map(|(_, verdict)| *verdict)
        .ok_or_else(|| WatchError::UnknownStatus(status.to_owned()))
}

/// Chat message announcing the new status of `record`.
///
/// # Errors
///
/// Returns [`WatchError::UnknownStatus`] when the status has no verdict.
pub fn status_message(record: &StatusRecord) -> Result<String> {
    let verdict = resolve(&record.status)?;
    Ok(format!(
        "Изменился статус проверки работы \"{}\". {verdict}",
        record.name
    ))
}
