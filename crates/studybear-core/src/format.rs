//! Text helpers shared by replies and announcements.

/// Format milliseconds as `DDd HHh MMm`, each field zero-padded to two digits.
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    let days = seconds / (3600 * 24);
    let hours = (seconds % (3600 * 24)) / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{days:02}d {hours:02}h {minutes:02}m")
}

/// "a is now studybearing!" / "a, b and c are now studybearing!"
///
/// Returns `None` when nobody is studying.
pub fn study_announcement(studying: &[String]) -> Option<String> {
    let names = match studying {
        [] => return None,
        [only] => return Some(format!("{only} is now studybearing! Come and join")),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    };
    Some(format!("{names} are now studybearing! Come and join"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0), "00d 00h 00m");
        assert_eq!(format_duration(59_999), "00d 00h 00m");
        assert_eq!(format_duration(60_000), "00d 00h 01m");
        assert_eq!(format_duration(3_600_000 + 5 * 60_000), "00d 01h 05m");
        assert_eq!(format_duration(12 * 86_400_000 + 23 * 3_600_000), "12d 23h 00m");
        assert_eq!(format_duration(150 * 86_400_000), "150d 00h 00m");
    }

    #[test]
    fn announces_one_or_many() {
        let one = vec!["ana".to_string()];
        assert_eq!(
            study_announcement(&one).unwrap(),
            "ana is now studybearing! Come and join"
        );
        let two = vec!["ana".to_string(), "bo".to_string()];
        assert_eq!(
            study_announcement(&two).unwrap(),
            "ana and bo are now studybearing! Come and join"
        );
        let three = vec!["ana".to_string(), "bo".to_string(), "cy".to_string()];
        assert_eq!(
            study_announcement(&three).unwrap(),
            "ana, bo and cy are now studybearing! Come and join"
        );
        assert!(study_announcement(&[]).is_none());
    }
}
