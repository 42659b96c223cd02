//! Text shown (and handed to speech synthesis) when an alarm goes off.

use crate::schedule::types::{FoodContext, ScheduleEntry};

/// Short headline for the alarm display: "Take 1 tablet of Aspirin."
pub fn headline(entry: &ScheduleEntry) -> String {
    format!("Take {} of {}.", entry.dosage, entry.name)
}

/// Full spoken reminder, the text an audio generator reads out.
pub fn reminder_message(entry: &ScheduleEntry) -> String {
    let mut text = format!(
        "It is time to take {} of {} at {}",
        entry.dosage, entry.name, entry.time
    );
    if entry.food_context != FoodContext::Any {
        text.push_str(&format!(", {} food", entry.food_context));
    }
    if let Some(custom) = entry.reminder_text.as_deref().filter(|s| !s.trim().is_empty()) {
        text.push_str(". ");
        text.push_str(custom.trim());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aspirin() -> ScheduleEntry {
        let mut entry = ScheduleEntry::new("a", "08:30");
        entry.name = "Aspirin".into();
        entry.dosage = "1 tablet".into();
        entry
    }

    #[test]
    fn plain_message() {
        assert_eq!(
            reminder_message(&aspirin()),
            "It is time to take 1 tablet of Aspirin at 08:30"
        );
        assert_eq!(headline(&aspirin()), "Take 1 tablet of Aspirin.");
    }

    #[test]
    fn food_context_and_custom_text() {
        let mut entry = aspirin();
        entry.food_context = FoodContext::After;
        entry.reminder_text = Some(" Drink a full glass of water ".into());
        assert_eq!(
            reminder_message(&entry),
            "It is time to take 1 tablet of Aspirin at 08:30, after food. Drink a full glass of water"
        );
    }

    #[test]
    fn blank_custom_text_is_ignored() {
        let mut entry = aspirin();
        entry.reminder_text = Some("   ".into());
        assert!(reminder_message(&entry).ends_with("at 08:30"));
    }
}
