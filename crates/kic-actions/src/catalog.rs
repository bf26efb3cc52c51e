//! Static slot table: answer options, prompts and change intents per filter slot.

use kic_core::{ActionResponses, FilterSlot, SlotCommand, UNDECIDED_VALUE};

/// Action every slot shortcut continues with.
pub const NEXT_ACTION: &str = "action_get_learning_recommendation";

/// One selectable answer. `value: None` is the "don't care" answer sent as `/undecided`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDef {
    /// Response id of the button title.
    pub title_key: &'static str,
    pub value: Option<&'static str>,
}

impl OptionDef {
    const fn inform(title_key: &'static str, value: &'static str) -> Self {
        Self {
            title_key,
            value: Some(value),
        }
    }

    const fn undecided(title_key: &'static str) -> Self {
        Self {
            title_key,
            value: None,
        }
    }

    pub fn command(&self, slot: FilterSlot) -> SlotCommand {
        match self.value {
            Some(value) => SlotCommand::inform(slot.as_str(), value),
            None => SlotCommand::Undecided,
        }
    }
}

/// Question setup of one filter slot.
#[derive(Debug)]
pub struct SlotProfile {
    pub slot: FilterSlot,
    pub action_name: &'static str,
    /// Intent of a user asking to change this slot.
    pub change_intent: &'static str,
    pub ask_key: &'static str,
    pub confirm_change_key: &'static str,
    /// Value applied when no option has any matching course.
    pub undecided_value: &'static str,
    pub options: &'static [OptionDef],
}

/// Answer option rendered for one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateOption {
    /// Response id the title was taken from.
    pub label: &'static str,
    pub command: SlotCommand,
    pub title: String,
}

impl SlotProfile {
    /// Every response id this slot's question uses.
    pub fn response_keys(&self) -> Vec<&'static str> {
        let mut keys = vec![self.ask_key, self.confirm_change_key];
        keys.extend(self.options.iter().map(|o| o.title_key));
        keys
    }

    /// Full option list with titles from `responses`.
    pub fn candidates(&self, responses: &ActionResponses) -> Vec<CandidateOption> {
        self.options
            .iter()
            .map(|option| CandidateOption {
                label: option.title_key,
                command: option.command(self.slot),
                title: responses.text(option.title_key).to_string(),
            })
            .collect()
    }

    /// Command injected when the slot is auto-applied with its undecided value.
    pub fn undecided_command(&self) -> SlotCommand {
        if self.undecided_value == UNDECIDED_VALUE {
            SlotCommand::Undecided
        } else {
            SlotCommand::inform(self.slot.as_str(), self.undecided_value)
        }
    }
}

const LANGUAGE_OPTIONS: [OptionDef; 3] = [
    OptionDef::inform("language_option_german", "Deutsch"),
    OptionDef::inform("language_option_english", "Englisch"),
    OptionDef::undecided("language_option_any"),
];

const TOPIC_OPTIONS: [OptionDef; 7] = [
    OptionDef::inform("topic_option_introduction_ai", "ki-einführung"),
    OptionDef::inform("topic_option_specialized_ai", "ki-vertiefung"),
    OptionDef::inform("topic_option_professions_and_ai", "ki-berufsfelder"),
    OptionDef::inform("topic_option_society_and_ai", "ki-gesellschaft"),
    OptionDef::inform("topic_option_data_science", "Data Science"),
    OptionDef::inform("topic_option_machine_learning", "Maschinelles Lernen"),
    OptionDef::undecided("topic_option_any"),
];

const LEVEL_OPTIONS: [OptionDef; 3] = [
    OptionDef::inform("level_option_beginner", "Anfänger"),
    OptionDef::inform("level_option_advanced", "Fortgeschritten"),
    OptionDef::inform("level_option_expert", "Experte"),
];

const DURATION_OPTIONS: [OptionDef; 3] = [
    OptionDef::inform("duration_option_max_10h", "10"),
    OptionDef::inform("duration_option_max_50h", "50"),
    OptionDef::inform("duration_option_any", "51"),
];

const CERTIFICATE_OPTIONS: [OptionDef; 3] = [
    OptionDef::inform("certificate_option_unqualified", "Teilnahmebescheinigung"),
    OptionDef::inform("certificate_option_qualified", "Leistungsnachweis"),
    OptionDef::undecided("certificate_option_any"),
];

pub static SLOT_PROFILES: [SlotProfile; 5] = [
    SlotProfile {
        slot: FilterSlot::Language,
        action_name: "action_ask_language",
        change_intent: "change_language_slot",
        ask_key: "ask_select_language",
        confirm_change_key: "confirm_and_show_change_language",
        undecided_value: UNDECIDED_VALUE,
        options: &LANGUAGE_OPTIONS,
    },
    SlotProfile {
        slot: FilterSlot::Topic,
        action_name: "action_ask_topic",
        change_intent: "change_topic_slot",
        ask_key: "ask_select_topic",
        confirm_change_key: "confirm_and_show_change_topic",
        undecided_value: UNDECIDED_VALUE,
        options: &TOPIC_OPTIONS,
    },
    // No "any" button for level; the recommender still counts under `egal`.
    SlotProfile {
        slot: FilterSlot::Level,
        action_name: "action_ask_level",
        change_intent: "change_level_slot",
        ask_key: "ask_select_level",
        confirm_change_key: "confirm_and_show_change_level",
        undecided_value: UNDECIDED_VALUE,
        options: &LEVEL_OPTIONS,
    },
    // "Any duration" is the 51 hour bucket.
    SlotProfile {
        slot: FilterSlot::MaxDuration,
        action_name: "action_ask_max_duration",
        change_intent: "change_max_duration_slot",
        ask_key: "ask_select_duration",
        confirm_change_key: "confirm_and_show_change_duration",
        undecided_value: "51",
        options: &DURATION_OPTIONS,
    },
    SlotProfile {
        slot: FilterSlot::Certificate,
        action_name: "action_ask_certificate",
        change_intent: "change_certificate_slot",
        ask_key: "ask_select_certificate",
        confirm_change_key: "confirm_and_show_change_certificate",
        undecided_value: UNDECIDED_VALUE,
        options: &CERTIFICATE_OPTIONS,
    },
];

pub fn profile_for(slot: FilterSlot) -> &'static SlotProfile {
    match slot {
        FilterSlot::Language => &SLOT_PROFILES[0],
        FilterSlot::Topic => &SLOT_PROFILES[1],
        FilterSlot::Level => &SLOT_PROFILES[2],
        FilterSlot::MaxDuration => &SLOT_PROFILES[3],
        FilterSlot::Certificate => &SLOT_PROFILES[4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kic_core::ResponseTable;

    #[test]
    fn table_is_indexed_by_slot() {
        for slot in FilterSlot::ALL {
            assert_eq!(profile_for(slot).slot, slot);
            assert_eq!(profile_for(slot).change_intent, format!("change_{}_slot", slot));
        }
    }

    #[test]
    fn bundled_texts_cover_every_question() {
        let table = ResponseTable::bundled().unwrap();
        for profile in &SLOT_PROFILES {
            let responses = table
                .for_action(profile.action_name, &profile.response_keys())
                .unwrap();
            assert_eq!(profile.candidates(&responses).len(), profile.options.len());
        }
    }

    #[test]
    fn undecided_commands() {
        assert_eq!(profile_for(FilterSlot::Topic).undecided_command(), SlotCommand::Undecided);
        assert_eq!(
            profile_for(FilterSlot::MaxDuration).undecided_command().encode(),
            r#"/inform{"max_duration":"51"}"#
        );
    }
}
