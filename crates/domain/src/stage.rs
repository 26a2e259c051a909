//! The pipeline stage machine — a fixed, ordered progression of lead
//! activities plus the recommended-action and confirmation texts keyed
//! by stage.
//!
//! Stages are a closed enum rather than free-form strings so an unknown
//! activity label is an explicit [`Progressability::OutsidePipeline`]
//! case instead of a silent failed lookup. Labels written to and read
//! from the CRM are the exact strings the CRM stores.

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Stage enum
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A known pipeline stage, in funnel order. `SeeCaseNotes` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Fresh,
    AttemptingContact,
    QuotationEmailSent,
    QuestionnaireSent,
    QuestionnaireChasing,
    QuestionnaireFinalChase,
    QuestionnaireReceived,
    InformalQuoteGiven,
    QuoteGiven,
    AwaitingClientInstruction,
    DetailsPassed,
    SeeCaseNotes,
}

/// All stages in funnel order.
pub const ALL_STAGES: [Stage; 12] = [
    Stage::Fresh,
    Stage::AttemptingContact,
    Stage::QuotationEmailSent,
    Stage::QuestionnaireSent,
    Stage::QuestionnaireChasing,
    Stage::QuestionnaireFinalChase,
    Stage::QuestionnaireReceived,
    Stage::InformalQuoteGiven,
    Stage::QuoteGiven,
    Stage::AwaitingClientInstruction,
    Stage::DetailsPassed,
    Stage::SeeCaseNotes,
];

impl Stage {
    /// The exact label the CRM stores for this stage.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Fresh => "Fresh",
            Stage::AttemptingContact => "Attempting to make contact with lead",
            Stage::QuotationEmailSent => "Quotation Email Sent",
            Stage::QuestionnaireSent => "Questionnaire Sent",
            Stage::QuestionnaireChasing => "Questionnaire Chasing",
            Stage::QuestionnaireFinalChase => "Questionnaire Final Chase",
            Stage::QuestionnaireReceived => "Questionnaire Received, Awaiting Assessment",
            Stage::InformalQuoteGiven => "Informal Quote Given, Awaiting Response",
            Stage::QuoteGiven => "Quote Given, Awaiting Response",
            Stage::AwaitingClientInstruction => "Awaiting Client Instruction",
            Stage::DetailsPassed => "Details Passed To Relevant People For Contact",
            Stage::SeeCaseNotes => "See Case Notes",
        }
    }

    /// Parse an exact CRM label. `None` for anything outside the pipeline
    /// (terminal/excluded labels like "Lost Lead" included).
    pub fn from_label(label: &str) -> Option<Stage> {
        ALL_STAGES.into_iter().find(|s| s.label() == label)
    }

    /// The successor stage. `None` only for the terminal stage.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Fresh => Some(Stage::AttemptingContact),
            Stage::AttemptingContact => Some(Stage::QuotationEmailSent),
            Stage::QuotationEmailSent => Some(Stage::QuestionnaireSent),
            Stage::QuestionnaireSent => Some(Stage::QuestionnaireChasing),
            Stage::QuestionnaireChasing => Some(Stage::QuestionnaireFinalChase),
            Stage::QuestionnaireFinalChase => Some(Stage::QuestionnaireReceived),
            Stage::QuestionnaireReceived => Some(Stage::InformalQuoteGiven),
            Stage::InformalQuoteGiven => Some(Stage::QuoteGiven),
            Stage::QuoteGiven => Some(Stage::AwaitingClientInstruction),
            Stage::AwaitingClientInstruction => Some(Stage::DetailsPassed),
            Stage::DetailsPassed => Some(Stage::SeeCaseNotes),
            Stage::SeeCaseNotes => None,
        }
    }

    /// The recommended next action for a lead sitting at this stage.
    pub fn recommended_action(self) -> &'static str {
        match self {
            Stage::Fresh => "Send an introductory email to make first contact",
            Stage::AttemptingContact => "Send a quotation email with questionnaire",
            Stage::QuotationEmailSent => "Monitor for response and follow up if needed",
            Stage::QuestionnaireSent => "Set reminder to follow up on questionnaire response",
            Stage::QuestionnaireChasing => "Send follow-up email about the questionnaire",
            Stage::QuestionnaireFinalChase => "Make final attempt to get questionnaire response",
            Stage::QuestionnaireReceived => "Review and assess the questionnaire responses",
            Stage::InformalQuoteGiven => "Monitor for response to the informal quote",
            Stage::QuoteGiven => "Follow up on the formal quote response",
            Stage::AwaitingClientInstruction => {
                "Wait for client to provide further instructions"
            }
            Stage::DetailsPassed => "Ensure relevant team has contacted the lead",
            Stage::SeeCaseNotes => "Review case notes for current status and next steps",
        }
    }

    /// The confirmation question put to the user before acting.
    pub fn confirmation_question(self) -> &'static str {
        match self {
            Stage::Fresh => "Should I send an introductory email to this lead?",
            Stage::AttemptingContact => {
                "Should I send a quotation email with questionnaire to this lead?"
            }
            Stage::QuotationEmailSent => {
                "Should I monitor for their response to the quotation email?"
            }
            Stage::QuestionnaireSent => {
                "Should I set a reminder to follow up on the questionnaire in a few days?"
            }
            Stage::QuestionnaireChasing => {
                "Should I send a follow-up email to chase the questionnaire response?"
            }
            Stage::QuestionnaireFinalChase => {
                "Should I make a final attempt to get the questionnaire response?"
            }
            Stage::QuestionnaireReceived => {
                "Should I review and assess the questionnaire responses now?"
            }
            Stage::InformalQuoteGiven => {
                "Should I monitor for their response to the informal quote?"
            }
            Stage::QuoteGiven => "Should I set up follow-up for the formal quote response?",
            Stage::AwaitingClientInstruction => {
                "Should I wait for the client to provide further instructions?"
            }
            Stage::DetailsPassed => {
                "Should I check if the relevant team has contacted this lead?"
            }
            Stage::SeeCaseNotes => {
                "Should I review the case notes to determine the next steps?"
            }
        }
    }

    /// Human-readable meaning of the stage.
    pub fn description(self) -> &'static str {
        match self {
            Stage::Fresh => "New lead that hasn't been contacted yet",
            Stage::AttemptingContact => "Actively trying to reach the lead",
            Stage::QuotationEmailSent => "Quotation email with questionnaire has been sent",
            Stage::QuestionnaireSent => "Initial questionnaire has been sent to the lead",
            Stage::QuestionnaireChasing => "Following up on the sent questionnaire",
            Stage::QuestionnaireFinalChase => "Final attempt to get questionnaire response",
            Stage::QuestionnaireReceived => "Questionnaire received, being reviewed",
            Stage::InformalQuoteGiven => "Initial quote provided, waiting for response",
            Stage::QuoteGiven => "Formal quote provided, waiting for response",
            Stage::AwaitingClientInstruction => {
                "Waiting for client to provide further instructions"
            }
            Stage::DetailsPassed => "Lead details forwarded to appropriate team",
            Stage::SeeCaseNotes => "Refer to case notes for current status",
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// String-level contract
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Next stage for an activity label, if the label is a progressable
/// pipeline stage.
pub fn next_stage(label: &str) -> Option<Stage> {
    Stage::from_label(label).and_then(Stage::next)
}

/// True iff the label is a key of the progression table — a known stage
/// with a recorded successor. The terminal stage and excluded labels
/// ("Lost Lead", "DO NOT CONTACT", etc.) are not progressable.
pub fn is_progressable(label: &str) -> bool {
    next_stage(label).is_some()
}

/// Describe an activity label, falling back to the raw label for
/// anything the pipeline doesn't know about.
pub fn describe(label: &str) -> String {
    match Stage::from_label(label) {
        Some(stage) => stage.description().to_string(),
        None => label.to_string(),
    }
}

/// Why a label can or cannot be progressed. Distinguishes the terminal
/// stage (known, no successor) from labels outside the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progressability {
    Progressable(Stage),
    Terminal(Stage),
    OutsidePipeline,
}

pub fn classify(label: &str) -> Progressability {
    match Stage::from_label(label) {
        Some(stage) => match stage.next() {
            Some(_) => Progressability::Progressable(stage),
            None => Progressability::Terminal(stage),
        },
        None => Progressability::OutsidePipeline,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Dashboard board columns
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Dashboard grouping for an activity label. Covers the pipeline stages
/// and the non-progressable labels the CRM also stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoardColumn {
    Leads,
    Questionnaire,
    Quotation,
    DetailsPassed,
    LostCases,
    Others,
}

pub fn board_column(label: &str) -> BoardColumn {
    match label {
        "Fresh" | "Attempting to make contact with lead" => BoardColumn::Leads,
        "Questionnaire Sent"
        | "Questionnaire Chasing"
        | "Questionnaire Final Chase"
        | "Questionnaire Received, Awaiting Assessment" => BoardColumn::Questionnaire,
        "Quotation Email Sent"
        | "Informal Quote Given, Awaiting Response"
        | "Quote Given, Awaiting Response"
        | "Awaiting Client Instruction"
        | "MVL Quote Sent" => BoardColumn::Quotation,
        "Details Passed To Relevant People For Contact" | "See Case Notes" => {
            BoardColumn::DetailsPassed
        }
        "Lost Lead" | "Lost Potential" | "Lost Client" | "DO NOT CONTACT" | "REJECTED" => {
            BoardColumn::LostCases
        }
        _ => BoardColumn::Others,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_non_terminal_stage_has_a_successor() {
        for stage in ALL_STAGES {
            if stage == Stage::SeeCaseNotes {
                assert!(stage.next().is_none());
                assert!(!is_progressable(stage.label()));
            } else {
                assert!(stage.next().is_some(), "{:?} has no successor", stage);
                assert!(is_progressable(stage.label()));
            }
        }
    }

    #[test]
    fn labels_round_trip() {
        for stage in ALL_STAGES {
            assert_eq!(Stage::from_label(stage.label()), Some(stage));
        }
    }

    #[test]
    fn unknown_labels_are_not_progressable() {
        for label in ["Lost Lead", "DO NOT CONTACT", "", "fresh"] {
            assert!(!is_progressable(label));
            assert_eq!(next_stage(label), None);
            assert_eq!(classify(label), Progressability::OutsidePipeline);
        }
    }

    #[test]
    fn fresh_progresses_to_attempting_contact() {
        assert_eq!(
            next_stage("Fresh").map(Stage::label),
            Some("Attempting to make contact with lead")
        );
    }

    #[test]
    fn terminal_stage_is_classified_terminal() {
        assert_eq!(
            classify("See Case Notes"),
            Progressability::Terminal(Stage::SeeCaseNotes)
        );
    }

    #[test]
    fn describe_falls_back_to_raw_label() {
        assert_eq!(describe("Lost Lead"), "Lost Lead");
        assert_eq!(
            describe("Fresh"),
            "New lead that hasn't been contacted yet"
        );
    }

    #[test]
    fn every_stage_has_nonempty_texts() {
        for stage in ALL_STAGES {
            assert!(!stage.recommended_action().is_empty());
            assert!(!stage.confirmation_question().is_empty());
            assert!(!stage.description().is_empty());
        }
    }

    #[test]
    fn board_columns_cover_lost_cases() {
        assert_eq!(board_column("Lost Lead"), BoardColumn::LostCases);
        assert_eq!(board_column("Fresh"), BoardColumn::Leads);
        assert_eq!(board_column("Telesales"), BoardColumn::Others);
    }
}
