// Custom ids carried by the desk's components and modals.
//
// Every id lives under the `desk:` namespace so the interaction handler can
// ignore components owned by command-local collectors (help pages etc.).

use crate::core::requests::RequestAction;

const NAMESPACE: &str = "desk";

/// Text input ids inside the submission modal.
pub const SUBJECT_INPUT: &str = "desk:subject";
pub const DETAILS_INPUT: &str = "desk:details";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeskComponent {
    /// Category select menu on the panel.
    Pick,
    /// Submission modal for a category.
    Form { category: String },
    /// Staff buttons on a review message.
    Action { action: RequestAction, number: u64 },
}

impl DeskComponent {
    pub fn action(action: RequestAction, number: u64) -> Self {
        DeskComponent::Action { action, number }
    }

    pub fn to_custom_id(&self) -> String {
        match self {
            DeskComponent::Pick => format!("{NAMESPACE}:pick"),
            DeskComponent::Form { category } => format!("{NAMESPACE}:form:{category}"),
            DeskComponent::Action { action, number } => {
                format!("{NAMESPACE}:{action}:{number}")
            }
        }
    }

    /// `None` for ids that don't belong to the desk or are malformed.
    pub fn parse(custom_id: &str) -> Option<Self> {
        let rest = custom_id.strip_prefix(NAMESPACE)?.strip_prefix(':')?;
        let (kind, arg) = match rest.split_once(':') {
            Some((kind, arg)) => (kind, Some(arg)),
            None => (rest, None),
        };

        match (kind, arg) {
            ("pick", None) => Some(DeskComponent::Pick),
            ("form", Some(category)) if !category.is_empty() => Some(DeskComponent::Form {
                category: category.to_string(),
            }),
            (kind, Some(number)) => {
                let action = match kind {
                    "claim" => RequestAction::Claim,
                    "close" => RequestAction::Close,
                    "reopen" => RequestAction::Reopen,
                    _ => return None,
                };
                let number = number.parse().ok()?;
                Some(DeskComponent::Action { action, number })
            }
            _ => None,
        }
    }
}
