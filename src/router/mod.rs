//! Chat routing for Lumi
//!
//! Picks the order in which providers are tried for a chat turn and runs the
//! sequential trial in [`ChatRouter`]. Only quota and configuration failures
//! move on to the next provider; anything else ends the call.

pub mod fallback;

pub use fallback::ChatRouter;

use crate::history::ConversationHistory;
use crate::providers::ProviderId;

/// One chat call as received from a client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatTurn {
    /// New user message, appended to `history` when non-blank
    pub message: Option<String>,
    pub history: ConversationHistory,
    /// Provider to try first; the default provider when `None`
    pub preferred: Option<ProviderId>,
}

impl ChatTurn {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_history(mut self, history: ConversationHistory) -> Self {
        self.history = history;
        self
    }

    pub fn with_preferred(mut self, preferred: ProviderId) -> Self {
        self.preferred = Some(preferred);
        self
    }
}

/// Order in which providers are tried for `preferred`
///
/// - default: `[default, alt-A, alt-B, alt-C]`
/// - alt-A: `[alt-A, default, alt-B, alt-C]`
/// - any other X: `[X, default, alt-B, alt-C]`
///
/// Later duplicates are removed so a provider is never tried twice in one
/// call.
pub fn priority_list(preferred: ProviderId) -> Vec<ProviderId> {
    let candidates = if preferred == ProviderId::DEFAULT {
        [
            ProviderId::DEFAULT,
            ProviderId::ALT_A,
            ProviderId::ALT_B,
            ProviderId::ALT_C,
        ]
    } else if preferred == ProviderId::ALT_A {
        [
            ProviderId::ALT_A,
            ProviderId::DEFAULT,
            ProviderId::ALT_B,
            ProviderId::ALT_C,
        ]
    } else {
        [
            preferred,
            ProviderId::DEFAULT,
            ProviderId::ALT_B,
            ProviderId::ALT_C,
        ]
    };

    let mut order = Vec::with_capacity(candidates.len());
    for id in candidates {
        if !order.contains(&id) {
            order.push(id);
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_preference_uses_fixed_order() {
        assert_eq!(
            priority_list(ProviderId::Gemini),
            vec![
                ProviderId::Gemini,
                ProviderId::Groq,
                ProviderId::Claude,
                ProviderId::OpenRouter
            ]
        );
    }

    #[test]
    fn test_alt_a_preference_puts_default_second() {
        assert_eq!(
            priority_list(ProviderId::Groq),
            vec![
                ProviderId::Groq,
                ProviderId::Gemini,
                ProviderId::Claude,
                ProviderId::OpenRouter
            ]
        );
    }

    #[test]
    fn test_other_preferences_drop_repeats() {
        assert_eq!(
            priority_list(ProviderId::Claude),
            vec![ProviderId::Claude, ProviderId::Gemini, ProviderId::OpenRouter]
        );
        assert_eq!(
            priority_list(ProviderId::OpenRouter),
            vec![ProviderId::OpenRouter, ProviderId::Gemini, ProviderId::Claude]
        );
    }

    #[test]
    fn test_chat_turn_builders() {
        let turn = ChatTurn::new("hi").with_preferred(ProviderId::Claude);
        assert_eq!(turn.message.as_deref(), Some("hi"));
        assert!(turn.history.is_empty());
        assert_eq!(turn.preferred, Some(ProviderId::Claude));
    }

    fn any_provider() -> impl Strategy<Value = ProviderId> {
        prop::sample::select(ProviderId::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_preferred_first_and_default_present(preferred in any_provider()) {
            let order = priority_list(preferred);
            prop_assert_eq!(order[0], preferred);
            prop_assert!(order.contains(&ProviderId::DEFAULT));
            if preferred != ProviderId::DEFAULT {
                prop_assert_eq!(order[1], ProviderId::DEFAULT);
            }
        }

        #[test]
        fn prop_no_provider_tried_twice(preferred in any_provider()) {
            let order = priority_list(preferred);
            let mut sorted = order.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), order.len());
        }

        #[test]
        fn prop_order_is_deterministic(preferred in any_provider()) {
            prop_assert_eq!(priority_list(preferred), priority_list(preferred));
        }
    }
}
