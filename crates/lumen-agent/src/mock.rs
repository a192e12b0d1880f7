// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline reply generation.
//!
//! Category matching is deterministic; only the template pick within a
//! category is random, and the random source is injectable.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Longest prompt excerpt echoed by a generic reply, in characters.
pub const MAX_EXCERPT_CHARS: usize = 25;

const EXCERPT_PLACEHOLDER: &str = "{excerpt}";

/// Keyword categories, in matching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum MockCategory {
    Greeting,
    Wellbeing,
    Definition,
    Help,
    Thanks,
}

impl MockCategory {
    /// Lower-case keyword that selects this category.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Greeting => "hello",
            Self::Wellbeing => "how are you",
            Self::Definition => "what is",
            Self::Help => "help",
            Self::Thanks => "thank",
        }
    }

    pub fn templates(self) -> &'static [&'static str] {
        match self {
            Self::Greeting => &[
                "Hello! I'm running in offline mode, but I'm happy to chat.",
                "Hi there! No model is available right now, so my answers are canned.",
                "Hello! The local model server isn't reachable yet. Try again in a moment.",
            ],
            Self::Wellbeing => &[
                "I'm doing well, thanks for asking! I'm in offline mode at the moment.",
                "All good here. I can give better answers once a local model is running.",
            ],
            Self::Definition => &[
                "That's a good question. I can't look it up while offline, but a local model could explain it.",
                "I'd need a running model to define that properly. Start one and ask again.",
            ],
            Self::Help => &[
                "I can help once a local model is running. Check that the server is started and a model is pulled.",
                "Try `/status` to see whether the model server is reachable, or `/models` to list models.",
            ],
            Self::Thanks => &[
                "You're welcome!",
                "Happy to help, even in offline mode.",
            ],
        }
    }
}

/// Templates used when no category matches. `{excerpt}` is replaced by the prompt excerpt.
pub const GENERIC_TEMPLATES: &[&str] = &[
    "I'm offline right now, so I can't properly answer \"{excerpt}\".",
    "You said \"{excerpt}\". I'll have a real answer once a model is available.",
    "Interesting: \"{excerpt}\". No local model is reachable, so this is a placeholder reply.",
];

/// Returns the first matching category for `prompt`, if any.
pub fn classify(prompt: &str) -> Option<MockCategory> {
    let lower = prompt.to_lowercase();
    MockCategory::iter().find(|category| lower.contains(category.keyword()))
}

/// The trimmed prompt cut to at most [`MAX_EXCERPT_CHARS`] characters.
pub fn excerpt(prompt: &str) -> String {
    prompt.trim().chars().take(MAX_EXCERPT_CHARS).collect()
}

/// Produces plausible replies without a model. Never fails.
pub struct MockResponder {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl MockResponder {
    /// Responder seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Responder with reproducible template picks.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Seeded when `seed` is set, entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::with_seed)
    }

    /// A reply for `prompt`: a template from the first matching category, or a
    /// generic template echoing a short excerpt.
    pub fn reply(&self, prompt: &str) -> String {
        match classify(prompt) {
            Some(category) => self.pick(category.templates()).to_string(),
            None => self
                .pick(GENERIC_TEMPLATES)
                .replace(EXCERPT_PLACEHOLDER, &excerpt(prompt)),
        }
    }

    fn pick(&self, templates: &'static [&'static str]) -> &'static str {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        templates.choose(&mut *rng).copied().unwrap_or_default()
    }
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockResponder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_generic_reply(reply: &str, prompt: &str) -> bool {
        let excerpt = excerpt(prompt);
        GENERIC_TEMPLATES
            .iter()
            .any(|t| reply == t.replace(EXCERPT_PLACEHOLDER, &excerpt))
    }

    #[test]
    fn hello_prompt_uses_greeting_templates() {
        let responder = MockResponder::with_seed(7);
        let reply = responder.reply("Hello there");
        assert!(MockCategory::Greeting.templates().contains(&reply.as_str()));
    }

    #[test]
    fn categories_match_in_order() {
        assert_eq!(classify("Hello, how are you?"), Some(MockCategory::Greeting));
        assert_eq!(classify("HOW ARE YOU"), Some(MockCategory::Wellbeing));
        assert_eq!(classify("what is rust"), Some(MockCategory::Definition));
        assert_eq!(classify("can you help me"), Some(MockCategory::Help));
        assert_eq!(classify("Thanks a lot"), Some(MockCategory::Thanks));
        assert_eq!(classify("asdkjasd"), None);
    }

    #[test]
    fn unmatched_prompt_echoes_excerpt() {
        let responder = MockResponder::with_seed(1);
        let reply = responder.reply("asdkjasd");
        assert!(reply.contains("asdkjasd"));
        assert!(is_generic_reply(&reply, "asdkjasd"));
    }

    #[test]
    fn excerpt_is_bounded() {
        let prompt = "  Tell me about the history of the Byzantine empire  ";
        let cut = excerpt(prompt);
        assert_eq!(cut.chars().count(), MAX_EXCERPT_CHARS);
        assert!(prompt.trim().starts_with(&cut));

        let reply = MockResponder::with_seed(3).reply(prompt);
        assert!(reply.contains(&cut));
        assert!(!reply.contains("Byzantine empire"));
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let prompt = "ééééééééééééééééééééééééééééé";
        assert_eq!(excerpt(prompt).chars().count(), MAX_EXCERPT_CHARS);
    }

    #[test]
    fn same_seed_same_replies() {
        let a = MockResponder::with_seed(42);
        let b = MockResponder::with_seed(42);
        for prompt in ["hello", "help", "zzz", "thank you", "what is love"] {
            assert_eq!(a.reply(prompt), b.reply(prompt));
        }
    }

    #[test]
    fn empty_prompt_still_replies() {
        let reply = MockResponder::with_seed(0).reply("");
        assert!(!reply.is_empty());
        assert!(is_generic_reply(&reply, ""));
    }

    proptest::proptest! {
        #[test]
        fn reply_is_never_empty(prompt in ".{0,80}") {
            let reply = MockResponder::with_seed(9).reply(&prompt);
            proptest::prop_assert!(!reply.is_empty());
        }
    }
}
