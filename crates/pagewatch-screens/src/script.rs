use std::sync::Arc;

/// Visitor identity shown on the breach screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub ip: String,
    pub country: String,
}

impl Default for Identity {
    /// What is displayed before the lookup settles.
    fn default() -> Self {
        Self {
            ip: "Fetching...".to_string(),
            country: "logged".to_string(),
        }
    }
}

/// Terminal text revealed character by character on the breach screen.
///
/// Frozen when the breach screen is entered so that the revealed prefix
/// only ever grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreachScript {
    text: Arc<str>,
    char_len: usize,
}

impl BreachScript {
    #[must_use]
    pub fn new(identity: &Identity) -> Self {
        let text = format!(
            "> SYSTEM BREACH DETECTED\n\
             > IP Address: {}\n\
             > Location: {}\n\
             > ISP: Tracked and logged\n\
             > Device fingerprint captured\n\
             > All activities are being monitored",
            identity.ip, identity.country
        );
        let char_len = text.chars().count();
        Self {
            text: text.into(),
            char_len,
        }
    }

    /// Length in characters, not bytes.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The first `chars` characters, clamped to the whole script.
    #[must_use]
    pub fn prefix(&self, chars: usize) -> &str {
        match self.text.char_indices().nth(chars) {
            Some((byte_idx, _)) => &self.text[..byte_idx],
            None => &self.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            ip: "203.0.113.7".to_string(),
            country: "Côte d'Ivoire".to_string(),
        }
    }

    #[test]
    fn script_embeds_identity() {
        let script = BreachScript::new(&identity());
        assert!(script.text().contains("> IP Address: 203.0.113.7\n"));
        assert!(script.text().contains("> Location: Côte d'Ivoire\n"));
    }

    #[test]
    fn prefix_counts_characters_not_bytes() {
        let script = BreachScript::new(&identity());
        let full = script.prefix(script.char_len());
        assert_eq!(full, script.text());
        assert_eq!(script.prefix(usize::MAX), script.text());
        assert_eq!(script.prefix(0), "");
        assert_eq!(script.prefix(2), "> ");
        // Slicing through the multi-byte 'ô' must not panic.
        for n in 0..=script.char_len() {
            assert_eq!(script.prefix(n).chars().count(), n);
        }
    }
}
