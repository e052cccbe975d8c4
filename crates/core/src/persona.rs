//! Persona — the system directive injected at the front of every session.

use serde::{Deserialize, Serialize};

/// Who the assistant is and who it is talking to.
///
/// The directive text built here is the only system turn a session ever
/// holds; the dispatch loop inserts it idempotently at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// The assistant's display name.
    pub assistant_name: String,

    /// The user's display name, woven into the directive.
    pub user_name: String,
}

impl Persona {
    pub fn new(assistant_name: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            user_name: user_name.into(),
        }
    }

    /// Render the system directive.
    pub fn directive(&self) -> String {
        format!(
            "You are {assistant}, a desktop automation assistant. \
             Speak the language the user talks in. \
             You control this computer through the provided tools and can also hold general conversation. \
             Use internet_search for recent or public information, and web_scrape to read the content of known URLs. \
             If the user names an application you do not recognize, treat the name as valid and proceed. \
             Use tools only when the request needs them.\n\n\
             After using internet_search or web_scrape, list the final URLs under a 'Sources:' section, for example:\n\
             Sources:\n\
             1. www.example.com\n\
             2. www.example2.com\n\n\
             Always respond in Markdown and stay accurate and to the point. \
             The user's name is {user}.",
            assistant = self.assistant_name,
            user = self.user_name,
        )
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::new("DeskPilot", "there")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_names_both_parties() {
        let persona = Persona::new("DeskPilot", "Ada");
        let directive = persona.directive();
        assert!(directive.contains("DeskPilot"));
        assert!(directive.contains("Ada"));
        assert!(directive.contains("Sources:"));
    }
}
