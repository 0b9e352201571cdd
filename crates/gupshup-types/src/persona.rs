//! Persona definition types for Gupshup.
//!
//! A persona is pure data: the system instruction that shapes every reply,
//! plus the cosmetic strings a front end shows around the conversation.

use serde::{Deserialize, Serialize};

/// A chat persona: system prompt plus page dressing.
///
/// Loaded from the built-in registry or a user-supplied TOML file. Never
/// mutated once a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Stable identifier used on the command line and in config.toml.
    pub slug: String,
    /// Display name the persona uses for itself.
    pub name: String,
    /// Browser/page title.
    pub page_title: String,
    /// Single emoji used as the page icon and chat avatar.
    pub page_icon: String,
    /// Headline shown above the conversation.
    pub heading: String,
    /// One-line subtitle shown under the heading.
    #[serde(default)]
    pub tagline: String,
    /// Placeholder text for the message input box.
    #[serde(default = "default_input_placeholder")]
    pub input_placeholder: String,
    /// Instruction text sent to the model as the system prompt.
    pub system_prompt: String,
    /// Greeting shown (and remembered) when a session starts.
    pub welcome_message: String,
    /// Fixed goodbye shown when the user types an exit keyword.
    pub farewell_message: String,
}

fn default_input_placeholder() -> String {
    "Type your message here...".to_string()
}

/// Front-end facing subset of a persona (no system prompt).
#[derive(Debug, Clone, Serialize)]
pub struct PersonaPage<'a> {
    pub slug: &'a str,
    pub name: &'a str,
    pub page_title: &'a str,
    pub page_icon: &'a str,
    pub heading: &'a str,
    pub tagline: &'a str,
    pub input_placeholder: &'a str,
}

impl Persona {
    /// The cosmetic fields a page needs, without the system prompt.
    pub fn page(&self) -> PersonaPage<'_> {
        PersonaPage {
            slug: &self.slug,
            name: &self.name,
            page_title: &self.page_title,
            page_icon: &self.page_icon,
            heading: &self.heading,
            tagline: &self.tagline,
            input_placeholder: &self.input_placeholder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_from_toml_with_defaults() {
        let toml_str = r##"
slug = "chef"
name = "Chef GPT"
page_title = "Chef GPT"
page_icon = "🍲"
heading = "# Chef GPT"
system_prompt = "You only talk about cooking."
welcome_message = "Salam! Kya pakayein aaj?"
farewell_message = "Khuda Hafiz!"
"##;
        let persona: Persona = toml::from_str(toml_str).unwrap();
        assert_eq!(persona.slug, "chef");
        assert_eq!(persona.tagline, "");
        assert_eq!(persona.input_placeholder, "Type your message here...");
    }

    #[test]
    fn test_page_omits_system_prompt() {
        let persona = Persona {
            slug: "x".to_string(),
            name: "X".to_string(),
            page_title: "X".to_string(),
            page_icon: "*".to_string(),
            heading: "X".to_string(),
            tagline: String::new(),
            input_placeholder: String::new(),
            system_prompt: "secret rules".to_string(),
            welcome_message: "hi".to_string(),
            farewell_message: "bye".to_string(),
        };
        let json = serde_json::to_string(&persona.page()).unwrap();
        assert!(!json.contains("secret rules"));
        assert!(json.contains("\"page_icon\":\"*\""));
    }
}
