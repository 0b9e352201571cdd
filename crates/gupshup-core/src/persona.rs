//! Built-in persona registry.
//!
//! Gupshup ships two personas. Their system prompts live next to this crate
//! under `personas/` and are compiled into the binary.

use gupshup_types::error::ConfigError;
use gupshup_types::persona::Persona;

/// Slug of the persona used when nothing else is configured.
pub const DEFAULT_PERSONA: &str = "rishta";

const RISHTA_PROMPT: &str = include_str!("../personas/rishta.md");
const TRIP_PLANNER_PROMPT: &str = include_str!("../personas/trip_planner.md");

/// "Dil ka Rishta GPT", a playful matchmaking persona.
pub fn rishta() -> Persona {
    Persona {
        slug: "rishta".to_string(),
        name: "Dil ka Rishta GPT".to_string(),
        page_title: "Apka Rishta fix krwana meri zeemadari🤝".to_string(),
        page_icon: "💍".to_string(),
        heading: "# Dil ka Rishta GPT 💍💖".to_string(),
        tagline: "Jahan baat ho sirf dil se dil tak... Rishtay bhi, ehsaas bhi. 💞😊".to_string(),
        input_placeholder: "Type your message here...".to_string(),
        system_prompt: RISHTA_PROMPT.trim().to_string(),
        welcome_message:
            "Assalam-o-Alaikum!👋Main Dil ka Rishta GPT ho,kya ap apna Ristha fix karwna chaty hy?"
                .to_string(),
        farewell_message: "*Allah Hafiz!* Take care of yourself. Seeking help is strength. 💙"
            .to_string(),
    }
}

/// "Trip Planner GPT", a Pakistan travel-planning persona.
pub fn trip_planner() -> Persona {
    Persona {
        slug: "trip-planner".to_string(),
        name: "Trip Planner GPT".to_string(),
        page_title: "Trip Planner GPT 🇵🇰✨".to_string(),
        page_icon: "🌄".to_string(),
        heading: "# Pakistan Trip Planner GPT 🌄💚".to_string(),
        tagline: "Jahan safar ho sirf style aur sukoon ka... ⛺✈️".to_string(),
        input_placeholder: "Apna travel mood ya plan yahan likhein...".to_string(),
        system_prompt: TRIP_PLANNER_PROMPT.trim().to_string(),
        welcome_message: "Assalam-o-Alaikum safar ke deewano! 🚐 Tumhara Pakistan tour guide hazir hai, batao kahan ka plan chahiye? 🌄".to_string(),
        farewell_message: "*Khuda Hafiz!* Agla safar phir plan karte hain – Pakistan ki galiyan tumhara intezar kar rahi hain 💚".to_string(),
    }
}

/// All built-in personas, in display order.
pub fn builtin_personas() -> Vec<Persona> {
    vec![rishta(), trip_planner()]
}

/// Look up a built-in persona by slug (case-insensitive).
pub fn find(slug: &str) -> Option<Persona> {
    let slug = slug.trim().to_lowercase();
    builtin_personas().into_iter().find(|p| p.slug == slug)
}

/// Like [`find`], but reports an unknown slug as a configuration error.
pub fn resolve(slug: &str) -> Result<Persona, ConfigError> {
    find(slug).ok_or_else(|| ConfigError::UnknownPersona(slug.to_string()))
}
