//! The two reply languages and every fixed string the bot sends.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
}

impl Language {
    /// Short code, also used as the inline button callback payload.
    pub fn code(self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "fr" => Some(Language::Fr),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::Fr => "Français 🇫🇷",
            Language::En => "English 🇬🇧",
        }
    }

    pub const ALL: [Language; 2] = [Language::Fr, Language::En];
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Shown above the language picker to users who never chose a language.
pub const WELCOME_PICKER: &str = "👋 Salut ! Bienvenue sur ton assistant IA spécialisé en informatique et développement.\n\
Choisis ta langue pour commencer / Choose your language:";

pub fn greeting(lang: Language) -> &'static str {
    match lang {
        Language::Fr => {
            "👋 Salut ! Je suis ton assistant IA. Je peux t’aider surtout avec le développement web, les applications et les technologies.\n\
Pose-moi une question et je te répondrai !\n\n\
Commandes utiles :\n\
/clear - Effacer l’historique de la conversation\n\
/help - Aide"
        }
        Language::En => {
            "👋 Hello! I’m your AI assistant. I mainly help with web development, apps, and technology questions. \
Ask me anything and I’ll answer!\n\n\
Useful commands:\n\
/clear - Clear the conversation history\n\
/help - Help"
        }
    }
}

pub fn language_selected(lang: Language) -> &'static str {
    match lang {
        Language::Fr => "🇫🇷 Langue sélectionnée : Français ! Pose-moi une question.",
        Language::En => "🇬🇧 Language selected: English! Ask me a question.",
    }
}

pub fn help(lang: Language) -> &'static str {
    match lang {
        Language::Fr => {
            "ℹ️ Voici ce que je peux faire :\n\
- Répondre aux questions sur l’informatique et le développement\n\
- /clear pour recommencer la conversation"
        }
        Language::En => {
            "ℹ️ Here’s what I can do:\n\
- Answer questions about IT and development\n\
- /clear to start the conversation over"
        }
    }
}

pub fn history_cleared(lang: Language) -> &'static str {
    match lang {
        Language::Fr => "🧹 Historique effacé. La conversation recommence à zéro.",
        Language::En => "🧹 History cleared. The conversation starts over.",
    }
}

pub fn empty_message(lang: Language) -> &'static str {
    match lang {
        Language::Fr => "⚠️ Message vide.",
        Language::En => "⚠️ Empty message.",
    }
}

pub fn generic_error(lang: Language) -> &'static str {
    match lang {
        Language::Fr => "⚠️ Une erreur est survenue.",
        Language::En => "⚠️ An error occurred.",
    }
}
