use serde::{Deserialize, Serialize};

/// Assistant persona, i.e. which system instruction frames the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    /// IT and development helper answering in one to three sentences.
    #[default]
    Concise,
    /// Senior expert giving structured, in-depth answers.
    Expert,
}

const CONCISE_INSTRUCTION: &str = "Tu es un expert en informatique et en développement : web, applications, logiciels, technologies et programmation. \
Ton objectif principal est de répondre aux questions liées à l’informatique et au développement. \
Si l’utilisateur pose une question sur un autre sujet, répond poliment et brièvement. \
Répond toujours de manière courte et concise (1-3 phrases). \
Lis le message de l’utilisateur et répond dans la même langue que lui. \
Ajoute des emojis appropriés selon le ton et le contexte. \
Reste poli, amical et compréhensible.";

const EXPERT_INSTRUCTION: &str = "Agis comme un expert senior avec plus de quinze ans d’expérience dans le domaine de la question posée \
(développement logiciel, architecture, infrastructure, sécurité, données ou produit). \
Analyse la demande, identifie le vrai besoin, puis donne une réponse structurée, précise et directement applicable, \
avec des exemples de code ou des étapes concrètes quand c’est utile. \
Signale les pièges courants et les bonnes pratiques, et dis clairement quand une information est incertaine. \
Adapte la longueur au besoin : bref pour une question simple, détaillé pour un problème complexe. \
Réponds toujours dans la langue utilisée par l’utilisateur. \
Ajoute des emojis pertinents selon le ton et le contexte, sans en abuser.";

impl Persona {
    pub fn system_instruction(self) -> &'static str {
        match self {
            Persona::Concise => CONCISE_INSTRUCTION,
            Persona::Expert => EXPERT_INSTRUCTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_personas_ask_for_users_language_and_emoji() {
        for persona in [Persona::Concise, Persona::Expert] {
            let text = persona.system_instruction();
            assert!(text.contains("langue"), "{:?}", persona);
            assert!(text.contains("emojis"), "{:?}", persona);
        }
    }

    #[test]
    fn test_concise_limits_length() {
        assert!(Persona::Concise.system_instruction().contains("1-3 phrases"));
        assert_eq!(Persona::default(), Persona::Concise);
    }

    #[test]
    fn test_persona_config_names() {
        let p: Persona = serde_json::from_str("\"expert\"").unwrap();
        assert_eq!(p, Persona::Expert);
    }
}
