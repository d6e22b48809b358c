//! Prompt text per mode and tone.

use crate::domain::suggestion::{Mode, SuggestionContext, Tone};

fn tone_description(tone: Tone) -> &'static str {
    match tone {
        Tone::Casual => "descontraído, natural e amigável",
        Tone::Provocative => "ousado e confiante, sem ser sexual",
        Tone::Playful => "brincalhão, criativo e leve",
        Tone::Indifferent => "misterioso, estrategicamente desinteressado",
        Tone::Romantic => "romântico e encantador, sem ser meloso",
        Tone::Funny => "bem-humorado e inteligente",
    }
}

fn mission(mode: Mode) -> &'static str {
    match mode {
        Mode::Reply => {
            "O usuário está no meio de uma conversa. Sugira respostas curtas para ele mandar em seguida. \
             Uma imagem anexada é um print da conversa: foque nas últimas mensagens."
        }
        Mode::Initiate => {
            "O usuário quer puxar assunto. Sugira aberturas criativas, sem clichês. \
             Uma imagem anexada é uma foto da pessoa ou da situação: use detalhes do ambiente, \
             nunca comente o corpo."
        }
        Mode::Tension => {
            "O usuário está numa situação tensa ou embaraçosa. Sugira mensagens maduras que \
             aliviem o clima sem mentir nem culpar ninguém."
        }
    }
}

/// System prompt for a mode and tone.
pub fn system_prompt(mode: Mode, tone: Tone, max_suggestions: usize) -> String {
    format!(
        "Você é o Xaveco, um wingman digital brasileiro.\n\n\
         MISSÃO: {mission}\n\n\
         REGRAS: português do Brasil, frases curtas e fáceis de copiar, tom {tone}. \
         Sempre com respeito e consentimento. Nada de conteúdo sexual explícito, assédio, \
         xingamentos ou manipulação.\n\n\
         FORMATO: retorne APENAS um array JSON com 2 a {max} strings, sem texto extra.",
        mission = mission(mode),
        tone = tone_description(tone),
        max = max_suggestions,
    )
}

/// User turn text. The raw input is passed as context, never echoed back.
///
/// With neither text nor image the generator is asked for generic lines
/// that work in any conversation.
pub fn user_prompt(context: &SuggestionContext, max_suggestions: usize) -> String {
    let tone = tone_description(context.tone);
    match (&context.input, &context.image) {
        (Some(input), _) => format!(
            "Contexto (use para personalizar, sem revelar que o recebeu):\n\n{}\n\n\
             Crie de 2 a {} sugestões no tom {}.",
            input, max_suggestions, tone
        ),
        (None, Some(_)) => format!(
            "Crie de 2 a {} sugestões no tom {} a partir da imagem.",
            max_suggestions, tone
        ),
        (None, None) => format!(
            "Crie de 2 a {} sugestões universais e interessantes no tom {}.",
            max_suggestions, tone
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::suggestion::ImageData;

    #[test]
    fn every_mode_and_tone_produces_a_prompt() {
        for mode in Mode::ALL {
            for tone in Tone::ALL {
                let prompt = system_prompt(mode, tone, 4);
                assert!(prompt.contains("array JSON"));
                assert!(prompt.contains(tone_description(tone)));
            }
        }
    }

    #[test]
    fn user_prompt_embeds_input() {
        let context =
            SuggestionContext::new(Mode::Reply, Tone::Funny, Some("oi sumida".into()), None);
        assert!(user_prompt(&context, 4).contains("oi sumida"));
    }

    #[test]
    fn user_prompt_without_input_depends_on_image() {
        let image = ImageData::new("aGVsbG8=").unwrap();
        let with_image = SuggestionContext::new(Mode::Reply, Tone::Casual, None, Some(image));
        let blank = SuggestionContext::new(Mode::Reply, Tone::Casual, None, None);

        assert!(user_prompt(&with_image, 4).contains("imagem"));
        assert!(user_prompt(&blank, 4).contains("universais"));
        assert!(!user_prompt(&blank, 4).contains("imagem"));
    }
}
