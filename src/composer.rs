//! Builds the generation prompt and turns completions into outbound replies.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info};

use crate::classifier::MessageContext;
use crate::openai::{self, Completion, CompletionRequest};

const MAX_REPLY_TOKENS: u32 = 150;
const REPLY_TEMPERATURE: f64 = 0.8;

const SYSTEM_PROMPT: &str = "Eres un asistente que ayuda a responder mensajes de cumpleaños \
     de manera natural y personalizada. Debes responder como si fueras la persona que recibe \
     el mensaje, no como un bot.";

/// Separator patterns that mark a completion as two messages, in priority
/// order. The first one that matches wins; captures are the two parts.
static SPLIT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(.+?)\n\n(.+)",
        r"(.+?)\n(.+)",
        r"(.+?)\s{2,}(.+)",
        r"(.+?)\|\|(.+)",
        r"(.+?)\|\s*(.+)",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Seam between the composer and whatever produces completions.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, req: &CompletionRequest) -> Result<Completion, openai::Error>;
}

#[async_trait]
impl CompletionBackend for openai::Client {
    async fn complete(&self, req: &CompletionRequest) -> Result<Completion, openai::Error> {
        self.chat(req).await
    }
}

pub struct Composer {
    backend: Arc<dyn CompletionBackend>,
}

impl Composer {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Generate one reply for a classified greeting. Backend errors propagate
    /// unchanged; there is no retry and no canned fallback text.
    pub async fn compose(&self, ctx: &MessageContext) -> Result<String, openai::Error> {
        let prompt = build_prompt(ctx);
        debug!("prompt for {}:\n{prompt}", ctx.contact.display_name);

        let request = CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: prompt,
            max_tokens: MAX_REPLY_TOKENS,
            temperature: REPLY_TEMPERATURE,
        };

        let completion = self.backend.complete(&request).await?;
        match completion.total_tokens {
            Some(tokens) => info!("🧠 reply generated ({tokens} tokens)"),
            None => info!("🧠 reply generated"),
        }

        Ok(completion.text.trim().to_string())
    }
}

/// The full user prompt. The instruction block is verbatim from the persona
/// this bot answers as; only the sender details vary.
pub fn build_prompt(ctx: &MessageContext) -> String {
    let name = &ctx.contact.display_name;
    let text = &ctx.text;
    let len = ctx.length;
    format!(
        r#"Contexto: Es mi cumpleaños y recibí un mensaje de felicitaciónes de {name}.

Información del remitente:
- Nombre completo: {name}
- Mensaje recibido: "{text}"
- Longitud del mensaje: {len} caracteres

Instrucciones IMPORTANTES:
1. Responde de manera NATURAL y HUMANA, el objetivo es que nadie se de cuenta que eres un bot
2. NO uses emojis en la respuesta
3. no uses tantos signos de exclamacion, si usas, que sea solo al final
4. responde en el mismo estilo de escritura del mensaje original
5. no uses frases prearmadas como "voy a pasarla de diez!" parece poco natural
6. NO uses mi nombre en la respuesta, solo responde agradeciendo
7. NO uses {name} tal cual en la respuesta, usa un apodo o algo mas lunfardo.
8. centrate en los ejemplos de respuesta que te dejo a continuacion, no uses frases prearmadas
9. Contesta de forma bien argentina.
10. usa dos "s" en gracias y dos "o" en amigo, o en abrazo, es decir amigoo, o abrazoo, etc. pero no uses todas esas palabras en la respuesta.
11. no usas comas. ni signos de puntuacion. hasta si te podes equivocar escribiendo mejor.
12. Tenes que igualar la intensidad de la respuesta al mensaje original.
13. nadie dice "nos vemos pronto", solo se dice "nos vemoss". nunca uses "nos vemos pronto" en la respuesta.

te dejo ejemplos de respuesta:
- "graciass, te mando un abrazoo"
- "amigoo, gracias por el mensajito"
- "broder que lindo! gracias por acordarte, te mando un abrazoo"
- "gracias amigoo, te mando un abrazo!"
- "gracias queridoo, te mando un abrazoo"
- "graciass hablamos para hacer algoo"

Respuesta:"#
    )
}

/// Split a completion into at most two sendable parts. The first separator
/// pattern that matches wins; both captures come back trimmed.
pub fn split_into_messages(text: &str) -> Vec<String> {
    for pattern in SPLIT_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            return vec![caps[1].trim().to_string(), caps[2].trim().to_string()];
        }
    }
    vec![text.trim().to_string()]
}
