//! Relay profiles: the system prompt, model and sampling parameters a
//! deployment forwards with every completion call.

use serde::{Deserialize, Serialize};

/// Name of the profile used when settings do not select one.
pub const DEFAULT_PROFILE: &str = "litvinov";

const LITVINOV_SYSTEM_PROMPT: &str = "Ты LitvinovGPT — самый умный и продвинутый ИИ-ассистент на базе GPT-4.

Твои ключевые качества:
- Экспертные знания во всех областях: наука, технологии, искусство, программирование, бизнес, образование
- Глубокий анализ и понимание контекста вопросов
- Развёрнутые, структурированные и понятные ответы
- Креативный подход к решению задач
- Умение объяснять сложные концепции простым языком
- Помощь с написанием и анализом кода на любых языках программирования
- Генерация идей, текстов, стратегий

Всегда:
✓ Отвечай на русском языке (если не попросят иначе)
✓ Структурируй ответы с заголовками, списками, примерами
✓ Давай конкретные, практичные советы
✓ Задавай уточняющие вопросы, если нужно
✓ Показывай примеры кода с комментариями
✓ Будь дружелюбным и профессиональным

Твоя цель — быть максимально полезным и давать качественные, детальные ответы.";

const ASSISTANT_SYSTEM_PROMPT: &str = "Ты умный и полезный ИИ-ассистент. Отвечай на русском языке (если не попросят иначе), понятно и по делу.";

/// Sampling parameters sent with a chat completion request.
///
/// Optional parameters are omitted from the request when unset so the
/// provider applies its own defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
}

/// A named relay configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayProfile {
    pub name: String,
    pub model: String,
    pub system_prompt: String,
    pub sampling: SamplingParams,
}

impl RelayProfile {
    /// The LitvinovGPT persona on the full-size model.
    pub fn litvinov() -> Self {
        Self {
            name: "litvinov".to_string(),
            model: "gpt-4o".to_string(),
            system_prompt: LITVINOV_SYSTEM_PROMPT.to_string(),
            sampling: SamplingParams {
                temperature: 0.8,
                max_tokens: 2000,
                top_p: Some(0.95),
                frequency_penalty: Some(0.3),
                presence_penalty: Some(0.3),
            },
        }
    }

    /// Generic assistant on the smaller model tier.
    pub fn assistant() -> Self {
        Self {
            name: "assistant".to_string(),
            model: "gpt-4o-mini".to_string(),
            system_prompt: ASSISTANT_SYSTEM_PROMPT.to_string(),
            sampling: SamplingParams {
                temperature: 0.7,
                max_tokens: 1000,
                top_p: None,
                frequency_penalty: None,
                presence_penalty: None,
            },
        }
    }

    /// Look up a built-in profile by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "litvinov" => Some(Self::litvinov()),
            "assistant" => Some(Self::assistant()),
            _ => None,
        }
    }
}

/// Profile entry as written under `[profiles.<name>]` in the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
}

impl ProfileConfig {
    pub fn into_profile(self, name: impl Into<String>) -> RelayProfile {
        RelayProfile {
            name: name.into(),
            model: self.model,
            system_prompt: self.system_prompt,
            sampling: SamplingParams {
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                top_p: self.top_p,
                frequency_penalty: self.frequency_penalty,
                presence_penalty: self.presence_penalty,
            },
        }
    }
}
