use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Models the pipeline can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelKey {
    DeepseekV3,
    GlmCoding,
    QwenTurbo,
}

/// Order in which models are tried.
pub const FALLBACK_CHAIN: [ModelKey; 3] = [ModelKey::DeepseekV3, ModelKey::GlmCoding, ModelKey::QwenTurbo];

impl ModelKey {
    /// Provider model identifier sent with the request.
    pub fn id(self) -> &'static str {
        match self {
            Self::DeepseekV3 => "deepseek/deepseek-chat",
            Self::GlmCoding => "z-ai/glm-4.5",
            Self::QwenTurbo => "qwen/qwen-turbo",
        }
    }

    /// Human readable model name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::DeepseekV3 => "DeepSeek V3",
            Self::GlmCoding => "GLM 4.5",
            Self::QwenTurbo => "Qwen Turbo",
        }
    }

    /// Key of this model's circuit.
    pub fn circuit_key(self) -> &'static str {
        self.into()
    }
}
