use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::inference::{InferenceClient, InferenceError};
use crate::models::chat::{ChatTurn, Role};
use crate::services::materials::CourseMaterials;

/// Shown to the user instead of an answer when the provider is rate limiting
pub const RATE_LIMIT_APOLOGY: &str =
    "Sorry, the assistant is busy right now. Please try again in a moment.";

pub const WELCOME_MESSAGE: &str = "Hello! I'm the AI teaching assistant for this course. \
     Ask me anything about the lecture materials! 💡";

const ASSISTANT_PERSONA: &str = "You are a friendly and professional AI teaching assistant. \
Follow these guidelines when answering:

1. Answer style:
- Begin with 'Hello! I'm your AI teaching assistant. 💡'
- Explain at the student's level
- Use concrete examples
- Recommend further learning resources

2. Feedback:
- Give constructive feedback
- Check the student's understanding
- Suggest directions for deeper study

Answer based on the reference material below.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("course materials are not loaded")]
    NoMaterials,
    #[error("conversation must end with a user message")]
    NoUserPrompt,
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    Answer(String),
    RetryLater(String),
}

/// Answers student questions grounded in the loaded course materials
pub struct ChatService {
    inference: Arc<dyn InferenceClient>,
    materials: CourseMaterials,
}

impl ChatService {
    pub fn new(inference: Arc<dyn InferenceClient>, materials: CourseMaterials) -> Self {
        Self {
            inference,
            materials,
        }
    }

    pub fn has_materials(&self) -> bool {
        !self.materials.is_empty()
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "{}\n\nReference material:\n{}",
            ASSISTANT_PERSONA, self.materials.text
        )
    }

    /// Produce the assistant's next turn for a conversation
    pub async fn respond(&self, history: &[ChatTurn]) -> Result<ChatReply, ChatError> {
        if !self.has_materials() {
            warn!("Chat request rejected: no course materials loaded");
            return Err(ChatError::NoMaterials);
        }

        let turns: Vec<ChatTurn> = history
            .iter()
            .filter(|turn| turn.role != Role::System)
            .cloned()
            .collect();

        match turns.last() {
            Some(last) if last.role == Role::User && !last.content.trim().is_empty() => {}
            _ => return Err(ChatError::NoUserPrompt),
        }

        info!("Generating assistant reply for {} turns", turns.len());

        match self.inference.complete(&self.system_prompt(), &turns).await {
            Ok(answer) => Ok(ChatReply::Answer(answer)),
            Err(err) if err.is_rate_limited() => {
                warn!("Inference provider is rate limiting: {}", err);
                Ok(ChatReply::RetryLater(RATE_LIMIT_APOLOGY.to_string()))
            }
            Err(err) => {
                error!("Inference failed: {}", err);
                Err(ChatError::Inference(err))
            }
        }
    }
}
