//! Deterministic stub backend.
//!
//! A `StubModel` plays back canned responses through the same `Model` trait
//! the live clients implement, so workflow stages run one code path whether
//! credentials are configured or not. Output is fixed at construction time
//! and the turn lookup is stateless, which makes repeated invocations
//! byte-identical.

use async_trait::async_trait;
use promptforge_abstraction::{
    ChatMessage, Model, ModelError, ModelParameters, ModelResponse, ModelUsage,
};
use tracing::debug;

/// One canned exchange: the content and usage the stub reports for a turn.
#[derive(Debug, Clone)]
pub struct StubTurn {
    /// The fixed completion text.
    pub content: String,
    /// The fixed token usage reported alongside it.
    pub usage: ModelUsage,
}

impl StubTurn {
    /// Creates a canned turn.
    #[must_use]
    pub fn new(content: impl Into<String>, usage: ModelUsage) -> Self {
        Self { content: content.into(), usage }
    }
}

/// A scripted implementation of the `Model` trait.
///
/// The turn is selected from the conversation depth: a single user message
/// plays turn 0, a user/assistant/user history plays turn 1, and so on,
/// clamping to the final turn. No interior state is involved.
#[derive(Debug, Clone)]
pub struct StubModel {
    model_id: String,
    turns: Vec<StubTurn>,
}

impl StubModel {
    /// Creates a stub that answers every call with the same single turn.
    #[must_use]
    pub fn single(model_id: impl Into<String>, turn: StubTurn) -> Self {
        Self { model_id: model_id.into(), turns: vec![turn] }
    }

    /// Creates a stub scripted with a sequence of turns.
    ///
    /// # Panics
    /// Panics if `turns` is empty.
    #[must_use]
    pub fn scripted(model_id: impl Into<String>, turns: Vec<StubTurn>) -> Self {
        assert!(!turns.is_empty(), "StubModel requires at least one turn");
        Self { model_id: model_id.into(), turns }
    }

    fn turn_for(&self, messages: &[ChatMessage]) -> &StubTurn {
        // messages.len() is 1 on the first turn, 3 on the second (the caller
        // appends the assistant reply and a follow-up user message).
        let index = messages.len().saturating_sub(1) / 2;
        self.turns.get(index).unwrap_or_else(|| {
            self.turns.last().unwrap_or_else(|| unreachable!("turns is non-empty"))
        })
    }
}

#[async_trait]
impl Model for StubModel {
    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.model_id,
            message_count = messages.len(),
            parameters = ?parameters,
            "StubModel playing back canned response"
        );

        let turn = self.turn_for(messages);
        Ok(ModelResponse {
            content: turn.content.clone(),
            model_id: Some(self.model_id.clone()),
            usage: Some(turn.usage),
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(prompt: u32, completion: u32) -> ModelUsage {
        ModelUsage::new(prompt, completion)
    }

    #[tokio::test]
    async fn test_single_turn_playback() {
        let stub = StubModel::single("stub-model", StubTurn::new("fixed", usage(200, 150)));
        let response = stub.generate_text("anything", None).await.unwrap();
        assert_eq!(response.content, "fixed");
        assert_eq!(response.usage.unwrap().total_tokens, 350);
    }

    #[tokio::test]
    async fn test_turn_selection_by_conversation_depth() {
        let stub = StubModel::scripted(
            "stub-model",
            vec![
                StubTurn::new("first", usage(10, 10)),
                StubTurn::new("second", usage(20, 20)),
            ],
        );

        let opening = vec![ChatMessage::user("compare these")];
        let first = stub.generate_chat_completion(&opening, None).await.unwrap();
        assert_eq!(first.content, "first");

        let followup = vec![
            ChatMessage::user("compare these"),
            ChatMessage::assistant("first"),
            ChatMessage::user("now the improved prompt only"),
        ];
        let second = stub.generate_chat_completion(&followup, None).await.unwrap();
        assert_eq!(second.content, "second");
    }

    #[tokio::test]
    async fn test_depth_past_script_clamps_to_last_turn() {
        let stub = StubModel::scripted("stub-model", vec![StubTurn::new("only", usage(1, 1))]);
        let deep = vec![
            ChatMessage::user("a"),
            ChatMessage::assistant("b"),
            ChatMessage::user("c"),
            ChatMessage::assistant("d"),
            ChatMessage::user("e"),
        ];
        let response = stub.generate_chat_completion(&deep, None).await.unwrap();
        assert_eq!(response.content, "only");
    }

    #[tokio::test]
    async fn test_playback_is_stateless() {
        let stub = StubModel::single("stub-model", StubTurn::new("fixed", usage(5, 5)));
        let a = stub.generate_text("x", None).await.unwrap();
        let b = stub.generate_text("y", None).await.unwrap();
        assert_eq!(a.content, b.content);
        assert_eq!(a.usage, b.usage);
    }
}
