use parley_llm::provider::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn to_message(&self) -> Message {
        match self.role {
            TurnRole::User => Message::user(self.content.clone()),
            TurnRole::Assistant => Message::assistant(self.content.clone()),
        }
    }
}

/// Append-only turn log. `history_limit` only narrows what goes into a prompt.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    turns: Vec<ConversationTurn>,
    history_limit: usize,
}

impl ConversationMemory {
    /// `history_limit == 0` puts every stored turn into the prompt.
    #[must_use]
    pub fn new(history_limit: usize) -> Self {
        Self {
            turns: Vec::new(),
            history_limit,
        }
    }

    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// All turns in insertion order.
    #[must_use]
    pub fn history(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Most recent turns that fit the prompt window.
    #[must_use]
    pub fn window(&self) -> &[ConversationTurn] {
        if self.history_limit == 0 || self.turns.len() <= self.history_limit {
            &self.turns
        } else {
            &self.turns[self.turns.len() - self.history_limit..]
        }
    }

    #[must_use]
    pub fn window_messages(&self) -> Vec<Message> {
        self.window().iter().map(ConversationTurn::to_message).collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
