//! Interactive chat session
//!
//! Reads user turns with rustyline, streams each assistant reply, and keeps
//! the whole conversation as the context of the next request.

pub mod input;

use crate::cli::display;
use crate::client::OllamaClient;
use crate::types::{ChatMessage, ChatRequest};
use anyhow::Result;
use colored::*;
use futures_util::StreamExt;

use crate::repl::input::InputHandler;

/// Conversation history for one chat session
#[derive(Debug, Clone)]
pub struct Conversation {
    model: String,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(model: impl Into<String>, system: Option<String>) -> Self {
        let messages = system.into_iter().map(ChatMessage::system).collect();
        Self {
            model: model.into(),
            messages,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Record a user turn and build the streaming request for it
    pub fn user_turn(&mut self, content: impl Into<String>) -> ChatRequest {
        self.messages.push(ChatMessage::user(content));
        ChatRequest::new(self.model.clone(), self.messages.clone()).stream(true)
    }

    /// Record the assistant's accumulated reply
    pub fn assistant_turn(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }
}

/// Whether a line ends the session
pub fn is_exit_command(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "exit" | "quit")
}

/// Run the chat loop until exit, Ctrl-C or Ctrl-D
pub async fn run_chat(client: &OllamaClient, conversation: &mut Conversation) -> Result<()> {
    let mut input = InputHandler::new(format!("{} ", "You:".green().bold()))?;

    println!(
        "\n{} (type 'exit' or 'quit' to end)\n",
        format!("Chat with {}", conversation.model()).bold().cyan()
    );

    loop {
        let line = match input.read_line()? {
            Some(line) => line,
            None => {
                println!("\n{}", "Chat ended".yellow());
                return Ok(());
            }
        };

        if line.is_empty() {
            continue;
        }
        if is_exit_command(&line) {
            println!("{}", "Goodbye!".yellow());
            return Ok(());
        }

        let request = conversation.user_turn(line);
        let mut chunks = client.chat(request).await?.into_stream();

        print!("{} ", "Assistant:".cyan());
        let mut reply = String::new();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            display::stream_fragment(&chunk.message.content)?;
            reply.push_str(&chunk.message.content);
        }
        println!();

        conversation.assistant_turn(reply);
    }
}
