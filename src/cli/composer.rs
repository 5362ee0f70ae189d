// Terminal message composer - turns typed lines into messaging calls.
//
// This is the outer adapter: it keeps "who am I / which conversation" state
// and renders results as text. All decisions live in core.

use super::commands::{parse_line, Command, HELP_TEXT};
use crate::core::messaging::{ConversationStore, MessagingService, SendOutcome};
use crate::core::moderation::BlockedAttemptStore;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// What the loop should do after a line was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

pub struct Composer<C: ConversationStore, S: BlockedAttemptStore> {
    messaging: Arc<MessagingService<C, S>>,
    current_user: Option<u64>,
    current_conversation: Option<u64>,
}

impl<C: ConversationStore, S: BlockedAttemptStore> Composer<C, S> {
    pub fn new(messaging: Arc<MessagingService<C, S>>) -> Self {
        Self {
            messaging,
            current_user: None,
            current_conversation: None,
        }
    }

    /// Handle one input line.
    pub async fn handle_line(&mut self, line: &str) -> Reply {
        match parse_line(line) {
            Ok(Some(command)) => self.handle(command).await,
            Ok(None) => Reply::Text(String::new()),
            Err(e) => Reply::Text(format!("⚠️ {}", e)),
        }
    }

    async fn handle(&mut self, command: Command) -> Reply {
        let text = match command {
            Command::Quit => return Reply::Quit,
            Command::Help => HELP_TEXT.to_string(),
            Command::As(user_id) => {
                self.current_user = Some(user_id);
                format!("Now acting as user {}", user_id)
            }
            Command::Open(participants) => {
                match self.messaging.open_conversation(participants).await {
                    Ok(conversation_id) => {
                        self.current_conversation = Some(conversation_id);
                        format!("Opened conversation {}", conversation_id)
                    }
                    Err(e) => format!("⚠️ {}", e),
                }
            }
            Command::Use(conversation_id) => match self.messaging.history(conversation_id).await {
                Ok(_) => {
                    self.current_conversation = Some(conversation_id);
                    format!("Using conversation {}", conversation_id)
                }
                Err(e) => format!("⚠️ {}", e),
            },
            Command::Inbox => self.inbox().await,
            Command::History => self.history().await,
            Command::Blocked(limit) => self.blocked(limit).await,
            Command::Check(text) => {
                let verdict = self.messaging.moderation().evaluate(&text);
                serde_json::to_string_pretty(&verdict)
                    .unwrap_or_else(|e| format!("⚠️ Failed to render verdict: {}", e))
            }
            Command::Send(text) => self.send(&text).await,
        };

        Reply::Text(text)
    }

    async fn send(&self, text: &str) -> String {
        let (Some(sender_id), Some(conversation_id)) =
            (self.current_user, self.current_conversation)
        else {
            return "⚠️ Pick a user with /as and a conversation with /open or /use first"
                .to_string();
        };

        match self
            .messaging
            .send_message(conversation_id, sender_id, text)
            .await
        {
            Ok(SendOutcome::Delivered(message)) => format!("✅ Sent (#{})", message.message_id),
            Ok(SendOutcome::Rejected { reason }) => {
                match self.messaging.moderation().attempts_for_sender(sender_id).await {
                    Ok(total) => format!("🚫 {} (blocked messages: {})", reason, total),
                    Err(_) => format!("🚫 {}", reason),
                }
            }
            Err(e) => format!("⚠️ {}", e),
        }
    }

    async fn inbox(&self) -> String {
        let Some(user_id) = self.current_user else {
            return "⚠️ Pick a user with /as first".to_string();
        };

        match self.messaging.conversations_for(user_id).await {
            Ok(ids) if ids.is_empty() => "No conversations yet".to_string(),
            Ok(ids) => ids
                .iter()
                .map(|id| format!("conversation {}", id))
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => format!("⚠️ {}", e),
        }
    }

    async fn history(&self) -> String {
        let Some(conversation_id) = self.current_conversation else {
            return "⚠️ No conversation selected".to_string();
        };

        match self.messaging.history(conversation_id).await {
            Ok(messages) if messages.is_empty() => "No messages yet".to_string(),
            Ok(messages) => messages
                .iter()
                .map(|m| {
                    format!(
                        "[{}] user {}: {}",
                        m.sent_at.format("%Y-%m-%d %H:%M"),
                        m.sender_id,
                        m.content
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => format!("⚠️ {}", e),
        }
    }

    async fn blocked(&self, limit: usize) -> String {
        match self.messaging.moderation().recent_attempts(limit).await {
            Ok(attempts) if attempts.is_empty() => "No blocked messages".to_string(),
            Ok(attempts) => attempts
                .iter()
                .map(|a| {
                    format!(
                        "[{}] user {} in conversation {} ({}): {}",
                        a.attempted_at.format("%Y-%m-%d %H:%M"),
                        a.sender_id,
                        a.conversation_id,
                        a.category,
                        a.content
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => format!("⚠️ {}", e),
        }
    }

    /// Read lines from stdin until EOF or `/quit`.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut reader = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut buf = Vec::new();

        stdout.write_all(b"Type /help for commands.\n").await?;
        stdout.flush().await?;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            // A badly encoded line is still screened rather than dropped.
            let line = String::from_utf8_lossy(&buf);
            match self.handle_line(&line).await {
                Reply::Quit => break,
                Reply::Text(text) if text.is_empty() => {}
                Reply::Text(text) => {
                    stdout.write_all(text.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await?;
                }
            }
        }

        tracing::info!("Composer closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::{ContentFilter, ModerationService};
    use crate::infra::messaging::InMemoryConversationStore;
    use crate::infra::moderation::InMemoryAttemptStore;

    fn composer() -> Composer<InMemoryConversationStore, InMemoryAttemptStore> {
        let moderation = ModerationService::new(
            Arc::new(ContentFilter::default()),
            InMemoryAttemptStore::new(),
        );
        let messaging = MessagingService::new(InMemoryConversationStore::new(), Arc::new(moderation));
        Composer::new(Arc::new(messaging))
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn test_send_requires_user_and_conversation() {
        let mut composer = composer();
        let reply = text(composer.handle_line("salam").await);
        assert!(reply.contains("/as"));
    }

    #[tokio::test]
    async fn test_conversation_flow() {
        let mut composer = composer();
        text(composer.handle_line("/open 1 2").await);
        text(composer.handle_line("/as 1").await);

        let reply = text(composer.handle_line("السلام عليكم، متى يمكننا توقيع العقد؟").await);
        assert!(reply.starts_with("✅"));

        let reply = text(composer.handle_line("اتصل بي على 0551234567").await);
        assert!(reply.starts_with("🚫"));
        assert!(reply.ends_with("(blocked messages: 1)"));

        let reply = text(composer.handle_line("ok").await);
        assert!(reply.starts_with("✅"));

        let history = text(composer.handle_line("/history").await);
        assert!(history.contains("توقيع العقد"));
        assert!(!history.contains("0551234567"));

        let blocked = text(composer.handle_line("/blocked").await);
        assert!(blocked.contains("0551234567"));
        assert!(blocked.contains("phone"));

        let inbox = text(composer.handle_line("/inbox").await);
        assert_eq!(inbox, "conversation 1");
    }

    #[tokio::test]
    async fn test_check_prints_verdict_json() {
        let mut composer = composer();
        let reply = text(composer.handle_line("/check karim@mail.com").await);
        let json: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(json["isRestricted"], true);
        assert_eq!(json["category"], "email");

        // /check never records anything
        let blocked = text(composer.handle_line("/blocked").await);
        assert_eq!(blocked, "No blocked messages");
    }

    #[tokio::test]
    async fn test_quit_and_errors() {
        let mut composer = composer();
        assert_eq!(composer.handle_line("/quit").await, Reply::Quit);

        let reply = text(composer.handle_line("/use 42").await);
        assert!(reply.contains("not found"));

        let reply = text(composer.handle_line("/nope").await);
        assert!(reply.contains("Unknown command"));
    }
}
