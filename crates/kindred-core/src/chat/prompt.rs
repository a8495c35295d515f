//! Prompt assembly for the conversation engine.
//!
//! The prompt has a fixed layout: a system context block carrying the
//! chatbot profile, a user context block, the running conversation history
//! in original order, and the current interaction ending with the
//! assistant marker the model completes from.
//!
//! Layout:
//! ```text
//! [System Context]
//! {chatbot profile data as JSON}
//!
//! [User Context]
//! {user profile data as JSON}
//!
//! [Conversation History]
//! User : ...
//! Chatbot: ...
//!
//! [Current Interaction]
//! User : {input}
//! Chatbot:
//! ```

use kindred_types::profile::{ProfileData, SessionContext};
use kindred_types::session::Turn;

/// Encode profile data for the prompt.
///
/// JSON with deterministic key order (the data map is a BTreeMap), so the
/// same profile always renders the same block.
pub fn encode_profile(data: &ProfileData) -> String {
    serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string())
}

/// Assemble the full prompt for one user input.
pub fn build_prompt(ctx: &SessionContext, transcript: &[Turn], user_input: &str) -> String {
    let history = transcript
        .iter()
        .map(Turn::render)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "[System Context]\n{chatbot}\n\n\
         [User Context]\n{user}\n\n\
         [Conversation History]\n{history}\n\n\
         [Current Interaction]\nUser : {input}\nChatbot: ",
        chatbot = encode_profile(&ctx.chatbot.data),
        user = encode_profile(&ctx.user.data),
        history = history,
        input = user_input,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindred_types::profile::AttrValue;

    #[test]
    fn test_empty_profiles_encode_as_empty_object() {
        assert_eq!(encode_profile(&ProfileData::new()), "{}");
    }

    #[test]
    fn test_prompt_ends_with_input_and_marker() {
        let ctx = SessionContext::default();
        let prompt = build_prompt(&ctx, &[], "hi");
        assert!(prompt.ends_with("User : hi\nChatbot: "));
    }

    #[test]
    fn test_prompt_block_order() {
        let ctx = SessionContext::default();
        let transcript = vec![Turn::user("hello"), Turn::assistant("hey there")];
        let prompt = build_prompt(&ctx, &transcript, "how are you?");

        let system = prompt.find("[System Context]").unwrap();
        let user = prompt.find("[User Context]").unwrap();
        let history = prompt.find("[Conversation History]").unwrap();
        let current = prompt.find("[Current Interaction]").unwrap();
        assert!(system < user && user < history && history < current);
    }

    #[test]
    fn test_history_preserves_order() {
        let ctx = SessionContext::default();
        let transcript = vec![
            Turn::user("first"),
            Turn::assistant("second"),
            Turn::user("third"),
        ];
        let prompt = build_prompt(&ctx, &transcript, "fourth");

        let first = prompt.find("User : first").unwrap();
        let second = prompt.find("Chatbot: second").unwrap();
        let third = prompt.find("User : third").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_profile_data_rendered_into_blocks() {
        let mut ctx = SessionContext::default();
        ctx.chatbot
            .data
            .insert("mood".to_string(), AttrValue::from("cheerful"));
        ctx.user
            .data
            .insert("hobby".to_string(), AttrValue::from("chess"));

        let prompt = build_prompt(&ctx, &[], "hi");
        assert!(prompt.contains(r#"{"mood":"cheerful"}"#));
        assert!(prompt.contains(r#"{"hobby":"chess"}"#));
    }
}
