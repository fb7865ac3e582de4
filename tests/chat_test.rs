//! Integration tests for the chat service against a mock completion endpoint

mod test_utils;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockito::Matcher;
    use serde_json::json;
    use tokio::net::TcpListener;

    use mentor::chat::service::{
        APOLOGY, AUTH_FAILED, ENDPOINT_MISSING, RATE_LIMITED, SERVER_ERROR, TIMED_OUT,
    };
    use mentor::chat::{ChatMessage, MessageRole};

    use crate::test_utils::{completion_body, live_service};

    fn history() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("你是一位成长教练。"),
            ChatMessage::user("我最近总是拖延"),
        ]
    }

    #[tokio::test]
    async fn it_returns_the_trimmed_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "deepseek-chat",
                "stream": false,
                "messages": [
                    {"role": "system", "content": "你是一位成长教练。"},
                    {"role": "user", "content": "我最近总是拖延"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("  先从五分钟开始。\n"))
            .create_async()
            .await;

        let service = live_service(&server.url(), Duration::from_secs(5));
        let reply = service.send_message(&history()).await;

        mock.assert_async().await;
        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(reply.content, "先从五分钟开始。");
    }

    async fn reply_for_status(status: usize) -> String {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(json!({"error": {"message": "upstream says no"}}).to_string())
            .create_async()
            .await;

        let service = live_service(&server.url(), Duration::from_secs(5));
        service.send_message(&history()).await.content
    }

    #[tokio::test]
    async fn it_explains_known_status_codes() {
        assert_eq!(reply_for_status(401).await, format!("{}{}", APOLOGY, AUTH_FAILED));
        assert_eq!(reply_for_status(404).await, format!("{}{}", APOLOGY, ENDPOINT_MISSING));
        assert_eq!(reply_for_status(429).await, format!("{}{}", APOLOGY, RATE_LIMITED));
        assert_eq!(reply_for_status(500).await, format!("{}{}", APOLOGY, SERVER_ERROR));
    }

    #[tokio::test]
    async fn it_passes_through_other_status_messages() {
        assert_eq!(
            reply_for_status(402).await,
            "抱歉，API 错误 (402): upstream says no"
        );
    }

    #[tokio::test]
    async fn it_reports_empty_replies() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("   "))
            .create_async()
            .await;

        let service = live_service(&server.url(), Duration::from_secs(5));
        let reply = service.send_message(&history()).await;
        assert_eq!(reply.content, "抱歉，Empty response from API");
    }

    #[tokio::test]
    async fn it_reports_timeouts() {
        // Accepts connections and never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hold = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        let service = live_service(&format!("http://{}", addr), Duration::from_millis(200));
        let reply = service.send_message(&history()).await;
        hold.abort();

        assert_eq!(reply.content, format!("{}{}", APOLOGY, TIMED_OUT));
    }

    #[tokio::test]
    async fn it_never_calls_out_for_an_empty_history() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let service = live_service(&server.url(), Duration::from_secs(5));
        let reply = service.send_message(&[]).await;

        mock.assert_async().await;
        assert!(reply.content.starts_with(APOLOGY));
    }
}
