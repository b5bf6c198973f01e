use quiz_core::model::QuestionId;
use storage::{HttpProvider, LoadError, QuestionProvider, provider_for_source};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const QUIZ_JSON: &str = r#"[
    {"id": "a", "question": "Largest planet?", "options": ["Mars", "Jupiter"], "answer": "Jupiter"},
    {"id": 2, "question": "H2O is?", "options": ["Water", "Salt"], "answer": "Water"}
]"#;

/// Answer a single connection with a canned response and return its URL.
async fn serve(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        let mut request = Vec::new();
        let mut buf = [0_u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    });

    format!("http://{addr}/quiz.json")
}

#[tokio::test]
async fn fetches_and_decodes_question_array() {
    let url = serve("200 OK", QUIZ_JSON).await;
    let provider = HttpProvider::new(url);

    let questions = provider.load().await.unwrap();

    let ids: Vec<_> = questions.iter().map(|q| q.id().clone()).collect();
    assert_eq!(ids, vec![QuestionId::from("a"), QuestionId::from(2)]);
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let url = serve("404 Not Found", "").await;
    let provider = HttpProvider::new(url);

    let err = provider.load().await.unwrap_err();

    assert!(matches!(err, LoadError::HttpStatus(status) if status.as_u16() == 404));
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let url = serve("200 OK", r#"{"questions": []}"#).await;
    let provider = HttpProvider::new(url);

    let err = provider.load().await.unwrap_err();

    assert!(matches!(err, LoadError::NotAnArray));
}

#[tokio::test]
async fn source_string_selects_http_provider_for_urls() {
    let url = serve("200 OK", QUIZ_JSON).await;

    let provider = provider_for_source(&format!("  {url}  "));

    assert_eq!(provider.load().await.unwrap().len(), 2);
}
