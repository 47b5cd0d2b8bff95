//! Tool-calling loop integration tests
//!
//! Drives a session with a scripted model and mocked search, page and
//! market-data endpoints.

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use steward::core::{Message, Role, ToolCall, ToolDefinition};
use steward::llm::{GenerateOptions, LLMProvider, LLMResponse};
use steward::{AgentSession, Config, StewardError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Step = Box<dyn Fn(&[Message]) -> LLMResponse + Send + Sync>;

/// Model stand-in that replays scripted turns and records what it was sent
struct ScriptedProvider {
    steps: Mutex<VecDeque<Step>>,
    seen: Mutex<Vec<(Vec<Message>, Option<bool>)>>,
    repeat_last: bool,
}

impl ScriptedProvider {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            seen: Mutex::new(Vec::new()),
            repeat_last: false,
        })
    }

    /// Replays `step` on every call
    fn forever(step: Step) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(vec![step].into()),
            seen: Mutex::new(Vec::new()),
            repeat_last: true,
        })
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat_with_tools(
        &self,
        _model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> steward::Result<LLMResponse> {
        assert_eq!(tools.len(), 3);
        self.seen
            .lock()
            .unwrap()
            .push((messages.to_vec(), options.and_then(|o| o.parallel_tool_calls)));

        let mut steps = self.steps.lock().unwrap();
        let response = match steps.front() {
            Some(step) => step(messages),
            None => return Err(StewardError::llm("script exhausted")),
        };
        if !self.repeat_last {
            steps.pop_front();
        }
        Ok(response)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall::new(id, name, arguments)
}

fn last_tool_output(messages: &[Message]) -> String {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Tool)
        .map(|m| m.content.clone())
        .unwrap_or_default()
}

/// Config whose tools all point at `server`
fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.search.base_url = server.uri();
    config.market.base_url = server.uri();
    config.market.cookie_url = format!("{}/cookie", server.uri());
    config.agent.max_tool_rounds = 4;
    config
}

async fn mount_yahoo(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/cookie"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/test/getcrumb"))
        .respond_with(ResponseTemplate::new(200).set_body_string("crumb"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quoteSummary": {
                "result": [{
                    "summaryDetail": {"previousClose": {"raw": 189.84, "fmt": "189.84"}}
                }],
                "error": null
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_apple_closing_price() {
    let server = MockServer::start().await;
    mount_yahoo(&server).await;

    let provider = ScriptedProvider::new(vec![
        Box::new(|_| {
            LLMResponse::tool_calls(vec![tool_call(
                "call_1",
                "get_stock_info",
                json!({"symbol": "AAPL", "field": "previousClose"}),
            )])
        }),
        Box::new(|messages| {
            LLMResponse::text(format!(
                "Apple last closed at ${}.",
                last_tool_output(messages)
            ))
        }),
    ]);

    let mut session = AgentSession::new(config_for(&server), provider.clone()).unwrap();
    let answer = session
        .process("What is the last closing price of the Apple stock?")
        .await
        .unwrap();

    assert_eq!(answer, "Apple last closed at $189.84.");

    let roles: Vec<Role> = session.transcript().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::Tool, Role::Assistant]
    );
    assert_eq!(
        session.transcript()[2].tool_call_id.as_deref(),
        Some("call_1")
    );

    // The model always sees the system prompt first and parallel calls disabled
    let seen = provider.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0[0].role, Role::System);
    assert!(seen.iter().all(|(_, parallel)| *parallel == Some(false)));
}

#[tokio::test]
async fn test_search_then_fetch_report() {
    let server = MockServer::start().await;
    let report_url = format!("{}/report", server.uri());
    let encoded: String = url::form_urlencoded::byte_serialize(report_url.as_bytes()).collect();

    let results: String = (1..=7)
        .map(|n| {
            format!(
                r#"<div class="result"><a class="result__a" href="//duckduckgo.com/l/?uddg={encoded}&amp;n={n}">JP Morgan Global Family Office Report {n}</a>
                   <a class="result__snippet">Findings {n}</a></div>"#
            )
        })
        .collect();
    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<html><body>{results}</body></html>"
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><h1>2024 Global Family Office Report</h1>\
             <p>Families plan to increase allocations to private equity.</p></body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;

    let provider = ScriptedProvider::new(vec![
        Box::new(|_| {
            LLMResponse::tool_calls(vec![tool_call(
                "call_s",
                "search_internet",
                json!({"query": "latest Family Office Report by JP Morgan"}),
            )])
        }),
        Box::new(|messages| {
            let results: Vec<serde_json::Value> =
                serde_json::from_str(&last_tool_output(messages)).unwrap();
            assert_eq!(results.len(), 5);
            let url = results[0]["url"].as_str().unwrap().to_string();
            LLMResponse::tool_calls(vec![tool_call("call_f", "request_url", json!({"url": url}))])
        }),
        Box::new(|messages| {
            let page = last_tool_output(messages);
            LLMResponse::text(format!("Summary: {}", page.replace('\n', " ")))
        }),
    ]);

    let mut session = AgentSession::new(config_for(&server), provider.clone()).unwrap();
    let answer = session
        .process("What does the latest Family Office Report by JP Morgan say?")
        .await
        .unwrap();

    assert_eq!(
        answer,
        "Summary: 2024 Global Family Office Report Families plan to increase allocations to private equity."
    );
    assert_eq!(provider.calls(), 3);
    let tool_messages = session
        .transcript()
        .iter()
        .filter(|m| m.role == Role::Tool)
        .count();
    assert_eq!(tool_messages, 2);
}

#[tokio::test]
async fn test_round_limit_fails_closed() {
    let server = MockServer::start().await;
    let mut config = config_for(&server);
    config.agent.max_tool_rounds = 2;

    let provider = ScriptedProvider::forever(Box::new(|_| {
        LLMResponse::tool_calls(vec![tool_call(
            "call_loop",
            "request_url",
            json!({"url": "not a url"}),
        )])
    }));

    let mut session = AgentSession::new(config, provider.clone()).unwrap();
    let answer = session.process("loop forever").await.unwrap();

    assert!(answer.contains("could not complete"));
    // Two executed rounds plus the request that hit the cap
    assert_eq!(provider.calls(), 3);

    let transcript = session.transcript();
    let tool_calls: usize = transcript
        .iter()
        .filter_map(|m| m.tool_calls.as_ref())
        .map(Vec::len)
        .sum();
    let tool_results = transcript.iter().filter(|m| m.role == Role::Tool).count();
    assert_eq!(tool_calls, 2);
    assert_eq!(tool_results, tool_calls);
    assert_eq!(transcript.last().unwrap().content, answer);
}

#[tokio::test]
async fn test_bad_calls_become_failure_messages() {
    let server = MockServer::start().await;

    let provider = ScriptedProvider::new(vec![
        Box::new(|_| {
            LLMResponse::tool_calls(vec![
                tool_call("c1", "send_wire_transfer", json!({})),
                tool_call("c2", "request_url", json!("{not json")),
                tool_call(
                    "c3",
                    "get_stock_info",
                    json!({"symbol": "AAPL", "field": "marketCap"}),
                ),
            ])
        }),
        Box::new(|_| LLMResponse::text("Sorry, I could not look that up.")),
    ]);

    let mut session = AgentSession::new(config_for(&server), provider).unwrap();
    let answer = session.process("Do something odd").await.unwrap();
    assert_eq!(answer, "Sorry, I could not look that up.");

    let tool_messages: Vec<&Message> = session
        .transcript()
        .iter()
        .filter(|m| m.role == Role::Tool)
        .collect();
    let ids: Vec<&str> = tool_messages
        .iter()
        .filter_map(|m| m.tool_call_id.as_deref())
        .collect();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
    assert!(tool_messages[0].content.contains("unknown tool"));
    assert!(tool_messages[1].content.contains("not a JSON object"));
    assert!(tool_messages[2].content.contains("Unknown stock field 'marketCap'"));
}

#[tokio::test]
async fn test_empty_answer_is_replaced() {
    let server = MockServer::start().await;
    let provider = ScriptedProvider::new(vec![Box::new(|_| LLMResponse::text("  "))]);

    let mut session = AgentSession::new(config_for(&server), provider).unwrap();
    let answer = session.process("hello").await.unwrap();
    assert!(answer.contains("couldn't generate a response"));
}

#[tokio::test]
async fn test_model_failure_propagates() {
    let server = MockServer::start().await;
    let provider = ScriptedProvider::new(vec![]);

    let mut session = AgentSession::new(config_for(&server), provider).unwrap();
    let err = session.process("hello").await.unwrap_err();
    assert!(matches!(err, StewardError::Llm(_)));
}

#[tokio::test]
async fn test_failed_turn_still_ends_on_assistant() {
    let server = MockServer::start().await;
    mount_yahoo(&server).await;

    // One tool round succeeds, then the model request fails mid-turn
    let provider = ScriptedProvider::new(vec![Box::new(|_| {
        LLMResponse::tool_calls(vec![tool_call(
            "call_1",
            "get_stock_info",
            json!({"symbol": "AAPL", "field": "previousClose"}),
        )])
    })]);

    let mut session = AgentSession::new(config_for(&server), provider).unwrap();
    assert!(session.process("AAPL close?").await.is_err());

    let roles: Vec<Role> = session.transcript().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::Tool, Role::Assistant]
    );
    let closing = session.transcript().last().unwrap();
    assert!(closing.tool_calls.is_none());
    assert!(closing.content.contains("model request failed"));
}

#[tokio::test]
async fn test_history_carries_across_turns() {
    let server = MockServer::start().await;
    let provider = ScriptedProvider::new(vec![
        Box::new(|_| LLMResponse::text("first")),
        Box::new(|messages| {
            // system, user, assistant, user
            assert_eq!(messages.len(), 4);
            assert_eq!(messages[2].content, "first");
            LLMResponse::text("second")
        }),
    ]);

    let mut session = AgentSession::new(config_for(&server), provider).unwrap();
    assert_eq!(session.process("one").await.unwrap(), "first");
    assert_eq!(session.process("two").await.unwrap(), "second");
    assert_eq!(session.conversation_length(), 4);
}
