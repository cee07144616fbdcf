use log::{debug, info};
use reqwest::Client;
use url::Url;

use crate::constants;
use crate::errors::{CtfError, CtfResult};
use super::types::{AgentCard, JsonRpcRequest, JsonRpcResponse, Message, SendMessageResult};

/// Fetches an agent's card from its well-known endpoint.
///
/// Uses a client scoped to this call with the transport's default timeout.
/// Connection failures, error statuses and malformed cards come back as
/// `RequestError` with the underlying `reqwest::Error`.
pub async fn discover_agent(base_url: &str) -> CtfResult<AgentCard> {
    let client = Client::new();
    let card = fetch_agent_card(&client, base_url).await?;
    info!("Discovered agent '{}' at {}", card.name, base_url);
    Ok(card)
}

/// Sends a text message to a remote agent and returns the reply text.
///
/// The agent is discovered first, then a single `message/send` request goes
/// to the URL from its card. Reply text is gathered from the task artifacts
/// and then from the status message, joined by newlines.
///
/// # Parameters
/// * `agent_url` - base URL of the remote agent
/// * `text` - message body
/// * `context_id` - conversation to continue, if any
/// * `task_id` - task to attach the message to, if any
///
/// # Returns
/// * the reply text, [`constants::NO_RESULT_SENTINEL`] when the agent sent
///   no result, or [`constants::EMPTY_RESPONSE_SENTINEL`] when the result had
///   no text in it
///
/// # Example
/// ```no_run
/// use ctf_ad_shared::a2a::send_message_to_agent;
///
/// async fn delegate() {
///     let reply = send_message_to_agent("http://10.60.1.2:8001", "scan the vulnbox", None, None)
///         .await
///         .unwrap();
///     println!("{}", reply);
/// }
/// ```
pub async fn send_message_to_agent(
    agent_url: &str,
    text: &str,
    context_id: Option<&str>,
    task_id: Option<&str>,
) -> CtfResult<String> {
    let client = Client::builder()
        .timeout(constants::A2A_SEND_TIMEOUT)
        .build()?;

    let card = fetch_agent_card(&client, agent_url).await?;
    let rpc_url = if card.url.is_empty() { agent_url.to_string() } else { card.url.clone() };

    let mut message = Message::user_text(text);
    message.context_id = context_id.map(str::to_string);
    message.task_id = task_id.map(str::to_string);

    debug!("Sending message {} to agent '{}' at {}", message.message_id, card.name, rpc_url);

    let request = JsonRpcRequest::send_message(message);
    let response: JsonRpcResponse<SendMessageResult> = client
        .post(&rpc_url)
        .json(&request)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if let Some(error) = response.error {
        return Err(CtfError::ApiError(format!(
            "Agent '{}' returned error {}: {}",
            card.name, error.code, error.message
        )));
    }

    Ok(extract_response_text(response.result.as_ref()))
}

/// Collects the human-readable text from a `message/send` result.
///
/// Order is every text part of every artifact, then the text parts of the
/// task status message. A direct message result has neither and so counts as
/// empty.
pub fn extract_response_text(result: Option<&SendMessageResult>) -> String {
    let Some(result) = result else {
        return constants::NO_RESULT_SENTINEL.to_string();
    };

    let mut texts: Vec<&str> = Vec::new();
    if let SendMessageResult::Task(task) = result {
        for artifact in &task.artifacts {
            texts.extend(artifact.parts.iter().filter_map(|part| part.as_text()));
        }
        if let Some(message) = &task.status.message {
            texts.extend(message.parts.iter().filter_map(|part| part.as_text()));
        }
    }

    if texts.is_empty() {
        return constants::EMPTY_RESPONSE_SENTINEL.to_string();
    }
    texts.join("\n")
}

/// URL of the agent card under `base_url`
pub fn agent_card_url(base_url: &str) -> CtfResult<Url> {
    let joined = format!("{}{}", base_url.trim_end_matches('/'), constants::AGENT_CARD_PATH);
    Ok(Url::parse(&joined)?)
}

async fn fetch_agent_card(client: &Client, base_url: &str) -> CtfResult<AgentCard> {
    let url = agent_card_url(base_url)?;
    let card = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<AgentCard>()
        .await?;
    Ok(card)
}
